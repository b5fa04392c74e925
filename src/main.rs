//! The pixel tracker's API server.

use std::net::SocketAddr;
use std::sync::Arc;

use async_graphql::http::{playground_source, GraphQLPlaygroundConfig};
use async_graphql::{Request, Response};
use axum::extract::Extension;
use axum::http::HeaderMap;
use axum::response::Html;
use axum::routing::get;
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use pixelhub::auth::{IdentityProvider, OAuthClient};
use pixelhub::config::HubConfig;
use pixelhub::graphql::{build_schema, SessionToken};
use pixelhub::models::member::Member;
use pixelhub::pixels::triggers::TriggerRouter;
use pixelhub::store::memory::MemoryStore;
use pixelhub::store::SharedStore;

const TOKEN_HEADER: &str = "x-pixelhub-token";

#[derive(Clone)]
struct AppState {
    store: SharedStore,
    provider: Arc<dyn IdentityProvider>,
    config: Arc<HubConfig>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Arc::new(HubConfig::from_env()?);
    let store: SharedStore = Arc::new(MemoryStore::new());
    let provider: Arc<dyn IdentityProvider> = Arc::new(OAuthClient::from_config(&config));

    let writes = store.watch();
    tokio::spawn(TriggerRouter::new(store.clone()).listen(writes));

    let state = AppState {
        store,
        provider,
        config: config.clone(),
    };
    let app = Router::new()
        .route("/", get(playground).post(query))
        .layer(Extension(state))
        .layer(CorsLayer::permissive());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(%addr, "listening");
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}

async fn query(
    headers: HeaderMap,
    Extension(state): Extension<AppState>,
    Json(request): Json<Request>,
) -> Json<Response> {
    let mut request = request
        .data(state.store.clone())
        .data(state.provider.clone())
        .data(state.config.clone());

    if let Some(token) = headers.get(TOKEN_HEADER).and_then(|value| value.to_str().ok()) {
        match Member::with_token(token, state.store.as_ref()).await {
            Ok(user) => {
                request = request.data(user).data(SessionToken(token.to_owned()));
            }
            Err(err) => tracing::debug!(error = %err, "ignoring invalid session token"),
        }
    }

    Json(build_schema().execute(request).await)
}

async fn playground() -> Html<String> {
    Html(playground_source(GraphQLPlaygroundConfig::new("/")))
}
