use async_graphql::{EmptySubscription, Schema};

pub mod guards;
pub mod mutation;
pub mod query;

pub use mutation::MutationRoot;
pub use query::QueryRoot;

pub const SUCCESS_MESSAGE: &str = "success";

/// The session token of the current request, when one was presented.
pub struct SessionToken(pub String);

pub type HubSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

pub fn build_schema() -> HubSchema {
    Schema::new(QueryRoot, MutationRoot, EmptySubscription)
}
