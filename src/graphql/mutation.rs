use std::sync::Arc;

use async_graphql::{Context, Object, Result};

use crate::auth::IdentityProvider;
use crate::config::HubConfig;
use crate::graphql::guards::{Admin, LoggedIn};
use crate::graphql::{SessionToken, SUCCESS_MESSAGE};
use crate::models::activity::{Activity, NewActivity};
use crate::models::event::absence::{AbsenceStatus, ExcusedAbsence};
use crate::models::event::{Event, NewEvent};
use crate::models::member::session::Session;
use crate::models::member::Member;
use crate::models::semester::Semester;
use crate::models::settings::Settings;
use crate::pixels::aggregate_member;
use crate::store::SharedStore;

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    /// Exchanges an authorization code from the identity provider for a
    /// session token
    pub async fn login(&self, ctx: &Context<'_>, code: String) -> Result<String> {
        let store: &SharedStore = ctx.data_unchecked();
        let provider: &Arc<dyn IdentityProvider> = ctx.data_unchecked();
        let config: &Arc<HubConfig> = ctx.data_unchecked();

        Ok(crate::auth::login(
            provider.as_ref(),
            store.as_ref(),
            config.allowed_email_domain.as_deref(),
            &code,
        )
        .await?)
    }

    /// Logs the member out
    #[graphql(guard = "LoggedIn")]
    pub async fn logout(&self, ctx: &Context<'_>) -> Result<&'static str> {
        let store: &SharedStore = ctx.data_unchecked();
        if let Some(token) = ctx.data_opt::<SessionToken>() {
            Session::remove(&token.0, store.as_ref()).await?;
        }

        Ok(SUCCESS_MESSAGE)
    }

    /// Requests an excused absence for the current user at the given event
    #[graphql(guard = "LoggedIn")]
    pub async fn submit_absence_request(
        &self,
        ctx: &Context<'_>,
        event_id: String,
        reason: String,
    ) -> Result<ExcusedAbsence> {
        let store: &SharedStore = ctx.data_unchecked();
        let user = ctx.data_unchecked::<Member>();

        Ok(ExcusedAbsence::submit(&event_id, &user.id, &reason, store.as_ref()).await?)
    }

    /// Approves or denies an absence request
    #[graphql(guard = "Admin")]
    pub async fn respond_to_absence_request(
        &self,
        ctx: &Context<'_>,
        event_id: String,
        id: String,
        approved: bool,
    ) -> Result<ExcusedAbsence> {
        let store: &SharedStore = ctx.data_unchecked();
        let status = if approved {
            AbsenceStatus::Approved
        } else {
            AbsenceStatus::Denied
        };
        ExcusedAbsence::set_status(&event_id, &id, status, store.as_ref()).await?;

        Ok(ExcusedAbsence::with_id(&event_id, &id, store.as_ref()).await?)
    }

    /// Creates a new event
    #[graphql(guard = "Admin")]
    pub async fn create_event(&self, ctx: &Context<'_>, new_event: NewEvent) -> Result<Event> {
        let store: &SharedStore = ctx.data_unchecked();
        let new_id = Event::create(new_event, store.as_ref()).await?;

        Ok(Event::with_id(&new_id, store.as_ref()).await?)
    }

    /// Updates the given event
    #[graphql(guard = "Admin")]
    pub async fn update_event(
        &self,
        ctx: &Context<'_>,
        id: String,
        new_event: NewEvent,
    ) -> Result<Event> {
        let store: &SharedStore = ctx.data_unchecked();
        Event::update(&id, new_event, store.as_ref()).await?;

        Ok(Event::with_id(&id, store.as_ref()).await?)
    }

    /// Deletes an event and returns its ID
    #[graphql(guard = "Admin")]
    pub async fn delete_event(&self, ctx: &Context<'_>, id: String) -> Result<String> {
        let store: &SharedStore = ctx.data_unchecked();
        Event::delete(&id, store.as_ref()).await?;

        Ok(id)
    }

    /// Creates a new activity
    #[graphql(guard = "Admin")]
    pub async fn create_activity(
        &self,
        ctx: &Context<'_>,
        new_activity: NewActivity,
    ) -> Result<Activity> {
        let store: &SharedStore = ctx.data_unchecked();
        let new_id = Activity::create(new_activity, store.as_ref()).await?;

        Ok(Activity::with_id(&new_id, store.as_ref()).await?)
    }

    /// Updates the given activity, leaving its multipliers as they are
    #[graphql(guard = "Admin")]
    pub async fn update_activity(
        &self,
        ctx: &Context<'_>,
        id: String,
        new_activity: NewActivity,
    ) -> Result<Activity> {
        let store: &SharedStore = ctx.data_unchecked();
        Activity::update(&id, new_activity, store.as_ref()).await?;

        Ok(Activity::with_id(&id, store.as_ref()).await?)
    }

    /// Deletes an activity and returns its ID
    #[graphql(guard = "Admin")]
    pub async fn delete_activity(&self, ctx: &Context<'_>, id: String) -> Result<String> {
        let store: &SharedStore = ctx.data_unchecked();
        Activity::delete(&id, store.as_ref()).await?;

        Ok(id)
    }

    /// Sets one member's multiplier on an activity; zero removes the entry
    #[graphql(guard = "Admin")]
    pub async fn set_multiplier(
        &self,
        ctx: &Context<'_>,
        activity_id: String,
        member_id: String,
        multiplier: i64,
    ) -> Result<Activity> {
        let store: &SharedStore = ctx.data_unchecked();
        Activity::set_multiplier(&activity_id, &member_id, multiplier, store.as_ref()).await?;

        Ok(Activity::with_id(&activity_id, store.as_ref()).await?)
    }

    /// Creates a new semester
    #[graphql(guard = "Admin")]
    pub async fn create_semester(&self, ctx: &Context<'_>, name: String) -> Result<Semester> {
        let store: &SharedStore = ctx.data_unchecked();
        Ok(Semester::create(&name, store.as_ref()).await?)
    }

    /// Points the active-semester filter at the given semester, or clears
    /// it when none is given
    #[graphql(guard = "Admin")]
    pub async fn set_current_semester(
        &self,
        ctx: &Context<'_>,
        semester_id: Option<String>,
    ) -> Result<Settings> {
        let store: &SharedStore = ctx.data_unchecked();
        Settings::set_current_semester(semester_id, store.as_ref()).await?;

        Ok(Settings::get(store.as_ref()).await?)
    }

    /// Shows or hides the leaderboard for members
    #[graphql(guard = "Admin")]
    pub async fn set_leadership_visible(
        &self,
        ctx: &Context<'_>,
        visible: bool,
    ) -> Result<Settings> {
        let store: &SharedStore = ctx.data_unchecked();
        Settings::set_leadership(visible, store.as_ref()).await?;

        Ok(Settings::get(store.as_ref()).await?)
    }

    /// Grants or revokes a member's admin access
    #[graphql(guard = "Admin")]
    pub async fn set_admin(
        &self,
        ctx: &Context<'_>,
        member_id: String,
        is_admin: bool,
    ) -> Result<Member> {
        let store: &SharedStore = ctx.data_unchecked();
        Member::set_admin(&member_id, is_admin, store.as_ref()).await?;

        Ok(Member::with_id(&member_id, store.as_ref()).await?)
    }

    /// Sets a member's manual adjustment and recomputes their total
    #[graphql(guard = "Admin")]
    pub async fn set_pixel_delta(
        &self,
        ctx: &Context<'_>,
        member_id: String,
        delta: i64,
    ) -> Result<Member> {
        let store: &SharedStore = ctx.data_unchecked();
        Member::set_pixel_delta(&member_id, delta, store.as_ref()).await?;
        aggregate_member(store.as_ref(), &member_id).await?;

        Ok(Member::with_id(&member_id, store.as_ref()).await?)
    }

    /// Folds one member record into another, deletes the source, and
    /// recomputes the destination
    #[graphql(guard = "Admin")]
    pub async fn merge_members(
        &self,
        ctx: &Context<'_>,
        source_id: String,
        destination_id: String,
    ) -> Result<Member> {
        let store: &SharedStore = ctx.data_unchecked();
        Member::merge(&source_id, &destination_id, store.as_ref()).await?;
        aggregate_member(store.as_ref(), &destination_id).await?;

        Ok(Member::with_id(&destination_id, store.as_ref()).await?)
    }

    /// Recomputes one member's total on demand
    #[graphql(guard = "Admin")]
    pub async fn recalculate(&self, ctx: &Context<'_>, member_id: String) -> Result<Member> {
        let store: &SharedStore = ctx.data_unchecked();
        aggregate_member(store.as_ref(), &member_id).await?;

        Ok(Member::with_id(&member_id, store.as_ref()).await?)
    }

    /// Recomputes every member's total, for use after changing the active
    /// semester
    #[graphql(guard = "Admin")]
    pub async fn recalculate_all(&self, ctx: &Context<'_>) -> Result<&'static str> {
        let store: &SharedStore = ctx.data_unchecked();
        for member in Member::all(store.as_ref()).await? {
            aggregate_member(store.as_ref(), &member.id).await?;
        }

        Ok(SUCCESS_MESSAGE)
    }
}
