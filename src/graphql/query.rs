use async_graphql::{Context, Object, Result};

use crate::error::HubError;
use crate::graphql::guards::{Admin, LoggedIn};
use crate::models::activity::Activity;
use crate::models::event::absence::ExcusedAbsence;
use crate::models::event::Event;
use crate::models::member::Member;
use crate::models::semester::Semester;
use crate::models::settings::Settings;
use crate::pixels::attendance::EventAttendance;
use crate::store::SharedStore;

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// The currently logged-in member, if any
    pub async fn user(&self, ctx: &Context<'_>) -> Option<Member> {
        ctx.data_opt::<Member>().cloned()
    }

    #[graphql(guard = "LoggedIn")]
    pub async fn member(&self, ctx: &Context<'_>, id: String) -> Result<Member> {
        let store: &SharedStore = ctx.data_unchecked();
        Ok(Member::with_id(&id, store.as_ref()).await?)
    }

    #[graphql(guard = "LoggedIn")]
    pub async fn members(&self, ctx: &Context<'_>) -> Result<Vec<Member>> {
        let store: &SharedStore = ctx.data_unchecked();
        Ok(Member::all(store.as_ref()).await?)
    }

    /// The members ordered by their totals. Empty for non-admins while
    /// the leaderboard is switched off.
    #[graphql(guard = "LoggedIn")]
    pub async fn leaderboard(&self, ctx: &Context<'_>) -> Result<Vec<Member>> {
        let store: &SharedStore = ctx.data_unchecked();
        let user: &Member = ctx.data_unchecked();

        let settings = Settings::get(store.as_ref()).await?;
        if !settings.leaderboard_enabled() && !user.is_admin {
            return Ok(vec![]);
        }

        Ok(Member::leaderboard(store.as_ref()).await?)
    }

    /// The member's per-event attendance log for the active semester
    #[graphql(guard = "LoggedIn")]
    pub async fn member_attendance(
        &self,
        ctx: &Context<'_>,
        id: String,
    ) -> Result<Vec<EventAttendance>> {
        let store: &SharedStore = ctx.data_unchecked();
        Ok(crate::pixels::attendance_log(store.as_ref(), &id).await?)
    }

    #[graphql(guard = "LoggedIn")]
    pub async fn event(&self, ctx: &Context<'_>, id: String) -> Result<Event> {
        let store: &SharedStore = ctx.data_unchecked();
        Ok(Event::with_id(&id, store.as_ref()).await?)
    }

    /// The active semester's events
    #[graphql(guard = "LoggedIn")]
    pub async fn events(&self, ctx: &Context<'_>) -> Result<Vec<Event>> {
        let store: &SharedStore = ctx.data_unchecked();
        let semester_id = active_semester(store).await?;
        Ok(Event::for_semester(&semester_id, store.as_ref()).await?)
    }

    #[graphql(guard = "Admin")]
    pub async fn absence_requests(
        &self,
        ctx: &Context<'_>,
        event_id: String,
    ) -> Result<Vec<ExcusedAbsence>> {
        let store: &SharedStore = ctx.data_unchecked();
        Ok(ExcusedAbsence::for_event(&event_id, store.as_ref()).await?)
    }

    #[graphql(guard = "LoggedIn")]
    pub async fn activity(&self, ctx: &Context<'_>, id: String) -> Result<Activity> {
        let store: &SharedStore = ctx.data_unchecked();
        Ok(Activity::with_id(&id, store.as_ref()).await?)
    }

    /// The active semester's activities
    #[graphql(guard = "LoggedIn")]
    pub async fn activities(&self, ctx: &Context<'_>) -> Result<Vec<Activity>> {
        let store: &SharedStore = ctx.data_unchecked();
        let semester_id = active_semester(store).await?;
        Ok(Activity::for_semester(&semester_id, store.as_ref()).await?)
    }

    #[graphql(guard = "LoggedIn")]
    pub async fn semesters(&self, ctx: &Context<'_>) -> Result<Vec<Semester>> {
        let store: &SharedStore = ctx.data_unchecked();
        Ok(Semester::all(store.as_ref()).await?)
    }

    #[graphql(guard = "LoggedIn")]
    pub async fn settings(&self, ctx: &Context<'_>) -> Result<Settings> {
        let store: &SharedStore = ctx.data_unchecked();
        Ok(Settings::get(store.as_ref()).await?)
    }
}

async fn active_semester(store: &SharedStore) -> Result<String> {
    let settings = Settings::get(store.as_ref()).await?;
    Ok(settings
        .active_semester()
        .ok_or(HubError::ConfigMissing("current semester"))?
        .to_owned())
}
