use async_graphql::{Context, Guard, Result};

use crate::models::member::Member;

pub struct LoggedIn;

#[async_trait::async_trait]
impl Guard for LoggedIn {
    async fn check(&self, ctx: &Context<'_>) -> Result<()> {
        if ctx.data_opt::<Member>().is_some() {
            Ok(())
        } else {
            Err("User must be logged in".into())
        }
    }
}

pub struct Admin;

#[async_trait::async_trait]
impl Guard for Admin {
    async fn check(&self, ctx: &Context<'_>) -> Result<()> {
        match ctx.data_opt::<Member>() {
            Some(user) if user.is_admin => Ok(()),
            Some(_user) => Err("Admin access required".into()),
            None => Err("User must be logged in".into()),
        }
    }
}
