use anyhow::Context as _;

use super::{Context, ExitCode};

#[derive(clap::Args)]
pub struct Args {}

pub async fn main(ctx: &Context, _args: Args) -> anyhow::Result<ExitCode> {
    let mut session = ctx.session().await;
    if !session.is_logged_in() {
        eprintln!("Not logged in.");
        return Ok(ExitCode::RequestUnsatisfied);
    }

    session.logout().await.context("Ending session")?;
    println!("Logged out.");
    Ok(ExitCode::Ok)
}
