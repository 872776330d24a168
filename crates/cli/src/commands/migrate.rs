use anyhow::Context as _;
use cinzagro::{CollectionRequest, WasteRequest};

use super::{Context, ExitCode};

#[derive(clap::Args)]
pub struct Args {}

pub async fn main(ctx: &Context, _args: Args) -> anyhow::Result<ExitCode> {
    let repo = ctx.repository();

    let collections = repo
        .migrate_legacy::<CollectionRequest>()
        .await
        .context("Migrating collections")?;
    let requests = repo
        .migrate_legacy::<WasteRequest>()
        .await
        .context("Migrating waste requests")?;

    println!(
        "Migrated {} collections and {} waste requests.",
        collections, requests
    );
    Ok(ExitCode::Ok)
}
