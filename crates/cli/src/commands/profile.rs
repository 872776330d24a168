use anyhow::Context as _;
use cinzagro::Label;

use super::{Context, ExitCode};

#[derive(clap::Args)]
pub struct Args {
    /// Print the profile in JSON format
    #[arg(long)]
    json: bool,
}

pub async fn main(ctx: &Context, args: Args) -> anyhow::Result<ExitCode> {
    let role = match ctx.current_role().await {
        Ok(role) => role,
        Err(code) => return Ok(code),
    };

    let session = ctx.session().await;
    let Some(user) = session.user_data().await.context("Reading profile")? else {
        eprintln!("No profile stored for this session.");
        return Ok(ExitCode::RequestUnsatisfied);
    };

    if args.json {
        println!("{}", serde_json::to_string(&user)?);
        return Ok(ExitCode::Ok);
    }

    println!("{}", user.name);
    println!(" - Tipo: {}", role.label());
    println!(" - Empresa: {}", user.company);
    println!(" - E-mail: {}", user.email);
    println!(" - Telefone: {}", user.phone);
    println!(" - Endereço: {}", user.address);
    Ok(ExitCode::Ok)
}
