use cinzagro::{Label, UserType};

use super::{Context, ExitCode};

#[derive(clap::Args)]
pub struct Args {
    /// E-mail address shown on the profile
    #[arg(short, long)]
    pub email: String,

    /// Any non-blank password is accepted
    #[arg(short, long)]
    pub password: String,

    /// Either `industry` or `public`
    #[arg(short = 't', long)]
    pub user_type: UserType,
}

pub async fn main(ctx: &Context, args: Args) -> anyhow::Result<ExitCode> {
    let mut session = ctx.session().await;

    match session
        .login(&args.email, &args.password, args.user_type)
        .await
    {
        Ok(()) => {
            println!("Logged in as {} ({})", args.email, args.user_type.label());
            Ok(ExitCode::Ok)
        }
        Err(cinzagro::Error::Validation(msg)) => {
            eprintln!("Por favor, preencha todos os campos: {}", msg);
            Ok(ExitCode::FaultOrArgsError)
        }
        Err(e) => {
            log::debug!("Login failed: {:?}", e);
            eprintln!("Falha ao fazer login. Tente novamente.");
            Ok(ExitCode::FaultOrArgsError)
        }
    }
}
