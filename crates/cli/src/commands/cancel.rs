use cinzagro::{CollectionRequest, Error, Label, RecordId, UserType, WasteRequest};

use super::{Context, ExitCode};

#[derive(clap::Args)]
pub struct Args {
    /// ID of the pending record to cancel
    pub id: String,
}

pub async fn main(ctx: &Context, args: Args) -> anyhow::Result<ExitCode> {
    let role = match ctx.current_role().await {
        Ok(role) => role,
        Err(code) => return Ok(code),
    };

    let repo = ctx.repository();
    let id = RecordId(args.id);

    let result = match role {
        UserType::Industry => repo
            .cancel::<CollectionRequest>(&id)
            .await
            .map(|c| (c.request_number, c.status.label())),
        UserType::Public => repo
            .cancel::<WasteRequest>(&id)
            .await
            .map(|r| (r.request_number, r.status.label())),
    };

    match result {
        Ok((number, status)) => {
            println!("Solicitação {} agora está: {}", number, status);
            Ok(ExitCode::Ok)
        }
        Err(Error::NotFound(_)) => {
            eprintln!("No record with ID {}", id);
            Ok(ExitCode::RequestUnsatisfied)
        }
        Err(Error::InvalidTransition { from, .. }) => {
            eprintln!("Only pending requests can be canceled (current status: {}).", from);
            Ok(ExitCode::RequestUnsatisfied)
        }
        Err(e) => Err(e.into()),
    }
}
