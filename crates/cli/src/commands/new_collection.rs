use chrono::Utc;
use cinzagro::{CollectionDraft, Label, Quantity, QuantityUnit, UserType, WasteType};

use super::{Context, ExitCode, report_save_error};

#[derive(clap::Args)]
pub struct Args {
    /// Kind of ash to be collected, e.g. `biomass_ash`
    #[arg(short, long)]
    waste_type: WasteType,

    /// Estimated amount, e.g. 500
    #[arg(short, long)]
    quantity: f64,

    /// One of `kg`, `ton` or `m3`
    #[arg(short, long, default_value = "kg")]
    unit: QuantityUnit,

    /// Additional information about the ash
    #[arg(short, long)]
    notes: Option<String>,

    /// Print the stored record in JSON format
    #[arg(long)]
    json: bool,
}

pub async fn main(ctx: &Context, args: Args) -> anyhow::Result<ExitCode> {
    if let Err(code) = ctx.require_role(UserType::Industry).await {
        return Ok(code);
    }

    let draft = CollectionDraft {
        waste_type: Some(args.waste_type),
        quantity: Some(Quantity::new(args.quantity, args.unit)),
        notes: args.notes,
    };

    let collection = match ctx.repository().submit_collection(draft, Utc::now()).await {
        Ok(collection) => collection,
        Err(e) => return Ok(report_save_error(e)),
    };

    if args.json {
        println!("{}", serde_json::to_string(&collection)?);
    } else {
        println!(
            "Solicitação {} enviada: {} de {} ({})",
            collection.request_number,
            collection.estimated_quantity,
            collection.waste_type.label(),
            collection.id
        );
        println!("Você receberá uma confirmação em breve.");
    }
    Ok(ExitCode::Ok)
}
