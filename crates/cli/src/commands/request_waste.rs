use chrono::{NaiveDate, TimeZone, Utc};
use cinzagro::{Label, Purpose, Quantity, QuantityUnit, UserType, WasteRequestDraft, WasteType};

use super::{Context, ExitCode, format_day, report_save_error};

#[derive(clap::Args)]
pub struct Args {
    /// Kind of ash wanted, e.g. `rice_husk_ash`
    #[arg(short, long)]
    waste_type: WasteType,

    /// Desired amount, e.g. 2
    #[arg(short, long)]
    quantity: f64,

    /// One of `kg`, `ton` or `m3`
    #[arg(short, long, default_value = "kg")]
    unit: QuantityUnit,

    /// What the ash will be used for, e.g. `soil_correction`
    #[arg(short, long)]
    purpose: Purpose,

    /// Date (YYYY-MM-DD) the ash is needed by; one week from now if absent
    #[arg(long)]
    needed_by: Option<NaiveDate>,

    /// Additional information about the request
    #[arg(short, long)]
    notes: Option<String>,

    /// Print the stored record in JSON format
    #[arg(long)]
    json: bool,
}

pub async fn main(ctx: &Context, args: Args) -> anyhow::Result<ExitCode> {
    if let Err(code) = ctx.require_role(UserType::Public).await {
        return Ok(code);
    }

    // Midday local time keeps the day stable whatever the viewer's offset.
    let needed_by = match args.needed_by {
        Some(day) => {
            let Some(local) = day
                .and_hms_opt(12, 0, 0)
                .and_then(|noon| chrono_tz::America::Cuiaba.from_local_datetime(&noon).single())
            else {
                eprintln!("Invalid date: {}", day);
                return Ok(ExitCode::FaultOrArgsError);
            };
            Some(local.with_timezone(&Utc))
        }
        None => None,
    };

    let draft = WasteRequestDraft {
        waste_type: Some(args.waste_type),
        quantity: Some(Quantity::new(args.quantity, args.unit)),
        purpose: Some(args.purpose),
        needed_by,
        notes: args.notes,
    };

    let request = match ctx.repository().submit_waste_request(draft, Utc::now()).await {
        Ok(request) => request,
        Err(e) => return Ok(report_save_error(e)),
    };

    if args.json {
        println!("{}", serde_json::to_string(&request)?);
    } else {
        println!(
            "Solicitação {} enviada: {} de {} para {} até {} ({})",
            request.request_number,
            request.requested_quantity,
            request.waste_type.label(),
            request.purpose.label(),
            format_day(&request.needed_by),
            request.id
        );
        println!("Você receberá uma confirmação em breve.");
    }
    Ok(ExitCode::Ok)
}
