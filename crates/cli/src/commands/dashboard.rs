use cinzagro::{
    CollectionCounts, CollectionRequest, Label, UserType, WasteRequest, WasteRequestCounts,
};
use serde::Serialize;

use super::{Context, ExitCode, format_day};

#[derive(clap::Args)]
pub struct Args {
    /// Prints the counters and records at once in JSON format
    #[arg(long)]
    json: bool,

    /// Exit with code 2 when there is nothing to list
    #[arg(long)]
    require_any: bool,
}

#[derive(Serialize)]
struct Dashboard<C, R> {
    counts: C,
    records: Vec<R>,
}

fn collection_summary(counts: &CollectionCounts) -> String {
    format!(
        "Pendentes: {} | Agendadas: {} | Concluídas: {} | Canceladas: {} | Total: {}",
        counts.pending,
        counts.scheduled,
        counts.completed,
        counts.canceled,
        counts.total()
    )
}

fn request_summary(counts: &WasteRequestCounts) -> String {
    format!(
        "Pendentes: {} | Aprovadas: {} | Entregues: {} | Canceladas: {} | Total: {}",
        counts.pending,
        counts.approved,
        counts.delivered,
        counts.canceled,
        counts.total()
    )
}

fn print_collections(collections: &[CollectionRequest]) {
    println!(
        "{}",
        collection_summary(&CollectionCounts::from_records(collections))
    );
    println!();

    if collections.is_empty() {
        println!("Nenhuma coleta solicitada ainda.");
        return;
    }

    println!(
        "{:<14} | {:<9} | {:<10} | {:<30} | {:<12} | {}",
        "ID", "Number", "Date", "Waste", "Quantity", "Status"
    );
    for c in collections.iter().rev() {
        println!(
            "{:<14} | {:<9} | {:<10} | {:<30} | {:<12} | {}",
            c.id,
            c.request_number,
            format_day(&c.request_date),
            c.waste_type.label(),
            c.estimated_quantity,
            c.status.label()
        );
    }
}

fn print_requests(requests: &[WasteRequest]) {
    println!(
        "{}",
        request_summary(&WasteRequestCounts::from_records(requests))
    );
    println!();

    if requests.is_empty() {
        println!("Nenhuma solicitação de resíduos ainda.");
        return;
    }

    println!(
        "{:<14} | {:<9} | {:<10} | {:<30} | {:<12} | {:<10} | {}",
        "ID", "Number", "Needed by", "Waste", "Quantity", "Status", "Purpose"
    );
    for r in requests.iter().rev() {
        println!(
            "{:<14} | {:<9} | {:<10} | {:<30} | {:<12} | {:<10} | {}",
            r.id,
            r.request_number,
            format_day(&r.needed_by),
            r.waste_type.label(),
            r.requested_quantity,
            r.status.label(),
            r.purpose.label()
        );
    }
}

pub async fn main(ctx: &Context, args: Args) -> anyhow::Result<ExitCode> {
    let role = match ctx.current_role().await {
        Ok(role) => role,
        Err(code) => return Ok(code),
    };

    let repo = ctx.repository();
    let session = ctx.session().await;
    let user = session.user_data().await.unwrap_or_else(|e| {
        log::warn!("Could not read profile: {}", e);
        None
    });

    let is_empty = match role {
        UserType::Industry => {
            let collections = repo.load_all_or_empty::<CollectionRequest>().await;
            let is_empty = collections.is_empty();
            if args.json {
                println!(
                    "{}",
                    serde_json::to_string(&Dashboard {
                        counts: CollectionCounts::from_records(&collections),
                        records: collections,
                    })?
                );
            } else {
                let company = user.as_ref().map_or("Empresa", |u| u.company.as_str());
                println!("{}", company);
                print_collections(&collections);
            }
            is_empty
        }
        UserType::Public => {
            let requests = repo.load_all_or_empty::<WasteRequest>().await;
            let is_empty = requests.is_empty();
            if args.json {
                println!(
                    "{}",
                    serde_json::to_string(&Dashboard {
                        counts: WasteRequestCounts::from_records(&requests),
                        records: requests,
                    })?
                );
            } else {
                let company = user.as_ref().map_or("Órgão Público", |u| u.company.as_str());
                println!("{}", company);
                print_requests(&requests);
            }
            is_empty
        }
    };

    if is_empty && args.require_any {
        Ok(ExitCode::RequestUnsatisfied)
    } else {
        Ok(ExitCode::Ok)
    }
}
