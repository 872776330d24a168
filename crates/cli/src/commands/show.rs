use anyhow::Context as _;
use cinzagro::{CollectionRequest, Label, RecordId, TimelineStep, UserType, WasteRequest};

use super::{Context, ExitCode, format_date, format_day};

#[derive(clap::Args)]
pub struct Args {
    /// ID of the record, as listed by `dashboard`
    pub id: String,

    /// Print the record in JSON format
    #[arg(long)]
    json: bool,
}

fn print_timeline(steps: &[TimelineStep]) {
    println!(" - Andamento:");
    for step in steps {
        let mark = if step.reached { "x" } else { " " };
        let when = step
            .date
            .as_ref()
            .map(format_date)
            .unwrap_or_else(|| step.placeholder.to_string());
        println!("   [{}] {}: {}", mark, step.title, when);
    }
}

fn print_notes(notes: &Option<String>) {
    let notes = notes
        .as_deref()
        .filter(|n| !n.is_empty())
        .unwrap_or("Nenhuma observação fornecida.");
    println!(" - Observações: {}", notes);
}

fn print_collection(c: &CollectionRequest) {
    println!("Solicitação {} ({})", c.request_number, c.status.label());
    println!(" - ID: {}", c.id);
    println!(" - Resíduo: {}", c.waste_type.label());
    println!(" - Quantidade estimada: {}", c.estimated_quantity);
    println!(" - Data da solicitação: {}", format_date(&c.request_date));
    print_notes(&c.notes);
    println!(" - Empresa: {}", c.company_name);
    println!(" - Local: {}", c.location);
    print_timeline(&c.timeline());
}

fn print_request(r: &WasteRequest) {
    println!("Solicitação {} ({})", r.request_number, r.status.label());
    println!(" - ID: {}", r.id);
    println!(" - Resíduo: {}", r.waste_type.label());
    println!(" - Quantidade: {}", r.requested_quantity);
    println!(" - Finalidade: {}", r.purpose.label());
    println!(" - Necessário até: {}", format_day(&r.needed_by));
    println!(" - Data da solicitação: {}", format_date(&r.request_date));
    print_notes(&r.notes);
    println!(" - Órgão: {}", r.organization_name);
    println!(" - Local: {}", r.location);
    print_timeline(&r.timeline());
}

pub async fn main(ctx: &Context, args: Args) -> anyhow::Result<ExitCode> {
    let role = match ctx.current_role().await {
        Ok(role) => role,
        Err(code) => return Ok(code),
    };

    let repo = ctx.repository();
    let id = RecordId(args.id);

    let found = match role {
        UserType::Industry => repo
            .find::<CollectionRequest>(&id)
            .await
            .context("Loading collection")?
            .map(|c| {
                if args.json {
                    serde_json::to_string(&c).map(|json| println!("{}", json))
                } else {
                    print_collection(&c);
                    Ok(())
                }
            }),
        UserType::Public => repo
            .find::<WasteRequest>(&id)
            .await
            .context("Loading waste request")?
            .map(|r| {
                if args.json {
                    serde_json::to_string(&r).map(|json| println!("{}", json))
                } else {
                    print_request(&r);
                    Ok(())
                }
            }),
    };

    match found {
        Some(printed) => {
            printed?;
            Ok(ExitCode::Ok)
        }
        None => {
            eprintln!("No record with ID {}", id);
            Ok(ExitCode::RequestUnsatisfied)
        }
    }
}
