use std::sync::Arc;

use anyhow::{Context, bail};
use clap::Parser;
use invite::{Attending, GateStrategy};
use wedding::{HttpApi, Phase, RsvpWorkflow};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    #[arg(long, default_value = "http://127.0.0.1:1111")]
    base_url: String,

    /// Gate the backend runs: names or pin.
    #[arg(long, default_value = "names")]
    gate: GateStrategy,

    /// Guest name, or the PIN when the backend runs the PIN gate.
    #[arg(long)]
    name: String,

    /// Name written on the form when using the PIN gate.
    #[arg(long)]
    guest_name: Option<String>,

    #[arg(long)]
    email: String,

    #[arg(long)]
    attending: Attending,

    #[arg(long)]
    special_requests: Option<String>,

    #[arg(long)]
    well_wishes: Option<String>,
}

fn show(workflow: &RsvpWorkflow) {
    println!("Phase: {:?}", workflow.phase());
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let api = HttpApi::new(&args.base_url, args.gate).context("building client")?;
    let mut workflow = RsvpWorkflow::new(Arc::new(api));
    show(&workflow);

    workflow.open()?;
    show(&workflow);

    workflow.edit_candidate(&args.name)?;
    if args.gate == GateStrategy::Names {
        let suggestions = workflow.suggestions().settled().await.to_vec();
        println!("Suggestions: {suggestions:?}");
    }

    workflow.submit_gate().await?;
    show(&workflow);

    if let Phase::GateError(failure) = workflow.phase() {
        bail!("gate refused: {:?}: {}", failure.kind, failure.message);
    }

    let form = workflow.form_mut();
    if let Some(guest_name) = args.guest_name {
        form.name = guest_name;
    }
    form.email = args.email;
    form.attending = args.attending;
    form.special_requests = args.special_requests.unwrap_or_default();
    form.well_wishes = args.well_wishes.unwrap_or_default();
    println!("Submitting: {:?}", workflow.form().to_submission());

    workflow.submit().await?;
    show(&workflow);

    match workflow.phase() {
        Phase::Success { email_sent: true } => println!("RSVP recorded, confirmation sent"),
        Phase::Success { email_sent: false } => {
            println!("RSVP recorded, but the confirmation email failed")
        }
        Phase::Error(message) => bail!("submit failed: {message}"),
        other => bail!("unexpected phase {other:?}"),
    }

    Ok(())
}
