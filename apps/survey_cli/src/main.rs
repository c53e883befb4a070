use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use shared::{
    domain::{field_options, Rating, FIELD_NAMES, REQUIRED_FIELDS},
    protocol::SubmissionOutcome,
};
use survey_client::{FormController, HttpRelayTransport};
use tracing_subscriber::EnvFilter;

const THANK_YOU: &str =
    "Thank You! Your feedback will help us create better travel experiences in Varanasi.";

/// Fill in the Varanasi travel experience survey and send it to a relay.
#[derive(Parser, Debug)]
struct Args {
    /// Base URL of the survey relay.
    #[arg(long, env = "SURVEY_RELAY_URL", default_value = "http://127.0.0.1:3000")]
    relay_url: String,
    /// Answer in `field=value` form. Repeat `importantServices=...` to pick several services.
    #[arg(long = "field", value_name = "FIELD=VALUE", value_parser = parse_assignment)]
    fields: Vec<(String, String)>,
    /// Overall experience rating, 1 to 5.
    #[arg(long)]
    rating: Option<u8>,
    /// Print the JSON payload instead of submitting it.
    #[arg(long)]
    dry_run: bool,
    /// List every question with its accepted answers.
    #[arg(long)]
    options: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();
    let args = Args::parse();

    if args.options {
        print_options();
        return Ok(());
    }

    let transport = HttpRelayTransport::new(&args.relay_url)?;
    let controller = FormController::new(Arc::new(transport));

    for (field, value) in &args.fields {
        controller
            .update_field(field, value)
            .await
            .with_context(|| format!("cannot set {field}"))?;
    }
    if let Some(rating) = args.rating {
        controller.set_rating(rating).await?;
    }

    let record = controller.record().await;
    if record.overall_rating.is_set() {
        println!("{}", rating_bar(record.overall_rating));
    }

    if args.dry_run {
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(());
    }

    match controller.submit().await? {
        SubmissionOutcome::Success => {
            println!("{THANK_YOU}");
            Ok(())
        }
        SubmissionOutcome::Failure { message } => bail!(message),
    }
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    let (field, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=VALUE, got `{raw}`"))?;
    let field = field.trim();
    if !FIELD_NAMES.contains(&field) {
        return Err(format!(
            "unknown field `{field}`; run with --options to list fields"
        ));
    }
    Ok((field.to_string(), value.to_string()))
}

fn rating_bar(rating: Rating) -> String {
    let stars: String = rating
        .levels()
        .iter()
        .map(|lit| if *lit { '★' } else { '☆' })
        .collect();
    format!("{stars}  You rated: {}/{}", rating.value(), Rating::MAX)
}

fn print_options() {
    for field in FIELD_NAMES {
        let marker = if REQUIRED_FIELDS.contains(field) { " *" } else { "" };
        println!("{field}{marker}");
        match field_options(field) {
            Some(options) => {
                for (value, label) in options {
                    if value == label {
                        println!("    {value}");
                    } else {
                        println!("    {value:<14} {label}");
                    }
                }
            }
            None if *field == "overallRating" => println!("    1-5"),
            None => println!("    (free text)"),
        }
    }
}
