mod output;

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use utilityrates_lib::{aggregate, reconcile, PacedClient, PacingConfig, ReferenceData};

/// Where state files and the national rollup land, relative to the
/// working directory.
const OUTPUT_DIR: &str = "data/utilities";

#[derive(Parser)]
#[command(name = "utilityrates")]
#[command(about = "Fetch and reconcile US residential utility rates from the OpenEI USURDB API")]
struct Cli {
    /// OpenEI (NREL) API key
    api_key: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("utilityrates_cli=info".parse().unwrap())
                .add_directive("utilityrates_lib=info".parse().unwrap()),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let reference = ReferenceData::builtin();
    let client = PacedClient::new(&cli.api_key, PacingConfig::default());
    let out_dir = std::path::Path::new(OUTPUT_DIR);

    let states = reference.states();
    let bar = ProgressBar::new(states.len() as u64);
    bar.set_style(ProgressStyle::with_template(
        "[{pos}/{len}] {msg} {wide_bar}",
    )?);

    let mut summaries = Vec::new();
    for state in &states {
        bar.set_message(format!("processing {}", state));
        let today = Utc::now().date_naive();
        let utilities = reconcile::reconcile_state(&client, &reference, state, today).await;
        let summary = aggregate::summarize_state(state, utilities, &reference, Utc::now());
        let path = output::write_state_file(out_dir, &summary)?;
        tracing::info!(
            "{}: {} utilities, avg rate ${}/kWh -> {}",
            state,
            summary.utility_count,
            summary.avg_residential_rate,
            path.display()
        );
        summaries.push(summary);
        bar.inc(1);
    }
    bar.finish_and_clear();

    let national = aggregate::summarize_national(&summaries, &reference, Utc::now());
    let path = output::write_national_file(out_dir, &national)?;
    tracing::info!(
        "complete: {} utilities across {} states, national avg ${}/kWh -> {}",
        national.total_utilities,
        national.states_covered,
        national.national_avg_rate,
        path.display()
    );

    Ok(())
}
