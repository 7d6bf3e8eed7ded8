use clap::Parser;
use loan_obligation_tracker::{
    config::TrackerConfig,
    models::{ExtractionReport, Obligation},
    reader::read_file_content,
    tracker::ObligationTracker,
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DESCRIPTION_WIDTH: usize = 100;

/// Extract and score borrower obligations from a loan agreement
#[derive(Debug, Parser)]
#[command(name = "tracker", version)]
struct Cli {
    /// Agreement text file
    file: PathBuf,

    /// Print the full report as JSON
    #[arg(long)]
    json: bool,

    /// Snapshot file, instead of TRACKER_SNAPSHOT_PATH
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Skip writing the snapshot
    #[arg(long, conflicts_with = "snapshot")]
    no_snapshot: bool,

    /// Days ahead of a deadline that count as due soon
    #[arg(long)]
    due_soon_days: Option<u32>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = TrackerConfig::from_env()?;
    if let Some(days) = cli.due_soon_days {
        config.due_soon_days = i64::from(days);
    }
    if let Some(path) = cli.snapshot {
        config.snapshot_path = path;
    }

    let text = read_file_content(&cli.file).await?;
    let tracker = ObligationTracker::new(config)?;
    let report = tracker.run(&text);

    if !cli.no_snapshot {
        let path = tracker.save_snapshot(&report.obligations)?;
        info!(path = %path.display(), "Snapshot saved");
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

fn print_report(report: &ExtractionReport) {
    let summary = &report.summary;

    println!("\n=== LOAN OBLIGATIONS ({}) ===", report.generated_on);
    println!(
        "{:<7} {:<19} {:<12} {:<15} {:<7} {:<10} Description",
        "ID", "Type", "Frequency", "Next Deadline", "Risk", "Status"
    );
    for obligation in &report.obligations {
        print_row(obligation);
    }

    println!("\n=== COMPLIANCE SUMMARY ===");
    println!("Total obligations: {}", summary.total);
    println!("Compliant:         {}", summary.compliant);
    println!("Due Soon:          {}", summary.due_soon);
    println!("Missed:            {}", summary.missed);
    println!("High risk:         {}", summary.high_risk);
    println!(
        "Risk distribution: High {} / Medium {} / Low {}",
        summary.risk_distribution.high,
        summary.risk_distribution.medium,
        summary.risk_distribution.low
    );

    if !report.upcoming.is_empty() {
        println!("\n=== UPCOMING DEADLINES ===");
        for obligation in &report.upcoming {
            println!(
                "  {} ({}): {}",
                obligation.next_deadline, obligation.deadline_rule, obligation.description
            );
        }
    }
}

fn print_row(obligation: &Obligation) {
    println!(
        "{:<7} {:<19} {:<12} {:<15} {:<7} {:<10} {}",
        obligation.id,
        obligation.obligation_type.to_string(),
        obligation.frequency.to_string(),
        obligation.next_deadline.to_string(),
        obligation.risk_category.to_string(),
        obligation.compliance_status.to_string(),
        truncate(&obligation.description, DESCRIPTION_WIDTH)
    );
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() > width {
        let head: String = text.chars().take(width).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}
