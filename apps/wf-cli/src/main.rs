use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use wf_app::circuit_io::{interpretation_to_summary, summarize_document};
use wf_app::sequence_io::rows_from_section;
use wf_app::{AppError, AppResult, AppSettings, SETTINGS_FILE};
use wf_project::{load_json, validate_document};
use wf_sequence::{format_tick, layout, tick_interval};

#[derive(Parser)]
#[command(name = "wf-cli")]
#[command(about = "Washflow CLI - inspect washing installation configurations", long_about = None)]
struct Cli {
    /// Settings file (defaults to washflow.yaml in the working directory)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a saved configuration
    Validate {
        /// Path to the configuration JSON file
        path: PathBuf,
    },
    /// Recompute the connection summary from the saved circuits
    Summary {
        /// Path to the configuration JSON file
        path: PathBuf,
        /// Report differences from the stored summary as an error
        #[arg(long)]
        check: bool,
    },
    /// Print the activation timeline
    Timeline {
        /// Path to the configuration JSON file
        path: PathBuf,
    },
}

fn main() -> AppResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let settings_path = cli
        .settings
        .unwrap_or_else(|| PathBuf::from(SETTINGS_FILE));
    let settings = AppSettings::load_or_default(&settings_path);

    match cli.command {
        Commands::Validate { path } => cmd_validate(&path),
        Commands::Summary { path, check } => cmd_summary(&path, &settings, check),
        Commands::Timeline { path } => cmd_timeline(&path),
    }
}

fn cmd_validate(path: &Path) -> AppResult<()> {
    println!("Validating configuration: {}", path.display());
    let file = load_json(path)?;
    validate_document(&file.configuration)?;
    let config = &file.configuration;
    println!("✓ Configuration is valid");
    println!("  Saved: {}", file.timestamp);
    println!("  Washing components: {}", config.washing_components.len());
    println!("  Pumps: {}", config.pumps.len());
    println!(
        "  Tasks: {}",
        config.sequences.sequence_configuration.tasks.len()
    );
    Ok(())
}

fn cmd_summary(path: &Path, settings: &AppSettings, check: bool) -> AppResult<()> {
    let file = load_json(path)?;
    let interpretations = summarize_document(&file.configuration, settings);

    if interpretations.is_empty() {
        println!("No circuits in configuration");
        return Ok(());
    }

    for interp in &interpretations {
        println!(
            "Pump {} - {} ({})",
            interp.pump_index + 1,
            interp.pump_name,
            interp.pump_id
        );
        if interp.outputs.is_empty() {
            println!("  (no outputs connected)");
        }
        for (output, reached) in &interp.outputs {
            let names: Vec<&str> = reached.iter().map(|c| c.name.as_str()).collect();
            println!("  Output {}: {}", output, names.join(", "));
        }
        for issue in &interp.issues {
            println!("  ! {}", issue);
        }
    }

    if check {
        let stored = &file.configuration.circuits.connection_summary;
        let recomputed: Vec<_> = interpretations.iter().map(interpretation_to_summary).collect();
        if *stored != recomputed {
            return Err(AppError::InvalidState(
                "stored connection summary differs from the circuits".to_string(),
            ));
        }
        println!("✓ Stored summary matches the circuits");
    }
    Ok(())
}

fn cmd_timeline(path: &Path) -> AppResult<()> {
    let file = load_json(path)?;
    let rows = rows_from_section(&file.configuration.sequences);
    let timeline = layout(&rows);

    if timeline.is_empty() {
        println!("No timed tasks in configuration");
        return Ok(());
    }

    let interval = tick_interval(timeline.total_duration_s);
    println!(
        "{:<24} {:>5} {:>6} {:>3} {:>10} {:>10}",
        "Task", "Pump", "Output", "Pri", "Start", "End"
    );
    for span in &timeline.spans {
        println!(
            "{:<24} {:>5} {:>6} {:>3} {:>10} {:>10}",
            span.label,
            span.pump_index + 1,
            span.output_index,
            span.priority.tag(),
            format_tick(span.start_s, interval),
            format_tick(span.end_s, interval),
        );
    }
    for (pump, total) in &timeline.pump_totals {
        println!("Pump {} total: {}", pump + 1, format_tick(*total, interval));
    }
    println!(
        "Total duration: {}",
        format_tick(timeline.total_duration_s, interval)
    );
    let scale: Vec<String> = timeline
        .ticks()
        .iter()
        .map(|t| format_tick(*t, interval))
        .collect();
    println!("Scale: {}", scale.join(" | "));
    Ok(())
}
