// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! NeuroSync: privacy-first wellness tracking
//!
//! Command-line access to scoring, stress prediction, mood insights,
//! simulated wearables, coping strategies and guided meditation.

use chrono::{Duration, Local, NaiveDate};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use neurosync::analysis::{analyze_mood_patterns, calculate_wellness_score, predict_stress_level};
use neurosync::coaching::{Coach, Snapshot, StrategyRequest, PERSONAS};
use neurosync::config::AppConfig;
use neurosync::garden::{guided_meditation_text, zen_wisdom, MeditationFocus};
use neurosync::journal::{process_journal_entry, JournalEntry, JournalInput};
use neurosync::llm::OpenAiClient;
use neurosync::wearable::devices;
use neurosync::wearable::{process_wearable_data, ProcessedWearable, WearableSample};
use neurosync::{NeuroSyncError, Result};

/// NeuroSync CLI - wellness tracking and coaching
#[derive(Parser, Debug)]
#[command(name = "neurosync")]
#[command(author = "Jonathan D. A. Jewell <hyperpolymath>")]
#[command(version)]
#[command(about = "Privacy-first wellness tracker with wearable insights and AI coaching", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (JSON format)
    #[arg(short, long, default_value = "config.json", global = true)]
    config: PathBuf,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable trace logging (most verbose)
    #[arg(long, global = true)]
    trace: bool,

    /// Output format for results
    #[arg(long, global = true, default_value = "text", value_parser = ["text", "json"])]
    format: String,

    /// Suppress non-essential output (quiet mode)
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Wellness score (0-100) for each record in a wearable data file
    Score {
        /// JSON file with a wearable sample or a list of samples
        file: PathBuf,
    },

    /// Predict today's stress level from the latest journal and wearable records
    Predict {
        /// JSON file with journal entries
        #[arg(short, long)]
        journal: Option<PathBuf>,

        /// JSON file with wearable samples
        #[arg(short, long)]
        wearable: Option<PathBuf>,
    },

    /// Relate mood and stress to sleep, activity and heart rate
    Insights {
        /// JSON file with journal entries
        #[arg(short, long)]
        journal: PathBuf,

        /// JSON file with wearable samples
        #[arg(short, long)]
        wearable: PathBuf,
    },

    /// Generate simulated wearable data
    Mock {
        /// Device to simulate (default from config)
        #[arg(short, long)]
        device: Option<String>,

        /// Number of days ending today
        #[arg(long, default_value = "7")]
        days: u32,

        /// Random seed (default from config, else random)
        #[arg(long)]
        seed: Option<u64>,

        /// Write samples to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List supported devices, or the data types of one device
    Devices {
        /// Device name
        device: Option<String>,
    },

    /// List coaching personas
    Personas,

    /// Print a guided meditation script
    Meditate {
        /// Duration in minutes
        #[arg(short, long, default_value = "10")]
        minutes: u32,

        /// breath, body or compassion
        #[arg(short, long, default_value = "breath")]
        focus: String,
    },

    /// Suggest coping strategies
    Strategies {
        /// Focus areas, e.g. "Anxiety" "Muscle Tension"
        #[arg(short, long, required = true)]
        focus: Vec<String>,

        /// Minutes available
        #[arg(short, long, default_value = "15")]
        time: u32,

        /// Where the strategies will be used
        #[arg(short, long, default_value = "Home")]
        environment: String,

        /// Use only built-in strategies, never the language model
        #[arg(long)]
        offline: bool,
    },

    /// Show language model status
    Status,

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },

    /// Initialize a new NeuroSync directory
    Init {
        /// Directory to initialize (default: current)
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Force overwrite existing configuration
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Generate default configuration file
    Generate {
        /// Output file path
        #[arg(short, long, default_value = "config.json")]
        output: PathBuf,
    },

    /// Validate configuration file
    Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = AppConfig::load(&cli.config)?;
    let json = cli.format == "json";
    let today = Local::now().date_naive();

    match cli.command {
        Commands::Score { file } => run_score(&file, today, json),
        Commands::Predict { journal, wearable } => run_predict(journal, wearable, today, json),
        Commands::Insights { journal, wearable } => run_insights(&journal, &wearable, today, json),
        Commands::Mock { device, days, seed, output } => {
            run_mock(&config, device, days, seed, output, today, json)
        }
        Commands::Devices { device } => run_devices(device, json),
        Commands::Personas => run_personas(json),
        Commands::Meditate { minutes, focus } => run_meditate(minutes, &focus),
        Commands::Strategies { focus, time, environment, offline } => {
            let request = StrategyRequest {
                focus_areas: focus,
                time_available: time,
                environment,
            };
            run_strategies(&config, request, offline).await
        }
        Commands::Status => run_status(&config).await,
        Commands::Config { action } => run_config_command(config, action, &cli.config),
        Commands::Init { dir, force } => run_init(dir, force),
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// A file holding either one record or a list of records
fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let value: serde_json::Value = read_json(path)?;
    let records = match value {
        serde_json::Value::Array(_) => serde_json::from_value(value)?,
        single => vec![serde_json::from_value(single)?],
    };
    Ok(records)
}

fn load_journal(path: &Path) -> Result<Vec<JournalEntry>> {
    let inputs: Vec<JournalInput> = read_records(path)?;
    let mut entries = inputs
        .into_iter()
        .map(process_journal_entry)
        .collect::<Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.date);
    debug!("Loaded {} journal entries from {:?}", entries.len(), path);
    Ok(entries)
}

fn load_wearable(path: &Path, today: NaiveDate) -> Result<Vec<ProcessedWearable>> {
    let samples: Vec<WearableSample> = read_records(path)?;
    let mut records: Vec<ProcessedWearable> = samples
        .into_iter()
        .map(|s| process_wearable_data(s, today))
        .collect();
    records.sort_by_key(|w| w.date);
    debug!("Loaded {} wearable records from {:?}", records.len(), path);
    Ok(records)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run_score(file: &Path, today: NaiveDate, json: bool) -> Result<()> {
    let records = load_wearable(file, today)?;
    let scores: Vec<(NaiveDate, u8)> = records
        .iter()
        .map(|r| (r.date, calculate_wellness_score(r)))
        .collect();

    if json {
        let out: Vec<serde_json::Value> = scores
            .iter()
            .map(|(date, score)| serde_json::json!({ "date": date, "wellness_score": score }))
            .collect();
        return print_json(&out);
    }

    for (date, score) in scores {
        println!("{}  {:>3}/100", date, score);
    }
    Ok(())
}

fn run_predict(
    journal: Option<PathBuf>,
    wearable: Option<PathBuf>,
    today: NaiveDate,
    json: bool,
) -> Result<()> {
    let entries = journal.as_deref().map(load_journal).transpose()?.unwrap_or_default();
    let records = wearable
        .as_deref()
        .map(|p| load_wearable(p, today))
        .transpose()?
        .unwrap_or_default();

    let prediction = predict_stress_level(entries.last(), records.last());
    if json {
        return print_json(&prediction);
    }

    println!("Predicted stress level: {}/10", prediction.predicted_stress_level);
    if !prediction.contributing_factors.is_empty() {
        println!("\nContributing factors:");
        for factor in &prediction.contributing_factors {
            println!("  - {} ({})", factor.factor, factor.impact);
        }
    }
    println!("\nRecommendations:");
    for rec in &prediction.recommendations {
        println!("  - {}", rec);
    }
    Ok(())
}

fn run_insights(journal: &Path, wearable: &Path, today: NaiveDate, json: bool) -> Result<()> {
    let entries = load_journal(journal)?;
    let records = load_wearable(wearable, today)?;
    let insights = analyze_mood_patterns(&entries, &records);

    if json {
        return print_json(&insights);
    }
    for insight in insights {
        println!("- {}", insight);
    }
    Ok(())
}

fn run_mock(
    config: &AppConfig,
    device: Option<String>,
    days: u32,
    seed: Option<u64>,
    output: Option<PathBuf>,
    today: NaiveDate,
    json: bool,
) -> Result<()> {
    let device = device.unwrap_or_else(|| config.wearable.default_device.clone());
    if !devices::device_list().contains(&device.as_str()) {
        return Err(NeuroSyncError::Validation(format!("unknown device: {}", device)));
    }
    if days == 0 {
        return Err(NeuroSyncError::Validation("days must be at least 1".to_string()));
    }

    let mut rng = match seed.or(config.wearable.mock_seed) {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let metrics = devices::available_data_types(&device);
    let samples: Vec<WearableSample> = (0..i64::from(days))
        .rev()
        .map(|offset| devices::mock_wearable_data(today - Duration::days(offset), &metrics, &mut rng))
        .collect();

    if let Some(path) = output {
        std::fs::write(&path, serde_json::to_string_pretty(&samples)?)?;
        info!("Wrote {} days of {} data to {:?}", days, device, path);
        return Ok(());
    }

    if json {
        return print_json(&samples);
    }
    for sample in &samples {
        let processed = process_wearable_data(sample.clone(), today);
        println!(
            "{}  HR {:>3.0}  sleep {:>4.1}h  steps {:>5}  wellness {}",
            processed.date,
            processed.metrics.avg_heart_rate,
            processed.metrics.sleep_hours,
            processed.metrics.steps,
            processed
                .wellness_score
                .map_or_else(|| "-".to_string(), |s| s.to_string()),
        );
    }
    Ok(())
}

fn run_devices(device: Option<String>, json: bool) -> Result<()> {
    let list = match &device {
        Some(name) => {
            if !devices::device_list().contains(&name.as_str()) {
                return Err(NeuroSyncError::NotFound(format!("device {}", name)));
            }
            devices::available_data_types(name)
        }
        None => devices::device_list(),
    };

    if json {
        return print_json(&list);
    }
    for item in list {
        println!("{}", item);
    }
    Ok(())
}

fn run_personas(json: bool) -> Result<()> {
    if json {
        return print_json(&PERSONAS[..]);
    }
    for persona in &PERSONAS {
        println!("{:<12} {}", persona.id, persona.name);
        println!("{:<12} {}\n", "", persona.description);
    }
    Ok(())
}

fn run_meditate(minutes: u32, focus: &str) -> Result<()> {
    if minutes == 0 {
        return Err(NeuroSyncError::Validation("minutes must be at least 1".to_string()));
    }
    let mut rng = rand::thread_rng();
    println!("{}\n", guided_meditation_text(minutes, MeditationFocus::parse(focus)));
    println!("> {}", zen_wisdom(&mut rng));
    Ok(())
}

async fn run_strategies(config: &AppConfig, request: StrategyRequest, offline: bool) -> Result<()> {
    let coach = if offline {
        Coach::offline()
    } else {
        Coach::from_config(&config.llm)?
    };
    if !coach.is_online() {
        debug!("Using built-in coping strategies");
    }

    let text = coach.coping_strategies(Snapshot::default(), &request).await;
    println!("{}", text);
    Ok(())
}

/// Run status check
async fn run_status(config: &AppConfig) -> Result<()> {
    println!("NeuroSync v{} Status", env!("CARGO_PKG_VERSION"));
    println!("======================");
    println!("Endpoint: {}", config.llm.url);
    println!("Model: {}", config.llm.model);

    match OpenAiClient::from_config(&config.llm) {
        None => {
            println!(
                "Language model: not configured (set {} or llm.api_key)",
                config.llm.api_key_env
            );
            println!("Coaching will use built-in content.");
        }
        Some(client) => {
            let client = client?;
            match client.list_models().await {
                Ok(models) => {
                    println!("Language model: reachable");
                    let available = models.iter().any(|m| m == client.model());
                    if available {
                        println!("Model '{}' available", client.model());
                    } else {
                        warn!("Model '{}' not listed by the endpoint", client.model());
                    }
                }
                Err(e) => println!("Language model: error - {}", e),
            }
        }
    }

    println!("\nDashboard: http://{}:{}", config.web.host, config.web.port);
    println!("Default device: {}", config.wearable.default_device);
    Ok(())
}

fn run_config_command(config: AppConfig, action: ConfigCommands, config_path: &Path) -> Result<()> {
    match action {
        ConfigCommands::Show => print_json(&config)?,
        ConfigCommands::Generate { output } => {
            AppConfig::default().save(&output)?;
            println!("Generated config at {:?}", output);
        }
        ConfigCommands::Validate => {
            config.validate()?;
            println!("Configuration at {:?} is valid", config_path);
            println!("  LLM endpoint: {}", config.llm.url);
            println!("  Model: {}", config.llm.model);
            println!("  Web: {}:{}", config.web.host, config.web.port);
        }
    }
    Ok(())
}

/// Initialize a new NeuroSync directory
fn run_init(dir: Option<PathBuf>, force: bool) -> Result<()> {
    let target = dir.unwrap_or_else(|| PathBuf::from("."));
    let config_path = target.join("config.json");

    if config_path.exists() && !force {
        return Err(NeuroSyncError::Config(
            "config.json already exists. Use --force to overwrite".to_string(),
        ));
    }

    std::fs::create_dir_all(&target)?;
    AppConfig::default().save(&config_path)?;

    println!("NeuroSync initialized in {:?}", target);
    println!("\nCreated:");
    println!("  - config.json");
    println!("\nNext steps:");
    println!("  1. export OPENAI_API_KEY=... (optional, enables AI coaching)");
    println!("  2. Start the dashboard: neurosync-web");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_requires_command() {
        assert!(Cli::try_parse_from(["neurosync"]).is_err());
    }

    #[test]
    fn test_cli_strategies_command() {
        let cli = Cli::try_parse_from([
            "neurosync", "strategies", "--focus", "Anxiety", "--focus", "Sleep", "--time", "5", "--offline",
        ])
        .unwrap();

        match cli.command {
            Commands::Strategies { focus, time, environment, offline } => {
                assert_eq!(focus, ["Anxiety", "Sleep"]);
                assert_eq!(time, 5);
                assert_eq!(environment, "Home");
                assert!(offline);
            }
            _ => panic!("Expected Strategies command"),
        }
    }

    #[test]
    fn test_cli_global_flags() {
        let cli = Cli::try_parse_from(["neurosync", "personas", "--format", "json", "-v"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.format, "json");
        assert!(Cli::try_parse_from(["neurosync", "personas", "--format", "xml"]).is_err());
    }

    #[test]
    fn test_read_records_accepts_single_or_list() {
        let dir = tempfile::tempdir().unwrap();
        let single = dir.path().join("one.json");
        std::fs::write(&single, r#"{"date": "2024-03-10", "steps": 9000}"#).unwrap();
        let list = dir.path().join("many.json");
        std::fs::write(&list, r#"[{"steps": 1}, {"steps": 2}]"#).unwrap();

        let one: Vec<WearableSample> = read_records(&single).unwrap();
        assert_eq!(one.len(), 1);
        assert_eq!(one[0].metrics.steps, 9000);
        let many: Vec<WearableSample> = read_records(&list).unwrap();
        assert_eq!(many.len(), 2);
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        run_init(Some(dir.path().to_path_buf()), false).unwrap();
        assert!(dir.path().join("config.json").exists());
        assert!(run_init(Some(dir.path().to_path_buf()), false).is_err());
        run_init(Some(dir.path().to_path_buf()), true).unwrap();
    }
}
