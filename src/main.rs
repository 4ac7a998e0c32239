use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use finops_anomaly::logging::init_logging;
use finops_anomaly::{
    AnomalyDetector, AnomalyReport, AnomalyService, AppConfig, Explainer, JsonFileSource,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(
    name = "finops-anomaly",
    version,
    about = "Detect and explain anomalies in daily cloud cost series"
)]
struct Cli {
    /// Configuration file (defaults to finops-anomaly.toml / config.toml if present)
    #[arg(long, global = true, env = "FINOPS_CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Override the configured log level
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run detection over a JSON cost series
    Detect {
        /// JSON array of {"date": "YYYY-MM-DD", "value": number}
        #[arg(short, long)]
        input: PathBuf,

        /// Minimum |z-score| reported (overrides the configuration)
        #[arg(short, long)]
        threshold: Option<f64>,

        /// Explain the most severe anomalies
        #[arg(long)]
        explain: bool,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Write a sample configuration file
    InitConfig {
        #[arg(short, long, default_value = "finops-anomaly.toml.example")]
        output: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::InitConfig { output } => {
            AppConfig::generate_sample_config(&output)
                .with_context(|| format!("failed to write {}", output.display()))?;
            println!("Sample configuration written to {}", output.display());
        }
        Command::Detect {
            input,
            threshold,
            explain,
            format,
        } => {
            let config =
                AppConfig::load(cli.config.as_deref()).context("failed to load configuration")?;

            let mut log_config = config.log_config();
            if let Some(level) = cli.log_level {
                log_config = log_config.with_level(level);
            }
            let _guard = init_logging(&log_config)?;

            let detector = match threshold {
                Some(threshold) => AnomalyDetector::new(threshold)
                    .with_thresholds(config.detection.severity_thresholds()),
                None => config.detector(),
            };

            let explainer = Explainer::from_provider_configs(
                &config.providers.ordered(),
                config.explainer_config(),
            )
            .context("failed to configure explanation providers")?;

            let service = AnomalyService::new(
                Arc::new(JsonFileSource::new(input)),
                detector,
                Arc::new(explainer),
            )
            .with_explain_limit(config.detection.explain_limit);

            let report = if explain {
                service.detect_with_explanations().await?
            } else {
                service.detect().await?
            };

            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
                OutputFormat::Text => print_report(&report),
            }
        }
    }

    Ok(())
}

fn print_report(report: &AnomalyReport) {
    println!(
        "{} anomalies in {} points (threshold |z| >= {})",
        report.anomalies.len(),
        report.point_count,
        report.threshold
    );

    for item in &report.anomalies {
        let anomaly = &item.anomaly;
        println!(
            "[{:<8}] {} {:<5} ${:.2} (z={:.2}, {:+.1}% vs mean ${:.2})",
            anomaly.severity,
            anomaly.date,
            anomaly.anomaly_type,
            anomaly.value,
            anomaly.z_score,
            anomaly.deviation_percent,
            anomaly.mean
        );

        if let Some(ref explanation) = item.explanation {
            println!("    {}: {}", explanation.source, explanation.text);
        }
    }
}
