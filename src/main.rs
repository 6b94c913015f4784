//! DiabetaLens CLI
//!
//! Diabetes risk forecasting from age, BMI and daily steps.

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use diabetalens::{
    classifier::{FixedTierClassifier, LogisticTierClassifier, TierClassifier},
    config::Config,
    core::{ActivityClassifier, BaselineRiskModel, FutureStepsProjector, RiskPipeline},
    MEDICAL_DISCLAIMER, VERSION,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "diabetalens")]
#[command(version = VERSION)]
#[command(about = "Diabetes risk forecasting from age, BMI and daily steps", long_about = None)]
struct Cli {
    /// Use this config file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct StepArgs {
    /// Daily step counts, comma-separated
    #[arg(long, conflicts_with = "steps_file")]
    steps: Option<String>,

    /// JSON file holding an array of daily step counts
    #[arg(long)]
    steps_file: Option<PathBuf>,
}

#[derive(Args)]
struct ProfileArgs {
    /// Age in years
    #[arg(long)]
    age: i64,

    /// Body mass index
    #[arg(long)]
    bmi: f64,

    #[command(flatten)]
    steps: StepArgs,
}

#[derive(Args)]
struct ClassifierArgs {
    /// Logistic tier model (JSON); overrides classifier.model_path
    #[arg(long, conflicts_with = "probability")]
    model: Option<PathBuf>,

    /// Use a fixed tier probability instead of a model
    #[arg(long)]
    probability: Option<f64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Assess diabetes risk over 1, 3 and 6 months
    Assess {
        #[command(flatten)]
        profile: ProfileArgs,

        #[command(flatten)]
        classifier: ClassifierArgs,
    },

    /// Show the age-only baseline risk
    Baseline {
        /// Age in years
        age: f64,
    },

    /// Classify activity level from daily steps
    Activity {
        #[command(flatten)]
        steps: StepArgs,
    },

    /// Project the 28-day step pattern forward
    Forecast {
        #[command(flatten)]
        steps: StepArgs,

        /// Days below this step count are sedentary
        #[arg(long)]
        threshold: Option<i64>,
    },

    /// Assess, then ask the recommendation service for advice
    #[cfg(feature = "advisor")]
    Advise {
        #[command(flatten)]
        profile: ProfileArgs,

        #[command(flatten)]
        classifier: ClassifierArgs,

        /// Recommendation kinds (comprehensive, activity, risk_explanation)
        #[arg(
            long,
            value_delimiter = ',',
            default_value = "comprehensive,activity,risk_explanation"
        )]
        kinds: Vec<String>,

        /// API key (falls back to DIABETALENS_API_KEY)
        #[arg(long)]
        api_key: Option<String>,
    },

    /// Serve the risk API over HTTP
    #[cfg(feature = "server")]
    Serve {
        /// Port to bind (defaults to server.port)
        #[arg(long)]
        port: Option<u16>,

        #[command(flatten)]
        classifier: ClassifierArgs,

        /// API key for recommendations (falls back to DIABETALENS_API_KEY)
        #[arg(long)]
        api_key: Option<String>,
    },

    /// Show configuration
    Config {
        /// Write the current configuration to the config file
        #[arg(long)]
        save: bool,
    },

    /// Display the medical disclaimer
    Disclaimer,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(Config::config_path);
    let config = Config::load_from(&config_path)
        .with_context(|| format!("Failed to load config from {config_path:?}"))?;

    match cli.command {
        Commands::Assess {
            profile,
            classifier,
        } => cmd_assess(&config, profile, classifier),
        Commands::Baseline { age } => cmd_baseline(age),
        Commands::Activity { steps } => cmd_activity(steps),
        Commands::Forecast { steps, threshold } => cmd_forecast(&config, steps, threshold),
        #[cfg(feature = "advisor")]
        Commands::Advise {
            profile,
            classifier,
            kinds,
            api_key,
        } => cmd_advise(&config, profile, classifier, &kinds, api_key),
        #[cfg(feature = "server")]
        Commands::Serve {
            port,
            classifier,
            api_key,
        } => cmd_serve(&config, port, classifier, api_key),
        Commands::Config { save } => cmd_config(&config, &config_path, save),
        Commands::Disclaimer => {
            println!("{MEDICAL_DISCLAIMER}");
            Ok(())
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_assess(
    config: &Config,
    profile: ProfileArgs,
    classifier: ClassifierArgs,
) -> anyhow::Result<()> {
    let pipeline = build_pipeline(config, &classifier)?;
    let steps = read_steps(&profile.steps)?;
    let assessment = pipeline.calculate(profile.age, profile.bmi, steps)?;
    print_json(&assessment)
}

fn cmd_baseline(age: f64) -> anyhow::Result<()> {
    let info = BaselineRiskModel::new().age_group_info(age)?;
    print_json(&info)
}

fn cmd_activity(steps: StepArgs) -> anyhow::Result<()> {
    let steps = read_steps(&steps)?;
    let summary = ActivityClassifier::new().classify(&steps)?;
    print_json(&summary)
}

fn cmd_forecast(config: &Config, steps: StepArgs, threshold: Option<i64>) -> anyhow::Result<()> {
    let steps = read_steps(&steps)?;
    let projector =
        FutureStepsProjector::new(threshold.unwrap_or(config.pipeline.sedentary_threshold));

    let projection = projector.project(&steps)?;
    let summary = projector.summary(&steps)?;
    print_json(&serde_json::json!({
        "past_window": summary,
        "avg_daily_steps": projection.avg_daily_steps,
        "sedentary_threshold": projection.sedentary_threshold,
        "days_below_threshold": {
            "1_month": projection.one_month.days_below_threshold,
            "3_month": projection.three_months.days_below_threshold,
            "6_month": projection.six_months.days_below_threshold,
        },
    }))
}

#[cfg(feature = "advisor")]
fn cmd_advise(
    config: &Config,
    profile: ProfileArgs,
    classifier: ClassifierArgs,
    kinds: &[String],
    api_key: Option<String>,
) -> anyhow::Result<()> {
    use diabetalens::advisor::{
        generate_recommendations, AdvisorClient, AdvisorConfig, RecommendationKind,
    };

    let kinds = kinds
        .iter()
        .map(|k| k.parse::<RecommendationKind>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(anyhow::Error::msg)?;

    let api_key = resolve_api_key(api_key)
        .context("No API key: pass --api-key or set DIABETALENS_API_KEY")?;
    let client = AdvisorClient::new(AdvisorConfig::new(&config.advisor, api_key))?;

    let pipeline = build_pipeline(config, &classifier)?;
    let steps = read_steps(&profile.steps)?;
    let assessment = pipeline.calculate(profile.age, profile.bmi, steps)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to create runtime")?;
    let report = runtime.block_on(generate_recommendations(
        Arc::new(client),
        &assessment,
        &kinds,
        config.advisor.timeout,
    ));

    let all_failed = report.all_failed();
    print_json(&serde_json::json!({
        "risk_assessment": assessment,
        "recommendations": report,
    }))?;

    if all_failed {
        bail!("Every recommendation request failed");
    }
    Ok(())
}

#[cfg(feature = "server")]
fn cmd_serve(
    config: &Config,
    port: Option<u16>,
    classifier: ClassifierArgs,
    api_key: Option<String>,
) -> anyhow::Result<()> {
    use diabetalens::advisor::{AdvisorClient, AdvisorConfig};
    use diabetalens::server::{run, ServerConfig};

    let pipeline = build_pipeline(config, &classifier)?;
    let mut server_config = ServerConfig::new(port.unwrap_or(config.server.port), pipeline)
        .with_cors_origins(config.server.cors_origins.clone());

    match resolve_api_key(api_key) {
        Some(key) => {
            let client = AdvisorClient::new(AdvisorConfig::new(&config.advisor, key))?;
            server_config = server_config.with_advisor(Arc::new(client), config.advisor.timeout);
        }
        None => tracing::warn!("No API key configured; recommendation endpoints will return 503"),
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to create runtime")?;

    let (stop_tx, stop_rx) = std::sync::mpsc::channel();
    ctrlc::set_handler(move || {
        let _ = stop_tx.send(());
    })
    .context("Error setting Ctrl+C handler")?;

    let (addr, shutdown_tx) = runtime.block_on(run(server_config))?;
    println!("Listening on http://{addr}");
    println!("Press Ctrl+C to stop.");

    let _ = stop_rx.recv();
    let _ = shutdown_tx.send(());
    Ok(())
}

fn cmd_config(config: &Config, path: &Path, save: bool) -> anyhow::Result<()> {
    if save {
        config.save_to(path)?;
        println!("Saved configuration to {path:?}");
        return Ok(());
    }

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {path:?}");
    println!();
    print_json(config)
}

/// Pick the tier classifier from CLI flags, then the config file.
fn build_classifier(
    config: &Config,
    args: &ClassifierArgs,
) -> anyhow::Result<Arc<dyn TierClassifier>> {
    if let Some(probability) = args.probability {
        return Ok(Arc::new(FixedTierClassifier::new(
            probability,
            config.thresholds,
        )?));
    }

    let Some(path) = args.model.as_ref().or(config.classifier.model_path.as_ref()) else {
        bail!("No tier model configured: pass --model or --probability, or set classifier.model_path");
    };
    let classifier = LogisticTierClassifier::from_path(path, config.thresholds)?;
    tracing::debug!(model = %classifier.model().name, "loaded tier model");
    Ok(Arc::new(classifier))
}

fn build_pipeline(config: &Config, args: &ClassifierArgs) -> anyhow::Result<RiskPipeline> {
    let classifier = build_classifier(config, args)?;
    Ok(RiskPipeline::new(classifier, config.pipeline))
}

fn read_steps(args: &StepArgs) -> anyhow::Result<Vec<i64>> {
    match (&args.steps, &args.steps_file) {
        (Some(csv), _) => parse_steps(csv),
        (None, Some(path)) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {path:?}"))?;
            serde_json::from_str(&content)
                .with_context(|| format!("{path:?} must hold a JSON array of step counts"))
        }
        (None, None) => bail!("Provide --steps or --steps-file"),
    }
}

fn parse_steps(csv: &str) -> anyhow::Result<Vec<i64>> {
    csv.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>()
                .with_context(|| format!("'{s}' is not a whole number of steps"))
        })
        .collect()
}

#[cfg(feature = "advisor")]
fn resolve_api_key(flag: Option<String>) -> Option<String> {
    flag.or_else(|| std::env::var("DIABETALENS_API_KEY").ok())
        .filter(|key| !key.trim().is_empty())
}
