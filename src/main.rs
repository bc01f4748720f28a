mod output;

use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use output::OutputFormat;
use recapply::config::Config;
use recapply::gcp::auth::GcpCredentials;
use recapply::gcp::client::{format_gcp_error, GcpClient};
use recapply::gcp::recommender;
use recapply::gcp::service::GcpService;
use recapply::recommendation::{self, ApplyError, Recommendation};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Apply Google Cloud Recommender recommendations
#[derive(Parser, Debug)]
#[command(name = "recapply", version, about, long_about = None)]
struct Args {
    /// GCP project to use
    #[arg(short, long, global = true)]
    project: Option<String>,

    /// Recommender location (zone)
    #[arg(short, long, global = true)]
    location: Option<String>,

    /// OAuth access token to use instead of Application Default Credentials
    #[arg(long, env = "RECAPPLY_ACCESS_TOKEN", hide_env_values = true, global = true)]
    access_token: Option<String>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    output: OutputFormat,

    /// Run in read-only mode (apply only prints the plan)
    #[arg(long, global = true)]
    readonly: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List recommendations of the configured recommenders
    List {
        /// Recommender to query (repeatable); defaults to the configured ones
        #[arg(short, long)]
        recommender: Vec<String>,

        /// Only show recommendations in this state (e.g. ACTIVE)
        #[arg(long)]
        state: Option<String>,
    },
    /// Show one recommendation
    Show {
        #[command(flatten)]
        target: Target,
    },
    /// Print the steps a recommendation would run, without changing anything
    Plan {
        #[command(flatten)]
        target: Target,
    },
    /// Apply recommendations
    Apply {
        #[command(flatten)]
        target: Target,
    },
}

#[derive(ClapArgs, Debug)]
struct Target {
    /// Recommendation names (full resource name, or id with --recommender)
    #[arg(required_unless_present = "file")]
    names: Vec<String>,

    /// Recommender used to expand short ids
    #[arg(short, long)]
    recommender: Option<String>,

    /// Read the recommendation document from a JSON file instead
    #[arg(short, long, conflicts_with = "names")]
    file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {:?}", log_path))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("recapply started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("recapply").join("recapply.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".recapply").join("recapply.log");
    }
    PathBuf::from("recapply.log")
}

/// Settings shared by every subcommand
struct Session {
    config: Config,
    project: Option<String>,
    location: String,
    access_token: Option<String>,
    output: OutputFormat,
}

impl Session {
    async fn client(&self) -> Result<GcpClient> {
        let client = match &self.access_token {
            Some(token) => GcpClient::with_credentials(GcpCredentials::from_access_token(token.clone()))?,
            None => GcpClient::new().await?,
        };
        Ok(client
            .endpoints(self.config.endpoints()?)
            .polling(self.config.polling()))
    }

    fn project(&self) -> Result<&str> {
        self.project.as_deref().context(
            "No GCP project configured. Set GOOGLE_CLOUD_PROJECT or use --project flag",
        )
    }

    /// Expand a short recommendation id into a full resource name
    fn full_name(&self, name: &str, recommender: Option<&str>) -> Result<String> {
        if name.contains('/') {
            return Ok(name.to_string());
        }
        let recommender = recommender
            .with_context(|| format!("'{}' is not a full name; pass --recommender", name))?;
        Ok(format!(
            "projects/{}/locations/{}/recommenders/{}/recommendations/{}",
            self.project()?,
            self.location,
            recommender,
            name
        ))
    }

    async fn load(&self, target: &Target, client: Option<&GcpClient>) -> Result<Vec<Recommendation>> {
        if let Some(path) = &target.file {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {:?}", path))?;
            let rec: Recommendation = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse recommendation in {:?}", path))?;
            return Ok(vec![rec]);
        }

        let owned;
        let client = match client {
            Some(client) => client,
            None => {
                owned = self.client().await?;
                &owned
            }
        };

        let mut recommendations = Vec::with_capacity(target.names.len());
        for name in &target.names {
            let name = self.full_name(name, target.recommender.as_deref())?;
            recommendations.push(recommender::get_recommendation(client, &name).await?);
        }
        Ok(recommendations)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_guard = setup_logging(args.log_level)?;
    let readonly = args.readonly;

    let mut config = Config::load();
    if args.project.is_some() {
        config.project_id = args.project.clone();
    }
    if args.location.is_some() {
        config.location = args.location.clone();
    }

    let ctx = Session {
        project: config.effective_project(),
        location: config.effective_location(),
        access_token: args.access_token.clone(),
        output: args.output,
        config,
    };

    tracing::info!("Using project: {:?}, location: {}", ctx.project, ctx.location);

    let result = match args.command {
        Command::List { recommender, state } => list(&ctx, recommender, state).await,
        Command::Show { target } => show(&ctx, &target).await,
        Command::Plan { target } => plan(&ctx, &target).await,
        Command::Apply { target } if readonly => {
            eprintln!("Read-only mode: printing the plan instead of applying");
            plan(&ctx, &target).await
        }
        Command::Apply { target } => apply(&ctx, &target).await,
    };

    if let Err(err) = &result {
        tracing::error!("{:#}", err);
        eprintln!("Error: {}", format_gcp_error(err));
        drop(log_guard);
        std::process::exit(1);
    }

    Ok(())
}

async fn list(ctx: &Session, recommenders: Vec<String>, state: Option<String>) -> Result<()> {
    let client = ctx.client().await?;
    let project = ctx.project()?;

    let recommenders = if recommenders.is_empty() {
        ctx.config.recommenders.clone()
    } else {
        recommenders
    };
    let filter = state.map(|s| format!("stateInfo.state = {}", s.to_uppercase()));

    let results = futures::future::join_all(recommenders.iter().map(|r| {
        recommender::list_recommendations(&client, project, &ctx.location, r, filter.as_deref())
    }))
    .await;

    let mut all = Vec::new();
    for (recommender, result) in recommenders.iter().zip(results) {
        match result {
            Ok(items) => {
                tracing::info!("Loaded {} recommendations from {}", items.len(), recommender);
                all.extend(items);
            }
            Err(e) => {
                tracing::warn!("Failed to list {}: {:#}", recommender, e);
                eprintln!("Warning: {}: {}", recommender, format_gcp_error(&e));
            }
        }
    }

    output::print_recommendations(&all, ctx.output)
}

async fn show(ctx: &Session, target: &Target) -> Result<()> {
    for rec in ctx.load(target, None).await? {
        output::print_recommendation(&rec, ctx.output)?;
    }
    Ok(())
}

async fn plan(ctx: &Session, target: &Target) -> Result<()> {
    for rec in ctx.load(target, None).await? {
        let steps = recommendation::plan(&rec).map_err(|e| anyhow::anyhow!(describe(&e)))?;
        output::print_plan(&rec, &steps, ctx.output)?;
    }
    Ok(())
}

async fn apply(ctx: &Session, target: &Target) -> Result<()> {
    let client = ctx.client().await?;
    let recommendations = ctx.load(target, Some(&client)).await?;
    let service = GcpService::new(client);

    let total = recommendations.len();
    let mut failed = 0;

    for rec in &recommendations {
        match recommendation::apply(&service, rec).await {
            Ok(report) => {
                println!("✓ {} ({} operations)", report.name, report.operations);
            }
            Err(err) => {
                failed += 1;
                tracing::error!("{}: {:#}", rec.name, err);
                println!("✗ {}: {}", rec.name, describe(&err));
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} recommendations failed", failed, total);
    }
    Ok(())
}

fn describe(err: &ApplyError) -> String {
    match err {
        ApplyError::Capability(e) => format_gcp_error(e),
        other => other.to_string(),
    }
}
