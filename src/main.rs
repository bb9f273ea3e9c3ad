use std::{path::PathBuf, time::Duration};

use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};
use sales_dash::{
    Dashboard, NumericField, Session, aggregate,
    config::Config,
    drilldown,
    gateway::{LoadError, PersistenceGateway, s3, sqlite},
    ingest,
};
use serde::Serialize;
use tracing::{error, warn};

#[derive(Parser)]
struct Opts {
    #[clap(short, long, env = "SALES_DASH_CONFIG")]
    config: Option<PathBuf>,
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate a JSON payload and print the resulting dataset and warnings
    Preview { file: PathBuf },
    /// Validate a JSON payload and upload it to object storage
    Upload {
        file: PathBuf,
        /// Object name; defaults to the file name
        #[clap(long)]
        name: Option<String>,
    },
    /// Load the stored dataset and print the standard dashboard
    Dashboard,
    /// Load the stored dataset and summarize one category
    DrillDown { category: String },
    /// Load the stored dataset and print per-date sums of a field
    Trend {
        #[clap(long, default_value = "revenue")]
        field: NumericField,
    },
    /// Load the stored dataset and print the highest ranked records
    Top {
        #[clap(long, default_value = "rating")]
        field: NumericField,
        #[clap(short, default_value_t = 5)]
        n: usize,
        #[clap(long)]
        category: Option<String>,
    },
}

/// Result for the presentation layer, with an error banner when loading failed.
#[derive(Serialize)]
struct Report<T> {
    error: Option<String>,
    warnings: usize,
    result: T,
}

type Gateway = PersistenceGateway<s3::Client, sqlite::Client>;

async fn connect(config: &Config) -> anyhow::Result<(Gateway, sqlite::Database)> {
    let database = sqlite::Database::connect_lazy(&config.database.url)
        .with_context(|| format!("open database {}", config.database.url))?;
    let objects = s3::Client::new(&config.storage).await;
    let gateway = PersistenceGateway::new(objects, database.client(), &config.storage.bucket)
        .with_prefix(&config.storage.prefix);
    Ok((gateway, database))
}

async fn load_config(opts: &Opts) -> anyhow::Result<Config> {
    let path = opts
        .config
        .as_ref()
        .ok_or_else(|| anyhow!("--config or SALES_DASH_CONFIG is required"))?;
    Config::load(path)
        .await
        .with_context(|| format!("load config from {}", path.display()))
}

fn print(value: &impl Serialize) -> anyhow::Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).with_context(|| "serialize output")?
    );
    Ok(())
}

async fn run(opts: Opts) -> anyhow::Result<()> {
    if let Command::Preview { file } = &opts.command {
        let payload = tokio::fs::read(file)
            .await
            .with_context(|| format!("read {}", file.display()))?;
        let ingested = ingest::parse_bytes(&payload)
            .with_context(|| format!("parse {}", file.display()))?;
        for warning in &ingested.warnings {
            warn!(%warning, "ingestion warning");
        }
        return print(&ingested);
    }

    let config = load_config(&opts).await?;
    let timeout = Duration::from_secs(config.timeout_secs);
    let (gateway, _database) = connect(&config).await?;

    if let Command::Upload { file, name } = &opts.command {
        let payload = tokio::fs::read(file)
            .await
            .with_context(|| format!("read {}", file.display()))?;
        let name = match name {
            Some(name) => name.clone(),
            None => file
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .ok_or_else(|| anyhow!("cannot derive object name from {}", file.display()))?,
        };
        let (ingested, key) = tokio::time::timeout(timeout, gateway.upload(&payload, &name))
            .await
            .with_context(|| format!("upload timed out after {}s", config.timeout_secs))??;
        return print(&Report {
            error: None,
            warnings: ingested.warnings.len(),
            result: key,
        });
    }

    let mut session = Session::<LoadError<sqlite::Error>>::new();
    let error = match tokio::time::timeout(timeout, session.load(&gateway)).await {
        Ok(()) => session.error().map(ToString::to_string),
        Err(_) => {
            session.clear();
            Some(format!("load timed out after {}s", config.timeout_secs))
        }
    };
    if let Some(error) = &error {
        error!(%error, "showing empty dataset");
    }
    let dataset = session.dataset();
    let warnings = session.warnings().len();
    match opts.command {
        Command::Dashboard => print(&Report {
            error,
            warnings,
            result: Dashboard::compute(dataset),
        }),
        Command::DrillDown { category } => match drilldown::summarize(dataset, &category) {
            Ok(summary) => print(&Report {
                error,
                warnings,
                result: Some(summary),
            }),
            Err(unknown) if error.is_some() => {
                warn!(%unknown, "nothing loaded to drill into");
                print(&Report {
                    error,
                    warnings,
                    result: None::<drilldown::CategorySummary>,
                })
            }
            Err(unknown) => Err(unknown.into()),
        },
        Command::Trend { field } => print(&Report {
            error,
            warnings,
            result: aggregate::time_series(dataset, field),
        }),
        Command::Top { field, n, category } => {
            let subset = category.map(|category| drilldown::filter_by_category(dataset, &category));
            let result = aggregate::top_n(subset.as_ref().unwrap_or(dataset), field, n);
            print(&Report {
                error,
                warnings,
                result,
            })
        }
        Command::Preview { .. } | Command::Upload { .. } => Err(anyhow!("command already handled")),
    }
}

#[tokio::main]
async fn main() {
    let opts = Opts::parse();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    if let Err(e) = run(opts).await {
        error!(?e, "critical error");
        std::process::exit(1);
    }
}
