use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tablekeeper::loader::load_models;
use tablekeeper::model::SchemaModel;
use tablekeeper::mysql::sqlgen::create_table;
use tablekeeper::mysql::MySqlConnection;
use tablekeeper::reconcile::{ReconcileOptions, TableReconciler};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "tablekeeper")]
#[command(about = "Declarative MySQL table management", long_about = None)]
struct Cli {
    /// Log every statement issued against the database
    #[arg(short, long, global = true, env = "TABLEKEEPER_DEBUG")]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the CREATE TABLE statement of each model
    Create {
        /// Model files, directories or glob patterns
        #[arg(long = "model", required = true)]
        models: Vec<String>,
    },

    /// Show the statements needed to bring each table in line with its model
    Plan {
        #[arg(long = "model", required = true)]
        models: Vec<String>,
        #[arg(long, env = "DATABASE_URL")]
        database: String,
        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create or alter tables to match their models
    Apply {
        #[arg(long = "model", required = true)]
        models: Vec<String>,
        #[arg(long, env = "DATABASE_URL")]
        database: String,
        #[arg(long)]
        dry_run: bool,
        #[arg(long)]
        allow_destructive: bool,
    },

    /// Print a content hash of each model
    Fingerprint {
        #[arg(long = "model", required = true)]
        models: Vec<String>,
    },
}

fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to install log subscriber")?;
    Ok(())
}

fn load(sources: &[String]) -> Result<Vec<SchemaModel>> {
    let models = load_models(sources).context("Failed to load models")?;
    if models.is_empty() {
        bail!("No models found");
    }
    Ok(models)
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    match cli.command {
        Commands::Create { models } => {
            for model in load(&models)? {
                println!("{};", create_table(&model));
            }
            Ok(())
        }
        Commands::Plan {
            models,
            database,
            json,
        } => {
            let models = load(&models)?;
            let connection = MySqlConnection::new(&database).await?;

            let mut plans = Vec::with_capacity(models.len());
            for model in &models {
                plans.push(TableReconciler::new(model, &connection).plan().await?);
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&plans)?);
                return Ok(());
            }

            for plan in &plans {
                if plan.is_empty() {
                    println!("-- {}: up to date", plan.table);
                    continue;
                }
                println!("-- {}", plan.table);
                for statement in &plan.statements {
                    println!("{statement};");
                }
            }
            Ok(())
        }
        Commands::Apply {
            models,
            database,
            dry_run,
            allow_destructive,
        } => {
            let models = load(&models)?;
            let connection = MySqlConnection::new(&database).await?;
            let options = ReconcileOptions::new()
                .with_dry_run(dry_run)
                .with_allow_destructive(allow_destructive);

            for model in &models {
                let result = TableReconciler::new(model, &connection)
                    .reconcile(&options)
                    .await
                    .with_context(|| format!("Failed to reconcile {}", model.name()))?;

                if result.dry_run {
                    for statement in &result.plan.statements {
                        println!("{statement};");
                    }
                } else if result.created() {
                    println!("{}: created", result.plan.table);
                } else {
                    println!(
                        "{}: {} statement(s) executed",
                        result.plan.table, result.statements_executed
                    );
                }
            }
            Ok(())
        }
        Commands::Fingerprint { models } => {
            for model in load(&models)? {
                println!("{}  {}", model.fingerprint(), model.name());
            }
            Ok(())
        }
    }
}
