//! Grant admin privileges to employees found in the corporate directory.
//!
//! Accounts missing locally are created from the directory entry first.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use library_catalog::{
    config::AppConfig,
    directory::{Directory, LdapDirectory, StaticDirectory},
    repository::Repository,
    services::admin::{AdminService, PromotionStatus},
};

#[derive(Parser)]
#[command(name = "promote-admins")]
#[command(version)]
#[command(about = "Grant admin privileges to directory employees", long_about = None)]
struct Args {
    /// Directory mail addresses of the employees
    #[arg(required = true)]
    emails: Vec<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!("library_catalog={}", level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&config.database.url)
        .await
        .context("Failed to connect to database")?;

    let directory: Arc<dyn Directory> = match config.directory.backend.as_str() {
        "static" => Arc::new(StaticDirectory::default()),
        _ => Arc::new(LdapDirectory::new(config.directory.clone())),
    };

    let repository = Repository::new(pool);
    let admin = AdminService::new(
        Arc::new(repository.users),
        directory,
        config.directory.office_location.clone(),
    );

    let reports = admin.promote(&args.emails).await?;

    let mut failed = false;
    for report in &reports {
        for warning in &report.warnings {
            println!("{}", warning);
        }
        println!("{}", report.message);
        failed |= report.status != PromotionStatus::Granted;
    }

    if failed {
        std::process::exit(1);
    }
    Ok(())
}
