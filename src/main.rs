//! shelf: a catalog of notes, question papers and lecture videos.

mod cli;
mod commands;
mod error;

use crate::cli::{Cli, Command};
use crate::commands::App;
use crate::error::{ErrorKind, Result};
use clap::Parser;
use exn::ResultExt;
use shelf_catalog::{AdminSeed, Database};
use shelf_config::Config;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, fmt};

fn init_logging(config: &Config) {
    // RUST_LOG wins over the configured level.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log.level));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

async fn connect(config: &Config) -> Result<(Database, bool)> {
    if let Some(parent) = config.database.path.parent() {
        tokio::fs::create_dir_all(parent).await.or_raise(|| ErrorKind::Io)?;
    }
    let db = Database::connect(&config.database.path).await.or_raise(|| ErrorKind::Catalog)?;
    let seed = AdminSeed::new(&config.admin.username, &config.admin.password);
    let seeded = db.initialize(&seed).await.or_raise(|| ErrorKind::Catalog)?;
    Ok((db, seeded))
}

async fn run(cli: Cli, config: Config) -> Result<()> {
    let (db, seeded) = connect(&config).await?;
    let app = App { config, db };
    let result = match cli.command {
        Command::Init => commands::init(&app, seeded).await,
        Command::Search { filters, json } => commands::search(&app, filters, json).await,
        Command::Upload { admin, details, source } => commands::upload(&app, admin, details, source).await,
        Command::View { id, json } => commands::view(&app, id, json).await,
        Command::Download { id, output } => commands::download(&app, id, output).await,
        Command::Visit => commands::visit(&app).await,
        Command::Stats { admin, json } => commands::stats(&app, admin, json).await,
        Command::Login { admin } => commands::login(&app, admin).await,
        Command::Passwd { admin, new_password } => commands::passwd(&app, admin, new_password).await,
    };
    app.db.close().await;
    result
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = match Config::load(cli.config.as_deref()).or_raise(|| ErrorKind::Config) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {err:?}");
            return err.exit_code();
        },
    };
    init_logging(&config);
    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:?}");
            err.exit_code()
        },
    }
}
