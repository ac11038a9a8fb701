use clap::{Parser, Subcommand};
use eyre::{eyre, Result, WrapErr};
use sea_orm_migration::MigratorTrait;
use std::net::SocketAddr;
use std::path::PathBuf;
use time::Duration;
use tracing_subscriber::{
    filter::{EnvFilter, LevelFilter},
    fmt,
    prelude::*,
};

use base::setting::{load, read, Settings, SETTINGS};
use base::{
    database::{get_database, open_database, DATABASE},
    setting::{generate_default, get_settings},
    CLI_NAME,
};
use stagedoor::api::{auth::issue_token, router, AppState};

#[derive(Parser)]
#[command(name = CLI_NAME,author, version, about, long_about = None)]
#[command(next_line_help = true)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[arg(short, long, name = "ADDRESS", default_value_t = String::from("127.0.0.1:4000"))]
    listen_address: String,

    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    DefaultConfig,
    Token(TokenOptions),
    Serve,
}

/// Signs a token with the configured local secret
#[derive(Parser)]
struct TokenOptions {
    #[arg(short, long = "permission", name = "PERMISSION")]
    permissions: Vec<String>,

    #[arg(short, long, name = "SUBJECT")]
    subject: Option<String>,

    /// Lifetime of the token, in seconds
    #[arg(short, long, name = "SECONDS", default_value_t = 86400)]
    expires_in: i64,
}

#[tokio::main]
async fn main() -> Result<()> {
    // logging
    color_eyre::install()?;
    let tracing_builder = tracing_subscriber::registry().with(fmt::layer());
    if std::env::var(base::STAGEDOOR_LOGLEVEL).is_ok() {
        tracing_builder.with(EnvFilter::from_env(base::STAGEDOOR_LOGLEVEL))
    } else {
        tracing_builder.with(EnvFilter::default().add_directive(LevelFilter::INFO.into()))
    }
    .init();

    let cli = Cli::parse();
    match cli.command.unwrap_or(Command::Serve) {
        Command::DefaultConfig => {
            let mut default = Settings::default();
            default = generate_default(default)?;
            let str = toml::to_string(&default)?;
            println!("{}", str);
            Ok(())
        }
        Command::Token(opts) => {
            // the secret must come from the config file
            let settings = read(cli.config)?;
            let secret = settings.auth.signing_secret()?;
            let token = issue_token(
                secret,
                opts.subject.as_deref(),
                &opts.permissions,
                Duration::seconds(opts.expires_in),
            )?;
            println!("{}", token);
            Ok(())
        }
        Command::Serve => {
            // settings
            SETTINGS.get_or_try_init(async { load(cli.config) }).await?;

            // database
            DATABASE
                .get_or_try_init(async { open_database().await })
                .await?;
            migration::Migrator::up(get_database()?, None).await?;

            let state = AppState::new(get_database()?.clone(), get_settings()?)?;
            let addr: SocketAddr = cli
                .listen_address
                .parse()
                .wrap_err(eyre!("Invalid listen address"))?;
            tracing::info! {%addr, "Listening"};
            axum::Server::bind(&addr)
                .serve(router(state).into_make_service())
                .await?;
            Ok(())
        }
    }
}
