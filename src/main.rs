use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod classroom;
use classroom::Classroom;

mod config;
use config::{ClassroomConfig, WEBHOOK_SECRET_VAR};

mod errors;

mod github;
use github::GitHubClient;

mod server;

mod store;
use store::MemoryStore;

mod webhooks;
use webhooks::github::{sign, GitHubSecret, SignatureAlgorithm};

#[derive(Parser)]
#[command(version)]
struct Opts {
    /// Configuration file for classroom-hooks
    #[arg(short, long)]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the webhook endpoint (default)
    Serve,
    /// Print the signature header GitHub would send along a payload, to replay a delivery by hand
    Sign {
        /// File holding the exact payload
        payload: PathBuf,
        /// One of sha1, sha256, sha384, sha512
        #[arg(short, long, default_value = "sha256")]
        algorithm: String,
    },
}

#[rocket::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let opts = Opts::parse();
    let config_file = File::open(&opts.config)
        .with_context(|| format!("couldn't open {}:", opts.config.display()))?;
    let config: ClassroomConfig = serde_yaml::from_reader(BufReader::new(config_file))
        .context("couldn't parse config file")?;
    let secret = config.webhook_secret(std::env::var(WEBHOOK_SECRET_VAR).ok())?;

    match opts.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config, secret).await,
        Command::Sign { payload, algorithm } => {
            let algorithm = SignatureAlgorithm::from_name(&algorithm)
                .ok_or_else(|| anyhow!("unsupported signature algorithm `{}`", algorithm))?;
            let payload = std::fs::read(&payload)
                .with_context(|| format!("couldn't read {}", payload.display()))?;

            println!("{}", sign(algorithm, secret.as_bytes(), &payload));
            Ok(())
        }
    }
}

async fn serve(config: ClassroomConfig, secret: String) -> anyhow::Result<()> {
    let store = MemoryStore::open(&config.store_path)
        .await
        .with_context(|| format!("couldn't load store {}", config.store_path.display()))?;
    let github = GitHubClient::new(config.github_api_url.clone(), &config.github_token)
        .context("failed to create GitHub client")?;
    let classroom = Classroom::new(Arc::new(store), Arc::new(github));

    let rocket = server::build(classroom, GitHubSecret(secret));
    rocket
        .launch()
        .await
        .map_err(|err| anyhow!("rocket failed: {}", err))?;

    Ok(())
}
