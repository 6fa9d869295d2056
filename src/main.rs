use std::process::ExitCode;

use clap::Parser;

use diagnosis_desk::client::ServiceClient;
use diagnosis_desk::commands::{dispatch, Command};
use diagnosis_desk::config::{self, ClientConfig};

#[derive(Parser)]
#[command(name = "diagnosis-desk", version)]
#[command(about = "Clinical decision support client for a disease prediction service")]
struct Cli {
    /// Service base URL; overrides DIAGNOSIS_API_URL
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Request timeout in seconds; overrides DIAGNOSIS_API_TIMEOUT_SECS
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    diagnosis_desk::init_tracing();

    let cli = Cli::parse();

    let mut config = ClientConfig::from_env();
    if let Some(url) = cli.api_url.as_deref() {
        config = ClientConfig {
            timeout_secs: config.timeout_secs,
            ..ClientConfig::new(url)
        };
    }
    if let Some(secs) = cli.timeout.filter(|secs| *secs > 0) {
        config = config.with_timeout(secs);
    }

    tracing::info!(
        version = config::APP_VERSION,
        base_url = %config.base_url,
        "{} starting",
        config::APP_NAME
    );

    let client = match ServiceClient::new(&config) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    match dispatch(&client, cli.command).await {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}
