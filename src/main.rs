use clap::Parser;
use oiwatch::application::scan::ScanOutcome;
use oiwatch::cli::commands::{Cli, Commands};
use oiwatch::domain::values::scan_config::ScanConfig;
use oiwatch::{Credentials, OiWatch};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("oiwatch=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run_command(&cli.db, cli.command).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run_command(db_path: &str, cmd: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        Commands::Scan {
            config,
            credentials,
        } => {
            let config: ScanConfig = config.into();
            let oi = OiWatch::new(db_path, config, credentials.into())?;
            let report = oi.scan().await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            if let ScanOutcome::Aborted { reason } = &report.outcome {
                return Err(reason.clone().into());
            }
        }
        Commands::Status => {
            let oi = OiWatch::new(db_path, ScanConfig::default(), Credentials::default())?;
            match oi.status()? {
                Some(summary) => println!("{}", serde_json::to_string_pretty(&summary)?),
                None => println!("No session stored yet"),
            }
        }
        Commands::Signals {
            limit,
            date,
            sent_only,
        } => {
            let date = date
                .map(|d| chrono::NaiveDate::parse_from_str(&d, "%Y-%m-%d"))
                .transpose()
                .map_err(|e| format!("Invalid date (use YYYY-MM-DD): {e}"))?;
            let oi = OiWatch::new(db_path, ScanConfig::default(), Credentials::default())?;
            let signals = oi.signals(Some(limit), date, sent_only)?;
            println!("{}", serde_json::to_string_pretty(&signals)?);
        }
        Commands::TestAlert {
            message,
            credentials,
        } => {
            if credentials.telegram_token.is_none() || credentials.telegram_chat_id.is_none() {
                return Err("Telegram alert skipped: missing TELEGRAM_TOKEN / TELEGRAM_CHAT_ID".into());
            }
            let oi = OiWatch::new(db_path, ScanConfig::default(), credentials.into())?;
            oi.test_alert(&message).await?;
            println!("Test alert sent");
        }
        Commands::Reset => {
            let oi = OiWatch::new(db_path, ScanConfig::default(), Credentials::default())?;
            oi.reset()?;
            println!("Session cleared");
        }
    }
    Ok(())
}
