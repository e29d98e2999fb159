use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use monoapi::{MonoError, PersonalMonoClient, RequestOptions};
use reqwest::header::{ACCEPT, HeaderValue};
use std::error::Error;

#[derive(Debug, Parser)]
#[command(name = "mono-cli", about = "CLI wrapper for the monobank open API")]
struct Cli {
    /// API token; falls back to MONO_TOKEN env var
    #[arg(long, env = "MONO_TOKEN")]
    token: String,

    /// Override the API origin
    #[arg(long, env = "MONO_BASE_URL")]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show currency exchange rates
    Currency,
    /// Show client info, accounts and jars
    Info,
    /// Register a webhook URL
    SetWebhook {
        #[arg(long)]
        url: String,
    },
    /// Fetch statement items for an account ("0" is the default account)
    Statement {
        #[arg(long, default_value = "0")]
        account: String,
        /// Start date YYYY-MM-DD, defaults to four weeks ago
        #[arg(long, value_parser = parse_date)]
        from: Option<DateTime<Utc>>,
        /// End date YYYY-MM-DD, defaults to now
        #[arg(long, value_parser = parse_date)]
        to: Option<DateTime<Utc>>,
    },
    /// GET an arbitrary API path and print the JSON response
    Raw {
        #[arg(long)]
        path: String,
    },
}

fn parse_date(raw: &str) -> Result<DateTime<Utc>, String> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|d| d.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc())
        .map_err(|e| format!("invalid date '{raw}': {e}"))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let mut client = PersonalMonoClient::new(cli.token)?;
    if let Some(base_url) = cli.base_url {
        client = client.with_base_url(base_url);
    }

    let mut scope = client.enter()?;
    let result = run(&mut scope, cli.command).await;
    drop(scope);

    if let Err(MonoError::RateLimitExceeded(body)) = &result {
        eprintln!("Rate limited by monobank, retry later: {body}");
    }
    Ok(result?)
}

async fn run(client: &mut PersonalMonoClient, command: Commands) -> Result<(), MonoError> {
    match command {
        Commands::Currency => {
            for rate in client.get_currency().await? {
                println!("{}", serde_json::to_string(&rate)?);
            }
        }
        Commands::Info => {
            let info = client.client_info().await?;
            println!("{} ({})", info.name, info.id);
            for account in &info.accounts {
                println!(
                    "account {} | {} | {} {}",
                    account.id, account.kind, account.balance, account.currency_code
                );
            }
            for jar in &info.jars {
                println!("jar {} | {} | {}/{}", jar.id, jar.title, jar.balance, jar.goal);
            }
        }
        Commands::SetWebhook { url } => {
            let webhook = client.set_webhook(&url).await?;
            println!("Set webhook to {}", webhook.web_hook_url);
        }
        Commands::Statement { account, from, to } => {
            for item in client.get_statement(&account, from, to).await? {
                println!("{}", serde_json::to_string(&item)?);
            }
        }
        Commands::Raw { path } => {
            let options = RequestOptions::default()
                .header(ACCEPT, HeaderValue::from_static("application/json"));
            let value = client.get(&path, options).await?;
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
    }
    Ok(())
}
