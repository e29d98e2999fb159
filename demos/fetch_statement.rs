use chrono::{Duration, Utc};
use monoapi::PersonalMonoClient;
use std::env;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    env_logger::init();
    let token =
        env::var("MONO_TOKEN").map_err(|_| "Set MONO_TOKEN in your environment or .env file")?;

    let mut client = PersonalMonoClient::new(token)?;

    // Statement for the default account over the last 7 days.
    let end = Utc::now();
    let start = end - Duration::days(7);
    let items = client.get_statement("0", Some(start), Some(end)).await?;
    client.close();

    println!("Fetched {} statement items from {} to {}:", items.len(), start, end);
    for item in &items {
        println!(
            "{} | {} | {} {} | {}",
            item.id,
            item.datetime().map(|d| d.to_rfc3339()).unwrap_or_default(),
            item.amount,
            item.currency_code,
            item.description
        );
    }

    Ok(())
}
