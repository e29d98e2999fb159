use monoapi::PublicMonoClient;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut client = PublicMonoClient::new();
    let rates = {
        let mut scope = client.enter()?;
        scope.get_currency().await?
    };

    println!("Fetched {} currency rates:", rates.len());
    for rate in &rates {
        let fmt = |v: Option<rust_decimal::Decimal>| v.map(|d| d.to_string()).unwrap_or("-".into());
        println!(
            "{} -> {} | sell {} | buy {} | cross {}",
            rate.currency_code_a,
            rate.currency_code_b,
            fmt(rate.rate_sell),
            fmt(rate.rate_buy),
            fmt(rate.rate_cross)
        );
    }

    Ok(())
}
