use anyhow::Context;
use clap::Parser;
use ride_quote::utils::error::ErrorSeverity;
use ride_quote::utils::{logger, validation::Validate};
use ride_quote::{BookingSession, CliConfig, QuoteError, QuoteOutcome, QuoteRequest, ServiceTier};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting ride-quote");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        fail(&e);
    }

    let settings = match config.load_settings() {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("❌ Failed to load settings: {}", e);
            fail(&e);
        }
    };

    let session = match BookingSession::from_config(&settings) {
        Ok(session) => session,
        Err(e) => fail(&e),
    };

    let request = QuoteRequest {
        pickup: config.pickup.clone(),
        dropoff: config.dropoff.clone(),
        tier: config.tier,
        pickup_at: config.pickup_at,
    };

    if let Err(e) = run(&session, &config, &request).await {
        match e.downcast_ref::<QuoteError>() {
            Some(quote_error) => {
                tracing::error!(
                    "❌ Quote failed: {} (Category: {:?}, Severity: {:?})",
                    quote_error,
                    quote_error.category(),
                    quote_error.severity()
                );
                fail(quote_error);
            }
            None => return Err(e),
        }
    }

    Ok(())
}

async fn run<R, G>(
    session: &BookingSession<R, G>,
    config: &CliConfig,
    request: &QuoteRequest,
) -> anyhow::Result<()>
where
    R: ride_quote::core::RoutingProvider,
    G: ride_quote::core::GeocodingProvider,
{
    let quote = match session.quote(request).await? {
        QuoteOutcome::Current(quote) => quote,
        QuoteOutcome::Superseded { request_id } => {
            tracing::warn!("Quote {} was superseded", request_id);
            return Ok(());
        }
    };

    let quotes = if config.all_tiers {
        ServiceTier::ALL
            .iter()
            .map(|tier| session.reprice(&quote, *tier))
            .collect::<Vec<_>>()
    } else {
        vec![quote.clone()]
    };

    let instruction = config
        .pay
        .then(|| session.payments().instruction(&session.payment_request(&quote)));

    if config.json {
        let output = serde_json::json!({
            "request_id": quote.request_id,
            "pickup": quote.pickup,
            "dropoff": quote.dropoff,
            "pickup_at": quote.pickup_at,
            "estimates": quotes.iter().map(|q| q.estimate.view()).collect::<Vec<_>>(),
            "payment": instruction,
        });
        let rendered =
            serde_json::to_string_pretty(&output).context("Failed to render quote as JSON")?;
        println!("{}", rendered);
        return Ok(());
    }

    println!("Pickup:   {}", quote.pickup.label);
    println!("Drop-off: {}", quote.dropoff.label);
    if let Some(pickup_at) = quote.pickup_at {
        println!("When:     {}", pickup_at.format("%Y-%m-%d %H:%M"));
    }
    println!();
    for q in &quotes {
        println!("{}", q.estimate);
    }

    if let Some(instruction) = instruction {
        println!();
        println!("{}", instruction);
    }

    Ok(())
}

fn fail(e: &QuoteError) -> ! {
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low | ErrorSeverity::High => 1,
        ErrorSeverity::Medium => 2, // 可重試
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}
