use anyhow::Result;
use httpmock::prelude::*;
use ride_quote::domain::model::{GeoPoint, Location, PaymentStatus};
use ride_quote::{BookingSession, QuoteError, QuoteOutcome, QuoteRequest, ServiceTier, TomlConfig};
use std::io::Write;
use tempfile::NamedTempFile;

fn config_for(server: &MockServer) -> Result<TomlConfig> {
    let mut file = NamedTempFile::new()?;
    write!(
        file,
        r#"
[routing]
endpoint = "{base}"
timeout_seconds = 5

[geocoding]
endpoint = "{base}"
contact_email = "ops@example.com"
country_codes = ["us"]
result_limit = 5

[payment]
payee_handle = "$ExampleRides"
qr_image_url = "https://example.com/qr.png"
"#,
        base = server.base_url()
    )?;

    Ok(TomlConfig::from_file(file.path())?)
}

async fn mock_address(server: &MockServer, query: &str, lat: &str, lon: &str, label: &str) {
    let body = serde_json::json!([{ "lat": lat, "lon": lon, "display_name": label }]);
    let query = query.to_string();
    server
        .mock_async(move |when, then| {
            when.method(GET)
                .path("/search")
                .query_param("q", &query)
                .query_param("countrycodes", "us");
            then.status(200).json_body(body);
        })
        .await;
}

#[tokio::test]
async fn test_quote_from_addresses_to_payment() -> Result<()> {
    let server = MockServer::start_async().await;
    mock_address(&server, "City Hall, New York", "40.7128", "-74.0060", "City Hall Park, Manhattan").await;
    mock_address(&server, "Times Square", "40.7580", "-73.9855", "Times Square, Manhattan").await;
    let route_mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/route/v1/driving/-74.006,40.7128;-73.9855,40.758");
            then.status(200).json_body(serde_json::json!({
                "code": "Ok",
                "routes": [{"distance": 8046.72, "duration": 600.0}]
            }));
        })
        .await;

    let session = BookingSession::from_config(&config_for(&server)?)?;
    let request = QuoteRequest {
        pickup: "City Hall, New York".parse()?,
        dropoff: "Times Square".parse()?,
        tier: ServiceTier::Taxi,
        pickup_at: None,
    };

    let quote = match session.quote(&request).await? {
        QuoteOutcome::Current(quote) => quote,
        other => panic!("expected a current quote, got {:?}", other),
    };

    assert_eq!(quote.pickup.label, "City Hall Park, Manhattan");
    assert_eq!(quote.estimate.display_fare(), 22.50);

    // 切換等級只重新計價，不重新規劃路線
    let stretcher = session.reprice(&quote, ServiceTier::StretcherMedical);
    assert_eq!(stretcher.estimate.display_fare(), 110.00);
    route_mock.assert_hits_async(1).await;

    let payment = session.payment_request(&stretcher);
    let instruction = session.payments().instruction(&payment);
    assert_eq!(instruction.amount, 110.0);
    assert_eq!(instruction.payee_handle, "$ExampleRides");
    assert_eq!(instruction.summary.pickup, "City Hall Park, Manhattan");
    assert_eq!(instruction.summary.dropoff, "Times Square, Manhattan");

    assert_eq!(
        session.payments().record_claim(&instruction),
        PaymentStatus::ClaimedByRider
    );

    Ok(())
}

#[tokio::test]
async fn test_coordinates_skip_geocoding() -> Result<()> {
    let server = MockServer::start_async().await;
    let search_mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/search");
            then.status(200).json_body(serde_json::json!([]));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path_contains("/route/v1/driving/");
            then.status(200).json_body(serde_json::json!({
                "code": "Ok",
                "routes": [{"distance": 0.0, "duration": 0.0}]
            }));
        })
        .await;

    let session = BookingSession::from_config(&config_for(&server)?)?;
    let here = Location::Point(GeoPoint::new(40.7128, -74.0060));
    let request = QuoteRequest {
        pickup: here.clone(),
        dropoff: here,
        tier: ServiceTier::WheelchairVan,
        pickup_at: None,
    };

    let quote = session
        .quote(&request)
        .await?
        .into_current()
        .expect("current quote");

    search_mock.assert_hits_async(0).await;
    assert_eq!(quote.estimate.total_fare, 35.0);

    Ok(())
}

#[tokio::test]
async fn test_unknown_address_is_reported() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/search");
            then.status(200).json_body(serde_json::json!([]));
        })
        .await;
    let route_mock = server
        .mock_async(|when, then| {
            when.method(GET).path_contains("/route/v1/");
            then.status(200).json_body(serde_json::json!({"code": "Ok", "routes": []}));
        })
        .await;

    let session = BookingSession::from_config(&config_for(&server)?)?;
    let request = QuoteRequest {
        pickup: "Atlantis".parse()?,
        dropoff: "Times Square".parse()?,
        tier: ServiceTier::Taxi,
        pickup_at: None,
    };

    let result = session.quote(&request).await;

    assert!(matches!(result, Err(QuoteError::NoAddressMatch { .. })));
    route_mock.assert_hits_async(0).await;

    Ok(())
}
