//! Live SWPC Feed Checks
//!
//! These hit services.swpc.noaa.gov and are ignored by default so CI does not
//! depend on the upstream. Run with:
//!
//!     cargo test --test live_feeds -- --ignored --nocapture

use swmon_service::config::FeedConfig;
use swmon_service::ingest::swpc::SwpcClient;
use swmon_service::services::SpaceWeatherService;
use swmon_service::imaging::NoImageSupport;
use swmon_service::verify::*;

fn live_client() -> SwpcClient {
    SwpcClient::new(&FeedConfig::default()).expect("client should build")
}

#[test]
#[ignore]
fn test_live_feed_verification() {
    let report = run_full_verification(&live_client());
    print_summary(&report);

    for result in &report.feed_results {
        if let Some(error) = &result.error_message {
            println!("  {}: {}", result.feed, error);
        }
    }
    assert!(report.summary.working > 0, "No SWPC feeds are reachable!");
}

#[test]
#[ignore]
fn test_live_solar_wind_feeds_have_samples() {
    let report = run_full_verification(&live_client());
    for feed in ["plasma-7-day", "mag-7-day"] {
        let result = report
            .feed_results
            .iter()
            .find(|r| r.feed == feed)
            .expect("feed is registered");
        assert_eq!(result.status, VerificationStatus::Success, "{} not healthy", feed);
        assert!(result.sample_count > 96, "{} has under a day of samples", feed);
    }
}

#[test]
#[ignore]
fn test_live_conditions_report() {
    let service = SpaceWeatherService::new(live_client(), Box::new(NoImageSupport), 60);
    let report = service.analyze_current_conditions();
    println!("{}", serde_json::to_string_pretty(&report).unwrap());
    assert_eq!(report.flare_activity.data_source, "NOAA SWPC");
}
