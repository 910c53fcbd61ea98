use std::path::PathBuf;
use std::sync::Arc;

use tokio::test;

use common::MonitorConfig;
use extractor::{ExtractError, ExtractorSettings, PageExtractor, Strategy};

use mock_browser::{MockBrowser, Script, table};

const GOOD_ROW: &str = "satUSD-v1 | 0.00% | 20.40 satUSD-v1 $20.39 | $1.00";

fn config() -> MonitorConfig {
    MonitorConfig {
        url: "https://example.test/#/".into(),
        ..MonitorConfig::default()
    }
}

fn dump_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("liqwatch-{}-{}.html", std::process::id(), name))
}

fn extractor(browser: Arc<MockBrowser>, dump: &str) -> PageExtractor {
    PageExtractor::new(
        browser,
        ExtractorSettings {
            debug_dump_path: dump_path(dump),
            ..ExtractorSettings::default()
        },
    )
}

#[test(start_paused = true)]
async fn fails_twice_then_succeeds_on_third_attempt() -> anyhow::Result<()> {
    let browser = Arc::new(MockBrowser::with_scripts([
        Script::NavigateFails,
        Script::NavigateFails,
        table(&["Asset | Supply | Liquidity", GOOD_ROW]),
    ]));

    let reading = extractor(browser.clone(), "retry").extract(&config(), 3).await?;

    assert_eq!(reading.value, 20.39);
    assert_eq!(reading.strategy, Strategy::UsdAfterAsset);
    assert_eq!(browser.opened(), 3);
    assert_eq!(browser.closed(), 3, "every session is released");

    Ok(())
}

#[test(start_paused = true)]
async fn backoff_separates_attempts() {
    let browser = Arc::new(MockBrowser::with_scripts([
        Script::NavigateFails,
        Script::NavigateFails,
        Script::NavigateFails,
    ]));

    let started = tokio::time::Instant::now();
    let result = extractor(browser, "backoff").extract(&config(), 3).await;

    assert!(result.is_err());
    // Two 5 s pauses between three attempts, none after the last.
    assert_eq!(started.elapsed().as_secs(), 10);
}

#[test(start_paused = true)]
async fn launch_failures_exhaust_attempts_with_last_reason() {
    let browser = Arc::new(MockBrowser::default());

    let err = extractor(browser.clone(), "launch")
        .extract(&config(), 2)
        .await
        .unwrap_err();

    assert!(matches!(err, ExtractError::Launch(_)));
    assert_eq!(browser.opened(), 0);
}

#[test(start_paused = true)]
async fn hung_navigation_times_out_and_releases_session() {
    let browser = Arc::new(MockBrowser::with_scripts([Script::NavigateHangs]));

    let err = extractor(browser.clone(), "nav-timeout")
        .extract(&config(), 1)
        .await
        .unwrap_err();

    match err {
        ExtractError::Timeout { stage, timeout } => {
            assert_eq!(stage, "navigating");
            assert_eq!(timeout.as_secs(), 60);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(browser.closed(), 1);
}

#[test(start_paused = true)]
async fn missing_marker_times_out_after_thirty_seconds() {
    let browser = Arc::new(MockBrowser::with_scripts([Script::MarkerNeverAppears]));

    let err = extractor(browser.clone(), "marker")
        .extract(&config(), 1)
        .await
        .unwrap_err();

    assert!(matches!(err, ExtractError::Timeout { stage: "waiting for asset marker", .. }));
    assert_eq!(browser.closed(), 1);
}

#[test(start_paused = true)]
async fn missing_row_dumps_page_markup() -> anyhow::Result<()> {
    let path = dump_path("no-row");
    let _ = std::fs::remove_file(&path);
    let browser = Arc::new(MockBrowser::with_scripts([table(&["BTC | $1.00 | $2.00"])]));

    let err = extractor(browser.clone(), "no-row").extract(&config(), 1).await.unwrap_err();

    assert!(matches!(err, ExtractError::RowNotFound(ref a) if a == "satUSD-v1"));
    let html = std::fs::read_to_string(&path)?;
    assert!(html.contains("rendered table"));
    assert_eq!(browser.closed(), 1);

    std::fs::remove_file(&path)?;
    Ok(())
}

#[test(start_paused = true)]
async fn unmatched_row_dumps_page_markup() -> anyhow::Result<()> {
    let path = dump_path("no-match");
    let _ = std::fs::remove_file(&path);
    let browser = Arc::new(MockBrowser::with_scripts([table(&["satUSD-v1 | -- | $1.00"])]));

    let err = extractor(browser, "no-match").extract(&config(), 1).await.unwrap_err();

    assert!(matches!(err, ExtractError::NoMatch(_)));
    assert!(path.exists());

    std::fs::remove_file(&path)?;
    Ok(())
}

#[test(start_paused = true)]
async fn fallback_strategy_reads_second_to_last_dollar() -> anyhow::Result<()> {
    let browser = Arc::new(MockBrowser::with_scripts([table(&[
        "satUSD-v1 | $350.00 | $349.12 | $0.998",
    ])]));

    let reading = extractor(browser, "fallback").extract(&config(), 1).await?;

    assert_eq!(reading.value, 349.12);
    assert_eq!(reading.strategy, Strategy::SecondToLastDollar);
    Ok(())
}

#[test(start_paused = true)]
async fn later_asset_row_is_tried_when_first_has_no_figures() -> anyhow::Result<()> {
    let path = dump_path("second-row");
    let _ = std::fs::remove_file(&path);
    let browser = Arc::new(MockBrowser::with_scripts([table(&[
        "satUSD-v1 | 0.00%",
        "satUSD-v1 | 0.00% | 20.40 satUSD-v1 $20.39 | $1.00",
    ])]));

    let reading = extractor(browser, "second-row").extract(&config(), 1).await?;

    assert_eq!(reading.value, 20.39);
    assert_eq!(reading.strategy, Strategy::UsdAfterAsset);
    assert!(!path.exists(), "no dump when a later row matched");
    Ok(())
}

#[test(start_paused = true)]
async fn every_asset_row_unmatched_is_no_match() -> anyhow::Result<()> {
    let path = dump_path("all-rows");
    let _ = std::fs::remove_file(&path);
    let browser = Arc::new(MockBrowser::with_scripts([table(&[
        "satUSD-v1 | 0.00%",
        "BTC | $1.00 | $2.00",
        "satUSD-v1 | -- | $1.00",
    ])]));

    let err = extractor(browser, "all-rows").extract(&config(), 1).await.unwrap_err();

    assert!(matches!(err, ExtractError::NoMatch(_)));
    assert!(path.exists());

    std::fs::remove_file(&path)?;
    Ok(())
}

#[test(start_paused = true)]
async fn compact_figures_are_scaled() -> anyhow::Result<()> {
    let browser = Arc::new(MockBrowser::with_scripts([table(&[
        "satUSD-v1 | 1.50K satUSD-v1 $1.52K | $1.00",
    ])]));

    let reading = extractor(browser, "compact").extract(&config(), 1).await?;

    assert_eq!(reading.value, 1520.0);
    assert_eq!(reading.strategy, Strategy::UsdAfterAsset);
    Ok(())
}
