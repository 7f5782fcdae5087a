// Poll loop behaviour against scripted pages

use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use merch_watcher::plugins::traits::ReportEvent;
use merch_watcher::{Catalog, PollLoop, Product, StateTracker, Status, StorefrontClassifier};

use super::*;

fn build_loop(
    catalog: Catalog,
    fetcher: Arc<ScriptedFetcher>,
    reporter: Arc<RecordingReporter>,
    clock: Arc<FixedClock>,
) -> PollLoop {
    let tracker = StateTracker::new(&catalog);
    PollLoop::new(
        Arc::new(catalog),
        tracker,
        Arc::new(StorefrontClassifier),
        reporter,
        fetcher,
    )
    .with_clock(clock)
    .with_interval(Duration::from_millis(5))
}

fn single_product() -> Catalog {
    Catalog::from_products(vec![Product::new(
        "locket cd",
        "https://shop.test/products/locket-cd",
        "madison",
    )])
    .unwrap()
}

#[tokio::test]
async fn test_transition_sequence_alerts() -> anyhow::Result<()> {
    let fetcher = Arc::new(ScriptedFetcher::new().script(
        "https://shop.test/products/locket-cd",
        vec![
            Page::Html(SOLD_OUT_PAGE),
            Page::Html(PRE_ORDER_PAGE),
            Page::Html(IN_STOCK_PAGE),
            Page::Html(SOLD_OUT_PAGE),
            Page::Html(IN_STOCK_PAGE),
        ],
    ));
    let reporter = Arc::new(RecordingReporter::new());
    let poll_loop = build_loop(single_product(), fetcher, reporter.clone(), FixedClock::at(12, 30, 15));
    let cancel = CancellationToken::new();

    let mut alerts = 0;
    for _ in 0..5 {
        alerts += poll_loop.run_cycle(&cancel).await.alerts;
    }

    let statuses: Vec<Status> = reporter.transitions().iter().map(|a| a.status).collect();
    assert_eq!(statuses, vec![Status::PreOrder, Status::InStock, Status::InStock]);
    assert_eq!(alerts, 3);
    assert_eq!(poll_loop.tracker().get("locket cd"), Status::InStock);

    let first = &reporter.transitions()[0];
    assert_eq!(first.message, "is now available to PRE-ORDER.");
    assert_eq!(
        first.body(),
        "locket cd is now available to PRE-ORDER.\nhttps://shop.test/products/locket-cd"
    );
    assert_eq!(reporter.transitions()[1].message, "is now IN STOCK!");

    println!("✓ Alerted on every change into pre-order or in stock");
    Ok(())
}

#[tokio::test]
async fn test_unchanged_status_is_silent() -> anyhow::Result<()> {
    let fetcher = Arc::new(
        ScriptedFetcher::new().script("https://shop.test/products/locket-cd", vec![Page::Html(IN_STOCK_PAGE)]),
    );
    let reporter = Arc::new(RecordingReporter::new());
    let poll_loop = build_loop(single_product(), fetcher, reporter.clone(), FixedClock::at(9, 0, 30));
    let cancel = CancellationToken::new();

    for _ in 0..4 {
        poll_loop.run_cycle(&cancel).await;
    }

    assert_eq!(reporter.transitions().len(), 1);
    assert_eq!(reporter.log_lines().len(), 4);
    Ok(())
}

#[tokio::test]
async fn test_fetch_failure_is_isolated() -> anyhow::Result<()> {
    let fetcher = Arc::new(
        ScriptedFetcher::new()
            .script("https://shop.test/products/locket-cd", vec![Page::Status(503)])
            .script("https://shop.test/products/spinnin-tee", vec![Page::Html(PRE_ORDER_PAGE)])
            .script("https://shop.test/products/tour-hoodie", vec![Page::Html(IN_STOCK_PAGE)]),
    );
    let reporter = Arc::new(RecordingReporter::new());
    let poll_loop = build_loop(test_catalog(), fetcher.clone(), reporter.clone(), FixedClock::at(9, 0, 30));

    let summary = poll_loop.run_cycle(&CancellationToken::new()).await;

    assert_eq!(summary.checked, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.alerts, 2);
    assert!(!summary.cancelled);

    // Failed product keeps its previous status and emits no line
    assert_eq!(poll_loop.tracker().get("locket cd"), Status::SoldOut);
    let lines: Vec<String> = reporter.log_lines().into_iter().map(|l| l.line).collect();
    assert_eq!(lines, vec!["PreOrder | spinnin tee", "InStock | tour hoodie"]);

    // Catalog order
    assert_eq!(
        fetcher.calls(),
        vec![
            "https://shop.test/products/locket-cd",
            "https://shop.test/products/spinnin-tee",
            "https://shop.test/products/tour-hoodie",
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_log_lines_carry_artist_and_time() -> anyhow::Result<()> {
    let fetcher = Arc::new(
        ScriptedFetcher::new()
            .script("https://shop.test/products/locket-cd", vec![Page::Html(SOLD_OUT_PAGE)])
            .script("https://shop.test/products/spinnin-tee", vec![Page::Html(SOLD_OUT_PAGE)])
            .script("https://shop.test/products/tour-hoodie", vec![Page::Html(SOLD_OUT_PAGE)]),
    );
    let reporter = Arc::new(RecordingReporter::new());
    let poll_loop = build_loop(test_catalog(), fetcher, reporter.clone(), FixedClock::at(21, 5, 9));

    poll_loop.run_cycle(&CancellationToken::new()).await;

    let lines = reporter.log_lines();
    assert_eq!(lines.len(), 3);
    assert!(lines.iter().all(|l| l.timestamp == "21:05:09"));
    assert_eq!(lines[0].artist_tag, "madison");
    assert_eq!(lines[2].artist_tag, "travis");
    assert_eq!(lines[2].line, "SoldOut | tour hoodie");
    assert!(reporter.transitions().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_reporter_failure_still_records_status() -> anyhow::Result<()> {
    let fetcher = Arc::new(
        ScriptedFetcher::new().script("https://shop.test/products/locket-cd", vec![Page::Html(PRE_ORDER_PAGE)]),
    );
    let reporter = Arc::new(RecordingReporter::failing_transitions());
    let poll_loop = build_loop(single_product(), fetcher, reporter.clone(), FixedClock::at(9, 0, 30));
    let cancel = CancellationToken::new();

    poll_loop.run_cycle(&cancel).await;
    poll_loop.run_cycle(&cancel).await;

    // One attempt only; the status was stored despite the failed delivery
    assert_eq!(reporter.transitions().len(), 1);
    assert_eq!(poll_loop.tracker().get("locket cd"), Status::PreOrder);
    assert_eq!(reporter.log_lines().len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_log_delivery_failure_does_not_abort_pass() -> anyhow::Result<()> {
    let fetcher = Arc::new(
        ScriptedFetcher::new()
            .script("https://shop.test/products/locket-cd", vec![Page::Html(PRE_ORDER_PAGE)])
            .script("https://shop.test/products/spinnin-tee", vec![Page::Html(IN_STOCK_PAGE)])
            .script("https://shop.test/products/tour-hoodie", vec![Page::Html(IN_STOCK_PAGE)]),
    );
    let reporter = Arc::new(RecordingReporter::failing_logs());
    let poll_loop = build_loop(test_catalog(), fetcher.clone(), reporter.clone(), FixedClock::at(9, 0, 30));

    let summary = poll_loop.run_cycle(&CancellationToken::new()).await;

    assert_eq!(summary.checked, 3);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.alerts, 3);
    assert!(!summary.cancelled);
    assert_eq!(fetcher.calls().len(), 3);
    assert_eq!(reporter.log_lines().len(), 3);
    assert_eq!(reporter.transitions().len(), 3);
    assert_eq!(
        poll_loop.tracker().snapshot(),
        vec![
            ("locket cd".to_string(), Status::PreOrder),
            ("spinnin tee".to_string(), Status::InStock),
            ("tour hoodie".to_string(), Status::InStock),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_heartbeat_on_minute_boundary() -> anyhow::Result<()> {
    let script = || ScriptedFetcher::new().script("https://shop.test/products/locket-cd", vec![Page::Html(SOLD_OUT_PAGE)]);

    let reporter = Arc::new(RecordingReporter::new());
    let on_minute = build_loop(single_product(), Arc::new(script()), reporter.clone(), FixedClock::at(14, 7, 0));
    on_minute.run_cycle(&CancellationToken::new()).await;

    let heartbeats: Vec<ReportEvent> = reporter
        .events()
        .into_iter()
        .filter(|e| matches!(e, ReportEvent::Heartbeat { .. }))
        .collect();
    assert_eq!(
        heartbeats,
        vec![ReportEvent::Heartbeat {
            text: "Alerts active… (last check 14:07)".to_string()
        }]
    );

    let quiet = Arc::new(RecordingReporter::new());
    let off_minute = build_loop(single_product(), Arc::new(script()), quiet.clone(), FixedClock::at(14, 7, 1));
    off_minute.run_cycle(&CancellationToken::new()).await;
    assert!(!quiet.events().iter().any(|e| matches!(e, ReportEvent::Heartbeat { .. })));

    let disabled = Arc::new(RecordingReporter::new());
    let no_heartbeat = build_loop(single_product(), Arc::new(script()), disabled.clone(), FixedClock::at(14, 7, 0))
        .with_heartbeat(false);
    no_heartbeat.run_cycle(&CancellationToken::new()).await;
    assert!(!disabled.events().iter().any(|e| matches!(e, ReportEvent::Heartbeat { .. })));
    Ok(())
}

#[tokio::test]
async fn test_run_reports_stopped_once() -> anyhow::Result<()> {
    let fetcher = Arc::new(
        ScriptedFetcher::new().script("https://shop.test/products/locket-cd", vec![Page::Html(IN_STOCK_PAGE)]),
    );
    let reporter = Arc::new(RecordingReporter::new());
    let poll_loop = build_loop(single_product(), fetcher, reporter.clone(), FixedClock::at(9, 0, 30));
    let cancel = CancellationToken::new();

    let handle = tokio::spawn(poll_loop.run(cancel.clone()));

    let probe = reporter.clone();
    let busy = wait_for_condition(Duration::from_secs(2), || {
        let probe = probe.clone();
        async move { probe.log_lines().len() >= 3 }
    })
    .await;
    assert!(busy, "loop should keep polling");

    cancel.cancel();
    let cycles = tokio::time::timeout(Duration::from_secs(2), handle).await??;

    assert!(cycles >= 3);
    assert_eq!(reporter.stopped_count(), 1);
    assert!(matches!(reporter.events().last(), Some(ReportEvent::Stopped)));
    assert_eq!(reporter.transitions().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_cancel_before_first_pass() -> anyhow::Result<()> {
    let fetcher = Arc::new(
        ScriptedFetcher::new().script("https://shop.test/products/locket-cd", vec![Page::Html(IN_STOCK_PAGE)]),
    );
    let reporter = Arc::new(RecordingReporter::new());
    let poll_loop = build_loop(single_product(), fetcher.clone(), reporter.clone(), FixedClock::at(9, 0, 30));
    let cancel = CancellationToken::new();
    cancel.cancel();

    let cycles = poll_loop.run(cancel).await;

    assert_eq!(cycles, 0);
    assert!(fetcher.calls().is_empty());
    assert_eq!(reporter.events(), vec![ReportEvent::Stopped]);
    Ok(())
}
