//! Integration tests for batch evaluation
//!
//! One engine behind an `Arc` evaluates many symbols concurrently.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use super_indicator::metrics::Metrics;
use super_indicator::signals::confidence::ConfidenceRule;
use super_indicator::{EvaluationRequest, SignalError, SignalLabel, SuperIndicator};

fn request(symbol: &str, rsi: f64, macd: f64) -> EvaluationRequest {
    EvaluationRequest::new(symbol, "1h")
        .with_timestamp(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap())
        .with_indicator("rsi_14", "rsi", rsi)
        .with_indicator("stoch_14_3", "stochastic", rsi - 4.0)
        .with_indicator("macd_12_26_9", "macd", macd)
        .with_indicator("bb_20_2", "bollinger", 0.5)
        .with_indicator("mfi_14", "mfi", 55.0)
        .with_regime_inputs(30.0, 1.0, 2.0, false)
}

#[tokio::test]
async fn batch_isolates_failures_per_symbol() {
    let engine = Arc::new(SuperIndicator::with_default_config().unwrap());
    let requests = vec![
        request("BTCUSDT", 80.0, 1.0),
        request("ETHUSDT", 30.0, -1.0),
        request("SOLUSDT", 55.0, 0.2).with_indicator("mystery", "FOO", 1.0),
    ];

    let results = engine.evaluate_batch(requests).await;

    assert_eq!(results.len(), 3);
    let btc = results["BTCUSDT"].as_ref().unwrap();
    assert_eq!(btc.symbol, "BTCUSDT");
    assert!(btc.label >= SignalLabel::Buy);

    let eth = results["ETHUSDT"].as_ref().unwrap();
    assert!(eth.label <= SignalLabel::Sell);

    assert!(matches!(
        results["SOLUSDT"],
        Err(SignalError::UnsupportedIndicator { .. })
    ));
}

#[tokio::test]
async fn batch_matches_sequential_evaluation() {
    let engine = Arc::new(SuperIndicator::with_default_config().unwrap());
    let requests: Vec<EvaluationRequest> = (0..32)
        .map(|i| {
            let rsi = 20.0 + i as f64 * 2.0;
            let macd = (i as f64 - 16.0) / 8.0;
            request(&format!("SYM{i}"), rsi, macd)
        })
        .collect();

    let sequential: Vec<_> = requests
        .iter()
        .map(|r| engine.evaluate(r).unwrap())
        .collect();

    let results = Arc::clone(&engine).evaluate_batch(requests).await;
    assert_eq!(results.len(), sequential.len());
    for expected in sequential {
        let actual = results[&expected.symbol].as_ref().unwrap();
        assert_eq!(actual, &expected);
    }
}

#[tokio::test]
async fn panicking_task_reports_aborted_symbol() {
    let metrics = Arc::new(Metrics::new().unwrap());
    let rule = ConfidenceRule::new("strong_momentum_guard", 1.1, |ctx| {
        if ctx.scores.momentum > 70.0 {
            panic!("momentum guard tripped");
        }
        false
    })
    .unwrap();
    let engine = Arc::new(
        SuperIndicator::with_default_config()
            .unwrap()
            .with_rule(rule)
            .with_metrics(Arc::clone(&metrics)),
    );

    let results = engine
        .evaluate_batch(vec![
            request("BTCUSDT", 80.0, 1.0),
            request("ETHUSDT", 30.0, -1.0),
        ])
        .await;

    assert_eq!(results.len(), 2);
    assert!(results["ETHUSDT"].is_ok());
    match &results["BTCUSDT"] {
        Err(SignalError::EvaluationAborted { symbol, reason }) => {
            assert_eq!(symbol, "BTCUSDT");
            assert!(reason.contains("panicked"));
        }
        other => panic!("expected an aborted evaluation, got {other:?}"),
    }
    assert_eq!(
        metrics
            .signal_evaluation_failures_total
            .with_label_values(&["evaluation_aborted"])
            .get(),
        1
    );
}

#[tokio::test]
async fn duplicate_symbols_keep_the_first_request() {
    let engine = Arc::new(SuperIndicator::with_default_config().unwrap());
    let first = request("BTCUSDT", 80.0, 1.0);
    let expected = engine.evaluate(&first).unwrap();

    for _ in 0..10 {
        let results = Arc::clone(&engine)
            .evaluate_batch(vec![
                first.clone(),
                request("BTCUSDT", 30.0, -1.0),
                request("BTCUSDT", 55.0, 0.0),
            ])
            .await;
        assert_eq!(results.len(), 1);
        assert_eq!(results["BTCUSDT"].as_ref().unwrap(), &expected);
    }
}

#[tokio::test]
async fn empty_batch_returns_empty_map() {
    let engine = Arc::new(SuperIndicator::with_default_config().unwrap());
    assert!(engine.evaluate_batch(Vec::new()).await.is_empty());
}

#[test]
fn batch_runs_on_a_blocking_executor() {
    let engine = Arc::new(SuperIndicator::with_default_config().unwrap());
    let results = tokio_test::block_on(engine.evaluate_batch(vec![request("BTCUSDT", 70.0, 0.5)]));
    assert!(results["BTCUSDT"].is_ok());
}
