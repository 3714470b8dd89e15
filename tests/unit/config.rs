//! Unit tests for engine configuration loading

use std::env;
use std::fs;
use std::path::PathBuf;

use super_indicator::config::{EngineConfig, CONFIG_PATH_ENV};
use super_indicator::error::SignalError;
use super_indicator::logging::{init_logging, is_production, LogFormat};
use super_indicator::signals::regime::MarketRegime;

fn temp_config(name: &str, contents: &str) -> PathBuf {
    let path = env::temp_dir().join(format!(
        "super-indicator-{}-{}.json",
        name,
        std::process::id()
    ));
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_default_config_is_valid() {
    assert!(EngineConfig::default().validate().is_ok());
}

#[test]
fn test_empty_object_is_default() {
    let config = EngineConfig::from_json_str("{}").unwrap();
    assert_eq!(config, EngineConfig::default());
}

#[test]
fn test_serialized_default_loads_back() {
    let json = serde_json::to_string(&EngineConfig::default()).unwrap();
    assert_eq!(
        EngineConfig::from_json_str(&json).unwrap(),
        EngineConfig::default()
    );
}

#[test]
fn test_partial_sections_keep_defaults() {
    let config =
        EngineConfig::from_json_str(r#"{"rules": {"agreement_delta": 5.0}, "regime": {"trending_adx": 30.0}}"#)
            .unwrap();
    assert_eq!(config.rules.agreement_delta, 5.0);
    assert_eq!(config.rules.max_multiplier, 1.5);
    assert_eq!(config.regime.trending_adx, 30.0);
    assert_eq!(config.regime.ranging_adx, 20.0);
    assert_eq!(config.bands, EngineConfig::default().bands);
}

#[test]
fn test_bad_weight_sum_is_rejected() {
    let json = r#"{"weights": {"sideways_ranging": {
        "momentum": 0.6, "trend_momentum": 0.15, "volatility": 0.30, "volume": 0.05
    }}}"#;
    match EngineConfig::from_json_str(json) {
        Err(SignalError::InvalidWeightProfile(reason)) => {
            assert!(reason.contains(&MarketRegime::SidewaysRanging.to_string()))
        }
        other => panic!("expected InvalidWeightProfile, got {other:?}"),
    }
}

#[test]
fn test_out_of_range_values_are_rejected() {
    assert!(matches!(
        EngineConfig::from_json_str(r#"{"rules": {"max_multiplier": 0.5}}"#),
        Err(SignalError::InvalidConfig(_))
    ));
    assert!(matches!(
        EngineConfig::from_json_str(r#"{"bands": {"sell": 45.0}}"#),
        Err(SignalError::InvalidConfig(_))
    ));
    assert!(matches!(
        EngineConfig::from_json_str(r#"{"regime": {"ranging_adx": 30.0}}"#),
        Err(SignalError::InvalidConfig(_))
    ));
    assert!(matches!(
        EngineConfig::from_json_str(r#"{"confidence": {"score": 0.9}}"#),
        Err(SignalError::InvalidConfig(_))
    ));
}

#[test]
fn test_malformed_json_is_a_parse_error() {
    assert!(matches!(
        EngineConfig::from_json_str("{weights:"),
        Err(SignalError::ConfigParse(_))
    ));
}

#[test]
fn test_extra_indicators_are_registered() {
    let json = r#"{"indicators": {
        "funding_rate": {"category": "volume", "tier": 3, "transform": {"kind": "signed", "scale": 50000.0}},
        "ultimate_osc": {"category": "momentum", "tier": 2, "transform": {"kind": "oscillator"}}
    }}"#;
    let config = EngineConfig::from_json_str(json).unwrap();
    let registry = config.build_registry().unwrap();
    assert!(registry.contains("funding_rate"));
    assert!(registry.contains("ultimate_osc"));
    assert!(registry.contains("rsi"));
    assert_eq!(registry.tags().len(), 18);
}

#[test]
fn test_invalid_extra_indicator_is_rejected() {
    let json = r#"{"indicators": {
        "broken": {"category": "volume", "tier": 1, "transform": {"kind": "range", "min": 10.0, "max": 10.0}}
    }}"#;
    assert!(EngineConfig::from_json_str(json).is_err());
}

#[test]
fn test_overflowing_range_indicator_is_rejected() {
    let json = r#"{"indicators": {
        "wide": {"category": "volume", "tier": 2, "transform": {"kind": "range", "min": -1e308, "max": 1e308}}
    }}"#;
    assert!(matches!(
        EngineConfig::from_json_str(json),
        Err(SignalError::InvalidConfig(_))
    ));
}

#[test]
fn test_from_file() {
    let path = temp_config("from-file", r#"{"bands": {"strong_buy": 85.0}}"#);
    let config = EngineConfig::from_file(&path).unwrap();
    assert_eq!(config.bands.strong_buy, 85.0);
    fs::remove_file(&path).ok();
}

#[test]
fn test_missing_file_is_an_io_error() {
    let path = env::temp_dir().join("super-indicator-does-not-exist.json");
    assert!(matches!(
        EngineConfig::from_file(&path),
        Err(SignalError::ConfigIo(_))
    ));
}

#[test]
fn test_from_env_reads_the_named_file() {
    let path = temp_config("from-env", r#"{"rules": {"agreement_delta": 7.5}}"#);
    env::set_var(CONFIG_PATH_ENV, &path);
    let config = EngineConfig::from_env();
    env::remove_var(CONFIG_PATH_ENV);
    fs::remove_file(&path).ok();

    assert_eq!(config.unwrap().rules.agreement_delta, 7.5);
}

#[test]
fn test_production_detection() {
    assert!(is_production("production"));
    assert!(is_production("prod"));
    assert!(!is_production("sandbox"));
    assert!(!is_production("staging"));
    assert_eq!(LogFormat::for_environment("production"), LogFormat::Json);
    assert_eq!(LogFormat::for_environment("sandbox"), LogFormat::Pretty);
}

#[test]
fn test_logging_installs_once() {
    let _ = init_logging();
    assert!(init_logging().is_err());
}
