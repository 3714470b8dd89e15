//! Unit tests for market regime classification

use super_indicator::error::SignalError;
use super_indicator::signals::regime::{
    MarketRegime, RegimeClassifier, RegimeInputs, RegimeThresholds,
};

fn inputs(adx: f64, bollinger_squeeze: bool, atr: f64, volatility_threshold: f64) -> RegimeInputs {
    RegimeInputs {
        adx,
        bollinger_squeeze,
        atr,
        volatility_threshold,
    }
}

#[test]
fn test_strong_trend_without_squeeze() {
    let regime = RegimeClassifier::classify(&inputs(30.0, false, 1.0, 2.0)).unwrap();
    assert_eq!(regime, MarketRegime::StrongTrending);
}

#[test]
fn test_squeeze_overrides_strong_adx() {
    let regime = RegimeClassifier::classify(&inputs(30.0, true, 1.0, 2.0)).unwrap();
    assert_eq!(regime, MarketRegime::SidewaysRanging);
}

#[test]
fn test_low_adx_is_ranging_even_when_volatile() {
    let regime = RegimeClassifier::classify(&inputs(15.0, false, 5.0, 2.0)).unwrap();
    assert_eq!(regime, MarketRegime::SidewaysRanging);
}

#[test]
fn test_high_atr_is_volatile_breakout() {
    let regime = RegimeClassifier::classify(&inputs(22.0, false, 3.0, 2.0)).unwrap();
    assert_eq!(regime, MarketRegime::VolatileBreakout);
}

#[test]
fn test_fallback_is_weak_trending() {
    let regime = RegimeClassifier::classify(&inputs(22.0, false, 1.0, 2.0)).unwrap();
    assert_eq!(regime, MarketRegime::WeakTrending);
}

#[test]
fn test_boundaries_are_strict() {
    // 25 is not above 25, 20 is not below 20
    assert_eq!(
        RegimeClassifier::classify(&inputs(25.0, false, 1.0, 2.0)).unwrap(),
        MarketRegime::WeakTrending
    );
    assert_eq!(
        RegimeClassifier::classify(&inputs(20.0, false, 1.0, 2.0)).unwrap(),
        MarketRegime::WeakTrending
    );
    // ATR equal to the threshold is not above it
    assert_eq!(
        RegimeClassifier::classify(&inputs(22.0, false, 2.0, 2.0)).unwrap(),
        MarketRegime::WeakTrending
    );
}

#[test]
fn test_classification_is_deterministic() {
    for adx in [0.0, 10.0, 19.9, 20.0, 24.0, 25.0, 25.1, 40.0, 80.0] {
        for squeeze in [false, true] {
            for atr in [0.5, 1.5, 2.5] {
                let tuple = inputs(adx, squeeze, atr, 1.5);
                let first = RegimeClassifier::classify(&tuple).unwrap();
                for _ in 0..5 {
                    assert_eq!(RegimeClassifier::classify(&tuple).unwrap(), first);
                }
            }
        }
    }
}

#[test]
fn test_custom_thresholds() {
    let thresholds = RegimeThresholds {
        trending_adx: 35.0,
        ranging_adx: 15.0,
    };
    let tuple = inputs(30.0, false, 1.0, 2.0);
    assert_eq!(
        RegimeClassifier::classify_with(&tuple, &thresholds).unwrap(),
        MarketRegime::WeakTrending
    );
    assert!(RegimeThresholds {
        trending_adx: 10.0,
        ranging_adx: 20.0
    }
    .validate()
    .is_err());
}

#[test]
fn test_non_finite_inputs_are_rejected() {
    assert!(matches!(
        RegimeClassifier::classify(&inputs(f64::NAN, false, 1.0, 2.0)),
        Err(SignalError::NonFiniteInput { ref field, .. }) if field == "adx"
    ));
    assert!(matches!(
        RegimeClassifier::classify(&inputs(30.0, false, 1.0, f64::INFINITY)),
        Err(SignalError::NonFiniteInput { ref field, .. }) if field == "volatility_threshold"
    ));
}

#[test]
fn test_regime_parsing() {
    assert_eq!(
        "strong_trending".parse::<MarketRegime>().unwrap(),
        MarketRegime::StrongTrending
    );
    assert_eq!(
        "SidewaysRanging".parse::<MarketRegime>().unwrap(),
        MarketRegime::SidewaysRanging
    );
    assert_eq!(
        "volatile-breakout".parse::<MarketRegime>().unwrap(),
        MarketRegime::VolatileBreakout
    );
    for regime in MarketRegime::ALL {
        assert_eq!(regime.to_string().parse::<MarketRegime>().unwrap(), regime);
    }
}

#[test]
fn test_unknown_regime_name() {
    let err = "bull_market".parse::<MarketRegime>().unwrap_err();
    assert!(matches!(err, SignalError::UnknownRegime(ref name) if name == "bull_market"));
}
