//! Composite score and label assignment

use serde::{Deserialize, Serialize};

use crate::error::{Result, SignalError};
use crate::indicators::registry::IndicatorCategory;
use crate::models::signal::SignalLabel;
use crate::signals::aggregation::CategoryScores;
use crate::signals::categories::WeightProfile;

/// Inclusive lower bounds of the label bands.
///
/// `[strong_buy, 100]` StrongBuy, `[buy, strong_buy)` Buy, `[hold, buy)` Hold,
/// `[sell, hold)` Sell, `[0, sell)` StrongSell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelBands {
    pub strong_buy: f64,
    pub buy: f64,
    pub hold: f64,
    pub sell: f64,
}

impl Default for LabelBands {
    fn default() -> Self {
        Self {
            strong_buy: 80.0,
            buy: 60.0,
            hold: 40.0,
            sell: 20.0,
        }
    }
}

impl LabelBands {
    pub fn validate(&self) -> Result<()> {
        let ordered = 0.0 < self.sell
            && self.sell < self.hold
            && self.hold < self.buy
            && self.buy < self.strong_buy
            && self.strong_buy <= 100.0;
        if !ordered {
            return Err(SignalError::InvalidConfig(format!(
                "label bands must satisfy 0 < sell < hold < buy < strong_buy <= 100, got {}/{}/{}/{}",
                self.sell, self.hold, self.buy, self.strong_buy
            )));
        }
        Ok(())
    }

    pub fn label(&self, score: f64) -> SignalLabel {
        if score >= self.strong_buy {
            SignalLabel::StrongBuy
        } else if score >= self.buy {
            SignalLabel::Buy
        } else if score >= self.hold {
            SignalLabel::Hold
        } else if score >= self.sell {
            SignalLabel::Sell
        } else {
            SignalLabel::StrongSell
        }
    }
}

pub struct SignalComposer;

impl SignalComposer {
    /// Weighted blend of the category aggregates.
    ///
    /// A convex combination of values in [0, 100]; the final clamp only absorbs
    /// floating point drift at the edges.
    pub fn composite_score(scores: &CategoryScores, profile: &WeightProfile) -> f64 {
        IndicatorCategory::ALL
            .iter()
            .map(|&category| scores.get(category) * profile.get(category))
            .sum::<f64>()
            .clamp(0.0, 100.0)
    }

    pub fn compose(
        scores: &CategoryScores,
        profile: &WeightProfile,
        bands: &LabelBands,
    ) -> (f64, SignalLabel) {
        let score = Self::composite_score(scores, profile);
        (score, bands.label(score))
    }
}
