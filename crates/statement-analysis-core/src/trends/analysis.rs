//! Period-over-period trend analysis.
//!
//! Compares the current period with the most recent prior period on three
//! deltas and derives a sustainability verdict from how many moved
//! meaningfully up or down.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::arithmetic::safe_ratio;
use crate::statements::{FinancialStatements, StatementField as F};

const DIRECTION_BAND: Decimal = dec!(0.05);
const SIGNIFICANCE_BAND: Decimal = dec!(0.02);

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendMetric {
    /// Relative change in revenue.
    RevenueGrowth,
    /// Absolute change in net margin.
    NetMarginChange,
    /// Absolute change in asset turnover.
    AssetTurnoverChange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Improving,
    Stable,
    Deteriorating,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sustainability {
    HighlySustainable,
    ModeratelySustainable,
    Concerning,
    Mixed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendDelta {
    pub metric: TrendMetric,
    pub current: Decimal,
    pub prior: Decimal,
    pub change: Decimal,
    pub direction: TrendDirection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendReport {
    pub prior_period: String,
    pub deltas: Vec<TrendDelta>,
    pub positive_signals: u32,
    pub negative_signals: u32,
    pub sustainability: Sustainability,
}

impl TrendReport {
    pub fn delta(&self, metric: TrendMetric) -> Option<&TrendDelta> {
        self.deltas.iter().find(|d| d.metric == metric)
    }
}

/// Adjacently tagged. With the tag first the body decodes without buffering,
/// and buffering would lose the exact-number form of its integer fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "details", rename_all = "snake_case")]
pub enum TrendAnalysis {
    InsufficientData { message: String },
    Available(TrendReport),
}

impl TrendAnalysis {
    pub fn report(&self) -> Option<&TrendReport> {
        match self {
            TrendAnalysis::Available(report) => Some(report),
            TrendAnalysis::InsufficientData { .. } => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

pub fn classify_direction(change: Decimal) -> TrendDirection {
    if change > DIRECTION_BAND {
        TrendDirection::Improving
    } else if change < -DIRECTION_BAND {
        TrendDirection::Deteriorating
    } else {
        TrendDirection::Stable
    }
}

pub fn classify_sustainability(positive: u32, negative: u32) -> Sustainability {
    if positive > 2 * negative {
        Sustainability::HighlySustainable
    } else if positive > negative {
        Sustainability::ModeratelySustainable
    } else if negative > positive {
        Sustainability::Concerning
    } else {
        Sustainability::Mixed
    }
}

fn delta(metric: TrendMetric, current: Decimal, prior: Decimal, change: Decimal) -> TrendDelta {
    TrendDelta {
        metric,
        current,
        prior,
        change,
        direction: classify_direction(change),
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compare `statements` with the most recent prior period.
pub fn analyze_trends(
    statements: &FinancialStatements,
    prior: Option<&FinancialStatements>,
) -> TrendAnalysis {
    let Some(prior) = prior else {
        return TrendAnalysis::InsufficientData {
            message: "At least one prior period is required for trend analysis.".into(),
        };
    };

    let mut deltas = Vec::new();

    let revenue = statements.amount(F::Revenue);
    let prior_revenue = prior.amount(F::Revenue);
    // Changes that leave Decimal's range are omitted like zero-denominator ones.
    let growth = revenue
        .checked_sub(prior_revenue)
        .and_then(|d| safe_ratio(d, prior_revenue));
    if let Some(growth) = growth {
        deltas.push(delta(TrendMetric::RevenueGrowth, revenue, prior_revenue, growth));
    }

    let margin = safe_ratio(statements.amount(F::NetIncome), revenue);
    let prior_margin = safe_ratio(prior.amount(F::NetIncome), prior_revenue);
    if let (Some(m), Some(pm)) = (margin, prior_margin) {
        if let Some(change) = m.checked_sub(pm) {
            deltas.push(delta(TrendMetric::NetMarginChange, m, pm, change));
        }
    }

    let turnover = safe_ratio(revenue, statements.amount(F::TotalAssets));
    let prior_turnover = safe_ratio(prior_revenue, prior.amount(F::TotalAssets));
    if let (Some(t), Some(pt)) = (turnover, prior_turnover) {
        if let Some(change) = t.checked_sub(pt) {
            deltas.push(delta(TrendMetric::AssetTurnoverChange, t, pt, change));
        }
    }

    let positive_signals = deltas.iter().filter(|d| d.change > SIGNIFICANCE_BAND).count() as u32;
    let negative_signals = deltas.iter().filter(|d| d.change < -SIGNIFICANCE_BAND).count() as u32;

    TrendAnalysis::Available(TrendReport {
        prior_period: prior.period.clone(),
        sustainability: classify_sustainability(positive_signals, negative_signals),
        deltas,
        positive_signals,
        negative_signals,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
