//! Composite health scores.
//!
//! Four independent 0-100 scores:
//! 1. **Financial health** -- mean of profitability, liquidity, solvency and
//!    cash-flow sub-scores (only those with a non-zero denominator).
//! 2. **Earnings quality** -- cash backing of earnings and receivables turnover.
//! 3. **Balance sheet strength** -- equity ratio, current ratio and cash share bands.
//! 4. **Cash-flow quality** -- sign and scale of the cash flow statement.
//!
//! Every score is clamped to [0, 100]; 50 is the neutral value. A ratio that
//! cannot be computed, whether from a zero denominator or an out-of-range
//! quotient, contributes nothing.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::arithmetic::{clamp_score, safe_ratio, scaled_score};
use crate::statements::{FinancialStatements, StatementField as F};
use crate::types::Score;

const NEUTRAL_SCORE: Decimal = dec!(50);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeScores {
    pub financial_health_score: Score,
    pub earnings_quality_score: Score,
    pub balance_sheet_strength: Score,
    pub cash_flow_quality: Score,
}

// ---------------------------------------------------------------------------
// Financial health
// ---------------------------------------------------------------------------

/// Mean of the computable sub-scores, or 50 when none can be computed.
pub fn financial_health_score(s: &FinancialStatements) -> Score {
    let revenue = s.amount(F::Revenue);
    let total_assets = s.amount(F::TotalAssets);

    let sub_scores: Vec<Score> = [
        // profitability
        safe_ratio(s.amount(F::NetIncome), revenue)
            .and_then(|m| scaled_score(m, dec!(0.1), dec!(500))),
        // liquidity
        safe_ratio(s.amount(F::CurrentAssets), s.amount(F::CurrentLiabilities))
            .and_then(|cr| scaled_score(cr, Decimal::ZERO, dec!(40))),
        // solvency
        safe_ratio(s.amount(F::ShareholdersEquity), total_assets)
            .and_then(|er| scaled_score(er, Decimal::ZERO, dec!(200))),
        // cash flow
        safe_ratio(s.amount(F::NetCashFromOperations), total_assets)
            .and_then(|r| scaled_score(r, dec!(0.05), dec!(1000))),
    ]
    .into_iter()
    .flatten()
    .collect();

    if sub_scores.is_empty() {
        return NEUTRAL_SCORE;
    }
    let total: Decimal = sub_scores.iter().copied().sum();
    clamp_score(total / Decimal::from(sub_scores.len() as u64))
}

// ---------------------------------------------------------------------------
// Earnings quality
// ---------------------------------------------------------------------------

pub fn earnings_quality_score(s: &FinancialStatements) -> Score {
    let net_income = s.amount(F::NetIncome);
    let revenue = s.amount(F::Revenue);
    let receivables = s.amount(F::AccountsReceivable);

    let mut score = NEUTRAL_SCORE;

    let cash_backing = if net_income > Decimal::ZERO {
        safe_ratio(s.amount(F::NetCashFromOperations), net_income)
    } else {
        None
    };
    if let Some(cash_backing) = cash_backing {
        score += if cash_backing >= dec!(1.0) {
            dec!(30)
        } else if cash_backing >= dec!(0.8) {
            dec!(20)
        } else if cash_backing >= dec!(0.6) {
            dec!(10)
        } else {
            dec!(-10)
        };
    }

    let turnover = if revenue > Decimal::ZERO && receivables > Decimal::ZERO {
        safe_ratio(revenue, receivables)
    } else {
        None
    };
    if let Some(turnover) = turnover {
        if turnover >= dec!(8) {
            score += dec!(10);
        } else if turnover < dec!(4) {
            score -= dec!(10);
        }
    }

    clamp_score(score)
}

// ---------------------------------------------------------------------------
// Balance sheet strength
// ---------------------------------------------------------------------------

pub fn balance_sheet_strength(s: &FinancialStatements) -> Score {
    let total_assets = s.amount(F::TotalAssets);
    let mut score = NEUTRAL_SCORE;

    if let Some(equity_ratio) = safe_ratio(s.amount(F::ShareholdersEquity), total_assets) {
        score += if equity_ratio >= dec!(0.6) {
            dec!(25)
        } else if equity_ratio >= dec!(0.4) {
            dec!(15)
        } else if equity_ratio >= dec!(0.2) {
            dec!(5)
        } else {
            dec!(-15)
        };
    }

    if let Some(current_ratio) =
        safe_ratio(s.amount(F::CurrentAssets), s.amount(F::CurrentLiabilities))
    {
        score += if current_ratio >= dec!(2.0) {
            dec!(15)
        } else if current_ratio >= dec!(1.5) {
            dec!(10)
        } else if current_ratio >= dec!(1.0) {
            dec!(5)
        } else {
            dec!(-20)
        };
    }

    if let Some(cash_share) = safe_ratio(s.amount(F::CashAndEquivalents), total_assets) {
        if cash_share >= dec!(0.15) {
            score += dec!(10);
        } else if cash_share < dec!(0.05) {
            score -= dec!(10);
        }
    }

    clamp_score(score)
}

// ---------------------------------------------------------------------------
// Cash-flow quality
// ---------------------------------------------------------------------------

pub fn cash_flow_quality(s: &FinancialStatements) -> Score {
    let operating = s.amount(F::NetCashFromOperations);
    let mut score = NEUTRAL_SCORE;

    if operating > Decimal::ZERO {
        score += dec!(25);
    } else {
        score -= dec!(25);
    }
    if operating > s.amount(F::NetCashFromInvesting) {
        score += dec!(15);
    }
    let stable = s
        .amount(F::TotalAssets)
        .checked_mul(dec!(0.1))
        .is_some_and(|limit| s.amount(F::NetChangeInCash).abs() < limit);
    if stable {
        score += dec!(10);
    }

    clamp_score(score)
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compute all four composite scores.
pub fn score_composites(statements: &FinancialStatements) -> CompositeScores {
    CompositeScores {
        financial_health_score: financial_health_score(statements),
        earnings_quality_score: earnings_quality_score(statements),
        balance_sheet_strength: balance_sheet_strength(statements),
        cash_flow_quality: cash_flow_quality(statements),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
