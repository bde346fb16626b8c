//! Standard financial ratio set.
//!
//! Every ratio guards its own denominator: a zero denominator omits the ratio
//! instead of producing a value. Omitted ratios are listed so callers can tell
//! "not computable" apart from "not requested".
//!
//! All arithmetic uses `rust_decimal::Decimal`. No `f64`.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::arithmetic::safe_ratio;
use crate::statements::{FinancialStatements, StatementField as F};
use crate::types::{Multiple, Rate};

// ---------------------------------------------------------------------------
// Ratio catalogue
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatioKind {
    GrossMargin,
    OperatingMargin,
    NetMargin,
    #[serde(rename = "roa")]
    ReturnOnAssets,
    #[serde(rename = "roe")]
    ReturnOnEquity,
    CurrentRatio,
    QuickRatio,
    CashRatio,
    DebtToEquity,
    DebtToAssets,
    EquityRatio,
    AssetTurnover,
    ReceivablesTurnover,
    InventoryTurnover,
    InterestCoverage,
    OperatingCashFlowRatio,
    CashConversion,
    EarningsPerShare,
    BookValuePerShare,
}

/// Whether a larger value of the ratio is favourable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatioDirection {
    HigherIsBetter,
    LowerIsBetter,
}

impl RatioKind {
    pub const ALL: [RatioKind; 19] = [
        RatioKind::GrossMargin,
        RatioKind::OperatingMargin,
        RatioKind::NetMargin,
        RatioKind::ReturnOnAssets,
        RatioKind::ReturnOnEquity,
        RatioKind::CurrentRatio,
        RatioKind::QuickRatio,
        RatioKind::CashRatio,
        RatioKind::DebtToEquity,
        RatioKind::DebtToAssets,
        RatioKind::EquityRatio,
        RatioKind::AssetTurnover,
        RatioKind::ReceivablesTurnover,
        RatioKind::InventoryTurnover,
        RatioKind::InterestCoverage,
        RatioKind::OperatingCashFlowRatio,
        RatioKind::CashConversion,
        RatioKind::EarningsPerShare,
        RatioKind::BookValuePerShare,
    ];

    pub fn direction(self) -> RatioDirection {
        match self {
            RatioKind::DebtToEquity | RatioKind::DebtToAssets => RatioDirection::LowerIsBetter,
            _ => RatioDirection::HigherIsBetter,
        }
    }

    /// Serialized key, as used in JSON ratio maps and benchmark tables.
    pub fn key(self) -> &'static str {
        match self {
            RatioKind::GrossMargin => "gross_margin",
            RatioKind::OperatingMargin => "operating_margin",
            RatioKind::NetMargin => "net_margin",
            RatioKind::ReturnOnAssets => "roa",
            RatioKind::ReturnOnEquity => "roe",
            RatioKind::CurrentRatio => "current_ratio",
            RatioKind::QuickRatio => "quick_ratio",
            RatioKind::CashRatio => "cash_ratio",
            RatioKind::DebtToEquity => "debt_to_equity",
            RatioKind::DebtToAssets => "debt_to_assets",
            RatioKind::EquityRatio => "equity_ratio",
            RatioKind::AssetTurnover => "asset_turnover",
            RatioKind::ReceivablesTurnover => "receivables_turnover",
            RatioKind::InventoryTurnover => "inventory_turnover",
            RatioKind::InterestCoverage => "interest_coverage",
            RatioKind::OperatingCashFlowRatio => "operating_cash_flow_ratio",
            RatioKind::CashConversion => "cash_conversion",
            RatioKind::EarningsPerShare => "earnings_per_share",
            RatioKind::BookValuePerShare => "book_value_per_share",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RatioKind::GrossMargin => "gross margin",
            RatioKind::OperatingMargin => "operating margin",
            RatioKind::NetMargin => "net margin",
            RatioKind::ReturnOnAssets => "return on assets",
            RatioKind::ReturnOnEquity => "return on equity",
            RatioKind::CurrentRatio => "current ratio",
            RatioKind::QuickRatio => "quick ratio",
            RatioKind::CashRatio => "cash ratio",
            RatioKind::DebtToEquity => "debt-to-equity",
            RatioKind::DebtToAssets => "debt-to-assets",
            RatioKind::EquityRatio => "equity ratio",
            RatioKind::AssetTurnover => "asset turnover",
            RatioKind::ReceivablesTurnover => "receivables turnover",
            RatioKind::InventoryTurnover => "inventory turnover",
            RatioKind::InterestCoverage => "interest coverage",
            RatioKind::OperatingCashFlowRatio => "operating cash flow ratio",
            RatioKind::CashConversion => "cash conversion",
            RatioKind::EarningsPerShare => "earnings per share",
            RatioKind::BookValuePerShare => "book value per share",
        }
    }

    /// The (numerator, denominator) pair this ratio divides, `None` when the
    /// numerator itself is out of range.
    fn operands(self, s: &FinancialStatements) -> Option<(Decimal, Decimal)> {
        let pair = match self {
            RatioKind::GrossMargin => (s.amount(F::GrossProfit), s.amount(F::Revenue)),
            RatioKind::OperatingMargin => (s.amount(F::OperatingIncome), s.amount(F::Revenue)),
            RatioKind::NetMargin => (s.amount(F::NetIncome), s.amount(F::Revenue)),
            RatioKind::ReturnOnAssets => (s.amount(F::NetIncome), s.amount(F::TotalAssets)),
            RatioKind::ReturnOnEquity => (s.amount(F::NetIncome), s.amount(F::ShareholdersEquity)),
            RatioKind::CurrentRatio => (s.amount(F::CurrentAssets), s.amount(F::CurrentLiabilities)),
            RatioKind::QuickRatio => (
                s.amount(F::CurrentAssets).checked_sub(s.amount(F::Inventory))?,
                s.amount(F::CurrentLiabilities),
            ),
            RatioKind::CashRatio => (
                s.amount(F::CashAndEquivalents),
                s.amount(F::CurrentLiabilities),
            ),
            RatioKind::DebtToEquity => (
                s.amount(F::TotalLiabilities),
                s.amount(F::ShareholdersEquity),
            ),
            RatioKind::DebtToAssets => (s.amount(F::TotalLiabilities), s.amount(F::TotalAssets)),
            RatioKind::EquityRatio => (s.amount(F::ShareholdersEquity), s.amount(F::TotalAssets)),
            RatioKind::AssetTurnover => (s.amount(F::Revenue), s.amount(F::TotalAssets)),
            RatioKind::ReceivablesTurnover => {
                (s.amount(F::Revenue), s.amount(F::AccountsReceivable))
            }
            RatioKind::InventoryTurnover => (s.amount(F::CostOfGoodsSold), s.amount(F::Inventory)),
            RatioKind::InterestCoverage => {
                (s.amount(F::OperatingIncome), s.amount(F::InterestExpense))
            }
            RatioKind::OperatingCashFlowRatio => (
                s.amount(F::NetCashFromOperations),
                s.amount(F::CurrentLiabilities),
            ),
            RatioKind::CashConversion => {
                (s.amount(F::NetCashFromOperations), s.amount(F::NetIncome))
            }
            RatioKind::EarningsPerShare => {
                (s.amount(F::NetIncome), s.amount(F::SharesOutstanding))
            }
            RatioKind::BookValuePerShare => (
                s.amount(F::ShareholdersEquity),
                s.amount(F::SharesOutstanding),
            ),
        };
        Some(pair)
    }

    /// Compute this ratio, `None` when its denominator is zero or the value
    /// falls outside `Decimal`'s range.
    pub fn compute(self, statements: &FinancialStatements) -> Option<Decimal> {
        let (numerator, denominator) = self.operands(statements)?;
        safe_ratio(numerator, denominator)
    }
}

impl std::fmt::Display for RatioKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Three-way DuPont decomposition: ROE = net margin x asset turnover x equity multiplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DupontDecomposition {
    pub net_profit_margin: Rate,
    pub asset_turnover: Multiple,
    pub equity_multiplier: Multiple,
    pub roe: Rate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioAnalysis {
    pub ratios: BTreeMap<RatioKind, Decimal>,
    /// Ratios not computed because a denominator was zero or the value was
    /// out of range.
    pub omitted: Vec<RatioKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dupont: Option<DupontDecomposition>,
}

impl RatioAnalysis {
    pub fn get(&self, kind: RatioKind) -> Option<Decimal> {
        self.ratios.get(&kind).copied()
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compute the full ratio set for one period.
pub fn calculate_ratios(statements: &FinancialStatements) -> RatioAnalysis {
    let mut ratios = BTreeMap::new();
    let mut omitted = Vec::new();

    for kind in RatioKind::ALL {
        match kind.compute(statements) {
            Some(value) => {
                ratios.insert(kind, value);
            }
            None => omitted.push(kind),
        }
    }

    RatioAnalysis {
        dupont: calculate_dupont(statements),
        ratios,
        omitted,
    }
}

fn calculate_dupont(s: &FinancialStatements) -> Option<DupontDecomposition> {
    let net_profit_margin = safe_ratio(s.amount(F::NetIncome), s.amount(F::Revenue))?;
    let asset_turnover = safe_ratio(s.amount(F::Revenue), s.amount(F::TotalAssets))?;
    let equity_multiplier = safe_ratio(s.amount(F::TotalAssets), s.amount(F::ShareholdersEquity))?;

    let roe = net_profit_margin
        .checked_mul(asset_turnover)?
        .checked_mul(equity_multiplier)?;

    Some(DupontDecomposition {
        net_profit_margin,
        asset_turnover,
        equity_multiplier,
        roe,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
