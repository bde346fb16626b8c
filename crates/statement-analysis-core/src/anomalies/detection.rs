//! Rule-based anomaly detection.
//!
//! Checks run in a fixed order and each appends zero or more findings:
//! revenue -> expense -> asset -> cash flow -> ratio -> industry deviation.
//! There is no deduplication and no early exit, so identical input always
//! yields an identical, identically ordered list.
//!
//! Threshold ratios with a zero denominator or an out-of-range quotient are
//! treated as `+∞` (see [`crate::arithmetic::threshold_ratio`]). Differences
//! and sums that leave `Decimal`'s range count as exceeding their limit.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::arithmetic::{checked_sum, threshold_ratio, RatioValue};
use crate::ratios::{IndustryBenchmarks, RatioKind};
use crate::statements::{FinancialStatements, StatementField as F};

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyType {
    RevenueManipulation,
    ExpenseManipulation,
    AssetOverstatement,
    LiabilityUnderstatement,
    CashFlowMismatch,
    RatioInconsistency,
    SeasonalAnomaly,
    IndustryDeviation,
}

impl AnomalyType {
    pub fn label(self) -> &'static str {
        match self {
            AnomalyType::RevenueManipulation => "revenue manipulation",
            AnomalyType::ExpenseManipulation => "expense manipulation",
            AnomalyType::AssetOverstatement => "asset overstatement",
            AnomalyType::LiabilityUnderstatement => "liability understatement",
            AnomalyType::CashFlowMismatch => "cash flow mismatch",
            AnomalyType::RatioInconsistency => "ratio inconsistency",
            AnomalyType::SeasonalAnomaly => "seasonal anomaly",
            AnomalyType::IndustryDeviation => "industry deviation",
        }
    }

    /// Fixed audit procedure recommended when this anomaly type is present.
    pub fn audit_procedure(self) -> &'static str {
        match self {
            AnomalyType::RevenueManipulation => {
                "Perform revenue cut-off testing and confirm significant receivable balances with customers."
            }
            AnomalyType::ExpenseManipulation => {
                "Analyse cost of goods sold and expense classification for capitalisation or deferral of period costs."
            }
            AnomalyType::AssetOverstatement => {
                "Test intangible assets and goodwill for impairment and verify the basis of capitalised amounts."
            }
            AnomalyType::LiabilityUnderstatement => {
                "Search for unrecorded liabilities, including post-period disbursements and off-balance-sheet commitments."
            }
            AnomalyType::CashFlowMismatch => {
                "Reconcile the cash flow statement to bank statements and to changes in balance sheet accounts."
            }
            AnomalyType::RatioInconsistency => {
                "Review debt agreements, covenant compliance and going-concern indicators."
            }
            AnomalyType::SeasonalAnomaly => {
                "Compare interim results against prior-year seasonal patterns and investigate unexplained swings."
            }
            AnomalyType::IndustryDeviation => {
                "Benchmark margins against industry peers and obtain management explanations for material deviations."
            }
        }
    }
}

impl std::fmt::Display for AnomalyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
            Severity::Critical => "Critical",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyDetection {
    pub anomaly_type: AnomalyType,
    pub severity: Severity,
    /// 0-1
    pub confidence: Decimal,
    pub description: String,
    pub affected_accounts: Vec<String>,
    pub suggested_investigation: Vec<String>,
    /// Roughly 0-100, not clamped.
    pub risk_score: Decimal,
}

impl AnomalyDetection {
    pub fn is_high_priority(&self) -> bool {
        self.severity >= Severity::High
    }
}

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const CASH_BACKING_FLOOR: Decimal = dec!(0.7);
const RECEIVABLES_GROWTH_LIMIT: Decimal = dec!(1.3);
const GROSS_MARGIN_SHIFT: Decimal = dec!(0.05);
const GROSS_MARGIN_SHIFT_HIGH: Decimal = dec!(0.10);
const INTANGIBLES_SHARE_LIMIT: Decimal = dec!(0.4);
const CASH_SHARE_FLOOR: Decimal = dec!(0.05);
const CASH_FLOW_TOLERANCE: Decimal = dec!(0.01);
const CURRENT_RATIO_FLOOR: Decimal = Decimal::ONE;
/// Debt-to-equity benchmark when the industry table lacks one.
pub const DEFAULT_DEBT_TO_EQUITY_BENCHMARK: Decimal = dec!(0.5);
const INDUSTRY_MARGIN_DEVIATION: Decimal = dec!(0.20);

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn finding(
    anomaly_type: AnomalyType,
    severity: Severity,
    confidence: Decimal,
    risk_score: Decimal,
    description: String,
    affected: &[F],
    investigation: &[&str],
) -> AnomalyDetection {
    AnomalyDetection {
        anomaly_type,
        severity,
        confidence,
        description,
        affected_accounts: affected.iter().map(|f| f.name().to_string()).collect(),
        suggested_investigation: investigation.iter().map(|s| s.to_string()).collect(),
        risk_score,
    }
}

fn gross_margin(s: &FinancialStatements) -> RatioValue {
    threshold_ratio(s.amount(F::GrossProfit), s.amount(F::Revenue))
}

const OUT_OF_RANGE: &str = "an out-of-range amount";

fn points(value: Decimal) -> String {
    match value.checked_mul(dec!(100)) {
        Some(v) => v.round_dp(1).to_string(),
        None => OUT_OF_RANGE.to_string(),
    }
}

fn pct(value: Decimal) -> String {
    match value.checked_mul(dec!(100)) {
        Some(v) => format!("{}%", v.round_dp(1)),
        None => OUT_OF_RANGE.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Checks
// ---------------------------------------------------------------------------

fn check_revenue(
    s: &FinancialStatements,
    prior: Option<&FinancialStatements>,
    out: &mut Vec<AnomalyDetection>,
) {
    let net_income = s.amount(F::NetIncome);
    let operating_cf = s.amount(F::NetCashFromOperations);

    let weakly_backed = net_income
        .checked_mul(CASH_BACKING_FLOOR)
        .is_some_and(|floor| operating_cf < floor);
    if weakly_backed {
        out.push(finding(
            AnomalyType::RevenueManipulation,
            Severity::Medium,
            dec!(0.7),
            dec!(65),
            format!(
                "Operating cash flow ({operating_cf}) is below 70% of net income ({net_income}); earnings are weakly backed by cash"
            ),
            &[F::NetIncome, F::NetCashFromOperations, F::Revenue],
            &[
                "Review revenue recognition policies and timing",
                "Analyse working capital movements behind the cash shortfall",
                "Test a sample of period-end sales transactions",
            ],
        ));
    }

    let Some(prior) = prior else {
        return;
    };

    let dso_proxy = threshold_ratio(s.amount(F::AccountsReceivable), s.amount(F::Revenue));
    let prior_dso_proxy =
        threshold_ratio(prior.amount(F::AccountsReceivable), prior.amount(F::Revenue));

    let receivables_outpace_revenue = match (dso_proxy, prior_dso_proxy) {
        (_, RatioValue::Infinite) => false,
        (RatioValue::Infinite, RatioValue::Finite(_)) => true,
        (RatioValue::Finite(current), RatioValue::Finite(previous)) => {
            // a limit beyond range cannot be exceeded
            previous
                .checked_mul(RECEIVABLES_GROWTH_LIMIT)
                .is_some_and(|limit| current > limit)
        }
    };

    if receivables_outpace_revenue {
        out.push(finding(
            AnomalyType::RevenueManipulation,
            Severity::High,
            dec!(0.8),
            dec!(80),
            format!(
                "Receivables-to-revenue rose from {prior_dso_proxy} to {dso_proxy}, more than 30% above the prior period"
            ),
            &[F::AccountsReceivable, F::Revenue],
            &[
                "Confirm receivable balances directly with customers",
                "Review credit terms and any changes to collection policy",
                "Test for bill-and-hold or channel-stuffing arrangements",
            ],
        ));
    }
}

fn check_expenses(
    s: &FinancialStatements,
    prior: Option<&FinancialStatements>,
    out: &mut Vec<AnomalyDetection>,
) {
    let Some(prior) = prior else {
        return;
    };
    // A change between undefined margins is itself undefined.
    let (Some(margin), Some(prior_margin)) = (gross_margin(s).finite(), gross_margin(prior).finite())
    else {
        return;
    };

    // Saturates: a shift beyond range is the largest possible shift.
    let change = margin.saturating_sub(prior_margin).abs();
    if change > GROSS_MARGIN_SHIFT {
        let severity = if change > GROSS_MARGIN_SHIFT_HIGH {
            Severity::High
        } else {
            Severity::Medium
        };
        out.push(finding(
            AnomalyType::ExpenseManipulation,
            severity,
            dec!(0.6),
            dec!(60).saturating_add(change.saturating_mul(dec!(200))),
            format!(
                "Gross margin moved from {} to {} ({} percentage points)",
                pct(prior_margin),
                pct(margin),
                points(change)
            ),
            &[F::CostOfGoodsSold, F::GrossProfit, F::Revenue],
            &[
                "Analyse cost of goods sold by component",
                "Review inventory valuation and costing methods",
                "Check classification of expenses between COGS and operating expenses",
            ],
        ));
    }
}

fn check_assets(s: &FinancialStatements, out: &mut Vec<AnomalyDetection>) {
    let total_assets = s.amount(F::TotalAssets);

    let intangibles_share = threshold_ratio(s.amount(F::IntangibleAssets), total_assets);
    if intangibles_share.above(INTANGIBLES_SHARE_LIMIT) {
        out.push(finding(
            AnomalyType::AssetOverstatement,
            Severity::Medium,
            dec!(0.6),
            dec!(55),
            format!("Intangible assets make up {intangibles_share} of total assets, above 40%"),
            &[F::IntangibleAssets, F::TotalAssets],
            &[
                "Review impairment testing of intangible assets",
                "Verify the valuation basis of acquired intangibles",
            ],
        ));
    }

    let cash_share = threshold_ratio(s.amount(F::CashAndEquivalents), total_assets);
    if cash_share.below(CASH_SHARE_FLOOR) && s.amount(F::NetIncome) > Decimal::ZERO {
        out.push(finding(
            AnomalyType::CashFlowMismatch,
            Severity::Medium,
            dec!(0.7),
            dec!(60),
            format!("Cash is only {cash_share} of total assets despite positive net income"),
            &[F::CashAndEquivalents, F::TotalAssets, F::NetIncome],
            &[
                "Trace reported profits to cash receipts",
                "Review restrictions on cash and cash equivalents",
            ],
        ));
    }
}

fn check_cash_flow(s: &FinancialStatements, out: &mut Vec<AnomalyDetection>) {
    let operating = s.amount(F::NetCashFromOperations);
    let investing = s.amount(F::NetCashFromInvesting);
    let financing = s.amount(F::NetCashFromFinancing);
    let net_change = s.amount(F::NetChangeInCash);

    let gap = checked_sum([operating, investing, financing, -net_change]).map(|g| g.abs());
    let tolerance = s.amount(F::TotalAssets).checked_mul(CASH_FLOW_TOLERANCE);
    if gap.map_or(true, |g| tolerance.is_some_and(|t| g > t)) {
        let gap = gap.map_or_else(|| OUT_OF_RANGE.to_string(), |g| g.to_string());
        out.push(finding(
            AnomalyType::CashFlowMismatch,
            Severity::High,
            dec!(0.9),
            dec!(85),
            format!(
                "Operating, investing and financing cash flows differ from the net change in cash by {gap}"
            ),
            &[
                F::NetCashFromOperations,
                F::NetCashFromInvesting,
                F::NetCashFromFinancing,
                F::NetChangeInCash,
            ],
            &[
                "Reconcile the cash flow statement line by line",
                "Check for unclassified or netted cash movements",
                "Verify foreign exchange effects on cash",
            ],
        ));
    }

    let net_income = s.amount(F::NetIncome);
    if operating < Decimal::ZERO && net_income > Decimal::ZERO {
        out.push(finding(
            AnomalyType::CashFlowMismatch,
            Severity::High,
            dec!(0.8),
            dec!(75),
            format!(
                "Negative operating cash flow ({operating}) alongside positive net income ({net_income})"
            ),
            &[F::NetCashFromOperations, F::NetIncome],
            &[
                "Analyse accrual components of earnings",
                "Review receivable and inventory build-up",
                "Assess sustainability of reported profits",
            ],
        ));
    }
}

fn check_ratios(
    s: &FinancialStatements,
    benchmarks: Option<&IndustryBenchmarks>,
    out: &mut Vec<AnomalyDetection>,
) {
    let current_ratio = threshold_ratio(s.amount(F::CurrentAssets), s.amount(F::CurrentLiabilities));
    if current_ratio.below(CURRENT_RATIO_FLOOR) {
        out.push(finding(
            AnomalyType::RatioInconsistency,
            Severity::High,
            dec!(0.9),
            dec!(80),
            format!("Current ratio of {current_ratio} is below 1.0"),
            &[F::CurrentAssets, F::CurrentLiabilities],
            &[
                "Assess short-term liquidity and refinancing needs",
                "Review classification of current liabilities",
            ],
        ));
    }

    let benchmark_de = benchmarks
        .and_then(|b| b.get(RatioKind::DebtToEquity))
        .unwrap_or(DEFAULT_DEBT_TO_EQUITY_BENCHMARK);
    let debt_to_equity =
        threshold_ratio(s.amount(F::TotalLiabilities), s.amount(F::ShareholdersEquity));
    let leveraged = match benchmark_de.checked_mul(dec!(2)) {
        Some(limit) => debt_to_equity.above(limit),
        None => debt_to_equity == RatioValue::Infinite,
    };
    if leveraged {
        out.push(finding(
            AnomalyType::RatioInconsistency,
            Severity::Medium,
            dec!(0.7),
            dec!(65),
            format!(
                "Debt-to-equity of {debt_to_equity} exceeds twice the industry benchmark of {benchmark_de}"
            ),
            &[F::TotalLiabilities, F::ShareholdersEquity],
            &[
                "Review debt covenants and maturity profile",
                "Assess capacity to service existing obligations",
            ],
        ));
    }
}

fn check_industry(
    s: &FinancialStatements,
    benchmarks: Option<&IndustryBenchmarks>,
    out: &mut Vec<AnomalyDetection>,
) {
    let Some(benchmark_gm) = benchmarks.and_then(|b| b.get(RatioKind::GrossMargin)) else {
        return;
    };

    let margin = gross_margin(s);
    let deviates = match margin {
        RatioValue::Finite(m) => m
            .checked_sub(benchmark_gm)
            .map_or(true, |d| d.abs() > INDUSTRY_MARGIN_DEVIATION),
        RatioValue::Infinite => true,
    };

    if deviates {
        out.push(finding(
            AnomalyType::IndustryDeviation,
            Severity::Medium,
            dec!(0.6),
            dec!(50),
            format!(
                "Gross margin of {margin} deviates from the industry benchmark of {benchmark_gm} by more than 20 percentage points"
            ),
            &[F::GrossProfit, F::Revenue],
            &[
                "Compare pricing and cost structure with industry peers",
                "Obtain management explanation for the margin profile",
            ],
        ));
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Run every anomaly check in order against one period's statements.
///
/// `prior` is the most recent earlier period, if any. `benchmarks` is the
/// resolved industry benchmark set; without one the debt-to-equity check uses
/// [`DEFAULT_DEBT_TO_EQUITY_BENCHMARK`] and the industry check is skipped.
pub fn detect_anomalies(
    statements: &FinancialStatements,
    prior: Option<&FinancialStatements>,
    benchmarks: Option<&IndustryBenchmarks>,
) -> Vec<AnomalyDetection> {
    let mut anomalies = Vec::new();
    check_revenue(statements, prior, &mut anomalies);
    check_expenses(statements, prior, &mut anomalies);
    check_assets(statements, &mut anomalies);
    check_cash_flow(statements, &mut anomalies);
    check_ratios(statements, benchmarks, &mut anomalies);
    check_industry(statements, benchmarks, &mut anomalies);
    anomalies
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ratios::industry::{BenchmarkTable, RETAIL, TECHNOLOGY};

    fn canonical() -> FinancialStatements {
        FinancialStatements {
            revenue: Some(dec!(2_000_000)),
            cost_of_goods_sold: Some(dec!(1_200_000)),
            gross_profit: Some(dec!(800_000)),
            operating_income: Some(dec!(300_000)),
            net_income: Some(dec!(220_000)),
            cash_and_equivalents: Some(dec!(150_000)),
            accounts_receivable: Some(dec!(300_000)),
            inventory: Some(dec!(200_000)),
            current_assets: Some(dec!(700_000)),
            total_assets: Some(dec!(1_800_000)),
            current_liabilities: Some(dec!(400_000)),
            total_liabilities: Some(dec!(1_100_000)),
            shareholders_equity: Some(dec!(700_000)),
            net_cash_from_operations: Some(dec!(250_000)),
            net_cash_from_investing: Some(dec!(-150_000)),
            net_cash_from_financing: Some(dec!(-50_000)),
            net_change_in_cash: Some(dec!(50_000)),
            beginning_cash: Some(dec!(100_000)),
            ending_cash: Some(dec!(150_000)),
            ..Default::default()
        }
    }

    fn types(anomalies: &[AnomalyDetection]) -> Vec<AnomalyType> {
        anomalies.iter().map(|a| a.anomaly_type).collect()
    }

    #[test]
    fn test_canonical_fixture_technology() {
        let table = BenchmarkTable::default();
        let out = detect_anomalies(&canonical(), None, table.get(TECHNOLOGY));
        assert_eq!(
            types(&out),
            vec![AnomalyType::RatioInconsistency, AnomalyType::IndustryDeviation]
        );
        assert_eq!(out[0].severity, Severity::Medium);
        assert_eq!(out[0].risk_score, dec!(65));
        assert_eq!(out[1].confidence, dec!(0.6));
        assert_eq!(out[1].risk_score, dec!(50));
    }

    #[test]
    fn test_weak_cash_backing_flags_revenue() {
        let mut s = canonical();
        s.net_cash_from_operations = Some(dec!(100_000));
        s.net_change_in_cash = Some(dec!(-100_000));
        s.ending_cash = Some(Decimal::ZERO);
        let out = detect_anomalies(&s, None, None);
        assert_eq!(out[0].anomaly_type, AnomalyType::RevenueManipulation);
        assert_eq!(out[0].severity, Severity::Medium);
        assert_eq!(out[0].risk_score, dec!(65));
    }

    #[test]
    fn test_receivables_growth_needs_history() {
        let prior = canonical();
        let mut s = canonical();
        s.accounts_receivable = Some(dec!(420_000)); // 0.21 vs 0.15 => +40%
        let without = detect_anomalies(&s, None, None);
        assert!(!without.iter().any(|a| a.severity == Severity::High
            && a.anomaly_type == AnomalyType::RevenueManipulation));

        let with = detect_anomalies(&s, Some(&prior), None);
        let hit = with
            .iter()
            .find(|a| a.anomaly_type == AnomalyType::RevenueManipulation)
            .unwrap();
        assert_eq!(hit.severity, Severity::High);
        assert_eq!(hit.confidence, dec!(0.8));
        assert_eq!(hit.risk_score, dec!(80));
    }

    #[test]
    fn test_receivables_growth_at_limit_not_flagged() {
        let prior = canonical();
        let mut s = canonical();
        s.accounts_receivable = Some(dec!(390_000)); // exactly +30%
        let out = detect_anomalies(&s, Some(&prior), None);
        assert!(!out.iter().any(|a| a.anomaly_type == AnomalyType::RevenueManipulation));
    }

    #[test]
    fn test_gross_margin_shift_severity_and_risk() {
        let prior = canonical();
        let mut s = canonical();
        // margin 0.40 -> 0.47: change 0.07 => medium, risk 60 + 14
        s.cost_of_goods_sold = Some(dec!(1_060_000));
        s.gross_profit = Some(dec!(940_000));
        let out = detect_anomalies(&s, Some(&prior), None);
        let hit = out
            .iter()
            .find(|a| a.anomaly_type == AnomalyType::ExpenseManipulation)
            .unwrap();
        assert_eq!(hit.severity, Severity::Medium);
        assert_eq!(hit.risk_score, dec!(74));

        // margin 0.40 -> 0.55: change 0.15 => high, risk 90
        s.cost_of_goods_sold = Some(dec!(900_000));
        s.gross_profit = Some(dec!(1_100_000));
        let out = detect_anomalies(&s, Some(&prior), None);
        let hit = out
            .iter()
            .find(|a| a.anomaly_type == AnomalyType::ExpenseManipulation)
            .unwrap();
        assert_eq!(hit.severity, Severity::High);
        assert_eq!(hit.risk_score, dec!(90));
    }

    #[test]
    fn test_intangibles_and_low_cash() {
        let mut s = canonical();
        s.intangible_assets = Some(dec!(900_000));
        s.cash_and_equivalents = Some(dec!(50_000));
        let out = detect_anomalies(&s, None, None);
        assert_eq!(
            types(&out),
            vec![
                AnomalyType::AssetOverstatement,
                AnomalyType::CashFlowMismatch,
                AnomalyType::RatioInconsistency,
            ]
        );
        assert_eq!(out[1].risk_score, dec!(60));
    }

    #[test]
    fn test_cash_flow_reconciliation_gap() {
        let mut s = canonical();
        s.net_change_in_cash = Some(dec!(90_000)); // gap 40k > 18k
        let out = detect_anomalies(&s, None, None);
        let hit = out
            .iter()
            .find(|a| a.anomaly_type == AnomalyType::CashFlowMismatch)
            .unwrap();
        assert_eq!(hit.severity, Severity::High);
        assert_eq!(hit.confidence, dec!(0.9));
        assert_eq!(hit.risk_score, dec!(85));
    }

    #[test]
    fn test_negative_operating_cash_with_profit() {
        let mut s = canonical();
        s.net_cash_from_operations = Some(dec!(-10_000));
        s.net_cash_from_financing = Some(dec!(210_000));
        let out = detect_anomalies(&s, None, None);
        // revenue check fires first, then the negative operating cash check
        assert_eq!(out[0].anomaly_type, AnomalyType::RevenueManipulation);
        assert!(out
            .iter()
            .any(|a| a.anomaly_type == AnomalyType::CashFlowMismatch && a.risk_score == dec!(75)));
    }

    #[test]
    fn test_current_ratio_below_one() {
        let mut s = canonical();
        s.current_liabilities = Some(dec!(800_000));
        let out = detect_anomalies(&s, None, None);
        let hit = &out[0];
        assert_eq!(hit.anomaly_type, AnomalyType::RatioInconsistency);
        assert_eq!(hit.severity, Severity::High);
        assert_eq!(hit.risk_score, dec!(80));
    }

    #[test]
    fn test_zero_current_liabilities_never_flags_liquidity() {
        let mut s = canonical();
        s.current_liabilities = Some(Decimal::ZERO);
        let out = detect_anomalies(&s, None, None);
        assert!(!out.iter().any(|a| a.severity == Severity::High
            && a.anomaly_type == AnomalyType::RatioInconsistency));
    }

    #[test]
    fn test_zero_equity_is_infinite_leverage() {
        let mut s = canonical();
        s.shareholders_equity = Some(Decimal::ZERO);
        let out = detect_anomalies(&s, None, None);
        assert!(out
            .iter()
            .any(|a| a.anomaly_type == AnomalyType::RatioInconsistency && a.risk_score == dec!(65)));
    }

    #[test]
    fn test_default_debt_to_equity_benchmark_without_industry() {
        // 1.571 > 2 x 0.5
        let out = detect_anomalies(&canonical(), None, None);
        assert_eq!(types(&out), vec![AnomalyType::RatioInconsistency]);
    }

    #[test]
    fn test_retail_benchmarks_are_lenient_on_canonical() {
        // retail D/E benchmark 0.8 => limit 1.6; gross margin 0.40 vs 0.35
        let table = BenchmarkTable::default();
        let out = detect_anomalies(&canonical(), None, table.get(RETAIL));
        assert!(out.is_empty());
    }

    #[test]
    fn test_detection_is_deterministic() {
        let table = BenchmarkTable::default();
        let mut s = canonical();
        s.intangible_assets = Some(dec!(1_000_000));
        s.net_cash_from_operations = Some(dec!(-5_000));
        let a = detect_anomalies(&s, Some(&canonical()), table.get(TECHNOLOGY));
        let b = detect_anomalies(&s, Some(&canonical()), table.get(TECHNOLOGY));
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_statements_do_not_panic() {
        let out = detect_anomalies(&FinancialStatements::default(), None, None);
        // 0/0 intangibles share and 0/0 leverage are infinite
        assert_eq!(
            types(&out),
            vec![AnomalyType::AssetOverstatement, AnomalyType::RatioInconsistency]
        );
    }

    #[test]
    fn test_cash_flow_sum_beyond_range_is_a_mismatch() {
        let mut s = canonical();
        s.net_cash_from_operations = Some(dec!(50_000_000_000_000_000_000_000_000_000));
        s.net_cash_from_investing = Some(dec!(50_000_000_000_000_000_000_000_000_000));
        let out = detect_anomalies(&s, None, None);
        let hit = out
            .iter()
            .find(|a| a.anomaly_type == AnomalyType::CashFlowMismatch && a.risk_score == dec!(85))
            .unwrap();
        assert!(hit.description.ends_with("by an out-of-range amount"));
    }

    #[test]
    fn test_tiny_denominators_do_not_panic() {
        let prior = canonical();
        let s = FinancialStatements {
            revenue: Some(dec!(0.000000000000000001)),
            gross_profit: Some(dec!(1_000_000_000_000)),
            net_income: Some(dec!(0.000000000000000001)),
            net_cash_from_operations: Some(dec!(1_000_000_000_000)),
            ..Default::default()
        };
        let table = BenchmarkTable::default();
        let out = detect_anomalies(&s, Some(&prior), table.get(TECHNOLOGY));
        // 1e12 / 1e-18 overflows, so the current margin is unbounded and the
        // expense check is skipped while the industry check flags it
        assert!(!out.iter().any(|a| a.anomaly_type == AnomalyType::ExpenseManipulation));
        assert!(out.iter().any(|a| a.anomaly_type == AnomalyType::IndustryDeviation));
    }

    #[test]
    fn test_margin_shift_beyond_range_saturates_risk() {
        let mut prior = canonical();
        prior.gross_profit = Some(dec!(-70_000_000_000_000_000_000_000_000_000));
        prior.revenue = Some(Decimal::ONE);
        let mut s = canonical();
        s.gross_profit = Some(dec!(70_000_000_000_000_000_000_000_000_000));
        s.revenue = Some(Decimal::ONE);
        let out = detect_anomalies(&s, Some(&prior), None);
        let hit = out
            .iter()
            .find(|a| a.anomaly_type == AnomalyType::ExpenseManipulation)
            .unwrap();
        assert_eq!(hit.severity, Severity::High);
        assert_eq!(hit.risk_score, Decimal::MAX);
        assert!(hit.description.contains("out-of-range"));
    }

    #[test]
    fn test_type_serializes_snake_case() {
        let json = serde_json::to_string(&AnomalyType::CashFlowMismatch).unwrap();
        assert_eq!(json, "\"cash_flow_mismatch\"");
    }
}
