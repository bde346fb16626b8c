//! Statement quality assessment.
//!
//! Scores five independent quality metrics on a 0-100 scale:
//! 1. **Completeness** -- share of required line items reported.
//! 2. **Consistency** -- accounting identities hold.
//! 3. **Accuracy** -- values are plausible.
//! 4. **Transparency** -- headline figures are not suspiciously rounded.
//! 5. **Comparability** -- period-over-period changes are within normal ranges.
//!
//! Reliability grade (on the mean of the five):
//! - >= 95 "A+", >= 90 "A", >= 85 "B+", >= 80 "B", >= 75 "C+",
//!   >= 70 "C", >= 65 "D+", >= 60 "D", else "F"

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::arithmetic::{clamp_score, safe_ratio, threshold_ratio, RatioValue};
use crate::statements::{FinancialStatements, StatementField as F, REQUIRED_FIELDS};
use crate::types::Score;

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityMetric {
    Completeness,
    Consistency,
    Accuracy,
    Transparency,
    Comparability,
}

impl QualityMetric {
    pub const ALL: [QualityMetric; 5] = [
        QualityMetric::Completeness,
        QualityMetric::Consistency,
        QualityMetric::Accuracy,
        QualityMetric::Transparency,
        QualityMetric::Comparability,
    ];

    pub fn name(self) -> &'static str {
        match self {
            QualityMetric::Completeness => "completeness",
            QualityMetric::Consistency => "consistency",
            QualityMetric::Accuracy => "accuracy",
            QualityMetric::Transparency => "transparency",
            QualityMetric::Comparability => "comparability",
        }
    }

    /// Fixed improvement recommendation for a metric scoring below 75.
    pub fn improvement_recommendation(self) -> &'static str {
        match self {
            QualityMetric::Completeness => {
                "Report all core line items (revenue, net income, total assets, total liabilities, equity and operating cash flow)."
            }
            QualityMetric::Consistency => {
                "Reconcile the balance sheet, gross profit and cash roll-forward before publishing statements."
            }
            QualityMetric::Accuracy => {
                "Review reported values for implausible amounts such as non-positive revenue or liabilities far exceeding assets."
            }
            QualityMetric::Transparency => {
                "Report figures at their actual precision rather than rounded estimates and disclose estimation methods."
            }
            QualityMetric::Comparability => {
                "Explain large period-over-period changes and keep accounting policies consistent across periods."
            }
        }
    }
}

impl std::fmt::Display for QualityMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ReliabilityGrade {
    #[serde(rename = "A+")]
    APlus,
    A,
    #[serde(rename = "B+")]
    BPlus,
    B,
    #[serde(rename = "C+")]
    CPlus,
    C,
    #[serde(rename = "D+")]
    DPlus,
    D,
    F,
}

impl ReliabilityGrade {
    /// Step function on the overall score; a score on a boundary takes the higher grade.
    pub fn from_score(score: Score) -> Self {
        if score >= dec!(95) {
            Self::APlus
        } else if score >= dec!(90) {
            Self::A
        } else if score >= dec!(85) {
            Self::BPlus
        } else if score >= dec!(80) {
            Self::B
        } else if score >= dec!(75) {
            Self::CPlus
        } else if score >= dec!(70) {
            Self::C
        } else if score >= dec!(65) {
            Self::DPlus
        } else if score >= dec!(60) {
            Self::D
        } else {
            Self::F
        }
    }

    /// D+ and below.
    pub fn is_poor(self) -> bool {
        self >= Self::DPlus
    }
}

impl std::fmt::Display for ReliabilityGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::APlus => "A+",
            Self::A => "A",
            Self::BPlus => "B+",
            Self::B => "B",
            Self::CPlus => "C+",
            Self::C => "C",
            Self::DPlus => "D+",
            Self::D => "D",
            Self::F => "F",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityAssessment {
    pub overall_score: Score,
    pub quality_metrics: BTreeMap<QualityMetric, Score>,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub improvement_recommendations: Vec<String>,
    pub reliability_grade: ReliabilityGrade,
}

impl QualityAssessment {
    pub fn metric(&self, metric: QualityMetric) -> Score {
        self.quality_metrics
            .get(&metric)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }
}

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const FULL_SCORE: Decimal = dec!(100);
const TRANSPARENCY_BASE: Decimal = dec!(75);
const COMPARABILITY_NEUTRAL: Decimal = dec!(60);
const ROUND_NUMBER_UNIT: Decimal = dec!(10_000);
const STRENGTH_THRESHOLD: Decimal = dec!(85);
const WEAKNESS_THRESHOLD: Decimal = dec!(65);
const RECOMMENDATION_THRESHOLD: Decimal = dec!(75);

// ---------------------------------------------------------------------------
// Metric scorers
// ---------------------------------------------------------------------------

fn score_completeness(s: &FinancialStatements) -> Score {
    let present = REQUIRED_FIELDS.iter().filter(|f| s.is_reported(**f)).count();
    let share = Decimal::from(present as u64) / Decimal::from(REQUIRED_FIELDS.len() as u64);
    clamp_score(share * FULL_SCORE)
}

fn score_consistency(s: &FinancialStatements) -> Score {
    let mut score = FULL_SCORE;
    if !s.balance_sheet_balances() {
        score -= dec!(20);
    }
    if !s.gross_profit_reconciles() {
        score -= dec!(15);
    }
    if !s.cash_rolls_forward() {
        score -= dec!(15);
    }
    clamp_score(score)
}

fn score_accuracy(s: &FinancialStatements) -> Score {
    let revenue = s.amount(F::Revenue);
    let total_assets = s.amount(F::TotalAssets);

    let mut score = FULL_SCORE;
    if revenue <= Decimal::ZERO {
        score -= dec!(25);
    }
    if total_assets <= Decimal::ZERO {
        score -= dec!(25);
    }
    if s.amount(F::CurrentAssets) > total_assets {
        score -= dec!(15);
    }
    // A limit beyond range is exceeded only on the negative side.
    let overstretched = match total_assets.checked_mul(dec!(1.1)) {
        Some(limit) => s.amount(F::TotalLiabilities) > limit,
        None => total_assets.is_sign_negative(),
    };
    if overstretched {
        score -= dec!(15);
    }
    clamp_score(score)
}

fn is_round_number(value: Option<Decimal>) -> bool {
    match value {
        Some(v) => !v.is_zero() && (v % ROUND_NUMBER_UNIT).is_zero(),
        None => false,
    }
}

fn score_transparency(s: &FinancialStatements) -> Score {
    let rounded = [F::Revenue, F::NetIncome, F::TotalAssets]
        .into_iter()
        .filter(|f| is_round_number(s.get(*f)))
        .count();

    let mut score = TRANSPARENCY_BASE;
    if rounded > 1 {
        score -= dec!(15);
    }
    clamp_score(score)
}

fn score_comparability(s: &FinancialStatements, prior: Option<&FinancialStatements>) -> Score {
    let Some(prior) = prior else {
        return COMPARABILITY_NEUTRAL;
    };

    let mut score = FULL_SCORE;

    let prior_revenue = prior.amount(F::Revenue);
    if !prior_revenue.is_zero() {
        let growth = s
            .amount(F::Revenue)
            .checked_sub(prior_revenue)
            .map_or(RatioValue::Infinite, |d| threshold_ratio(d.abs(), prior_revenue.abs()));
        if growth.above(dec!(0.5)) {
            score -= dec!(10);
        }
    }

    let margin = safe_ratio(s.amount(F::NetIncome), s.amount(F::Revenue));
    let prior_margin = safe_ratio(prior.amount(F::NetIncome), prior_revenue);
    if let (Some(m), Some(pm)) = (margin, prior_margin) {
        if m.checked_sub(pm).map_or(true, |d| d.abs() > dec!(0.10)) {
            score -= dec!(15);
        }
    }

    clamp_score(score)
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Assess the quality of one period's statements, optionally against the
/// most recent prior period.
pub fn assess_statement_quality(
    statements: &FinancialStatements,
    prior: Option<&FinancialStatements>,
) -> QualityAssessment {
    let mut quality_metrics = BTreeMap::new();
    quality_metrics.insert(QualityMetric::Completeness, score_completeness(statements));
    quality_metrics.insert(QualityMetric::Consistency, score_consistency(statements));
    quality_metrics.insert(QualityMetric::Accuracy, score_accuracy(statements));
    quality_metrics.insert(QualityMetric::Transparency, score_transparency(statements));
    quality_metrics.insert(
        QualityMetric::Comparability,
        score_comparability(statements, prior),
    );

    let total: Decimal = quality_metrics.values().copied().sum();
    let overall_score = clamp_score(total / Decimal::from(quality_metrics.len() as u64));

    let mut strengths = Vec::new();
    let mut weaknesses = Vec::new();
    let mut improvement_recommendations = Vec::new();

    for (&metric, &score) in &quality_metrics {
        if score >= STRENGTH_THRESHOLD {
            strengths.push(format!("Strong {} ({})", metric, score.round_dp(1)));
        }
        if score <= WEAKNESS_THRESHOLD {
            weaknesses.push(format!("Weak {} ({})", metric, score.round_dp(1)));
        }
        if score < RECOMMENDATION_THRESHOLD {
            improvement_recommendations.push(metric.improvement_recommendation().to_string());
        }
    }

    QualityAssessment {
        overall_score,
        reliability_grade: ReliabilityGrade::from_score(overall_score),
        quality_metrics,
        strengths,
        weaknesses,
        improvement_recommendations,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

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

    #[test]
    fn test_canonical_metrics() {
        let q = assess_statement_quality(&canonical(), None);
        assert_eq!(q.metric(QualityMetric::Completeness), dec!(100));
        assert_eq!(q.metric(QualityMetric::Consistency), dec!(100));
        assert_eq!(q.metric(QualityMetric::Accuracy), dec!(100));
        assert_eq!(q.metric(QualityMetric::Transparency), dec!(60));
        assert_eq!(q.metric(QualityMetric::Comparability), dec!(60));
        assert_eq!(q.overall_score, dec!(84));
        assert_eq!(q.reliability_grade, ReliabilityGrade::B);
    }

    #[test]
    fn test_strengths_weaknesses_and_recommendations() {
        let q = assess_statement_quality(&canonical(), None);
        assert_eq!(q.strengths.len(), 3);
        assert_eq!(q.weaknesses.len(), 2);
        assert_eq!(
            q.improvement_recommendations,
            vec![
                QualityMetric::Transparency.improvement_recommendation().to_string(),
                QualityMetric::Comparability.improvement_recommendation().to_string(),
            ]
        );
    }

    #[test]
    fn test_completeness_counts_missing_fields() {
        let mut s = canonical();
        s.net_income = None;
        s.net_cash_from_operations = None;
        s.shareholders_equity = None;
        let q = assess_statement_quality(&s, None);
        assert_eq!(q.metric(QualityMetric::Completeness), dec!(50));
    }

    #[test]
    fn test_consistency_deductions_stack() {
        let mut s = canonical();
        s.shareholders_equity = Some(dec!(500_000)); // balance sheet off by 200k
        s.gross_profit = Some(dec!(900_000)); // off by 100k (5% of revenue)
        s.ending_cash = Some(dec!(149_999));
        let q = assess_statement_quality(&s, None);
        assert_eq!(q.metric(QualityMetric::Consistency), dec!(50));
    }

    #[test]
    fn test_accuracy_floor_at_zero_metrics() {
        let s = FinancialStatements {
            revenue: Some(dec!(-5)),
            total_assets: Some(dec!(-10)),
            current_assets: Some(dec!(5)),
            total_liabilities: Some(dec!(5)),
            ..Default::default()
        };
        let q = assess_statement_quality(&s, None);
        // 100 - 25 - 25 - 15 - 15
        assert_eq!(q.metric(QualityMetric::Accuracy), dec!(20));
    }

    #[test]
    fn test_transparency_single_round_number_is_fine() {
        let mut s = canonical();
        s.net_income = Some(dec!(220_001));
        s.total_assets = Some(dec!(1_800_001));
        let q = assess_statement_quality(&s, None);
        assert_eq!(q.metric(QualityMetric::Transparency), dec!(75));
    }

    #[test]
    fn test_comparability_with_history() {
        let prior = canonical();
        let mut current = canonical();
        // +60% revenue growth, margin moves from 11% to ~25%
        current.revenue = Some(dec!(3_200_000));
        current.net_income = Some(dec!(800_000));
        let q = assess_statement_quality(&current, Some(&prior));
        assert_eq!(q.metric(QualityMetric::Comparability), dec!(75));

        let q = assess_statement_quality(&canonical(), Some(&prior));
        assert_eq!(q.metric(QualityMetric::Comparability), dec!(100));
    }

    #[test]
    fn test_comparability_changes_beyond_range_are_deducted() {
        let mut prior = canonical();
        prior.revenue = Some(dec!(50_000_000_000_000_000_000_000_000_000));
        let mut current = canonical();
        current.revenue = Some(dec!(-50_000_000_000_000_000_000_000_000_000));
        let q = assess_statement_quality(&current, Some(&prior));
        assert_eq!(q.metric(QualityMetric::Comparability), dec!(90));

        let mut prior = canonical();
        prior.revenue = Some(Decimal::ONE);
        prior.net_income = Some(dec!(-70_000_000_000_000_000_000_000_000_000));
        let mut current = canonical();
        current.revenue = Some(Decimal::ONE);
        current.net_income = Some(dec!(70_000_000_000_000_000_000_000_000_000));
        let q = assess_statement_quality(&current, Some(&prior));
        assert_eq!(q.metric(QualityMetric::Comparability), dec!(85));
    }

    #[test]
    fn test_accuracy_liability_limit_beyond_range() {
        let mut s = canonical();
        s.total_assets = Some(dec!(75_000_000_000_000_000_000_000_000_000));
        s.total_liabilities = Some(dec!(79_000_000_000_000_000_000_000_000_000));
        let q = assess_statement_quality(&s, None);
        assert_eq!(q.metric(QualityMetric::Accuracy), dec!(100));

        s.total_assets = Some(dec!(-75_000_000_000_000_000_000_000_000_000));
        s.total_liabilities = Some(dec!(1_100_000));
        let q = assess_statement_quality(&s, None);
        // 100 - 25 (assets) - 15 (current > total) - 15 (liabilities)
        assert_eq!(q.metric(QualityMetric::Accuracy), dec!(45));
    }

    #[test]
    fn test_grade_boundaries_take_higher_grade() {
        assert_eq!(ReliabilityGrade::from_score(dec!(95)), ReliabilityGrade::APlus);
        assert_eq!(ReliabilityGrade::from_score(dec!(94.99)), ReliabilityGrade::A);
        assert_eq!(ReliabilityGrade::from_score(dec!(80)), ReliabilityGrade::B);
        assert_eq!(ReliabilityGrade::from_score(dec!(60)), ReliabilityGrade::D);
        assert_eq!(ReliabilityGrade::from_score(dec!(59.9)), ReliabilityGrade::F);
    }

    #[test]
    fn test_grade_is_monotonic() {
        let mut previous = ReliabilityGrade::F;
        for step in 0..=200 {
            let score = Decimal::from(step) / dec!(2);
            let grade = ReliabilityGrade::from_score(score);
            // Better grades sort first.
            assert!(grade <= previous, "grade regressed at {score}");
            previous = grade;
        }
    }

    #[test]
    fn test_grade_serializes_with_plus() {
        assert_eq!(serde_json::to_string(&ReliabilityGrade::BPlus).unwrap(), "\"B+\"");
    }

    #[test]
    fn test_empty_statements_stay_in_range() {
        let q = assess_statement_quality(&FinancialStatements::default(), None);
        for metric in QualityMetric::ALL {
            let v = q.metric(metric);
            assert!(v >= Decimal::ZERO && v <= dec!(100));
        }
        assert_eq!(q.metric(QualityMetric::Completeness), Decimal::ZERO);
    }
}
