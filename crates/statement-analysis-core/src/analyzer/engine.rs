//! End-to-end statement analysis.
//!
//! [`FinancialAnalyzer`] runs every component over one period, with at most
//! one prior period for comparison:
//!
//! 1. statement quality
//! 2. anomaly detection against the resolved industry's benchmarks
//! 3. composite scores
//! 4. standard ratios and industry benchmarking
//! 5. period-over-period trends
//! 6. narrative insights assembled from all of the above
//!
//! Analysis never fails once statements have been deserialized; missing data
//! shows up as lower quality scores and omitted ratios.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use super::config::AnalyzerConfig;
use crate::anomalies::{detect_anomalies, AnomalyDetection};
use crate::insights::{generate_insights, InsightContext};
use crate::quality::{assess_statement_quality, QualityAssessment};
use crate::ratios::{
    calculate_ratios, compare_to_benchmarks, resolution_warning, BenchmarkComparison,
    RatioAnalysis,
};
use crate::scoring::score_composites;
use crate::statements::FinancialStatements;
use crate::trends::{analyze_trends, TrendAnalysis};
use crate::types::{with_metadata, ComputationOutput, Score};
use crate::StatementAnalysisResult;

// ---------------------------------------------------------------------------
// Input / Output
// ---------------------------------------------------------------------------

pub const DEFAULT_INDUSTRY: &str = "general";

fn default_industry() -> String {
    DEFAULT_INDUSTRY.to_string()
}

/// JSON request shape for a full analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialAnalysisInput {
    pub statements: FinancialStatements,
    /// Prior periods, oldest first. Only the last entry is compared.
    #[serde(default)]
    pub history: Vec<FinancialStatements>,
    #[serde(default = "default_industry")]
    pub industry: String,
}

impl FinancialAnalysisInput {
    pub fn from_json(json: &str) -> StatementAnalysisResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialAnalysisResult {
    pub period: String,
    /// Industry whose benchmarks were applied, after fallback.
    pub industry: Option<String>,
    pub statement_quality: QualityAssessment,
    pub anomaly_detections: Vec<AnomalyDetection>,
    pub key_insights: Vec<String>,
    pub financial_health_score: Score,
    pub earnings_quality_score: Score,
    pub balance_sheet_strength: Score,
    pub cash_flow_quality: Score,
    pub ratio_analysis: RatioAnalysis,
    pub trend_analysis: TrendAnalysis,
    pub benchmarking: BenchmarkComparison,
    pub management_attention_areas: Vec<String>,
    pub investor_focus_points: Vec<String>,
    pub audit_recommendations: Vec<String>,
}

/// Warning for a history longer than the single period that is compared.
pub fn unused_history_warning(history: &[FinancialStatements]) -> Option<String> {
    (history.len() > 1).then(|| {
        format!(
            "{} prior periods supplied; only the most recent is used for comparison",
            history.len()
        )
    })
}

// ---------------------------------------------------------------------------
// Analyzer
// ---------------------------------------------------------------------------

/// Holds the benchmark configuration; safe to share across threads.
#[derive(Debug, Clone, Default)]
pub struct FinancialAnalyzer {
    config: AnalyzerConfig,
}

impl FinancialAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analyze `statements`, comparing against the newest entry of `history`.
    pub fn analyze(
        &self,
        statements: &FinancialStatements,
        history: &[FinancialStatements],
        industry: &str,
    ) -> FinancialAnalysisResult {
        self.analyze_with_warnings(statements, history, industry).0
    }

    /// As [`analyze`](Self::analyze), also returning the non-fatal warnings
    /// raised along the way.
    #[instrument(skip_all, fields(period = %statements.period, industry = %industry))]
    pub fn analyze_with_warnings(
        &self,
        statements: &FinancialStatements,
        history: &[FinancialStatements],
        industry: &str,
    ) -> (FinancialAnalysisResult, Vec<String>) {
        let mut warnings: Vec<String> = Vec::new();

        if let Some(warning) = unused_history_warning(history) {
            warn!(periods = history.len(), "only the most recent prior period is compared");
            warnings.push(warning);
        }
        let prior = history.last();

        for violation in statements.check_invariants() {
            warn!(%violation, "soft invariant violated");
            warnings.push(violation);
        }

        let resolved = self.config.resolve_industry(industry);
        if let Some(warning) = resolution_warning(industry, resolved.as_ref()) {
            warn!(
                requested = industry,
                using = ?resolved.as_ref().map(|r| r.name),
                "industry benchmarks not found"
            );
            warnings.push(warning);
        }
        let benchmarks = resolved.as_ref().map(|r| r.benchmarks);

        let statement_quality = assess_statement_quality(statements, prior);
        debug!(
            overall = %statement_quality.overall_score,
            grade = %statement_quality.reliability_grade,
            "quality assessed"
        );

        let anomaly_detections = detect_anomalies(statements, prior, benchmarks);
        debug!(count = anomaly_detections.len(), "anomalies detected");

        let scores = score_composites(statements);
        debug!(health = %scores.financial_health_score, "composite scores computed");

        let ratio_analysis = calculate_ratios(statements);
        let benchmarking = compare_to_benchmarks(&ratio_analysis, resolved.as_ref());
        debug!(
            computed = ratio_analysis.ratios.len(),
            omitted = ratio_analysis.omitted.len(),
            "ratios computed"
        );

        let trend_analysis = analyze_trends(statements, prior);
        debug!(available = trend_analysis.report().is_some(), "trends analyzed");

        let insights = generate_insights(&InsightContext {
            quality: &statement_quality,
            anomalies: &anomaly_detections,
            scores: &scores,
            ratios: &ratio_analysis,
            trends: &trend_analysis,
            benchmarking: &benchmarking,
        });

        let result = FinancialAnalysisResult {
            period: statements.period.clone(),
            industry: resolved.map(|r| r.name.to_string()),
            statement_quality,
            anomaly_detections,
            key_insights: insights.key_insights,
            financial_health_score: scores.financial_health_score,
            earnings_quality_score: scores.earnings_quality_score,
            balance_sheet_strength: scores.balance_sheet_strength,
            cash_flow_quality: scores.cash_flow_quality,
            ratio_analysis,
            trend_analysis,
            benchmarking,
            management_attention_areas: insights.management_attention_areas,
            investor_focus_points: insights.investor_focus_points,
            audit_recommendations: insights.audit_recommendations,
        };
        (result, warnings)
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Run a full analysis and wrap it in the standard computation envelope.
pub fn analyze_financial_statements(
    input: &FinancialAnalysisInput,
    config: &AnalyzerConfig,
) -> ComputationOutput<FinancialAnalysisResult> {
    let start = Instant::now();

    let analyzer = FinancialAnalyzer::new(config.clone());
    let (result, warnings) =
        analyzer.analyze_with_warnings(&input.statements, &input.history, &input.industry);

    let elapsed = start.elapsed().as_micros() as u64;

    let assumptions = serde_json::json!({
        "requested_industry": input.industry,
        "fallback_industry": config.fallback_industry(),
        "prior_periods_used": usize::from(!input.history.is_empty()),
        "zero_denominators": "ratios omitted; threshold checks treat the ratio as unbounded",
        "balance_sheet_tolerance": "1% of total assets",
    });

    with_metadata(
        "Financial statement analysis (quality, anomalies, ratios, trends)",
        &assumptions,
        warnings,
        elapsed,
        result,
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anomalies::AnomalyType;
    use crate::quality::ReliabilityGrade;
    use crate::ratios::RatioKind;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn approx_eq(a: Decimal, b: Decimal, eps: Decimal) -> bool {
        (a - b).abs() < eps
    }

    fn canonical() -> FinancialStatements {
        FinancialStatements {
            period: "FY2024".into(),
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
    fn test_canonical_technology() {
        let analyzer = FinancialAnalyzer::default();
        let r = analyzer.analyze(&canonical(), &[], "technology");

        assert_eq!(r.period, "FY2024");
        assert_eq!(r.industry.as_deref(), Some("technology"));
        assert_eq!(r.statement_quality.overall_score, dec!(84));
        assert_eq!(r.statement_quality.reliability_grade, ReliabilityGrade::B);

        let types: Vec<AnomalyType> = r.anomaly_detections.iter().map(|a| a.anomaly_type).collect();
        assert_eq!(
            types,
            vec![AnomalyType::RatioInconsistency, AnomalyType::IndustryDeviation]
        );

        assert!(approx_eq(r.financial_health_score, dec!(86.94), dec!(0.01)));
        assert_eq!(r.earnings_quality_score, dec!(80));
        assert_eq!(r.balance_sheet_strength, dec!(65));
        assert_eq!(r.cash_flow_quality, dec!(100));

        assert_eq!(r.ratio_analysis.get(RatioKind::CurrentRatio), Some(dec!(1.75)));
        assert_eq!(r.ratio_analysis.get(RatioKind::GrossMargin), Some(dec!(0.4)));
        assert!(matches!(r.trend_analysis, TrendAnalysis::InsufficientData { .. }));
        assert!(!r.audit_recommendations.is_empty());
    }

    #[test]
    fn test_unknown_industry_falls_back_with_warning() {
        let analyzer = FinancialAnalyzer::default();
        let (r, warnings) = analyzer.analyze_with_warnings(&canonical(), &[], "general");
        assert_eq!(r.industry.as_deref(), Some("technology"));
        assert!(r.benchmarking.fell_back);
        assert!(warnings.iter().any(|w| w.contains("'general'")));
    }

    #[test]
    fn test_fallback_from_custom_table() {
        let table: crate::ratios::BenchmarkTable =
            serde_json::from_str(r#"{ "utilities": { "gross_margin": 0.45 } }"#).unwrap();
        let config = AnalyzerConfig::new(table, "utilities").unwrap();
        let (r, warnings) =
            FinancialAnalyzer::new(config).analyze_with_warnings(&canonical(), &[], "technology");
        assert_eq!(r.industry.as_deref(), Some("utilities"));
        assert!(r.benchmarking.fell_back);
        assert_eq!(
            warnings,
            vec!["Industry 'technology' has no benchmarks; using 'utilities'".to_string()]
        );
    }

    #[test]
    fn test_unused_history_warning() {
        assert_eq!(unused_history_warning(&[]), None);
        assert_eq!(unused_history_warning(&[canonical()]), None);
        assert_eq!(
            unused_history_warning(&[canonical(), canonical(), canonical()]).as_deref(),
            Some("3 prior periods supplied; only the most recent is used for comparison")
        );
    }

    #[test]
    fn test_industry_match_is_case_sensitive() {
        let analyzer = FinancialAnalyzer::default();
        let r = analyzer.analyze(&canonical(), &[], "Retail");
        assert_eq!(r.industry.as_deref(), Some("technology"));
    }

    #[test]
    fn test_only_last_history_entry_used() {
        let analyzer = FinancialAnalyzer::default();
        let mut oldest = canonical();
        oldest.revenue = Some(dec!(100));
        let prior = canonical();

        let (with_both, warnings) =
            analyzer.analyze_with_warnings(&canonical(), &[oldest, prior.clone()], "technology");
        let with_last = analyzer.analyze(&canonical(), &[prior], "technology");

        assert_eq!(with_both.trend_analysis, with_last.trend_analysis);
        assert_eq!(with_both.statement_quality, with_last.statement_quality);
        assert!(warnings.iter().any(|w| w.contains("2 prior periods")));
    }

    #[test]
    fn test_soft_invariant_violations_become_warnings() {
        let mut s = canonical();
        s.total_assets = Some(dec!(2_500_000));
        let (_, warnings) = FinancialAnalyzer::default().analyze_with_warnings(&s, &[], "technology");
        assert!(!warnings.is_empty());
    }

    #[test]
    fn test_empty_statements_do_not_panic() {
        let r = FinancialAnalyzer::default().analyze(&FinancialStatements::default(), &[], "retail");
        assert!(r.ratio_analysis.ratios.is_empty());
        assert!(r.statement_quality.overall_score < dec!(84));
    }

    #[test]
    fn test_envelope_metadata() {
        let input = FinancialAnalysisInput {
            statements: canonical(),
            history: vec![],
            industry: "technology".into(),
        };
        let out = analyze_financial_statements(&input, &AnalyzerConfig::default());
        assert_eq!(out.metadata.precision, "rust_decimal_128bit");
        assert_eq!(out.assumptions["prior_periods_used"], 0);
        assert!(out.warnings.is_empty());
        assert_eq!(out.result.statement_quality.overall_score, dec!(84));
    }

    #[test]
    fn test_input_defaults_industry_to_general() {
        let input = FinancialAnalysisInput::from_json(r#"{ "statements": { "revenue": 1000 } }"#)
            .unwrap();
        assert_eq!(input.industry, "general");
        assert!(input.history.is_empty());
    }

    #[test]
    fn test_analyzer_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FinancialAnalyzer>();
    }
}
