//! Narrative insights and recommendations.
//!
//! A pure function of the other analyzers' outputs. Each list is produced by
//! fixed rule -> sentence mappings; the same inputs always produce the same
//! sentences in the same order.

use std::collections::HashSet;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::anomalies::{AnomalyDetection, AnomalyType};
use crate::quality::{QualityAssessment, QualityMetric};
use crate::ratios::{BenchmarkComparison, BenchmarkGrade, RatioAnalysis, RatioKind};
use crate::scoring::CompositeScores;
use crate::trends::analysis::TrendMetric;
use crate::trends::{Sustainability, TrendAnalysis};

/// Everything the generator reads.
#[derive(Debug, Clone, Copy)]
pub struct InsightContext<'a> {
    pub quality: &'a QualityAssessment,
    pub anomalies: &'a [AnomalyDetection],
    pub scores: &'a CompositeScores,
    pub ratios: &'a RatioAnalysis,
    pub trends: &'a TrendAnalysis,
    pub benchmarking: &'a BenchmarkComparison,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Insights {
    pub key_insights: Vec<String>,
    pub management_attention_areas: Vec<String>,
    pub investor_focus_points: Vec<String>,
    pub audit_recommendations: Vec<String>,
}

fn pct(value: Decimal) -> String {
    match value.checked_mul(dec!(100)) {
        Some(v) => format!("{}%", v.round_dp(1)),
        None => "an out-of-range percentage".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Key insights
// ---------------------------------------------------------------------------

fn key_insights(ctx: &InsightContext<'_>) -> Vec<String> {
    let mut out = Vec::new();

    if let Some(margin) = ctx.ratios.get(RatioKind::NetMargin) {
        if margin > dec!(0.15) {
            out.push(format!(
                "Strong profitability with a net margin of {}.",
                pct(margin)
            ));
        } else if margin < dec!(0.05) {
            out.push(format!(
                "Thin profitability: net margin of {} leaves little room for cost pressure.",
                pct(margin)
            ));
        }
    }

    if let Some(current) = ctx.ratios.get(RatioKind::CurrentRatio) {
        if current > dec!(2.0) {
            out.push(format!(
                "Strong liquidity position with a current ratio of {}.",
                current.round_dp(2)
            ));
        } else if current < dec!(1.0) {
            out.push(format!(
                "Liquidity concerns: current ratio of {} means current liabilities exceed current assets.",
                current.round_dp(2)
            ));
        }
    }

    if let Some(de) = ctx.ratios.get(RatioKind::DebtToEquity) {
        if de > dec!(2.0) {
            out.push(format!(
                "High leverage: debt-to-equity of {} increases financial risk.",
                de.round_dp(2)
            ));
        }
    }

    let health = ctx.scores.financial_health_score;
    if health >= dec!(80) {
        out.push(format!(
            "Overall financial health is strong (score {}).",
            health.round_dp(1)
        ));
    } else if health < dec!(50) {
        out.push(format!(
            "Overall financial health is weak (score {}).",
            health.round_dp(1)
        ));
    }

    let earnings = ctx.scores.earnings_quality_score;
    if earnings >= dec!(80) {
        out.push("Earnings are well supported by operating cash flow.".to_string());
    } else if earnings < dec!(50) {
        out.push("Earnings quality is low: reported profits are poorly backed by cash.".to_string());
    }

    if ctx.quality.overall_score < dec!(70) {
        out.push(format!(
            "Statement reliability is limited (grade {}); conclusions should be treated with caution.",
            ctx.quality.reliability_grade
        ));
    }

    if !ctx.anomalies.is_empty() {
        out.push(match ctx.anomalies.len() {
            1 => "1 anomaly detected that warrants further review.".to_string(),
            n => format!("{n} anomalies detected that warrant further review."),
        });
    }

    if let Some(growth) = ctx
        .trends
        .report()
        .and_then(|r| r.delta(TrendMetric::RevenueGrowth))
    {
        if growth.change > dec!(0.10) {
            out.push(format!("Strong revenue growth of {}.", pct(growth.change)));
        } else if growth.change < dec!(-0.05) {
            out.push(format!("Revenue declined by {}.", pct(-growth.change)));
        }
    }

    out
}

// ---------------------------------------------------------------------------
// Management attention
// ---------------------------------------------------------------------------

fn management_attention_areas(ctx: &InsightContext<'_>) -> Vec<String> {
    let mut out: Vec<String> = ctx
        .anomalies
        .iter()
        .filter(|a| a.is_high_priority())
        .map(|a| format!("{} priority {}: {}", a.severity, a.anomaly_type, a.description))
        .collect();

    if ctx.scores.balance_sheet_strength < dec!(50) {
        out.push("Strengthen the balance sheet by reducing leverage or building liquidity.".to_string());
    }
    if ctx.scores.cash_flow_quality < dec!(50) {
        out.push("Improve operating cash generation and working capital discipline.".to_string());
    }

    for metric in QualityMetric::ALL {
        if ctx.quality.metric(metric) <= dec!(65) {
            out.push(format!("Address weak statement {metric}."));
        }
    }

    for c in &ctx.benchmarking.comparisons {
        if c.grade == BenchmarkGrade::F {
            out.push(format!(
                "{} of {} significantly underperforms the industry benchmark.",
                capitalize(c.ratio.label()),
                c.value.round_dp(3)
            ));
        }
    }

    out
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ---------------------------------------------------------------------------
// Investor focus
// ---------------------------------------------------------------------------

fn investor_focus_points(ctx: &InsightContext<'_>) -> Vec<String> {
    let mut out = Vec::new();

    let health = ctx.scores.financial_health_score;
    if health >= dec!(75) {
        out.push("Solid fundamentals support the company's financial position.".to_string());
    } else if health < dec!(50) {
        out.push("Elevated financial risk: fundamentals are below healthy levels.".to_string());
    }

    let earnings = ctx.scores.earnings_quality_score;
    if earnings >= dec!(75) {
        out.push("High earnings quality: profits convert well into cash.".to_string());
    } else if earnings < dec!(50) {
        out.push("Monitor earnings quality: profits are not converting into cash.".to_string());
    }

    if let Some(roe) = ctx.ratios.get(RatioKind::ReturnOnEquity) {
        if roe > dec!(0.15) {
            out.push(format!("Attractive return on equity of {}.", pct(roe)));
        }
    }

    if let Some(report) = ctx.trends.report() {
        let sentence = match report.sustainability {
            Sustainability::HighlySustainable => {
                "Performance trends are highly sustainable across growth, margin and efficiency."
            }
            Sustainability::ModeratelySustainable => {
                "Performance trends are moderately sustainable, with more improving than deteriorating metrics."
            }
            Sustainability::Concerning => {
                "Performance trends are concerning: more metrics are deteriorating than improving."
            }
            Sustainability::Mixed => "Performance trends are mixed with no clear direction.",
        };
        out.push(sentence.to_string());
    }

    let elevated = ctx
        .anomalies
        .iter()
        .filter(|a| a.risk_score >= dec!(75))
        .count();
    if elevated > 0 {
        let noun = if elevated == 1 { "anomaly" } else { "anomalies" };
        out.push(format!(
            "{elevated} high-risk {noun} may affect the reliability of reported results."
        ));
    }

    out
}

// ---------------------------------------------------------------------------
// Audit recommendations
// ---------------------------------------------------------------------------

fn audit_recommendations(ctx: &InsightContext<'_>) -> Vec<String> {
    let mut seen: HashSet<AnomalyType> = HashSet::new();
    let mut out: Vec<String> = ctx
        .anomalies
        .iter()
        .filter(|a| seen.insert(a.anomaly_type))
        .map(|a| a.anomaly_type.audit_procedure().to_string())
        .collect();

    if ctx.quality.reliability_grade.is_poor() {
        out.push(format!(
            "Perform expanded substantive testing given the low reliability grade ({}).",
            ctx.quality.reliability_grade
        ));
    }
    if ctx.quality.metric(QualityMetric::Consistency) < dec!(85) {
        out.push(
            "Reconcile the balance sheet, gross profit and cash roll-forward to supporting ledgers."
                .to_string(),
        );
    }

    out
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Produce all four narrative lists.
pub fn generate_insights(ctx: &InsightContext<'_>) -> Insights {
    Insights {
        key_insights: key_insights(ctx),
        management_attention_areas: management_attention_areas(ctx),
        investor_focus_points: investor_focus_points(ctx),
        audit_recommendations: audit_recommendations(ctx),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
