use std::time::Instant;

use clap::Args;
use serde_json::Value;
use tracing::debug;

use statement_analysis_core::anomalies::detect_anomalies;
use statement_analysis_core::quality::assess_statement_quality;
use statement_analysis_core::ratios::{calculate_ratios, compare_to_benchmarks, resolution_warning};
use statement_analysis_core::scoring::score_composites;
use statement_analysis_core::trends::analyze_trends;
use statement_analysis_core::{
    analyze_financial_statements, unused_history_warning, with_metadata, AnalyzerConfig,
    FinancialAnalysisInput,
};

use crate::input;

/// Arguments shared by every statement analysis subcommand
#[derive(Args)]
pub struct AnalysisArgs {
    /// Path to JSON input file ({ "statements": ..., "history": [...], "industry": ... })
    #[arg(long)]
    pub input: Option<String>,

    /// Path to a JSON benchmark configuration replacing the built-in table
    #[arg(long)]
    pub benchmarks: Option<String>,

    /// Industry whose benchmarks apply (overrides the input file)
    #[arg(long)]
    pub industry: Option<String>,
}

#[derive(Args)]
pub struct BenchmarksArgs {
    /// Path to a JSON benchmark configuration to validate and print
    #[arg(long)]
    pub benchmarks: Option<String>,
}

fn load_config(path: Option<&str>) -> Result<AnalyzerConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            // deserializing validates the table and fallback industry
            let config: AnalyzerConfig = input::file::read_json(path)?;
            debug!(
                path,
                industries = config.benchmarks().industries().count(),
                "benchmark table loaded"
            );
            Ok(config)
        }
        None => Ok(AnalyzerConfig::default()),
    }
}

fn load_input(args: &AnalysisArgs) -> Result<FinancialAnalysisInput, Box<dyn std::error::Error>> {
    let mut input_data: FinancialAnalysisInput = input::read_request(args.input.as_deref())?;
    if let Some(ref industry) = args.industry {
        input_data.industry = industry.clone();
    }
    Ok(input_data)
}

fn history_warning(input_data: &FinancialAnalysisInput) -> Vec<String> {
    unused_history_warning(&input_data.history).into_iter().collect()
}

pub fn run_analyze(args: AnalysisArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let config = load_config(args.benchmarks.as_deref())?;
    let input_data = load_input(&args)?;
    let result = analyze_financial_statements(&input_data, &config);
    Ok(serde_json::to_value(result)?)
}

pub fn run_quality(args: AnalysisArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let input_data = load_input(&args)?;
    let start = Instant::now();
    let quality = assess_statement_quality(&input_data.statements, input_data.history.last());
    let result = with_metadata(
        "Statement quality assessment (completeness, consistency, accuracy, transparency, comparability)",
        &serde_json::json!({ "prior_periods_used": usize::from(!input_data.history.is_empty()) }),
        history_warning(&input_data),
        start.elapsed().as_micros() as u64,
        quality,
    );
    Ok(serde_json::to_value(result)?)
}

pub fn run_anomalies(args: AnalysisArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let config = load_config(args.benchmarks.as_deref())?;
    let input_data = load_input(&args)?;
    let start = Instant::now();
    let resolved = config.resolve_industry(&input_data.industry);
    let mut warnings = history_warning(&input_data);
    warnings.extend(resolution_warning(&input_data.industry, resolved.as_ref()));
    let anomalies = detect_anomalies(
        &input_data.statements,
        input_data.history.last(),
        resolved.map(|r| r.benchmarks),
    );
    let result = with_metadata(
        "Rule-based statement anomaly detection",
        &serde_json::json!({ "industry": input_data.industry }),
        warnings,
        start.elapsed().as_micros() as u64,
        anomalies,
    );
    Ok(serde_json::to_value(result)?)
}

pub fn run_scores(args: AnalysisArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let input_data = load_input(&args)?;
    let start = Instant::now();
    let scores = score_composites(&input_data.statements);
    let result = with_metadata(
        "Composite financial scores (0-100)",
        &serde_json::json!({ "neutral_score": 50 }),
        Vec::new(),
        start.elapsed().as_micros() as u64,
        scores,
    );
    Ok(serde_json::to_value(result)?)
}

pub fn run_ratios(args: AnalysisArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let config = load_config(args.benchmarks.as_deref())?;
    let input_data = load_input(&args)?;
    let start = Instant::now();
    let ratios = calculate_ratios(&input_data.statements);
    let resolved = config.resolve_industry(&input_data.industry);
    let benchmarking = compare_to_benchmarks(&ratios, resolved.as_ref());
    let warnings: Vec<String> =
        resolution_warning(&input_data.industry, resolved.as_ref()).into_iter().collect();
    let result = with_metadata(
        "Standard financial ratios with industry benchmarking",
        &serde_json::json!({ "zero_denominators": "ratio omitted" }),
        warnings,
        start.elapsed().as_micros() as u64,
        serde_json::json!({ "ratio_analysis": ratios, "benchmarking": benchmarking }),
    );
    Ok(serde_json::to_value(result)?)
}

pub fn run_trends(args: AnalysisArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let input_data = load_input(&args)?;
    let start = Instant::now();
    let trends = analyze_trends(&input_data.statements, input_data.history.last());
    let result = with_metadata(
        "Period-over-period trend analysis",
        &serde_json::json!({ "direction_band": 0.05 }),
        history_warning(&input_data),
        start.elapsed().as_micros() as u64,
        trends,
    );
    Ok(serde_json::to_value(result)?)
}

pub fn run_benchmarks(args: BenchmarksArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let config = load_config(args.benchmarks.as_deref())?;
    Ok(serde_json::to_value(config)?)
}
