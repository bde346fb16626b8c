use napi::Result as NapiResult;
use napi_derive::napi;

use statement_analysis_core::{AnalyzerConfig, FinancialAnalysisInput};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn parse_config(config_json: Option<String>) -> NapiResult<AnalyzerConfig> {
    match config_json {
        Some(json) => AnalyzerConfig::from_json(&json).map_err(to_napi_error),
        None => Ok(AnalyzerConfig::default()),
    }
}

fn parse_input(input_json: &str) -> NapiResult<FinancialAnalysisInput> {
    FinancialAnalysisInput::from_json(input_json).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Full analysis
// ---------------------------------------------------------------------------

#[napi]
pub fn analyze_statements(input_json: String, config_json: Option<String>) -> NapiResult<String> {
    let input = parse_input(&input_json)?;
    let config = parse_config(config_json)?;
    let output = statement_analysis_core::analyze_financial_statements(&input, &config);
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Individual components
// ---------------------------------------------------------------------------

#[napi]
pub fn assess_quality(input_json: String) -> NapiResult<String> {
    let input = parse_input(&input_json)?;
    let output = statement_analysis_core::quality::assess_statement_quality(
        &input.statements,
        input.history.last(),
    );
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn detect_statement_anomalies(
    input_json: String,
    config_json: Option<String>,
) -> NapiResult<String> {
    let input = parse_input(&input_json)?;
    let config = parse_config(config_json)?;
    let resolved = config.resolve_industry(&input.industry);
    let output = statement_analysis_core::anomalies::detect_anomalies(
        &input.statements,
        input.history.last(),
        resolved.map(|r| r.benchmarks),
    );
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn calculate_statement_ratios(input_json: String) -> NapiResult<String> {
    let input = parse_input(&input_json)?;
    let output = statement_analysis_core::ratios::calculate_ratios(&input.statements);
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[napi]
pub fn default_benchmarks() -> NapiResult<String> {
    serde_json::to_string(&AnalyzerConfig::default()).map_err(to_napi_error)
}
