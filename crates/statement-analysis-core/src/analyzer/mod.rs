pub mod config;
pub mod engine;

pub use config::AnalyzerConfig;
pub use engine::{
    analyze_financial_statements, unused_history_warning, FinancialAnalysisInput,
    FinancialAnalysisResult, FinancialAnalyzer, DEFAULT_INDUSTRY,
};
