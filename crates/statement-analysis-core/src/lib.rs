pub mod analyzer;
pub mod anomalies;
pub mod arithmetic;
pub mod error;
pub mod insights;
pub mod quality;
pub mod ratios;
pub mod scoring;
pub mod statements;
pub mod trends;
pub mod types;

pub use analyzer::{
    analyze_financial_statements, unused_history_warning, AnalyzerConfig,
    FinancialAnalysisInput, FinancialAnalysisResult, FinancialAnalyzer,
};
pub use error::StatementAnalysisError;
pub use statements::{FinancialStatements, StatementField};
pub use types::*;

/// Standard result type for all statement-analysis operations
pub type StatementAnalysisResult<T> = Result<T, StatementAnalysisError>;
