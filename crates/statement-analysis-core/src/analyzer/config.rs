use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::StatementAnalysisError;
use crate::ratios::industry::{ResolvedIndustry, TECHNOLOGY};
use crate::ratios::BenchmarkTable;
use crate::StatementAnalysisResult;

/// Immutable settings owned by a [`FinancialAnalyzer`](super::FinancialAnalyzer).
///
/// Every constructor validates, deserialization included, so the fallback
/// industry always resolves against the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "UncheckedAnalyzerConfig")]
pub struct AnalyzerConfig {
    benchmarks: BenchmarkTable,
    /// Industry used when the requested one is not in `benchmarks`.
    fallback_industry: String,
}

/// Wire shape of [`AnalyzerConfig`] before validation.
#[derive(Debug, Deserialize)]
struct UncheckedAnalyzerConfig {
    #[serde(default)]
    benchmarks: BenchmarkTable,
    #[serde(default = "default_fallback_industry")]
    fallback_industry: String,
}

fn default_fallback_industry() -> String {
    TECHNOLOGY.to_string()
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            benchmarks: BenchmarkTable::default(),
            fallback_industry: default_fallback_industry(),
        }
    }
}

impl TryFrom<UncheckedAnalyzerConfig> for AnalyzerConfig {
    type Error = StatementAnalysisError;

    fn try_from(raw: UncheckedAnalyzerConfig) -> Result<Self, Self::Error> {
        Self::new(raw.benchmarks, raw.fallback_industry)
    }
}

impl AnalyzerConfig {
    pub fn new(
        benchmarks: BenchmarkTable,
        fallback_industry: impl Into<String>,
    ) -> StatementAnalysisResult<Self> {
        let config = Self {
            benchmarks,
            fallback_industry: fallback_industry.into(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a configuration document.
    pub fn from_json(json: &str) -> StatementAnalysisResult<Self> {
        let raw: UncheckedAnalyzerConfig = serde_json::from_str(json)?;
        Self::try_from(raw)
    }

    /// Build a configuration around a caller-supplied benchmark table.
    pub fn with_benchmarks(benchmarks: BenchmarkTable) -> StatementAnalysisResult<Self> {
        Self::new(benchmarks, default_fallback_industry())
    }

    pub fn benchmarks(&self) -> &BenchmarkTable {
        &self.benchmarks
    }

    pub fn fallback_industry(&self) -> &str {
        &self.fallback_industry
    }

    /// Resolve `industry` against the table, falling back to
    /// [`fallback_industry`](Self::fallback_industry) when it is unknown.
    pub fn resolve_industry(&self, industry: &str) -> Option<ResolvedIndustry<'_>> {
        self.benchmarks.resolve(industry, &self.fallback_industry)
    }

    fn validate(&self) -> StatementAnalysisResult<()> {
        if self.benchmarks.industries().next().is_none() {
            return Err(StatementAnalysisError::InvalidConfiguration {
                field: "benchmarks".into(),
                reason: "Benchmark table must contain at least one industry".into(),
            });
        }
        if !self.benchmarks.contains(&self.fallback_industry) {
            return Err(StatementAnalysisError::InvalidConfiguration {
                field: "fallback_industry".into(),
                reason: format!(
                    "Fallback industry '{}' is not in the benchmark table",
                    self.fallback_industry
                ),
            });
        }
        for industry in self.benchmarks.industries() {
            let Some(values) = self.benchmarks.get(industry) else {
                continue;
            };
            if let Some((kind, value)) = values.iter().find(|(_, v)| *v < Decimal::ZERO) {
                return Err(StatementAnalysisError::InvalidConfiguration {
                    field: format!("benchmarks.{industry}.{}", kind.key()),
                    reason: format!("Benchmark must be non-negative, got {value}"),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = AnalyzerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.fallback_industry(), "technology");
        assert!(config.benchmarks().contains("retail"));
    }

    #[test]
    fn test_from_json_custom_table() {
        let json = r#"{
            "benchmarks": { "utilities": { "gross_margin": 0.45, "debt_to_equity": 1.2 } },
            "fallback_industry": "utilities"
        }"#;
        let config = AnalyzerConfig::from_json(json).unwrap();
        let utilities = config.benchmarks().get("utilities").unwrap();
        assert_eq!(utilities.len(), 2);
    }

    #[test]
    fn test_missing_fallback_rejected() {
        let json = r#"{ "benchmarks": { "utilities": { "gross_margin": 0.45 } } }"#;
        let err = AnalyzerConfig::from_json(json).unwrap_err();
        match err {
            StatementAnalysisError::InvalidConfiguration { field, .. } => {
                assert_eq!(field, "fallback_industry");
            }
            other => panic!("Expected InvalidConfiguration, got {other:?}"),
        }
    }

    #[test]
    fn test_deserializing_directly_also_validates() {
        let json = r#"{ "benchmarks": { "utilities": { "gross_margin": 0.45 } } }"#;
        let err = serde_json::from_str::<AnalyzerConfig>(json).unwrap_err();
        assert!(err.to_string().contains("fallback_industry"));
    }

    #[test]
    fn test_new_rejects_fallback_missing_from_table() {
        let table: BenchmarkTable =
            serde_json::from_str(r#"{ "utilities": { "gross_margin": 0.45 } }"#).unwrap();
        let err = AnalyzerConfig::new(table.clone(), "technology").unwrap_err();
        assert!(matches!(
            err,
            StatementAnalysisError::InvalidConfiguration { ref field, .. } if field == "fallback_industry"
        ));
        assert!(AnalyzerConfig::with_benchmarks(table.clone()).is_err());

        let config = AnalyzerConfig::new(table, "utilities").unwrap();
        let resolved = config.resolve_industry("technology").unwrap();
        assert_eq!(resolved.name, "utilities");
        assert!(resolved.fell_back);
    }

    #[test]
    fn test_serialized_config_reloads() {
        let json = serde_json::to_string(&AnalyzerConfig::default()).unwrap();
        assert_eq!(AnalyzerConfig::from_json(&json).unwrap(), AnalyzerConfig::default());
    }

    #[test]
    fn test_negative_benchmark_rejected() {
        let json = r#"{
            "benchmarks": { "technology": { "current_ratio": -1.0 } }
        }"#;
        let err = AnalyzerConfig::from_json(json).unwrap_err();
        assert!(err.to_string().contains("benchmarks.technology.current_ratio"));
    }

    #[test]
    fn test_empty_table_rejected() {
        let err = AnalyzerConfig::from_json(r#"{ "benchmarks": {} }"#).unwrap_err();
        assert!(matches!(
            err,
            StatementAnalysisError::InvalidConfiguration { .. }
        ));
    }

    #[test]
    fn test_malformed_json_is_serialization_error() {
        let err = AnalyzerConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, StatementAnalysisError::SerializationError(_)));
    }
}
