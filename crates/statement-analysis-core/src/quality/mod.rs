pub mod assessment;

pub use assessment::{assess_statement_quality, QualityAssessment, QualityMetric, ReliabilityGrade};
