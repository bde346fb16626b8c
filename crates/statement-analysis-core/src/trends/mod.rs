pub mod analysis;

pub use analysis::{analyze_trends, Sustainability, TrendAnalysis, TrendDirection, TrendReport};
