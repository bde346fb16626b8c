pub mod generator;

pub use generator::{generate_insights, InsightContext, Insights};
