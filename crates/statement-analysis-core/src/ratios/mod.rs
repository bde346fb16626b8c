pub mod benchmarking;
pub mod industry;
pub mod standard;

pub use benchmarking::{compare_to_benchmarks, BenchmarkComparison, BenchmarkGrade};
pub use industry::{resolution_warning, BenchmarkTable, IndustryBenchmarks, ResolvedIndustry};
pub use standard::{calculate_ratios, RatioAnalysis, RatioKind};
