//! Industry-relative ratio grading.
//!
//! Each computed ratio is placed against its industry benchmark:
//! - **Position** uses a ±10% band around the benchmark (raw numeric position).
//! - **Grade** uses the relative deviation `(value - benchmark) / |benchmark|`
//!   with steps at ±10% and ±30%, mirrored for lower-is-better ratios.
//!
//! Ratios without a benchmark grade as "N/A".

use rust_decimal::prelude::Signed;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::industry::ResolvedIndustry;
use super::standard::{RatioAnalysis, RatioDirection, RatioKind};

const POSITION_BAND: Decimal = dec!(0.10);
const GRADE_NEAR: Decimal = dec!(0.10);
const GRADE_FAR: Decimal = dec!(0.30);

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BenchmarkPosition {
    AboveAverage,
    Average,
    BelowAverage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BenchmarkGrade {
    A,
    B,
    C,
    D,
    F,
    #[serde(rename = "N/A")]
    NotApplicable,
}

impl std::fmt::Display for BenchmarkGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::F => "F",
            Self::NotApplicable => "N/A",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioBenchmark {
    pub ratio: RatioKind,
    pub value: Decimal,
    pub benchmark: Option<Decimal>,
    /// `(value - benchmark) / |benchmark|`
    pub deviation: Option<Decimal>,
    pub position: Option<BenchmarkPosition>,
    pub grade: BenchmarkGrade,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkComparison {
    /// Industry whose benchmarks were applied, `None` if no table matched.
    pub industry: Option<String>,
    pub fell_back: bool,
    pub comparisons: Vec<RatioBenchmark>,
    /// Ratios graded A or B.
    pub strengths: Vec<RatioKind>,
    /// Ratios graded D or F.
    pub weaknesses: Vec<RatioKind>,
}

impl BenchmarkComparison {
    pub fn grade_of(&self, kind: RatioKind) -> BenchmarkGrade {
        self.comparisons
            .iter()
            .find(|c| c.ratio == kind)
            .map(|c| c.grade)
            .unwrap_or(BenchmarkGrade::NotApplicable)
    }
}

// ---------------------------------------------------------------------------
// Grading
// ---------------------------------------------------------------------------

/// Relative deviation from the benchmark; `None` for a zero benchmark.
/// A deviation beyond `Decimal`'s range saturates at `MAX`/`MIN`.
pub fn relative_deviation(value: Decimal, benchmark: Decimal) -> Option<Decimal> {
    if benchmark.is_zero() {
        return None;
    }
    let scale = benchmark.abs();
    let deviation = value
        .checked_sub(benchmark)
        .and_then(|d| d.checked_div(scale))
        .or_else(|| value.checked_div(scale)?.checked_sub(benchmark.signum()));
    let saturated = if value > benchmark {
        Decimal::MAX
    } else {
        Decimal::MIN
    };
    Some(deviation.unwrap_or(saturated))
}

/// Place `value` above, within or below a ±10% band around `benchmark`.
pub fn classify_position(value: Decimal, benchmark: Decimal) -> BenchmarkPosition {
    let band = benchmark.abs() * POSITION_BAND;
    // A bound beyond range cannot be crossed.
    if benchmark.checked_add(band).is_some_and(|hi| value > hi) {
        BenchmarkPosition::AboveAverage
    } else if benchmark.checked_sub(band).is_some_and(|lo| value < lo) {
        BenchmarkPosition::BelowAverage
    } else {
        BenchmarkPosition::Average
    }
}

/// Letter grade for a relative deviation, respecting the ratio's direction.
pub fn grade_deviation(direction: RatioDirection, deviation: Decimal) -> BenchmarkGrade {
    // Lower-is-better ratios are graded on the mirrored deviation.
    let d = match direction {
        RatioDirection::HigherIsBetter => deviation,
        RatioDirection::LowerIsBetter => -deviation,
    };
    if d >= GRADE_FAR {
        BenchmarkGrade::A
    } else if d >= GRADE_NEAR {
        BenchmarkGrade::B
    } else if d >= -GRADE_NEAR {
        BenchmarkGrade::C
    } else if d >= -GRADE_FAR {
        BenchmarkGrade::D
    } else {
        BenchmarkGrade::F
    }
}

fn benchmark_ratio(kind: RatioKind, value: Decimal, benchmark: Option<Decimal>) -> RatioBenchmark {
    let deviation = benchmark.and_then(|b| relative_deviation(value, b));
    let (position, grade) = match (benchmark, deviation) {
        (Some(b), Some(d)) => (
            Some(classify_position(value, b)),
            grade_deviation(kind.direction(), d),
        ),
        _ => (None, BenchmarkGrade::NotApplicable),
    };

    RatioBenchmark {
        ratio: kind,
        value,
        benchmark,
        deviation,
        position,
        grade,
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Grade every computed ratio against the resolved industry's benchmarks.
pub fn compare_to_benchmarks(
    ratios: &RatioAnalysis,
    industry: Option<&ResolvedIndustry<'_>>,
) -> BenchmarkComparison {
    let comparisons: Vec<RatioBenchmark> = ratios
        .ratios
        .iter()
        .map(|(&kind, &value)| {
            let benchmark = industry.and_then(|i| i.benchmarks.get(kind));
            benchmark_ratio(kind, value, benchmark)
        })
        .collect();

    let strengths = comparisons
        .iter()
        .filter(|c| matches!(c.grade, BenchmarkGrade::A | BenchmarkGrade::B))
        .map(|c| c.ratio)
        .collect();
    let weaknesses = comparisons
        .iter()
        .filter(|c| matches!(c.grade, BenchmarkGrade::D | BenchmarkGrade::F))
        .map(|c| c.ratio)
        .collect();

    BenchmarkComparison {
        industry: industry.map(|i| i.name.to_string()),
        fell_back: industry.is_some_and(|i| i.fell_back),
        comparisons,
        strengths,
        weaknesses,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
