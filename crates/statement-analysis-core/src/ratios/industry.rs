//! Industry benchmark tables.
//!
//! A [`BenchmarkTable`] maps an industry key to its expected ratio values.
//! Lookups are case-sensitive; unknown industries resolve to a fallback
//! industry. The table is immutable once built and is safe to share across
//! threads.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::standard::RatioKind;

pub const TECHNOLOGY: &str = "technology";
pub const MANUFACTURING: &str = "manufacturing";
pub const RETAIL: &str = "retail";

/// Expected ratio values for one industry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndustryBenchmarks(BTreeMap<RatioKind, Decimal>);

impl IndustryBenchmarks {
    pub fn new(values: BTreeMap<RatioKind, Decimal>) -> Self {
        Self(values)
    }

    pub fn get(&self, kind: RatioKind) -> Option<Decimal> {
        self.0.get(&kind).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (RatioKind, Decimal)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(RatioKind, Decimal)> for IndustryBenchmarks {
    fn from_iter<I: IntoIterator<Item = (RatioKind, Decimal)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Benchmarks keyed by industry name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BenchmarkTable(BTreeMap<String, IndustryBenchmarks>);

/// The benchmark set an analysis actually uses.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedIndustry<'a> {
    pub name: &'a str,
    pub benchmarks: &'a IndustryBenchmarks,
    /// `true` when the requested industry was unknown.
    pub fell_back: bool,
}

impl BenchmarkTable {
    pub fn new(industries: BTreeMap<String, IndustryBenchmarks>) -> Self {
        Self(industries)
    }

    pub fn get(&self, industry: &str) -> Option<&IndustryBenchmarks> {
        self.0.get(industry)
    }

    pub fn contains(&self, industry: &str) -> bool {
        self.0.contains_key(industry)
    }

    pub fn industries(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.keys().map(String::as_str)
    }

    /// Resolve `industry`, falling back to `fallback` when unknown. `None`
    /// only when neither key exists.
    pub fn resolve<'a>(&'a self, industry: &str, fallback: &str) -> Option<ResolvedIndustry<'a>> {
        if let Some((name, benchmarks)) = self.0.get_key_value(industry) {
            return Some(ResolvedIndustry {
                name,
                benchmarks,
                fell_back: false,
            });
        }
        self.0
            .get_key_value(fallback)
            .map(|(name, benchmarks)| ResolvedIndustry {
                name,
                benchmarks,
                fell_back: true,
            })
    }
}

/// Warning to surface when `requested` did not resolve to its own benchmarks.
pub fn resolution_warning(
    requested: &str,
    resolved: Option<&ResolvedIndustry<'_>>,
) -> Option<String> {
    match resolved {
        Some(r) if r.fell_back => Some(format!(
            "Industry '{requested}' has no benchmarks; using '{}'",
            r.name
        )),
        Some(_) => None,
        None => Some(format!(
            "No benchmarks available for '{requested}'; benchmark comparisons skipped"
        )),
    }
}

impl Default for BenchmarkTable {
    fn default() -> Self {
        use RatioKind as R;

        let technology: IndustryBenchmarks = [
            (R::GrossMargin, dec!(0.65)),
            (R::OperatingMargin, dec!(0.20)),
            (R::NetMargin, dec!(0.15)),
            (R::ReturnOnAssets, dec!(0.10)),
            (R::ReturnOnEquity, dec!(0.18)),
            (R::CurrentRatio, dec!(2.5)),
            (R::QuickRatio, dec!(2.0)),
            (R::DebtToEquity, dec!(0.30)),
            (R::DebtToAssets, dec!(0.25)),
            (R::AssetTurnover, dec!(0.7)),
        ]
        .into_iter()
        .collect();

        let manufacturing: IndustryBenchmarks = [
            (R::GrossMargin, dec!(0.30)),
            (R::OperatingMargin, dec!(0.10)),
            (R::NetMargin, dec!(0.06)),
            (R::ReturnOnAssets, dec!(0.06)),
            (R::ReturnOnEquity, dec!(0.12)),
            (R::CurrentRatio, dec!(1.5)),
            (R::QuickRatio, dec!(1.0)),
            (R::DebtToEquity, dec!(0.60)),
            (R::DebtToAssets, dec!(0.40)),
            (R::AssetTurnover, dec!(1.0)),
            (R::InventoryTurnover, dec!(6)),
        ]
        .into_iter()
        .collect();

        let retail: IndustryBenchmarks = [
            (R::GrossMargin, dec!(0.35)),
            (R::OperatingMargin, dec!(0.06)),
            (R::NetMargin, dec!(0.03)),
            (R::ReturnOnAssets, dec!(0.07)),
            (R::ReturnOnEquity, dec!(0.15)),
            (R::CurrentRatio, dec!(1.2)),
            (R::QuickRatio, dec!(0.5)),
            (R::DebtToEquity, dec!(0.80)),
            (R::DebtToAssets, dec!(0.45)),
            (R::AssetTurnover, dec!(2.0)),
            (R::InventoryTurnover, dec!(8)),
        ]
        .into_iter()
        .collect();

        let mut industries = BTreeMap::new();
        industries.insert(TECHNOLOGY.to_string(), technology);
        industries.insert(MANUFACTURING.to_string(), manufacturing);
        industries.insert(RETAIL.to_string(), retail);
        Self(industries)
    }
}
