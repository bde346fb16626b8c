use serde_json::Value;

use super::cell;

/// JSON pointers into the result, most informative first.
const PRIORITY_POINTERS: [&str; 8] = [
    "/financial_health_score",
    "/overall_score",
    "/details/sustainability",
    "/status",
    "/ratio_analysis/ratios/current_ratio",
    "/earnings_quality_score",
    "/fallback_industry",
    "/reliability_grade",
];

/// Print just the headline value of the output.
///
/// Anomaly lists print their length; objects print the first non-null
/// priority field, falling back to the first field.
pub fn print_minimal(value: &Value) {
    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    match result {
        Value::Array(items) => println!("{}", items.len()),
        Value::Object(map) => {
            let headline = PRIORITY_POINTERS
                .iter()
                .filter_map(|p| result.pointer(p))
                .find(|v| !v.is_null());
            match (headline, map.iter().next()) {
                (Some(v), _) => println!("{}", cell(v)),
                (None, Some((key, v))) => println!("{}: {}", key, cell(v)),
                (None, None) => println!("(empty)"),
            }
        }
        other => println!("{}", cell(other)),
    }
}
