use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::cell;

/// Format output as tables using the tabled crate.
///
/// A full analysis is split into sections (scores, anomalies, benchmarks,
/// narrative lists); any other result falls back to a field/value table.
pub fn print_table(value: &Value) {
    let Value::Object(envelope) = value else {
        println!("{}", value);
        return;
    };
    let Some(result) = envelope.get("result") else {
        print_fields(envelope);
        return;
    };

    match result {
        Value::Object(map) if map.contains_key("anomaly_detections") => print_analysis(map),
        Value::Object(map) => print_fields(map),
        Value::Array(rows) => print_anomalies(rows),
        other => println!("{}", cell(other)),
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {}", w);
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_analysis(result: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Score", "Value"]);
    for key in [
        "financial_health_score",
        "earnings_quality_score",
        "balance_sheet_strength",
        "cash_flow_quality",
    ] {
        if let Some(v) = result.get(key) {
            builder.push_record([key.to_string(), cell(v)]);
        }
    }
    if let Some(q) = result.get("statement_quality") {
        builder.push_record(["statement_quality".to_string(), cell(&q["overall_score"])]);
        builder.push_record(["reliability_grade".to_string(), cell(&q["reliability_grade"])]);
    }
    println!("{}", Table::from(builder));

    if let Some(Value::Array(rows)) = result.get("anomaly_detections") {
        println!("\nAnomalies:");
        print_anomalies(rows);
    }

    if let Some(Value::Array(rows)) = result
        .get("benchmarking")
        .and_then(|b| b.get("comparisons"))
    {
        let industry = result.get("industry").map(cell).unwrap_or_default();
        println!("\nBenchmarks ({}):", industry);
        let mut builder = Builder::default();
        builder.push_record(["Ratio", "Value", "Benchmark", "Grade"]);
        for row in rows {
            builder.push_record([
                cell(&row["ratio"]),
                cell(&row["value"]),
                cell(&row["benchmark"]),
                cell(&row["grade"]),
            ]);
        }
        println!("{}", Table::from(builder));
    }

    for (key, title) in [
        ("key_insights", "Key insights"),
        ("management_attention_areas", "Management attention"),
        ("investor_focus_points", "Investor focus"),
        ("audit_recommendations", "Audit recommendations"),
    ] {
        if let Some(Value::Array(items)) = result.get(key) {
            if !items.is_empty() {
                println!("\n{}:", title);
                for item in items.iter().filter_map(Value::as_str) {
                    println!("  - {}", item);
                }
            }
        }
    }
}

fn print_anomalies(rows: &[Value]) {
    if rows.is_empty() {
        println!("(none)");
        return;
    }
    let mut builder = Builder::default();
    builder.push_record(["Type", "Severity", "Risk", "Description"]);
    for row in rows {
        builder.push_record([
            cell(&row["anomaly_type"]),
            cell(&row["severity"]),
            cell(&row["risk_score"]),
            cell(&row["description"]),
        ]);
    }
    println!("{}", Table::from(builder));
}

fn print_fields(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        builder.push_record([key.clone(), cell(val)]);
    }
    println!("{}", Table::from(builder));
}
