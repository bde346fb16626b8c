use serde_json::Value;
use std::io;

/// Write the result as CSV to stdout.
///
/// Arrays of objects (anomaly lists) become one row per element. Anything
/// else is flattened to `field,value` rows with dotted paths, e.g.
/// `ratio_analysis.ratios.current_ratio,1.75`.
pub fn print_csv(value: &Value) {
    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    match result {
        Value::Array(rows) if rows.iter().all(Value::is_object) && !rows.is_empty() => {
            write_rows(&mut wtr, rows);
        }
        _ => {
            let _ = wtr.write_record(["field", "value"]);
            let mut flat = Vec::new();
            flatten("", result, &mut flat);
            for (key, val) in flat {
                let _ = wtr.write_record([key, val]);
            }
        }
    }

    let _ = wtr.flush();
}

fn write_rows(wtr: &mut csv::Writer<io::StdoutLock<'_>>, rows: &[Value]) {
    let Some(Value::Object(first)) = rows.first() else {
        return;
    };
    let headers: Vec<&str> = first.keys().map(String::as_str).collect();
    let _ = wtr.write_record(&headers);

    for row in rows {
        if let Value::Object(map) = row {
            let record: Vec<String> = headers
                .iter()
                .map(|h| map.get(*h).map(super::cell).unwrap_or_default())
                .collect();
            let _ = wtr.write_record(&record);
        }
    }
}

fn flatten(prefix: &str, value: &Value, out: &mut Vec<(String, String)>) {
    let join = |key: &str| {
        if prefix.is_empty() {
            key.to_string()
        } else {
            format!("{prefix}.{key}")
        }
    };
    match value {
        Value::Object(map) => {
            for (key, val) in map {
                flatten(&join(key), val, out);
            }
        }
        Value::Array(items) if items.iter().any(|v| v.is_object()) => {
            for (i, val) in items.iter().enumerate() {
                flatten(&join(&i.to_string()), val, out);
            }
        }
        _ => out.push((prefix.to_string(), super::cell(value))),
    }
}
