//! Purpose: JSON serializers for compile reports and decoded scripts.
//! Exports: `compile_report_json`, `header_json`, `record_json`.
//! Role: Keep the `build --json` and `inspect --json` envelopes consistent.
//! Invariants: Stable key names/order for report and record payloads.
//! Invariants: Byte strings are rendered lossily as UTF-8; the engine treats them as raw bytes.

use bstr::ByteSlice;
use mkscript::api::{CompileReport, ScriptHeader, ScriptRow};
use serde_json::{Map, Value, json};

pub(crate) fn compile_report_json(report: &CompileReport) -> Value {
    let mut map = Map::new();
    map.insert(
        "input".to_string(),
        json!(report.input.display().to_string()),
    );
    map.insert(
        "output".to_string(),
        json!(report.output.display().to_string()),
    );
    map.insert("format".to_string(), json!(report.format.label()));
    map.insert("records".to_string(), json!(report.records));
    map.insert("bytes".to_string(), json!(report.bytes));
    Value::Object(map)
}

pub(crate) fn header_json(header: &ScriptHeader) -> Value {
    json!({
        "version": header.version,
        "records": header.record_count,
    })
}

pub(crate) fn record_json(index: usize, row: &ScriptRow) -> Value {
    let args: Vec<String> = row
        .argument_list()
        .iter()
        .map(|arg| arg.to_str_lossy().into_owned())
        .collect();
    let mut map = Map::new();
    map.insert("index".to_string(), json!(index));
    map.insert("timer".to_string(), json!(row.timer));
    map.insert("system".to_string(), json!(lossy(&row.system)));
    map.insert("to".to_string(), json!(lossy(&row.to)));
    map.insert("from".to_string(), json!(lossy(&row.from)));
    map.insert("command".to_string(), json!(lossy(&row.command)));
    map.insert("arguments".to_string(), json!(lossy(&row.arguments)));
    map.insert("args".to_string(), json!(args));
    Value::Object(map)
}

fn lossy(bytes: &[u8]) -> String {
    bytes.to_str_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::{header_json, record_json};
    use mkscript::api::{ScriptHeader, ScriptRow};

    #[test]
    fn record_json_splits_arguments() {
        let row = ScriptRow::new(-1, "spawner", "", "", "new", "ship;10;20").expect("row");
        let value = record_json(1, &row);
        assert_eq!(value["timer"], -1);
        assert_eq!(value["system"], "spawner");
        assert_eq!(value["args"][0], "ship");
        assert_eq!(value["args"][2], "20");
    }

    #[test]
    fn header_json_has_version_and_count() {
        let value = header_json(&ScriptHeader::new(2));
        assert_eq!(value["version"], "v0.9.0");
        assert_eq!(value["records"], 2);
    }
}
