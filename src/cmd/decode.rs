use std::fs;
use std::path::PathBuf;

use btfdump::btf::{DecodeOptions, StructValue, TypeGraph, Value, decode_event};

/// Decode a raw event buffer against the graph and print it as JSON.
pub fn run(buffer: PathBuf, types: PathBuf, root: String, strict_arrays: bool, compact: bool) -> btfdump::btf::Result<()> {
	let graph = TypeGraph::from_json_slice(&fs::read(types)?)?;
	let raw = fs::read(buffer)?;
	let opt = DecodeOptions {
		strict_arrays,
		..DecodeOptions::default()
	};
	let decoded = decode_event(&graph, &root, &raw, &opt)?;

	let json = struct_to_json(&decoded);
	if compact {
		println!("{json}");
	} else {
		println!("{}", serde_json::to_string_pretty(&json)?);
	}

	Ok(())
}

/// Flatten a decoded struct to a JSON object keyed by member name.
pub(crate) fn struct_to_json(item: &StructValue) -> serde_json::Value {
	use serde_json::{Map, Value as JsonValue};

	let fields: Map<String, JsonValue> = item
		.fields
		.iter()
		.map(|field| (field.name.to_string(), value_to_json(&field.value)))
		.collect();
	JsonValue::Object(fields)
}

pub(crate) fn value_to_json(value: &Value) -> serde_json::Value {
	use serde_json::Value as JsonValue;

	match value {
		Value::U64(v) => serde_json::json!(v),
		Value::I64(v) => serde_json::json!(v),
		Value::String(v) => serde_json::json!(v),
		Value::Enum(v) => serde_json::json!(v),
		Value::Array(items) => {
			let values: Vec<JsonValue> = items.iter().map(value_to_json).collect();
			JsonValue::Array(values)
		}
		Value::Struct(item) => struct_to_json(item),
	}
}
