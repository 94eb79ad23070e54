#![allow(missing_docs)]

use std::fs;
use std::path::{Path, PathBuf};

use btfdump::btf::{DecodeOptions, TypeGraph, Value, decode_event, member_extents};

fn load_graph() -> TypeGraph {
	let path = fixture_path("event_types.json");
	let raw = fs::read(path).expect("fixture reads");
	TypeGraph::from_json_slice(&raw).expect("graph parses")
}

fn fixture_path(name: &str) -> PathBuf {
	Path::new(env!("CARGO_MANIFEST_DIR")).join("testdata").join(name)
}

fn put(buf: &mut [u8], offset: usize, bytes: &[u8]) {
	buf[offset..offset + bytes.len()].copy_from_slice(bytes);
}

/// Byte image of the producer's test event, laid out per the fixture graph.
fn event_buffer() -> [u8; 208] {
	let mut buf = [0_u8; 208];
	put(&mut buf, 0, &1234_u32.to_le_bytes());
	put(&mut buf, 8, &899_999_888_u64.to_le_bytes());
	put(&mut buf, 16, b"foo.c\0");
	put(&mut buf, 48, b"foo\0");
	// struct foo f
	put(&mut buf, 64, &1_i32.to_le_bytes());
	put(&mut buf, 68, &2_u32.to_le_bytes());
	// info1: ACCESS_FILE
	put(&mut buf, 72, &1_i32.to_le_bytes());
	put(&mut buf, 76, b"/etc/foo.conf\0");
	// info2: ACCESS_PROCESS
	put(&mut buf, 108, &0_i32.to_le_bytes());
	put(&mut buf, 112, b"/bin/foo\0");
	put(&mut buf, 144, &99_999_u32.to_le_bytes());
	put(&mut buf, 148, &99_998_u32.to_le_bytes());
	put(&mut buf, 184, &1_i16.to_le_bytes());
	put(&mut buf, 186, &2_i16.to_le_bytes());
	put(&mut buf, 188, &3_i16.to_le_bytes());
	put(&mut buf, 190, &4_i16.to_le_bytes());
	// struct embed_a
	put(&mut buf, 192, &1_i32.to_le_bytes());
	put(&mut buf, 196, &2_i32.to_le_bytes());
	put(&mut buf, 200, &345_i32.to_le_bytes());
	buf
}

#[test]
fn full_event_layout_decodes_end_to_end() {
	let graph = load_graph();
	let buf = event_buffer();
	let event = decode_event(&graph, "event", &buf, &DecodeOptions::default()).expect("event decodes");

	// pid goes through the tgid_t typedef chain.
	assert_eq!(event.field("pid"), Some(&Value::U64(1234)));
	assert_eq!(event.field("delta_ns"), Some(&Value::U64(899_999_888)));
	assert_eq!(event.field("filename"), Some(&Value::String("foo.c".into())));
	assert_eq!(event.field("task"), Some(&Value::String("foo".into())));

	let Some(Value::Struct(f)) = event.field("f") else {
		panic!("expected nested struct f");
	};
	assert_eq!(f.field("a"), Some(&Value::I64(1)));
	assert_eq!(f.field("b"), Some(&Value::U64(2)));

	let Some(Value::Struct(info1)) = event.field("info1") else {
		panic!("expected struct info1");
	};
	assert_eq!(info1.field("type"), Some(&Value::Enum("ACCESS_FILE".into())));
	let Some(Value::Struct(file)) = info1.field("info") else {
		panic!("expected file union member");
	};
	assert_eq!(file.field("file_name"), Some(&Value::String("/etc/foo.conf".into())));

	let Some(Value::Struct(info2)) = event.field("info2") else {
		panic!("expected struct info2");
	};
	assert_eq!(info2.field("type"), Some(&Value::Enum("ACCESS_PROCESS".into())));
	let Some(Value::Struct(process)) = info2.field("info") else {
		panic!("expected process union member");
	};
	assert_eq!(process.field("process_name"), Some(&Value::String("/bin/foo".into())));

	let Some(Value::Array(uints)) = event.field("unsigned_int_data") else {
		panic!("expected unsigned int array");
	};
	assert_eq!(uints.len(), 10);
	assert_eq!(uints[0], Value::U64(99_999));
	assert_eq!(uints[1], Value::U64(99_998));
	assert_eq!(uints[2], Value::U64(0));

	assert_eq!(
		event.field("short_int_data"),
		Some(&Value::Array(vec![Value::I64(1), Value::I64(2), Value::I64(3), Value::I64(4)]))
	);

	let Some(Value::Struct(embed_a)) = event.field("embed_a") else {
		panic!("expected struct embed_a");
	};
	assert_eq!(embed_a.field("ea"), Some(&Value::I64(1)));
	assert_eq!(embed_a.field("eb"), Some(&Value::I64(2)));
	let Some(Value::Struct(eb2)) = embed_a.field("eb2") else {
		panic!("expected struct eb2");
	};
	assert_eq!(eb2.field("eb1"), Some(&Value::I64(345)));
}

#[test]
fn field_order_follows_declaration_order() {
	let graph = load_graph();
	let buf = event_buffer();
	let event = decode_event(&graph, "event", &buf, &DecodeOptions::default()).expect("event decodes");

	let names: Vec<&str> = event.fields.iter().map(|field| field.name.as_ref()).collect();
	assert_eq!(
		names,
		[
			"pid",
			"delta_ns",
			"filename",
			"task",
			"f",
			"info1",
			"info2",
			"unsigned_int_data",
			"short_int_data",
			"embed_a"
		]
	);
}

#[test]
fn event_member_extents_tile_the_declared_size() {
	let graph = load_graph();
	let id = graph.type_by_name("event").expect("event exists");
	let extents = member_extents(&graph, id).expect("extents resolve");

	assert_eq!(extents.first().map(|extent| extent.start), Some(0));
	for pair in extents.windows(2) {
		assert_eq!(pair[0].end, pair[1].start, "extents must tile with no gaps");
	}
	assert_eq!(extents.last().map(|extent| extent.end), Some(208));

	// delta_ns owns the alignment padding after pid.
	assert_eq!(extents[0].name.as_ref(), "pid");
	assert_eq!(extents[0].end, 8);
}

#[test]
fn decode_is_repeatable_against_a_shared_graph() {
	let graph = load_graph();
	let buf = event_buffer();

	let first = decode_event(&graph, "event", &buf, &DecodeOptions::default()).expect("first decode");
	let second = decode_event(&graph, "event", &buf, &DecodeOptions::default()).expect("second decode");
	assert_eq!(first, second, "no state may leak between invocations");
}
