use std::fs;
use std::path::PathBuf;

use btfdump::btf::{BtfError, Result, Type, TypeGraph, TypeId, member_extents};

/// Summarize a type graph, optionally with one struct's member extents.
pub fn run(types: PathBuf, struct_name: Option<String>) -> Result<()> {
	let graph = TypeGraph::from_json_slice(&fs::read(&types)?)?;

	println!("path: {}", types.display());
	println!("types: {}", graph.len());

	if let Some(name) = struct_name {
		let id = graph.type_by_name(&name).ok_or_else(|| BtfError::TypeNotFound { name: name.clone() })?;
		let (resolved, ty) = graph.resolve_alias(id)?;
		let Type::Struct { size, members } = ty else {
			return Err(BtfError::NotAStruct { name });
		};

		println!("struct: {name}");
		println!("size: {size}");
		println!("member_count: {}", members.len());
		for (member, extent) in members.iter().zip(member_extents(&graph, resolved)?) {
			println!("  {}: {}-{} {}", extent.name, extent.start, extent.end, type_summary(&graph, member.type_id));
		}
		return Ok(());
	}

	for (id, entry) in graph.entries() {
		println!("[{id}] {} {}", kind_label(&entry.ty), entry.name.as_deref().unwrap_or("<anon>"));
	}

	Ok(())
}

fn kind_label(ty: &Type) -> &'static str {
	match ty {
		Type::Int { .. } => "int",
		Type::Array { .. } => "array",
		Type::Struct { .. } => "struct",
		Type::Union { .. } => "union",
		Type::Enum { .. } => "enum",
		Type::Typedef { .. } => "typedef",
	}
}

fn type_summary(graph: &TypeGraph, id: TypeId) -> String {
	match graph.name_of(id) {
		Some(name) => name.to_owned(),
		None => format!("<id {id}>"),
	}
}
