use crate::btf::bytes::Cursor;
use crate::btf::graph::{Member, Type, TypeGraph, TypeId};
use crate::btf::value::{FieldValue, StructValue, Value};
use crate::btf::{BtfError, Result};

/// Runtime limits and behavior switches for buffer decoding.
#[derive(Debug, Clone)]
pub struct DecodeOptions {
	/// Maximum recursive nesting depth.
	pub max_depth: u32,
	/// Error on a dropped trailing partial array element.
	pub strict_arrays: bool,
}

impl Default for DecodeOptions {
	fn default() -> Self {
		Self {
			max_depth: 32,
			strict_arrays: false,
		}
	}
}

/// Per-invocation decode state.
///
/// Every enum decoded during the current traversal is recorded here so a
/// later union can look up its governing discriminant. Nothing survives
/// the top-level call, so independent decodes against a shared graph do
/// not interfere.
#[derive(Debug, Default)]
struct DecodeContext {
	discriminants: Vec<(Box<str>, i32)>,
}

impl DecodeContext {
	fn record(&mut self, member: &str, index: i32) {
		self.discriminants.push((member.into(), index));
	}

	/// Discriminant recorded under `tag`, or the most recent one when untagged.
	fn active(&self, tag: Option<&str>) -> Option<i32> {
		match tag {
			Some(name) => self
				.discriminants
				.iter()
				.rev()
				.find(|(member, _)| member.as_ref() == name)
				.map(|(_, index)| *index),
			None => self.discriminants.last().map(|(_, index)| *index),
		}
	}
}

/// Computed byte range of one struct member.
#[derive(Debug, Clone)]
pub struct MemberExtent {
	/// Member name.
	pub name: Box<str>,
	/// First byte owned by the member.
	pub start: usize,
	/// One past the last byte owned by the member.
	pub end: usize,
}

/// Decode the named root struct from the front of `buf`.
pub fn decode_event(graph: &TypeGraph, root: &str, buf: &[u8], opt: &DecodeOptions) -> Result<StructValue> {
	let id = graph.type_by_name(root).ok_or_else(|| BtfError::TypeNotFound { name: root.to_owned() })?;
	let (id, ty) = graph.resolve_alias(id)?;
	let Type::Struct { size, .. } = ty else {
		return Err(BtfError::NotAStruct { name: root.to_owned() });
	};

	let need = *size as usize;
	if buf.len() < need {
		return Err(BtfError::BufferTooSmall { need, have: buf.len() });
	}

	decode_struct_instance(graph, id, &buf[..need], opt)
}

/// Decode one struct instance from raw bytes by graph id.
pub fn decode_struct_instance(graph: &TypeGraph, id: TypeId, bytes: &[u8], opt: &DecodeOptions) -> Result<StructValue> {
	let (id, ty) = graph.resolve_alias(id)?;
	let Type::Struct { size, members } = ty else {
		return Err(BtfError::NotAStruct { name: type_label(graph, id) });
	};

	let mut ctx = DecodeContext::default();
	decode_struct_fields(graph, id, *size, members, bytes, opt, &mut ctx, 0)
}

/// Byte ranges of a struct's members under the sibling-offset rule.
pub fn member_extents(graph: &TypeGraph, id: TypeId) -> Result<Vec<MemberExtent>> {
	let (id, ty) = graph.resolve_alias(id)?;
	let Type::Struct { size, members } = ty else {
		return Err(BtfError::NotAStruct { name: type_label(graph, id) });
	};

	let struct_name = type_label(graph, id);
	let mut out = Vec::with_capacity(members.len());
	for index in 0..members.len() {
		let (start, end) = member_extent(&struct_name, *size, members, index)?;
		out.push(MemberExtent {
			name: members[index].name.clone(),
			start,
			end,
		});
	}

	Ok(out)
}

/// Half-open byte range of member `index`.
///
/// Interior members run to the next member's offset and the last member
/// runs to the declared size, so compiler padding rides along with the
/// preceding member. Offsets must not regress and the declared size must
/// cover the last offset.
fn member_extent(struct_name: &str, size: u32, members: &[Member], index: usize) -> Result<(usize, usize)> {
	let member = &members[index];
	let end = match members.get(index + 1) {
		Some(next) => {
			if next.offset < member.offset {
				return Err(BtfError::MemberOffsetRegressed {
					struct_name: struct_name.to_owned(),
					member: next.name.to_string(),
					offset: next.offset,
					prev: member.offset,
				});
			}
			next.offset
		}
		None => {
			if size < member.offset {
				return Err(BtfError::StructSizeTooSmall {
					struct_name: struct_name.to_owned(),
					size,
					member: member.name.to_string(),
					offset: member.offset,
				});
			}
			size
		}
	};

	Ok((member.offset as usize, end as usize))
}

fn decode_struct_fields(
	graph: &TypeGraph,
	id: TypeId,
	size: u32,
	members: &[Member],
	bytes: &[u8],
	opt: &DecodeOptions,
	ctx: &mut DecodeContext,
	depth: u32,
) -> Result<StructValue> {
	let struct_name = type_label(graph, id);

	let mut fields = Vec::with_capacity(members.len());
	for index in 0..members.len() {
		let (start, end) = member_extent(&struct_name, size, members, index)?;
		let member = &members[index];
		let slice = bytes.get(start..end).ok_or_else(|| BtfError::Truncated {
			type_name: struct_name.clone(),
			need: end,
			have: bytes.len(),
		})?;
		let value = decode_value(graph, &member.name, member.type_id, slice, opt, ctx, depth + 1)?;
		fields.push(FieldValue {
			name: member.name.clone(),
			value,
		});
	}

	Ok(StructValue {
		type_name: struct_name.into_boxed_str(),
		fields,
	})
}

fn decode_value(
	graph: &TypeGraph,
	name: &str,
	type_id: TypeId,
	bytes: &[u8],
	opt: &DecodeOptions,
	ctx: &mut DecodeContext,
	depth: u32,
) -> Result<Value> {
	if depth > opt.max_depth {
		return Err(BtfError::DepthExceeded { max_depth: opt.max_depth });
	}

	let entry = graph.get(type_id)?;
	match &entry.ty {
		Type::Typedef { .. } => {
			let (resolved, _) = graph.resolve_alias(type_id)?;
			decode_value(graph, name, resolved, bytes, opt, ctx, depth + 1)
		}
		Type::Int { signed, bits } => decode_int(name, bytes, *signed, *bits),
		Type::Enum { values } => {
			let index = Cursor::new(bytes).read_i32_le()?;
			let value = usize::try_from(index)
				.ok()
				.and_then(|idx| values.get(idx))
				.ok_or_else(|| BtfError::EnumIndexOutOfRange {
					name: name.to_owned(),
					index,
					count: values.len(),
				})?;
			ctx.record(name, index);
			Ok(Value::Enum(value.name.clone()))
		}
		Type::Union { members, tag } => {
			let index = ctx
				.active(tag.as_deref())
				.ok_or_else(|| BtfError::MissingUnionDiscriminant { name: name.to_owned() })?;
			let member = usize::try_from(index)
				.ok()
				.and_then(|idx| members.get(idx))
				.ok_or_else(|| BtfError::UnionIndexOutOfRange {
					name: name.to_owned(),
					index,
					members: members.len(),
				})?;
			// Only the selected member's interpretation of the bytes is live.
			decode_value(graph, &member.name, member.type_id, bytes, opt, ctx, depth + 1)
		}
		Type::Struct { size, members } => decode_struct_fields(graph, type_id, *size, members, bytes, opt, ctx, depth).map(Value::Struct),
		Type::Array { element, count } => decode_array(graph, name, *element, *count, bytes, opt, ctx, depth),
	}
}

fn decode_int(name: &str, bytes: &[u8], signed: bool, bits: u32) -> Result<Value> {
	let width = match bits {
		8 | 16 | 32 | 64 => (bits / 8) as usize,
		_ => return Err(BtfError::UnsupportedInt { signed, bits }),
	};

	// Member extents keep trailing padding; only the leading width counts.
	let raw = bytes.get(..width).ok_or_else(|| BtfError::Truncated {
		type_name: name.to_owned(),
		need: width,
		have: bytes.len(),
	})?;

	let mut buf = [0_u8; 8];
	buf[..width].copy_from_slice(raw);
	let value = u64::from_le_bytes(buf);

	if signed {
		Ok(Value::I64(sign_extend(value, bits)))
	} else {
		Ok(Value::U64(value))
	}
}

fn sign_extend(value: u64, bits: u32) -> i64 {
	match bits {
		8 => i64::from(value as u8 as i8),
		16 => i64::from(value as u16 as i16),
		32 => i64::from(value as u32 as i32),
		_ => value as i64,
	}
}

fn decode_array(
	graph: &TypeGraph,
	name: &str,
	element: TypeId,
	count: u32,
	bytes: &[u8],
	opt: &DecodeOptions,
	ctx: &mut DecodeContext,
	depth: u32,
) -> Result<Value> {
	let (element_id, element_ty) = graph.resolve_alias(element)?;

	if let Type::Int { bits: 8, .. } = element_ty {
		if is_char_type(graph.name_of(element_id)) {
			if let Some(text) = printable_prefix(bytes) {
				return Ok(Value::String(text));
			}
		}
	}

	let element_size = graph.size_of(element_id)?;
	if element_size == 0 {
		return Err(BtfError::ZeroSizeElement { name: name.to_owned() });
	}

	let mut cursor = Cursor::new(bytes);
	let mut out = Vec::new();
	while out.len() < count as usize && cursor.remaining() >= element_size {
		let element_bytes = cursor.read_exact(element_size)?;
		out.push(decode_value(graph, name, element_id, element_bytes, opt, ctx, depth + 1)?);
	}

	if opt.strict_arrays && out.len() < count as usize && cursor.remaining() > 0 {
		return Err(BtfError::TrailingArrayBytes {
			name: name.to_owned(),
			leftover: cursor.remaining(),
		});
	}

	Ok(Value::Array(out))
}

fn is_char_type(name: Option<&str>) -> bool {
	matches!(name, Some("char" | "unsigned char"))
}

/// NUL-terminated printable prefix of a char array, if it has one.
fn printable_prefix(bytes: &[u8]) -> Option<Box<str>> {
	let end = bytes.iter().position(|byte| *byte == 0)?;
	let prefix = &bytes[..end];
	if !prefix.iter().all(|byte| byte.is_ascii_graphic() || *byte == b' ') {
		return None;
	}

	Some(String::from_utf8_lossy(prefix).into_owned().into_boxed_str())
}

fn type_label(graph: &TypeGraph, id: TypeId) -> String {
	match graph.name_of(id) {
		Some(name) => name.to_owned(),
		None => format!("<id {id}>"),
	}
}
