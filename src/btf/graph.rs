use std::collections::HashMap;

use crate::btf::{BtfError, Result};

/// Index of a descriptor in the graph's type table.
pub type TypeId = u32;

/// Byte width of a decoded enum discriminant.
pub(crate) const ENUM_DISCRIMINANT_SIZE: usize = 4;

/// Nesting ceiling for type sizing, independent of decode options.
const SIZE_DEPTH_LIMIT: u32 = 32;

/// One named constant of an enumeration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct EnumValue {
	/// Symbolic constant name.
	pub name: Box<str>,
	/// Declared 32-bit value.
	pub value: i32,
}

/// One field of a struct or union layout.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Member {
	/// Field name.
	pub name: Box<str>,
	/// Byte offset from the start of the enclosing layout.
	#[serde(default)]
	pub offset: u32,
	/// Field type reference.
	#[serde(rename = "type")]
	pub type_id: TypeId,
}

/// Shape of one type in the graph.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Type {
	/// Fixed-width little-endian integer.
	Int {
		/// Two's-complement when set.
		signed: bool,
		/// Width in bits.
		bits: u32,
	},
	/// Fixed-length inline array.
	Array {
		/// Element type reference.
		element: TypeId,
		/// Declared element count.
		count: u32,
	},
	/// Struct layout with compiler-assigned member offsets.
	Struct {
		/// Total size in bytes, padding included.
		size: u32,
		/// Members in ascending offset order.
		members: Vec<Member>,
	},
	/// Overlapping interpretations of the same bytes.
	Union {
		/// Members, all at offset 0.
		members: Vec<Member>,
		/// Sibling enum member that selects the live branch.
		#[serde(default, skip_serializing_if = "Option::is_none")]
		tag: Option<Box<str>>,
	},
	/// 32-bit enumeration.
	Enum {
		/// Named constants in declaration order.
		values: Vec<EnumValue>,
	},
	/// Named alias for another type.
	Typedef {
		/// Aliased type reference.
		target: TypeId,
	},
}

/// One graph entry: an optionally named descriptor.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TypeEntry {
	/// Source-level type name, when the producer recorded one.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name: Option<Box<str>>,
	/// Descriptor body.
	#[serde(flatten)]
	pub ty: Type,
}

/// Serialized form of a whole graph.
#[derive(serde::Serialize, serde::Deserialize)]
struct GraphDoc {
	types: Vec<TypeEntry>,
}

/// Immutable table of type descriptors keyed by id and name.
#[derive(Debug, Clone)]
pub struct TypeGraph {
	types: Vec<TypeEntry>,
	by_name: HashMap<Box<str>, TypeId>,
}

impl TypeGraph {
	/// Build a graph from descriptor entries; ids are table positions.
	pub fn new(types: Vec<TypeEntry>) -> Self {
		let mut by_name = HashMap::new();
		for (idx, entry) in types.iter().enumerate() {
			if let Some(name) = &entry.name {
				// First declaration wins; BTF allows shadowed names.
				by_name.entry(name.clone()).or_insert(idx as TypeId);
			}
		}

		Self { types, by_name }
	}

	/// Parse a JSON graph description.
	pub fn from_json_slice(bytes: &[u8]) -> Result<Self> {
		let doc: GraphDoc = serde_json::from_slice(bytes)?;
		Ok(Self::new(doc.types))
	}

	/// Number of entries in the table.
	pub fn len(&self) -> usize {
		self.types.len()
	}

	/// Whether the table holds no entries.
	pub fn is_empty(&self) -> bool {
		self.types.is_empty()
	}

	/// Iterate entries with their ids.
	pub fn entries(&self) -> impl Iterator<Item = (TypeId, &TypeEntry)> {
		self.types.iter().enumerate().map(|(idx, entry)| (idx as TypeId, entry))
	}

	/// Look up an entry by id.
	pub fn get(&self, id: TypeId) -> Result<&TypeEntry> {
		self.types.get(id as usize).ok_or(BtfError::UnresolvedTypeId { id })
	}

	/// Look up a type id by name.
	pub fn type_by_name(&self, name: &str) -> Option<TypeId> {
		self.by_name.get(name).copied()
	}

	/// Return the name recorded for `id`, if any.
	pub fn name_of(&self, id: TypeId) -> Option<&str> {
		self.types.get(id as usize).and_then(|entry| entry.name.as_deref())
	}

	/// Follow the typedef chain from `id` to its first non-alias descriptor.
	///
	/// Chains are walked iteratively; a chain longer than the table must
	/// revisit an id, so it is reported as a cycle instead of followed.
	pub fn resolve_alias(&self, id: TypeId) -> Result<(TypeId, &Type)> {
		let mut current = id;
		for _ in 0..=self.types.len() {
			let entry = self.get(current)?;
			match &entry.ty {
				Type::Typedef { target } => current = *target,
				other => return Ok((current, other)),
			}
		}

		Err(BtfError::AliasCycle { id })
	}

	/// Byte size of the type behind `id`, aliases resolved.
	pub fn size_of(&self, id: TypeId) -> Result<usize> {
		self.size_of_bounded(id, SIZE_DEPTH_LIMIT)
	}

	fn size_of_bounded(&self, id: TypeId, depth: u32) -> Result<usize> {
		if depth == 0 {
			return Err(BtfError::DepthExceeded { max_depth: SIZE_DEPTH_LIMIT });
		}

		let (_, ty) = self.resolve_alias(id)?;
		match ty {
			Type::Int { bits, .. } => Ok((*bits as usize).div_ceil(8)),
			Type::Enum { .. } => Ok(ENUM_DISCRIMINANT_SIZE),
			Type::Struct { size, .. } => Ok(*size as usize),
			Type::Array { element, count } => {
				let element_size = self.size_of_bounded(*element, depth - 1)?;
				element_size.checked_mul(*count as usize).ok_or(BtfError::ArraySizeOverflow {
					count: *count,
					element_size,
				})
			}
			Type::Union { members, .. } => {
				let mut max = 0;
				for member in members {
					max = max.max(self.size_of_bounded(member.type_id, depth - 1)?);
				}
				Ok(max)
			}
			Type::Typedef { target } => self.size_of_bounded(*target, depth - 1),
		}
	}
}
