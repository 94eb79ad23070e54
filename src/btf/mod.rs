mod bytes;
mod decode;
mod error;
mod graph;
mod value;

/// Buffer decoding entry points and options.
pub use decode::{DecodeOptions, MemberExtent, decode_event, decode_struct_instance, member_extents};
/// Error and result aliases.
pub use error::{BtfError, Result};
/// Type graph representation and lookup.
pub use graph::{EnumValue, Member, Type, TypeEntry, TypeGraph, TypeId};
/// Decoded runtime value types.
pub use value::{FieldValue, StructValue, Value};
