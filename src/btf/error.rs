use thiserror::Error;

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, BtfError>;

/// Errors produced while loading type graphs and decoding event buffers.
#[derive(Debug, Error)]
pub enum BtfError {
	/// Filesystem or stream IO failure.
	#[error("io: {0}")]
	Io(#[from] std::io::Error),
	/// Type graph description failed to parse.
	#[error("type graph json: {0}")]
	Json(#[from] serde_json::Error),
	/// Not enough bytes remained for a requested read.
	#[error("unexpected eof at offset {at}, need {need} bytes, remaining {rem}")]
	UnexpectedEof {
		/// Byte offset where the read was attempted.
		at: usize,
		/// Requested bytes.
		need: usize,
		/// Bytes still available.
		rem: usize,
	},
	/// Type id referenced by the graph does not resolve.
	#[error("unresolved type id {id}")]
	UnresolvedTypeId {
		/// Offending type id.
		id: u32,
	},
	/// Typedef chain revisited itself.
	#[error("typedef cycle starting at type id {id}")]
	AliasCycle {
		/// Id the chain was entered through.
		id: u32,
	},
	/// Requested type name was not found in the graph.
	#[error("type not found: {name}")]
	TypeNotFound {
		/// Requested type name.
		name: String,
	},
	/// Type was expected to resolve to a struct layout.
	#[error("type {name} is not a struct")]
	NotAStruct {
		/// Name or id label of the offending type.
		name: String,
	},
	/// Integer layout outside the supported width/signedness set.
	#[error("unsupported int: signed={signed}, bits={bits}")]
	UnsupportedInt {
		/// Declared signedness.
		signed: bool,
		/// Declared width in bits.
		bits: u32,
	},
	/// Member bytes end before the member's type does.
	#[error("truncated {type_name}: need {need} bytes, have {have}")]
	Truncated {
		/// Type or field being decoded.
		type_name: String,
		/// Required number of bytes.
		need: usize,
		/// Available bytes.
		have: usize,
	},
	/// Buffer shorter than the root struct's declared size.
	#[error("buffer too small: need {need} bytes, have {have}")]
	BufferTooSmall {
		/// Declared root struct size.
		need: usize,
		/// Buffer length.
		have: usize,
	},
	/// Struct member offset regressed below its predecessor.
	#[error("member offset regression in {struct_name}: {member} at {offset} after {prev}")]
	MemberOffsetRegressed {
		/// Enclosing struct type name.
		struct_name: String,
		/// Member whose offset regressed.
		member: String,
		/// Offending byte offset.
		offset: u32,
		/// Preceding member's byte offset.
		prev: u32,
	},
	/// Declared struct size ends before its last member begins.
	#[error("struct {struct_name} size {size} ends before member {member} at {offset}")]
	StructSizeTooSmall {
		/// Struct type name.
		struct_name: String,
		/// Declared total size in bytes.
		size: u32,
		/// Member outside the declared size.
		member: String,
		/// Member byte offset.
		offset: u32,
	},
	/// Enum discriminant outside the declared value list.
	#[error("enum index out of range for {name}: index={index}, values={count}")]
	EnumIndexOutOfRange {
		/// Enum member or type name.
		name: String,
		/// Decoded discriminant index.
		index: i32,
		/// Declared value count.
		count: usize,
	},
	/// Union reached before any governing enum was decoded.
	#[error("no active discriminant for union {name}")]
	MissingUnionDiscriminant {
		/// Union member name.
		name: String,
	},
	/// Established discriminant does not select a union member.
	#[error("union index out of range for {name}: index={index}, members={members}")]
	UnionIndexOutOfRange {
		/// Union member name.
		name: String,
		/// Active discriminant index.
		index: i32,
		/// Declared member count.
		members: usize,
	},
	/// Array element type sized to zero bytes.
	#[error("array {name} has zero-size element")]
	ZeroSizeElement {
		/// Array member name.
		name: String,
	},
	/// Array byte size overflowed.
	#[error("array size overflow: count={count}, element_size={element_size}")]
	ArraySizeOverflow {
		/// Declared element count.
		count: u32,
		/// Element size in bytes.
		element_size: usize,
	},
	/// Strict mode found a dropped trailing partial element.
	#[error("array {name} has {leftover} trailing bytes smaller than one element")]
	TrailingArrayBytes {
		/// Array member name.
		name: String,
		/// Unconsumed trailing bytes.
		leftover: usize,
	},
	/// Recursion ceiling reached while walking the graph.
	#[error("decode depth exceeded (max={max_depth})")]
	DepthExceeded {
		/// Configured depth ceiling.
		max_depth: u32,
	},
}
