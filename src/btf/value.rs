#[derive(Debug, Clone, PartialEq)]
pub enum Value {
	U64(u64),
	I64(i64),
	String(Box<str>),
	Enum(Box<str>),
	Array(Vec<Value>),
	Struct(StructValue),
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructValue {
	pub type_name: Box<str>,
	pub fields: Vec<FieldValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldValue {
	pub name: Box<str>,
	pub value: Value,
}

impl StructValue {
	pub fn field(&self, name: &str) -> Option<&Value> {
		self.fields.iter().find(|field| field.name.as_ref() == name).map(|field| &field.value)
	}
}
