//! The declaration model produced by [`parse`](crate::parse()).
//!
//! All values are plain data: the parser builds them once and no later
//! pipeline stage mutates them. Qualification and filtering construct new
//! values instead.

/// A single parsed `.proto` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtoFile {
    /// The name the file was parsed under, used in diagnostics.
    pub file_name: String,
    pub package_name: std::option::Option<String>,
    /// Import path strings, in declaration order.
    pub dependencies: Vec<String>,
    pub types: Vec<Type>,
    pub services: Vec<Service>,
    pub extend_declarations: Vec<ExtendDeclaration>,
    pub options: Vec<Option>,
}

/// A named type declaration: either a message or an enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Message(Message),
    Enum(Enum),
}

impl Type {
    pub fn name(&self) -> &str {
        match self {
            Type::Message(message) => &message.name,
            Type::Enum(enum_type) => &enum_type.name,
        }
    }

    pub fn fully_qualified_name(&self) -> &str {
        match self {
            Type::Message(message) => &message.fully_qualified_name,
            Type::Enum(enum_type) => &enum_type.fully_qualified_name,
        }
    }

    /// Types declared lexically inside this one. Empty for enums.
    pub fn nested_types(&self) -> &[Type] {
        match self {
            Type::Message(message) => &message.nested_types,
            Type::Enum(_) => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub name: String,
    pub fully_qualified_name: String,
    pub documentation: String,
    pub fields: Vec<Field>,
    pub nested_types: Vec<Type>,
    pub extension_ranges: Vec<ExtensionRange>,
    pub options: Vec<Option>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enum {
    pub name: String,
    pub fully_qualified_name: String,
    pub documentation: String,
    pub values: Vec<EnumValue>,
    pub options: Vec<Option>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    pub name: String,
    pub tag: i32,
    pub documentation: String,
    pub options: Vec<Option>,
}

/// A numeric `extensions N to M;` range declared inside a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtensionRange {
    pub start: i32,
    pub end: i32,
}

/// A field's multiplicity marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    Optional,
    Required,
    Repeated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub label: Label,
    /// A scalar keyword or a type name. Unqualified names are rewritten to
    /// fully-qualified ones by the qualifier.
    pub ty: String,
    pub name: String,
    pub tag: i32,
    pub documentation: String,
    pub options: Vec<Option>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Service {
    pub name: String,
    pub fully_qualified_name: String,
    pub documentation: String,
    pub options: Vec<Option>,
    pub methods: Vec<Method>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
    pub name: String,
    pub documentation: String,
    pub request_type: String,
    pub response_type: String,
    pub options: Vec<Option>,
}

/// An `extend <Name> { ... }` declaration.
///
/// `fully_qualified_name` holds the extended target type. The parser fills
/// it with the name prefixed by the declaration scope; the qualifier
/// replaces it with the resolved absolute name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendDeclaration {
    pub name: String,
    pub fully_qualified_name: String,
    pub documentation: String,
    pub fields: Vec<Field>,
}

/// A single `name = value` option entry.
///
/// A list of these is an ordered name-to-value map; insertion order is
/// significant for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Option {
    pub name: String,
    pub value: OptionValue,
}

/// The value side of an option, mirroring proto text-format syntax.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    /// A quoted or bare literal, kept as written.
    String(String),
    /// Dotted-path shorthand: `option (a.b).c = v;` parses as option `a.b`
    /// whose value is the nested option `c = v`.
    Option(Box<Option>),
    /// A `{ ... }` literal map.
    Map(Vec<Option>),
    /// Produced when a map key is repeated.
    List(Vec<OptionValue>),
}
