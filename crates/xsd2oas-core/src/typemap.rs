//! Builtin XSD datatype to JSON-Schema primitive mapping

use std::fmt;

/// A JSON-Schema primitive type, or a name passed through unmapped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonType<'a> {
    String,
    Number,
    Boolean,
    /// No builtin mapping exists; the raw name is used as-is
    Passthrough(&'a str),
}

impl<'a> JsonType<'a> {
    pub fn as_str(&self) -> &'a str {
        match self {
            JsonType::String => "string",
            JsonType::Number => "number",
            JsonType::Boolean => "boolean",
            JsonType::Passthrough(name) => *name,
        }
    }
}

impl fmt::Display for JsonType<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of mapping an XSD datatype name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeMapping<'a> {
    pub json_type: JsonType<'a>,
    /// True when the XSD name differs from the JSON name, so information is lost
    pub lossy: bool,
}

const NUMERIC: &[&str] = &[
    "decimal",
    "integer",
    "int",
    "long",
    "short",
    "byte",
    "float",
    "double",
    "nonNegativeInteger",
    "nonPositiveInteger",
    "negativeInteger",
    "positiveInteger",
    "unsignedLong",
    "unsignedInt",
    "unsignedShort",
    "unsignedByte",
];

const STRING_LIKE: &[&str] = &[
    "string",
    "normalizedString",
    "token",
    "language",
    "Name",
    "NCName",
    "QName",
    "NOTATION",
    "ID",
    "IDREF",
    "IDREFS",
    "ENTITY",
    "ENTITIES",
    "NMTOKEN",
    "NMTOKENS",
    "anyURI",
    "base64Binary",
    "hexBinary",
    "date",
    "dateTime",
    "dateTimeStamp",
    "time",
    "duration",
    "dayTimeDuration",
    "yearMonthDuration",
    "gYear",
    "gYearMonth",
    "gMonth",
    "gMonthDay",
    "gDay",
    "anySimpleType",
    "anyAtomicType",
];

/// Strip a namespace prefix such as `xs:` from a qualified name
pub fn local_name(name: &str) -> &str {
    name.rsplit_once(':').map_or(name, |(_, local)| local)
}

/// Whether `name` is a builtin XSD datatype
pub fn is_builtin(name: &str) -> bool {
    let local = local_name(name);
    local == "boolean" || NUMERIC.contains(&local) || STRING_LIKE.contains(&local)
}

/// Map an XSD datatype name to its closest JSON-Schema primitive
pub fn map_type_name(name: &str) -> TypeMapping<'_> {
    let local = local_name(name);
    let json_type = if local == "boolean" {
        JsonType::Boolean
    } else if NUMERIC.contains(&local) {
        JsonType::Number
    } else if STRING_LIKE.contains(&local) {
        JsonType::String
    } else {
        return TypeMapping {
            json_type: JsonType::Passthrough(name),
            lossy: false,
        };
    };
    TypeMapping {
        json_type,
        lossy: local != json_type.as_str(),
    }
}
