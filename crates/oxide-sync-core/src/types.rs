//! Type inference from dataset value tags.
//!
//! A dataset column carries a [`ValueTypeTag`] describing its runtime
//! representation. [`infer_type`] maps that tag to one of six
//! [`RelationalType`]s. Text columns get one extra step: if their
//! first non-null value looks like a JSON object or array, the column
//! becomes `JSON`. The sniffing is a best-effort heuristic and looks
//! at a single value only.

use tracing::warn;

use crate::builder::value::SqlValue;
use crate::dataset::ColumnRef;

/// Runtime representation of a dataset column.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueTypeTag {
    /// Textual values.
    Text,
    /// Signed 8-bit integers.
    Int8,
    /// Signed 16-bit integers.
    Int16,
    /// Signed 32-bit integers.
    Int32,
    /// Signed 64-bit integers.
    Int64,
    /// Unsigned 8-bit integers.
    UInt8,
    /// Unsigned 16-bit integers.
    UInt16,
    /// Unsigned 32-bit integers.
    UInt32,
    /// Unsigned 64-bit integers.
    UInt64,
    /// Single precision floats.
    Float32,
    /// Double precision floats.
    Float64,
    /// Booleans.
    Boolean,
    /// Timestamps without a zone.
    DateTime,
    /// Timestamps carrying a zone.
    DateTimeTz,
    /// Mixed or opaque values (typically strings).
    Object,
    /// A tag name this crate does not recognize.
    Other(String),
}

impl ValueTypeTag {
    /// Parses a dtype name such as `int64`, `float32`, `bool` or
    /// `datetime64[ns, UTC]`. Matching is case-insensitive; unknown
    /// names are kept as [`ValueTypeTag::Other`].
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        let lower = name.trim().to_ascii_lowercase();
        match lower.as_str() {
            "string" | "str" | "text" => Self::Text,
            "int8" => Self::Int8,
            "int16" => Self::Int16,
            "int32" => Self::Int32,
            "int64" | "int" => Self::Int64,
            "uint8" => Self::UInt8,
            "uint16" => Self::UInt16,
            "uint32" => Self::UInt32,
            "uint64" => Self::UInt64,
            "float32" => Self::Float32,
            "float64" | "float" => Self::Float64,
            "bool" | "boolean" => Self::Boolean,
            "datetime" | "datetime64" | "datetime64[ns]" => Self::DateTime,
            "object" => Self::Object,
            s if s.starts_with("datetime64[") => Self::DateTimeTz,
            _ => Self::Other(name.to_string()),
        }
    }

    /// Derives a tag from a single decoded value.
    #[must_use]
    pub const fn of_value(value: &SqlValue) -> Option<Self> {
        match value {
            SqlValue::Null => None,
            SqlValue::Bool(_) => Some(Self::Boolean),
            SqlValue::Int(_) => Some(Self::Int64),
            SqlValue::Float(_) => Some(Self::Float64),
            SqlValue::Text(_) | SqlValue::Blob(_) => Some(Self::Object),
            SqlValue::DateTime(_) => Some(Self::DateTime),
        }
    }

    const fn is_temporal(&self) -> bool {
        matches!(self, Self::DateTime | Self::DateTimeTz)
    }

    const fn is_float(&self) -> bool {
        matches!(self, Self::Float32 | Self::Float64)
    }

    const fn is_integer(&self) -> bool {
        matches!(
            self,
            Self::Int8
                | Self::Int16
                | Self::Int32
                | Self::Int64
                | Self::UInt8
                | Self::UInt16
                | Self::UInt32
                | Self::UInt64
        )
    }
}

/// The relational column types this crate synthesizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationalType {
    /// `VARCHAR(255)`.
    Varchar,
    /// `DATETIME`.
    DateTime,
    /// `FLOAT(10,5)`.
    Float,
    /// `INT`, for every integer width.
    Int,
    /// `TINYINT(1)`, used for booleans.
    TinyInt,
    /// `JSON`.
    Json,
}

impl RelationalType {
    /// Every relational type, in inference priority order.
    pub const ALL: [Self; 6] = [
        Self::DateTime,
        Self::Float,
        Self::Int,
        Self::TinyInt,
        Self::Varchar,
        Self::Json,
    ];

    /// Returns the base type name without length or nullability.
    #[must_use]
    pub const fn base_name(self) -> &'static str {
        match self {
            Self::Varchar => "VARCHAR",
            Self::DateTime => "DATETIME",
            Self::Float => "FLOAT",
            Self::Int => "INT",
            Self::TinyInt => "TINYINT",
            Self::Json => "JSON",
        }
    }

    /// Returns the length/precision suffix content, if any.
    #[must_use]
    pub const fn length(self) -> Option<&'static str> {
        match self {
            Self::Varchar => Some("255"),
            Self::Float => Some("10,5"),
            Self::TinyInt => Some("1"),
            Self::DateTime | Self::Int | Self::Json => None,
        }
    }

    /// Returns the full column type, e.g. `FLOAT(10,5)`.
    #[must_use]
    pub fn sql(self) -> String {
        match self.length() {
            Some(len) => format!("{}({len})", self.base_name()),
            None => self.base_name().to_string(),
        }
    }

    /// Parses a base type name (case-insensitive).
    #[must_use]
    pub fn from_base_name(name: &str) -> Option<Self> {
        let upper = base_type(name);
        Self::ALL.into_iter().find(|t| t.base_name() == upper)
    }
}

impl std::fmt::Display for RelationalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.sql())
    }
}

/// Extracts the upper-cased base type from a declared type string:
/// `varchar(100)` → `VARCHAR`, `int(11) unsigned` → `INT`.
#[must_use]
pub fn base_type(declared: &str) -> String {
    declared
        .trim()
        .split(|c: char| c == '(' || c.is_whitespace())
        .next()
        .unwrap_or_default()
        .to_ascii_uppercase()
}

/// Maps a value tag (plus an optional text sample) to a relational type.
///
/// Never fails: tags that are not temporal, float, integer or boolean
/// become `VARCHAR`, or `JSON` when the sample parses as a JSON object
/// or array.
#[must_use]
pub fn infer_type(tag: &ValueTypeTag, sample: Option<&str>) -> RelationalType {
    if tag.is_temporal() {
        return RelationalType::DateTime;
    }
    if tag.is_float() {
        return RelationalType::Float;
    }
    if tag.is_integer() {
        return RelationalType::Int;
    }
    match tag {
        ValueTypeTag::Boolean => RelationalType::TinyInt,
        ValueTypeTag::Other(name) => {
            warn!(tag = %name, "Unrecognized value type tag, falling back to VARCHAR");
            sniff_text(sample)
        }
        _ => sniff_text(sample),
    }
}

/// Infers the relational type of a dataset column, sniffing its first
/// non-null value.
#[must_use]
pub fn infer_column(column: &ColumnRef<'_>) -> RelationalType {
    let sample = column
        .values
        .iter()
        .find(|v| !v.is_null())
        .and_then(SqlValue::as_text);
    infer_type(column.tag, sample)
}

fn sniff_text(sample: Option<&str>) -> RelationalType {
    match sample {
        Some(text) if looks_like_json(text) => RelationalType::Json,
        _ => RelationalType::Varchar,
    }
}

/// Returns `true` when `text` starts with `{` or `[` and parses as JSON.
#[must_use]
pub fn looks_like_json(text: &str) -> bool {
    if !(text.starts_with('{') || text.starts_with('[')) {
        return false;
    }
    serde_json::from_str::<serde_json::Value>(text).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_tags() -> Vec<ValueTypeTag> {
        vec![
            ValueTypeTag::Text,
            ValueTypeTag::Int8,
            ValueTypeTag::Int16,
            ValueTypeTag::Int32,
            ValueTypeTag::Int64,
            ValueTypeTag::UInt8,
            ValueTypeTag::UInt16,
            ValueTypeTag::UInt32,
            ValueTypeTag::UInt64,
            ValueTypeTag::Float32,
            ValueTypeTag::Float64,
            ValueTypeTag::Boolean,
            ValueTypeTag::DateTime,
            ValueTypeTag::DateTimeTz,
            ValueTypeTag::Object,
            ValueTypeTag::Other("category".into()),
        ]
    }

    #[test]
    fn test_infer_type_is_total() {
        for tag in all_tags() {
            for sample in [None, Some(""), Some("Bob"), Some("{\"a\":1}")] {
                let ty = infer_type(&tag, sample);
                assert!(RelationalType::ALL.contains(&ty), "{tag:?} -> {ty:?}");
            }
        }
    }

    #[test]
    fn test_integer_widths_unify() {
        for tag in [ValueTypeTag::Int8, ValueTypeTag::UInt64, ValueTypeTag::Int32] {
            assert_eq!(infer_type(&tag, None), RelationalType::Int);
        }
    }

    #[test]
    fn test_priority_and_suffixes() {
        assert_eq!(infer_type(&ValueTypeTag::DateTimeTz, None).sql(), "DATETIME");
        assert_eq!(infer_type(&ValueTypeTag::Float64, None).sql(), "FLOAT(10,5)");
        assert_eq!(infer_type(&ValueTypeTag::Boolean, None).sql(), "TINYINT(1)");
        assert_eq!(infer_type(&ValueTypeTag::Text, Some("Bob")).sql(), "VARCHAR(255)");
        assert_eq!(infer_type(&ValueTypeTag::Int16, None).sql(), "INT");
    }

    #[test]
    fn test_json_sniffing() {
        assert_eq!(
            infer_type(&ValueTypeTag::Object, Some("{\"a\":1}")),
            RelationalType::Json
        );
        assert_eq!(
            infer_type(&ValueTypeTag::Text, Some("[1, 2, 3]")),
            RelationalType::Json
        );
        // Leading brace but not valid JSON.
        assert_eq!(
            infer_type(&ValueTypeTag::Text, Some("{not json")),
            RelationalType::Varchar
        );
        // Valid JSON scalar does not count.
        assert_eq!(
            infer_type(&ValueTypeTag::Text, Some("42")),
            RelationalType::Varchar
        );
    }

    #[test]
    fn test_tags_only_sniff_text() {
        assert_eq!(
            infer_type(&ValueTypeTag::Float64, Some("{\"a\":1}")),
            RelationalType::Float
        );
    }

    #[test]
    fn test_from_name() {
        assert_eq!(ValueTypeTag::from_name("INT64"), ValueTypeTag::Int64);
        assert_eq!(ValueTypeTag::from_name("uint8"), ValueTypeTag::UInt8);
        assert_eq!(ValueTypeTag::from_name("bool"), ValueTypeTag::Boolean);
        assert_eq!(ValueTypeTag::from_name("boolean"), ValueTypeTag::Boolean);
        assert_eq!(ValueTypeTag::from_name("datetime64[ns]"), ValueTypeTag::DateTime);
        assert_eq!(
            ValueTypeTag::from_name("datetime64[ns, UTC]"),
            ValueTypeTag::DateTimeTz
        );
        assert_eq!(
            ValueTypeTag::from_name("category"),
            ValueTypeTag::Other("category".into())
        );
    }

    #[test]
    fn test_base_type() {
        assert_eq!(base_type("varchar(100)"), "VARCHAR");
        assert_eq!(base_type("int(11) unsigned"), "INT");
        assert_eq!(base_type("JSON"), "JSON");
        assert_eq!(base_type(""), "");
        assert_eq!(RelationalType::from_base_name("float(10,5)"), Some(RelationalType::Float));
        assert_eq!(RelationalType::from_base_name("bigint"), None);
    }
}
