use crate::value::{Value, WireType};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared data type of a column, as reported by the catalog `DATA_TYPE` field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    TinyInt,
    SmallInt,
    MediumInt,
    Int,
    BigInt,
    Decimal,
    Float,
    Double,
    Bit,
    Char,
    VarChar,
    TinyText,
    Text,
    MediumText,
    LongText,
    Binary,
    VarBinary,
    TinyBlob,
    Blob,
    MediumBlob,
    LongBlob,
    Date,
    DateTime,
    Timestamp,
    Time,
    Year,
    Json,
    Enum,
    Set,
    Other(String),
}

impl DataType {
    /// Parse a catalog type name (case-insensitive).
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "tinyint" | "bool" | "boolean" => Self::TinyInt,
            "smallint" => Self::SmallInt,
            "mediumint" => Self::MediumInt,
            "int" | "integer" => Self::Int,
            "bigint" => Self::BigInt,
            "decimal" | "numeric" | "dec" | "fixed" => Self::Decimal,
            "float" => Self::Float,
            "double" | "real" | "double precision" => Self::Double,
            "bit" => Self::Bit,
            "char" => Self::Char,
            "varchar" => Self::VarChar,
            "tinytext" => Self::TinyText,
            "text" => Self::Text,
            "mediumtext" => Self::MediumText,
            "longtext" => Self::LongText,
            "binary" => Self::Binary,
            "varbinary" => Self::VarBinary,
            "tinyblob" => Self::TinyBlob,
            "blob" => Self::Blob,
            "mediumblob" => Self::MediumBlob,
            "longblob" => Self::LongBlob,
            "date" => Self::Date,
            "datetime" => Self::DateTime,
            "timestamp" => Self::Timestamp,
            "time" => Self::Time,
            "year" => Self::Year,
            "json" => Self::Json,
            "enum" => Self::Enum,
            "set" => Self::Set,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::TinyInt => "tinyint",
            Self::SmallInt => "smallint",
            Self::MediumInt => "mediumint",
            Self::Int => "int",
            Self::BigInt => "bigint",
            Self::Decimal => "decimal",
            Self::Float => "float",
            Self::Double => "double",
            Self::Bit => "bit",
            Self::Char => "char",
            Self::VarChar => "varchar",
            Self::TinyText => "tinytext",
            Self::Text => "text",
            Self::MediumText => "mediumtext",
            Self::LongText => "longtext",
            Self::Binary => "binary",
            Self::VarBinary => "varbinary",
            Self::TinyBlob => "tinyblob",
            Self::Blob => "blob",
            Self::MediumBlob => "mediumblob",
            Self::LongBlob => "longblob",
            Self::Date => "date",
            Self::DateTime => "datetime",
            Self::Timestamp => "timestamp",
            Self::Time => "time",
            Self::Year => "year",
            Self::Json => "json",
            Self::Enum => "enum",
            Self::Set => "set",
            Self::Other(s) => s.as_str(),
        }
    }

    /// Storage width in bits for the integer family.
    pub fn integer_bits(&self) -> Option<u32> {
        match self {
            Self::TinyInt => Some(8),
            Self::SmallInt => Some(16),
            Self::MediumInt => Some(24),
            Self::Int => Some(32),
            Self::BigInt => Some(64),
            _ => None,
        }
    }

    pub fn is_integer(&self) -> bool {
        self.integer_bits().is_some()
    }

    /// Decimal and floating point types.
    pub fn is_fractional(&self) -> bool {
        matches!(self, Self::Decimal | Self::Float | Self::Double)
    }

    pub fn is_blob(&self) -> bool {
        matches!(
            self,
            Self::TinyBlob | Self::Blob | Self::MediumBlob | Self::LongBlob
        )
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Membership of a column in one index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexMembership {
    pub index_name: String,
    /// 1-based position of the column inside the index.
    pub seq: u32,
    pub unique: bool,
}

/// Column metadata, an immutable snapshot of the catalog at fetch time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub schema: String,
    pub table: String,
    pub name: String,
    pub data_type: DataType,
    /// Full type text, e.g. `int(10) unsigned`.
    pub column_type: String,
    pub nullable: bool,
    pub max_length: Option<u64>,
    pub numeric_precision: Option<u32>,
    pub numeric_scale: Option<u32>,
    pub default_value: Option<String>,
    pub column_key: Option<String>,
    pub extra: Option<String>,
    pub indexes: Vec<IndexMembership>,
}

impl Column {
    /// Minimal column with no constraints, mostly useful for tests.
    pub fn new(
        schema: impl Into<String>,
        table: impl Into<String>,
        name: impl Into<String>,
        data_type: DataType,
    ) -> Self {
        let data_type_name = data_type.as_str().to_string();
        Self {
            schema: schema.into(),
            table: table.into(),
            name: name.into(),
            data_type,
            column_type: data_type_name,
            nullable: true,
            max_length: None,
            numeric_precision: None,
            numeric_scale: None,
            default_value: None,
            column_key: None,
            extra: None,
            indexes: Vec::new(),
        }
    }

    pub fn with_column_type(mut self, column_type: impl Into<String>) -> Self {
        self.column_type = column_type.into();
        self
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default_value = Some(default.into());
        self
    }

    pub fn with_max_length(mut self, len: u64) -> Self {
        self.max_length = Some(len);
        self
    }

    pub fn with_precision(mut self, precision: u32, scale: Option<u32>) -> Self {
        self.numeric_precision = Some(precision);
        self.numeric_scale = scale;
        self
    }

    pub fn with_extra(mut self, extra: impl Into<String>) -> Self {
        self.extra = Some(extra.into());
        self
    }

    pub fn is_unsigned(&self) -> bool {
        self.column_type.to_ascii_lowercase().contains("unsigned")
    }

    pub fn is_auto_increment(&self) -> bool {
        self.extra
            .as_deref()
            .is_some_and(|e| e.to_ascii_lowercase().contains("auto_increment"))
    }

    /// A value must be supplied: no default, not nullable, not generated.
    pub fn is_required(&self) -> bool {
        self.default_value.is_none() && !self.nullable && !self.is_auto_increment()
    }

    /// Membership in the named index, if any.
    pub fn index(&self, name: &str) -> Option<&IndexMembership> {
        self.indexes.iter().find(|m| m.index_name == name)
    }

    /// Wire type used to bind `value` to this column.
    ///
    /// Integer columns fall back to `s` for values that do not fit a signed
    /// 64-bit integer.
    pub fn param_type(&self, value: &Value) -> WireType {
        if self.data_type.is_integer() {
            let fits = match value {
                Value::UInt(u) => *u <= i64::MAX as u64,
                Value::Text(s) => s.trim().parse::<i64>().is_ok(),
                Value::Float(_) | Value::Bytes(_) => false,
                Value::Null | Value::Bool(_) | Value::Int(_) => true,
            };
            return if fits {
                WireType::Integer
            } else {
                WireType::String
            };
        }
        if self.data_type.is_fractional() {
            return WireType::Float;
        }
        if self.data_type.is_blob() {
            return WireType::Blob;
        }
        WireType::String
    }
}
