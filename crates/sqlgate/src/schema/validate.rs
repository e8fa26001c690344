//! Schema-driven value validation.
//!
//! Checks run in a fixed order and the first failure wins:
//! required, data type, length, precision, range.

use super::column::{Column, DataType};
use crate::value::Value;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::OnceLock;

/// Why a value was rejected for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationReason {
    ValueRequired,
    BadDataType,
    TooLong,
    BadPrecision,
    TooHigh,
    TooLow,
}

impl ValidationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValueRequired => "value_required",
            Self::BadDataType => "bad_data_type",
            Self::TooLong => "too_long",
            Self::BadPrecision => "bad_precision",
            Self::TooHigh => "too_high",
            Self::TooLow => "too_low",
        }
    }
}

impl fmt::Display for ValidationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ValueRequired => "value required",
            Self::BadDataType => "bad data type",
            Self::TooLong => "too long",
            Self::BadPrecision => "bad precision",
            Self::TooHigh => "too high",
            Self::TooLow => "too low",
        })
    }
}

impl Serialize for ValidationReason {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

macro_rules! builtin_regex {
    ($name:ident, $pattern:expr) => {
        fn $name() -> &'static Regex {
            static RE: OnceLock<Regex> = OnceLock::new();
            RE.get_or_init(|| Regex::new($pattern).expect("invalid built-in regex"))
        }
    };
}

builtin_regex!(integer_re, r"^-?\d+$");
builtin_regex!(
    numeric_re,
    r"^[+-]?(\d+(\.\d*)?|\.\d+)([eE][+-]?\d+)?$"
);
builtin_regex!(bit_re, r"^[01]+$");
builtin_regex!(date_re, r"^\d{2,4}-[01]\d-[0-3]\d$");
builtin_regex!(
    datetime_re,
    r"^\d{2,4}-[01]\d-[0-3]\d( [0-2]\d:[0-5]\d:[0-5]\d(\.\d{1,6})?)?$"
);
builtin_regex!(time_re, r"^-?[0-8]?\d{1,2}:[0-5]\d:[0-5]\d(\.\d{1,6})?$");
builtin_regex!(year_re, r"^\d{4}$");

impl Column {
    /// Validate a value about to be written to this column.
    pub fn test_value(&self, value: &Value) -> Result<(), ValidationReason> {
        if value.is_empty() {
            return if self.is_required() {
                Err(ValidationReason::ValueRequired)
            } else {
                Ok(())
            };
        }

        self.test_data_type(value)?;
        self.test_length(value)?;

        let text = value.text();
        self.test_precision(&text)?;
        self.test_range(&text)
    }

    fn test_data_type(&self, value: &Value) -> Result<(), ValidationReason> {
        // Raw bytes are taken as-is.
        if matches!(value, Value::Bytes(_)) {
            return Ok(());
        }
        let text = value.text();
        let ok = match &self.data_type {
            dt if dt.is_integer() => integer_re().is_match(&text),
            dt if dt.is_fractional() => numeric_re().is_match(&text),
            DataType::Bit => bit_re().is_match(&text),
            DataType::Date => date_re().is_match(&text),
            DataType::DateTime | DataType::Timestamp => datetime_re().is_match(&text),
            DataType::Time => time_re().is_match(&text),
            DataType::Year => {
                year_re().is_match(&text)
                    && (text == "0000"
                        || text
                            .parse::<u32>()
                            .is_ok_and(|y| (1901..=2155).contains(&y)))
            }
            DataType::Json => serde_json::from_str::<serde_json::Value>(&text).is_ok(),
            _ => true,
        };
        if ok {
            Ok(())
        } else {
            Err(ValidationReason::BadDataType)
        }
    }

    fn test_length(&self, value: &Value) -> Result<(), ValidationReason> {
        match self.max_length {
            Some(max) if max > 0 && value.char_len() as u64 > max => Err(ValidationReason::TooLong),
            _ => Ok(()),
        }
    }

    /// Digits of the decimal text against `NUMERIC_PRECISION`/`NUMERIC_SCALE`.
    fn test_precision(&self, text: &str) -> Result<(), ValidationReason> {
        let Some(precision) = self.numeric_precision.filter(|p| *p > 0) else {
            return Ok(());
        };
        if !(self.data_type.is_integer() || self.data_type.is_fractional()) {
            return Ok(());
        }
        // Exponent notation has no fixed digit layout.
        if text.contains(['e', 'E']) {
            return Ok(());
        }

        let unsigned = text.trim_start_matches(['-', '+']);
        let (whole, decimal) = unsigned.split_once('.').unwrap_or((unsigned, ""));
        let whole = whole.trim_start_matches('0');
        let precision = precision as usize;
        let scale = self.numeric_scale.unwrap_or(0) as usize;

        let ok = if scale == 0 {
            whole.len() <= precision && (decimal.is_empty() || self.data_type != DataType::Decimal)
        } else {
            whole.len() <= precision.saturating_sub(scale) && decimal.len() <= scale
        };
        if ok {
            Ok(())
        } else {
            Err(ValidationReason::BadPrecision)
        }
    }

    fn test_range(&self, text: &str) -> Result<(), ValidationReason> {
        let Some(bits) = self.data_type.integer_bits() else {
            return Ok(());
        };
        let (min, max) = integer_bounds(bits, self.is_unsigned());

        let n = match text.parse::<i128>() {
            Ok(n) => n,
            // More digits than i128 holds: out of range either way.
            Err(_) if text.starts_with('-') => return Err(ValidationReason::TooLow),
            Err(_) => return Err(ValidationReason::TooHigh),
        };
        if n < min {
            Err(ValidationReason::TooLow)
        } else if n > max {
            Err(ValidationReason::TooHigh)
        } else {
            Ok(())
        }
    }
}

fn integer_bounds(bits: u32, unsigned: bool) -> (i128, i128) {
    if unsigned {
        (0, (1i128 << bits) - 1)
    } else {
        (-(1i128 << (bits - 1)), (1i128 << (bits - 1)) - 1)
    }
}
