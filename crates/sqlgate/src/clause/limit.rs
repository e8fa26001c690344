use crate::value::{Value, WireType};

/// Row count, or offset and row count.
///
/// Always rendered with placeholders; both values bind as integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    Count(u64),
    Range { offset: u64, count: u64 },
}

impl Limit {
    pub fn to_sql(&self) -> &'static str {
        match self {
            Limit::Count(_) => "LIMIT ?",
            Limit::Range { .. } => "LIMIT ?, ?",
        }
    }

    /// Bound values, in placeholder order.
    pub fn params(&self) -> Vec<Value> {
        match *self {
            Limit::Count(count) => vec![Value::UInt(count)],
            Limit::Range { offset, count } => vec![Value::UInt(offset), Value::UInt(count)],
        }
    }

    pub fn types(&self) -> String {
        self.params()
            .iter()
            .map(|_| WireType::Integer.as_char())
            .collect()
    }
}

impl From<u64> for Limit {
    fn from(count: u64) -> Self {
        Limit::Count(count)
    }
}

impl From<u32> for Limit {
    fn from(count: u32) -> Self {
        Limit::Count(u64::from(count))
    }
}

impl From<usize> for Limit {
    fn from(count: usize) -> Self {
        Limit::Count(count as u64)
    }
}

impl From<i32> for Limit {
    fn from(count: i32) -> Self {
        Limit::Count(count.max(0) as u64)
    }
}

impl From<(u64, u64)> for Limit {
    fn from((offset, count): (u64, u64)) -> Self {
        Limit::Range { offset, count }
    }
}

impl From<(i32, i32)> for Limit {
    fn from((offset, count): (i32, i32)) -> Self {
        Limit::Range {
            offset: offset.max(0) as u64,
            count: count.max(0) as u64,
        }
    }
}
