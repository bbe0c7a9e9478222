use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoercionError {
    #[error("not a number: '{value}' {kind}")]
    NotANumber { value: String, kind: &'static str },
}

/// Measurement payload as handed over by the collector.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "serde_json::Value")]
pub enum RawValue {
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    I128(i128),
    Isize(isize),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    U128(u128),
    Usize(usize),
    F32(f32),
    F64(f64),
    Str(String),
    Bool(bool),
    Nil,
    Structured(serde_json::Value),
}
impl RawValue {
    pub fn to_f64(&self) -> Result<f64, CoercionError> {
        Ok(match *self {
            Self::I8(v) => v as f64,
            Self::I16(v) => v as f64,
            Self::I32(v) => v as f64,
            Self::I64(v) => v as f64,
            Self::I128(v) => v as f64,
            Self::Isize(v) => v as f64,
            Self::U8(v) => v as f64,
            Self::U16(v) => v as f64,
            Self::U32(v) => v as f64,
            Self::U64(v) => v as f64,
            Self::U128(v) => v as f64,
            Self::Usize(v) => v as f64,
            Self::F32(v) => v as f64,
            Self::F64(v) => v,
            _ => {
                return Err(CoercionError::NotANumber {
                    value: self.to_string(),
                    kind: self.kind(),
                })
            }
        })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::I8(_) => "i8",
            Self::I16(_) => "i16",
            Self::I32(_) => "i32",
            Self::I64(_) => "i64",
            Self::I128(_) => "i128",
            Self::Isize(_) => "isize",
            Self::U8(_) => "u8",
            Self::U16(_) => "u16",
            Self::U32(_) => "u32",
            Self::U64(_) => "u64",
            Self::U128(_) => "u128",
            Self::Usize(_) => "usize",
            Self::F32(_) => "f32",
            Self::F64(_) => "f64",
            Self::Str(_) => "string",
            Self::Bool(_) => "bool",
            Self::Nil => "nil",
            Self::Structured(_) => "structured",
        }
    }
}
impl core::fmt::Display for RawValue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::I8(v) => write!(f, "{v}"),
            Self::I16(v) => write!(f, "{v}"),
            Self::I32(v) => write!(f, "{v}"),
            Self::I64(v) => write!(f, "{v}"),
            Self::I128(v) => write!(f, "{v}"),
            Self::Isize(v) => write!(f, "{v}"),
            Self::U8(v) => write!(f, "{v}"),
            Self::U16(v) => write!(f, "{v}"),
            Self::U32(v) => write!(f, "{v}"),
            Self::U64(v) => write!(f, "{v}"),
            Self::U128(v) => write!(f, "{v}"),
            Self::Usize(v) => write!(f, "{v}"),
            Self::F32(v) => write!(f, "{v}"),
            Self::F64(v) => write!(f, "{v}"),
            Self::Str(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Nil => write!(f, "<nil>"),
            Self::Structured(v) => write!(f, "{v}"),
        }
    }
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for RawValue {
                fn from(v: $ty) -> Self {
                    Self::$variant(v)
                }
            }
        )*
    };
}
impl_from! {
    i8 => I8, i16 => I16, i32 => I32, i64 => I64, i128 => I128, isize => Isize,
    u8 => U8, u16 => U16, u32 => U32, u64 => U64, u128 => U128, usize => Usize,
    f32 => F32, f64 => F64, String => Str, bool => Bool,
}
impl From<&str> for RawValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_owned())
    }
}
impl From<serde_json::Value> for RawValue {
    fn from(v: serde_json::Value) -> Self {
        use serde_json::Value;
        match v {
            Value::Null => Self::Nil,
            Value::Bool(b) => Self::Bool(b),
            Value::String(s) => Self::Str(s),
            Value::Number(n) => {
                if let Some(u) = n.as_u64() {
                    Self::U64(u)
                } else if let Some(i) = n.as_i64() {
                    Self::I64(i)
                } else {
                    // Finite by construction: JSON has no NaN or infinity
                    Self::F64(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            other => Self::Structured(other),
        }
    }
}
