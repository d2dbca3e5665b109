//! Declarative field tables
//!
//! Each configuration struct describes itself once as a list of [`Field`]
//! rows, normally generated by `#[derive(EnvConfig)]`. The decoder walks
//! that table instead of inspecting types at runtime.

use std::fmt;

use chrono::TimeDelta;

use crate::decode::Decoder;
use crate::error::ConfError;

/// Semantic type a raw environment value is converted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    String,
    Int,
    Unsigned,
    Bool,
    Duration,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Int => "int",
            Self::Unsigned => "unsigned int",
            Self::Bool => "bool",
            Self::Duration => "duration",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Description of one configuration field.
///
/// Inside a field table `key` and `path` are relative to the declaring
/// struct; the decoder hands mutators a copy with the enclosing prefixes and
/// struct path applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    /// Environment variable name (e.g., "DB_HOST")
    pub key: String,
    /// Dotted Rust field path (e.g., "database.host")
    pub path: String,
    /// Fail when the variable is unset
    pub required: bool,
    /// Literal used when the variable is unset
    pub default: Option<String>,
    /// Semantic type the value is converted to
    pub kind: FieldKind,
    /// Fall back to the file named by `{KEY}_FILE`
    pub from_file: bool,
}

impl FieldSpec {
    pub fn new(key: impl Into<String>, path: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            key: key.into(),
            path: path.into(),
            required: false,
            default: None,
            kind,
            from_file: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default_value(mut self, literal: impl Into<String>) -> Self {
        self.default = Some(literal.into());
        self
    }

    /// Also read `{KEY}_FILE` when `KEY` itself is unset.
    pub fn from_file(mut self) -> Self {
        self.from_file = true;
        self
    }
}

/// A converted value, ready to be assigned to a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scalar {
    Str(String),
    Int(i64),
    Unsigned(u64),
    Bool(bool),
    Duration(TimeDelta),
}

/// Assigns a converted scalar into its field; `Err` carries a range message.
pub type AssignFn<T> = fn(&mut T, Scalar) -> Result<(), String>;

/// Decodes a nested struct in place.
pub type NestedFn<T> = fn(&mut T, &mut Decoder<'_>) -> Result<(), ConfError>;

/// One row of a configuration struct's field table.
pub enum Field<T> {
    Scalar {
        spec: FieldSpec,
        assign: AssignFn<T>,
    },
    Nested {
        name: &'static str,
        prefix: &'static str,
        decode: NestedFn<T>,
    },
}

impl<T> Field<T> {
    pub fn scalar(spec: FieldSpec, assign: AssignFn<T>) -> Self {
        Self::Scalar { spec, assign }
    }

    pub fn nested(name: &'static str, prefix: &'static str, decode: NestedFn<T>) -> Self {
        Self::Nested {
            name,
            prefix,
            decode,
        }
    }
}

impl<T> fmt::Debug for Field<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar { spec, .. } => f.debug_tuple("Scalar").field(spec).finish(),
            Self::Nested { name, prefix, .. } => f
                .debug_struct("Nested")
                .field("name", name)
                .field("prefix", prefix)
                .finish(),
        }
    }
}

/// A struct that can be populated from environment values.
///
/// Implement with `#[derive(EnvConfig)]`. `Default` supplies the zero value
/// of fields that are neither set, defaulted nor required.
pub trait EnvConfig: Default {
    /// The field table, in declaration order.
    fn fields() -> Vec<Field<Self>>;
}

/// A Rust type that a field of some [`FieldKind`] can be stored in.
pub trait EnvValue: Sized {
    const KIND: FieldKind;

    fn from_scalar(scalar: Scalar) -> Result<Self, String>;
}

fn mismatch<T>(scalar: &Scalar) -> String {
    format!(
        "cannot store {:?} in {}",
        scalar,
        std::any::type_name::<T>()
    )
}

impl EnvValue for String {
    const KIND: FieldKind = FieldKind::String;

    fn from_scalar(scalar: Scalar) -> Result<Self, String> {
        match scalar {
            Scalar::Str(s) => Ok(s),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl EnvValue for bool {
    const KIND: FieldKind = FieldKind::Bool;

    fn from_scalar(scalar: Scalar) -> Result<Self, String> {
        match scalar {
            Scalar::Bool(b) => Ok(b),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

macro_rules! impl_env_value_int {
    ($($ty:ty),*) => {$(
        impl EnvValue for $ty {
            const KIND: FieldKind = FieldKind::Int;

            fn from_scalar(scalar: Scalar) -> Result<Self, String> {
                match scalar {
                    Scalar::Int(n) => <$ty>::try_from(n)
                        .map_err(|_| format!("{} is out of range for {}", n, stringify!($ty))),
                    other => Err(mismatch::<Self>(&other)),
                }
            }
        }
    )*};
}

macro_rules! impl_env_value_unsigned {
    ($($ty:ty),*) => {$(
        impl EnvValue for $ty {
            const KIND: FieldKind = FieldKind::Unsigned;

            fn from_scalar(scalar: Scalar) -> Result<Self, String> {
                match scalar {
                    Scalar::Unsigned(n) => <$ty>::try_from(n)
                        .map_err(|_| format!("{} is out of range for {}", n, stringify!($ty))),
                    other => Err(mismatch::<Self>(&other)),
                }
            }
        }
    )*};
}

impl_env_value_int!(i8, i16, i32, i64, isize);
impl_env_value_unsigned!(u8, u16, u32, u64, usize);

impl EnvValue for TimeDelta {
    const KIND: FieldKind = FieldKind::Duration;

    fn from_scalar(scalar: Scalar) -> Result<Self, String> {
        match scalar {
            Scalar::Duration(d) => Ok(d),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl EnvValue for std::time::Duration {
    const KIND: FieldKind = FieldKind::Duration;

    fn from_scalar(scalar: Scalar) -> Result<Self, String> {
        match scalar {
            Scalar::Duration(d) => d
                .to_std()
                .map_err(|_| "negative durations are not allowed".to_string()),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl<T: EnvValue> EnvValue for Option<T> {
    const KIND: FieldKind = T::KIND;

    fn from_scalar(scalar: Scalar) -> Result<Self, String> {
        T::from_scalar(scalar).map(Some)
    }
}
