//! Element Types
//!
//! Describes how the raw bytes of a buffer are interpreted: the kind of
//! scalar, its bit width and the number of vector lanes.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::runtime::{halide_type_code_t, halide_type_t};

/// Scalar kind of a buffer element
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Kind {
    /// Signed integer
    Int = halide_type_code_t::halide_type_int as u8,
    /// Unsigned integer
    UInt = halide_type_code_t::halide_type_uint as u8,
    /// IEEE floating point
    Float = halide_type_code_t::halide_type_float as u8,
}

impl Kind {
    /// Decode from a runtime type code. Handles and bfloats have no `Kind`.
    pub fn from_code(code: u8) -> Option<Self> {
        match halide_type_code_t::from_u8(code)? {
            halide_type_code_t::halide_type_int => Some(Kind::Int),
            halide_type_code_t::halide_type_uint => Some(Kind::UInt),
            halide_type_code_t::halide_type_float => Some(Kind::Float),
            _ => None,
        }
    }

    fn prefix(self) -> char {
        match self {
            Kind::Int => 'i',
            Kind::UInt => 'u',
            Kind::Float => 'f',
        }
    }
}

/// Type of the pixel data in terms of kind and bits.
///
/// For example, `Type::new(Kind::UInt, 8)` uses one 8-bit unsigned integer per
/// channel and `Type::new(Kind::Float, 32)` uses a float per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Type {
    kind: Kind,
    bits: u8,
    lanes: u16,
}

impl Type {
    /// 8-bit unsigned integer
    pub const U8: Type = Type::new(Kind::UInt, 8);
    /// 16-bit unsigned integer
    pub const U16: Type = Type::new(Kind::UInt, 16);
    /// 32-bit float
    pub const F32: Type = Type::new(Kind::Float, 32);

    /// Create a scalar type
    pub const fn new(kind: Kind, bits: u8) -> Self {
        Self::with_lanes(kind, bits, 1)
    }

    /// Create a vector type with `lanes` elements
    pub const fn with_lanes(kind: Kind, bits: u8, lanes: u16) -> Self {
        Self { kind, bits, lanes }
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn bits(&self) -> u8 {
        self.bits
    }

    pub fn lanes(&self) -> u16 {
        self.lanes
    }

    /// Size in bytes of one scalar, rounded up (a 1-bit bool takes a byte)
    pub fn bytes(&self) -> usize {
        (self.bits as usize).div_ceil(8)
    }
}

/// A type name that does not match any known element type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown element type: {0}")]
pub struct UnknownType(pub String);

impl FromStr for Type {
    type Err = UnknownType;

    /// Parse from a short type name such as `u8`, `uint16` or `float`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "u8" | "uint8" | "uint8_t" | "byte" => Ok(Type::U8),
            "u16" | "uint16" | "uint16_t" => Ok(Type::U16),
            "u32" | "uint32" | "uint32_t" => Ok(Type::new(Kind::UInt, 32)),
            "u64" | "uint64" | "uint64_t" => Ok(Type::new(Kind::UInt, 64)),
            "i8" | "int8" | "int8_t" => Ok(Type::new(Kind::Int, 8)),
            "i16" | "int16" | "int16_t" => Ok(Type::new(Kind::Int, 16)),
            "i32" | "int32" | "int32_t" | "int" => Ok(Type::new(Kind::Int, 32)),
            "i64" | "int64" | "int64_t" => Ok(Type::new(Kind::Int, 64)),
            "f16" | "half" | "float16" => Ok(Type::new(Kind::Float, 16)),
            "f32" | "float" | "float32" => Ok(Type::F32),
            "f64" | "double" | "float64" => Ok(Type::new(Kind::Float, 64)),
            _ => Err(UnknownType(s.to_string())),
        }
    }
}

impl From<Type> for halide_type_t {
    fn from(t: Type) -> Self {
        halide_type_t {
            code: t.kind as u8,
            bits: t.bits,
            lanes: t.lanes,
        }
    }
}

impl TryFrom<halide_type_t> for Type {
    type Error = halide_type_t;

    /// Fails with the raw tag when its code has no matching `Kind`
    fn try_from(raw: halide_type_t) -> Result<Self, Self::Error> {
        let kind = Kind::from_code(raw.code).ok_or(raw)?;
        Ok(Type::with_lanes(kind, raw.bits, raw.lanes))
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind.prefix(), self.bits)?;
        if self.lanes > 1 {
            write!(f, "x{}", self.lanes)?;
        }
        Ok(())
    }
}
