use std::fmt;

use serde::Serialize;
use strum::Display;

/// A `(segment, offset)` pair addressing something in the interpreter's heap.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Reg {
    pub segment: u16,
    pub offset: u32,
}

impl Reg {
    pub const fn new(segment: u16, offset: u32) -> Self {
        Self { segment, offset }
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04x}:{:04x}", self.segment, self.offset)
    }
}

/// A value the interpreter hands to (and receives from) a kernel call.
///
/// `Nil` is the null register; scripts read it as integer zero as well.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub enum Variant {
    #[default]
    Nil,
    Int(i32),
    /// An instance or class living in a loaded script.
    Object(Reg),
    /// Any other heap reference: strings, lists, nodes, raw buffers.
    Ref(Reg),
}

/// The coarse category kernel signatures are written against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, Serialize)]
#[strum(serialize_all = "lowercase")]
pub enum ValueKind {
    Null,
    Integer,
    Object,
    Reference,
}

impl ValueKind {
    /// The signature letter for this kind.
    pub const fn letter(self) -> char {
        match self {
            ValueKind::Null => '0',
            ValueKind::Integer => 'i',
            ValueKind::Object => 'o',
            ValueKind::Reference => 'r',
        }
    }
}

impl Variant {
    pub const fn kind(&self) -> ValueKind {
        match self {
            Variant::Nil => ValueKind::Null,
            Variant::Int(_) => ValueKind::Integer,
            Variant::Object(_) => ValueKind::Object,
            Variant::Ref(_) => ValueKind::Reference,
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Variant::Nil)
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Variant::Nil => Some(0),
            Variant::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_reg(&self) -> Option<Reg> {
        match self {
            Variant::Object(r) | Variant::Ref(r) => Some(*r),
            _ => None,
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Nil => write!(f, "nil"),
            Variant::Int(v) => write!(f, "{}", v),
            Variant::Object(r) => write!(f, "obj({r})"),
            Variant::Ref(r) => write!(f, "ref({r})"),
        }
    }
}

impl From<i32> for Variant {
    fn from(v: i32) -> Self {
        Variant::Int(v)
    }
}
