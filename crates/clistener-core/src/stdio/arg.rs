//! Dynamic argument list for the printf family.
//!
//! The interpreter hands `printf` a mixed-type, dynamic-arity list. Each
//! element is one [`Arg`]; the conversion specifier decides how it is read.

use std::fmt;

/// One substitution argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Int(i64),
    UInt(u64),
    Float(f64),
    Char(char),
    Str(String),
    Pointer(usize),
}

impl Arg {
    /// Short type name used in error messages.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::UInt(_) => "unsigned",
            Self::Float(_) => "float",
            Self::Char(_) => "char",
            Self::Str(_) => "string",
            Self::Pointer(_) => "pointer",
        }
    }
}

/// Host-style rendering, used when `%s` receives a non-string argument in
/// coerce mode. Floats keep a fractional part (`100.0`), as a loosely-typed
/// host prints them.
impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::UInt(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v:?}"),
            Self::Char(c) => write!(f, "{c}"),
            Self::Str(s) => f.write_str(s),
            Self::Pointer(0) => f.write_str("(nil)"),
            Self::Pointer(p) => write!(f, "{p:#x}"),
        }
    }
}

macro_rules! arg_from {
    ($variant:ident as $target:ty: $($source:ty),+) => {
        $(
            impl From<$source> for Arg {
                fn from(value: $source) -> Self {
                    Self::$variant(value as $target)
                }
            }
        )+
    };
}

arg_from!(Int as i64: i8, i16, i32, i64, isize);
arg_from!(UInt as u64: u8, u16, u32, u64, usize);
arg_from!(Float as f64: f32, f64);

impl From<bool> for Arg {
    fn from(value: bool) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<char> for Arg {
    fn from(value: char) -> Self {
        Self::Char(value)
    }
}

impl From<&str> for Arg {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for Arg {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<&String> for Arg {
    fn from(value: &String) -> Self {
        Self::Str(value.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitives_pick_their_variant() {
        assert_eq!(Arg::from(-3i8), Arg::Int(-3));
        assert_eq!(Arg::from(7u16), Arg::UInt(7));
        assert_eq!(Arg::from(1.5f32), Arg::Float(1.5));
        assert_eq!(Arg::from(true), Arg::Int(1));
        assert_eq!(Arg::from('x'), Arg::Char('x'));
        assert_eq!(Arg::from("hi"), Arg::Str("hi".into()));
    }

    #[test]
    fn display_matches_host_rendering() {
        assert_eq!(Arg::Float(100.0).to_string(), "100.0");
        assert_eq!(Arg::Int(-12).to_string(), "-12");
        assert_eq!(Arg::Pointer(0).to_string(), "(nil)");
        assert_eq!(Arg::Pointer(0xbeef).to_string(), "0xbeef");
    }

    #[test]
    fn kind_names() {
        assert_eq!(Arg::Str(String::new()).kind(), "string");
        assert_eq!(Arg::UInt(0).kind(), "unsigned");
    }
}
