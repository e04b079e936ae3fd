//! Runtime stdio configuration.
//!
//! Two environment variables control the shim:
//! - `CLISTENER_STDIO_MODE`
//!   - `strict` (default): every argument must fit its conversion. `%d`
//!     takes an integer, `%f` a float, `%s` a string. Anything else is a
//!     formatting error returned to the caller.
//!   - `coerce`: `%s` renders any argument, and integer/float conversions
//!     promote between each other the way a loosely-typed host would.
//! - `CLISTENER_LINE_ENDING`: `lf` (default) or `crlf`, the terminator
//!   `printf` appends to every line.
//!
//! Callers that want explicit control build a [`StdioConfig`] directly and
//! use the `*_with` entry points; the plain entry points use
//! [`StdioConfig::current`], resolved once per process.

use std::sync::atomic::{AtomicU8, Ordering};

/// How strictly arguments are matched against conversion specifiers.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConversionMode {
    /// Argument type must fit the conversion.
    #[default]
    Strict,
    /// `%s` accepts anything; numeric conversions promote across int/float.
    Coerce,
}

impl ConversionMode {
    /// Parse from string (case-insensitive). Unknown values fall back to strict.
    #[must_use]
    pub fn from_str_loose(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "coerce" | "loose" | "lenient" | "host" => Self::Coerce,
            _ => Self::Strict,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Coerce => "coerce",
        }
    }
}

/// Line terminator appended by `printf`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    /// Parse from string (case-insensitive). Unknown values fall back to `\n`.
    #[must_use]
    pub fn from_str_loose(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "crlf" | "windows" | "dos" | "\r\n" => Self::CrLf,
            _ => Self::Lf,
        }
    }

    #[must_use]
    pub const fn as_bytes(self) -> &'static [u8] {
        match self {
            Self::Lf => b"\n",
            Self::CrLf => b"\r\n",
        }
    }
}

/// Effective configuration for one stdio call.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StdioConfig {
    pub mode: ConversionMode,
    pub line_ending: LineEnding,
}

impl StdioConfig {
    #[must_use]
    pub const fn new(mode: ConversionMode, line_ending: LineEnding) -> Self {
        Self { mode, line_ending }
    }

    /// Read both environment variables now, without touching the cache.
    #[must_use]
    pub fn from_env() -> Self {
        let mode = std::env::var("CLISTENER_STDIO_MODE")
            .map(|v| ConversionMode::from_str_loose(&v))
            .unwrap_or_default();
        let line_ending = std::env::var("CLISTENER_LINE_ENDING")
            .map(|v| LineEnding::from_str_loose(&v))
            .unwrap_or_default();
        Self { mode, line_ending }
    }

    /// Process-wide configuration (reads the environment on first call,
    /// cached thereafter).
    #[must_use]
    pub fn current() -> Self {
        let cached = CACHED_CONFIG.load(Ordering::Acquire);
        if cached != CONFIG_UNRESOLVED {
            return unpack(cached);
        }
        let config = Self::from_env();
        // Racing resolvers read the same environment; last store wins.
        CACHED_CONFIG.store(pack(config), Ordering::Release);
        config
    }
}

// 0 = unresolved; otherwise bit 0 = coerce, bit 1 = crlf, bit 7 = resolved.
static CACHED_CONFIG: AtomicU8 = AtomicU8::new(CONFIG_UNRESOLVED);

const CONFIG_UNRESOLVED: u8 = 0;
const CONFIG_RESOLVED: u8 = 0x80;
const CONFIG_COERCE: u8 = 0x01;
const CONFIG_CRLF: u8 = 0x02;

fn pack(config: StdioConfig) -> u8 {
    let mut bits = CONFIG_RESOLVED;
    if config.mode == ConversionMode::Coerce {
        bits |= CONFIG_COERCE;
    }
    if config.line_ending == LineEnding::CrLf {
        bits |= CONFIG_CRLF;
    }
    bits
}

fn unpack(bits: u8) -> StdioConfig {
    StdioConfig {
        mode: if bits & CONFIG_COERCE != 0 {
            ConversionMode::Coerce
        } else {
            ConversionMode::Strict
        },
        line_ending: if bits & CONFIG_CRLF != 0 {
            LineEnding::CrLf
        } else {
            LineEnding::Lf
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_conversion_modes() {
        assert_eq!(ConversionMode::from_str_loose("strict"), ConversionMode::Strict);
        assert_eq!(ConversionMode::from_str_loose("COERCE"), ConversionMode::Coerce);
        assert_eq!(ConversionMode::from_str_loose(" host "), ConversionMode::Coerce);
        assert_eq!(ConversionMode::from_str_loose("garbage"), ConversionMode::Strict);
        assert_eq!(ConversionMode::from_str_loose(""), ConversionMode::Strict);
    }

    #[test]
    fn parse_line_endings() {
        assert_eq!(LineEnding::from_str_loose("lf"), LineEnding::Lf);
        assert_eq!(LineEnding::from_str_loose("CRLF"), LineEnding::CrLf);
        assert_eq!(LineEnding::from_str_loose("dos"), LineEnding::CrLf);
        assert_eq!(LineEnding::from_str_loose("unix"), LineEnding::Lf);
        assert_eq!(LineEnding::CrLf.as_bytes(), b"\r\n");
    }

    #[test]
    fn pack_roundtrips_every_combination() {
        for mode in [ConversionMode::Strict, ConversionMode::Coerce] {
            for line_ending in [LineEnding::Lf, LineEnding::CrLf] {
                let config = StdioConfig::new(mode, line_ending);
                let bits = pack(config);
                assert_ne!(bits, CONFIG_UNRESOLVED);
                assert_eq!(unpack(bits), config);
            }
        }
    }

    #[test]
    fn default_is_strict_lf() {
        let config = StdioConfig::default();
        assert_eq!(config.mode, ConversionMode::Strict);
        assert_eq!(config.line_ending, LineEnding::Lf);
    }
}
