//! Error types for the stdio shim.

use thiserror::Error;

fn conv_char(conversion: &u8) -> char {
    char::from(*conversion)
}

/// Why a template could not be rendered.
///
/// Offsets are byte offsets into the template, pointing at the `%` that
/// starts the offending directive. Argument indices are zero-based.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("malformed conversion specifier at byte {offset}")]
    InvalidSpecifier { offset: usize },
    #[error("conversion '%{}' is not supported", conv_char(.conversion))]
    Unsupported { conversion: u8 },
    #[error("missing argument {index} for conversion '%{}'", conv_char(.conversion))]
    MissingArgument { index: usize, conversion: u8 },
    #[error("argument {index} ({found}) does not fit conversion '%{}'", conv_char(.conversion))]
    ArgumentMismatch {
        index: usize,
        conversion: u8,
        found: &'static str,
    },
    #[error("positional and sequential arguments mixed at byte {offset}")]
    MixedPositional { offset: usize },
    #[error(
        "field width or precision {requested} at byte {offset} exceeds {}",
        super::printf::MAX_FIELD
    )]
    FieldTooWide { offset: usize, requested: usize },
}

/// Why a scan could not be carried out.
///
/// Input exhaustion and matching failures are not errors; they end the scan
/// and are reported through [`super::ScanOutcome`].
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("malformed scan directive at byte {offset}")]
    InvalidFormat { offset: usize },
    #[error("no target supplied for converted value {index}")]
    MissingTarget { index: usize },
    #[error("target {index} cannot hold a {expected} value")]
    TargetMismatch {
        index: usize,
        expected: &'static str,
    },
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

/// Top-level error for the stdio entry points.
#[derive(Debug, Error)]
pub enum StdioError {
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_conversion() {
        let err = FormatError::MissingArgument {
            index: 1,
            conversion: b'd',
        };
        assert_eq!(err.to_string(), "missing argument 1 for conversion '%d'");

        let err = FormatError::ArgumentMismatch {
            index: 0,
            conversion: b'f',
            found: "string",
        };
        assert_eq!(
            err.to_string(),
            "argument 0 (string) does not fit conversion '%f'"
        );
    }

    #[test]
    fn field_bound_message_names_the_limit() {
        let err = FormatError::FieldTooWide {
            offset: 3,
            requested: 5000,
        };
        assert_eq!(
            err.to_string(),
            "field width or precision 5000 at byte 3 exceeds 4096"
        );
    }

    #[test]
    fn stdio_error_is_transparent_over_format() {
        let err: StdioError = FormatError::Unsupported { conversion: b'n' }.into();
        assert_eq!(err.to_string(), "conversion '%n' is not supported");
    }
}
