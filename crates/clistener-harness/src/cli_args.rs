//! Typed printf arguments on the command line.
//!
//! `i:42` int, `u:7` unsigned, `f:1.5` float, `c:x` char, `s:text`
//! string, `p:0x10` pointer. Anything without a known prefix is a string.

use clistener_core::Arg;

use crate::error::HarnessError;

/// Parse one command-line argument.
pub fn parse_arg(text: &str) -> Result<Arg, HarnessError> {
    let bad = |reason: &str| HarnessError::BadArgument {
        text: text.to_string(),
        reason: reason.to_string(),
    };
    let Some((tag, value)) = text.split_once(':') else {
        return Ok(Arg::Str(text.to_string()));
    };
    match tag {
        "i" => value.parse().map(Arg::Int).map_err(|_| bad("not a signed integer")),
        "u" => parse_unsigned(value).map(Arg::UInt).ok_or_else(|| bad("not an unsigned integer")),
        "f" => value.parse().map(Arg::Float).map_err(|_| bad("not a float")),
        "c" => {
            let mut chars = value.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(Arg::Char(c)),
                _ => Err(bad("expected exactly one character")),
            }
        }
        "s" => Ok(Arg::Str(value.to_string())),
        "p" => parse_unsigned(value)
            .and_then(|v| usize::try_from(v).ok())
            .map(Arg::Pointer)
            .ok_or_else(|| bad("not an address")),
        _ => Ok(Arg::Str(text.to_string())),
    }
}

/// Decimal, or hexadecimal with a `0x` prefix.
fn parse_unsigned(value: &str) -> Option<u64> {
    match value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => value.parse().ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_prefixes() {
        assert_eq!(parse_arg("i:-42").unwrap(), Arg::Int(-42));
        assert_eq!(parse_arg("u:0xff").unwrap(), Arg::UInt(255));
        assert_eq!(parse_arg("f:1.5").unwrap(), Arg::Float(1.5));
        assert_eq!(parse_arg("c:x").unwrap(), Arg::Char('x'));
        assert_eq!(parse_arg("s:a:b").unwrap(), Arg::Str("a:b".into()));
        assert_eq!(parse_arg("p:0x10").unwrap(), Arg::Pointer(16));
    }

    #[test]
    fn untagged_text_is_a_string() {
        assert_eq!(parse_arg("world").unwrap(), Arg::Str("world".into()));
        assert_eq!(parse_arg("key:value").unwrap(), Arg::Str("key:value".into()));
    }

    #[test]
    fn malformed_values_are_rejected() {
        assert!(matches!(
            parse_arg("i:seven"),
            Err(HarnessError::BadArgument { .. })
        ));
        assert!(parse_arg("c:xy").is_err());
        assert!(parse_arg("u:-1").is_err());
    }
}
