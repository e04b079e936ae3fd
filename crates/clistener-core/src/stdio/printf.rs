//! printf formatting engine.
//!
//! Parses C format templates into segments and renders them against an
//! ordered list of typed [`Arg`] values with full flag, width, precision,
//! length-modifier and positional-argument (`%n$`) support.
//!
//! Reference: POSIX.1-2024 fprintf, ISO C11 7.21.6.1
//!
//! Rendering is all-or-nothing: the whole template is rendered into a
//! buffer before anything is written, so a bad directive anywhere in the
//! template produces an error and no output. A width, or a numeric
//! precision, above [`MAX_FIELD`] is rejected with
//! [`FormatError::FieldTooWide`] instead of being rendered, the way glibc
//! fails such calls with `EOVERFLOW`.

use std::borrow::Cow;

use super::arg::Arg;
use super::error::FormatError;
use crate::config::{ConversionMode, StdioConfig};

/// Largest field width or numeric precision a directive may request.
pub const MAX_FIELD: usize = 4096;

// ---------------------------------------------------------------------------
// Format spec types
// ---------------------------------------------------------------------------

/// Flags parsed from a printf format directive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormatFlags {
    pub left_justify: bool, // '-'
    pub force_sign: bool,   // '+'
    pub space_sign: bool,   // ' '
    pub alt_form: bool,     // '#'
    pub zero_pad: bool,     // '0'
}

/// Width specification. `FromArg` carries the 1-based position for `*m$`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    None,
    Fixed(usize),
    FromArg(Option<usize>),
}

/// Precision specification. `FromArg` carries the 1-based position for `.*m$`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    None,
    Fixed(usize),
    FromArg(Option<usize>),
}

/// Length modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthMod {
    None,
    Hh,   // 'hh'
    H,    // 'h'
    L,    // 'l'
    Ll,   // 'll'
    Z,    // 'z'
    T,    // 't'
    J,    // 'j'
    BigL, // 'L'
}

/// A parsed printf format specifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatSpec {
    /// 1-based argument position from `%n$`, if given.
    pub position: Option<usize>,
    pub flags: FormatFlags,
    pub width: Width,
    pub precision: Precision,
    pub length: LengthMod,
    pub conversion: u8,
    /// Byte offset of the introducing '%' in the template.
    pub offset: usize,
}

impl FormatSpec {
    /// A bare `%<conversion>` spec with no flags, width or precision.
    #[must_use]
    pub const fn new(conversion: u8) -> Self {
        Self {
            position: None,
            flags: FormatFlags {
                left_justify: false,
                force_sign: false,
                space_sign: false,
                alt_form: false,
                zero_pad: false,
            },
            width: Width::None,
            precision: Precision::None,
            length: LengthMod::None,
            conversion,
            offset: 0,
        }
    }

    fn uses_positional(&self) -> bool {
        self.position.is_some()
            || matches!(self.width, Width::FromArg(Some(_)))
            || matches!(self.precision, Precision::FromArg(Some(_)))
    }

    fn uses_sequential(&self) -> bool {
        (self.position.is_none() && self.conversion != b'%')
            || matches!(self.width, Width::FromArg(None))
            || matches!(self.precision, Precision::FromArg(None))
    }
}

/// A segment of a parsed format string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatSegment<'a> {
    /// Literal bytes to emit verbatim.
    Literal(&'a [u8]),
    /// A `%%` escape (emit a single '%').
    Percent,
    /// A conversion specifier requiring an argument.
    Spec(FormatSpec),
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// Parse a single format specifier starting after the '%' character.
///
/// `fmt` points to the first byte AFTER '%'. Returns `(spec, bytes_consumed)`
/// where `bytes_consumed` counts from `fmt[0]`. Returns `None` if malformed.
/// The returned spec has `offset` 0; [`parse_format_string`] fills it in.
pub fn parse_format_spec(fmt: &[u8]) -> Option<(FormatSpec, usize)> {
    let len = fmt.len();
    let (position, mut pos) = match parse_position(fmt) {
        Some((n, used)) => (Some(n), used),
        None => (None, 0),
    };

    // --- flags ---
    let mut flags = FormatFlags::default();
    while pos < len {
        match fmt[pos] {
            b'-' => flags.left_justify = true,
            b'+' => flags.force_sign = true,
            b' ' => flags.space_sign = true,
            b'#' => flags.alt_form = true,
            b'0' => flags.zero_pad = true,
            _ => break,
        }
        pos += 1;
    }
    // POSIX: '+' overrides ' '; '-' overrides '0'.
    if flags.force_sign {
        flags.space_sign = false;
    }
    if flags.left_justify {
        flags.zero_pad = false;
    }

    // --- width ---
    let width = if pos < len && fmt[pos] == b'*' {
        pos += 1;
        let star_pos = parse_position(&fmt[pos..]).map(|(n, used)| {
            pos += used;
            n
        });
        Width::FromArg(star_pos)
    } else {
        let start = pos;
        while pos < len && fmt[pos].is_ascii_digit() {
            pos += 1;
        }
        if pos > start {
            Width::Fixed(parse_decimal(&fmt[start..pos]))
        } else {
            Width::None
        }
    };

    // --- precision ---
    let precision = if pos < len && fmt[pos] == b'.' {
        pos += 1;
        if pos < len && fmt[pos] == b'*' {
            pos += 1;
            let star_pos = parse_position(&fmt[pos..]).map(|(n, used)| {
                pos += used;
                n
            });
            Precision::FromArg(star_pos)
        } else {
            let start = pos;
            while pos < len && fmt[pos].is_ascii_digit() {
                pos += 1;
            }
            Precision::Fixed(if pos > start {
                parse_decimal(&fmt[start..pos])
            } else {
                0
            })
        }
    } else {
        Precision::None
    };

    // --- length modifier ---
    let length = if pos < len {
        match fmt[pos] {
            b'h' => {
                pos += 1;
                if pos < len && fmt[pos] == b'h' {
                    pos += 1;
                    LengthMod::Hh
                } else {
                    LengthMod::H
                }
            }
            b'l' => {
                pos += 1;
                if pos < len && fmt[pos] == b'l' {
                    pos += 1;
                    LengthMod::Ll
                } else {
                    LengthMod::L
                }
            }
            b'z' => {
                pos += 1;
                LengthMod::Z
            }
            b't' => {
                pos += 1;
                LengthMod::T
            }
            b'j' => {
                pos += 1;
                LengthMod::J
            }
            b'L' => {
                pos += 1;
                LengthMod::BigL
            }
            _ => LengthMod::None,
        }
    } else {
        LengthMod::None
    };

    // --- conversion specifier ---
    if pos >= len {
        return None;
    }
    let conversion = fmt[pos];
    pos += 1;

    match conversion {
        b'd' | b'i' | b'u' | b'x' | b'X' | b'o' | b's' | b'c' | b'p' | b'n' | b'%' | b'f'
        | b'F' | b'e' | b'E' | b'g' | b'G' | b'a' | b'A' => {}
        _ => return None,
    }

    Some((
        FormatSpec {
            position,
            flags,
            width,
            precision,
            length,
            conversion,
            offset: 0,
        },
        pos,
    ))
}

/// Split a printf format string into segments.
///
/// Yields `FormatSegment::Literal` for literal runs and `FormatSegment::Spec`
/// for each `%`-directive. `%%` yields `FormatSegment::Percent`. A trailing
/// lone '%' or an unparseable directive is an error.
pub fn parse_format_string(fmt: &[u8]) -> Result<Vec<FormatSegment<'_>>, FormatError> {
    let mut segments = Vec::new();
    let mut pos = 0;
    let len = fmt.len();

    while pos < len {
        let start = pos;
        while pos < len && fmt[pos] != b'%' {
            pos += 1;
        }
        if pos > start {
            segments.push(FormatSegment::Literal(&fmt[start..pos]));
        }
        if pos >= len {
            break;
        }
        let offset = pos;
        pos += 1;
        if pos < len && fmt[pos] == b'%' {
            segments.push(FormatSegment::Percent);
            pos += 1;
            continue;
        }
        let (mut spec, consumed) =
            parse_format_spec(&fmt[pos..]).ok_or(FormatError::InvalidSpecifier { offset })?;
        spec.offset = offset;
        pos += consumed;
        segments.push(FormatSegment::Spec(spec));
    }
    Ok(segments)
}

/// Number of arguments a parsed template consumes (highest position for
/// positional templates, count of sequential pulls otherwise).
#[must_use]
pub fn count_args(segments: &[FormatSegment<'_>]) -> usize {
    let mut sequential = 0usize;
    let mut highest = 0usize;
    for seg in segments {
        let FormatSegment::Spec(spec) = seg else {
            continue;
        };
        for star in [star_position(spec.width), star_precision(spec.precision)]
            .into_iter()
            .flatten()
        {
            match star {
                Some(p) => highest = highest.max(p),
                None => sequential += 1,
            }
        }
        match spec.position {
            Some(p) => highest = highest.max(p),
            None if spec.conversion != b'%' => sequential += 1,
            None => {}
        }
    }
    sequential.max(highest)
}

fn star_position(width: Width) -> Option<Option<usize>> {
    match width {
        Width::FromArg(p) => Some(p),
        _ => None,
    }
}

fn star_precision(precision: Precision) -> Option<Option<usize>> {
    match precision {
        Precision::FromArg(p) => Some(p),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Rendering against an argument list
// ---------------------------------------------------------------------------

/// Render `template` against `args` using the process-wide configuration.
pub fn format(template: &[u8], args: &[Arg]) -> Result<Vec<u8>, FormatError> {
    format_with(template, args, &StdioConfig::current())
}

/// Render `template` against `args`.
///
/// Every directive is interpreted, including `%%`. Surplus arguments are
/// ignored; a directive with no argument left is [`FormatError::MissingArgument`].
pub fn format_with(
    template: &[u8],
    args: &[Arg],
    config: &StdioConfig,
) -> Result<Vec<u8>, FormatError> {
    let segments = parse_format_string(template)?;
    check_argument_style(&segments)?;

    let mut cursor = ArgCursor {
        args,
        next: 0,
        mode: config.mode,
    };
    let mut buf = Vec::with_capacity(template.len() + 16 * args.len());
    for seg in &segments {
        match seg {
            FormatSegment::Literal(lit) => buf.extend_from_slice(lit),
            FormatSegment::Percent => buf.push(b'%'),
            FormatSegment::Spec(spec) => render_spec(spec, &mut cursor, &mut buf)?,
        }
    }
    Ok(buf)
}

/// POSIX: a template uses either `%n$` everywhere or nowhere.
fn check_argument_style(segments: &[FormatSegment<'_>]) -> Result<(), FormatError> {
    let mut positional = None;
    for seg in segments {
        let FormatSegment::Spec(spec) = seg else {
            continue;
        };
        let uses_pos = spec.uses_positional();
        let uses_seq = spec.uses_sequential();
        if uses_pos && uses_seq {
            return Err(FormatError::MixedPositional {
                offset: spec.offset,
            });
        }
        if !uses_pos && !uses_seq {
            continue;
        }
        match positional {
            None => positional = Some(uses_pos),
            Some(p) if p != uses_pos => {
                return Err(FormatError::MixedPositional {
                    offset: spec.offset,
                });
            }
            Some(_) => {}
        }
    }
    Ok(())
}

fn render_spec(
    spec: &FormatSpec,
    cursor: &mut ArgCursor<'_>,
    buf: &mut Vec<u8>,
) -> Result<(), FormatError> {
    let mut resolved = spec.clone();
    if let Width::FromArg(position) = spec.width {
        let w = cursor.star(position)?;
        if w < 0 {
            resolved.flags.left_justify = true;
            resolved.flags.zero_pad = false;
        }
        resolved.width = Width::Fixed(usize::try_from(w.unsigned_abs()).unwrap_or(usize::MAX));
    }
    if let Precision::FromArg(position) = spec.precision {
        let p = cursor.star(position)?;
        resolved.precision = match usize::try_from(p) {
            Ok(p) => Precision::Fixed(p),
            Err(_) => Precision::None,
        };
    }
    check_field_bounds(&resolved)?;

    match spec.conversion {
        b'%' => buf.push(b'%'),
        b'd' | b'i' => {
            let value = narrow_signed(cursor.signed(spec)?, spec.length);
            format_signed(value, &resolved, buf);
        }
        b'u' | b'o' | b'x' | b'X' => {
            let value = narrow_unsigned(cursor.unsigned(spec)?, spec.length);
            format_unsigned(value, &resolved, buf);
        }
        b'f' | b'F' | b'e' | b'E' | b'g' | b'G' | b'a' | b'A' => {
            format_float(cursor.float(spec)?, &resolved, buf);
        }
        b'c' => {
            let mut utf8 = [0u8; 4];
            let c = cursor.character(spec)?;
            format_char(c.encode_utf8(&mut utf8).as_bytes(), &resolved, buf);
        }
        b's' => {
            let s = cursor.string(spec)?;
            format_str(s.as_bytes(), &resolved, buf);
        }
        b'p' => format_pointer(cursor.pointer(spec)?, &resolved, buf),
        other => return Err(FormatError::Unsupported { conversion: other }),
    }
    Ok(())
}

/// Reject widths and numeric precisions above [`MAX_FIELD`]. String
/// precision only truncates, so any value is fine there.
fn check_field_bounds(spec: &FormatSpec) -> Result<(), FormatError> {
    if spec.conversion == b'%' {
        return Ok(());
    }
    if let Width::Fixed(width) = spec.width
        && width > MAX_FIELD
    {
        return Err(FormatError::FieldTooWide {
            offset: spec.offset,
            requested: width,
        });
    }
    if let Precision::Fixed(precision) = spec.precision
        && precision > MAX_FIELD
        && !matches!(spec.conversion, b's' | b'c' | b'p')
    {
        return Err(FormatError::FieldTooWide {
            offset: spec.offset,
            requested: precision,
        });
    }
    Ok(())
}

fn narrow_signed(value: i64, length: LengthMod) -> i64 {
    match length {
        LengthMod::Hh => i64::from(value as i8),
        LengthMod::H => i64::from(value as i16),
        _ => value,
    }
}

fn narrow_unsigned(value: u64, length: LengthMod) -> u64 {
    match length {
        LengthMod::Hh => u64::from(value as u8),
        LengthMod::H => u64::from(value as u16),
        _ => value,
    }
}

/// Hands out arguments to directives, sequentially or by position, and
/// checks each one against the conversion it is used for.
struct ArgCursor<'a> {
    args: &'a [Arg],
    next: usize,
    mode: ConversionMode,
}

impl<'a> ArgCursor<'a> {
    fn take(
        &mut self,
        position: Option<usize>,
        conversion: u8,
    ) -> Result<(usize, &'a Arg), FormatError> {
        let index = match position {
            Some(p) => p - 1,
            None => {
                let i = self.next;
                self.next += 1;
                i
            }
        };
        self.args
            .get(index)
            .map(|arg| (index, arg))
            .ok_or(FormatError::MissingArgument { index, conversion })
    }

    fn coerce(&self) -> bool {
        self.mode == ConversionMode::Coerce
    }

    fn star(&mut self, position: Option<usize>) -> Result<i64, FormatError> {
        let (index, arg) = self.take(position, b'*')?;
        match arg {
            Arg::Int(v) => Ok(*v),
            Arg::UInt(v) => Ok(i64::try_from(*v).unwrap_or(i64::MAX)),
            Arg::Float(v) if self.coerce() => Ok(*v as i64),
            other => Err(mismatch(index, b'*', other)),
        }
    }

    fn signed(&mut self, spec: &FormatSpec) -> Result<i64, FormatError> {
        let (index, arg) = self.take(spec.position, spec.conversion)?;
        match arg {
            Arg::Int(v) => Ok(*v),
            Arg::UInt(v) => Ok(*v as i64),
            Arg::Char(c) => Ok(i64::from(u32::from(*c))),
            Arg::Float(v) if self.coerce() => Ok(*v as i64),
            other => Err(mismatch(index, spec.conversion, other)),
        }
    }

    fn unsigned(&mut self, spec: &FormatSpec) -> Result<u64, FormatError> {
        let (index, arg) = self.take(spec.position, spec.conversion)?;
        match arg {
            Arg::UInt(v) => Ok(*v),
            // Two's-complement reinterpretation, as C does for `%u` of -1.
            Arg::Int(v) => Ok(*v as u64),
            Arg::Char(c) => Ok(u64::from(u32::from(*c))),
            Arg::Pointer(p) if self.coerce() => Ok(*p as u64),
            Arg::Float(v) if self.coerce() => Ok(*v as u64),
            other => Err(mismatch(index, spec.conversion, other)),
        }
    }

    fn float(&mut self, spec: &FormatSpec) -> Result<f64, FormatError> {
        let (index, arg) = self.take(spec.position, spec.conversion)?;
        match arg {
            Arg::Float(v) => Ok(*v),
            Arg::Int(v) if self.coerce() => Ok(*v as f64),
            Arg::UInt(v) if self.coerce() => Ok(*v as f64),
            other => Err(mismatch(index, spec.conversion, other)),
        }
    }

    fn character(&mut self, spec: &FormatSpec) -> Result<char, FormatError> {
        let (index, arg) = self.take(spec.position, spec.conversion)?;
        let code = match arg {
            Arg::Char(c) => return Ok(*c),
            Arg::Int(v) => u32::try_from(*v).ok(),
            Arg::UInt(v) => u32::try_from(*v).ok(),
            Arg::Str(s) if self.coerce() => s.chars().next().map(u32::from),
            _ => None,
        };
        code.and_then(char::from_u32)
            .ok_or_else(|| mismatch(index, spec.conversion, arg))
    }

    fn string(&mut self, spec: &FormatSpec) -> Result<Cow<'a, str>, FormatError> {
        let (index, arg) = self.take(spec.position, spec.conversion)?;
        match arg {
            Arg::Str(s) => Ok(Cow::Borrowed(s.as_str())),
            other if self.coerce() => Ok(Cow::Owned(other.to_string())),
            other => Err(mismatch(index, spec.conversion, other)),
        }
    }

    fn pointer(&mut self, spec: &FormatSpec) -> Result<usize, FormatError> {
        let (index, arg) = self.take(spec.position, spec.conversion)?;
        match arg {
            Arg::Pointer(p) => Ok(*p),
            Arg::UInt(v) => usize::try_from(*v).map_err(|_| mismatch(index, b'p', arg)),
            Arg::Int(v) if self.coerce() => Ok(*v as usize),
            other => Err(mismatch(index, spec.conversion, other)),
        }
    }
}

fn mismatch(index: usize, conversion: u8, arg: &Arg) -> FormatError {
    FormatError::ArgumentMismatch {
        index,
        conversion,
        found: arg.kind(),
    }
}

// ---------------------------------------------------------------------------
// Renderers
// ---------------------------------------------------------------------------

/// Render a signed integer to `buf` according to `spec`.
pub fn format_signed(value: i64, spec: &FormatSpec, buf: &mut Vec<u8>) {
    let negative = value < 0;
    let abs = value.unsigned_abs();

    let (base, uppercase) = int_base(spec.conversion);
    let mut digits = [0u8; 64];
    let digit_count = render_digits(abs, base, uppercase, &mut digits);
    let digit_slice = &digits[64 - digit_count..];

    let sign = sign_byte(negative, spec.flags);

    let precision = match spec.precision {
        Precision::Fixed(p) => p,
        _ => 1,
    };
    let zero_prefix_count = precision.saturating_sub(digit_count);
    let prefix = alt_prefix(spec);

    // Explicit precision 0 with value 0: no digits emitted.
    let suppress_zero = value == 0 && matches!(spec.precision, Precision::Fixed(0));
    let effective_content = if suppress_zero {
        sign.is_some() as usize + prefix.len()
    } else {
        sign.is_some() as usize + prefix.len() + zero_prefix_count + digit_count
    };

    let width = resolve_width(spec);
    let pad_total = width.saturating_sub(effective_content);
    let zero_pad = int_zero_pad(spec);

    if !spec.flags.left_justify && !zero_pad {
        pad(buf, b' ', pad_total);
    }
    if let Some(s) = sign {
        buf.push(s);
    }
    buf.extend_from_slice(prefix);
    if zero_pad {
        pad(buf, b'0', pad_total);
    }
    if !suppress_zero {
        pad(buf, b'0', zero_prefix_count);
        buf.extend_from_slice(digit_slice);
    }
    if spec.flags.left_justify {
        pad(buf, b' ', pad_total);
    }
}

/// Render an unsigned integer to `buf` according to `spec`.
pub fn format_unsigned(value: u64, spec: &FormatSpec, buf: &mut Vec<u8>) {
    let (base, uppercase) = int_base(spec.conversion);
    let mut digits = [0u8; 64];
    let digit_count = render_digits(value, base, uppercase, &mut digits);
    let digit_slice = &digits[64 - digit_count..];

    let precision = match spec.precision {
        Precision::Fixed(p) => p,
        _ => 1,
    };
    let zero_prefix_count = precision.saturating_sub(digit_count);

    // `#o` only needs its '0' when precision padding has not supplied one.
    let prefix = if value == 0 || (spec.conversion == b'o' && zero_prefix_count > 0) {
        b"" as &[u8]
    } else {
        alt_prefix(spec)
    };

    let suppress_zero = value == 0 && matches!(spec.precision, Precision::Fixed(0));
    let effective_content = if suppress_zero {
        // C still prints "0" for `%#.0o` of zero.
        usize::from(spec.flags.alt_form && spec.conversion == b'o')
    } else {
        prefix.len() + zero_prefix_count + digit_count
    };

    let width = resolve_width(spec);
    let pad_total = width.saturating_sub(effective_content);
    let zero_pad = int_zero_pad(spec);

    if !spec.flags.left_justify && !zero_pad {
        pad(buf, b' ', pad_total);
    }
    buf.extend_from_slice(prefix);
    if zero_pad {
        pad(buf, b'0', pad_total);
    }
    if !suppress_zero {
        pad(buf, b'0', zero_prefix_count);
        buf.extend_from_slice(digit_slice);
    } else if effective_content == 1 {
        buf.push(b'0');
    }
    if spec.flags.left_justify {
        pad(buf, b' ', pad_total);
    }
}

/// Render a floating-point value to `buf` according to `spec`.
///
/// Supports `%f`/`%F`, `%e`/`%E`, `%g`/`%G` and `%a`/`%A`. Rust's float
/// formatting generates correctly rounded digits; the C layout (exponent
/// sign and width, `%g` style selection, hex mantissa) is applied here.
pub fn format_float(value: f64, spec: &FormatSpec, buf: &mut Vec<u8>) {
    let uppercase = spec.conversion.is_ascii_uppercase();
    let sign = sign_byte(value.is_sign_negative() && !value.is_nan(), spec.flags);

    if !value.is_finite() {
        let s: &[u8] = match (value.is_nan(), uppercase) {
            (true, false) => b"nan",
            (true, true) => b"NAN",
            (false, false) => b"inf",
            (false, true) => b"INF",
        };
        return format_float_special(sign, s, spec, buf);
    }

    let abs = value.abs();
    let precision = match spec.precision {
        Precision::Fixed(p) => Some(p),
        _ => None,
    };
    let alt = spec.flags.alt_form;

    let body = match spec.conversion | 0x20 {
        b'e' => format_e(abs, precision.unwrap_or(6), uppercase, alt),
        b'g' => format_g(abs, precision.unwrap_or(6), uppercase, alt),
        b'a' => format_a(abs, precision, uppercase, alt),
        _ => format_f(abs, precision.unwrap_or(6), alt),
    };

    let content_len = sign.is_some() as usize + body.len();
    let width = resolve_width(spec);
    let pad_total = width.saturating_sub(content_len);

    if !spec.flags.left_justify && !spec.flags.zero_pad {
        pad(buf, b' ', pad_total);
    }
    if let Some(s) = sign {
        buf.push(s);
    }
    if spec.flags.zero_pad {
        // Hex floats pad between the "0x" prefix and the digits.
        let split = if spec.conversion | 0x20 == b'a' { 2 } else { 0 };
        buf.extend_from_slice(&body.as_bytes()[..split]);
        pad(buf, b'0', pad_total);
        buf.extend_from_slice(&body.as_bytes()[split..]);
    } else {
        buf.extend_from_slice(body.as_bytes());
    }
    if spec.flags.left_justify {
        pad(buf, b' ', pad_total);
    }
}

/// Render a string argument to `buf` according to `spec`.
///
/// Precision truncates the string; the cut backs off to a UTF-8 character
/// boundary so a multi-byte character is never split.
pub fn format_str(s: &[u8], spec: &FormatSpec, buf: &mut Vec<u8>) {
    let mut cut = match spec.precision {
        Precision::Fixed(p) => p.min(s.len()),
        _ => s.len(),
    };
    while cut > 0 && cut < s.len() && (s[cut] & 0xC0) == 0x80 {
        cut -= 1;
    }
    let effective = &s[..cut];
    let width = resolve_width(spec);
    let pad_total = width.saturating_sub(effective.len());

    if !spec.flags.left_justify {
        pad(buf, b' ', pad_total);
    }
    buf.extend_from_slice(effective);
    if spec.flags.left_justify {
        pad(buf, b' ', pad_total);
    }
}

/// Render one character (already UTF-8 encoded) according to `spec`.
pub fn format_char(encoded: &[u8], spec: &FormatSpec, buf: &mut Vec<u8>) {
    let width = resolve_width(spec);
    let pad_total = width.saturating_sub(encoded.len());

    if !spec.flags.left_justify {
        pad(buf, b' ', pad_total);
    }
    buf.extend_from_slice(encoded);
    if spec.flags.left_justify {
        pad(buf, b' ', pad_total);
    }
}

/// Render a pointer to `buf` as `0x...` hex, or `(nil)` for zero.
pub fn format_pointer(addr: usize, spec: &FormatSpec, buf: &mut Vec<u8>) {
    if addr == 0 {
        let nil = FormatSpec {
            precision: Precision::None,
            ..*spec
        };
        return format_str(b"(nil)", &nil, buf);
    }

    let mut digits = [0u8; 64];
    let count = render_digits(addr as u64, 16, false, &mut digits);
    let content_len = 2 + count;
    let width = resolve_width(spec);
    let pad_total = width.saturating_sub(content_len);

    if !spec.flags.left_justify {
        pad(buf, b' ', pad_total);
    }
    buf.extend_from_slice(b"0x");
    buf.extend_from_slice(&digits[64 - count..]);
    if spec.flags.left_justify {
        pad(buf, b' ', pad_total);
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Parse a `digits$` prefix; positions start at 1.
fn parse_position(fmt: &[u8]) -> Option<(usize, usize)> {
    let digits = fmt.iter().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 || fmt.get(digits) != Some(&b'$') {
        return None;
    }
    let n = parse_decimal(&fmt[..digits]);
    (n > 0).then_some((n, digits + 1))
}

fn parse_decimal(digits: &[u8]) -> usize {
    digits.iter().fold(0usize, |acc, &d| {
        acc.saturating_mul(10).saturating_add(usize::from(d - b'0'))
    })
}

fn resolve_width(spec: &FormatSpec) -> usize {
    match spec.width {
        Width::Fixed(w) => w,
        _ => 0,
    }
}

fn sign_byte(negative: bool, flags: FormatFlags) -> Option<u8> {
    if negative {
        Some(b'-')
    } else if flags.force_sign {
        Some(b'+')
    } else if flags.space_sign {
        Some(b' ')
    } else {
        None
    }
}

/// The '0' flag is ignored for integers when a precision is given.
fn int_zero_pad(spec: &FormatSpec) -> bool {
    spec.flags.zero_pad
        && !spec.flags.left_justify
        && matches!(spec.precision, Precision::None)
}

fn int_base(conversion: u8) -> (u64, bool) {
    match conversion {
        b'o' => (8, false),
        b'x' => (16, false),
        b'X' => (16, true),
        _ => (10, false),
    }
}

/// Render `value` in the given `base` into the END of `buf`.
/// Returns the number of digits written. Digits are placed right-aligned.
fn render_digits(mut value: u64, base: u64, uppercase: bool, buf: &mut [u8; 64]) -> usize {
    if value == 0 {
        buf[63] = b'0';
        return 1;
    }
    let alpha = if uppercase { b'A' } else { b'a' };
    let mut pos = 64;
    while value > 0 && pos > 0 {
        pos -= 1;
        let digit = (value % base) as u8;
        buf[pos] = if digit < 10 {
            b'0' + digit
        } else {
            alpha + (digit - 10)
        };
        value /= base;
    }
    64 - pos
}

fn alt_prefix(spec: &FormatSpec) -> &'static [u8] {
    if !spec.flags.alt_form {
        return b"";
    }
    match spec.conversion {
        b'o' => b"0",
        b'x' => b"0x",
        b'X' => b"0X",
        _ => b"",
    }
}

fn pad(buf: &mut Vec<u8>, byte: u8, count: usize) {
    buf.resize(buf.len() + count, byte);
}

/// nan/inf: never zero padded.
fn format_float_special(sign: Option<u8>, s: &[u8], spec: &FormatSpec, buf: &mut Vec<u8>) {
    let width = resolve_width(spec);
    let pad_total = width.saturating_sub(s.len() + sign.is_some() as usize);
    if !spec.flags.left_justify {
        pad(buf, b' ', pad_total);
    }
    if let Some(sign) = sign {
        buf.push(sign);
    }
    buf.extend_from_slice(s);
    if spec.flags.left_justify {
        pad(buf, b' ', pad_total);
    }
}

/// `%f` / `%F`: fixed-point decimal.
fn format_f(value: f64, precision: usize, alt_form: bool) -> String {
    let mut s = format!("{value:.precision$}");
    if precision == 0 && alt_form {
        s.push('.');
    }
    s
}

/// `%e` / `%E`: scientific notation with a signed, at-least-two-digit exponent.
fn format_e(value: f64, precision: usize, uppercase: bool, alt_form: bool) -> String {
    let (mut mantissa, exp) = split_exp(value, precision);
    if precision == 0 && alt_form {
        mantissa.push('.');
    }
    let e_char = if uppercase { 'E' } else { 'e' };
    let sign = if exp < 0 { '-' } else { '+' };
    format!("{mantissa}{e_char}{sign}{:02}", exp.unsigned_abs())
}

/// Correctly rounded `d.ddd` mantissa and decimal exponent of `value`.
fn split_exp(value: f64, precision: usize) -> (String, i32) {
    let rendered = format!("{value:.precision$e}");
    match rendered.split_once('e') {
        Some((mantissa, exp)) => (mantissa.to_owned(), exp.parse().unwrap_or(0)),
        None => (rendered, 0),
    }
}

/// `%g` / `%G`: `%e` when the exponent is < -4 or >= precision, else `%f`.
fn format_g(value: f64, precision: usize, uppercase: bool, alt_form: bool) -> String {
    let p = precision.max(1);
    let exp = if value == 0.0 {
        0
    } else {
        split_exp(value, p - 1).1
    };

    if exp >= -4 && exp < p as i32 {
        let frac_digits = (p as i32 - 1 - exp).max(0) as usize;
        let mut s = format!("{value:.frac_digits$}");
        if alt_form {
            if !s.contains('.') {
                s.push('.');
            }
        } else {
            strip_trailing_zeros(&mut s);
        }
        s
    } else {
        let s = format_e(value, p - 1, uppercase, alt_form);
        if alt_form {
            return s;
        }
        match s.find(['e', 'E']) {
            Some(e_pos) => {
                let mut mantissa = s[..e_pos].to_owned();
                strip_trailing_zeros(&mut mantissa);
                mantissa + &s[e_pos..]
            }
            None => s,
        }
    }
}

/// `%a` / `%A`: hexadecimal floating point, `0x1.8p+1` style.
///
/// Without a precision the mantissa is printed exactly with trailing zero
/// digits removed; with one it is rounded half-to-even to that many digits.
fn format_a(value: f64, precision: Option<usize>, uppercase: bool, alt_form: bool) -> String {
    const FRAC_DIGITS: usize = 13;
    const FRAC_MASK: u64 = (1 << 52) - 1;

    let bits = value.to_bits();
    let biased = ((bits >> 52) & 0x7ff) as i32;
    let frac = bits & FRAC_MASK;
    let (mut lead, exp) = match (biased, frac) {
        (0, 0) => (0u64, 0i32),
        (0, _) => (0, -1022),
        _ => (1, biased - 1023),
    };

    let digits = match precision {
        None => {
            let s = format!("{frac:013x}");
            s.trim_end_matches('0').to_owned()
        }
        Some(p) if p >= FRAC_DIGITS => {
            format!("{frac:013x}{:0<width$}", "", width = p - FRAC_DIGITS)
        }
        Some(p) => {
            let shift = ((FRAC_DIGITS - p) * 4) as u32;
            let mut m = (lead << 52) | frac;
            let rem = m & ((1u64 << shift) - 1);
            let half = 1u64 << (shift - 1);
            m >>= shift;
            if rem > half || (rem == half && m & 1 == 1) {
                m += 1;
            }
            let digit_bits = (p * 4) as u32;
            lead = m >> digit_bits;
            if p == 0 {
                String::new()
            } else {
                format!("{:0width$x}", m & ((1u64 << digit_bits) - 1), width = p)
            }
        }
    };

    let point = if digits.is_empty() && !alt_form { "" } else { "." };
    let sign = if exp < 0 { '-' } else { '+' };
    let s = format!("0x{lead}{point}{digits}p{sign}{}", exp.unsigned_abs());
    if uppercase { s.to_ascii_uppercase() } else { s }
}

/// Remove trailing zeros after the decimal point.
fn strip_trailing_zeros(s: &mut String) {
    if s.contains('.') {
        while s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
