//! scanf scanning engine.
//!
//! Parses a scanf format into directives and runs them against any
//! [`BufRead`] source. The source's own buffer is the one-byte lookahead,
//! so bytes a scan does not consume stay in the reader for the next call,
//! the way C leaves them in the stdin buffer.
//!
//! Reference: ISO C11 7.21.6.2
//!
//! End of input and matching failures are not errors: they stop the scan
//! and are reported in [`ScanOutcome::end`], and [`ScanOutcome::c_return`]
//! gives the C return value (`EOF` or the assigned count).

use std::io::{self, BufRead};

use super::error::ScanError;
use super::printf::LengthMod;
use super::target::ScanValue;

/// C `EOF`.
pub const EOF: i32 = -1;

// ---------------------------------------------------------------------------
// Directive types
// ---------------------------------------------------------------------------

/// A set of bytes accepted by a `%[...]` conversion.
#[derive(Clone, PartialEq, Eq)]
pub struct ScanSet {
    members: [bool; 256],
}

impl ScanSet {
    #[must_use]
    pub fn contains(&self, byte: u8) -> bool {
        self.members[usize::from(byte)]
    }
}

impl std::fmt::Debug for ScanSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let members: String = (0..=255u8)
            .filter(|&b| self.contains(b))
            .map(|b| char::from(b).escape_default().to_string())
            .collect();
        write!(f, "ScanSet[{members}]")
    }
}

/// What a conversion reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanKind {
    /// Integer in `base` (0 = detect from prefix, as `%i`).
    Int { base: u32, signed: bool },
    Float,
    /// `%s`: run of non-whitespace.
    Str,
    /// `%c`: fixed number of bytes, no whitespace skipping.
    Chars,
    /// `%[...]`.
    Set(ScanSet),
    /// `%p`: hexadecimal address.
    Pointer,
    /// `%n`: bytes consumed so far.
    Count,
    /// `%%`: a literal '%' after optional whitespace.
    Percent,
}

/// A parsed scanf conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanSpec {
    /// `*`: convert but do not store.
    pub suppress: bool,
    /// Maximum field width in bytes.
    pub width: Option<usize>,
    pub length: LengthMod,
    pub kind: ScanKind,
    /// Byte offset of the introducing '%' in the format.
    pub offset: usize,
}

impl ScanSpec {
    /// A value of the type this conversion stores, for checking targets
    /// before any input is read. `None` when nothing is stored.
    #[must_use]
    pub fn sample_value(&self) -> Option<ScanValue> {
        if self.suppress {
            return None;
        }
        Some(match &self.kind {
            ScanKind::Int { signed: true, .. } => ScanValue::Int(0),
            ScanKind::Int { signed: false, .. } | ScanKind::Pointer => ScanValue::UInt(0),
            ScanKind::Float => ScanValue::Float(0.0),
            // A converted string field is never empty.
            ScanKind::Str | ScanKind::Set(_) => ScanValue::Str(String::from("?")),
            ScanKind::Chars => ScanValue::Chars(vec![0]),
            ScanKind::Count => ScanValue::Count(0),
            ScanKind::Percent => return None,
        })
    }
}

/// One step of a scanf format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanDirective {
    /// One or more whitespace bytes: skip any amount of input whitespace.
    Whitespace,
    /// An ordinary byte that must match the input exactly.
    Literal { byte: u8, offset: usize },
    Conversion(ScanSpec),
}

/// How a scan stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanEnd {
    /// Every directive ran.
    Completed,
    /// Input did not match the directive at `offset`.
    MatchingFailure { offset: usize },
    /// Input ended before a directive could be satisfied.
    InputFailure,
}

/// Result of running a scanf format.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanOutcome {
    /// Values for every non-suppressed conversion, `%n` included, in order.
    pub values: Vec<ScanValue>,
    /// Number of assigned conversions (`%n` and suppressed ones excluded).
    pub assigned: usize,
    /// Number of conversions that succeeded, suppressed ones included.
    pub converted: usize,
    /// Input bytes consumed.
    pub consumed: usize,
    pub end: ScanEnd,
}

impl ScanOutcome {
    /// C return value: `EOF` if input ran out before the first conversion,
    /// otherwise the number of assigned items.
    #[must_use]
    pub fn c_return(&self) -> i32 {
        if self.end == ScanEnd::InputFailure && self.converted == 0 {
            EOF
        } else {
            i32::try_from(self.assigned).unwrap_or(i32::MAX)
        }
    }
}

// ---------------------------------------------------------------------------
// Format parser
// ---------------------------------------------------------------------------

/// Parse a scanf format string into directives.
pub fn parse_scan_format(fmt: &[u8]) -> Result<Vec<ScanDirective>, ScanError> {
    let mut directives = Vec::new();
    let mut pos = 0;
    let len = fmt.len();

    while pos < len {
        let byte = fmt[pos];
        if byte.is_ascii_whitespace() {
            while pos < len && fmt[pos].is_ascii_whitespace() {
                pos += 1;
            }
            directives.push(ScanDirective::Whitespace);
            continue;
        }
        if byte != b'%' {
            directives.push(ScanDirective::Literal { byte, offset: pos });
            pos += 1;
            continue;
        }

        let offset = pos;
        pos += 1;
        let invalid = ScanError::InvalidFormat { offset };

        let suppress = fmt.get(pos) == Some(&b'*');
        if suppress {
            pos += 1;
        }

        let start = pos;
        while pos < len && fmt[pos].is_ascii_digit() {
            pos += 1;
        }
        let width = if pos > start {
            let w = fmt[start..pos].iter().fold(0usize, |acc, &d| {
                acc.saturating_mul(10).saturating_add(usize::from(d - b'0'))
            });
            if w == 0 {
                return Err(invalid);
            }
            Some(w)
        } else {
            None
        };

        let (length, used) = parse_length(&fmt[pos..]);
        pos += used;

        let Some(&conversion) = fmt.get(pos) else {
            return Err(invalid);
        };
        pos += 1;

        let kind = match conversion {
            b'd' => ScanKind::Int { base: 10, signed: true },
            b'i' => ScanKind::Int { base: 0, signed: true },
            b'u' => ScanKind::Int { base: 10, signed: false },
            b'o' => ScanKind::Int { base: 8, signed: false },
            b'x' | b'X' => ScanKind::Int { base: 16, signed: false },
            b'f' | b'F' | b'e' | b'E' | b'g' | b'G' | b'a' | b'A' => ScanKind::Float,
            b's' => ScanKind::Str,
            b'c' => ScanKind::Chars,
            b'p' => ScanKind::Pointer,
            b'n' => ScanKind::Count,
            b'%' if !suppress && width.is_none() => ScanKind::Percent,
            b'[' => {
                let (set, used) = parse_scan_set(&fmt[pos..]).ok_or(invalid)?;
                pos += used;
                ScanKind::Set(set)
            }
            _ => return Err(invalid),
        };

        directives.push(ScanDirective::Conversion(ScanSpec {
            suppress,
            width,
            length,
            kind,
            offset,
        }));
    }
    Ok(directives)
}

fn parse_length(fmt: &[u8]) -> (LengthMod, usize) {
    match fmt {
        [b'h', b'h', ..] => (LengthMod::Hh, 2),
        [b'h', ..] => (LengthMod::H, 1),
        [b'l', b'l', ..] => (LengthMod::Ll, 2),
        [b'l', ..] => (LengthMod::L, 1),
        [b'z', ..] => (LengthMod::Z, 1),
        [b't', ..] => (LengthMod::T, 1),
        [b'j', ..] => (LengthMod::J, 1),
        [b'L', ..] => (LengthMod::BigL, 1),
        _ => (LengthMod::None, 0),
    }
}

/// Parse the body of `%[` up to and including the closing ']'.
///
/// A ']' right after '[' or '[^' is a member. '-' between two bytes is a
/// range; at either end it is a member.
fn parse_scan_set(fmt: &[u8]) -> Option<(ScanSet, usize)> {
    let mut pos = 0;
    let negate = fmt.first() == Some(&b'^');
    if negate {
        pos += 1;
    }
    let mut members = [false; 256];
    let first = pos;
    loop {
        let byte = *fmt.get(pos)?;
        if byte == b']' && pos != first {
            pos += 1;
            break;
        }
        let next = fmt.get(pos + 1).copied();
        let after = fmt.get(pos + 2).copied();
        match (next, after) {
            (Some(b'-'), Some(hi)) if hi != b']' => {
                let (lo, hi) = if byte <= hi { (byte, hi) } else { (hi, byte) };
                for b in lo..=hi {
                    members[usize::from(b)] = true;
                }
                pos += 3;
            }
            _ => {
                members[usize::from(byte)] = true;
                pos += 1;
            }
        }
    }
    if negate {
        for m in &mut members {
            *m = !*m;
        }
    }
    Some((ScanSet { members }, pos))
}

// ---------------------------------------------------------------------------
// Scanner
// ---------------------------------------------------------------------------

/// Run `format` against `input`.
pub fn scan<R: BufRead + ?Sized>(input: &mut R, format: &[u8]) -> Result<ScanOutcome, ScanError> {
    let directives = parse_scan_format(format)?;
    scan_directives(input, &directives)
}

/// Run already-parsed directives against `input`.
pub fn scan_directives<R: BufRead + ?Sized>(
    input: &mut R,
    directives: &[ScanDirective],
) -> Result<ScanOutcome, ScanError> {
    let mut scanner = Scanner { input, consumed: 0 };
    let mut outcome = ScanOutcome {
        values: Vec::new(),
        assigned: 0,
        converted: 0,
        consumed: 0,
        end: ScanEnd::Completed,
    };

    for directive in directives {
        let step = match directive {
            ScanDirective::Whitespace => {
                scanner.skip_whitespace()?;
                Step::Matched(None)
            }
            ScanDirective::Literal { byte, offset } => scanner.literal(*byte, *offset)?,
            ScanDirective::Conversion(spec) => scanner.convert(spec)?,
        };
        match step {
            Step::Matched(None) => {}
            Step::Matched(Some(value)) => {
                let ScanDirective::Conversion(spec) = directive else {
                    continue;
                };
                let is_count = matches!(spec.kind, ScanKind::Count);
                if !is_count {
                    outcome.converted += 1;
                }
                if !spec.suppress {
                    if !is_count {
                        outcome.assigned += 1;
                    }
                    outcome.values.push(value);
                }
            }
            Step::Stop(end) => {
                outcome.end = end;
                break;
            }
        }
    }

    outcome.consumed = scanner.consumed;
    Ok(outcome)
}

enum Step {
    Matched(Option<ScanValue>),
    Stop(ScanEnd),
}

struct Scanner<'r, R: BufRead + ?Sized> {
    input: &'r mut R,
    consumed: usize,
}

impl<R: BufRead + ?Sized> Scanner<'_, R> {
    fn peek(&mut self) -> io::Result<Option<u8>> {
        loop {
            match self.input.fill_buf() {
                Ok(buf) => return Ok(buf.first().copied()),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
    }

    fn bump(&mut self) {
        self.input.consume(1);
        self.consumed += 1;
    }

    /// Consume the next byte if `pred` accepts it.
    fn eat_if(&mut self, pred: impl Fn(u8) -> bool) -> io::Result<Option<u8>> {
        match self.peek()? {
            Some(b) if pred(b) => {
                self.bump();
                Ok(Some(b))
            }
            _ => Ok(None),
        }
    }

    fn skip_whitespace(&mut self) -> io::Result<()> {
        while self.eat_if(|b| b.is_ascii_whitespace())?.is_some() {}
        Ok(())
    }

    fn literal(&mut self, byte: u8, offset: usize) -> io::Result<Step> {
        Ok(match self.peek()? {
            None => Step::Stop(ScanEnd::InputFailure),
            Some(b) if b == byte => {
                self.bump();
                Step::Matched(None)
            }
            Some(_) => Step::Stop(ScanEnd::MatchingFailure { offset }),
        })
    }

    fn convert(&mut self, spec: &ScanSpec) -> io::Result<Step> {
        let skips = !matches!(
            spec.kind,
            ScanKind::Chars | ScanKind::Set(_) | ScanKind::Count
        );
        if skips {
            self.skip_whitespace()?;
            if self.peek()?.is_none() {
                return Ok(Step::Stop(ScanEnd::InputFailure));
            }
        }

        let max = spec.width.unwrap_or(usize::MAX);
        let mismatch = Step::Stop(ScanEnd::MatchingFailure {
            offset: spec.offset,
        });

        let value = match &spec.kind {
            ScanKind::Percent => {
                if self.eat_if(|b| b == b'%')?.is_none() {
                    return Ok(mismatch);
                }
                return Ok(Step::Matched(None));
            }
            ScanKind::Count => ScanValue::Count(self.consumed),
            ScanKind::Int { base, signed } => {
                let Some(parsed) = self.integer(*base, max)? else {
                    return Ok(mismatch);
                };
                if *signed {
                    ScanValue::Int(narrow_signed(parsed.to_signed(), spec.length))
                } else {
                    ScanValue::UInt(narrow_unsigned(parsed.to_unsigned(), spec.length))
                }
            }
            ScanKind::Pointer => match self.integer(16, max)? {
                Some(parsed) => ScanValue::UInt(parsed.to_unsigned()),
                None => return Ok(mismatch),
            },
            ScanKind::Float => match self.float(max)? {
                Some(v) => ScanValue::Float(v),
                None => return Ok(mismatch),
            },
            ScanKind::Str => {
                let bytes = self.take_while(max, |b| !b.is_ascii_whitespace())?;
                ScanValue::Str(String::from_utf8_lossy(&bytes).into_owned())
            }
            ScanKind::Set(set) => {
                let bytes = self.take_while(max, |b| set.contains(b))?;
                if bytes.is_empty() {
                    return Ok(if self.peek()?.is_none() {
                        Step::Stop(ScanEnd::InputFailure)
                    } else {
                        mismatch
                    });
                }
                ScanValue::Str(String::from_utf8_lossy(&bytes).into_owned())
            }
            ScanKind::Chars => {
                let want = spec.width.unwrap_or(1);
                let bytes = self.take_while(want, |_| true)?;
                if bytes.len() < want {
                    return Ok(Step::Stop(ScanEnd::InputFailure));
                }
                ScanValue::Chars(bytes)
            }
        };
        Ok(Step::Matched(Some(value)))
    }

    fn take_while(&mut self, max: usize, pred: impl Fn(u8) -> bool) -> io::Result<Vec<u8>> {
        let mut out = Vec::new();
        while out.len() < max {
            match self.eat_if(&pred)? {
                Some(b) => out.push(b),
                None => break,
            }
        }
        Ok(out)
    }

    /// strtol-style integer: optional sign, base prefix for bases 0 and 16,
    /// digits. Consumes at most `max` bytes. `None` when no digit was seen.
    fn integer(&mut self, base: u32, max: usize) -> io::Result<Option<ParsedInt>> {
        let mut taken = 0usize;
        let mut negative = false;
        if taken < max
            && let Some(sign) = self.eat_if(|b| b == b'+' || b == b'-')?
        {
            negative = sign == b'-';
            taken += 1;
        }

        let mut base = base;
        let mut saw_digit = false;
        if (base == 0 || base == 16) && taken < max && self.eat_if(|b| b == b'0')?.is_some() {
            taken += 1;
            saw_digit = true;
            if taken < max && self.eat_if(|b| b == b'x' || b == b'X')?.is_some() {
                taken += 1;
                base = 16;
            } else if base == 0 {
                base = 8;
            }
        }
        if base == 0 {
            base = 10;
        }

        let mut magnitude = 0u64;
        let mut overflow = false;
        while taken < max {
            let Some(digit) = self.peek()?.and_then(|b| char::from(b).to_digit(base)) else {
                break;
            };
            self.bump();
            taken += 1;
            saw_digit = true;
            match magnitude
                .checked_mul(u64::from(base))
                .and_then(|m| m.checked_add(u64::from(digit)))
            {
                Some(m) => magnitude = m,
                None => overflow = true,
            }
        }

        Ok(saw_digit.then_some(ParsedInt {
            negative,
            magnitude,
            overflow,
        }))
    }

    /// strtod-style float: decimal with optional exponent, hexadecimal with
    /// optional binary exponent, `inf`, `infinity`, `nan`. Consumes at most
    /// `max` bytes. `None` on a malformed number.
    fn float(&mut self, max: usize) -> io::Result<Option<f64>> {
        let mut text = String::new();
        if let Some(sign) = self.eat_if(|b| b == b'+' || b == b'-')? {
            text.push(char::from(sign));
        }
        let negative = text == "-";
        let room = |text: &String| text.len() < max;

        match self.peek()? {
            Some(b'i' | b'I') if room(&text) => {
                if !self.word(&mut text, "inf", max)? {
                    return Ok(None);
                }
                // "infinity" is optional past "inf"; a partial tail is consumed.
                self.word(&mut text, "inity", max)?;
                return Ok(Some(if negative {
                    f64::NEG_INFINITY
                } else {
                    f64::INFINITY
                }));
            }
            Some(b'n' | b'N') if room(&text) => {
                if !self.word(&mut text, "nan", max)? {
                    return Ok(None);
                }
                return Ok(Some(f64::NAN));
            }
            _ => {}
        }

        if room(&text) && self.eat_if(|b| b == b'0')?.is_some() {
            text.push('0');
            if room(&text) && self.eat_if(|b| b == b'x' || b == b'X')?.is_some() {
                text.push('x');
                return self.hex_float(text, negative, max);
            }
        }

        let mut digits = text.bytes().filter(u8::is_ascii_digit).count();
        digits += self.digits(&mut text, max, 10)?;
        if room(&text) && self.eat_if(|b| b == b'.')?.is_some() {
            text.push('.');
            digits += self.digits(&mut text, max, 10)?;
        }
        if digits == 0 {
            return Ok(None);
        }
        if room(&text) && self.eat_if(|b| b == b'e' || b == b'E')?.is_some() {
            text.push('e');
            if room(&text)
                && let Some(sign) = self.eat_if(|b| b == b'+' || b == b'-')?
            {
                text.push(char::from(sign));
            }
            if self.digits(&mut text, max, 10)? == 0 {
                return Ok(None);
            }
        }
        Ok(text.parse().ok())
    }

    /// Hex float after the "0x": digits, an optional fraction and an
    /// optional binary exponent. `text` already holds the sign and "0x";
    /// "0x" alone converts as zero. Rounded once, to nearest even.
    fn hex_float(
        &mut self,
        mut text: String,
        negative: bool,
        max: usize,
    ) -> io::Result<Option<f64>> {
        let mark = text.len();
        self.digits(&mut text, max, 16)?;
        if text.len() < max && self.eat_if(|b| b == b'.')?.is_some() {
            text.push('.');
            self.digits(&mut text, max, 16)?;
        }

        let mut mantissa = HexMantissa::default();
        let (whole, fraction) = text[mark..].split_once('.').unwrap_or((&text[mark..], ""));
        for c in whole.chars() {
            mantissa.push(c.to_digit(16).unwrap_or(0), false);
        }
        for c in fraction.chars() {
            mantissa.push(c.to_digit(16).unwrap_or(0), true);
        }

        let mut exp = mantissa.exp;
        if text.len() < max && self.eat_if(|b| b == b'p' || b == b'P')?.is_some() {
            text.push('p');
            let mut exp_negative = false;
            if text.len() < max
                && let Some(sign) = self.eat_if(|b| b == b'+' || b == b'-')?
            {
                text.push(char::from(sign));
                exp_negative = sign == b'-';
            }
            let before = text.len();
            if self.digits(&mut text, max, 10)? == 0 {
                return Ok(None);
            }
            let bin = text[before..].bytes().fold(0i64, |acc, d| {
                acc.saturating_mul(10).saturating_add(i64::from(d - b'0'))
            });
            exp = exp.saturating_add(if exp_negative { -bin } else { bin });
        }

        let value = compose_binary(mantissa.bits, exp, mantissa.sticky);
        Ok(Some(if negative { -value } else { value }))
    }

    fn digits(&mut self, text: &mut String, max: usize, radix: u32) -> io::Result<usize> {
        let mut count = 0;
        while text.len() < max {
            match self.eat_if(|b| char::from(b).is_digit(radix))? {
                Some(b) => {
                    text.push(char::from(b));
                    count += 1;
                }
                None => break,
            }
        }
        Ok(count)
    }

    /// Case-insensitively consume `word`; true if all of it matched.
    fn word(&mut self, text: &mut String, word: &str, max: usize) -> io::Result<bool> {
        for expected in word.bytes() {
            if text.len() >= max
                || self
                    .eat_if(|b| b.eq_ignore_ascii_case(&expected))?
                    .is_none()
            {
                return Ok(false);
            }
            text.push(char::from(expected));
        }
        Ok(true)
    }
}

/// Leading bits of a hex mantissa: at most 60 exact bits, the power of two
/// they are scaled by, and whether any nonzero digit was dropped.
#[derive(Default)]
struct HexMantissa {
    bits: u64,
    exp: i64,
    sticky: bool,
}

impl HexMantissa {
    fn push(&mut self, digit: u32, fractional: bool) {
        if self.bits >> 56 == 0 {
            self.bits = (self.bits << 4) | u64::from(digit);
            if fractional {
                self.exp = self.exp.saturating_sub(4);
            }
        } else {
            if !fractional {
                self.exp = self.exp.saturating_add(4);
            }
            self.sticky |= digit != 0;
        }
    }
}

/// `bits * 2^exp` rounded to the nearest `f64`, ties to even. `sticky`
/// marks nonzero bits below `bits` that were already dropped.
fn compose_binary(bits: u64, exp: i64, sticky: bool) -> f64 {
    const FRAC_BITS: i64 = 52;
    const MIN_LSB: i64 = -1074;

    if bits == 0 {
        return 0.0;
    }
    // Anything outside this range overflows or underflows regardless.
    let exp = exp.clamp(-5000, 5000);
    let top = exp + 63 - i64::from(bits.leading_zeros());
    if top > 1023 {
        return f64::INFINITY;
    }
    let mut lsb = (top - FRAC_BITS).max(MIN_LSB);
    let shift = lsb - exp;
    let mut kept = if shift <= 0 {
        bits << -shift
    } else if shift >= 64 {
        return 0.0;
    } else {
        let kept = bits >> shift;
        let rem = bits & ((1u64 << shift) - 1);
        let half = 1u64 << (shift - 1);
        if rem > half || (rem == half && (sticky || kept & 1 == 1)) {
            kept + 1
        } else {
            kept
        }
    };
    if kept == 0 {
        return 0.0;
    }
    if kept >> 53 != 0 {
        kept >>= 1;
        lsb += 1;
    }
    if kept >> 52 == 0 {
        // Subnormal: lsb is already at the minimum.
        return f64::from_bits(kept);
    }
    let biased = lsb + FRAC_BITS + 1023;
    if biased >= 2047 {
        return f64::INFINITY;
    }
    f64::from_bits(((biased as u64) << 52) | (kept & ((1u64 << 52) - 1)))
}

struct ParsedInt {
    negative: bool,
    magnitude: u64,
    overflow: bool,
}

impl ParsedInt {
    /// strtoll: saturate at the i64 limits.
    fn to_signed(&self) -> i64 {
        if self.negative {
            if self.overflow || self.magnitude > i64::MIN.unsigned_abs() {
                i64::MIN
            } else {
                0i64.wrapping_sub_unsigned(self.magnitude)
            }
        } else if self.overflow || self.magnitude > i64::MAX as u64 {
            i64::MAX
        } else {
            self.magnitude as i64
        }
    }

    /// strtoull: saturate at u64::MAX, negate modulo 2^64.
    fn to_unsigned(&self) -> u64 {
        if self.overflow {
            u64::MAX
        } else if self.negative {
            self.magnitude.wrapping_neg()
        } else {
            self.magnitude
        }
    }
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

#[cfg(test)]
mod tests {
    use super::*;

    fn run(input: &str, format: &str) -> ScanOutcome {
        let mut bytes = input.as_bytes();
        scan(&mut bytes, format.as_bytes()).unwrap()
    }

    #[test]
    fn parse_directives() {
        let d = parse_scan_format(b"%d, %*5s%%").unwrap();
        assert_eq!(d.len(), 5);
        assert!(matches!(
            &d[0],
            ScanDirective::Conversion(s) if s.kind == ScanKind::Int { base: 10, signed: true }
        ));
        assert!(matches!(d[1], ScanDirective::Literal { byte: b',', offset: 2 }));
        assert!(matches!(d[2], ScanDirective::Whitespace));
        assert!(matches!(&d[3], ScanDirective::Conversion(s) if s.suppress && s.width == Some(5)));
        assert!(matches!(&d[4], ScanDirective::Conversion(s) if s.kind == ScanKind::Percent));
    }

    #[test]
    fn parse_rejects_malformed() {
        assert!(matches!(
            parse_scan_format(b"%"),
            Err(ScanError::InvalidFormat { offset: 0 })
        ));
        assert!(parse_scan_format(b"%0d").is_err());
        assert!(parse_scan_format(b"%y").is_err());
        assert!(parse_scan_format(b"%[abc").is_err());
        assert!(parse_scan_format(b"%*%").is_err());
    }

    #[test]
    fn scan_set_parsing() {
        let (set, used) = parse_scan_set(b"a-c]rest").unwrap();
        assert_eq!(used, 4);
        assert!(set.contains(b'b'));
        assert!(!set.contains(b'd'));

        let (set, _) = parse_scan_set(b"]x]").unwrap();
        assert!(set.contains(b']'));
        assert!(set.contains(b'x'));

        let (set, _) = parse_scan_set(b"^-a]").unwrap();
        assert!(!set.contains(b'-'));
        assert!(!set.contains(b'a'));
        assert!(set.contains(b'z'));
    }

    #[test]
    fn integers_and_whitespace() {
        let out = run("  42 -7\n+3", "%d%d%d");
        assert_eq!(
            out.values,
            vec![ScanValue::Int(42), ScanValue::Int(-7), ScanValue::Int(3)]
        );
        assert_eq!(out.c_return(), 3);
        assert_eq!(out.end, ScanEnd::Completed);
    }

    #[test]
    fn base_detection_for_i() {
        let out = run("0x1f 017 9", "%i %i %i");
        assert_eq!(
            out.values,
            vec![ScanValue::Int(31), ScanValue::Int(15), ScanValue::Int(9)]
        );
    }

    #[test]
    fn hex_octal_unsigned() {
        let out = run("ff 0XFF 17 -1", "%x %x %o %u");
        assert_eq!(
            out.values,
            vec![
                ScanValue::UInt(255),
                ScanValue::UInt(255),
                ScanValue::UInt(15),
                ScanValue::UInt(u64::MAX),
            ]
        );
    }

    #[test]
    fn integer_overflow_saturates() {
        let out = run("99999999999999999999 -99999999999999999999", "%d %d");
        assert_eq!(
            out.values,
            vec![ScanValue::Int(i64::MAX), ScanValue::Int(i64::MIN)]
        );
    }

    #[test]
    fn length_modifiers_narrow() {
        let out = run("300 70000", "%hhd %hu");
        assert_eq!(out.values, vec![ScanValue::Int(44), ScanValue::UInt(4464)]);
    }

    #[test]
    fn width_limits_field() {
        let out = run("12345", "%2d%3d");
        assert_eq!(out.values, vec![ScanValue::Int(12), ScanValue::Int(345)]);
    }

    #[test]
    fn floats() {
        let out = run("3.25 -1e3 .5 1E-2 inf -Infinity 0x1.8p1", "%f %e %g %f %f %f %a");
        assert_eq!(
            out.values,
            vec![
                ScanValue::Float(3.25),
                ScanValue::Float(-1000.0),
                ScanValue::Float(0.5),
                ScanValue::Float(0.01),
                ScanValue::Float(f64::INFINITY),
                ScanValue::Float(f64::NEG_INFINITY),
                ScanValue::Float(3.0),
            ]
        );
    }

    #[test]
    fn nan_float() {
        let out = run("NaN", "%f");
        assert!(matches!(out.values[0], ScanValue::Float(v) if v.is_nan()));
    }

    fn hex(text: &str) -> f64 {
        match run(text, "%a").values.as_slice() {
            [ScanValue::Float(v)] => *v,
            other => panic!("{text}: {other:?}"),
        }
    }

    #[test]
    fn hex_floats_at_the_subnormal_end() {
        assert_eq!(hex("0x1p-1074").to_bits(), 1);
        assert_eq!(hex("0x10p-1078").to_bits(), 1);
        assert_eq!(hex("0x1.8p-1075").to_bits(), 1);
        // Exactly half the smallest subnormal: ties to even, zero.
        assert_eq!(hex("0x1p-1075"), 0.0);
        assert_eq!(hex("0x1p-1022"), f64::MIN_POSITIVE);
        assert_eq!(hex("0x0.8p-1021"), f64::MIN_POSITIVE);
        assert_eq!(hex("-0x1p-99999"), 0.0);
    }

    #[test]
    fn hex_floats_at_the_overflow_end() {
        assert_eq!(hex("0x0.1p1027"), 2f64.powi(1023));
        assert_eq!(hex("0x1p1023"), 2f64.powi(1023));
        assert_eq!(hex("0x1.fffffffffffffp1023"), f64::MAX);
        assert_eq!(hex("0x0.1p1028"), f64::INFINITY);
        // Rounds up past the largest finite value.
        assert_eq!(hex("0x1.fffffffffffff8p1023"), f64::INFINITY);
        assert_eq!(hex("0x1p99999999999999999999"), f64::INFINITY);
    }

    #[test]
    fn long_hex_mantissa_rounds_once() {
        assert_eq!(hex("0x1.00000000000008p0"), 1.0);
        assert_eq!(hex("0x1.000000000000080000001p0"), 1.0 + f64::EPSILON);
        assert_eq!(hex("0x1.00000000000018p0"), 1.0 + 2.0 * f64::EPSILON);
        assert_eq!(hex("0x123456789abcdef0123p0"), 0x1234_5678_9abc_def0_123_u128 as f64);
    }

    #[test]
    fn dangling_exponent_is_matching_failure() {
        let out = run("1e+x", "%f");
        assert_eq!(out.c_return(), 0);
        assert!(matches!(out.end, ScanEnd::MatchingFailure { .. }));
    }

    #[test]
    fn strings_and_chars() {
        let out = run("hello world!", "%s%c%3c");
        assert_eq!(
            out.values,
            vec![
                ScanValue::Str("hello".into()),
                ScanValue::Chars(b" ".to_vec()),
                ScanValue::Chars(b"wor".to_vec()),
            ]
        );
    }

    #[test]
    fn string_width() {
        let out = run("abcdef", "%3s%s");
        assert_eq!(
            out.values,
            vec![ScanValue::Str("abc".into()), ScanValue::Str("def".into())]
        );
    }

    #[test]
    fn scan_sets() {
        let out = run("key=value;rest", "%[^=]=%[a-z]");
        assert_eq!(
            out.values,
            vec![ScanValue::Str("key".into()), ScanValue::Str("value".into())]
        );
        assert_eq!(out.consumed, 9);
    }

    #[test]
    fn empty_scan_set_match_fails() {
        let out = run("123", "%[a-z]");
        assert_eq!(out.c_return(), 0);
        assert!(matches!(out.end, ScanEnd::MatchingFailure { offset: 0 }));
    }

    #[test]
    fn suppression_and_count() {
        let out = run("skip 12", "%*s %n%d%n");
        assert_eq!(
            out.values,
            vec![ScanValue::Count(5), ScanValue::Int(12), ScanValue::Count(7)]
        );
        assert_eq!(out.assigned, 1);
        assert_eq!(out.c_return(), 1);
    }

    #[test]
    fn literal_mismatch_stops() {
        let out = run("10-20", "%d,%d");
        assert_eq!(out.values, vec![ScanValue::Int(10)]);
        assert_eq!(out.c_return(), 1);
        assert_eq!(out.end, ScanEnd::MatchingFailure { offset: 2 });
    }

    #[test]
    fn percent_directive() {
        let out = run("50 %", "%d %%");
        assert_eq!(out.c_return(), 1);
        assert_eq!(out.end, ScanEnd::Completed);
    }

    #[test]
    fn eof_before_first_conversion() {
        assert_eq!(run("", "%d").c_return(), EOF);
        assert_eq!(run("   \n", "%d").c_return(), EOF);
        assert_eq!(run("", "x%d").c_return(), EOF);
        assert_eq!(run("abc", "%d").c_return(), 0);
    }

    #[test]
    fn eof_after_some_conversions() {
        let out = run("5", "%d %d");
        assert_eq!(out.c_return(), 1);
        assert_eq!(out.end, ScanEnd::InputFailure);
    }

    #[test]
    fn chars_short_read_is_input_failure() {
        let out = run("ab", "%3c");
        assert_eq!(out.c_return(), EOF);
    }

    #[test]
    fn unconsumed_input_stays_in_reader() {
        let mut input: &[u8] = b"12 34\nrest";
        let first = scan(&mut input, b"%d").unwrap();
        assert_eq!(first.values, vec![ScanValue::Int(12)]);
        assert_eq!(input, b" 34\nrest");
        let second = scan(&mut input, b"%d").unwrap();
        assert_eq!(second.values, vec![ScanValue::Int(34)]);
        assert_eq!(input, b"\nrest");
    }

    #[test]
    fn pointer_conversion() {
        let out = run("0x7ffe", "%p");
        assert_eq!(out.values, vec![ScanValue::UInt(0x7ffe)]);
    }
}
