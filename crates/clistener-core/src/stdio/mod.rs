//! `<stdio.h>` entry points for interpreted programs.
//!
//! `printf` writes one terminated line per call to standard output.
//! `scanf` reads from standard input into caller-owned targets.
//! Both are thin layers over the engines in [`printf`] and [`scanf`]
//! and share them with the stream and string companions.

pub mod arg;
pub mod error;
pub mod printf;
pub mod scanf;
pub mod target;

use std::io::{self, BufRead, Write};

use crate::config::StdioConfig;

pub use arg::Arg;
pub use error::{FormatError, ScanError, StdioError};
pub use scanf::{EOF, ScanEnd, ScanOutcome};
pub use target::{ScanTarget, ScanValue, assign, check_targets};

// ---------------------------------------------------------------------------
// printf family
// ---------------------------------------------------------------------------

/// Build the line body: verbatim without arguments, rendered otherwise.
fn render_line(template: &str, args: &[Arg], config: &StdioConfig) -> Result<Vec<u8>, FormatError> {
    if args.is_empty() {
        Ok(template.as_bytes().to_vec())
    } else {
        printf::format_with(template.as_bytes(), args, config)
    }
}

/// Print `template` to standard output followed by a line terminator.
///
/// With no arguments the template is written as-is, `%` included. With
/// arguments every conversion is interpreted. A formatting failure writes
/// nothing.
pub fn printf(template: &str, args: &[Arg]) -> Result<(), StdioError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    fprintf(&mut out, template, args)
}

/// [`printf`] to any writer.
pub fn fprintf<W: Write + ?Sized>(
    out: &mut W,
    template: &str,
    args: &[Arg],
) -> Result<(), StdioError> {
    fprintf_with(out, template, args, &StdioConfig::current())
}

/// [`fprintf`] with an explicit configuration.
pub fn fprintf_with<W: Write + ?Sized>(
    out: &mut W,
    template: &str,
    args: &[Arg],
    config: &StdioConfig,
) -> Result<(), StdioError> {
    let mut line = render_line(template, args, config)?;
    line.extend_from_slice(config.line_ending.as_bytes());
    out.write_all(&line)?;
    out.flush()?;
    Ok(())
}

/// Render like [`printf`] into a `String`, without the line terminator.
pub fn sprintf(template: &str, args: &[Arg]) -> Result<String, FormatError> {
    sprintf_with(template, args, &StdioConfig::current())
}

/// [`sprintf`] with an explicit configuration.
pub fn sprintf_with(
    template: &str,
    args: &[Arg],
    config: &StdioConfig,
) -> Result<String, FormatError> {
    let line = render_line(template, args, config)?;
    Ok(String::from_utf8_lossy(&line).into_owned())
}

// ---------------------------------------------------------------------------
// scanf family
// ---------------------------------------------------------------------------

/// Read from standard input into `targets`, returning the C result:
/// the number of assigned items, or [`EOF`].
///
/// Standard input stays locked for the duration of the call. Bytes the
/// format does not consume remain buffered for the next read.
pub fn scanf(format: &str, targets: &mut [&mut dyn ScanTarget]) -> Result<i32, ScanError> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    fscanf(&mut input, format, targets)
}

/// [`scanf`] from any buffered reader.
///
/// Targets are checked against the format before anything is read: a
/// missing or ill-typed target is an error and the input is untouched.
pub fn fscanf<R: BufRead + ?Sized>(
    input: &mut R,
    format: &str,
    targets: &mut [&mut dyn ScanTarget],
) -> Result<i32, ScanError> {
    let directives = scanf::parse_scan_format(format.as_bytes())?;
    check_targets(&directives, targets)?;
    let outcome = scanf::scan_directives(input, &directives)?;
    assign(&outcome.values, targets)?;
    Ok(outcome.c_return())
}

/// [`scanf`] over a string.
pub fn sscanf(
    input: &str,
    format: &str,
    targets: &mut [&mut dyn ScanTarget],
) -> Result<i32, ScanError> {
    fscanf(&mut input.as_bytes(), format, targets)
}

/// Scan a string and return the converted values instead of storing them.
pub fn sscanf_values(input: &str, format: &str) -> Result<ScanOutcome, ScanError> {
    scan_values(&mut input.as_bytes(), format)
}

/// Scan any buffered reader and return the converted values.
pub fn scan_values<R: BufRead + ?Sized>(
    input: &mut R,
    format: &str,
) -> Result<ScanOutcome, ScanError> {
    scanf::scan(input, format.as_bytes())
}
