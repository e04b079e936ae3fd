//! # clistener-core
//!
//! Safe Rust implementation of the `<stdio.h>` slice exposed to programs
//! running inside the C listener interpreter: `printf` and `scanf`, plus
//! the `fprintf`/`sprintf`/`fscanf`/`sscanf` companions built on the same
//! engines. No `unsafe` code is permitted at the crate level.

#![deny(unsafe_code)]

pub mod config;
pub mod stdio;

pub use config::{ConversionMode, LineEnding, StdioConfig};
pub use stdio::{
    Arg, FormatError, ScanError, ScanOutcome, ScanTarget, ScanValue, StdioError, fprintf,
    fscanf, printf, scanf, sprintf, sscanf, sscanf_values,
};

/// Print through the interpreter's `printf` with Rust values as arguments.
///
/// ```no_run
/// clistener_core::printf!("%s scored %d", "ada", 42).unwrap();
/// ```
#[macro_export]
macro_rules! printf {
    ($template:expr $(,)?) => {
        $crate::stdio::printf($template, &[])
    };
    ($template:expr, $($arg:expr),+ $(,)?) => {
        $crate::stdio::printf($template, &[$($crate::stdio::Arg::from($arg)),+])
    };
}

/// Render through the `printf` engine into a `String` (no line terminator).
#[macro_export]
macro_rules! sprintf {
    ($template:expr $(,)?) => {
        $crate::stdio::sprintf($template, &[])
    };
    ($template:expr, $($arg:expr),+ $(,)?) => {
        $crate::stdio::sprintf($template, &[$($crate::stdio::Arg::from($arg)),+])
    };
}
