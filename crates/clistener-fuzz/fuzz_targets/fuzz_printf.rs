#![no_main]
use clistener_core::config::{ConversionMode, LineEnding, StdioConfig};
use clistener_core::stdio::Arg;
use clistener_core::stdio::printf::{format_with, parse_format_string};
use libfuzzer_sys::fuzz_target;

// Layout: [mode byte][arg count][8 bytes per arg][template...]
fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }
    let mode = if data[0] & 1 == 0 {
        ConversionMode::Strict
    } else {
        ConversionMode::Coerce
    };
    let config = StdioConfig::new(mode, LineEnding::Lf);
    let argc = usize::from(data[1] % 8);
    let mut rest = &data[2..];

    let mut args = Vec::with_capacity(argc);
    for i in 0..argc {
        let Some((chunk, tail)) = rest.split_first_chunk::<8>() else {
            break;
        };
        rest = tail;
        let raw = u64::from_le_bytes(*chunk);
        args.push(match (i + usize::from(chunk[0])) % 6 {
            0 => Arg::Int(raw as i64),
            1 => Arg::UInt(raw),
            2 => Arg::Float(f64::from_bits(raw)),
            3 => Arg::Char(char::from_u32(raw as u32 & 0x10_ffff).unwrap_or('?')),
            4 => Arg::Str(String::from_utf8_lossy(chunk).into_owned()),
            _ => Arg::Pointer(raw as usize),
        });
    }

    // Neither parsing nor rendering may panic on any template.
    let _ = parse_format_string(rest);
    let _ = format_with(rest, &args, &config);
});
