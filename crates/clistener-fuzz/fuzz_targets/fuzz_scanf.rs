#![no_main]
use clistener_core::stdio::{EOF, sscanf_values};
use libfuzzer_sys::fuzz_target;

// Input and format are split at the first NUL byte.
fuzz_target!(|data: &[u8]| {
    let Some(split) = data.iter().position(|&b| b == 0) else {
        return;
    };
    let input = String::from_utf8_lossy(&data[..split]);
    let format = String::from_utf8_lossy(&data[split + 1..]);

    if let Ok(outcome) = sscanf_values(&input, &format) {
        assert!(outcome.consumed <= input.len());
        assert!(outcome.assigned <= outcome.values.len());
        let ret = outcome.c_return();
        assert!(ret == EOF || ret >= 0);
    }
});
