//! Shared inputs for the stdio benchmarks.

use clistener_core::Arg;

/// A log-style line mixing every common conversion.
#[must_use]
pub fn mixed_line() -> (&'static str, Vec<Arg>) {
    (
        "[%08lx] %-12s %5d/%-5u %8.3f %c %p %%",
        vec![
            Arg::from(0xdead_beef_u64),
            Arg::from("listener"),
            Arg::from(-1234_i32),
            Arg::from(5678_u32),
            Arg::from(std::f64::consts::PI),
            Arg::from('x'),
            Arg::Pointer(0x7fff_0010),
        ],
    )
}

/// `count` whitespace-separated decimal integers with alternating signs.
#[must_use]
pub fn integer_input(count: usize) -> String {
    let mut out = String::with_capacity(count * 8);
    for i in 0..count {
        if i > 0 {
            out.push(if i % 16 == 0 { '\n' } else { ' ' });
        }
        let value = i as i64 * 7919;
        if i % 2 == 1 {
            out.push('-');
        }
        out.push_str(&value.to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mixed_line_renders() {
        let (template, args) = mixed_line();
        let line = clistener_core::sprintf(template, &args).unwrap();
        assert!(line.starts_with("[deadbeef] listener     "));
        assert!(line.ends_with(" x 0x7fff0010 %"));
    }

    #[test]
    fn integer_input_has_requested_count() {
        let input = integer_input(40);
        assert_eq!(input.split_whitespace().count(), 40);
        assert!(input.starts_with("0 -7919 15838"));
    }
}
