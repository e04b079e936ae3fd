//! Scan results and caller-side output slots.
//!
//! C `scanf` writes through pointers. Here the caller hands out `&mut`
//! borrows of its own variables as `&mut dyn ScanTarget`, and the scan
//! stores into them once every converted value is known to fit.

use super::error::ScanError;
use super::scanf::ScanDirective;

/// One converted field.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanValue {
    /// `%d`, `%i`.
    Int(i64),
    /// `%u`, `%o`, `%x`, `%p`.
    UInt(u64),
    /// `%f`, `%e`, `%g`, `%a`.
    Float(f64),
    /// `%s`, `%[`.
    Str(String),
    /// `%c`: exactly the requested number of bytes.
    Chars(Vec<u8>),
    /// `%n`: bytes consumed so far.
    Count(usize),
}

impl ScanValue {
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::UInt(_) => "unsigned",
            Self::Float(_) => "float",
            Self::Str(_) => "string",
            Self::Chars(_) => "char",
            Self::Count(_) => "count",
        }
    }
}

/// A caller-owned slot that a scan can write into.
pub trait ScanTarget {
    /// Whether `value` can be stored here.
    fn accepts(&self, value: &ScanValue) -> bool;

    /// Store `value`. Only called after [`ScanTarget::accepts`] returned true.
    fn store(&mut self, value: &ScanValue);
}

/// Store `values` into `targets` in order.
///
/// Nothing is written unless every value has a target that accepts it.
/// Targets past the last value are left untouched.
pub fn assign(
    values: &[ScanValue],
    targets: &mut [&mut dyn ScanTarget],
) -> Result<(), ScanError> {
    if values.len() > targets.len() {
        return Err(ScanError::MissingTarget {
            index: targets.len(),
        });
    }
    for (index, (value, target)) in values.iter().zip(targets.iter()).enumerate() {
        if !target.accepts(value) {
            return Err(ScanError::TargetMismatch {
                index,
                expected: value.kind(),
            });
        }
    }
    for (value, target) in values.iter().zip(targets.iter_mut()) {
        target.store(value);
    }
    Ok(())
}

/// Check `targets` against the conversions in `directives` before any
/// input is read, so a call that could not store its values leaves the
/// input where it was.
pub fn check_targets(
    directives: &[ScanDirective],
    targets: &[&mut dyn ScanTarget],
) -> Result<(), ScanError> {
    let samples = directives.iter().filter_map(|directive| match directive {
        ScanDirective::Conversion(spec) => spec.sample_value(),
        _ => None,
    });
    for (index, sample) in samples.enumerate() {
        let Some(target) = targets.get(index) else {
            return Err(ScanError::MissingTarget { index });
        };
        if !target.accepts(&sample) {
            return Err(ScanError::TargetMismatch {
                index,
                expected: sample.kind(),
            });
        }
    }
    Ok(())
}

// Integer slots take any integer-valued field and truncate the way a C
// store through a narrower pointer does.
macro_rules! integer_target {
    ($($ty:ty),+) => {
        $(
            impl ScanTarget for $ty {
                fn accepts(&self, value: &ScanValue) -> bool {
                    matches!(value, ScanValue::Int(_) | ScanValue::UInt(_) | ScanValue::Count(_))
                }

                fn store(&mut self, value: &ScanValue) {
                    match value {
                        ScanValue::Int(v) => *self = *v as $ty,
                        ScanValue::UInt(v) => *self = *v as $ty,
                        ScanValue::Count(v) => *self = *v as $ty,
                        _ => {}
                    }
                }
            }
        )+
    };
}

integer_target!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

macro_rules! float_target {
    ($($ty:ty),+) => {
        $(
            impl ScanTarget for $ty {
                fn accepts(&self, value: &ScanValue) -> bool {
                    matches!(value, ScanValue::Float(_))
                }

                fn store(&mut self, value: &ScanValue) {
                    if let ScanValue::Float(v) = value {
                        *self = *v as $ty;
                    }
                }
            }
        )+
    };
}

float_target!(f32, f64);

impl ScanTarget for String {
    fn accepts(&self, value: &ScanValue) -> bool {
        matches!(value, ScanValue::Str(_) | ScanValue::Chars(_))
    }

    fn store(&mut self, value: &ScanValue) {
        match value {
            ScanValue::Str(s) => s.clone_into(self),
            ScanValue::Chars(bytes) => *self = String::from_utf8_lossy(bytes).into_owned(),
            _ => {}
        }
    }
}

impl ScanTarget for Vec<u8> {
    fn accepts(&self, value: &ScanValue) -> bool {
        matches!(value, ScanValue::Str(_) | ScanValue::Chars(_))
    }

    fn store(&mut self, value: &ScanValue) {
        match value {
            ScanValue::Str(s) => *self = s.as_bytes().to_vec(),
            ScanValue::Chars(bytes) => bytes.clone_into(self),
            _ => {}
        }
    }
}

/// A single `%c` byte.
impl ScanTarget for char {
    fn accepts(&self, value: &ScanValue) -> bool {
        match value {
            ScanValue::Chars(bytes) => !bytes.is_empty(),
            ScanValue::Str(s) => !s.is_empty(),
            _ => false,
        }
    }

    fn store(&mut self, value: &ScanValue) {
        match value {
            ScanValue::Chars(bytes) => {
                if let Some(&b) = bytes.first() {
                    *self = char::from(b);
                }
            }
            ScanValue::Str(s) => {
                if let Some(c) = s.chars().next() {
                    *self = c;
                }
            }
            _ => {}
        }
    }
}

/// A dynamically-typed slot, the shape an interpreter variable cell takes.
impl ScanTarget for ScanValue {
    fn accepts(&self, _value: &ScanValue) -> bool {
        true
    }

    fn store(&mut self, value: &ScanValue) {
        value.clone_into(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assign_stores_in_order() {
        let mut a = 0i32;
        let mut b = 0.0f64;
        let mut c = String::new();
        let values = [
            ScanValue::Int(7),
            ScanValue::Float(2.5),
            ScanValue::Str("hi".into()),
        ];
        assign(&values, &mut [&mut a, &mut b, &mut c]).unwrap();
        assert_eq!(a, 7);
        assert_eq!(b, 2.5);
        assert_eq!(c, "hi");
    }

    #[test]
    fn mismatch_leaves_every_target_untouched() {
        let mut a = 1i32;
        let mut b = 2i32;
        let values = [ScanValue::Int(9), ScanValue::Str("x".into())];
        let err = assign(&values, &mut [&mut a, &mut b]).unwrap_err();
        assert!(matches!(
            err,
            ScanError::TargetMismatch {
                index: 1,
                expected: "string"
            }
        ));
        assert_eq!((a, b), (1, 2));
    }

    #[test]
    fn too_few_targets_is_an_error() {
        let mut a = 0u8;
        let values = [ScanValue::UInt(1), ScanValue::UInt(2)];
        let err = assign(&values, &mut [&mut a]).unwrap_err();
        assert!(matches!(err, ScanError::MissingTarget { index: 1 }));
        assert_eq!(a, 0);
    }

    fn directives(format: &str) -> Vec<ScanDirective> {
        crate::stdio::scanf::parse_scan_format(format.as_bytes()).unwrap()
    }

    #[test]
    fn check_targets_matches_conversions_in_order() {
        let mut name = String::new();
        let mut count = 0u32;
        let mut ratio = 0.0f32;
        let mut initial = ' ';
        let targets: &[&mut dyn ScanTarget] =
            &[&mut name, &mut count, &mut ratio, &mut initial];
        check_targets(&directives("%s %*d %u %f %c"), targets).unwrap();
        let err = check_targets(&directives("%s %x %n%lf"), &targets[..2]).unwrap_err();
        assert!(matches!(err, ScanError::MissingTarget { index: 2 }));
    }

    #[test]
    fn check_targets_reports_first_problem() {
        let mut a = 0i32;
        let mut b = String::new();
        let err = check_targets(&directives("%d %d"), &[&mut a, &mut b]).unwrap_err();
        assert!(matches!(
            err,
            ScanError::TargetMismatch {
                index: 1,
                expected: "int"
            }
        ));
        let err = check_targets(&directives("%d %[a-z] %%"), &[&mut a]).unwrap_err();
        assert!(matches!(err, ScanError::MissingTarget { index: 1 }));
        check_targets(&directives("%*s %% %d"), &[&mut a]).unwrap();
    }

    #[test]
    fn narrow_integer_targets_truncate() {
        let mut small = 0u8;
        let mut signed = 0i8;
        assign(
            &[ScanValue::Int(300), ScanValue::Int(200)],
            &mut [&mut small, &mut signed],
        )
        .unwrap();
        assert_eq!(small, 44);
        assert_eq!(signed, -56);
    }

    #[test]
    fn dynamic_slot_takes_anything() {
        let mut slot = ScanValue::Int(0);
        assign(&[ScanValue::Chars(b"ab".to_vec())], &mut [&mut slot]).unwrap();
        assert_eq!(slot, ScanValue::Chars(b"ab".to_vec()));
    }

    #[test]
    fn char_target_takes_first_byte() {
        let mut c = ' ';
        assign(&[ScanValue::Chars(b"q".to_vec())], &mut [&mut c]).unwrap();
        assert_eq!(c, 'q');
    }
}
