// jester-reader - Numeric tower
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! The numeric tower: 64-bit integers, doubles, big integers, big floats
//! and ratios, with the promotion lattice used by equality, comparison and
//! arithmetic.
//!
//! Kinds split into two categories. Exact numbers (`Int`, `BigInt`,
//! `Ratio`) are equal across kinds when they denote the same value; inexact
//! numbers (`Double`, `BigFloat`) likewise. `=` never equates an exact
//! number with an inexact one; `==`-style value equivalence (`equiv`)
//! crosses the categories.
//!
//! Ratios normalise at construction: a ratio with denominator 1 collapses
//! to an integer, so a `Ratio` value never equals an `Int` or `BigInt`.

use std::cmp::Ordering;
use std::hash::Hasher;
use std::rc::Rc;

use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{FromPrimitive, Signed, ToPrimitive, Zero};

use crate::value::JesterVal;

/// Errors arising from numeric operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NumError {
    /// Integer division or remainder by zero.
    DivisionByZero,
    /// A checked 64-bit operation overflowed.
    IntegerOverflow { operation: &'static str },
    /// A non-numeric operand reached a numeric operation.
    NotANumber { type_name: &'static str },
}

pub type NumResult = Result<JesterVal, NumError>;

/// True for any numeric value kind.
#[must_use]
pub fn is_number(val: &JesterVal) -> bool {
    matches!(
        val,
        JesterVal::Int(_)
            | JesterVal::Double(_)
            | JesterVal::BigInt(_)
            | JesterVal::BigFloat(_)
            | JesterVal::Ratio(_)
    )
}

/// Build a ratio, normalising the result: `4/2` becomes the integer `2`,
/// and small results collapse back to `Int`.
pub fn make_ratio(numer: BigInt, denom: BigInt) -> NumResult {
    if denom.is_zero() {
        return Err(NumError::DivisionByZero);
    }
    Ok(normalize_rational(BigRational::new(numer, denom)))
}

/// Collapse a rational to the smallest value kind that holds it.
#[must_use]
pub fn normalize_rational(r: BigRational) -> JesterVal {
    if r.is_integer() {
        normalize_bigint(r.to_integer())
    } else {
        JesterVal::Ratio(Rc::new(r))
    }
}

/// Collapse a big integer produced by ratio normalisation to `Int` when it
/// fits. Big integers written by the user (`1N`) stay big.
#[must_use]
pub fn normalize_bigint(b: BigInt) -> JesterVal {
    match b.to_i64() {
        Some(i) => JesterVal::Int(i),
        None => JesterVal::BigInt(Rc::new(b)),
    }
}

// ---------------------------------------------------------------------------
// Promotion views
// ---------------------------------------------------------------------------

fn as_bigint(val: &JesterVal) -> Option<BigInt> {
    match val {
        JesterVal::Int(i) => Some(BigInt::from(*i)),
        JesterVal::BigInt(b) => Some((**b).clone()),
        _ => None,
    }
}

fn as_rational(val: &JesterVal) -> Option<BigRational> {
    match val {
        JesterVal::Int(i) => Some(BigRational::from_integer(BigInt::from(*i))),
        JesterVal::BigInt(b) => Some(BigRational::from_integer((**b).clone())),
        JesterVal::Ratio(r) => Some((**r).clone()),
        _ => None,
    }
}

fn as_bigdecimal(val: &JesterVal) -> Option<BigDecimal> {
    match val {
        JesterVal::Int(i) => Some(BigDecimal::from(*i)),
        JesterVal::BigInt(b) => Some(BigDecimal::from((**b).clone())),
        JesterVal::Double(d) => BigDecimal::from_f64(*d),
        JesterVal::BigFloat(b) => Some((**b).clone()),
        JesterVal::Ratio(_) => None,
        _ => None,
    }
}

/// Approximate any number as a double.
#[must_use]
pub fn to_f64(val: &JesterVal) -> Option<f64> {
    match val {
        JesterVal::Int(i) => Some(*i as f64),
        JesterVal::Double(d) => Some(*d),
        JesterVal::BigInt(b) => b.to_f64(),
        JesterVal::BigFloat(b) => b.to_f64(),
        JesterVal::Ratio(r) => r.to_f64(),
        _ => None,
    }
}

fn is_exact(val: &JesterVal) -> bool {
    matches!(
        val,
        JesterVal::Int(_) | JesterVal::BigInt(_) | JesterVal::Ratio(_)
    )
}

fn f64_eq(a: f64, b: f64) -> bool {
    // Bitwise-style equality so reflexivity holds for NaN; -0.0 equals 0.0.
    a == b || (a.is_nan() && b.is_nan())
}

// ---------------------------------------------------------------------------
// Equality, equivalence, comparison
// ---------------------------------------------------------------------------

/// `=`-style numeric equality: equal value within the same category.
#[must_use]
pub fn num_eq(a: &JesterVal, b: &JesterVal) -> bool {
    use JesterVal as V;
    match (a, b) {
        (V::Int(x), V::Int(y)) => x == y,
        (V::Double(x), V::Double(y)) => f64_eq(*x, *y),
        (V::BigInt(x), V::BigInt(y)) => x == y,
        (V::Ratio(x), V::Ratio(y)) => x == y,
        (V::BigFloat(x), V::BigFloat(y)) => x == y,
        (V::Int(i), V::BigInt(b)) | (V::BigInt(b), V::Int(i)) => {
            b.to_i64().is_some_and(|bv| bv == *i)
        }
        // Ratios are normalised, so a ratio never denotes an integer; the
        // comparison is still spelled out for values built by other means.
        (V::Ratio(r), other) | (other, V::Ratio(r)) if is_exact(other) => {
            as_rational(other).is_some_and(|o| o == **r)
        }
        (V::Double(d), V::BigFloat(b)) | (V::BigFloat(b), V::Double(d)) => {
            BigDecimal::from_f64(*d).is_some_and(|dv| dv == **b)
        }
        _ => false,
    }
}

/// `==`-style equivalence: equal mathematical value across categories.
#[must_use]
pub fn num_equiv(a: &JesterVal, b: &JesterVal) -> bool {
    if !is_number(a) || !is_number(b) {
        return false;
    }
    if is_exact(a) == is_exact(b) {
        return num_eq(a, b);
    }
    match (to_f64(a), to_f64(b)) {
        (Some(x), Some(y)) => f64_eq(x, y),
        _ => false,
    }
}

/// Compare two numbers across kinds. `None` only when NaN is involved.
#[must_use]
pub fn num_compare(a: &JesterVal, b: &JesterVal) -> Option<Ordering> {
    use JesterVal as V;
    match (a, b) {
        (V::Int(x), V::Int(y)) => Some(x.cmp(y)),
        _ if matches!(a, V::Double(_)) || matches!(b, V::Double(_)) => {
            to_f64(a)?.partial_cmp(&to_f64(b)?)
        }
        _ if matches!(a, V::BigFloat(_)) || matches!(b, V::BigFloat(_)) => {
            match (as_bigdecimal(a), as_bigdecimal(b)) {
                (Some(x), Some(y)) => Some(x.cmp(&y)),
                // Ratio against big float falls back to doubles.
                _ => to_f64(a)?.partial_cmp(&to_f64(b)?),
            }
        }
        _ if matches!(a, V::Ratio(_)) || matches!(b, V::Ratio(_)) => {
            Some(as_rational(a)?.cmp(&as_rational(b)?))
        }
        _ => Some(as_bigint(a)?.cmp(&as_bigint(b)?)),
    }
}

/// Hash a number so that cross-kind equal values hash equal. Exact and
/// inexact categories get distinct prefixes; within a category the hash is
/// derived from the canonical value.
pub fn hash_number<H: Hasher>(val: &JesterVal, state: &mut H) {
    use JesterVal as V;
    match val {
        V::Int(i) => {
            state.write_u8(0x11);
            state.write_i64(*i);
        }
        V::BigInt(b) => {
            state.write_u8(0x11);
            match b.to_i64() {
                Some(i) => state.write_i64(i),
                None => state.write(&b.to_signed_bytes_le()),
            }
        }
        V::Ratio(r) => {
            state.write_u8(0x11);
            state.write(&r.numer().to_signed_bytes_le());
            state.write_u8(b'/');
            state.write(&r.denom().to_signed_bytes_le());
        }
        V::Double(d) => {
            state.write_u8(0x12);
            state.write_u64(canonical_f64_bits(*d));
        }
        V::BigFloat(b) => {
            state.write_u8(0x12);
            match exact_f64_of(b) {
                Some(d) => state.write_u64(canonical_f64_bits(d)),
                None => state.write(b.normalized().to_string().as_bytes()),
            }
        }
        _ => {}
    }
}

fn canonical_f64_bits(d: f64) -> u64 {
    if d == 0.0 {
        0f64.to_bits()
    } else if d.is_nan() {
        f64::NAN.to_bits()
    } else {
        d.to_bits()
    }
}

/// The double exactly denoting this big float, when one exists.
fn exact_f64_of(b: &BigDecimal) -> Option<f64> {
    let d = b.to_f64()?;
    match BigDecimal::from_f64(d) {
        Some(back) if back == *b => Some(d),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Arithmetic
// ---------------------------------------------------------------------------

fn not_a_number(val: &JesterVal) -> NumError {
    NumError::NotANumber {
        type_name: crate::types::type_of(val).name(),
    }
}

macro_rules! promote2 {
    ($a:expr, $b:expr,
     int: $int:expr, big: $big:expr, ratio: $ratio:expr,
     bigfloat: $bf:expr, double: $dbl:expr) => {{
        use JesterVal as V;
        let (a, b) = ($a, $b);
        if !is_number(a) {
            return Err(not_a_number(a));
        }
        if !is_number(b) {
            return Err(not_a_number(b));
        }
        if matches!(a, V::Double(_)) || matches!(b, V::Double(_)) {
            let (x, y) = (to_f64(a).unwrap_or(f64::NAN), to_f64(b).unwrap_or(f64::NAN));
            $dbl(x, y)
        } else if matches!(a, V::BigFloat(_)) || matches!(b, V::BigFloat(_)) {
            match (as_bigdecimal(a), as_bigdecimal(b)) {
                (Some(x), Some(y)) => $bf(x, y),
                _ => {
                    // Ratio meets big float: approximate through doubles.
                    let (x, y) =
                        (to_f64(a).unwrap_or(f64::NAN), to_f64(b).unwrap_or(f64::NAN));
                    $dbl(x, y)
                }
            }
        } else if matches!(a, V::Ratio(_)) || matches!(b, V::Ratio(_)) {
            let (x, y) = (
                as_rational(a).expect("exact number"),
                as_rational(b).expect("exact number"),
            );
            $ratio(x, y)
        } else if matches!(a, V::BigInt(_)) || matches!(b, V::BigInt(_)) {
            let (x, y) = (
                as_bigint(a).expect("integer"),
                as_bigint(b).expect("integer"),
            );
            $big(x, y)
        } else {
            match (a, b) {
                (V::Int(x), V::Int(y)) => $int(*x, *y),
                _ => unreachable!("integer case covers remaining kinds"),
            }
        }
    }};
}

/// Addition with promotion. Checked on `Int`.
pub fn add(a: &JesterVal, b: &JesterVal) -> NumResult {
    promote2!(a, b,
        int: |x: i64, y: i64| x
            .checked_add(y)
            .map(JesterVal::Int)
            .ok_or(NumError::IntegerOverflow { operation: "add" }),
        big: |x: BigInt, y: BigInt| Ok(JesterVal::BigInt(Rc::new(x + y))),
        ratio: |x: BigRational, y: BigRational| Ok(normalize_rational(x + y)),
        bigfloat: |x: BigDecimal, y: BigDecimal| Ok(JesterVal::BigFloat(Rc::new(x + y))),
        double: |x: f64, y: f64| Ok(JesterVal::Double(x + y)))
}

/// Subtraction with promotion. Checked on `Int`.
pub fn sub(a: &JesterVal, b: &JesterVal) -> NumResult {
    promote2!(a, b,
        int: |x: i64, y: i64| x
            .checked_sub(y)
            .map(JesterVal::Int)
            .ok_or(NumError::IntegerOverflow { operation: "subtract" }),
        big: |x: BigInt, y: BigInt| Ok(JesterVal::BigInt(Rc::new(x - y))),
        ratio: |x: BigRational, y: BigRational| Ok(normalize_rational(x - y)),
        bigfloat: |x: BigDecimal, y: BigDecimal| Ok(JesterVal::BigFloat(Rc::new(x - y))),
        double: |x: f64, y: f64| Ok(JesterVal::Double(x - y)))
}

/// Multiplication with promotion. Checked on `Int`.
pub fn mul(a: &JesterVal, b: &JesterVal) -> NumResult {
    promote2!(a, b,
        int: |x: i64, y: i64| x
            .checked_mul(y)
            .map(JesterVal::Int)
            .ok_or(NumError::IntegerOverflow { operation: "multiply" }),
        big: |x: BigInt, y: BigInt| Ok(JesterVal::BigInt(Rc::new(x * y))),
        ratio: |x: BigRational, y: BigRational| Ok(normalize_rational(x * y)),
        bigfloat: |x: BigDecimal, y: BigDecimal| Ok(JesterVal::BigFloat(Rc::new(x * y))),
        double: |x: f64, y: f64| Ok(JesterVal::Double(x * y)))
}

/// Division with promotion. Exact division of integers yields a ratio;
/// integer division by zero is an error; double division follows IEEE.
pub fn div(a: &JesterVal, b: &JesterVal) -> NumResult {
    promote2!(a, b,
        int: |x: i64, y: i64| {
            if y == 0 {
                return Err(NumError::DivisionByZero);
            }
            if x % y == 0 {
                // i64::MIN / -1 is the one quotient that overflows.
                x.checked_div(y)
                    .map(JesterVal::Int)
                    .ok_or(NumError::IntegerOverflow { operation: "divide" })
            } else {
                make_ratio(BigInt::from(x), BigInt::from(y))
            }
        },
        big: |x: BigInt, y: BigInt| {
            if y.is_zero() {
                return Err(NumError::DivisionByZero);
            }
            make_ratio(x, y)
        },
        ratio: |x: BigRational, y: BigRational| {
            if y.is_zero() {
                return Err(NumError::DivisionByZero);
            }
            Ok(normalize_rational(x / y))
        },
        bigfloat: |x: BigDecimal, y: BigDecimal| {
            if y.is_zero() {
                return Err(NumError::DivisionByZero);
            }
            Ok(JesterVal::BigFloat(Rc::new(x / y)))
        },
        double: |x: f64, y: f64| Ok(JesterVal::Double(x / y)))
}

/// Truncating quotient.
pub fn quot(a: &JesterVal, b: &JesterVal) -> NumResult {
    promote2!(a, b,
        int: |x: i64, y: i64| {
            if y == 0 {
                return Err(NumError::DivisionByZero);
            }
            x.checked_div(y)
                .map(JesterVal::Int)
                .ok_or(NumError::IntegerOverflow { operation: "quot" })
        },
        big: |x: BigInt, y: BigInt| {
            if y.is_zero() {
                return Err(NumError::DivisionByZero);
            }
            Ok(normalize_bigint(x / y))
        },
        ratio: |x: BigRational, y: BigRational| {
            if y.is_zero() {
                return Err(NumError::DivisionByZero);
            }
            Ok(normalize_rational((x / y).trunc()))
        },
        bigfloat: |x: BigDecimal, y: BigDecimal| {
            if y.is_zero() {
                return Err(NumError::DivisionByZero);
            }
            Ok(JesterVal::BigFloat(Rc::new((x / y).with_scale(0))))
        },
        double: |x: f64, y: f64| Ok(JesterVal::Double((x / y).trunc())))
}

/// Remainder, sign following the dividend.
pub fn rem(a: &JesterVal, b: &JesterVal) -> NumResult {
    promote2!(a, b,
        int: |x: i64, y: i64| {
            if y == 0 {
                return Err(NumError::DivisionByZero);
            }
            x.checked_rem(y)
                .map(JesterVal::Int)
                .ok_or(NumError::IntegerOverflow { operation: "rem" })
        },
        big: |x: BigInt, y: BigInt| {
            if y.is_zero() {
                return Err(NumError::DivisionByZero);
            }
            Ok(normalize_bigint(x % y))
        },
        ratio: |x: BigRational, y: BigRational| {
            if y.is_zero() {
                return Err(NumError::DivisionByZero);
            }
            let q = (x.clone() / y.clone()).trunc();
            Ok(normalize_rational(x - q * y))
        },
        bigfloat: |x: BigDecimal, y: BigDecimal| {
            if y.is_zero() {
                return Err(NumError::DivisionByZero);
            }
            Ok(JesterVal::BigFloat(Rc::new(x % y)))
        },
        double: |x: f64, y: f64| Ok(JesterVal::Double(x % y)))
}

/// Modulus, sign following the divisor.
pub fn modulo(a: &JesterVal, b: &JesterVal) -> NumResult {
    promote2!(a, b,
        int: |x: i64, y: i64| {
            if y == 0 {
                return Err(NumError::DivisionByZero);
            }
            Ok(JesterVal::Int(x.mod_floor(&y)))
        },
        big: |x: BigInt, y: BigInt| {
            if y.is_zero() {
                return Err(NumError::DivisionByZero);
            }
            Ok(normalize_bigint(x.mod_floor(&y)))
        },
        ratio: |x: BigRational, y: BigRational| {
            if y.is_zero() {
                return Err(NumError::DivisionByZero);
            }
            let q = (x.clone() / y.clone()).floor();
            Ok(normalize_rational(x - q * y))
        },
        bigfloat: |x: BigDecimal, y: BigDecimal| {
            if y.is_zero() {
                return Err(NumError::DivisionByZero);
            }
            let r = x % y.clone();
            if r.is_zero() || r.sign() == y.sign() {
                Ok(JesterVal::BigFloat(Rc::new(r)))
            } else {
                Ok(JesterVal::BigFloat(Rc::new(r + y)))
            }
        },
        double: |x: f64, y: f64| {
            let r = x % y;
            if r != 0.0 && r.signum() != y.signum() {
                Ok(JesterVal::Double(r + y))
            } else {
                Ok(JesterVal::Double(r))
            }
        })
}

/// Sign of a number: -1, 0 or 1. `None` for non-numbers and NaN.
#[must_use]
pub fn signum(val: &JesterVal) -> Option<i8> {
    use JesterVal as V;
    match val {
        V::Int(i) => Some(i.signum() as i8),
        V::Double(d) => {
            if d.is_nan() {
                None
            } else if *d > 0.0 {
                Some(1)
            } else if *d < 0.0 {
                Some(-1)
            } else {
                Some(0)
            }
        }
        V::BigInt(b) => Some(if b.is_zero() {
            0
        } else if b.is_positive() {
            1
        } else {
            -1
        }),
        V::BigFloat(b) => Some(if b.is_zero() {
            0
        } else if b.is_positive() {
            1
        } else {
            -1
        }),
        V::Ratio(r) => Some(if r.is_zero() {
            0
        } else if r.is_positive() {
            1
        } else {
            -1
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn int(i: i64) -> JesterVal {
        JesterVal::Int(i)
    }

    fn big(s: &str) -> JesterVal {
        JesterVal::BigInt(Rc::new(BigInt::from_str(s).unwrap()))
    }

    #[test]
    fn test_int_add() {
        assert_eq!(add(&int(1), &int(2)).unwrap(), int(3));
    }

    #[test]
    fn test_int_overflow_errors() {
        let err = add(&int(i64::MAX), &int(1)).unwrap_err();
        assert!(matches!(err, NumError::IntegerOverflow { .. }));
    }

    #[test]
    fn test_division_produces_ratio() {
        let r = div(&int(1), &int(2)).unwrap();
        assert!(matches!(r, JesterVal::Ratio(_)));
        // 4/2 collapses to an integer.
        assert_eq!(div(&int(4), &int(2)).unwrap(), int(2));
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(div(&int(1), &int(0)).unwrap_err(), NumError::DivisionByZero);
        // Double division follows IEEE.
        let inf = div(&JesterVal::Double(1.0), &JesterVal::Double(0.0)).unwrap();
        assert!(matches!(inf, JesterVal::Double(d) if d.is_infinite()));
    }

    #[test]
    fn test_cross_kind_equality() {
        assert!(num_eq(&int(5), &big("5")));
        assert!(!num_eq(&int(5), &JesterVal::Double(5.0)));
        assert!(num_equiv(&int(5), &JesterVal::Double(5.0)));
    }

    #[test]
    fn test_ratio_normalisation() {
        assert_eq!(
            make_ratio(BigInt::from(6), BigInt::from(3)).unwrap(),
            int(2)
        );
        let half = make_ratio(BigInt::from(1), BigInt::from(2)).unwrap();
        let other = make_ratio(BigInt::from(2), BigInt::from(4)).unwrap();
        assert!(num_eq(&half, &other));
    }

    #[test]
    fn test_compare_across_kinds() {
        assert_eq!(num_compare(&int(1), &big("2")), Some(Ordering::Less));
        assert_eq!(
            num_compare(&JesterVal::Double(1.5), &int(1)),
            Some(Ordering::Greater)
        );
        let half = make_ratio(BigInt::from(1), BigInt::from(2)).unwrap();
        assert_eq!(num_compare(&half, &int(1)), Some(Ordering::Less));
    }

    #[test]
    fn test_mod_follows_divisor_sign() {
        assert_eq!(modulo(&int(-7), &int(3)).unwrap(), int(2));
        assert_eq!(rem(&int(-7), &int(3)).unwrap(), int(-1));
    }
}
