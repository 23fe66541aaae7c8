//! Correctly rounded conversion between decimal byte strings and IEEE-754
//! binary floating point.
//!
//! The crate exposes two operations over contiguous byte buffers:
//! [`parse_float`] decodes decimal or `0x`-prefixed hexadecimal text into the
//! nearest binary32 or binary64 value (ties to even), and [`format_float`] /
//! [`append_float`] encode a value back, producing the shortest decimal
//! representation that round-trips, or a fixed precision on request.
//!
//! Parsing runs through a ladder of strategies: exact float arithmetic for
//! short inputs, extended-precision arithmetic with a certified error bound,
//! and a fixed-capacity decimal big number as the authority. All three agree
//! bit for bit wherever the cheaper ones apply.
//!
//! ```
//! let v = bytefloat::parse_float(b"625e-3", 64).unwrap();
//! assert_eq!(v, 0.625);
//! assert_eq!(bytefloat::format_float(v, b'g', -1, 64), b"0.625");
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod constants;
mod decimal;
mod error;
mod extfloat;
mod str;

pub use crate::error::{Error, ErrorKind};

use alloc::vec::Vec;
use core::sync::atomic::{AtomicBool, Ordering};

// Test hook forcing every conversion through the big-decimal path. The
// observable results must not depend on it.
static OPTIMIZE: AtomicBool = AtomicBool::new(true);

/// Enables or disables the fast and extended-float conversion paths,
/// returning the previous setting. This is a testing aid: results are
/// identical either way, only slower with the paths disabled. Tests that
/// flip it should serialize among themselves and restore the old value.
pub fn set_optimize(on: bool) -> bool {
    OPTIMIZE.swap(on, Ordering::Relaxed)
}

pub(crate) fn optimize() -> bool {
    OPTIMIZE.load(Ordering::Relaxed)
}

/// Converts the byte string `s` to a floating-point value with the precision
/// of `bit_size` (32 or 64; anything else means 64).
///
/// The result is always returned widened to an `f64`, but for `bit_size` 32
/// it is exactly representable in an `f32`. `s` must be well formed in its
/// entirety: an optional sign, decimal digits with an optional point and
/// `e`/`E` exponent, a `0x` hexadecimal float with a mandatory `p` exponent,
/// or a case-insensitive `NaN`, `Inf`, or `Infinity`.
///
/// A value larger than the largest finite value returns a [`ErrorKind::Range`]
/// error whose [`Error::value`] is ±infinity; a value too small for the
/// smallest subnormal quietly parses as ±0.
///
/// ```
/// assert_eq!(bytefloat::parse_float(b"1e23", 64).unwrap(), 1e23);
///
/// let err = bytefloat::parse_float(b"1e999", 64).unwrap_err();
/// assert_eq!(err.kind(), bytefloat::ErrorKind::Range);
/// assert_eq!(err.value(), f64::INFINITY);
/// ```
pub fn parse_float(s: &[u8], bit_size: u32) -> Result<f64, Error> {
    crate::str::parse_float(s, bit_size)
}

/// Converts `val` to a decimal byte string according to the verb `fmt` and
/// precision `prec`, rounding as if `val` had the precision of `bit_size`
/// (32 or 64; anything else panics).
///
/// Verbs: `b'b'` for `mantissa p exponent`, `b'e'`/`b'E'` for scientific
/// notation, `b'f'` for plain positional notation, and `b'g'`/`b'G'` which
/// pick between them by magnitude. Precision `-1` requests the fewest digits
/// that parse back to `val` exactly.
///
/// ```
/// assert_eq!(bytefloat::format_float(1e23, b'g', -1, 64), b"1e+23");
/// assert_eq!(bytefloat::format_float(0.5, b'f', 3, 64), b"0.500");
/// ```
pub fn format_float(val: f64, fmt: u8, prec: i32, bit_size: u32) -> Vec<u8> {
    crate::str::format_float(val, fmt, prec, bit_size)
}

/// Like [`format_float`], but appends to `dst` instead of allocating a fresh
/// buffer.
pub fn append_float(dst: &mut Vec<u8>, val: f64, fmt: u8, prec: i32, bit_size: u32) {
    crate::str::append_float(dst, val, fmt, prec, bit_size)
}
