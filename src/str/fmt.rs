//! Binary-to-decimal formatting. The shortest mode searches for the fewest
//! digits that still parse back to the same float, using the extended-float
//! generator with a big-decimal certification fallback; the fixed-precision
//! modes round the big decimal to the requested digit count. Digit assembly
//! is shared by every verb.

use alloc::vec::Vec;
use core::cmp::{max, min};

use crate::constants::{FloatInfo, F32_INFO, F64_INFO};
use crate::decimal::Decimal;
use crate::extfloat::{ExtFloat, ShortDigits};
use crate::optimize;

/// A borrowed run of decimal digits; the value is `0.d[..nd] * 10^dp`.
struct DigitSlice<'a> {
    d: &'a [u8],
    nd: usize,
    dp: i32,
}

pub(crate) fn format_float(val: f64, fmt: u8, prec: i32, bit_size: u32) -> Vec<u8> {
    let mut dst = Vec::with_capacity(max(prec, 0) as usize + 24);
    append_float(&mut dst, val, fmt, prec, bit_size);
    dst
}

pub(crate) fn append_float(dst: &mut Vec<u8>, val: f64, fmt: u8, prec: i32, bit_size: u32) {
    let (bits, flt) = match bit_size {
        32 => (u64::from((val as f32).to_bits()), &F32_INFO),
        64 => (val.to_bits(), &F64_INFO),
        _ => panic!("bytefloat: illegal append_float/format_float bit size {bit_size}"),
    };

    let neg = bits >> (flt.expbits + flt.mantbits) != 0;
    let mut exp = ((bits >> flt.mantbits) & ((1 << flt.expbits) - 1)) as i32;
    let mut mant = bits & ((1u64 << flt.mantbits) - 1);

    if exp == (1 << flt.expbits) - 1 {
        // Inf, NaN
        let s: &[u8] = if mant != 0 {
            b"NaN"
        } else if neg {
            b"-Inf"
        } else {
            b"+Inf"
        };
        dst.extend_from_slice(s);
        return;
    }
    if exp == 0 {
        // denormalized
        exp += 1;
    } else {
        // add implicit top bit
        mant |= 1 << flt.mantbits;
    }
    exp += flt.bias;

    // Pick off the easy binary format.
    if fmt == b'b' {
        fmt_b(dst, neg, mant, exp, flt);
        return;
    }

    let shortest = prec < 0;
    if shortest && optimize() {
        // Search for the shortest digits with extended-float arithmetic; it
        // reports failure whenever the last digit cannot be certified.
        let mut f = ExtFloat::default();
        let (mut lower, mut upper) = f.assign_compute_bounds(mant, exp, flt);
        let mut digs = ShortDigits::new();
        if f.shortest_decimal(&mut digs, &mut lower, &mut upper) {
            let nd = digs.d.len();
            let prec = match fmt {
                b'e' | b'E' => max(nd as i32 - 1, 0),
                b'f' => max(nd as i32 - digs.dp, 0),
                _ => nd as i32,
            };
            let slice = DigitSlice {
                d: &digs.d[..],
                nd,
                dp: digs.dp,
            };
            format_digits(dst, true, neg, slice, prec, fmt);
            return;
        }
    }
    big_ftoa(dst, prec, fmt, neg, mant, exp, flt);
}

// The authoritative formatter: load the mantissa into a big decimal, scale
// by the binary exponent, and round to whatever the verb asks for.
fn big_ftoa(dst: &mut Vec<u8>, prec: i32, fmt: u8, neg: bool, mant: u64, exp: i32, flt: &FloatInfo) {
    let mut d = Decimal::new();
    d.assign(mant);
    d.shift(exp - flt.mantbits as i32);

    let shortest = prec < 0;
    let prec = if shortest {
        round_shortest(&mut d, mant, exp, flt);
        match fmt {
            b'e' | b'E' => d.nd as i32 - 1,
            b'f' => max(d.nd as i32 - d.dp, 0),
            _ => d.nd as i32,
        }
    } else {
        match fmt {
            b'e' | b'E' => {
                d.round(prec + 1);
                prec
            }
            b'f' => {
                d.round(d.dp + prec);
                prec
            }
            b'g' | b'G' => {
                let p = if prec == 0 { 1 } else { prec };
                d.round(p);
                p
            }
            _ => prec,
        }
    };
    let slice = DigitSlice {
        d: &d.d[..d.nd],
        nd: d.nd,
        dp: d.dp,
    };
    format_digits(dst, shortest, neg, slice, prec, fmt);
}

// Trims the big decimal to the fewest digits that still parse back to the
// original float, by comparing against the halfway points to its neighbors.
fn round_shortest(d: &mut Decimal, mant: u64, exp: i32, flt: &FloatInfo) {
    if mant == 0 {
        // zero
        d.nd = 0;
        return;
    }

    // Suppose d is not denormal, so 2^exp <= d < 10^dp. The closest shorter
    // number is at least 10^(dp-nd) away, while the bounds below sit at
    // distance at most 2^(exp-mantbits). So the number is already shortest
    // when 10^(dp-nd) > 2^(exp-mantbits), i.e. log2(10)*(dp-nd) is greater
    // than exp-mantbits (and log2(10) > 332/100).
    let minexp = flt.bias + 1; // minimum possible exponent
    if exp > minexp && 332 * (d.dp - d.nd as i32) >= 100 * (exp - flt.mantbits as i32) {
        return;
    }

    // d = mant << (exp - mantbits); the next highest float is mant+1 at the
    // same exponent, and the upper bound is halfway to it.
    let mut upper = Decimal::new();
    upper.assign(mant * 2 + 1);
    upper.shift(exp - flt.mantbits as i32 - 1);

    // The next lowest float drops the significant bit when mant is the
    // minimum mantissa and exp is not minimal, so the lattice step halves
    // just below a power of two.
    let (mantlo, explo) = if mant > 1 << flt.mantbits || exp == minexp {
        (mant - 1, exp)
    } else {
        (mant * 2 - 1, exp - 1)
    };
    let mut lower = Decimal::new();
    lower.assign(mantlo * 2 + 1);
    lower.shift(explo - flt.mantbits as i32 - 1);

    // The bounds themselves are admissible outputs only if the original
    // mantissa is even, so that round-to-even maps them back to it.
    let inclusive = mant % 2 == 0;

    // Walk digits until d has distinguished itself from upper and lower.
    let mut ui = 0i32;
    loop {
        // The three decimal points need not be aligned; upper is the
        // longest, so iterate from ui == 0 with li and mi starting possibly
        // at -1.
        let mi = ui - upper.dp + d.dp;
        if mi >= d.nd as i32 {
            return;
        }
        let li = ui - upper.dp + lower.dp;
        let l = if li >= 0 && (li as usize) < lower.nd {
            lower.d[li as usize]
        } else {
            0
        };
        let m = if mi >= 0 { d.d[mi as usize] } else { 0 };
        let u = if (ui as usize) < upper.nd {
            upper.d[ui as usize]
        } else {
            0
        };

        // Okay to round down (truncate) if lower has a different digit or if
        // lower is inclusive and is exactly the result of rounding down
        // (i.e., we have reached the final digit of lower).
        let okdown = l != m || inclusive && li + 1 == lower.nd as i32;

        // Okay to round up if upper has a different digit and either upper
        // is inclusive or upper is bigger than the result of rounding up.
        let okup = m != u && (inclusive || m + 1 < u || ui + 1 < upper.nd as i32);

        // If both work, round to the nearest; otherwise do the one that does.
        if okdown && okup {
            d.round(mi + 1);
            return;
        } else if okdown {
            d.round_down(mi + 1);
            return;
        } else if okup {
            d.round_up(mi + 1);
            return;
        }
        ui += 1;
    }
}

fn format_digits(dst: &mut Vec<u8>, shortest: bool, neg: bool, digs: DigitSlice<'_>, prec: i32, fmt: u8) {
    match fmt {
        b'e' | b'E' => fmt_e(dst, neg, &digs, prec, fmt),
        b'f' => fmt_f(dst, neg, &digs, prec),
        b'g' | b'G' => {
            // trailing fractional zeros in 'e' form will be trimmed.
            let mut eprec = prec;
            if eprec > digs.nd as i32 && digs.nd as i32 >= digs.dp {
                eprec = digs.nd as i32;
            }
            // %e is used if the exponent from the conversion is less than -4
            // or at least the precision; for the shortest representation the
            // threshold precision is 6.
            if shortest {
                eprec = 6;
            }
            let exp = digs.dp - 1;
            if exp < -4 || exp >= eprec {
                let prec = min(prec, digs.nd as i32);
                fmt_e(dst, neg, &digs, prec - 1, fmt + b'e' - b'g');
                return;
            }
            let prec = if prec > digs.dp { digs.nd as i32 } else { prec };
            fmt_f(dst, neg, &digs, max(prec - digs.dp, 0));
        }
        _ => {
            // unknown format
            dst.push(b'%');
            dst.push(fmt);
        }
    }
}

// %e: d.ddddde±dd
fn fmt_e(dst: &mut Vec<u8>, neg: bool, d: &DigitSlice<'_>, prec: i32, fmt: u8) {
    // sign
    if neg {
        dst.push(b'-');
    }

    // first digit
    let first = if d.nd != 0 { d.d[0] } else { 0 };
    dst.push(b'0' + first);

    // .moredigits
    if prec > 0 {
        dst.push(b'.');
        let mut i = 1usize;
        let m = min(d.nd, prec as usize + 1);
        while i < m {
            dst.push(b'0' + d.d[i]);
            i += 1;
        }
        while i <= prec as usize {
            dst.push(b'0');
            i += 1;
        }
    }

    // e±
    dst.push(fmt);
    let mut exp = d.dp - 1;
    if d.nd == 0 {
        // special case: 0 has exponent 0
        exp = 0;
    }
    if exp < 0 {
        dst.push(b'-');
        exp = -exp;
    } else {
        dst.push(b'+');
    }

    // dd or ddd
    if exp < 10 {
        dst.push(b'0');
        dst.push(b'0' + exp as u8);
    } else if exp < 100 {
        dst.push(b'0' + (exp / 10) as u8);
        dst.push(b'0' + (exp % 10) as u8);
    } else {
        dst.push(b'0' + (exp / 100) as u8);
        dst.push(b'0' + (exp / 10 % 10) as u8);
        dst.push(b'0' + (exp % 10) as u8);
    }
}

// %f: ddddddd.ddddd
fn fmt_f(dst: &mut Vec<u8>, neg: bool, d: &DigitSlice<'_>, prec: i32) {
    // sign
    if neg {
        dst.push(b'-');
    }

    // integer, padded with zeros as needed.
    if d.dp > 0 {
        let m = min(d.nd, d.dp as usize);
        for &digit in &d.d[..m] {
            dst.push(b'0' + digit);
        }
        for _ in m..d.dp as usize {
            dst.push(b'0');
        }
    } else {
        dst.push(b'0');
    }

    // fraction
    if prec > 0 {
        dst.push(b'.');
        for i in 0..prec {
            let j = d.dp + i;
            let digit = if 0 <= j && (j as usize) < d.nd {
                d.d[j as usize]
            } else {
                0
            };
            dst.push(b'0' + digit);
        }
    }
}

// %b: decimal mantissa, 'p', then the raw binary exponent.
fn fmt_b(dst: &mut Vec<u8>, neg: bool, mant: u64, exp: i32, flt: &FloatInfo) {
    if neg {
        dst.push(b'-');
    }
    append_u64(dst, mant);
    dst.push(b'p');
    let exp = exp - flt.mantbits as i32;
    if exp >= 0 {
        dst.push(b'+');
        append_u64(dst, exp as u64);
    } else {
        dst.push(b'-');
        append_u64(dst, u64::from(exp.unsigned_abs()));
    }
}

fn append_u64(dst: &mut Vec<u8>, v: u64) {
    let mut buf = [0u8; 20];
    let mut i = buf.len();
    let mut v = v;
    loop {
        i -= 1;
        buf[i] = b'0' + (v % 10) as u8;
        v /= 10;
        if v == 0 {
            break;
        }
    }
    dst.extend_from_slice(&buf[i..]);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(val: f64, fmt_ch: u8, prec: i32) -> alloc::string::String {
        alloc::string::String::from_utf8(format_float(val, fmt_ch, prec, 64)).unwrap()
    }

    #[test]
    fn it_formats_the_binary_verb() {
        assert_eq!(fmt(1.0, b'b', -1), "4503599627370496p-52");
        assert_eq!(fmt(-1.0, b'b', -1), "-4503599627370496p-52");
        assert_eq!(fmt(5e-324, b'b', -1), "1p-1074");
        assert_eq!(fmt(f64::MAX, b'b', -1), "9007199254740991p+971");
    }

    #[test]
    fn it_renders_specials() {
        assert_eq!(fmt(f64::NAN, b'g', -1), "NaN");
        assert_eq!(fmt(f64::INFINITY, b'g', -1), "+Inf");
        assert_eq!(fmt(f64::NEG_INFINITY, b'g', -1), "-Inf");
        assert_eq!(fmt(-0.0, b'g', -1), "-0");
        assert_eq!(fmt(0.0, b'g', -1), "0");
    }

    #[test]
    fn it_pads_fixed_precision_with_zeros() {
        assert_eq!(fmt(0.0, b'e', 5), "0.00000e+00");
        assert_eq!(fmt(0.0, b'f', 5), "0.00000");
        assert_eq!(fmt(1.0, b'e', 5), "1.00000e+00");
        assert_eq!(fmt(12.0, b'f', 5), "12.00000");
        assert_eq!(fmt(1.2345e6, b'f', 5), "1234500.00000");
    }

    #[test]
    fn it_escapes_unknown_verbs() {
        assert_eq!(fmt(1.0, b'z', -1), "%z");
    }

    #[test]
    fn it_appends_after_existing_bytes() {
        let mut buf = Vec::from(&b"x="[..]);
        append_float(&mut buf, 0.625, b'g', -1, 64);
        assert_eq!(buf, b"x=0.625");
    }

    #[test]
    #[should_panic(expected = "bit size")]
    fn it_rejects_other_bit_sizes() {
        format_float(1.0, b'g', -1, 16);
    }
}
