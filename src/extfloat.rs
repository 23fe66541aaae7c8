//! Extended-precision floating point: a 64-bit mantissa and a binary
//! exponent, representing `mant * 2^exp`. This is the mid parsing path (a
//! tabulated powers-of-ten multiply with an explicit error budget) and the
//! digit generator behind the shortest formatting mode. Both certify their
//! own rounding and fail over to the decimal big number when they cannot.

use crate::constants::{FloatInfo, MAX_MANTISSA_DIGITS, U64_POW10};
use crate::decimal::assemble_bits;
use arrayvec::ArrayVec;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct ExtFloat {
    pub(crate) mant: u64,
    pub(crate) exp: i32,
}

/// Digits produced by the shortest-decimal search; the value is
/// `0.d[..] * 10^dp`.
pub(crate) struct ShortDigits {
    pub(crate) d: ArrayVec<u8, 32>,
    pub(crate) dp: i32,
}

impl ShortDigits {
    pub(crate) fn new() -> ShortDigits {
        ShortDigits {
            d: ArrayVec::new(),
            dp: 0,
        }
    }
}

impl ExtFloat {
    /// Shifts the mantissa until its top bit is set; returns the shift.
    pub(crate) fn normalize(&mut self) -> u32 {
        if self.mant == 0 {
            return 0;
        }
        let shift = self.mant.leading_zeros();
        self.mant <<= shift;
        self.exp -= shift as i32;
        shift
    }

    /// Sets `self` to `self * g`, rounding the 128-bit product to its top
    /// 64 bits.
    pub(crate) fn mult(&mut self, g: ExtFloat) {
        let p = u128::from(self.mant) * u128::from(g.mant);
        self.mant = ((p + (1u128 << 63)) >> 64) as u64;
        self.exp += g.exp + 64;
    }

    /// Sets `self` to `mantissa * 10^exp10` approximately, tracking an upper
    /// bound on the accumulated error in eighths of a ULP. Returns false when
    /// the error could change how the mantissa rounds at the precision of
    /// `flt`, in which case the caller must use the authoritative path.
    pub(crate) fn assign_decimal(
        &mut self,
        mantissa: u64,
        exp10: i32,
        trunc: bool,
        flt: &FloatInfo,
    ) -> bool {
        const ERROR_SCALE: i32 = 8;
        let mut errors: i32 = 0;
        if trunc {
            errors += ERROR_SCALE / 2;
        }

        self.mant = mantissa;
        self.exp = 0;

        if exp10 < EXP10_FIRST || exp10 >= EXP10_FIRST + POWERS_OF_TEN.len() as i32 * EXP10_STEP {
            return false;
        }
        let i = ((exp10 - EXP10_FIRST) / EXP10_STEP) as usize;
        let adj_exp = ((exp10 - EXP10_FIRST) % EXP10_STEP) as usize;

        // Multiply by 10^(exp10 % step) first.
        if adj_exp < MAX_MANTISSA_DIGITS && mantissa < U64_POW10[MAX_MANTISSA_DIGITS - adj_exp] {
            // Small enough to multiply the mantissa exactly.
            self.mant *= U64_POW10[adj_exp];
            self.normalize();
        } else {
            self.normalize();
            self.mult(SMALL_POWERS_OF_TEN[adj_exp]);
            errors += ERROR_SCALE / 2;
        }

        // Then by the tabulated 10^(exp10 - exp10 % step).
        self.mult(POWERS_OF_TEN[i]);
        if errors > 0 {
            errors += 1;
        }
        errors += ERROR_SCALE / 2;

        let shift = self.normalize();
        errors <<= shift;

        // The 64-bit mantissa holds 1 + mantbits result bits plus extra bits
        // below the target precision (more when the result is subnormal). If
        // perturbing the mantissa by the error estimate crosses the rounding
        // boundary in those extra bits, we cannot tell which way to round.
        let denormal_exp = flt.bias - 63;
        let extra_bits = if self.exp <= denormal_exp {
            63 - flt.mantbits as i32 + 1 + (denormal_exp - self.exp)
        } else {
            63 - flt.mantbits as i32
        };

        let halfway = if extra_bits - 1 >= 64 {
            0
        } else {
            1u64 << (extra_bits - 1)
        };
        let mask = if extra_bits >= 64 {
            u64::MAX
        } else {
            (1u64 << extra_bits) - 1
        };
        let mant_extra = self.mant & mask;

        // Signed comparison: errors can push the extra bits across zero.
        if (halfway as i64) - i64::from(errors) < (mant_extra as i64)
            && (mant_extra as i64) < (halfway as i64) + i64::from(errors)
        {
            return false;
        }
        true
    }

    /// Rounds to the precision of `flt` and assembles the IEEE bit pattern.
    /// The second return is true on overflow to infinity.
    pub(crate) fn float_bits(&mut self, flt: &FloatInfo, neg: bool) -> (u64, bool) {
        self.normalize();

        let mut exp = self.exp + 63;

        // Exponent too small: shift the mantissa into subnormal position.
        if exp < flt.bias + 1 {
            let n = flt.bias + 1 - exp;
            if n >= 64 {
                self.mant = 0;
            } else {
                self.mant >>= n;
            }
            exp += n;
        }

        // Extract 1 + mantbits bits from the 64-bit mantissa.
        let mut mant = self.mant >> (63 - flt.mantbits);
        if self.mant & (1 << (62 - flt.mantbits)) != 0 {
            mant += 1;
        }

        // Rounding might have added a bit; shift down.
        if mant == 2 << flt.mantbits {
            mant >>= 1;
            exp += 1;
        }

        let mut overflow = false;
        if exp - flt.bias >= (1 << flt.expbits) - 1 {
            // ±Inf
            mant = 0;
            exp = (1 << flt.expbits) - 1 + flt.bias;
            overflow = true;
        } else if mant & (1 << flt.mantbits) == 0 {
            // Denormalized?
            exp = flt.bias;
        }
        (assemble_bits(flt, mant, exp, neg), overflow)
    }

    /// Decodes `mant * 2^(exp - mantbits)` and computes the halfway points to
    /// the neighboring floats. The lower distance is halved at the minimum
    /// mantissa, where the lattice step shrinks below a power of two. An
    /// exactly integral value returns itself as both bounds.
    pub(crate) fn assign_compute_bounds(
        &mut self,
        mant: u64,
        exp: i32,
        flt: &FloatInfo,
    ) -> (ExtFloat, ExtFloat) {
        self.mant = mant;
        self.exp = exp - flt.mantbits as i32;
        if self.exp <= 0 {
            let shift = (-self.exp) as u32;
            let exact = if shift >= 64 {
                mant == 0
            } else {
                mant == (mant >> shift) << shift
            };
            if exact {
                self.mant = if shift >= 64 { 0 } else { mant >> shift };
                self.exp = 0;
                return (*self, *self);
            }
        }
        let exp_biased = exp - flt.bias;

        let upper = ExtFloat {
            mant: 2 * self.mant + 1,
            exp: self.exp - 1,
        };
        let lower = if mant != 1 << flt.mantbits || exp_biased == 1 {
            ExtFloat {
                mant: 2 * self.mant - 1,
                exp: self.exp - 1,
            }
        } else {
            ExtFloat {
                mant: 4 * self.mant - 1,
                exp: self.exp - 2,
            }
        };
        (lower, upper)
    }

    // Multiplies by a tabulated power of ten so that the binary exponent
    // lands in [-60, -32], leaving a small integral part whose digits are
    // cheap to extract. Returns the decimal exponent applied (negated) and
    // the table index used.
    fn frexp10(&mut self) -> (i32, usize) {
        const EXP_MIN: i32 = -60;
        const EXP_MAX: i32 = -32;
        // log(10)/log(2) is close to 93/28.
        let approx_exp10 = ((EXP_MIN + EXP_MAX) / 2 - self.exp) * 28 / 93;
        let mut i = ((approx_exp10 - EXP10_FIRST) / EXP10_STEP) as usize;
        loop {
            let exp = self.exp + POWERS_OF_TEN[i].exp + 64;
            if exp < EXP_MIN {
                i += 1;
            } else if exp > EXP_MAX {
                i -= 1;
            } else {
                break;
            }
        }
        self.mult(POWERS_OF_TEN[i]);
        (-(EXP10_FIRST + i as i32 * EXP10_STEP), i)
    }

    /// Emits the fewest digits that identify the float bracketed by `lower`
    /// and `upper`, or returns false when the last digit cannot be certified
    /// against the rounding slack.
    pub(crate) fn shortest_decimal(
        &mut self,
        d: &mut ShortDigits,
        lower: &mut ExtFloat,
        upper: &mut ExtFloat,
    ) -> bool {
        if self.mant == 0 {
            d.d.clear();
            d.dp = 0;
            return true;
        }
        if self.exp == 0 && *lower == *self && *lower == *upper {
            // An exact integer: emit its digits, dropping trailing zeros.
            let mut buf = [0u8; 24];
            let mut n = buf.len();
            let mut v = self.mant;
            while v > 0 {
                n -= 1;
                buf[n] = (v % 10) as u8;
                v /= 10;
            }
            d.d.clear();
            d.d.extend(buf[n..].iter().copied());
            d.dp = d.d.len() as i32;
            while let Some(&0) = d.d.last() {
                d.d.pop();
            }
            if d.d.is_empty() {
                d.dp = 0;
            }
            return true;
        }
        upper.normalize();
        // Uniformize exponents.
        if self.exp > upper.exp {
            self.mant <<= (self.exp - upper.exp) as u32;
            self.exp = upper.exp;
        }
        if lower.exp > upper.exp {
            lower.mant <<= (lower.exp - upper.exp) as u32;
            lower.exp = upper.exp;
        }

        let exp10 = frexp10_many(lower, self, upper);
        // Take a safety margin for the rounding of frexp10_many, at the cost
        // of a little precision.
        upper.mant += 1;
        lower.mant -= 1;

        // The shortest representation is a truncation of upper.
        let shift = (-upper.exp) as u32;
        let mut integer = (upper.mant >> shift) as u32;
        let fraction = upper.mant - (u64::from(integer) << shift);

        // How far we can go down from upper until the result is wrong.
        let allowance = upper.mant - lower.mant;
        // How far we should go to get a very precise result.
        let target_diff = upper.mant - self.mant;

        // Count integral digits: there are at most 10.
        let mut integer_digits = 0usize;
        let mut pow = 1u64;
        for i in 0..20 {
            if pow > u64::from(integer) {
                integer_digits = i;
                break;
            }
            pow *= 10;
        }

        d.d.clear();
        for i in 0..integer_digits {
            let p = U64_POW10[integer_digits - i - 1];
            let digit = u64::from(integer) / p;
            d.d.push(digit as u8);
            integer -= (digit * p) as u32;
            let current_diff = (u64::from(integer) << shift) + fraction;
            if current_diff < allowance {
                d.dp = integer_digits as i32 + exp10;
                // Sometimes the allowance is so large the last digit must be
                // decremented to get closer to the target.
                return adjust_last_digit(d, current_diff, target_diff, allowance, p << shift, 2);
            }
        }
        d.dp = integer_digits as i32 + exp10;

        // Compute digits of the fractional part. At each step fraction stays
        // below 2^60, so the multiplications cannot overflow.
        let mut fraction = fraction;
        let mut multiplier = 1u64;
        loop {
            fraction *= 10;
            multiplier *= 10;
            let digit = fraction >> shift;
            d.d.push(digit as u8);
            fraction -= digit << shift;
            if fraction < allowance * multiplier {
                // In the admissible range; if allowance were about to
                // overflow, the bounded fraction makes this true first.
                return adjust_last_digit(
                    d,
                    fraction,
                    target_diff * multiplier,
                    allowance * multiplier,
                    1 << shift,
                    multiplier * 2,
                );
            }
        }
    }
}

fn frexp10_many(lower: &mut ExtFloat, f: &mut ExtFloat, upper: &mut ExtFloat) -> i32 {
    let (exp10, i) = upper.frexp10();
    lower.mult(POWERS_OF_TEN[i]);
    f.mult(POWERS_OF_TEN[i]);
    exp10
}

// Nudges the last emitted digit toward the target and verifies that the
// result stays certifiably inside (lower, upper) despite the binary rounding
// slack; false means the digits cannot be trusted.
fn adjust_last_digit(
    d: &mut ShortDigits,
    mut current_diff: u64,
    target_diff: u64,
    max_diff: u64,
    ulp_decimal: u64,
    ulp_binary: u64,
) -> bool {
    if ulp_decimal < 2 * ulp_binary {
        // Approximation is too wide.
        return false;
    }
    while current_diff + ulp_decimal / 2 + ulp_binary < target_diff {
        let last = d.d.len() - 1;
        d.d[last] -= 1;
        current_diff += ulp_decimal;
    }
    if current_diff + ulp_decimal <= target_diff + ulp_decimal / 2 + ulp_binary {
        // We have two choices and don't know which is right.
        return false;
    }
    if current_diff < ulp_binary || current_diff > max_diff - ulp_binary {
        // We went too far.
        return false;
    }
    if d.d.len() == 1 && d.d[0] == 0 {
        // The number has actually reached zero.
        d.d.clear();
        d.dp = 0;
    }
    true
}

const EXP10_FIRST: i32 = -348;
const EXP10_STEP: i32 = 8;

// Exact representations of 10^k for small k.
const SMALL_POWERS_OF_TEN: [ExtFloat; 8] = [
    ExtFloat { mant: 0x8000000000000000, exp: -63 }, // 1e0
    ExtFloat { mant: 0xa000000000000000, exp: -60 }, // 1e1
    ExtFloat { mant: 0xc800000000000000, exp: -57 }, // 1e2
    ExtFloat { mant: 0xfa00000000000000, exp: -54 }, // 1e3
    ExtFloat { mant: 0x9c40000000000000, exp: -50 }, // 1e4
    ExtFloat { mant: 0xc350000000000000, exp: -47 }, // 1e5
    ExtFloat { mant: 0xf424000000000000, exp: -44 }, // 1e6
    ExtFloat { mant: 0x9896800000000000, exp: -40 }, // 1e7
];

// Normalized representations of 10^k for k from -348 to 340, stepping by 8,
// each correct to better than one unit in the last mantissa bit.
const POWERS_OF_TEN: [ExtFloat; 87] = [
    ExtFloat { mant: 0xfa8fd5a0081c0288, exp: -1220 }, // 1e-348
    ExtFloat { mant: 0xbaaee17fa23ebf76, exp: -1193 }, // 1e-340
    ExtFloat { mant: 0x8b16fb203055ac76, exp: -1166 }, // 1e-332
    ExtFloat { mant: 0xcf42894a5dce35ea, exp: -1140 }, // 1e-324
    ExtFloat { mant: 0x9a6bb0aa55653b2d, exp: -1113 }, // 1e-316
    ExtFloat { mant: 0xe61acf033d1a45df, exp: -1087 }, // 1e-308
    ExtFloat { mant: 0xab70fe17c79ac6ca, exp: -1060 }, // 1e-300
    ExtFloat { mant: 0xff77b1fcbebcdc4f, exp: -1034 }, // 1e-292
    ExtFloat { mant: 0xbe5691ef416bd60c, exp: -1007 }, // 1e-284
    ExtFloat { mant: 0x8dd01fad907ffc3c, exp: -980 },  // 1e-276
    ExtFloat { mant: 0xd3515c2831559a83, exp: -954 },  // 1e-268
    ExtFloat { mant: 0x9d71ac8fada6c9b5, exp: -927 },  // 1e-260
    ExtFloat { mant: 0xea9c227723ee8bcb, exp: -901 },  // 1e-252
    ExtFloat { mant: 0xaecc49914078536d, exp: -874 },  // 1e-244
    ExtFloat { mant: 0x823c12795db6ce57, exp: -847 },  // 1e-236
    ExtFloat { mant: 0xc21094364dfb5637, exp: -821 },  // 1e-228
    ExtFloat { mant: 0x9096ea6f3848984f, exp: -794 },  // 1e-220
    ExtFloat { mant: 0xd77485cb25823ac7, exp: -768 },  // 1e-212
    ExtFloat { mant: 0xa086cfcd97bf97f4, exp: -741 },  // 1e-204
    ExtFloat { mant: 0xef340a98172aace5, exp: -715 },  // 1e-196
    ExtFloat { mant: 0xb23867fb2a35b28e, exp: -688 },  // 1e-188
    ExtFloat { mant: 0x84c8d4dfd2c63f3b, exp: -661 },  // 1e-180
    ExtFloat { mant: 0xc5dd44271ad3cdba, exp: -635 },  // 1e-172
    ExtFloat { mant: 0x936b9fcebb25c996, exp: -608 },  // 1e-164
    ExtFloat { mant: 0xdbac6c247d62a584, exp: -582 },  // 1e-156
    ExtFloat { mant: 0xa3ab66580d5fdaf6, exp: -555 },  // 1e-148
    ExtFloat { mant: 0xf3e2f893dec3f126, exp: -529 },  // 1e-140
    ExtFloat { mant: 0xb5b5ada8aaff80b8, exp: -502 },  // 1e-132
    ExtFloat { mant: 0x87625f056c7c4a8b, exp: -475 },  // 1e-124
    ExtFloat { mant: 0xc9bcff6034c13053, exp: -449 },  // 1e-116
    ExtFloat { mant: 0x964e858c91ba2655, exp: -422 },  // 1e-108
    ExtFloat { mant: 0xdff9772470297ebd, exp: -396 },  // 1e-100
    ExtFloat { mant: 0xa6dfbd9fb8e5b88f, exp: -369 },  // 1e-92
    ExtFloat { mant: 0xf8a95fcf88747d94, exp: -343 },  // 1e-84
    ExtFloat { mant: 0xb94470938fa89bcf, exp: -316 },  // 1e-76
    ExtFloat { mant: 0x8a08f0f8bf0f156b, exp: -289 },  // 1e-68
    ExtFloat { mant: 0xcdb02555653131b6, exp: -263 },  // 1e-60
    ExtFloat { mant: 0x993fe2c6d07b7fac, exp: -236 },  // 1e-52
    ExtFloat { mant: 0xe45c10c42a2b3b06, exp: -210 },  // 1e-44
    ExtFloat { mant: 0xaa242499697392d3, exp: -183 },  // 1e-36
    ExtFloat { mant: 0xfd87b5f28300ca0e, exp: -157 },  // 1e-28
    ExtFloat { mant: 0xbce5086492111aeb, exp: -130 },  // 1e-20
    ExtFloat { mant: 0x8cbccc096f5088cc, exp: -103 },  // 1e-12
    ExtFloat { mant: 0xd1b71758e219652c, exp: -77 },   // 1e-4
    ExtFloat { mant: 0x9c40000000000000, exp: -50 },   // 1e4
    ExtFloat { mant: 0xe8d4a51000000000, exp: -24 },   // 1e12
    ExtFloat { mant: 0xad78ebc5ac620000, exp: 3 },     // 1e20
    ExtFloat { mant: 0x813f3978f8940984, exp: 30 },    // 1e28
    ExtFloat { mant: 0xc097ce7bc90715b3, exp: 56 },    // 1e36
    ExtFloat { mant: 0x8f7e32ce7bea5c70, exp: 83 },    // 1e44
    ExtFloat { mant: 0xd5d238a4abe98068, exp: 109 },   // 1e52
    ExtFloat { mant: 0x9f4f2726179a2245, exp: 136 },   // 1e60
    ExtFloat { mant: 0xed63a231d4c4fb27, exp: 162 },   // 1e68
    ExtFloat { mant: 0xb0de65388cc8ada8, exp: 189 },   // 1e76
    ExtFloat { mant: 0x83c7088e1aab65db, exp: 216 },   // 1e84
    ExtFloat { mant: 0xc45d1df942711d9a, exp: 242 },   // 1e92
    ExtFloat { mant: 0x924d692ca61be758, exp: 269 },   // 1e100
    ExtFloat { mant: 0xda01ee641a708dea, exp: 295 },   // 1e108
    ExtFloat { mant: 0xa26da3999aef774a, exp: 322 },   // 1e116
    ExtFloat { mant: 0xf209787bb47d6b85, exp: 348 },   // 1e124
    ExtFloat { mant: 0xb454e4a179dd1877, exp: 375 },   // 1e132
    ExtFloat { mant: 0x865b86925b9bc5c2, exp: 402 },   // 1e140
    ExtFloat { mant: 0xc83553c5c8965d3d, exp: 428 },   // 1e148
    ExtFloat { mant: 0x952ab45cfa97a0b3, exp: 455 },   // 1e156
    ExtFloat { mant: 0xde469fbd99a05fe3, exp: 481 },   // 1e164
    ExtFloat { mant: 0xa59bc234db398c25, exp: 508 },   // 1e172
    ExtFloat { mant: 0xf6c69a72a3989f5c, exp: 534 },   // 1e180
    ExtFloat { mant: 0xb7dcbf5354e9bece, exp: 561 },   // 1e188
    ExtFloat { mant: 0x88fcf317f22241e2, exp: 588 },   // 1e196
    ExtFloat { mant: 0xcc20ce9bd35c78a5, exp: 614 },   // 1e204
    ExtFloat { mant: 0x98165af37b2153df, exp: 641 },   // 1e212
    ExtFloat { mant: 0xe2a0b5dc971f303a, exp: 667 },   // 1e220
    ExtFloat { mant: 0xa8d9d1535ce3b396, exp: 694 },   // 1e228
    ExtFloat { mant: 0xfb9b7cd9a4a7443c, exp: 720 },   // 1e236
    ExtFloat { mant: 0xbb764c4ca7a44410, exp: 747 },   // 1e244
    ExtFloat { mant: 0x8bab8eefb6409c1a, exp: 774 },   // 1e252
    ExtFloat { mant: 0xd01fef10a657842c, exp: 800 },   // 1e260
    ExtFloat { mant: 0x9b10a4e5e9913129, exp: 827 },   // 1e268
    ExtFloat { mant: 0xe7109bfba19c0c9d, exp: 853 },   // 1e276
    ExtFloat { mant: 0xac2820d9623bf429, exp: 880 },   // 1e284
    ExtFloat { mant: 0x80444b5e7aa7cf85, exp: 907 },   // 1e292
    ExtFloat { mant: 0xbf21e44003acdd2d, exp: 933 },   // 1e300
    ExtFloat { mant: 0x8e679c2f5e44ff8f, exp: 960 },   // 1e308
    ExtFloat { mant: 0xd433179d9c8cb841, exp: 986 },   // 1e316
    ExtFloat { mant: 0x9e19db92b4e31ba9, exp: 1013 },  // 1e324
    ExtFloat { mant: 0xeb96bf6ebadf77d9, exp: 1039 },  // 1e332
    ExtFloat { mant: 0xaf87023b9bf0ee6b, exp: 1066 },  // 1e340
];
