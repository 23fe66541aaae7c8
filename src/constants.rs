/// Parameters of an IEEE-754 binary interchange format.
///
/// `bias` is chosen so that a decoded value is `mant * 2^(exp - mantbits)`
/// with `exp` ranging over `bias+1 ..= bias + 2^expbits - 2` for normal
/// numbers and `exp == bias` marking zero and subnormals.
pub(crate) struct FloatInfo {
    pub(crate) mantbits: u32,
    pub(crate) expbits: u32,
    pub(crate) bias: i32,
}

pub(crate) static F32_INFO: FloatInfo = FloatInfo {
    mantbits: 23,
    expbits: 8,
    bias: -127,
};

pub(crate) static F64_INFO: FloatInfo = FloatInfo {
    mantbits: 52,
    expbits: 11,
    bias: -1023,
};

// 10^19 no longer fits in a u64.
pub(crate) const MAX_MANTISSA_DIGITS: usize = 19;

/// Powers of ten representable exactly in a binary64; 10^22 is the last.
pub(crate) const F64_POW10: [f64; 23] = [
    1e0, 1e1, 1e2, 1e3, 1e4, 1e5, 1e6, 1e7, 1e8, 1e9, 1e10, 1e11, 1e12, 1e13, 1e14, 1e15, 1e16,
    1e17, 1e18, 1e19, 1e20, 1e21, 1e22,
];

/// Powers of ten representable exactly in a binary32; 10^10 is the last.
pub(crate) const F32_POW10: [f32; 11] = [
    1e0, 1e1, 1e2, 1e3, 1e4, 1e5, 1e6, 1e7, 1e8, 1e9, 1e10,
];

pub(crate) const U64_POW10: [u64; 20] = [
    1,
    10,
    100,
    1_000,
    10_000,
    100_000,
    1_000_000,
    10_000_000,
    100_000_000,
    1_000_000_000,
    10_000_000_000,
    100_000_000_000,
    1_000_000_000_000,
    10_000_000_000_000,
    100_000_000_000_000,
    1_000_000_000_000_000,
    10_000_000_000_000_000,
    100_000_000_000_000_000,
    1_000_000_000_000_000_000,
    10_000_000_000_000_000_000,
];
