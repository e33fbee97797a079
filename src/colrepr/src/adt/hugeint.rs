// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! The engine's 128-bit signed integer type.

use std::fmt;
use std::sync::LazyLock;

use num::{BigInt, Integer, One, ToPrimitive};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::Error;

/// 2^64, the radix separating the two words of a [`HugeInt`].
static WORD_SPLITTER: LazyLock<BigInt> = LazyLock::new(|| BigInt::one() << 64);

/// A signed 128-bit integer, stored the way the engine hands it over: as a
/// signed upper word and an unsigned lower word.
///
/// The represented value is `upper * 2^64 + lower`, i.e. the two's complement
/// interpretation of the concatenated words. The derived ordering compares
/// `upper` first and is therefore numeric.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HugeInt {
    upper: i64,
    lower: u64,
}

impl HugeInt {
    /// The zero value.
    pub const ZERO: HugeInt = HugeInt { upper: 0, lower: 0 };

    /// Constructs a `HugeInt` from its two words.
    pub const fn new(upper: i64, lower: u64) -> HugeInt {
        HugeInt { upper, lower }
    }

    /// The signed upper word.
    pub const fn upper(&self) -> i64 {
        self.upper
    }

    /// The unsigned lower word.
    pub const fn lower(&self) -> u64 {
        self.lower
    }

    /// Returns the value as an arbitrary-precision integer.
    pub fn to_bigint(&self) -> BigInt {
        (BigInt::from(self.upper) << 64) + BigInt::from(self.lower)
    }

    /// Splits an arbitrary-precision integer into words.
    ///
    /// The quotient of a floored division by 2^64 becomes the upper word, so
    /// the remainder (the lower word) is never negative. Fails if the quotient
    /// does not fit in an `i64`.
    pub fn from_bigint(i: &BigInt) -> Result<HugeInt, Error> {
        let (q, r) = i.div_mod_floor(&WORD_SPLITTER);
        let upper = q.to_i64().ok_or_else(|| Error::out_of_range(i, "HUGEINT"))?;
        let lower = r.to_u64().ok_or_else(|| Error::out_of_range(i, "HUGEINT"))?;
        Ok(HugeInt { upper, lower })
    }

    /// Returns the value as a native `i128`. This conversion is lossless.
    pub fn to_i128(&self) -> i128 {
        (i128::from(self.upper) << 64) | i128::from(self.lower)
    }

    /// Narrows the value to an `i64`, as is needed for e.g. sums whose result
    /// still fits in a native word.
    pub fn to_i64(&self) -> Result<i64, Error> {
        i64::try_from(self.to_i128()).map_err(|_| Error::out_of_range(self, "BIGINT"))
    }
}

impl From<i128> for HugeInt {
    // Truncation is the point: each word takes its half of the bits.
    #[allow(clippy::as_conversions)]
    fn from(v: i128) -> HugeInt {
        HugeInt {
            upper: (v >> 64) as i64,
            lower: v as u64,
        }
    }
}

impl From<HugeInt> for i128 {
    fn from(v: HugeInt) -> i128 {
        v.to_i128()
    }
}

impl From<i64> for HugeInt {
    fn from(v: i64) -> HugeInt {
        HugeInt::from(i128::from(v))
    }
}

impl From<u64> for HugeInt {
    fn from(v: u64) -> HugeInt {
        HugeInt { upper: 0, lower: v }
    }
}

impl From<HugeInt> for BigInt {
    fn from(v: HugeInt) -> BigInt {
        v.to_bigint()
    }
}

impl TryFrom<&BigInt> for HugeInt {
    type Error = Error;

    fn try_from(i: &BigInt) -> Result<HugeInt, Error> {
        HugeInt::from_bigint(i)
    }
}

impl fmt::Display for HugeInt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.to_i128().fmt(f)
    }
}

impl Serialize for HugeInt {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i128(self.to_i128())
    }
}

impl<'de> Deserialize<'de> for HugeInt {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<HugeInt, D::Error> {
        struct HugeIntVisitor;

        impl<'de> Visitor<'de> for HugeIntVisitor {
            type Value = HugeInt;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a 128-bit signed integer")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<HugeInt, E> {
                Ok(HugeInt::from(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<HugeInt, E> {
                Ok(HugeInt::from(v))
            }

            fn visit_i128<E: de::Error>(self, v: i128) -> Result<HugeInt, E> {
                Ok(HugeInt::from(v))
            }

            fn visit_u128<E: de::Error>(self, v: u128) -> Result<HugeInt, E> {
                i128::try_from(v)
                    .map(HugeInt::from)
                    .map_err(|_| E::custom(format!("{v} is out of range for type HUGEINT")))
            }
        }

        deserializer.deserialize_i128(HugeIntVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_one_is_all_ones() {
        let h = HugeInt::new(-1, u64::MAX);
        assert_eq!(h.to_bigint(), BigInt::from(-1));
        assert_eq!(h.to_i128(), -1);
        assert_eq!(HugeInt::from_bigint(&BigInt::from(-1)).unwrap(), h);
        assert_eq!(HugeInt::from(-1i64), h);
    }

    #[test]
    fn from_bigint_floors() {
        // -2^64 - 1 = -2 * 2^64 + (2^64 - 1)
        let i: BigInt = -(BigInt::one() << 64u32) - 1;
        let h = HugeInt::from_bigint(&i).unwrap();
        assert_eq!(h, HugeInt::new(-2, u64::MAX));
        assert_eq!(h.to_bigint(), i);

        let i = BigInt::from(i64::MIN);
        assert_eq!(
            HugeInt::from_bigint(&i).unwrap(),
            HugeInt::new(-1, 1 << 63)
        );
    }

    #[test]
    fn from_bigint_out_of_range() {
        let max = BigInt::from(i128::MAX);
        let min = BigInt::from(i128::MIN);
        assert_eq!(HugeInt::from_bigint(&max).unwrap().to_i128(), i128::MAX);
        assert_eq!(HugeInt::from_bigint(&min).unwrap().to_i128(), i128::MIN);

        for i in [max + 1, min - 1] {
            match HugeInt::from_bigint(&i) {
                Err(Error::OutOfRange { target, .. }) => assert_eq!(target, "HUGEINT"),
                r => panic!("unexpected result for {i}: {r:?}"),
            }
        }
    }

    #[test]
    fn to_i64() {
        for v in [0, 1, -1, i64::MAX, i64::MIN] {
            assert_eq!(HugeInt::from(v).to_i64().unwrap(), v);
        }
        for h in [
            HugeInt::new(1, 0),
            HugeInt::new(0, u64::MAX),
            HugeInt::new(-1, 0),
            HugeInt::new(-2, u64::MAX),
            HugeInt::new(i64::MAX, u64::MAX),
        ] {
            assert!(
                matches!(h.to_i64(), Err(Error::OutOfRange { .. })),
                "{h:?} should not fit in an i64"
            );
        }
    }

    #[test]
    fn ordering_is_numeric() {
        let mut vals = vec![
            HugeInt::from(5i64),
            HugeInt::from(-1i64),
            HugeInt::new(1, 0),
            HugeInt::from(i128::MIN),
            HugeInt::ZERO,
        ];
        vals.sort();
        let native: Vec<i128> = vals.iter().map(HugeInt::to_i128).collect();
        let mut sorted = native.clone();
        sorted.sort();
        assert_eq!(native, sorted);
    }

    #[test]
    fn display() {
        assert_eq!(HugeInt::new(1, 2).to_string(), "18446744073709551618");
        assert_eq!(HugeInt::new(-1, u64::MAX - 4).to_string(), "-5");
    }
}
