// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! The engine's fixed-point decimal type.
//!
//! A decimal is an arbitrary-precision integer, its _magnitude_, tagged with a
//! width (the total number of decimal digits) and a scale (the number of those
//! digits that follow the decimal point). The represented number is
//! `magnitude / 10^scale`.
//!
//! The engine physically stores a decimal in the narrowest of four integer
//! widths that can hold every value of its declared width; see
//! [`DecimalStorage`].

use std::fmt;
use std::str::FromStr;

use num::bigint::Sign;
use num::rational::BigRational;
use num::{BigInt, Signed, ToPrimitive, Zero};
use serde::de::{self, Error as _, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

use crate::Error;
use crate::adt::hugeint::HugeInt;

/// The maximum width of a decimal.
pub const MAX_DECIMAL_WIDTH: u8 = 38;

/// A fixed-point decimal number.
///
/// Equality, ordering and hashing are structural: `1.0` at scale 1 and `1.00`
/// at scale 2 are different values.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Decimal {
    width: u8,
    scale: u8,
    value: BigInt,
}

/// The physical integer a decimal's magnitude is stored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecimalStorage {
    /// Widths 1 through 4.
    Int16(i16),
    /// Widths 5 through 9.
    Int32(i32),
    /// Widths 10 through 18.
    Int64(i64),
    /// Widths 19 through 38.
    HugeInt(HugeInt),
}

impl DecimalStorage {
    /// The largest decimal width this storage tier can hold.
    pub fn max_width(&self) -> u8 {
        match self {
            DecimalStorage::Int16(_) => 4,
            DecimalStorage::Int32(_) => 9,
            DecimalStorage::Int64(_) => 18,
            DecimalStorage::HugeInt(_) => MAX_DECIMAL_WIDTH,
        }
    }

    fn to_bigint(self) -> BigInt {
        match self {
            DecimalStorage::Int16(i) => BigInt::from(i),
            DecimalStorage::Int32(i) => BigInt::from(i),
            DecimalStorage::Int64(i) => BigInt::from(i),
            DecimalStorage::HugeInt(h) => h.to_bigint(),
        }
    }
}

impl Decimal {
    /// Constructs a decimal from its magnitude.
    ///
    /// The width must be between 1 and [`MAX_DECIMAL_WIDTH`], the scale must
    /// not exceed the width, and the magnitude must have at most `width`
    /// digits.
    pub fn new(width: u8, scale: u8, value: BigInt) -> Result<Decimal, Error> {
        if width == 0 || width > MAX_DECIMAL_WIDTH {
            return Err(Error::InvalidDecimal(format!(
                "width must be between 1 and {MAX_DECIMAL_WIDTH}, got {width}"
            )));
        }
        if scale > width {
            return Err(Error::InvalidDecimal(format!(
                "scale {scale} exceeds width {width}"
            )));
        }
        if value.abs() >= num::pow(BigInt::from(10), usize::from(width)) {
            return Err(Error::InvalidDecimal(format!(
                "{value} has more than {width} digits"
            )));
        }
        Ok(Decimal {
            width,
            scale,
            value,
        })
    }

    /// Constructs a decimal from the engine's physical storage of its
    /// magnitude.
    pub fn from_storage(width: u8, scale: u8, storage: DecimalStorage) -> Result<Decimal, Error> {
        if width > storage.max_width() {
            return Err(Error::InvalidDecimal(format!(
                "width {width} does not fit in {storage:?}"
            )));
        }
        Decimal::new(width, scale, storage.to_bigint())
    }

    /// Constructs a decimal from a big-endian two's complement magnitude of any
    /// length.
    pub fn from_twos_complement_be(width: u8, scale: u8, bytes: &[u8]) -> Result<Decimal, Error> {
        Decimal::new(width, scale, BigInt::from_signed_bytes_be(bytes))
    }

    /// The total number of decimal digits.
    pub fn width(&self) -> u8 {
        self.width
    }

    /// The number of digits after the decimal point.
    pub fn scale(&self) -> u8 {
        self.scale
    }

    /// The unscaled magnitude, i.e. the value times `10^scale`.
    pub fn value(&self) -> &BigInt {
        &self.value
    }

    /// Consumes the decimal, returning its unscaled magnitude.
    pub fn into_value(self) -> BigInt {
        self.value
    }

    /// Returns the magnitude in the storage tier the engine uses for this
    /// decimal's width.
    pub fn to_storage(&self) -> Result<DecimalStorage, Error> {
        let oor = || Error::out_of_range(self, "DECIMAL");
        Ok(match self.width {
            0..=4 => DecimalStorage::Int16(self.value.to_i16().ok_or_else(oor)?),
            5..=9 => DecimalStorage::Int32(self.value.to_i32().ok_or_else(oor)?),
            10..=18 => DecimalStorage::Int64(self.value.to_i64().ok_or_else(oor)?),
            _ => DecimalStorage::HugeInt(HugeInt::from_bigint(&self.value)?),
        })
    }

    /// Returns the magnitude as big-endian two's complement bytes.
    pub fn to_twos_complement_be(&self) -> Vec<u8> {
        self.value.to_signed_bytes_be()
    }

    /// Converts the decimal to the nearest `f64`.
    ///
    /// The division by `10^scale` is carried out exactly; rounding happens
    /// once, when the exact quotient is converted.
    pub fn to_f64(&self) -> f64 {
        let factor = num::pow(BigInt::from(10), usize::from(self.scale));
        let exact = BigRational::new(self.value.clone(), factor.clone());
        match exact.to_f64() {
            Some(f) => f,
            None => {
                let value = self.value.to_f64().unwrap_or(f64::NAN);
                value / factor.to_f64().unwrap_or(f64::INFINITY)
            }
        }
    }
}

impl fmt::Display for Decimal {
    /// Writes the shortest exact decimal text: trailing fractional zeros are
    /// dropped, and so is the decimal point when nothing follows it.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.value.is_zero() {
            return f.write_str("0");
        }
        if self.value.sign() == Sign::Minus {
            f.write_str("-")?;
        }

        let digits = self.value.magnitude().to_string();
        let trimmed = digits.trim_end_matches('0');
        let zeros = digits.len() - trimmed.len();
        let scale = usize::from(self.scale);

        if zeros >= scale {
            // Integral; put back the zeros that were not fractional.
            f.write_str(trimmed)?;
            for _ in 0..zeros - scale {
                f.write_str("0")?;
            }
            return Ok(());
        }

        let scale = scale - zeros;
        if trimmed.len() <= scale {
            f.write_str("0.")?;
            for _ in 0..scale - trimmed.len() {
                f.write_str("0")?;
            }
            f.write_str(trimmed)
        } else {
            let (int, frac) = trimmed.split_at(trimmed.len() - scale);
            write!(f, "{int}.{frac}")
        }
    }
}

impl FromStr for Decimal {
    type Err = Error;

    /// Parses plain decimal text such as `-123.4500`. The scale is the number
    /// of digits after the point and the width the number of digits overall,
    /// leading zeros excluded.
    fn from_str(s: &str) -> Result<Decimal, Error> {
        let invalid = || Error::InvalidDecimal(format!("invalid decimal text {s:?}"));
        let (negative, unsigned) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s.strip_prefix('+').unwrap_or(s)),
        };
        let (int, frac) = unsigned.split_once('.').unwrap_or((unsigned, ""));
        if int.is_empty() && frac.is_empty() {
            return Err(invalid());
        }
        if !int.bytes().chain(frac.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let scale = u8::try_from(frac.len()).map_err(|_| invalid())?;
        let significant = int.trim_start_matches('0').len() + frac.len();
        let width = u8::try_from(significant.max(usize::from(scale)).max(1)).map_err(|_| invalid())?;

        let mut magnitude = String::with_capacity(int.len() + frac.len() + 1);
        if negative {
            magnitude.push('-');
        }
        magnitude.push_str(int);
        magnitude.push_str(frac);
        let value = BigInt::from_str(&magnitude).map_err(|_| invalid())?;
        Decimal::new(width, scale, value)
    }
}

/// The struct name a decimal requests from deserializers. No user struct can
/// be named this.
pub(crate) const DECIMAL_NAME: &str = "$colrepr::Decimal";

/// The field names a decimal is decoded from, in addition to its text form.
pub(crate) const DECIMAL_FIELDS: &[&str] = &["width", "scale", "value"];

impl<'de> Deserialize<'de> for Decimal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
        struct DecimalVisitor;

        impl<'de> Visitor<'de> for DecimalVisitor {
            type Value = Decimal;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a decimal")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Decimal, E> {
                v.parse().map_err(E::custom)
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Decimal, A::Error> {
                let mut width = None;
                let mut scale = None;
                let mut value: Option<String> = None;
                while let Some(key) = map.next_key::<String>()? {
                    match key.as_str() {
                        "width" => width = Some(map.next_value()?),
                        "scale" => scale = Some(map.next_value()?),
                        "value" => value = Some(map.next_value()?),
                        _ => {
                            map.next_value::<de::IgnoredAny>()?;
                        }
                    }
                }
                let width = width.ok_or_else(|| A::Error::missing_field("width"))?;
                let scale = scale.ok_or_else(|| A::Error::missing_field("scale"))?;
                let value = value.ok_or_else(|| A::Error::missing_field("value"))?;
                let value = BigInt::from_str(&value).map_err(A::Error::custom)?;
                Decimal::new(width, scale, value).map_err(de::Error::custom)
            }
        }

        deserializer.deserialize_struct(DECIMAL_NAME, DECIMAL_FIELDS, DecimalVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(value: i128, scale: u8) -> Decimal {
        Decimal::new(MAX_DECIMAL_WIDTH, scale, BigInt::from(value)).unwrap()
    }

    #[test]
    fn format() {
        for (value, scale, expected) in [
            (0, 0, "0"),
            (0, 5, "0"),
            (123, 2, "1.23"),
            (12345, 0, "12345"),
            (100, 3, "0.1"),
            (-5, 2, "-0.05"),
            (1200, 1, "120"),
            (-1200, 2, "-12"),
            (1, 0, "1"),
            (10, 1, "1"),
            (-123450, 3, "-123.45"),
            (1, 38, "0.00000000000000000000000000000000000001"),
            (
                99999999999999999999999999999999999999,
                0,
                "99999999999999999999999999999999999999",
            ),
            (
                -12345678901234567890123456789012345678,
                20,
                "-123456789012345678.90123456789012345678",
            ),
        ] {
            assert_eq!(dec(value, scale).to_string(), expected, "{value} scale {scale}");
        }
    }

    #[test]
    fn to_f64() {
        assert_eq!(dec(0, 1).to_f64(), 0.0);
        assert_eq!(dec(123, 2).to_f64(), 1.23);
        assert_eq!(dec(12345, 2).to_f64(), 123.45);
        assert_eq!(dec(12345678901, 2).to_f64(), 123456789.01);
        assert_eq!(
            dec(1234567890123456789234, 3).to_f64(),
            1234567890123456789.234
        );
        let huge = dec(12345678901234567890123456789, 20).to_f64();
        assert!((huge - 123456789.01234567890123456789).abs() < 1e-7);
        assert_eq!(dec(-5, 2).to_f64(), -0.05);
    }

    #[test]
    fn validation() {
        assert!(matches!(
            Decimal::new(0, 0, BigInt::zero()),
            Err(Error::InvalidDecimal(_))
        ));
        assert!(matches!(
            Decimal::new(39, 0, BigInt::zero()),
            Err(Error::InvalidDecimal(_))
        ));
        assert!(matches!(
            Decimal::new(3, 4, BigInt::zero()),
            Err(Error::InvalidDecimal(_))
        ));
        assert!(matches!(
            Decimal::new(3, 2, BigInt::from(1000)),
            Err(Error::InvalidDecimal(_))
        ));
        assert!(Decimal::new(3, 2, BigInt::from(-999)).is_ok());
    }

    #[test]
    fn storage_tiers() {
        let cases = [
            (4, DecimalStorage::Int16(-9999)),
            (9, DecimalStorage::Int32(123_456_789)),
            (18, DecimalStorage::Int64(-1)),
            (38, DecimalStorage::HugeInt(HugeInt::from(10i128.pow(37)))),
        ];
        for (width, storage) in cases {
            let d = Decimal::from_storage(width, 2, storage).unwrap();
            assert_eq!(d.to_storage().unwrap(), storage);
        }

        // Narrower widths than the tier's maximum are fine.
        let d = Decimal::from_storage(2, 1, DecimalStorage::Int64(15)).unwrap();
        assert_eq!(d.to_string(), "1.5");
        assert_eq!(d.to_storage().unwrap(), DecimalStorage::Int16(15));

        assert!(matches!(
            Decimal::from_storage(5, 0, DecimalStorage::Int16(1)),
            Err(Error::InvalidDecimal(_))
        ));
    }

    #[test]
    fn twos_complement() {
        let d = Decimal::from_twos_complement_be(10, 2, &[0xff, 0xff, 0xff, 0xfb]).unwrap();
        assert_eq!(d.to_string(), "-0.05");
        assert_eq!(d.to_twos_complement_be(), vec![0xfb]);

        let d = Decimal::from_twos_complement_be(5, 0, &[]).unwrap();
        assert_eq!(d.to_string(), "0");
    }

    #[test]
    fn parse() {
        for (s, width, scale, display) in [
            ("1.23", 3, 2, "1.23"),
            ("-0.05", 2, 2, "-0.05"),
            ("0.100", 3, 3, "0.1"),
            ("12345", 5, 0, "12345"),
            ("+007.5", 2, 1, "7.5"),
            (".5", 1, 1, "0.5"),
            ("0", 1, 0, "0"),
        ] {
            let d: Decimal = s.parse().unwrap();
            assert_eq!((d.width(), d.scale()), (width, scale), "{s}");
            assert_eq!(d.to_string(), display);
        }
        for s in ["", "-", ".", "1.2.3", "abc", "1e5", "- 1"] {
            assert!(s.parse::<Decimal>().is_err(), "{s:?} should not parse");
        }
    }
}
