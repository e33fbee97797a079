// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use colrepr::adt::uuid::{format_uuid, hugeint_to_uuid, parse_uuid_str, uuid_to_hugeint};
use colrepr::{Decimal, HugeInt};
use num::BigInt;
use proptest::prelude::*;
use uuid::Uuid;

/// The largest magnitude a 38-digit decimal can hold.
const MAX_MAGNITUDE: i128 = 10i128.pow(38) - 1;

proptest! {
    #[test]
    fn hugeint_bigint_roundtrip(upper in any::<i64>(), lower in any::<u64>()) {
        let h = HugeInt::new(upper, lower);
        let i = h.to_bigint();
        prop_assert_eq!(&i, &BigInt::from(h.to_i128()));
        prop_assert_eq!(HugeInt::from_bigint(&i).unwrap(), h);
    }

    #[test]
    fn hugeint_to_i64(v in any::<i128>()) {
        let h = HugeInt::from(v);
        match i64::try_from(v) {
            Ok(expected) => prop_assert_eq!(h.to_i64().unwrap(), expected),
            Err(_) => prop_assert!(h.to_i64().is_err()),
        }
    }

    #[test]
    fn uuid_hugeint_roundtrip(bytes in any::<[u8; 16]>()) {
        let u = Uuid::from_bytes(bytes);
        prop_assert_eq!(hugeint_to_uuid(uuid_to_hugeint(&u)), u);
        prop_assert_eq!(parse_uuid_str(&format_uuid(&u)).unwrap(), u);
    }

    #[test]
    fn uuid_order_matches_hugeint_order(a in any::<[u8; 16]>(), b in any::<[u8; 16]>()) {
        let (a, b) = (Uuid::from_bytes(a), Uuid::from_bytes(b));
        prop_assert_eq!(a.cmp(&b), uuid_to_hugeint(&a).cmp(&uuid_to_hugeint(&b)));
    }

    #[test]
    fn decimal_text_is_exact_and_short(v in -MAX_MAGNITUDE..=MAX_MAGNITUDE, scale in 0u8..=38) {
        let d = Decimal::new(38, scale, BigInt::from(v)).unwrap();
        let text = d.to_string();
        prop_assert!(!text.ends_with('.'), "{}", text);
        if text.contains('.') {
            prop_assert!(!text.ends_with('0'), "{}", text);
        }

        // Cross-multiplying compares the two fractions without rounding.
        let parsed: Decimal = text.parse().unwrap();
        let ten = BigInt::from(10);
        prop_assert_eq!(
            parsed.value() * num::pow(ten.clone(), usize::from(scale)),
            d.value() * num::pow(ten, usize::from(parsed.scale()))
        );
    }

    #[test]
    fn decimal_to_f64_matches_text(v in -MAX_MAGNITUDE..=MAX_MAGNITUDE, scale in 0u8..=38) {
        let d = Decimal::new(38, scale, BigInt::from(v)).unwrap();
        let expected: f64 = d.to_string().parse().unwrap();
        let actual = d.to_f64();
        prop_assert!(
            (actual - expected).abs() <= expected.abs() * 1e-15,
            "{} vs {}", actual, expected
        );
    }

    #[test]
    fn decimal_twos_complement(v in -MAX_MAGNITUDE..=MAX_MAGNITUDE, scale in 0u8..=38) {
        let d = Decimal::new(38, scale, BigInt::from(v)).unwrap();
        let bytes = d.to_twos_complement_be();
        prop_assert_eq!(&Decimal::from_twos_complement_be(38, scale, &bytes).unwrap(), &d);
        prop_assert_eq!(&Decimal::from_twos_complement_be(38, scale, &v.to_be_bytes()).unwrap(), &d);
        prop_assert!(bytes.len() <= 16);
    }
}
