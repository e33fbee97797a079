// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Scanning of result columns into dedicated destination types.
//!
//! Where [`from_value`] lets the destination's declared shape drive decoding,
//! a [`Scan`] implementation inspects the engine value itself and accepts
//! exactly the engine types that make sense for the destination.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::Error;
use crate::adt::decimal::Decimal;
use crate::adt::hugeint::HugeInt;
use crate::adt::interval::Interval;
use crate::adt::map::Map;
use crate::adt::uuid::{EngineUuid, uuid_from_value};
use crate::any::AnyValue;
use crate::de::from_value;
use crate::value::Value;

/// A type that a single engine value can be scanned into.
pub trait Scan: Sized {
    /// Converts `value` into `Self`.
    fn scan(value: &Value) -> Result<Self, Error>;
}

/// Scans `value` into `dest`. `dest` is assigned only if the scan succeeds.
pub fn scan_into<T: Scan>(value: &Value, dest: &mut T) -> Result<(), Error> {
    *dest = T::scan(value)?;
    Ok(())
}

impl Scan for HugeInt {
    fn scan(value: &Value) -> Result<HugeInt, Error> {
        from_value(value)
    }
}

impl Scan for Uuid {
    fn scan(value: &Value) -> Result<Uuid, Error> {
        uuid_from_value(value)
    }
}

impl Scan for EngineUuid {
    fn scan(value: &Value) -> Result<EngineUuid, Error> {
        uuid_from_value(value).map(EngineUuid)
    }
}

impl Scan for Decimal {
    fn scan(value: &Value) -> Result<Decimal, Error> {
        match value {
            Value::Decimal(d) => Ok(d.clone()),
            _ => Err(Error::mismatch(value.type_name(), "DECIMAL")),
        }
    }
}

impl Scan for Interval {
    fn scan(value: &Value) -> Result<Interval, Error> {
        match value {
            Value::Interval(i) => Ok(*i),
            Value::Struct(_) => from_value(value),
            _ => Err(Error::mismatch(value.type_name(), "INTERVAL")),
        }
    }
}

impl Scan for Map {
    fn scan(value: &Value) -> Result<Map, Error> {
        match value {
            Value::Map(_) => from_value::<BTreeMap<AnyValue, AnyValue>>(value).map(Map),
            _ => Err(Error::mismatch(value.type_name(), "MAP")),
        }
    }
}

impl Scan for AnyValue {
    fn scan(value: &Value) -> Result<AnyValue, Error> {
        from_value(value)
    }
}

/// A destination that decodes any composite value into a `T`.
///
/// ```
/// use colrepr::{Composite, Scan, Value};
///
/// #[derive(serde::Deserialize)]
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// let v = Value::Struct(vec![
///     ("x".into(), Value::Integer(1)),
///     ("y".into(), Value::Integer(2)),
/// ]);
/// let p = Composite::<Point>::scan(&v).unwrap();
/// assert_eq!((p.get().x, p.get().y), (1, 2));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Composite<T>(T);

impl<T> Composite<T> {
    /// Returns a reference to the decoded value.
    pub fn get(&self) -> &T {
        &self.0
    }

    /// Consumes the wrapper, returning the decoded value.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T: DeserializeOwned> Scan for Composite<T> {
    fn scan(value: &Value) -> Result<Composite<T>, Error> {
        from_value(value).map(Composite)
    }
}

#[cfg(test)]
mod tests {
    use ordered_float::OrderedFloat;

    use super::*;
    use crate::adt::uuid::{parse_uuid_str, uuid_to_hugeint};

    #[test]
    fn uuid_sources() {
        let u = parse_uuid_str("53b4e983-b287-481a-94ad-6e3c90489913").unwrap();
        for v in [
            Value::Uuid(u),
            Value::HugeInt(uuid_to_hugeint(&u)),
            Value::Blob(u.as_bytes().to_vec()),
            Value::Blob(b"53b4e983-b287-481a-94ad-6e3c90489913".to_vec()),
            Value::Varchar("53B4E983B287481A94AD6E3C90489913".into()),
        ] {
            assert_eq!(Uuid::scan(&v).unwrap(), u, "{v:?}");
        }

        match Uuid::scan(&Value::Integer(1)) {
            Err(Error::InvalidUuidFormat(msg)) => assert!(msg.contains("INTEGER"), "{msg}"),
            r => panic!("unexpected result: {r:?}"),
        }
        assert!(matches!(
            Uuid::scan(&Value::Varchar("nope".into())),
            Err(Error::InvalidUuidFormat(_))
        ));
        assert_eq!(EngineUuid::scan(&Value::Uuid(u)).unwrap(), EngineUuid(u));
    }

    #[test]
    fn hugeint_widens() {
        assert_eq!(HugeInt::scan(&Value::TinyInt(-1)).unwrap(), HugeInt::new(-1, u64::MAX));
        assert!(matches!(
            HugeInt::scan(&Value::Double(OrderedFloat(1.0))),
            Err(Error::TypeMismatch { .. })
        ));
    }

    #[test]
    fn map() {
        let v = Value::Map(vec![
            (Value::Varchar("a".into()), Value::Integer(1)),
            (Value::Varchar("a".into()), Value::Integer(2)),
            (Value::Varchar("b".into()), Value::Null),
        ]);
        let m = Map::scan(&v).unwrap();
        assert_eq!(
            m.into_inner(),
            BTreeMap::from([
                (AnyValue::String("a".into()), AnyValue::I32(2)),
                (AnyValue::String("b".into()), AnyValue::Null),
            ])
        );

        let v = Value::Struct(vec![("a".into(), Value::Integer(1))]);
        assert!(matches!(
            Map::scan(&v),
            Err(Error::TypeMismatch { found: "STRUCT", .. })
        ));
    }

    #[test]
    fn scan_into_keeps_destination_on_error() {
        let mut i = Interval::new(1, 2, 3);
        assert!(scan_into(&Value::Varchar("1 day".into()), &mut i).is_err());
        assert_eq!(i, Interval::new(1, 2, 3));
        scan_into(&Value::Interval(Interval::new(0, 1, 0)), &mut i).unwrap();
        assert_eq!(i, Interval::new(0, 1, 0));
    }

    #[test]
    fn decimal() {
        let d: Decimal = "2.75".parse().unwrap();
        assert_eq!(Decimal::scan(&Value::Decimal(d.clone())).unwrap(), d);
        assert!(Decimal::scan(&Value::Double(OrderedFloat(2.75))).is_err());
    }
}
