// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! The engine's value model.

use std::collections::BTreeMap;

use ordered_float::OrderedFloat;
use uuid::Uuid;

use crate::adt::decimal::Decimal;
use crate::adt::hugeint::HugeInt;
use crate::adt::interval::Interval;
use crate::adt::uuid::{EngineUuid, hugeint_to_uuid};

/// A value as extracted from, or handed to, the engine.
///
/// Scalars carry the engine's exact physical type. Composite values nest
/// arbitrarily: a struct is an ordered list of named fields, a list is an
/// ordered sequence of values, and a map is a list of key/value pairs in the
/// order the engine produced them.
///
/// Values are totally ordered and hashable, so they can themselves be used as
/// map keys. Floats order by [`OrderedFloat`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Value {
    /// The SQL `NULL`.
    Null,
    /// A boolean.
    Boolean(bool),
    /// A 1-byte signed integer.
    TinyInt(i8),
    /// A 2-byte signed integer.
    SmallInt(i16),
    /// A 4-byte signed integer.
    Integer(i32),
    /// An 8-byte signed integer.
    BigInt(i64),
    /// A 16-byte signed integer.
    HugeInt(HugeInt),
    /// A 1-byte unsigned integer.
    UTinyInt(u8),
    /// A 2-byte unsigned integer.
    USmallInt(u16),
    /// A 4-byte unsigned integer.
    UInteger(u32),
    /// An 8-byte unsigned integer.
    UBigInt(u64),
    /// A 4-byte floating point number.
    Float(OrderedFloat<f32>),
    /// An 8-byte floating point number.
    Double(OrderedFloat<f64>),
    /// A fixed-point decimal.
    Decimal(Decimal),
    /// A variable-length string.
    Varchar(String),
    /// A variable-length binary string.
    Blob(Vec<u8>),
    /// A universally unique identifier.
    Uuid(Uuid),
    /// A time interval.
    Interval(Interval),
    /// A sequence of homogeneous values.
    List(Vec<Value>),
    /// A sequence of named, heterogeneous values.
    Struct(Vec<(String, Value)>),
    /// A sequence of key/value pairs.
    Map(Vec<(Value, Value)>),
}

impl Value {
    /// Constructs a UUID value from the 128-bit integer form the engine uses to
    /// deliver UUIDs.
    pub fn uuid_from_hugeint(h: HugeInt) -> Value {
        Value::Uuid(hugeint_to_uuid(h))
    }

    /// Reports whether this value is `NULL`.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The name of this value's engine type.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Boolean(_) => "BOOLEAN",
            Value::TinyInt(_) => "TINYINT",
            Value::SmallInt(_) => "SMALLINT",
            Value::Integer(_) => "INTEGER",
            Value::BigInt(_) => "BIGINT",
            Value::HugeInt(_) => "HUGEINT",
            Value::UTinyInt(_) => "UTINYINT",
            Value::USmallInt(_) => "USMALLINT",
            Value::UInteger(_) => "UINTEGER",
            Value::UBigInt(_) => "UBIGINT",
            Value::Float(_) => "FLOAT",
            Value::Double(_) => "DOUBLE",
            Value::Decimal(_) => "DECIMAL",
            Value::Varchar(_) => "VARCHAR",
            Value::Blob(_) => "BLOB",
            Value::Uuid(_) => "UUID",
            Value::Interval(_) => "INTERVAL",
            Value::List(_) => "LIST",
            Value::Struct(_) => "STRUCT",
            Value::Map(_) => "MAP",
        }
    }
}

/// Converts a host value into the engine's value model, e.g. to bind it as a
/// statement parameter.
pub trait ToValue {
    /// Performs the conversion.
    fn to_value(self) -> Value;
}

macro_rules! to_value {
    ($t:ty, $v:expr) => {
        impl ToValue for $t {
            fn to_value(self) -> Value {
                $v(self)
            }
        }
    };
}

to_value!(bool, Value::Boolean);
to_value!(i8, Value::TinyInt);
to_value!(i16, Value::SmallInt);
to_value!(i32, Value::Integer);
to_value!(i64, Value::BigInt);
to_value!(HugeInt, Value::HugeInt);
to_value!(u8, Value::UTinyInt);
to_value!(u16, Value::USmallInt);
to_value!(u32, Value::UInteger);
to_value!(u64, Value::UBigInt);
to_value!(f32, |f| Value::Float(OrderedFloat(f)));
to_value!(f64, |f| Value::Double(OrderedFloat(f)));
to_value!(i128, |i| Value::HugeInt(HugeInt::from(i)));
to_value!(Decimal, Value::Decimal);
to_value!(String, Value::Varchar);
to_value!(Uuid, Value::Uuid);
to_value!(EngineUuid, |u: EngineUuid| Value::Uuid(u.0));
to_value!(Interval, Value::Interval);

impl ToValue for &str {
    fn to_value(self) -> Value {
        Value::Varchar(self.to_owned())
    }
}

impl ToValue for &[u8] {
    fn to_value(self) -> Value {
        Value::Blob(self.to_vec())
    }
}

impl ToValue for Value {
    fn to_value(self) -> Value {
        self
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }
}

/// Vectors become lists. Use a `&[u8]` for a blob.
impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(self) -> Value {
        Value::List(self.into_iter().map(ToValue::to_value).collect())
    }
}

impl<K: ToValue, V: ToValue> ToValue for BTreeMap<K, V> {
    fn to_value(self) -> Value {
        Value::Map(
            self.into_iter()
                .map(|(k, v)| (k.to_value(), v.to_value()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_value() {
        assert_eq!(1i32.to_value(), Value::Integer(1));
        assert_eq!(
            (-1i128).to_value(),
            Value::HugeInt(HugeInt::new(-1, u64::MAX))
        );
        assert_eq!("foo".to_value(), Value::Varchar("foo".into()));
        assert_eq!(b"foo"[..].to_value(), Value::Blob(b"foo".to_vec()));
        assert_eq!(None::<i64>.to_value(), Value::Null);
        assert_eq!(
            vec![Some(1.5f64), None].to_value(),
            Value::List(vec![Value::Double(OrderedFloat(1.5)), Value::Null])
        );

        let m = BTreeMap::from([(5i32, "e"), (1, "a")]);
        assert_eq!(
            m.to_value(),
            Value::Map(vec![
                (Value::Integer(1), Value::Varchar("a".into())),
                (Value::Integer(5), Value::Varchar("e".into())),
            ])
        );
    }

    #[test]
    fn uuid_from_hugeint() {
        let v = Value::uuid_from_hugeint(HugeInt::new(i64::MIN, 0));
        assert_eq!(v, Value::Uuid(Uuid::nil()));
        assert_eq!(v.type_name(), "UUID");
    }
}
