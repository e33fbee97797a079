// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! An untyped destination for decoded values.

use std::collections::BTreeMap;
use std::fmt;

use ordered_float::OrderedFloat;
use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};

/// A decoded value whose shape was not declared up front.
///
/// Decoding into `AnyValue` reconstructs the full nesting of the source with
/// generic containers. Scalars keep the exact width the engine reported, so an
/// engine `INTEGER` becomes [`AnyValue::I32`] and never an `I64`. Structs and
/// maps both become [`AnyValue::Map`], whose ordering is irrelevant to
/// equality.
///
/// A few engine types have no direct counterpart: decimals decode as
/// [`AnyValue::F64`], UUIDs as their sixteen raw [`AnyValue::Bytes`], and
/// intervals as a map with `months`, `days` and `micros` keys.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AnyValue {
    /// The SQL `NULL`.
    Null,
    /// A boolean.
    Bool(bool),
    /// An 8-bit signed integer.
    I8(i8),
    /// A 16-bit signed integer.
    I16(i16),
    /// A 32-bit signed integer.
    I32(i32),
    /// A 64-bit signed integer.
    I64(i64),
    /// A 128-bit signed integer.
    I128(i128),
    /// An 8-bit unsigned integer.
    U8(u8),
    /// A 16-bit unsigned integer.
    U16(u16),
    /// A 32-bit unsigned integer.
    U32(u32),
    /// A 64-bit unsigned integer.
    U64(u64),
    /// A 128-bit unsigned integer.
    U128(u128),
    /// A 32-bit float.
    F32(OrderedFloat<f32>),
    /// A 64-bit float.
    F64(OrderedFloat<f64>),
    /// A string.
    String(String),
    /// A byte string.
    Bytes(Vec<u8>),
    /// An ordered sequence.
    List(Vec<AnyValue>),
    /// An unordered mapping.
    Map(BTreeMap<AnyValue, AnyValue>),
}

impl AnyValue {
    /// Builds an [`AnyValue::Map`] with string keys.
    pub fn record<'a>(fields: impl IntoIterator<Item = (&'a str, AnyValue)>) -> AnyValue {
        AnyValue::Map(
            fields
                .into_iter()
                .map(|(name, value)| (AnyValue::String(name.into()), value))
                .collect(),
        )
    }
}

impl<'de> Deserialize<'de> for AnyValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<AnyValue, D::Error> {
        deserializer.deserialize_any(AnyValueVisitor)
    }
}

struct AnyValueVisitor;

macro_rules! visit_scalar {
    ($($method:ident($t:ty) => $variant:expr),* $(,)?) => {
        $(
            fn $method<E: de::Error>(self, v: $t) -> Result<AnyValue, E> {
                Ok($variant(v))
            }
        )*
    };
}

impl<'de> Visitor<'de> for AnyValueVisitor {
    type Value = AnyValue;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("any value")
    }

    visit_scalar! {
        visit_bool(bool) => AnyValue::Bool,
        visit_i8(i8) => AnyValue::I8,
        visit_i16(i16) => AnyValue::I16,
        visit_i32(i32) => AnyValue::I32,
        visit_i64(i64) => AnyValue::I64,
        visit_i128(i128) => AnyValue::I128,
        visit_u8(u8) => AnyValue::U8,
        visit_u16(u16) => AnyValue::U16,
        visit_u32(u32) => AnyValue::U32,
        visit_u64(u64) => AnyValue::U64,
        visit_u128(u128) => AnyValue::U128,
        visit_f32(f32) => |f| AnyValue::F32(OrderedFloat(f)),
        visit_f64(f64) => |f| AnyValue::F64(OrderedFloat(f)),
        visit_char(char) => |c: char| AnyValue::String(c.to_string()),
        visit_string(String) => AnyValue::String,
        visit_byte_buf(Vec<u8>) => AnyValue::Bytes,
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<AnyValue, E> {
        Ok(AnyValue::String(v.to_owned()))
    }

    fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<AnyValue, E> {
        Ok(AnyValue::Bytes(v.to_vec()))
    }

    fn visit_unit<E: de::Error>(self) -> Result<AnyValue, E> {
        Ok(AnyValue::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<AnyValue, E> {
        Ok(AnyValue::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<AnyValue, D::Error> {
        AnyValue::deserialize(deserializer)
    }

    fn visit_newtype_struct<D: Deserializer<'de>>(
        self,
        deserializer: D,
    ) -> Result<AnyValue, D::Error> {
        AnyValue::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<AnyValue, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(AnyValue::List(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<AnyValue, A::Error> {
        let mut entries = BTreeMap::new();
        while let Some((k, v)) = map.next_entry()? {
            entries.insert(k, v);
        }
        Ok(AnyValue::Map(entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_json() {
        // Any self-describing format works; JSON is merely convenient.
        let v: AnyValue = serde_json::from_str(r#"{"a": [1, -2, null], "b": "x"}"#).unwrap();
        assert_eq!(
            v,
            AnyValue::record([
                (
                    "a",
                    AnyValue::List(vec![AnyValue::U64(1), AnyValue::I64(-2), AnyValue::Null])
                ),
                ("b", AnyValue::String("x".into())),
            ])
        );
    }
}
