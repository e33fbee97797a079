// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Decoding of engine values into host types.
//!
//! [`Decoder`] is a [`serde::Deserializer`] over a [`Value`] tree. The
//! destination type declares its shape through the `deserialize_*` method it
//! calls; every such call funnels into a single dispatch on the pair of source
//! value and declared shape.
//!
//! The rules, in brief:
//!
//! * Structs decode into structs by field name. Names match exactly if
//!   possible and case-insensitively otherwise. Destination fields with no
//!   source counterpart receive their zero value, and source fields with no
//!   destination counterpart are ignored.
//! * Lists decode into sequences element by element. Tuples must have exactly
//!   as many elements as the source.
//! * Maps decode into maps, with keys and values decoded independently.
//! * Scalars decode into the same scalar type or into a type that can hold
//!   every value of the source type, e.g. `INTEGER` into `i64` but not `DOUBLE`
//!   into `i32`.
//! * Destinations that declare no shape (`deserialize_any`) receive the full
//!   nested structure of the source. See [`AnyValue`](crate::AnyValue).

use std::fmt;
use std::iter;

use serde::Deserialize;
use serde::de::value::BorrowedStrDeserializer;
use serde::de::{self, DeserializeOwned, DeserializeSeed, MapAccess, SeqAccess, Visitor};
use tracing::{debug, trace};

use crate::Error;
use crate::adt::decimal::{DECIMAL_FIELDS, DECIMAL_NAME, Decimal};
use crate::adt::interval::{INTERVAL_FIELDS, Interval};
use crate::adt::uuid::{UUID_LENGTH, UUID_NAME, format_uuid, uuid_from_value};
use crate::value::Value;

/// Controls how lenient a [`Decoder`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DecodeConfig {
    /// Whether struct fields may match names that differ only in case.
    pub case_insensitive_fields: bool,
    /// Whether destination struct fields missing from the source receive their
    /// zero value. If not, they are left to the destination type, which
    /// usually reports them as missing.
    pub zero_fill_missing: bool,
    /// Whether `NULL` decodes into a non-optional destination as its zero
    /// value. If not, doing so is a type mismatch.
    pub null_as_zero: bool,
}

impl Default for DecodeConfig {
    fn default() -> DecodeConfig {
        DecodeConfig {
            case_insensitive_fields: true,
            zero_fill_missing: true,
            null_as_zero: true,
        }
    }
}

/// Decodes `value` into a `T` with the default [`DecodeConfig`].
pub fn from_value<'de, T: Deserialize<'de>>(value: &'de Value) -> Result<T, Error> {
    from_value_with(value, DecodeConfig::default())
}

/// Decodes `value` into a `T`.
pub fn from_value_with<'de, T: Deserialize<'de>>(
    value: &'de Value,
    config: DecodeConfig,
) -> Result<T, Error> {
    T::deserialize(Decoder::with_config(value, config))
}

/// Decodes `value` into `dest`, replacing its previous contents.
///
/// `dest` is assigned only if decoding succeeds.
pub fn decode_into<T: DeserializeOwned>(value: &Value, dest: &mut T) -> Result<(), Error> {
    *dest = from_value(value)?;
    Ok(())
}

/// A deserializer for a single [`Value`].
pub struct Decoder<'de> {
    source: Source<'de>,
    config: DecodeConfig,
}

/// What a [`Decoder`] reads from.
#[derive(Debug, Clone)]
enum Source<'de> {
    /// A value handed over by the engine.
    Value(&'de Value),
    /// A scalar synthesized from the parts of a decimal or interval.
    Field(Value),
    /// Nothing at all. Decodes as the destination's zero value.
    Zero,
}

impl<'de> Decoder<'de> {
    /// Constructs a decoder with the default [`DecodeConfig`].
    pub fn new(value: &'de Value) -> Decoder<'de> {
        Decoder::with_config(value, DecodeConfig::default())
    }

    /// Constructs a decoder with the specified configuration.
    pub fn with_config(value: &'de Value, config: DecodeConfig) -> Decoder<'de> {
        Decoder {
            source: Source::Value(value),
            config,
        }
    }

    fn is_null(&self) -> bool {
        match &self.source {
            Source::Value(v) => v.is_null(),
            Source::Field(v) => v.is_null(),
            Source::Zero => true,
        }
    }

    fn decode<V: Visitor<'de>>(self, shape: Shape, visitor: V) -> Result<V::Value, Error> {
        match shape {
            Shape::Ignored => return visitor.visit_unit(),
            Shape::Newtype => return visitor.visit_newtype_struct(self),
            Shape::Option if self.is_null() => return visitor.visit_none(),
            Shape::Option => return visitor.visit_some(self),
            _ => (),
        }

        let config = self.config;
        let value = match self.source {
            Source::Zero => return zero(shape, config, visitor),
            Source::Field(v) => return scalar(&v, shape, visitor),
            Source::Value(v) => v,
        };
        let mismatch = || Error::mismatch(value.type_name(), shape.to_string());

        // UUIDs accept several engine representations, so the destination
        // decides before the source does.
        if shape == Shape::Uuid {
            return match value {
                Value::Null if config.null_as_zero => zero(shape, config, visitor),
                Value::Null => Err(mismatch()),
                _ => visitor.visit_bytes(uuid_from_value(value)?.as_bytes()),
            };
        }

        match value {
            Value::Null => match shape {
                Shape::Any | Shape::Unit => visitor.visit_unit(),
                _ if config.null_as_zero => zero(shape, config, visitor),
                _ => Err(mismatch()),
            },
            Value::Varchar(s) => match shape {
                Shape::Scalar(Kind::Str) | Shape::Any => visitor.visit_borrowed_str(s),
                Shape::Scalar(Kind::Bytes) => visitor.visit_borrowed_bytes(s.as_bytes()),
                Shape::Enum(_) => visitor.visit_enum(BorrowedStrDeserializer::<Error>::new(s)),
                _ => scalar(value, shape, visitor),
            },
            Value::Blob(b) => match shape {
                // Strings accept UTF-8 bytes themselves.
                Shape::Scalar(Kind::Str | Kind::Bytes) | Shape::Any => {
                    visitor.visit_borrowed_bytes(b)
                }
                Shape::Seq | Shape::Tuple(_) => bytes(value, b, shape, config, visitor),
                _ => Err(mismatch()),
            },
            Value::Uuid(u) => match shape {
                Shape::Scalar(Kind::Str) => visitor.visit_string(format_uuid(u)),
                Shape::Scalar(Kind::Bytes) | Shape::Any => visitor.visit_borrowed_bytes(u.as_bytes()),
                Shape::Seq | Shape::Tuple(UUID_LENGTH) => {
                    bytes(value, u.as_bytes(), shape, config, visitor)
                }
                _ => Err(mismatch()),
            },
            Value::Decimal(d) => match shape {
                Shape::Record(_, declared) => record(decimal_fields(d), declared, config, visitor),
                Shape::Map => visitor.visit_map(Entries::new(
                    decimal_fields(d).map(|(k, v)| (Key::Str(k), v)),
                    config,
                )),
                _ => scalar(value, shape, visitor),
            },
            Value::Interval(i) => match shape {
                Shape::Record(_, declared) => record(interval_fields(i), declared, config, visitor),
                Shape::Map | Shape::Any => visitor.visit_map(Entries::new(
                    interval_fields(i).map(|(k, v)| (Key::Str(k), v)),
                    config,
                )),
                _ => Err(mismatch()),
            },
            Value::List(items) => match shape {
                Shape::Seq | Shape::Any => {
                    visitor.visit_seq(Elements::new(items.iter().map(Source::Value), config))
                }
                Shape::Tuple(n) if n == items.len() => {
                    visitor.visit_seq(Elements::new(items.iter().map(Source::Value), config))
                }
                Shape::Tuple(_) => Err(Error::mismatch(
                    value.type_name(),
                    format!("{shape} (source has {})", items.len()),
                )),
                _ => Err(mismatch()),
            },
            Value::Struct(fields) => match shape {
                Shape::Record(_, declared) => record(
                    fields.iter().map(|(name, v)| (name.as_str(), Source::Value(v))),
                    declared,
                    config,
                    visitor,
                ),
                Shape::Map | Shape::Any => visitor.visit_map(Entries::new(
                    fields
                        .iter()
                        .map(|(name, v)| (Key::Str(name.as_str()), Source::Value(v))),
                    config,
                )),
                Shape::Seq => visitor.visit_seq(Elements::new(
                    fields.iter().map(|(_, v)| Source::Value(v)),
                    config,
                )),
                Shape::Tuple(n) if n == fields.len() => visitor.visit_seq(Elements::new(
                    fields.iter().map(|(_, v)| Source::Value(v)),
                    config,
                )),
                _ => Err(mismatch()),
            },
            Value::Map(pairs) => match shape {
                Shape::Map | Shape::Any => visitor.visit_map(Entries::new(
                    pairs.iter().map(|(k, v)| (Key::Value(k), Source::Value(v))),
                    config,
                )),
                Shape::Record(_, declared) => {
                    let fields = pairs.iter().filter_map(|(k, v)| match k {
                        Value::Varchar(name) => Some((name.as_str(), Source::Value(v))),
                        _ => {
                            trace!(key_type = k.type_name(), "ignoring non-string map key");
                            None
                        }
                    });
                    record(fields, declared, config, visitor)
                }
                _ => Err(mismatch()),
            },
            _ => scalar(value, shape, visitor),
        }
    }
}

/// The shape a destination declares by the `deserialize_*` method it calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    /// No declared shape; the source's own shape is reproduced.
    Any,
    Scalar(Kind),
    Option,
    Unit,
    Newtype,
    /// An [`EngineUuid`](crate::EngineUuid).
    Uuid,
    Seq,
    Tuple(usize),
    Map,
    /// A struct with the given name and field names.
    Record(&'static str, &'static [&'static str]),
    Enum(&'static str),
    Ignored,
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Shape::Any => f.write_str("any value"),
            Shape::Scalar(kind) => kind.fmt(f),
            Shape::Option => f.write_str("an option"),
            Shape::Unit => f.write_str("unit"),
            Shape::Newtype => f.write_str("a newtype"),
            Shape::Uuid => f.write_str("a UUID"),
            Shape::Seq => f.write_str("a sequence"),
            Shape::Tuple(n) => write!(f, "a tuple of {n} elements"),
            Shape::Map => f.write_str("a map"),
            Shape::Record(DECIMAL_NAME, _) => f.write_str("a decimal"),
            Shape::Record(name, _) => write!(f, "struct {name}"),
            Shape::Enum(name) => write!(f, "enum {name}"),
            Shape::Ignored => f.write_str("an ignored value"),
        }
    }
}

/// The scalar types a destination can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Bool,
    I8,
    I16,
    I32,
    I64,
    I128,
    U8,
    U16,
    U32,
    U64,
    U128,
    F32,
    F64,
    Char,
    Str,
    Bytes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Class {
    Signed,
    Unsigned,
    Float,
    Other,
}

impl Kind {
    /// The kind of a numeric or boolean engine value.
    fn of(value: &Value) -> Option<Kind> {
        Some(match value {
            Value::Boolean(_) => Kind::Bool,
            Value::TinyInt(_) => Kind::I8,
            Value::SmallInt(_) => Kind::I16,
            Value::Integer(_) => Kind::I32,
            Value::BigInt(_) => Kind::I64,
            Value::HugeInt(_) => Kind::I128,
            Value::UTinyInt(_) => Kind::U8,
            Value::USmallInt(_) => Kind::U16,
            Value::UInteger(_) => Kind::U32,
            Value::UBigInt(_) => Kind::U64,
            Value::Float(_) => Kind::F32,
            Value::Double(_) => Kind::F64,
            _ => return None,
        })
    }

    fn class(self) -> Class {
        match self {
            Kind::I8 | Kind::I16 | Kind::I32 | Kind::I64 | Kind::I128 => Class::Signed,
            Kind::U8 | Kind::U16 | Kind::U32 | Kind::U64 | Kind::U128 => Class::Unsigned,
            Kind::F32 | Kind::F64 => Class::Float,
            Kind::Bool | Kind::Char | Kind::Str | Kind::Bytes => Class::Other,
        }
    }

    fn bits(self) -> u32 {
        match self {
            Kind::I8 | Kind::U8 => 8,
            Kind::I16 | Kind::U16 => 16,
            Kind::I32 | Kind::U32 | Kind::F32 => 32,
            Kind::I64 | Kind::U64 | Kind::F64 => 64,
            Kind::I128 | Kind::U128 => 128,
            Kind::Bool | Kind::Char | Kind::Str | Kind::Bytes => 0,
        }
    }

    /// The widest integer, in bits, that the float kind represents exactly.
    fn mantissa_bits(self) -> u32 {
        match self {
            Kind::F32 => f32::MANTISSA_DIGITS,
            Kind::F64 => f64::MANTISSA_DIGITS,
            _ => 0,
        }
    }

    /// Reports whether every value of this kind is representable in `target`.
    fn widens_to(self, target: Kind) -> bool {
        if self == target {
            return true;
        }
        match (self.class(), target.class()) {
            (Class::Signed, Class::Signed)
            | (Class::Unsigned, Class::Unsigned)
            | (Class::Unsigned, Class::Signed)
            | (Class::Float, Class::Float) => target.bits() > self.bits(),
            (Class::Signed | Class::Unsigned, Class::Float) => self.bits() <= target.mantissa_bits(),
            _ => false,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Kind::Bool => "bool",
            Kind::I8 => "i8",
            Kind::I16 => "i16",
            Kind::I32 => "i32",
            Kind::I64 => "i64",
            Kind::I128 => "i128",
            Kind::U8 => "u8",
            Kind::U16 => "u16",
            Kind::U32 => "u32",
            Kind::U64 => "u64",
            Kind::U128 => "u128",
            Kind::F32 => "f32",
            Kind::F64 => "f64",
            Kind::Char => "char",
            Kind::Str => "string",
            Kind::Bytes => "bytes",
        })
    }
}

/// Decodes a scalar source. The visitor sees the source's own type, which the
/// destination is known to accept whenever the types widen.
fn scalar<'de, V: Visitor<'de>>(value: &Value, shape: Shape, visitor: V) -> Result<V::Value, Error> {
    let mismatch = || Error::mismatch(value.type_name(), shape.to_string());

    if let Some(kind) = Kind::of(value) {
        let accepted = match shape {
            Shape::Any => true,
            Shape::Scalar(target) => kind.widens_to(target),
            _ => false,
        };
        if !accepted {
            return Err(mismatch());
        }
        return match *value {
            Value::Boolean(b) => visitor.visit_bool(b),
            Value::TinyInt(i) => visitor.visit_i8(i),
            Value::SmallInt(i) => visitor.visit_i16(i),
            Value::Integer(i) => visitor.visit_i32(i),
            Value::BigInt(i) => visitor.visit_i64(i),
            Value::HugeInt(h) => visitor.visit_i128(h.to_i128()),
            Value::UTinyInt(u) => visitor.visit_u8(u),
            Value::USmallInt(u) => visitor.visit_u16(u),
            Value::UInteger(u) => visitor.visit_u32(u),
            Value::UBigInt(u) => visitor.visit_u64(u),
            Value::Float(f) => visitor.visit_f32(f.into_inner()),
            Value::Double(f) => visitor.visit_f64(f.into_inner()),
            _ => Err(mismatch()),
        };
    }

    match (value, shape) {
        (Value::Varchar(s), Shape::Scalar(Kind::Str) | Shape::Any) => visitor.visit_str(s),
        (Value::Varchar(s), Shape::Scalar(Kind::Bytes)) => visitor.visit_bytes(s.as_bytes()),
        (Value::Varchar(s), Shape::Scalar(Kind::Char)) => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => visitor.visit_char(c),
                _ => Err(mismatch()),
            }
        }
        (Value::Decimal(d), Shape::Scalar(Kind::F64) | Shape::Any) => visitor.visit_f64(d.to_f64()),
        (Value::Decimal(d), Shape::Scalar(Kind::Str)) => visitor.visit_string(d.to_string()),
        _ => Err(mismatch()),
    }
}

/// Decodes the bytes of `value` as a sequence of `u8`s.
fn bytes<'de, V: Visitor<'de>>(
    value: &Value,
    b: &[u8],
    shape: Shape,
    config: DecodeConfig,
    visitor: V,
) -> Result<V::Value, Error> {
    if matches!(shape, Shape::Tuple(n) if n != b.len()) {
        return Err(Error::mismatch(value.type_name(), shape.to_string()));
    }
    let elements = b.iter().map(|b| Source::Field(Value::UTinyInt(*b)));
    visitor.visit_seq(Elements::new(elements, config))
}

/// Decodes the zero value of `shape`.
fn zero<'de, V: Visitor<'de>>(
    shape: Shape,
    config: DecodeConfig,
    visitor: V,
) -> Result<V::Value, Error> {
    match shape {
        Shape::Any | Shape::Unit | Shape::Ignored => visitor.visit_unit(),
        Shape::Option => visitor.visit_none(),
        Shape::Newtype => visitor.visit_newtype_struct(Decoder {
            source: Source::Zero,
            config,
        }),
        Shape::Uuid => visitor.visit_borrowed_bytes(&[0; UUID_LENGTH]),
        Shape::Scalar(kind) => match kind {
            Kind::Bool => visitor.visit_bool(false),
            Kind::I8 => visitor.visit_i8(0),
            Kind::I16 => visitor.visit_i16(0),
            Kind::I32 => visitor.visit_i32(0),
            Kind::I64 => visitor.visit_i64(0),
            Kind::I128 => visitor.visit_i128(0),
            Kind::U8 => visitor.visit_u8(0),
            Kind::U16 => visitor.visit_u16(0),
            Kind::U32 => visitor.visit_u32(0),
            Kind::U64 => visitor.visit_u64(0),
            Kind::U128 => visitor.visit_u128(0),
            Kind::F32 => visitor.visit_f32(0.0),
            Kind::F64 => visitor.visit_f64(0.0),
            Kind::Char => visitor.visit_char('\0'),
            Kind::Str => visitor.visit_borrowed_str(""),
            Kind::Bytes => visitor.visit_borrowed_bytes(&[]),
        },
        Shape::Seq => visitor.visit_seq(Elements::new(iter::empty::<Source<'de>>(), config)),
        Shape::Tuple(n) => visitor.visit_seq(Elements::new(
            iter::repeat_with(|| Source::Zero).take(n),
            config,
        )),
        Shape::Map => visitor.visit_map(Entries::new(
            iter::empty::<(Key<'de>, Source<'de>)>(),
            config,
        )),
        // A decimal's zero needs a valid width.
        Shape::Record(DECIMAL_NAME, _) => {
            let zero = DECIMAL_FIELDS.iter().copied().zip([
                Value::UTinyInt(1),
                Value::UTinyInt(0),
                Value::Varchar("0".into()),
            ]);
            visitor.visit_map(Entries::new(
                zero.map(|(k, v)| (Key::Str(k), Source::Field(v))),
                config,
            ))
        }
        Shape::Record(_, fields) => visitor.visit_map(Entries::new(
            fields.iter().map(|&f| (Key::Str(f), Source::Zero)),
            config,
        )),
        Shape::Enum(name) => Err(Error::UnsupportedShape(format!(
            "enum {name} has no zero value"
        ))),
    }
}

/// Matches named source fields against the fields a struct declares.
///
/// Each declared field takes the first unclaimed source field with exactly its
/// name, or failing that, the first unclaimed one whose name is equal ignoring
/// case.
fn record<'de, V: Visitor<'de>>(
    fields: impl IntoIterator<Item = (&'de str, Source<'de>)>,
    declared: &'static [&'static str],
    config: DecodeConfig,
    visitor: V,
) -> Result<V::Value, Error> {
    let mut unclaimed: Vec<Option<(&'de str, Source<'de>)>> = fields.into_iter().map(Some).collect();

    let mut matched: Vec<Option<Source<'de>>> = declared
        .iter()
        .map(|field| {
            let i = unclaimed
                .iter()
                .position(|f| matches!(f, Some((name, _)) if name == field))?;
            unclaimed[i].take().map(|(_, source)| source)
        })
        .collect();

    if config.case_insensitive_fields {
        for (&field, slot) in declared.iter().zip(&mut matched) {
            if slot.is_some() {
                continue;
            }
            let lower = field.to_lowercase();
            let Some(i) = unclaimed
                .iter()
                .position(|f| matches!(f, Some((name, _)) if name.to_lowercase() == lower))
            else {
                continue;
            };
            if let Some((name, source)) = unclaimed[i].take() {
                debug!(field, source_field = name, "matched struct field ignoring case");
                *slot = Some(source);
            }
        }
    }

    for (name, _) in unclaimed.into_iter().flatten() {
        trace!(source_field = name, "ignoring unmatched struct field");
    }

    let mut entries = Vec::with_capacity(declared.len());
    for (&field, slot) in declared.iter().zip(matched) {
        match slot {
            Some(source) => entries.push((Key::Str(field), source)),
            None if config.zero_fill_missing => {
                trace!(field, "zero-filling missing struct field");
                entries.push((Key::Str(field), Source::Zero));
            }
            None => (),
        }
    }
    visitor.visit_map(Entries::new(entries.into_iter(), config))
}

fn decimal_fields<'de>(d: &Decimal) -> impl Iterator<Item = (&'de str, Source<'de>)> {
    let parts = [
        Value::UTinyInt(d.width()),
        Value::UTinyInt(d.scale()),
        Value::Varchar(d.value().to_string()),
    ];
    DECIMAL_FIELDS
        .iter()
        .copied()
        .zip(parts)
        .map(|(k, v)| (k, Source::Field(v)))
}

fn interval_fields<'de>(i: &Interval) -> impl Iterator<Item = (&'de str, Source<'de>)> {
    let parts = [
        Value::Integer(i.months),
        Value::Integer(i.days),
        Value::BigInt(i.micros),
    ];
    INTERVAL_FIELDS
        .iter()
        .copied()
        .zip(parts)
        .map(|(k, v)| (k, Source::Field(v)))
}

struct Elements<I> {
    iter: I,
    config: DecodeConfig,
}

impl<I> Elements<I> {
    fn new(iter: I, config: DecodeConfig) -> Elements<I> {
        Elements { iter, config }
    }
}

impl<'de, I: Iterator<Item = Source<'de>>> SeqAccess<'de> for Elements<I> {
    type Error = Error;

    fn next_element_seed<T: DeserializeSeed<'de>>(
        &mut self,
        seed: T,
    ) -> Result<Option<T::Value>, Error> {
        match self.iter.next() {
            Some(source) => seed
                .deserialize(Decoder {
                    source,
                    config: self.config,
                })
                .map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        match self.iter.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(upper),
            _ => None,
        }
    }
}

/// A map key.
enum Key<'de> {
    /// A field name.
    Str(&'de str),
    /// An engine map key, decoded like any other value.
    Value(&'de Value),
}

struct Entries<'de, I> {
    iter: I,
    value: Option<Source<'de>>,
    config: DecodeConfig,
}

impl<'de, I> Entries<'de, I> {
    fn new(iter: I, config: DecodeConfig) -> Entries<'de, I> {
        Entries {
            iter,
            value: None,
            config,
        }
    }
}

impl<'de, I: Iterator<Item = (Key<'de>, Source<'de>)>> MapAccess<'de> for Entries<'de, I> {
    type Error = Error;

    fn next_key_seed<K: DeserializeSeed<'de>>(&mut self, seed: K) -> Result<Option<K::Value>, Error> {
        let Some((key, value)) = self.iter.next() else {
            return Ok(None);
        };
        self.value = Some(value);
        match key {
            Key::Str(name) => seed.deserialize(BorrowedStrDeserializer::<Error>::new(name)).map(Some),
            Key::Value(v) => seed
                .deserialize(Decoder {
                    source: Source::Value(v),
                    config: self.config,
                })
                .map(Some),
        }
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value, Error> {
        match self.value.take() {
            Some(source) => seed.deserialize(Decoder {
                source,
                config: self.config,
            }),
            None => Err(de::Error::custom("map value requested before its key")),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        match self.iter.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(upper),
            _ => None,
        }
    }
}

macro_rules! deserialize_scalar {
    ($($method:ident => $kind:ident),* $(,)?) => {
        $(
            fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
                self.decode(Shape::Scalar(Kind::$kind), visitor)
            }
        )*
    };
}

impl<'de> de::Deserializer<'de> for Decoder<'de> {
    type Error = Error;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        self.decode(Shape::Any, visitor)
    }

    deserialize_scalar! {
        deserialize_bool => Bool,
        deserialize_i8 => I8,
        deserialize_i16 => I16,
        deserialize_i32 => I32,
        deserialize_i64 => I64,
        deserialize_i128 => I128,
        deserialize_u8 => U8,
        deserialize_u16 => U16,
        deserialize_u32 => U32,
        deserialize_u64 => U64,
        deserialize_u128 => U128,
        deserialize_f32 => F32,
        deserialize_f64 => F64,
        deserialize_char => Char,
        deserialize_str => Str,
        deserialize_string => Str,
        deserialize_bytes => Bytes,
        deserialize_byte_buf => Bytes,
        deserialize_identifier => Str,
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        self.decode(Shape::Option, visitor)
    }

    fn deserialize_unit<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        self.decode(Shape::Unit, visitor)
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        _: &'static str,
        visitor: V,
    ) -> Result<V::Value, Error> {
        self.decode(Shape::Unit, visitor)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Error> {
        if name == UUID_NAME {
            self.decode(Shape::Uuid, visitor)
        } else {
            self.decode(Shape::Newtype, visitor)
        }
    }

    fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        self.decode(Shape::Seq, visitor)
    }

    fn deserialize_tuple<V: Visitor<'de>>(self, len: usize, visitor: V) -> Result<V::Value, Error> {
        self.decode(Shape::Tuple(len), visitor)
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        _: &'static str,
        len: usize,
        visitor: V,
    ) -> Result<V::Value, Error> {
        self.decode(Shape::Tuple(len), visitor)
    }

    fn deserialize_map<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        self.decode(Shape::Map, visitor)
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Error> {
        self.decode(Shape::Record(name, fields), visitor)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Error> {
        self.decode(Shape::Enum(name), visitor)
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        self.decode(Shape::Ignored, visitor)
    }
}
