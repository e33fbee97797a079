// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Conversions between UUIDs and the engine's UUID representation.
//!
//! The engine stores a UUID as a [`HugeInt`] whose upper word has its sign bit
//! flipped relative to the UUID's first eight bytes. With the flip, the
//! unsigned byte-wise order of UUIDs matches the signed numeric order of the
//! 128-bit integers.

use std::{fmt, str};

use byteorder::{BigEndian, ByteOrder};
use serde::de::{self, Deserialize, Deserializer, Visitor};
use uuid::Uuid;

use crate::Error;
use crate::adt::hugeint::HugeInt;
use crate::value::Value;

/// The length of a UUID in bytes.
pub const UUID_LENGTH: usize = 16;

/// The length of a canonical UUID string.
pub const UUID_STRING_LENGTH: usize = 36;

const SIGN_BIT: u64 = 1 << 63;

/// Converts a UUID into the engine's 128-bit integer form.
pub fn uuid_to_hugeint(u: &Uuid) -> HugeInt {
    let bytes = u.as_bytes();
    let upper = BigEndian::read_u64(&bytes[..8]) ^ SIGN_BIT;
    let lower = BigEndian::read_u64(&bytes[8..]);
    HugeInt::new(i64::from_ne_bytes(upper.to_ne_bytes()), lower)
}

/// Converts the engine's 128-bit integer form of a UUID back into a UUID.
pub fn hugeint_to_uuid(h: HugeInt) -> Uuid {
    let mut bytes = [0; UUID_LENGTH];
    let upper = u64::from_ne_bytes(h.upper().to_ne_bytes()) ^ SIGN_BIT;
    BigEndian::write_u64(&mut bytes[..8], upper);
    BigEndian::write_u64(&mut bytes[8..], h.lower());
    Uuid::from_bytes(bytes)
}

/// Formats a UUID as lower-case hex grouped 8-4-4-4-12, e.g.
/// `53b4e983-b287-481a-94ad-6e3c90489913`.
pub fn format_uuid(u: &Uuid) -> String {
    let mut buf = [0; UUID_STRING_LENGTH];
    u.hyphenated().encode_lower(&mut buf).to_owned()
}

/// Parses a UUID from any of its textual forms.
pub fn parse_uuid_str(s: &str) -> Result<Uuid, Error> {
    Uuid::parse_str(s).map_err(|e| Error::InvalidUuidFormat(format!("{s:?}: {e}")))
}

/// Interprets `b` as a UUID.
///
/// Exactly sixteen bytes are taken as the raw UUID. Any other length is
/// treated as the UTF-8 text of a UUID.
pub fn parse_uuid_bytes(b: &[u8]) -> Result<Uuid, Error> {
    if b.len() == UUID_LENGTH {
        let mut bytes = [0; UUID_LENGTH];
        bytes.copy_from_slice(b);
        return Ok(Uuid::from_bytes(bytes));
    }
    let s = str::from_utf8(b)
        .map_err(|e| Error::InvalidUuidFormat(format!("{} bytes: {e}", b.len())))?;
    parse_uuid_str(s)
}

/// Converts any engine value that can carry a UUID into one.
///
/// Accepts the engine's UUID type and its 128-bit integer form, blobs (see
/// [`parse_uuid_bytes`]) and strings.
pub fn uuid_from_value(value: &Value) -> Result<Uuid, Error> {
    match value {
        Value::Uuid(u) => Ok(*u),
        Value::HugeInt(h) => Ok(hugeint_to_uuid(*h)),
        Value::Blob(b) => parse_uuid_bytes(b),
        Value::Varchar(s) => parse_uuid_str(s),
        _ => Err(Error::InvalidUuidFormat(format!(
            "invalid UUID value type: {}",
            value.type_name()
        ))),
    }
}

/// The newtype name an [`EngineUuid`] requests from deserializers.
pub(crate) const UUID_NAME: &str = "$colrepr::Uuid";

/// A UUID destination with the engine's decoding rules.
///
/// Unlike a bare [`Uuid`], an `EngineUuid` decodes from every engine value
/// that [`uuid_from_value`] accepts, reports bad input as
/// [`Error::InvalidUuidFormat`], and zero-fills as the nil UUID.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EngineUuid(pub Uuid);

impl EngineUuid {
    /// Returns the wrapped UUID.
    pub fn into_inner(self) -> Uuid {
        self.0
    }
}

impl From<Uuid> for EngineUuid {
    fn from(u: Uuid) -> EngineUuid {
        EngineUuid(u)
    }
}

impl From<EngineUuid> for Uuid {
    fn from(u: EngineUuid) -> Uuid {
        u.0
    }
}

impl fmt::Display for EngineUuid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&format_uuid(&self.0))
    }
}

impl<'de> Deserialize<'de> for EngineUuid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<EngineUuid, D::Error> {
        struct EngineUuidVisitor;

        impl<'de> Visitor<'de> for EngineUuidVisitor {
            type Value = EngineUuid;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a UUID as 16 bytes or text")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<EngineUuid, E> {
                parse_uuid_str(v).map(EngineUuid).map_err(E::custom)
            }

            fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<EngineUuid, E> {
                parse_uuid_bytes(v).map(EngineUuid).map_err(E::custom)
            }

            fn visit_newtype_struct<D: Deserializer<'de>>(
                self,
                deserializer: D,
            ) -> Result<EngineUuid, D::Error> {
                deserializer.deserialize_any(self)
            }
        }

        deserializer.deserialize_newtype_struct(UUID_NAME, EngineUuidVisitor)
    }
}
