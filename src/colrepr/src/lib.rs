// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Value representation for a columnar analytical engine client.
//!
//! The transport layer extracts each result column or nested value into a
//! [`Value`]. This crate converts between those values and host types: it
//! implements the engine's wide and structured types ([`HugeInt`],
//! [`Decimal`], [`Interval`], UUIDs), decodes nested composite values into
//! caller-declared destinations ([`from_value`]), and converts host values
//! back for parameter binding ([`ToValue`]).
//!
//! All conversions are pure and synchronous, and every public type is
//! `Send + Sync`.

#![warn(missing_docs)]

pub mod adt;
pub mod any;
pub mod de;
mod error;
pub mod scan;
pub mod value;

pub use crate::adt::decimal::{Decimal, DecimalStorage};
pub use crate::adt::hugeint::HugeInt;
pub use crate::adt::interval::Interval;
pub use crate::adt::map::Map;
pub use crate::adt::uuid::EngineUuid;
pub use crate::any::AnyValue;
pub use crate::de::{DecodeConfig, Decoder, decode_into, from_value, from_value_with};
pub use crate::error::Error;
pub use crate::scan::{Composite, Scan, scan_into};
pub use crate::value::{ToValue, Value};
