// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Errors produced while converting values.

use std::fmt;

use serde::de;

/// An error that occurred while converting a single value.
///
/// Every error is local to the conversion call that produced it. A destination
/// that was being decoded into when an error occurred must not be relied upon.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A value cannot be represented in a fixed-width target.
    #[error("{value} is out of range for type {target}")]
    OutOfRange {
        /// The textual form of the offending value.
        value: String,
        /// The name of the target type.
        target: &'static str,
    },
    /// The input is neither a 16-byte sequence nor a parseable UUID string.
    #[error("invalid UUID: {0}")]
    InvalidUuidFormat(String),
    /// A source value cannot be coerced into the destination's declared type.
    #[error("cannot decode {found} into {expected}")]
    TypeMismatch {
        /// The engine type name of the source value.
        found: &'static str,
        /// A description of the destination.
        expected: String,
    },
    /// The destination declares a shape that cannot be populated.
    #[error("unsupported destination shape: {0}")]
    UnsupportedShape(String),
    /// A decimal's width, scale or physical storage is invalid.
    #[error("invalid decimal: {0}")]
    InvalidDecimal(String),
    /// An error raised by a destination type's own deserialization logic.
    #[error("{0}")]
    Custom(String),
}

impl Error {
    pub(crate) fn out_of_range(value: impl fmt::Display, target: &'static str) -> Error {
        Error::OutOfRange {
            value: value.to_string(),
            target,
        }
    }

    pub(crate) fn mismatch(found: &'static str, expected: impl Into<String>) -> Error {
        Error::TypeMismatch {
            found,
            expected: expected.into(),
        }
    }
}

impl de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}
