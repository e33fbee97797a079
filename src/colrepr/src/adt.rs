// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Abstract data types.
//!
//! Native Rust types are used for the engine's primitive types, but its wider
//! and structured types require custom implementations, which are contained in
//! this module.

pub mod decimal;
pub mod hugeint;
pub mod interval;
pub mod map;
pub mod uuid;
