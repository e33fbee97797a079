// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! A generic destination for engine maps.

use std::collections::BTreeMap;
use std::ops::Deref;

use crate::any::AnyValue;

/// An engine `MAP` whose key and value types are not known statically.
///
/// Keys and values are decoded as [`AnyValue`]s. If the engine map contains a
/// key more than once, the last occurrence wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Map(pub BTreeMap<AnyValue, AnyValue>);

impl Map {
    /// Consumes the map, returning its entries.
    pub fn into_inner(self) -> BTreeMap<AnyValue, AnyValue> {
        self.0
    }
}

impl Deref for Map {
    type Target = BTreeMap<AnyValue, AnyValue>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<BTreeMap<AnyValue, AnyValue>> for Map {
    fn from(m: BTreeMap<AnyValue, AnyValue>) -> Map {
        Map(m)
    }
}
