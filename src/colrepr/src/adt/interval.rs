// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! A time interval abstract data type.

use serde::{Deserialize, Serialize};

/// The field names an interval is decoded from.
pub(crate) const INTERVAL_FIELDS: &[&str] = &["months", "days", "micros"];

/// An interval of time as the engine represents it.
///
/// The three fields are independent. No field is ever carried over into
/// another, so one day and 86,400 seconds are different intervals.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Interval {
    /// A possibly negative number of months.
    pub months: i32,
    /// A possibly negative number of days.
    pub days: i32,
    /// A possibly negative timespan in microseconds.
    pub micros: i64,
}

impl Interval {
    /// Constructs a new `Interval` with the specified units of time.
    pub const fn new(months: i32, days: i32, micros: i64) -> Interval {
        Interval {
            months,
            days,
            micros,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_normalization() {
        let one_day = Interval::new(0, 1, 0);
        let day_of_micros = Interval::new(0, 0, 24 * 60 * 60 * 1_000_000);
        assert_ne!(one_day, day_of_micros);
        assert_ne!(Interval::new(1, 0, 0), Interval::new(0, 30, 0));
        assert_eq!(Interval::new(4, 10, 4), Interval { months: 4, days: 10, micros: 4 });
        assert_eq!(Interval::default(), Interval::new(0, 0, 0));
    }
}
