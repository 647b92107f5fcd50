// Copyright 2023 Marsh J. Ray
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use std::io::Write;
use std::iter::FusedIterator;

/// Lazy sequence `0, 1, ..., bound - 1`.
///
/// Holds only the unconsumed half-open range `[next, end)`, so a clone taken at
/// any point replays exactly the values not yet produced.
///
/// Only `count_to` builds one, so `0 <= next` and `0 <= end` always hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Counter {
    next: i64,
    end: i64,
}

impl Counter {
    /// Returns true iff every value has been produced.
    pub fn is_done(&self) -> bool {
        self.next >= self.end
    }

    fn remaining(&self) -> usize {
        let n = self.end.saturating_sub(self.next).max(0);
        usize::try_from(n).unwrap_or(usize::MAX)
    }
}

/// Returns the lazy sequence `0..bound`. Negative bounds produce nothing.
pub fn count_to(bound: i64) -> Counter {
    Counter {
        next: 0,
        end: bound.max(0),
    }
}

impl Iterator for Counter {
    type Item = i64;

    fn next(&mut self) -> Option<i64> {
        if self.is_done() {
            return None;
        }
        let value = self.next;
        self.next += 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining();
        (n, Some(n))
    }
}

impl DoubleEndedIterator for Counter {
    fn next_back(&mut self) -> Option<i64> {
        if self.is_done() {
            return None;
        }
        self.end -= 1;
        Some(self.end)
    }
}

impl ExactSizeIterator for Counter {}

impl FusedIterator for Counter {}

/// Writes each value of `count_to(bound)` on its own line.
pub fn print_counter<W: Write + ?Sized>(bound: i64, out: &mut W) -> std::io::Result<()> {
    let mut n_written = 0usize;
    for value in count_to(bound) {
        writeln!(out, "{value}")?;
        n_written += 1;
    }
    log::debug!("counter: wrote {n_written} values for bound {bound}");
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn produces_bound_values_in_order() {
        for bound in 0..50 {
            let values = count_to(bound).collect::<Vec<_>>();
            assert_eq!(values.len(), bound as usize);
            assert!(values.windows(2).all(|w| w[0] < w[1]));
            if bound > 0 {
                assert_eq!(values.first(), Some(&0));
                assert_eq!(values.last(), Some(&(bound - 1)));
            }
        }
    }

    #[test]
    fn zero_and_negative_are_empty() {
        assert_eq!(count_to(0).next(), None);
        assert_eq!(count_to(-3).next(), None);
        assert_eq!(count_to(i64::MIN).len(), 0);
    }

    #[test]
    fn restartable() {
        let first = count_to(7).collect::<Vec<_>>();
        let second = count_to(7).collect::<Vec<_>>();
        assert_eq!(first, second);
    }

    #[test]
    fn clone_replays_remaining() {
        let mut counter = count_to(5);
        counter.next();
        counter.next();
        let replay = counter.clone();
        assert_eq!(counter.collect::<Vec<_>>(), vec![2, 3, 4]);
        assert_eq!(replay.collect::<Vec<_>>(), vec![2, 3, 4]);
    }

    #[test]
    fn exact_size_and_both_ends() {
        let mut counter = count_to(4);
        assert_eq!(counter.len(), 4);
        assert_eq!(counter.next_back(), Some(3));
        assert_eq!(counter.next(), Some(0));
        assert_eq!(counter.len(), 2);
        assert_eq!(counter.by_ref().rev().collect::<Vec<_>>(), vec![2, 1]);
        assert!(counter.is_done());
        assert_eq!(counter.next(), None);
        assert_eq!(counter.next_back(), None);
    }

    #[test]
    fn extreme_bound_does_not_overflow() {
        let mut counter = count_to(i64::MAX);
        assert_eq!(counter.next_back(), Some(i64::MAX - 1));
        assert_eq!(counter.next(), Some(0));
        let (lo, _) = counter.size_hint();
        assert!(lo > 0);
        assert_eq!(counter.nth(9), Some(10));
    }

    #[test]
    fn prints_one_value_per_line() {
        let mut out = Vec::<u8>::new();
        print_counter(5, &mut out).unwrap();
        insta::assert_snapshot!(String::from_utf8(out).unwrap(), @r###"
        0
        1
        2
        3
        4
        "###);
    }

    #[test]
    fn prints_nothing_for_zero() {
        let mut out = Vec::<u8>::new();
        print_counter(0, &mut out).unwrap();
        assert!(out.is_empty());
    }
}
