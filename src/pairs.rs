// Copyright 2023 Marsh J. Ray
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use std::iter::FusedIterator;

/// Iterator over successive pairs of values pulled from `source`.
///
/// An odd trailing value comes out as `(v, None)`.
#[derive(Debug, Clone)]
pub struct Pairs<I: Iterator> {
    source: I,
    yielded_final: bool,
}

pub fn pairs<I: IntoIterator>(source: I) -> Pairs<I::IntoIter> {
    Pairs {
        source: source.into_iter(),
        yielded_final: false,
    }
}

impl<I: Iterator> Iterator for Pairs<I> {
    type Item = (I::Item, Option<I::Item>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.yielded_final {
            return None;
        }

        let Some(v1) = self.source.next() else {
            self.yielded_final = true;
            return None;
        };

        let opt_v2 = self.source.next();
        if opt_v2.is_none() {
            self.yielded_final = true;
        }

        Some((v1, opt_v2))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.yielded_final {
            return (0, Some(0));
        }
        let (lo, opt_hi) = self.source.size_hint();
        (lo.div_ceil(2), opt_hi.map(|hi| hi.div_ceil(2)))
    }
}

impl<I: Iterator> FusedIterator for Pairs<I> {}
