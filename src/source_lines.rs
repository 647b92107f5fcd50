// Copyright 2023 Marsh J. Ray
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use std::io::BufRead;

use serde::{Deserialize, Serialize};

#[derive(Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum LineOrError {
    Line(String),
    StdIoError(String),
}

#[derive(Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct SourceLine {
    /// Zero-based.
    pub line_index: u64,
    pub line_or_error: LineOrError,
}

/// Lazily reads lines from `bx_bufread`, numbering them from 0.
///
/// An I/O error is yielded once as `StdIoError` and ends the sequence.
pub fn source_lines(bx_bufread: Box<dyn BufRead>) -> impl Iterator<Item = SourceLine> {
    let mut lines = bx_bufread.lines();
    let mut line_index = 0u64;
    let mut stopped = false;

    std::iter::from_fn(move || {
        if stopped {
            return None;
        }

        let line_or_error = match lines.next()? {
            Ok(text) => LineOrError::Line(text),
            Err(stdioerror) => {
                log::debug!("source_lines: stopping at line {line_index}: {stdioerror}");
                stopped = true;
                LineOrError::StdIoError(stdioerror.to_string())
            }
        };

        let source_line = SourceLine {
            line_index,
            line_or_error,
        };
        line_index += 1;
        Some(source_line)
    })
}

#[cfg(test)]
mod test {
    use std::io::{BufReader, Cursor, Read};

    use super::*;

    fn lines_of(text: &'static str) -> Vec<SourceLine> {
        source_lines(Box::new(Cursor::new(text.as_bytes()))).collect()
    }

    #[test]
    fn numbers_from_zero_and_strips_terminators() {
        let results = lines_of("alpha\r\nbeta\n\ngamma");
        insta::assert_debug_snapshot!(results, @r###"
        [
            SourceLine {
                line_index: 0,
                line_or_error: Line(
                    "alpha",
                ),
            },
            SourceLine {
                line_index: 1,
                line_or_error: Line(
                    "beta",
                ),
            },
            SourceLine {
                line_index: 2,
                line_or_error: Line(
                    "",
                ),
            },
            SourceLine {
                line_index: 3,
                line_or_error: Line(
                    "gamma",
                ),
            },
        ]
        "###);
    }

    #[test]
    fn empty_input() {
        assert!(lines_of("").is_empty());
    }

    #[test]
    fn invalid_utf8_is_yielded_then_stops() {
        // Stays broken forever, so the iterator has to stop on its own.
        struct AlwaysBad;
        impl Read for AlwaysBad {
            fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
                buf[0] = 0xff;
                buf[1] = b'\n';
                Ok(2)
            }
        }

        let results = source_lines(Box::new(BufReader::new(AlwaysBad)))
            .take(5)
            .collect::<Vec<_>>();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].line_index, 0);
        assert!(matches!(results[0].line_or_error, LineOrError::StdIoError(_)));
    }
}
