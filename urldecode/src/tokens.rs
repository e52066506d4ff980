//! Splitting of an unescaped query into key/value windows.

use core::iter::FusedIterator;

/// Iterator over the `(key, value)` pairs of an unescaped query.
///
/// Pairs are separated by `&`; empty segments are skipped. A segment is
/// split on its first `=`, and a segment without one has an empty value.
/// Nothing is decoded here: the windows borrow the buffer they came from.
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    rest: &'a [u8],
}

impl<'a> Tokens<'a> {
    /// Creates an iterator over the pairs in `buf`.
    pub fn new(buf: &'a [u8]) -> Self {
        Self { rest: buf }
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = (&'a [u8], &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        while !self.rest.is_empty() {
            let segment = match self.rest.iter().position(|&b| b == b'&') {
                Some(amp) => {
                    let segment = &self.rest[..amp];
                    self.rest = &self.rest[amp + 1..];
                    segment
                }
                None => core::mem::take(&mut self.rest),
            };
            if segment.is_empty() {
                continue;
            }
            return Some(match segment.iter().position(|&b| b == b'=') {
                Some(eq) => (&segment[..eq], &segment[eq + 1..]),
                None => (segment, &[][..]),
            });
        }
        None
    }
}

impl FusedIterator for Tokens<'_> {}
