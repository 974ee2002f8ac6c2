use std::str::FromStr;

/// Cache newline positions from an input. These can be used to turn UTF-8 byte offsets into
/// human-friendly line and column numbers without having to store the full input. The cache
/// stores only newline positions; it is filled incrementally with [NewlineCache::feed].
///
/// Terminology, since bytes and human-friendly numbers are easy to intermix:
///   * `byte`: a UTF-8 byte offset.
///   * `line_num` / `col_num`: human-friendly line/column numbers, starting from 1.
pub struct NewlineCache {
    newlines: Vec<usize>,
    trailing_bytes: usize,
}

impl NewlineCache {
    /// Create an empty `NewlineCache`.
    pub fn new() -> Self {
        Self {
            newlines: vec![0],
            trailing_bytes: 0,
        }
    }

    /// Feed further input into the cache. The input is considered a direct continuation of any
    /// previous input: if the previous input ended in a partial line, the new input (unless it
    /// starts with a newline) continues that line.
    pub fn feed(&mut self, src: &str) {
        let start_pos = self.newlines.last().unwrap() + self.trailing_bytes;
        self.newlines
            .extend(src.char_indices().filter_map(|c| match c {
                (offset, '\n') => {
                    self.trailing_bytes = 0;
                    Some(start_pos + offset + 1)
                }
                (_, c) => {
                    self.trailing_bytes += c.len_utf8();
                    None
                }
            }));
    }

    /// Number of bytes fed into the cache.
    fn feed_len(&self) -> usize {
        self.newlines.last().unwrap() + self.trailing_bytes
    }

    /// Convert a byte offset in the input to a logical line number. Returns None if the byte
    /// offset exceeds the known input length.
    pub fn byte_to_line_num(&self, byte: usize) -> Option<usize> {
        if byte > self.feed_len() {
            return None;
        }
        let (line_m1, _) = self
            .newlines
            .iter()
            .enumerate()
            .rev()
            .find(|&(_, &line_off)| line_off <= byte)
            .unwrap();
        Some(line_m1 + 1)
    }

    /// A convenience method returning the logical line and column number of a byte. `src` *must*
    /// be equivalent to the string(s) passed to `feed`: if not, nondeterministic results,
    /// including panics, are possible.
    pub fn byte_to_line_num_and_col_num(&self, src: &str, byte: usize) -> Option<(usize, usize)> {
        if byte > self.feed_len() || src.len() != self.feed_len() {
            return None;
        }
        self.byte_to_line_num(byte).map(|line_num| {
            let line_byte = self.newlines[line_num - 1];
            let col = src[line_byte..byte].chars().count() + 1;
            (line_num, col)
        })
    }
}

impl Default for NewlineCache {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for NewlineCache {
    type Err = ();

    /// Construct a `NewlineCache` directly from a `&str`. This is equivalent to creating a blank
    /// `NewlineCache` and [Self::feed()]ing the string directly in.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut x = Self::new();
        x.feed(s);
        Ok(x)
    }
}

#[cfg(test)]
mod test {
    use super::NewlineCache;
    use std::str::FromStr;

    #[test]
    fn line_and_col() {
        let src = "Language \"x\":\nfoo = \"a\";\nbar = foo;";
        let nlc = NewlineCache::from_str(src).unwrap();
        assert_eq!(nlc.byte_to_line_num_and_col_num(src, 0), Some((1, 1)));
        assert_eq!(nlc.byte_to_line_num_and_col_num(src, 14), Some((2, 1)));
        assert_eq!(nlc.byte_to_line_num_and_col_num(src, 20), Some((2, 7)));
        assert_eq!(nlc.byte_to_line_num_and_col_num(src, 25), Some((3, 1)));
    }

    #[test]
    fn multibyte_col() {
        let src = "a\n\u{2107} = b;";
        let nlc = NewlineCache::from_str(src).unwrap();
        // The codepoint after the 3-byte empty-production symbol is column 2.
        assert_eq!(nlc.byte_to_line_num_and_col_num(src, 5), Some((2, 2)));
    }

    #[test]
    fn byte_exceeds_input() {
        let mut nlc = NewlineCache::new();
        nlc.feed("ab");
        assert_eq!(nlc.byte_to_line_num(3), None);
        assert_eq!(nlc.byte_to_line_num_and_col_num("ab", 3), None);
    }
}
