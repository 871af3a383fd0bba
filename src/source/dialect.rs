//! Delimiter detection from the first line of input, and the whitespace rule
//! applied before the csv parser sees a stream

use std::io::{self, Read};

/// Delimiters considered by `sniff_delimiter`, in tie-break order
pub const CANDIDATE_DELIMITERS: [u8; 2] = [b',', b';'];

/// Used when the first line contains no candidate delimiter
pub const DEFAULT_DELIMITER: u8 = b';';

/// Pick the field delimiter for a stream from its first line.
///
/// Occurrences inside double-quoted sections are ignored. The delimiter seen
/// most often wins; comma wins a tie. With no candidate present the result is
/// `DEFAULT_DELIMITER`.
pub fn sniff_delimiter(first_line: &str) -> u8 {
    let mut counts = [0usize; CANDIDATE_DELIMITERS.len()];
    let mut in_quotes = false;

    for byte in first_line.bytes() {
        if byte == b'"' {
            in_quotes = !in_quotes;
            continue;
        }
        if in_quotes {
            continue;
        }
        if let Some(idx) = CANDIDATE_DELIMITERS.iter().position(|d| *d == byte) {
            counts[idx] += 1;
        }
    }

    let mut best: Option<(u8, usize)> = None;
    for (delimiter, count) in CANDIDATE_DELIMITERS.iter().zip(counts) {
        if count == 0 {
            continue;
        }
        match best {
            Some((_, best_count)) if best_count >= count => {}
            _ => best = Some((*delimiter, count)),
        }
    }

    best.map(|(delimiter, _)| delimiter).unwrap_or(DEFAULT_DELIMITER)
}

/// Parse a user-supplied delimiter: a single byte, or `tab`/`\t`
pub fn parse_delimiter(value: &str) -> Option<u8> {
    match value {
        "tab" | "\\t" | "\t" => Some(b'\t'),
        _ => {
            let bytes = value.as_bytes();
            if bytes.len() == 1 {
                Some(bytes[0])
            } else {
                None
            }
        }
    }
}

/// Drops spaces and tabs at the start of each field, outside quotes.
///
/// The csv parser only recognizes a quoted field when the quote is its first
/// byte, so `a, "b,c"` would otherwise split inside the quotes. Unquoted
/// fields are trimmed afterwards anyway, so nothing else changes.
pub struct SkipInitialSpace<R> {
    inner: R,
    delimiter: u8,
    at_field_start: bool,
    in_quotes: bool,
    just_closed: bool,
}

impl<R: Read> SkipInitialSpace<R> {
    pub fn new(inner: R, delimiter: u8) -> Self {
        SkipInitialSpace {
            inner,
            delimiter,
            at_field_start: true,
            in_quotes: false,
            just_closed: false,
        }
    }

    // Returns whether `byte` is kept.
    fn keep(&mut self, byte: u8) -> bool {
        if self.in_quotes {
            if byte == b'"' {
                self.in_quotes = false;
                self.just_closed = true;
            }
            return true;
        }

        if byte == b'"' && (self.at_field_start || self.just_closed) {
            // `""` inside a quoted field closes and immediately reopens.
            self.in_quotes = true;
            self.at_field_start = false;
            self.just_closed = false;
            return true;
        }

        self.just_closed = false;
        if byte == self.delimiter || byte == b'\n' || byte == b'\r' {
            self.at_field_start = true;
        } else if self.at_field_start && (byte == b' ' || byte == b'\t') {
            return false;
        } else {
            self.at_field_start = false;
        }
        true
    }
}

impl<R: Read> Read for SkipInitialSpace<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            let n = self.inner.read(buf)?;
            if n == 0 {
                return Ok(0);
            }

            let mut kept = 0;
            for i in 0..n {
                let byte = buf[i];
                if self.keep(byte) {
                    buf[kept] = byte;
                    kept += 1;
                }
            }
            // An all-blank chunk must not look like end of input.
            if kept > 0 {
                return Ok(kept);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skip_initial_space(input: &str, delimiter: u8) -> String {
        let mut out = String::new();
        SkipInitialSpace::new(input.as_bytes(), delimiter)
            .read_to_string(&mut out)
            .unwrap();
        out
    }

    #[test]
    fn test_skip_initial_space_before_quotes() {
        assert_eq!(skip_initial_space("a, \"b,c\"\n", b','), "a,\"b,c\"\n");
        assert_eq!(
            skip_initial_space("  abc ; \"x;y\"\n", b';'),
            "abc ;\"x;y\"\n"
        );
    }

    #[test]
    fn test_skip_initial_space_keeps_quoted_and_inner_spaces() {
        assert_eq!(
            skip_initial_space("\"a, b\", c d\n\"x \"\"y\"\", z\"\n", b','),
            "\"a, b\",c d\n\"x \"\"y\"\", z\"\n"
        );
    }

    #[test]
    fn test_skip_initial_space_with_tab_delimiter() {
        assert_eq!(skip_initial_space("a\t\tb\n", b'\t'), "a\t\tb\n");
    }

    #[test]
    fn test_comma_header() {
        assert_eq!(sniff_delimiter("heading_1,heading_2,heading_3"), b',');
    }

    #[test]
    fn test_semicolon_header() {
        assert_eq!(sniff_delimiter("heading_1;heading_2;heading_3"), b';');
    }

    #[test]
    fn test_quoted_commas_do_not_count() {
        assert_eq!(sniff_delimiter("\"last, first\";age;city"), b';');
    }

    #[test]
    fn test_default_when_no_delimiter() {
        assert_eq!(sniff_delimiter("single_column"), DEFAULT_DELIMITER);
        assert_eq!(sniff_delimiter(""), DEFAULT_DELIMITER);
    }

    #[test]
    fn test_comma_wins_tie() {
        assert_eq!(sniff_delimiter("a,b;c"), b',');
    }

    #[test]
    fn test_parse_delimiter() {
        assert_eq!(parse_delimiter(","), Some(b','));
        assert_eq!(parse_delimiter("tab"), Some(b'\t'));
        assert_eq!(parse_delimiter("|"), Some(b'|'));
        assert_eq!(parse_delimiter("::"), None);
    }
}
