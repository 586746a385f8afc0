//! Header field storage and line parsing.
//!
//! Names are stored lower-cased in insertion order, so iteration (and
//! therefore serialization) is deterministic. Repeated names fold into a
//! single comma-separated value.

use thiserror::Error;

pub const CRLF: &[u8] = b"\r\n";

/// Punctuation allowed in a header name besides letters and digits.
const TOKEN_SPECIALS: &[u8] = b"!#$%&'*+-.^_`|~";

/// Reasons a single header line can be rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeaderError {
    #[error("malformed header line: missing ':'")]
    MissingColon,

    #[error("header name is empty")]
    EmptyName,

    #[error("header name cannot be followed by whitespace")]
    WhitespaceBeforeColon,

    #[error("header name contains invalid character {0:?}")]
    InvalidNameChar(char),
}

/// Ordered, case-insensitive header collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    fields: Vec<(String, String)>,
}

impl Headers {
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Case-insensitive lookup.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Inserts a header, folding into an existing value as `"old, new"`.
    pub fn put(&mut self, name: &str, value: &str) {
        match self.position(name) {
            Some(i) => {
                let existing = &mut self.fields[i].1;
                existing.push_str(", ");
                existing.push_str(value);
            }
            None => self
                .fields
                .push((name.to_ascii_lowercase(), value.to_string())),
        }
    }

    /// Overwrites any existing value, bypassing folding.
    pub fn replace(&mut self, name: &str, value: &str) {
        match self.position(name) {
            Some(i) => self.fields[i].1 = value.to_string(),
            None => self
                .fields
                .push((name.to_ascii_lowercase(), value.to_string())),
        }
    }

    /// Case-insensitive delete; no-op when absent.
    pub fn remove(&mut self, name: &str) {
        self.fields.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates in insertion order. Names are lower-cased.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Parses the first CRLF-terminated line of `data` as one header field.
    ///
    /// Returns `(consumed, done)`:
    /// - `(0, false)` when no complete line is available yet,
    /// - `(2, true)` for the empty line ending the header section,
    /// - `(line + 2, false)` after storing a field.
    pub fn parse_field(&mut self, data: &[u8]) -> Result<(usize, bool), HeaderError> {
        let Some(end) = find_crlf(data) else {
            return Ok((0, false));
        };

        if end == 0 {
            return Ok((CRLF.len(), true));
        }

        let line = &data[..end];
        let colon = line
            .iter()
            .position(|&b| b == b':')
            .ok_or(HeaderError::MissingColon)?;

        let name = line[..colon].trim_ascii_start();
        let value = line[colon + 1..].trim_ascii();

        let Some(last) = name.last() else {
            return Err(HeaderError::EmptyName);
        };
        if last.is_ascii_whitespace() {
            return Err(HeaderError::WhitespaceBeforeColon);
        }
        if let Some(&bad) = name.iter().find(|&&b| !is_token_byte(b)) {
            return Err(HeaderError::InvalidNameChar(char::from(bad)));
        }

        // Name bytes are ASCII after validation.
        let name = String::from_utf8_lossy(name);
        let value = String::from_utf8_lossy(value);
        self.put(&name, &value);

        Ok((end + CRLF.len(), false))
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.fields
            .iter()
            .position(|(n, _)| n.eq_ignore_ascii_case(name))
    }
}

/// Position of the first CRLF in `data`, if any.
pub fn find_crlf(data: &[u8]) -> Option<usize> {
    data.windows(CRLF.len()).position(|w| w == CRLF)
}

fn is_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || TOKEN_SPECIALS.contains(&b)
}
