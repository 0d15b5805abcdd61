use std::fmt;
use std::str::FromStr;

use crate::error::{DeviceError, Result};

/// A non-empty run of raw bytes written to the device as-is.
///
/// No framing, length prefix or checksum is added.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pattern(Vec<u8>);

impl Pattern {
    /// Wrap raw bytes; rejects an empty pattern.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(DeviceError::InvalidPattern(
                "pattern must not be empty".to_string(),
            ));
        }
        Ok(Self(bytes))
    }

    /// Parse hex bytes separated by commas and/or whitespace.
    ///
    /// Each byte is one or two hex digits, optionally prefixed with `0x`:
    /// `"01,02,03"`, `"0x01 0x02 0x03"` and `"1 2 3"` are all `[1, 2, 3]`.
    pub fn parse(input: &str) -> Result<Self> {
        let mut bytes = Vec::new();
        for token in input
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
        {
            let digits = token
                .strip_prefix("0x")
                .or_else(|| token.strip_prefix("0X"))
                .unwrap_or(token);
            if digits.is_empty()
                || digits.len() > 2
                || !digits.chars().all(|c| c.is_ascii_hexdigit())
            {
                return Err(DeviceError::InvalidPattern(format!(
                    "'{token}' is not a single hex byte"
                )));
            }
            let byte = u8::from_str_radix(digits, 16).map_err(|err| {
                DeviceError::InvalidPattern(format!("'{token}': {err}"))
            })?;
            bytes.push(byte);
        }
        Self::new(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false for a constructed pattern.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The byte stream produced by writing this pattern `times` times.
    pub fn repeated(&self, times: usize) -> Vec<u8> {
        self.0.repeat(times)
    }
}

impl Default for Pattern {
    fn default() -> Self {
        Self(vec![0x01, 0x02, 0x03])
    }
}

impl FromStr for Pattern {
    type Err = DeviceError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl AsRef<[u8]> for Pattern {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_one_two_three() {
        assert_eq!(Pattern::default().as_bytes(), &[0x01, 0x02, 0x03]);
    }

    #[test]
    fn parses_common_notations() {
        let expected = Pattern::default();
        assert_eq!(Pattern::parse("01,02,03").unwrap(), expected);
        assert_eq!(Pattern::parse("0x01 0x02 0x03").unwrap(), expected);
        assert_eq!(Pattern::parse(" 1, 2 ,3 ").unwrap(), expected);
        assert_eq!(Pattern::parse("0XfF").unwrap().as_bytes(), &[0xff]);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(Pattern::parse("").is_err());
        assert!(Pattern::parse(" , ").is_err());
        assert!(Pattern::parse("0x").is_err());
        assert!(Pattern::parse("100").is_err());
        assert!(Pattern::parse("zz").is_err());
        assert!(Pattern::parse("+1").is_err());
        assert!(Pattern::new(Vec::new()).is_err());
    }

    #[test]
    fn repeated_concatenates() {
        assert_eq!(Pattern::default().repeated(2), vec![1, 2, 3, 1, 2, 3]);
        assert!(Pattern::default().repeated(0).is_empty());
    }

    #[test]
    fn display_is_spaced_hex() {
        assert_eq!(Pattern::parse("0a,ff").unwrap().to_string(), "0a ff");
    }
}
