use serde::{Deserialize, Serialize};
use std::fmt;

/// Zero-padded decimal name shared by an `.ltlf`/`.part` pair.
///
/// The padding is numeric: the cleaned field is parsed as an integer first,
/// so `"007"` and `"7"` both become `007`, and values wider than the pad
/// width are kept whole (`1000` stays `1000`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identifier(String);

impl Identifier {
    pub fn parse(raw: &str, width: usize) -> std::result::Result<Self, String> {
        let cleaned = strip_whitespace(raw);
        if cleaned.is_empty() {
            return Err("number field is empty".to_string());
        }

        let value: u64 = cleaned
            .parse()
            .map_err(|_| format!("'{}' is not an unsigned decimal integer", cleaned))?;

        Ok(Self::from_value(value, width))
    }

    pub fn from_value(value: u64, width: usize) -> Self {
        Self(format!("{:0width$}", value, width = width))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn file_name(&self, extension: &str) -> String {
        format!("{}.{}", self.0, extension)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Removes every whitespace character, not only the surrounding ones.
pub fn strip_whitespace(raw: &str) -> String {
    raw.chars().filter(|c| !c.is_whitespace()).collect()
}
