//! Security codes tracked by subscribers.

use std::borrow::Borrow;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// Pattern of a Russian-market ISIN, unanchored.
pub const ISIN_PATTERN: &str = r"RU[0-9A-Z]{10}";

static ISIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("^{ISIN_PATTERN}$")).expect("ISIN pattern is valid"));

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Invalid ISIN `{0}`: expected `RU` followed by 10 alphanumeric characters, e.g. RU000A106SE5")]
pub struct IsinError(pub String);

/// A validated, uppercased ISIN such as `RU000A106SE5`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Isin(String);

impl Isin {
    /// Trims and uppercases `s`, then validates it.
    pub fn parse(s: &str) -> Result<Self, IsinError> {
        let code = s.trim().to_uppercase();
        if ISIN_RE.is_match(&code) {
            Ok(Self(code))
        } else {
            Err(IsinError(s.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Isin {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Isin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
