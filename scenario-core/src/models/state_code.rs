use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ScenarioError;

/// USPS codes for the fifty states and the District of Columbia.
const JURISDICTIONS: [&str; 51] = [
    "AK", "AL", "AR", "AZ", "CA", "CO", "CT", "DC", "DE", "FL", "GA", "HI", "IA", "ID", "IL", "IN",
    "KS", "KY", "LA", "MA", "MD", "ME", "MI", "MN", "MO", "MS", "MT", "NC", "ND", "NE", "NH", "NJ",
    "NM", "NV", "NY", "OH", "OK", "OR", "PA", "RI", "SC", "SD", "TN", "TX", "UT", "VA", "VT", "WA",
    "WI", "WV", "WY",
];

/// A validated two-letter state jurisdiction code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "String")]
pub struct StateCode(&'static str);

impl StateCode {
    /// Looks `code` up in the jurisdiction table.
    ///
    /// Matching is exact: `"co"` is not accepted for `"CO"`. Upstream intake
    /// is expected to have normalized case already.
    pub fn new(code: &str) -> Result<Self, ScenarioError> {
        JURISDICTIONS
            .binary_search(&code)
            .map(|idx| Self(JURISDICTIONS[idx]))
            .map_err(|_| ScenarioError::UnknownStateCode(code.to_string()))
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl TryFrom<String> for StateCode {
    type Error = ScenarioError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

// Not derived: the table entries are `'static`, input borrowed from the
// deserializer is not.
impl<'de> Deserialize<'de> for StateCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let code = String::deserialize(deserializer)?;
        Self::new(&code).map_err(serde::de::Error::custom)
    }
}

impl From<StateCode> for String {
    fn from(code: StateCode) -> Self {
        code.0.to_string()
    }
}

impl fmt::Display for StateCode {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.0)
    }
}
