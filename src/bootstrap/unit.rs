//! Provisioning units and batches.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// PostgreSQL's identifier limit (NAMEDATALEN - 1).
const MAX_IDENTIFIER_LEN: usize = 63;

/// Schemas every LibRate database needs before traffic is admitted.
pub const STANDARD_SCHEMAS: [&str; 6] = ["media", "people", "places", "reviews", "cdn", "members"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnitError {
    #[error("unit name must not be empty")]
    Empty,

    #[error("unit name '{0}' exceeds 63 bytes")]
    TooLong(String),

    #[error("unit name '{0}' may only contain ASCII letters, digits and '_', and must not start with a digit")]
    InvalidCharacters(String),

    #[error("unit '{0}' appears more than once in the batch")]
    Duplicate(String),
}

/// A validated schema name.
///
/// Only `[A-Za-z0-9_]` is accepted, so the name is safe to splice into DDL
/// as a quoted identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ProvisioningUnit(String);

impl ProvisioningUnit {
    pub fn new(name: impl Into<String>) -> Result<Self, UnitError> {
        let name = name.into();
        if name.is_empty() {
            return Err(UnitError::Empty);
        }
        if name.len() > MAX_IDENTIFIER_LEN {
            return Err(UnitError::TooLong(name));
        }
        let valid_chars = name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_');
        let leading_digit = name.as_bytes()[0].is_ascii_digit();
        if !valid_chars || leading_digit {
            return Err(UnitError::InvalidCharacters(name));
        }
        Ok(Self(name))
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    /// The name as a double-quoted SQL identifier.
    pub fn quoted(&self) -> String {
        format!("\"{}\"", self.0)
    }
}

impl fmt::Display for ProvisioningUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An ordered set of unique units processed together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningBatch {
    units: Vec<ProvisioningUnit>,
}

impl ProvisioningBatch {
    pub fn new<I, S>(names: I) -> Result<Self, UnitError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut units = Vec::new();
        for name in names {
            let unit = ProvisioningUnit::new(name)?;
            if !seen.insert(unit.clone()) {
                return Err(UnitError::Duplicate(unit.0));
            }
            units.push(unit);
        }
        Ok(Self { units })
    }

    /// media, people, places, reviews, cdn, members.
    pub fn standard() -> Self {
        Self {
            units: STANDARD_SCHEMAS
                .iter()
                .map(|name| ProvisioningUnit(name.to_string()))
                .collect(),
        }
    }

    pub fn units(&self) -> &[ProvisioningUnit] {
        &self.units
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProvisioningUnit> {
        self.units.iter()
    }
}

impl Default for ProvisioningBatch {
    fn default() -> Self {
        Self::standard()
    }
}
