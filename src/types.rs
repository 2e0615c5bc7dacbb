// src/types.rs

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// An organization's EIN as used in index-page URLs.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Eq, Hash)]
#[serde(transparent)]
pub struct OrgId(String);

impl OrgId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<u64> for OrgId {
    fn from(ein: u64) -> Self {
        OrgId(ein.to_string())
    }
}

impl FromStr for OrgId {
    type Err = anyhow::Error;

    /// Accepts 1 to 9 ASCII digits, surrounding whitespace ignored.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() || s.len() > 9 || !s.chars().all(|c| c.is_ascii_digit()) {
            bail!("invalid organization id '{}': expected up to 9 digits", s);
        }
        Ok(OrgId(s.to_string()))
    }
}

impl fmt::Display for OrgId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One or many organizations, normalized to an ordered list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OrgIds(pub Vec<OrgId>);

impl OrgIds {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, OrgId> {
        self.0.iter()
    }
}

impl From<OrgId> for OrgIds {
    fn from(id: OrgId) -> Self {
        OrgIds(vec![id])
    }
}

impl From<u64> for OrgIds {
    fn from(ein: u64) -> Self {
        OrgIds(vec![OrgId::from(ein)])
    }
}

impl<T: Into<OrgId>> From<Vec<T>> for OrgIds {
    fn from(ids: Vec<T>) -> Self {
        OrgIds(ids.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<OrgId> + Clone> From<&[T]> for OrgIds {
    fn from(ids: &[T]) -> Self {
        OrgIds(ids.iter().cloned().map(Into::into).collect())
    }
}

impl<'a> IntoIterator for &'a OrgIds {
    type Item = &'a OrgId;
    type IntoIter = std::slice::Iter<'a, OrgId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_digit_strings() {
        let id: OrgId = " 042103580 ".parse().unwrap();
        assert_eq!(id.as_str(), "042103580");
    }

    #[test]
    fn rejects_non_digits() {
        assert!("".parse::<OrgId>().is_err());
        assert!("12-345".parse::<OrgId>().is_err());
        assert!("1234567890".parse::<OrgId>().is_err());
    }

    #[test]
    fn single_id_normalizes_to_list() {
        let ids = OrgIds::from(530196605u64);
        assert_eq!(ids.len(), 1);
        assert_eq!(ids.0[0].to_string(), "530196605");

        let many = OrgIds::from(vec![1u64, 2, 3]);
        let order: Vec<&str> = many.iter().map(OrgId::as_str).collect();
        assert_eq!(order, ["1", "2", "3"]);
    }
}
