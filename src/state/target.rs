use crate::CrawlError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of the entity being crawled
///
/// Always strictly positive. Any value that does not parse as a positive
/// integer is rejected with [`CrawlError::InvalidTarget`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct TargetId(u64);

impl TargetId {
    /// Creates a target id from a raw signed value
    pub fn new(raw: i64) -> Result<Self, CrawlError> {
        if raw <= 0 {
            return Err(CrawlError::InvalidTarget(raw.to_string()));
        }
        Ok(Self(raw as u64))
    }

    /// Returns the numeric value of this id
    pub fn get(&self) -> u64 {
        self.0
    }

    /// Returns the id as stored in the database
    pub fn to_db_value(&self) -> i64 {
        self.0 as i64
    }
}

impl FromStr for TargetId {
    type Err = CrawlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let raw: i64 = trimmed
            .parse()
            .map_err(|_| CrawlError::InvalidTarget(trimmed.to_string()))?;
        Self::new(raw)
    }
}

impl TryFrom<i64> for TargetId {
    type Error = CrawlError;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

impl From<TargetId> for i64 {
    fn from(id: TargetId) -> Self {
        id.to_db_value()
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let id: TargetId = "42".parse().unwrap();
        assert_eq!(id.get(), 42);
        assert_eq!(" 1234567 \n".parse::<TargetId>().unwrap().get(), 1234567);
    }

    #[test]
    fn test_parse_rejects_non_positive() {
        assert!(matches!(
            "0".parse::<TargetId>(),
            Err(CrawlError::InvalidTarget(_))
        ));
        assert!(matches!(
            "-1".parse::<TargetId>(),
            Err(CrawlError::InvalidTarget(_))
        ));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("abc".parse::<TargetId>().is_err());
        assert!("".parse::<TargetId>().is_err());
        assert!("12.5".parse::<TargetId>().is_err());
    }

    #[test]
    fn test_new() {
        assert_eq!(TargetId::new(7).unwrap().to_db_value(), 7);
        assert!(TargetId::new(-7).is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(TargetId::new(99).unwrap().to_string(), "99");
    }
}
