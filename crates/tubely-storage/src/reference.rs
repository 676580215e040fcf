//! Persisted object references.
//!
//! A video record stores where its object lives as a single `"bucket,key"` string.
//! Parsing splits on the first comma, so keys may contain commas but buckets may not.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use crate::traits::{StorageError, StorageResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageReference {
    pub bucket: String,
    pub key: String,
}

impl StorageReference {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    pub fn parse(raw: &str) -> StorageResult<Self> {
        let (bucket, key) = raw.split_once(',').ok_or_else(|| {
            StorageError::MalformedReference(format!("missing ',' separator in '{}'", raw))
        })?;

        let bucket = bucket.trim();
        let key = key.trim();
        if bucket.is_empty() || key.is_empty() {
            return Err(StorageError::MalformedReference(format!(
                "empty bucket or key in '{}'",
                raw
            )));
        }

        Ok(Self::new(bucket, key))
    }
}

impl FromStr for StorageReference {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Display for StorageReference {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{},{}", self.bucket, self.key)
    }
}
