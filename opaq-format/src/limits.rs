//! Security limits and configuration

use serde::Deserialize;

/// Security limits guarding decode, encode and copy against hostile or runaway graphs
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Maximum element count of a decoded array, collection or map (default: 16 Mi)
    pub max_collection_len: usize,
    /// Maximum byte length of a decoded string (default: 16 MiB)
    pub max_string_len: usize,
    /// Maximum object nesting depth while walking a graph (default: 128)
    pub max_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_collection_len: 16 * 1024 * 1024,
            max_string_len: 16 * 1024 * 1024,
            max_depth: 128,
        }
    }
}

impl Limits {
    /// Check a decoded collection length against the configured cap
    pub fn check_collection_len(&self, len: u64) -> crate::Result<usize> {
        match usize::try_from(len) {
            Ok(len) if len <= self.max_collection_len => Ok(len),
            _ => Err(crate::OpaqError::LimitExceeded(format!(
                "Collection length {} exceeds limit {}",
                len, self.max_collection_len
            ))),
        }
    }

    /// Check a decoded string length against the configured cap
    pub fn check_string_len(&self, len: u64) -> crate::Result<usize> {
        match usize::try_from(len) {
            Ok(len) if len <= self.max_string_len => Ok(len),
            _ => Err(crate::OpaqError::LimitExceeded(format!(
                "String length {} exceeds limit {}",
                len, self.max_string_len
            ))),
        }
    }

    /// Check a graph depth against the configured cap
    pub fn check_depth(&self, depth: usize) -> crate::Result<()> {
        if depth > self.max_depth {
            return Err(crate::OpaqError::LimitExceeded(format!(
                "Nesting depth {} exceeds limit {}",
                depth, self.max_depth
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_len_limit() {
        let limits = Limits {
            max_collection_len: 4,
            ..Limits::default()
        };
        assert_eq!(limits.check_collection_len(4).unwrap(), 4);
        assert!(limits.check_collection_len(5).is_err());
        assert!(limits.check_collection_len(u64::MAX).is_err());
    }

    #[test]
    fn test_depth_limit() {
        let limits = Limits {
            max_depth: 2,
            ..Limits::default()
        };
        assert!(limits.check_depth(2).is_ok());
        assert!(limits.check_depth(3).is_err());
    }

    #[test]
    fn test_string_len_limit() {
        let limits = Limits {
            max_string_len: 3,
            ..Limits::default()
        };
        assert_eq!(limits.check_string_len(3).unwrap(), 3);
        assert!(matches!(
            limits.check_string_len(4),
            Err(crate::OpaqError::LimitExceeded(_))
        ));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let limits: Limits = serde_json::from_str(r#"{"max_depth": 8}"#).unwrap();
        assert_eq!(limits.max_depth, 8);
        assert_eq!(limits.max_string_len, Limits::default().max_string_len);
    }
}
