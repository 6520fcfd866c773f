//! User and case-access models.

use serde::{Deserialize, Serialize};

/// An application user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub login: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

/// Per-case access levels. Numeric values are part of the wire contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessLevel {
    DenyAll = 1,
    ReadOnly = 2,
    FullAccess = 4,
}

impl AccessLevel {
    pub fn from_value(value: i64) -> Option<Self> {
        match value {
            1 => Some(AccessLevel::DenyAll),
            2 => Some(AccessLevel::ReadOnly),
            4 => Some(AccessLevel::FullAccess),
            _ => None,
        }
    }

    pub fn as_value(self) -> i64 {
        self as i64
    }

    /// Whether this level satisfies `required`. Full access implies read-only;
    /// deny-all satisfies nothing.
    pub fn allows(self, required: AccessLevel) -> bool {
        match self {
            AccessLevel::DenyAll => false,
            AccessLevel::ReadOnly => required == AccessLevel::ReadOnly,
            AccessLevel::FullAccess => required != AccessLevel::DenyAll,
        }
    }
}

/// One entry of the per-case user list (`GET /case/users/list`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseUser {
    pub user_id: i64,
    pub user_login: String,
    pub user_name: String,
    pub access_level: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_access_implies_read_only() {
        assert!(AccessLevel::FullAccess.allows(AccessLevel::ReadOnly));
        assert!(AccessLevel::FullAccess.allows(AccessLevel::FullAccess));
    }

    #[test]
    fn test_read_only_cannot_write() {
        assert!(AccessLevel::ReadOnly.allows(AccessLevel::ReadOnly));
        assert!(!AccessLevel::ReadOnly.allows(AccessLevel::FullAccess));
    }

    #[test]
    fn test_deny_all_allows_nothing() {
        assert!(!AccessLevel::DenyAll.allows(AccessLevel::ReadOnly));
        assert!(!AccessLevel::DenyAll.allows(AccessLevel::FullAccess));
    }

    #[test]
    fn test_from_value() {
        assert_eq!(AccessLevel::from_value(4), Some(AccessLevel::FullAccess));
        assert_eq!(AccessLevel::from_value(3), None);
    }
}
