//! Blocked account identifiers
//!
//! Built once at startup and owned by the [`super::Validator`].

use std::collections::HashSet;

/// Accounts blocked out of the box
pub const DEFAULT_BLOCKED_ACCOUNTS: &[&str] = &[
    "BLOCKED_ACCOUNT",
    "FRAUD_USER",
    "SUSPENDED",
    "BLACKLISTED_CORP",
    "SUSPICIOUS_ENTITY",
];

/// Case-insensitive set of blocked account identifiers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Denylist {
    entries: HashSet<String>,
}

impl Denylist {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|entry| entry.as_ref().trim().to_uppercase())
                .filter(|entry| !entry.is_empty())
                .collect(),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_BLOCKED_ACCOUNTS)
    }

    /// Add entries on top of the current set
    pub fn extend<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.entries.extend(Self::new(extra).entries);
        self
    }

    pub fn is_blocked(&self, account: &str) -> bool {
        self.entries.contains(&account.to_uppercase())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for Denylist {
    fn default() -> Self {
        Self::with_defaults()
    }
}
