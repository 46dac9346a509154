//! Masking of sensitive values before they reach log lines.
//!
//! Tokens, emails, and database ids never appear verbatim in logs. In
//! production builds they are replaced entirely; in development they are
//! partially masked so that log lines can still be correlated by hand.

use serde::{Deserialize, Serialize};

/// Replacement for values masked in production mode.
pub const REDACTED: &str = "[redacted]";

/// Number of leading characters kept in development mode.
const VISIBLE_PREFIX: usize = 4;

/// How aggressively values are masked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaskingMode {
    /// Every sensitive value becomes [`REDACTED`].
    #[default]
    Production,
    /// Sensitive values keep a short prefix.
    Development,
}

/// Masks sensitive values according to a [`MaskingMode`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMasker {
    mode: MaskingMode,
}

impl LogMasker {
    /// Creates a masker for the given mode.
    #[must_use]
    pub const fn new(mode: MaskingMode) -> Self {
        Self { mode }
    }

    /// Returns the configured mode.
    #[must_use]
    pub const fn mode(&self) -> MaskingMode {
        self.mode
    }

    /// Masks an email address.
    ///
    /// Development mode keeps the first character of the local part and the
    /// domain: `jane.doe@example.org` becomes `j***@example.org`.
    #[must_use]
    pub fn email(&self, email: &str) -> String {
        match self.mode {
            MaskingMode::Production => REDACTED.to_string(),
            MaskingMode::Development => match email.split_once('@') {
                Some((local, domain)) if !local.is_empty() => {
                    let first: String = local.chars().take(1).collect();
                    format!("{first}***@{domain}")
                }
                _ => stars(email),
            },
        }
    }

    /// Masks an opaque identifier (user id, platform id, entity id, record id).
    #[must_use]
    pub fn id(&self, id: &str) -> String {
        match self.mode {
            MaskingMode::Production => REDACTED.to_string(),
            MaskingMode::Development => prefix(id),
        }
    }

    /// Masks a credential. Tokens are never partially shown, even in development.
    #[must_use]
    pub fn token(&self, token: &str) -> String {
        match self.mode {
            MaskingMode::Production => REDACTED.to_string(),
            MaskingMode::Development => format!("[token len={}]", token.len()),
        }
    }
}

fn prefix(value: &str) -> String {
    if value.chars().count() <= VISIBLE_PREFIX {
        return stars(value);
    }
    let visible: String = value.chars().take(VISIBLE_PREFIX).collect();
    format!("{visible}****")
}

fn stars(value: &str) -> String {
    "*".repeat(value.chars().count().max(1))
}
