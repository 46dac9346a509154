//! Audit logging for data-changing operations.
//!
//! Every create/update/delete (and a few security events) appends one
//! [`AuditLogEntry`]. The write has a per-call failure policy:
//!
//! - **fail-open** (default): a failed write is logged at `error` with enough
//!   masked context to reconstruct it, and the caller continues
//! - **fail-closed**: a failed write is returned as [`AuthError::AuditWrite`]
//!
//! The default policy comes from [`AuditConfig::fail_on_error`] and can be
//! overridden per call with [`RecordOptions`].

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use serde::{Serialize, Serializer};
use time::OffsetDateTime;
use tokio::task::JoinHandle;

use crate::AuthResult;
use crate::config::AuditConfig;
use crate::error::AuthError;
use crate::masking::LogMasker;
use crate::storage::AuditLogStorage;

// =============================================================================
// Audit Actions
// =============================================================================

/// The kind of operation being audited.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AuditAction {
    /// A row was inserted.
    Create,
    /// A row was changed.
    Update,
    /// A row was removed.
    Delete,
    /// A pending request was approved.
    Approve,
    /// A pending request was rejected.
    Reject,
    /// A user signed in.
    Login,
    /// A user signed out.
    Logout,
    /// Any other action, stored verbatim.
    Custom(String),
}

impl AuditAction {
    /// Returns the stored action name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::Login => "login",
            Self::Logout => "logout",
            Self::Custom(action) => action,
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for AuditAction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// =============================================================================
// Records and Entries
// =============================================================================

/// What the caller wants audited.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditRecord {
    /// Operation performed.
    pub action: AuditAction,
    /// Table the operation touched.
    pub table_name: String,
    /// Affected row, if the operation targets one.
    pub record_id: Option<String>,
    /// Acting user, if known.
    pub user_id: Option<String>,
    /// Change payload; `Null` when there is nothing to record.
    pub changes: serde_json::Value,
}

impl AuditRecord {
    /// Creates a record for `action` on `table_name`.
    #[must_use]
    pub fn new(action: AuditAction, table_name: impl Into<String>) -> Self {
        Self {
            action,
            table_name: table_name.into(),
            record_id: None,
            user_id: None,
            changes: serde_json::Value::Null,
        }
    }

    /// Sets the id of the affected row.
    #[must_use]
    pub fn with_record_id(mut self, record_id: impl Into<String>) -> Self {
        self.record_id = Some(record_id.into());
        self
    }

    /// Sets the acting user.
    #[must_use]
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Sets the change payload.
    #[must_use]
    pub fn with_changes(mut self, changes: serde_json::Value) -> Self {
        self.changes = changes;
        self
    }
}

/// One row of the append-only audit log.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditLogEntry {
    /// Operation performed.
    pub action: AuditAction,
    /// Table the operation touched.
    pub table_name: String,
    /// Affected row.
    pub record_id: Option<String>,
    /// Acting user.
    pub user_id: Option<String>,
    /// Change payload.
    pub changes: serde_json::Value,
    /// When the entry was stamped (UTC).
    pub created_at: OffsetDateTime,
}

impl AuditLogEntry {
    /// Stamps a record with the current UTC time.
    #[must_use]
    pub fn from_record(record: AuditRecord) -> Self {
        Self {
            action: record.action,
            table_name: record.table_name,
            record_id: record.record_id,
            user_id: record.user_id,
            changes: record.changes,
            created_at: OffsetDateTime::now_utc(),
        }
    }
}

// =============================================================================
// Options and Outcomes
// =============================================================================

/// Per-call audit options.
#[derive(Debug, Clone, Default)]
pub struct RecordOptions {
    /// Overrides the configured failure policy. `Some(true)` is fail-closed.
    pub fail_on_error: Option<bool>,

    /// Free-form description of the calling operation, logged on failure.
    pub context: Option<String>,
}

impl RecordOptions {
    /// Fail-open options.
    #[must_use]
    pub fn fail_open() -> Self {
        Self {
            fail_on_error: Some(false),
            context: None,
        }
    }

    /// Fail-closed options.
    #[must_use]
    pub fn fail_closed() -> Self {
        Self {
            fail_on_error: Some(true),
            context: None,
        }
    }

    /// Sets the failure context.
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

/// What happened to an audit record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditOutcome {
    /// The entry was appended.
    Recorded,
    /// The write failed and was tolerated (fail-open).
    Dropped,
    /// Audit logging is disabled.
    Skipped,
}

// =============================================================================
// Logger
// =============================================================================

/// Writes audit entries with a configurable failure policy.
#[derive(Clone)]
pub struct AuditLogger {
    storage: Arc<dyn AuditLogStorage>,
    config: AuditConfig,
    masker: LogMasker,
}

impl fmt::Debug for AuditLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuditLogger")
            .field("config", &self.config)
            .field("masker", &self.masker)
            .finish_non_exhaustive()
    }
}

impl AuditLogger {
    /// Creates an audit logger.
    #[must_use]
    pub fn new(storage: Arc<dyn AuditLogStorage>, config: AuditConfig, masker: LogMasker) -> Self {
        Self {
            storage,
            config,
            masker,
        }
    }

    /// Returns `true` if audit logging is enabled.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Appends one audit entry.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::AuditWrite`] only when the write fails under the
    /// fail-closed policy.
    pub async fn record(
        &self,
        record: AuditRecord,
        options: RecordOptions,
    ) -> AuthResult<AuditOutcome> {
        if !self.config.enabled {
            return Ok(AuditOutcome::Skipped);
        }

        let fail_on_error = options.fail_on_error.unwrap_or(self.config.fail_on_error);
        let entry = AuditLogEntry::from_record(record);

        match self.storage.append(&entry).await {
            Ok(()) => {
                tracing::debug!(
                    action = %entry.action,
                    table = %entry.table_name,
                    "Audit entry recorded"
                );
                Ok(AuditOutcome::Recorded)
            }
            Err(e) if fail_on_error => {
                tracing::warn!(
                    action = %entry.action,
                    table = %entry.table_name,
                    context = options.context.as_deref().unwrap_or(""),
                    error = %e,
                    "Audit write failed; failing operation"
                );
                Err(AuthError::audit_write(e.to_string()))
            }
            Err(e) => {
                self.log_dropped(&entry, options.context.as_deref(), &e);
                Ok(AuditOutcome::Dropped)
            }
        }
    }

    /// Appends one entry in the background, fail-open.
    ///
    /// The returned handle may be awaited or dropped.
    pub fn record_detached(
        &self,
        record: AuditRecord,
        context: Option<String>,
    ) -> JoinHandle<AuditOutcome> {
        let logger = self.clone();
        tokio::spawn(async move {
            let options = RecordOptions {
                fail_on_error: Some(false),
                context,
            };
            // Fail-open never returns an error.
            logger
                .record(record, options)
                .await
                .unwrap_or(AuditOutcome::Dropped)
        })
    }

    /// Runs `primary`, then audits its result.
    ///
    /// The primary operation's error is returned unchanged and nothing is
    /// audited. On success, `record` builds the audit record from the value.
    /// Under fail-open the value is returned whatever the audit outcome;
    /// under fail-closed an audit failure becomes the operation's error even
    /// though the primary effect has already happened.
    ///
    /// # Errors
    ///
    /// Returns the primary operation's error, or the audit failure converted
    /// into `E` under fail-closed.
    pub async fn run_audited<T, E, F, Fut, R>(
        &self,
        primary: F,
        record: R,
        options: RecordOptions,
    ) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        R: FnOnce(&T) -> AuditRecord,
        E: From<AuthError>,
    {
        let value = primary().await?;
        self.record(record(&value), options).await?;
        Ok(value)
    }

    fn log_dropped(&self, entry: &AuditLogEntry, context: Option<&str>, error: &AuthError) {
        let record_id = entry
            .record_id
            .as_deref()
            .map(|id| self.masker.id(id))
            .unwrap_or_default();
        let user_id = entry
            .user_id
            .as_deref()
            .map(|id| self.masker.id(id))
            .unwrap_or_default();

        tracing::error!(
            action = %entry.action,
            table = %entry.table_name,
            record_id = %record_id,
            user_id = %user_id,
            context = context.unwrap_or(""),
            created_at = %entry.created_at,
            error = %error,
            "Audit write failed; entry dropped"
        );
    }
}
