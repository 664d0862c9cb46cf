use std::fmt;
use std::process::ExitCode;

use serde::Deserialize;

/// A normalised email address taken from one roster row.
///
/// Values are trimmed and lower-cased on construction so that set membership
/// and comparisons against tenant users are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RosterEntry {
    email: String,
}

impl RosterEntry {
    /// Normalises the raw cell value. Returns `None` for blank cells.
    pub fn normalise(raw: &str) -> Option<Self> {
        let email = raw.trim().to_lowercase();
        if email.is_empty() {
            None
        } else {
            Some(Self { email })
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

/// A row value that was rejected while loading the roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadWarning {
    /// Row number in the source file, counting the header as row 1.
    pub row: usize,
    pub value: String,
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}: '{}' is not a valid email address", self.row, self.value)
    }
}

/// The de-duplicated output of the roster loader.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Roster {
    /// Header of the column the addresses were read from.
    pub column: String,
    /// Entries in first-seen order.
    pub entries: Vec<RosterEntry>,
    pub warnings: Vec<LoadWarning>,
}

/// Membership role of a tenant user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Member,
}

/// A user as reported by the tenant management API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TenantUser {
    #[serde(default)]
    pub id: String,
    pub email: String,
    #[serde(rename = "is_tenant_admin", default)]
    pub is_admin: bool,
}

impl TenantUser {
    pub fn role(&self) -> Role {
        if self.is_admin { Role::Admin } else { Role::Member }
    }

    /// Lower-cased email used for matching against roster entries.
    pub fn normalised_email(&self) -> String {
        self.email.trim().to_lowercase()
    }
}

/// The membership change a run performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Invite,
    Remove,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Invite => write!(f, "invite"),
            Operation::Remove => write!(f, "remove"),
        }
    }
}

/// Terminal status of one attempted email.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Status {
    Succeeded,
    Skipped,
    Failed,
}

/// Outcome for a single email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationResult {
    pub email: String,
    pub status: Status,
    /// Present for skipped and failed entries.
    pub reason: Option<String>,
}

impl OperationResult {
    pub fn succeeded(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            status: Status::Succeeded,
            reason: None,
        }
    }

    pub fn skipped(email: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            status: Status::Skipped,
            reason: Some(reason.into()),
        }
    }

    pub fn failed(email: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            status: Status::Failed,
            reason: Some(reason.into()),
        }
    }
}

/// Aggregate counts of an [`OperationReport`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counts {
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Everything a single invocation did, in plan order.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationReport {
    pub operation: Operation,
    pub tenant: Option<String>,
    pub dry_run: bool,
    pub results: Vec<OperationResult>,
    /// Load-time warnings carried over from the roster.
    pub warnings: Vec<LoadWarning>,
}

impl OperationReport {
    pub fn new(operation: Operation, tenant: Option<String>, dry_run: bool) -> Self {
        Self {
            operation,
            tenant,
            dry_run,
            results: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn counts(&self) -> Counts {
        self.results
            .iter()
            .fold(Counts::default(), |mut counts, result| {
                match result.status {
                    Status::Succeeded => counts.succeeded += 1,
                    Status::Skipped => counts.skipped += 1,
                    Status::Failed => counts.failed += 1,
                }
                counts
            })
    }

    pub fn with_status(&self, status: Status) -> impl Iterator<Item = &OperationResult> {
        self.results.iter().filter(move |result| result.status == status)
    }

    pub fn has_failures(&self) -> bool {
        self.results
            .iter()
            .any(|result| result.status == Status::Failed)
    }

    /// Non-zero exactly when at least one entry failed.
    pub fn exit_code(&self) -> ExitCode {
        if self.has_failures() {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        }
    }
}
