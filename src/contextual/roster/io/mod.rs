//! Roster loading from spreadsheet exports.
//!
//! CSV files go through [`csv_read`], Excel workbooks through [`excel_read`].
//! Both resolve the email column with [`resolve_column`] and feed rows into a
//! [`RosterBuilder`], so normalisation and de-duplication behave identically
//! regardless of the source format.

pub mod csv_read;
pub mod excel_read;

use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info, instrument, warn};

use crate::contextual::roster::error::{Result, ToolError};
use crate::contextual::roster::model::{LoadWarning, Roster, RosterEntry};

/// Header names recognised as the email column, in priority order. Matching is
/// case-insensitive and ignores surrounding whitespace.
pub const EMAIL_COLUMN_ALIASES: &[&str] = &[
    "email",
    "email address",
    "emailaddress",
    "e-mail",
    "e-mail address",
];

static EMAIL_SYNTAX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid")
});

/// Supported roster encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterFormat {
    Csv,
    Excel,
}

/// Picks the reader from the file extension. Anything that is not a workbook
/// is treated as comma-separated text.
pub fn detect_format(path: &Path) -> RosterFormat {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("xlsx") | Some("xlsm") => RosterFormat::Excel,
        _ => RosterFormat::Csv,
    }
}

/// Loads the roster at `path`, reading addresses from `column` when given or
/// from the first header matching [`EMAIL_COLUMN_ALIASES`] otherwise.
#[instrument(level = "info", skip_all, fields(input = %path.display()))]
pub fn read_roster(path: &Path, column: Option<&str>) -> Result<Roster> {
    if !path.exists() {
        return Err(ToolError::MissingInput(path.to_path_buf()));
    }

    let roster = match detect_format(path) {
        RosterFormat::Csv => csv_read::read_roster(path, column)?,
        RosterFormat::Excel => excel_read::read_roster(path, column)?,
    };

    info!(
        column = %roster.column,
        entries = roster.entries.len(),
        warnings = roster.warnings.len(),
        "roster loaded"
    );
    Ok(roster)
}

/// Returns the index of the email column within `headers`.
///
/// An explicit column must match a header exactly. Without one, the alias
/// table is consulted in order and the first alias present wins.
pub fn resolve_column(headers: &[String], explicit: Option<&str>) -> Result<usize> {
    if let Some(column) = explicit {
        return headers
            .iter()
            .position(|header| header == column)
            .ok_or_else(|| ToolError::ColumnNotFound {
                column: column.to_string(),
                available: headers.to_vec(),
            });
    }

    let normalised: Vec<String> = headers
        .iter()
        .map(|header| header.trim().to_lowercase())
        .collect();

    EMAIL_COLUMN_ALIASES
        .iter()
        .find_map(|alias| normalised.iter().position(|header| header == alias))
        .ok_or_else(|| ToolError::MissingEmailColumn {
            available: headers.to_vec(),
        })
}

/// Permissive `local@domain.tld` check.
pub fn is_valid_email(value: &str) -> bool {
    EMAIL_SYNTAX.is_match(value)
}

/// Accumulates row values into a [`Roster`].
#[derive(Debug)]
pub struct RosterBuilder {
    seen: HashSet<String>,
    roster: Roster,
}

impl RosterBuilder {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            seen: HashSet::new(),
            roster: Roster {
                column: column.into(),
                ..Roster::default()
            },
        }
    }

    /// Records the value found in `row`. Blank cells are ignored, malformed
    /// addresses become warnings and repeats are dropped.
    pub fn push(&mut self, row: usize, raw: &str) {
        let Some(entry) = RosterEntry::normalise(raw) else {
            return;
        };

        if !is_valid_email(entry.email()) {
            warn!(row, value = raw.trim(), "skipping malformed email address");
            self.roster.warnings.push(LoadWarning {
                row,
                value: raw.trim().to_string(),
            });
            return;
        }

        if self.seen.insert(entry.email().to_string()) {
            self.roster.entries.push(entry);
        } else {
            debug!(row, email = entry.email(), "duplicate email collapsed");
        }
    }

    pub fn finish(self) -> Roster {
        self.roster
    }
}
