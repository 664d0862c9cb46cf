use std::fmt;

use crate::contextual::roster::model::{Operation, OperationReport, Status};

const RULE: &str = "==================================================";

fn success_label(operation: Operation) -> &'static str {
    match operation {
        Operation::Invite => "Successfully invited",
        Operation::Remove => "Successfully removed",
    }
}

/// Human-readable summary printed at the end of a run.
///
/// Sections always appear in the order succeeded, skipped, failed and keep
/// plan order inside each section, so identical runs render identically.
impl fmt::Display for OperationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts = self.counts();

        writeln!(f, "{RULE}")?;
        write!(f, "RESULTS: {}", self.operation)?;
        if let Some(tenant) = &self.tenant {
            write!(f, " (tenant: {tenant})")?;
        }
        if self.dry_run {
            write!(f, " [DRY RUN]")?;
        }
        writeln!(f)?;
        writeln!(f, "{RULE}")?;

        if !self.warnings.is_empty() {
            writeln!(f, "\nWarnings: {}", self.warnings.len())?;
            for warning in &self.warnings {
                writeln!(f, "  ! {warning}")?;
            }
        }

        if counts.succeeded > 0 {
            writeln!(f, "\n{}: {}", success_label(self.operation), counts.succeeded)?;
            for result in self.with_status(Status::Succeeded) {
                writeln!(f, "  + {}", result.email)?;
            }
        }

        if counts.skipped > 0 {
            writeln!(f, "\nSkipped: {}", counts.skipped)?;
            for result in self.with_status(Status::Skipped) {
                let reason = result.reason.as_deref().unwrap_or("skipped");
                writeln!(f, "  ~ {} ({reason})", result.email)?;
            }
        }

        if counts.failed > 0 {
            writeln!(f, "\nErrors: {}", counts.failed)?;
            for result in self.with_status(Status::Failed) {
                let reason = result.reason.as_deref().unwrap_or("unknown error");
                writeln!(f, "  x {}: {reason}", result.email)?;
            }
        }

        writeln!(f, "\n{RULE}")?;
        writeln!(
            f,
            "Total: {} succeeded, {} skipped, {} failed",
            counts.succeeded, counts.skipped, counts.failed
        )
    }
}

/// Renders the summary of `report`.
pub fn render(report: &OperationReport) -> String {
    report.to_string()
}

/// Writes the rendered report to stdout.
pub fn print(report: &OperationReport) {
    print!("{report}");
}
