//! Plain-text rendering of backend reports.
//!
//! Rendering is a pure function of its input: the same reports always give
//! the same text. Output looks like:
//!
//! ```text
//! == BN254/arkworks: BN254 pairing curve via arkworks (10000 trials per operation)
//!   Zr
//!     add              24.000ns
//!     inv               5.812µs
//!   GT
//!     exp             310.441µs
//!     mul                FAILED  operation mul failed: ...
//! ```

use core::fmt;
use std::time::Duration;

use crate::suite::{BackendReport, DomainReport, OperationOutcome};

const LABEL_WIDTH: usize = 12;
const DURATION_WIDTH: usize = 14;

/// Formats [`BackendReport`]s for a terminal.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReportPrinter;

impl ReportPrinter {
    pub fn render(&self, reports: &[BackendReport]) -> String {
        Rendered(reports).to_string()
    }
}

struct Rendered<'a>(&'a [BackendReport]);

impl fmt::Display for Rendered<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, report) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write_backend(f, report)?;
        }
        Ok(())
    }
}

fn write_backend(f: &mut fmt::Formatter<'_>, report: &BackendReport) -> fmt::Result {
    writeln!(
        f,
        "== {}: {} ({} trials per operation)",
        report.descriptor.name, report.descriptor, report.trials
    )?;
    for domain in &report.domains {
        write_domain(f, domain)?;
    }
    if let Some(failure) = &report.failure {
        writeln!(f, "  FAILED: {failure}")?;
    }
    Ok(())
}

fn write_domain(f: &mut fmt::Formatter<'_>, domain: &DomainReport) -> fmt::Result {
    writeln!(f, "  {}", domain.domain.name)?;
    for (operation, outcome) in &domain.outcomes {
        let label = operation.label(domain.notation);
        write!(f, "    {label:<LABEL_WIDTH$}")?;
        match outcome {
            OperationOutcome::Complete(result) => {
                writeln!(f, "{}", duration(result.mean))?;
            }
            OperationOutcome::Partial {
                result,
                requested,
                cause,
            } => {
                writeln!(
                    f,
                    "{}  partial: {}/{} trials, {cause}",
                    duration(result.mean),
                    result.trials,
                    requested
                )?;
            }
            OperationOutcome::Failed { cause } => {
                writeln!(f, "{:>DURATION_WIDTH$}  {cause}", "FAILED")?;
            }
        }
    }
    Ok(())
}

fn duration(mean: Duration) -> String {
    format!("{:>DURATION_WIDTH$}", format!("{mean:.3?}"))
}
