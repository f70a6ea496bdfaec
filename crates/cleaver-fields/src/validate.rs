//! Degeneracy checks run on built fields before meshing.

use std::fmt;

use cleaver_core::{CleaverError, FieldStatus, Result, ScalarField};

use crate::builder::{InputMode, FIELD_NAME};

/// How serious a finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Meshing must not proceed.
    Fatal,
    /// Meshing may proceed; the result may be degraded.
    Warning,
}

/// One diagnostic about one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    /// Position of the field in construction order.
    pub index: usize,
    pub name: String,
    pub severity: Severity,
    pub status: FieldStatus,
}

impl Finding {
    /// Returns a human-readable description.
    #[must_use]
    pub fn message(&self) -> String {
        match self.severity {
            Severity::Fatal => format!(
                "no zero crossing in indicator function '{}' ({}) - not a valid input or sigma is too large",
                self.name, self.status
            ),
            Severity::Warning => format!(
                "blur kernel of '{}' may be truncated relative to volume size",
                self.name
            ),
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "field {}: {}", self.index, self.message())
    }
}

/// All findings for a field sequence, in construction order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    findings: Vec<Finding>,
}

impl ValidationReport {
    /// Returns every finding.
    #[must_use]
    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    /// Returns the first fatal finding, if any.
    #[must_use]
    pub fn first_fatal(&self) -> Option<&Finding> {
        self.findings.iter().find(|f| f.severity == Severity::Fatal)
    }

    /// Returns the non-fatal findings.
    pub fn warnings(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| f.severity == Severity::Warning)
    }

    /// Returns true if no finding is fatal.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.first_fatal().is_none()
    }

    /// Converts the first fatal finding into an error.
    pub fn into_result(self) -> Result<Vec<Finding>> {
        if let Some(fatal) = self.first_fatal() {
            return Err(CleaverError::NoZeroCrossing {
                field: fatal.name.clone(),
                status: fatal.status,
            });
        }
        Ok(self.findings)
    }
}

/// Returns true if `field` at `index` is not subject to checks.
///
/// The background field of a segmentation (the first of several fields, or
/// label 0) and synthesized inverse fields never need a zero crossing of
/// their own.
fn is_exempt(index: usize, field: &ScalarField, mode: InputMode, num_fields: usize) -> bool {
    let background = mode == InputMode::Segmentation
        && index == 0
        && (num_fields > 1 || field.name() == format!("{FIELD_NAME}0"));
    background || field.name().contains("inverse")
}

/// Checks every field in construction order.
#[must_use]
pub fn validate_fields(fields: &[ScalarField], mode: InputMode) -> ValidationReport {
    let mut findings = Vec::new();
    for (index, field) in fields.iter().enumerate() {
        if is_exempt(index, field, mode, fields.len()) {
            log::debug!("skipping validation of '{}'", field.name());
            continue;
        }
        let severity = if field.status().is_fatal() {
            Severity::Fatal
        } else if field.warning() {
            Severity::Warning
        } else {
            continue;
        };
        findings.push(Finding {
            index,
            name: field.name().to_string(),
            severity,
            status: field.status(),
        });
    }
    ValidationReport { findings }
}
