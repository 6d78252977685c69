//! Validation issues and aggregated results

use serde::{Serialize, Serializer};
use std::fmt;

use crate::layer::Layer;

/// Issue severity. Warnings never affect validity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Category of a reported defect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum IssueKind {
    /// Element does not conform to its layer schema
    StructuralViolation,
    /// Element id does not follow `{layer}-{type}-{name}`
    NamingViolation,
    /// Reference target does not exist
    BrokenReference,
    /// Reference goes from a lower layer to a higher one
    DirectionViolation,
    /// Element id already used elsewhere in the model
    DuplicateId,
    /// Relationship predicate not in the catalogue
    UnknownPredicate,
}

impl IssueKind {
    pub fn severity(&self) -> Severity {
        match self {
            Self::UnknownPredicate => Severity::Warning,
            Self::StructuralViolation
            | Self::NamingViolation
            | Self::BrokenReference
            | Self::DirectionViolation
            | Self::DuplicateId => Severity::Error,
        }
    }
}

/// A single reported defect
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    pub layer: Layer,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element_id: Option<String>,
    pub message: String,
    pub severity: Severity,
    pub location: String,
    pub fix_suggestion: String,
    #[serde(skip)]
    pub kind: IssueKind,
}

impl ValidationIssue {
    /// Create an issue with the kind's default severity
    pub fn new(kind: IssueKind, layer: Layer, message: impl Into<String>) -> Self {
        Self {
            layer,
            element_id: None,
            message: message.into(),
            severity: kind.severity(),
            location: String::new(),
            fix_suggestion: String::new(),
            kind,
        }
    }

    pub fn for_element(mut self, element_id: impl Into<String>) -> Self {
        self.element_id = Some(element_id.into());
        self
    }

    pub fn at(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn fix(mut self, suggestion: impl Into<String>) -> Self {
        self.fix_suggestion = suggestion.into();
        self
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.severity, self.message)?;
        if let Some(id) = &self.element_id {
            write!(f, " ({})", id)?;
        }
        if !self.location.is_empty() {
            write!(f, " at {}", self.location)?;
        }
        if !self.fix_suggestion.is_empty() {
            write!(f, "\n  fix: {}", self.fix_suggestion)?;
        }
        Ok(())
    }
}

/// Aggregated issues of a validation run, in report order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationResult {
    errors: Vec<ValidationIssue>,
    warnings: Vec<ValidationIssue>,
}

/// Serialised form of a [`ValidationResult`]
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport<'a> {
    pub valid: bool,
    pub errors: &'a [ValidationIssue],
    pub warnings: &'a [ValidationIssue],
    pub error_count: usize,
    pub warning_count: usize,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an issue, routed by its severity
    pub fn add(&mut self, issue: ValidationIssue) {
        match issue.severity {
            Severity::Error => self.errors.push(issue),
            Severity::Warning => self.warnings.push(issue),
        }
    }

    /// True iff there are no errors
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[ValidationIssue] {
        &self.errors
    }

    pub fn warnings(&self) -> &[ValidationIssue] {
        &self.warnings
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// Errors followed by warnings
    pub fn issues(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.errors.iter().chain(self.warnings.iter())
    }

    /// Append `other`, prefixing each message with `"{prefix}: "`.
    ///
    /// Order and all other issue fields are preserved; nothing is deduplicated.
    pub fn merge(&mut self, other: ValidationResult, prefix: &str) {
        let label = |mut issue: ValidationIssue| {
            issue.message = format!("{}: {}", prefix, issue.message);
            issue
        };
        self.errors.extend(other.errors.into_iter().map(label));
        self.warnings.extend(other.warnings.into_iter().map(label));
    }

    /// Append `other` unchanged
    pub fn extend(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    pub fn report(&self) -> ValidationReport<'_> {
        ValidationReport {
            valid: self.is_valid(),
            errors: &self.errors,
            warnings: &self.warnings,
            error_count: self.error_count(),
            warning_count: self.warning_count(),
        }
    }

    /// Human-readable listing of all issues plus a count line
    pub fn summary(&self) -> String {
        let mut output = String::new();

        for issue in self.issues() {
            output.push_str(&format!("{}\n", issue));
        }

        if self.is_valid() && self.warnings.is_empty() {
            output.push_str("Model is valid\n");
        } else {
            output.push_str(&format!(
                "\n{} error(s), {} warning(s)\n",
                self.error_count(),
                self.warning_count()
            ));
        }

        output
    }
}

impl Serialize for ValidationResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.report().serialize(serializer)
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary())
    }
}
