//! Diagnostics and the score-carrying validation accumulator.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

/// Severity of a diagnostic.
///
/// Validation problems default to [`Severity::Warning`]; see
/// [`crate::ValidationSettings`] for the promotion knob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
    Info,
    Hint,
}

/// Stable machine-readable diagnostic codes.
///
/// `EnumValueMismatch` is the only code the engine emits; editors key
/// code actions off it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    EnumValueMismatch,
}

/// Classification of a problem, used when ranking alternative branches:
/// all else being equal, a branch that failed only on its `type` keyword
/// ranks below one that failed a narrower constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProblemKind {
    TypeMismatch,
    General,
}

/// A single validation problem anchored to a source span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub offset: usize,
    pub length: usize,
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
    pub kind: ProblemKind,
}

/// Mutable accumulator for one validation run over a node.
///
/// Besides the problem list it tracks four match counters and an
/// enum-match flag; [`ValidationResult::compare`] orders results by these
/// so that `anyOf`/`oneOf` can pick the best branch for error reporting.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub problems: Vec<Diagnostic>,
    pub properties_matches: u32,
    pub properties_value_matches: u32,
    pub primary_value_matches: u32,
    pub enum_value_match: bool,
    pub enum_values: Option<Vec<Value>>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_problems(&self) -> bool {
        !self.problems.is_empty()
    }

    /// Append `other`'s problems. Scores are not combined; callers that
    /// want score transfer do it explicitly.
    pub fn merge(&mut self, other: ValidationResult) {
        self.problems.extend(other.problems);
    }

    /// Coalesce enum candidates from a branch that also missed its enum:
    /// the accepted-value lists are concatenated and every existing
    /// enum-mismatch message is rewritten to list the union.
    pub fn merge_enum_values(&mut self, other: &ValidationResult) {
        if self.enum_value_match || other.enum_value_match {
            return;
        }
        let (Some(values), Some(other_values)) = (&mut self.enum_values, &other.enum_values)
        else {
            return;
        };
        values.extend(other_values.iter().cloned());
        let message = format!(
            "Value is not accepted. Valid values: {}.",
            stringify_values(values)
        );
        for problem in &mut self.problems {
            if problem.code == Some(ErrorCode::EnumValueMismatch) {
                problem.message = message.clone();
            }
        }
    }

    /// Fold the result of validating one property (or array item) into
    /// this result, bumping the match counters.
    pub fn merge_property_match(&mut self, child: ValidationResult) {
        let value_match = child.enum_value_match
            || (!child.has_problems() && child.properties_matches > 0);
        let primary_match = child.enum_value_match
            && child.enum_values.as_ref().is_some_and(|v| v.len() == 1);
        self.merge(child);
        self.properties_matches += 1;
        if value_match {
            self.properties_value_matches += 1;
        }
        if primary_match {
            self.primary_value_matches += 1;
        }
    }

    fn type_mismatches(&self) -> usize {
        self.problems
            .iter()
            .filter(|p| p.kind == ProblemKind::TypeMismatch)
            .count()
    }

    /// Total order used to rank alternative branches: clean beats dirty,
    /// then enum match, then the three counters, then fewer type-mismatch
    /// problems.
    pub fn compare(&self, other: &ValidationResult) -> Ordering {
        let has_problems = self.has_problems();
        if has_problems != other.has_problems() {
            return if has_problems {
                Ordering::Less
            } else {
                Ordering::Greater
            };
        }
        if self.enum_value_match != other.enum_value_match {
            return if other.enum_value_match {
                Ordering::Less
            } else {
                Ordering::Greater
            };
        }
        if self.primary_value_matches != other.primary_value_matches {
            return self.primary_value_matches.cmp(&other.primary_value_matches);
        }
        if self.properties_value_matches != other.properties_value_matches {
            return self
                .properties_value_matches
                .cmp(&other.properties_value_matches);
        }
        if self.properties_matches != other.properties_matches {
            return self.properties_matches.cmp(&other.properties_matches);
        }
        other.type_mismatches().cmp(&self.type_mismatches())
    }
}

/// Render a schema value the way it appears in enum diagnostics.
pub(crate) fn stringify_value(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

pub(crate) fn stringify_values(values: &[Value]) -> String {
    values
        .iter()
        .map(stringify_value)
        .collect::<Vec<_>>()
        .join(", ")
}
