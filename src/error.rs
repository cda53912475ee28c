use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entity::EntityKind;

/// Stable error codes for schema validation failures (spec §7 taxonomy).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Structural
    AlreadyExists,
    NoSuchEntity,
    DuplicateName,
    MalformedDescriptor,
    // Reference
    UnknownSuperior,
    UnknownSyntax,
    UnknownMatchingRule,
    UnknownObjectClass,
    UnknownAttributeType,
    StillReferenced,
    // Cycle
    InheritanceCycle,
    // Semantic (attribute types)
    NoSyntax,
    NoMatchingRule,
    UsageMismatch,
    CollectiveOperational,
    NoUserModUserApp,
    CollectiveSingleValued,
    // Semantic (object classes)
    KindIncompatibility,
    MustMayOverlap,
    // Completeness
    MissingNormalizer,
    MissingComparator,
    MissingSyntaxChecker,
    // Schema
    SchemaDependencyMissing,
    SchemaStillDepended,
}

/// A single structured validation failure.
///
/// Every core failure that arises from validating a proposed mutation or
/// from walking the reference graph is reported this way; no free-text
/// string is normative, only `code`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaViolation {
    pub code: ErrorCode,
    pub subject_oid: String,
    pub subject_kind: EntityKind,
    pub referenced_oid: Option<String>,
    pub detail: String,
}

impl SchemaViolation {
    pub fn new(code: ErrorCode, subject_oid: impl Into<String>, subject_kind: EntityKind) -> Self {
        Self {
            code,
            subject_oid: subject_oid.into(),
            subject_kind,
            referenced_oid: None,
            detail: String::new(),
        }
    }

    pub fn with_reference(mut self, referenced_oid: impl Into<String>) -> Self {
        self.referenced_oid = Some(referenced_oid.into());
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = detail.into();
        self
    }
}

impl std::fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:?} on {:?} {}",
            self.code, self.subject_kind, self.subject_oid
        )?;
        if let Some(ref_oid) = &self.referenced_oid {
            write!(f, " (references {})", ref_oid)?;
        }
        if !self.detail.is_empty() {
            write!(f, ": {}", self.detail)?;
        }
        Ok(())
    }
}

/// Top-level error type for operations that fail outright rather than
/// accumulating [`SchemaViolation`]s.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("schema registry lock poisoned")]
    LockPoisoned,

    #[error("loader error: {0}")]
    Loader(String),

    #[error("schema {0:?} not found")]
    SchemaNotFound(String),

    #[error("{} validation failure(s)", .0.len())]
    Validation(Vec<SchemaViolation>),
}

impl SchemaError {
    pub fn violations(&self) -> &[SchemaViolation] {
        match self {
            SchemaError::Validation(v) => v,
            _ => &[],
        }
    }
}

pub type SchemaResult<T> = Result<T, SchemaError>;
