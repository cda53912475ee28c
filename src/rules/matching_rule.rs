//! MatchingRule rules (spec §4.7).

use crate::entity::{EntityKind, MatchingRule, SchemaObject};
use crate::error::{ErrorCode, SchemaViolation};
use crate::manager::Registries;

pub fn validate(mr: &MatchingRule, registries: &Registries) -> Vec<SchemaViolation> {
    let mut violations = Vec::new();
    let oid = mr.oid();

    if registries.syntaxes.lookup(&mr.syntax_oid, &registries.oids).is_none() {
        violations.push(
            SchemaViolation::new(ErrorCode::UnknownSyntax, oid, EntityKind::MatchingRule)
                .with_reference(mr.syntax_oid.clone()),
        );
    }

    match &mr.normalizer_oid {
        Some(normalizer_oid) => {
            if registries
                .normalizers
                .lookup(normalizer_oid, &registries.oids)
                .is_none()
            {
                violations.push(
                    SchemaViolation::new(ErrorCode::MissingNormalizer, oid, EntityKind::MatchingRule)
                        .with_reference(normalizer_oid.clone()),
                );
            }
        }
        None => violations.push(SchemaViolation::new(
            ErrorCode::MissingNormalizer,
            oid,
            EntityKind::MatchingRule,
        )),
    }

    match &mr.comparator_oid {
        Some(comparator_oid) => {
            if registries
                .comparators
                .lookup(comparator_oid, &registries.oids)
                .is_none()
            {
                violations.push(
                    SchemaViolation::new(ErrorCode::MissingComparator, oid, EntityKind::MatchingRule)
                        .with_reference(comparator_oid.clone()),
                );
            }
        }
        None => violations.push(SchemaViolation::new(
            ErrorCode::MissingComparator,
            oid,
            EntityKind::MatchingRule,
        )),
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::SchemaObject;
    use crate::manager::SchemaManager;

    #[test]
    fn test_unknown_syntax_rejected() {
        let manager = SchemaManager::new();
        let mut mr = MatchingRule {
            header: crate::entity::EntityHeader::new("1.1.0", "test"),
            syntax_oid: "9.9.9".to_string(),
            normalizer_oid: None,
            comparator_oid: None,
        };
        mr.header.names = vec!["test".to_string()];

        let violations = validate(&mr, &manager.snapshot());
        assert!(violations.iter().any(|v| v.code == ErrorCode::UnknownSyntax));
    }

    #[test]
    fn test_missing_normalizer_and_comparator_reported() {
        let manager = SchemaManager::new();
        let mut mr = MatchingRule {
            header: crate::entity::EntityHeader::new("1.1.0", "test"),
            syntax_oid: "1.3.6.1.4.1.1466.115.121.1.15".to_string(),
            normalizer_oid: Some("9.9.9".to_string()),
            comparator_oid: Some("9.9.8".to_string()),
        };
        mr.header.names = vec!["test".to_string()];

        let violations = validate(&mr, &manager.snapshot());
        assert!(violations.iter().any(|v| v.code == ErrorCode::MissingNormalizer));
        assert!(violations.iter().any(|v| v.code == ErrorCode::MissingComparator));
    }

    #[test]
    fn test_absent_normalizer_and_comparator_reported() {
        let manager = SchemaManager::new();
        let mut mr = MatchingRule {
            header: crate::entity::EntityHeader::new("1.1.0", "test"),
            syntax_oid: "1.3.6.1.4.1.1466.115.121.1.15".to_string(),
            normalizer_oid: None,
            comparator_oid: None,
        };
        mr.header.names = vec!["test".to_string()];

        let violations = validate(&mr, &manager.snapshot());
        assert!(violations.iter().any(|v| v.code == ErrorCode::MissingNormalizer));
        assert!(violations.iter().any(|v| v.code == ErrorCode::MissingComparator));
    }
}
