//! LdapSyntax rules (spec §4.7).

use crate::entity::{EntityKind, LdapSyntax, SchemaObject};
use crate::error::{ErrorCode, SchemaViolation};
use crate::manager::Registries;

pub fn validate(syn: &LdapSyntax, registries: &Registries) -> Vec<SchemaViolation> {
    let mut violations = Vec::new();

    match &syn.syntax_checker_oid {
        Some(checker_oid) => {
            if registries
                .syntax_checkers
                .lookup(checker_oid, &registries.oids)
                .is_none()
            {
                violations.push(
                    SchemaViolation::new(ErrorCode::MissingSyntaxChecker, syn.oid(), EntityKind::LdapSyntax)
                        .with_reference(checker_oid.clone()),
                );
            }
        }
        None => violations.push(SchemaViolation::new(
            ErrorCode::MissingSyntaxChecker,
            syn.oid(),
            EntityKind::LdapSyntax,
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
    fn test_missing_syntax_checker_reported() {
        let manager = SchemaManager::new();
        let mut syn = LdapSyntax {
            header: crate::entity::EntityHeader::new("1.1.0", "test"),
            syntax_checker_oid: Some("9.9.9".to_string()),
            human_readable: true,
        };
        syn.header.names = Vec::new();

        let violations = validate(&syn, &manager.snapshot());
        assert!(violations
            .iter()
            .any(|v| v.code == ErrorCode::MissingSyntaxChecker));
    }

    #[test]
    fn test_absent_checker_reported() {
        let manager = SchemaManager::new();
        let syn = LdapSyntax {
            header: crate::entity::EntityHeader::new("1.1.0", "test"),
            syntax_checker_oid: None,
            human_readable: true,
        };

        let violations = validate(&syn, &manager.snapshot());
        assert!(violations
            .iter()
            .any(|v| v.code == ErrorCode::MissingSyntaxChecker));
    }
}
