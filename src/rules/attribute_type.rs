//! AttributeType rules (spec §4.8, normative).

use crate::entity::{AttributeType, AttributeUsage, EntityKind, SchemaObject};
use crate::error::{ErrorCode, SchemaViolation};
use crate::manager::Registries;
use crate::resolver;

/// Validate a proposed (or already-committed) `AttributeType` against the
/// nine rules of spec §4.8. Returns every violation found — callers that
/// only care whether the entity is valid can check `is_empty()`.
pub fn validate(at: &AttributeType, registries: &Registries) -> Vec<SchemaViolation> {
    let mut violations = Vec::new();
    let oid = at.oid();

    // Rule 4: superior must resolve to a registered AttributeType, must not
    // be the entity's own OID, and must not create a cycle.
    let chain_result = resolver::resolve_superior_chain(
        oid,
        at.superior_oid.as_deref(),
        &registries.attribute_types,
        &registries.oids,
    );

    let chain = match chain_result {
        Ok(chain) => Some(chain),
        Err(violation) => {
            violations.push(violation);
            None
        }
    };

    // Rules 1, 2 and 5 read the (possibly inherited) effective fields, so
    // they only make sense once the superior chain itself is known good —
    // a broken chain is reported once, not cascaded into further errors.
    if let Some(chain) = &chain {
        let effective = resolver::effective_fields(at, chain);

        // Rule 1: syntax presence, directly or via inheritance.
        if effective.syntax_oid.is_none() {
            violations.push(SchemaViolation::new(
                ErrorCode::NoSyntax,
                oid,
                EntityKind::AttributeType,
            ));
        }

        // Rule 2: at least one matching facility, directly or inherited.
        if effective.equality_oid.is_none()
            && effective.ordering_oid.is_none()
            && effective.substring_oid.is_none()
        {
            violations.push(SchemaViolation::new(
                ErrorCode::NoMatchingRule,
                oid,
                EntityKind::AttributeType,
            ));
        }

        // Rule 5: usage must equal the immediate superior's usage.
        if let Some(superior) = chain.first() {
            if superior.usage != at.usage {
                violations.push(
                    SchemaViolation::new(ErrorCode::UsageMismatch, oid, EntityKind::AttributeType)
                        .with_reference(superior.oid().to_string())
                        .with_detail(format!(
                            "usage {} does not match superior usage {}",
                            at.usage, superior.usage
                        )),
                );
            }
        }
    }

    // Rule 3: any *directly declared* equality/ordering/substring OID must
    // resolve to a MatchingRule. Inherited values were already checked when
    // the ancestor that defines them was itself added.
    for declared in [&at.equality_oid, &at.ordering_oid, &at.substring_oid] {
        if let Some(mr_oid) = declared {
            if registries
                .matching_rules
                .lookup(mr_oid, &registries.oids)
                .is_none()
            {
                violations.push(
                    SchemaViolation::new(
                        ErrorCode::UnknownMatchingRule,
                        oid,
                        EntityKind::AttributeType,
                    )
                    .with_reference(mr_oid.clone()),
                );
            }
        }
    }

    if let Some(syntax_oid) = &at.syntax_oid {
        if registries
            .syntaxes
            .lookup(syntax_oid, &registries.oids)
            .is_none()
        {
            violations.push(
                SchemaViolation::new(ErrorCode::UnknownSyntax, oid, EntityKind::AttributeType)
                    .with_reference(syntax_oid.clone()),
            );
        }
    }

    // Rule 6: collective implies userApplications usage.
    if at.collective && at.usage != AttributeUsage::UserApplications {
        violations.push(SchemaViolation::new(
            ErrorCode::CollectiveOperational,
            oid,
            EntityKind::AttributeType,
        ));
    }

    // Rule 7: noUserModification implies an operational usage.
    if at.no_user_modification && !at.usage.is_operational() {
        violations.push(SchemaViolation::new(
            ErrorCode::NoUserModUserApp,
            oid,
            EntityKind::AttributeType,
        ));
    }

    // Rule 8: a collective attribute cannot also be single-valued.
    if at.collective && at.single_valued {
        violations.push(SchemaViolation::new(
            ErrorCode::CollectiveSingleValued,
            oid,
            EntityKind::AttributeType,
        ));
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manager::SchemaManager;

    fn manager_with_bootstrap() -> SchemaManager {
        SchemaManager::new()
    }

    #[test]
    fn test_scenario_1_missing_syntax_no_superior() {
        let manager = manager_with_bootstrap();
        let mut at = AttributeType::new("1.1.0", "test");
        at.header.names = vec!["test1".to_string()];
        at.equality_oid = Some("2.5.13.1".to_string());

        let violations = validate(&at, &manager.snapshot());
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].code, ErrorCode::NoSyntax);
    }

    #[test]
    fn test_scenario_2_collective_operational_conflict() {
        let manager = manager_with_bootstrap();
        let mut at = AttributeType::new("1.1.0", "test");
        at.header.names = vec!["test2".to_string()];
        at.syntax_oid = Some("1.3.6.1.4.1.1466.115.121.1.26".to_string());
        at.equality_oid = Some("2.5.13.1".to_string());
        at.usage = AttributeUsage::DirectoryOperation;
        at.collective = true;

        let violations = validate(&at, &manager.snapshot());
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].code, ErrorCode::CollectiveOperational);
    }

    #[test]
    fn test_scenario_3_no_user_modification_on_user_attribute() {
        let manager = manager_with_bootstrap();
        let mut at = AttributeType::new("1.1.0", "test");
        at.header.names = vec!["test3".to_string()];
        at.syntax_oid = Some("1.3.6.1.4.1.1466.115.121.1.26".to_string());
        at.equality_oid = Some("2.5.13.1".to_string());
        at.usage = AttributeUsage::UserApplications;
        at.no_user_modification = true;

        let violations = validate(&at, &manager.snapshot());
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].code, ErrorCode::NoUserModUserApp);
    }

    #[test]
    fn test_scenario_5_usage_mismatch_with_superior() {
        let manager = manager_with_bootstrap();
        let mut at = AttributeType::new("1.1.0", "test");
        at.header.names = vec!["test5".to_string()];
        at.superior_oid = Some("2.5.18.4".to_string());
        at.usage = AttributeUsage::DistributedOperation;

        let violations = validate(&at, &manager.snapshot());
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].code, ErrorCode::UsageMismatch);
    }

    #[test]
    fn test_scenario_6_self_reference() {
        let manager = manager_with_bootstrap();
        let mut at = AttributeType::new("1.1.0", "test");
        at.header.names = vec!["test6".to_string()];
        at.superior_oid = Some("1.1.0".to_string());

        let violations = validate(&at, &manager.snapshot());
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].code, ErrorCode::InheritanceCycle);
    }

    #[test]
    fn test_scenario_8_invalid_matching_rule_reference() {
        let manager = manager_with_bootstrap();
        let mut at = AttributeType::new("1.1.0", "test");
        at.header.names = vec!["test8".to_string()];
        at.syntax_oid = Some("1.3.6.1.4.1.1466.115.121.1.26".to_string());
        at.equality_oid = Some("0.0".to_string());

        let violations = validate(&at, &manager.snapshot());
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].code, ErrorCode::UnknownMatchingRule);
    }

    #[test]
    fn test_scenario_4_inherited_syntax_and_matching_rule() {
        let manager = manager_with_bootstrap();
        let mut at = AttributeType::new("1.1.0", "test");
        at.header.names = vec!["test4".to_string()];
        at.superior_oid = Some("2.5.18.4".to_string());
        at.usage = AttributeUsage::DirectoryOperation;

        let violations = validate(&at, &manager.snapshot());
        assert!(violations.is_empty(), "{:?}", violations);
    }

    #[test]
    fn test_no_matching_rule_when_nothing_set() {
        let manager = manager_with_bootstrap();
        let mut at = AttributeType::new("1.1.0", "test");
        at.header.names = vec!["bare".to_string()];
        at.syntax_oid = Some("1.3.6.1.4.1.1466.115.121.1.26".to_string());

        let violations = validate(&at, &manager.snapshot());
        assert!(violations.iter().any(|v| v.code == ErrorCode::NoMatchingRule));
    }
}
