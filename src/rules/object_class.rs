//! ObjectClass rules (spec §4.9).

use crate::entity::{EntityKind, ObjectClass, ObjectClassKind, SchemaObject};
use crate::error::{ErrorCode, SchemaViolation};
use crate::manager::Registries;
use crate::resolver;

/// OID of the conventional root object class ("top"); the only class
/// permitted to declare zero superiors.
pub const ROOT_OBJECT_CLASS_OID: &str = "2.5.6.0";

pub fn validate(oc: &ObjectClass, registries: &Registries) -> Vec<SchemaViolation> {
    let mut violations = Vec::new();
    let oid = oc.oid();

    if oc.superior_oids.is_empty() && oid != ROOT_OBJECT_CLASS_OID {
        violations.push(
            SchemaViolation::new(ErrorCode::UnknownSuperior, oid, EntityKind::ObjectClass)
                .with_detail("at least one superior is required except for the root class"),
        );
    }

    let ancestors = match resolver::resolve_object_class_ancestors(
        oid,
        &oc.superior_oids,
        &registries.object_classes,
        &registries.oids,
    ) {
        Ok(ancestors) => Some(ancestors),
        Err(violation) => {
            violations.push(violation);
            None
        }
    };

    if let Some(ancestors) = &ancestors {
        let ancestor_kinds: Vec<ObjectClassKind> = ancestors
            .iter()
            .filter_map(|a| registries.object_classes.get(a))
            .map(|a| a.kind)
            .collect();

        match oc.kind {
            ObjectClassKind::Abstract => {
                if ancestor_kinds
                    .iter()
                    .any(|k| *k != ObjectClassKind::Abstract)
                {
                    violations.push(SchemaViolation::new(
                        ErrorCode::KindIncompatibility,
                        oid,
                        EntityKind::ObjectClass,
                    ).with_detail("an ABSTRACT class may only inherit from ABSTRACT classes"));
                }
            }
            ObjectClassKind::Auxiliary => {
                if ancestor_kinds
                    .iter()
                    .any(|k| *k == ObjectClassKind::Structural)
                {
                    violations.push(SchemaViolation::new(
                        ErrorCode::KindIncompatibility,
                        oid,
                        EntityKind::ObjectClass,
                    ).with_detail("an AUXILIARY class may not inherit from a STRUCTURAL class"));
                }
            }
            ObjectClassKind::Structural => {
                if !ancestor_kinds.is_empty()
                    && ancestor_kinds
                        .iter()
                        .all(|k| *k == ObjectClassKind::Auxiliary)
                {
                    violations.push(SchemaViolation::new(
                        ErrorCode::KindIncompatibility,
                        oid,
                        EntityKind::ObjectClass,
                    ).with_detail("a STRUCTURAL class may not have an AUXILIARY-only superior chain"));
                }
            }
        }
    }

    for must_oid in &oc.must_oids {
        if registries
            .attribute_types
            .lookup(must_oid, &registries.oids)
            .is_none()
        {
            violations.push(
                SchemaViolation::new(ErrorCode::UnknownAttributeType, oid, EntityKind::ObjectClass)
                    .with_reference(must_oid.clone()),
            );
        }
    }
    for may_oid in &oc.may_oids {
        if registries
            .attribute_types
            .lookup(may_oid, &registries.oids)
            .is_none()
        {
            violations.push(
                SchemaViolation::new(ErrorCode::UnknownAttributeType, oid, EntityKind::ObjectClass)
                    .with_reference(may_oid.clone()),
            );
        }
    }

    if oc.must_oids.iter().any(|m| oc.may_oids.contains(m)) {
        violations.push(SchemaViolation::new(
            ErrorCode::MustMayOverlap,
            oid,
            EntityKind::ObjectClass,
        ));
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::AttributeType;
    use crate::manager::SchemaManager;

    fn register_attr(manager: &SchemaManager, oid: &str, name: &str) {
        let mut at = AttributeType::new(oid, "test");
        at.header.names = vec![name.to_string()];
        at.syntax_oid = Some("1.3.6.1.4.1.1466.115.121.1.26".to_string());
        at.equality_oid = Some("2.5.13.1".to_string());
        assert!(manager.add(at.into()));
    }

    #[test]
    fn test_must_may_overlap_rejected() {
        let manager = SchemaManager::new();
        register_attr(&manager, "1.1.0", "sn");

        let mut oc = ObjectClass::new("1.1.5", "test");
        oc.header.names = vec!["overlapping".to_string()];
        oc.superior_oids = vec!["top".to_string()];
        oc.must_oids = vec!["sn".to_string()];
        oc.may_oids = vec!["sn".to_string()];

        let violations = validate(&oc, &manager.snapshot());
        assert!(violations.iter().any(|v| v.code == ErrorCode::MustMayOverlap));
    }

    #[test]
    fn test_auxiliary_cannot_inherit_structural() {
        let manager = SchemaManager::new();
        let mut person = ObjectClass::new("2.5.6.6", "test");
        person.header.names = vec!["person".to_string()];
        person.superior_oids = vec!["top".to_string()];
        person.kind = ObjectClassKind::Structural;
        assert!(manager.add(person.into()));

        let mut aux = ObjectClass::new("1.1.9", "test");
        aux.header.names = vec!["auxExample".to_string()];
        aux.superior_oids = vec!["person".to_string()];
        aux.kind = ObjectClassKind::Auxiliary;

        let violations = validate(&aux, &manager.snapshot());
        assert!(violations
            .iter()
            .any(|v| v.code == ErrorCode::KindIncompatibility));
    }

    #[test]
    fn test_root_class_allows_no_superior() {
        let manager = SchemaManager::new();
        let registries = manager.snapshot();
        let top = registries.object_classes.get(ROOT_OBJECT_CLASS_OID).unwrap();
        let violations = validate(top, &registries);
        assert!(!violations
            .iter()
            .any(|v| v.detail.contains("at least one superior")));
    }
}
