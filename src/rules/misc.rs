//! Reference-resolution rules for the remaining four entity kinds (spec
//! §4.7): MatchingRuleUse, DitContentRule, DitStructureRule and NameForm.
//! None of these carry semantic rules of their own beyond "every reference
//! resolves" — the interesting constraint checking lives in
//! [`crate::rules::attribute_type`] and [`crate::rules::object_class`].

use crate::entity::{DitContentRule, DitStructureRule, EntityKind, MatchingRuleUse, NameForm, SchemaObject};
use crate::error::{ErrorCode, SchemaViolation};
use crate::manager::Registries;

pub fn validate_matching_rule_use(mru: &MatchingRuleUse, registries: &Registries) -> Vec<SchemaViolation> {
    let mut violations = Vec::new();
    if registries.matching_rules.lookup(mru.oid(), &registries.oids).is_none() {
        violations.push(
            SchemaViolation::new(ErrorCode::UnknownMatchingRule, mru.oid(), EntityKind::MatchingRuleUse)
                .with_reference(mru.oid().to_string()),
        );
    }
    for at_oid in &mru.applies_oids {
        if registries.attribute_types.lookup(at_oid, &registries.oids).is_none() {
            violations.push(
                SchemaViolation::new(ErrorCode::UnknownAttributeType, mru.oid(), EntityKind::MatchingRuleUse)
                    .with_reference(at_oid.clone()),
            );
        }
    }
    violations
}

pub fn validate_dit_content_rule(dcr: &DitContentRule, registries: &Registries) -> Vec<SchemaViolation> {
    let mut violations = Vec::new();
    let oid = dcr.oid();

    if registries
        .object_classes
        .lookup(&dcr.structural_oid, &registries.oids)
        .is_none()
    {
        violations.push(
            SchemaViolation::new(ErrorCode::UnknownObjectClass, oid, EntityKind::DitContentRule)
                .with_reference(dcr.structural_oid.clone()),
        );
    }
    for oc_oid in &dcr.aux_oids {
        if registries.object_classes.lookup(oc_oid, &registries.oids).is_none() {
            violations.push(
                SchemaViolation::new(ErrorCode::UnknownObjectClass, oid, EntityKind::DitContentRule)
                    .with_reference(oc_oid.clone()),
            );
        }
    }
    for at_oid in dcr.must_oids.iter().chain(&dcr.may_oids).chain(&dcr.not_oids) {
        if registries.attribute_types.lookup(at_oid, &registries.oids).is_none() {
            violations.push(
                SchemaViolation::new(ErrorCode::UnknownAttributeType, oid, EntityKind::DitContentRule)
                    .with_reference(at_oid.clone()),
            );
        }
    }
    violations
}

pub fn validate_name_form(nf: &NameForm, registries: &Registries) -> Vec<SchemaViolation> {
    let mut violations = Vec::new();
    let oid = nf.oid();

    if registries
        .object_classes
        .lookup(&nf.object_class_oid, &registries.oids)
        .is_none()
    {
        violations.push(
            SchemaViolation::new(ErrorCode::UnknownObjectClass, oid, EntityKind::NameForm)
                .with_reference(nf.object_class_oid.clone()),
        );
    }
    if nf.must_oids.is_empty() {
        violations.push(
            SchemaViolation::new(ErrorCode::MalformedDescriptor, oid, EntityKind::NameForm)
                .with_detail("a name form requires at least one MUST attribute"),
        );
    }
    for at_oid in nf.must_oids.iter().chain(&nf.may_oids) {
        if registries.attribute_types.lookup(at_oid, &registries.oids).is_none() {
            violations.push(
                SchemaViolation::new(ErrorCode::UnknownAttributeType, oid, EntityKind::NameForm)
                    .with_reference(at_oid.clone()),
            );
        }
    }
    violations
}

pub fn validate_dit_structure_rule(dsr: &DitStructureRule, registries: &Registries) -> Vec<SchemaViolation> {
    let mut violations = Vec::new();
    let oid = dsr.oid();

    if registries
        .name_forms
        .lookup(&dsr.name_form_oid, &registries.oids)
        .is_none()
    {
        violations.push(
            SchemaViolation::new(ErrorCode::MalformedDescriptor, oid, EntityKind::DitStructureRule)
                .with_reference(dsr.name_form_oid.clone())
                .with_detail("FORM does not resolve to a registered name form"),
        );
    }
    for sup_rule_id in &dsr.superior_rule_ids {
        let exists = registries
            .dit_structure_rules
            .iterate()
            .any(|r| r.rule_id == *sup_rule_id);
        if !exists {
            violations.push(
                SchemaViolation::new(ErrorCode::MalformedDescriptor, oid, EntityKind::DitStructureRule)
                    .with_reference(sup_rule_id.to_string())
                    .with_detail("SUP does not resolve to a registered rule id"),
            );
        }
    }
    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{AttributeType, EntityHeader, ObjectClass, ObjectClassKind, SchemaObject};
    use crate::manager::SchemaManager;

    #[test]
    fn test_name_form_requires_must() {
        let manager = SchemaManager::new();
        let nf = NameForm {
            header: EntityHeader::new("1.1.0", "test"),
            object_class_oid: "2.5.6.0".to_string(),
            must_oids: Vec::new(),
            may_oids: Vec::new(),
        };
        let violations = validate_name_form(&nf, &manager.snapshot());
        assert!(violations
            .iter()
            .any(|v| v.code == ErrorCode::MalformedDescriptor));
    }

    #[test]
    fn test_name_form_unknown_object_class() {
        let manager = SchemaManager::new();
        let mut at = AttributeType::new("2.5.4.3", "system");
        at.header.names = vec!["cn".to_string()];
        at.syntax_oid = Some("1.3.6.1.4.1.1466.115.121.1.15".to_string());
        at.equality_oid = Some("2.5.13.2".to_string());
        assert!(manager.add(at.into()));

        let nf = NameForm {
            header: EntityHeader::new("1.1.0", "test"),
            object_class_oid: "9.9.9".to_string(),
            must_oids: vec!["2.5.4.3".to_string()],
            may_oids: Vec::new(),
        };

        let violations = validate_name_form(&nf, &manager.snapshot());
        assert!(violations.iter().any(|v| v.code == ErrorCode::UnknownObjectClass));
    }

    #[test]
    fn test_dit_content_rule_validates_references() {
        let manager = SchemaManager::new();
        let mut aux = ObjectClass::new("1.1.9", "test");
        aux.header.names = vec!["auxExample".to_string()];
        aux.kind = ObjectClassKind::Auxiliary;
        aux.superior_oids = vec!["top".to_string()];
        assert!(manager.add(aux.into()));

        let dcr = DitContentRule {
            header: EntityHeader::new("2.5.6.0", "test"),
            structural_oid: "2.5.6.0".to_string(),
            aux_oids: vec!["auxExample".to_string()],
            must_oids: Vec::new(),
            may_oids: Vec::new(),
            not_oids: Vec::new(),
        };
        let violations = validate_dit_content_rule(&dcr, &manager.snapshot());
        assert!(violations.is_empty(), "{:?}", violations);
    }
}
