//! Reference-integrity resolver (spec §4.6, component C6).
//!
//! This module owns the primitives for walking the reference graph —
//! superior chains, object-class superior DAGs, and "who points at this
//! OID" reverse lookups. [`crate::rules`] builds the semantic per-kind
//! rules (§4.8, §4.9) on top of these primitives; [`check_all`] runs a
//! whole-registry health check by re-running those same rules over every
//! already-registered entity (testable property 3: a committed state has
//! no outstanding violations).

use std::collections::BTreeSet;

use crate::entity::{AttributeType, EntityKind, ObjectClass, SchemaObject};
use crate::error::{ErrorCode, SchemaViolation};
use crate::manager::Registries;
use crate::registry::TypedRegistry;

/// Walk an `AttributeType`'s superior chain, from the immediate superior
/// outward, detecting a self-reference or a deeper cycle (spec §4.8 rule
/// 4, §9 "graph cycles" design note: OIDs only, DFS with a grey set).
///
/// `self_oid` is the OID of the entity being validated; it need not yet be
/// registered. Returns the chain in nearest-to-farthest order.
pub fn resolve_superior_chain<'r>(
    self_oid: &str,
    start_superior: Option<&str>,
    attribute_types: &'r TypedRegistry<AttributeType>,
    oids: &crate::oid_registry::OidRegistry,
) -> Result<Vec<&'r AttributeType>, SchemaViolation> {
    let Some(start) = start_superior else {
        return Ok(Vec::new());
    };

    if start == self_oid {
        return Err(SchemaViolation::new(
            ErrorCode::InheritanceCycle,
            self_oid,
            EntityKind::AttributeType,
        )
        .with_reference(start));
    }

    let mut chain = Vec::new();
    let mut grey: BTreeSet<String> = BTreeSet::new();
    grey.insert(self_oid.to_string());

    let mut cursor = start.to_string();
    loop {
        let at = attribute_types.lookup(&cursor, oids).ok_or_else(|| {
            SchemaViolation::new(ErrorCode::UnknownSuperior, self_oid, EntityKind::AttributeType)
                .with_reference(cursor.clone())
        })?;

        if grey.contains(at.oid()) {
            return Err(SchemaViolation::new(
                ErrorCode::InheritanceCycle,
                self_oid,
                EntityKind::AttributeType,
            )
            .with_reference(at.oid().to_string()));
        }
        grey.insert(at.oid().to_string());
        chain.push(at);

        match &at.superior_oid {
            Some(next) => cursor = next.clone(),
            None => break,
        }
    }

    Ok(chain)
}

/// The effective (own-or-inherited) syntax/matching-rule OIDs for an
/// attribute type, given its already-resolved superior chain (spec §4.8
/// rule 9).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EffectiveAttributeFields {
    pub syntax_oid: Option<String>,
    pub equality_oid: Option<String>,
    pub ordering_oid: Option<String>,
    pub substring_oid: Option<String>,
}

pub fn effective_fields(at: &AttributeType, chain: &[&AttributeType]) -> EffectiveAttributeFields {
    EffectiveAttributeFields {
        syntax_oid: at
            .syntax_oid
            .clone()
            .or_else(|| chain.iter().find_map(|a| a.syntax_oid.clone())),
        equality_oid: at
            .equality_oid
            .clone()
            .or_else(|| chain.iter().find_map(|a| a.equality_oid.clone())),
        ordering_oid: at
            .ordering_oid
            .clone()
            .or_else(|| chain.iter().find_map(|a| a.ordering_oid.clone())),
        substring_oid: at
            .substring_oid
            .clone()
            .or_else(|| chain.iter().find_map(|a| a.substring_oid.clone())),
    }
}

/// Resolve every ancestor of an object class through its (possibly
/// multi-parent) superior DAG, detecting cycles with a grey/visited
/// marking scheme. Diamond inheritance (reaching the same ancestor via two
/// different paths) is fine and only visited once.
pub fn resolve_object_class_ancestors(
    self_oid: &str,
    direct_superiors: &[String],
    object_classes: &TypedRegistry<ObjectClass>,
    oids: &crate::oid_registry::OidRegistry,
) -> Result<BTreeSet<String>, SchemaViolation> {
    let mut ancestors = BTreeSet::new();
    let mut grey = BTreeSet::new();

    fn visit(
        oid_or_name: &str,
        self_oid: &str,
        object_classes: &TypedRegistry<ObjectClass>,
        oids: &crate::oid_registry::OidRegistry,
        grey: &mut BTreeSet<String>,
        ancestors: &mut BTreeSet<String>,
    ) -> Result<(), SchemaViolation> {
        if oid_or_name == self_oid {
            return Err(SchemaViolation::new(
                ErrorCode::InheritanceCycle,
                self_oid,
                EntityKind::ObjectClass,
            )
            .with_reference(oid_or_name));
        }

        let oc = object_classes.lookup(oid_or_name, oids).ok_or_else(|| {
            SchemaViolation::new(ErrorCode::UnknownSuperior, self_oid, EntityKind::ObjectClass)
                .with_reference(oid_or_name)
        })?;
        let oc_oid = oc.oid().to_string();

        if grey.contains(&oc_oid) {
            return Err(SchemaViolation::new(
                ErrorCode::InheritanceCycle,
                self_oid,
                EntityKind::ObjectClass,
            )
            .with_reference(oc_oid));
        }
        if !ancestors.insert(oc_oid.clone()) {
            return Ok(());
        }

        grey.insert(oc_oid.clone());
        for sup in &oc.superior_oids {
            visit(sup, self_oid, object_classes, oids, grey, ancestors)?;
        }
        grey.remove(&oc_oid);
        Ok(())
    }

    for sup in direct_superiors {
        visit(sup, self_oid, object_classes, oids, &mut grey, &mut ancestors)?;
    }
    Ok(ancestors)
}

/// Every entity (by OID) that holds a reference to `oid`. Used by
/// `SchemaManager::delete` to enforce `StillReferenced` (spec §4.2, §4.10).
pub fn referrers_of(oid: &str, registries: &Registries) -> Vec<String> {
    let mut refs = Vec::new();

    for at in registries.attribute_types.iterate() {
        if at.oid() != oid
            && (at.superior_oid.as_deref() == Some(oid)
                || at.equality_oid.as_deref() == Some(oid)
                || at.ordering_oid.as_deref() == Some(oid)
                || at.substring_oid.as_deref() == Some(oid)
                || at.syntax_oid.as_deref() == Some(oid))
        {
            refs.push(at.oid().to_string());
        }
    }

    for oc in registries.object_classes.iterate() {
        if oc.superior_oids.iter().any(|s| s == oid)
            || oc.must_oids.iter().any(|s| s == oid)
            || oc.may_oids.iter().any(|s| s == oid)
        {
            refs.push(oc.oid().to_string());
        }
    }

    for mr in registries.matching_rules.iterate() {
        if mr.syntax_oid == oid
            || mr.normalizer_oid.as_deref() == Some(oid)
            || mr.comparator_oid.as_deref() == Some(oid)
        {
            refs.push(mr.oid().to_string());
        }
    }

    for mru in registries.matching_rule_uses.iterate() {
        if mru.applies_oids.iter().any(|s| s == oid) {
            refs.push(mru.oid().to_string());
        }
    }

    for syn in registries.syntaxes.iterate() {
        if syn.syntax_checker_oid.as_deref() == Some(oid) {
            refs.push(syn.oid().to_string());
        }
    }

    for dcr in registries.dit_content_rules.iterate() {
        if dcr.structural_oid == oid
            || dcr.aux_oids.iter().any(|s| s == oid)
            || dcr.must_oids.iter().any(|s| s == oid)
            || dcr.may_oids.iter().any(|s| s == oid)
            || dcr.not_oids.iter().any(|s| s == oid)
        {
            refs.push(dcr.oid().to_string());
        }
    }

    for nf in registries.name_forms.iterate() {
        if nf.object_class_oid == oid
            || nf.must_oids.iter().any(|s| s == oid)
            || nf.may_oids.iter().any(|s| s == oid)
        {
            refs.push(nf.oid().to_string());
        }
    }

    for dsr in registries.dit_structure_rules.iterate() {
        if dsr.name_form_oid == oid {
            refs.push(dsr.oid().to_string());
        }
    }

    refs
}

/// Full whole-registry reference-integrity pass (spec §4.6). Never
/// panics/throws — every failure becomes an entry in the returned list.
pub fn check_all(registries: &Registries) -> Vec<SchemaViolation> {
    let mut violations = Vec::new();

    for at in registries.attribute_types.iterate() {
        violations.extend(crate::rules::attribute_type::validate(at, registries));
    }
    for oc in registries.object_classes.iterate() {
        violations.extend(crate::rules::object_class::validate(oc, registries));
    }
    for mr in registries.matching_rules.iterate() {
        violations.extend(crate::rules::matching_rule::validate(mr, registries));
    }
    for syn in registries.syntaxes.iterate() {
        violations.extend(crate::rules::syntax::validate(syn, registries));
    }
    for mru in registries.matching_rule_uses.iterate() {
        violations.extend(crate::rules::misc::validate_matching_rule_use(mru, registries));
    }
    for dcr in registries.dit_content_rules.iterate() {
        violations.extend(crate::rules::misc::validate_dit_content_rule(dcr, registries));
    }
    for nf in registries.name_forms.iterate() {
        violations.extend(crate::rules::misc::validate_name_form(nf, registries));
    }
    for dsr in registries.dit_structure_rules.iterate() {
        violations.extend(crate::rules::misc::validate_dit_structure_rule(dsr, registries));
    }

    violations
}
