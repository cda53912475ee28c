//! Entity factory (spec §4.5, component C5): turns parsed descriptor
//! strings into typed entities, resolving every NAME-or-OID reference field
//! to its canonical OID before the entity reaches the registries.
//!
//! A reference a caller wrote as a human-readable name (`SUP person`,
//! `EQUALITY caseIgnoreMatch`) is resolved here, once, at construction time
//! — downstream code ([`crate::resolver`], [`crate::rules`]) only ever
//! sees canonical OIDs, so it never has to re-do name lookup.

use crate::descriptor;
use crate::entity::{
    AttributeType, Comparator, DitContentRule, DitStructureRule, EntityHeader, Implementation,
    LdapSyntax, MatchingRule, MatchingRuleUse, NameForm, Normalizer, ObjectClass, SyntaxChecker,
};
use crate::error::{ErrorCode, SchemaViolation};
use crate::loader::SchemaDescriptor;
use crate::manager::{validate_and_insert, Registries};

/// Resolve a NAME-or-OID reference against the OID registry. An OID-looking
/// or simply unresolvable reference is passed through unchanged — the rule
/// layer (`UnknownSuperior`/`UnknownSyntax`/...) is what turns a dangling
/// reference into a reported violation, not the factory.
fn resolve_ref(reference: &str, registries: &Registries) -> String {
    registries
        .oids
        .lookup_by_name(reference)
        .map(|(oid, _)| oid)
        .unwrap_or_else(|| reference.to_string())
}

fn resolve_opt(reference: &Option<String>, registries: &Registries) -> Option<String> {
    reference.as_ref().map(|r| resolve_ref(r, registries))
}

fn resolve_list(references: &[String], registries: &Registries) -> Vec<String> {
    references.iter().map(|r| resolve_ref(r, registries)).collect()
}

fn malformed(kind: crate::entity::EntityKind, def: &str) -> SchemaViolation {
    SchemaViolation::new(ErrorCode::MalformedDescriptor, "", kind)
        .with_detail(format!("could not parse descriptor: {}", def))
}

/// Parse and resolve every descriptor string in `descriptor`, loading them
/// into `registries` in the kind order §4.5 requires (syntaxes and the
/// extensible-object kinds first, then matching rules, then attribute
/// types, then object classes, then the kinds that only reference those).
/// Returns every violation encountered; a non-empty result means the
/// schema was only partially loaded.
pub fn load_descriptor_into(
    registries: &mut Registries,
    schema_name: &str,
    descriptor: &SchemaDescriptor,
    strict_parsing: bool,
) -> Vec<SchemaViolation> {
    let mut violations = Vec::new();

    macro_rules! malformed_or_skip {
        ($kind:expr, $def:expr) => {{
            let v = malformed($kind, $def);
            if strict_parsing {
                violations.push(v);
            }
            continue;
        }};
    }

    for def in &descriptor.normalizers {
        let Some(parsed) = descriptor::parse_extensible(def) else {
            malformed_or_skip!(crate::entity::EntityKind::Normalizer, def);
        };
        let entity = Normalizer {
            header: EntityHeader::new(parsed.oid, schema_name).with_description(parsed.description),
            implementation: parsed.implementation,
        };
        violations.extend(validate_and_insert(registries, entity.into()));
    }

    for def in &descriptor.comparators {
        let Some(parsed) = descriptor::parse_extensible(def) else {
            malformed_or_skip!(crate::entity::EntityKind::Comparator, def);
        };
        let entity = Comparator {
            header: EntityHeader::new(parsed.oid, schema_name).with_description(parsed.description),
            implementation: parsed.implementation,
        };
        violations.extend(validate_and_insert(registries, entity.into()));
    }

    for def in &descriptor.syntax_checkers {
        let Some(parsed) = descriptor::parse_extensible(def) else {
            malformed_or_skip!(crate::entity::EntityKind::SyntaxChecker, def);
        };
        let entity = SyntaxChecker {
            header: EntityHeader::new(parsed.oid, schema_name).with_description(parsed.description),
            implementation: parsed.implementation,
        };
        violations.extend(validate_and_insert(registries, entity.into()));
    }

    for def in &descriptor.syntaxes {
        let Some(parsed) = descriptor::parse_syntax(def) else {
            malformed_or_skip!(crate::entity::EntityKind::LdapSyntax, def);
        };
        let entity = LdapSyntax {
            header: EntityHeader::new(parsed.oid, schema_name).with_description(parsed.description),
            syntax_checker_oid: resolve_opt(&parsed.syntax_checker_oid, registries),
            human_readable: parsed.human_readable,
        };
        violations.extend(validate_and_insert(registries, entity.into()));
    }

    for def in &descriptor.matching_rules {
        let Some(parsed) = descriptor::parse_matching_rule(def) else {
            malformed_or_skip!(crate::entity::EntityKind::MatchingRule, def);
        };
        let entity = MatchingRule {
            header: EntityHeader::new(parsed.oid, schema_name)
                .with_names(parsed.names)
                .with_description(parsed.description),
            syntax_oid: resolve_ref(&parsed.syntax_oid, registries),
            normalizer_oid: resolve_opt(&parsed.normalizer_oid, registries),
            comparator_oid: resolve_opt(&parsed.comparator_oid, registries),
        };
        violations.extend(validate_and_insert(registries, entity.into()));
    }

    for def in &descriptor.attribute_types {
        let Some(parsed) = descriptor::parse_attribute_type(def) else {
            malformed_or_skip!(crate::entity::EntityKind::AttributeType, def);
        };
        let mut header = EntityHeader::new(parsed.oid, schema_name)
            .with_names(parsed.names)
            .with_description(parsed.description);
        header.obsolete = parsed.obsolete;
        let entity = AttributeType {
            header,
            superior_oid: resolve_opt(&parsed.superior_oid, registries),
            equality_oid: resolve_opt(&parsed.equality_oid, registries),
            ordering_oid: resolve_opt(&parsed.ordering_oid, registries),
            substring_oid: resolve_opt(&parsed.substring_oid, registries),
            syntax_oid: resolve_opt(&parsed.syntax_oid, registries),
            single_valued: parsed.single_valued,
            collective: parsed.collective,
            no_user_modification: parsed.no_user_modification,
            usage: parsed.usage,
        };
        violations.extend(validate_and_insert(registries, entity.into()));
    }

    for def in &descriptor.object_classes {
        let Some(parsed) = descriptor::parse_object_class(def) else {
            malformed_or_skip!(crate::entity::EntityKind::ObjectClass, def);
        };
        let mut header = EntityHeader::new(parsed.oid, schema_name)
            .with_names(parsed.names)
            .with_description(parsed.description);
        header.obsolete = parsed.obsolete;
        let entity = ObjectClass {
            header,
            superior_oids: resolve_list(&parsed.superior_oids, registries),
            kind: parsed.kind,
            must_oids: resolve_list(&parsed.must, registries),
            may_oids: resolve_list(&parsed.may, registries),
        };
        violations.extend(validate_and_insert(registries, entity.into()));
    }

    for def in &descriptor.matching_rule_uses {
        let Some(parsed) = descriptor::parse_matching_rule_use(def) else {
            malformed_or_skip!(crate::entity::EntityKind::MatchingRuleUse, def);
        };
        let entity = MatchingRuleUse {
            header: EntityHeader::new(parsed.oid, schema_name)
                .with_names(parsed.names)
                .with_description(parsed.description),
            applies_oids: resolve_list(&parsed.applies, registries),
        };
        violations.extend(validate_and_insert(registries, entity.into()));
    }

    for def in &descriptor.dit_content_rules {
        let Some(parsed) = descriptor::parse_dit_content_rule(def) else {
            malformed_or_skip!(crate::entity::EntityKind::DitContentRule, def);
        };
        let entity = DitContentRule {
            header: EntityHeader::new(parsed.oid.clone(), schema_name)
                .with_names(parsed.names)
                .with_description(parsed.description),
            structural_oid: resolve_ref(&parsed.oid, registries),
            aux_oids: resolve_list(&parsed.aux, registries),
            must_oids: resolve_list(&parsed.must, registries),
            may_oids: resolve_list(&parsed.may, registries),
            not_oids: resolve_list(&parsed.not, registries),
        };
        violations.extend(validate_and_insert(registries, entity.into()));
    }

    for def in &descriptor.name_forms {
        let Some(parsed) = descriptor::parse_name_form(def) else {
            malformed_or_skip!(crate::entity::EntityKind::NameForm, def);
        };
        let entity = NameForm {
            header: EntityHeader::new(parsed.oid, schema_name)
                .with_names(parsed.names)
                .with_description(parsed.description),
            object_class_oid: resolve_ref(&parsed.object_class, registries),
            must_oids: resolve_list(&parsed.must, registries),
            may_oids: resolve_list(&parsed.may, registries),
        };
        violations.extend(validate_and_insert(registries, entity.into()));
    }

    for def in &descriptor.dit_structure_rules {
        let Some(parsed) = descriptor::parse_dit_structure_rule(def) else {
            malformed_or_skip!(crate::entity::EntityKind::DitStructureRule, def);
        };
        let entity = DitStructureRule {
            header: EntityHeader::new(parsed.rule_id.to_string(), schema_name)
                .with_names(parsed.names)
                .with_description(parsed.description),
            rule_id: parsed.rule_id,
            name_form_oid: resolve_ref(&parsed.name_form, registries),
            superior_rule_ids: parsed.superiors,
        };
        violations.extend(validate_and_insert(registries, entity.into()));
    }

    violations
}
