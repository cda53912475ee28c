//! The "system" schema: a small, always-present seed of foundational
//! entities (`top`, a couple of core syntaxes and matching rules, and an
//! operational attribute type) that every other schema implicitly depends
//! on (spec §4.14).
//!
//! Bootstrap entities are inserted directly into the registries rather than
//! through [`crate::manager::SchemaManager::try_add`] — they are trusted,
//! internally-consistent seed data, not user input, so there is nothing to
//! validate them against yet.

use crate::entity::{
    AttributeType, AttributeUsage, Comparator, EntityKind, Implementation, LdapSyntax,
    MatchingRule, Normalizer, ObjectClass, ObjectClassKind, SyntaxChecker,
};
use crate::manager::Registries;
use crate::schema_set::Schema;

pub const SYSTEM_SCHEMA_NAME: &str = "system";

pub const DIRECTORY_STRING_SYNTAX: &str = "1.3.6.1.4.1.1466.115.121.1.15";
pub const OCTET_STRING_SYNTAX: &str = "1.3.6.1.4.1.1466.115.121.1.26";
pub const GENERALIZED_TIME_SYNTAX: &str = "1.3.6.1.4.1.1466.115.121.1.24";

pub const DISTINGUISHED_NAME_MATCH: &str = "2.5.13.1";
pub const CASE_IGNORE_MATCH: &str = "2.5.13.2";

pub const TOP_OBJECT_CLASS: &str = "2.5.6.0";
pub const CREATE_TIMESTAMP_ATTRIBUTE: &str = "2.5.18.4";

const DIRECTORY_STRING_SYNTAX_CHECKER: &str = "1.1.100.1";
const OCTET_STRING_SYNTAX_CHECKER: &str = "1.1.100.2";
const GENERALIZED_TIME_SYNTAX_CHECKER: &str = "1.1.100.3";
const DISTINGUISHED_NAME_NORMALIZER: &str = "1.1.101.1";
const DISTINGUISHED_NAME_COMPARATOR: &str = "1.1.102.1";
const CASE_IGNORE_NORMALIZER: &str = "1.1.101.2";
const CASE_IGNORE_COMPARATOR: &str = "1.1.102.2";

fn syntax_checker(oid: &str, fqcn: &str) -> SyntaxChecker {
    SyntaxChecker {
        header: crate::entity::EntityHeader::new(oid, SYSTEM_SCHEMA_NAME),
        implementation: Implementation {
            fqcn: fqcn.to_string(),
            bytecode: None,
        },
    }
}

fn normalizer(oid: &str, fqcn: &str) -> Normalizer {
    Normalizer {
        header: crate::entity::EntityHeader::new(oid, SYSTEM_SCHEMA_NAME),
        implementation: Implementation {
            fqcn: fqcn.to_string(),
            bytecode: None,
        },
    }
}

fn comparator(oid: &str, fqcn: &str) -> Comparator {
    Comparator {
        header: crate::entity::EntityHeader::new(oid, SYSTEM_SCHEMA_NAME),
        implementation: Implementation {
            fqcn: fqcn.to_string(),
            bytecode: None,
        },
    }
}

fn syntax(oid: &str, desc: &str, checker_oid: &str) -> LdapSyntax {
    LdapSyntax {
        header: crate::entity::EntityHeader::new(oid, SYSTEM_SCHEMA_NAME)
            .with_description(Some(desc.to_string())),
        syntax_checker_oid: Some(checker_oid.to_string()),
        human_readable: true,
    }
}

fn matching_rule(
    oid: &str,
    name: &str,
    syntax_oid: &str,
    normalizer_oid: &str,
    comparator_oid: &str,
) -> MatchingRule {
    MatchingRule {
        header: crate::entity::EntityHeader::new(oid, SYSTEM_SCHEMA_NAME)
            .with_names(vec![name.to_string()]),
        syntax_oid: syntax_oid.to_string(),
        normalizer_oid: Some(normalizer_oid.to_string()),
        comparator_oid: Some(comparator_oid.to_string()),
    }
}

/// Populate `registries` with the system schema. Panics only on an internal
/// inconsistency in the seed data itself (a bug in this module, never a
/// reachable runtime condition).
pub fn seed_system_schema(registries: &mut Registries) {
    let mut schema = Schema::new(SYSTEM_SCHEMA_NAME);

    for checker in [
        syntax_checker(DIRECTORY_STRING_SYNTAX_CHECKER, "system.DirectoryStringSyntaxChecker"),
        syntax_checker(OCTET_STRING_SYNTAX_CHECKER, "system.OctetStringSyntaxChecker"),
        syntax_checker(GENERALIZED_TIME_SYNTAX_CHECKER, "system.GeneralizedTimeSyntaxChecker"),
    ] {
        let oid = checker.header.oid.clone();
        registries
            .syntax_checkers
            .register(checker, &mut registries.oids)
            .expect("system syntax checkers are internally consistent");
        schema.add_member(EntityKind::SyntaxChecker, oid);
    }

    for norm in [
        normalizer(DISTINGUISHED_NAME_NORMALIZER, "system.DistinguishedNameNormalizer"),
        normalizer(CASE_IGNORE_NORMALIZER, "system.CaseIgnoreNormalizer"),
    ] {
        let oid = norm.header.oid.clone();
        registries
            .normalizers
            .register(norm, &mut registries.oids)
            .expect("system normalizers are internally consistent");
        schema.add_member(EntityKind::Normalizer, oid);
    }

    for cmp in [
        comparator(DISTINGUISHED_NAME_COMPARATOR, "system.DistinguishedNameComparator"),
        comparator(CASE_IGNORE_COMPARATOR, "system.CaseIgnoreComparator"),
    ] {
        let oid = cmp.header.oid.clone();
        registries
            .comparators
            .register(cmp, &mut registries.oids)
            .expect("system comparators are internally consistent");
        schema.add_member(EntityKind::Comparator, oid);
    }

    for syn in [
        syntax(DIRECTORY_STRING_SYNTAX, "Directory String", DIRECTORY_STRING_SYNTAX_CHECKER),
        syntax(OCTET_STRING_SYNTAX, "Octet String", OCTET_STRING_SYNTAX_CHECKER),
        syntax(GENERALIZED_TIME_SYNTAX, "Generalized Time", GENERALIZED_TIME_SYNTAX_CHECKER),
    ] {
        let oid = syn.header.oid.clone();
        registries
            .syntaxes
            .register(syn, &mut registries.oids)
            .expect("system syntaxes are internally consistent");
        schema.add_member(EntityKind::LdapSyntax, oid);
    }

    for mr in [
        matching_rule(
            DISTINGUISHED_NAME_MATCH,
            "distinguishedNameMatch",
            DIRECTORY_STRING_SYNTAX,
            DISTINGUISHED_NAME_NORMALIZER,
            DISTINGUISHED_NAME_COMPARATOR,
        ),
        matching_rule(
            CASE_IGNORE_MATCH,
            "caseIgnoreMatch",
            DIRECTORY_STRING_SYNTAX,
            CASE_IGNORE_NORMALIZER,
            CASE_IGNORE_COMPARATOR,
        ),
    ] {
        let oid = mr.header.oid.clone();
        registries
            .matching_rules
            .register(mr, &mut registries.oids)
            .expect("system matching rules are internally consistent");
        schema.add_member(EntityKind::MatchingRule, oid);
    }

    let mut top = ObjectClass::new(TOP_OBJECT_CLASS, SYSTEM_SCHEMA_NAME);
    top.header.names = vec!["top".to_string()];
    top.header.description = Some("top of the object class hierarchy".to_string());
    top.kind = ObjectClassKind::Abstract;
    registries
        .object_classes
        .register(top, &mut registries.oids)
        .expect("top is internally consistent");
    schema.add_member(EntityKind::ObjectClass, TOP_OBJECT_CLASS.to_string());

    let mut create_timestamp = AttributeType::new(CREATE_TIMESTAMP_ATTRIBUTE, SYSTEM_SCHEMA_NAME);
    create_timestamp.header.names = vec!["createTimestamp".to_string()];
    create_timestamp.syntax_oid = Some(GENERALIZED_TIME_SYNTAX.to_string());
    create_timestamp.equality_oid = Some(DISTINGUISHED_NAME_MATCH.to_string());
    create_timestamp.usage = AttributeUsage::DirectoryOperation;
    create_timestamp.no_user_modification = true;
    registries
        .attribute_types
        .register(create_timestamp, &mut registries.oids)
        .expect("createTimestamp is internally consistent");
    schema.add_member(EntityKind::AttributeType, CREATE_TIMESTAMP_ATTRIBUTE.to_string());

    registries.schemas.insert(SYSTEM_SCHEMA_NAME.to_string(), schema);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::SchemaObject;

    #[test]
    fn test_seed_registers_top_and_create_timestamp() {
        let mut registries = Registries::default();
        seed_system_schema(&mut registries);

        assert!(registries.object_classes.get(TOP_OBJECT_CLASS).is_some());
        let ct = registries
            .attribute_types
            .get(CREATE_TIMESTAMP_ATTRIBUTE)
            .unwrap();
        assert_eq!(ct.usage, AttributeUsage::DirectoryOperation);
        assert!(registries.schemas.contains_key(SYSTEM_SCHEMA_NAME));
    }

    #[test]
    fn test_seed_is_internally_reference_complete() {
        let mut registries = Registries::default();
        seed_system_schema(&mut registries);
        let violations = crate::resolver::check_all(&registries);
        assert!(violations.is_empty(), "{:?}", violations);
    }
}
