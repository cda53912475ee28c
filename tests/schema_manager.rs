//! End-to-end exercises of the public `SchemaManager` surface: the
//! universal properties and named scenarios the engine is expected to
//! satisfy, driven through `add`/`delete`/`enable`/`disable`/`lookup_*`
//! rather than through any single internal module.

use schema_core::{
    AttributeType, AttributeUsage, ErrorCode, InMemoryLoader, ObjectClass, ObjectClassKind,
    SchemaDescriptor, SchemaManager,
};

const CREATE_TIMESTAMP: &str = "2.5.18.4";
const OCTET_STRING_SYNTAX: &str = "1.3.6.1.4.1.1466.115.121.1.26";
const DISTINGUISHED_NAME_MATCH: &str = "2.5.13.1";

fn bare_attribute_type(oid: &str, name: &str) -> AttributeType {
    let mut at = AttributeType::new(oid, "test");
    at.header.names = vec![name.to_string()];
    at
}

// --- Universal property 1: a successful add is immediately visible, with
// no errors recorded. ---
#[test]
fn property_1_successful_add_is_visible_and_clean() {
    let manager = SchemaManager::new();
    let mut at = bare_attribute_type("1.1.0", "widgetName");
    at.syntax_oid = Some(OCTET_STRING_SYNTAX.to_string());
    at.equality_oid = Some(DISTINGUISHED_NAME_MATCH.to_string());

    assert!(manager.add(at.clone().into()));
    assert!(manager.get_errors().is_empty());
    let looked_up = manager.lookup_attribute_type("widgetName").unwrap();
    assert_eq!(looked_up.header.oid, at.header.oid);
}

// --- Universal property 2: a rejected add leaves nothing committed and
// records only taxonomy error codes. ---
#[test]
fn property_2_rejected_add_commits_nothing() {
    let manager = SchemaManager::new();
    let at = bare_attribute_type("1.1.0", "bad"); // no syntax, no matching rule

    assert!(!manager.add(at.into()));
    assert!(manager.lookup_attribute_type("1.1.0").is_none());
    assert!(manager.lookup_attribute_type("bad").is_none());
    let errors = manager.get_errors();
    assert!(!errors.is_empty());
    assert!(errors.iter().all(|v| matches!(
        v.code,
        ErrorCode::NoSyntax | ErrorCode::NoMatchingRule
    )));
}

// --- Universal property 3: the resolver finds no violations in a
// committed state (here, the bootstrapped manager plus one valid add). ---
#[test]
fn property_3_committed_state_has_no_violations() {
    let manager = SchemaManager::new();
    let mut at = bare_attribute_type("1.1.0", "widgetName");
    at.syntax_oid = Some(OCTET_STRING_SYNTAX.to_string());
    at.equality_oid = Some(DISTINGUISHED_NAME_MATCH.to_string());
    assert!(manager.add(at.into()));

    let violations = schema_core::resolver::check_all(&manager.snapshot());
    assert!(violations.is_empty(), "{:?}", violations);
}

// --- Universal property 4: loading the same schema twice is idempotent
// in its effect on lookups (a second load contributes nothing new). ---
#[test]
fn property_4_load_with_deps_is_idempotent() {
    let manager = SchemaManager::new();
    let loader = InMemoryLoader::new().with_schema(
        "core",
        SchemaDescriptor {
            attribute_types: vec![
                "( 1.1.0 NAME 'widgetName' EQUALITY distinguishedNameMatch SYNTAX 1.3.6.1.4.1.1466.115.121.1.15 )".to_string(),
            ],
            ..Default::default()
        },
    );

    assert!(manager.load_with_deps(&loader, "core"));
    let first = manager.lookup_attribute_type("widgetName").unwrap();

    // Loading again tries to re-add the same OID; the re-add is rejected
    // (AlreadyExists) but the already-committed entity is untouched.
    manager.load_with_deps(&loader, "core");
    let second = manager.lookup_attribute_type("widgetName").unwrap();
    assert_eq!(first, second);
}

// --- Universal property 5: every name of a registered entity round-trips
// to the same entity as its OID. ---
#[test]
fn property_5_name_and_oid_lookup_agree() {
    let manager = SchemaManager::new();
    let mut at = AttributeType::new("1.1.0", "test");
    at.header.names = vec!["widgetName".to_string(), "wName".to_string()];
    at.syntax_oid = Some(OCTET_STRING_SYNTAX.to_string());
    at.equality_oid = Some(DISTINGUISHED_NAME_MATCH.to_string());
    assert!(manager.add(at.into()));

    let by_oid = manager.lookup_attribute_type("1.1.0").unwrap();
    let by_name1 = manager.lookup_attribute_type("widgetName").unwrap();
    let by_name2 = manager.lookup_attribute_type("wName").unwrap();
    assert_eq!(by_oid, by_name1);
    assert_eq!(by_oid, by_name2);
}

// --- Universal property 6: delete followed by re-adding the identical
// entity restores the pre-delete lookup view. ---
#[test]
fn property_6_delete_then_readd_restores_state() {
    let manager = SchemaManager::new();
    let mut at = bare_attribute_type("1.1.0", "lonely");
    at.syntax_oid = Some(OCTET_STRING_SYNTAX.to_string());
    at.equality_oid = Some(DISTINGUISHED_NAME_MATCH.to_string());

    assert!(manager.add(at.clone().into()));
    let before = manager.lookup_attribute_type("1.1.0").unwrap();

    assert!(manager.delete("1.1.0"));
    assert!(manager.lookup_attribute_type("1.1.0").is_none());

    assert!(manager.add(at.into()));
    let after = manager.lookup_attribute_type("1.1.0").unwrap();
    assert_eq!(before, after);
}

// --- Universal property 7: disabling a schema hides exactly its own
// members and leaves everything else (e.g. the bootstrap "system" schema)
// lookup-identical. ---
#[test]
fn property_7_disable_is_monotonic_over_unrelated_schemas() {
    let manager = SchemaManager::new();
    let system_top_before = manager.lookup_object_class("top").unwrap();

    let loader = InMemoryLoader::new().with_schema(
        "extra",
        SchemaDescriptor {
            dependencies: vec!["system".to_string()],
            attribute_types: vec![
                "( 1.1.0 NAME 'widgetName' EQUALITY distinguishedNameMatch SYNTAX 1.3.6.1.4.1.1466.115.121.1.15 )".to_string(),
            ],
            ..Default::default()
        },
    );
    assert!(manager.load_with_deps(&loader, "extra"));
    assert!(manager.lookup_attribute_type("widgetName").is_some());

    assert!(manager.disable("extra"));
    let extra_schema = manager.schema("extra").unwrap();
    assert!(!extra_schema.enabled);

    // Disabling "extra" hides exactly its own members from lookup...
    assert!(manager.lookup_attribute_type("widgetName").is_none());

    // ...and leaves every other schema's members lookup-identical.
    let system_top_after = manager.lookup_object_class("top").unwrap();
    assert_eq!(system_top_before, system_top_after);
    assert!(manager.schema("system").unwrap().enabled);
}

// --- Scenario 1: missing syntax, no superior. ---
#[test]
fn scenario_1_missing_syntax_no_superior() {
    let manager = SchemaManager::new();
    let mut at = bare_attribute_type("1.1.0", "test1");
    at.equality_oid = Some(DISTINGUISHED_NAME_MATCH.to_string());

    assert!(!manager.add(at.into()));
    let errors = manager.get_errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, ErrorCode::NoSyntax);
    assert!(manager.lookup_attribute_type("1.1.0").is_none());
}

// --- Scenario 2: collective/operational conflict. ---
#[test]
fn scenario_2_collective_operational_conflict() {
    let manager = SchemaManager::new();
    let mut at = bare_attribute_type("1.1.0", "test2");
    at.syntax_oid = Some(OCTET_STRING_SYNTAX.to_string());
    at.equality_oid = Some(DISTINGUISHED_NAME_MATCH.to_string());
    at.usage = AttributeUsage::DirectoryOperation;
    at.collective = true;

    assert!(!manager.add(at.into()));
    let errors = manager.get_errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, ErrorCode::CollectiveOperational);
}

// --- Scenario 3: no-user-modification on a user attribute. ---
#[test]
fn scenario_3_no_user_modification_on_user_attribute() {
    let manager = SchemaManager::new();
    let mut at = bare_attribute_type("1.1.0", "test3");
    at.syntax_oid = Some(OCTET_STRING_SYNTAX.to_string());
    at.equality_oid = Some(DISTINGUISHED_NAME_MATCH.to_string());
    at.usage = AttributeUsage::UserApplications;
    at.no_user_modification = true;

    assert!(!manager.add(at.into()));
    let errors = manager.get_errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, ErrorCode::NoUserModUserApp);
}

// --- Scenario 4: inherited syntax and matching rule via `createTimestamp`. ---
#[test]
fn scenario_4_inherited_syntax_and_matching_rule() {
    let manager = SchemaManager::new();
    let mut at = bare_attribute_type("1.1.0", "test4");
    at.superior_oid = Some(CREATE_TIMESTAMP.to_string());
    at.usage = AttributeUsage::DirectoryOperation;

    assert!(manager.add(at.into()));
    assert!(manager.get_errors().is_empty());

    let effective = manager.effective_attribute_fields("1.1.0").unwrap();
    assert_eq!(
        effective.syntax_oid.as_deref(),
        Some("1.3.6.1.4.1.1466.115.121.1.24")
    );
    assert_eq!(effective.equality_oid.as_deref(), Some(DISTINGUISHED_NAME_MATCH));
}

// --- Scenario 5: usage mismatch with superior. ---
#[test]
fn scenario_5_usage_mismatch_with_superior() {
    let manager = SchemaManager::new();
    let mut at = bare_attribute_type("1.1.0", "test5");
    at.superior_oid = Some(CREATE_TIMESTAMP.to_string());
    at.usage = AttributeUsage::DistributedOperation;

    assert!(!manager.add(at.into()));
    let errors = manager.get_errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, ErrorCode::UsageMismatch);
}

// --- Scenario 6: self-reference. ---
#[test]
fn scenario_6_self_reference() {
    let manager = SchemaManager::new();
    let mut at = bare_attribute_type("1.1.0", "test6");
    at.superior_oid = Some("1.1.0".to_string());

    assert!(!manager.add(at.into()));
    let errors = manager.get_errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, ErrorCode::InheritanceCycle);
}

// --- Scenario 7: add an already-existing OID. ---
#[test]
fn scenario_7_add_already_existing() {
    let manager = SchemaManager::new();
    let mut at = AttributeType::new(CREATE_TIMESTAMP, "test");
    at.header.names = vec!["createTimestamp".to_string()];
    at.syntax_oid = Some(OCTET_STRING_SYNTAX.to_string());
    at.equality_oid = Some("2.5.13.2".to_string()); // different from the bootstrap entity

    assert!(!manager.add(at.into()));
    let errors = manager.get_errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, ErrorCode::AlreadyExists);

    let unchanged = manager.lookup_attribute_type(CREATE_TIMESTAMP).unwrap();
    assert_eq!(unchanged.equality_oid.as_deref(), Some(DISTINGUISHED_NAME_MATCH));
}

// --- Scenario 8: invalid matching-rule reference. ---
#[test]
fn scenario_8_invalid_matching_rule_reference() {
    let manager = SchemaManager::new();
    let mut at = bare_attribute_type("1.1.0", "test8");
    at.syntax_oid = Some(OCTET_STRING_SYNTAX.to_string());
    at.equality_oid = Some("0.0".to_string());

    assert!(!manager.add(at.into()));
    let errors = manager.get_errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, ErrorCode::UnknownMatchingRule);
}

// --- Delete refuses while referenced, then succeeds once the referrer is
// gone (spec §4.10 / §9 open question resolved in favor of StillReferenced). ---
#[test]
fn delete_refuses_while_referenced_then_succeeds() {
    let manager = SchemaManager::new();
    let mut base = bare_attribute_type("1.1.0", "base");
    base.syntax_oid = Some(OCTET_STRING_SYNTAX.to_string());
    base.equality_oid = Some(DISTINGUISHED_NAME_MATCH.to_string());
    assert!(manager.add(base.into()));

    let mut child = bare_attribute_type("1.1.1", "child");
    child.superior_oid = Some("1.1.0".to_string());
    assert!(manager.add(child.into()));

    assert!(!manager.delete("1.1.0"));
    assert!(manager.lookup_attribute_type("1.1.0").is_some());

    assert!(manager.delete("1.1.1"));
    assert!(manager.delete("1.1.0"));
}

// --- Object class superior/kind rules exercised through the manager. ---
#[test]
fn object_class_auxiliary_cannot_inherit_structural() {
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

    assert!(!manager.add(aux.into()));
    let errors = manager.get_errors();
    assert!(errors.iter().any(|v| v.code == ErrorCode::KindIncompatibility));
}

// --- Disable is refused while an enabled schema still depends on it. ---
#[test]
fn disable_refused_while_depended_on() {
    let manager = SchemaManager::new();
    let loader = InMemoryLoader::new().with_schema(
        "core",
        SchemaDescriptor {
            dependencies: vec!["system".to_string()],
            ..Default::default()
        },
    );
    assert!(manager.load_with_deps(&loader, "core"));
    manager.clear_errors();

    assert!(!manager.disable("system"));
    assert!(manager.schema("core").unwrap().enabled);
    assert!(manager
        .get_errors()
        .iter()
        .any(|v| v.code == ErrorCode::SchemaStillDepended));
}

// --- Loading a schema with a missing transitive dependency fails cleanly. ---
#[test]
fn load_with_deps_reports_missing_dependency() {
    let manager = SchemaManager::new();
    let loader = InMemoryLoader::new().with_schema(
        "core",
        SchemaDescriptor {
            dependencies: vec!["nonexistent".to_string()],
            ..Default::default()
        },
    );

    assert!(!manager.load_with_deps(&loader, "core"));
    let errors = manager.get_errors();
    assert!(errors.iter().any(|v| v.code == ErrorCode::SchemaDependencyMissing));
}
