use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// The kind of schema entity an OID or name denotes.
///
/// Kept as a plain tag rather than encoded in the type system so the
/// resolver and the `OidRegistry` can dispatch over it exhaustively without
/// needing a type parameter everywhere (see DESIGN.md for the tradeoff).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display)]
pub enum EntityKind {
    AttributeType,
    ObjectClass,
    MatchingRule,
    MatchingRuleUse,
    LdapSyntax,
    DitContentRule,
    DitStructureRule,
    NameForm,
    Normalizer,
    Comparator,
    SyntaxChecker,
}

/// Usage of an attribute type, per RFC 4512 §4.1.2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "camelCase")]
pub enum AttributeUsage {
    UserApplications,
    DirectoryOperation,
    DistributedOperation,
    #[strum(serialize = "dSAOperation")]
    DsaOperation,
}

impl Default for AttributeUsage {
    fn default() -> Self {
        AttributeUsage::UserApplications
    }
}

impl AttributeUsage {
    /// Operational usages are the ones `noUserModification` is compatible with.
    pub fn is_operational(self) -> bool {
        !matches!(self, AttributeUsage::UserApplications)
    }
}

/// The structural role of an object class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
pub enum ObjectClassKind {
    Abstract,
    Structural,
    Auxiliary,
}

/// Fields common to every schema entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityHeader {
    pub oid: String,
    pub names: Vec<String>,
    pub description: Option<String>,
    pub obsolete: bool,
    pub schema_name: String,
}

impl EntityHeader {
    pub fn new(oid: impl Into<String>, schema_name: impl Into<String>) -> Self {
        Self {
            oid: oid.into(),
            names: Vec::new(),
            description: None,
            obsolete: false,
            schema_name: schema_name.into(),
        }
    }

    pub fn with_names(mut self, names: Vec<String>) -> Self {
        self.names = names;
        self
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }
}

/// Shared accessors over every entity kind. Implemented by each typed
/// struct below and by the [`SchemaEntity`] dispatch enum.
pub trait SchemaObject {
    fn header(&self) -> &EntityHeader;
    fn kind(&self) -> EntityKind;

    fn oid(&self) -> &str {
        &self.header().oid
    }

    fn names(&self) -> &[String] {
        &self.header().names
    }

    fn schema_name(&self) -> &str {
        &self.header().schema_name
    }
}

/// An implementation reference for a [`Normalizer`], [`Comparator`] or
/// [`SyntaxChecker`]. The core's contract is presence and identity, not
/// invocation — materializing `fqcn` into a callable is the host's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Implementation {
    pub fqcn: String,
    pub bytecode: Option<Vec<u8>>,
}

macro_rules! schema_object_impl {
    ($ty:ty, $kind:expr) => {
        impl SchemaObject for $ty {
            fn header(&self) -> &EntityHeader {
                &self.header
            }
            fn kind(&self) -> EntityKind {
                $kind
            }
        }
    };
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LdapSyntax {
    pub header: EntityHeader,
    pub syntax_checker_oid: Option<String>,
    pub human_readable: bool,
}
schema_object_impl!(LdapSyntax, EntityKind::LdapSyntax);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchingRule {
    pub header: EntityHeader,
    pub syntax_oid: String,
    pub normalizer_oid: Option<String>,
    pub comparator_oid: Option<String>,
}
schema_object_impl!(MatchingRule, EntityKind::MatchingRule);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeType {
    pub header: EntityHeader,
    pub superior_oid: Option<String>,
    pub equality_oid: Option<String>,
    pub ordering_oid: Option<String>,
    pub substring_oid: Option<String>,
    pub syntax_oid: Option<String>,
    pub single_valued: bool,
    pub collective: bool,
    pub no_user_modification: bool,
    pub usage: AttributeUsage,
}
schema_object_impl!(AttributeType, EntityKind::AttributeType);

impl AttributeType {
    pub fn new(oid: impl Into<String>, schema_name: impl Into<String>) -> Self {
        Self {
            header: EntityHeader::new(oid, schema_name),
            superior_oid: None,
            equality_oid: None,
            ordering_oid: None,
            substring_oid: None,
            syntax_oid: None,
            single_valued: false,
            collective: false,
            no_user_modification: false,
            usage: AttributeUsage::UserApplications,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectClass {
    pub header: EntityHeader,
    pub superior_oids: Vec<String>,
    pub kind: ObjectClassKind,
    pub must_oids: Vec<String>,
    pub may_oids: Vec<String>,
}
schema_object_impl!(ObjectClass, EntityKind::ObjectClass);

impl ObjectClass {
    pub fn new(oid: impl Into<String>, schema_name: impl Into<String>) -> Self {
        Self {
            header: EntityHeader::new(oid, schema_name),
            superior_oids: Vec::new(),
            kind: ObjectClassKind::Structural,
            must_oids: Vec::new(),
            may_oids: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchingRuleUse {
    pub header: EntityHeader,
    pub applies_oids: Vec<String>,
}
schema_object_impl!(MatchingRuleUse, EntityKind::MatchingRuleUse);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DitContentRule {
    pub header: EntityHeader,
    pub structural_oid: String,
    pub aux_oids: Vec<String>,
    pub must_oids: Vec<String>,
    pub may_oids: Vec<String>,
    pub not_oids: Vec<String>,
}
schema_object_impl!(DitContentRule, EntityKind::DitContentRule);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DitStructureRule {
    pub header: EntityHeader,
    pub rule_id: u32,
    pub name_form_oid: String,
    pub superior_rule_ids: Vec<u32>,
}
schema_object_impl!(DitStructureRule, EntityKind::DitStructureRule);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameForm {
    pub header: EntityHeader,
    pub object_class_oid: String,
    pub must_oids: Vec<String>,
    pub may_oids: Vec<String>,
}
schema_object_impl!(NameForm, EntityKind::NameForm);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Normalizer {
    pub header: EntityHeader,
    pub implementation: Implementation,
}
schema_object_impl!(Normalizer, EntityKind::Normalizer);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comparator {
    pub header: EntityHeader,
    pub implementation: Implementation,
}
schema_object_impl!(Comparator, EntityKind::Comparator);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntaxChecker {
    pub header: EntityHeader,
    pub implementation: Implementation,
}
schema_object_impl!(SyntaxChecker, EntityKind::SyntaxChecker);

/// A tagged union over every entity kind, used at the [`crate::manager::SchemaManager`]
/// boundary where callers add one entity at a time without knowing its
/// concrete type. Chosen over a trait-object boundary (`Box<dyn SchemaObject>`)
/// because the manager needs to pattern-match on kind to route a value into
/// the right `TypedRegistry` field, not just read its header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchemaEntity {
    AttributeType(AttributeType),
    ObjectClass(ObjectClass),
    MatchingRule(MatchingRule),
    MatchingRuleUse(MatchingRuleUse),
    LdapSyntax(LdapSyntax),
    DitContentRule(DitContentRule),
    DitStructureRule(DitStructureRule),
    NameForm(NameForm),
    Normalizer(Normalizer),
    Comparator(Comparator),
    SyntaxChecker(SyntaxChecker),
}

impl SchemaEntity {
    pub fn header(&self) -> &EntityHeader {
        match self {
            SchemaEntity::AttributeType(e) => e.header(),
            SchemaEntity::ObjectClass(e) => e.header(),
            SchemaEntity::MatchingRule(e) => e.header(),
            SchemaEntity::MatchingRuleUse(e) => e.header(),
            SchemaEntity::LdapSyntax(e) => e.header(),
            SchemaEntity::DitContentRule(e) => e.header(),
            SchemaEntity::DitStructureRule(e) => e.header(),
            SchemaEntity::NameForm(e) => e.header(),
            SchemaEntity::Normalizer(e) => e.header(),
            SchemaEntity::Comparator(e) => e.header(),
            SchemaEntity::SyntaxChecker(e) => e.header(),
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            SchemaEntity::AttributeType(_) => EntityKind::AttributeType,
            SchemaEntity::ObjectClass(_) => EntityKind::ObjectClass,
            SchemaEntity::MatchingRule(_) => EntityKind::MatchingRule,
            SchemaEntity::MatchingRuleUse(_) => EntityKind::MatchingRuleUse,
            SchemaEntity::LdapSyntax(_) => EntityKind::LdapSyntax,
            SchemaEntity::DitContentRule(_) => EntityKind::DitContentRule,
            SchemaEntity::DitStructureRule(_) => EntityKind::DitStructureRule,
            SchemaEntity::NameForm(_) => EntityKind::NameForm,
            SchemaEntity::Normalizer(_) => EntityKind::Normalizer,
            SchemaEntity::Comparator(_) => EntityKind::Comparator,
            SchemaEntity::SyntaxChecker(_) => EntityKind::SyntaxChecker,
        }
    }

    pub fn oid(&self) -> &str {
        &self.header().oid
    }
}

macro_rules! schema_entity_from {
    ($ty:ty, $variant:ident) => {
        impl From<$ty> for SchemaEntity {
            fn from(e: $ty) -> Self {
                SchemaEntity::$variant(e)
            }
        }
    };
}

schema_entity_from!(AttributeType, AttributeType);
schema_entity_from!(ObjectClass, ObjectClass);
schema_entity_from!(MatchingRule, MatchingRule);
schema_entity_from!(MatchingRuleUse, MatchingRuleUse);
schema_entity_from!(LdapSyntax, LdapSyntax);
schema_entity_from!(DitContentRule, DitContentRule);
schema_entity_from!(DitStructureRule, DitStructureRule);
schema_entity_from!(NameForm, NameForm);
schema_entity_from!(Normalizer, Normalizer);
schema_entity_from!(Comparator, Comparator);
schema_entity_from!(SyntaxChecker, SyntaxChecker);

/// Normalizes a name the way [`crate::oid_registry::OidRegistry`] does:
/// lowercased, with runs of internal whitespace collapsed to one space.
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
