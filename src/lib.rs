//! An in-memory schema engine for an LDAP directory server.
//!
//! The engine owns the typed registries for every RFC 4512 schema entity
//! kind, enforces the structural and reference-integrity rules that keep
//! them internally consistent, and exposes a single [`manager::SchemaManager`]
//! as the boundary everything else talks to. Parsing schema descriptor
//! strings and fetching them from disk or a directory server are treated as
//! external concerns — see [`descriptor`] and [`loader`] respectively.

pub mod bootstrap;
pub mod descriptor;
pub mod entity;
pub mod error;
pub mod factory;
pub mod loader;
pub mod manager;
pub mod oid_registry;
pub mod registry;
pub mod resolver;
pub mod rules;
pub mod schema_set;

pub use entity::{
    AttributeType, AttributeUsage, Comparator, DitContentRule, DitStructureRule, EntityHeader,
    EntityKind, Implementation, LdapSyntax, MatchingRule, MatchingRuleUse, NameForm, Normalizer,
    ObjectClass, ObjectClassKind, SchemaEntity, SchemaObject, SyntaxChecker,
};
pub use error::{ErrorCode, SchemaError, SchemaResult, SchemaViolation};
pub use loader::{InMemoryLoader, SchemaDescriptor, SchemaLoader};
pub use manager::{Registries, SchemaEvent, SchemaManager, SchemaManagerConfig};
pub use schema_set::Schema;
