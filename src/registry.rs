use std::collections::BTreeMap;

use tracing::debug;

use crate::entity::SchemaObject;
use crate::error::{ErrorCode, SchemaViolation};
use crate::oid_registry::OidRegistry;

/// A per-kind store of schema entities (spec §4.2, component C2).
///
/// Registries are deliberately passive: they enforce OID/name uniqueness
/// (via the shared [`OidRegistry`]) but know nothing about cross-kind rules
/// — that is [`crate::resolver`]'s and [`crate::rules`]'s job.
#[derive(Debug, Clone)]
pub struct TypedRegistry<T> {
    entities: BTreeMap<String, T>,
}

// Implemented by hand rather than derived: `#[derive(Default)]` would add a
// `T: Default` bound to the impl even though an empty `BTreeMap` never
// needs one, which would wrongly stop this from being usable with entity
// types that don't (and shouldn't) implement `Default`.
impl<T> Default for TypedRegistry<T> {
    fn default() -> Self {
        Self {
            entities: BTreeMap::new(),
        }
    }
}

impl<T: SchemaObject + Clone> TypedRegistry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `entity`, recording its OID/names in `oid_registry`.
    ///
    /// Fails on a duplicate OID within this registry or a name collision
    /// the `OidRegistry` rejects; in either case neither registry is
    /// mutated.
    pub fn register(
        &mut self,
        entity: T,
        oid_registry: &mut OidRegistry,
    ) -> Result<(), SchemaViolation> {
        let oid = entity.oid().to_string();
        let kind = entity.kind();

        if self.entities.contains_key(&oid) {
            return Err(SchemaViolation::new(ErrorCode::AlreadyExists, oid, kind)
                .with_detail("OID already present in this typed registry"));
        }

        oid_registry.register(&oid, entity.names(), kind)?;
        debug!(oid, ?kind, "registered entity");
        self.entities.insert(oid, entity);
        Ok(())
    }

    /// Remove an entity by OID. The caller (`SchemaManager`/resolver) is
    /// responsible for the `StillReferenced` reference-count check before
    /// calling this — this method unconditionally removes.
    pub fn unregister(&mut self, oid: &str, oid_registry: &mut OidRegistry) -> Option<T> {
        let removed = self.entities.remove(oid);
        if removed.is_some() {
            oid_registry.unregister(oid);
            debug!(oid, "unregistered entity");
        }
        removed
    }

    /// Look up by OID directly (bypassing name resolution).
    pub fn get(&self, oid: &str) -> Option<&T> {
        self.entities.get(oid)
    }

    pub fn contains(&self, oid: &str) -> bool {
        self.entities.contains_key(oid)
    }

    /// Look up by either OID or a registered name.
    pub fn lookup(&self, oid_or_name: &str, oid_registry: &OidRegistry) -> Option<&T> {
        if let Some(e) = self.entities.get(oid_or_name) {
            return Some(e);
        }
        let (oid, _) = oid_registry.lookup_by_name(oid_or_name)?;
        self.entities.get(&oid)
    }

    pub fn iterate(&self) -> impl Iterator<Item = &T> {
        self.entities.values()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// The schema an entity belongs to, if registered.
    pub fn get_schema_name(&self, oid: &str) -> Option<&str> {
        self.entities.get(oid).map(|e| e.schema_name())
    }
}
