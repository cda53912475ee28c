use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::entity::{normalize_name, EntityKind};
use crate::error::{ErrorCode, SchemaViolation};

/// Bi-directional mapping between OIDs, their case-insensitive aliases and
/// the kind of entity they denote (spec §4.1, component C1).
///
/// Names are normalized with [`normalize_name`] before being stored or
/// looked up. An OID may only ever be registered once; a name may only
/// point at one OID at a time.
#[derive(Debug, Clone, Default)]
pub struct OidRegistry {
    names_by_oid: BTreeMap<String, BTreeSet<String>>,
    kind_by_oid: BTreeMap<String, EntityKind>,
    oid_by_name: BTreeMap<String, String>,
}

impl OidRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_oid(&self, oid: &str) -> bool {
        self.kind_by_oid.contains_key(oid)
    }

    /// Resolve a case-insensitive name to its OID and kind.
    pub fn lookup_by_name(&self, name: &str) -> Option<(String, EntityKind)> {
        let key = normalize_name(name);
        let oid = self.oid_by_name.get(&key)?;
        let kind = *self.kind_by_oid.get(oid)?;
        Some((oid.clone(), kind))
    }

    pub fn kind_of(&self, oid: &str) -> Option<EntityKind> {
        self.kind_by_oid.get(oid).copied()
    }

    pub fn names_of(&self, oid: &str) -> Vec<String> {
        self.names_by_oid
            .get(oid)
            .map(|s| s.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Register an OID with its names under the given kind.
    ///
    /// Fails if the OID is already registered, or if any name already
    /// resolves to a *different* OID — names of the same OID re-registering
    /// (e.g. during a delete+re-add "modify") are harmless no-ops here; the
    /// caller is expected to `unregister` first in that case.
    pub fn register(
        &mut self,
        oid: &str,
        names: &[String],
        kind: EntityKind,
    ) -> Result<(), SchemaViolation> {
        if self.has_oid(oid) {
            return Err(
                SchemaViolation::new(ErrorCode::AlreadyExists, oid, kind)
                    .with_detail("OID already registered in OidRegistry"),
            );
        }

        for name in names {
            let key = normalize_name(name);
            if let Some(existing_oid) = self.oid_by_name.get(&key) {
                if existing_oid != oid {
                    return Err(SchemaViolation::new(ErrorCode::DuplicateName, oid, kind)
                        .with_reference(existing_oid.clone())
                        .with_detail(format!("name {:?} already in use", name)));
                }
            }
        }

        debug!(oid, ?kind, names = names.len(), "registering OID");

        self.kind_by_oid.insert(oid.to_string(), kind);
        let mut set = BTreeSet::new();
        for name in names {
            let key = normalize_name(name);
            self.oid_by_name.insert(key, oid.to_string());
            set.insert(name.clone());
        }
        self.names_by_oid.insert(oid.to_string(), set);
        Ok(())
    }

    /// Remove an OID and every name that points at it.
    pub fn unregister(&mut self, oid: &str) {
        debug!(oid, "unregistering OID");
        self.kind_by_oid.remove(oid);
        if let Some(names) = self.names_by_oid.remove(oid) {
            for name in names {
                let key = normalize_name(&name);
                if self.oid_by_name.get(&key).map(String::as_str) == Some(oid) {
                    self.oid_by_name.remove(&key);
                }
            }
        }
    }
}
