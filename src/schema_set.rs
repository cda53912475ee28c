use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::entity::EntityKind;
use crate::error::{ErrorCode, SchemaViolation};

/// A named grouping of schema entities with dependencies on other schemas
/// (spec §4.3, component C3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schema {
    pub name: String,
    pub enabled: bool,
    pub dependencies: Vec<String>,
    /// OIDs of every entity this schema owns, keyed by kind.
    pub members: BTreeMap<EntityKind, BTreeSet<String>>,
}

impl Schema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            dependencies: Vec::new(),
            members: BTreeMap::new(),
        }
    }

    pub fn with_dependencies(mut self, deps: Vec<String>) -> Self {
        self.dependencies = deps;
        self
    }

    pub fn add_member(&mut self, kind: EntityKind, oid: impl Into<String>) {
        self.members.entry(kind).or_default().insert(oid.into());
    }

    pub fn remove_member(&mut self, kind: EntityKind, oid: &str) {
        if let Some(set) = self.members.get_mut(&kind) {
            set.remove(oid);
        }
    }

    pub fn member_count(&self) -> usize {
        self.members.values().map(BTreeSet::len).sum()
    }
}

/// Topologically orders `roots` and their transitive dependencies using the
/// dependency lists recorded in `all`. Returns the load order (dependencies
/// first) or a [`SchemaViolation`] naming the first schema whose dependency
/// cannot be found.
pub fn load_order(
    roots: &[String],
    all: &BTreeMap<String, Schema>,
) -> Result<Vec<String>, SchemaViolation> {
    let mut order = Vec::new();
    let mut visited = BTreeSet::new();
    let mut visiting = BTreeSet::new();

    fn visit(
        name: &str,
        all: &BTreeMap<String, Schema>,
        visited: &mut BTreeSet<String>,
        visiting: &mut BTreeSet<String>,
        order: &mut Vec<String>,
    ) -> Result<(), SchemaViolation> {
        if visited.contains(name) {
            return Ok(());
        }
        if visiting.contains(name) {
            return Err(SchemaViolation::new(
                ErrorCode::SchemaDependencyMissing,
                name,
                EntityKind::AttributeType,
            )
            .with_detail("dependency cycle among schemas"));
        }
        let schema = all.get(name).ok_or_else(|| {
            SchemaViolation::new(
                ErrorCode::SchemaDependencyMissing,
                name,
                EntityKind::AttributeType,
            )
            .with_detail(format!("schema {:?} is not known to the loader", name))
        })?;

        visiting.insert(name.to_string());
        for dep in &schema.dependencies {
            visit(dep, all, visited, visiting, order)?;
        }
        visiting.remove(name);
        visited.insert(name.to_string());
        order.push(name.to_string());
        Ok(())
    }

    for root in roots {
        visit(root, all, &mut visited, &mut visiting, &mut order)?;
    }

    Ok(order)
}

/// Checks that disabling `name` would not strand an enabled schema that
/// depends on it. Returns the dependents if so, which the caller turns into
/// a `SchemaStillDepended` violation.
pub fn dependents_of(name: &str, all: &BTreeMap<String, Schema>) -> Vec<String> {
    all.values()
        .filter(|s| s.enabled && s.name != name && s.dependencies.iter().any(|d| d == name))
        .map(|s| s.name.clone())
        .collect()
}
