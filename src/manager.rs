//! The schema engine's composition root (spec §5, component "SchemaManager").
//!
//! `SchemasManager` owns one [`Registries`] snapshot behind a single
//! `RwLock`: readers (`lookup_*`, `snapshot`) take a shared lock and never
//! block each other; writers (`add`, `delete`, `enable`, `disable`,
//! `load_with_deps`) take the exclusive lock only for as long as it takes to
//! validate and commit, never while parsing descriptors or doing I/O (that
//! happens before the lock is acquired, in the factory/loader layer).

use std::collections::BTreeMap;
use std::sync::{Mutex, RwLock};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::entity::{
    AttributeType, Comparator, DitContentRule, DitStructureRule, EntityKind, LdapSyntax,
    MatchingRule, MatchingRuleUse, NameForm, Normalizer, ObjectClass, SchemaEntity, SchemaObject,
    SyntaxChecker,
};
use crate::error::{ErrorCode, SchemaError, SchemaResult, SchemaViolation};
use crate::loader::SchemaLoader;
use crate::oid_registry::OidRegistry;
use crate::registry::TypedRegistry;
use crate::resolver;
use crate::rules;
use crate::schema_set::{self, Schema};
use crate::{bootstrap, factory};

/// Every typed registry plus the shared OID index and the schema grouping,
/// as a single value a caller can snapshot (clone) and inspect without
/// holding any lock (spec §4.2, §4.3, component C2/C3).
#[derive(Debug, Clone, Default)]
pub struct Registries {
    pub oids: OidRegistry,
    pub attribute_types: TypedRegistry<AttributeType>,
    pub object_classes: TypedRegistry<ObjectClass>,
    pub matching_rules: TypedRegistry<MatchingRule>,
    pub matching_rule_uses: TypedRegistry<MatchingRuleUse>,
    pub syntaxes: TypedRegistry<LdapSyntax>,
    pub dit_content_rules: TypedRegistry<DitContentRule>,
    pub dit_structure_rules: TypedRegistry<DitStructureRule>,
    pub name_forms: TypedRegistry<NameForm>,
    pub normalizers: TypedRegistry<Normalizer>,
    pub comparators: TypedRegistry<Comparator>,
    pub syntax_checkers: TypedRegistry<SyntaxChecker>,
    pub schemas: BTreeMap<String, Schema>,
}

/// Tunables for a [`SchemaManager`] (spec §4.13).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaManagerConfig {
    /// Reject a descriptor the field-at-a-time parser can't fully make
    /// sense of instead of silently dropping the offending entity.
    pub strict_parsing: bool,
    /// Schemas to enable automatically once loaded, beyond whatever the
    /// loader itself already marks enabled.
    pub auto_enable: Vec<String>,
}

impl Default for SchemaManagerConfig {
    fn default() -> Self {
        Self {
            strict_parsing: false,
            auto_enable: Vec::new(),
        }
    }
}

/// An observable change to the schema state, delivered to listeners
/// registered with [`SchemaManager::on_event`].
#[derive(Debug, Clone)]
pub enum SchemaEvent {
    Added(EntityKind, String),
    Removed(EntityKind, String),
    SchemaEnabled(String),
    SchemaDisabled(String),
}

type Listener = Box<dyn Fn(&SchemaEvent) + Send + Sync>;

/// Validate `entity` against the registries as they stand *before* it is
/// inserted, then commit it if (and only if) validation found nothing.
/// Shared by [`SchemaManager::try_add`] and [`crate::factory::load_descriptor_into`],
/// which both already hold the write lock when they call this.
pub(crate) fn validate_and_insert(
    registries: &mut Registries,
    entity: SchemaEntity,
) -> Vec<SchemaViolation> {
    let violations = match &entity {
        SchemaEntity::AttributeType(e) => rules::attribute_type::validate(e, registries),
        SchemaEntity::ObjectClass(e) => rules::object_class::validate(e, registries),
        SchemaEntity::MatchingRule(e) => rules::matching_rule::validate(e, registries),
        SchemaEntity::LdapSyntax(e) => rules::syntax::validate(e, registries),
        SchemaEntity::MatchingRuleUse(e) => rules::misc::validate_matching_rule_use(e, registries),
        SchemaEntity::DitContentRule(e) => rules::misc::validate_dit_content_rule(e, registries),
        SchemaEntity::DitStructureRule(e) => rules::misc::validate_dit_structure_rule(e, registries),
        SchemaEntity::NameForm(e) => rules::misc::validate_name_form(e, registries),
        // Normalizer/Comparator/SyntaxChecker carry no references of their
        // own to validate — their completeness is checked from the
        // MatchingRule/LdapSyntax side that points at them.
        SchemaEntity::Normalizer(_) | SchemaEntity::Comparator(_) | SchemaEntity::SyntaxChecker(_) => {
            Vec::new()
        }
    };
    if !violations.is_empty() {
        return violations;
    }

    let kind = entity.kind();
    let oid = entity.oid().to_string();
    let schema_name = entity.header().schema_name.clone();

    let result = match entity {
        SchemaEntity::AttributeType(e) => registries.attribute_types.register(e, &mut registries.oids),
        SchemaEntity::ObjectClass(e) => registries.object_classes.register(e, &mut registries.oids),
        SchemaEntity::MatchingRule(e) => registries.matching_rules.register(e, &mut registries.oids),
        SchemaEntity::MatchingRuleUse(e) => {
            registries.matching_rule_uses.register(e, &mut registries.oids)
        }
        SchemaEntity::LdapSyntax(e) => registries.syntaxes.register(e, &mut registries.oids),
        SchemaEntity::DitContentRule(e) => {
            registries.dit_content_rules.register(e, &mut registries.oids)
        }
        SchemaEntity::DitStructureRule(e) => {
            registries.dit_structure_rules.register(e, &mut registries.oids)
        }
        SchemaEntity::NameForm(e) => registries.name_forms.register(e, &mut registries.oids),
        SchemaEntity::Normalizer(e) => registries.normalizers.register(e, &mut registries.oids),
        SchemaEntity::Comparator(e) => registries.comparators.register(e, &mut registries.oids),
        SchemaEntity::SyntaxChecker(e) => registries.syntax_checkers.register(e, &mut registries.oids),
    };

    match result {
        Ok(()) => {
            registries
                .schemas
                .entry(schema_name.clone())
                .or_insert_with(|| Schema::new(schema_name))
                .add_member(kind, oid);
            Vec::new()
        }
        Err(violation) => vec![violation],
    }
}

/// The schema engine (spec §5). One instance per running directory server;
/// cheap to share behind an `Arc` since every mutating call already
/// serializes on the internal lock.
pub struct SchemaManager {
    registries: RwLock<Registries>,
    config: SchemaManagerConfig,
    errors: Mutex<Vec<SchemaViolation>>,
    listeners: Mutex<Vec<Listener>>,
}

impl SchemaManager {
    pub fn new() -> Self {
        Self::with_config(SchemaManagerConfig::default())
    }

    pub fn with_config(config: SchemaManagerConfig) -> Self {
        let mut registries = Registries::default();
        bootstrap::seed_system_schema(&mut registries);
        Self {
            registries: RwLock::new(registries),
            config,
            errors: Mutex::new(Vec::new()),
            listeners: Mutex::new(Vec::new()),
        }
    }

    pub fn config(&self) -> &SchemaManagerConfig {
        &self.config
    }

    /// A consistent, lock-free-to-read copy of every registry. Cloning is
    /// cheap relative to the validation work callers do with the result —
    /// see DESIGN.md for the copy-on-read tradeoff.
    pub fn snapshot(&self) -> Registries {
        self.registries.read().expect("registries lock poisoned").clone()
    }

    pub fn get_errors(&self) -> Vec<SchemaViolation> {
        self.errors.lock().expect("errors lock poisoned").clone()
    }

    pub fn clear_errors(&self) {
        self.errors.lock().expect("errors lock poisoned").clear();
    }

    pub fn on_event<F>(&self, listener: F)
    where
        F: Fn(&SchemaEvent) + Send + Sync + 'static,
    {
        self.listeners
            .lock()
            .expect("listeners lock poisoned")
            .push(Box::new(listener));
    }

    fn fire(&self, event: SchemaEvent) {
        for listener in self.listeners.lock().expect("listeners lock poisoned").iter() {
            listener(&event);
        }
    }

    fn record_errors(&self, violations: Vec<SchemaViolation>) {
        if !violations.is_empty() {
            self.errors
                .lock()
                .expect("errors lock poisoned")
                .extend(violations);
        }
    }

    /// Add one entity. Returns `false` (without panicking) on any
    /// validation failure; use [`Self::try_add`] to see what failed.
    pub fn add(&self, entity: SchemaEntity) -> bool {
        self.try_add(entity).is_ok()
    }

    pub fn try_add(&self, entity: SchemaEntity) -> SchemaResult<()> {
        let mut registries = self
            .registries
            .write()
            .map_err(|_| SchemaError::LockPoisoned)?;

        let kind = entity.kind();
        let oid = entity.oid().to_string();
        let violations = validate_and_insert(&mut registries, entity);
        if !violations.is_empty() {
            self.record_errors(violations.clone());
            return Err(SchemaError::Validation(violations));
        }

        info!(oid, ?kind, "schema entity added");
        drop(registries);
        self.fire(SchemaEvent::Added(kind, oid));
        Ok(())
    }

    /// Remove an entity by OID. Fails with `StillReferenced` if another
    /// entity still points at it (spec §4.10).
    pub fn delete(&self, oid: &str) -> bool {
        self.try_delete(oid).is_ok()
    }

    pub fn try_delete(&self, oid: &str) -> SchemaResult<()> {
        let mut registries = self
            .registries
            .write()
            .map_err(|_| SchemaError::LockPoisoned)?;

        let kind = registries
            .oids
            .kind_of(oid)
            .ok_or_else(|| SchemaError::SchemaNotFound(oid.to_string()))?;

        let referrers = resolver::referrers_of(oid, &registries);
        if !referrers.is_empty() {
            let violation = SchemaViolation::new(ErrorCode::StillReferenced, oid, kind)
                .with_detail(format!("still referenced by {}", referrers.join(", ")));
            self.record_errors(vec![violation.clone()]);
            return Err(SchemaError::Validation(vec![violation]));
        }

        let schema_name = Self::schema_name_of(&registries, kind, oid);
        Self::remove_from_registries(&mut registries, kind, oid);
        if let Some(name) = schema_name {
            if let Some(schema) = registries.schemas.get_mut(&name) {
                schema.remove_member(kind, oid);
            }
        }

        info!(oid, ?kind, "schema entity removed");
        drop(registries);
        self.fire(SchemaEvent::Removed(kind, oid.to_string()));
        Ok(())
    }

    fn schema_name_of(registries: &Registries, kind: EntityKind, oid: &str) -> Option<String> {
        match kind {
            EntityKind::AttributeType => registries.attribute_types.get_schema_name(oid),
            EntityKind::ObjectClass => registries.object_classes.get_schema_name(oid),
            EntityKind::MatchingRule => registries.matching_rules.get_schema_name(oid),
            EntityKind::MatchingRuleUse => registries.matching_rule_uses.get_schema_name(oid),
            EntityKind::LdapSyntax => registries.syntaxes.get_schema_name(oid),
            EntityKind::DitContentRule => registries.dit_content_rules.get_schema_name(oid),
            EntityKind::DitStructureRule => registries.dit_structure_rules.get_schema_name(oid),
            EntityKind::NameForm => registries.name_forms.get_schema_name(oid),
            EntityKind::Normalizer => registries.normalizers.get_schema_name(oid),
            EntityKind::Comparator => registries.comparators.get_schema_name(oid),
            EntityKind::SyntaxChecker => registries.syntax_checkers.get_schema_name(oid),
        }
        .map(str::to_string)
    }

    fn remove_from_registries(registries: &mut Registries, kind: EntityKind, oid: &str) {
        match kind {
            EntityKind::AttributeType => {
                registries.attribute_types.unregister(oid, &mut registries.oids);
            }
            EntityKind::ObjectClass => {
                registries.object_classes.unregister(oid, &mut registries.oids);
            }
            EntityKind::MatchingRule => {
                registries.matching_rules.unregister(oid, &mut registries.oids);
            }
            EntityKind::MatchingRuleUse => {
                registries.matching_rule_uses.unregister(oid, &mut registries.oids);
            }
            EntityKind::LdapSyntax => {
                registries.syntaxes.unregister(oid, &mut registries.oids);
            }
            EntityKind::DitContentRule => {
                registries.dit_content_rules.unregister(oid, &mut registries.oids);
            }
            EntityKind::DitStructureRule => {
                registries.dit_structure_rules.unregister(oid, &mut registries.oids);
            }
            EntityKind::NameForm => {
                registries.name_forms.unregister(oid, &mut registries.oids);
            }
            EntityKind::Normalizer => {
                registries.normalizers.unregister(oid, &mut registries.oids);
            }
            EntityKind::Comparator => {
                registries.comparators.unregister(oid, &mut registries.oids);
            }
            EntityKind::SyntaxChecker => {
                registries.syntax_checkers.unregister(oid, &mut registries.oids);
            }
        }
    }

    /// Enable a schema (spec §4.3). A no-op success if it is already
    /// enabled; fails if the schema is unknown.
    pub fn enable(&self, schema_name: &str) -> bool {
        let mut registries = self.registries.write().expect("registries lock poisoned");
        match registries.schemas.get_mut(schema_name) {
            Some(schema) => {
                schema.enabled = true;
                drop(registries);
                self.fire(SchemaEvent::SchemaEnabled(schema_name.to_string()));
                true
            }
            None => false,
        }
    }

    /// Disable a schema, refusing if an enabled schema still depends on it
    /// (spec §4.3).
    pub fn disable(&self, schema_name: &str) -> bool {
        let mut registries = self.registries.write().expect("registries lock poisoned");
        let dependents = schema_set::dependents_of(schema_name, &registries.schemas);
        if !dependents.is_empty() {
            warn!(schema_name, ?dependents, "refusing to disable: still depended on");
            drop(registries);
            self.record_errors(vec![SchemaViolation::new(
                ErrorCode::SchemaStillDepended,
                schema_name,
                EntityKind::AttributeType,
            )
            .with_detail(format!("still depended on by: {}", dependents.join(", ")))]);
            return false;
        }
        match registries.schemas.get_mut(schema_name) {
            Some(schema) => {
                schema.enabled = false;
                drop(registries);
                self.fire(SchemaEvent::SchemaDisabled(schema_name.to_string()));
                true
            }
            None => false,
        }
    }

    /// Load `schema_name` and every schema it transitively depends on, in
    /// dependency order, from `loader` (spec §4.4, §4.14). Returns `true`
    /// only if every schema in the chain loaded without a validation
    /// failure; partial progress on failure is not rolled back; inspect
    /// [`Self::get_errors`] for what went wrong.
    pub fn load_with_deps<L: SchemaLoader>(&self, loader: &L, schema_name: &str) -> bool {
        let all_names = match loader.list_schemas() {
            Ok(names) => names,
            Err(e) => {
                warn!(error = %e, "schema loader failed to list schemas");
                return false;
            }
        };

        let mut known = BTreeMap::new();
        for name in &all_names {
            let descriptor = match loader.load_schema(name) {
                Ok(d) => d,
                Err(e) => {
                    warn!(schema = name, error = %e, "schema loader failed to load descriptor");
                    return false;
                }
            };
            known.insert(name.clone(), descriptor);
        }

        let mut registries = self.registries.write().expect("registries lock poisoned");
        for name in &all_names {
            registries
                .schemas
                .entry(name.clone())
                .or_insert_with(|| Schema::new(name.clone()));
        }
        if let Some(descriptor) = known.get(schema_name) {
            registries
                .schemas
                .entry(schema_name.to_string())
                .or_insert_with(|| Schema::new(schema_name.to_string()))
                .dependencies = descriptor.dependencies.clone();
        }
        for (name, descriptor) in &known {
            if let Some(schema) = registries.schemas.get_mut(name) {
                schema.dependencies = descriptor.dependencies.clone();
            }
        }

        let order = match schema_set::load_order(&[schema_name.to_string()], &registries.schemas) {
            Ok(order) => order,
            Err(violation) => {
                self.record_errors(vec![violation]);
                return false;
            }
        };

        let mut ok = true;
        for name in order {
            let Some(descriptor) = known.get(&name) else {
                continue;
            };
            let violations = factory::load_descriptor_into(
                &mut registries,
                &name,
                descriptor,
                self.config.strict_parsing,
            );
            if !violations.is_empty() {
                ok = false;
                self.record_errors(violations);
            }
            if self.config.auto_enable.iter().any(|n| n == &name) {
                if let Some(schema) = registries.schemas.get_mut(&name) {
                    schema.enabled = true;
                }
            }
        }

        ok
    }

    /// `true` unless `entity` belongs to a schema that has been disabled
    /// (spec §3 invariant 8, §8 property 7: disabling a schema hides its
    /// entities from lookup without removing them).
    fn is_visible<T: SchemaObject>(registries: &Registries, entity: &T) -> bool {
        registries
            .schemas
            .get(entity.schema_name())
            .map(|s| s.enabled)
            .unwrap_or(true)
    }

    pub fn lookup_attribute_type(&self, oid_or_name: &str) -> Option<AttributeType> {
        let registries = self.registries.read().ok()?;
        let e = registries.attribute_types.lookup(oid_or_name, &registries.oids)?;
        Self::is_visible(&registries, e).then(|| e.clone())
    }

    pub fn lookup_object_class(&self, oid_or_name: &str) -> Option<ObjectClass> {
        let registries = self.registries.read().ok()?;
        let e = registries.object_classes.lookup(oid_or_name, &registries.oids)?;
        Self::is_visible(&registries, e).then(|| e.clone())
    }

    pub fn lookup_matching_rule(&self, oid_or_name: &str) -> Option<MatchingRule> {
        let registries = self.registries.read().ok()?;
        let e = registries.matching_rules.lookup(oid_or_name, &registries.oids)?;
        Self::is_visible(&registries, e).then(|| e.clone())
    }

    pub fn lookup_syntax(&self, oid_or_name: &str) -> Option<LdapSyntax> {
        let registries = self.registries.read().ok()?;
        let e = registries.syntaxes.lookup(oid_or_name, &registries.oids)?;
        Self::is_visible(&registries, e).then(|| e.clone())
    }

    /// The effective (own-or-inherited) syntax/matching-rule OIDs for an
    /// attribute type (spec §4.8 rule 9, §8 scenario 4). The committed
    /// entity itself only ever stores what was directly declared; this
    /// walks its superior chain on every call rather than caching resolved
    /// values on the entity, so a superior's fields can never go stale on
    /// its descendants.
    pub fn effective_attribute_fields(
        &self,
        oid_or_name: &str,
    ) -> Option<resolver::EffectiveAttributeFields> {
        let registries = self.registries.read().ok()?;
        let at = registries.attribute_types.lookup(oid_or_name, &registries.oids)?;
        if !Self::is_visible(&registries, at) {
            return None;
        }
        let chain = resolver::resolve_superior_chain(
            at.oid(),
            at.superior_oid.as_deref(),
            &registries.attribute_types,
            &registries.oids,
        )
        .ok()?;
        Some(resolver::effective_fields(at, &chain))
    }

    pub fn schema(&self, name: &str) -> Option<Schema> {
        let registries = self.registries.read().ok()?;
        registries.schemas.get(name).cloned()
    }
}

impl Default for SchemaManager {
    fn default() -> Self {
        Self::new()
    }
}
