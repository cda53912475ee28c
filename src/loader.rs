/// Raw descriptor strings for one schema, as handed back by a
/// [`SchemaLoader`] (spec §4.4 / §6). Every field is a list of RFC 4512
/// descriptor strings; parsing them is the factory's job, not the
/// loader's.
#[derive(Debug, Clone, Default)]
pub struct SchemaDescriptor {
    pub dependencies: Vec<String>,
    pub attribute_types: Vec<String>,
    pub object_classes: Vec<String>,
    pub matching_rules: Vec<String>,
    pub matching_rule_uses: Vec<String>,
    pub syntaxes: Vec<String>,
    pub dit_content_rules: Vec<String>,
    pub dit_structure_rules: Vec<String>,
    pub name_forms: Vec<String>,
    pub normalizers: Vec<String>,
    pub comparators: Vec<String>,
    pub syntax_checkers: Vec<String>,
}

/// External boundary: a pluggable source of schema descriptors (spec §4.4,
/// component C4). Concrete loaders — an LDIF tree on disk, a jar-packaged
/// LDIF bundle, a live subschema subentry fetched over LDAP — live outside
/// this crate and are not specified here; this crate only consumes the
/// trait polymorphically.
///
/// Loaders never mutate registries directly, and any I/O they perform
/// happens outside the `SchemaManager`'s write lock (spec §5).
pub trait SchemaLoader: Send + Sync {
    /// Error type surfaced when a descriptor source cannot be reached.
    type Error: std::fmt::Display;

    fn list_schemas(&self) -> Result<Vec<String>, Self::Error>;

    fn load_schema(&self, name: &str) -> Result<SchemaDescriptor, Self::Error>;
}

/// A loader that serves schemas held entirely in memory. Useful for tests
/// and for embedding a fixed bootstrap schema without touching disk.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLoader {
    schemas: std::collections::BTreeMap<String, SchemaDescriptor>,
}

impl InMemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schema(mut self, name: impl Into<String>, descriptor: SchemaDescriptor) -> Self {
        self.schemas.insert(name.into(), descriptor);
        self
    }
}

impl SchemaLoader for InMemoryLoader {
    type Error = std::convert::Infallible;

    fn list_schemas(&self) -> Result<Vec<String>, Self::Error> {
        Ok(self.schemas.keys().cloned().collect())
    }

    fn load_schema(&self, name: &str) -> Result<SchemaDescriptor, Self::Error> {
        Ok(self.schemas.get(name).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_loader_round_trip() {
        let loader = InMemoryLoader::new().with_schema(
            "system",
            SchemaDescriptor {
                attribute_types: vec!["( 2.5.4.3 NAME 'cn' )".to_string()],
                ..Default::default()
            },
        );
        assert_eq!(loader.list_schemas().unwrap(), vec!["system".to_string()]);
        let descriptor = loader.load_schema("system").unwrap();
        assert_eq!(descriptor.attribute_types.len(), 1);
    }

    #[test]
    fn test_in_memory_loader_missing_schema_is_empty() {
        let loader = InMemoryLoader::new();
        let descriptor = loader.load_schema("nope").unwrap();
        assert!(descriptor.attribute_types.is_empty());
    }
}
