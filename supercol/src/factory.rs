use crate::client::{ColumnStoreClient, ConsistencyLevel, Endpoint};
use crate::converter::{SerializeUnknown, TypeConverter};
use crate::dao::Dao;
use crate::error::AppError;
use crate::registry::CodecRegistry;
use crate::schema::{BeanSchema, Entity};
use crate::settings::StoreSettings;
use once_cell::sync::OnceCell;
use std::sync::Arc;

/// Builds DAOs that share one connection configuration and one type converter.
///
/// ```no_run
/// use std::sync::Arc;
/// use supercol::{DaoFactory, MemoryStore, SerializeUnknown};
///
/// let factory = DaoFactory::with_config("localhost", 9160).keyspace("Keyspace1").serialize_unknown(SerializeUnknown::No);
/// let store = Arc::new(MemoryStore::new());
/// # let _ = (factory, store);
/// ```
pub struct DaoFactory {
    endpoint: Option<Endpoint>,
    keyspace: Option<String>,
    consistency: ConsistencyLevel,
    policy: SerializeUnknown,
    registry: Option<Arc<CodecRegistry>>,
    converter: OnceCell<Arc<TypeConverter>>,
}

impl Default for DaoFactory {
    fn default() -> Self {
        DaoFactory {
            endpoint: None,
            keyspace: None,
            consistency: ConsistencyLevel::default(),
            policy: SerializeUnknown::default(),
            registry: None,
            converter: OnceCell::new(),
        }
    }
}

impl DaoFactory {
    /// Factory without any endpoint; DAOs it builds fail on their first call.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(host: impl Into<String>, port: u16) -> Self {
        DaoFactory { endpoint: Some(Endpoint::Single { host: host.into(), port }), ..Self::default() }
    }

    pub fn with_nodes<S: Into<String>>(nodes: impl IntoIterator<Item = S>) -> Self {
        DaoFactory { endpoint: Some(Endpoint::Nodes(nodes.into_iter().map(Into::into).collect())), ..Self::default() }
    }

    pub fn from_settings(settings: &StoreSettings) -> Result<Self, AppError> {
        let factory = DaoFactory {
            endpoint: settings.endpoint()?,
            keyspace: settings.keyspace.clone().filter(|ks| !ks.is_empty()),
            consistency: settings.consistency,
            policy: settings.serialize_unknown,
            ..Self::default()
        };
        Ok(factory)
    }

    pub fn serialize_unknown(mut self, policy: SerializeUnknown) -> Self {
        self.policy = policy;
        self.converter = OnceCell::new();
        self
    }

    /// Replaces the default registry, e.g. one built with type mapping overrides.
    pub fn registry(mut self, registry: CodecRegistry) -> Self {
        self.registry = Some(Arc::new(registry));
        self.converter = OnceCell::new();
        self
    }

    pub fn keyspace(mut self, keyspace: impl Into<String>) -> Self {
        self.keyspace = Some(keyspace.into());
        self
    }

    pub fn consistency(mut self, consistency: ConsistencyLevel) -> Self {
        self.consistency = consistency;
        self
    }

    pub fn endpoint(&self) -> Option<&Endpoint> {
        self.endpoint.as_ref()
    }

    /// The converter handed to every DAO, built on first use.
    fn converter(&self) -> Arc<TypeConverter> {
        let converter = self.converter.get_or_init(|| {
            let registry = self.registry.clone().unwrap_or_else(|| Arc::new(CodecRegistry::with_defaults()));
            Arc::new(TypeConverter::new(registry, self.policy))
        });
        Arc::clone(converter)
    }

    pub fn make_dao<T: Entity>(&self, client: Arc<dyn ColumnStoreClient>) -> Result<Dao<T>, AppError> {
        let schema = T::schema()?;
        self.build(schema, client)
    }

    pub fn make_dao_for_column_family<T: Entity>(&self, client: Arc<dyn ColumnStoreClient>, column_family: &str) -> Result<Dao<T>, AppError> {
        if column_family.trim().is_empty() {
            return Err(AppError::configuration(format!("empty column family for {}", std::any::type_name::<T>())));
        }
        let schema = T::schema()?.with_column_family(column_family);
        self.build(schema, client)
    }

    fn build<T: Entity>(&self, schema: BeanSchema<T>, client: Arc<dyn ColumnStoreClient>) -> Result<Dao<T>, AppError> {
        let keyspace = schema
            .meta()
            .keyspace
            .clone()
            .filter(|ks| !ks.is_empty())
            .or_else(|| self.keyspace.clone())
            .ok_or_else(|| AppError::configuration(format!("{} declares no keyspace and the factory has none", schema.type_name())))?;
        let consistency = schema.meta().consistency.unwrap_or(self.consistency);
        crate::info!(
            "{} mapped to {}/{} as {:?} with consistency {:?}",
            schema.type_name(),
            keyspace,
            schema.column_family(),
            schema.kind(),
            consistency
        );
        Ok(Dao::new(schema, self.converter(), client, keyspace, consistency, self.endpoint.clone()))
    }
}
