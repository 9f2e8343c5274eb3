use crate::client::{
    BatchMutation, CallContext, Column, ColumnParent, ColumnPath, ColumnStoreClient, ConsistencyLevel, Endpoint, SlicePredicate, SliceRange,
    SuperColumn,
};
use crate::converter::TypeConverter;
use crate::error::{AppError, ClientError};
use crate::marshaller::{marshal, marshal_column, now_millis};
use crate::schema::{BeanSchema, SchemaKind};
use crate::unmarshaller::{unmarshal, unmarshal_column, unmarshal_super};
use std::any::Any;
use std::sync::Arc;

/// Record access for one record type and column family.
///
/// Flat, super column and column bean types share this implementation; the
/// schema kind decides how records map onto rows. Every call is synchronous
/// and issues the minimal number of store requests, without retries.
pub struct Dao<T> {
    schema: Arc<BeanSchema<T>>,
    converter: Arc<TypeConverter>,
    client: Arc<dyn ColumnStoreClient>,
    keyspace: String,
    consistency: ConsistencyLevel,
    endpoint: Option<Endpoint>,
}

impl<T> Clone for Dao<T> {
    fn clone(&self) -> Self {
        Dao {
            schema: Arc::clone(&self.schema),
            converter: Arc::clone(&self.converter),
            client: Arc::clone(&self.client),
            keyspace: self.keyspace.clone(),
            consistency: self.consistency,
            endpoint: self.endpoint.clone(),
        }
    }
}

impl<T: Default + 'static> Dao<T> {
    pub(crate) fn new(
        schema: BeanSchema<T>,
        converter: Arc<TypeConverter>,
        client: Arc<dyn ColumnStoreClient>,
        keyspace: String,
        consistency: ConsistencyLevel,
        endpoint: Option<Endpoint>,
    ) -> Self {
        Dao { schema: Arc::new(schema), converter, client, keyspace, consistency, endpoint }
    }

    pub fn schema(&self) -> &BeanSchema<T> {
        &self.schema
    }

    pub fn keyspace(&self) -> &str {
        &self.keyspace
    }

    pub fn consistency(&self) -> ConsistencyLevel {
        self.consistency
    }

    /// Runs one store call with the configured context and wraps its failure.
    fn execute<R>(&self, operation: &str, key: &str, call: impl FnOnce(&CallContext) -> Result<R, ClientError>) -> Result<R, AppError> {
        let endpoint = self.endpoint.clone().ok_or_else(|| {
            AppError::configuration(format!("no host/port or node list configured for {}", self.schema.type_name()))
        })?;
        let ctx = CallContext { keyspace: self.keyspace.clone(), consistency: self.consistency, endpoint };
        log::debug!("{} {}/{} key={}", operation, self.keyspace, self.schema.column_family(), key);
        call(&ctx).map_err(|e| {
            if !e.is_not_found() {
                crate::error!("{} on {}/{} for key {} failed: {}", operation, self.keyspace, self.schema.column_family(), key, e);
            }
            AppError::from(e)
        })
    }

    /// Like `execute`, but a not-found report becomes `None`.
    fn lookup<R>(&self, operation: &str, key: &str, call: impl FnOnce(&CallContext) -> Result<R, ClientError>) -> Result<Option<R>, AppError> {
        match self.execute(operation, key, call) {
            Err(AppError::Transport(e)) if e.is_not_found() => Ok(None),
            other => other.map(Some),
        }
    }

    fn parent(&self) -> ColumnParent {
        ColumnParent::new(self.schema.column_family())
    }

    /// Flat rows are read by their declared column names, everything else by a full slice.
    fn predicate(&self) -> SlicePredicate {
        match self.schema.kind() {
            SchemaKind::Structured => {
                SlicePredicate::Names(self.schema.fetched_columns().iter().map(|name| self.converter.string_to_bytes(name)).collect())
            }
            SchemaKind::Super | SchemaKind::Column => SlicePredicate::all(),
        }
    }

    fn key_bytes(&self, key: &str) -> Vec<u8> {
        self.converter.string_to_bytes(key)
    }

    fn require(&self, kind: SchemaKind, operation: &str) -> Result<(), AppError> {
        if self.schema.kind() == kind {
            Ok(())
        } else {
            Err(AppError::configuration(format!("{} is only supported for {:?} beans, {} is {:?}", operation, kind, self.schema.type_name(), self.schema.kind())))
        }
    }

    fn from_columns(&self, key: &str, columns: &[Column]) -> Result<Option<T>, AppError> {
        if columns.is_empty() {
            return Ok(None);
        }
        match self.schema.kind() {
            SchemaKind::Column => unmarshal_column(&self.key_bytes(key), &columns[0], &self.schema, &self.converter).map(Some),
            _ => unmarshal(&self.key_bytes(key), columns, &self.schema, &self.converter).map(Some),
        }
    }

    fn from_super_columns(&self, key: &str, super_columns: &[SuperColumn]) -> Result<Vec<T>, AppError> {
        unmarshal_super(&self.key_bytes(key), super_columns, &self.schema, &self.converter)
    }

    /// Writes `record` with one shared timestamp. A flat bean without any
    /// persisted column still issues its (empty) batch, but the store keeps
    /// no row for it, so a later [`Dao::get`] returns `None`.
    pub fn insert(&self, record: &T) -> Result<(), AppError> {
        let timestamp = now_millis();
        match self.schema.kind() {
            SchemaKind::Structured | SchemaKind::Super => {
                let marshalled = marshal(record, &self.schema, &self.converter)?;
                let key = marshalled.key_string()?;
                let cf = self.schema.column_family().to_string();
                let mut mutation = BatchMutation::default();
                match marshalled.super_column() {
                    Some(name) => {
                        mutation.super_columns.insert(cf, vec![SuperColumn::new(name.to_vec(), marshalled.to_columns(timestamp))]);
                    }
                    None => {
                        mutation.columns.insert(cf, marshalled.to_columns(timestamp));
                    }
                }
                self.execute("batch_insert", &key, |ctx| self.client.batch_insert(ctx, &key, mutation))
            }
            SchemaKind::Column => {
                let column = marshal_column(record, &self.schema, &self.converter, timestamp)?;
                let path = ColumnPath::column(self.schema.column_family(), column.name.clone());
                self.execute("insert", &column.key, |ctx| self.client.insert(ctx, &column.key, &path, &column.value, timestamp))?;

                if let Some(secondary) = self.schema.secondary_column_family() {
                    let secondary_key = self.converter.bytes_to_string(&column.name)?;
                    let path = ColumnPath::column(secondary, self.key_bytes(&column.key));
                    let mirrored = self.execute("insert", &secondary_key, |ctx| {
                        self.client.insert(ctx, &secondary_key, &path, &column.value, timestamp)
                    });
                    if let Err(e) = mirrored {
                        crate::warn!("secondary write {}/{} for {} failed, primary column kept: {}", secondary, secondary_key, column.key, e);
                        return Err(e);
                    }
                }
                Ok(())
            }
        }
    }

    /// Reads the record stored under `key`. A super column or column bean row
    /// yields its first record; use [`Dao::get_super`] or [`Dao::get_columns`]
    /// for all of them.
    pub fn get(&self, key: &str) -> Result<Option<T>, AppError> {
        let parent = self.parent();
        let predicate = self.predicate();
        match self.schema.kind() {
            SchemaKind::Super => {
                let slice = self.lookup("get_super_slice", key, |ctx| self.client.get_super_slice(ctx, key, &parent, &predicate))?;
                let first = slice.unwrap_or_default().into_iter().take(1).collect::<Vec<_>>();
                Ok(self.from_super_columns(key, &first)?.pop())
            }
            SchemaKind::Structured | SchemaKind::Column => {
                match self.lookup("get_slice", key, |ctx| self.client.get_slice(ctx, key, &parent, &predicate))? {
                    Some(columns) => self.from_columns(key, &columns),
                    None => Ok(None),
                }
            }
        }
    }

    /// All super column records stored under `key`, in super column name order.
    pub fn get_super(&self, key: &str) -> Result<Vec<T>, AppError> {
        self.require(SchemaKind::Super, "get_super")?;
        let parent = self.parent();
        let slice = self.lookup("get_super_slice", key, |ctx| self.client.get_super_slice(ctx, key, &parent, &SlicePredicate::all()))?;
        self.from_super_columns(key, &slice.unwrap_or_default())
    }

    /// One record per requested key that has data, in request order.
    pub fn get_many(&self, keys: &[String]) -> Result<Vec<T>, AppError> {
        let parent = self.parent();
        let predicate = self.predicate();
        let label = keys.join(",");
        let mut records = Vec::with_capacity(keys.len());
        match self.schema.kind() {
            SchemaKind::Super => {
                let mut rows = self.execute("multiget_super_slice", &label, |ctx| self.client.multiget_super_slice(ctx, keys, &parent, &predicate))?;
                for key in keys {
                    let first: Vec<SuperColumn> = rows.remove(key).unwrap_or_default().into_iter().take(1).collect();
                    records.extend(self.from_super_columns(key, &first)?);
                }
            }
            SchemaKind::Structured | SchemaKind::Column => {
                let mut rows = self.execute("multiget_slice", &label, |ctx| self.client.multiget_slice(ctx, keys, &parent, &predicate))?;
                for key in keys {
                    if let Some(record) = self.from_columns(key, &rows.remove(key).unwrap_or_default())? {
                        records.push(record);
                    }
                }
            }
        }
        Ok(records)
    }

    /// Records of the rows between `start_key` and `end_key` (inclusive, empty
    /// means unbounded), at most `limit`, in the store's key order.
    pub fn get_range(&self, start_key: &str, end_key: &str, limit: usize) -> Result<Vec<T>, AppError> {
        let parent = self.parent();
        let predicate = self.predicate();
        let label = format!("{}..{}", start_key, end_key);
        let mut records = Vec::new();
        match self.schema.kind() {
            SchemaKind::Super => {
                let rows = self.execute("get_super_range_slice", &label, |ctx| {
                    self.client.get_super_range_slice(ctx, &parent, &predicate, start_key, end_key, limit)
                })?;
                for row in rows {
                    let first: Vec<SuperColumn> = row.columns.into_iter().take(1).collect();
                    records.extend(self.from_super_columns(&row.key, &first)?);
                }
            }
            SchemaKind::Structured | SchemaKind::Column => {
                let rows = self.execute("get_range_slice", &label, |ctx| {
                    self.client.get_range_slice(ctx, &parent, &predicate, start_key, end_key, limit)
                })?;
                for row in rows {
                    if let Some(record) = self.from_columns(&row.key, &row.columns)? {
                        records.push(record);
                    }
                }
            }
        }
        Ok(records)
    }

    /// Pages through the super columns of one row: up to `limit` records whose
    /// super column comes after `after`, or from the start when `after` is `None`.
    pub fn get_super_range<V: Any>(&self, key: &str, after: Option<&V>, limit: usize) -> Result<Vec<T>, AppError> {
        self.require(SchemaKind::Super, "get_super_range")?;
        let start = match after {
            Some(value) => self.converter.encode(value)?,
            None => Vec::new(),
        };
        let count = if start.is_empty() { limit } else { limit.saturating_add(1) };
        let predicate = SlicePredicate::Range(SliceRange::from(start.clone(), count));
        let parent = self.parent();
        let slice = self
            .lookup("get_super_slice", key, |ctx| self.client.get_super_slice(ctx, key, &parent, &predicate))?
            .unwrap_or_default();
        let page: Vec<SuperColumn> = slice
            .into_iter()
            .skip_while(|super_column| !start.is_empty() && super_column.name == start)
            .take(limit)
            .collect();
        self.from_super_columns(key, &page)
    }

    /// Removes what `record` occupies: its row, its super column, or its column
    /// (plus the mirrored entry in the secondary column family).
    pub fn delete(&self, record: &T) -> Result<(), AppError> {
        let timestamp = now_millis();
        match self.schema.kind() {
            SchemaKind::Structured => {
                let key = marshal(record, &self.schema, &self.converter)?.key_string()?;
                self.delete_key(&key)
            }
            SchemaKind::Super => {
                let marshalled = marshal(record, &self.schema, &self.converter)?;
                let key = marshalled.key_string()?;
                let path = ColumnPath {
                    column_family: self.schema.column_family().to_string(),
                    super_column: marshalled.super_column().map(|name| name.to_vec()),
                    column: None,
                };
                self.execute("remove", &key, |ctx| self.client.remove(ctx, &key, &path, timestamp))
            }
            SchemaKind::Column => {
                let column = marshal_column(record, &self.schema, &self.converter, timestamp)?;
                let path = ColumnPath::column(self.schema.column_family(), column.name.clone());
                self.execute("remove", &column.key, |ctx| self.client.remove(ctx, &column.key, &path, timestamp))?;
                if let Some(secondary) = self.schema.secondary_column_family() {
                    let secondary_key = self.converter.bytes_to_string(&column.name)?;
                    let path = ColumnPath::column(secondary, self.key_bytes(&column.key));
                    self.execute("remove", &secondary_key, |ctx| self.client.remove(ctx, &secondary_key, &path, timestamp))?;
                }
                Ok(())
            }
        }
    }

    /// Removes the whole row; a missing row is not an error.
    pub fn delete_key(&self, key: &str) -> Result<(), AppError> {
        let path = ColumnPath::row(self.schema.column_family());
        let timestamp = now_millis();
        self.execute("remove", key, |ctx| self.client.remove(ctx, key, &path, timestamp))
    }

    fn slice_of(&self, column_family: &str, key: &str) -> Result<Vec<Column>, AppError> {
        let parent = ColumnParent::new(column_family);
        Ok(self
            .lookup("get_slice", key, |ctx| self.client.get_slice(ctx, key, &parent, &SlicePredicate::all()))?
            .unwrap_or_default())
    }

    fn names(&self, columns: Vec<Column>) -> Result<Vec<String>, AppError> {
        columns.iter().map(|c| self.converter.bytes_to_string(&c.name)).collect()
    }

    /// Names of all columns in the row of `key`.
    pub fn column_names(&self, key: &str) -> Result<Vec<String>, AppError> {
        self.require(SchemaKind::Column, "column_names")?;
        let columns = self.slice_of(self.schema.column_family(), key)?;
        self.names(columns)
    }

    /// Names of all columns in the secondary row of `key`, i.e. the keys that
    /// wrote a column named `key`.
    pub fn column_names_by_secondary(&self, key: &str) -> Result<Vec<String>, AppError> {
        self.require(SchemaKind::Column, "column_names_by_secondary")?;
        let secondary = self
            .schema
            .secondary_column_family()
            .ok_or_else(|| AppError::configuration(format!("{} has no secondary column family", self.schema.type_name())))?;
        let columns = self.slice_of(secondary, key)?;
        self.names(columns)
    }

    pub fn column_values(&self, key: &str) -> Result<Vec<String>, AppError> {
        self.require(SchemaKind::Column, "column_values")?;
        let columns = self.slice_of(self.schema.column_family(), key)?;
        columns.iter().map(|c| self.converter.bytes_to_string(&c.value)).collect()
    }

    /// Every column of the row of `key` as a record.
    pub fn get_columns(&self, key: &str) -> Result<Vec<T>, AppError> {
        self.require(SchemaKind::Column, "get_columns")?;
        let key_bytes = self.key_bytes(key);
        self.slice_of(self.schema.column_family(), key)?
            .iter()
            .map(|column| unmarshal_column(&key_bytes, column, &self.schema, &self.converter))
            .collect()
    }
}
