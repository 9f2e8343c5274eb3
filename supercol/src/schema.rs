use crate::client::ConsistencyLevel;
use crate::converter::TypeTag;
use crate::error::AppError;
use std::any::{type_name, Any};

/// What a property contributes to the stored row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Row key.
    Key,
    /// Name of the super column grouping the other columns.
    SuperColumn,
    /// Column name of a column bean (one logical column per record).
    ColumnName,
    /// Stored value of a column bean's column.
    Value,
    /// Ordinary column named after the property.
    Column,
    /// Never persisted.
    Transient,
}

pub type Getter<T> = fn(&T) -> Option<&dyn Any>;
pub type Setter<T> = fn(&mut T, Option<Box<dyn Any>>) -> Result<(), AppError>;

/// One declared property of a record type: its name, declared type, role and accessors.
pub struct Property<T> {
    name: &'static str,
    value_type: TypeTag,
    role: Role,
    getter: Option<Getter<T>>,
    setter: Option<Setter<T>>,
}

impl<T> Clone for Property<T> {
    fn clone(&self) -> Self {
        Property {
            name: self.name,
            value_type: self.value_type,
            role: self.role,
            getter: self.getter,
            setter: self.setter,
        }
    }
}

impl<T> std::fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Property")
            .field("name", &self.name)
            .field("type", &self.value_type.name)
            .field("role", &self.role)
            .field("readable", &self.getter.is_some())
            .field("writable", &self.setter.is_some())
            .finish()
    }
}

impl<T> Property<T> {
    pub fn new<V: Any>(name: &'static str, role: Role, getter: Option<Getter<T>>, setter: Option<Setter<T>>) -> Self {
        Property { name, value_type: TypeTag::of::<V>(), role, getter, setter }
    }

    pub fn read_write<V: Any>(name: &'static str, role: Role, getter: Getter<T>, setter: Setter<T>) -> Self {
        Self::new::<V>(name, role, Some(getter), Some(setter))
    }

    pub fn read_only<V: Any>(name: &'static str, getter: Getter<T>) -> Self {
        Self::new::<V>(name, Role::Column, Some(getter), None)
    }

    pub fn write_only<V: Any>(name: &'static str, setter: Setter<T>) -> Self {
        Self::new::<V>(name, Role::Column, None, Some(setter))
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn value_type(&self) -> &TypeTag {
        &self.value_type
    }

    pub fn is_readable(&self) -> bool {
        self.getter.is_some()
    }

    pub fn is_writable(&self) -> bool {
        self.setter.is_some()
    }

    pub fn is_read_write(&self) -> bool {
        self.is_readable() && self.is_writable()
    }

    pub fn read<'a>(&self, bean: &'a T) -> Option<&'a dyn Any> {
        self.getter.and_then(|get| get(bean))
    }

    pub fn write(&self, bean: &mut T, value: Option<Box<dyn Any>>) -> Result<(), AppError> {
        match self.setter {
            Some(set) => set(bean, value),
            None => Err(AppError::configuration(format!("property {} is not writable", self.name))),
        }
    }
}

/// Downcasts a decoded value to the declared property type; used by derived setters.
pub fn downcast<V: Any>(value: Option<Box<dyn Any>>, property: &str) -> Result<Option<V>, AppError> {
    match value {
        None => Ok(None),
        Some(boxed) => boxed
            .downcast::<V>()
            .map(|v| Some(*v))
            .map_err(|_| AppError::unmappable(format!("value for {} is not a {}", property, type_name::<V>()))),
    }
}

/// Bean-level marker: where records of a type live.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BeanMeta {
    pub keyspace: Option<String>,
    pub column_family: String,
    pub secondary_column_family: Option<String>,
    pub consistency: Option<ConsistencyLevel>,
}

impl BeanMeta {
    pub fn new(column_family: impl Into<String>) -> Self {
        BeanMeta { column_family: column_family.into(), ..Default::default() }
    }

    pub fn with_keyspace(mut self, keyspace: impl Into<String>) -> Self {
        self.keyspace = Some(keyspace.into());
        self
    }

    pub fn with_secondary_column_family(mut self, column_family: impl Into<String>) -> Self {
        self.secondary_column_family = Some(column_family.into());
        self
    }

    pub fn with_consistency(mut self, consistency: ConsistencyLevel) -> Self {
        self.consistency = Some(consistency);
        self
    }
}

/// Mapping style selected by the markers a type declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaKind {
    /// Every property is a column of one row.
    Structured,
    /// Every record is one super column inside the row of its key.
    Super,
    /// Every record is one column: name from the column property, value from the value property or the write time.
    Column,
}

/// Record type whose properties can be mapped to columns.
///
/// Implemented by `#[derive(Entity)]`; a manual implementation lists the same
/// descriptors by hand.
pub trait Entity: Default + 'static {
    fn meta() -> BeanMeta;
    fn properties() -> Vec<Property<Self>>;

    fn schema() -> Result<BeanSchema<Self>, AppError> {
        describe::<Self>()
    }
}

/// Immutable mapping description of one record type.
pub struct BeanSchema<T> {
    type_name: &'static str,
    meta: BeanMeta,
    kind: SchemaKind,
    key: Property<T>,
    super_column: Option<Property<T>>,
    column: Option<Property<T>>,
    value: Option<Property<T>>,
    properties: Vec<Property<T>>,
    declared: Vec<Property<T>>,
    transients: Vec<&'static str>,
    column_names: Vec<&'static str>,
    fetched_columns: Vec<&'static str>,
}

impl<T> Clone for BeanSchema<T> {
    fn clone(&self) -> Self {
        BeanSchema {
            type_name: self.type_name,
            meta: self.meta.clone(),
            kind: self.kind,
            key: self.key.clone(),
            super_column: self.super_column.clone(),
            column: self.column.clone(),
            value: self.value.clone(),
            properties: self.properties.clone(),
            declared: self.declared.clone(),
            transients: self.transients.clone(),
            column_names: self.column_names.clone(),
            fetched_columns: self.fetched_columns.clone(),
        }
    }
}

impl<T> std::fmt::Debug for BeanSchema<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BeanSchema")
            .field("type_name", &self.type_name)
            .field("meta", &self.meta)
            .field("kind", &self.kind)
            .field("properties", &self.properties)
            .field("transients", &self.transients)
            .finish()
    }
}

pub fn describe<T: Entity>() -> Result<BeanSchema<T>, AppError> {
    describe_with(T::meta(), T::properties())
}

fn single<T>(eligible: &[Property<T>], role: Role, type_name: &str, marker: &str) -> Result<Option<Property<T>>, AppError> {
    let mut found = eligible.iter().filter(|p| p.role == role);
    let first = found.next().cloned();
    match found.next() {
        Some(second) => Err(AppError::configuration(format!(
            "{} declares more than one {} property ({} and {})",
            type_name,
            marker,
            first.map(|p| p.name).unwrap_or_default(),
            second.name
        ))),
        None => Ok(first),
    }
}

/// Derives the schema of `T` from its bean marker and declared properties.
///
/// Only properties with both accessors take part in the mapping; transient
/// ones are listed but never persisted.
pub fn describe_with<T>(meta: BeanMeta, declared: Vec<Property<T>>) -> Result<BeanSchema<T>, AppError> {
    let type_name = type_name::<T>();
    if meta.column_family.trim().is_empty() {
        return Err(AppError::configuration(format!("{} does not declare a column family", type_name)));
    }

    let eligible: Vec<Property<T>> =
        declared.iter().filter(|p| p.is_read_write() && p.role != Role::Transient).cloned().collect();
    let transients = declared.iter().filter(|p| p.role == Role::Transient).map(|p| p.name).collect();

    let key = single(&eligible, Role::Key, type_name, "key")?.ok_or_else(|| {
        AppError::configuration(format!("Could not find key of {}, did you mark a property with #[key]?", type_name))
    })?;
    let super_column = single(&eligible, Role::SuperColumn, type_name, "super column")?;
    let column = single(&eligible, Role::ColumnName, type_name, "column name")?;
    let value = single(&eligible, Role::Value, type_name, "value")?;

    if super_column.is_some() && (column.is_some() || value.is_some()) {
        return Err(AppError::configuration(format!("{} mixes super column and column bean markers", type_name)));
    }
    if value.is_some() && column.is_none() {
        return Err(AppError::configuration(format!(
            "Could not find column of {}, a value property requires a #[column_name] property",
            type_name
        )));
    }

    let kind = if super_column.is_some() {
        SchemaKind::Super
    } else if column.is_some() {
        SchemaKind::Column
    } else {
        SchemaKind::Structured
    };
    if meta.secondary_column_family.is_some() && kind != SchemaKind::Column {
        return Err(AppError::configuration(format!(
            "{} declares a secondary column family but is not a column bean",
            type_name
        )));
    }

    let column_names = eligible.iter().filter(|p| p.role == Role::Column).map(|p| p.name).collect();
    let fetched_columns = declared.iter().filter(|p| p.role == Role::Column && p.is_writable()).map(|p| p.name).collect();

    Ok(BeanSchema {
        type_name,
        meta,
        kind,
        key,
        super_column,
        column,
        value,
        properties: eligible,
        declared,
        transients,
        column_names,
        fetched_columns,
    })
}

impl<T> BeanSchema<T> {
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn meta(&self) -> &BeanMeta {
        &self.meta
    }

    pub fn kind(&self) -> SchemaKind {
        self.kind
    }

    pub fn column_family(&self) -> &str {
        &self.meta.column_family
    }

    pub fn secondary_column_family(&self) -> Option<&str> {
        self.meta.secondary_column_family.as_deref().filter(|cf| !cf.is_empty())
    }

    pub fn key(&self) -> &Property<T> {
        &self.key
    }

    pub fn super_column(&self) -> Option<&Property<T>> {
        self.super_column.as_ref()
    }

    pub fn column(&self) -> Option<&Property<T>> {
        self.column.as_ref()
    }

    pub fn value(&self) -> Option<&Property<T>> {
        self.value.as_ref()
    }

    /// Persisted properties in declaration order.
    pub fn properties(&self) -> &[Property<T>] {
        &self.properties
    }

    pub fn transients(&self) -> &[&'static str] {
        &self.transients
    }

    /// Names of the ordinary columns, used to build name predicates for reads.
    pub fn column_names(&self) -> &[&'static str] {
        &self.column_names
    }

    /// Columns a flat row read asks for: the persisted ones plus write-only
    /// properties, which are populated but never written.
    pub fn fetched_columns(&self) -> &[&'static str] {
        &self.fetched_columns
    }

    /// Writable, non-transient property with the given name, persisted or not.
    pub fn writable(&self, name: &str) -> Option<&Property<T>> {
        self.declared.iter().find(|p| p.name == name && p.is_writable() && p.role != Role::Transient)
    }

    pub fn with_column_family(mut self, column_family: impl Into<String>) -> Self {
        self.meta.column_family = column_family.into();
        self
    }
}
