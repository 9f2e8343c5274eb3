//! Contract of the external column store client.
//!
//! The mapping layer never talks to the network itself. Every read and write
//! goes through [`ColumnStoreClient`], parameterized by a [`CallContext`] that
//! carries the keyspace, the consistency level and the endpoint configured once
//! per DAO.

use crate::error::ClientError;
use serde::Deserialize;
use std::collections::HashMap;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: Vec<u8>,
    pub value: Vec<u8>,
    pub timestamp: i64,
}

impl Column {
    pub fn new(name: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>, timestamp: i64) -> Self {
        Column { name: name.into(), value: value.into(), timestamp }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuperColumn {
    pub name: Vec<u8>,
    pub columns: Vec<Column>,
}

impl SuperColumn {
    pub fn new(name: impl Into<Vec<u8>>, columns: Vec<Column>) -> Self {
        SuperColumn { name: name.into(), columns }
    }
}

/// Columns of one row, as returned by range scans in store key order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySlice<C> {
    pub key: String,
    pub columns: Vec<C>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnParent {
    pub column_family: String,
    pub super_column: Option<Vec<u8>>,
}

impl ColumnParent {
    pub fn new(column_family: impl Into<String>) -> Self {
        ColumnParent { column_family: column_family.into(), super_column: None }
    }
}

/// Target of a write or removal: a whole row, one super column, or one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnPath {
    pub column_family: String,
    pub super_column: Option<Vec<u8>>,
    pub column: Option<Vec<u8>>,
}

impl ColumnPath {
    pub fn row(column_family: impl Into<String>) -> Self {
        ColumnPath { column_family: column_family.into(), super_column: None, column: None }
    }

    pub fn column(column_family: impl Into<String>, column: impl Into<Vec<u8>>) -> Self {
        ColumnPath { column_family: column_family.into(), super_column: None, column: Some(column.into()) }
    }
}

/// Bounds of a name range; empty `start`/`finish` mean unbounded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SliceRange {
    pub start: Vec<u8>,
    pub finish: Vec<u8>,
    pub reversed: bool,
    pub count: usize,
}

impl SliceRange {
    pub fn all() -> Self {
        SliceRange { start: Vec::new(), finish: Vec::new(), reversed: false, count: usize::MAX }
    }

    pub fn from(start: Vec<u8>, count: usize) -> Self {
        SliceRange { start, finish: Vec::new(), reversed: false, count }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlicePredicate {
    Names(Vec<Vec<u8>>),
    Range(SliceRange),
}

impl SlicePredicate {
    pub fn all() -> Self {
        SlicePredicate::Range(SliceRange::all())
    }
}

/// Everything written by one batch insert, grouped by column family.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchMutation {
    pub columns: HashMap<String, Vec<Column>>,
    pub super_columns: HashMap<String, Vec<SuperColumn>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConsistencyLevel {
    Zero,
    One,
    #[default]
    Quorum,
    DcQuorum,
    DcQuorumSync,
    All,
    Any,
}

impl FromStr for ConsistencyLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "zero" => Ok(ConsistencyLevel::Zero),
            "one" => Ok(ConsistencyLevel::One),
            "quorum" => Ok(ConsistencyLevel::Quorum),
            "dc_quorum" => Ok(ConsistencyLevel::DcQuorum),
            "dc_quorum_sync" => Ok(ConsistencyLevel::DcQuorumSync),
            "all" => Ok(ConsistencyLevel::All),
            "any" => Ok(ConsistencyLevel::Any),
            _ => Err(format!("Invalid value for ConsistencyLevel: {}", s)),
        }
    }
}

impl<'de> Deserialize<'de> for ConsistencyLevel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ConsistencyLevel::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// Where calls go: one host or a list of nodes the client may choose from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Single { host: String, port: u16 },
    Nodes(Vec<String>),
}

/// Per-call parameters, configured once per DAO and passed through unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallContext {
    pub keyspace: String,
    pub consistency: ConsistencyLevel,
    pub endpoint: Endpoint,
}

pub trait ColumnStoreClient: Send + Sync {
    fn get_slice(&self, ctx: &CallContext, key: &str, parent: &ColumnParent, predicate: &SlicePredicate) -> Result<Vec<Column>, ClientError>;

    fn multiget_slice(
        &self,
        ctx: &CallContext,
        keys: &[String],
        parent: &ColumnParent,
        predicate: &SlicePredicate,
    ) -> Result<HashMap<String, Vec<Column>>, ClientError>;

    fn get_range_slice(
        &self,
        ctx: &CallContext,
        parent: &ColumnParent,
        predicate: &SlicePredicate,
        start_key: &str,
        end_key: &str,
        count: usize,
    ) -> Result<Vec<KeySlice<Column>>, ClientError>;

    fn get_super_slice(&self, ctx: &CallContext, key: &str, parent: &ColumnParent, predicate: &SlicePredicate) -> Result<Vec<SuperColumn>, ClientError>;

    fn multiget_super_slice(
        &self,
        ctx: &CallContext,
        keys: &[String],
        parent: &ColumnParent,
        predicate: &SlicePredicate,
    ) -> Result<HashMap<String, Vec<SuperColumn>>, ClientError>;

    fn get_super_range_slice(
        &self,
        ctx: &CallContext,
        parent: &ColumnParent,
        predicate: &SlicePredicate,
        start_key: &str,
        end_key: &str,
        count: usize,
    ) -> Result<Vec<KeySlice<SuperColumn>>, ClientError>;

    fn batch_insert(&self, ctx: &CallContext, key: &str, mutation: BatchMutation) -> Result<(), ClientError>;

    fn insert(&self, ctx: &CallContext, key: &str, path: &ColumnPath, value: &[u8], timestamp: i64) -> Result<(), ClientError>;

    fn remove(&self, ctx: &CallContext, key: &str, path: &ColumnPath, timestamp: i64) -> Result<(), ClientError>;
}
