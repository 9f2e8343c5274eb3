//! In-process column store implementing [`ColumnStoreClient`].
//!
//! Rows live in ordered maps per keyspace and column family, so range scans
//! follow byte order of the keys. Writes are last-write-wins by timestamp.

use crate::client::{
    BatchMutation, CallContext, Column, ColumnParent, ColumnPath, ColumnStoreClient, KeySlice, SlicePredicate, SuperColumn,
};
use crate::error::ClientError;
use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;
use std::sync::{Mutex, RwLock};

type Columns = BTreeMap<Vec<u8>, Column>;

#[derive(Default)]
struct Family {
    rows: BTreeMap<String, Columns>,
    super_rows: BTreeMap<String, BTreeMap<Vec<u8>, Columns>>,
}

#[derive(Default)]
pub struct MemoryStore {
    families: RwLock<HashMap<(String, String), Family>>,
    fail_next: Mutex<Option<ClientError>>,
    calls: Mutex<Vec<String>>,
}

fn merge(columns: &mut Columns, column: Column) {
    match columns.get(&column.name) {
        Some(existing) if existing.timestamp > column.timestamp => {}
        _ => {
            columns.insert(column.name.clone(), column);
        }
    }
}

fn lower(bound: &[u8]) -> Bound<Vec<u8>> {
    if bound.is_empty() { Bound::Unbounded } else { Bound::Included(bound.to_vec()) }
}

/// Entries of `entries` selected by `predicate`, in predicate order for names
/// and in (possibly reversed) byte order for ranges.
fn select<'a, V>(entries: &'a BTreeMap<Vec<u8>, V>, predicate: &SlicePredicate) -> Vec<(&'a Vec<u8>, &'a V)> {
    match predicate {
        SlicePredicate::Names(names) => names.iter().filter_map(|name| entries.get_key_value(name)).collect(),
        SlicePredicate::Range(range) => {
            let (from, to) = if range.reversed { (&range.finish, &range.start) } else { (&range.start, &range.finish) };
            if !from.is_empty() && !to.is_empty() && from > to {
                return Vec::new();
            }
            let scan = entries.range::<Vec<u8>, _>((lower(from), lower(to)));
            if range.reversed {
                scan.rev().take(range.count).collect()
            } else {
                scan.take(range.count).collect()
            }
        }
    }
}

fn within(key: &str, start_key: &str, end_key: &str) -> bool {
    (start_key.is_empty() || key >= start_key) && (end_key.is_empty() || key <= end_key)
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next call, whatever it is, fail with `error`.
    pub fn fail_next(&self, error: ClientError) {
        if let Ok(mut slot) = self.fail_next.lock() {
            *slot = Some(error);
        }
    }

    /// Names of the operations served so far, oldest first.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    fn enter(&self, operation: &str) -> Result<(), ClientError> {
        self.calls.lock()?.push(operation.to_string());
        match self.fail_next.lock()?.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn read<R>(&self, ctx: &CallContext, column_family: &str, f: impl FnOnce(&Family) -> R) -> Result<R, ClientError> {
        let families = self.families.read()?;
        let empty = Family::default();
        let family = families.get(&(ctx.keyspace.clone(), column_family.to_string())).unwrap_or(&empty);
        Ok(f(family))
    }

    fn write<R>(&self, ctx: &CallContext, column_family: &str, f: impl FnOnce(&mut Family) -> R) -> Result<R, ClientError> {
        let mut families = self.families.write()?;
        let family = families.entry((ctx.keyspace.clone(), column_family.to_string())).or_default();
        Ok(f(family))
    }
}

fn standard_slice(family: &Family, key: &str, parent: &ColumnParent, predicate: &SlicePredicate) -> Vec<Column> {
    let row = match &parent.super_column {
        Some(super_name) => family.super_rows.get(key).and_then(|row| row.get(super_name)),
        None => family.rows.get(key),
    };
    row.map(|columns| select(columns, predicate).into_iter().map(|(_, c)| c.clone()).collect()).unwrap_or_default()
}

fn super_slice(family: &Family, key: &str, predicate: &SlicePredicate) -> Vec<SuperColumn> {
    family
        .super_rows
        .get(key)
        .map(|row| {
            select(row, predicate)
                .into_iter()
                .map(|(name, columns)| SuperColumn::new(name.clone(), columns.values().cloned().collect()))
                .collect()
        })
        .unwrap_or_default()
}

impl ColumnStoreClient for MemoryStore {
    fn get_slice(&self, ctx: &CallContext, key: &str, parent: &ColumnParent, predicate: &SlicePredicate) -> Result<Vec<Column>, ClientError> {
        self.enter("get_slice")?;
        self.read(ctx, &parent.column_family, |family| standard_slice(family, key, parent, predicate))
    }

    fn multiget_slice(
        &self,
        ctx: &CallContext,
        keys: &[String],
        parent: &ColumnParent,
        predicate: &SlicePredicate,
    ) -> Result<HashMap<String, Vec<Column>>, ClientError> {
        self.enter("multiget_slice")?;
        self.read(ctx, &parent.column_family, |family| {
            keys.iter().map(|key| (key.clone(), standard_slice(family, key, parent, predicate))).collect()
        })
    }

    fn get_range_slice(
        &self,
        ctx: &CallContext,
        parent: &ColumnParent,
        predicate: &SlicePredicate,
        start_key: &str,
        end_key: &str,
        count: usize,
    ) -> Result<Vec<KeySlice<Column>>, ClientError> {
        self.enter("get_range_slice")?;
        self.read(ctx, &parent.column_family, |family| {
            family
                .rows
                .keys()
                .filter(|key| within(key, start_key, end_key))
                .take(count)
                .map(|key| KeySlice { key: key.clone(), columns: standard_slice(family, key, parent, predicate) })
                .collect()
        })
    }

    fn get_super_slice(&self, ctx: &CallContext, key: &str, parent: &ColumnParent, predicate: &SlicePredicate) -> Result<Vec<SuperColumn>, ClientError> {
        self.enter("get_super_slice")?;
        self.read(ctx, &parent.column_family, |family| super_slice(family, key, predicate))
    }

    fn multiget_super_slice(
        &self,
        ctx: &CallContext,
        keys: &[String],
        parent: &ColumnParent,
        predicate: &SlicePredicate,
    ) -> Result<HashMap<String, Vec<SuperColumn>>, ClientError> {
        self.enter("multiget_super_slice")?;
        self.read(ctx, &parent.column_family, |family| keys.iter().map(|key| (key.clone(), super_slice(family, key, predicate))).collect())
    }

    fn get_super_range_slice(
        &self,
        ctx: &CallContext,
        parent: &ColumnParent,
        predicate: &SlicePredicate,
        start_key: &str,
        end_key: &str,
        count: usize,
    ) -> Result<Vec<KeySlice<SuperColumn>>, ClientError> {
        self.enter("get_super_range_slice")?;
        self.read(ctx, &parent.column_family, |family| {
            family
                .super_rows
                .keys()
                .filter(|key| within(key, start_key, end_key))
                .take(count)
                .map(|key| KeySlice { key: key.clone(), columns: super_slice(family, key, predicate) })
                .collect()
        })
    }

    fn batch_insert(&self, ctx: &CallContext, key: &str, mutation: BatchMutation) -> Result<(), ClientError> {
        self.enter("batch_insert")?;
        for (column_family, columns) in mutation.columns {
            self.write(ctx, &column_family, |family| {
                let row = family.rows.entry(key.to_string()).or_default();
                columns.into_iter().for_each(|column| merge(row, column));
            })?;
        }
        for (column_family, super_columns) in mutation.super_columns {
            self.write(ctx, &column_family, |family| {
                let row = family.super_rows.entry(key.to_string()).or_default();
                for super_column in super_columns {
                    let group = row.entry(super_column.name).or_default();
                    super_column.columns.into_iter().for_each(|column| merge(group, column));
                }
            })?;
        }
        Ok(())
    }

    fn insert(&self, ctx: &CallContext, key: &str, path: &ColumnPath, value: &[u8], timestamp: i64) -> Result<(), ClientError> {
        self.enter("insert")?;
        let name = path.column.clone().ok_or_else(|| ClientError::Rejected("insert requires a column name".to_string()))?;
        let column = Column::new(name, value.to_vec(), timestamp);
        self.write(ctx, &path.column_family, |family| match &path.super_column {
            Some(super_name) => {
                let group = family.super_rows.entry(key.to_string()).or_default().entry(super_name.clone()).or_default();
                merge(group, column)
            }
            None => merge(family.rows.entry(key.to_string()).or_default(), column),
        })
    }

    fn remove(&self, ctx: &CallContext, key: &str, path: &ColumnPath, timestamp: i64) -> Result<(), ClientError> {
        self.enter("remove")?;
        let keep = |column: &Column| column.timestamp > timestamp;
        self.write(ctx, &path.column_family, |family| {
            match (&path.super_column, &path.column) {
                (None, None) => {
                    if let Some(row) = family.rows.get_mut(key) {
                        row.retain(|_, c| keep(c));
                    }
                    if let Some(row) = family.super_rows.get_mut(key) {
                        row.values_mut().for_each(|group| group.retain(|_, c| keep(c)));
                        row.retain(|_, group| !group.is_empty());
                    }
                }
                (None, Some(name)) => {
                    if let Some(row) = family.rows.get_mut(key) {
                        row.retain(|n, c| n != name || keep(c));
                    }
                }
                (Some(super_name), column) => {
                    if let Some(row) = family.super_rows.get_mut(key) {
                        if let Some(group) = row.get_mut(super_name) {
                            group.retain(|n, c| column.as_ref().is_some_and(|name| n != name) || keep(c));
                        }
                        row.retain(|_, group| !group.is_empty());
                    }
                }
            }
            if family.rows.get(key).is_some_and(|row| row.is_empty()) {
                family.rows.remove(key);
            }
            if family.super_rows.get(key).is_some_and(|row| row.is_empty()) {
                family.super_rows.remove(key);
            }
        })
    }
}
