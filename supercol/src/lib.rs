//! supercol maps strongly typed records onto the rows of a wide-column store
//! (row key, column name, column value, optionally grouped into super columns) and back.
//!
//! A record type declares its mapping with `#[derive(Entity)]`: one `#[key]` field, at most one
//! `#[super_column]` field, or a `#[column_name]` / `#[value]` pair for single column beans.
//! Values are converted to bytes by a [`CodecRegistry`] of string based codecs, enumerations
//! deriving [`NamedEnum`] are stored by variant name and explicitly opted-in types can fall back
//! to opaque `bincode` payloads. A [`Dao`] built by [`DaoFactory`] issues the store calls through
//! any [`ColumnStoreClient`]; [`MemoryStore`] is the in-process implementation.

extern crate self as supercol;

pub mod client;
pub mod codec;
pub mod converter;
pub mod dao;
pub mod error;
pub mod factory;
pub mod logger;
pub mod marshalled;
pub mod marshaller;
pub mod memory;
pub mod registry;
pub mod schema;
pub mod settings;
pub mod unmarshaller;

pub use client::{
    BatchMutation, CallContext, Column, ColumnParent, ColumnPath, ColumnStoreClient, ConsistencyLevel, Endpoint, KeySlice, SlicePredicate,
    SliceRange, SuperColumn,
};
pub use codec::{Opaque, StringBased, TypeMapping, Utf8};
pub use converter::{SerializeUnknown, TypeConverter, TypeTag};
pub use dao::Dao;
pub use error::{AppError, ClientError};
pub use factory::DaoFactory;
pub use inventory;
pub use macros::Entity;
pub use macros::NamedEnum;
pub use marshalled::MarshalledRecord;
pub use memory::MemoryStore;
pub use registry::{CodecRegistry, EnumInfo, NamedEnum, RegistryBuilder};
pub use schema::{describe, downcast, BeanMeta, BeanSchema, Entity, Getter, Property, Role, SchemaKind, Setter};
pub use settings::{load_settings, StoreSettings};
pub use std::any::Any;
