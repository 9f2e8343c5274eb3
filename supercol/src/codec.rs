use crate::error::AppError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::any::{type_name, Any};
use std::fmt::Display;
use std::marker::PhantomData;
use std::str::FromStr;

/// Bidirectional conversion between one value type and column bytes.
///
/// The empty byte sequence is the canonical encoding of an absent value, so
/// `from_bytes(&[])` must yield `Ok(None)`.
pub trait TypeMapping<T>: Send + Sync {
    fn to_bytes(&self, value: &T) -> Result<Vec<u8>, AppError>;
    fn from_bytes(&self, bytes: &[u8]) -> Result<Option<T>, AppError>;
}

#[derive(Copy, Clone, Debug, Default)]
pub struct Utf8;

impl TypeMapping<String> for Utf8 {
    fn to_bytes(&self, value: &String) -> Result<Vec<u8>, AppError> {
        Ok(value.as_bytes().to_vec())
    }

    fn from_bytes(&self, bytes: &[u8]) -> Result<Option<String>, AppError> {
        if bytes.is_empty() {
            return Ok(None);
        }
        match std::str::from_utf8(bytes) {
            Ok(s) => Ok(Some(s.to_string())),
            Err(e) => Err(AppError::Codec(format!("Bytes cannot be UTF-8 decoded: {}", e))),
        }
    }
}

/// Stores a value as the UTF-8 bytes of its `Display` form and parses it back with `FromStr`.
pub struct StringBased<T>(PhantomData<fn() -> T>);

impl<T> StringBased<T> {
    pub fn new() -> Self {
        StringBased(PhantomData)
    }
}

impl<T> Default for StringBased<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TypeMapping<T> for StringBased<T>
where
    T: Display + FromStr,
    T::Err: Display,
{
    fn to_bytes(&self, value: &T) -> Result<Vec<u8>, AppError> {
        Utf8.to_bytes(&value.to_string())
    }

    fn from_bytes(&self, bytes: &[u8]) -> Result<Option<T>, AppError> {
        match Utf8.from_bytes(bytes)? {
            None => Ok(None),
            Some(s) => s
                .parse::<T>()
                .map(Some)
                .map_err(|e| AppError::Codec(format!("'{}' is not a valid {}: {}", s, type_name::<T>(), e))),
        }
    }
}

/// Opaque binary fallback backed by bincode, used only for types registered for it.
pub struct Opaque<T>(PhantomData<fn() -> T>);

impl<T> Opaque<T> {
    pub fn new() -> Self {
        Opaque(PhantomData)
    }
}

impl<T> Default for Opaque<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TypeMapping<T> for Opaque<T>
where
    T: Serialize + DeserializeOwned,
{
    fn to_bytes(&self, value: &T) -> Result<Vec<u8>, AppError> {
        Ok(bincode::serialize(value)?)
    }

    fn from_bytes(&self, bytes: &[u8]) -> Result<Option<T>, AppError> {
        if bytes.is_empty() {
            return Ok(None);
        }
        Ok(Some(bincode::deserialize::<T>(bytes)?))
    }
}

/// Type-erased view of a [`TypeMapping`], keyed in the registry by `TypeId`.
pub(crate) trait ErasedMapping: Send + Sync {
    fn type_name(&self) -> &'static str;
    fn encode(&self, value: &dyn Any) -> Result<Vec<u8>, AppError>;
    fn decode(&self, bytes: &[u8]) -> Result<Option<Box<dyn Any>>, AppError>;
}

pub(crate) struct Erased<T, M> {
    mapping: M,
    _marker: PhantomData<fn() -> T>,
}

impl<T, M> Erased<T, M> {
    pub(crate) fn new(mapping: M) -> Self {
        Erased { mapping, _marker: PhantomData }
    }
}

impl<T, M> ErasedMapping for Erased<T, M>
where
    T: Any,
    M: TypeMapping<T>,
{
    fn type_name(&self) -> &'static str {
        type_name::<T>()
    }

    fn encode(&self, value: &dyn Any) -> Result<Vec<u8>, AppError> {
        match value.downcast_ref::<T>() {
            Some(v) => self.mapping.to_bytes(v),
            None => Err(AppError::unmappable(format!("mapping for {} received a value of another type", type_name::<T>()))),
        }
    }

    fn decode(&self, bytes: &[u8]) -> Result<Option<Box<dyn Any>>, AppError> {
        Ok(self.mapping.from_bytes(bytes)?.map(|v| Box::new(v) as Box<dyn Any>))
    }
}
