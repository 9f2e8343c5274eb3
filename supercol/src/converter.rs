use crate::error::AppError;
use crate::registry::CodecRegistry;
use serde::Deserialize;
use std::any::{type_name, Any, TypeId};
use std::str::FromStr;
use std::sync::Arc;

/// Global switch for the opaque binary fallback.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SerializeUnknown {
    #[default]
    Yes,
    No,
}

impl FromStr for SerializeUnknown {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "yes" | "true" => Ok(SerializeUnknown::Yes),
            "no" | "false" => Ok(SerializeUnknown::No),
            _ => Err(format!("Invalid value for SerializeUnknown: {}", s)),
        }
    }
}

impl<'de> Deserialize<'de> for SerializeUnknown {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        SerializeUnknown::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// Declared type of a property: its `TypeId` plus a readable name for errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeTag {
    pub id: TypeId,
    pub name: &'static str,
}

impl TypeTag {
    pub fn of<T: Any>() -> Self {
        TypeTag { id: TypeId::of::<T>(), name: type_name::<T>() }
    }
}

/// Converts typed values to column bytes and back on top of a [`CodecRegistry`].
///
/// Encoding resolves in this order: absent value, exact codec, named
/// enumeration, opaque fallback (only with [`SerializeUnknown::Yes`] and only
/// for types opted in on the registry). Decoding mirrors it, except that
/// opaque payloads are always readable for opted-in types.
pub struct TypeConverter {
    registry: Arc<CodecRegistry>,
    policy: SerializeUnknown,
}

impl TypeConverter {
    pub fn new(registry: Arc<CodecRegistry>, policy: SerializeUnknown) -> Self {
        TypeConverter { registry, policy }
    }

    pub fn policy(&self) -> SerializeUnknown {
        self.policy
    }

    pub fn registry(&self) -> &CodecRegistry {
        &self.registry
    }

    pub fn to_bytes(&self, declared: &TypeTag, value: Option<&dyn Any>) -> Result<Vec<u8>, AppError> {
        let Some(value) = value else {
            return Ok(Vec::new());
        };
        let runtime_id = Any::type_id(value);
        if let Some(mapping) = self.registry.mapping(runtime_id) {
            return mapping.encode(value);
        }
        if let Some(info) = self.registry.enum_info(runtime_id) {
            return match (info.name_of)(value) {
                Some(name) => Ok(self.string_to_bytes(name)),
                None => Err(AppError::unmappable(format!("{} is not a registered enumeration", declared.name))),
            };
        }
        if self.policy == SerializeUnknown::Yes {
            if let Some(opaque) = self.registry.opaque(runtime_id) {
                return opaque.encode(value);
            }
        }
        Err(AppError::unmappable(format!(
            "Can not map {} instance to bytes, either opt it into opaque serialization or register a type mapping",
            declared.name
        )))
    }

    pub fn from_bytes(&self, target: &TypeTag, bytes: &[u8]) -> Result<Option<Box<dyn Any>>, AppError> {
        if bytes.is_empty() {
            return Ok(None);
        }
        if let Some(mapping) = self.registry.mapping(target.id) {
            return mapping.decode(bytes);
        }
        if let Some(info) = self.registry.enum_info(target.id) {
            let name = self.bytes_to_string(bytes)?;
            return match (info.from_name)(&name) {
                Some(value) => Ok(Some(value)),
                None => Err(AppError::unmappable(format!("'{}' is not a variant of {}", name, target.name))),
            };
        }
        if let Some(opaque) = self.registry.opaque(target.id) {
            return opaque.decode(bytes);
        }
        Err(AppError::unmappable(format!("Can not handle type {}, add a type mapping for it", target.name)))
    }

    pub fn encode<T: Any>(&self, value: &T) -> Result<Vec<u8>, AppError> {
        self.to_bytes(&TypeTag::of::<T>(), Some(value as &dyn Any))
    }

    pub fn decode<T: Any>(&self, bytes: &[u8]) -> Result<Option<T>, AppError> {
        match self.from_bytes(&TypeTag::of::<T>(), bytes)? {
            None => Ok(None),
            Some(boxed) => boxed
                .downcast::<T>()
                .map(|v| Some(*v))
                .map_err(|_| AppError::unmappable(format!("decoded value is not a {}", type_name::<T>()))),
        }
    }

    pub fn string_to_bytes(&self, value: &str) -> Vec<u8> {
        let owned = value.to_string();
        match self.registry.mapping(TypeId::of::<String>()) {
            Some(mapping) => mapping.encode(&owned).unwrap_or_else(|_| owned.into_bytes()),
            None => owned.into_bytes(),
        }
    }

    pub fn bytes_to_string(&self, bytes: &[u8]) -> Result<String, AppError> {
        Ok(self.decode::<String>(bytes)?.unwrap_or_default())
    }
}
