use crate::codec::{Erased, ErasedMapping, Opaque, StringBased, TypeMapping, Utf8};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Enumeration persisted through its symbolic variant name.
///
/// Usually derived with `#[derive(NamedEnum)]`, which also registers the type
/// so every registry picks it up without further wiring.
pub trait NamedEnum: Sized + 'static {
    fn name(&self) -> &'static str;
    fn from_name(name: &str) -> Option<Self>;
}

/// Type-erased name conversion of one [`NamedEnum`], collected through `inventory`.
#[derive(Clone, Copy)]
pub struct EnumInfo {
    pub type_id: fn() -> TypeId,
    pub type_name: fn() -> &'static str,
    pub name_of: fn(&dyn Any) -> Option<&'static str>,
    pub from_name: fn(&str) -> Option<Box<dyn Any>>,
}

impl EnumInfo {
    pub const fn of<E: NamedEnum>() -> Self {
        EnumInfo {
            type_id: TypeId::of::<E>,
            type_name: type_name::<E>,
            name_of: enum_name_of::<E>,
            from_name: enum_from_name::<E>,
        }
    }
}

inventory::collect!(EnumInfo);

fn enum_name_of<E: NamedEnum>(value: &dyn Any) -> Option<&'static str> {
    value.downcast_ref::<E>().map(E::name)
}

fn enum_from_name<E: NamedEnum>(name: &str) -> Option<Box<dyn Any>> {
    E::from_name(name).map(|e| Box::new(e) as Box<dyn Any>)
}

/// Immutable set of codecs keyed by exact runtime type.
///
/// Built once from the default string-based mappings plus caller overrides (an
/// override replaces the default for the same type) and never mutated afterwards,
/// so one instance can be shared by every DAO and thread.
pub struct CodecRegistry {
    mappings: HashMap<TypeId, Arc<dyn ErasedMapping>>,
    enums: HashMap<TypeId, EnumInfo>,
    opaque: HashMap<TypeId, Arc<dyn ErasedMapping>>,
}

impl CodecRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    pub fn with_defaults() -> Self {
        Self::builder().build()
    }

    pub(crate) fn mapping(&self, type_id: TypeId) -> Option<&dyn ErasedMapping> {
        self.mappings.get(&type_id).map(|m| m.as_ref())
    }

    pub(crate) fn enum_info(&self, type_id: TypeId) -> Option<&EnumInfo> {
        self.enums.get(&type_id)
    }

    pub(crate) fn opaque(&self, type_id: TypeId) -> Option<&dyn ErasedMapping> {
        self.opaque.get(&type_id).map(|m| m.as_ref())
    }

    pub fn has_mapping(&self, type_id: TypeId) -> bool {
        self.mappings.contains_key(&type_id)
    }

    pub fn is_named_enum(&self, type_id: TypeId) -> bool {
        self.enums.contains_key(&type_id)
    }

    pub fn is_opaque(&self, type_id: TypeId) -> bool {
        self.opaque.contains_key(&type_id)
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn erased<T: Any, M: TypeMapping<T> + 'static>(mapping: M) -> (TypeId, Arc<dyn ErasedMapping>) {
    (TypeId::of::<T>(), Arc::new(Erased::<T, M>::new(mapping)))
}

fn default_mappings() -> Vec<(TypeId, Arc<dyn ErasedMapping>)> {
    vec![
        erased::<String, _>(Utf8),
        erased::<i32, _>(StringBased::<i32>::new()),
        erased::<i64, _>(StringBased::<i64>::new()),
        erased::<u32, _>(StringBased::<u32>::new()),
        erased::<u64, _>(StringBased::<u64>::new()),
        erased::<bool, _>(StringBased::<bool>::new()),
        erased::<Uuid, _>(StringBased::<Uuid>::new()),
        erased::<http::Uri, _>(StringBased::<http::Uri>::new()),
    ]
}

#[derive(Default)]
pub struct RegistryBuilder {
    overrides: Vec<(TypeId, Arc<dyn ErasedMapping>)>,
    enums: Vec<EnumInfo>,
    opaque: Vec<(TypeId, Arc<dyn ErasedMapping>)>,
}

impl RegistryBuilder {
    /// Registers `mapping` for `T`, replacing the default one if `T` already has a codec.
    pub fn mapping<T: Any, M: TypeMapping<T> + 'static>(mut self, mapping: M) -> Self {
        self.overrides.push(erased::<T, M>(mapping));
        self
    }

    /// Registers an enumeration that was not derived (derived ones are found automatically).
    pub fn named_enum<E: NamedEnum>(mut self) -> Self {
        self.enums.push(EnumInfo::of::<E>());
        self
    }

    /// Opts `T` into the opaque binary fallback. It is used only while the
    /// `SerializeUnknown` policy of the converter is enabled.
    pub fn opaque<T: Any + Serialize + DeserializeOwned>(mut self) -> Self {
        self.opaque.push(erased::<T, _>(Opaque::<T>::new()));
        self
    }

    pub fn build(self) -> CodecRegistry {
        let mappings: HashMap<TypeId, Arc<dyn ErasedMapping>> =
            default_mappings().into_iter().chain(self.overrides).collect();
        let enums = inventory::iter::<EnumInfo>
            .into_iter()
            .copied()
            .chain(self.enums)
            .map(|info| ((info.type_id)(), info))
            .collect();
        let opaque = self.opaque.into_iter().collect();
        CodecRegistry { mappings, enums, opaque }
    }
}
