use crate::converter::TypeConverter;
use crate::error::AppError;
use crate::marshalled::MarshalledRecord;
use crate::schema::{BeanSchema, Role};

/// Current wall-clock time in milliseconds, the write timestamp of every insert.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Converts one record into its row form.
///
/// The key property becomes the row key, the super column property (if any) the
/// super column name, and every other persisted property a column named after it.
pub fn marshal<T>(record: &T, schema: &BeanSchema<T>, converter: &TypeConverter) -> Result<MarshalledRecord, AppError> {
    let mut marshalled = MarshalledRecord::new();
    for property in schema.properties() {
        let bytes = converter.to_bytes(property.value_type(), property.read(record))?;
        match property.role() {
            Role::Key => marshalled.set_key(bytes),
            Role::SuperColumn => {
                if bytes.is_empty() {
                    return Err(AppError::MissingKey(format!(
                        "super column property {} of {} is empty",
                        property.name(),
                        schema.type_name()
                    )));
                }
                marshalled.set_super_column(bytes)
            }
            Role::Column => marshalled.add_column(property.name(), bytes)?,
            Role::ColumnName | Role::Value | Role::Transient => {}
        }
    }
    if marshalled.key().is_err() {
        return Err(AppError::MissingKey(format!("key property {} of {} is empty", schema.key().name(), schema.type_name())));
    }
    Ok(marshalled)
}

/// Single column written by a column bean.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarshalledColumn {
    pub key: String,
    pub name: Vec<u8>,
    pub value: Vec<u8>,
}

/// Converts a column bean: the column name comes from the column property, the
/// value from the value property or, without one, from `timestamp`.
pub fn marshal_column<T>(record: &T, schema: &BeanSchema<T>, converter: &TypeConverter, timestamp: i64) -> Result<MarshalledColumn, AppError> {
    let key_property = schema.key();
    let key = converter.to_bytes(key_property.value_type(), key_property.read(record))?;
    if key.is_empty() {
        return Err(AppError::MissingKey(format!("key property {} of {} is empty", key_property.name(), schema.type_name())));
    }
    let key = String::from_utf8(key).map_err(|e| AppError::Codec(format!("row key is not valid UTF-8: {}", e)))?;

    let column_property = schema
        .column()
        .ok_or_else(|| AppError::configuration(format!("{} has no column name property", schema.type_name())))?;
    let name = converter.to_bytes(column_property.value_type(), column_property.read(record))?;
    if name.is_empty() {
        return Err(AppError::MissingKey(format!("column property {} of {} is empty", column_property.name(), schema.type_name())));
    }

    let value = match schema.value() {
        Some(value_property) => converter.to_bytes(value_property.value_type(), value_property.read(record))?,
        None => converter.encode(&timestamp)?,
    };
    Ok(MarshalledColumn { key, name, value })
}
