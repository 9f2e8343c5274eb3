use crate::client::Column;
use crate::error::AppError;

/// Flat row form of one record, produced by the marshaller and consumed by the DAO.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarshalledRecord {
    key: Vec<u8>,
    super_column: Option<Vec<u8>>,
    columns: Vec<(String, Vec<u8>)>,
}

impl MarshalledRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_key(&mut self, key: Vec<u8>) {
        self.key = key;
    }

    pub fn set_super_column(&mut self, name: Vec<u8>) {
        self.super_column = Some(name);
    }

    /// Appends a column, failing if one with the same name was already added.
    pub fn add_column(&mut self, name: impl Into<String>, value: Vec<u8>) -> Result<(), AppError> {
        let name = name.into();
        if self.columns.iter().any(|(existing, _)| *existing == name) {
            return Err(AppError::DuplicateColumn(format!("column {} was added twice", name)));
        }
        self.columns.push((name, value));
        Ok(())
    }

    pub fn key(&self) -> Result<&[u8], AppError> {
        if self.key.is_empty() {
            Err(AppError::MissingKey("record has no row key".to_string()))
        } else {
            Ok(&self.key)
        }
    }

    /// Row key as the store addresses it.
    pub fn key_string(&self) -> Result<String, AppError> {
        let key = self.key()?;
        String::from_utf8(key.to_vec()).map_err(|e| AppError::Codec(format!("row key is not valid UTF-8: {}", e)))
    }

    pub fn super_column(&self) -> Option<&[u8]> {
        self.super_column.as_deref()
    }

    pub fn columns(&self) -> &[(String, Vec<u8>)] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&[u8]> {
        self.columns.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_slice())
    }

    /// Store-facing columns, all stamped with the same write time.
    pub fn to_columns(&self, timestamp: i64) -> Vec<Column> {
        self.columns
            .iter()
            .map(|(name, value)| Column::new(name.as_bytes().to_vec(), value.clone(), timestamp))
            .collect()
    }
}
