use crate::client::{Column, SuperColumn};
use crate::converter::TypeConverter;
use crate::error::AppError;
use crate::schema::{BeanSchema, Property};

fn assign<T>(record: &mut T, property: &Property<T>, bytes: &[u8], converter: &TypeConverter) -> Result<(), AppError> {
    let value = converter.from_bytes(property.value_type(), bytes)?;
    property.write(record, value)
}

fn populate<T>(record: &mut T, columns: &[Column], schema: &BeanSchema<T>, converter: &TypeConverter) -> Result<(), AppError> {
    for column in columns {
        // a name that is not a string can not match any property
        let Ok(name) = converter.bytes_to_string(&column.name) else {
            continue;
        };
        match schema.writable(&name) {
            Some(property) => assign(record, property, &column.value, converter)?,
            None => log::debug!("{}: skipping unknown column {}", schema.type_name(), name),
        }
    }
    Ok(())
}

fn keyed<T: Default>(key: &[u8], schema: &BeanSchema<T>, converter: &TypeConverter) -> Result<T, AppError> {
    let mut record = T::default();
    assign(&mut record, schema.key(), key, converter)?;
    Ok(record)
}

/// Builds one record from the columns of a row. Columns without a matching
/// writable property are ignored.
pub fn unmarshal<T: Default>(key: &[u8], columns: &[Column], schema: &BeanSchema<T>, converter: &TypeConverter) -> Result<T, AppError> {
    let mut record = keyed(key, schema, converter)?;
    populate(&mut record, columns, schema, converter)?;
    Ok(record)
}

/// Builds one record per super column, each populated only from its own group.
pub fn unmarshal_super<T: Default>(
    key: &[u8],
    super_columns: &[SuperColumn],
    schema: &BeanSchema<T>,
    converter: &TypeConverter,
) -> Result<Vec<T>, AppError> {
    let super_property = schema
        .super_column()
        .ok_or_else(|| AppError::configuration(format!("{} has no super column property", schema.type_name())))?;
    super_columns
        .iter()
        .map(|super_column| {
            let mut record = keyed(key, schema, converter)?;
            populate(&mut record, &super_column.columns, schema, converter)?;
            assign(&mut record, super_property, &super_column.name, converter)?;
            Ok(record)
        })
        .collect()
}

/// Builds a column bean from a single column: its name feeds the column
/// property and, when declared, its value feeds the value property.
pub fn unmarshal_column<T: Default>(key: &[u8], column: &Column, schema: &BeanSchema<T>, converter: &TypeConverter) -> Result<T, AppError> {
    let column_property = schema
        .column()
        .ok_or_else(|| AppError::configuration(format!("{} has no column name property", schema.type_name())))?;
    let mut record = keyed(key, schema, converter)?;
    assign(&mut record, column_property, &column.name, converter)?;
    if let Some(value_property) = schema.value() {
        assign(&mut record, value_property, &column.value, converter)?;
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::SerializeUnknown;
    use crate::marshaller::marshal;
    use crate::registry::CodecRegistry;
    use crate::schema::Entity;
    use crate::NamedEnum;
    use std::sync::Arc;
    use uuid::Uuid;

    #[derive(Debug, Clone, Copy, Default, PartialEq, NamedEnum)]
    enum AccountType {
        #[variant(name = "ADMIN")]
        Admin,
        #[default]
        #[variant(name = "GUEST")]
        Guest,
    }

    #[derive(Debug, Default, PartialEq, crate::Entity)]
    #[entity(column_family = "Super1")]
    struct Account {
        #[key]
        id: String,
        #[super_column]
        username: String,
        #[column(name = "type")]
        role: AccountType,
        logins: Option<i64>,
    }

    #[derive(Debug, Clone, Default, PartialEq, crate::Entity)]
    #[entity(column_family = "Standard1")]
    struct Profile {
        #[key]
        id: Uuid,
        name: String,
        age: Option<i32>,
        homepage: Option<http::Uri>,
        verified: bool,
        #[transient]
        cached_rank: u32,
        #[column(write_only)]
        legacy: Option<String>,
    }

    #[derive(Debug, Default, PartialEq, crate::Entity)]
    #[entity(column_family = "Standard1")]
    struct Rating {
        #[key]
        user: String,
        #[column_name]
        movie: String,
        #[value]
        stars: i32,
    }

    fn converter() -> TypeConverter {
        TypeConverter::new(Arc::new(CodecRegistry::with_defaults()), SerializeUnknown::No)
    }

    fn column(name: &str, value: &str) -> Column {
        Column::new(name.as_bytes().to_vec(), value.as_bytes().to_vec(), 1)
    }

    #[test]
    fn test_marshal_unmarshal_identity() {
        let conv = converter();
        let schema = Profile::schema().unwrap();
        let profile = Profile {
            id: Uuid::new_v4(),
            name: "Gute Irische Livemusik".into(),
            age: Some(42),
            homepage: Some("http://www.thiesen.org/".parse().unwrap()),
            verified: true,
            cached_rank: 7,
            legacy: None,
        };
        let marshalled = marshal(&profile, &schema, &conv).unwrap();
        assert!(marshalled.column("cached_rank").is_none());
        assert!(marshalled.column("legacy").is_none());

        let back: Profile = unmarshal(marshalled.key().unwrap(), &marshalled.to_columns(1), &schema, &conv).unwrap();
        assert_eq!(back, Profile { cached_rank: 0, ..profile });
    }

    #[test]
    fn test_unknown_columns_are_skipped() {
        let schema = Profile::schema().unwrap();
        let id = Uuid::new_v4();
        let columns = vec![column("name", "Ann"), column("shoe_size", "44"), Column::new(vec![0xff], b"x".to_vec(), 1)];
        let profile: Profile = unmarshal(id.to_string().as_bytes(), &columns, &schema, &converter()).unwrap();
        assert_eq!(profile.id, id);
        assert_eq!(profile.name, "Ann");
        assert_eq!(profile.age, None);
    }

    #[test]
    fn test_write_only_property_is_populated() {
        let schema = Profile::schema().unwrap();
        let columns = vec![column("legacy", "v1 import")];
        let profile: Profile = unmarshal(Uuid::nil().to_string().as_bytes(), &columns, &schema, &converter()).unwrap();
        assert_eq!(profile.legacy.as_deref(), Some("v1 import"));
    }

    #[test]
    fn test_undecodable_matched_column_fails() {
        let schema = Profile::schema().unwrap();
        let columns = vec![column("age", "forty")];
        let err = unmarshal::<Profile>(Uuid::nil().to_string().as_bytes(), &columns, &schema, &converter()).unwrap_err();
        assert!(matches!(err, AppError::Codec(_)));
    }

    #[test]
    fn test_undecodable_key_fails() {
        let schema = Profile::schema().unwrap();
        let err = unmarshal::<Profile>(b"not-a-uuid", &[], &schema, &converter()).unwrap_err();
        assert!(matches!(err, AppError::Codec(_)));
    }

    #[test]
    fn test_super_columns_group_into_records() {
        let schema = Account::schema().unwrap();
        let slice = vec![
            SuperColumn::new(b"admin".to_vec(), vec![column("type", "ADMIN"), column("logins", "3")]),
            SuperColumn::new(b"guest".to_vec(), vec![column("type", "GUEST")]),
        ];
        let accounts: Vec<Account> = unmarshal_super(b"u1", &slice, &schema, &converter()).unwrap();
        assert_eq!(
            accounts,
            vec![
                Account { id: "u1".into(), username: "admin".into(), role: AccountType::Admin, logins: Some(3) },
                Account { id: "u1".into(), username: "guest".into(), role: AccountType::Guest, logins: None },
            ]
        );
    }

    #[test]
    fn test_unknown_enum_name_fails() {
        let schema = Account::schema().unwrap();
        let slice = vec![SuperColumn::new(b"root".to_vec(), vec![column("type", "ROOT")])];
        let err = unmarshal_super::<Account>(b"u1", &slice, &schema, &converter()).unwrap_err();
        assert!(matches!(err, AppError::UnmappableType(_)));
    }

    #[test]
    fn test_column_bean_from_single_column() {
        let schema = Rating::schema().unwrap();
        let rating: Rating = unmarshal_column(b"ann", &column("Brazil", "5"), &schema, &converter()).unwrap();
        assert_eq!(rating, Rating { user: "ann".into(), movie: "Brazil".into(), stars: 5 });
    }
}
