#![allow(warnings)]
use supercol::*;

#[derive(Debug, Clone, Copy, Default, PartialEq, NamedEnum)]
enum UserType {
    #[variant(name = "ADMIN")]
    Admin,
    #[default]
    Guest,
}

#[derive(Debug, Default, Entity)]
#[entity(column_family = "Super1")]
struct User {
    #[key]
    id: String,
    #[super_column]
    username: String,
    #[column(name = "type")]
    user_type: UserType,
}

fn main() {
    let schema = User::schema().unwrap();
    assert_eq!(schema.kind(), SchemaKind::Super);
    assert_eq!(schema.super_column().map(|p| p.name()), Some("username"));
    assert_eq!(schema.column_names(), &["type"]);
    assert_eq!(UserType::Admin.name(), "ADMIN");
    assert_eq!(UserType::from_name("Guest"), Some(UserType::Guest));
    assert!(CodecRegistry::with_defaults().is_named_enum(std::any::TypeId::of::<UserType>()));
}
