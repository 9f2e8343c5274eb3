#![allow(warnings)]
use supercol::*;

#[derive(Debug, Default, Entity)]
#[entity(keyspace = "Keyspace1", column_family = "Standard1")]
struct Person {
    #[key]
    id: String,
    name: String,
    age: i32,
}

fn main() {
    let schema = Person::schema().unwrap();
    assert_eq!(schema.kind(), SchemaKind::Structured);
    assert_eq!(schema.key().name(), "id");
    assert_eq!(schema.column_names(), &["name", "age"]);
    assert_eq!(schema.meta().keyspace.as_deref(), Some("Keyspace1"));
}
