#![allow(warnings)]
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use supercol::*;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct Dimensions {
    width: u32,
    height: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Entity)]
#[entity(keyspace = "Keyspace1", column_family = "Images")]
struct Image {
    #[key]
    id: String,
    size: Option<Dimensions>,
}

fn main() {
    let factory = DaoFactory::with_config("localhost", 9160).registry(CodecRegistry::builder().opaque::<Dimensions>().build());
    let dao = factory.make_dao::<Image>(Arc::new(MemoryStore::new())).unwrap();
    let image = Image { id: "i1".to_string(), size: Some(Dimensions { width: 640, height: 480 }) };
    dao.insert(&image).unwrap();
    assert_eq!(dao.get("i1").unwrap(), Some(image));
}
