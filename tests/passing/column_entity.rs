#![allow(warnings)]
use supercol::*;

#[derive(Debug, Default, Entity)]
#[entity(keyspace = "Social", column_family = "Following", secondary_column_family = "Followers", consistency = "dc_quorum")]
struct Follow {
    #[key]
    follower: String,
    #[column_name]
    followee: String,
}

#[derive(Debug, Default, Entity)]
#[entity(column_family = "Ratings")]
struct Rating {
    #[key]
    user: String,
    #[column_name]
    movie: String,
    #[value]
    stars: u32,
}

fn main() {
    let follow = Follow::schema().unwrap();
    assert_eq!(follow.kind(), SchemaKind::Column);
    assert_eq!(follow.secondary_column_family(), Some("Followers"));
    assert_eq!(follow.meta().consistency, Some(ConsistencyLevel::DcQuorum));
    assert!(follow.value().is_none());

    let rating = Rating::schema().unwrap();
    assert_eq!(rating.value().map(|p| p.name()), Some("stars"));
    assert!(rating.column_names().is_empty());
}
