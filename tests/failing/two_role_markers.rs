use supercol::*;

#[derive(Default, Entity)]
#[entity(column_family = "Standard1")]
struct Ambiguous {
    #[key]
    #[transient]
    id: String,
}

fn main() {}
