use supercol::*;

#[derive(Default, Entity)]
#[entity(column_family = "Standard1")]
struct Indexed {
    #[key]
    id: String,
    #[column(indexed)]
    name: String,
}

fn main() {}
