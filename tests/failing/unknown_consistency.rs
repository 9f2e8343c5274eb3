use supercol::*;

#[derive(Default, Entity)]
#[entity(column_family = "Standard1", consistency = "eventually")]
struct Loose {
    #[key]
    id: String,
}

fn main() {}
