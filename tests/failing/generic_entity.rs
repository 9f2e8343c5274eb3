use supercol::*;

#[derive(Default, Entity)]
#[entity(column_family = "Standard1")]
struct Wrapper<T: Default + 'static> {
    #[key]
    id: String,
    inner: T,
}

fn main() {}
