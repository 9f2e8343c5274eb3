use supercol::*;

#[derive(NamedEnum)]
enum Shape {
    Point,
    Circle(u32),
}

fn main() {}
