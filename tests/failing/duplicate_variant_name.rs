use supercol::*;

#[derive(NamedEnum)]
enum Level {
    #[variant(name = "HIGH")]
    Critical,
    #[variant(name = "HIGH")]
    High,
}

fn main() {}
