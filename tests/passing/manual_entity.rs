#![allow(warnings)]
use supercol::*;

#[derive(Debug, Default)]
struct Note {
    id: String,
    text: String,
}

fn get_id(n: &Note) -> Option<&dyn Any> {
    Some(&n.id)
}
fn set_id(n: &mut Note, v: Option<Box<dyn Any>>) -> Result<(), AppError> {
    if let Some(id) = downcast::<String>(v, "id")? {
        n.id = id;
    }
    Ok(())
}
fn get_text(n: &Note) -> Option<&dyn Any> {
    Some(&n.text)
}
fn set_text(n: &mut Note, v: Option<Box<dyn Any>>) -> Result<(), AppError> {
    if let Some(text) = downcast::<String>(v, "text")? {
        n.text = text;
    }
    Ok(())
}

impl Entity for Note {
    fn meta() -> BeanMeta {
        BeanMeta::new("Notes")
    }
    fn properties() -> Vec<Property<Self>> {
        vec![
            Property::read_write::<String>("id", Role::Key, get_id, set_id),
            Property::read_write::<String>("text", Role::Column, get_text, set_text),
        ]
    }
}

fn main() {
    let schema = Note::schema().unwrap();
    assert_eq!(schema.column_family(), "Notes");
    assert_eq!(schema.column_names(), &["text"]);
}
