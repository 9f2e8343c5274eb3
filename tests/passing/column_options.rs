#![allow(warnings)]
use supercol::*;

#[derive(Debug, Default, Entity)]
#[entity(column_family = "Documents")]
struct Document {
    #[key]
    r#id: String,
    #[column(name = "body_text")]
    body: String,
    #[column(read_only)]
    revision: u64,
    #[column(write_only)]
    legacy_flag: bool,
    #[transient]
    dirty: bool,
    summary: Option<String>,
    views: Option<i64>,
}

fn main() {
    let schema = Document::schema().unwrap();
    assert_eq!(schema.key().name(), "id");
    assert_eq!(schema.column_names(), &["body_text", "summary", "views"]);
    assert_eq!(schema.fetched_columns(), &["body_text", "legacy_flag", "summary", "views"]);
    assert_eq!(schema.transients(), &["dirty"]);
    assert!(schema.writable("legacy_flag").is_some());
    assert!(schema.writable("revision").is_none());

    let doc = Document { summary: Some("short".to_string()), ..Default::default() };
    let summary = schema.properties().iter().find(|p| p.name() == "summary").unwrap();
    assert_eq!(summary.read(&doc).and_then(|v| v.downcast_ref::<String>()).map(String::as_str), Some("short"));
}
