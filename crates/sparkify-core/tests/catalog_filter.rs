//! Integration tests: catalog search as the sidebar uses it.

use pretty_assertions::assert_eq;
use sparkify_core::catalog::{Catalog, Character, filter_by_name};

fn character(id: &str, name: &str) -> Character {
    Character {
        id: id.to_string(),
        name: name.to_string(),
        image_url: format!("/{id}.png"),
        thumbnail: format!("/{id}.png"),
        poses: vec![],
        expressions: vec![],
    }
}

#[test]
fn filter_is_case_insensitive_and_keeps_order() {
    let entries = vec![
        character("a", "Happy Sparky"),
        character("b", "Cool Sparky"),
        character("c", "Classic Meme"),
    ];
    let names: Vec<&str> = filter_by_name(&entries, "sparky")
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(names, vec!["Happy Sparky", "Cool Sparky"]);

    let names: Vec<&str> = filter_by_name(&entries, "SPARKY")
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(names, vec!["Happy Sparky", "Cool Sparky"]);
}

#[test]
fn filter_recomputes_per_term() {
    let catalog = Catalog::builtin();
    assert_eq!(catalog.filter_backgrounds("background").count(), 3);
    assert_eq!(catalog.filter_backgrounds("2").count(), 1);
    assert_eq!(catalog.filter_memes("background").count(), 0);
    assert_eq!(catalog.filter_characters("spark").count(), 1);
}

#[test]
fn no_match_is_empty_not_error() {
    let catalog = Catalog::builtin();
    assert!(catalog.filter_memes("doge").next().is_none());
}

#[test]
fn catalog_json_roundtrip_keeps_entries() {
    let catalog = Catalog::builtin();
    let json = serde_json::to_string(&catalog).unwrap();
    let parsed = Catalog::from_json(&json).unwrap();
    assert_eq!(parsed, catalog);
}
