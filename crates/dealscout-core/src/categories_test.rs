use std::path::Path;

use super::*;

fn category(name: &str, terms: &[&str]) -> SearchCategory {
    SearchCategory {
        name: name.to_string(),
        terms: terms.iter().map(|t| (*t).to_string()).collect(),
    }
}

fn sample_file() -> CategoriesFile {
    CategoriesFile {
        categories: vec![
            category("Gaming", &["nintendo nes games", "gameboy games"]),
            category("Consoles", &["nintendo nes console", "atari 2600"]),
        ],
    }
}

#[test]
fn resolve_term_uses_custom_category() {
    let terms = sample_file()
        .resolve(&SearchScope::Term("  sega saturn ".to_string()))
        .unwrap();
    assert_eq!(
        terms,
        vec![SearchTerm {
            category: CUSTOM_CATEGORY.to_string(),
            term: "sega saturn".to_string(),
        }]
    );
}

#[test]
fn resolve_blank_term_fails() {
    let err = sample_file()
        .resolve(&SearchScope::Term("   ".to_string()))
        .unwrap_err();
    assert!(matches!(err, CoreError::EmptySearchTerm));
}

#[test]
fn resolve_category_is_case_insensitive() {
    let terms = sample_file()
        .resolve(&SearchScope::Category("consoles".to_string()))
        .unwrap();
    assert_eq!(terms.len(), 2);
    assert!(terms.iter().all(|t| t.category == "Consoles"));
    assert_eq!(terms[0].term, "nintendo nes console");
}

#[test]
fn resolve_unknown_category_fails() {
    let err = sample_file()
        .resolve(&SearchScope::Category("Furniture".to_string()))
        .unwrap_err();
    assert!(matches!(err, CoreError::UnknownCategory(ref c) if c == "Furniture"));
}

#[test]
fn resolve_all_preserves_file_order() {
    let terms = sample_file().resolve(&SearchScope::All).unwrap();
    let flat: Vec<&str> = terms.iter().map(|t| t.term.as_str()).collect();
    assert_eq!(
        flat,
        vec![
            "nintendo nes games",
            "gameboy games",
            "nintendo nes console",
            "atari 2600"
        ]
    );
}

#[test]
fn validate_rejects_empty_name() {
    let file = CategoriesFile {
        categories: vec![category("  ", &["retro toys"])],
    };
    let err = validate_categories(&file).unwrap_err();
    assert!(err.to_string().contains("non-empty"));
}

#[test]
fn validate_rejects_duplicate_name() {
    let file = CategoriesFile {
        categories: vec![
            category("Gaming", &["gameboy games"]),
            category("gaming", &["sega genesis games"]),
        ],
    };
    let err = validate_categories(&file).unwrap_err();
    assert!(err.to_string().contains("duplicate category name"));
}

#[test]
fn validate_rejects_reserved_name() {
    let file = CategoriesFile {
        categories: vec![category("custom", &["anything"])],
    };
    let err = validate_categories(&file).unwrap_err();
    assert!(err.to_string().contains("reserved"));
}

#[test]
fn validate_rejects_category_without_terms() {
    let file = CategoriesFile {
        categories: vec![category("Other", &[])],
    };
    let err = validate_categories(&file).unwrap_err();
    assert!(err.to_string().contains("no search terms"));
}

#[test]
fn validate_rejects_blank_term() {
    let file = CategoriesFile {
        categories: vec![category("Other", &["retro clothing", " "])],
    };
    let err = validate_categories(&file).unwrap_err();
    assert!(err.to_string().contains("blank search term"));
}

#[test]
fn validate_rejects_empty_file() {
    let file = CategoriesFile { categories: vec![] };
    assert!(validate_categories(&file).is_err());
}

#[test]
fn load_categories_from_real_file() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("config")
        .join("categories.yaml");
    assert!(
        path.exists(),
        "categories.yaml missing at {path:?}; required for this test"
    );
    let result = load_categories(&path);
    assert!(result.is_ok(), "failed to load categories.yaml: {result:?}");
    let file = result.unwrap();
    assert_eq!(file.categories.len(), 4);
    assert!(file.find("Consoles").is_some());
}

#[test]
fn load_categories_reports_missing_file() {
    let err = load_categories(Path::new("/nonexistent/categories.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::CategoriesFileIo { .. }));
}
