use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{ConfigError, CoreError};

/// Category assigned to ad-hoc terms entered on the command line.
pub const CUSTOM_CATEGORY: &str = "Custom";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchCategory {
    pub name: String,
    pub terms: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoriesFile {
    pub categories: Vec<SearchCategory>,
}

/// What a search invocation covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchScope {
    /// A single user-entered term.
    Term(String),
    /// Every term configured under one category.
    Category(String),
    /// Every term across all categories.
    All,
}

impl std::fmt::Display for SearchScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchScope::Term(term) => write!(f, "term:{term}"),
            SearchScope::Category(name) => write!(f, "category:{name}"),
            SearchScope::All => write!(f, "all"),
        }
    }
}

/// One term to query, with the category it is tagged under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerm {
    pub category: String,
    pub term: String,
}

impl CategoriesFile {
    /// Looks up a category by name, ignoring ASCII case.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&SearchCategory> {
        self.categories
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name.trim()))
    }

    /// Expands a scope into the ordered list of terms to query.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EmptySearchTerm`] for a blank ad-hoc term and
    /// [`CoreError::UnknownCategory`] when the category is not configured.
    pub fn resolve(&self, scope: &SearchScope) -> Result<Vec<SearchTerm>, CoreError> {
        match scope {
            SearchScope::Term(term) => {
                let term = term.trim();
                if term.is_empty() {
                    return Err(CoreError::EmptySearchTerm);
                }
                Ok(vec![SearchTerm {
                    category: CUSTOM_CATEGORY.to_string(),
                    term: term.to_string(),
                }])
            }
            SearchScope::Category(name) => {
                let category = self
                    .find(name)
                    .ok_or_else(|| CoreError::UnknownCategory(name.clone()))?;
                Ok(expand(category))
            }
            SearchScope::All => Ok(self.categories.iter().flat_map(expand).collect()),
        }
    }
}

fn expand(category: &SearchCategory) -> Vec<SearchTerm> {
    category
        .terms
        .iter()
        .map(|term| SearchTerm {
            category: category.name.clone(),
            term: term.clone(),
        })
        .collect()
}

/// Load and validate the search categories from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_categories(path: &Path) -> Result<CategoriesFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::CategoriesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let categories_file: CategoriesFile =
        serde_yaml::from_str(&content).map_err(ConfigError::CategoriesFileParse)?;

    validate_categories(&categories_file)?;

    Ok(categories_file)
}

fn validate_categories(categories_file: &CategoriesFile) -> Result<(), ConfigError> {
    if categories_file.categories.is_empty() {
        return Err(ConfigError::Validation(
            "at least one category must be configured".to_string(),
        ));
    }

    let mut seen_names = HashSet::new();

    for category in &categories_file.categories {
        if category.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "category name must be non-empty".to_string(),
            ));
        }

        if category.name.eq_ignore_ascii_case(CUSTOM_CATEGORY) {
            return Err(ConfigError::Validation(format!(
                "category name '{CUSTOM_CATEGORY}' is reserved for ad-hoc terms"
            )));
        }

        if !seen_names.insert(category.name.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate category name: '{}'",
                category.name
            )));
        }

        if category.terms.is_empty() {
            return Err(ConfigError::Validation(format!(
                "category '{}' has no search terms",
                category.name
            )));
        }

        if category.terms.iter().any(|t| t.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "category '{}' contains a blank search term",
                category.name
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "categories_test.rs"]
mod tests;
