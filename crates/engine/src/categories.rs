//! Category configuration.
//!
//! The set of income and expense categories is loaded once, before any
//! request is served, and handed to the engine builder. Transactions may use
//! any configured category; budgets only expense categories.

use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

pub const FALLBACK_COLOR: &str = "#000000";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    #[serde(default = "fallback_color")]
    pub color: String,
}

fn fallback_color() -> String {
    FALLBACK_COLOR.to_string()
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryConfig {
    #[serde(default)]
    pub income: Vec<Category>,
    #[serde(default)]
    pub expense: Vec<Category>,
}

impl Default for CategoryConfig {
    fn default() -> Self {
        let category = |name: &str, color: &str| Category {
            name: name.to_string(),
            color: color.to_string(),
        };
        Self {
            income: vec![
                category("Salary", "#2e7d32"),
                category("House Rental income", "#00897b"),
                category("Other", "#757575"),
            ],
            expense: vec![
                category("Food", "#e53935"),
                category("Transport", "#1e88e5"),
                category("Shopping", "#fb8c00"),
                category("Other", "#757575"),
            ],
        }
    }
}

impl CategoryConfig {
    pub fn from_json(raw: &str) -> ResultEngine<Self> {
        let config: Self = serde_json::from_str(raw)
            .map_err(|err| EngineError::Validation(format!("invalid category file: {err}")))?;
        if config.income.is_empty() && config.expense.is_empty() {
            return Err(EngineError::Validation(
                "category file defines no categories".to_string(),
            ));
        }
        Ok(config)
    }

    pub fn from_file(path: &str) -> ResultEngine<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|err| EngineError::Internal(format!("cannot read {path}: {err}")))?;
        Self::from_json(&raw)
    }

    pub async fn from_url(url: &str) -> ResultEngine<Self> {
        let response = reqwest::get(url)
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|err| EngineError::Internal(format!("cannot fetch categories: {err}")))?;
        let raw = response
            .text()
            .await
            .map_err(|err| EngineError::Internal(format!("cannot read categories: {err}")))?;
        Self::from_json(&raw)
    }

    /// Every category name a transaction may carry, income first, without
    /// duplicates.
    pub fn transaction_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for category in self.income.iter().chain(self.expense.iter()) {
            if !names.contains(&category.name) {
                names.push(category.name.clone());
            }
        }
        names
    }

    pub fn expense_names(&self) -> Vec<String> {
        self.expense.iter().map(|c| c.name.clone()).collect()
    }

    /// Display colour for a category; expense colours win over income ones.
    pub fn color_of(&self, name: &str) -> &str {
        self.expense
            .iter()
            .chain(self.income.iter())
            .find(|c| c.name == name)
            .map_or(FALLBACK_COLOR, |c| c.color.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_names_are_deduplicated() {
        let config = CategoryConfig::default();
        let names = config.transaction_names();
        assert_eq!(names.iter().filter(|n| n.as_str() == "Other").count(), 1);
        assert!(names.contains(&"Salary".to_string()));
        assert!(names.contains(&"Food".to_string()));
        assert!(!config.expense_names().contains(&"Salary".to_string()));
    }

    #[test]
    fn parses_file_shape_and_defaults_color() {
        let config = CategoryConfig::from_json(
            r##"{"income":[{"name":"Salary","color":"#00ff00"}],"expense":[{"name":"Food"}]}"##,
        )
        .unwrap();
        assert_eq!(config.color_of("Salary"), "#00ff00");
        assert_eq!(config.color_of("Food"), FALLBACK_COLOR);
        assert_eq!(config.color_of("Unknown"), FALLBACK_COLOR);
    }

    #[test]
    fn rejects_empty_configuration() {
        assert!(matches!(
            CategoryConfig::from_json("{}"),
            Err(EngineError::Validation(_))
        ));
    }
}
