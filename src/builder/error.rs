//! Build errors for catalogs and engines.

use crate::validation::ConfigError;
use thiserror::Error;

/// Errors that can occur when building catalogs and engines.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Template '{template}' declares no states")]
    EmptyTemplate { template: String },

    #[error("Template '{name}' is not defined in the catalog document")]
    UnknownTemplate { name: String },

    #[error("Template '{name}' contains itself")]
    RecursiveTemplate { name: String },

    #[error("Catalog document could not be parsed: {0}")]
    Document(String),

    #[error("Invalid catalog: {}", summarize(.violations))]
    InvalidCatalog { violations: Vec<ConfigError> },
}

impl BuildError {
    /// Every configuration violation behind this error, in catalog order.
    pub fn violations(&self) -> &[ConfigError] {
        match self {
            Self::InvalidCatalog { violations } => violations,
            _ => &[],
        }
    }

    /// The first configuration violation found, if any.
    pub fn primary(&self) -> Option<&ConfigError> {
        self.violations().first()
    }
}

impl From<ConfigError> for BuildError {
    fn from(error: ConfigError) -> Self {
        Self::InvalidCatalog {
            violations: vec![error],
        }
    }
}

fn summarize(violations: &[ConfigError]) -> String {
    match violations {
        [] => "no violations recorded".to_string(),
        [only] => only.to_string(),
        [first, rest @ ..] => format!("{first} (and {} more)", rest.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CatalogId;

    #[test]
    fn display_reports_first_violation_and_count() {
        let error = BuildError::InvalidCatalog {
            violations: vec![
                ConfigError::MissingInitialState {
                    catalog: CatalogId::new("Main", 0),
                },
                ConfigError::MissingInitialState {
                    catalog: CatalogId::new("Sub", 0),
                },
            ],
        };

        assert_eq!(
            error.to_string(),
            "Invalid catalog: Catalog 'Main' has no initial state (and 1 more)"
        );
        assert_eq!(error.violations().len(), 2);
    }

    #[test]
    fn non_catalog_errors_have_no_violations() {
        let error = BuildError::EmptyTemplate {
            template: "Main".into(),
        };
        assert!(error.primary().is_none());
    }
}
