//! Convention configuration.
//!
//! Drives the convention-based presenter resolver: which suffixes are
//! stripped from a view's own name, which namespaces are probed beyond the
//! view's own, and which name templates produce candidate presenter names.

mod loader;

pub use loader::ConfigError;

use serde::{Deserialize, Serialize};

/// Naming conventions for presenter resolution.
///
/// Templates use `{namespace}` and `{presenter}` placeholders; candidates
/// are produced namespace-outer, template-inner, per short name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConventionConfig {
    /// Suffixes stripped from a view type's own short name, first match
    /// wins (e.g. "WidgetsView" -> "Widgets").
    pub view_suffixes: Vec<String>,
    /// Namespaces probed before the view's own namespace and its crate
    /// root. Empty by default.
    pub default_namespaces: Vec<String>,
    /// Candidate name templates, tried in order.
    pub templates: Vec<String>,
}

impl Default for ConventionConfig {
    fn default() -> Self {
        Self {
            view_suffixes: vec!["View".to_string(), "Command".to_string()],
            default_namespaces: Vec::new(),
            templates: vec![
                "{namespace}::presenters::{presenter}Presenter".to_string(),
                "{namespace}::{presenter}Presenter".to_string(),
            ],
        }
    }
}

impl ConventionConfig {
    /// Validates the configuration.
    ///
    /// Checks:
    /// - At least one template and one view suffix are present
    /// - Every template contains the `{presenter}` placeholder
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.templates.is_empty() {
            return Err(ConfigError::ValidationError {
                message: "At least one name template must be configured".to_string(),
            });
        }
        if self.view_suffixes.is_empty() {
            return Err(ConfigError::ValidationError {
                message: "At least one view suffix must be configured".to_string(),
            });
        }
        for template in &self.templates {
            if !template.contains("{presenter}") {
                return Err(ConfigError::ValidationError {
                    message: format!(
                        "Template '{}' is missing the {{presenter}} placeholder",
                        template
                    ),
                });
            }
        }
        Ok(())
    }
}
