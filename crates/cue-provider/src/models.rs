//! Model descriptors and the built-in catalog.

use crate::types::OutputKind;
use serde::{Deserialize, Serialize};

/// A selectable backend model.
///
/// Custom entries are supplied by the user as JSON, e.g.
/// `[{ "name": "model A", "endpoint": "https://closedai.example/v1/completions",
/// "displayName": "model A", "model": "model-001" }]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    /// Model identifier.
    pub name: String,
    /// Label shown in the menu. Falls back to `name` when empty.
    #[serde(rename = "displayName", alias = "display_name", default)]
    pub display_name: String,
    /// Endpoint override for this model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Wire model id, when it differs from `name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Output kind this model serves.
    #[serde(default)]
    pub kind: OutputKind,
}

impl ModelDescriptor {
    fn builtin(name: &str, display_name: &str, kind: OutputKind) -> Self {
        Self {
            name: name.to_string(),
            display_name: display_name.to_string(),
            endpoint: None,
            model: None,
            kind,
        }
    }

    /// Label for display.
    pub fn label(&self) -> &str {
        if self.display_name.is_empty() {
            &self.name
        } else {
            &self.display_name
        }
    }

    /// Model id sent in the request body.
    pub fn wire_model(&self) -> &str {
        self.model.as_deref().unwrap_or(&self.name)
    }
}

/// Built-in models followed by user-supplied ones.
#[derive(Debug, Clone)]
pub struct ModelCatalog {
    models: Vec<ModelDescriptor>,
}

impl ModelCatalog {
    /// Built-in models only.
    pub fn builtin() -> Self {
        Self {
            models: vec![
                ModelDescriptor::builtin("gpt-3.5-turbo-instruct", "GPT-3.5 Instruct", OutputKind::Text),
                ModelDescriptor::builtin("davinci-002", "Davinci", OutputKind::Text),
                ModelDescriptor::builtin("gpt-3.5-turbo", "GPT-3.5 Turbo", OutputKind::Chat),
                ModelDescriptor::builtin("gpt-4o-mini", "GPT-4o mini", OutputKind::Chat),
                ModelDescriptor::builtin("dall-e-2", "DALL-E 2", OutputKind::Image),
                ModelDescriptor::builtin("dall-e-3", "DALL-E 3", OutputKind::Image),
            ],
        }
    }

    /// Built-in models concatenated with `custom`.
    pub fn with_custom(custom: &[ModelDescriptor]) -> Self {
        let mut catalog = Self::builtin();
        catalog.models.extend(custom.iter().cloned());
        catalog
    }

    /// Models serving `kind`, in catalog order.
    pub fn for_kind(&self, kind: OutputKind) -> Vec<&ModelDescriptor> {
        self.models.iter().filter(|m| m.kind == kind).collect()
    }

    /// All models.
    pub fn all(&self) -> &[ModelDescriptor] {
        &self.models
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl Default for ModelCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_partitions() {
        let catalog = ModelCatalog::builtin();
        assert_eq!(catalog.for_kind(OutputKind::Text).len(), 2);
        assert_eq!(catalog.for_kind(OutputKind::Chat).len(), 2);
        assert!(catalog
            .for_kind(OutputKind::Image)
            .iter()
            .all(|m| m.name.starts_with("dall-e")));
    }

    #[test]
    fn test_custom_appended_after_builtin() {
        let custom: Vec<ModelDescriptor> = serde_json::from_str(
            r#"[{ "name": "model A", "endpoint": "https://closedai.example/v1/completions", "displayName": "Model A", "model": "model-001" }]"#,
        )
        .unwrap();
        let catalog = ModelCatalog::with_custom(&custom);
        let text = catalog.for_kind(OutputKind::Text);
        assert_eq!(text.len(), 3);
        assert_eq!(text[2].label(), "Model A");
        assert_eq!(text[2].wire_model(), "model-001");
        assert_eq!(
            text[2].endpoint.as_deref(),
            Some("https://closedai.example/v1/completions")
        );
    }

    #[test]
    fn test_label_falls_back_to_name() {
        let m: ModelDescriptor = serde_json::from_str(r#"{"name": "bare", "kind": "chat"}"#).unwrap();
        assert_eq!(m.label(), "bare");
        assert_eq!(m.wire_model(), "bare");
        assert_eq!(m.kind, OutputKind::Chat);
    }
}
