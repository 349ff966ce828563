use crate::foundation::error::{ErrorKind, LoadError, RenderError};
use crate::foundation::text::bounded_message;

/// Node type tag every diagnostic tree carries.
pub const DIAGNOSTIC_NODE_TYPE: &str = "diagnostic";

/// Visual tree returned by a scene's entry, handed unmodified to the external renderer.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct VisualTree(pub serde_json::Value);

impl VisualTree {
    /// Borrow the underlying JSON value.
    pub fn as_json(&self) -> &serde_json::Value {
        &self.0
    }

    /// Consume into the underlying JSON value.
    pub fn into_json(self) -> serde_json::Value {
        self.0
    }
}

/// Fallback output produced for any failure class.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DiagnosticScene {
    /// Failure class.
    pub kind: ErrorKind,
    /// Bounded, display-safe message.
    pub message: String,
    /// Scene the failure belongs to.
    pub scene_id: String,
    /// Frame being rendered, for render-time failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame: Option<u64>,
    /// Blacklist label, for validation failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Capability names the scene may use. Filled on validation failures.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub available_capabilities: Vec<String>,
}

impl DiagnosticScene {
    /// Diagnostic for a failed load.
    ///
    /// `capabilities` is attached only for validation rejections, so the generator can self-correct.
    pub fn from_load_error(scene_id: &str, err: &LoadError, capabilities: &[&str]) -> Self {
        let (pattern, available_capabilities) = match err {
            LoadError::ValidationRejected { pattern, .. } => (
                Some(pattern.clone()),
                capabilities.iter().map(|s| (*s).to_owned()).collect(),
            ),
            _ => (None, Vec::new()),
        };
        Self {
            kind: err.kind(),
            message: bounded_message(&err.to_string()),
            scene_id: scene_id.to_owned(),
            frame: None,
            pattern,
            available_capabilities,
        }
    }

    /// Diagnostic for a failed render call.
    pub fn from_render_error(scene_id: &str, err: &RenderError) -> Self {
        Self {
            kind: ErrorKind::RuntimeError,
            message: bounded_message(&err.to_string()),
            scene_id: scene_id.to_owned(),
            frame: Some(err.frame()),
            pattern: None,
            available_capabilities: Vec::new(),
        }
    }

    /// Fixed-structure tree: `{"type": "diagnostic", "props": {...}, "children": []}`.
    pub fn to_tree(&self) -> VisualTree {
        let mut props = serde_json::Map::new();
        props.insert("kind".into(), self.kind.label().into());
        props.insert("message".into(), self.message.clone().into());
        props.insert("scene_id".into(), self.scene_id.clone().into());
        if let Some(frame) = self.frame {
            props.insert("frame".into(), frame.into());
        }
        if let Some(pattern) = &self.pattern {
            props.insert("pattern".into(), pattern.clone().into());
        }
        if !self.available_capabilities.is_empty() {
            props.insert(
                "available_capabilities".into(),
                self.available_capabilities.clone().into(),
            );
        }
        VisualTree(serde_json::json!({
            "type": DIAGNOSTIC_NODE_TYPE,
            "props": props,
            "children": [],
        }))
    }
}

/// Result of one supervised render: the scene's tree, or a diagnostic in its place.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "status", content = "output", rename_all = "snake_case")]
pub enum VisualOutput {
    /// The entry returned successfully.
    Tree(VisualTree),
    /// Some stage failed.
    Diagnostic(DiagnosticScene),
}

impl VisualOutput {
    /// Return `true` for [`VisualOutput::Diagnostic`].
    pub fn is_diagnostic(&self) -> bool {
        matches!(self, Self::Diagnostic(_))
    }

    /// The diagnostic, if any.
    pub fn diagnostic(&self) -> Option<&DiagnosticScene> {
        match self {
            Self::Diagnostic(d) => Some(d),
            Self::Tree(_) => None,
        }
    }

    /// Renderer-facing tree; diagnostics are converted with [`DiagnosticScene::to_tree`].
    pub fn into_tree(self) -> VisualTree {
        match self {
            Self::Tree(t) => t,
            Self::Diagnostic(d) => d.to_tree(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/visual.rs"]
mod tests;
