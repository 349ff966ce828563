use crate::foundation::error::{MotionError, MotionResult};
use std::collections::BTreeMap;

/// Named colors handed to scene code as its `colors` argument.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ColorTheme(pub BTreeMap<String, String>);

impl ColorTheme {
    /// Look up a color by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Set or replace a color.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }
}

impl Default for ColorTheme {
    fn default() -> Self {
        let entries = [
            ("background", "#0f172a"),
            ("surface", "#1e293b"),
            ("primary", "#38bdf8"),
            ("secondary", "#a78bfa"),
            ("accent", "#f59e0b"),
            ("text", "#f8fafc"),
            ("muted", "#94a3b8"),
        ];
        Self(
            entries
                .into_iter()
                .map(|(k, v)| (k.to_owned(), v.to_owned()))
                .collect(),
        )
    }
}

/// Generator-supplied scene: source text plus the parameters it was written for.
///
/// Immutable once received; every derived artifact (factory, diagnostics) is keyed by its content.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SceneSource {
    /// Scene identifier, used in logs and diagnostics.
    pub id: String,
    /// Scene code. Must define `fn render(props, colors, animations, layout)`.
    pub code: String,
    /// Declared props, passed to `render` unless a call overrides them.
    #[serde(default = "empty_object")]
    pub props: serde_json::Value,
    /// Color theme passed to `render`.
    #[serde(default)]
    pub colors: ColorTheme,
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

impl SceneSource {
    /// Source with no declared props and the default theme.
    pub fn new(id: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            code: code.into(),
            props: empty_object(),
            colors: ColorTheme::default(),
        }
    }

    /// Replace the declared props.
    pub fn with_props(mut self, props: serde_json::Value) -> Self {
        self.props = props;
        self
    }

    /// Replace the color theme.
    pub fn with_colors(mut self, colors: ColorTheme) -> Self {
        self.colors = colors;
        self
    }

    /// Parse a source from JSON.
    pub fn from_json(s: &str) -> MotionResult<Self> {
        let source: Self = serde_json::from_str(s).map_err(|e| MotionError::serde(e.to_string()))?;
        source.validate()?;
        Ok(source)
    }

    /// Structural checks that do not look at the code.
    pub fn validate(&self) -> MotionResult<()> {
        if self.id.trim().is_empty() {
            return Err(MotionError::validation("scene id must be non-empty"));
        }
        if !(self.props.is_object() || self.props.is_null()) {
            return Err(MotionError::validation("scene props must be a JSON object"));
        }
        Ok(())
    }
}

/// Shallow-merge `overrides` on top of `declared`.
///
/// `null` overrides keep the declared props; non-object overrides replace them wholesale.
pub fn merge_props(declared: &serde_json::Value, overrides: &serde_json::Value) -> serde_json::Value {
    match (declared, overrides) {
        (_, serde_json::Value::Null) => declared.clone(),
        (serde_json::Value::Object(base), serde_json::Value::Object(top)) => {
            let mut out = base.clone();
            for (k, v) in top {
                out.insert(k.clone(), v.clone());
            }
            serde_json::Value::Object(out)
        }
        _ => overrides.clone(),
    }
}
