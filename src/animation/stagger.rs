/// Multiplier for the deterministic per-index hash.
const HASH_K: f64 = 12.9898;

/// Order in which a batch of items starts a shared animation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaggerPattern {
    /// Item `i` waits `i` steps.
    #[default]
    Sequential,
    /// Items wait by their distance from the middle index, so the center starts first.
    FromCenter,
    /// Items wait by a fixed hash of their index. Never a true random source.
    Random,
}

impl StaggerPattern {
    /// Parse the names scene code uses.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "sequential" | "linear" => Some(Self::Sequential),
            "from_center" | "center" => Some(Self::FromCenter),
            "random" => Some(Self::Random),
            _ => None,
        }
    }
}

/// Delay offset, in steps, for item `index` of `count`.
pub fn stagger_offset(index: usize, count: usize, pattern: StaggerPattern) -> f64 {
    let i = index as f64;
    match pattern {
        StaggerPattern::Sequential => i,
        StaggerPattern::FromCenter => {
            let mid = count.saturating_sub(1) as f64 / 2.0;
            (i - mid).abs()
        }
        StaggerPattern::Random => {
            let h = (i * HASH_K).sin() * 0.5 + 0.5;
            h * count.saturating_sub(1) as f64
        }
    }
}

/// Delay in frames: [`stagger_offset`] scaled by `step_frames`.
pub fn stagger_delay(index: usize, count: usize, pattern: StaggerPattern, step_frames: f64) -> f64 {
    stagger_offset(index, count, pattern) * step_frames
}
