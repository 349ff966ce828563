use crate::animation::ease::Easing;
use crate::foundation::error::{MotionError, MotionResult};
use std::collections::HashSet;

/// Lifecycle state of a timeline item at a given frame.
///
/// Always derived from the frame and the item's windows; never stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemState {
    /// `frame < start`.
    NotStarted,
    /// `start <= frame < start + duration`.
    Entering,
    /// Fully shown.
    Visible,
    /// `exit_frame <= frame <= exit_frame + exit_duration`.
    Exiting,
    /// `frame > exit_frame + exit_duration`.
    Gone,
}

impl ItemState {
    /// Whether an item in this state is part of the visible set.
    pub fn is_visible(self) -> bool {
        matches!(self, Self::Entering | Self::Visible | Self::Exiting)
    }

    /// Snake-case label used in script-facing maps.
    pub fn label(self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::Entering => "entering",
            Self::Visible => "visible",
            Self::Exiting => "exiting",
            Self::Gone => "gone",
        }
    }
}

/// Enter/exit presentation of an item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationKind {
    /// Appears and disappears instantly.
    None,
    /// Opacity only.
    #[default]
    Fade,
    /// Fades while moving up into place.
    SlideUp,
    /// Fades while moving down into place.
    SlideDown,
    /// Fades while moving left into place.
    SlideLeft,
    /// Fades while moving right into place.
    SlideRight,
    /// Fades while growing from `scale_from`.
    Scale,
    /// Like `Scale`, with an overshooting back-out curve on entry.
    Pop,
}

impl AnimationKind {
    /// Parse the names scene code uses.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "none" => Some(Self::None),
            "fade" | "fade_in" => Some(Self::Fade),
            "slide_up" | "slide" => Some(Self::SlideUp),
            "slide_down" => Some(Self::SlideDown),
            "slide_left" => Some(Self::SlideLeft),
            "slide_right" => Some(Self::SlideRight),
            "scale" | "zoom" => Some(Self::Scale),
            "pop" => Some(Self::Pop),
            _ => None,
        }
    }
}

/// One scheduled piece of content.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TimelineItem {
    /// Unique item identifier.
    pub id: String,
    /// Opaque reference to the content shown by this item.
    #[serde(default)]
    pub content_ref: String,
    /// First frame of the enter window.
    pub start_frame: u64,
    /// Length of the enter window, in frames.
    pub duration: u64,
    /// Frame at which the exit window begins, if the item ever leaves.
    #[serde(default)]
    pub exit_frame: Option<u64>,
    /// Length of the exit window. Defaults to `duration`.
    #[serde(default)]
    pub exit_duration: Option<u64>,
    /// Enter/exit presentation.
    #[serde(default)]
    pub animation: AnimationKind,
}

impl TimelineItem {
    /// Item that enters at `start_frame` over `duration` frames and never exits.
    pub fn new(id: impl Into<String>, start_frame: u64, duration: u64) -> Self {
        Self {
            id: id.into(),
            content_ref: String::new(),
            start_frame,
            duration,
            exit_frame: None,
            exit_duration: None,
            animation: AnimationKind::default(),
        }
    }

    /// Schedule an exit window.
    pub fn with_exit(mut self, exit_frame: u64, exit_duration: u64) -> Self {
        self.exit_frame = Some(exit_frame);
        self.exit_duration = Some(exit_duration);
        self
    }

    /// Set the presentation kind.
    pub fn with_animation(mut self, animation: AnimationKind) -> Self {
        self.animation = animation;
        self
    }

    /// Set the content reference.
    pub fn with_content(mut self, content_ref: impl Into<String>) -> Self {
        self.content_ref = content_ref.into();
        self
    }

    /// Effective exit duration (`exit_duration`, else the enter duration).
    pub fn effective_exit_duration(&self) -> u64 {
        self.exit_duration.unwrap_or(self.duration)
    }

    /// Reject windows that cannot be ordered.
    pub fn validate(&self) -> MotionResult<()> {
        if self.id.is_empty() {
            return Err(MotionError::validation("timeline item id must be non-empty"));
        }
        if let Some(exit) = self.exit_frame
            && exit < self.start_frame
        {
            return Err(MotionError::validation(format!(
                "timeline item '{}' exits (frame {exit}) before it starts (frame {})",
                self.id, self.start_frame
            )));
        }
        Ok(())
    }

    /// State at `frame`. A pure comparison against the item's windows.
    pub fn state_at(&self, frame: u64) -> ItemState {
        self.phase_at(frame).0
    }

    /// State at `frame` plus linear progress through the current phase, in `[0, 1]`.
    ///
    /// Progress is 1 for `Visible` and `Gone`, 0 for `NotStarted`.
    pub fn phase_at(&self, frame: u64) -> (ItemState, f64) {
        if frame < self.start_frame {
            return (ItemState::NotStarted, 0.0);
        }
        if let Some(exit) = self.exit_frame {
            let exit_dur = self.effective_exit_duration();
            let exit_end = exit.saturating_add(exit_dur);
            if frame > exit_end {
                return (ItemState::Gone, 1.0);
            }
            if frame >= exit {
                return (ItemState::Exiting, window_progress(frame - exit, exit_dur));
            }
        }
        let enter_end = self.start_frame.saturating_add(self.duration);
        if frame < enter_end {
            return (
                ItemState::Entering,
                window_progress(frame - self.start_frame, self.duration),
            );
        }
        (ItemState::Visible, 1.0)
    }
}

fn window_progress(offset: u64, len: u64) -> f64 {
    if len == 0 {
        return 1.0;
    }
    (offset as f64 / len as f64).clamp(0.0, 1.0)
}

/// Presentation constants shared by every item of a timeline.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    /// Distance, in pixels, covered by slide animations.
    pub slide_distance: f64,
    /// Scale at the start of scale/pop entries.
    pub scale_from: f64,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            slide_distance: 40.0,
            scale_from: 0.85,
        }
    }
}

/// An item of the visible set with its phase-appropriate presentation.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct VisibleItem {
    /// Item identifier.
    pub id: String,
    /// Content reference copied from the item.
    pub content_ref: String,
    /// `Entering`, `Visible` or `Exiting`.
    pub state: ItemState,
    /// Linear progress through the current phase.
    pub progress: f64,
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
    /// Horizontal offset from the resting position, in pixels.
    pub translate_x: f64,
    /// Vertical offset from the resting position, in pixels.
    pub translate_y: f64,
    /// Uniform scale.
    pub scale: f64,
}

/// Presentation of `item` at `frame`, or `None` when it is not in the visible set.
pub fn annotate(item: &TimelineItem, frame: u64, cfg: &TimelineConfig) -> Option<VisibleItem> {
    let (state, progress) = item.phase_at(frame);
    // Amount of "presence" in [0, 1]: 0 fully hidden, 1 at rest.
    let (presence, scale_presence) = match state {
        ItemState::NotStarted | ItemState::Gone => return None,
        ItemState::Visible => (1.0, 1.0),
        ItemState::Entering => {
            let p = Easing::EaseOut.apply(progress);
            let s = if item.animation == AnimationKind::Pop {
                Easing::BackOut.apply(progress)
            } else {
                p
            };
            (p, s)
        }
        ItemState::Exiting => {
            let p = 1.0 - Easing::EaseIn.apply(progress);
            (p, p)
        }
    };

    let away = 1.0 - presence;
    let (opacity, translate_x, translate_y, scale) = match item.animation {
        AnimationKind::None => (1.0, 0.0, 0.0, 1.0),
        AnimationKind::Fade => (presence, 0.0, 0.0, 1.0),
        AnimationKind::SlideUp => (presence, 0.0, away * cfg.slide_distance, 1.0),
        AnimationKind::SlideDown => (presence, 0.0, -away * cfg.slide_distance, 1.0),
        AnimationKind::SlideLeft => (presence, away * cfg.slide_distance, 0.0, 1.0),
        AnimationKind::SlideRight => (presence, -away * cfg.slide_distance, 0.0, 1.0),
        AnimationKind::Scale | AnimationKind::Pop => (
            presence,
            0.0,
            0.0,
            cfg.scale_from + (1.0 - cfg.scale_from) * scale_presence,
        ),
    };

    Some(VisibleItem {
        id: item.id.clone(),
        content_ref: item.content_ref.clone(),
        state,
        progress,
        opacity: opacity.clamp(0.0, 1.0),
        translate_x,
        translate_y,
        scale,
    })
}

/// Every item whose state at `frame` is `Entering`, `Visible` or `Exiting`, in input order.
pub fn visible_items(items: &[TimelineItem], frame: u64, cfg: &TimelineConfig) -> Vec<VisibleItem> {
    items
        .iter()
        .filter_map(|item| annotate(item, frame, cfg))
        .collect()
}

/// A validated set of timeline items.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct Timeline {
    items: Vec<TimelineItem>,
    config: TimelineConfig,
}

impl Timeline {
    /// Validate items (ordered windows, unique ids) and build a timeline.
    pub fn new(items: Vec<TimelineItem>, config: TimelineConfig) -> MotionResult<Self> {
        let mut seen = HashSet::new();
        for item in &items {
            item.validate()?;
            if !seen.insert(item.id.as_str()) {
                return Err(MotionError::validation(format!(
                    "duplicate timeline item id '{}'",
                    item.id
                )));
            }
        }
        Ok(Self { items, config })
    }

    /// Items in declaration order.
    pub fn items(&self) -> &[TimelineItem] {
        &self.items
    }

    /// State of the item with `id` at `frame`.
    pub fn state_of(&self, id: &str, frame: u64) -> Option<ItemState> {
        self.items
            .iter()
            .find(|i| i.id == id)
            .map(|i| i.state_at(frame))
    }

    /// Visible set at `frame`.
    pub fn visible_at(&self, frame: u64) -> Vec<VisibleItem> {
        visible_items(&self.items, frame, &self.config)
    }

    /// Last frame at which any item can still be visible, if every item exits.
    pub fn end_frame(&self) -> Option<u64> {
        self.items
            .iter()
            .map(|i| {
                i.exit_frame
                    .map(|e| e.saturating_add(i.effective_exit_duration()))
            })
            .try_fold(0u64, |acc, end| end.map(|e| acc.max(e)))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/sequencer.rs"]
mod tests;
