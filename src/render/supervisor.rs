use crate::foundation::error::{LoadError, RenderError};
use crate::sandbox::capability::CapabilityContext;
use crate::sandbox::loader::SceneFactory;
use crate::scene::visual::{DiagnosticScene, VisualOutput, VisualTree};

/// Render one frame, turning any failure of this call into a diagnostic.
///
/// The factory is left untouched on failure, so the next frame starts from the same state as
/// this one did.
#[tracing::instrument(level = "debug", skip(factory, props), fields(scene = factory.id()))]
pub fn render_frame(factory: &SceneFactory, frame: u64, props: &serde_json::Value) -> VisualOutput {
    supervise(factory, frame, factory.render(frame, props))
}

/// [`render_frame`] on the current thread, which must own a script-sized stack.
pub(crate) fn render_frame_in_place(
    factory: &SceneFactory,
    frame: u64,
    props: &serde_json::Value,
) -> VisualOutput {
    supervise(factory, frame, factory.render_in_place(frame, props))
}

fn supervise(
    factory: &SceneFactory,
    frame: u64,
    rendered: Result<VisualTree, RenderError>,
) -> VisualOutput {
    match rendered {
        Ok(tree) => VisualOutput::Tree(tree),
        Err(err) => {
            tracing::warn!(
                frame,
                scene = factory.id(),
                kind = "runtime_error",
                error = %err,
                "frame replaced by diagnostic"
            );
            VisualOutput::Diagnostic(DiagnosticScene::from_render_error(factory.id(), &err))
        }
    }
}

/// Render one frame of a load outcome in place. Load failures yield the same diagnostic for
/// every frame, listing the capabilities of `ctx`.
pub(crate) fn render_loaded(
    scene_id: &str,
    loaded: &Result<SceneFactory, LoadError>,
    ctx: &CapabilityContext,
    frame: u64,
    props: &serde_json::Value,
) -> VisualOutput {
    match loaded {
        Ok(factory) => render_frame_in_place(factory, frame, props),
        Err(err) => VisualOutput::Diagnostic(DiagnosticScene::from_load_error(
            scene_id,
            err,
            &ctx.names(),
        )),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/supervisor.rs"]
mod tests;
