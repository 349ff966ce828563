use crate::foundation::core::{FrameIndex, FrameRange};
use crate::foundation::error::{LoadError, MotionError, MotionResult};
use crate::render::cache::{FactoryCache, LoadOutcome};
use crate::render::supervisor::render_loaded;
use crate::sandbox::capability::{CapabilityContext, CapabilityOptions};
use crate::sandbox::loader::{SceneFactory, load, on_script_stack};
use crate::scene::source::SceneSource;
use crate::scene::visual::{DiagnosticScene, VisualOutput};
use rayon::prelude::*;
use std::sync::Arc;

/// Options controlling range rendering.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SessionOpts {
    /// Render frames of a range on a dedicated rayon pool.
    pub parallel: bool,
    /// Override the number of rayon worker threads. `None` uses rayon defaults.
    pub threads: Option<usize>,
}

/// One scene bound to its capability context and load outcome.
///
/// Construction never fails because of the scene code itself: load failures are kept and turned
/// into a diagnostic for every requested frame.
#[derive(Debug)]
pub struct SceneSession {
    source: SceneSource,
    ctx: Arc<CapabilityContext>,
    outcome: LoadOutcome,
    opts: SessionOpts,
}

impl SceneSession {
    /// Build a context from `options` and load `source` against it.
    pub fn new(
        source: SceneSource,
        options: CapabilityOptions,
        opts: SessionOpts,
    ) -> MotionResult<Self> {
        source.validate()?;
        let ctx = Arc::new(CapabilityContext::build(options)?);
        let outcome = Arc::new(load(&source, Arc::clone(&ctx)));
        Ok(Self {
            source,
            ctx,
            outcome,
            opts,
        })
    }

    /// Load `source` through `cache`, sharing `ctx` with other sessions.
    pub fn with_cache(
        source: SceneSource,
        ctx: Arc<CapabilityContext>,
        cache: &FactoryCache,
        opts: SessionOpts,
    ) -> MotionResult<Self> {
        source.validate()?;
        let outcome = cache.get_or_load(&source, &ctx);
        Ok(Self {
            source,
            ctx,
            outcome,
            opts,
        })
    }

    /// Scene identifier.
    pub fn scene_id(&self) -> &str {
        &self.source.id
    }

    /// Capability context shared by every frame.
    pub fn context(&self) -> &Arc<CapabilityContext> {
        &self.ctx
    }

    /// Compiled factory, when loading succeeded.
    pub fn factory(&self) -> Option<&SceneFactory> {
        (*self.outcome).as_ref().ok()
    }

    /// Load failure, if any.
    pub fn load_error(&self) -> Option<&LoadError> {
        (*self.outcome).as_ref().err()
    }

    /// Diagnostic describing the load failure, if any.
    pub fn load_diagnostic(&self) -> Option<DiagnosticScene> {
        self.load_error()
            .map(|e| DiagnosticScene::from_load_error(&self.source.id, e, &self.ctx.names()))
    }

    /// Render `frame` with the declared props.
    pub fn render_frame(&self, frame: FrameIndex) -> MotionResult<VisualOutput> {
        self.render_frame_with_props(frame, &serde_json::Value::Null)
    }

    /// Render `frame` with `props` merged over the declared props.
    pub fn render_frame_with_props(
        &self,
        frame: FrameIndex,
        props: &serde_json::Value,
    ) -> MotionResult<VisualOutput> {
        if frame.0 >= self.ctx.options().duration_frames {
            return Err(MotionError::validation(
                "render_frame frame must be within scene duration",
            ));
        }
        self.on_script_stack(|| self.output(frame.0, props))
    }

    /// Render every frame of `range`, in frame order.
    ///
    /// With `parallel` set, frames are rendered on a dedicated pool; the output is identical to a
    /// sequential run.
    #[tracing::instrument(skip(self), fields(scene = %self.source.id, parallel = self.opts.parallel))]
    pub fn render_range(&self, range: FrameRange) -> MotionResult<Vec<VisualOutput>> {
        self.render_range_with_props(range, &serde_json::Value::Null)
    }

    /// [`SceneSession::render_range`] with `props` merged over the declared props.
    pub fn render_range_with_props(
        &self,
        range: FrameRange,
        props: &serde_json::Value,
    ) -> MotionResult<Vec<VisualOutput>> {
        if range.is_empty() {
            return Err(MotionError::validation("render_range range must be non-empty"));
        }
        if range.end.0 > self.ctx.options().duration_frames {
            return Err(MotionError::validation(
                "render_range range must be within scene duration",
            ));
        }

        if !self.opts.parallel {
            return self.on_script_stack(|| {
                range.frames().map(|f| self.output(f.0, props)).collect()
            });
        }

        let pool = build_thread_pool(self.opts.threads, self.ctx.options().limits.stack_size)?;
        Ok(pool.install(|| {
            (range.start.0..range.end.0)
                .into_par_iter()
                .map(|f| self.output(f, props))
                .collect()
        }))
    }

    fn output(&self, frame: u64, props: &serde_json::Value) -> VisualOutput {
        render_loaded(&self.source.id, &self.outcome, &self.ctx, frame, props)
    }

    fn on_script_stack<T: Send>(&self, f: impl FnOnce() -> T + Send) -> MotionResult<T> {
        on_script_stack(self.ctx.options().limits.stack_size, f).map_err(MotionError::evaluation)
    }
}

fn build_thread_pool(threads: Option<usize>, stack_size: usize) -> MotionResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(MotionError::validation(
            "render_range 'threads' must be >= 1 when set",
        ));
    }
    let mut builder = rayon::ThreadPoolBuilder::new()
        .thread_name(|i| format!("motionbox-render-{i}"))
        .stack_size(stack_size);
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| MotionError::evaluation(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/render/session.rs"]
mod tests;
