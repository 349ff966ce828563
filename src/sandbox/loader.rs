use crate::foundation::error::{CompileErrorKind, LoadError, RenderError};
use crate::foundation::text::bounded_message;
use crate::sandbox::capability::CapabilityContext;
use crate::sandbox::convert::{to_json, to_script, to_script_value};
use crate::sandbox::kits::{AnimationKit, LayoutKit};
use crate::sandbox::validate::validate;
use crate::scene::source::{SceneSource, merge_props};
use crate::scene::visual::{DIAGNOSTIC_NODE_TYPE, VisualTree};
use rhai::{AST, CallFnOptions, Dynamic, INT, Scope};
use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

/// Name of the function every scene must define.
pub const ENTRY_SYMBOL: &str = "render";
/// Parameters of the entry: `(props, colors, animations, layout)`.
pub const ENTRY_ARITY: usize = 4;

struct FactoryInner {
    id: String,
    ast: AST,
    ctx: Arc<CapabilityContext>,
    colors: Dynamic,
    props: serde_json::Value,
}

/// Compiled scene, callable once per frame.
///
/// Holds no mutable state: every call builds fresh arguments and a fresh scope, so calls may run
/// in any order and from any thread.
#[derive(Clone)]
pub struct SceneFactory {
    inner: Arc<FactoryInner>,
}

impl std::fmt::Debug for SceneFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneFactory")
            .field("id", &self.inner.id)
            .finish_non_exhaustive()
    }
}

impl SceneFactory {
    /// Scene identifier.
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    /// Capability context the scene was compiled against.
    pub fn context(&self) -> &Arc<CapabilityContext> {
        &self.inner.ctx
    }

    /// Props declared by the source.
    pub fn default_props(&self) -> &serde_json::Value {
        &self.inner.props
    }

    /// Invoke the entry for `frame`.
    ///
    /// `props` are shallow-merged over the declared props; pass `null` to use them unchanged.
    /// The call runs on a thread with [`SandboxLimits::stack_size`] bytes of stack.
    ///
    /// [`SandboxLimits::stack_size`]: crate::sandbox::capability::SandboxLimits::stack_size
    pub fn render(&self, frame: u64, props: &serde_json::Value) -> Result<VisualTree, RenderError> {
        let stack_size = self.inner.ctx.options().limits.stack_size;
        on_script_stack(stack_size, || self.render_in_place(frame, props)).unwrap_or_else(
            |message| {
                Err(RenderError::Panicked {
                    frame,
                    message: bounded_message(&message),
                })
            },
        )
    }

    /// [`SceneFactory::render`] on the current thread, which must own a script-sized stack.
    pub(crate) fn render_in_place(
        &self,
        frame: u64,
        props: &serde_json::Value,
    ) -> Result<VisualTree, RenderError> {
        let inner = &*self.inner;
        let conversion = |message: String| RenderError::Conversion {
            frame,
            message: bounded_message(&message),
        };

        let merged = merge_props(&inner.props, props);
        let props = to_script(&merged).map_err(|e| conversion(e.to_string()))?;
        let opts = inner.ctx.options();
        let anim = AnimationKit::new(frame, opts.fps, opts.timeline);
        let layout = LayoutKit::new(opts.canvas);

        let call = CallFnOptions::new()
            .eval_ast(false)
            .rewind_scope(true)
            .with_tag(INT::try_from(frame).unwrap_or(INT::MAX));
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            inner.ctx.engine().call_fn_with_options::<Dynamic>(
                call,
                &mut Scope::new(),
                &inner.ast,
                ENTRY_SYMBOL,
                (props, inner.colors.clone(), anim, layout),
            )
        }));

        let value = match outcome {
            Ok(Ok(v)) => v,
            Ok(Err(e)) => {
                return Err(RenderError::Runtime {
                    frame,
                    message: bounded_message(&e.to_string()),
                });
            }
            Err(payload) => {
                return Err(RenderError::Panicked {
                    frame,
                    message: bounded_message(&panic_message(payload.as_ref())),
                });
            }
        };

        let max_depth = opts.limits.max_tree_depth;
        if nests_deeper_than(&value, max_depth) {
            return Err(conversion(format!(
                "{ENTRY_SYMBOL} result nests deeper than {max_depth} levels"
            )));
        }
        let json = to_json(&value).map_err(|e| conversion(e.to_string()))?;
        if !(json.is_object() || json.is_array()) {
            return Err(conversion(format!(
                "{ENTRY_SYMBOL} must return a node map or an array of nodes, got {}",
                value.type_name()
            )));
        }
        if contains_diagnostic_node(&json) {
            return Err(conversion(format!(
                "node type `{DIAGNOSTIC_NODE_TYPE}` is reserved for the host"
            )));
        }
        Ok(VisualTree(json))
    }
}

/// Whether `value` has more than `max` levels of nested arrays and maps.
fn nests_deeper_than(value: &Dynamic, max: usize) -> bool {
    if let Ok(array) = value.as_array_ref() {
        return max == 0 || array.iter().any(|v| nests_deeper_than(v, max - 1));
    }
    if let Ok(map) = value.as_map_ref() {
        return max == 0 || map.values().any(|v| nests_deeper_than(v, max - 1));
    }
    false
}

fn contains_diagnostic_node(json: &serde_json::Value) -> bool {
    match json {
        serde_json::Value::Object(map) => {
            map.get("type").and_then(serde_json::Value::as_str) == Some(DIAGNOSTIC_NODE_TYPE)
                || map.values().any(contains_diagnostic_node)
        }
        serde_json::Value::Array(items) => items.iter().any(contains_diagnostic_node),
        _ => false,
    }
}

/// Run `f` on a scoped thread with `stack_size` bytes of stack.
///
/// Script values are built, dropped and converted recursively, so scene code never runs on a
/// caller's stack of unknown size. `Err` carries a spawn failure or panic message.
pub(crate) fn on_script_stack<T, F>(stack_size: usize, f: F) -> Result<T, String>
where
    T: Send,
    F: FnOnce() -> T + Send,
{
    let span = tracing::Span::current();
    std::thread::scope(|scope| {
        let handle = std::thread::Builder::new()
            .name("motionbox-script".to_owned())
            .stack_size(stack_size)
            .spawn_scoped(scope, move || span.in_scope(f))
            .map_err(|e| format!("failed to spawn script thread: {e}"))?;
        handle.join().map_err(|payload| panic_message(payload.as_ref()))
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_owned()
    }
}

/// Validate, compile and define `source` against `ctx`.
///
/// The top-level body runs exactly once here, without a frame; the entry is never invoked.
#[tracing::instrument(skip_all, fields(scene = %source.id))]
pub fn load(source: &SceneSource, ctx: Arc<CapabilityContext>) -> Result<SceneFactory, LoadError> {
    let stack_size = ctx.options().limits.stack_size;
    let result = on_script_stack(stack_size, || load_inner(source, ctx)).unwrap_or_else(|message| {
        Err(LoadError::Runtime {
            message: bounded_message(&message),
        })
    });
    match &result {
        Ok(_) => tracing::debug!("scene loaded"),
        Err(e) => tracing::warn!(kind = e.kind().label(), error = %e, "scene load failed"),
    }
    result
}

fn load_inner(source: &SceneSource, ctx: Arc<CapabilityContext>) -> Result<SceneFactory, LoadError> {
    validate(&source.code)?;

    let engine = ctx.engine();
    let ast = engine.compile(&source.code).map_err(|e| LoadError::Compile {
        kind: CompileErrorKind::Syntax,
        message: bounded_message(&e.to_string()),
    })?;

    let ran = catch_unwind(AssertUnwindSafe(|| {
        engine.run_ast_with_scope(&mut Scope::new(), &ast)
    }));
    match ran {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            return Err(LoadError::Runtime {
                message: bounded_message(&e.to_string()),
            });
        }
        Err(payload) => {
            return Err(LoadError::Runtime {
                message: bounded_message(&panic_message(payload.as_ref())),
            });
        }
    }

    check_entry(&ast)?;

    let colors = to_script_value(&source.colors).map_err(|e| LoadError::Runtime {
        message: bounded_message(&e.to_string()),
    })?;
    let props = match &source.props {
        serde_json::Value::Null => serde_json::Value::Object(serde_json::Map::new()),
        p => p.clone(),
    };

    Ok(SceneFactory {
        inner: Arc::new(FactoryInner {
            id: source.id.clone(),
            ast,
            ctx,
            colors,
            props,
        }),
    })
}

fn check_entry(ast: &AST) -> Result<(), LoadError> {
    let arities: Vec<usize> = ast
        .iter_functions()
        .filter(|f| f.name == ENTRY_SYMBOL)
        .map(|f| f.params.len())
        .collect();
    if arities.contains(&ENTRY_ARITY) {
        return Ok(());
    }
    let message = if arities.is_empty() {
        format!("scene must define `fn {ENTRY_SYMBOL}(props, colors, animations, layout)`")
    } else {
        format!(
            "`{ENTRY_SYMBOL}` must take {ENTRY_ARITY} parameters (props, colors, animations, layout), found {arities:?}"
        )
    };
    Err(LoadError::Compile {
        kind: CompileErrorKind::MissingExport,
        message,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/sandbox/loader.rs"]
mod tests;
