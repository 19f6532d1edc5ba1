//! Named macro registry and placeholder expansion.
//!
//! The host's template expander works with named callback macros; this
//! crate models that as a simple name → function registry wrapped around
//! the engine's pure entry points. Expansion is the pre-send hook: the
//! host calls [`MacroRegistry::expand`] on the outgoing prompt payload
//! and every `{{name}}` / `{{name::arg}}` placeholder is replaced with
//! the macro's output. Unknown names pass through untouched so foreign
//! template tokens survive.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use promptloom_config::ConfigProvider;
use promptloom_core::{ConversationSource, Speaker};
use promptloom_engine::{HistoryPipeline, OutputStyle};

/// Turn count used when a `lastTurns` argument is missing or invalid.
pub const DEFAULT_LAST_TURNS: usize = 10;

type MacroFn = Box<dyn Fn(&str) -> String>;

/// Name → function table for template macros.
///
/// Registered functions receive the raw argument text after `::` in the
/// placeholder (empty when absent) and return the replacement text.
#[derive(Default)]
pub struct MacroRegistry {
    entries: HashMap<String, MacroFn>,
}

impl MacroRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a macro under a name. A later registration under the
    /// same name replaces the earlier one.
    pub fn register(&mut self, name: impl Into<String>, f: impl Fn(&str) -> String + 'static) {
        self.entries.insert(name.into(), Box::new(f));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered macro names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Replace every `{{name}}` / `{{name::arg}}` placeholder in
    /// `template` with the registered macro's output.
    ///
    /// Unknown names are left in place (logged at debug). An unterminated
    /// `{{` is treated as literal text.
    pub fn expand(&self, template: &str) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find("{{") {
            let (head, tail) = rest.split_at(start);
            out.push_str(head);

            let Some(end) = tail[2..].find("}}") else {
                // No closing braces anywhere ahead: literal text.
                out.push_str(tail);
                return out;
            };

            let body = &tail[2..2 + end];
            let placeholder = &tail[..end + 4];
            let (name, arg) = match body.split_once("::") {
                Some((name, arg)) => (name, arg),
                None => (body, ""),
            };

            match self.entries.get(name) {
                Some(f) => out.push_str(&f(arg)),
                None => {
                    debug!(name, "No macro registered, leaving placeholder untouched");
                    out.push_str(placeholder);
                }
            }

            rest = &tail[end + 4..];
        }

        out.push_str(rest);
        out
    }
}

/// Parse a `lastTurns` argument, falling back to [`DEFAULT_LAST_TURNS`]
/// on anything that is not a positive integer.
fn parse_turn_count(arg: &str) -> usize {
    match arg.trim().parse::<usize>() {
        Ok(n) if n > 0 => n,
        _ => {
            if !arg.trim().is_empty() {
                warn!(arg, "Invalid turn count argument, using default");
            }
            DEFAULT_LAST_TURNS
        }
    }
}

/// Build a registry with the standard macro set wired to a pipeline.
///
/// | Macro | Output |
/// |-------|--------|
/// | `{{history}}` | full formatted history, default style |
/// | `{{lastMessage}}` | newest turn of either speaker |
/// | `{{lastUserMessage}}` | newest user turn |
/// | `{{lastOtherMessage}}` | newest other-party turn |
/// | `{{lastTurns::N}}` | last N raw turns (default 10) |
pub fn builtin_registry<S, C>(pipeline: Arc<HistoryPipeline<S, C>>) -> MacroRegistry
where
    S: ConversationSource + 'static,
    C: ConfigProvider + 'static,
{
    let mut registry = MacroRegistry::new();

    let p = pipeline.clone();
    registry.register("history", move |_| {
        p.build_formatted_history(OutputStyle::default())
    });

    let p = pipeline.clone();
    registry.register("lastMessage", move |_| {
        p.last_turn_formatted(OutputStyle::default())
    });

    let p = pipeline.clone();
    registry.register("lastUserMessage", move |_| {
        p.last_matching_turn_formatted(Speaker::User, OutputStyle::default())
    });

    let p = pipeline.clone();
    registry.register("lastOtherMessage", move |_| {
        p.last_matching_turn_formatted(Speaker::Other, OutputStyle::default())
    });

    let p = pipeline;
    registry.register("lastTurns", move |arg| {
        p.build_last_turns(parse_turn_count(arg), OutputStyle::default())
    });

    registry
}
