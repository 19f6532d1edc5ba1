//! Configuration model for the PromptLoom pipeline.
//!
//! Settings load from a TOML file merged over hardcoded defaults: every
//! field carries a serde default, so a two-line config file is valid and
//! anything it omits keeps the built-in value. Invalid numerics are
//! clamped in [`HistoryConfig::normalize`] before the engine ever sees
//! them — the engine itself does not validate.
//!
//! The engine never holds configuration state. It reads a fresh
//! [`HistoryConfig`] through a [`ConfigProvider`] on every invocation, so
//! edits made by a settings surface take effect immediately.

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

// ── Rewrite rules ─────────────────────────────────────────────────────────

/// Which turns a rewrite rule applies to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleScope {
    /// Matches every speaker
    #[default]
    All,
    /// User turns only
    UserOnly,
    /// Other-party turns only
    OtherOnly,
}

/// One ordered find/replace rule.
///
/// Rules are applied in list order; the output of each rule feeds the
/// next. A rule whose pattern fails to compile is skipped with a warning
/// and does not affect later rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewriteRule {
    /// Regular-expression source string.
    pub pattern: String,

    /// Replacement text; may reference capture groups (`$1`, `${name}`).
    #[serde(default)]
    pub replacement: String,

    /// Flag characters: `g` (all occurrences), `i`, `m`, `s`.
    #[serde(default = "default_flags")]
    pub flags: String,

    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub scope: RuleScope,

    /// Extra newline-separated patterns deleted from the text right after
    /// this rule's main replace step.
    #[serde(default)]
    pub trim_patterns: String,
}

impl RewriteRule {
    /// A global-replace rule with default flags and scope.
    pub fn new(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            replacement: replacement.into(),
            flags: default_flags(),
            enabled: true,
            scope: RuleScope::All,
            trim_patterns: String::new(),
        }
    }

    /// Restrict this rule to one speaker.
    pub fn scoped(mut self, scope: RuleScope) -> Self {
        self.scope = scope;
        self
    }
}

// ── Presentation ──────────────────────────────────────────────────────────

/// Per-speaker presentation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleTemplate {
    /// Name prefixed to each rendered turn.
    pub display_name: String,

    /// Line emitted above the turn block; empty = no header.
    #[serde(default)]
    pub header_text: String,

    /// XML-ish element name wrapped around the block; empty = no wrapping.
    #[serde(default)]
    pub wrapper_tag: String,
}

impl RoleTemplate {
    pub fn named(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            header_text: String::new(),
            wrapper_tag: String::new(),
        }
    }
}

// ── Selection ─────────────────────────────────────────────────────────────

/// Turn filtering and token-budget windowing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Drop a trailing other-party turn (a generation UI's discarded
    /// draft reply) before anything else.
    #[serde(default)]
    pub skip_last_other_turn: bool,

    /// Remove the most recent user turn (at most one).
    #[serde(default)]
    pub drop_last_user_turn: bool,

    /// Token budget for the window; 0 = unlimited.
    #[serde(default)]
    pub max_tokens: u32,

    /// Characters per token for the estimate. Must be positive;
    /// [`HistoryConfig::normalize`] restores the default otherwise.
    #[serde(default = "default_chars_per_token")]
    pub chars_per_token: f32,

    /// Soft limit: include the turn that crosses the budget, then stop.
    /// Hard limit (default): exclude any turn that would overshoot.
    #[serde(default)]
    pub soft_limit: bool,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            skip_last_other_turn: false,
            drop_last_user_turn: false,
            max_tokens: 0,
            chars_per_token: default_chars_per_token(),
            soft_limit: false,
        }
    }
}

// ── Formatting ────────────────────────────────────────────────────────────

/// Role templates plus the ordered rewrite rule list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormattingConfig {
    #[serde(default = "default_user_template")]
    pub user: RoleTemplate,

    #[serde(default = "default_other_template")]
    pub other: RoleTemplate,

    #[serde(default)]
    pub rewrite_rules: Vec<RewriteRule>,
}

impl Default for FormattingConfig {
    fn default() -> Self {
        Self {
            user: default_user_template(),
            other: default_other_template(),
            rewrite_rules: Vec::new(),
        }
    }
}

// ── Root ──────────────────────────────────────────────────────────────────

/// The root configuration structure.
///
/// Maps directly to `promptloom.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryConfig {
    #[serde(default)]
    pub selection: SelectionConfig,

    #[serde(default)]
    pub formatting: FormattingConfig,
}

fn default_flags() -> String {
    "g".into()
}
fn default_true() -> bool {
    true
}
fn default_chars_per_token() -> f32 {
    4.0
}
fn default_user_template() -> RoleTemplate {
    RoleTemplate::named("User")
}
fn default_other_template() -> RoleTemplate {
    RoleTemplate::named("Assistant")
}

impl HistoryConfig {
    /// Load configuration from a TOML file.
    ///
    /// A missing file yields pure defaults. A present file is parsed and
    /// merged over defaults field-by-field (serde defaults), then
    /// normalized.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.normalize();
        Ok(config)
    }

    /// Clamp invalid numeric settings to safe defaults.
    ///
    /// The engine divides by `chars_per_token` without guarding; this is
    /// where that guard lives.
    pub fn normalize(&mut self) {
        if !(self.selection.chars_per_token > 0.0) {
            warn!(
                chars_per_token = self.selection.chars_per_token,
                "chars_per_token must be positive, restoring default"
            );
            self.selection.chars_per_token = default_chars_per_token();
        }
    }

    /// Generate a default config TOML string (for `init`).
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

// ── Providers ─────────────────────────────────────────────────────────────

/// Live view of the configuration.
///
/// The pipeline calls this on every invocation so edits made through a
/// settings surface are picked up immediately; nothing is cached on the
/// engine side.
pub trait ConfigProvider {
    fn history_config(&self) -> HistoryConfig;
}

impl<T: ConfigProvider + ?Sized> ConfigProvider for &T {
    fn history_config(&self) -> HistoryConfig {
        (**self).history_config()
    }
}

impl<T: ConfigProvider + ?Sized> ConfigProvider for Arc<T> {
    fn history_config(&self) -> HistoryConfig {
        (**self).history_config()
    }
}

/// Provider over a fixed value (CLI runs, tests).
pub struct StaticProvider {
    config: HistoryConfig,
}

impl StaticProvider {
    pub fn new(config: HistoryConfig) -> Self {
        Self { config }
    }
}

impl ConfigProvider for StaticProvider {
    fn history_config(&self) -> HistoryConfig {
        self.config.clone()
    }
}

/// Provider over a shared, externally-mutated settings object.
///
/// Models the host's settings store: one side holds a handle and mutates,
/// the pipeline reads fresh values through the trait.
#[derive(Clone)]
pub struct SharedProvider {
    inner: Arc<RwLock<HistoryConfig>>,
}

impl SharedProvider {
    pub fn new(config: HistoryConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    /// Replace the stored configuration.
    pub fn update(&self, config: HistoryConfig) {
        *self.inner.write().unwrap() = config;
    }
}

impl ConfigProvider for SharedProvider {
    fn history_config(&self) -> HistoryConfig {
        self.inner.read().unwrap().clone()
    }
}

// ── Errors ────────────────────────────────────────────────────────────────

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },
}
