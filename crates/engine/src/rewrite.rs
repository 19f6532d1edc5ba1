//! Ordered find/replace rewrite engine.
//!
//! Rules come straight from user configuration, so every pattern is
//! treated as potentially malformed: compilation is a compile-or-skip
//! step, and a bad rule never stops the pipeline — the text simply passes
//! through that rule unchanged while later rules still run.

use promptloom_config::{RewriteRule, RuleScope};
use promptloom_core::Speaker;
use regex_lite::RegexBuilder;
use tracing::{debug, warn};

/// Outcome of compiling a user-supplied pattern.
enum CompiledPattern {
    /// Ready to apply. `global` mirrors the `g` flag.
    Compiled {
        regex: regex_lite::Regex,
        global: bool,
    },
    /// Pattern rejected; the reason feeds the warning log.
    Skip { reason: String },
}

/// Compile a pattern with its flag string.
///
/// Flags: `g` = all occurrences (absent = first occurrence only), `i`,
/// `m`, `s`. Unknown flag characters are ignored — config written against
/// another regex dialect should degrade, not fail.
fn compile_pattern(pattern: &str, flags: &str) -> CompiledPattern {
    let mut builder = RegexBuilder::new(pattern);
    let mut global = false;
    for flag in flags.chars() {
        match flag {
            'g' => global = true,
            'i' => {
                builder.case_insensitive(true);
            }
            'm' => {
                builder.multi_line(true);
            }
            's' => {
                builder.dot_matches_new_line(true);
            }
            other => debug!(flag = %other, "Ignoring unsupported regex flag"),
        }
    }
    match builder.build() {
        Ok(regex) => CompiledPattern::Compiled { regex, global },
        Err(e) => CompiledPattern::Skip {
            reason: e.to_string(),
        },
    }
}

fn scope_matches(scope: RuleScope, speaker: Speaker) -> bool {
    match scope {
        RuleScope::All => true,
        RuleScope::UserOnly => speaker == Speaker::User,
        RuleScope::OtherOnly => speaker == Speaker::Other,
    }
}

/// Apply an ordered rule list to `text` for a turn of the given speaker.
///
/// The output of each successful rule becomes the input of the next.
/// Replacement strings support `$1`/`${name}` capture references. After a
/// rule's main replace, each non-empty line of its `trim_patterns` is
/// applied as a global delete, each independently fault-tolerant.
pub fn apply_rules(text: &str, rules: &[RewriteRule], speaker: Speaker) -> String {
    let mut current = text.to_string();

    for rule in rules {
        if !rule.enabled || !scope_matches(rule.scope, speaker) {
            continue;
        }

        match compile_pattern(&rule.pattern, &rule.flags) {
            CompiledPattern::Compiled { regex, global } => {
                current = if global {
                    regex
                        .replace_all(&current, rule.replacement.as_str())
                        .into_owned()
                } else {
                    regex
                        .replace(&current, rule.replacement.as_str())
                        .into_owned()
                };
            }
            CompiledPattern::Skip { reason } => {
                warn!(pattern = %rule.pattern, %reason, "Skipping malformed rewrite rule");
                continue;
            }
        }

        for trim in rule
            .trim_patterns
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
        {
            match compile_pattern(trim, "g") {
                CompiledPattern::Compiled { regex, .. } => {
                    current = regex.replace_all(&current, "").into_owned();
                }
                CompiledPattern::Skip { reason } => {
                    warn!(pattern = %trim, %reason, "Skipping malformed trim pattern");
                }
            }
        }
    }

    current
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(pattern: &str, replacement: &str) -> RewriteRule {
        RewriteRule::new(pattern, replacement)
    }

    #[test]
    fn empty_rule_list_is_identity() {
        assert_eq!(apply_rules("unchanged", &[], Speaker::User), "unchanged");
    }

    #[test]
    fn unmatchable_pattern_is_identity() {
        let rules = vec![rule("zzz_nothing_matches", "X")];
        assert_eq!(apply_rules("hello", &rules, Speaker::User), "hello");
    }

    #[test]
    fn state_markers_stripped() {
        let rules = vec![rule(r"\[State:.*?\]", "")];
        let out = apply_rules(
            "Hello [State: happy] world [State: sad]",
            &rules,
            Speaker::Other,
        );
        assert_eq!(out, "Hello  world ");
    }

    #[test]
    fn rules_chain_in_order() {
        // Rule 2 matches only what rule 1 produced.
        let rules = vec![rule("cat", "dog"), rule("dog", "wolf")];
        assert_eq!(apply_rules("a cat", &rules, Speaker::User), "a wolf");
    }

    #[test]
    fn capture_group_backreferences() {
        let rules = vec![rule(r"(\w+)@(\w+)", "$2 at $1")];
        assert_eq!(
            apply_rules("alice@wonderland", &rules, Speaker::User),
            "wonderland at alice"
        );
    }

    #[test]
    fn disabled_rule_is_skipped() {
        let mut r = rule("hello", "bye");
        r.enabled = false;
        assert_eq!(apply_rules("hello", &[r], Speaker::User), "hello");
    }

    #[test]
    fn scope_restricts_by_speaker() {
        let rules = vec![rule("secret", "[redacted]").scoped(RuleScope::UserOnly)];
        assert_eq!(
            apply_rules("the secret", &rules, Speaker::User),
            "the [redacted]"
        );
        assert_eq!(
            apply_rules("the secret", &rules, Speaker::Other),
            "the secret"
        );
    }

    #[test]
    fn malformed_pattern_skipped_later_rules_run() {
        let rules = vec![
            rule("good", "fine"),
            rule("[unclosed", "X"),
            rule("fine", "great"),
        ];
        // Rule 2 is skipped; 1 and 3 still apply in order.
        assert_eq!(apply_rules("good", &rules, Speaker::User), "great");
    }

    #[test]
    fn non_global_replaces_first_only() {
        let mut r = rule("a", "b");
        r.flags = String::new();
        assert_eq!(apply_rules("aaa", &[r], Speaker::User), "baa");
    }

    #[test]
    fn global_replaces_all() {
        assert_eq!(
            apply_rules("aaa", &[rule("a", "b")], Speaker::User),
            "bbb"
        );
    }

    #[test]
    fn case_insensitive_flag() {
        let mut r = rule("hello", "hi");
        r.flags = "gi".into();
        assert_eq!(
            apply_rules("Hello HELLO hello", &[r], Speaker::User),
            "hi hi hi"
        );
    }

    #[test]
    fn unknown_flags_ignored() {
        let mut r = rule("a", "b");
        r.flags = "guy".into(); // y and u are foreign flags
        assert_eq!(apply_rules("aa", &[r], Speaker::User), "bb");
    }

    #[test]
    fn trim_patterns_run_after_replace() {
        let mut r = rule("draft", "final");
        r.trim_patterns = "\\*giggles\\*\n\n<!--.*?-->".into();
        let out = apply_rules(
            "draft text *giggles* here <!-- note -->",
            &[r],
            Speaker::Other,
        );
        assert_eq!(out, "final text  here ");
    }

    #[test]
    fn malformed_trim_pattern_skipped_others_apply() {
        let mut r = rule("x", "y");
        r.trim_patterns = "[bad\nfoo".into();
        assert_eq!(apply_rules("x foo", &[r], Speaker::User), "y ");
    }
}
