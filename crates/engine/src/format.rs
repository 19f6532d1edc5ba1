//! Rendering selected turns into the final text block.
//!
//! Each turn resolves its speaker's [`RoleTemplate`], runs the rewrite
//! engine with that speaker as scope, and renders one block:
//!
//! ```text
//! {header_text}        ← only when non-empty
//! <{wrapper_tag}>      ← only when non-empty
//! Name: content        ← shape varies by OutputStyle
//! </{wrapper_tag}>
//! ```
//!
//! Blocks join with a blank line; the final result is trimmed.

use serde::{Deserialize, Serialize};

use promptloom_config::{FormattingConfig, RoleTemplate};
use promptloom_core::{Speaker, Turn};

use crate::rewrite::apply_rules;

/// Named presentation styles.
///
/// All styles consume the same selected turn list and the same rewrite
/// step; only the name-and-content line differs. Header and wrapper
/// handling is shared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputStyle {
    /// `Name: content`
    #[default]
    Plain,
    /// `1. Name: content` (1-based position in the rendered list)
    Numbered,
    /// `Name: "content"`
    Quoted,
    /// `[Name] content`
    Bracketed,
}

impl std::str::FromStr for OutputStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "plain" => Ok(Self::Plain),
            "numbered" => Ok(Self::Numbered),
            "quoted" => Ok(Self::Quoted),
            "bracketed" => Ok(Self::Bracketed),
            other => Err(format!(
                "unknown style '{other}' (expected plain, numbered, quoted or bracketed)"
            )),
        }
    }
}

fn template_for(formatting: &FormattingConfig, speaker: Speaker) -> &RoleTemplate {
    match speaker {
        Speaker::User => &formatting.user,
        Speaker::Other => &formatting.other,
    }
}

/// Render one block from already-rewritten content.
fn render_block(content: &str, template: &RoleTemplate, style: OutputStyle, index: usize) -> String {
    let name = &template.display_name;
    let line = match style {
        OutputStyle::Plain => format!("{name}: {content}"),
        OutputStyle::Numbered => format!("{}. {name}: {content}", index + 1),
        OutputStyle::Quoted => format!("{name}: \"{content}\""),
        OutputStyle::Bracketed => format!("[{name}] {content}"),
    };

    let mut block = String::with_capacity(line.len() + 32);
    if !template.header_text.is_empty() {
        block.push_str(&template.header_text);
        block.push('\n');
    }
    if template.wrapper_tag.is_empty() {
        block.push_str(&line);
    } else {
        block.push('<');
        block.push_str(&template.wrapper_tag);
        block.push_str(">\n");
        block.push_str(&line);
        block.push_str("\n</");
        block.push_str(&template.wrapper_tag);
        block.push('>');
    }
    block
}

/// Render a turn sequence as one text block.
pub fn format_history(turns: &[Turn], formatting: &FormattingConfig, style: OutputStyle) -> String {
    let blocks: Vec<String> = turns
        .iter()
        .enumerate()
        .map(|(index, turn)| {
            let template = template_for(formatting, turn.speaker);
            let content = apply_rules(&turn.text, &formatting.rewrite_rules, turn.speaker);
            render_block(&content, template, style, index)
        })
        .collect();

    blocks.join("\n\n").trim().to_string()
}

/// Render a single turn as one block (last-message macros).
pub fn format_turn(turn: &Turn, formatting: &FormattingConfig, style: OutputStyle) -> String {
    format_history(std::slice::from_ref(turn), formatting, style)
}

#[cfg(test)]
mod tests {
    use super::*;
    use promptloom_config::{RewriteRule, RoleTemplate, RuleScope};
    use std::str::FromStr;

    fn formatting() -> FormattingConfig {
        FormattingConfig::default()
    }

    #[test]
    fn plain_style_renders_name_prefix() {
        let turns = vec![Turn::user("hi"), Turn::other("hello")];
        let out = format_history(&turns, &formatting(), OutputStyle::Plain);
        assert_eq!(out, "User: hi\n\nAssistant: hello");
    }

    #[test]
    fn empty_turn_list_is_empty_string() {
        assert_eq!(format_history(&[], &formatting(), OutputStyle::Plain), "");
    }

    #[test]
    fn numbered_style_counts_rendered_blocks() {
        let turns = vec![Turn::user("one"), Turn::other("two"), Turn::user("three")];
        let out = format_history(&turns, &formatting(), OutputStyle::Numbered);
        assert_eq!(
            out,
            "1. User: one\n\n2. Assistant: two\n\n3. User: three"
        );
    }

    #[test]
    fn quoted_style_wraps_content() {
        let turns = vec![Turn::user("hi")];
        let out = format_history(&turns, &formatting(), OutputStyle::Quoted);
        assert_eq!(out, "User: \"hi\"");
    }

    #[test]
    fn bracketed_style_brackets_name() {
        let turns = vec![Turn::other("hello")];
        let out = format_history(&turns, &formatting(), OutputStyle::Bracketed);
        assert_eq!(out, "[Assistant] hello");
    }

    #[test]
    fn header_emitted_only_when_set() {
        let mut fmt = formatting();
        fmt.user.header_text = "### User turn".into();
        let turns = vec![Turn::user("hi"), Turn::other("hello")];
        let out = format_history(&turns, &fmt, OutputStyle::Plain);
        assert_eq!(out, "### User turn\nUser: hi\n\nAssistant: hello");
    }

    #[test]
    fn wrapper_tag_wraps_block() {
        let mut fmt = formatting();
        fmt.other = RoleTemplate {
            display_name: "Bot".into(),
            header_text: String::new(),
            wrapper_tag: "reply".into(),
        };
        let turns = vec![Turn::other("hello")];
        let out = format_history(&turns, &fmt, OutputStyle::Plain);
        assert_eq!(out, "<reply>\nBot: hello\n</reply>");
    }

    #[test]
    fn header_and_wrapper_combine() {
        let mut fmt = formatting();
        fmt.user.header_text = "---".into();
        fmt.user.wrapper_tag = "msg".into();
        let out = format_history(&[Turn::user("hi")], &fmt, OutputStyle::Plain);
        assert_eq!(out, "---\n<msg>\nUser: hi\n</msg>");
    }

    #[test]
    fn rewrite_rules_scoped_per_speaker() {
        let mut fmt = formatting();
        fmt.rewrite_rules = vec![
            RewriteRule::new(r"\[State:.*?\]", "").scoped(RuleScope::OtherOnly),
        ];
        let turns = vec![
            Turn::user("keep [State: x] mine"),
            Turn::other("strip [State: y] this"),
        ];
        let out = format_history(&turns, &fmt, OutputStyle::Plain);
        assert!(out.contains("keep [State: x] mine"));
        assert!(out.contains("strip  this"));
    }

    #[test]
    fn order_preserved_across_styles() {
        let turns = vec![Turn::user("a"), Turn::other("b"), Turn::user("c")];
        for style in [
            OutputStyle::Plain,
            OutputStyle::Numbered,
            OutputStyle::Quoted,
            OutputStyle::Bracketed,
        ] {
            let out = format_history(&turns, &formatting(), style);
            let pos_a = out.find('a').unwrap();
            let pos_b = out.find('b').unwrap();
            let pos_c = out.find('c').unwrap();
            assert!(pos_a < pos_b && pos_b < pos_c, "reordered in {style:?}");
        }
    }

    #[test]
    fn format_turn_single_block() {
        let turn = Turn::other("just this");
        let out = format_turn(&turn, &formatting(), OutputStyle::Plain);
        assert_eq!(out, "Assistant: just this");
    }

    #[test]
    fn style_parses_from_str() {
        assert_eq!(OutputStyle::from_str("plain").unwrap(), OutputStyle::Plain);
        assert_eq!(
            OutputStyle::from_str("Numbered").unwrap(),
            OutputStyle::Numbered
        );
        assert!(OutputStyle::from_str("fancy").is_err());
    }
}
