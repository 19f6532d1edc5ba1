//! History selection — turn filtering and token-budget windowing.

use promptloom_config::SelectionConfig;
use promptloom_core::{Speaker, Turn};

use crate::token::estimate_tokens;

/// Select the sub-sequence of turns to render.
///
/// Pure function over a defensive copy; the input is never mutated.
/// Steps run in fixed order:
///
/// 1. Skip a trailing other-party turn if configured — a generation UI
///    keeps its discarded draft reply as the last turn on regeneration,
///    and that draft must not leak into history.
/// 2. Drop the most recent user turn if configured (at most one).
/// 3. Token-budget windowing from the newest turn backwards. Hard limit:
///    stop before the turn that would overshoot. Soft limit: admit the
///    turn that crosses the budget, then stop. A budget of 0 disables
///    windowing.
///
/// The result keeps original chronological order, oldest first.
pub fn select_turns(turns: &[Turn], config: &SelectionConfig) -> Vec<Turn> {
    let mut turns: Vec<Turn> = turns.to_vec();

    if config.skip_last_other_turn
        && turns.last().is_some_and(|t| t.speaker == Speaker::Other)
    {
        turns.pop();
    }

    if config.drop_last_user_turn {
        if let Some(pos) = turns.iter().rposition(|t| t.speaker == Speaker::User) {
            turns.remove(pos);
        }
    }

    if config.max_tokens == 0 {
        return turns;
    }

    let budget = config.max_tokens as usize;
    let mut total = 0usize;
    let mut window: Vec<Turn> = Vec::new();

    for turn in turns.into_iter().rev() {
        let cost = estimate_tokens(&turn.text, config.chars_per_token);
        if config.soft_limit {
            total += cost;
            window.push(turn);
            if total >= budget {
                break;
            }
        } else {
            if total + cost > budget {
                break;
            }
            total += cost;
            window.push(turn);
        }
    }

    // Collected newest-first; restore chronological order.
    window.reverse();
    window
}
