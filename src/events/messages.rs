//! Compile-time message templates for adventure-log entries generated by
//! event handlers rather than typed directly by a player.
//!
//! The set of templates is fixed and known at compile time, so this is a
//! handful of typed builder functions instead of a runtime template
//! engine — the same "prefer compile-time structure over runtime
//! generality" idiom the crate already uses for field validation.

use crate::domain::PlayerName;

#[must_use]
pub fn player_connected(player: &PlayerName) -> String {
    format!("{player} connected")
}

#[must_use]
pub fn player_disconnected(player: &PlayerName) -> String {
    format!("{player} disconnected")
}

#[must_use]
pub fn player_displaced(player: &PlayerName) -> String {
    format!("{player} was moved to lobby due to seat reduction")
}

#[must_use]
pub fn party_updated() -> String {
    "party roster updated".to_string()
}

#[must_use]
pub fn messages_cleared(scope: &str) -> String {
    format!("{scope} messages cleared")
}

/// Builds the `dice_roll.message` string per the documented format:
/// `[context]: NdM: [r1, r2, …] ±mod = total (Advantage|Disadvantage)?`,
/// omitting brackets/modifier when absent.
#[must_use]
pub fn format_dice_roll(
    context: Option<&str>,
    notation: &str,
    results: &[i64],
    modifier: Option<i64>,
    total: i64,
    advantage: Option<&str>,
) -> String {
    let mut out = String::new();
    if let Some(context) = context {
        out.push_str(&format!("[{context}]: "));
    }
    let results_str = results
        .iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    out.push_str(&format!("{notation}: [{results_str}]"));
    if let Some(modifier) = modifier {
        if modifier != 0 {
            let sign = if modifier >= 0 { "+" } else { "-" };
            out.push_str(&format!(" {sign}{}", modifier.abs()));
        }
    }
    out.push_str(&format!(" = {total}"));
    if let Some(advantage) = advantage {
        out.push_str(&format!(" ({advantage})"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_full_roll() {
        let msg = format_dice_roll(Some("dex save"), "1d20", &[17], Some(2), 19, None);
        assert_eq!(msg, "[dex save]: 1d20: [17] +2 = 19");
    }

    #[test]
    fn omits_brackets_and_modifier_when_absent() {
        let msg = format_dice_roll(None, "2d6", &[3, 5], None, 8, Some("Advantage"));
        assert_eq!(msg, "2d6: [3, 5] = 8 (Advantage)");
    }
}
