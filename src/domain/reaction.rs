//! Reaction symbols and the signed action sent to the server.
//!
//! A reaction symbol is the code point of an emoji written as `U+XXXX`
//! (`"U+1F44D"` for a thumbs up). The server keys reaction tallies by this
//! string, and the local reaction store records membership with it.

use serde::{Deserialize, Serialize};

/// Glyph used when a symbol does not name a valid code point.
const FALLBACK_EMOJI: &str = "\u{1F600}";

/// Direction of a reaction change.
///
/// Serialized as the signed integer the API expects: `1` for add, `-1` for
/// remove.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i32", try_from = "i32")]
pub enum ReactionAction {
    /// Apply the reaction (count goes up).
    Add,
    /// Withdraw the reaction (count goes down).
    Remove,
}

impl ReactionAction {
    /// Signed delta sent to the server.
    #[must_use]
    pub const fn delta(self) -> i32 {
        match self {
            Self::Add => 1,
            Self::Remove => -1,
        }
    }
}

impl From<ReactionAction> for i32 {
    fn from(action: ReactionAction) -> Self {
        action.delta()
    }
}

impl TryFrom<i32> for ReactionAction {
    type Error = String;

    fn try_from(value: i32) -> std::result::Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Add),
            -1 => Ok(Self::Remove),
            other => Err(format!("invalid reaction action: {other}")),
        }
    }
}

/// One entry of the reaction picker palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmojiChoice {
    /// Rendered glyph.
    pub glyph: &'static str,
    /// Code point symbol sent to the server.
    pub symbol: &'static str,
    /// Short name, useful for accessibility labels.
    pub name: &'static str,
}

/// Reactions offered by the picker, in display order.
pub const COMMON_REACTIONS: [EmojiChoice; 18] = [
    EmojiChoice { glyph: "\u{1F44D}", symbol: "U+1F44D", name: "thumbs_up" },
    EmojiChoice { glyph: "\u{1F44E}", symbol: "U+1F44E", name: "thumbs_down" },
    EmojiChoice { glyph: "\u{2764}\u{FE0F}", symbol: "U+2764", name: "heart" },
    EmojiChoice { glyph: "\u{1F602}", symbol: "U+1F602", name: "joy" },
    EmojiChoice { glyph: "\u{1F62E}", symbol: "U+1F62E", name: "open_mouth" },
    EmojiChoice { glyph: "\u{1F622}", symbol: "U+1F622", name: "crying_face" },
    EmojiChoice { glyph: "\u{1F621}", symbol: "U+1F621", name: "rage" },
    EmojiChoice { glyph: "\u{1F525}", symbol: "U+1F525", name: "fire" },
    EmojiChoice { glyph: "\u{1F4AF}", symbol: "U+1F4AF", name: "hundred" },
    EmojiChoice { glyph: "\u{1F389}", symbol: "U+1F389", name: "tada" },
    EmojiChoice { glyph: "\u{1F914}", symbol: "U+1F914", name: "thinking" },
    EmojiChoice { glyph: "\u{1F60D}", symbol: "U+1F60D", name: "heart_eyes" },
    EmojiChoice { glyph: "\u{1F644}", symbol: "U+1F644", name: "eye_roll" },
    EmojiChoice { glyph: "\u{1F60E}", symbol: "U+1F60E", name: "sunglasses" },
    EmojiChoice { glyph: "\u{1F923}", symbol: "U+1F923", name: "rofl" },
    EmojiChoice { glyph: "\u{1F62D}", symbol: "U+1F62D", name: "sob" },
    EmojiChoice { glyph: "\u{1F97A}", symbol: "U+1F97A", name: "pleading_face" },
    EmojiChoice { glyph: "\u{1F624}", symbol: "U+1F624", name: "triumph" },
];

/// Renders a `U+XXXX` symbol as its emoji glyph.
///
/// Invalid symbols render as a neutral smiley rather than failing.
///
/// # Examples
///
/// ```
/// use fesnuk::domain::symbol_to_emoji;
///
/// assert_eq!(symbol_to_emoji("U+1F44D"), "\u{1F44D}");
/// assert_eq!(symbol_to_emoji("U+ZZZZ"), "\u{1F600}");
/// ```
#[must_use]
pub fn symbol_to_emoji(symbol: &str) -> String {
    let hex = symbol.strip_prefix("U+").unwrap_or(symbol);
    u32::from_str_radix(hex, 16)
        .ok()
        .and_then(char::from_u32)
        .map_or_else(|| FALLBACK_EMOJI.to_string(), String::from)
}

/// Looks up the palette entry for a symbol.
#[must_use]
pub fn find_choice(symbol: &str) -> Option<&'static EmojiChoice> {
    COMMON_REACTIONS.iter().find(|choice| choice.symbol == symbol)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_serializes_as_signed_delta() {
        assert_eq!(serde_json::to_string(&ReactionAction::Add).unwrap(), "1");
        assert_eq!(serde_json::to_string(&ReactionAction::Remove).unwrap(), "-1");
        let parsed: ReactionAction = serde_json::from_str("-1").unwrap();
        assert_eq!(parsed, ReactionAction::Remove);
        assert!(serde_json::from_str::<ReactionAction>("2").is_err());
    }

    #[test]
    fn palette_symbols_render_to_their_glyph_prefix() {
        for choice in &COMMON_REACTIONS {
            assert!(choice.glyph.starts_with(&symbol_to_emoji(choice.symbol)));
        }
        assert_eq!(find_choice("U+1F525").map(|c| c.name), Some("fire"));
    }
}
