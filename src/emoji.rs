//! Static registry of reaction symbols eligible for relay.
//!
//! Inbound reactions whose symbol is not in this table are ignored by the
//! router. The table is a fixed compile-time slice; lookups are stable and
//! order-independent.

/// Metadata for a supported reaction symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmojiInfo {
    /// The reaction symbol as delivered by the source platform.
    pub symbol: &'static str,
    /// Short human-readable name.
    pub name: &'static str,
}

/// Reaction symbols the bridge is willing to relay.
const REGISTRY: &[EmojiInfo] = &[
    EmojiInfo { symbol: "👍", name: "thumbs up" },
    EmojiInfo { symbol: "👎", name: "thumbs down" },
    EmojiInfo { symbol: "❤️", name: "heart" },
    EmojiInfo { symbol: "😂", name: "joy" },
    EmojiInfo { symbol: "😆", name: "laughing" },
    EmojiInfo { symbol: "😮", name: "surprised" },
    EmojiInfo { symbol: "😢", name: "crying" },
    EmojiInfo { symbol: "😡", name: "angry" },
    EmojiInfo { symbol: "🎉", name: "party" },
    EmojiInfo { symbol: "🔥", name: "fire" },
    EmojiInfo { symbol: "💯", name: "hundred" },
    EmojiInfo { symbol: "👀", name: "eyes" },
    EmojiInfo { symbol: "🙏", name: "pray" },
    EmojiInfo { symbol: "👏", name: "clap" },
    EmojiInfo { symbol: "✅", name: "check" },
    EmojiInfo { symbol: "❌", name: "cross" },
    EmojiInfo { symbol: "❓", name: "question" },
    EmojiInfo { symbol: "💀", name: "skull" },
];

/// Look up metadata for a reaction symbol.
#[must_use]
pub fn lookup(symbol: &str) -> Option<&'static EmojiInfo> {
    REGISTRY.iter().find(|info| info.symbol == symbol)
}

/// Whether a reaction symbol is eligible for relay.
#[must_use]
pub fn is_supported(symbol: &str) -> bool {
    lookup(symbol).is_some()
}
