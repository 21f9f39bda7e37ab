use serde::{Deserialize, Serialize};

/// Index into the symbol table of the board a card was dealt on.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SymbolId(pub u8);

/// Identity of one card instance, unique within a board even between the two cards of a pair.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CardId(pub u16);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub symbol: SymbolId,
    pub id: CardId,
    pub is_flipped: bool,
    pub is_matched: bool,
}

impl Card {
    pub const fn new(symbol: SymbolId, id: CardId) -> Self {
        Self {
            symbol,
            id,
            is_flipped: false,
            is_matched: false,
        }
    }

    /// Whether a flip request may turn this card face up.
    pub const fn is_face_down(&self) -> bool {
        !self.is_flipped && !self.is_matched
    }
}

/// What a single cell shows to the player.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardFace {
    Hidden,
    /// Visible during the preview countdown without being flipped.
    Preview(SymbolId),
    Revealed(SymbolId),
    Matched(SymbolId),
}

impl CardFace {
    pub const fn symbol(self) -> Option<SymbolId> {
        use CardFace::*;
        match self {
            Hidden => None,
            Preview(symbol) => Some(symbol),
            Revealed(symbol) => Some(symbol),
            Matched(symbol) => Some(symbol),
        }
    }
}

impl Default for CardFace {
    fn default() -> Self {
        Self::Hidden
    }
}
