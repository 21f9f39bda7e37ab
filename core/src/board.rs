use alloc::string::String;
use alloc::vec::Vec;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Cards laid out in a `rows × cols` grid, addressed row-major by flat index.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Board {
    cards: Array2<Card>,
    symbols: Vec<String>,
}

impl Board {
    /// Builds a board from cards in row-major order.
    ///
    /// Fails unless the card count fills the grid and every symbol appears exactly twice.
    pub fn from_cards(size: GridSize, cards: Vec<Card>, symbols: Vec<String>) -> Result<Self> {
        let mut counts: Vec<u8> = alloc::vec![0; symbols.len()];
        for card in &cards {
            let count = counts
                .get_mut(usize::from(card.symbol.0))
                .ok_or(GameError::InvalidBoardShape)?;
            *count = count.saturating_add(1);
        }
        if counts.iter().any(|&count| count != 2) {
            return Err(GameError::InvalidBoardShape);
        }

        let cards = Array2::from_shape_vec(size.to_nd_index(), cards)
            .map_err(|_| GameError::InvalidBoardShape)?;
        Ok(Self { cards, symbols })
    }

    pub fn size(&self) -> GridSize {
        let (rows, cols) = self.cards.dim();
        (
            rows.try_into().unwrap_or(Coord::MAX),
            cols.try_into().unwrap_or(Coord::MAX),
        )
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn total_pairs(&self) -> CardCount {
        (self.len() / 2).try_into().unwrap_or(CardCount::MAX)
    }

    pub fn card(&self, index: usize) -> Option<&Card> {
        let coords = index_to_coords(index, self.size())?;
        self.cards.get(coords.to_nd_index())
    }

    pub(crate) fn card_mut(&mut self, index: usize) -> Option<&mut Card> {
        let coords = index_to_coords(index, self.size())?;
        self.cards.get_mut(coords.to_nd_index())
    }

    /// Cards in row-major order.
    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }

    pub fn symbol_name(&self, symbol: SymbolId) -> Option<&str> {
        self.symbols.get(usize::from(symbol.0)).map(String::as_str)
    }

    pub fn face_at(&self, index: usize, phase: Phase) -> CardFace {
        let Some(card) = self.card(index) else {
            return CardFace::Hidden;
        };

        match (phase, card) {
            (Phase::Preview, card) => CardFace::Preview(card.symbol),
            (_, Card { is_matched: true, .. }) => CardFace::Matched(card.symbol),
            (_, Card { is_flipped: true, .. }) => CardFace::Revealed(card.symbol),
            _ => CardFace::Hidden,
        }
    }

    /// Turns every card face down again, matched ones included.
    pub(crate) fn cover_all(&mut self) {
        for card in self.cards.iter_mut() {
            card.is_flipped = false;
            card.is_matched = false;
        }
    }
}
