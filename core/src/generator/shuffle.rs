use alloc::string::{String, ToString};
use alloc::vec::Vec;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;

use super::*;

/// Deals boards by picking random distinct symbols from a pool and shuffling their pairs.
///
/// Every deal draws from the same RNG stream, so consecutive deals are independent of each
/// other while a fixed seed still reproduces the whole sequence.
#[derive(Clone, Debug)]
pub struct Dealer {
    rng: SmallRng,
    pool: Vec<String>,
}

impl Dealer {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            pool: SYMBOL_POOL.iter().map(|symbol| symbol.to_string()).collect(),
        }
    }

    /// Uses a custom symbol pool, which must cover the hardest difficulty.
    pub fn with_pool(seed: u64, pool: &[&str]) -> Result<Self> {
        check_pool(pool.len(), Difficulty::hardest())?;
        Ok(Self {
            rng: SmallRng::seed_from_u64(seed),
            pool: pool.iter().map(|symbol| symbol.to_string()).collect(),
        })
    }

    pub fn pool_size(&self) -> usize {
        self.pool.len()
    }

    fn pick_symbols(&mut self, count: usize) -> Vec<String> {
        let mut pool = self.pool.clone();
        let (picked, _) = pool.partial_shuffle(&mut self.rng, count);
        picked.to_vec()
    }
}

impl BoardGenerator for Dealer {
    fn deal(&mut self, difficulty: Difficulty) -> Result<Board> {
        check_pool(self.pool.len(), difficulty)?;

        let pairs = usize::from(difficulty.pairs());
        let symbols = self.pick_symbols(pairs);

        let mut cards = Vec::with_capacity(pairs * 2);
        for symbol in 0..pairs {
            let symbol = SymbolId(symbol.try_into().map_err(|_| GameError::InvalidBoardShape)?);
            for _ in 0..2 {
                let id = CardId(cards.len().try_into().map_err(|_| GameError::InvalidBoardShape)?);
                cards.push(Card::new(symbol, id));
            }
        }
        cards.shuffle(&mut self.rng);

        log::debug!("dealt {} board with {} pairs", difficulty, pairs);
        Board::from_cards(difficulty.size(), cards, symbols)
    }
}

fn check_pool(available: usize, difficulty: Difficulty) -> Result<()> {
    let needed = usize::from(difficulty.pairs());
    if available < needed {
        log::error!(
            "symbol pool has {} symbols, {} needs {}",
            available,
            difficulty,
            needed
        );
        return Err(GameError::SymbolPoolTooSmall { needed, available });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::collections::BTreeMap;

    fn symbol_counts(board: &Board) -> BTreeMap<SymbolId, usize> {
        let mut counts = BTreeMap::new();
        for card in board.cards() {
            *counts.entry(card.symbol).or_insert(0) += 1;
        }
        counts
    }

    #[test]
    fn default_pool_covers_hardest_board() {
        assert!(SYMBOL_POOL.len() >= usize::from(Difficulty::hardest().pairs()));
        let dealer = Dealer::new(0);
        assert_eq!(dealer.pool_size(), 32);
    }

    #[test]
    fn every_difficulty_deals_full_paired_board() {
        let mut dealer = Dealer::new(7);
        for difficulty in Difficulty::ALL {
            let board = dealer.deal(difficulty).unwrap();
            let (rows, cols) = difficulty.size();

            assert_eq!(board.len(), usize::from(rows) * usize::from(cols));
            assert_eq!(board.len() % 2, 0);
            assert_eq!(board.size(), (rows, cols));

            let counts = symbol_counts(&board);
            assert_eq!(counts.len(), usize::from(difficulty.pairs()));
            assert!(counts.values().all(|&count| count == 2));
            assert!(board.cards().all(|card| card.is_face_down()));
        }
    }

    #[test]
    fn card_identities_are_unique_per_instance() {
        let board = Dealer::new(3).deal(Difficulty::Medium).unwrap();
        let mut ids: Vec<CardId> = board.cards().map(|card| card.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), board.len());
    }

    #[test]
    fn symbol_names_are_distinct_pool_entries() {
        let board = Dealer::new(11).deal(Difficulty::Hard).unwrap();
        let mut names: Vec<&str> = (0..32)
            .map(|i| board.symbol_name(SymbolId(i)).unwrap())
            .collect();
        assert!(names.iter().all(|name| SYMBOL_POOL.contains(name)));
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 32);
    }

    #[test]
    fn deal_is_a_permutation_of_the_pairs() {
        let board = Dealer::new(42).deal(Difficulty::Hard).unwrap();
        let mut ids: Vec<u16> = board.cards().map(|card| card.id.0).collect();
        let unshuffled: Vec<u16> = (0..64).collect();
        assert_ne!(ids, unshuffled);

        // ids are handed out in pair order before the shuffle
        for card in board.cards() {
            assert_eq!(card.id.0 / 2, u16::from(card.symbol.0));
        }
        ids.sort();
        assert_eq!(ids, unshuffled);
    }

    #[test]
    fn deal_reaches_every_position() {
        let mut dealer = Dealer::new(5);
        let mut seen = [[false; 16]; 16];
        for _ in 0..600 {
            let board = dealer.deal(Difficulty::Easy).unwrap();
            for (pos, card) in board.cards().enumerate() {
                seen[usize::from(card.id.0)][pos] = true;
            }
        }
        assert!(seen.iter().flatten().all(|&hit| hit));
    }

    #[test]
    fn symbol_subset_varies_between_deals() {
        let mut dealer = Dealer::new(13);
        let names = |board: &Board| -> Vec<String> {
            let mut names: Vec<String> = (0..8)
                .map(|i| board.symbol_name(SymbolId(i)).unwrap().to_string())
                .collect();
            names.sort();
            names
        };
        let first = names(&dealer.deal(Difficulty::Easy).unwrap());
        let differs = (0..10).any(|_| names(&dealer.deal(Difficulty::Easy).unwrap()) != first);
        assert!(differs);
    }

    #[test]
    fn consecutive_deals_differ() {
        let mut dealer = Dealer::new(9);
        let first = dealer.deal(Difficulty::Easy).unwrap();
        let second = dealer.deal(Difficulty::Easy).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn small_pool_is_a_config_error() {
        let pool = ["a", "b", "c"];
        assert_eq!(
            Dealer::with_pool(1, &pool).unwrap_err(),
            GameError::SymbolPoolTooSmall {
                needed: 32,
                available: 3
            }
        );
    }

    #[test]
    fn custom_pool_is_used_for_faces() {
        let pool: Vec<String> = (0..40).map(|i| alloc::format!("s{i}")).collect();
        let pool: Vec<&str> = pool.iter().map(String::as_str).collect();
        let board = Dealer::with_pool(2, &pool)
            .unwrap()
            .deal(Difficulty::Easy)
            .unwrap();
        let name = board.symbol_name(board.card(0).unwrap().symbol).unwrap();
        assert!(name.starts_with('s'));
    }
}
