use rand::seq::SliceRandom;

pub const SYMBOLS: [&str; 8] = ["🐶", "🐱", "🐰", "🦊", "🐻", "🐼", "🐨", "🐯"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipOutcome {
    /// Card already face up, or two cards are waiting to be resolved.
    Ignored,
    /// First card of a pair turned over.
    Flipped,
    /// Second card turned over; call [`MemoryGame::resolve`] next.
    PairPending,
}

/// Pair-matching game. Cards are flipped two at a time; a matching pair
/// stays face up, a mismatch is turned back over on `resolve`.
#[derive(Debug, Clone)]
pub struct MemoryGame {
    cards: Vec<&'static str>,
    matched: Vec<bool>,
    flipped: Vec<usize>,
    pairs_found: usize,
}

impl Default for MemoryGame {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryGame {
    /// Shuffled deck with two of each symbol.
    pub fn new() -> Self {
        let mut cards: Vec<&'static str> = SYMBOLS.iter().chain(SYMBOLS.iter()).copied().collect();
        cards.shuffle(&mut rand::rng());
        Self::with_layout(cards)
    }

    /// Deck in a fixed order.
    pub fn with_layout(cards: Vec<&'static str>) -> Self {
        let len = cards.len();
        Self {
            cards,
            matched: vec![false; len],
            flipped: Vec::with_capacity(2),
            pairs_found: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Symbol to show for a card, `None` while it is face down.
    pub fn face(&self, index: usize) -> Option<&'static str> {
        let visible = self.matched.get(index).copied().unwrap_or(false) || self.flipped.contains(&index);
        visible.then(|| self.cards[index])
    }

    pub fn flip(&mut self, index: usize) -> FlipOutcome {
        if index >= self.cards.len()
            || self.matched[index]
            || self.flipped.contains(&index)
            || self.flipped.len() == 2
        {
            return FlipOutcome::Ignored;
        }

        self.flipped.push(index);
        if self.flipped.len() == 2 {
            FlipOutcome::PairPending
        } else {
            FlipOutcome::Flipped
        }
    }

    /// Settle a pending pair. Returns `Some(true)` on a match, `Some(false)`
    /// when both cards are turned back over, `None` if no pair is pending.
    pub fn resolve(&mut self) -> Option<bool> {
        let &[a, b] = self.flipped.as_slice() else {
            return None;
        };
        self.flipped.clear();

        if self.cards[a] == self.cards[b] {
            self.matched[a] = true;
            self.matched[b] = true;
            self.pairs_found += 1;
            Some(true)
        } else {
            Some(false)
        }
    }

    pub fn pairs_found(&self) -> usize {
        self.pairs_found
    }

    pub fn is_complete(&self) -> bool {
        self.matched.iter().all(|m| *m)
    }
}
