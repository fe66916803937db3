use rand::seq::SliceRandom;
use rand::Rng;

use crate::cards::{standard_deck, Card};

/// The undealt pile. Construction keeps deck order fixed until an explicit
/// shuffle with a caller-supplied RNG, so tests and replays stay
/// deterministic.
#[derive(Debug)]
pub struct Deck {
    cards: Vec<Card>,
    position: usize,
}

impl Deck {
    pub fn standard() -> Self {
        Self {
            cards: standard_deck(),
            position: 0,
        }
    }

    pub fn shuffle<R: Rng>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
        self.position = 0;
    }

    pub fn deal_card(&mut self) -> Option<Card> {
        if self.position >= self.cards.len() {
            None
        } else {
            let c = self.cards[self.position];
            self.position += 1;
            Some(c)
        }
    }

    /// Drain whatever is left (the bottom cards after a round-robin deal).
    pub fn take_rest(&mut self) -> Vec<Card> {
        self.cards.split_off(self.position)
    }
}
