use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::cards::{normalize_token, sort_cards, Card, Rank};

/// Player identity in standard Dou Dizhu.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum Role {
    Landlord,
    Peasant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Landlord => "Landlord",
            Role::Peasant => "Peasant",
        }
    }
}

/// A seat at the table: name, ordered hand and role tag. The hand is mutated
/// only through deal/play/take/add operations.
#[derive(Debug, Clone)]
pub struct Player {
    pub name: String,
    pub cards: Vec<Card>,
    pub role: Role,
}

impl Player {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cards: Vec::new(),
            role: Role::Peasant,
        }
    }

    pub fn sort(&mut self) {
        sort_cards(&mut self.cards);
    }

    /// Multiset containment by rank tokens (suits are irrelevant to play).
    pub fn has_cards(&self, tokens: &[String]) -> bool {
        let mut want: BTreeMap<Rank, usize> = BTreeMap::new();
        for t in tokens {
            match Rank::from_token(&normalize_token(t)) {
                Some(r) => *want.entry(r).or_default() += 1,
                None => return false,
            }
        }
        let mut own: BTreeMap<Rank, usize> = BTreeMap::new();
        for c in &self.cards {
            *own.entry(c.rank).or_default() += 1;
        }
        want.iter().all(|(r, n)| own.get(r).copied().unwrap_or(0) >= *n)
    }

    /// Remove the first matching instance of each rank token, in stable hand
    /// order, and return the removed cards.
    pub fn take_cards(&mut self, tokens: &[String]) -> Vec<Card> {
        let mut taken = Vec::with_capacity(tokens.len());
        for t in tokens {
            let tok = normalize_token(t);
            if let Some(i) = self.cards.iter().position(|c| c.rank.token() == tok) {
                taken.push(self.cards.remove(i));
            }
        }
        taken
    }

    /// Pick cards by rank tokens without mutating the hand (validation
    /// preview before commit).
    pub fn pick(&self, tokens: &[String]) -> Vec<Card> {
        let mut hand = self.cards.clone();
        let mut picked = Vec::with_capacity(tokens.len());
        for t in tokens {
            let tok = normalize_token(t);
            if let Some(i) = hand.iter().position(|c| c.rank.token() == tok) {
                picked.push(hand.remove(i));
            }
        }
        picked
    }

    pub fn add_cards(&mut self, cards: impl IntoIterator<Item = Card>) {
        self.cards.extend(cards);
        self.sort();
    }

    /// One-line grouped summary for console output, lowest rank first.
    pub fn display(&self) -> String {
        let mut cnt: BTreeMap<Rank, usize> = BTreeMap::new();
        for c in &self.cards {
            *cnt.entry(c.rank).or_default() += 1;
        }
        let bundle = cnt
            .iter()
            .map(|(r, n)| format!("{}×{}", r.token(), n))
            .collect::<Vec<_>>()
            .join(" ");
        format!("[{} | {}] {}", self.name, self.role.as_str(), bundle)
    }
}
