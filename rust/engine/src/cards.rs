use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// Represents the rank of a Dou Dizhu card, jokers included.
/// Ordinal values define the game's total rank order: 3 is lowest, the red
/// joker is highest, and 2 sits above the ace.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum Rank {
    /// Rank 3 (lowest)
    Three = 0,
    /// Rank 4
    Four,
    /// Rank 5
    Five,
    /// Rank 6
    Six,
    /// Rank 7
    Seven,
    /// Rank 8
    Eight,
    /// Rank 9
    Nine,
    /// Rank 10
    Ten,
    /// Jack
    Jack,
    /// Queen
    Queen,
    /// King
    King,
    /// Ace
    Ace,
    /// Rank 2 (above the ace)
    Two,
    /// Black joker
    BlackJoker,
    /// Red joker (highest)
    RedJoker,
}

impl Rank {
    /// Ordinal used as the comparison key everywhere in the pattern engine.
    pub fn value(self) -> u8 {
        self as u8
    }

    pub fn token(self) -> &'static str {
        match self {
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
            Rank::Ace => "A",
            Rank::Two => "2",
            Rank::BlackJoker => "BJ",
            Rank::RedJoker => "RJ",
        }
    }

    pub fn from_token(tok: &str) -> Option<Rank> {
        all_ranks().into_iter().find(|r| r.token() == tok)
    }

    pub fn is_joker(self) -> bool {
        matches!(self, Rank::BlackJoker | Rank::RedJoker)
    }
}

/// Represents one of the four suits. Suit never affects play legality; it is
/// only a secondary sort key for stable display.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum Suit {
    /// Spades suit (♠)
    Spades,
    /// Hearts suit (♥)
    Hearts,
    /// Clubs suit (♣)
    Clubs,
    /// Diamonds suit (♦)
    Diamonds,
}

impl Suit {
    pub fn symbol(self) -> char {
        match self {
            Suit::Spades => '♠',
            Suit::Hearts => '♥',
            Suit::Clubs => '♣',
            Suit::Diamonds => '♦',
        }
    }

    pub fn from_symbol(c: char) -> Option<Suit> {
        match c {
            '♠' => Some(Suit::Spades),
            '♥' => Some(Suit::Hearts),
            '♣' => Some(Suit::Clubs),
            '♦' => Some(Suit::Diamonds),
            _ => None,
        }
    }
}

/// A single playing card. Jokers carry no suit. Cards are plain values with
/// no identity beyond (rank, suit); two cards with the same code are
/// indistinguishable, which the ledger format relies on.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Card {
    pub rank: Rank,
    pub suit: Option<Suit>,
}

impl Card {
    pub fn new(rank: Rank, suit: Suit) -> Card {
        Card {
            rank,
            suit: Some(suit),
        }
    }

    pub fn joker(rank: Rank) -> Card {
        debug_assert!(rank.is_joker());
        Card { rank, suit: None }
    }

    pub fn is_joker(&self) -> bool {
        self.rank.is_joker()
    }

    /// Canonical string code, e.g. `3♠`, `10♦`, `BJ`. This is the exact form
    /// written into ledger payloads.
    pub fn code(&self) -> String {
        match self.suit {
            Some(s) => format!("{}{}", self.rank.token(), s.symbol()),
            None => self.rank.token().to_string(),
        }
    }

    pub fn from_code(code: &str) -> Option<Card> {
        if let Some(r) = Rank::from_token(code) {
            if r.is_joker() {
                return Some(Card { rank: r, suit: None });
            }
        }
        let last = code.chars().last()?;
        let suit = Suit::from_symbol(last)?;
        let rank = Rank::from_token(&code[..code.len() - last.len_utf8()])?;
        if rank.is_joker() {
            return None;
        }
        Some(Card {
            rank,
            suit: Some(suit),
        })
    }

    /// Short text for console output (rank token only).
    pub fn short(&self) -> &'static str {
        self.rank.token()
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl Ord for Card {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.rank, self.suit).cmp(&(other.rank, other.suit))
    }
}

impl PartialOrd for Card {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

// Cards travel through the ledger as their code string.
impl Serialize for Card {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.code())
    }
}

impl<'de> Deserialize<'de> for Card {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CodeVisitor;
        impl Visitor<'_> for CodeVisitor {
            type Value = Card;
            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a card code like 3♠ or BJ")
            }
            fn visit_str<E: de::Error>(self, v: &str) -> Result<Card, E> {
                Card::from_code(v).ok_or_else(|| E::custom(format!("bad card code {v:?}")))
            }
        }
        deserializer.deserialize_str(CodeVisitor)
    }
}

pub fn all_ranks() -> [Rank; 15] {
    [
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
        Rank::Two,
        Rank::BlackJoker,
        Rank::RedJoker,
    ]
}

pub fn all_suits() -> [Suit; 4] {
    [Suit::Spades, Suit::Hearts, Suit::Clubs, Suit::Diamonds]
}

/// Build one 54-card Dou Dizhu deck (52 + 2 jokers).
pub fn standard_deck() -> Vec<Card> {
    let mut v = Vec::with_capacity(54);
    for &r in all_ranks().iter().take(13) {
        for &s in &all_suits() {
            v.push(Card::new(r, s));
        }
    }
    v.push(Card::joker(Rank::BlackJoker));
    v.push(Card::joker(Rank::RedJoker));
    v
}

/// Sort by rank value first, then suit for stable display.
pub fn sort_cards(cards: &mut [Card]) {
    cards.sort();
}

/// Normalize one user-typed token into a canonical rank token.
/// Accepts lowercase, `t` for 10 and the common `1` => `A` habit.
pub fn normalize_token(tok: &str) -> String {
    let t = tok.trim().to_uppercase();
    match t.as_str() {
        "T" => "10".to_string(),
        "1" | "01" => "A".to_string(),
        _ => t,
    }
}
