//! Hand pattern classification and comparison.
//!
//! The registry evaluates every pattern matcher against a candidate multiset
//! and keeps the best result by `(priority, key)`. Matchers are structurally
//! disjoint for well-formed card counts; the max-pick rule keeps the engine
//! robust if a future matcher overlaps an existing one.
//!
//! To add a pattern: implement [`HandPattern`], override `same_shape` when a
//! length constraint applies, and register it via [`HandRegistry::register`].

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::cards::{Card, Rank};

/// Cross-pattern dominance tier. A higher tier beats any lower tier
/// regardless of key.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Deserialize)]
#[serde(try_from = "u8")]
pub enum Priority {
    /// Singles, pairs, triples, sequences and their attachments.
    Normal = 10,
    /// Four-with-two attachment shapes.
    Strong = 20,
    /// Four of a kind.
    Bomb = 90,
    /// Both jokers together.
    JokerBomb = 100,
}

impl Serialize for Priority {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

impl TryFrom<u8> for Priority {
    type Error = String;
    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            10 => Ok(Priority::Normal),
            20 => Ok(Priority::Strong),
            90 => Ok(Priority::Bomb),
            100 => Ok(Priority::JokerBomb),
            other => Err(format!("unknown pattern priority {other}")),
        }
    }
}

/// Shape-variant metadata. Empty for fixed-size patterns; sequences record
/// their length so two runs only compare when equally long.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct MatchMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length_pairs: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length_triples: Option<usize>,
}

impl MatchMeta {
    fn length(n: usize) -> Self {
        MatchMeta {
            length: Some(n),
            ..Default::default()
        }
    }
    fn pairs(n: usize) -> Self {
        MatchMeta {
            length_pairs: Some(n),
            ..Default::default()
        }
    }
    fn triples(n: usize) -> Self {
        MatchMeta {
            length_triples: Some(n),
            ..Default::default()
        }
    }
}

/// Result of classifying a card multiset: pattern id, principal rank value,
/// shape metadata, dominance tier and card count. Transient; only the summary
/// fields end up inside a PLAY event payload.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct HandMatch {
    pub name: String,
    pub key: u8,
    pub meta: MatchMeta,
    pub priority: Priority,
    #[serde(skip)]
    pub size: usize,
}

/// One pluggable shape matcher. Matchers must be independent and
/// self-contained; the registry never assumes which ones exist.
pub trait HandPattern {
    fn name(&self) -> &'static str;

    fn priority(&self) -> Priority {
        Priority::Normal
    }

    fn matches(&self, cards: &[Card]) -> Option<HandMatch>;

    /// Whether two matches are the same shape (length, attachments...).
    fn same_shape(&self, a: &HandMatch, b: &HandMatch) -> bool {
        a.name == b.name
    }
}

fn counts_by_rank(cards: &[Card]) -> BTreeMap<Rank, usize> {
    let mut cnt = BTreeMap::new();
    for c in cards {
        *cnt.entry(c.rank).or_default() += 1;
    }
    cnt
}

/// Strictly consecutive ranks, with 2 and both jokers excluded from any run.
fn is_consecutive(ranks: &[Rank]) -> bool {
    if ranks
        .iter()
        .any(|r| matches!(r, Rank::Two | Rank::BlackJoker | Rank::RedJoker))
    {
        return false;
    }
    ranks
        .windows(2)
        .all(|w| w[1].value() == w[0].value() + 1)
}

fn sorted_counts(cnt: &BTreeMap<Rank, usize>) -> Vec<usize> {
    let mut v: Vec<usize> = cnt.values().copied().collect();
    v.sort_unstable();
    v
}

fn rank_with_count(cnt: &BTreeMap<Rank, usize>, target: usize) -> Option<Rank> {
    cnt.iter().find(|(_, &c)| c == target).map(|(&r, _)| r)
}

fn simple(name: &'static str, key: Rank, priority: Priority, size: usize) -> HandMatch {
    HandMatch {
        name: name.to_string(),
        key: key.value(),
        meta: MatchMeta::default(),
        priority,
        size,
    }
}

// ---------------------------- Built-in patterns ----------------------------

struct Single;
impl HandPattern for Single {
    fn name(&self) -> &'static str {
        "single"
    }
    fn matches(&self, cards: &[Card]) -> Option<HandMatch> {
        if cards.len() == 1 {
            Some(simple(self.name(), cards[0].rank, self.priority(), 1))
        } else {
            None
        }
    }
}

struct Pair;
impl HandPattern for Pair {
    fn name(&self) -> &'static str {
        "pair"
    }
    fn matches(&self, cards: &[Card]) -> Option<HandMatch> {
        if cards.len() != 2 {
            return None;
        }
        let cnt = counts_by_rank(cards);
        let r = rank_with_count(&cnt, 2)?;
        Some(simple(self.name(), r, self.priority(), 2))
    }
}

struct Triple;
impl HandPattern for Triple {
    fn name(&self) -> &'static str {
        "triple"
    }
    fn matches(&self, cards: &[Card]) -> Option<HandMatch> {
        if cards.len() != 3 {
            return None;
        }
        let cnt = counts_by_rank(cards);
        let r = rank_with_count(&cnt, 3)?;
        Some(simple(self.name(), r, self.priority(), 3))
    }
}

struct TripleWithSingle;
impl HandPattern for TripleWithSingle {
    fn name(&self) -> &'static str {
        "triple_with_single"
    }
    fn matches(&self, cards: &[Card]) -> Option<HandMatch> {
        if cards.len() != 4 {
            return None;
        }
        let cnt = counts_by_rank(cards);
        if sorted_counts(&cnt) != [1, 3] {
            return None;
        }
        let r = rank_with_count(&cnt, 3)?;
        Some(simple(self.name(), r, self.priority(), 4))
    }
}

struct TripleWithPair;
impl HandPattern for TripleWithPair {
    fn name(&self) -> &'static str {
        "triple_with_pair"
    }
    fn matches(&self, cards: &[Card]) -> Option<HandMatch> {
        if cards.len() != 5 {
            return None;
        }
        let cnt = counts_by_rank(cards);
        if sorted_counts(&cnt) != [2, 3] {
            return None;
        }
        let r = rank_with_count(&cnt, 3)?;
        Some(simple(self.name(), r, self.priority(), 5))
    }
}

struct Sequence;
impl HandPattern for Sequence {
    fn name(&self) -> &'static str {
        "sequence"
    }
    fn matches(&self, cards: &[Card]) -> Option<HandMatch> {
        if cards.len() < 5 {
            return None;
        }
        let cnt = counts_by_rank(cards);
        if cnt.len() != cards.len() {
            return None;
        }
        let ranks: Vec<Rank> = cnt.keys().copied().collect();
        if !is_consecutive(&ranks) {
            return None;
        }
        Some(HandMatch {
            name: self.name().to_string(),
            key: ranks[ranks.len() - 1].value(),
            meta: MatchMeta::length(ranks.len()),
            priority: self.priority(),
            size: cards.len(),
        })
    }
    fn same_shape(&self, a: &HandMatch, b: &HandMatch) -> bool {
        a.name == b.name && a.meta.length == b.meta.length
    }
}

struct PairSequence;
impl HandPattern for PairSequence {
    fn name(&self) -> &'static str {
        "pair_sequence"
    }
    fn matches(&self, cards: &[Card]) -> Option<HandMatch> {
        if cards.len() < 6 || cards.len() % 2 != 0 {
            return None;
        }
        let cnt = counts_by_rank(cards);
        if !cnt.values().all(|&c| c == 2) {
            return None;
        }
        let ranks: Vec<Rank> = cnt.keys().copied().collect();
        if !is_consecutive(&ranks) {
            return None;
        }
        Some(HandMatch {
            name: self.name().to_string(),
            key: ranks[ranks.len() - 1].value(),
            meta: MatchMeta::pairs(cards.len() / 2),
            priority: self.priority(),
            size: cards.len(),
        })
    }
    fn same_shape(&self, a: &HandMatch, b: &HandMatch) -> bool {
        a.name == b.name && a.meta.length_pairs == b.meta.length_pairs
    }
}

struct TripleSequence;
impl HandPattern for TripleSequence {
    fn name(&self) -> &'static str {
        "triple_sequence"
    }
    fn matches(&self, cards: &[Card]) -> Option<HandMatch> {
        if cards.len() < 6 || cards.len() % 3 != 0 {
            return None;
        }
        let cnt = counts_by_rank(cards);
        if !cnt.values().all(|&c| c == 3) {
            return None;
        }
        let ranks: Vec<Rank> = cnt.keys().copied().collect();
        if !is_consecutive(&ranks) {
            return None;
        }
        Some(HandMatch {
            name: self.name().to_string(),
            key: ranks[ranks.len() - 1].value(),
            meta: MatchMeta::triples(cards.len() / 3),
            priority: self.priority(),
            size: cards.len(),
        })
    }
    fn same_shape(&self, a: &HandMatch, b: &HandMatch) -> bool {
        a.name == b.name && a.meta.length_triples == b.meta.length_triples
    }
}

struct FourWithTwoSingles;
impl HandPattern for FourWithTwoSingles {
    fn name(&self) -> &'static str {
        "four_with_two_singles"
    }
    fn priority(&self) -> Priority {
        Priority::Strong
    }
    fn matches(&self, cards: &[Card]) -> Option<HandMatch> {
        if cards.len() != 6 {
            return None;
        }
        let cnt = counts_by_rank(cards);
        if sorted_counts(&cnt) != [1, 1, 4] {
            return None;
        }
        let r = rank_with_count(&cnt, 4)?;
        Some(simple(self.name(), r, self.priority(), 6))
    }
}

struct FourWithTwoPairs;
impl HandPattern for FourWithTwoPairs {
    fn name(&self) -> &'static str {
        "four_with_two_pairs"
    }
    fn priority(&self) -> Priority {
        Priority::Strong
    }
    fn matches(&self, cards: &[Card]) -> Option<HandMatch> {
        if cards.len() != 8 {
            return None;
        }
        let cnt = counts_by_rank(cards);
        if sorted_counts(&cnt) != [2, 2, 4] {
            return None;
        }
        let r = rank_with_count(&cnt, 4)?;
        Some(simple(self.name(), r, self.priority(), 8))
    }
}

struct Bomb;
impl HandPattern for Bomb {
    fn name(&self) -> &'static str {
        "bomb"
    }
    fn priority(&self) -> Priority {
        Priority::Bomb
    }
    fn matches(&self, cards: &[Card]) -> Option<HandMatch> {
        if cards.len() != 4 {
            return None;
        }
        let cnt = counts_by_rank(cards);
        let r = rank_with_count(&cnt, 4)?;
        Some(simple(self.name(), r, self.priority(), 4))
    }
}

struct JokerBomb;
impl HandPattern for JokerBomb {
    fn name(&self) -> &'static str {
        "joker_bomb"
    }
    fn priority(&self) -> Priority {
        Priority::JokerBomb
    }
    fn matches(&self, cards: &[Card]) -> Option<HandMatch> {
        if cards.len() != 2 {
            return None;
        }
        let mut ranks = [cards[0].rank, cards[1].rank];
        ranks.sort();
        if ranks == [Rank::BlackJoker, Rank::RedJoker] {
            Some(simple(self.name(), Rank::RedJoker, self.priority(), 2))
        } else {
            None
        }
    }
}

// ------------------------------- Registry ---------------------------------

/// Pattern registry plus comparison rules.
pub struct HandRegistry {
    patterns: Vec<Box<dyn HandPattern + Send + Sync>>,
}

impl Default for HandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl HandRegistry {
    /// Registry with all built-in patterns. Registration order does not
    /// affect comparison since evaluation picks the best match.
    pub fn new() -> Self {
        Self {
            patterns: vec![
                Box::new(JokerBomb),
                Box::new(Bomb),
                Box::new(FourWithTwoPairs),
                Box::new(FourWithTwoSingles),
                Box::new(TripleSequence),
                Box::new(PairSequence),
                Box::new(Sequence),
                Box::new(TripleWithPair),
                Box::new(TripleWithSingle),
                Box::new(Triple),
                Box::new(Pair),
                Box::new(Single),
            ],
        }
    }

    pub fn register(&mut self, pattern: Box<dyn HandPattern + Send + Sync>) {
        self.patterns.push(pattern);
    }

    /// Classify a multiset: run every matcher, keep the lexicographically
    /// largest `(priority, key)`. `None` means no legal combination.
    pub fn evaluate(&self, cards: &[Card]) -> Option<HandMatch> {
        let mut best: Option<HandMatch> = None;
        for p in &self.patterns {
            if let Some(m) = p.matches(cards) {
                let better = match &best {
                    None => true,
                    Some(b) => (m.priority, m.key) > (b.priority, b.key),
                };
                if better {
                    best = Some(m);
                }
            }
        }
        best
    }

    /// Compare two classified hands. `None` means incomparable: the
    /// combination cannot legally follow (same tier but a different pattern,
    /// or same pattern but a different shape variant).
    pub fn compare(&self, a: &HandMatch, b: &HandMatch) -> Option<Ordering> {
        if a.name != b.name {
            if a.priority != b.priority {
                return Some(a.priority.cmp(&b.priority));
            }
            return None;
        }
        let p = self.find(&a.name)?;
        if p.same_shape(a, b) {
            // Keys never tie: both sides come from disjoint multisets.
            Some(a.key.cmp(&b.key))
        } else {
            None
        }
    }

    /// Whether `current` beats `last` under pattern rules.
    pub fn can_beat(&self, current: &[Card], last: &[Card]) -> bool {
        match (self.evaluate(current), self.evaluate(last)) {
            (Some(a), Some(b)) => self.compare(&a, &b) == Some(Ordering::Greater),
            _ => false,
        }
    }

    fn find(&self, name: &str) -> Option<&(dyn HandPattern + Send + Sync)> {
        self.patterns
            .iter()
            .find(|p| p.name() == name)
            .map(|b| b.as_ref())
    }
}
