//! Deal and bidding for standard 3-player Dou Dizhu.
//!
//! Randomness (shuffle order, bidding start seat, no-bid landlord choice) is
//! always drawn from a caller-supplied RNG, so a seeded session replays the
//! exact same setup.

use std::collections::BTreeMap;

use rand::Rng;

use crate::cards::Card;
use crate::deck::Deck;
use crate::errors::SetupError;
use crate::events::{BidPayload, DealPayload, Event, SetLandlordPayload};
use crate::ledger::Ledger;
use crate::player::{Player, Role};

/// Table parameters for the standard single-deck game.
#[derive(Debug, Clone, Copy)]
pub struct GameConfig {
    /// Cards dealt to each seat before bidding.
    pub hand_size: usize,
    /// Cards reserved for the bidding winner.
    pub bottom_size: usize,
    /// Closed bid range; a bid must exceed `bid_min` to win outright.
    pub bid_min: i32,
    pub bid_max: i32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            hand_size: 17,
            bottom_size: 3,
            bid_min: 0,
            bid_max: 3,
        }
    }
}

/// Externalises how bids are collected and announced (terminal, tests,
/// simulations). Calls are synchronous; the state machine does not proceed
/// until each returns.
pub trait BiddingController {
    fn on_bidding_start(&mut self, _order: &[usize], _players: &[Player]) {}

    /// Offer a bid for `player` given the current strictly highest bid
    /// (`-1` before anyone has bid). Must return a value inside the
    /// configured range; anything else is a contract violation.
    fn choose_bid(&mut self, player: &Player, highest_bid: i32) -> i32;

    fn on_bid_committed(&mut self, _player: &Player, _bid: i32, _highest_bid: i32) {}

    fn on_no_bid(&mut self, _players: &[Player]) {}

    fn on_landlord_selected(&mut self, _player: &Player, _via_random: bool) {}
}

/// Fixed bids by seat index, regardless of the rotation order. Handy for
/// tests and simulations.
pub struct ScriptedBidding {
    bids: Vec<i32>,
    order: Vec<usize>,
    calls: usize,
}

impl ScriptedBidding {
    pub fn new(bids: Vec<i32>) -> Self {
        Self {
            bids,
            order: Vec::new(),
            calls: 0,
        }
    }
}

impl BiddingController for ScriptedBidding {
    fn on_bidding_start(&mut self, order: &[usize], _players: &[Player]) {
        self.order = order.to_vec();
        self.calls = 0;
    }

    fn choose_bid(&mut self, _player: &Player, _highest_bid: i32) -> i32 {
        let seat = self.order.get(self.calls).copied().unwrap_or(0);
        self.calls += 1;
        self.bids.get(seat).copied().unwrap_or(0)
    }
}

/// 3-player standard rules: round-robin deal, bidding, bottom cards.
#[derive(Debug)]
pub struct StandardRules {
    cfg: GameConfig,
    landlord_idx: usize,
}

impl StandardRules {
    pub fn new(cfg: GameConfig) -> Self {
        Self {
            cfg,
            landlord_idx: 0,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.cfg
    }

    /// Shuffle, deal `hand_size` cards to each seat round-robin, reserve the
    /// bottom, run bidding and grant the bottom to the winner. Every step is
    /// recorded before it takes effect in memory.
    pub fn setup<R: Rng>(
        &mut self,
        players: &mut [Player],
        rng: &mut R,
        ledger: &mut Ledger,
        controller: &mut dyn BiddingController,
    ) -> Result<(), SetupError> {
        let mut deck = Deck::standard();
        deck.shuffle(rng);

        let mut deals: BTreeMap<usize, Vec<Card>> = BTreeMap::new();
        for _ in 0..self.cfg.hand_size {
            for (i, _) in players.iter().enumerate() {
                if let Some(c) = deck.deal_card() {
                    deals.entry(i).or_default().push(c);
                }
            }
        }
        let bottom = deck.take_rest();

        // Record the exact dealt codes first, then mutate hands.
        ledger.append(&Event::Deal(DealPayload {
            players: deals.clone(),
            bottom: bottom.clone(),
        }))?;
        for (i, p) in players.iter_mut().enumerate() {
            p.role = Role::Peasant;
            p.cards = deals.remove(&i).unwrap_or_default();
            p.sort();
        }

        self.bidding(players, rng, ledger, controller)?;

        players[self.landlord_idx].add_cards(bottom.iter().copied());
        ledger.append(&Event::SetLandlord(SetLandlordPayload {
            landlord_idx: self.landlord_idx,
            bottom,
        }))?;
        Ok(())
    }

    /// Bidding rotates from a random seat. The strictly highest bid wins and
    /// the first seat to reach it keeps it; if nobody exceeds the floor, a
    /// landlord is chosen uniformly at random.
    fn bidding<R: Rng>(
        &mut self,
        players: &mut [Player],
        rng: &mut R,
        ledger: &mut Ledger,
        controller: &mut dyn BiddingController,
    ) -> Result<(), SetupError> {
        let n = players.len();
        let start = rng.random_range(0..n);
        let order: Vec<usize> = (0..n).map(|i| (start + i) % n).collect();
        controller.on_bidding_start(&order, players);

        let mut highest = -1;
        let mut winner: Option<usize> = None;
        for &idx in &order {
            let bid = controller.choose_bid(&players[idx], highest);
            if bid < self.cfg.bid_min || bid > self.cfg.bid_max {
                return Err(SetupError::BidOutOfRange {
                    bid,
                    min: self.cfg.bid_min,
                    max: self.cfg.bid_max,
                });
            }
            ledger.append(&Event::Bid(BidPayload {
                player_index: idx,
                bid,
            }))?;
            if bid > highest {
                highest = bid;
                winner = Some(idx);
            }
            controller.on_bid_committed(&players[idx], bid, highest);
        }

        let via_random = highest <= self.cfg.bid_min;
        let winner = if via_random {
            controller.on_no_bid(players);
            rng.random_range(0..n)
        } else {
            winner.unwrap_or(0)
        };

        self.landlord_idx = winner;
        for (i, p) in players.iter_mut().enumerate() {
            p.role = if i == winner { Role::Landlord } else { Role::Peasant };
        }
        controller.on_landlord_selected(&players[winner], via_random);
        Ok(())
    }

    /// The bidding winner opens the first trick.
    pub fn starting_player_index(&self) -> usize {
        self.landlord_idx
    }

    /// Reinstate the landlord seat recovered from a replayed ledger.
    pub fn restore_landlord(&mut self, idx: usize) {
        self.landlord_idx = idx;
    }

    pub fn landlord_index(&self) -> usize {
        self.landlord_idx
    }

    /// Consecutive passes that reset the trick.
    pub fn passes_to_reset(&self, player_count: usize) -> usize {
        player_count.saturating_sub(1)
    }
}
