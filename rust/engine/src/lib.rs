//! # doudizhu-engine: Dou Dizhu Game Engine Core
//!
//! A 3-player Dou Dizhu (Fight the Landlord) engine whose state survives
//! process interruption: every state-changing action is durably recorded in a
//! hash-chained ledger before it takes effect, and the full game state can be
//! rebuilt from that record alone.
//!
//! ## Core Modules
//!
//! - [`cards`] - Card, rank and suit primitives, deck construction, ordering
//! - [`deck`] - Undealt pile with injected-RNG shuffling
//! - [`hand`] - Hand pattern classification and cross-pattern comparison
//! - [`player`] - Seat state and hand operations
//! - [`rules`] - Deal, bidding and the bidding collaborator interface
//! - [`game`] - The turn state machine committing through the ledger
//! - [`events`] - Domain event types and payload converters
//! - [`ledger`] - Append-only JSONL log with SHA-256 hash chaining
//! - [`replay`] - Deterministic state reconstruction from a verified log
//! - [`errors`] - Error types for engine operations
//!
//! ## Quick Start
//!
//! ```rust
//! use doudizhu_engine::cards::Card;
//! use doudizhu_engine::hand::HandRegistry;
//!
//! let registry = HandRegistry::new();
//! let run: Vec<Card> = ["3♠", "4♥", "5♦", "6♣", "7♠"]
//!     .iter()
//!     .map(|c| Card::from_code(c).unwrap())
//!     .collect();
//! let m = registry.evaluate(&run).expect("a 5-card run classifies");
//! assert_eq!(m.name, "sequence");
//! ```
//!
//! ## Deterministic Sessions
//!
//! Shuffling, the bidding start seat and no-bid tie resolution all draw from
//! one seeded session RNG, so a fixed seed reproduces the whole setup:
//!
//! ```rust,no_run
//! use doudizhu_engine::game::{Game, SessionConfig};
//! use doudizhu_engine::rules::{GameConfig, ScriptedBidding};
//!
//! let names: Vec<String> = ["A", "B", "C"].iter().map(|s| s.to_string()).collect();
//! let session = SessionConfig { ledger_dir: "./ledger".into(), seed: Some(7) };
//! let mut game = Game::new(&names, GameConfig::default(), &session).unwrap();
//! game.setup(&mut ScriptedBidding::new(vec![0, 0, 1])).unwrap();
//! ```

pub mod cards;
pub mod deck;
pub mod errors;
pub mod events;
pub mod game;
pub mod hand;
pub mod ledger;
pub mod player;
pub mod replay;
pub mod rules;
