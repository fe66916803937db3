//! Game session state machine: deal, bidding, turn rotation, pass/reset and
//! win detection. Every accepted action is appended to the ledger before the
//! in-memory state changes, so a session killed at any point resumes to the
//! exact committed state.

use std::path::{Path, PathBuf};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::cards::{Card, Rank};
use crate::errors::{PlayError, ResumeError, SetupError};
use crate::events::{
    Event, GameEndPayload, GameStartPayload, PassPayload, PlayPayload, RoundResetPayload,
};
use crate::hand::{HandMatch, HandRegistry};
use crate::ledger::Ledger;
use crate::player::Player;
use crate::replay::rebuild;
use crate::rules::{BiddingController, GameConfig, StandardRules};

/// Where a session keeps its ledger and how its RNG is seeded. Passed in
/// explicitly; the engine never discovers paths from ambient state.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub ledger_dir: PathBuf,
    /// `None` seeds from the OS; tests pass a fixed seed.
    pub seed: Option<u64>,
}

/// Lifecycle of one session.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Phase {
    /// Created, not yet dealt.
    Dealing,
    /// Dealt and bid; seats act in rotation.
    Playing,
    /// A seat emptied its hand.
    Over,
}

/// An accepted play.
#[derive(Debug, Clone)]
pub struct PlayOutcome {
    pub played: Vec<Card>,
    pub matched: HandMatch,
    pub won: bool,
}

/// An accepted pass.
#[derive(Debug, Clone, Copy)]
pub struct PassOutcome {
    /// True when this pass completed the round of passes and reset the trick.
    pub trick_reset: bool,
}

pub struct Game {
    game_id: String,
    players: Vec<Player>,
    registry: HandRegistry,
    rules: StandardRules,
    ledger: Ledger,
    rng: ChaCha20Rng,
    phase: Phase,
    last_play: Vec<Card>,
    last_player: Option<usize>,
    turn_index: usize,
    passes_in_row: usize,
    winner_index: Option<usize>,
}

impl Game {
    /// Start a fresh session: a new ledger file named after the session id is
    /// created under the configured directory.
    pub fn new(
        names: &[String],
        cfg: GameConfig,
        session: &SessionConfig,
    ) -> Result<Self, SetupError> {
        std::fs::create_dir_all(&session.ledger_dir).map_err(crate::errors::LedgerError::Io)?;
        let mut rng = match session.seed {
            Some(seed) => ChaCha20Rng::seed_from_u64(seed),
            None => ChaCha20Rng::from_os_rng(),
        };
        let game_id = format!(
            "{}-{:08x}",
            chrono::Utc::now().format("%Y%m%d-%H%M%S"),
            rng.random::<u32>()
        );
        let path = session.ledger_dir.join(format!("ledger_{game_id}.jsonl"));
        let ledger = Ledger::open(&path)?;
        Ok(Self {
            game_id,
            players: names.iter().map(Player::new).collect(),
            registry: HandRegistry::new(),
            rules: StandardRules::new(cfg),
            ledger,
            rng,
            phase: Phase::Dealing,
            last_play: Vec::new(),
            last_player: None,
            turn_index: 0,
            passes_in_row: 0,
            winner_index: None,
        })
    }

    /// Announce the game, deal and run bidding. The landlord acts first.
    pub fn setup(&mut self, controller: &mut dyn BiddingController) -> Result<(), SetupError> {
        if self.phase != Phase::Dealing {
            return Err(SetupError::AlreadySetUp);
        }
        self.ledger.append(&Event::GameStart(GameStartPayload {
            game_id: self.game_id.clone(),
            names: self.players.iter().map(|p| p.name.clone()).collect(),
        }))?;
        self.rules
            .setup(&mut self.players, &mut self.rng, &mut self.ledger, controller)?;
        self.turn_index = self.rules.starting_player_index();
        self.phase = Phase::Playing;
        Ok(())
    }

    /// Rebuild a session from an existing ledger. The full chain is verified
    /// and folded; a log that fails verification is rejected, never partially
    /// trusted.
    pub fn resume(
        names: &[String],
        cfg: GameConfig,
        path: &Path,
    ) -> Result<Self, ResumeError> {
        let ledger = Ledger::open(path)?;
        let records = ledger.read_all()?;
        let mut players: Vec<Player> = names.iter().map(Player::new).collect();
        let state = rebuild(&mut players, &records)?;

        let game_id = records
            .iter()
            .find_map(|r| match Event::decode(&r.kind, &r.payload, r.seq) {
                Ok(Event::GameStart(p)) => Some(p.game_id),
                _ => None,
            })
            .unwrap_or_default();
        let mut rules = StandardRules::new(cfg);
        if let Some(idx) = state.landlord_idx {
            rules.restore_landlord(idx);
        }
        let phase = if state.winner_index.is_some() {
            Phase::Over
        } else if state.landlord_idx.is_some() {
            Phase::Playing
        } else {
            Phase::Dealing
        };
        Ok(Self {
            game_id,
            players,
            registry: HandRegistry::new(),
            rules,
            ledger,
            rng: ChaCha20Rng::from_os_rng(),
            phase,
            last_play: state.last_play,
            last_player: state.last_player,
            turn_index: state.current_index,
            passes_in_row: 0,
            winner_index: state.winner_index,
        })
    }

    /// Play the given rank tokens from the acting seat's hand.
    ///
    /// Accepted iff the tokens are held, classify to a pattern, and — when a
    /// foreign last play is on the table — beat it. The PLAY (and GAME_END)
    /// event is durably appended before the hand is touched.
    pub fn play_cards(&mut self, tokens: &[String]) -> Result<PlayOutcome, PlayError> {
        if self.phase != Phase::Playing {
            return Err(PlayError::NotPlaying);
        }
        let seat = self.turn_index;
        if !self.players[seat].has_cards(tokens) {
            return Err(PlayError::NotInHand);
        }
        let temp = self.players[seat].pick(tokens);
        let matched = self.registry.evaluate(&temp).ok_or(PlayError::NotAPattern)?;

        let must_beat = !self.last_play.is_empty() && self.last_player != Some(seat);
        if must_beat && !self.registry.can_beat(&temp, &self.last_play) {
            return Err(PlayError::CannotBeat);
        }

        let will_win = temp.len() == self.players[seat].cards.len();
        self.ledger.append(&Event::Play(PlayPayload {
            player_index: seat,
            codes: temp.iter().map(|c| c.code()).collect(),
            tokens: temp.iter().map(|c| c.short().to_string()).collect(),
            matched: matched.clone(),
        }))?;
        if will_win {
            self.ledger.append(&Event::GameEnd(GameEndPayload {
                winner_index: seat,
                role: self.players[seat].role.as_str().to_string(),
            }))?;
        }

        let played = self.players[seat].take_cards(tokens);
        self.last_play = played.clone();
        self.last_player = Some(seat);
        self.passes_in_row = 0;
        if will_win {
            self.winner_index = Some(seat);
            self.phase = Phase::Over;
        } else {
            self.turn_index = (seat + 1) % self.players.len();
        }
        Ok(PlayOutcome {
            played,
            matched,
            won: will_win,
        })
    }

    /// Pass the turn. The seat that owns the table (or opens a trick) cannot
    /// pass; when every other seat has passed, the trick resets and the last
    /// successful player leads again.
    pub fn pass_turn(&mut self) -> Result<PassOutcome, PlayError> {
        if self.phase != Phase::Playing {
            return Err(PlayError::NotPlaying);
        }
        let seat = self.turn_index;
        if self.last_play.is_empty() || self.last_player == Some(seat) {
            return Err(PlayError::LeaderCannotPass);
        }
        self.ledger
            .append(&Event::Pass(PassPayload { player_index: seat }))?;
        self.passes_in_row += 1;

        let mut trick_reset = false;
        if self.passes_in_row >= self.rules.passes_to_reset(self.players.len()) {
            self.ledger.append(&Event::RoundReset(RoundResetPayload {
                reason: "passes_reset".to_string(),
            }))?;
            self.last_play.clear();
            self.last_player = None;
            self.passes_in_row = 0;
            trick_reset = true;
        }
        self.turn_index = (seat + 1) % self.players.len();
        Ok(PassOutcome { trick_reset })
    }

    /// Naive play suggestions for the acting seat: the lowest single and a
    /// small pair when free to open, otherwise any subset that beats the
    /// table.
    pub fn suggest_plays(&self) -> Vec<Vec<String>> {
        let p = &self.players[self.turn_index];
        let mut out: Vec<Vec<String>> = Vec::new();
        if p.cards.is_empty() {
            return out;
        }

        if self.last_play.is_empty() || self.last_player == Some(self.turn_index) {
            if let Some(low) = p.cards.iter().min_by_key(|c| c.rank.value()) {
                out.push(vec![low.short().to_string()]);
            }
            let mut counts: Vec<(Rank, usize)> = Vec::new();
            for c in &p.cards {
                match counts.iter_mut().find(|(r, _)| *r == c.rank) {
                    Some((_, n)) => *n += 1,
                    None => counts.push((c.rank, 1)),
                }
            }
            counts.sort_by_key(|(r, _)| r.value());
            if let Some((r, _)) = counts.iter().find(|(_, n)| *n >= 2) {
                out.push(vec![r.token().to_string(), r.token().to_string()]);
            }
            return out;
        }

        let Some(target) = self.registry.evaluate(&self.last_play) else {
            return out;
        };
        let mut sizes = vec![self.last_play.len()];
        if target.name != "joker_bomb" {
            sizes.push(2);
            sizes.push(4);
        }
        sizes.sort_unstable();
        sizes.dedup();

        let mut tested: std::collections::BTreeSet<Vec<u8>> = std::collections::BTreeSet::new();
        for k in sizes {
            if k == 0 || k > p.cards.len() {
                continue;
            }
            for indices in combinations(p.cards.len(), k) {
                let subset: Vec<Card> = indices.iter().map(|&i| p.cards[i]).collect();
                let mut signature: Vec<u8> = subset.iter().map(|c| c.rank.value()).collect();
                signature.sort_unstable();
                signature.push(k as u8);
                if tested.insert(signature) && self.registry.can_beat(&subset, &self.last_play) {
                    out.push(subset.iter().map(|c| c.short().to_string()).collect());
                }
            }
        }
        out
    }

    // ------------------------------ Accessors ------------------------------

    pub fn game_id(&self) -> &str {
        &self.game_id
    }
    pub fn players(&self) -> &[Player] {
        &self.players
    }
    pub fn registry(&self) -> &HandRegistry {
        &self.registry
    }
    pub fn phase(&self) -> Phase {
        self.phase
    }
    pub fn is_over(&self) -> bool {
        self.phase == Phase::Over
    }
    pub fn current_index(&self) -> usize {
        self.turn_index
    }
    pub fn current_player(&self) -> &Player {
        &self.players[self.turn_index]
    }
    pub fn last_play(&self) -> &[Card] {
        &self.last_play
    }
    pub fn last_player(&self) -> Option<usize> {
        self.last_player
    }
    pub fn landlord_index(&self) -> usize {
        self.rules.landlord_index()
    }
    pub fn winner_index(&self) -> Option<usize> {
        self.winner_index
    }
    pub fn ledger_path(&self) -> &Path {
        self.ledger.path()
    }
    pub fn sort_current_hand(&mut self) {
        self.players[self.turn_index].sort();
    }
}

/// All k-combinations of `0..n` in lexicographic order.
fn combinations(n: usize, k: usize) -> Vec<Vec<usize>> {
    let mut out = Vec::new();
    if k == 0 || k > n {
        return out;
    }
    let mut indices: Vec<usize> = (0..k).collect();
    loop {
        out.push(indices.clone());
        // advance to the next combination, rightmost index first
        let mut i = k;
        while i > 0 {
            i -= 1;
            if indices[i] != i + n - k {
                indices[i] += 1;
                for j in i + 1..k {
                    indices[j] = indices[j - 1] + 1;
                }
                break;
            }
            if i == 0 {
                return out;
            }
        }
    }
}
