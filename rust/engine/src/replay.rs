//! Rebuild in-memory state from a verified ledger (crash/exit recovery).
//!
//! Replay trusts the log: every event was validated before it was appended,
//! so legality is never re-checked here. Folding the same verified sequence
//! over a fresh player set always yields the same state.

use crate::cards::Card;
use crate::errors::ReplayError;
use crate::events::Event;
use crate::ledger::LedgerRecord;
use crate::player::{Player, Role};

/// State reconstructed from a ledger, mirroring the live round state.
#[derive(Debug, Clone, Default)]
pub struct RebuiltState {
    pub last_play: Vec<Card>,
    pub last_player: Option<usize>,
    pub current_index: usize,
    pub landlord_idx: Option<usize>,
    pub winner_index: Option<usize>,
}

/// Remove one card matching `code` from `hand`: exact code first, then
/// rank-only for older payloads that stored bare tokens. Ties between
/// duplicate codes resolve to the first card in the current hand order, which
/// keeps removal deterministic.
fn remove_matching(hand: &mut Vec<Card>, code: &str) -> Option<Card> {
    if let Some(i) = hand.iter().position(|c| c.code() == code) {
        return Some(hand.remove(i));
    }
    if let Some(i) = hand.iter().position(|c| c.rank.token() == code) {
        return Some(hand.remove(i));
    }
    None
}

/// Fold a verified event sequence into fresh player state. Hands and roles
/// are reset first, so feeding the same records twice gives identical
/// results.
pub fn rebuild(
    players: &mut [Player],
    records: &[LedgerRecord],
) -> Result<RebuiltState, ReplayError> {
    for p in players.iter_mut() {
        p.cards.clear();
        p.role = Role::Peasant;
    }
    let mut state = RebuiltState::default();
    let seats = players.len();
    let check_seat = |seat: usize, seq: u64| {
        if seat < seats {
            Ok(seat)
        } else {
            Err(ReplayError::SeatOutOfRange { seat, seq })
        }
    };

    for rec in records {
        match Event::decode(&rec.kind, &rec.payload, rec.seq)? {
            Event::GameStart(_) | Event::Bid(_) => {}
            Event::Deal(p) => {
                for (seat, codes) in &p.players {
                    let seat = check_seat(*seat, rec.seq)?;
                    players[seat].cards.extend(codes.iter().copied());
                }
                for pl in players.iter_mut() {
                    pl.sort();
                }
            }
            Event::SetLandlord(p) => {
                let seat = check_seat(p.landlord_idx, rec.seq)?;
                players[seat].add_cards(p.bottom.iter().copied());
                for (i, pl) in players.iter_mut().enumerate() {
                    pl.role = if i == seat { Role::Landlord } else { Role::Peasant };
                }
                state.landlord_idx = Some(seat);
                state.current_index = seat;
            }
            Event::Play(p) => {
                let seat = check_seat(p.player_index, rec.seq)?;
                let codes = if p.codes.is_empty() { &p.tokens } else { &p.codes };
                let mut played = Vec::with_capacity(codes.len());
                for code in codes {
                    if let Some(c) = remove_matching(&mut players[seat].cards, code) {
                        played.push(c);
                    }
                }
                state.last_play = played;
                state.last_player = Some(seat);
                state.current_index = (seat + 1) % seats;
            }
            Event::Pass(p) => {
                let seat = check_seat(p.player_index, rec.seq)?;
                state.current_index = (seat + 1) % seats;
            }
            Event::RoundReset(_) => {
                state.last_play.clear();
                state.last_player = None;
            }
            Event::GameEnd(p) => {
                state.winner_index = Some(check_seat(p.winner_index, rec.seq)?);
            }
        }
    }
    Ok(state)
}
