//! Domain event types and their ledger payload converters.
//!
//! Each event type has one explicit payload schema; payloads cross the ledger
//! boundary as JSON objects so the on-disk format stays stable even if the
//! in-memory types evolve.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cards::Card;
use crate::errors::ReplayError;
use crate::hand::HandMatch;

/// Every action that goes into the append-only ledger.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum EventType {
    GameStart,
    Deal,
    Bid,
    SetLandlord,
    Play,
    Pass,
    RoundReset,
    GameEnd,
}

impl EventType {
    pub fn as_str(self) -> &'static str {
        match self {
            EventType::GameStart => "GAME_START",
            EventType::Deal => "DEAL",
            EventType::Bid => "BID",
            EventType::SetLandlord => "SET_LANDLORD",
            EventType::Play => "PLAY",
            EventType::Pass => "PASS",
            EventType::RoundReset => "ROUND_RESET",
            EventType::GameEnd => "GAME_END",
        }
    }

    pub fn parse(s: &str) -> Option<EventType> {
        match s {
            "GAME_START" => Some(EventType::GameStart),
            "DEAL" => Some(EventType::Deal),
            "BID" => Some(EventType::Bid),
            "SET_LANDLORD" => Some(EventType::SetLandlord),
            "PLAY" => Some(EventType::Play),
            "PASS" => Some(EventType::Pass),
            "ROUND_RESET" => Some(EventType::RoundReset),
            "GAME_END" => Some(EventType::GameEnd),
            _ => None,
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameStartPayload {
    pub game_id: String,
    pub names: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealPayload {
    /// Seat index -> exact dealt card codes, so replay never re-shuffles.
    pub players: BTreeMap<usize, Vec<Card>>,
    pub bottom: Vec<Card>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BidPayload {
    pub player_index: usize,
    pub bid: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetLandlordPayload {
    pub landlord_idx: usize,
    pub bottom: Vec<Card>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayPayload {
    pub player_index: usize,
    /// Exact card codes. Kept as strings on the read side so older payloads
    /// carrying rank tokens still replay.
    #[serde(default)]
    pub codes: Vec<String>,
    /// Human rank tokens, redundant with `codes` for audit readability.
    #[serde(default)]
    pub tokens: Vec<String>,
    #[serde(rename = "match")]
    pub matched: HandMatch,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassPayload {
    pub player_index: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundResetPayload {
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameEndPayload {
    pub winner_index: usize,
    pub role: String,
}

/// A domain event as a tagged union with one typed payload per type.
#[derive(Debug, Clone)]
pub enum Event {
    GameStart(GameStartPayload),
    Deal(DealPayload),
    Bid(BidPayload),
    SetLandlord(SetLandlordPayload),
    Play(PlayPayload),
    Pass(PassPayload),
    RoundReset(RoundResetPayload),
    GameEnd(GameEndPayload),
}

impl Event {
    pub fn event_type(&self) -> EventType {
        match self {
            Event::GameStart(_) => EventType::GameStart,
            Event::Deal(_) => EventType::Deal,
            Event::Bid(_) => EventType::Bid,
            Event::SetLandlord(_) => EventType::SetLandlord,
            Event::Play(_) => EventType::Play,
            Event::Pass(_) => EventType::Pass,
            Event::RoundReset(_) => EventType::RoundReset,
            Event::GameEnd(_) => EventType::GameEnd,
        }
    }

    /// Encode the payload as the JSON object stored in the ledger record.
    pub fn payload(&self) -> Result<Value, serde_json::Error> {
        match self {
            Event::GameStart(p) => serde_json::to_value(p),
            Event::Deal(p) => serde_json::to_value(p),
            Event::Bid(p) => serde_json::to_value(p),
            Event::SetLandlord(p) => serde_json::to_value(p),
            Event::Play(p) => serde_json::to_value(p),
            Event::Pass(p) => serde_json::to_value(p),
            Event::RoundReset(p) => serde_json::to_value(p),
            Event::GameEnd(p) => serde_json::to_value(p),
        }
    }

    /// Decode a stored record back into a typed event. An unrecognized type
    /// tag is fatal for the replay that encounters it.
    pub fn decode(kind: &str, payload: &Value, seq: u64) -> Result<Event, ReplayError> {
        let t = EventType::parse(kind).ok_or_else(|| ReplayError::UnknownEvent {
            kind: kind.to_string(),
            seq,
        })?;
        let bad = |e: serde_json::Error| ReplayError::BadPayload {
            kind: kind.to_string(),
            seq,
            reason: e.to_string(),
        };
        let payload = payload.clone();
        Ok(match t {
            EventType::GameStart => Event::GameStart(serde_json::from_value(payload).map_err(bad)?),
            EventType::Deal => Event::Deal(serde_json::from_value(payload).map_err(bad)?),
            EventType::Bid => Event::Bid(serde_json::from_value(payload).map_err(bad)?),
            EventType::SetLandlord => {
                Event::SetLandlord(serde_json::from_value(payload).map_err(bad)?)
            }
            EventType::Play => Event::Play(serde_json::from_value(payload).map_err(bad)?),
            EventType::Pass => Event::Pass(serde_json::from_value(payload).map_err(bad)?),
            EventType::RoundReset => Event::RoundReset(serde_json::from_value(payload).map_err(bad)?),
            EventType::GameEnd => Event::GameEnd(serde_json::from_value(payload).map_err(bad)?),
        })
    }
}
