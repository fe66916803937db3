use std::io::Write;
use std::path::Path;

use doudizhu_engine::events::Event;
use doudizhu_engine::ledger::Ledger;
use doudizhu_engine::player::Player;
use doudizhu_engine::replay::rebuild;

use crate::error::CliError;
use crate::formatters::format_cards;

/// Rebuild the table recorded in a ledger and print the resulting state.
pub fn handle_replay_command(
    input: &Path,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    let records = match Ledger::read_path(input) {
        Ok(records) => records,
        Err(e) => {
            writeln!(err, "cannot read ledger: {}", e)?;
            return Err(e.into());
        }
    };

    let names = records
        .iter()
        .find_map(|r| match Event::decode(&r.kind, &r.payload, r.seq) {
            Ok(Event::GameStart(p)) => Some(p.names),
            _ => None,
        })
        .unwrap_or_else(|| vec!["Seat 0".into(), "Seat 1".into(), "Seat 2".into()]);

    let mut players: Vec<Player> = names.iter().map(Player::new).collect();
    let state = match rebuild(&mut players, &records) {
        Ok(state) => state,
        Err(e) => {
            writeln!(err, "replay failed: {}", e)?;
            return Err(CliError::Engine(e.to_string()));
        }
    };

    writeln!(out, "Replayed {} events from {}", records.len(), input.display())?;
    for p in &players {
        writeln!(out, "{}", p.display())?;
    }
    match state.landlord_idx {
        Some(i) => writeln!(out, "Landlord: {}", players[i].name)?,
        None => writeln!(out, "Landlord: (not yet selected)")?,
    }
    if state.last_play.is_empty() {
        writeln!(out, "Table: (new trick)")?;
    } else {
        writeln!(out, "Table: {}", format_cards(&state.last_play))?;
    }
    match state.winner_index {
        Some(i) => writeln!(out, "Winner: {}", players[i].name)?,
        None => writeln!(out, "Next to act: {}", players[state.current_index].name)?,
    }
    Ok(())
}
