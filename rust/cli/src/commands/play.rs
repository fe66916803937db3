use std::io::{BufRead, Write};
use std::path::PathBuf;

use doudizhu_engine::errors::PlayError;
use doudizhu_engine::game::{Game, SessionConfig};
use doudizhu_engine::player::Player;
use doudizhu_engine::rules::{BiddingController, GameConfig};

use crate::config::Config;
use crate::error::CliError;
use crate::formatters::{format_cards, format_status, HELP_TEXT};

/// Side file remembering the most recent ledger path, used only to offer
/// resume. Losing it never loses a game.
const LATEST_PTR: &str = "_latest.txt";

/// Collects bids interactively; invalid or empty input counts as 0.
struct TerminalBidding<'a> {
    input: &'a mut dyn BufRead,
    out: &'a mut dyn Write,
}

impl BiddingController for TerminalBidding<'_> {
    fn on_bidding_start(&mut self, order: &[usize], players: &[Player]) {
        let names = order
            .iter()
            .map(|&i| players[i].name.as_str())
            .collect::<Vec<_>>()
            .join(" -> ");
        let _ = writeln!(self.out, "Bidding order: {}", names);
    }

    fn choose_bid(&mut self, player: &Player, highest_bid: i32) -> i32 {
        let _ = write!(
            self.out,
            "{}, bid 0-3 (highest so far {}): ",
            player.name,
            highest_bid.max(0)
        );
        let _ = self.out.flush();
        let mut line = String::new();
        if self.input.read_line(&mut line).is_err() {
            return 0;
        }
        line.trim().parse().unwrap_or(0)
    }

    fn on_no_bid(&mut self, _players: &[Player]) {
        let _ = writeln!(self.out, "Nobody bid; choosing a landlord at random.");
    }

    fn on_landlord_selected(&mut self, player: &Player, via_random: bool) {
        let suffix = if via_random { " (random)" } else { "" };
        let _ = writeln!(self.out, "Landlord: {}{}", player.name, suffix);
    }
}

pub fn handle_play_command(
    names: &[String],
    seed: Option<u64>,
    resume: bool,
    cfg: &Config,
    input: &mut dyn BufRead,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    if names.len() != 3 {
        return Err(CliError::InvalidInput(
            "exactly 3 player names are required".into(),
        ));
    }

    let session = SessionConfig {
        ledger_dir: cfg.ledger_dir.clone(),
        seed: seed.or(cfg.seed),
    };

    let mut game = if resume {
        let pointer = cfg.ledger_dir.join(LATEST_PTR);
        let path = std::fs::read_to_string(&pointer)
            .map_err(|_| CliError::InvalidInput("no previous session to resume".into()))?;
        let path = PathBuf::from(path.trim());
        let game = Game::resume(names, GameConfig::default(), &path)?;
        writeln!(out, "Resumed from {}", path.display())?;
        game
    } else {
        let mut game = Game::new(names, GameConfig::default(), &session)?;
        {
            let mut controller = TerminalBidding { input, out };
            game.setup(&mut controller)?;
        }
        std::fs::write(
            cfg.ledger_dir.join(LATEST_PTR),
            game.ledger_path().display().to_string(),
        )?;
        game
    };

    writeln!(out, "\n--- Game on (ledger: {}) ---", game.ledger_path().display())?;
    while !game.is_over() {
        writeln!(out, "{}", format_status(&game))?;
        write!(
            out,
            "{} to play, enter ranks or a command [help/show/last/tips/sort/pass/quit]: ",
            game.current_player().name
        )?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(CliError::Interrupted("end of input".into()));
        }
        let cmd = line.trim();
        match cmd.to_lowercase().as_str() {
            "" => continue,
            "help" | "?" => {
                writeln!(out, "{}", HELP_TEXT)?;
            }
            "quit" => {
                writeln!(out, "Session saved; resume with --resume.")?;
                return Ok(());
            }
            "show" => {
                for p in game.players() {
                    writeln!(out, "{}", p.display())?;
                }
            }
            "last" => {
                if game.last_play().is_empty() {
                    writeln!(out, "New trick; nothing to follow.")?;
                } else {
                    writeln!(out, "Last play: {}", format_cards(game.last_play()))?;
                }
            }
            "sort" => {
                game.sort_current_hand();
                writeln!(out, "Hand sorted.")?;
            }
            "tips" => {
                let tips = game.suggest_plays();
                if tips.is_empty() {
                    writeln!(out, "No suggestions.")?;
                } else {
                    let shown = tips
                        .iter()
                        .take(5)
                        .map(|t| t.join(" "))
                        .collect::<Vec<_>>()
                        .join(" | ");
                    writeln!(out, "Consider: {}", shown)?;
                }
            }
            "pass" => match game.pass_turn() {
                Ok(outcome) => {
                    if outcome.trick_reset {
                        writeln!(out, "Everyone passed; new trick.")?;
                    }
                }
                Err(PlayError::Ledger(e)) => return Err(e.into()),
                Err(e) => writeln!(err, "{}", e)?,
            },
            _ => {
                let tokens: Vec<String> = cmd.split_whitespace().map(str::to_string).collect();
                match game.play_cards(&tokens) {
                    Ok(outcome) => {
                        let name = &game.players()[game.last_player().unwrap_or(0)].name;
                        writeln!(
                            out,
                            "{} plays: {} [{}]",
                            name,
                            format_cards(&outcome.played),
                            outcome.matched.name
                        )?;
                        if outcome.won {
                            let winner = &game.players()[game.winner_index().unwrap_or(0)];
                            writeln!(
                                out,
                                "\n{} is out of cards! {} side wins.",
                                winner.name,
                                winner.role.as_str()
                            )?;
                        }
                    }
                    Err(PlayError::Ledger(e)) => return Err(e.into()),
                    Err(e) => writeln!(err, "{}", e)?,
                }
            }
        }
    }
    writeln!(out, "Game over. Thanks for playing!")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn names() -> Vec<String> {
        ["Alice", "Bob", "Cara"].iter().map(|s| s.to_string()).collect()
    }

    fn cfg(dir: &tempfile::TempDir) -> Config {
        Config {
            ledger_dir: dir.path().to_path_buf(),
            seed: None,
        }
    }

    fn drive(input: &str, resume: bool, cfg: &Config) -> (Result<(), CliError>, String, String) {
        let mut stdin = Cursor::new(input.as_bytes().to_vec());
        let mut out = Vec::new();
        let mut err = Vec::new();
        let result = handle_play_command(
            &names(),
            Some(7),
            resume,
            cfg,
            &mut stdin,
            &mut out,
            &mut err,
        );
        (
            result,
            String::from_utf8(out).expect("stdout"),
            String::from_utf8(err).expect("stderr"),
        )
    }

    #[test]
    fn scripted_session_bids_shows_and_quits() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = cfg(&dir);
        // Three bid prompts, then two loop commands.
        let (result, out, _err) = drive("0\n0\n1\nshow\nquit\n", false, &cfg);
        result.expect("session runs");
        assert!(out.contains("Bidding order:"));
        assert!(out.contains("Landlord:"));
        assert!(out.contains("Session saved"));
        assert!(dir.path().join(LATEST_PTR).exists());
    }

    #[test]
    fn resume_picks_up_the_latest_session() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = cfg(&dir);
        drive("0\n0\n1\nquit\n", false, &cfg).0.expect("first session");
        let (result, out, _err) = drive("quit\n", true, &cfg);
        result.expect("resume runs");
        assert!(out.contains("Resumed from"));
    }

    #[test]
    fn resume_without_a_pointer_is_an_input_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = cfg(&dir);
        let (result, _out, _err) = drive("", true, &cfg);
        assert!(matches!(result, Err(CliError::InvalidInput(_))));
    }

    #[test]
    fn end_of_input_mid_game_is_an_interruption() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = cfg(&dir);
        let (result, _out, _err) = drive("0\n0\n1\n", false, &cfg);
        assert!(matches!(result, Err(CliError::Interrupted(_))));
    }

    #[test]
    fn bad_plays_are_reported_without_ending_the_session() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = cfg(&dir);
        let (result, _out, err) = drive("0\n0\n1\nZZ\nquit\n", false, &cfg);
        result.expect("session survives the bad play");
        assert!(!err.is_empty(), "rejection goes to stderr");
    }

    #[test]
    fn needs_exactly_three_names() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = cfg(&dir);
        let mut stdin = Cursor::new(Vec::new());
        let mut out = Vec::new();
        let mut err = Vec::new();
        let result = handle_play_command(
            &["Alice".to_string(), "Bob".to_string()],
            None,
            false,
            &cfg,
            &mut stdin,
            &mut out,
            &mut err,
        );
        assert!(matches!(result, Err(CliError::InvalidInput(_))));
    }
}
