//! Rendering helpers for the interactive table.

use doudizhu_engine::cards::Card;
use doudizhu_engine::game::Game;

pub fn format_cards(cards: &[Card]) -> String {
    cards
        .iter()
        .map(|c| c.short())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Turn order starting at the acting seat plus the last table play.
pub fn format_status(game: &Game) -> String {
    let n = game.players().len();
    let idx = game.current_index();
    let order = (0..n)
        .map(|i| game.players()[(idx + i) % n].name.clone())
        .collect::<Vec<_>>()
        .join(" -> ");
    let last = if game.last_play().is_empty() {
        "(new trick)".to_string()
    } else {
        let src = game
            .last_player()
            .map(|i| format!(" (from {})", game.players()[i].name))
            .unwrap_or_default();
        format!("{}{}", format_cards(game.last_play()), src)
    };
    format!("\nTurn order: {}\nLast play: {}", order, last)
}

pub const HELP_TEXT: &str = "\
Input examples:
  3 3              pair
  7 8 9 10 J       sequence (5+ cards, no 2 or jokers)
  Q Q Q 9          triple with single
  5 5 5 6 6        triple with pair
  10 10 J J Q Q    pair sequence (3+ pairs)
  4 4 4 5 5 5      triple sequence
  2 2 2 2          bomb
  BJ RJ            joker bomb

Commands:
  help  show this help
  show  show all hands (debug)
  last  show the last table play
  tips  naive suggestions
  sort  sort your hand
  pass  pass (only when following)
  quit  leave (the ledger allows resuming later)
";
