use std::collections::BTreeMap;
use std::path::PathBuf;

use doudizhu_engine::cards::Card;
use doudizhu_engine::errors::{PlayError, SetupError};
use doudizhu_engine::events::{DealPayload, Event, GameStartPayload, SetLandlordPayload};
use doudizhu_engine::game::{Game, Phase, SessionConfig};
use doudizhu_engine::ledger::Ledger;
use doudizhu_engine::player::{Player, Role};
use doudizhu_engine::rules::{BiddingController, GameConfig, ScriptedBidding};

fn names() -> Vec<String> {
    ["A", "B", "C"].iter().map(|s| s.to_string()).collect()
}

fn tokens(ts: &[&str]) -> Vec<String> {
    ts.iter().map(|t| t.to_string()).collect()
}

fn cards(codes: &[&str]) -> Vec<Card> {
    codes
        .iter()
        .map(|c| Card::from_code(c).expect("test card code"))
        .collect()
}

fn session(dir: &tempfile::TempDir, seed: u64) -> SessionConfig {
    SessionConfig {
        ledger_dir: dir.path().to_path_buf(),
        seed: Some(seed),
    }
}

/// Write a minimal but fully hash-chained ledger with tiny known hands, then
/// resume it. Seat 0 is the landlord and leads.
fn scripted_table(dir: &tempfile::TempDir) -> Game {
    let path: PathBuf = dir.path().join("ledger_fixed.jsonl");
    {
        let mut ledger = Ledger::open(&path).expect("open");
        ledger
            .append(&Event::GameStart(GameStartPayload {
                game_id: "fixed".into(),
                names: names(),
            }))
            .expect("append");
        let mut deals: BTreeMap<usize, Vec<Card>> = BTreeMap::new();
        deals.insert(0, cards(&["3♠", "4♥", "5♦"]));
        deals.insert(1, cards(&["6♠", "7♥", "8♦"]));
        deals.insert(2, cards(&["9♠", "10♥", "J♦"]));
        ledger
            .append(&Event::Deal(DealPayload {
                players: deals,
                bottom: Vec::new(),
            }))
            .expect("append");
        ledger
            .append(&Event::SetLandlord(SetLandlordPayload {
                landlord_idx: 0,
                bottom: Vec::new(),
            }))
            .expect("append");
    }
    Game::resume(&names(), GameConfig::default(), &path).expect("resume")
}

#[test]
fn setup_deals_seventeen_each_and_bottom_to_the_landlord() {
    let dir = tempfile::tempdir().expect("tempdir");
    let names = names();
    let mut game = Game::new(&names, GameConfig::default(), &session(&dir, 42)).expect("new");
    assert_eq!(game.phase(), Phase::Dealing);

    // Only seat 2 bids above the floor, so it must win the auction.
    game.setup(&mut ScriptedBidding::new(vec![0, 0, 1]))
        .expect("setup");

    assert_eq!(game.phase(), Phase::Playing);
    assert_eq!(game.landlord_index(), 2);
    assert_eq!(game.current_index(), 2, "landlord leads");
    for (i, p) in game.players().iter().enumerate() {
        let expected = if i == 2 { 20 } else { 17 };
        assert_eq!(p.cards.len(), expected, "hand size of seat {i}");
        let expected_role = if i == 2 { Role::Landlord } else { Role::Peasant };
        assert_eq!(p.role, expected_role);
    }
}

#[test]
fn highest_bid_wins_and_first_to_reach_keeps_it() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut game = Game::new(&names(), GameConfig::default(), &session(&dir, 5)).expect("new");
    game.setup(&mut ScriptedBidding::new(vec![2, 3, 3]))
        .expect("setup");
    // Seat 2 matching seat 1's bid does not take it over.
    assert_eq!(game.landlord_index(), 1);
}

#[test]
fn all_passing_still_yields_a_landlord() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut game = Game::new(&names(), GameConfig::default(), &session(&dir, 11)).expect("new");
    game.setup(&mut ScriptedBidding::new(vec![0, 0, 0]))
        .expect("setup");
    let landlord = game.landlord_index();
    assert!(landlord < 3);
    assert_eq!(game.players()[landlord].cards.len(), 20);
    assert_eq!(game.current_index(), landlord);
}

#[test]
fn out_of_range_bid_is_rejected() {
    struct Greedy;
    impl BiddingController for Greedy {
        fn choose_bid(&mut self, _player: &Player, _highest_bid: i32) -> i32 {
            9
        }
    }
    let dir = tempfile::tempdir().expect("tempdir");
    let mut game = Game::new(&names(), GameConfig::default(), &session(&dir, 1)).expect("new");
    match game.setup(&mut Greedy) {
        Err(SetupError::BidOutOfRange { bid, min, max }) => {
            assert_eq!((bid, min, max), (9, 0, 3));
        }
        other => panic!("expected out-of-range bid error, got {other:?}"),
    }
}

#[test]
fn setup_cannot_run_twice() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut game = Game::new(&names(), GameConfig::default(), &session(&dir, 2)).expect("new");
    game.setup(&mut ScriptedBidding::new(vec![1, 0, 0]))
        .expect("setup");
    assert!(matches!(
        game.setup(&mut ScriptedBidding::new(vec![1, 0, 0])),
        Err(SetupError::AlreadySetUp)
    ));
}

#[test]
fn same_seed_produces_identical_tables() {
    let dir_a = tempfile::tempdir().expect("tempdir");
    let dir_b = tempfile::tempdir().expect("tempdir");
    let names = names();

    let mut a = Game::new(&names, GameConfig::default(), &session(&dir_a, 99)).expect("new");
    a.setup(&mut ScriptedBidding::new(vec![3, 0, 0])).expect("setup");
    let mut b = Game::new(&names, GameConfig::default(), &session(&dir_b, 99)).expect("new");
    b.setup(&mut ScriptedBidding::new(vec![3, 0, 0])).expect("setup");

    assert_eq!(a.landlord_index(), b.landlord_index());
    for (pa, pb) in a.players().iter().zip(b.players()) {
        let ca: Vec<String> = pa.cards.iter().map(|c| c.code()).collect();
        let cb: Vec<String> = pb.cards.iter().map(|c| c.code()).collect();
        assert_eq!(ca, cb);
    }
}

#[test]
fn leader_cannot_pass_and_bad_plays_leave_state_untouched() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut game = scripted_table(&dir);
    assert_eq!(game.current_index(), 0);

    assert!(matches!(game.pass_turn(), Err(PlayError::LeaderCannotPass)));
    assert!(matches!(
        game.play_cards(&tokens(&["A"])),
        Err(PlayError::NotInHand)
    ));
    assert!(matches!(
        game.play_cards(&tokens(&["zz"])),
        Err(PlayError::NotInHand)
    ));
    // Held, but 3+4 is no recognized shape.
    assert!(matches!(
        game.play_cards(&tokens(&["3", "4"])),
        Err(PlayError::NotAPattern)
    ));

    // Nothing above changed whose turn it is or the hand.
    assert_eq!(game.current_index(), 0);
    assert_eq!(game.players()[0].cards.len(), 3);
}

#[test]
fn trick_resets_after_everyone_else_passes() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut game = scripted_table(&dir);

    game.play_cards(&tokens(&["3"])).expect("A opens");
    game.play_cards(&tokens(&["6"])).expect("B beats");
    game.play_cards(&tokens(&["9"])).expect("C beats");

    assert!(matches!(
        game.play_cards(&tokens(&["4"])),
        Err(PlayError::CannotBeat)
    ));
    let first = game.pass_turn().expect("A passes");
    assert!(!first.trick_reset);
    let second = game.pass_turn().expect("B passes");
    assert!(second.trick_reset, "two passes at a 3-seat table reset");

    // Table is clear and the last successful player leads again.
    assert!(game.last_play().is_empty());
    assert_eq!(game.last_player(), None);
    assert_eq!(game.current_index(), 2);
}

#[test]
fn emptying_a_hand_ends_the_game_and_seals_the_ledger() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut game = scripted_table(&dir);

    game.play_cards(&tokens(&["3"])).expect("A opens");
    game.play_cards(&tokens(&["6"])).expect("B beats");
    game.play_cards(&tokens(&["9"])).expect("C beats");
    game.pass_turn().expect("A passes");
    game.pass_turn().expect("B passes, trick resets");

    game.play_cards(&tokens(&["10"])).expect("C leads");
    game.pass_turn().expect("A passes");
    game.pass_turn().expect("B passes, trick resets");

    let outcome = game.play_cards(&tokens(&["J"])).expect("C plays last card");
    assert!(outcome.won);
    assert!(game.is_over());
    assert_eq!(game.winner_index(), Some(2));
    assert!(matches!(
        game.play_cards(&tokens(&["4"])),
        Err(PlayError::NotPlaying)
    ));
    assert!(matches!(game.pass_turn(), Err(PlayError::NotPlaying)));

    let records = Ledger::read_path(game.ledger_path()).expect("verified read");
    assert_eq!(records.last().expect("non-empty").kind, "GAME_END");
}

#[test]
fn resume_midway_restores_the_committed_state() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut game = scripted_table(&dir);
    game.play_cards(&tokens(&["3"])).expect("A opens");
    game.play_cards(&tokens(&["6"])).expect("B beats");
    let path = game.ledger_path().to_path_buf();
    drop(game);

    let mut resumed = Game::resume(&names(), GameConfig::default(), &path).expect("resume");
    assert_eq!(resumed.phase(), Phase::Playing);
    assert_eq!(resumed.current_index(), 2);
    assert_eq!(resumed.last_player(), Some(1));
    let table: Vec<String> = resumed.last_play().iter().map(|c| c.code()).collect();
    assert_eq!(table, vec!["6♠"]);
    assert_eq!(resumed.players()[0].cards.len(), 2);
    assert_eq!(resumed.players()[1].cards.len(), 2);

    // The resumed session keeps playing and extends the same chain.
    resumed.play_cards(&tokens(&["9"])).expect("C beats after resume");
    let records = Ledger::read_path(&path).expect("verified read");
    for w in records.windows(2) {
        assert_eq!(w[1].prev_hash, w[0].hash);
    }
}

#[test]
fn suggestions_beat_the_table_or_open_cheaply() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut game = scripted_table(&dir);

    // Leading: the lowest single is always offered.
    let opening = game.suggest_plays();
    assert!(opening.contains(&tokens(&["3"])));

    game.play_cards(&tokens(&["3"])).expect("A opens");
    let replies = game.suggest_plays();
    assert!(!replies.is_empty());
    for reply in &replies {
        let picked = game.current_player().pick(reply);
        assert!(
            game.registry().can_beat(&picked, game.last_play()),
            "{:?} must beat the table",
            reply
        );
    }
}
