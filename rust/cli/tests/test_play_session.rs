//! Interactive sessions driven through `run_with_input`.

use std::io::Cursor;

fn play(args: &[&str], input: &str) -> (i32, String, String) {
    let mut argv = vec!["hitstand", "play"];
    argv.extend_from_slice(args);
    let mut stdin = Cursor::new(input.as_bytes().to_vec());
    let mut out = Vec::new();
    let mut err = Vec::new();
    let code = hitstand_cli::run_with_input(argv, &mut stdin, &mut out, &mut err);
    (
        code,
        String::from_utf8(out).unwrap(),
        String::from_utf8(err).unwrap(),
    )
}

#[test]
fn single_round_shows_table_and_result() {
    let (code, out, _) = play(&["--seed", "42", "--rounds", "1", "--bankroll", "500"], "25\ns\n");
    assert_eq!(code, 0);
    assert!(out.contains("You start with $500."));
    assert!(out.contains("Dealer shows: "));
    assert!(out.contains("??"));
    assert!(out.contains("Advice (basic): "));
    assert!(out.contains("Dealer's hand: "));
    assert!(out.contains("Result: "));
    assert!(out.contains("Rounds played: 1."));
}

#[test]
fn same_seed_replays_the_same_session() {
    let args = ["--seed", "2024", "--rounds", "3", "--bankroll", "300"];
    let input = "10\ns\n10\ns\n10\ns\n";
    let (_, a, _) = play(&args, input);
    let (_, b, _) = play(&args, input);
    assert_eq!(a, b);
}

#[test]
fn quit_exits_zero() {
    let (code, out, _) = play(&["--seed", "1"], "quit\n");
    assert_eq!(code, 0);
    assert!(out.contains("Rounds played: 0."));
}

#[test]
fn closing_input_mid_round_exits_130() {
    let (code, out, err) = play(&["--seed", "1", "--bankroll", "100"], "10\n");
    assert_eq!(code, 130);
    assert!(out.contains("forfeited"));
    assert!(err.contains("Interrupted"));
}

#[test]
fn typos_are_reprompted_not_fatal() {
    let (code, _, err) = play(&["--seed", "8", "--rounds", "1", "--no-advice"], "10\nfold\ns\n");
    assert_eq!(code, 0);
    assert!(err.contains("Unrecognized action 'fold'"));
}

#[test]
fn too_small_bankroll_ends_immediately() {
    let (code, out, _) = play(&["--seed", "1", "--bankroll", "5"], "");
    assert_eq!(code, 0);
    assert!(out.contains("Game over."));
}
