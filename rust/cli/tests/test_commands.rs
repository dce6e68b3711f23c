//! End-to-end runs of the non-interactive commands through `hitstand_cli::run`.

use serde_json::Value;
use std::fs;

struct Output {
    code: i32,
    stdout: String,
    stderr: String,
}

fn run(args: &[&str]) -> Output {
    let mut argv = vec!["hitstand"];
    argv.extend_from_slice(args);
    let mut out = Vec::new();
    let mut err = Vec::new();
    let code = hitstand_cli::run(argv, &mut out, &mut err);
    Output {
        code,
        stdout: String::from_utf8(out).unwrap(),
        stderr: String::from_utf8(err).unwrap(),
    }
}

fn records(path: &std::path::Path) -> Vec<Value> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

#[test]
fn deal_is_reproducible_by_seed() {
    let a = run(&["deal", "--seed", "42"]);
    let b = run(&["deal", "--seed", "42"]);
    assert_eq!(a.code, 0);
    assert_eq!(a.stdout, b.stdout);
    assert!(a.stdout.contains("Seed: 42"));
    assert!(a.stdout.contains("Player: "));
    assert!(a.stdout.contains("Deck remaining: 48"));
}

#[test]
fn value_reports_soft_totals() {
    let res = run(&["value", "A", "A", "9"]);
    assert_eq!(res.code, 0);
    assert_eq!(res.stdout.trim(), "A A 9 (21, soft)");

    let res = run(&["value", "K,Q,2"]);
    assert_eq!(res.stdout.trim(), "K Q 2 (22, bust)");
}

#[test]
fn value_rejects_unknown_symbols() {
    let res = run(&["value", "A", "Z"]);
    assert_eq!(res.code, 2);
    assert!(res.stderr.contains("invalid rank `Z`"));
}

#[test]
fn advise_uses_basic_strategy() {
    let res = run(&["advise", "--upcard", "9", "--advisor", "basic", "6", "5"]);
    assert_eq!(res.code, 0, "stderr={}", res.stderr);
    assert!(res.stdout.contains("Double down (if possible), otherwise Hit"));

    let res = run(&["advise", "--upcard", "6", "--advisor", "basic", "10", "6"]);
    assert!(res.stdout.contains(": Stand (basic)"));
}

#[test]
fn advise_rejects_unknown_advisor() {
    let res = run(&["advise", "--upcard", "6", "--advisor", "oracle", "10", "6"]);
    assert_eq!(res.code, 2);
    assert!(res.stderr.contains("unknown advisor 'oracle'"));
}

#[test]
fn sim_writes_one_record_per_round() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested/sim.jsonl");
    let path_str = path.to_string_lossy().into_owned();
    let res = run(&[
        "sim",
        "--rounds",
        "25",
        "--seed",
        "7",
        "--advisor",
        "basic",
        "--bankroll",
        "1000",
        "--output",
        path_str.as_str(),
    ]);
    assert_eq!(res.code, 0, "stderr={}", res.stderr);
    assert!(res.stdout.contains("Rounds played: 25"));

    let recs = records(&path);
    assert_eq!(recs.len(), 25);
    for rec in &recs {
        assert!(rec["round_id"].as_str().unwrap().ends_with(|c: char| c.is_ascii_digit()));
        assert!(rec["total_bet"].as_u64().unwrap() >= 10);
        assert!(rec["ts"].is_string());
    }
    let last_bankroll = recs.last().unwrap()["bankroll_after"].as_u64().unwrap();
    assert!(res.stdout.contains(&format!("Final bankroll: {}", last_bankroll)));
}

#[test]
fn sim_is_deterministic_for_a_seed() {
    let dir = tempfile::tempdir().unwrap();
    let strip = |mut v: Value| {
        v.as_object_mut().unwrap().remove("ts");
        v
    };
    let mut runs = Vec::new();
    for name in ["a.jsonl", "b.jsonl"] {
        let path = dir.path().join(name);
        let path_str = path.to_string_lossy().into_owned();
        let res = run(&[
            "sim", "--rounds", "10", "--seed", "99", "--advisor", "mimic", "--bankroll", "500",
            "--output", path_str.as_str(),
        ]);
        assert_eq!(res.code, 0);
        runs.push(records(&path).into_iter().map(strip).collect::<Vec<_>>());
    }
    assert_eq!(runs[0], runs[1]);
}

#[test]
fn sim_stops_when_bankroll_runs_out() {
    let res = run(&[
        "sim", "--rounds", "50", "--seed", "3", "--bet", "100", "--bankroll", "150",
        "--advisor", "random",
    ]);
    assert_eq!(res.code, 0);
    if !res.stdout.contains("Rounds played: 50") {
        assert!(res.stderr.contains("WARNING: Bankroll"));
    }
}

#[test]
fn sim_rejects_bet_outside_limits() {
    let res = run(&["sim", "--rounds", "1", "--bet", "500"]);
    assert_eq!(res.code, 2);
    assert!(res.stderr.contains("Invalid bet amount: 500"));
}

#[test]
fn stats_summarizes_sim_output() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sim.jsonl");
    let path_str = path.to_string_lossy().into_owned();
    let res = run(&[
        "sim", "--rounds", "30", "--seed", "11", "--advisor", "basic", "--bankroll", "1000",
        "--output", path_str.as_str(),
    ]);
    assert_eq!(res.code, 0);

    let res = run(&["stats", "--input", path_str.as_str()]);
    assert_eq!(res.code, 0, "stderr={}", res.stderr);
    let stats: Value = serde_json::from_str(&res.stdout).unwrap();
    assert_eq!(stats["rounds"], 30);
    let tallied = ["wins", "losses", "ties", "busts"]
        .iter()
        .map(|k| stats[*k].as_u64().unwrap())
        .sum::<u64>();
    assert_eq!(tallied, 30);
    let net = stats["total_payout"].as_i64().unwrap() - stats["total_bet"].as_i64().unwrap();
    assert_eq!(stats["net"].as_i64().unwrap(), net);
}

#[test]
fn stats_skips_corrupted_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sim.jsonl");
    let path_str = path.to_string_lossy().into_owned();
    run(&["sim", "--rounds", "3", "--seed", "5", "--output", path_str.as_str()]);
    let mut content = fs::read_to_string(&path).unwrap();
    content.push_str("{not json\n");
    fs::write(&path, content).unwrap();

    let res = run(&["stats", "--input", path_str.as_str()]);
    assert_eq!(res.code, 0);
    assert!(res.stderr.contains("Failed to parse line 4"));
    assert!(res.stderr.contains("WARNING: Skipped 1 record(s)"));
    let stats: Value = serde_json::from_str(&res.stdout).unwrap();
    assert_eq!(stats["rounds"], 3);
}

#[test]
fn stats_missing_file_exits_2() {
    let res = run(&["stats", "--input", "no/such/file.jsonl"]);
    assert_eq!(res.code, 2);
    assert!(res.stderr.contains("no/such/file.jsonl"));
}
