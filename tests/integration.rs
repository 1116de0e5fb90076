//! Integration tests for the phantom-risk engine binary.
//!
//! Tests full protocol sessions by spawning the engine process, sending
//! commands via stdin, and verifying stdout replies.

use std::fs;
use std::io::{BufRead, Write};
use std::path::Path;
use std::process::{Command, Stdio};

/// Two red regions, one blue, one green; 0-1-2 in a line, 3 next to 0, 4 next to 2.
const SCENARIO: &str = r#"{
    "regions": [
        { "id": 0, "controlled_by": "red",   "garrison": 50, "neighbors": [1, 3] },
        { "id": 1, "controlled_by": "red",   "garrison": 50, "neighbors": [2] },
        { "id": 2, "controlled_by": "green", "garrison": 50, "neighbors": [4] },
        { "id": 3, "controlled_by": "blue",  "garrison": 50 },
        { "id": 4, "controlled_by": "green", "garrison": 50 }
    ],
    "lock": true
}"#;

/// Sends a sequence of commands to the engine and collects stdout lines.
fn run_engine(args: &[&str], commands: &[&str]) -> Vec<String> {
    let exe = env!("CARGO_BIN_EXE_phantom-risk");
    let mut child = Command::new(exe)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to start phantom-risk");

    let mut stdin = child.stdin.take().unwrap();
    let stdout = child.stdout.take().unwrap();
    let reader = std::io::BufReader::new(stdout);

    for cmd in commands {
        writeln!(stdin, "{}", cmd).unwrap();
    }
    stdin.flush().unwrap();
    drop(stdin);

    let lines: Vec<String> = reader.lines().map(|l| l.unwrap()).collect();
    let status = child.wait().expect("failed to wait on child");
    assert!(status.success());
    lines
}

fn scenario(dir: &Path) -> String {
    let path = dir.join("map.json");
    fs::write(&path, SCENARIO).unwrap();
    path.to_string_lossy().into_owned()
}

fn with_map(commands: &[&str]) -> Vec<String> {
    let dir = tempfile::tempdir().unwrap();
    let path = scenario(dir.path());
    run_engine(&["--scenario", &path], commands)
}

#[test]
fn isready_response() {
    let lines = run_engine(&[], &["isready", "quit"]);
    assert_eq!(lines, vec!["readyok"]);
}

#[test]
fn empty_lines_and_comments_are_ignored() {
    let lines = run_engine(&[], &["", "  ", "# note", "isready", "quit"]);
    assert_eq!(lines, vec!["readyok"]);
}

#[test]
fn unknown_commands_report_parse_errors() {
    let lines = run_engine(&[], &["foobar", "attack p1 3", "quit"]);
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], "error parse: unknown command: foobar");
    assert!(lines[1].starts_with("error parse: malformed attack"));
}

#[test]
fn quit_stops_reading() {
    let lines = run_engine(&[], &["quit", "isready"]);
    assert!(lines.is_empty());
}

#[test]
fn scenario_is_loaded_and_locked() {
    let lines = with_map(&["faction red", "faction blue", "faction yellow", "lock"]);
    assert_eq!(lines[0], "faction red regions 2 dead false");
    assert_eq!(lines[1], "faction blue regions 1 dead false");
    assert_eq!(lines[2], "faction yellow regions 0 dead false");
    assert!(lines[3].starts_with("error setup_locked:"));
}

#[test]
fn load_command_applies_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let path = scenario(dir.path());
    let lines = run_engine(&[], &[&format!("load {}", path), "faction green"]);
    assert_eq!(lines.last().unwrap(), "faction green regions 2 dead false");
}

#[test]
fn join_assigns_factions_round_robin() {
    let lines = with_map(&["join a", "join b", "join c", "player a", "player b", "player c", "player z"]);
    let players: Vec<&String> = lines.iter().filter(|l| l.starts_with("player ")).collect();
    assert_eq!(players, vec!["player a red", "player b blue", "player c green", "player z none"]);
}

#[test]
fn conquest_session() {
    let lines = with_map(&[
        "join red1",
        "join blue1",
        "attack red1 3 0 150",
        "time 28800",
        "outcome 3",
        "resolve 3",
        "faction blue",
        "balance red1",
    ]);
    assert!(lines.contains(&"outcome resolvable true defender_wins false remaining 125 overwhelm true".to_string()));
    let resolved = lines
        .iter()
        .find(|l| l.starts_with(r#"event {"event":"resolved_siege""#))
        .expect("resolution event");
    assert!(resolved.contains(r#""winner":"red""#));
    assert!(resolved.contains(r#""eliminated":true"#));
    assert!(lines.contains(&"faction blue regions 0 dead true".to_string()));
    assert!(lines.contains(&"balance red1 pleb 850 fees 0".to_string()));
}

#[test]
fn production_and_fees_session() {
    let lines = with_map(&[
        "join red1",
        "worker red1 0 1000",
        "advance 100",
        "claim red1 0 2 web",
        "balance red1",
        "fees web",
        "balance web",
        "fees web",
    ]);
    assert!(lines.contains(&r#"event {"event":"claimed_pleb","player":"red1","amount":96000}"#.to_string()));
    assert!(lines.contains(&"balance red1 pleb 96000 fees 0".to_string()));
    assert!(lines.contains(&"balance web pleb 2000 fees 0".to_string()));
    assert!(lines.last().unwrap().starts_with("error no_fees_accrued:"));
}

#[test]
fn rejected_calls_report_kind() {
    let lines = with_map(&[
        "join red1",
        "worker red1 3 10",
        "attack red1 2 0 10",
        "worker red1 0 5000",
        "claim red1 0 5 web",
    ]);
    let errors: Vec<&str> = lines
        .iter()
        .filter(|l| l.starts_with("error "))
        .map(|l| l.split(':').next().unwrap())
        .collect();
    assert_eq!(
        errors,
        vec![
            "error region_not_secure",
            "error movement_not_allowed",
            "error insufficient_stake",
            "error fee_too_high",
        ]
    );
}

#[test]
fn config_file_sets_owner_and_settings() {
    let dir = tempfile::tempdir().unwrap();
    scenario(dir.path());
    let config = dir.path().join("game.toml");
    fs::write(
        &config,
        "owner = \"boss\"\nscenario = \"map.json\"\n[settings]\nmax_frontend_fee_percent = 5\n",
    )
    .unwrap();
    let lines = run_engine(
        &["--config", &config.to_string_lossy()],
        &["join red1", "worker red1 0 1000", "advance 10", "claim red1 0 5 web", "balance boss"],
    );
    assert!(lines.contains(&"balance boss pleb 0 fees 200".to_string()));
}
