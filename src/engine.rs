//! Engine state management.
//!
//! The engine is the single ordering authority over one game: it owns the
//! `Game`, the host clock and the owner identity, executes parsed commands
//! one at a time, and writes line-oriented replies.
//!
//! Replies:
//! - `ok` after a successful call, preceded by one `event <json>` line per
//!   event the call emitted;
//! - `error <kind>: <message>` when a call is rejected;
//! - one line of query output for queries.

use std::io::{self, Write};

use serde::Serialize;

use crate::config::Config;
use crate::error::GameResult;
use crate::game::Game;
use crate::production::LordStake;
use crate::protocol::parser::Command;
use crate::protocol::scenario::{Scenario, ScenarioError};
use crate::token::PlebBank;
use crate::world::{Address, Amount, RegionId, Timestamp};

/// Holds the mutable state of the engine between commands.
pub struct Engine {
    game: Game<PlebBank>,
    owner: Address,
    clock: Timestamp,
}

#[derive(Serialize)]
struct LordView<'a> {
    region: RegionId,
    lord: &'a Address,
    stake: Option<LordStake>,
    claimable: Amount,
}

impl Engine {
    /// Creates an engine with an empty world configured by `config`.
    ///
    /// The scenario path in `config` is not applied here; see [`Engine::load`].
    pub fn new(config: &Config) -> Self {
        let mut game = Game::new(config.owner.clone());
        // Settings were validated when the config was loaded.
        if let Err(e) = game.set_settings(&config.owner, config.settings) {
            tracing::warn!(error = %e, "ignoring configured settings");
        }
        game.drain_events();
        Engine {
            game,
            owner: config.owner.clone(),
            clock: 0,
        }
    }

    pub fn game(&self) -> &Game<PlebBank> {
        &self.game
    }

    pub fn now(&self) -> Timestamp {
        self.clock
    }

    /// Sets the clock. The clock never rewinds.
    pub fn set_time(&mut self, now: Timestamp) -> Result<(), String> {
        if now < self.clock {
            return Err(format!("clock cannot rewind from {} to {}", self.clock, now));
        }
        self.clock = now;
        Ok(())
    }

    /// Applies a scenario file as the owner. Setup events are not reported.
    pub fn load(&mut self, path: &std::path::Path) -> Result<(), ScenarioError> {
        let applied = Scenario::load(path)?.apply(&mut self.game, &self.owner);
        self.game.drain_events();
        applied
    }

    /// Executes one command and writes its reply.
    pub fn execute<W: Write>(&mut self, cmd: Command, out: &mut W) -> io::Result<()> {
        let now = self.clock;
        match cmd {
            Command::IsReady => writeln!(out, "readyok")?,
            Command::Quit => {}

            Command::Time { now } => match self.set_time(now) {
                Ok(()) => writeln!(out, "ok")?,
                Err(msg) => writeln!(out, "error clock: {}", msg)?,
            },
            Command::Advance { seconds } => {
                self.clock = self.clock.saturating_add(seconds);
                writeln!(out, "ok")?;
            }

            Command::Load { path } => match self.load(&path) {
                Ok(()) => self.reply(Ok(()), out)?,
                Err(ScenarioError::Rejected(e)) => self.reply::<(), _>(Err(e), out)?,
                Err(e) => {
                    tracing::warn!(?path, error = %e, "scenario not loaded");
                    writeln!(out, "error scenario: {}", e)?;
                }
            },
            Command::Lock => {
                let r = self.game.set_deployment_done(&self.owner);
                self.reply(r, out)?;
            }
            Command::SetSetting { name, value } => {
                match self.game.world().settings.with_field(&name, &value) {
                    Ok(settings) => {
                        let r = self.game.set_settings(&self.owner, settings);
                        self.reply(r, out)?;
                    }
                    Err(msg) => writeln!(out, "error invalid_settings: {}", msg)?,
                }
            }

            Command::Join { player, payment } => {
                let payment = payment.unwrap_or(self.game.world().settings.ticket_price);
                let r = self.game.join_game(&player, payment);
                self.reply(r, out)?;
            }
            Command::Worker { player, region, amount } => {
                let r = self.game.deploy_worker(&player, region, amount, now);
                self.reply(r, out)?;
            }
            Command::Garrison { player, to, from, amount } => {
                let r = self.game.deploy_garrison(&player, to, from, amount, now);
                self.reply(r, out)?;
            }
            Command::Attack { player, to, from, amount } => {
                let r = self.game.attack(&player, to, from, amount, now);
                self.reply(r, out)?;
            }
            Command::Claim {
                player,
                region,
                fee_percent,
                frontend,
                recipient,
            } => {
                let r = self
                    .game
                    .claim_pleb(&player, region, fee_percent, &frontend, recipient.as_ref(), now);
                self.reply(r, out)?;
            }
            Command::ClaimFees { player } => {
                let r = self.game.claim_fees(&player);
                self.reply(r, out)?;
            }
            Command::Resolve { region } => {
                let r = self.game.resolve_siege(region, now);
                self.reply(r, out)?;
            }

            Command::Outcome { region } => match self.game.siege_outcome(region, now) {
                Ok(o) => writeln!(
                    out,
                    "outcome resolvable {} defender_wins {} remaining {} overwhelm {}",
                    o.resolvable, o.defender_wins, o.remaining_garrison, o.overwhelm
                )?,
                Err(e) => self.reply::<(), _>(Err(e), out)?,
            },
            Command::Region { region } => match self.game.world().region(region) {
                Ok(r) => writeln!(out, "region {}", to_json(r))?,
                Err(e) => self.reply::<(), _>(Err(e), out)?,
            },
            Command::Lord { region, player } => match self.game.claimable_pleb(region, &player, now) {
                Ok(claimable) => {
                    let view = LordView {
                        region,
                        lord: &player,
                        stake: self.game.production_by_lord(region, &player),
                        claimable,
                    };
                    writeln!(out, "lord {}", to_json(&view))?;
                }
                Err(e) => self.reply::<(), _>(Err(e), out)?,
            },
            Command::Balance { player } => {
                writeln!(
                    out,
                    "balance {} pleb {} fees {}",
                    player,
                    self.game.balance_of(&player),
                    self.game.claimable_fees(&player)
                )?;
            }
            Command::Faction { faction } => {
                writeln!(
                    out,
                    "faction {} regions {} dead {}",
                    faction,
                    self.game.regions_per_faction(faction),
                    self.game.faction_dead(faction)
                )?;
            }
            Command::Player { player } => match self.game.player_faction(&player) {
                Some(f) => writeln!(out, "player {} {}", player, f)?,
                None => writeln!(out, "player {} none", player)?,
            },
        }
        out.flush()
    }

    /// Writes the events of the last call, then `ok` or the rejection.
    fn reply<T, W: Write>(&mut self, result: GameResult<T>, out: &mut W) -> io::Result<()> {
        for event in self.game.drain_events() {
            writeln!(out, "event {}", to_json(&event))?;
        }
        match result {
            Ok(_) => writeln!(out, "ok"),
            Err(e) => {
                tracing::warn!(kind = e.kind(), error = %e, "call rejected");
                writeln!(out, "error {}: {}", e.kind(), e)
            }
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new(&Config::default())
    }
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| format!("{{\"error\":\"{}\"}}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::parser::parse_command;
    use crate::world::{Faction, RegionSpec, HOUR};

    fn engine() -> Engine {
        let mut engine = Engine::default();
        let owner = Address::from("owner");
        let specs = vec![
            RegionSpec {
                id: RegionId(0),
                position: Default::default(),
                tier: 0,
                garrison: 50,
                neighbors: vec![RegionId(1)],
                controlled_by: Faction::Red,
                total_worker: 0,
            },
            RegionSpec {
                id: RegionId(1),
                position: Default::default(),
                tier: 0,
                garrison: 50,
                neighbors: vec![],
                controlled_by: Faction::Blue,
                total_worker: 0,
            },
        ];
        engine.game.create_regions(&owner, specs).unwrap();
        engine
    }

    fn run(engine: &mut Engine, lines: &[&str]) -> Vec<String> {
        let mut output = Vec::new();
        for line in lines {
            if let Some(cmd) = parse_command(line).unwrap() {
                engine.execute(cmd, &mut output).unwrap();
            }
        }
        String::from_utf8(output)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn isready_outputs_readyok() {
        let lines = run(&mut Engine::default(), &["isready"]);
        assert_eq!(lines, vec!["readyok"]);
    }

    #[test]
    fn join_emits_event_then_ok() {
        let lines = run(&mut engine(), &["join alice"]);
        assert_eq!(
            lines,
            vec![
                r#"event {"event":"joined_game","player":"alice","faction":"red"}"#,
                "ok"
            ]
        );
    }

    #[test]
    fn rejection_reports_kind() {
        let lines = run(&mut engine(), &["join alice 0"]);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("error insufficient_payment: "));
    }

    #[test]
    fn clock_never_rewinds() {
        let mut e = engine();
        let lines = run(&mut e, &["time 100", "time 50", "advance 10"]);
        assert_eq!(lines[0], "ok");
        assert!(lines[1].starts_with("error clock:"));
        assert_eq!(e.now(), 110);
    }

    #[test]
    fn siege_resolves_lazily_on_outcome_then_resolve() {
        let mut e = engine();
        let lines = run(
            &mut e,
            &["join alice", "attack alice 1 0 150", "advance 28800", "outcome 1", "resolve 1"],
        );
        assert!(lines.contains(&"outcome resolvable true defender_wins false remaining 125 overwhelm true".to_string()));
        let resolved = lines
            .iter()
            .find(|l| l.contains("resolved_siege"))
            .expect("resolution event");
        assert!(resolved.contains(r#""winner":"red""#));
        assert_eq!(e.game().regions_per_faction(Faction::Blue), 0);
        assert!(e.game().faction_dead(Faction::Blue));
    }

    #[test]
    fn lord_query_reports_claimable() {
        let mut e = engine();
        let lines = run(&mut e, &["join alice", "worker alice 0 100", "advance 10", "lord 0 alice"]);
        let lord = lines.last().unwrap();
        assert!(lord.starts_with("lord {"));
        assert!(lord.contains(r#""claimable":10000"#));
    }

    #[test]
    fn setsetting_applies_and_emits() {
        let mut e = engine();
        let lines = run(&mut e, &["setsetting rally_time 14400"]);
        assert!(lines[0].starts_with(r#"event {"event":"settings_changed""#));
        assert_eq!(lines[1], "ok");
        assert_eq!(e.game().world().settings.rally_time, 4 * HOUR);

        let lines = run(&mut e, &["setsetting gravity 1"]);
        assert!(lines[0].starts_with("error invalid_settings:"));
    }

    #[test]
    fn unknown_region_query_is_error() {
        let lines = run(&mut engine(), &["region 9"]);
        assert!(lines[0].starts_with("error unknown_region:"));
    }
}
