//! Text command parser.
//!
//! Parses one line of the host protocol into a structured `Command` that
//! the engine main loop can dispatch on. Tokens are whitespace separated;
//! player and recipient names are opaque addresses.

use std::path::PathBuf;

use thiserror::Error;

use crate::world::{Address, Amount, Faction, RegionId, Timestamp};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("malformed {command}: expected '{usage}'")]
    Usage {
        command: &'static str,
        usage: &'static str,
    },

    #[error("invalid {what}: '{value}'")]
    InvalidValue { what: &'static str, value: String },
}

/// A parsed host-to-engine command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Synchronization ping; engine must reply `readyok`.
    IsReady,

    /// Set the host clock to an absolute time.
    Time { now: Timestamp },

    /// Move the host clock forward.
    Advance { seconds: Timestamp },

    /// Apply a JSON scenario as the owner.
    Load { path: PathBuf },

    /// Set the deployment lock as the owner.
    Lock,

    /// Change one game setting as the owner.
    SetSetting { name: String, value: String },

    Join { player: Address, payment: Option<Amount> },

    Worker { player: Address, region: RegionId, amount: Amount },

    Garrison {
        player: Address,
        to: RegionId,
        from: RegionId,
        amount: Amount,
    },

    Attack {
        player: Address,
        to: RegionId,
        from: RegionId,
        amount: Amount,
    },

    Claim {
        player: Address,
        region: RegionId,
        fee_percent: u8,
        frontend: Address,
        recipient: Option<Address>,
    },

    ClaimFees { player: Address },

    Resolve { region: RegionId },

    /// Query the siege outcome of a region at the current time.
    Outcome { region: RegionId },

    /// Query a region's full state as JSON.
    Region { region: RegionId },

    /// Query a lord's stake and claimable production in a region.
    Lord { region: RegionId, player: Address },

    Balance { player: Address },

    Faction { faction: Faction },

    Player { player: Address },

    /// Terminate the engine process.
    Quit,
}

/// Parses a single line of input into a `Command`.
///
/// Returns `Ok(None)` for empty lines and `#` comments.
pub fn parse_command(line: &str) -> Result<Option<Command>, ParseError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let tokens: Vec<&str> = trimmed.split_whitespace().collect();
    let args = &tokens[1..];

    let cmd = match tokens[0] {
        "isready" => Command::IsReady,
        "lock" => Command::Lock,
        "quit" => Command::Quit,

        "time" => {
            let [now] = expect::<1>(args, "time", "time <seconds>")?;
            Command::Time { now: number(now, "time")? }
        }
        "advance" => {
            let [seconds] = expect::<1>(args, "advance", "advance <seconds>")?;
            Command::Advance {
                seconds: number(seconds, "duration")?,
            }
        }
        "load" => {
            let [path] = expect::<1>(args, "load", "load <scenario.json>")?;
            Command::Load { path: PathBuf::from(path) }
        }
        "setsetting" => {
            let [name, value] = expect::<2>(args, "setsetting", "setsetting <name> <value>")?;
            Command::SetSetting {
                name: name.to_string(),
                value: value.to_string(),
            }
        }
        "join" => parse_join(args)?,
        "worker" => {
            let [player, region, amount] = expect::<3>(args, "worker", "worker <player> <region> <amount>")?;
            Command::Worker {
                player: Address::from(player),
                region: region_id(region)?,
                amount: number(amount, "amount")?,
            }
        }
        "garrison" => {
            let [player, to, from, amount] = expect::<4>(args, "garrison", "garrison <player> <to> <from> <amount>")?;
            Command::Garrison {
                player: Address::from(player),
                to: region_id(to)?,
                from: region_id(from)?,
                amount: number(amount, "amount")?,
            }
        }
        "attack" => {
            let [player, to, from, amount] = expect::<4>(args, "attack", "attack <player> <to> <from> <amount>")?;
            Command::Attack {
                player: Address::from(player),
                to: region_id(to)?,
                from: region_id(from)?,
                amount: number(amount, "amount")?,
            }
        }
        "claim" => parse_claim(args)?,
        "fees" => {
            let [player] = expect::<1>(args, "fees", "fees <player>")?;
            Command::ClaimFees {
                player: Address::from(player),
            }
        }
        "resolve" => {
            let [region] = expect::<1>(args, "resolve", "resolve <region>")?;
            Command::Resolve { region: region_id(region)? }
        }
        "outcome" => {
            let [region] = expect::<1>(args, "outcome", "outcome <region>")?;
            Command::Outcome { region: region_id(region)? }
        }
        "region" => {
            let [region] = expect::<1>(args, "region", "region <region>")?;
            Command::Region { region: region_id(region)? }
        }
        "lord" => {
            let [region, player] = expect::<2>(args, "lord", "lord <region> <player>")?;
            Command::Lord {
                region: region_id(region)?,
                player: Address::from(player),
            }
        }
        "balance" => {
            let [player] = expect::<1>(args, "balance", "balance <player>")?;
            Command::Balance {
                player: Address::from(player),
            }
        }
        "faction" => {
            let [name] = expect::<1>(args, "faction", "faction <red|blue|green|yellow>")?;
            let faction = Faction::from_name(name).ok_or_else(|| ParseError::InvalidValue {
                what: "faction",
                value: name.to_string(),
            })?;
            Command::Faction { faction }
        }
        "player" => {
            let [player] = expect::<1>(args, "player", "player <player>")?;
            Command::Player {
                player: Address::from(player),
            }
        }

        other => return Err(ParseError::UnknownCommand(other.to_string())),
    };
    Ok(Some(cmd))
}

/// Parses `join <player> [payment]`.
fn parse_join(args: &[&str]) -> Result<Command, ParseError> {
    const USAGE: &str = "join <player> [payment]";
    match args {
        [player] => Ok(Command::Join {
            player: Address::from(*player),
            payment: None,
        }),
        [player, payment] => Ok(Command::Join {
            player: Address::from(*player),
            payment: Some(number(payment, "payment")?),
        }),
        _ => Err(ParseError::Usage {
            command: "join",
            usage: USAGE,
        }),
    }
}

/// Parses `claim <player> <region> <fee%> <frontend> [recipient]`.
fn parse_claim(args: &[&str]) -> Result<Command, ParseError> {
    const USAGE: &str = "claim <player> <region> <fee%> <frontend> [recipient]";
    let (player, region, fee, frontend, recipient) = match args {
        [p, r, f, fe] => (p, r, f, fe, None),
        [p, r, f, fe, to] => (p, r, f, fe, Some(Address::from(*to))),
        _ => {
            return Err(ParseError::Usage {
                command: "claim",
                usage: USAGE,
            })
        }
    };
    Ok(Command::Claim {
        player: Address::from(*player),
        region: region_id(region)?,
        fee_percent: number(fee, "fee percent")?,
        frontend: Address::from(*frontend),
        recipient,
    })
}

/// Destructures exactly `N` arguments.
fn expect<'a, const N: usize>(
    args: &[&'a str],
    command: &'static str,
    usage: &'static str,
) -> Result<[&'a str; N], ParseError> {
    <[&str; N]>::try_from(args).map_err(|_| ParseError::Usage { command, usage })
}

fn number<N: std::str::FromStr>(token: &str, what: &'static str) -> Result<N, ParseError> {
    token.parse().map_err(|_| ParseError::InvalidValue {
        what,
        value: token.to_string(),
    })
}

fn region_id(token: &str) -> Result<RegionId, ParseError> {
    number(token, "region").map(RegionId)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Command {
        parse_command(line).unwrap().unwrap()
    }

    #[test]
    fn parse_empty_and_comment() {
        assert_eq!(parse_command(""), Ok(None));
        assert_eq!(parse_command("   "), Ok(None));
        assert_eq!(parse_command("# setup"), Ok(None));
    }

    #[test]
    fn parse_bare_commands() {
        assert_eq!(parse("isready"), Command::IsReady);
        assert_eq!(parse("  quit  "), Command::Quit);
        assert_eq!(parse("lock"), Command::Lock);
    }

    #[test]
    fn parse_unknown() {
        assert_eq!(
            parse_command("foobar 1"),
            Err(ParseError::UnknownCommand("foobar".into()))
        );
    }

    #[test]
    fn parse_clock() {
        assert_eq!(parse("time 3600"), Command::Time { now: 3600 });
        assert_eq!(parse("advance 60"), Command::Advance { seconds: 60 });
        assert!(matches!(
            parse_command("advance -1"),
            Err(ParseError::InvalidValue { what: "duration", .. })
        ));
    }

    #[test]
    fn parse_join_with_and_without_payment() {
        assert_eq!(
            parse("join alice"),
            Command::Join {
                player: "alice".into(),
                payment: None
            }
        );
        assert_eq!(
            parse("join alice 10"),
            Command::Join {
                player: "alice".into(),
                payment: Some(10)
            }
        );
    }

    #[test]
    fn parse_attack() {
        assert_eq!(
            parse("attack alice 3 0 150"),
            Command::Attack {
                player: "alice".into(),
                to: RegionId(3),
                from: RegionId(0),
                amount: 150
            }
        );
    }

    #[test]
    fn parse_attack_missing_amount() {
        assert!(matches!(
            parse_command("attack alice 3 0"),
            Err(ParseError::Usage { command: "attack", .. })
        ));
    }

    #[test]
    fn parse_claim_optional_recipient() {
        assert_eq!(
            parse("claim alice 0 2 web"),
            Command::Claim {
                player: "alice".into(),
                region: RegionId(0),
                fee_percent: 2,
                frontend: "web".into(),
                recipient: None,
            }
        );
        match parse("claim alice 0 2 web vault") {
            Command::Claim { recipient, .. } => assert_eq!(recipient, Some("vault".into())),
            other => panic!("expected claim, got {:?}", other),
        }
    }

    #[test]
    fn parse_claim_fee_out_of_range() {
        assert!(matches!(
            parse_command("claim alice 0 300 web"),
            Err(ParseError::InvalidValue { what: "fee percent", .. })
        ));
    }

    #[test]
    fn parse_faction_query() {
        assert_eq!(parse("faction green"), Command::Faction { faction: Faction::Green });
        assert!(parse_command("faction purple").is_err());
    }

    #[test]
    fn parse_setsetting() {
        assert_eq!(
            parse("setsetting rally_time 14400"),
            Command::SetSetting {
                name: "rally_time".into(),
                value: "14400".into()
            }
        );
    }
}
