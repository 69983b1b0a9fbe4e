use std::{path::PathBuf, str::FromStr};

use anyhow::{anyhow, bail, Context, Result};

use crate::selection::{ActiveTab, Target};

/// One user action, read as a line of text.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Select { target: Target, id: u64 },
    Clear,
    Connect,
    Correct,
    Incorrect(Vec<String>),
    Reset,
    Tab(ActiveTab),
    Jump(u64),
    Step(i64),
    StepSeconds(i64),
    Minute(i64),
    Next,
    Goto(u64),
    Save,
    Export(PathBuf),
    Stats,
    Quit,
}

impl Command {
    /// Whether the command can change the annotation tables.
    pub fn mutates_segments(&self) -> bool {
        matches!(
            self,
            Command::Connect | Command::Correct | Command::Incorrect(_) | Command::Reset
        )
    }
}

fn parse_arg<T>(arg: Option<&str>, name: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw = arg.ok_or_else(|| anyhow!("missing {name}"))?;
    raw.parse()
        .with_context(|| format!("invalid {name} '{raw}'"))
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };
        let mut args = rest.split_whitespace();

        let command = match verb {
            "select" => {
                let target = match args.next() {
                    Some("traj") | Some("trajectory") => Target::Trajectory,
                    Some("seg") | Some("segment") => Target::Segment,
                    Some(other) => bail!("unknown selection target '{other}'"),
                    None => bail!("missing selection target"),
                };
                Command::Select {
                    target,
                    id: parse_arg(args.next(), "id")?,
                }
            }
            "clear" => Command::Clear,
            "connect" => Command::Connect,
            "correct" => Command::Correct,
            "incorrect" => Command::Incorrect(
                rest.split(';')
                    .map(str::trim)
                    .filter(|reason| !reason.is_empty())
                    .map(str::to_string)
                    .collect(),
            ),
            "reset" => Command::Reset,
            "tab" => Command::Tab(
                args.next()
                    .ok_or_else(|| anyhow!("missing tab name"))?
                    .parse()?,
            ),
            "jump" => Command::Jump(parse_arg(args.next(), "frame")?),
            "step" => Command::Step(parse_arg(args.next(), "frame delta")?),
            "second" | "seconds" => Command::StepSeconds(parse_arg(args.next(), "second delta")?),
            "minute" => Command::Minute(parse_arg(args.next(), "minute delta")?),
            "next" => Command::Next,
            "goto" => Command::Goto(parse_arg(args.next(), "segment id")?),
            "save" => Command::Save,
            "export" => {
                if rest.is_empty() {
                    bail!("missing export path");
                }
                Command::Export(PathBuf::from(rest))
            }
            "stats" => Command::Stats,
            "quit" | "exit" => Command::Quit,
            "" => bail!("empty command"),
            other => bail!("unknown command '{other}'"),
        };
        Ok(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_selection() {
        assert_eq!(
            "select traj 12".parse::<Command>().unwrap(),
            Command::Select {
                target: Target::Trajectory,
                id: 12
            }
        );
        assert_eq!(
            "  select seg 3 ".parse::<Command>().unwrap(),
            Command::Select {
                target: Target::Segment,
                id: 3
            }
        );
        assert!("select lane 3".parse::<Command>().is_err());
        assert!("select traj x".parse::<Command>().is_err());
    }

    #[test]
    fn incorrect_reasons_split_on_semicolons() {
        assert_eq!(
            "incorrect large distance; wrong direction;".parse::<Command>().unwrap(),
            Command::Incorrect(vec!["large distance".into(), "wrong direction".into()])
        );
        assert_eq!(
            "incorrect".parse::<Command>().unwrap(),
            Command::Incorrect(Vec::new())
        );
    }

    #[test]
    fn navigation_deltas_can_be_negative() {
        assert_eq!("step -1".parse::<Command>().unwrap(), Command::Step(-1));
        assert_eq!("minute -2".parse::<Command>().unwrap(), Command::Minute(-2));
        assert_eq!("second 1".parse::<Command>().unwrap(), Command::StepSeconds(1));
        assert!("jump -5".parse::<Command>().is_err());
    }

    #[test]
    fn export_keeps_path_with_spaces() {
        assert_eq!(
            "export out/my segments.csv".parse::<Command>().unwrap(),
            Command::Export(PathBuf::from("out/my segments.csv"))
        );
    }

    #[test]
    fn unknown_verbs_are_rejected() {
        assert!("dance".parse::<Command>().is_err());
        assert!("".parse::<Command>().is_err());
    }
}
