use std::{env, path::PathBuf};

use anyhow::{Context, Result, anyhow};

const USAGE: &str = "usage: wurzel [--config <path>] [--rounds <n>]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub config_path: PathBuf,
    /// Overrides `loop.max_rounds` from the config file.
    pub max_rounds: Option<u64>,
}

pub fn args_from_env() -> Result<CliArgs> {
    parse_args(env::args().skip(1))
}

pub fn parse_args(args: impl IntoIterator<Item = String>) -> Result<CliArgs> {
    let mut args = args.into_iter();
    let mut config_path = None;
    let mut max_rounds = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let value = args
                    .next()
                    .ok_or_else(|| anyhow!("missing value for --config"))?;
                config_path = Some(PathBuf::from(value));
            }
            "--rounds" => {
                let value = args
                    .next()
                    .ok_or_else(|| anyhow!("missing value for --rounds"))?;
                let rounds = value
                    .parse::<u64>()
                    .with_context(|| format!("invalid --rounds value '{value}'"))?;
                max_rounds = Some(rounds);
            }
            other => {
                return Err(anyhow!("unknown argument: {other}. {USAGE}"));
            }
        }
    }

    Ok(CliArgs {
        config_path: config_path.unwrap_or_else(|| PathBuf::from("./wurzel.jsonc")),
        max_rounds,
    })
}
