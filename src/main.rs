use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use lyric_core::{JudgeMode, TtmlGenerationOptions};
use lyric_sync::{
    AppConfig,
    logger::init_logger,
    replay::{parse_events, replay},
};
use strum::IntoEnumIterator;
use tracing::{info, warn};
use ttml_processor::{generate_ttml, parse_ttml};

const USAGE: &str = "\
用法:
  lyric_sync [--config <path>] normalize <input> [-o <output>] [--compact]
  lyric_sync [--config <path>] inspect <input>
  lyric_sync [--config <path>] replay <input> <events.json> [-o <output>] [--judge-mode <mode>]";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Normalize {
        input: PathBuf,
        output: Option<PathBuf>,
        compact: bool,
    },
    Inspect {
        input: PathBuf,
    },
    Replay {
        input: PathBuf,
        events: PathBuf,
        output: Option<PathBuf>,
        judge_mode: Option<JudgeMode>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Cli {
    config: Option<PathBuf>,
    command: Command,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Cli> {
    let mut config = None;
    let mut output = None;
    let mut compact = false;
    let mut judge_mode = None;
    let mut positional = Vec::new();

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => config = Some(PathBuf::from(expect_value(&mut args, &arg)?)),
            "-o" | "--output" => output = Some(PathBuf::from(expect_value(&mut args, &arg)?)),
            "--compact" => compact = true,
            "--judge-mode" => {
                let value = expect_value(&mut args, &arg)?;
                let mode = value.parse::<JudgeMode>().with_context(|| {
                    let modes: Vec<String> = JudgeMode::iter().map(|m| m.to_string()).collect();
                    format!("未知的判定方式 '{value}'，可选: {}", modes.join(", "))
                })?;
                judge_mode = Some(mode);
            }
            flag if flag.starts_with('-') => bail!("未知的参数 '{flag}'\n{USAGE}"),
            _ => positional.push(arg),
        }
    }

    let mut positional = positional.into_iter();
    let command = match (positional.next().as_deref(), positional.next(), positional.next()) {
        (Some("normalize"), Some(input), None) => Command::Normalize {
            input: input.into(),
            output,
            compact,
        },
        (Some("inspect"), Some(input), None) => Command::Inspect {
            input: input.into(),
        },
        (Some("replay"), Some(input), Some(events)) => Command::Replay {
            input: input.into(),
            events: events.into(),
            output,
            judge_mode,
        },
        _ => bail!("{USAGE}"),
    };
    if positional.next().is_some() {
        bail!("{USAGE}");
    }

    Ok(Cli { config, command })
}

fn expect_value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String> {
    args.next()
        .with_context(|| format!("参数 '{flag}' 缺少值"))
}

fn read_input(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("无法读取 {}", path.display()))
}

fn write_output(output: Option<&Path>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, content).with_context(|| format!("无法写入 {}", path.display()))?;
            info!("已写入 {}", path.display());
        }
        None => println!("{content}"),
    }
    Ok(())
}

fn report_warnings(warnings: &[String]) {
    for warning in warnings {
        warn!("{warning}");
    }
}

fn run(cli: Cli, config: &AppConfig) -> Result<()> {
    match cli.command {
        Command::Normalize {
            input,
            output,
            compact,
        } => {
            let parsed = parse_ttml(&read_input(&input)?, &config.parsing);
            report_warnings(&parsed.warnings);
            let options = if compact {
                TtmlGenerationOptions { format: false }
            } else {
                config.generation.clone()
            };
            let generated = generate_ttml(&parsed.document, &options)?;
            write_output(output.as_deref(), &generated)
        }
        Command::Inspect { input } => {
            let parsed = parse_ttml(&read_input(&input)?, &config.parsing);
            let report = serde_json::json!({
                "document": parsed.document,
                "warnings": parsed.warnings,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Command::Replay {
            input,
            events,
            output,
            judge_mode,
        } => {
            let parsed = parse_ttml(&read_input(&input)?, &config.parsing);
            report_warnings(&parsed.warnings);
            let events = parse_events(&read_input(&events)?)
                .with_context(|| format!("无法解析按键记录 {}", events.display()))?;

            let mut options = config.sync.clone();
            if let Some(mode) = judge_mode {
                options.judge_mode = mode;
            }
            let outcome = replay(parsed.document, options, &events);
            if outcome.rejected > 0 {
                warn!("{} 次按键没有可操作的目标", outcome.rejected);
            }
            let generated = generate_ttml(&outcome.document, &config.generation)?;
            write_output(output.as_deref(), &generated)
        }
    }
}

fn main() -> Result<()> {
    let cli = parse_args(std::env::args().skip(1))?;

    let config = match &cli.config {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("无法加载配置文件 {}", path.display()))?,
        None => AppConfig::load_default(),
    };
    let _guard = init_logger(&config.log)?;

    run(cli, &config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_parse_normalize() {
        let cli = parse_args(args(&["--config", "c.toml", "normalize", "in.ttml", "-o", "out.ttml", "--compact"]))
            .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("c.toml")));
        assert_eq!(
            cli.command,
            Command::Normalize {
                input: "in.ttml".into(),
                output: Some("out.ttml".into()),
                compact: true,
            }
        );
    }

    #[test]
    fn test_parse_replay_with_judge_mode() {
        let cli = parse_args(args(&["replay", "in.ttml", "keys.json", "--judge-mode", "middlekeytime"]))
            .unwrap();
        assert_eq!(
            cli.command,
            Command::Replay {
                input: "in.ttml".into(),
                events: "keys.json".into(),
                output: None,
                judge_mode: Some(JudgeMode::MiddleKeyTime),
            }
        );
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(parse_args(args(&[])).is_err());
        assert!(parse_args(args(&["inspect"])).is_err());
        assert!(parse_args(args(&["inspect", "a", "b"])).is_err());
        assert!(parse_args(args(&["--unknown", "inspect", "a"])).is_err());
        assert!(parse_args(args(&["replay", "a", "b", "--judge-mode", "fast"])).is_err());
        assert!(parse_args(args(&["normalize", "a", "-o"])).is_err());
    }
}
