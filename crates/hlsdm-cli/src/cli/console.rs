//! Interactive console for `hlsdm get -i`.
//! Protocol: one command per stdin line, e.g. "pause 2" or "retry 1 14".

use anyhow::Result;
use hlsdm_core::engine::EngineHandle;
use hlsdm_core::job::{format_duration, JobId};
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "commands: status | segments <id> | pause <id>.. | resume <id> | start <id>.. \
| toggle <id> | remove <id>.. | retry <id> <segment> | retry-failed <id> | force <id> | wait | quit";

/// One parsed console line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Status,
    Segments(JobId),
    Pause(Vec<JobId>),
    Resume(JobId),
    Start(Vec<JobId>),
    Toggle(JobId),
    Remove(Vec<JobId>),
    /// Segment number is 1-based, as shown by `segments`.
    Retry { id: JobId, segment: usize },
    RetryFailed(JobId),
    Force(JobId),
    Wait,
    Help,
    Quit,
}

pub fn parse_line(line: &str) -> Result<ConsoleCommand, String> {
    let mut words = line.split_whitespace();
    let verb = words.next().unwrap_or("").to_ascii_lowercase();
    let args: Vec<&str> = words.collect();

    let ids = || -> Result<Vec<JobId>, String> {
        if args.is_empty() {
            return Err(format!("{} needs at least one job id", verb));
        }
        args.iter()
            .map(|a| a.parse::<JobId>().map_err(|_| format!("bad job id '{}'", a)))
            .collect()
    };
    let one_id = || -> Result<JobId, String> {
        match args.as_slice() {
            [a] => a.parse().map_err(|_| format!("bad job id '{}'", a)),
            _ => Err(format!("{} needs exactly one job id", verb)),
        }
    };

    match verb.as_str() {
        "status" | "ls" => Ok(ConsoleCommand::Status),
        "segments" => one_id().map(ConsoleCommand::Segments),
        "pause" => ids().map(ConsoleCommand::Pause),
        "resume" => one_id().map(ConsoleCommand::Resume),
        "start" => ids().map(ConsoleCommand::Start),
        "toggle" => one_id().map(ConsoleCommand::Toggle),
        "remove" | "rm" => ids().map(ConsoleCommand::Remove),
        "retry" => match args.as_slice() {
            [id, seg] => {
                let id = id.parse().map_err(|_| format!("bad job id '{}'", id))?;
                let segment: usize = seg
                    .parse()
                    .ok()
                    .filter(|s| *s >= 1)
                    .ok_or_else(|| format!("bad segment number '{}'", seg))?;
                Ok(ConsoleCommand::Retry { id, segment })
            }
            _ => Err("usage: retry <id> <segment>".to_string()),
        },
        "retry-failed" => one_id().map(ConsoleCommand::RetryFailed),
        "force" => one_id().map(ConsoleCommand::Force),
        "wait" => Ok(ConsoleCommand::Wait),
        "help" | "?" => Ok(ConsoleCommand::Help),
        "quit" | "exit" | "q" => Ok(ConsoleCommand::Quit),
        "" => Err(String::new()),
        other => Err(format!("unknown command '{}'", other)),
    }
}

/// Reads commands from stdin until "quit" or end of input.
pub async fn run(engine: &EngineHandle) -> Result<()> {
    println!("{}", HELP);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let cmd = match parse_line(&line) {
            Ok(cmd) => cmd,
            Err(msg) if msg.is_empty() => continue,
            Err(msg) => {
                println!("{}", msg);
                continue;
            }
        };
        if cmd == ConsoleCommand::Quit {
            break;
        }
        if let Err(e) = execute(engine, cmd).await {
            println!("error: {}", e);
        }
    }
    Ok(())
}

async fn execute(engine: &EngineHandle, cmd: ConsoleCommand) -> Result<()> {
    match cmd {
        ConsoleCommand::Status => {
            let jobs = engine.jobs().await?;
            if jobs.is_empty() {
                println!("No jobs.");
                return Ok(());
            }
            println!(
                "{:<4} {:<12} {:<8} {:<9} {:<8} {:<7} {}",
                "ID", "STATUS", "DONE", "RANGE", "LENGTH", "RETRY", "TITLE"
            );
            for j in jobs {
                let retry = match j.countdown {
                    Some(n) => format!("in {}", n),
                    None => j.retries_left.to_string(),
                };
                println!(
                    "{:<4} {:<12} {:<8} {:<9} {:<8} {:<7} {}",
                    j.id,
                    j.status.as_str(),
                    j.percent_label(),
                    format!("{}-{}", j.range.start, j.range.end),
                    format_duration(j.duration_secs),
                    retry,
                    j.title
                );
            }
        }
        ConsoleCommand::Segments(id) => {
            for s in engine.segments(id).await? {
                println!("{:<6} {:<12} {}", s.index + 1, s.status.as_str(), s.label);
            }
        }
        ConsoleCommand::Pause(ids) => match ids.as_slice() {
            [id] => engine.pause(*id).await?,
            _ => engine.pause_many(&ids).await?,
        },
        ConsoleCommand::Resume(id) => engine.resume(id).await?,
        ConsoleCommand::Start(ids) => engine.start_many(&ids).await?,
        ConsoleCommand::Toggle(id) => engine.toggle(id).await?,
        ConsoleCommand::Remove(ids) => match ids.as_slice() {
            [id] => engine.remove(*id).await?,
            _ => engine.remove_many(&ids).await?,
        },
        ConsoleCommand::Retry { id, segment } => engine.retry_segment(id, segment - 1).await?,
        ConsoleCommand::RetryFailed(id) => engine.retry_failed(id).await?,
        ConsoleCommand::Force(id) => {
            let artifact = engine.force_download(id).await?;
            println!(
                "[{}] wrote {} ({} bytes)",
                id,
                artifact.file_name,
                artifact.bytes.len()
            );
        }
        ConsoleCommand::Wait => engine.wait_idle().await?,
        ConsoleCommand::Help => println!("{}", HELP),
        ConsoleCommand::Quit => {}
    }
    Ok(())
}
