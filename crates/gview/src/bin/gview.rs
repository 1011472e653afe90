use std::fs::File;
use std::io::{self, BufRead, BufReader, IsTerminal, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;
use std::time::Duration;

use gview::feed::{self, Feed, Feeder, StaticFeed};
use gview::json::{json_actions, JsonDisplayer};
use gview::{Controller, DisplayerContext, ReservedKeys};
use gview_core::config::{load_config, Config};
use gview_core::logging::{init_logger, Logger};
use serde_json::Value;

const USAGE: &str = "usage: gview [--config PATH] [--follow] [--out DIR] FILE|-";
const FEED_CAPACITY: usize = 1024;
const FOLLOW_POLL: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, PartialEq, Eq)]
struct Args {
    config: Option<PathBuf>,
    follow: bool,
    out_dir: PathBuf,
    input: String,
}

fn parse_args(args: &[String]) -> Result<Args, String> {
    let mut config = None;
    let mut follow = false;
    let mut out_dir = PathBuf::from(".");
    let mut input = None;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let path = iter.next().ok_or("--config requires a path")?;
                config = Some(PathBuf::from(path));
            }
            "--out" => {
                let path = iter.next().ok_or("--out requires a directory")?;
                out_dir = PathBuf::from(path);
            }
            "--follow" | "-f" => follow = true,
            "-h" | "--help" => return Err(USAGE.to_owned()),
            flag if flag.starts_with("--") => return Err(format!("unknown flag {flag}")),
            other => {
                if input.replace(other.to_owned()).is_some() {
                    return Err("only one input file may be given".to_owned());
                }
            }
        }
    }
    let input = input.ok_or_else(|| USAGE.to_owned())?;
    Ok(Args {
        config,
        follow,
        out_dir,
        input,
    })
}

/// One JSON document per line; lines that do not parse are kept as strings.
fn parse_line(line: &str) -> Option<Value> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(serde_json::from_str(trimmed).unwrap_or_else(|_| Value::String(trimmed.to_owned())))
}

fn open_input(input: &str) -> io::Result<Box<dyn Read + Send>> {
    if input == "-" {
        return Ok(Box::new(io::stdin()));
    }
    Ok(Box::new(File::open(input)?))
}

/// Read `reader` line by line into `feeder`. With `follow`, keep polling at
/// end of input for appended lines.
fn tail(reader: Box<dyn Read + Send>, feeder: &Feeder<Value>, follow: bool, logger: &Logger) {
    let mut reader = BufReader::new(reader);
    let mut line = String::new();
    loop {
        line.clear();
        match reader.read_line(&mut line) {
            Ok(0) if follow => thread::sleep(FOLLOW_POLL),
            Ok(0) => return,
            Ok(_) => {
                if let Some(value) = parse_line(&line) {
                    if feeder.send(value).is_err() {
                        return;
                    }
                }
            }
            Err(err) => {
                logger.error_with("read input", &[("error", &err.to_string())]);
                return;
            }
        }
    }
}

fn build_controller(
    config: &Config,
    out_dir: PathBuf,
    logger: &Logger,
) -> Result<Controller<Value>, String> {
    let displayer = JsonDisplayer::new(config.display.summary_fields.clone());
    let actions = json_actions(out_dir);
    let context = DisplayerContext::new(displayer, actions, ReservedKeys::standard())
        .map_err(|err| format!("invalid key bindings: {err}"))?;
    Ok(Controller::from_config(context, config, logger))
}

fn run(args: &Args) -> Result<(), String> {
    let (config, config_path) =
        load_config(args.config.as_deref()).map_err(|err| err.to_string())?;
    let logger = init_logger(&config.logging).map_err(|err| err.to_string())?;
    if let Some(path) = &config_path {
        logger.debug_with("config loaded", &[("path", &path.display().to_string())]);
    }

    let mut controller = build_controller(&config, args.out_dir.clone(), &logger)?;
    let reader = open_input(&args.input).map_err(|err| format!("open {}: {err}", args.input))?;

    let interactive =
        io::stdout().is_terminal() && (args.input != "-" || io::stdin().is_terminal());
    if !interactive {
        // Plain listing when not attached to a terminal.
        let messages: Vec<Value> = BufReader::new(reader)
            .lines()
            .map_while(Result::ok)
            .filter_map(|line| parse_line(&line))
            .collect();
        let mut listing = StaticFeed::new(messages);
        listing.drain(&mut |message| {
            controller.push(message);
        });
        if let Some(base) = controller.summary().context().base() {
            for summary in base.summaries() {
                println!("{summary}");
            }
        }
        return Ok(());
    }

    let (feeder, mut channel) = feed::channel(FEED_CAPACITY);
    let producer_logger = logger.component("producer");
    let follow = args.follow;
    thread::spawn(move || tail(reader, &feeder, follow, &producer_logger));

    gview::runtime::run(&mut controller, &mut channel, config.runtime.tick, &logger)
        .map_err(|err| err.to_string())
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let args = match parse_args(&args) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::from(2);
        }
    };
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("gview: {message}");
            ExitCode::FAILURE
        }
    }
}
