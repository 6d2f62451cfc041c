use crate::Result;
use colorful::core::color_string::CString;
use colorful::Colorful;
use core::fmt::Arguments;
use dashmap::DashMap;
use lazy_static::lazy_static;
use log::{Level, LevelFilter, Record};
use std::fs;
use std::io;
use std::time::{Duration, Instant};

const LOG_DIR: &str = "logs/";

lazy_static! {
    static ref TRACKING: DashMap<String, Instant> = DashMap::new();
}

fn get_time_and_update(name: &str) -> Duration {
    let now = Instant::now();
    let duration = match TRACKING.get(name) {
        Some(time) => now.duration_since(*time),
        None => Duration::from_millis(0),
    };

    TRACKING.insert(name.to_owned(), now);

    duration
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sink {
    Console,
    File,
}

/// Per target verbosity of the console and the file
const TARGETS: &[(&str, LevelFilter, LevelFilter)] = &[
    ("slackemon", LevelFilter::Trace, LevelFilter::Debug),
    ("requester", LevelFilter::Debug, LevelFilter::Debug),
    ("serenity", LevelFilter::Error, LevelFilter::Warn),
    ("tracing", LevelFilter::Error, LevelFilter::Error),
];

fn target_level(target: &str, sink: Sink) -> Option<LevelFilter> {
    TARGETS
        .iter()
        .find(|(name, _, _)| *name == target)
        .map(|(_, console, file)| match sink {
            Sink::Console => *console,
            Sink::File => *file,
        })
}

fn with_targets(mut dispatch: fern::Dispatch, sink: Sink) -> fern::Dispatch {
    for (target, _, _) in TARGETS {
        if let Some(level) = target_level(target, sink) {
            dispatch = dispatch.level_for(*target, level);
        }
    }

    dispatch
}

pub fn init() -> Result<()> {
    fs::create_dir_all(LOG_DIR)?;

    let console = fern::Dispatch::new()
        .format(console_format)
        .level(LevelFilter::Info);

    let console = with_targets(console, Sink::Console)
        .filter(|meta| meta.level() > LevelFilter::Warn)
        .chain(io::stdout());

    let err_console = fern::Dispatch::new()
        .format(console_format)
        .level(LevelFilter::Warn)
        .chain(io::stderr());

    let file = fern::Dispatch::new()
        .format(file_format)
        .level(LevelFilter::Warn);

    let file = with_targets(file, Sink::File)
        .chain(fern::DateBased::new(LOG_DIR, "%F.slackemon.log"));

    fern::Dispatch::new()
        .chain(file)
        .chain(console)
        .chain(err_console)
        .apply()?;

    Ok(())
}

fn console_format(callback: fern::FormatCallback, message: &Arguments, record: &Record) {
    let mut name = record.target().to_owned();

    if let Some(line) = record.line() {
        name.push_str(&format!(":{}", line));
    }

    let duration = get_time_and_update(&name);

    callback.finish(format_args!(
        "{}{} {}{} {} ({}ms)",
        "[".dark_gray(),
        level_style(record.level()),
        name,
        "]".dark_gray(),
        message,
        duration.as_millis(),
    ))
}

fn file_format(callback: fern::FormatCallback, message: &Arguments, record: &Record) {
    let line = record.line().map(|v| format!(":{}", v));

    callback.finish(format_args!(
        "{} {:<5} {}{} {}",
        chrono::Local::now().format("%F %T%.3f"),
        record.level(),
        record.target(),
        line.unwrap_or_default(),
        message,
    ))
}

fn level_style(level: Level) -> CString {
    match level {
        Level::Trace => "TRACE".dark_gray(),
        Level::Debug => "DEBUG".white(),
        Level::Info => "INFO".green(),
        Level::Warn => "WARN".yellow(),
        Level::Error => "ERROR".red().bold(),
    }
}
