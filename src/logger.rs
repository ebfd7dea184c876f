use chrono::{DateTime, Utc};
use colored::*;
use log::{Level, LevelFilter, Metadata, Record};
use once_cell::sync::Lazy;
use serde::Serialize;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

static PIPELINE_LOGGER: Lazy<PipelineLogger> = Lazy::new(PipelineLogger::new);

pub fn init() -> Result<(), String> {
    init_with_config(LoggerConfig::default())
}

static INSTALLED: AtomicBool = AtomicBool::new(false);

/// Installs the global logger. Later calls only replace the configuration; fails if some other
/// logger was installed first.
pub fn init_with_config(config: LoggerConfig) -> Result<(), String> {
    let filter = config.min_level;
    PIPELINE_LOGGER.configure(config);

    match log::set_logger(&*PIPELINE_LOGGER) {
        Ok(()) => INSTALLED.store(true, Ordering::SeqCst),
        Err(_) if INSTALLED.load(Ordering::SeqCst) => {}
        Err(e) => return Err(format!("Failed to set logger: {:?}", e)),
    }
    log::set_max_level(filter);
    Ok(())
}

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub min_level: LevelFilter,
    pub show_colors: bool,
    pub show_emojis: bool,
    pub show_module: bool,
    pub include_timestamp: bool,
    pub timestamp_format: String,
    pub output_json: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            min_level: LevelFilter::Info,
            show_colors: true,
            show_emojis: true,
            show_module: true,
            include_timestamp: true,
            timestamp_format: "%Y-%m-%d %H:%M:%S%.3f".to_string(),
            output_json: false,
        }
    }
}

impl LoggerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level(mut self, level: LevelFilter) -> Self {
        self.min_level = level;
        self
    }

    pub fn with_colors(mut self, enabled: bool) -> Self {
        self.show_colors = enabled;
        self
    }

    pub fn with_json_output(mut self, enabled: bool) -> Self {
        self.output_json = enabled;
        self
    }

    pub fn production() -> Self {
        Self {
            min_level: LevelFilter::Info,
            show_colors: false,
            show_emojis: false,
            output_json: true,
            ..Default::default()
        }
    }

    pub fn development() -> Self {
        Self {
            min_level: LevelFilter::Debug,
            show_colors: true,
            show_emojis: true,
            output_json: false,
            ..Default::default()
        }
    }
}

fn level_emoji(level: Level) -> &'static str {
    match level {
        Level::Trace => "🔍",
        Level::Debug => "🐛",
        Level::Info => "💡",
        Level::Warn => "⚠️",
        Level::Error => "❌",
    }
}

fn level_color(level: Level) -> Color {
    match level {
        Level::Trace => Color::Cyan,
        Level::Debug => Color::Blue,
        Level::Info => Color::Green,
        Level::Warn => Color::Yellow,
        Level::Error => Color::Red,
    }
}

#[derive(Debug, Serialize)]
struct JsonLine<'a> {
    timestamp: DateTime<Utc>,
    level: &'a str,
    module: &'a str,
    message: String,
}

pub struct PipelineLogger {
    config: Mutex<LoggerConfig>,
}

impl PipelineLogger {
    fn new() -> Self {
        Self {
            config: Mutex::new(LoggerConfig::default()),
        }
    }

    fn configure(&self, config: LoggerConfig) {
        *self.config.lock().unwrap_or_else(PoisonError::into_inner) = config;
    }

    fn format_line(record: &Record, config: &LoggerConfig) -> String {
        let level = record.level();
        let module = record.module_path().unwrap_or("unknown");

        if config.output_json {
            let line = JsonLine {
                timestamp: Utc::now(),
                level: level.as_str(),
                module,
                message: record.args().to_string(),
            };
            return serde_json::to_string(&line).unwrap_or_default();
        }

        let mut output = String::new();

        if config.include_timestamp {
            let timestamp = Utc::now().format(&config.timestamp_format).to_string();
            if config.show_colors {
                output.push_str(&format!("{} ", timestamp.bright_black()));
            } else {
                output.push_str(&format!("{} ", timestamp));
            }
        }

        let level_str = if config.show_emojis {
            format!("{} {}", level_emoji(level), level.as_str())
        } else {
            level.as_str().to_string()
        };
        if config.show_colors {
            output.push_str(&format!("[{}] ", level_str.color(level_color(level)).bold()));
        } else {
            output.push_str(&format!("[{}] ", level_str));
        }

        if config.show_module {
            if config.show_colors {
                output.push_str(&format!("{}: ", module.bright_blue()));
            } else {
                output.push_str(&format!("{}: ", module));
            }
        }

        output.push_str(&record.args().to_string());
        output
    }
}

impl log::Log for PipelineLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        let config = self.config.lock().unwrap_or_else(PoisonError::into_inner);
        metadata.level() <= config.min_level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = {
            let config = self.config.lock().unwrap_or_else(PoisonError::into_inner);
            Self::format_line(record, &config)
        };
        // stderr keeps stdout free for the binary's JSON output
        let _ = writeln!(io::stderr(), "{}", line);
    }

    fn flush(&self) {
        let _ = io::stderr().flush();
    }
}

/// Measures how long an operation took.
pub struct Timer {
    start: Instant,
    name: String,
}

impl Timer {
    pub fn new(name: &str) -> Self {
        log::debug!("⏱️  Starting: {}", name);
        Self {
            start: Instant::now(),
            name: name.to_string(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn finish(self) -> Duration {
        let elapsed = self.elapsed();
        log::debug!("⏱️  '{}' took {}ms", self.name, elapsed.as_millis());
        elapsed
    }
}

pub fn timer(name: &str) -> Timer {
    Timer::new(name)
}
