use crate::config::Config;
use crate::error::{GatewayError, Result};
use chrono::{DateTime, Utc};
use colored::*;
use log::{Level, LevelFilter, Metadata, Record};
use once_cell::sync::Lazy;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use uuid::Uuid;

static GATEWAY_LOGGER: Lazy<GatewayLogger> = Lazy::new(GatewayLogger::new);

pub fn init_with_config(config: LoggerConfig) -> Result<()> {
    let max_level = config.min_level;
    GATEWAY_LOGGER.update_config(config)?;

    log::set_logger(&*GATEWAY_LOGGER)
        .map_err(|e| GatewayError::Config(format!("Failed to set logger: {}", e)))?;

    log::set_max_level(max_level);
    Ok(())
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

fn level_emoji(level: Level) -> &'static str {
    match level {
        Level::Trace => "🔍",
        Level::Debug => "🐛",
        Level::Info => "💡",
        Level::Warn => "⚠️",
        Level::Error => "❌",
    }
}

/// One emitted record, as written in JSON mode.
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub level: String,
    pub message: String,
    pub module: String,
    pub file: String,
    pub line: u32,
    #[serde(skip)]
    level_raw: Option<Level>,
}

impl LogEntry {
    fn from_record(record: &Record) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            level: record.level().as_str().to_string(),
            message: record.args().to_string(),
            module: record.module_path().unwrap_or("unknown").to_string(),
            file: record.file().unwrap_or("unknown").to_string(),
            line: record.line().unwrap_or(0),
            level_raw: Some(record.level()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub min_level: LevelFilter,
    pub show_colors: bool,
    pub show_emojis: bool,
    pub show_file_location: bool,
    pub timestamp_format: String,
    pub output_json: bool,
    pub log_file_path: Option<String>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            min_level: LevelFilter::Info,
            show_colors: true,
            show_emojis: true,
            show_file_location: false,
            timestamp_format: "%Y-%m-%d %H:%M:%S%.3f".to_string(),
            output_json: false,
            log_file_path: None,
        }
    }
}

impl LoggerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads `LOG_LEVEL`, `LOG_JSON` and `LOG_FILE`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(level) = std::env::var("LOG_LEVEL")
            .ok()
            .and_then(|s| s.parse::<LevelFilter>().ok())
        {
            config.min_level = level;
        }
        if std::env::var("LOG_JSON").map_or(false, |v| v == "true" || v == "1") {
            config = config.with_json_output(true);
        }
        if let Ok(path) = std::env::var("LOG_FILE") {
            config = config.with_file_output(&path);
        }
        config
    }

    pub fn with_file_output(mut self, path: &str) -> Self {
        self.log_file_path = Some(path.to_string());
        self
    }

    pub fn with_json_output(mut self, enabled: bool) -> Self {
        self.output_json = enabled;
        if enabled {
            self.show_colors = false;
            self.show_emojis = false;
        }
        self
    }

    pub fn development() -> Self {
        Self {
            min_level: LevelFilter::Debug,
            show_file_location: true,
            ..Default::default()
        }
    }
}

pub struct GatewayLogger {
    config: Mutex<LoggerConfig>,
    log_file: Mutex<Option<File>>,
}

impl GatewayLogger {
    pub fn new() -> Self {
        Self {
            config: Mutex::new(LoggerConfig::default()),
            log_file: Mutex::new(None),
        }
    }

    pub fn update_config(&self, new_config: LoggerConfig) -> Result<()> {
        let file = match &new_config.log_file_path {
            Some(path) => Some(OpenOptions::new().create(true).append(true).open(path)?),
            None => None,
        };

        if let Ok(mut log_file) = self.log_file.lock() {
            *log_file = file;
        }
        if let Ok(mut config) = self.config.lock() {
            *config = new_config;
        }
        Ok(())
    }

    fn format_line(&self, entry: &LogEntry, config: &LoggerConfig) -> String {
        if config.output_json {
            return serde_json::to_string(entry).unwrap_or_default();
        }

        let level = entry.level_raw.unwrap_or(Level::Info);
        let timestamp = entry.timestamp.format(&config.timestamp_format).to_string();
        let level_str = if config.show_emojis {
            format!("{} {}", level_emoji(level), entry.level)
        } else {
            entry.level.clone()
        };

        let mut output = if config.show_colors {
            format!(
                "{} [{}] {}::{}",
                timestamp.bright_black(),
                level_str.color(level_color(level)).bold(),
                entry.module.bright_blue(),
                entry.message.white().bold()
            )
        } else {
            format!(
                "{} [{}] {}::{}",
                timestamp, level_str, entry.module, entry.message
            )
        };

        if config.show_file_location {
            let location = format!("{}:{}", entry.file, entry.line);
            if config.show_colors {
                output.push_str(&format!(" ({})", location.bright_black()));
            } else {
                output.push_str(&format!(" ({})", location));
            }
        }

        output
    }
}

impl Default for GatewayLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl log::Log for GatewayLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        match self.config.lock() {
            Ok(config) => metadata.level() <= config.min_level,
            Err(_) => true,
        }
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let entry = LogEntry::from_record(record);

        let Ok(config) = self.config.lock() else {
            return;
        };
        let line = self.format_line(&entry, &config);
        println!("{}", line);

        if config.log_file_path.is_some() {
            // File output never carries color codes.
            let plain = LoggerConfig {
                show_colors: false,
                ..config.clone()
            };
            let line = self.format_line(&entry, &plain);
            if let Ok(mut guard) = self.log_file.lock() {
                if let Some(file) = guard.as_mut() {
                    let _ = writeln!(file, "{}", line);
                }
            }
        }
    }

    fn flush(&self) {
        let _ = io::stdout().flush();
        if let Ok(mut guard) = self.log_file.lock() {
            if let Some(file) = guard.as_mut() {
                let _ = file.flush();
            }
        }
    }
}

/// Logs the elapsed time of a named operation when dropped.
pub struct Timer {
    start: Instant,
    name: String,
}

impl Timer {
    pub fn new(name: &str) -> Self {
        log::debug!("⏱️  Starting timer: {}", name);
        Self {
            start: Instant::now(),
            name: name.to_string(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        log::info!(
            "⏱️  Timer '{}' completed in {}ms",
            self.name,
            self.elapsed().as_millis()
        );
    }
}

pub fn timer(name: &str) -> Timer {
    Timer::new(name)
}

pub fn log_startup_info(app_name: &str, version: &str, address: &str) {
    log::info!("🚀 Starting {} v{}", app_name, version);
    log::info!("🌐 Server will run on http://{}", address);
}

/// Logs the effective configuration; the API key is reported only as present or absent.
pub fn log_config_info(config: &Config) {
    log::info!("⚙️  Configuration loaded:");
    log::info!("   Variant: {}", config.gateway.variant.as_str());
    log::info!("   Text model: {}", config.gemini.text_model);
    log::info!("   Image model: {}", config.gemini.image_model);
    log::info!(
        "   API key: {}",
        if config.gemini.has_api_key() { "✅" } else { "❌" }
    );
    match &config.gateway.save_path {
        Some(path) => log::info!("   Save path: {}", path.display()),
        None => log::info!("   Save path: disabled"),
    }
    if let Some(timeout) = config.gemini.timeout {
        log::info!("   Upstream timeout: {}s", timeout.as_secs());
    }
}
