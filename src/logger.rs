use chrono::Utc;
use colored::*;
use log::{Level, LevelFilter, Metadata, Record};
use once_cell::sync::Lazy;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::sync::Mutex;

static CONSOLE_LOGGER: Lazy<ConsoleLogger> = Lazy::new(ConsoleLogger::new);

pub fn init() -> Result<(), String> {
    init_with_config(LoggerConfig::default())
}

pub fn init_with_config(config: LoggerConfig) -> Result<(), String> {
    CONSOLE_LOGGER.update_config(config.clone());

    if let Err(e) = log::set_logger(&*CONSOLE_LOGGER) {
        return Err(format!("Failed to set logger: {:?}", e));
    }

    log::set_max_level(config.min_level);
    Ok(())
}

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub min_level: LevelFilter,
    pub show_colors: bool,
    pub show_module: bool,
    pub include_timestamp: bool,
    pub timestamp_format: String,
    pub output_json: bool,
    pub log_to_file: bool,
    pub log_file_path: String,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            min_level: LevelFilter::Info,
            show_colors: true,
            show_module: true,
            include_timestamp: true,
            timestamp_format: "%Y-%m-%d %H:%M:%S%.3f".to_string(),
            output_json: false,
            log_to_file: false,
            log_file_path: "photogen.log".to_string(),
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

    pub fn with_file_output(mut self, path: &str) -> Self {
        self.log_to_file = true;
        self.log_file_path = path.to_string();
        self
    }

    pub fn production() -> Self {
        Self {
            min_level: LevelFilter::Info,
            show_colors: false,
            output_json: true,
            log_to_file: true,
            ..Default::default()
        }
    }

    pub fn development() -> Self {
        Self {
            min_level: LevelFilter::Debug,
            show_colors: true,
            output_json: false,
            ..Default::default()
        }
    }
}

pub struct ConsoleLogger {
    config: Mutex<LoggerConfig>,
    log_file: Mutex<Option<File>>,
}

impl ConsoleLogger {
    fn new() -> Self {
        Self {
            config: Mutex::new(LoggerConfig::default()),
            log_file: Mutex::new(None),
        }
    }

    fn update_config(&self, new_config: LoggerConfig) {
        if new_config.log_to_file {
            if let Ok(file) = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&new_config.log_file_path)
            {
                let mut log_file = self.log_file.lock().unwrap();
                *log_file = Some(file);
            }
        }

        let mut config = self.config.lock().unwrap();
        *config = new_config;
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

    fn format_line(&self, record: &Record, config: &LoggerConfig) -> String {
        let mut output = String::new();

        if config.include_timestamp {
            let timestamp = Utc::now().format(&config.timestamp_format).to_string();
            if config.show_colors {
                output.push_str(&format!("{} ", timestamp.bright_black()));
            } else {
                output.push_str(&format!("{} ", timestamp));
            }
        }

        let level = record.level().to_string();
        if config.show_colors {
            output.push_str(&format!(
                "[{}] ",
                level.color(Self::level_color(record.level())).bold()
            ));
        } else {
            output.push_str(&format!("[{}] ", level));
        }

        if config.show_module {
            let module = record.module_path().unwrap_or("unknown");
            if config.show_colors {
                output.push_str(&format!("{}::", module.bright_blue()));
            } else {
                output.push_str(&format!("{}::", module));
            }
        }

        output.push_str(&record.args().to_string());
        output
    }

    fn format_json(&self, record: &Record) -> String {
        serde_json::json!({
            "timestamp": Utc::now().to_rfc3339(),
            "level": record.level().to_string(),
            "module": record.module_path().unwrap_or("unknown"),
            "message": record.args().to_string(),
        })
        .to_string()
    }

    fn write_to_file(&self, line: &str) {
        if let Ok(mut log_file_guard) = self.log_file.lock() {
            if let Some(ref mut file) = *log_file_guard {
                let _ = file.write_all(line.as_bytes());
                let _ = file.write_all(b"\n");
            }
        }
    }
}

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        if let Ok(config) = self.config.lock() {
            metadata.level() <= config.min_level
        } else {
            true
        }
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        if let Ok(config) = self.config.lock() {
            let line = if config.output_json {
                self.format_json(record)
            } else {
                self.format_line(record, &config)
            };

            println!("{}", line);

            if config.log_to_file {
                self.write_to_file(&line);
            }
        }
    }

    fn flush(&self) {
        let _ = io::stdout().flush();
        if let Ok(mut log_file_guard) = self.log_file.lock() {
            if let Some(ref mut file) = *log_file_guard {
                let _ = file.flush();
            }
        }
    }
}
