// -------------------------------------------------------------------------------------------------
//  Copyright (C) 2015-2025 Nautech Systems Pty Ltd. All rights reserved.
//  https://nautechsystems.io
//
//  Licensed under the GNU Lesser General Public License Version 3.0 (the "License");
//  You may not use this file except in compliance with the License.
//  You may obtain a copy of the License at https://www.gnu.org/licenses/lgpl-3.0.en.html
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.
// -------------------------------------------------------------------------------------------------

use std::{
    collections::HashMap,
    fmt::Display,
    sync::mpsc::{Receiver, SendError, Sender, channel},
    thread::JoinHandle,
};

use flowgate_core::{
    UnixNanos,
    datetime::{unix_nanos_now, unix_nanos_to_iso8601},
};
use log::{Level, LevelFilter, Log, STATIC_MAX_LEVEL, set_boxed_logger, set_max_level};
use serde::{Deserialize, Serialize};
use ustr::Ustr;

use crate::logging::{
    parse_level_filter_str,
    writer::{LogWriter, StderrWriter, StdoutWriter},
};

const LOGGING: &str = "logging";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerConfig {
    /// Maximum log level to write to stdout.
    pub stdout_level: LevelFilter,
    /// Per-component log levels, overriding `stdout_level` for that component.
    component_level: HashMap<Ustr, LevelFilter>,
    /// If logger is using ANSI color codes.
    pub is_colored: bool,
    /// If the configuration should be printed to stdout at initialization.
    pub print_config: bool,
}

impl Default for LoggerConfig {
    /// Creates a new default [`LoggerConfig`] instance.
    fn default() -> Self {
        Self {
            stdout_level: LevelFilter::Info,
            component_level: HashMap::new(),
            is_colored: false,
            print_config: false,
        }
    }
}

impl LoggerConfig {
    /// Creates a new [`LoggerConfig`] instance.
    #[must_use]
    pub const fn new(
        stdout_level: LevelFilter,
        component_level: HashMap<Ustr, LevelFilter>,
        is_colored: bool,
        print_config: bool,
    ) -> Self {
        Self {
            stdout_level,
            component_level,
            is_colored,
            print_config,
        }
    }

    /// Parses a spec string such as `"stdout=Info;AdmissionQueue=Debug;is_colored"`.
    ///
    /// Any key other than `stdout` names a component. A component name without a `[...]`
    /// qualifier applies to every qualified instance, so `AdmissionQueue` covers
    /// `AdmissionQueue[SH]`.
    ///
    /// # Errors
    ///
    /// Returns an error if a pair is malformed or a level is invalid.
    pub fn from_spec(spec: &str) -> anyhow::Result<Self> {
        let mut config = Self::default();
        for kv in spec.split(';') {
            let kv = kv.trim();
            if kv.is_empty() {
                continue;
            }
            let kv_lower = kv.to_lowercase();
            if kv_lower == "is_colored" {
                config.is_colored = true;
            } else if kv_lower == "print_config" {
                config.print_config = true;
            } else {
                let Some((k, v)) = kv.split_once('=') else {
                    anyhow::bail!("Invalid spec pair: {kv}");
                };
                let k = k.trim();
                let lvl = parse_level_filter_str(v)?;
                if k.eq_ignore_ascii_case("stdout") {
                    config.stdout_level = lvl;
                } else {
                    config.component_level.insert(Ustr::from(k), lvl);
                }
            }
        }
        Ok(config)
    }

    /// Returns the effective level for `component`.
    #[must_use]
    pub fn level_for(&self, component: &str) -> LevelFilter {
        if let Some(level) = self.component_level.get(&Ustr::from(component)) {
            return *level;
        }
        component
            .split_once('[')
            .and_then(|(base, _)| self.component_level.get(&Ustr::from(base)))
            .copied()
            .unwrap_or(self.stdout_level)
    }

    /// Returns the most verbose level any component may log at.
    #[must_use]
    pub fn max_level(&self) -> LevelFilter {
        self.component_level
            .values()
            .copied()
            .fold(self.stdout_level, std::cmp::max)
    }
}

/// A logger utilizing a MPSC channel under the hood.
///
/// The logger spawns a thread that listens for [`LogEvent`]s sent via an MPSC channel, so the
/// calling thread never blocks on terminal IO.
#[derive(Debug)]
pub struct Logger {
    /// Configuration for logging levels and behavior.
    pub config: LoggerConfig,
    max_level: LevelFilter,
    /// Transmitter for sending log events to the 'logging' thread.
    tx: Sender<LogEvent>,
}

/// Represents a type of log event.
#[derive(Debug)]
pub enum LogEvent {
    /// A log line event.
    Log(LogLine),
    /// A command to flush all logger buffers.
    Flush,
    /// A command to flush and stop the logging thread.
    Close,
}

/// Represents a log event which includes a message.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LogLine {
    /// The timestamp for the event.
    pub timestamp: UnixNanos,
    /// The log level for the event.
    pub level: Level,
    /// The component the log event originated from.
    pub component: Ustr,
    /// The log message content.
    pub message: String,
}

impl Display for LogLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.level, self.component, self.message)
    }
}

/// A wrapper around a log line that caches its formatted representations.
#[derive(Debug)]
pub struct LogLineWrapper {
    line: LogLine,
    cache: Option<String>,
    colored: Option<String>,
}

impl LogLineWrapper {
    /// Creates a new [`LogLineWrapper`] instance.
    #[must_use]
    pub const fn new(line: LogLine) -> Self {
        Self {
            line,
            cache: None,
            colored: None,
        }
    }

    /// Returns the plain log message string, caching the result.
    pub fn get_string(&mut self) -> &str {
        self.cache.get_or_insert_with(|| {
            format!(
                "{} [{}] {}: {}\n",
                unix_nanos_to_iso8601(self.line.timestamp),
                self.line.level,
                &self.line.component,
                &self.line.message,
            )
        })
    }

    /// Returns the colored log message string, caching the result.
    pub fn get_colored(&mut self) -> &str {
        self.colored.get_or_insert_with(|| {
            format!(
                "\x1b[1m{}\x1b[0m {}[{}] {}: {}\x1b[0m\n",
                unix_nanos_to_iso8601(self.line.timestamp),
                level_ansi(self.line.level),
                self.line.level,
                &self.line.component,
                &self.line.message,
            )
        })
    }
}

const fn level_ansi(level: Level) -> &'static str {
    match level {
        Level::Error => "\x1b[1;31m",
        Level::Warn => "\x1b[1;33m",
        Level::Info => "\x1b[0m",
        Level::Debug | Level::Trace => "\x1b[2m",
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() == Level::Error || metadata.level() <= self.max_level
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            let component = record.key_values().get("component".into()).map_or_else(
                || Ustr::from(record.metadata().target()),
                |v| Ustr::from(&v.to_string()),
            );

            let line = LogLine {
                timestamp: unix_nanos_now(),
                level: record.level(),
                component,
                message: format!("{}", record.args()),
            };
            if let Err(SendError(LogEvent::Log(line))) = self.tx.send(LogEvent::Log(line)) {
                eprintln!("Error sending log event (receiver closed): {line}");
            }
        }
    }

    fn flush(&self) {
        if let Err(e) = self.tx.send(LogEvent::Flush) {
            eprintln!("Error sending flush log event (receiver closed): {e}");
        }
    }
}

impl Logger {
    /// Installs the logger as the `log` implementation and spawns the logging thread.
    ///
    /// # Errors
    ///
    /// Returns an error if a `log` implementation is already installed or the logging thread
    /// cannot be spawned.
    pub fn init_with_config(config: LoggerConfig) -> anyhow::Result<LogGuard> {
        let (tx, rx) = channel::<LogEvent>();

        let max_level = config.max_level();
        let logger = Self {
            tx: tx.clone(),
            config: config.clone(),
            max_level,
        };

        let print_config = config.print_config;
        if print_config {
            println!("STATIC_MAX_LEVEL={STATIC_MAX_LEVEL}");
            println!("Logger initialized with {config:?}");
        }

        set_boxed_logger(Box::new(logger))
            .map_err(|e| anyhow::anyhow!("Cannot initialize logger because of error: {e}"))?;
        set_max_level(max_level);

        let handle = std::thread::Builder::new()
            .name(LOGGING.to_string())
            .spawn(move || Self::handle_messages(&config, &rx))?;

        if print_config {
            println!("Logger set as `log` implementation with max level {max_level}");
        }

        Ok(LogGuard::new(Some(tx), Some(handle)))
    }

    fn handle_messages(config: &LoggerConfig, rx: &Receiver<LogEvent>) {
        let mut stdout_writer = StdoutWriter::new(config.is_colored);
        let mut stderr_writer = StderrWriter::new(config.is_colored);

        // Continue to receive and handle log events until closed or the channel is hung up
        while let Ok(event) = rx.recv() {
            match event {
                LogEvent::Flush => {
                    stdout_writer.flush();
                    stderr_writer.flush();
                }
                LogEvent::Close => break,
                LogEvent::Log(line) => {
                    let level = config.level_for(&line.component);
                    let mut wrapper = LogLineWrapper::new(line);

                    if stderr_writer.enabled(&wrapper.line, level) {
                        if stderr_writer.is_colored {
                            stderr_writer.write(wrapper.get_colored());
                        } else {
                            stderr_writer.write(wrapper.get_string());
                        }
                    }

                    if stdout_writer.enabled(&wrapper.line, level) {
                        if stdout_writer.is_colored {
                            stdout_writer.write(wrapper.get_colored());
                        } else {
                            stdout_writer.write(wrapper.get_string());
                        }
                    }
                }
            }
        }

        stdout_writer.flush();
        stderr_writer.flush();
    }
}

/// Keeps the logging thread alive; dropping it flushes and joins the thread.
#[derive(Debug)]
pub struct LogGuard {
    tx: Option<Sender<LogEvent>>,
    handle: Option<JoinHandle<()>>,
}

impl LogGuard {
    /// Creates a new [`LogGuard`] instance.
    #[must_use]
    pub const fn new(tx: Option<Sender<LogEvent>>, handle: Option<JoinHandle<()>>) -> Self {
        Self { tx, handle }
    }
}

impl Default for LogGuard {
    /// Creates a new default [`LogGuard`] instance.
    fn default() -> Self {
        Self::new(None, None)
    }
}

impl Drop for LogGuard {
    fn drop(&mut self) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(LogEvent::Close);
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                eprintln!("Error joining logging thread");
            }
        }
    }
}
