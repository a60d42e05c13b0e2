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

//! Logging for flowgate systems.
//!
//! Library code logs through the `log` facade, tagging records with a `component` key value.
//! Binaries install the channel-backed [`Logger`](logger::Logger) with [`init_logging`], or a
//! `tracing` subscriber with [`init_tracing`].

pub mod logger;
pub mod writer;

use std::{
    env,
    str::FromStr,
    sync::atomic::{AtomicBool, Ordering},
};

use log::LevelFilter;
use tracing_subscriber::EnvFilter;

use self::logger::{LogGuard, Logger, LoggerConfig};

/// The environment variable holding a logger spec string.
pub const FLOWGATE_LOG: &str = "FLOWGATE_LOG";

static LOGGING_INITIALIZED: AtomicBool = AtomicBool::new(false);
static LOGGING_COLORED: AtomicBool = AtomicBool::new(false);

/// Returns whether the core logger is enabled.
pub fn logging_is_initialized() -> bool {
    LOGGING_INITIALIZED.load(Ordering::Relaxed)
}

/// Returns whether the core logger is using ANSI colors.
pub fn logging_is_colored() -> bool {
    LOGGING_COLORED.load(Ordering::Relaxed)
}

/// Initialize tracing.
///
/// Tracing can be configured to filter modules and write up to a specific level by passing
/// a configuration using the `RUST_LOG` environment variable.
///
/// # Errors
///
/// Returns an error if tracing subscriber fails to initialize.
pub fn init_tracing() -> anyhow::Result<()> {
    // Skip tracing initialization if `RUST_LOG` is not set
    if let Ok(v) = env::var("RUST_LOG") {
        let env_filter = EnvFilter::new(v.clone());

        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing subscriber: {e}"))?;

        println!("Initialized tracing logs with RUST_LOG={v}");
    }
    Ok(())
}

/// Initialize logging.
///
/// Should only be called once during an applications run, ideally at the beginning of the run.
/// The returned guard must be held for the lifetime of the application; dropping it flushes
/// and joins the logging thread.
///
/// # Errors
///
/// Returns an error if a `log` implementation is already installed or the logging thread
/// cannot be spawned.
pub fn init_logging(config: LoggerConfig) -> anyhow::Result<LogGuard> {
    let is_colored = config.is_colored;
    let guard = Logger::init_with_config(config)?;
    LOGGING_INITIALIZED.store(true, Ordering::Relaxed);
    LOGGING_COLORED.store(is_colored, Ordering::Relaxed);
    Ok(guard)
}

/// Initialize logging from the [`FLOWGATE_LOG`] environment variable, falling back to the
/// default configuration when it is unset.
///
/// # Errors
///
/// Returns an error if the variable holds an invalid spec or logging fails to initialize.
pub fn init_logging_from_env() -> anyhow::Result<LogGuard> {
    let config = match env::var(FLOWGATE_LOG) {
        Ok(spec) => LoggerConfig::from_spec(&spec)?,
        Err(_) => LoggerConfig::default(),
    };
    init_logging(config)
}

/// Parses a string into a [`LevelFilter`], accepting `WARNING` as an alias of `WARN`.
///
/// # Errors
///
/// Returns an error if the string is not a valid level.
pub fn parse_level_filter_str(s: &str) -> anyhow::Result<LevelFilter> {
    let mut log_level_str = s.trim().to_uppercase();
    if log_level_str == "WARNING" {
        log_level_str = "WARN".to_string();
    }
    LevelFilter::from_str(&log_level_str)
        .map_err(|_| anyhow::anyhow!("Invalid log level, was '{s}'"))
}
