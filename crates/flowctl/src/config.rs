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

//! Provides a configuration for `FlowControlRouter` instances.

use std::path::PathBuf;

use ahash::AHashSet;
use flowgate_core::{
    correctness::{FAILED, check_ordered_when_set, check_positive_u64, check_predicate_true},
    datetime::SECONDS_IN_HOUR,
};
use flowgate_model::identifiers::MarketId;
use serde::{Deserialize, Serialize};

/// The default rate-limit accounting window: one second plus a 500ms margin for clock and
/// scheduling jitter.
pub const DEFAULT_WINDOW_MS: u64 = 1_500;

/// The default trading-day offset from UTC (exchange local time, UTC+8).
pub const DEFAULT_TRADING_DAY_UTC_OFFSET_SECS: i32 = 8 * SECONDS_IN_HOUR;

/// The default node name used in operator warnings.
pub const DEFAULT_NODE_NAME: &str = "flowgate";

/// Flow-control limits for a single market.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketFlowConfig {
    /// The market the limits apply to.
    pub market: MarketId,
    /// If the market is flow controlled; disabled markets route through the pass-through queue.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// The maximum sub-commands released per window (0 = unlimited).
    #[serde(default)]
    pub tps_limit: u32,
    /// The daily count at which operators are warned (0 = never).
    #[serde(default)]
    pub daily_warning_threshold: u64,
    /// The daily count which may not be exceeded (0 = unlimited).
    #[serde(default)]
    pub daily_hard_limit: u64,
    /// The timeout for non-cancel traffic in milliseconds (0 = never).
    #[serde(default)]
    pub request_timeout_ms: u64,
}

impl MarketFlowConfig {
    /// Creates a new enabled [`MarketFlowConfig`] instance with only a rate limit set.
    #[must_use]
    pub const fn new(market: MarketId, tps_limit: u32) -> Self {
        Self {
            market,
            enabled: true,
            tps_limit,
            daily_warning_threshold: 0,
            daily_hard_limit: 0,
            request_timeout_ms: 0,
        }
    }

    #[must_use]
    pub const fn with_daily_limits(mut self, warning_threshold: u64, hard_limit: u64) -> Self {
        self.daily_warning_threshold = warning_threshold;
        self.daily_hard_limit = hard_limit;
        self
    }

    #[must_use]
    pub const fn with_request_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.request_timeout_ms = timeout_ms;
        self
    }

    #[must_use]
    pub const fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Checks the limits are ordered `tps_limit < daily_warning_threshold < daily_hard_limit`
    /// wherever both sides of a pair are set.
    ///
    /// # Errors
    ///
    /// Returns an error if any set pair is out of order.
    pub fn validate(&self) -> anyhow::Result<()> {
        let tps_limit = u64::from(self.tps_limit);
        check_ordered_when_set(
            tps_limit,
            self.daily_warning_threshold,
            "tps_limit",
            "daily_warning_threshold",
        )
        .and_then(|()| {
            check_ordered_when_set(
                self.daily_warning_threshold,
                self.daily_hard_limit,
                "daily_warning_threshold",
                "daily_hard_limit",
            )
        })
        .and_then(|()| {
            check_ordered_when_set(
                tps_limit,
                self.daily_hard_limit,
                "tps_limit",
                "daily_hard_limit",
            )
        })
        .map_err(|e| e.context(format!("Invalid limits for market {}", self.market)))
    }
}

/// Configuration for `FlowControlRouter` instances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowControlConfig {
    /// The rate-limit accounting window in milliseconds.
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,
    /// The sleep between unsuccessful polls in `pop` (0 = spin).
    #[serde(default)]
    pub idle_sleep_us: u64,
    /// The path of the daily counter file; counters are kept in memory when unset.
    #[serde(default)]
    pub state_path: Option<PathBuf>,
    /// The offset from UTC at which the trading day rolls over.
    #[serde(default = "default_trading_day_utc_offset_secs")]
    pub trading_day_utc_offset_secs: i32,
    /// The node name used in operator warnings.
    #[serde(default = "default_node_name")]
    pub node_name: String,
    /// The flow-controlled markets, in polling order.
    #[serde(default, rename = "market")]
    pub markets: Vec<MarketFlowConfig>,
}

const fn default_true() -> bool {
    true
}

const fn default_window_ms() -> u64 {
    DEFAULT_WINDOW_MS
}

const fn default_trading_day_utc_offset_secs() -> i32 {
    DEFAULT_TRADING_DAY_UTC_OFFSET_SECS
}

fn default_node_name() -> String {
    DEFAULT_NODE_NAME.to_string()
}

impl Default for FlowControlConfig {
    /// Creates a new default [`FlowControlConfig`] instance with no markets.
    fn default() -> Self {
        Self {
            window_ms: DEFAULT_WINDOW_MS,
            idle_sleep_us: 0,
            state_path: None,
            trading_day_utc_offset_secs: DEFAULT_TRADING_DAY_UTC_OFFSET_SECS,
            node_name: default_node_name(),
            markets: Vec::new(),
        }
    }
}

impl FlowControlConfig {
    /// Creates a new [`FlowControlConfig`] instance for `markets` with default settings.
    #[must_use]
    pub fn new(markets: Vec<MarketFlowConfig>) -> Self {
        Self {
            markets,
            ..Default::default()
        }
    }

    /// Parses a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML for this configuration, or fails
    /// [`Self::validate`].
    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or its contents are invalid.
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read config file {}: {e}", path.display()))?;
        Self::from_toml_str(&contents)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `window_ms` is zero.
    /// - A market is configured more than once.
    /// - Any market's limits are out of order.
    pub fn validate(&self) -> anyhow::Result<()> {
        check_positive_u64(self.window_ms, "window_ms")?;

        let mut seen = AHashSet::with_capacity(self.markets.len());
        for market in &self.markets {
            check_predicate_true(
                seen.insert(market.market),
                &format!("{FAILED}: market {} configured more than once", market.market),
            )?;
            market.validate()?;
        }
        Ok(())
    }

    /// Returns the configuration for `market`, if configured.
    #[must_use]
    pub fn market(&self, market: &MarketId) -> Option<&MarketFlowConfig> {
        self.markets.iter().find(|config| config.market == *market)
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use std::io::Write;

    use rstest::rstest;

    use super::*;

    const CONFIG_TOML: &str = r#"
window_ms = 1000
state_path = "/var/lib/flowgate/counters.bin"
node_name = "gw-01"

[[market]]
market = "SH"
tps_limit = 10
daily_warning_threshold = 1000
daily_hard_limit = 2000
request_timeout_ms = 500

[[market]]
market = "SZ"
tps_limit = 5

[[market]]
market = "BJ"
enabled = false
"#;

    #[rstest]
    fn test_default() {
        let config = FlowControlConfig::default();
        assert_eq!(config.window_ms, 1_500);
        assert_eq!(config.idle_sleep_us, 0);
        assert_eq!(config.trading_day_utc_offset_secs, 28_800);
        assert_eq!(config.node_name, "flowgate");
        assert!(config.state_path.is_none());
        assert!(config.markets.is_empty());
    }

    #[rstest]
    fn test_from_toml_str() {
        let config = FlowControlConfig::from_toml_str(CONFIG_TOML).unwrap();
        assert_eq!(config.window_ms, 1_000);
        assert_eq!(config.node_name, "gw-01");
        assert_eq!(
            config.state_path,
            Some(PathBuf::from("/var/lib/flowgate/counters.bin"))
        );
        assert_eq!(config.trading_day_utc_offset_secs, 28_800);

        let markets: Vec<&str> = config.markets.iter().map(|m| m.market.as_str()).collect();
        assert_eq!(markets, vec!["SH", "SZ", "BJ"]);

        let sh = config.market(&MarketId::from("SH")).unwrap();
        assert_eq!(
            *sh,
            MarketFlowConfig::new(MarketId::from("SH"), 10)
                .with_daily_limits(1_000, 2_000)
                .with_request_timeout_ms(500)
        );
        assert!(config.market(&MarketId::from("SZ")).unwrap().enabled);
        assert!(!config.market(&MarketId::from("BJ")).unwrap().enabled);
        assert!(config.market(&MarketId::from("HK")).is_none());
    }

    #[rstest]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CONFIG_TOML.as_bytes()).unwrap();
        let config = FlowControlConfig::from_file(file.path()).unwrap();
        assert_eq!(config.markets.len(), 3);
    }

    #[rstest]
    fn test_from_file_missing() {
        assert!(FlowControlConfig::from_file("/nonexistent/flowgate.toml").is_err());
    }

    #[rstest]
    #[case("[[market]]\nmarket = \"TOOLONGMKT\"\n")]
    #[case("[[market]]\ntps_limit = 10\n")]
    #[case("window_ms = 0\n")]
    #[case("[[market]]\nmarket = \"SH\"\n\n[[market]]\nmarket = \"SH\"\n")]
    fn test_from_toml_str_invalid(#[case] toml: &str) {
        assert!(FlowControlConfig::from_toml_str(toml).is_err());
    }

    #[rstest]
    #[case(10, 1_000, 2_000, true)]
    #[case(10, 0, 0, true)]
    #[case(0, 1_000, 0, true)]
    #[case(10, 0, 2_000, true)]
    #[case(10, 10, 0, false)]
    #[case(10, 2_000, 1_000, false)]
    #[case(100, 0, 50, false)]
    fn test_market_limits_ordering(
        #[case] tps_limit: u32,
        #[case] warning: u64,
        #[case] hard: u64,
        #[case] is_valid: bool,
    ) {
        let config =
            MarketFlowConfig::new(MarketId::from("SH"), tps_limit).with_daily_limits(warning, hard);
        assert_eq!(config.validate().is_ok(), is_valid);
    }
}
