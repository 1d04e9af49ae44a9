use clap::{Args, Parser, Subcommand};

use crate::domain::values::scan_config::ScanConfig;
use crate::infrastructure::feeds::fyers::NIFTY_INDEX_SYMBOL;
use crate::Credentials;

#[derive(Parser)]
#[command(name = "oiwatch", about = "Options OI buildup monitor with conviction scoring")]
pub struct Cli {
    /// SQLite database holding the session and signal log
    #[arg(long, env = "OIWATCH_DB", default_value = "./oiwatch.db", global = true)]
    pub db: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one scan against the live option chain
    Scan {
        #[command(flatten)]
        config: ConfigArgs,
        #[command(flatten)]
        credentials: CredentialArgs,
    },
    /// Show today's session state
    Status,
    /// List logged signals
    Signals {
        #[arg(long, default_value = "20")]
        limit: usize,
        /// Trading date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
        /// Only signals that were actually sent
        #[arg(long)]
        sent_only: bool,
    },
    /// Send a test notification
    TestAlert {
        #[arg(long, default_value = "✅ Test alert from oiwatch - everything works!")]
        message: String,
        #[command(flatten)]
        credentials: CredentialArgs,
    },
    /// Discard the stored session (baselines, counters)
    Reset,
}

#[derive(Args, Debug, Clone)]
pub struct CredentialArgs {
    #[arg(long, env = "FYERS_CLIENT_ID", default_value = "", hide_env_values = true)]
    pub fyers_client_id: String,
    #[arg(long, env = "FYERS_ACCESS_TOKEN", default_value = "", hide_env_values = true)]
    pub fyers_access_token: String,
    #[arg(long, env = "OIWATCH_SYMBOL", default_value = NIFTY_INDEX_SYMBOL)]
    pub symbol: String,
    #[arg(long, env = "TELEGRAM_TOKEN", hide_env_values = true)]
    pub telegram_token: Option<String>,
    #[arg(long, env = "TELEGRAM_CHAT_ID")]
    pub telegram_chat_id: Option<String>,
}

impl From<CredentialArgs> for Credentials {
    fn from(a: CredentialArgs) -> Self {
        Credentials {
            fyers_client_id: a.fyers_client_id,
            fyers_access_token: a.fyers_access_token,
            fyers_symbol: a.symbol,
            telegram_token: a.telegram_token,
            telegram_chat_id: a.telegram_chat_id,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Label used in notifications
    #[arg(long, env = "OIWATCH_INSTRUMENT", default_value = "NIFTY")]
    pub instrument: String,
    /// OI growth over baseline (%) for WATCH
    #[arg(long, env = "OIWATCH_WATCH_OI_PCT", default_value = "50")]
    pub watch_oi_pct: f64,
    /// OI growth over baseline (%) for execution candidates
    #[arg(long, env = "OIWATCH_EXEC_OI_PCT", default_value = "100")]
    pub exec_oi_pct: f64,
    /// Baseline OI floor; thinner strikes are ignored
    #[arg(long, env = "OIWATCH_MIN_BASE_OI", default_value = "100000")]
    pub min_base_oi: i64,
    #[arg(long, env = "OIWATCH_STRIKE_STEP", default_value = "50")]
    pub strike_step: i64,
    /// Max distance from ATM (points) for WATCH notifications
    #[arg(long, env = "OIWATCH_STRIKE_RANGE", default_value = "150")]
    pub strike_range_limit: i64,
    #[arg(long, env = "OIWATCH_BOTH_SIDES_AVOID_PCT", default_value = "50")]
    pub both_sides_avoid_pct: f64,
    #[arg(long, env = "OIWATCH_MIN_DECLINE_PCT", default_value = "-1.5", allow_hyphen_values = true)]
    pub min_decline_pct: f64,
    #[arg(long, env = "OIWATCH_MIN_CUM_DECLINE_PCT", default_value = "-10", allow_hyphen_values = true)]
    pub min_cumulative_decline_pct: f64,
    /// Minimum conviction score two or more days before expiry
    #[arg(long, env = "OIWATCH_MIN_SCORE", default_value = "70")]
    pub base_min_score: i32,
    #[arg(long, env = "OIWATCH_PREMIUM_TOLERANCE_PCT", default_value = "8")]
    pub premium_tolerance_pct: f64,
    #[arg(long, env = "OIWATCH_MAX_SIGNALS", default_value = "3")]
    pub max_signals_per_day: u32,
    #[arg(long, env = "OIWATCH_MAX_WATCH", default_value = "5")]
    pub max_watch_per_day: u32,
    #[arg(long, env = "OIWATCH_IMPROVEMENT", default_value = "10")]
    pub improvement_threshold: i32,
    #[arg(long, env = "OIWATCH_STRIKE_COUNT", default_value = "20")]
    pub strike_count: u32,
    /// Skip scans outside 09:15-15:30 exchange time
    #[arg(long, env = "OIWATCH_CHECK_MARKET_HOURS")]
    pub check_market_hours: bool,
}

impl From<ConfigArgs> for ScanConfig {
    fn from(a: ConfigArgs) -> Self {
        ScanConfig {
            instrument: a.instrument,
            watch_oi_pct: a.watch_oi_pct,
            exec_oi_pct: a.exec_oi_pct,
            min_base_oi: a.min_base_oi,
            strike_step: a.strike_step,
            strike_range_limit: a.strike_range_limit,
            both_sides_avoid_pct: a.both_sides_avoid_pct,
            min_decline_pct: a.min_decline_pct,
            min_cumulative_decline_pct: a.min_cumulative_decline_pct,
            base_min_score: a.base_min_score,
            base_premium_tolerance_pct: a.premium_tolerance_pct,
            max_signals_per_day: a.max_signals_per_day,
            max_watch_per_day: a.max_watch_per_day,
            improvement_threshold: a.improvement_threshold,
            chain_strike_count: a.strike_count,
            check_market_hours: a.check_market_hours,
            ..ScanConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_defaults_match_config_defaults() {
        let cli = Cli::try_parse_from(["oiwatch", "scan"]).unwrap();
        let Commands::Scan { config, .. } = cli.command else {
            panic!("expected scan command");
        };
        let cfg: ScanConfig = config.into();
        let def = ScanConfig::default();
        assert_eq!(cfg.watch_oi_pct, def.watch_oi_pct);
        assert_eq!(cfg.min_decline_pct, def.min_decline_pct);
        assert_eq!(cfg.max_signals_per_day, def.max_signals_per_day);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_negative_decline_flag() {
        let cli = Cli::try_parse_from(["oiwatch", "scan", "--min-decline-pct", "-3"]).unwrap();
        let Commands::Scan { config, .. } = cli.command else {
            panic!("expected scan command");
        };
        assert_eq!(config.min_decline_pct, -3.0);
    }
}
