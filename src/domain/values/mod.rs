pub mod conviction;
pub mod option_side;
pub mod rate_limit;
pub mod scan_config;
pub mod signal_state;
pub mod strike_key;
pub mod thresholds;
