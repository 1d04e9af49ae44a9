pub mod market_data;
pub mod notifier;
pub mod session_repository;
pub mod signal_repository;
