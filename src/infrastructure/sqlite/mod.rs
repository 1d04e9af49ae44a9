pub mod migrations;
pub mod session_repo;
pub mod signal_repo;
