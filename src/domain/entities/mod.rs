pub mod chain;
pub mod session_state;
pub mod signal;
pub mod strike_state;
