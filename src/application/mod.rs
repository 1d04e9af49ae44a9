pub mod classifier;
pub mod messages;
pub mod scan;
pub mod status;
