pub mod feeds;
pub mod notifiers;
pub mod sqlite;
