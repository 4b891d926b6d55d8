pub mod env;
pub mod info;
pub mod send_analytics;
pub mod snapshot;
pub mod timeout;
pub mod version;
