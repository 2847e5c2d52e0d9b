pub mod auth;
pub mod fees;
pub mod health;
pub mod metrics;
pub mod request_id;
pub mod usage;
