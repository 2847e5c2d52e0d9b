//! Usage quota tracking

pub mod manager;

pub use manager::QuotaManager;
