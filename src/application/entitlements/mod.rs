//! Entitlement resolution

pub mod resolver;

pub use resolver::EntitlementResolver;
