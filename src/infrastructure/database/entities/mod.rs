//! Database entities module

pub mod customer;
pub mod customer_product;

pub use customer::Entity as Customer;
pub use customer_product::Entity as CustomerProduct;
