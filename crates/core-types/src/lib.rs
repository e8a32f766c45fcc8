pub mod enums;
pub mod error;
pub mod filter;
pub mod records;

// Re-export the core types to provide a clean public API.
pub use enums::{DeliverySpeed, OrderStatus};
pub use error::CoreError;
pub use filter::SalesFilter;
pub use records::{Customer, Order, OrderItem, Payment, Product, Review, SalesRecord};
