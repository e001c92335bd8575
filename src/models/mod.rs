//! Data model for the dispatch engine: orders, carts, users, restaurants.
//!
//! These are the records the core reads from and writes to the storage
//! collaborator. Catalog and credential models are out of scope and not
//! represented here.

pub mod cart;
pub mod order;
pub mod restaurant;
pub mod user;

pub use cart::{Cart, CartItem};
pub use order::{Order, OrderItem, PaymentStatus, Rating};
pub use restaurant::Restaurant;
pub use user::{Actor, User, UserRole};
