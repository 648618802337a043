mod balance;
mod entity;
pub mod error;
mod repo;

pub use balance::*;
pub use entity::*;
pub use repo::*;
