pub mod drink_repo;
pub mod error;
#[cfg(test)]
pub mod memory;

pub use drink_repo::{DrinkStore, PgDrinkStore};
