pub mod drink;

pub use drink::{Drink, Ingredient, Recipe, RecipeInput};
