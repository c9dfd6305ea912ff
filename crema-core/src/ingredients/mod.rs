//! Ingredient accounting
//!
//! Water, beans and milk reservoirs, the amounts each order needs, and the
//! checked consumption path.

pub mod levels;
pub mod recipe;
pub mod store;

pub use levels::{IngredientLevels, MAX_LEVEL};
pub use recipe::Recipe;
pub use store::{IngredientStore, Shortfall};
