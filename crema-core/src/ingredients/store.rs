//! Ingredient store
//!
//! Owns the reservoir levels. Every change goes through `consume`, `refill`
//! or `set_level`, so no level ever leaves `0..=MAX_LEVEL`.

use crema_protocol::Ingredient;

use super::levels::{IngredientLevels, MAX_LEVEL};
use super::recipe::Recipe;

/// Not enough of an ingredient for the requested amount
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Shortfall {
    pub ingredient: Ingredient,
    pub required: u8,
    pub available: u8,
}

#[derive(Debug, Clone, Default)]
pub struct IngredientStore {
    levels: IngredientLevels,
}

impl IngredientStore {
    /// Store with every reservoir full
    pub const fn new() -> Self {
        Self::with_levels(IngredientLevels::FULL)
    }

    pub const fn with_levels(levels: IngredientLevels) -> Self {
        Self { levels }
    }

    pub fn levels(&self) -> IngredientLevels {
        self.levels
    }

    pub fn level(&self, ingredient: Ingredient) -> u8 {
        self.levels.get(ingredient)
    }

    /// First ingredient (water, beans, milk) the recipe cannot be served from
    pub fn check(&self, recipe: &Recipe) -> Result<(), Shortfall> {
        for ingredient in Ingredient::ALL {
            let required = recipe.amount(ingredient);
            let available = self.level(ingredient);
            if available < required {
                return Err(Shortfall {
                    ingredient,
                    required,
                    available,
                });
            }
        }
        Ok(())
    }

    pub fn check_sufficient(&self, recipe: &Recipe) -> bool {
        self.check(recipe).is_ok()
    }

    /// Take `amount` units, returning the remaining level.
    ///
    /// Leaves the level untouched when there is not enough.
    pub fn consume(&mut self, ingredient: Ingredient, amount: u8) -> Result<u8, Shortfall> {
        let slot = self.levels.slot_mut(ingredient);
        match slot.checked_sub(amount) {
            Some(remaining) => {
                *slot = remaining;
                Ok(remaining)
            }
            None => Err(Shortfall {
                ingredient,
                required: amount,
                available: *slot,
            }),
        }
    }

    pub fn refill(&mut self) {
        self.levels = IngredientLevels::FULL;
    }

    /// Set a level from the panel slider, clamped to capacity
    pub fn set_level(&mut self, ingredient: Ingredient, level: u8) -> u8 {
        let clamped = level.min(MAX_LEVEL);
        *self.levels.slot_mut(ingredient) = clamped;
        clamped
    }
}
