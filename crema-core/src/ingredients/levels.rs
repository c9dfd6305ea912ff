//! Reservoir levels

use crema_protocol::Ingredient;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Capacity of every reservoir, in ingredient units
pub const MAX_LEVEL: u8 = 100;

/// Current quantity in each reservoir, always within `0..=MAX_LEVEL`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IngredientLevels {
    pub water: u8,
    pub beans: u8,
    pub milk: u8,
}

impl IngredientLevels {
    pub const FULL: Self = Self {
        water: MAX_LEVEL,
        beans: MAX_LEVEL,
        milk: MAX_LEVEL,
    };

    pub const EMPTY: Self = Self {
        water: 0,
        beans: 0,
        milk: 0,
    };

    pub fn get(&self, ingredient: Ingredient) -> u8 {
        match ingredient {
            Ingredient::Water => self.water,
            Ingredient::Beans => self.beans,
            Ingredient::Milk => self.milk,
        }
    }

    pub(crate) fn slot_mut(&mut self, ingredient: Ingredient) -> &mut u8 {
        match ingredient {
            Ingredient::Water => &mut self.water,
            Ingredient::Beans => &mut self.beans,
            Ingredient::Milk => &mut self.milk,
        }
    }
}

impl Default for IngredientLevels {
    fn default() -> Self {
        Self::FULL
    }
}
