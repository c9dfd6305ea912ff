//! Ingredient requirements per order

use crema_protocol::{Beverage, Ingredient, ServingSize};

use crate::config::MachineConfig;

/// Units of each ingredient one order consumes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Recipe {
    pub water: u8,
    pub beans: u8,
    pub milk: u8,
}

impl Recipe {
    /// Water always; beans for coffee and latte; milk for latte only
    pub fn for_order(beverage: Beverage, serving: ServingSize, config: &MachineConfig) -> Self {
        let dose = config.dose(serving);
        Self {
            water: dose,
            beans: if beverage.uses_beans() { dose } else { 0 },
            milk: if beverage.uses_milk() { dose } else { 0 },
        }
    }

    pub fn amount(&self, ingredient: Ingredient) -> u8 {
        match ingredient {
            Ingredient::Water => self.water,
            Ingredient::Beans => self.beans,
            Ingredient::Milk => self.milk,
        }
    }

    /// Sum of all units, which is what fills the brew chamber
    pub fn total(&self) -> u16 {
        self.water as u16 + self.beans as u16 + self.milk as u16
    }
}
