//! Phase plans

use heapless::Vec;

use crema_protocol::{Beverage, Ingredient, Phase, ServingSize};

use crate::config::MachineConfig;
use crate::ingredients::Recipe;
use crate::process::PhaseStep;

/// Most phases in any sequence (grind, brew, dispense)
pub const MAX_STEPS: usize = 3;

/// A phase together with what it takes from the store before it starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedStep {
    pub consumes: Vec<(Ingredient, u8), 2>,
    pub step: PhaseStep,
}

impl PlannedStep {
    fn new(step: PhaseStep, consumes: &[(Ingredient, u8)]) -> Self {
        let mut list = Vec::new();
        for &entry in consumes {
            // at most two ingredients go in at one boundary
            let _ = list.push(entry);
        }
        Self {
            consumes: list,
            step,
        }
    }
}

/// Ordered phases for one order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrewPlan {
    recipe: Recipe,
    cups: u8,
    steps: Vec<PlannedStep, MAX_STEPS>,
}

impl BrewPlan {
    /// Hot water: dispense only. Coffee and latte: grind the beans, brew
    /// with water (and milk), then dispense the whole volume.
    pub fn new(beverage: Beverage, serving: ServingSize, config: &MachineConfig) -> Self {
        let recipe = Recipe::for_order(beverage, serving, config);
        let timings = &config.phases;
        let mut steps = Vec::new();

        let step = |phase: Phase, chamber: u16, dispenser: u16| PhaseStep {
            phase,
            duration_ms: timings.duration_ms(phase),
            chamber,
            dispenser,
        };

        if beverage.uses_beans() {
            let total = recipe.total();
            let mut brew_inputs: Vec<(Ingredient, u8), 2> = Vec::new();
            let _ = brew_inputs.push((Ingredient::Water, recipe.water));
            if beverage.uses_milk() {
                let _ = brew_inputs.push((Ingredient::Milk, recipe.milk));
            }

            let _ = steps.push(PlannedStep::new(
                step(Phase::Grinding, recipe.beans as u16, 0),
                &[(Ingredient::Beans, recipe.beans)],
            ));
            let _ = steps.push(PlannedStep::new(step(Phase::Brewing, total, 0), &brew_inputs));
            let _ = steps.push(PlannedStep::new(step(Phase::Dispensing, 0, total), &[]));
        } else {
            let _ = steps.push(PlannedStep::new(
                step(Phase::Dispensing, 0, recipe.water as u16),
                &[(Ingredient::Water, recipe.water)],
            ));
        }

        Self {
            recipe,
            cups: config.multiplier(serving),
            steps,
        }
    }

    pub fn recipe(&self) -> &Recipe {
        &self.recipe
    }

    /// Cups added to the machine total when the plan completes
    pub fn cups(&self) -> u8 {
        self.cups
    }

    pub fn steps(&self) -> &[PlannedStep] {
        &self.steps
    }
}

/// Purge first when the last session did not shut down cleanly, then heat
pub fn power_on_steps(clean_shutdown: bool, config: &MachineConfig) -> Vec<PhaseStep, 2> {
    let mut steps = Vec::new();
    let phases: &[Phase] = if clean_shutdown {
        &[Phase::Heating]
    } else {
        &[Phase::Purging, Phase::Heating]
    };
    for &phase in phases {
        let _ = steps.push(PhaseStep {
            phase,
            duration_ms: config.phases.duration_ms(phase),
            chamber: 0,
            dispenser: 0,
        });
    }
    steps
}
