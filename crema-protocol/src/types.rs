//! Machine vocabulary shared by the panel and the controller

/// Drinks the machine can make
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Beverage {
    /// Heated water straight to the dispenser
    HotWater,
    /// Ground beans brewed with water
    Coffee,
    /// Coffee brewed with milk
    Latte,
}

impl Beverage {
    pub const ALL: [Beverage; 3] = [Beverage::HotWater, Beverage::Coffee, Beverage::Latte];

    /// Whether the drink goes through the grinder and brew chamber
    pub fn uses_beans(self) -> bool {
        matches!(self, Beverage::Coffee | Beverage::Latte)
    }

    pub fn uses_milk(self) -> bool {
        self == Beverage::Latte
    }

    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(Beverage::HotWater),
            0x02 => Some(Beverage::Coffee),
            0x03 => Some(Beverage::Latte),
            _ => None,
        }
    }

    pub fn to_byte(self) -> u8 {
        match self {
            Beverage::HotWater => 0x01,
            Beverage::Coffee => 0x02,
            Beverage::Latte => 0x03,
        }
    }
}

/// Consumable reservoirs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Ingredient {
    Water,
    Beans,
    Milk,
}

impl Ingredient {
    pub const ALL: [Ingredient; 3] = [Ingredient::Water, Ingredient::Beans, Ingredient::Milk];

    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(Ingredient::Water),
            0x02 => Some(Ingredient::Beans),
            0x03 => Some(Ingredient::Milk),
            _ => None,
        }
    }

    pub fn to_byte(self) -> u8 {
        match self {
            Ingredient::Water => 0x01,
            Ingredient::Beans => 0x02,
            Ingredient::Milk => 0x03,
        }
    }
}

/// Timed machine phases, each with its own indicator lamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// Flushing the lines after an unclean shutdown
    Purging,
    /// Bringing the boiler up to temperature
    Heating,
    Grinding,
    Brewing,
    Dispensing,
}

impl Phase {
    pub const ALL: [Phase; 5] = [
        Phase::Purging,
        Phase::Heating,
        Phase::Grinding,
        Phase::Brewing,
        Phase::Dispensing,
    ];

    /// Indicator label
    pub fn name(self) -> &'static str {
        match self {
            Phase::Purging => "purging",
            Phase::Heating => "heating",
            Phase::Grinding => "grinding",
            Phase::Brewing => "brewing",
            Phase::Dispensing => "dispensing",
        }
    }

    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(Phase::Purging),
            0x02 => Some(Phase::Heating),
            0x03 => Some(Phase::Grinding),
            0x04 => Some(Phase::Brewing),
            0x05 => Some(Phase::Dispensing),
            _ => None,
        }
    }

    pub fn to_byte(self) -> u8 {
        match self {
            Phase::Purging => 0x01,
            Phase::Heating => 0x02,
            Phase::Grinding => 0x03,
            Phase::Brewing => 0x04,
            Phase::Dispensing => 0x05,
        }
    }
}

/// Serving size button pressed on the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ServingSize {
    #[default]
    Cup,
    Carafe,
}

impl ServingSize {
    pub fn from_carafe(is_carafe: bool) -> Self {
        if is_carafe {
            ServingSize::Carafe
        } else {
            ServingSize::Cup
        }
    }

    pub fn is_carafe(self) -> bool {
        self == ServingSize::Carafe
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_codes_are_distinct() {
        for (i, a) in Phase::ALL.iter().enumerate() {
            for b in &Phase::ALL[i + 1..] {
                assert_ne!(a.to_byte(), b.to_byte());
            }
        }
        assert!(Beverage::from_byte(0x00).is_none());
        assert!(Ingredient::from_byte(0xFF).is_none());
        assert!(Phase::from_byte(0x06).is_none());
    }

    #[test]
    fn test_codes_decode_back() {
        for beverage in Beverage::ALL {
            assert_eq!(Beverage::from_byte(beverage.to_byte()), Some(beverage));
        }
        for ingredient in Ingredient::ALL {
            assert_eq!(Ingredient::from_byte(ingredient.to_byte()), Some(ingredient));
        }
        for phase in Phase::ALL {
            assert_eq!(Phase::from_byte(phase.to_byte()), Some(phase));
        }
    }

    #[test]
    fn test_beverage_ingredients() {
        assert!(!Beverage::HotWater.uses_beans());
        assert!(Beverage::Coffee.uses_beans());
        assert!(!Beverage::Coffee.uses_milk());
        assert!(Beverage::Latte.uses_beans());
        assert!(Beverage::Latte.uses_milk());
    }

    #[test]
    fn test_serving_from_carafe_flag() {
        assert_eq!(ServingSize::from_carafe(false), ServingSize::Cup);
        assert_eq!(ServingSize::from_carafe(true), ServingSize::Carafe);
        assert!(ServingSize::Carafe.is_carafe());
    }
}
