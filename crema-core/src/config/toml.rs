//! Simple TOML parser for machine configuration
//!
//! This is a minimal TOML parser that handles only the subset needed for
//! `machine.toml`. It does NOT support the full TOML grammar.
//!
//! Supported features:
//! - Key = value pairs (string, integer, boolean)
//! - [section] headers
//! - Comments (# ...)

use super::types::{ConfigError, ConsumptionPolicy, MachineConfig};
use crema_protocol::Phase;

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Unknown section header
    InvalidSection,
    /// Key not valid in its section
    UnknownKey,
    /// Invalid value type
    InvalidValue,
    /// Values parsed but do not make a usable machine
    Invalid(ConfigError),
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Phases,
    Doses,
    Behaviour,
}

/// Parse TOML configuration into MachineConfig
///
/// Keys that are absent keep their defaults.
pub fn parse_config(input: &str) -> Result<MachineConfig, ParseError> {
    let mut config = MachineConfig::new();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            section = parse_section_header(&line[1..line.len() - 1])?;
            continue;
        }

        if let Some((key, value)) = parse_key_value(line) {
            apply_value(section, key, value, &mut config)?;
        }
    }

    config.validate().map_err(ParseError::Invalid)?;
    Ok(config)
}

fn parse_section_header(header: &str) -> Result<Section, ParseError> {
    match header.trim() {
        "phases" => Ok(Section::Phases),
        "doses" => Ok(Section::Doses),
        "behaviour" => Ok(Section::Behaviour),
        _ => Err(ParseError::InvalidSection),
    }
}

/// Split `key = value`, dropping any trailing comment
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = line[eq_pos + 1..].trim();

    // Remove inline comments
    let value = if let Some(hash_pos) = value.find('#') {
        // Make sure # is not inside a string
        let quote_count = value[..hash_pos].matches('"').count();
        if quote_count % 2 == 0 {
            value[..hash_pos].trim()
        } else {
            value
        }
    } else {
        value
    };

    if key.is_empty() || value.is_empty() {
        return None;
    }
    Some((key, value))
}

fn parse_string(value: &str) -> &str {
    if value.starts_with('"') && value.ends_with('"') && value.len() >= 2 {
        &value[1..value.len() - 1]
    } else {
        // Allow unquoted strings for simple values
        value
    }
}

/// Parse an integer value, allowing `_` digit separators
fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ParseError> {
    let mut digits: heapless::String<20> = heapless::String::new();
    for c in value.chars().filter(|c| *c != '_') {
        digits.push(c).map_err(|_| ParseError::InvalidValue)?;
    }
    digits.parse().map_err(|_| ParseError::InvalidValue)
}

fn parse_bool(value: &str) -> Result<bool, ParseError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ParseError::InvalidValue),
    }
}

fn parse_consumption(value: &str) -> Result<ConsumptionPolicy, ParseError> {
    match parse_string(value) {
        "gated" => Ok(ConsumptionPolicy::Gated),
        "lenient" => Ok(ConsumptionPolicy::Lenient),
        _ => Err(ParseError::InvalidValue),
    }
}

fn phase_for_key(key: &str) -> Option<Phase> {
    match key {
        "purging_ms" => Some(Phase::Purging),
        "heating_ms" => Some(Phase::Heating),
        "grinding_ms" => Some(Phase::Grinding),
        "brewing_ms" => Some(Phase::Brewing),
        "dispensing_ms" => Some(Phase::Dispensing),
        _ => None,
    }
}

fn apply_value(
    section: Section,
    key: &str,
    value: &str,
    config: &mut MachineConfig,
) -> Result<(), ParseError> {
    match section {
        Section::Phases => {
            let phase = phase_for_key(key).ok_or(ParseError::UnknownKey)?;
            config.phases.set_duration_ms(phase, parse_int(value)?);
        }
        Section::Doses => match key {
            "dose_units" => config.dose_units = parse_int(value)?,
            "carafe_multiplier" => config.carafe_multiplier = parse_int(value)?,
            _ => return Err(ParseError::UnknownKey),
        },
        Section::Behaviour => match key {
            "consumption" => config.consumption = parse_consumption(value)?,
            "cancel_on_power_off" => config.cancel_on_power_off = parse_bool(value)?,
            _ => return Err(ParseError::UnknownKey),
        },
        Section::Root => return Err(ParseError::UnknownKey),
    }
    Ok(())
}
