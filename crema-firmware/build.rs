//! Build script for crema-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates machine.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

const PHASE_KEYS: [&str; 5] = [
    "purging_ms",
    "heating_ms",
    "grinding_ms",
    "brewing_ms",
    "dispensing_ms",
];

/// Reservoir capacity in ingredient units
const MAX_LEVEL: i64 = 100;

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());
    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    if env::var_os("CARGO_FEATURE_DEFMT").is_some() {
        println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
    }

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate machine.toml configuration at compile time
fn validate_config() {
    // Re-run if machine.toml changes
    println!("cargo:rerun-if-changed=machine.toml");

    let config_path = Path::new("machine.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: machine.toml not found!                                  ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds machine.toml as its configuration.          ║\n\
            ║  Please create one in the crema-firmware directory.              ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read machine.toml                              ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    // Parse and validate TOML syntax
    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in machine.toml                      ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                {}\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e.to_string()
                    .lines()
                    .map(|line| format!("║  {:<64}║", line))
                    .collect::<Vec<_>>()
                    .join("\n")
            );
        }
    };

    let mut errors = Vec::new();
    validate_sections(&config, &mut errors);
    validate_phases(&config, &mut errors);
    validate_doses(&config, &mut errors);
    validate_behaviour(&config, &mut errors);

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid machine configuration                            ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }
}

fn validate_sections(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(root) = config.as_table() else {
        return;
    };
    for (name, value) in root {
        if !matches!(name.as_str(), "phases" | "doses" | "behaviour") {
            errors.push(format!("unknown section [{}]", name));
        } else if !value.is_table() {
            errors.push(format!("[{}] must be a table", name));
        }
    }
}

fn integer(config: &toml::Value, section: &str, key: &str, errors: &mut Vec<String>) -> Option<i64> {
    let value = config.get(section)?.get(key)?;
    match value.as_integer() {
        Some(n) => Some(n),
        None => {
            errors.push(format!("[{}] {} must be an integer", section, key));
            None
        }
    }
}

fn validate_phases(config: &toml::Value, errors: &mut Vec<String>) {
    if let Some(table) = config.get("phases").and_then(|v| v.as_table()) {
        for key in table.keys() {
            if !PHASE_KEYS.contains(&key.as_str()) {
                errors.push(format!("[phases] unknown key '{}'", key));
            }
        }
    }

    for key in PHASE_KEYS {
        if let Some(ms) = integer(config, "phases", key, errors) {
            if ms <= 0 || ms > i64::from(u32::MAX) {
                errors.push(format!("[phases] {} must be 1-{}", key, u32::MAX));
            }
        }
    }
}

fn validate_doses(config: &toml::Value, errors: &mut Vec<String>) {
    let dose = integer(config, "doses", "dose_units", errors).unwrap_or(5);
    let multiplier = integer(config, "doses", "carafe_multiplier", errors).unwrap_or(4);

    if !(1..=MAX_LEVEL).contains(&dose) {
        errors.push(format!("[doses] dose_units must be 1-{}", MAX_LEVEL));
    }
    if !(1..=MAX_LEVEL).contains(&multiplier) {
        errors.push(format!("[doses] carafe_multiplier must be 1-{}", MAX_LEVEL));
    }
    let carafe = dose.saturating_mul(multiplier);
    if carafe > MAX_LEVEL {
        errors.push(format!(
            "a carafe needs {} units but reservoirs hold {}",
            carafe, MAX_LEVEL
        ));
    }
}

fn validate_behaviour(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(behaviour) = config.get("behaviour") else {
        return;
    };

    if let Some(mode) = behaviour.get("consumption") {
        match mode.as_str() {
            Some("gated") | Some("lenient") => {}
            _ => errors.push("[behaviour] consumption must be \"gated\" or \"lenient\"".into()),
        }
    }
    if let Some(cancel) = behaviour.get("cancel_on_power_off") {
        if !cancel.is_bool() {
            errors.push("[behaviour] cancel_on_power_off must be true or false".into());
        }
    }
}
