//! Section-name and parameter validation.
//!
//! Parameter checks are data: each [`ParamRule`] pairs a section matcher and
//! a key with a [`Check`]. Adding a rule means adding a row to [`PARAM_RULES`].

use regex::Regex;

use crate::klipper::value::parse_number;

/// Section families whose names legitimately contain a space
/// (`[gcode_macro START_PRINT]`, `[tmc2209 stepper_x]`, ...).
pub const MULTI_WORD_PREFIXES: &[&str] = &[
    "stepper",
    "extruder",
    "heater",
    "heater_fan",
    "controller_fan",
    "fan_generic",
    "temperature_sensor",
    "temperature_fan",
    "bed_mesh",
    "bed_screws",
    "screws_tilt_adjust",
    "gcode_macro",
    "delayed_gcode",
    "gcode_button",
    "output_pin",
    "manual_stepper",
    "filament_switch_sensor",
    "filament_motion_sensor",
    "tmc2130",
    "tmc2208",
    "tmc2209",
    "tmc2240",
    "tmc5160",
    "neopixel",
    "led",
    "servo",
    "mcu",
    "display_template",
    "menu",
];

/// Validates a section name.
///
/// # Errors
///
/// Returns a description of the problem if the name is empty, or contains
/// a space without starting with a known multi-word prefix.
pub fn validate_section_name(name: &str) -> Result<(), String> {
    let name = name.trim();

    if name.is_empty() {
        return Err("empty section name".to_string());
    }

    if name.contains(' ') && !MULTI_WORD_PREFIXES.iter().any(|prefix| has_prefix(name, prefix)) {
        return Err(format!("invalid section name: '{name}'"));
    }

    Ok(())
}

/// `prefix` must end at a word boundary: `[led x]` and `[led_group x]` match
/// `led`, `[ledger x]` does not.
fn has_prefix(name: &str, prefix: &str) -> bool {
    name.strip_prefix(prefix).is_some_and(|rest| rest.starts_with([' ', '_']))
}

/// Which sections a rule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionMatch {
    /// Section name equals the string.
    Exact(&'static str),
    /// Section name starts with the string.
    Prefix(&'static str),
}

impl SectionMatch {
    /// Returns `true` if `section` is covered by this matcher.
    #[must_use]
    pub fn matches(self, section: &str) -> bool {
        match self {
            Self::Exact(name) => section == name,
            Self::Prefix(prefix) => section.starts_with(prefix),
        }
    }
}

/// A semantic check applied to a raw parameter value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Check {
    /// MCU pin descriptor: optional `!`, letters, then digits (`PA0`, `!PB12`).
    Pin,
    /// A number strictly greater than zero.
    PositiveNumber,
    /// A number within `[min, max]`.
    NumberInRange {
        /// Inclusive lower bound.
        min: f64,
        /// Inclusive upper bound.
        max: f64,
    },
}

/// One row of the rule table.
#[derive(Debug, Clone, Copy)]
pub struct ParamRule {
    /// Sections the rule applies to.
    pub section: SectionMatch,
    /// Parameter key.
    pub key: &'static str,
    /// Check to run.
    pub check: Check,
}

const fn rule(section: SectionMatch, key: &'static str, check: Check) -> ParamRule {
    ParamRule {
        section,
        key,
        check,
    }
}

/// The parameter rule table.
pub const PARAM_RULES: &[ParamRule] = &[
    rule(SectionMatch::Prefix("stepper_"), "step_pin", Check::Pin),
    rule(SectionMatch::Prefix("stepper_"), "dir_pin", Check::Pin),
    rule(SectionMatch::Prefix("stepper_"), "enable_pin", Check::Pin),
    rule(
        SectionMatch::Prefix("stepper_"),
        "rotation_distance",
        Check::PositiveNumber,
    ),
    rule(
        SectionMatch::Exact("extruder"),
        "nozzle_diameter",
        Check::PositiveNumber,
    ),
    rule(
        SectionMatch::Exact("extruder"),
        "max_temp",
        Check::NumberInRange {
            min: 0.0,
            max: 500.0,
        },
    ),
];

/// Runs rule-table checks for one parameter.
///
/// Owns the compiled pin pattern so a scanner can reuse it across lines.
#[derive(Debug)]
pub struct ParamValidator {
    pin: Regex,
}

impl ParamValidator {
    /// Compiles the patterns used by the checks.
    ///
    /// # Errors
    ///
    /// Returns an error if a pattern fails to compile.
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            pin: Regex::new(r"^!?[A-Za-z]+[0-9]+$")?,
        })
    }

    /// Checks `value` for `key` in `section` against every matching rule.
    ///
    /// Returns the first failure message. Pairs with no rule always pass.
    ///
    /// # Errors
    ///
    /// Returns a message describing why the value is invalid.
    pub fn validate(&self, section: &str, key: &str, value: &str) -> Result<(), String> {
        PARAM_RULES
            .iter()
            .filter(|r| r.key == key && r.section.matches(section))
            .try_for_each(|r| self.run(r.check, key, value))
    }

    fn run(&self, check: Check, key: &str, value: &str) -> Result<(), String> {
        match check {
            Check::Pin => {
                if self.pin.is_match(value) {
                    Ok(())
                } else {
                    Err(format!("invalid pin format for {key}: '{value}'"))
                }
            }
            Check::PositiveNumber => match parse_number(value) {
                Some(n) if n > 0.0 => Ok(()),
                _ => Err(format!("{key} must be a positive number, got '{value}'")),
            },
            Check::NumberInRange { min, max } => match parse_number(value) {
                Some(n) if (min..=max).contains(&n) => Ok(()),
                _ => Err(format!(
                    "{key} must be a number between {min} and {max}, got '{value}'"
                )),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> ParamValidator {
        ParamValidator::new().unwrap()
    }

    #[test]
    fn plain_section_names_are_valid() {
        assert!(validate_section_name("printer").is_ok());
        assert!(validate_section_name("stepper_x").is_ok());
        assert!(validate_section_name("  heater_bed ").is_ok());
    }

    #[test]
    fn multi_word_names_need_known_prefix() {
        assert!(validate_section_name("gcode_macro START_PRINT").is_ok());
        assert!(validate_section_name("tmc2209 stepper_x").is_ok());
        assert!(validate_section_name("temperature_sensor chamber").is_ok());

        let err = validate_section_name("my section").unwrap_err();
        assert!(err.contains("my section"));
    }

    #[test]
    fn prefix_must_end_at_word_boundary() {
        assert!(validate_section_name("led status").is_ok());
        assert!(validate_section_name("stepper_z1 extra").is_ok());
        assert!(validate_section_name("ledger x").is_err());
        assert!(validate_section_name("mcuboard x").is_err());
        assert!(validate_section_name("servomotor arm").is_err());
    }

    #[test]
    fn empty_section_name_is_invalid() {
        assert_eq!(validate_section_name("   ").unwrap_err(), "empty section name");
    }

    #[test]
    fn pin_descriptors() {
        let v = validator();
        assert!(v.validate("stepper_x", "step_pin", "PA0").is_ok());
        assert!(v.validate("stepper_x", "dir_pin", "!PB12").is_ok());
        assert!(v.validate("stepper_z", "enable_pin", "gpio23").is_ok());

        for bad in ["123", "PA", "^PA1", "PA0 ", "!", "P-A0", "PA\u{663}", "PB\u{ff11}"] {
            let err = v.validate("stepper_x", "step_pin", bad).unwrap_err();
            assert!(err.contains("invalid pin format"), "value: {bad}");
        }
    }

    #[test]
    fn pin_rules_only_apply_to_stepper_sections() {
        let v = validator();
        assert!(v.validate("extruder", "step_pin", "123").is_ok());
        assert!(v.validate("stepper_x", "endstop_pin", "^PA1").is_ok());
    }

    #[test]
    fn rotation_distance_must_be_positive() {
        let v = validator();
        assert!(v.validate("stepper_y", "rotation_distance", "40").is_ok());
        assert!(v.validate("stepper_y", "rotation_distance", "0").is_err());
        assert!(v.validate("stepper_y", "rotation_distance", "-8").is_err());
        assert!(v.validate("stepper_y", "rotation_distance", "abc").is_err());
    }

    #[test]
    fn extruder_rules() {
        let v = validator();
        assert!(v.validate("extruder", "nozzle_diameter", "0.4").is_ok());
        assert!(v.validate("extruder", "nozzle_diameter", "0").is_err());

        assert!(v.validate("extruder", "max_temp", "250").is_ok());
        assert!(v.validate("extruder", "max_temp", "0").is_ok());
        assert!(v.validate("extruder", "max_temp", "500").is_ok());
        assert!(v.validate("extruder", "max_temp", "600").is_err());
        assert!(v.validate("extruder", "max_temp", "-1").is_err());
    }

    #[test]
    fn extruder_rules_use_exact_section_match() {
        let v = validator();
        assert!(v.validate("extruder1", "max_temp", "600").is_ok());
        assert!(v.validate("heater_bed", "max_temp", "600").is_ok());
    }

    #[test]
    fn rule_table_keys_are_unique_per_matcher() {
        for (i, a) in PARAM_RULES.iter().enumerate() {
            for b in &PARAM_RULES[i + 1..] {
                assert!(
                    !(a.key == b.key && a.section == b.section),
                    "duplicate rule for {}",
                    a.key
                );
            }
        }
    }
}
