//! Klipper configuration file parsing.
//!
//! Klipper's `printer.cfg` is an INI-like format:
//!
//! ```text
//! [include macros.cfg]
//!
//! # comment
//! [stepper_x]
//! step_pin: PF13
//! position_endstop = 0
//! homing_positions: 0, \
//!   10
//! ```
//!
//! Include directives are extracted before anything else. Keys are separated
//! from values by `:` or `=`, and a trailing backslash joins the next line.
//!
//! [`parse_config`] turns such text into a [`ConfigDocument`] of typed
//! [`Value`]s, the list of include paths, and line-tagged [`Diagnostic`]s.
//! Parsing is pure and synchronous and never fails outright: malformed
//! lines are reported and skipped.

pub mod document;
pub mod parser;
pub mod rules;
pub mod value;

pub use document::{ConfigDocument, Section};
pub use parser::{extract_includes, parse_config, Diagnostic, ParseResult};
pub use rules::validate_section_name;
pub use value::Value;
