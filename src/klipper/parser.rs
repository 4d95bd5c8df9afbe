//! Line-oriented Klipper configuration parser.
//!
//! Parsing happens in two passes over the text:
//!
//! 1. [`extract_includes`] pulls out `[include <path>]` directives.
//! 2. A [`LineScanner`] walks the remaining lines, tracking the open
//!    section and storing typed parameters.
//!
//! Malformed lines produce [`Diagnostic`]s; they never stop the parse.

use std::fmt;

use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::klipper::document::{ConfigDocument, Section};
use crate::klipper::rules::{validate_section_name, ParamValidator};
use crate::klipper::value::Value;

/// A non-fatal problem found while parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// 1-based source line. `0` when the problem is not tied to a line.
    pub line: usize,
    /// Human-readable description.
    pub message: String,
}

impl Diagnostic {
    fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Line {}: {}", self.line, self.message)
    }
}

/// Output of [`parse_config`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParseResult {
    /// Parsed sections.
    pub document: ConfigDocument,
    /// Include paths in order of appearance, duplicates kept.
    pub includes: Vec<String>,
    /// Problems found, in line order.
    pub diagnostics: Vec<Diagnostic>,
}

impl ParseResult {
    /// Returns `true` if no diagnostics were produced.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Parses configuration text.
///
/// With `validate` set to `false` no diagnostics are produced; the document
/// and include list are identical either way.
///
/// # Examples
///
/// ```
/// use klipper_mcp::klipper::{parse_config, Value};
///
/// let result = parse_config("[include fan.cfg]\n[extruder]\nnozzle_diameter: 0.4\n", true);
/// assert_eq!(result.includes, ["fan.cfg"]);
/// assert_eq!(
///     result.document.get("extruder", "nozzle_diameter"),
///     Some(&Value::Number(0.4))
/// );
/// assert!(result.diagnostics.is_empty());
/// ```
#[must_use]
pub fn parse_config(text: &str, validate: bool) -> ParseResult {
    let scanner = match LineScanner::new(validate) {
        Ok(scanner) => scanner,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build configuration scanner");
            return ParseResult {
                diagnostics: vec![Diagnostic::new(0, format!("parser failure: {e}"))],
                ..ParseResult::default()
            };
        }
    };

    let (cleaned, includes) = extract_includes(text);
    let (document, diagnostics) = scanner.scan(&cleaned);

    debug!(
        sections = document.len(),
        includes = includes.len(),
        diagnostics = diagnostics.len(),
        "Parsed configuration"
    );

    ParseResult {
        document,
        includes,
        diagnostics,
    }
}

/// Splits `[include <path>]` directives out of configuration text.
///
/// Returns the text with every directive line blanked, plus the non-empty
/// paths in order of appearance. Blanking rather than deleting keeps the
/// remaining lines at their original line numbers.
#[must_use]
pub fn extract_includes(text: &str) -> (String, Vec<String>) {
    let mut includes = Vec::new();
    let mut cleaned = String::with_capacity(text.len());

    for (i, line) in text.lines().enumerate() {
        if i > 0 {
            cleaned.push('\n');
        }
        match include_path(line) {
            Some(path) => {
                if !path.is_empty() {
                    includes.push(path.to_string());
                }
            }
            None => cleaned.push_str(line),
        }
    }

    (cleaned, includes)
}

/// Returns the (trimmed) path if the whole line is an include directive.
fn include_path(line: &str) -> Option<&str> {
    let inner = line.trim().strip_prefix('[')?.strip_suffix(']')?;
    let rest = inner.strip_prefix("include")?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    // A `]` inside would mean the brackets don't enclose the whole line.
    if rest.contains(']') {
        return None;
    }
    Some(rest.trim())
}

/// Per-call scanner state: compiled patterns plus the validation flag.
///
/// Built fresh for every parse so concurrent parses share nothing.
#[derive(Debug)]
pub struct LineScanner {
    section_header: Regex,
    key_value: Regex,
    params: Option<ParamValidator>,
}

impl LineScanner {
    /// Compiles the line patterns.
    ///
    /// # Errors
    ///
    /// Returns an error if a pattern fails to compile.
    pub fn new(validate: bool) -> Result<Self, regex::Error> {
        Ok(Self {
            section_header: Regex::new(r"^\[([^\]]+)\]\s*$")?,
            key_value: Regex::new(r"^([^:=]+)[:=]\s*(.*)$")?,
            params: if validate {
                Some(ParamValidator::new()?)
            } else {
                None
            },
        })
    }

    /// Scans include-free text into a document.
    #[must_use]
    pub fn scan(&self, text: &str) -> (ConfigDocument, Vec<Diagnostic>) {
        let lines: Vec<&str> = text.lines().collect();
        let mut state = ScanState::default();

        let mut i = 0;
        while i < lines.len() {
            let line_no = i + 1;
            let raw = lines[i];
            i += 1;

            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            // A trailing backslash pulls in exactly one following line.
            let logical = match trimmed.strip_suffix('\\') {
                Some(head) => {
                    let mut joined = head.trim_end().to_string();
                    if let Some(next) = lines.get(i) {
                        joined.push(' ');
                        joined.push_str(next.trim());
                        i += 1;
                    }
                    joined
                }
                None => trimmed.to_string(),
            };

            let logical = logical.trim();
            if !logical.is_empty() {
                self.scan_line(&mut state, line_no, logical);
            }
        }

        state.finish()
    }

    fn scan_line(&self, state: &mut ScanState, line_no: usize, line: &str) {
        if let Some(caps) = self.section_header.captures(line) {
            let name = caps[1].trim();
            if self.params.is_some() {
                if let Err(message) = validate_section_name(name) {
                    state.diagnose(line_no, message);
                }
            }
            state.open(name);
            return;
        }

        let Some(section) = state.current.as_deref() else {
            if self.params.is_some() {
                state.diagnose(line_no, "configuration outside of section");
            }
            return;
        };

        if let Some(caps) = self.key_value.captures(line) {
            let key = caps[1].trim();
            let raw_value = caps[2].trim();

            let failed = self
                .params
                .as_ref()
                .and_then(|p| p.validate(section, key, raw_value).err());

            state.data.insert(key.to_string(), Value::infer(raw_value));
            if let Some(message) = failed {
                state.diagnose(line_no, message);
            }
            return;
        }

        if self.params.is_some() {
            state.diagnose(line_no, format!("invalid syntax: {line}"));
        }
    }
}

#[derive(Debug, Default)]
struct ScanState {
    document: ConfigDocument,
    current: Option<String>,
    data: Section,
    diagnostics: Vec<Diagnostic>,
}

impl ScanState {
    fn open(&mut self, name: &str) {
        self.commit();
        if !name.is_empty() {
            self.current = Some(name.to_string());
        }
    }

    fn commit(&mut self) {
        let data = std::mem::take(&mut self.data);
        if let Some(name) = self.current.take() {
            self.document.commit(name, data);
        }
    }

    fn diagnose(&mut self, line: usize, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::new(line, message));
    }

    fn finish(mut self) -> (ConfigDocument, Vec<Diagnostic>) {
        self.commit();
        (self.document, self.diagnostics)
    }
}
