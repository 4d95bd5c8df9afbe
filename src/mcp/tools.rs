//! Tool definitions and handlers.
//!
//! Every tool is read-only. Handlers fetch data through the
//! [`MoonrakerClient`], run the configuration parser where needed, and
//! answer with plain text.

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::klipper::{parse_config, ParseResult};
use crate::mcp::format;
use crate::moonraker::{MoonrakerClient, MoonrakerError};

/// Default log file for `read_log`.
pub const DEFAULT_LOG_FILE: &str = "klippy.log";

/// Upper bound on lines returned by `read_log`.
pub const MAX_LOG_LINES: usize = 5000;

/// A tool definition for the `tools/list` response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    /// Unique tool name.
    pub name: &'static str,
    /// Human-readable description.
    pub description: &'static str,
    /// JSON Schema for the tool's arguments.
    pub input_schema: Value,
}

/// Content item in a tool call response.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    /// Text content.
    Text {
        /// The text content.
        text: String,
    },
}

/// Result of a tool call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallResult {
    /// Content returned by the tool.
    pub content: Vec<ToolContent>,
    /// Whether the tool call resulted in an error.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

impl ToolCallResult {
    /// Creates a successful text result.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text { text: text.into() }],
            is_error: false,
        }
    }

    /// Creates an error text result.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text {
                text: message.into(),
            }],
            is_error: true,
        }
    }

    /// Concatenated text of all content items.
    #[must_use]
    pub fn text_content(&self) -> String {
        self.content
            .iter()
            .map(|c| match c {
                ToolContent::Text { text } => text.as_str(),
            })
            .collect()
    }
}

fn filename_schema() -> Value {
    json!({
        "type": "string",
        "description": "Path relative to the Klipper config directory (e.g. 'printer.cfg', 'macros/start.cfg')"
    })
}

/// Returns the list of available tools.
#[must_use]
pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: "list_config_files",
            description: "List the files in the Klipper configuration directory with their size \
                          and modification time.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "pattern": {
                        "type": "string",
                        "description": "Optional glob filter, e.g. '*.cfg' or 'macros/*'"
                    }
                }
            }),
        },
        ToolDefinition {
            name: "read_config_file",
            description: "Return the raw text of a Klipper configuration file.",
            input_schema: json!({
                "type": "object",
                "properties": { "filename": filename_schema() },
                "required": ["filename"]
            }),
        },
        ToolDefinition {
            name: "parse_config",
            description: "Parse a Klipper configuration file and list its include directives, \
                          sections and parameters, followed by any syntax or value problems \
                          found. Include directives are listed, not followed.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "filename": filename_schema(),
                    "validate": {
                        "type": "boolean",
                        "description": "Report syntax and parameter problems (default: true)"
                    },
                    "section_prefix": {
                        "type": "string",
                        "description": "Only show sections whose name starts with this prefix"
                    }
                },
                "required": ["filename"]
            }),
        },
        ToolDefinition {
            name: "validate_config",
            description: "Check a Klipper configuration file for syntax errors, content outside \
                          sections, malformed section names and invalid pin, rotation_distance, \
                          nozzle_diameter and max_temp values.",
            input_schema: json!({
                "type": "object",
                "properties": { "filename": filename_schema() },
                "required": ["filename"]
            }),
        },
        ToolDefinition {
            name: "list_config_sections",
            description: "List the section names of a Klipper configuration file, sorted.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "filename": filename_schema(),
                    "prefix": {
                        "type": "string",
                        "description": "Only list sections starting with this prefix (e.g. 'stepper_')"
                    }
                },
                "required": ["filename"]
            }),
        },
        ToolDefinition {
            name: "get_config_section",
            description: "Show all parameters of one section of a Klipper configuration file.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "filename": filename_schema(),
                    "section": {
                        "type": "string",
                        "description": "Exact section name without brackets (e.g. 'extruder', 'gcode_macro START_PRINT')"
                    }
                },
                "required": ["filename", "section"]
            }),
        },
        ToolDefinition {
            name: "get_config_value",
            description: "Return a single parameter value and its inferred type.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "filename": filename_schema(),
                    "section": { "type": "string", "description": "Section name" },
                    "key": { "type": "string", "description": "Parameter name" }
                },
                "required": ["filename", "section", "key"]
            }),
        },
        ToolDefinition {
            name: "normalize_config",
            description: "Re-emit a configuration file in normalised form: includes first, then \
                          one 'key: value' line per parameter. Comments and blank lines are dropped.",
            input_schema: json!({
                "type": "object",
                "properties": { "filename": filename_schema() },
                "required": ["filename"]
            }),
        },
        ToolDefinition {
            name: "read_log",
            description: "Return the last lines of a Klipper or Moonraker log file.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "filename": {
                        "type": "string",
                        "description": "Log file name (default: klippy.log)"
                    },
                    "lines": {
                        "type": "integer",
                        "description": "Number of lines to return"
                    },
                    "errors_only": {
                        "type": "boolean",
                        "description": "Only return lines that look like errors"
                    }
                }
            }),
        },
        ToolDefinition {
            name: "get_printer_status",
            description: "Report Klippy state, heater temperatures, homing and print progress.",
            input_schema: json!({ "type": "object", "properties": {} }),
        },
    ]
}

/// Returns a required string argument, or an error result naming it.
fn required_str<'a>(arguments: &'a Value, name: &str) -> Result<&'a str, ToolCallResult> {
    arguments
        .get(name)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ToolCallResult::error(format!("Missing required parameter: {name}")))
}

fn optional_str<'a>(arguments: &'a Value, name: &str) -> Option<&'a str> {
    arguments
        .get(name)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

fn optional_bool(arguments: &Value, name: &str) -> Option<bool> {
    arguments.get(name).and_then(Value::as_bool)
}

fn moonraker_failure(what: &str, err: &MoonrakerError) -> ToolCallResult {
    warn!(error = %err, "{what} failed");
    match err {
        MoonrakerError::NotFound { .. } => ToolCallResult::error(format!("{what}: not found")),
        _ => ToolCallResult::error(format!("{what}: {err}")),
    }
}

/// Executes tool calls against a Moonraker instance.
#[derive(Debug, Clone)]
pub struct ToolHandler {
    client: MoonrakerClient,
    default_log_lines: usize,
}

impl ToolHandler {
    /// Creates a handler using `client`.
    #[must_use]
    pub const fn new(client: MoonrakerClient, default_log_lines: usize) -> Self {
        Self {
            client,
            default_log_lines,
        }
    }

    /// Runs the named tool.
    ///
    /// Unknown tools and failures are reported as error results, never as
    /// protocol errors.
    pub async fn call(&self, name: &str, arguments: &Value) -> ToolCallResult {
        info!(tool = name, "Tool call");

        let result = match name {
            "list_config_files" => self.list_config_files(arguments).await,
            "read_config_file" => self.read_config_file(arguments).await,
            "parse_config" => self.parse_config(arguments).await,
            "validate_config" => self.validate_config(arguments).await,
            "list_config_sections" => self.list_config_sections(arguments).await,
            "get_config_section" => self.get_config_section(arguments).await,
            "get_config_value" => self.get_config_value(arguments).await,
            "normalize_config" => self.normalize_config(arguments).await,
            "read_log" => self.read_log(arguments).await,
            "get_printer_status" => self.get_printer_status().await,
            _ => Err(ToolCallResult::error(format!("Unknown tool: {name}"))),
        };

        result.unwrap_or_else(|e| e)
    }

    async fn fetch_config(&self, filename: &str) -> Result<String, ToolCallResult> {
        self.client
            .get_config_file(filename)
            .await
            .map_err(|e| moonraker_failure(&format!("Reading config file '{filename}'"), &e))
    }

    async fn fetch_parsed(
        &self,
        filename: &str,
        validate: bool,
    ) -> Result<ParseResult, ToolCallResult> {
        let text = self.fetch_config(filename).await?;
        Ok(parse_config(&text, validate))
    }

    async fn list_config_files(&self, arguments: &Value) -> Result<ToolCallResult, ToolCallResult> {
        let pattern = optional_str(arguments, "pattern")
            .map(glob::Pattern::new)
            .transpose()
            .map_err(|e| ToolCallResult::error(format!("Invalid pattern: {e}")))?;

        let mut files = self
            .client
            .list_config_files()
            .await
            .map_err(|e| moonraker_failure("Listing config files", &e))?;

        if let Some(pattern) = &pattern {
            files.retain(|f| pattern.matches(&f.path));
        }
        files.sort_by(|a, b| a.path.cmp(&b.path));

        Ok(ToolCallResult::text(format::render_file_list(&files)))
    }

    async fn read_config_file(&self, arguments: &Value) -> Result<ToolCallResult, ToolCallResult> {
        let filename = required_str(arguments, "filename")?;
        let text = self.fetch_config(filename).await?;
        Ok(ToolCallResult::text(text))
    }

    async fn parse_config(&self, arguments: &Value) -> Result<ToolCallResult, ToolCallResult> {
        let filename = required_str(arguments, "filename")?;
        let validate = optional_bool(arguments, "validate").unwrap_or(true);
        let prefix = optional_str(arguments, "section_prefix");

        let result = self.fetch_parsed(filename, validate).await?;
        Ok(ToolCallResult::text(format::render_parse_result(
            filename, &result, prefix,
        )))
    }

    async fn validate_config(&self, arguments: &Value) -> Result<ToolCallResult, ToolCallResult> {
        let filename = required_str(arguments, "filename")?;
        let result = self.fetch_parsed(filename, true).await?;

        let text = if result.is_valid() {
            format!(
                "{filename}: no problems found ({} sections, {} includes)",
                result.document.len(),
                result.includes.len()
            )
        } else {
            format!(
                "{filename}: {} problem(s) found\n{}",
                result.diagnostics.len(),
                format::render_diagnostics(&result.diagnostics)
            )
        };
        Ok(ToolCallResult::text(text))
    }

    async fn list_config_sections(
        &self,
        arguments: &Value,
    ) -> Result<ToolCallResult, ToolCallResult> {
        let filename = required_str(arguments, "filename")?;
        let prefix = optional_str(arguments, "prefix").unwrap_or("");
        let result = self.fetch_parsed(filename, false).await?;

        let names: Vec<&str> = result
            .document
            .section_names()
            .into_iter()
            .filter(|name| name.starts_with(prefix))
            .collect();

        let mut text = format!("{} section(s) in {filename}\n", names.len());
        for name in names {
            text.push_str(name);
            text.push('\n');
        }
        Ok(ToolCallResult::text(text))
    }

    async fn get_config_section(
        &self,
        arguments: &Value,
    ) -> Result<ToolCallResult, ToolCallResult> {
        let filename = required_str(arguments, "filename")?;
        let name = required_str(arguments, "section")?;
        let result = self.fetch_parsed(filename, false).await?;

        let section = result.document.section(name).ok_or_else(|| {
            ToolCallResult::error(format!(
                "Section [{name}] not found in {filename} ({} sections)",
                result.document.len()
            ))
        })?;
        Ok(ToolCallResult::text(format::render_section(name, section)))
    }

    async fn get_config_value(&self, arguments: &Value) -> Result<ToolCallResult, ToolCallResult> {
        let filename = required_str(arguments, "filename")?;
        let section = required_str(arguments, "section")?;
        let key = required_str(arguments, "key")?;
        let result = self.fetch_parsed(filename, false).await?;

        if result.document.section(section).is_none() {
            return Err(ToolCallResult::error(format!(
                "Section [{section}] not found in {filename}"
            )));
        }
        let value = result.document.get(section, key).ok_or_else(|| {
            ToolCallResult::error(format!("Parameter '{key}' not set in [{section}]"))
        })?;

        Ok(ToolCallResult::text(format!(
            "[{section}] {key}: {value} ({})",
            value.type_name()
        )))
    }

    async fn normalize_config(&self, arguments: &Value) -> Result<ToolCallResult, ToolCallResult> {
        let filename = required_str(arguments, "filename")?;
        let result = self.fetch_parsed(filename, false).await?;
        Ok(ToolCallResult::text(
            result.document.to_config_text(&result.includes),
        ))
    }

    async fn read_log(&self, arguments: &Value) -> Result<ToolCallResult, ToolCallResult> {
        let filename = optional_str(arguments, "filename").unwrap_or(DEFAULT_LOG_FILE);
        let count = arguments
            .get("lines")
            .and_then(Value::as_u64)
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(self.default_log_lines)
            .clamp(1, MAX_LOG_LINES);
        let errors_only = optional_bool(arguments, "errors_only").unwrap_or(false);

        let text = self
            .client
            .get_log_file(filename)
            .await
            .map_err(|e| moonraker_failure(&format!("Reading log '{filename}'"), &e))?;

        let (lines, total) = format::tail_lines(&text, count, errors_only);
        let kind = if errors_only { "error lines" } else { "lines" };
        let mut out = format!("Last {} of {total} {kind} from {filename}\n", lines.len());
        for line in lines {
            out.push_str(line);
            out.push('\n');
        }
        Ok(ToolCallResult::text(out))
    }

    async fn get_printer_status(&self) -> Result<ToolCallResult, ToolCallResult> {
        let info = self
            .client
            .printer_info()
            .await
            .map_err(|e| moonraker_failure("Reading printer info", &e))?;

        // Object queries fail while Klippy is shut down; still report the state.
        let status = match self.client.query_status().await {
            Ok(status) => Some(status),
            Err(e) => {
                warn!(error = %e, "Printer object query failed");
                None
            }
        };

        Ok(ToolCallResult::text(format::render_status(
            &info,
            status.as_ref(),
        )))
    }
}
