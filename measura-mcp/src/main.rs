//! Measura MCP Server
//!
//! Line-delimited JSON-RPC over stdio.
//!
//! Tools:
//! - convert: One-shot conversion of a value between two units
//! - list_categories: Categories with their kind and base unit
//! - list_units: Units of a category in display order
//! - dispatch: Feed a user event to the session converter
//! - state: Current state of the session converter

mod config;
mod logging;

use config::Config;
use measura::{Event, FieldUpdates, SyncController};
use measura_core::{format_number, MeasuraError, MAX_DECIMALS};
use measura_units::{CategoryKind, Registry};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use std::io::{self, BufRead, Write};
use tracing::{debug, error, info, warn};

const PROTOCOL_VERSION: &str = "2025-11-25";
const SERVER_NAME: &str = "measura";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

// MCP Protocol types
#[derive(Debug, Deserialize)]
struct McpRequest {
    #[allow(dead_code)]
    jsonrpc: String,
    id: Option<JsonValue>,
    method: String,
    #[serde(default)]
    params: Option<JsonValue>,
}

#[derive(Debug, Serialize)]
struct McpResponse {
    jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<McpError>,
}

#[derive(Debug, Serialize)]
struct McpError {
    code: i32,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<JsonValue>,
}

impl McpError {
    fn invalid_params(message: impl Into<String>) -> Self {
        McpError {
            code: -32602,
            message: message.into(),
            data: None,
        }
    }
}

/// Session state: one converter shared by every `dispatch` call
struct Server {
    config: Config,
    controller: SyncController,
}

impl Server {
    fn new(config: Config) -> Self {
        let controller = SyncController::new(config.sync_options());
        Server { config, controller }
    }

    fn registry(&self) -> &Registry {
        self.controller.registry()
    }
}

fn main() {
    logging::init();

    let config = Config::from_env();
    info!(version = SERVER_VERSION, protocol = PROTOCOL_VERSION, "Measura MCP Server started");
    info!(category = %config.default_category, max_decimals = config.max_decimals, "configuration loaded");

    let mut server = Server::new(config);
    if let Err(violations) = server.registry().validate() {
        for v in &violations {
            error!(%v, "unit registry violation");
        }
    }

    let stdin = io::stdin();
    let mut reader = io::BufReader::new(stdin.lock());

    info!("Server ready, waiting for requests...");

    loop {
        let mut line = String::new();
        match reader.read_line(&mut line) {
            Ok(0) => {
                info!("Client disconnected (EOF)");
                break;
            }
            Ok(_) => {
                let Some(response) = handle_line(&mut server, &line) else {
                    continue;
                };
                if let Err(e) = write_response(&response) {
                    error!(error = %e, "error writing response");
                    break;
                }
            }
            Err(e) => {
                error!(error = %e, "error reading input");
                break;
            }
        }
    }

    info!("Server shutting down");
}

/// Handle one input line. `None` when nothing should be written back:
/// blank lines and notifications (requests without an id).
fn handle_line(server: &mut Server, line: &str) -> Option<McpResponse> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    debug!(bytes = line.len(), "received");

    let request: McpRequest = match serde_json::from_str(line) {
        Ok(r) => r,
        Err(e) => {
            warn!(error = %e, "error parsing request");
            return Some(McpResponse {
                jsonrpc: "2.0".to_string(),
                id: None,
                result: None,
                error: Some(McpError {
                    code: -32700,
                    message: format!("Parse error: {}", e),
                    data: None,
                }),
            });
        }
    };

    debug!(method = %request.method, "processing");
    let response = handle_request(server, &request);

    if request.id.is_none() {
        debug!(method = %request.method, "notification processed");
        return None;
    }
    Some(response)
}

fn write_response(response: &McpResponse) -> io::Result<()> {
    let response_json = serde_json::to_string(response)?;
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", response_json)?;
    stdout.flush()
}

fn handle_request(server: &mut Server, request: &McpRequest) -> McpResponse {
    let result = match request.method.as_str() {
        // Lifecycle
        "initialize" => handle_initialize(&request.params),
        "initialized" => Ok(json!({})),
        "ping" => Ok(json!({})),

        // Tools
        "tools/list" => handle_tools_list(),
        "tools/call" => handle_tool_call(server, &request.params),

        _ => Err(McpError {
            code: -32601,
            message: format!("Method not found: {}", request.method),
            data: None,
        }),
    };

    match result {
        Ok(r) => McpResponse {
            jsonrpc: "2.0".to_string(),
            id: request.id.clone(),
            result: Some(r),
            error: None,
        },
        Err(e) => McpResponse {
            jsonrpc: "2.0".to_string(),
            id: request.id.clone(),
            result: None,
            error: Some(e),
        },
    }
}

fn handle_initialize(params: &Option<JsonValue>) -> Result<JsonValue, McpError> {
    let client_info = params.as_ref()
        .and_then(|p| p.get("clientInfo"))
        .and_then(|c| c.get("name"))
        .and_then(|n| n.as_str())
        .unwrap_or("unknown");

    // Use client's protocol version for compatibility
    let client_protocol = params.as_ref()
        .and_then(|p| p.get("protocolVersion"))
        .and_then(|v| v.as_str())
        .unwrap_or(PROTOCOL_VERSION);

    info!(client = client_info, protocol = client_protocol, "client connected");

    Ok(json!({
        "protocolVersion": client_protocol,
        "serverInfo": {
            "name": SERVER_NAME,
            "version": SERVER_VERSION,
            "description": "Unit converter for length, weight, volume, time and temperature"
        },
        "capabilities": {
            "tools": {
                "listChanged": false
            }
        },
        "instructions": "Use 'convert' for one-off conversions. 'dispatch' drives a live converter with a source and a target field that stay in sync; 'state' shows it."
    }))
}

fn handle_tools_list() -> Result<JsonValue, McpError> {
    Ok(json!({
        "tools": [
            {
                "name": "convert",
                "description": "Convert a value from one unit to another within a category.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "value": {
                            "type": ["string", "number"],
                            "description": "Value to convert"
                        },
                        "from": { "type": "string", "description": "Source unit id (e.g. \"meter\")" },
                        "to": { "type": "string", "description": "Target unit id (e.g. \"foot\")" },
                        "category": { "type": "string", "description": "Category id (e.g. \"length\")" },
                        "decimals": {
                            "type": "integer",
                            "description": "Maximum decimal places in the formatted result"
                        }
                    },
                    "required": ["value", "from", "to", "category"]
                }
            },
            {
                "name": "list_categories",
                "description": "List the available categories.",
                "inputSchema": { "type": "object", "properties": {} }
            },
            {
                "name": "list_units",
                "description": "List the units of a category in display order.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "category": { "type": "string", "description": "Category id" }
                    },
                    "required": ["category"]
                }
            },
            {
                "name": "dispatch",
                "description": "Send a user event to the session converter and get its new state.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "event": {
                            "type": "string",
                            "enum": [
                                "category_changed",
                                "source_value_edited",
                                "source_unit_changed",
                                "target_value_edited",
                                "target_unit_changed",
                                "swap_requested"
                            ]
                        },
                        "value": {
                            "type": "string",
                            "description": "New category, unit id or field text (not used by swap_requested)"
                        }
                    },
                    "required": ["event"]
                }
            },
            {
                "name": "state",
                "description": "Current state of the session converter.",
                "inputSchema": { "type": "object", "properties": {} }
            }
        ]
    }))
}

fn handle_tool_call(server: &mut Server, params: &Option<JsonValue>) -> Result<JsonValue, McpError> {
    let params = params.as_ref().ok_or_else(|| McpError::invalid_params("Missing params"))?;

    let name = params.get("name")
        .and_then(|v| v.as_str())
        .ok_or_else(|| McpError::invalid_params("Missing tool name"))?;

    let args = params.get("arguments").cloned().unwrap_or(json!({}));

    match name {
        "convert" => tool_convert(server, args),
        "list_categories" => tool_list_categories(server),
        "list_units" => tool_list_units(server, args),
        "dispatch" => tool_dispatch(server, args),
        "state" => tool_state(server),
        _ => Err(McpError::invalid_params(format!("Unknown tool: {}", name))),
    }
}

/// Tool result carrying a structured error
fn tool_error(err: MeasuraError) -> JsonValue {
    json!({
        "content": [{ "type": "text", "text": err.to_string() }],
        "error": err,
        "isError": true
    })
}

fn string_arg<'a>(args: &'a JsonValue, tool: &str, name: &str) -> Result<&'a str, MeasuraError> {
    args.get(name)
        .and_then(|v| v.as_str())
        .ok_or_else(|| MeasuraError::arg_type(tool, name, "Text"))
}

fn tool_convert(server: &Server, args: JsonValue) -> Result<JsonValue, McpError> {
    let value = match args.get("value") {
        Some(JsonValue::String(s)) => s.clone(),
        Some(JsonValue::Number(n)) => n.to_string(),
        _ => return Ok(tool_error(MeasuraError::arg_type("convert", "value", "Text or Number"))),
    };

    let (from, to, category) = match (
        string_arg(&args, "convert", "from"),
        string_arg(&args, "convert", "to"),
        string_arg(&args, "convert", "category"),
    ) {
        (Ok(f), Ok(t), Ok(c)) => (f, t, c),
        (Err(e), _, _) | (_, Err(e), _) | (_, _, Err(e)) => return Ok(tool_error(e)),
    };

    let decimals = match args.get("decimals") {
        None | Some(JsonValue::Null) => server.config.max_decimals,
        Some(v) => match v.as_u64().and_then(|d| usize::try_from(d).ok()) {
            Some(d) if d <= MAX_DECIMALS => d,
            _ => {
                return Ok(tool_error(MeasuraError::arg_type(
                    "convert",
                    "decimals",
                    &format!("Integer 0..={}", MAX_DECIMALS),
                )))
            }
        },
    };

    let registry = server.registry();
    match registry.try_convert(&value, from, to, category) {
        Ok(result) => {
            let formatted = format_number(Some(result), decimals);
            let rate = registry.rate_text(from, to, category, decimals);
            Ok(json!({
                "content": [{ "type": "text", "text": format!("{} {} = {} {}",
                    value.trim(), registry.display_name(category, from),
                    formatted, registry.display_name(category, to)) }],
                "result": result,
                "formatted": formatted,
                "rate": rate,
                "isError": false
            }))
        }
        Err(e) => Ok(tool_error(e.into())),
    }
}

fn tool_list_categories(server: &Server) -> Result<JsonValue, McpError> {
    let categories: Vec<JsonValue> = server.registry().categories().iter()
        .map(|c| {
            let (kind, base_unit) = match &c.kind {
                CategoryKind::Linear { base_unit, .. } => ("linear", Some(*base_unit)),
                CategoryKind::Nonlinear { .. } => ("nonlinear", None),
            };
            json!({
                "id": c.id,
                "name": c.name,
                "kind": kind,
                "base_unit": base_unit,
                "units": c.unit_ids().len()
            })
        })
        .collect();

    let text = categories.iter()
        .filter_map(|c| c["id"].as_str())
        .collect::<Vec<_>>()
        .join(", ");

    Ok(json!({
        "content": [{ "type": "text", "text": text }],
        "categories": categories,
        "isError": false
    }))
}

fn tool_list_units(server: &Server, args: JsonValue) -> Result<JsonValue, McpError> {
    let category = match string_arg(&args, "list_units", "category") {
        Ok(c) => c,
        Err(e) => return Ok(tool_error(e)),
    };

    match server.registry().units(category) {
        Some(units) => {
            let text = units.iter()
                .map(|u| format!("{} ({})", u.id, u.name))
                .collect::<Vec<_>>()
                .join(", ");
            Ok(json!({
                "content": [{ "type": "text", "text": text }],
                "units": units,
                "isError": false
            }))
        }
        None => Ok(tool_error(MeasuraError::unknown_category(category))),
    }
}

fn tool_dispatch(server: &mut Server, args: JsonValue) -> Result<JsonValue, McpError> {
    let event: Event = match serde_json::from_value(args) {
        Ok(e) => e,
        Err(e) => {
            return Ok(tool_error(MeasuraError::arg_type("dispatch", "event", "a known event")
                .with_suggestion(e.to_string())));
        }
    };

    let mut updates = FieldUpdates::new();
    server.controller.handle(event, &mut updates);

    let state = server.controller.state();
    Ok(json!({
        "content": [{ "type": "text", "text": state_text(state) }],
        "updates": updates,
        "state": state,
        "isError": false
    }))
}

fn tool_state(server: &Server) -> Result<JsonValue, McpError> {
    let state = server.controller.state();
    Ok(json!({
        "content": [{ "type": "text", "text": state_text(state) }],
        "state": state,
        "isError": false
    }))
}

fn state_text(state: &measura::SyncState) -> String {
    let mut text = format!(
        "[{}] {} {} -> {} {}",
        state.category, state.source_text, state.source_unit, state.target_text, state.target_unit
    );
    if !state.rate_text.is_empty() {
        text.push_str(&format!(" ({})", state.rate_text));
    }
    text
}
