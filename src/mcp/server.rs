//! MCP server lifecycle.
//!
//! 1. **Initialisation**: `initialize` request, version negotiation, then the
//!    `notifications/initialized` notification
//! 2. **Operation**: `tools/list`, `tools/call`, `ping`
//! 3. **Shutdown**: end of stdin, SIGINT or SIGTERM

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncWrite};

use crate::mcp::protocol::{
    negotiate_version, parse_message, ErrorCode, IncomingMessage, JsonRpcError,
    JsonRpcErrorData, JsonRpcNotification, JsonRpcRequest, JsonRpcResponse, OutgoingMessage,
    RequestId, SERVER_NAME,
};
use crate::mcp::tools::{tool_definitions, ToolHandler};
use crate::mcp::transport::{LineTransport, StdioTransport};

/// Server state in the MCP lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    /// Waiting for initialize request.
    AwaitingInit,
    /// Initialize received, waiting for initialized notification.
    Initialising,
    /// Ready for normal operation.
    Running,
    /// Shutdown in progress.
    ShuttingDown,
}

/// Server capabilities advertised during initialisation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ServerCapabilities {
    /// Tool-related capabilities. The tool list is fixed.
    pub tools: Value,
}

/// Server information for the initialisation response.
#[derive(Debug, Clone, Serialize)]
pub struct ServerInfo {
    /// Server name.
    pub name: &'static str,
    /// Server version.
    pub version: &'static str,
}

impl Default for ServerInfo {
    fn default() -> Self {
        Self {
            name: SERVER_NAME,
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

/// Client information received during initialisation.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientInfo {
    /// Client name.
    pub name: String,
    /// Client version.
    #[serde(default)]
    pub version: Option<String>,
}

/// Parameters for the initialize request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    /// Protocol version requested by the client.
    pub protocol_version: String,
    /// Client capabilities (unused).
    #[serde(default)]
    pub capabilities: Value,
    /// Client information.
    #[serde(default)]
    pub client_info: Option<ClientInfo>,
}

/// Parameters for the tools/call request.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCallParams {
    /// Name of the tool to call.
    pub name: String,
    /// Tool arguments.
    #[serde(default)]
    pub arguments: Value,
}

/// The MCP server.
pub struct McpServer<R = tokio::io::BufReader<tokio::io::Stdin>, W = tokio::io::Stdout> {
    state: ServerState,
    transport: LineTransport<R, W>,
    protocol_version: Option<&'static str>,
    tools: ToolHandler,
}

impl McpServer {
    /// Creates a server speaking over stdio.
    #[must_use]
    pub fn new(tools: ToolHandler) -> Self {
        Self::with_transport(StdioTransport::stdio(), tools)
    }
}

impl<R, W> McpServer<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Creates a server over an arbitrary transport.
    #[must_use]
    pub const fn with_transport(transport: LineTransport<R, W>, tools: ToolHandler) -> Self {
        Self {
            state: ServerState::AwaitingInit,
            transport,
            protocol_version: None,
            tools,
        }
    }

    /// Returns the current server state.
    #[must_use]
    pub const fn state(&self) -> ServerState {
        self.state
    }

    /// Returns the negotiated protocol version, once initialised.
    #[must_use]
    pub const fn protocol_version(&self) -> Option<&'static str> {
        self.protocol_version
    }

    /// Consumes the server, returning the transport's writer.
    pub fn into_writer(self) -> W {
        self.transport.into_writer()
    }

    /// Runs the server until end of input or a termination signal.
    ///
    /// # Errors
    ///
    /// Returns an error if transport I/O fails.
    pub async fn run(&mut self) -> std::io::Result<()> {
        self.run_with_shutdown().await
    }

    /// Runs the server until end of input, without signal handling.
    ///
    /// # Errors
    ///
    /// Returns an error if transport I/O fails.
    pub async fn run_until_eof(&mut self) -> std::io::Result<()> {
        loop {
            let line = self.transport.read_line().await;
            if self.handle_transport_result(line).await? {
                return Ok(());
            }
        }
    }

    #[cfg(unix)]
    async fn run_with_shutdown(&mut self) -> std::io::Result<()> {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigint = signal(SignalKind::interrupt())?;
        let mut sigterm = signal(SignalKind::terminate())?;

        loop {
            tokio::select! {
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT, initiating graceful shutdown");
                    self.state = ServerState::ShuttingDown;
                    return Ok(());
                }

                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM, initiating graceful shutdown");
                    self.state = ServerState::ShuttingDown;
                    return Ok(());
                }

                line_result = self.transport.read_line() => {
                    if self.handle_transport_result(line_result).await? {
                        return Ok(());
                    }
                }
            }
        }
    }

    #[cfg(windows)]
    async fn run_with_shutdown(&mut self) -> std::io::Result<()> {
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                _ = &mut ctrl_c => {
                    tracing::info!("Received Ctrl+C, initiating graceful shutdown");
                    self.state = ServerState::ShuttingDown;
                    return Ok(());
                }

                line_result = self.transport.read_line() => {
                    if self.handle_transport_result(line_result).await? {
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Handles one read from the transport.
    ///
    /// Returns `true` if the server should shut down.
    async fn handle_transport_result(
        &mut self,
        line_result: std::io::Result<Option<String>>,
    ) -> std::io::Result<bool> {
        let Some(line) = line_result? else {
            tracing::info!("stdin closed");
            self.state = ServerState::ShuttingDown;
            return Ok(true);
        };

        if line.trim().is_empty() {
            return Ok(false);
        }

        match parse_message(&line) {
            Ok(IncomingMessage::Request(req)) => {
                let outcome = self.handle_request(&req).await;
                self.transport
                    .write_message(&OutgoingMessage::from(outcome))
                    .await?;
            }
            Ok(IncomingMessage::Notification(notif)) => self.handle_notification(&notif),
            Err(error) => {
                tracing::debug!(code = error.error.code, "Rejected malformed message");
                self.transport
                    .write_message(&OutgoingMessage::Error(error))
                    .await?;
            }
        }

        Ok(self.state == ServerState::ShuttingDown)
    }

    /// Handles a request and produces its reply.
    async fn handle_request(
        &mut self,
        req: &JsonRpcRequest,
    ) -> Result<JsonRpcResponse, JsonRpcError> {
        tracing::debug!(id = %req.id, method = %req.method, "Request");

        match req.method.as_str() {
            "initialize" => self.handle_initialize(req),
            "tools/list" => self.handle_tools_list(req),
            "tools/call" => self.handle_tools_call(req).await,
            "ping" => Ok(JsonRpcResponse::success(req.id.clone(), json!({}))),
            _ => Err(JsonRpcError::method_not_found(req.id.clone(), &req.method)),
        }
    }

    fn handle_notification(&mut self, notif: &JsonRpcNotification) {
        match notif.method.as_str() {
            "notifications/initialized" if self.state == ServerState::Initialising => {
                tracing::info!("Client initialised");
                self.state = ServerState::Running;
            }
            other => tracing::debug!(method = other, "Ignoring notification"),
        }
    }

    fn handle_initialize(&mut self, req: &JsonRpcRequest) -> Result<JsonRpcResponse, JsonRpcError> {
        if self.state != ServerState::AwaitingInit {
            return Err(JsonRpcError::new(
                Some(req.id.clone()),
                JsonRpcErrorData::new(ErrorCode::InvalidRequest, "Server already initialised"),
            ));
        }

        let params: InitializeParams = req.parse_params()?;
        let version = negotiate_version(&params.protocol_version);

        if let Some(client) = &params.client_info {
            tracing::info!(
                client = %client.name,
                client_version = client.version.as_deref().unwrap_or("unknown"),
                protocol = version,
                "Initialising"
            );
        }

        self.protocol_version = Some(version);
        self.state = ServerState::Initialising;

        Ok(JsonRpcResponse::success(
            req.id.clone(),
            json!({
                "protocolVersion": version,
                "capabilities": ServerCapabilities {
                    tools: json!({}),
                },
                "serverInfo": ServerInfo::default(),
            }),
        ))
    }

    fn handle_tools_list(&self, req: &JsonRpcRequest) -> Result<JsonRpcResponse, JsonRpcError> {
        self.require_running(&req.id)?;

        Ok(JsonRpcResponse::success(
            req.id.clone(),
            json!({ "tools": tool_definitions() }),
        ))
    }

    async fn handle_tools_call(
        &self,
        req: &JsonRpcRequest,
    ) -> Result<JsonRpcResponse, JsonRpcError> {
        self.require_running(&req.id)?;

        let params: ToolCallParams = req.parse_params()?;
        let result = self.tools.call(&params.name, &params.arguments).await;

        let value = serde_json::to_value(&result).map_err(|e| {
            tracing::error!(error = %e, "Failed to serialise tool call result");
            JsonRpcError::internal_error(
                req.id.clone(),
                "Internal error: failed to serialise result",
            )
        })?;

        Ok(JsonRpcResponse::success(req.id.clone(), value))
    }

    /// Ensures the server is in the Running state.
    fn require_running(&self, id: &RequestId) -> Result<(), JsonRpcError> {
        if self.state != ServerState::Running {
            return Err(JsonRpcError::new(
                Some(id.clone()),
                JsonRpcErrorData::new(ErrorCode::InvalidRequest, "Server not initialised"),
            ));
        }
        Ok(())
    }
}
