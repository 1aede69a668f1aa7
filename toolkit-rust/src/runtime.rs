use {
    crate::{
        jsonrpc::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, JSONRPC_VERSION},
        Tool,
    },
    anyhow::Result as AnyResult,
    log::{debug, info, warn},
    serde::Deserialize,
    serde_json::{json, Value},
    std::{future::Future, pin::Pin, sync::Arc},
    tokio::{
        io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader},
        sync::mpsc,
        task::{JoinError, JoinSet},
    },
};

/// Protocol version announced when the caller asks for one we do not know.
pub const LATEST_PROTOCOL_VERSION: &str = "2025-06-18";
/// Protocol versions the server can echo back from `initialize`.
pub const SUPPORTED_PROTOCOL_VERSIONS: &[&str] =
    &[LATEST_PROTOCOL_VERSION, "2025-03-26", "2024-11-05"];

/// Macro to bootstrap the stdio runtime for a set of tools. The macro
/// registers each tool on a [`ToolServer`] and serves it on stdin/stdout until
/// stdin is closed. It evaluates to an [`crate::AnyResult`].
///
/// The server version is always the version of the calling crate.
///
/// # Examples
///
/// ### One tool, server named after the calling crate
///
/// ```ignore
/// use tool_toolkit::bootstrap;
///
/// #[tokio::main]
/// async fn main() -> tool_toolkit::AnyResult<()> {
///     bootstrap!(YourTool::new())
/// }
/// ```
///
/// ### Multiple tools under an explicit server name
///
/// ```ignore
/// use tool_toolkit::bootstrap;
///
/// #[tokio::main]
/// async fn main() -> tool_toolkit::AnyResult<()> {
///     bootstrap!("my-server", [YourTool::new(), AnotherTool::new()])
/// }
/// ```
#[macro_export]
macro_rules! bootstrap {
    ($name:expr, [$($tool:expr),+ $(,)?]) => {{
        $crate::ToolServer::new($name, env!("CARGO_PKG_VERSION"))
            $(.tool($tool))+
            .serve_stdio()
            .await
    }};
    // Server named after the calling crate.
    ([$($tool:expr),+ $(,)?]) => {
        $crate::bootstrap!(env!("CARGO_PKG_NAME"), [$($tool),+])
    };
    // Only 1 tool.
    ($name:expr, $tool:expr) => {
        $crate::bootstrap!($name, [$tool])
    };
    // Only 1 tool, server named after the calling crate.
    ($tool:expr) => {
        $crate::bootstrap!(env!("CARGO_PKG_NAME"), [$tool])
    };
}

type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// Object-safe view of a [`Tool`] so that tools with different input types
/// can live in one registry.
trait ErasedTool: Send + Sync {
    fn name(&self) -> &'static str;

    fn meta(&self) -> Value;

    fn call(self: Arc<Self>, arguments: Value) -> Result<BoxFuture<String>, JsonRpcError>;
}

struct Registered<T>(T);

impl<T: Tool> ErasedTool for Registered<T> {
    fn name(&self) -> &'static str {
        T::name()
    }

    fn meta(&self) -> Value {
        T::meta()
    }

    fn call(self: Arc<Self>, arguments: Value) -> Result<BoxFuture<String>, JsonRpcError> {
        // Deserialize the arguments into [T::Input], keeping track of where
        // deserialization failed.
        let input: T::Input = serde_path_to_error::deserialize(arguments).map_err(|e| {
            JsonRpcError::invalid_params(
                format!("Invalid arguments for tool '{}': {}", T::name(), e.inner()),
                Some(json!({ "path": e.path().to_string() })),
            )
        })?;

        Ok(Box::pin(async move { self.0.invoke(input).await }))
    }
}

#[derive(Debug, Deserialize)]
struct CallToolParams {
    name: String,
    #[serde(default)]
    arguments: Option<Value>,
}

/// Outcome of handling one input line.
enum Dispatch {
    /// Answer right away.
    Reply(JsonRpcResponse),
    /// Answer once the tool call completes.
    Pending(BoxFuture<JsonRpcResponse>),
    /// Notifications are never answered.
    Silent,
}

/// A set of [`Tool`]s served over newline-delimited JSON-RPC 2.0.
pub struct ToolServer {
    name: String,
    version: String,
    tools: Vec<Arc<dyn ErasedTool>>,
}

impl ToolServer {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            tools: Vec::new(),
        }
    }

    /// Registers a tool. Tools are listed in registration order.
    ///
    /// Panics if a tool with the same name is already registered.
    pub fn tool<T: Tool>(mut self, tool: T) -> Self {
        if self.tools.iter().any(|registered| registered.name() == T::name()) {
            panic!("Tool '{}' is registered more than once.", T::name());
        }

        self.tools.push(Arc::new(Registered(tool)));
        self
    }

    /// Serves the registered tools on the process stdin/stdout.
    pub async fn serve_stdio(self) -> AnyResult<()> {
        self.serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
            .await
    }

    /// Serves the registered tools, reading one JSON-RPC message per line
    /// from `reader` and writing one response per line to `writer`.
    ///
    /// Tool calls run concurrently; responses are written in completion
    /// order. Returns once `reader` reaches EOF and every pending call has
    /// been answered, or as soon as `writer` fails.
    pub async fn serve<R, W>(self, mut reader: R, writer: W) -> AnyResult<()>
    where
        R: AsyncBufRead + Unpin + Send,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        info!(
            "Serving {} tool(s) as '{}' v{}",
            self.tools.len(),
            self.name,
            self.version
        );

        let (sender, receiver) = mpsc::unbounded_channel();
        let writer_task = tokio::spawn(write_responses(writer, receiver));
        let mut in_flight = JoinSet::new();
        let mut frame = Vec::new();

        loop {
            frame.clear();

            // Stop reading once nobody can receive the answers anymore.
            let read = tokio::select! {
                read = reader.read_until(b'\n', &mut frame) => read?,
                _ = sender.closed() => break,
            };

            if read == 0 {
                break;
            }

            let line = frame.trim_ascii();

            if line.is_empty() {
                continue;
            }

            match self.dispatch(line) {
                Dispatch::Reply(response) => {
                    // The writer task is gone, its error is reported below.
                    if sender.send(response).is_err() {
                        break;
                    }
                }
                Dispatch::Pending(response) => {
                    let sender = sender.clone();

                    in_flight.spawn(async move {
                        tokio::select! {
                            response = response => {
                                let _ = sender.send(response);
                            }
                            _ = sender.closed() => {
                                warn!("Output closed, abandoning tool call");
                            }
                        }
                    });
                }
                Dispatch::Silent => (),
            }

            while let Some(joined) = in_flight.try_join_next() {
                log_join_error(joined);
            }
        }

        while let Some(joined) = in_flight.join_next().await {
            log_join_error(joined);
        }

        drop(sender);
        writer_task.await??;

        info!("Input closed, shutting down");

        Ok(())
    }

    fn dispatch(&self, frame: &[u8]) -> Dispatch {
        // Also rejects frames that are not valid UTF-8.
        let value = match serde_json::from_slice::<Value>(frame) {
            Ok(value) => value,
            Err(e) => {
                warn!("Received malformed JSON: {e}");

                return Dispatch::Reply(JsonRpcResponse::error(
                    Value::Null,
                    JsonRpcError::parse_error(e),
                ));
            }
        };

        // Best effort id so that invalid requests can still be correlated.
        let id_hint = value.get("id").cloned().unwrap_or(Value::Null);

        let request = match serde_json::from_value::<JsonRpcRequest>(value) {
            Ok(request) if request.jsonrpc == JSONRPC_VERSION => request,
            Ok(request) => {
                warn!("Received unsupported jsonrpc version '{}'", request.jsonrpc);

                return Dispatch::Reply(JsonRpcResponse::error(
                    id_hint,
                    JsonRpcError::invalid_request(format!(
                        "jsonrpc must be \"{JSONRPC_VERSION}\""
                    )),
                ));
            }
            Err(e) => {
                warn!("Received invalid request: {e}");

                return Dispatch::Reply(JsonRpcResponse::error(
                    id_hint,
                    JsonRpcError::invalid_request(e),
                ));
            }
        };

        let Some(id) = request.id else {
            debug!("Received notification '{}'", request.method);

            return Dispatch::Silent;
        };

        debug!("Received request '{}'", request.method);

        match request.method.as_str() {
            "initialize" => Dispatch::Reply(JsonRpcResponse::result(
                id,
                self.initialize(request.params.as_ref()),
            )),
            "ping" => Dispatch::Reply(JsonRpcResponse::result(id, json!({}))),
            "tools/list" => Dispatch::Reply(JsonRpcResponse::result(
                id,
                json!({ "tools": self.tools.iter().map(|tool| tool.meta()).collect::<Vec<_>>() }),
            )),
            "tools/call" => match self.call_tool(request.params) {
                Ok(output) => Dispatch::Pending(Box::pin(async move {
                    let text = output.await;

                    JsonRpcResponse::result(
                        id,
                        json!({
                            "content": [{ "type": "text", "text": text }],
                            "isError": false,
                        }),
                    )
                })),
                Err(e) => {
                    warn!("Rejected tools/call: {e}");

                    Dispatch::Reply(JsonRpcResponse::error(id, e))
                }
            },
            method => {
                warn!("Received unknown method '{method}'");

                Dispatch::Reply(JsonRpcResponse::error(
                    id,
                    JsonRpcError::method_not_found(method),
                ))
            }
        }
    }

    fn initialize(&self, params: Option<&Value>) -> Value {
        let requested = params
            .and_then(|params| params.get("protocolVersion"))
            .and_then(Value::as_str);

        let protocol_version = match requested {
            Some(version) if SUPPORTED_PROTOCOL_VERSIONS.contains(&version) => version,
            _ => LATEST_PROTOCOL_VERSION,
        };

        json!({
            "protocolVersion": protocol_version,
            "capabilities": { "tools": { "listChanged": false } },
            "serverInfo": { "name": self.name, "version": self.version },
        })
    }

    fn call_tool(&self, params: Option<Value>) -> Result<BoxFuture<String>, JsonRpcError> {
        let params = serde_json::from_value::<CallToolParams>(params.unwrap_or(Value::Null))
            .map_err(|e| JsonRpcError::invalid_params(format!("Invalid tools/call params: {e}"), None))?;

        let tool = self
            .tools
            .iter()
            .find(|tool| tool.name() == params.name)
            .ok_or_else(|| JsonRpcError::invalid_params(format!("Unknown tool: {}", params.name), None))?;

        // Tools without arguments may be called with none at all.
        let arguments = match params.arguments {
            None | Some(Value::Null) => json!({}),
            Some(arguments) => arguments,
        };

        Arc::clone(tool).call(arguments)
    }
}

async fn write_responses<W>(
    mut writer: W,
    mut responses: mpsc::UnboundedReceiver<JsonRpcResponse>,
) -> AnyResult<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(response) = responses.recv().await {
        let mut frame = serde_json::to_vec(&response)?;
        frame.push(b'\n');

        writer.write_all(&frame).await?;
        writer.flush().await?;
    }

    writer.shutdown().await?;

    Ok(())
}

fn log_join_error(joined: Result<(), JoinError>) {
    if let Err(e) = joined {
        warn!("Tool call task failed: {e}");
    }
}
