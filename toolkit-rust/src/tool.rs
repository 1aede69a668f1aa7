use {
    schemars::JsonSchema,
    serde::de::DeserializeOwned,
    serde_json::{json, Value},
    std::future::Future,
};

/// This trait defines the interface for a Tool. It forces implementation of
/// the following methods:
///
/// - `name`: Returns the name the Tool is invoked by.
/// - `description`: Returns a human-readable description of the Tool.
/// - `invoke`: Invokes the Tool with the given input.
///
/// And the following associated type:
///
/// - `Input`: The input type of the Tool.
///
/// Based on the provided methods and the associated type, the runtime
/// automatically answers `tools/list` with the Tool metadata and routes
/// `tools/call` requests carrying the Tool name to [`Tool::invoke`].
///
/// A Tool always answers with text. Failures that the caller should read about
/// (bad input values, upstream outages) are part of that text and never
/// surface as protocol errors.
pub trait Tool: Send + Sync + 'static {
    /// The input type of the Tool. It must implement `JsonSchema` and
    /// `DeserializeOwned`. It is used to generate the input schema of the Tool.
    /// It is also used to deserialize the call arguments.
    type Input: JsonSchema + DeserializeOwned + Send;
    /// Returns the name of the Tool. Names must be unique within a server.
    fn name() -> &'static str;
    /// Returns the description shown to the caller in `tools/list`.
    fn description() -> &'static str;
    /// Invokes the Tool with the given input. It is an asynchronous function
    /// that returns the text output of the Tool.
    fn invoke(&self, input: Self::Input) -> impl Future<Output = String> + Send;
    /// Returns the metadata of the Tool. It includes the name, description
    /// and input schema.
    ///
    /// It is used to answer `tools/list`.
    fn meta() -> Value {
        let mut input_schema = json!(schemars::schema_for!(Self::Input));

        // The meta-schema reference is noise for callers.
        if let Some(schema) = input_schema.as_object_mut() {
            schema.remove("$schema");
        }

        json!(
            {
                "name": Self::name(),
                "description": Self::description(),
                "inputSchema": input_schema,
            }
        )
    }
}
