//! CloudFormation schema lookup tool.
//!
//! Lets the model check which properties a resource type really has instead
//! of guessing. Informal names work: `"s3 bucket"` finds `AWS::S3::Bucket`.

use async_trait::async_trait;
use stackwright_core::error::ToolError;
use stackwright_core::tool::{Tool, ToolResult};
use stackwright_schema::SchemaIndexHandle;
use tracing::debug;

pub const TOOL_NAME: &str = "get_cloudformation_schema";

/// Looks resource types up in the schema corpus.
///
/// The index behind the handle is built on the first call if it was not
/// built already; lookups then run on the blocking pool because they read
/// from disk.
pub struct SchemaLookupTool {
    index: SchemaIndexHandle,
}

impl SchemaLookupTool {
    pub fn new(index: SchemaIndexHandle) -> Self {
        Self { index }
    }
}

#[async_trait]
impl Tool for SchemaLookupTool {
    fn name(&self) -> &str {
        TOOL_NAME
    }

    fn description(&self) -> &str {
        "Get the CloudFormation schema definition of a resource type. Use it to verify which \
         properties a resource supports before writing it into a template. Accepts the full \
         type name (AWS::S3::Bucket) or an informal one (s3 bucket)."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "type_name": {
                    "type": "string",
                    "description": "The resource type to look up, e.g. AWS::EC2::Instance or \"lambda function\""
                }
            },
            "required": ["type_name"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let query = arguments["type_name"]
            .as_str()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'type_name' argument".into()))?
            .to_string();

        let index = self.index.clone();
        let lookup = query.clone();
        let result = tokio::task::spawn_blocking(move || index.get().lookup(&lookup))
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: TOOL_NAME.into(),
                reason: e.to_string(),
            })?;

        debug!(query = %query, found = result.found, bytes = result.text.len(), "Schema lookup");

        Ok(ToolResult {
            success: result.found,
            output: result.text,
        })
    }
}
