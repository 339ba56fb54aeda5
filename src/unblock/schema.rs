//! JSON Schema helpers for MCP-compliant schemas.
//!
//! Generates standard JSON Schema without Rust-specific formats like "uint32"
//! that LLMs may not understand correctly.

use schemars::Schema;
use schemars::json_schema;

/// Optional unsigned integer schema: `{"type": ["integer", "null"], "minimum": 0}`
///
/// Use with `#[schemars(schema_with = "crate::unblock::schema::optional_uint")]`
/// on `Option<u32>` fields.
pub fn optional_uint(_generator: &mut schemars::SchemaGenerator) -> Schema {
    json_schema!({
        "type": ["integer", "null"],
        "minimum": 0
    })
}
