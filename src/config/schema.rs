use serde_json::{json, Value};
use std::sync::LazyLock;

pub static CONFIG_SCHEMA: LazyLock<Value> = LazyLock::new(|| {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "type": "object",
        "additionalProperties": false,
        "properties": {
            "engine": {
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "concurrency": { "type": "integer", "minimum": 1 },
                    "timeout_secs": { "type": "number", "exclusiveMinimum": 0 },
                    "retries": { "type": "integer", "minimum": 0 },
                    "backoff_secs": { "type": "number", "minimum": 0 },
                    "delay_secs": { "type": "number", "minimum": 0 }
                }
            },
            "http": {
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "user_agent": { "type": "string" },
                    "headers": {
                        "type": "object",
                        "additionalProperties": { "type": "string" }
                    },
                    "max_redirects": { "type": "integer", "minimum": 0 },
                    "danger_accept_invalid_certs": { "type": "boolean" }
                }
            },
            "detection": {
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "len_threshold_pct": { "type": "number", "minimum": 0 }
                }
            },
            "output": {
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "directory": { "type": "string" },
                    "formats": {
                        "type": "array",
                        "items": { "type": "string", "enum": ["json", "csv"] }
                    }
                }
            }
        }
    })
});
