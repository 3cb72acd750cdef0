//! JSON dumps for the driver: the parsed tree and the final global state.

use crate::language::ast::Program;
use crate::runtime::value::Value;
use serde_json::{json, Value as Json};
use std::collections::BTreeMap;

/// Generic tag + fields object per node; lists recursed element-wise,
/// primitives passed through.
pub fn ast_json(program: &Program) -> Json {
    json!({
        "node": "Program",
        "statements": program.statements,
    })
}

/// Final global state after execution. Channels are rendered as a marker
/// object with their pending value count.
pub fn state_json(snapshot: &BTreeMap<String, Value>) -> Json {
    let mut map = serde_json::Map::new();
    for (name, value) in snapshot {
        let rendered = match value {
            Value::Int(value) => json!(value),
            Value::Chan(chan) => json!({
                "type": "channel",
                "pending": chan.len(),
            }),
        };
        map.insert(name.clone(), rendered);
    }
    Json::Object(map)
}
