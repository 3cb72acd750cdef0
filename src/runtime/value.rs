use crate::runtime::channel::Channel;

/// Runtime values are untyped; numbers by default, with channels living in
/// the same global namespace as variables.
#[derive(Clone, Debug)]
pub enum Value {
    Int(i64),
    Chan(Channel),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Chan(_) => "channel",
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(value) => Some(*value),
            Value::Chan(_) => None,
        }
    }
}
