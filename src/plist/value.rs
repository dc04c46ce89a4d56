//! Typed plist values.
//!
//! The closed set of value shapes a launchd agent plist uses. Each variant
//! knows its nested markup shape; rendering dispatches over the tag in one
//! place rather than through an open-ended node hierarchy.

/// A plist value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A single string, e.g. `Label` or `WorkingDirectory`.
    String(String),
    /// A single integer, e.g. `StartInterval` or `ExitTimeOut`.
    Integer(i64),
    /// An array of strings, e.g. `ProgramArguments`.
    StringArray(Vec<String>),
    /// A dict of string values, e.g. `EnvironmentVariables`.
    StringMap(Vec<(String, String)>),
    /// An array of integer dicts, e.g. `StartCalendarInterval`.
    IntegerMapArray(Vec<Vec<(String, i64)>>),
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<Vec<String>> for Value {
    fn from(items: Vec<String>) -> Self {
        Value::StringArray(items)
    }
}
