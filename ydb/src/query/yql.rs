use std::collections::BTreeMap;
use std::fmt;

use crate::errors::{ClientError, Error};
use crate::value::{ToValue, Value};

/// A query fragment emitted verbatim, bypassing parameterization. Used for
/// identifiers and other positions where parameters are not allowed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnsafeString(pub String);

impl fmt::Display for UnsafeString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UnsafeString {
    fn from(s: &str) -> Self {
        UnsafeString(s.to_string())
    }
}

impl From<String> for UnsafeString {
    fn from(s: String) -> Self {
        UnsafeString(s)
    }
}

/// Wraps a name in backticks, doubling embedded backticks.
pub fn identifier(name: &str) -> UnsafeString {
    UnsafeString(format!("`{}`", name.replace('`', "``")))
}

/// A query text with its bound parameters. Parameter names carry the
/// leading `$`.
#[derive(Clone, Debug, PartialEq)]
pub struct Statement {
    pub text: String,
    pub params: BTreeMap<String, Value>,
}

impl Statement {
    pub fn new<T: Into<String>>(text: T) -> Statement {
        Statement {
            text: text.into(),
            params: BTreeMap::new(),
        }
    }

    /// Binds a named parameter. The name may be given with or without the
    /// leading `$`.
    pub fn add_param<T>(&mut self, name: &str, value: &T)
    where
        T: ToValue,
    {
        let key = if name.starts_with('$') {
            name.to_string()
        } else {
            format!("${name}")
        };
        self.params.insert(key, value.to_value());
    }
}

impl From<&str> for Statement {
    fn from(text: &str) -> Self {
        Statement::new(text)
    }
}

impl From<String> for Statement {
    fn from(text: String) -> Self {
        Statement::new(text)
    }
}

/// Builds a statement from text pieces and interpolated values. Every bound
/// value becomes a `$pN` parameter where `N` counts only bound positions;
/// unsafe fragments are spliced verbatim.
#[derive(Default)]
pub struct Yql {
    text: String,
    params: BTreeMap<String, Value>,
    next_param: usize,
    error: Option<ClientError>,
}

impl Yql {
    pub fn new() -> Yql {
        Yql::default()
    }

    /// Appends literal query text.
    pub fn push(mut self, text: &str) -> Yql {
        self.text.push_str(text);
        self
    }

    /// Appends an unsafe fragment verbatim. Does not advance the parameter
    /// index.
    pub fn splice(mut self, fragment: &UnsafeString) -> Yql {
        self.text.push_str(&fragment.0);
        self
    }

    /// Binds a value as the next positional parameter. A bare Null is
    /// rejected at build time; nullable cells take an Optional value.
    pub fn bind<T>(mut self, value: &T) -> Yql
    where
        T: ToValue,
    {
        let position = self.next_param;
        self.next_param += 1;
        let value = value.to_value();
        if value == Value::Null {
            self.error.get_or_insert(ClientError::Yql(format!(
                "interpolated value at position {position} is null; use an Optional value for nullable cells"
            )));
            return self;
        }
        let key = format!("$p{position}");
        self.text.push_str(&key);
        self.params.insert(key, value);
        self
    }

    pub fn build(self) -> Result<Statement, Error> {
        if let Some(error) = self.error {
            return Err(error.into());
        }
        Ok(Statement {
            text: self.text,
            params: self.params,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_inference() {
        let statement = Yql::new()
            .push("SELECT ")
            .bind(&true)
            .push(", ")
            .bind(&"hello")
            .push(", ")
            .bind(&123i32)
            .push(", ")
            .bind(&123i64)
            .build()
            .unwrap();

        assert_eq!(statement.text, "SELECT $p0, $p1, $p2, $p3");
        assert_eq!(statement.params["$p0"], Value::Bool(true));
        assert_eq!(statement.params["$p1"], Value::Text("hello".to_string()));
        assert_eq!(statement.params["$p2"], Value::Int32(123));
        assert_eq!(statement.params["$p3"], Value::Int64(123));
    }

    #[test]
    fn test_unsafe_fragment_not_counted() {
        let statement = Yql::new()
            .push("SELECT ")
            .bind(&1i32)
            .push(" FROM ")
            .splice(&identifier("my_table"))
            .push(" WHERE id = ")
            .bind(&2i32)
            .build()
            .unwrap();

        assert_eq!(statement.text, "SELECT $p0 FROM `my_table` WHERE id = $p1");
        assert_eq!(statement.params.len(), 2);
    }

    #[test]
    fn test_typed_value_passes_through() {
        let statement = Yql::new()
            .push("SELECT ")
            .bind(&Value::Uint8(7))
            .build()
            .unwrap();
        assert_eq!(statement.params["$p0"], Value::Uint8(7));
    }

    #[test]
    fn test_bare_null_is_rejected_with_position() {
        let err = Yql::new()
            .push("SELECT ")
            .bind(&1i32)
            .push(", ")
            .bind(&Value::Null)
            .build()
            .unwrap_err();
        match err {
            Error::Client(ClientError::Yql(message)) => {
                assert!(message.contains("position 1"), "{message}");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_optional_null_is_accepted() {
        let statement = Yql::new()
            .push("SELECT ")
            .bind(&Option::<i32>::None)
            .build()
            .unwrap();
        assert_eq!(
            statement.params["$p0"],
            Value::optional_none(crate::value::Type::Int32)
        );
    }

    #[test]
    fn test_identifier_escaping() {
        assert_eq!(identifier("a`b").0, "`a``b`");
        assert_eq!(identifier("plain").0, "`plain`");
    }

    #[test]
    fn test_statement_add_param() {
        let mut statement = Statement::new("SELECT $id");
        statement.add_param("id", &7i64);
        statement.add_param("$name", &"x");
        assert_eq!(statement.params["$id"], Value::Int64(7));
        assert_eq!(statement.params["$name"], Value::Text("x".to_string()));
    }
}
