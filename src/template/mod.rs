//! Template engine module for Mailroom.
//!
//! Provides a Handlebars-style template engine for rendering HTML pages.
//!
//! # Features
//!
//! - Variable expansion: `{{variable}}` (HTML-escaped)
//! - Conditionals: `{{#if condition}}...{{else}}...{{/if}}`
//! - Loops: `{{#each items}}...{{/each}}` or `{{#each items as item}}`
//! - Inverse conditionals: `{{#unless items}}...{{/unless}}`
//! - Escaping: `\{{` to output literal `{{`
//!
//! # Example
//!
//! ```
//! use mailroom::template::{TemplateEngine, TemplateContext, Value};
//!
//! let mut engine = TemplateEngine::new();
//! engine.load("greeting", "Hello, {{name}}!").unwrap();
//!
//! let mut context = TemplateContext::new();
//! context.set("name", Value::String("<World>".to_string()));
//!
//! let result = engine.render("greeting", &context).unwrap();
//! assert_eq!(result, "Hello, &lt;World&gt;!");
//! ```

mod loader;
mod parser;
mod renderer;

use std::collections::HashMap;

use thiserror::Error;

pub use loader::TemplateLoader;
pub use parser::{Node, Parser};
pub use renderer::Renderer;

/// Escape text for inclusion in HTML element content or attribute values.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Template-related errors.
#[derive(Error, Debug)]
pub enum TemplateError {
    /// Template not found.
    #[error("Template not found: {0}")]
    NotFound(String),

    /// Parse error.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Render error.
    #[error("Render error: {0}")]
    Render(String),
}

/// Result type for template operations.
pub type Result<T> = std::result::Result<T, TemplateError>;

/// A value that can be used in templates.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A string value.
    String(String),
    /// A numeric value.
    Number(i64),
    /// A boolean value.
    Bool(bool),
    /// A list of values.
    List(Vec<Value>),
    /// An object (key-value pairs).
    Object(HashMap<String, Value>),
    /// A null/empty value.
    Null,
}

impl Value {
    /// Convert the value to a string for display.
    pub fn to_display_string(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::List(_) => "[list]".to_string(),
            Value::Object(_) => "[object]".to_string(),
            Value::Null => "".to_string(),
        }
    }

    /// Check if the value is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::String(s) => !s.is_empty(),
            Value::Number(n) => *n != 0,
            Value::Bool(b) => *b,
            Value::List(l) => !l.is_empty(),
            Value::Object(o) => !o.is_empty(),
            Value::Null => false,
        }
    }

    /// Get a nested value by dot-separated path.
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut current = self;

        for part in path.split('.') {
            match current {
                Value::Object(map) => {
                    current = map.get(part)?;
                }
                Value::List(list) => {
                    let index: usize = part.parse().ok()?;
                    current = list.get(index)?;
                }
                _ => return None,
            }
        }

        Some(current)
    }

    /// Create a Value from a string.
    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    /// Create an object Value from key-value pairs.
    pub fn object<K, V, I>(items: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Value::Object(
            items
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::String(s.clone())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n)
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Number(n as i64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

/// Context for template rendering.
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    variables: HashMap<String, Value>,
}

impl TemplateContext {
    /// Create an empty template context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a variable in the context.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.variables.insert(name.into(), value.into());
    }

    /// Get a variable from the context.
    pub fn get(&self, name: &str) -> Option<&Value> {
        if let Some(value) = self.variables.get(name) {
            return Some(value);
        }

        // Dot-notation path lookup
        let (root, rest) = name.split_once('.')?;
        self.variables.get(root)?.get_path(rest)
    }

    /// Create a child context that inherits all variables.
    pub fn child(&self) -> Self {
        self.clone()
    }
}

/// Template engine for parsing and rendering templates.
#[derive(Debug, Default)]
pub struct TemplateEngine {
    templates: HashMap<String, Vec<Node>>,
}

impl TemplateEngine {
    /// Create a new template engine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a template from a string.
    pub fn load(&mut self, name: impl Into<String>, content: &str) -> Result<()> {
        let nodes = Parser::new(content).parse()?;
        self.templates.insert(name.into(), nodes);
        Ok(())
    }

    /// Render a template with the given context.
    pub fn render(&self, name: &str, context: &TemplateContext) -> Result<String> {
        let nodes = self
            .templates
            .get(name)
            .ok_or_else(|| TemplateError::NotFound(name.to_string()))?;

        Renderer::new(context).render(nodes)
    }

    /// Render a template string directly without loading.
    pub fn render_string(content: &str, context: &TemplateContext) -> Result<String> {
        let nodes = Parser::new(content).parse()?;
        Renderer::new(context).render(&nodes)
    }

    /// Check if a template is loaded.
    pub fn has_template(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_to_display_string() {
        assert_eq!(Value::string("hello").to_display_string(), "hello");
        assert_eq!(Value::Number(42).to_display_string(), "42");
        assert_eq!(Value::Bool(false).to_display_string(), "false");
        assert_eq!(Value::List(vec![]).to_display_string(), "[list]");
        assert_eq!(Value::Null.to_display_string(), "");
    }

    #[test]
    fn test_value_is_truthy() {
        assert!(Value::string("hello").is_truthy());
        assert!(!Value::string("").is_truthy());
        assert!(!Value::Number(0).is_truthy());
        assert!(Value::List(vec![Value::Number(1)]).is_truthy());
        assert!(!Value::List(vec![]).is_truthy());
        assert!(!Value::Null.is_truthy());
    }

    #[test]
    fn test_value_get_path() {
        let value = Value::object([(
            "mail",
            Value::object([("subject", Value::from("Hi")), ("id", Value::from(5i64))]),
        )]);

        assert_eq!(value.get_path("mail.subject"), Some(&Value::from("Hi")));
        assert_eq!(value.get_path("mail.id"), Some(&Value::Number(5)));
        assert_eq!(value.get_path("mail.missing"), None);
    }

    #[test]
    fn test_value_from_option() {
        let some: Value = Some("x").into();
        assert_eq!(some, Value::from("x"));

        let none: Value = Option::<i64>::None.into();
        assert_eq!(none, Value::Null);
    }

    #[test]
    fn test_context_get_nested() {
        let mut context = TemplateContext::new();
        context.set("user", Value::object([("name", "Bob")]));

        assert_eq!(context.get("user.name"), Some(&Value::from("Bob")));
        assert_eq!(context.get("user.missing"), None);
        assert_eq!(context.get("missing.name"), None);
    }

    #[test]
    fn test_context_child() {
        let mut context = TemplateContext::new();
        context.set("parent", "parent_value");

        let mut child = context.child();
        child.set("child", "child_value");

        assert_eq!(child.get("parent"), Some(&Value::from("parent_value")));
        assert_eq!(context.get("child"), None);
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_engine_load_and_render() {
        let mut engine = TemplateEngine::new();
        engine.load("test", "Hello, {{name}}!").unwrap();

        let mut context = TemplateContext::new();
        context.set("name", "World");

        assert_eq!(engine.render("test", &context).unwrap(), "Hello, World!");
        assert!(engine.has_template("test"));
    }

    #[test]
    fn test_engine_render_not_found() {
        let engine = TemplateEngine::new();
        let result = engine.render("missing", &TemplateContext::new());
        assert!(matches!(result, Err(TemplateError::NotFound(_))));
    }
}
