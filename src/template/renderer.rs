//! Template renderer module.
//!
//! Renders parsed template nodes with the given context.

use super::parser::Node;
use super::{escape_html, Result, TemplateContext, TemplateError, Value};

/// Template renderer.
pub struct Renderer<'a> {
    context: &'a TemplateContext,
}

impl<'a> Renderer<'a> {
    /// Create a new renderer with the given context.
    pub fn new(context: &'a TemplateContext) -> Self {
        Self { context }
    }

    /// Render a list of nodes to a string.
    pub fn render(&self, nodes: &[Node]) -> Result<String> {
        let mut output = String::new();

        for node in nodes {
            output.push_str(&self.render_node(node)?);
        }

        Ok(output)
    }

    fn render_node(&self, node: &Node) -> Result<String> {
        match node {
            Node::Text(text) => Ok(text.clone()),
            Node::Variable(name) => Ok(escape_html(&self.lookup(name))),
            Node::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.is_truthy(condition) {
                    self.render(then_branch)
                } else {
                    self.render(else_branch)
                }
            }
            Node::Each {
                variable,
                item_name,
                body,
            } => self.render_each(variable, item_name.as_deref(), body),
            Node::Unless { condition, body } => {
                if self.is_truthy(condition) {
                    Ok(String::new())
                } else {
                    self.render(body)
                }
            }
        }
    }

    /// Missing variables render as empty strings.
    fn lookup(&self, name: &str) -> String {
        self.context
            .get(name)
            .map(|v| v.to_display_string())
            .unwrap_or_default()
    }

    fn is_truthy(&self, name: &str) -> bool {
        self.context.get(name).is_some_and(Value::is_truthy)
    }

    fn render_each(&self, variable: &str, item_name: Option<&str>, body: &[Node]) -> Result<String> {
        let list = match self.context.get(variable) {
            Some(Value::List(items)) => items,
            Some(Value::Null) | None => return Ok(String::new()),
            Some(_) => {
                return Err(TemplateError::Render(format!("'{variable}' is not a list")));
            }
        };

        let mut output = String::new();
        let item_var_name = item_name.unwrap_or("this");

        for (index, item) in list.iter().enumerate() {
            let mut child_context = self.context.child();
            child_context.set(item_var_name, item.clone());
            child_context.set("@index", Value::Number(index as i64));
            child_context.set("@first", index == 0);
            child_context.set("@last", index == list.len() - 1);

            if item_name.is_none() {
                if let Value::Object(obj) = item {
                    for (key, value) in obj {
                        child_context.set(key.clone(), value.clone());
                    }
                }
            }

            output.push_str(&Renderer::new(&child_context).render(body)?);
        }

        Ok(output)
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::Parser;

    fn render(template: &str, context: &TemplateContext) -> String {
        let nodes = Parser::new(template).parse().unwrap();
        Renderer::new(context).render(&nodes).unwrap()
    }

    #[test]
    fn test_render_variable_escapes_html() {
        let mut context = TemplateContext::new();
        context.set("subject", "<script>alert('x')</script>");

        assert_eq!(
            render("{{subject}}", &context),
            "&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"
        );
    }

    #[test]
    fn test_render_missing_variable() {
        let context = TemplateContext::new();
        assert_eq!(render("[{{missing}}]", &context), "[]");
    }

    #[test]
    fn test_render_if_else() {
        let mut context = TemplateContext::new();
        context.set("message", "");
        assert_eq!(render("{{#if message}}yes{{else}}no{{/if}}", &context), "no");

        context.set("message", "bob\t404 Not Found");
        assert_eq!(render("{{#if message}}yes{{else}}no{{/if}}", &context), "yes");
    }

    #[test]
    fn test_render_unless() {
        let mut context = TemplateContext::new();
        context.set("contacts", Value::List(vec![]));
        assert_eq!(render("{{#unless contacts}}none{{/unless}}", &context), "none");
    }

    #[test]
    fn test_render_each_with_object_fields() {
        let mut context = TemplateContext::new();
        context.set(
            "contacts",
            vec![
                Value::object([("name", "Alice")]),
                Value::object([("name", "Bob")]),
            ],
        );

        assert_eq!(
            render("{{#each contacts}}{{@index}}:{{name}} {{/each}}", &context),
            "0:Alice 1:Bob "
        );
        assert_eq!(
            render("{{#each contacts as c}}{{c.name}}{{#unless @last}},{{/unless}}{{/each}}", &context),
            "Alice,Bob"
        );
    }

    #[test]
    fn test_render_each_not_a_list() {
        let mut context = TemplateContext::new();
        context.set("tags", "oops");

        let nodes = Parser::new("{{#each tags}}x{{/each}}").parse().unwrap();
        let result = Renderer::new(&context).render(&nodes);
        assert!(matches!(result, Err(TemplateError::Render(_))));
    }
}
