//! Prompt templates and `{placeholder}` substitution.

use botloom_core::error::PromptError;

/// Section templates used by the assembler.
///
/// Placeholders: `{name}` and `{persona}` (system), `{context}`,
/// `{business}`, `{history}`, `{message}` (user).
#[derive(Debug, Clone, PartialEq)]
pub struct PromptTemplates {
    pub system: String,
    pub context: String,
    pub business: String,
    pub history: String,
    pub user: String,
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self {
            system: "system: You are {name}, a {persona} assistant for a conversational bot platform.\n\
                     You help people with questions about their account, products and services.\n\
                     \n\
                     Guidelines:\n\
                     - Be accurate and concise\n\
                     - Use the provided context when it is relevant\n\
                     - Say so when you do not know the answer\n\
                     - Never invent account details"
                .into(),
            context: "Relevant context:\n{context}".into(),
            business: "Account information:\n{business}".into(),
            history: "Recent conversation:\n{history}".into(),
            user: "user: {message}".into(),
        }
    }
}

/// Replace every `{key}` in `template` with its value.
///
/// Only the template is scanned; substituted values are inserted verbatim,
/// so braces inside user text are harmless.
pub fn render(template: &str, values: &[(&str, &str)]) -> Result<String, PromptError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let close = after.find('}').ok_or_else(|| PromptError::UnclosedPlaceholder {
            template: template.to_string(),
        })?;
        let key = &after[..close];
        let value = values
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| *v)
            .ok_or_else(|| PromptError::UnknownPlaceholder {
                template: template.to_string(),
                placeholder: key.to_string(),
            })?;
        out.push_str(value);
        rest = &after[close + 1..];
    }

    out.push_str(rest);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_all_occurrences() {
        let out = render("{a} and {b} and {a}", &[("a", "x"), ("b", "y")]).unwrap();
        assert_eq!(out, "x and y and x");
    }

    #[test]
    fn values_are_not_rescanned() {
        let out = render("user: {message}", &[("message", "what is {this}?")]).unwrap();
        assert_eq!(out, "user: what is {this}?");
    }

    #[test]
    fn unclosed_placeholder_is_an_error() {
        assert!(matches!(
            render("hello {name", &[("name", "x")]),
            Err(PromptError::UnclosedPlaceholder { .. })
        ));
    }

    #[test]
    fn unknown_placeholder_is_an_error() {
        match render("hello {who}", &[("name", "x")]) {
            Err(PromptError::UnknownPlaceholder { placeholder, .. }) => assert_eq!(placeholder, "who"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn default_templates_render_with_their_keys() {
        let t = PromptTemplates::default();
        let system = render(&t.system, &[("name", "Ada"), ("persona", "calm")]).unwrap();
        assert!(system.starts_with("system: You are Ada, a calm assistant"));
        assert!(render(&t.user, &[("message", "hi")]).unwrap().ends_with("hi"));
    }
}
