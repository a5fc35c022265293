use crate::context::Context;
use crate::error::TemplateError;

/// Resolve `{placeholder}` references against `context`.
///
/// `{{` and `}}` produce literal braces. Substituted values are inserted
/// verbatim and never re-scanned.
pub fn interpolate(template: &str, context: &Context) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '{' => {
                let mut key = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some('{') => {
                            return Err(TemplateError::Render(format!(
                                "unexpected '{{' inside placeholder in {template:?}"
                            )));
                        }
                        Some(c) => key.push(c),
                        None => {
                            return Err(TemplateError::Render(format!(
                                "unclosed placeholder in {template:?}"
                            )));
                        }
                    }
                }
                let key = key.trim();
                if key.is_empty() {
                    return Err(TemplateError::Render(format!(
                        "empty placeholder in {template:?}"
                    )));
                }
                let value = context.get(key).ok_or_else(|| {
                    TemplateError::Render(format!("undefined placeholder {{{key}}}"))
                })?;
                out.push_str(value);
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '}' => {
                return Err(TemplateError::Render(format!(
                    "single '}}' encountered in {template:?}"
                )));
            }
            other => out.push(other),
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> Context {
        let mut context = Context::new();
        context.insert("username", "alice");
        context.insert("port", 465);
        context
    }

    #[test]
    fn substitutes_known_keys() {
        assert_eq!(interpolate("Hello {username}", &ctx()).unwrap(), "Hello alice");
        assert_eq!(
            interpolate("{username}:{port}", &ctx()).unwrap(),
            "alice:465"
        );
    }

    #[test]
    fn undefined_key_is_an_error_not_a_literal() {
        let err = interpolate("Hello {missing}", &ctx()).unwrap_err();
        assert!(matches!(err, TemplateError::Render(_)));
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn doubled_braces_are_literals() {
        assert_eq!(
            interpolate("a {{b}} {username}", &ctx()).unwrap(),
            "a {b} alice"
        );
    }

    #[test]
    fn unbalanced_braces_fail() {
        assert!(interpolate("oops {username", &ctx()).is_err());
        assert!(interpolate("oops }", &ctx()).is_err());
        assert!(interpolate("empty {}", &ctx()).is_err());
    }

    #[test]
    fn substituted_values_are_not_rescanned() {
        let mut context = Context::new();
        context.insert("trace", "fn main() { {oops} }");
        assert_eq!(
            interpolate("{trace}", &context).unwrap(),
            "fn main() { {oops} }"
        );
    }
}
