//! Template source parsing.

use serde::{Serialize, Serializer};

/// One piece of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Text copied to the output as-is.
    Literal(String),
    /// A `{name}` token replaced by the variable of that name.
    Placeholder(String),
}

/// A prompt template, parsed once into literal and placeholder segments.
///
/// A placeholder is `{` + identifier + `}` where the identifier matches
/// `[A-Za-z_][A-Za-z0-9_]*`. `{{` and `}}` produce literal braces. Any other
/// brace is literal text, so JSON snippets inside prompts survive untouched.
///
/// ```rust
/// use cadre_config::Template;
///
/// let template = Template::parse("You are {role}. Reply as {\"role\": ...}");
/// assert_eq!(template.placeholders(), ["role"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
    placeholders: Vec<String>,
}

impl Template {
    /// Parses a template source string. Parsing never fails.
    pub fn parse(source: impl Into<String>) -> Self {
        let source = source.into();
        let segments = scan(&source);
        let mut placeholders: Vec<String> = Vec::new();
        for segment in &segments {
            if let Segment::Placeholder(name) = segment {
                if !placeholders.contains(name) {
                    placeholders.push(name.clone());
                }
            }
        }
        Self { source, segments, placeholders }
    }

    /// Builds one template from several, in order, as if their sources were
    /// written back to back.
    pub fn concat<'a>(parts: impl IntoIterator<Item = &'a Template>) -> Self {
        let source: String = parts.into_iter().map(|t| t.source.as_str()).collect();
        Self::parse(source)
    }

    /// The unparsed template text.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Distinct placeholder names in order of first appearance.
    pub fn placeholders(&self) -> &[String] {
        &self.placeholders
    }

    /// Returns `true` if the template references `name`.
    pub fn references(&self, name: &str) -> bool {
        self.placeholders.iter().any(|p| p == name)
    }
}

impl Serialize for Template {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source)
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn scan(source: &str) -> Vec<Segment> {
    let bytes = source.as_bytes();
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut pos = 0;
    let mut literal_start = 0;

    while pos < bytes.len() {
        match bytes[pos] {
            b'{' if bytes.get(pos + 1) == Some(&b'{') => {
                literal.push_str(&source[literal_start..pos]);
                literal.push('{');
                pos += 2;
                literal_start = pos;
            }
            b'}' if bytes.get(pos + 1) == Some(&b'}') => {
                literal.push_str(&source[literal_start..pos]);
                literal.push('}');
                pos += 2;
                literal_start = pos;
            }
            b'{' => {
                let name = source[pos + 1..]
                    .find('}')
                    .map(|len| &source[pos + 1..pos + 1 + len])
                    .filter(|name| is_identifier(name));

                let Some(name) = name else {
                    pos += 1;
                    continue;
                };

                literal.push_str(&source[literal_start..pos]);
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Placeholder(name.to_string()));
                pos += name.len() + 2;
                literal_start = pos;
            }
            _ => pos += 1,
        }
    }

    literal.push_str(&source[literal_start..]);
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(s: &str) -> Segment {
        Segment::Literal(s.to_string())
    }

    fn ph(s: &str) -> Segment {
        Segment::Placeholder(s.to_string())
    }

    #[test]
    fn test_parse_splits_literals_and_placeholders() {
        let template = Template::parse("You are {role}.\n{backstory}");
        assert_eq!(
            template.segments(),
            [lit("You are "), ph("role"), lit(".\n"), ph("backstory")]
        );
        assert_eq!(template.placeholders(), ["role", "backstory"]);
    }

    #[test]
    fn test_placeholders_are_deduplicated_in_order() {
        let template = Template::parse("{tool} then {tool_input} then {tool}");
        assert_eq!(template.placeholders(), ["tool", "tool_input"]);
    }

    #[test]
    fn test_double_braces_are_literal() {
        let template = Template::parse("{{input}} and {input}");
        assert_eq!(template.segments(), [lit("{input} and "), ph("input")]);
    }

    #[test]
    fn test_non_identifier_braces_are_literal() {
        let source = r#"Example: {"tool_name": "x"} and { spaced } and {1abc}"#;
        let template = Template::parse(source);
        assert!(template.placeholders().is_empty());
        assert_eq!(template.segments(), [lit(source)]);
    }

    #[test]
    fn test_unterminated_brace_is_literal() {
        let template = Template::parse("open {role and more");
        assert!(template.placeholders().is_empty());
        assert_eq!(template.segments(), [lit("open {role and more")]);
    }

    #[test]
    fn test_multibyte_text_survives() {
        let template = Template::parse("héllo {name} — ok");
        assert_eq!(template.segments(), [lit("héllo "), ph("name"), lit(" — ok")]);
    }

    #[test]
    fn test_empty_template() {
        let template = Template::parse("");
        assert!(template.segments().is_empty());
        assert!(template.placeholders().is_empty());
    }

    #[test]
    fn test_concat_joins_sources() {
        let a = Template::parse("You are {role}.");
        let b = Template::parse(" Task: {input}");
        let joined = Template::concat([&a, &b]);
        assert_eq!(joined.source(), "You are {role}. Task: {input}");
        assert_eq!(joined.placeholders(), ["role", "input"]);
    }
}
