//! Line tokenizer for LLM responses.

/// The fixed markers of the response grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    UseTool,
    Result,
    FinalAnswer,
}

impl Marker {
    pub const ALL: [Marker; 3] = [Marker::UseTool, Marker::Result, Marker::FinalAnswer];

    /// The literal text of the marker, colon included.
    pub const fn text(self) -> &'static str {
        match self {
            Marker::UseTool => "Use Tool:",
            Marker::Result => "Result:",
            Marker::FinalAnswer => "Final Answer:",
        }
    }
}

/// A piece of a response: either a marker with the text following it on the
/// same line, or a plain line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    Marker { marker: Marker, rest: &'a str, line: usize },
    Text { text: &'a str, line: usize },
}

/// Splits `raw` into tokens, one per line except that a `Result:` written on
/// the `Use Tool:` line becomes its own token.
///
/// Markers count only at the start of a line, after leading whitespace.
pub fn tokenize(raw: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    for (line, text) in raw.lines().enumerate() {
        let trimmed = text.trim_start();
        let Some(marker) = Marker::ALL.into_iter().find(|m| trimmed.starts_with(m.text())) else {
            tokens.push(Token::Text { text, line });
            continue;
        };

        let rest = &trimmed[marker.text().len()..];
        if marker != Marker::UseTool {
            tokens.push(Token::Marker { marker, rest, line });
            continue;
        }

        match inline_result(rest) {
            Some(idx) => {
                let head = rest[..idx].trim_end();
                let head = head.strip_suffix(',').unwrap_or(head);
                tokens.push(Token::Marker { marker, rest: head, line });
                tokens.push(Token::Marker {
                    marker: Marker::Result,
                    rest: &rest[idx + Marker::Result.text().len()..],
                    line,
                });
            }
            None => tokens.push(Token::Marker { marker, rest, line }),
        }
    }
    tokens
}

/// Byte offset of a `Result:` written on the tool line.
///
/// The marker must open the text or follow whitespace or the `,` separator,
/// so words such as `KeyResult:` stay part of the tool input.
fn inline_result(rest: &str) -> Option<usize> {
    rest.match_indices(Marker::Result.text())
        .map(|(idx, _)| idx)
        .find(|&idx| {
            rest[..idx]
                .chars()
                .next_back()
                .map_or(true, |c| c == ',' || c.is_whitespace())
        })
}
