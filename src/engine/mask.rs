use crate::engine::scan::Span;

/// Markdown source with every extension span swapped for an inert sentinel.
///
/// A sentinel is `marker`, the decimal index of the span, `marker` again.
/// The marker is a private-use character absent from the input, so
/// every marker in the rendered HTML was put there by us. Markdown treats it
/// like a letter: it neither opens nor closes any inline construct.
///
/// Delimiter flanking depends on whether the characters around a `*` or `_`
/// are whitespace, punctuation or neither. Each sentinel is therefore
/// wrapped in stand-ins of the same class as the first and last characters
/// of the span it replaces.
#[derive(Debug)]
pub(crate) struct Masked {
    source: String,
    marker: char,
    spans: Vec<Span>,
    edges: Vec<Edges>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Edges {
    lead: Option<char>,
    trail: Option<char>,
}

impl Edges {
    fn of(raw: &str) -> Self {
        Edges {
            lead: raw.chars().next().and_then(stand_in),
            trail: raw.chars().next_back().and_then(stand_in),
        }
    }
}

impl Masked {
    pub fn new(src: &str, spans: Vec<Span>) -> Self {
        let marker = pick_marker(src);
        let mut source = String::with_capacity(src.len());
        let mut edges = Vec::with_capacity(spans.len());
        let mut last = 0;
        for (idx, span) in spans.iter().enumerate() {
            let edge = Edges::of(&span.token.raw);
            source.push_str(&src[last..span.range.start]);
            source.extend(edge.lead);
            source.push(marker);
            source.push_str(&idx.to_string());
            source.push(marker);
            source.extend(edge.trail);
            edges.push(edge);
            last = span.range.end;
        }
        source.push_str(&src[last..]);
        Masked {
            source,
            marker,
            spans,
            edges,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Replace every sentinel in `html` with its extension's rendering.
    pub fn restore(&self, html: &str) -> String {
        let width = self.marker.len_utf8();
        let mut out = String::with_capacity(html.len());
        let mut rest = html;
        while let Some(open) = rest.find(self.marker) {
            out.push_str(&rest[..open]);
            let after = &rest[open + width..];
            let digits = after
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(after.len());
            let idx = after[digits..]
                .starts_with(self.marker)
                .then(|| after[..digits].parse::<usize>().ok())
                .flatten()
                .filter(|&idx| idx < self.spans.len());
            if let Some(idx) = idx {
                let Edges { lead, trail } = self.edges[idx];
                let tail = &after[digits + width..];
                let wrapped = lead.is_none_or(|c| out.ends_with(c))
                    && trail.is_none_or(|c| tail.starts_with(c));
                if wrapped {
                    if lead.is_some() {
                        out.pop();
                    }
                    let span = &self.spans[idx];
                    out.push_str(&span.extension.render(&span.token));
                    rest = &tail[trail.map_or(0, char::len_utf8)..];
                    continue;
                }
            }
            out.push(self.marker);
            rest = after;
        }
        out.push_str(rest);
        out
    }
}

fn pick_marker(src: &str) -> char {
    ('\u{E000}'..='\u{F8FF}')
        .find(|c| !src.contains(*c))
        .unwrap_or('\u{E000}')
}

// Letters and digits need no stand-in: the marker already counts as one.
fn stand_in(c: char) -> Option<char> {
    if c.is_whitespace() {
        Some('\u{A0}')
    } else if c.is_alphanumeric() {
        None
    } else {
        Some('§')
    }
}
