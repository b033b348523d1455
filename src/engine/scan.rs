use std::ops::Range;
use std::sync::Arc;

use pulldown_cmark::{Event, LinkType, Options, Parser, Tag};
use tracing::trace;

use crate::Result;
use crate::engine::extension::{Extensions, InlineExtension, Token};

/// A source range claimed by an inline extension.
#[derive(Debug)]
pub(crate) struct Span {
    pub range: Range<usize>,
    pub extension: Arc<dyn InlineExtension>,
    pub token: Token,
}

/// Locate extension tokens in `src`.
///
/// The source is parsed once with offsets so that rules are only tried
/// where the inline lexer is looking at plain text. Within a text run the
/// engine follows the hint-then-attempt convention: jump to the smallest
/// start hint, try every extension at exactly that position, and advance by
/// one character when none matches. Returned spans are ordered and disjoint.
pub(crate) fn scan(src: &str, options: Options, extensions: &Extensions) -> Result<Vec<Span>> {
    // A simple stack frame used while walking Start/End pairs.
    struct Frame {
        // end of the element's content; a match may not run past it
        end: usize,
        // code, html, metadata and autolinks never see extension rules
        opaque: bool,
        tokens: Vec<Token>,
    }

    let events: Vec<_> = Parser::new_ext(src, options).into_offset_iter().collect();
    let ends = content_ends(&events);

    let mut stack: Vec<Frame> = Vec::new();
    let mut spans: Vec<Span> = Vec::new();
    let mut consumed = 0;

    for (i, (event, range)) in events.iter().enumerate() {
        match event {
            Event::Start(tag) => {
                let opaque = stack.last().is_some_and(|f| f.opaque) || is_opaque(tag);
                stack.push(Frame {
                    end: ends[i],
                    opaque,
                    tokens: Vec::new(),
                });
            }
            Event::End(_) => {
                stack.pop();
            }
            Event::Text(_) => {
                let Some(frame) = stack.last_mut() else {
                    continue;
                };
                if frame.opaque {
                    continue;
                }
                let mut cursor = range.start.max(consumed);
                while cursor < range.end {
                    let Some(rest) = src.get(cursor..frame.end) else {
                        break;
                    };
                    let Some(offset) = extensions.next_start(rest) else {
                        break;
                    };
                    let at = cursor + offset;
                    if at >= range.end {
                        break;
                    }
                    if is_escaped(src, at) {
                        cursor = next_char(src, at);
                        continue;
                    }
                    match extensions.tokenize(&src[at..frame.end], &frame.tokens)? {
                        Some((extension, token)) => {
                            let end = at + token.raw.len();
                            trace!(
                                extension = extension.name(),
                                raw = %token.raw,
                                at,
                                "matched inline token"
                            );
                            frame.tokens.push(token.clone());
                            spans.push(Span {
                                range: at..end,
                                extension,
                                token,
                            });
                            cursor = end;
                            consumed = end;
                        }
                        None => cursor = next_char(src, at),
                    }
                }
            }
            _ => {}
        }
    }

    Ok(spans)
}

/// Where the content of the container opened at each event index ends.
///
/// For most containers that is the end of the element. Links and images
/// stop at the end of their last child, so a match in the link text can
/// never reach the destination or the title.
fn content_ends(events: &[(Event<'_>, Range<usize>)]) -> Vec<usize> {
    let mut ends: Vec<usize> = events.iter().map(|(_, range)| range.end).collect();
    // (index of the Start event, furthest child end seen so far)
    let mut open: Vec<(usize, usize)> = Vec::new();
    for (i, (event, range)) in events.iter().enumerate() {
        if let Event::End(_) = event {
            if let Some((start, last)) = open.pop() {
                if let (Event::Start(Tag::Link { .. } | Tag::Image { .. }), _) = &events[start] {
                    ends[start] = last;
                }
            }
        }
        if let Some((_, last)) = open.last_mut() {
            *last = (*last).max(range.end);
        }
        if let Event::Start(_) = event {
            open.push((i, range.start));
        }
    }
    ends
}

fn is_opaque(tag: &Tag) -> bool {
    matches!(
        tag,
        Tag::CodeBlock(_)
            | Tag::HtmlBlock
            | Tag::MetadataBlock(_)
            | Tag::Link {
                link_type: LinkType::Autolink | LinkType::Email,
                ..
            }
    )
}

/// Whether the character at `at` is preceded by an odd run of backslashes.
fn is_escaped(src: &str, at: usize) -> bool {
    src.as_bytes()[..at]
        .iter()
        .rev()
        .take_while(|&&b| b == b'\\')
        .count()
        % 2
        == 1
}

fn next_char(src: &str, at: usize) -> usize {
    at + src[at..].chars().next().map_or(1, char::len_utf8)
}
