//! Structural path queries: `tag`, `#id`, `[attr=value]` compounds joined by
//! `>` (child) or whitespace (descendant).

use std::{iter::Peekable, str::Chars};

use shared::{
    domain::ElementId,
    error::{ErrorCode, HostException},
};

use crate::document::ElementView;

/// Attributes whose values compare ASCII case-insensitively.
const CASELESS_ATTRIBUTES: &[&str] = &["type"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    attributes: Vec<(String, Option<String>)>,
}

impl Compound {
    fn is_empty(&self) -> bool {
        self.tag.is_none() && self.id.is_none() && self.attributes.is_empty()
    }

    fn matches(&self, element: &ElementView<'_>) -> bool {
        if let Some(tag) = &self.tag {
            if tag != "*" && !tag.eq_ignore_ascii_case(element.tag) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if element.attributes.get("id") != Some(id) {
                return false;
            }
        }
        self.attributes.iter().all(|(name, expected)| {
            match (element.attributes.get(name), expected) {
                (None, _) => false,
                (Some(_), None) => true,
                (Some(actual), Some(expected)) if CASELESS_ATTRIBUTES.contains(&name.as_str()) => {
                    actual.eq_ignore_ascii_case(expected)
                }
                (Some(actual), Some(expected)) => actual == expected,
            }
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Selector {
    /// Left to right; the combinator links a compound to the one before it.
    parts: Vec<(Combinator, Compound)>,
}

fn invalid(selector: &str, reason: &str) -> HostException {
    HostException::new(
        ErrorCode::InvalidSelector,
        format!("invalid selector '{selector}': {reason}"),
    )
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn take_ident(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut ident = String::new();
    while let Some(&c) = chars.peek() {
        if !is_ident_char(c) {
            break;
        }
        ident.push(c);
        chars.next();
    }
    ident
}

impl Selector {
    pub(crate) fn parse(input: &str) -> Result<Self, HostException> {
        let mut chars = input.chars().peekable();
        let mut parts: Vec<(Combinator, Compound)> = Vec::new();

        loop {
            let mut saw_space = false;
            while chars.peek().is_some_and(|c| c.is_whitespace()) {
                chars.next();
                saw_space = true;
            }
            let Some(&next) = chars.peek() else {
                break;
            };

            let combinator = if next == '>' {
                if parts.is_empty() {
                    return Err(invalid(input, "leading '>'"));
                }
                chars.next();
                while chars.peek().is_some_and(|c| c.is_whitespace()) {
                    chars.next();
                }
                Combinator::Child
            } else if parts.is_empty() || saw_space {
                Combinator::Descendant
            } else {
                return Err(invalid(input, "unexpected character"));
            };

            let compound = Self::parse_compound(input, &mut chars)?;
            if compound.is_empty() {
                return Err(invalid(input, "empty compound selector"));
            }
            parts.push((combinator, compound));
        }

        if parts.is_empty() {
            return Err(invalid(input, "empty selector"));
        }
        Ok(Self { parts })
    }

    fn parse_compound(
        input: &str,
        chars: &mut Peekable<Chars<'_>>,
    ) -> Result<Compound, HostException> {
        let mut compound = Compound::default();

        if chars.peek() == Some(&'*') {
            chars.next();
            compound.tag = Some("*".into());
        } else {
            let tag = take_ident(chars);
            if !tag.is_empty() {
                compound.tag = Some(tag);
            }
        }

        while let Some(&c) = chars.peek() {
            match c {
                '#' => {
                    chars.next();
                    let id = take_ident(chars);
                    if id.is_empty() || compound.id.is_some() {
                        return Err(invalid(input, "bad id selector"));
                    }
                    compound.id = Some(id);
                }
                '[' => {
                    chars.next();
                    compound.attributes.push(Self::parse_attribute(input, chars)?);
                }
                _ => break,
            }
        }

        Ok(compound)
    }

    fn parse_attribute(
        input: &str,
        chars: &mut Peekable<Chars<'_>>,
    ) -> Result<(String, Option<String>), HostException> {
        let name = take_ident(chars).to_ascii_lowercase();
        if name.is_empty() {
            return Err(invalid(input, "missing attribute name"));
        }

        match chars.next() {
            Some(']') => return Ok((name, None)),
            Some('=') => {}
            _ => return Err(invalid(input, "expected '=' or ']'")),
        }

        let value = match chars.peek() {
            Some(&quote) if quote == '"' || quote == '\'' => {
                chars.next();
                let mut value = String::new();
                loop {
                    match chars.next() {
                        Some(c) if c == quote => break,
                        Some(c) => value.push(c),
                        None => return Err(invalid(input, "unterminated string")),
                    }
                }
                value
            }
            _ => take_ident(chars),
        };

        if chars.next() != Some(']') {
            return Err(invalid(input, "expected ']'"));
        }
        Ok((name, Some(value)))
    }

    /// Matches right to left, walking ancestors through `lookup`.
    pub(crate) fn matches<'a>(
        &self,
        id: ElementId,
        lookup: &dyn Fn(ElementId) -> Option<ElementView<'a>>,
    ) -> bool {
        self.matches_from(self.parts.len() - 1, id, lookup)
    }

    fn matches_from<'a>(
        &self,
        index: usize,
        id: ElementId,
        lookup: &dyn Fn(ElementId) -> Option<ElementView<'a>>,
    ) -> bool {
        let Some(element) = lookup(id) else {
            return false;
        };
        let (combinator, compound) = &self.parts[index];
        if !compound.matches(&element) {
            return false;
        }
        if index == 0 {
            return true;
        }

        match combinator {
            Combinator::Child => element
                .parent
                .is_some_and(|parent| self.matches_from(index - 1, parent, lookup)),
            Combinator::Descendant => {
                let mut ancestor = element.parent;
                while let Some(candidate) = ancestor {
                    if self.matches_from(index - 1, candidate, lookup) {
                        return true;
                    }
                    ancestor = lookup(candidate).and_then(|view| view.parent);
                }
                false
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/selector_tests.rs"]
mod tests;
