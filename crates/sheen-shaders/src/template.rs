//! Shader templates with named insertion slots.
//!
//! A template is GLSL source in which whole lines of the form
//!
//! ```glsl
//! #pragma sheen_slot fragment_main
//! ```
//!
//! mark places where callers may inject code. Templates are parsed once into
//! text segments and slots; slot names resolve through a lookup table, so a
//! fill aimed at a slot the template does not have is an error instead of a
//! silently malformed shader. Unknown pragmas are ignored by GLSL compilers,
//! which keeps the raw templates compilable on their own.

use hashbrown::HashMap;

use crate::error::{Result, ShaderError};

/// Line prefix that declares a slot.
pub const SLOT_PRAGMA: &str = "#pragma sheen_slot";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Slot(String),
}

/// Parsed shader template.
#[derive(Debug, Clone)]
pub struct ShaderTemplate {
    name: String,
    segments: Vec<Segment>,
    /// Slot name -> index into `segments`.
    slots: HashMap<String, usize>,
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl ShaderTemplate {
    /// Parse `source`; `name` is only used in error messages.
    pub fn parse(name: impl Into<String>, source: &str) -> Result<Self> {
        let name = name.into();
        let mut segments = Vec::new();
        let mut slots = HashMap::new();
        let mut text = String::new();

        for (index, line) in source.split_inclusive('\n').enumerate() {
            let Some(rest) = line.trim().strip_prefix(SLOT_PRAGMA) else {
                text.push_str(line);
                continue;
            };
            let slot = rest.trim();
            if !rest.starts_with(char::is_whitespace) || !is_identifier(slot) {
                return Err(ShaderError::MalformedSlot {
                    template: name,
                    line: index + 1,
                });
            }
            if slots.contains_key(slot) {
                return Err(ShaderError::DuplicateSlot {
                    template: name,
                    slot: slot.to_string(),
                });
            }
            if !text.is_empty() {
                segments.push(Segment::Text(std::mem::take(&mut text)));
            }
            slots.insert(slot.to_string(), segments.len());
            segments.push(Segment::Slot(slot.to_string()));
        }
        if !text.is_empty() {
            segments.push(Segment::Text(text));
        }

        Ok(Self {
            name,
            segments,
            slots,
        })
    }

    /// Template name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Slot names in declaration order.
    pub fn slots(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Slot(name) => Some(name.as_str()),
            Segment::Text(_) => None,
        })
    }

    /// Returns `true` if the template declares `slot`.
    pub fn has_slot(&self, slot: &str) -> bool {
        self.slots.contains_key(slot)
    }

    /// Render the template, splicing each fill into its slot.
    ///
    /// Unfilled slots render as nothing.
    pub fn render(&self, fills: &SlotFills) -> Result<String> {
        let mut unknown: Vec<&str> = fills
            .slots()
            .filter(|slot| !self.has_slot(slot))
            .collect();
        unknown.sort_unstable();
        if let Some(slot) = unknown.first() {
            return Err(ShaderError::UnknownSlot {
                template: self.name.clone(),
                slot: (*slot).to_string(),
            });
        }

        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Slot(slot) => {
                    if let Some(code) = fills.get(slot) {
                        out.push_str(code);
                        if !code.ends_with('\n') {
                            out.push('\n');
                        }
                    }
                }
            }
        }
        Ok(out)
    }
}

/// Code to splice into template slots, keyed by slot name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotFills {
    fills: HashMap<String, String>,
}

impl SlotFills {
    /// Create an empty set of fills.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add code to a slot (builder form).
    #[must_use]
    pub fn with(mut self, slot: impl Into<String>, code: impl AsRef<str>) -> Self {
        self.insert(slot, code);
        self
    }

    /// Add code to a slot; repeated inserts into one slot append in order.
    pub fn insert(&mut self, slot: impl Into<String>, code: impl AsRef<str>) {
        let entry = self.fills.entry(slot.into()).or_default();
        if !entry.is_empty() && !entry.ends_with('\n') {
            entry.push('\n');
        }
        entry.push_str(code.as_ref());
    }

    /// Code for `slot`, if any.
    pub fn get(&self, slot: &str) -> Option<&str> {
        self.fills.get(slot).map(String::as_str)
    }

    /// Slot names that have code.
    pub fn slots(&self) -> impl Iterator<Item = &str> {
        self.fills.keys().map(String::as_str)
    }

    /// Returns `true` if no slot has code.
    pub fn is_empty(&self) -> bool {
        self.fills.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEMPLATE: &str = "#version 330\n#pragma sheen_slot head\nvoid main() {\n    #pragma sheen_slot body\n}\n";

    #[test]
    fn parses_slots_in_order() {
        let template = ShaderTemplate::parse("t", TEMPLATE).unwrap();
        assert_eq!(template.slots().collect::<Vec<_>>(), ["head", "body"]);
        assert!(template.has_slot("body"));
        assert!(!template.has_slot("tail"));
    }

    #[test]
    fn unfilled_slots_disappear() {
        let template = ShaderTemplate::parse("t", TEMPLATE).unwrap();
        let out = template.render(&SlotFills::new()).unwrap();
        assert_eq!(out, "#version 330\nvoid main() {\n}\n");
    }

    #[test]
    fn fills_land_at_their_slots() {
        let template = ShaderTemplate::parse("t", TEMPLATE).unwrap();
        let fills = SlotFills::new()
            .with("body", "    frag.rgb *= 0.5;")
            .with("head", "uniform float tint;\n");
        let out = template.render(&fills).unwrap();
        assert_eq!(
            out,
            "#version 330\nuniform float tint;\nvoid main() {\n    frag.rgb *= 0.5;\n}\n"
        );
    }

    #[test]
    fn repeated_inserts_append() {
        let mut fills = SlotFills::new();
        fills.insert("body", "a();");
        fills.insert("body", "b();");
        assert_eq!(fills.get("body"), Some("a();\nb();"));
    }

    #[test]
    fn unknown_slot_is_an_error() {
        let template = ShaderTemplate::parse("t", TEMPLATE).unwrap();
        let err = template
            .render(&SlotFills::new().with("tail", "x();"))
            .unwrap_err();
        assert!(matches!(err, ShaderError::UnknownSlot { slot, .. } if slot == "tail"));
    }

    #[test]
    fn duplicate_slot_is_an_error() {
        let source = "#pragma sheen_slot a\n#pragma sheen_slot a\n";
        assert!(matches!(
            ShaderTemplate::parse("dup", source),
            Err(ShaderError::DuplicateSlot { .. })
        ));
    }

    #[test]
    fn malformed_slot_reports_line() {
        let source = "void f();\n#pragma sheen_slot 9lives\n";
        assert!(matches!(
            ShaderTemplate::parse("bad", source),
            Err(ShaderError::MalformedSlot { line: 2, .. })
        ));
        assert!(matches!(
            ShaderTemplate::parse("bad", "#pragma sheen_slotx\n"),
            Err(ShaderError::MalformedSlot { line: 1, .. })
        ));
    }

    #[test]
    fn source_without_trailing_newline_is_kept() {
        let template = ShaderTemplate::parse("t", "void main() {}").unwrap();
        assert_eq!(template.render(&SlotFills::new()).unwrap(), "void main() {}");
    }
}
