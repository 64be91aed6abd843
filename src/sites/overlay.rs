//! Parser for listing overlay titles of the form
//! `"<description>, price: €5.00, brand: Nike, size: M"`.
//!
//! Grammar, over comma-separated segments:
//!
//! ```text
//! title       = description ("," field)* | description
//! description = any segments up to the first segment that is a known field
//! field       = key ":" value           (key: letters and spaces)
//! ```
//!
//! - Commas inside the description are kept: it ends only where a segment
//!   starting with a known key (`price`, `brand`, `size`, `condition`) begins.
//! - After the first field, a segment with no `key:` prefix belongs to the
//!   previous value (`price: 1,000 €`).
//! - With no known key anywhere, the whole string is the description.

const KNOWN_KEYS: [&str; 4] = ["price", "brand", "size", "condition"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlayTitle {
    pub description: String,
    /// Lower-cased keys with their trimmed values, in order of appearance
    pub fields: Vec<(String, String)>,
}

impl OverlayTitle {
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

pub fn parse_overlay_title(raw: &str) -> OverlayTitle {
    let segments: Vec<&str> = raw.split(',').collect();

    let start = segments
        .iter()
        .position(|s| split_field(s).is_some_and(|(key, _)| KNOWN_KEYS.contains(&key.as_str())));

    let Some(start) = start else {
        return OverlayTitle {
            description: raw.trim().to_string(),
            fields: Vec::new(),
        };
    };

    let description = segments[..start].join(",").trim().to_string();
    let mut fields: Vec<(String, String)> = Vec::new();

    for segment in &segments[start..] {
        match split_field(segment) {
            Some((key, value)) => fields.push((key, value.to_string())),
            None => {
                if let Some((_, value)) = fields.last_mut() {
                    value.push(',');
                    value.push_str(segment.trim_end());
                }
            }
        }
    }

    OverlayTitle {
        description,
        fields,
    }
}

fn split_field(segment: &str) -> Option<(String, &str)> {
    let (key, value) = segment.split_once(':')?;
    let key = key.trim();
    if key.is_empty() || !key.chars().all(|c| c.is_alphabetic() || c == ' ') {
        return None;
    }
    Some((key.to_lowercase().replace(' ', "_"), value.trim()))
}
