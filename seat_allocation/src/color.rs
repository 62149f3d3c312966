//! Stable colours for parties in charts and maps.

use std::collections::HashMap;

use crate::aggregate::party_key;

pub const DEFAULT_PALETTE: [&str; 10] = [
    "#1f77b4", "#d62728", "#2ca02c", "#ff7f0e", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

/// Hands out one colour per party, in the order parties are first asked for.
///
/// Parties are matched by [party_key], so the same party keeps its colour in
/// every district. Once the palette is exhausted, colours are reused.
#[derive(Debug, Clone)]
pub struct ColorAssigner {
    palette: Vec<String>,
    assigned: HashMap<String, usize>,
}

impl ColorAssigner {
    pub fn new() -> ColorAssigner {
        ColorAssigner::with_palette(DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect())
    }

    /// An empty palette falls back to the default one.
    pub fn with_palette(palette: Vec<String>) -> ColorAssigner {
        let palette = if palette.is_empty() {
            DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect()
        } else {
            palette
        };
        ColorAssigner {
            palette,
            assigned: HashMap::new(),
        }
    }

    pub fn color_for(&mut self, party_name: &str) -> &str {
        let next = self.assigned.len();
        let idx = *self.assigned.entry(party_key(party_name)).or_insert(next);
        &self.palette[idx % self.palette.len()]
    }

    /// Number of parties that already have a colour.
    pub fn len(&self) -> usize {
        self.assigned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assigned.is_empty()
    }

    pub fn reset(&mut self) {
        self.assigned.clear();
    }
}

impl Default for ColorAssigner {
    fn default() -> Self {
        ColorAssigner::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_party_same_color() {
        let mut colors = ColorAssigner::new();
        let blue = colors.color_for("Blue Party").to_string();
        let red = colors.color_for("Red Party").to_string();
        assert_eq!(blue, DEFAULT_PALETTE[0]);
        assert_eq!(red, DEFAULT_PALETTE[1]);
        assert_eq!(colors.color_for(" blue party"), blue);
        assert_eq!(colors.len(), 2);
    }

    #[test]
    fn palette_wraps_around() {
        let mut colors = ColorAssigner::with_palette(vec!["#000".to_string(), "#fff".to_string()]);
        assert_eq!(colors.color_for("a"), "#000");
        assert_eq!(colors.color_for("b"), "#fff");
        assert_eq!(colors.color_for("c"), "#000");
    }

    #[test]
    fn reset_starts_over() {
        let mut colors = ColorAssigner::new();
        colors.color_for("a");
        colors.color_for("b");
        colors.reset();
        assert!(colors.is_empty());
        assert_eq!(colors.color_for("b"), DEFAULT_PALETTE[0]);
    }
}
