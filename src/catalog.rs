//! Static tone catalog
//!
//! A read-only table of named frequency presets the UI layers pick from.
//! Each entry carries a base frequency plus an ordered list of derived
//! frequencies for next/previous cycling. The table is fixed at compile time
//! so the same id always maps to the same tones.

/// Broad grouping for browsing the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Relaxation,
    Focus,
    Sleep,
    Energy,
}

/// One catalog preset.
#[derive(Debug, Clone)]
pub struct Entry {
    pub id: u32,
    pub name: &'static str,
    pub description: &'static str,
    /// Base frequency in Hz.
    pub frequency: f64,
    /// Ordered derived frequencies, base first.
    pub frequencies: &'static [f64],
    pub category: Category,
}

impl Entry {
    /// The derived frequency after `current`, wrapping at the end of the
    /// list. Unknown values restart at the base frequency.
    pub fn next_frequency(&self, current: f64) -> f64 {
        match self.frequencies.iter().position(|&f| f == current) {
            Some(i) => self.frequencies[(i + 1) % self.frequencies.len()],
            None => self.frequency,
        }
    }

    /// The derived frequency before `current`, wrapping at the start.
    pub fn prev_frequency(&self, current: f64) -> f64 {
        match self.frequencies.iter().position(|&f| f == current) {
            Some(i) => {
                let len = self.frequencies.len();
                self.frequencies[(i + len - 1) % len]
            }
            None => self.frequency,
        }
    }
}

static ENTRIES: &[Entry] = &[
    Entry {
        id: 1,
        name: "Deep Calm",
        description: "Low steady tone for unwinding after long sessions.",
        frequency: 174.0,
        frequencies: &[174.0, 261.0, 348.0],
        category: Category::Relaxation,
    },
    Entry {
        id: 2,
        name: "Restoration",
        description: "Mid-low tone often paired with breathing exercises.",
        frequency: 285.0,
        frequencies: &[285.0, 427.5, 570.0],
        category: Category::Relaxation,
    },
    Entry {
        id: 3,
        name: "Grounding",
        description: "Warm fundamental with a gentle fifth above it.",
        frequency: 396.0,
        frequencies: &[396.0, 594.0, 792.0],
        category: Category::Relaxation,
    },
    Entry {
        id: 4,
        name: "Verdi Tuning",
        description: "A4 tuned to 432 Hz, a softer alternative to standard pitch.",
        frequency: 432.0,
        frequencies: &[432.0, 648.0, 864.0],
        category: Category::Focus,
    },
    Entry {
        id: 5,
        name: "Concert Pitch",
        description: "Standard A4 reference tone.",
        frequency: 440.0,
        frequencies: &[440.0, 660.0, 880.0],
        category: Category::Focus,
    },
    Entry {
        id: 6,
        name: "Clarity",
        description: "Bright mid tone for short concentration blocks.",
        frequency: 417.0,
        frequencies: &[417.0, 625.5, 834.0],
        category: Category::Focus,
    },
    Entry {
        id: 7,
        name: "Green Thumb",
        description: "The classic 528 Hz tone and its upper partials.",
        frequency: 528.0,
        frequencies: &[528.0, 792.0, 1056.0],
        category: Category::Energy,
    },
    Entry {
        id: 8,
        name: "Harmony",
        description: "Consonant pair built on 639 Hz.",
        frequency: 639.0,
        frequencies: &[639.0, 958.5, 1278.0],
        category: Category::Energy,
    },
    Entry {
        id: 9,
        name: "Awakening",
        description: "Upper-mid tone with a sharp, present character.",
        frequency: 741.0,
        frequencies: &[741.0, 1111.5, 1482.0],
        category: Category::Energy,
    },
    Entry {
        id: 10,
        name: "Night Drift",
        description: "Low tone suited to wind-down routines.",
        frequency: 210.0,
        frequencies: &[210.0, 315.0, 420.0],
        category: Category::Sleep,
    },
    Entry {
        id: 11,
        name: "Still Water",
        description: "Slow, low pairing for late evenings.",
        frequency: 852.0,
        frequencies: &[852.0, 426.0, 213.0],
        category: Category::Sleep,
    },
    Entry {
        id: 12,
        name: "High Air",
        description: "The highest preset, airy and thin.",
        frequency: 963.0,
        frequencies: &[963.0, 1444.5, 1926.0],
        category: Category::Energy,
    },
];

/// Every catalog entry, in display order.
pub fn entries() -> &'static [Entry] {
    ENTRIES
}

pub fn by_id(id: u32) -> Option<&'static Entry> {
    ENTRIES.iter().find(|e| e.id == id)
}

/// Case-insensitive search over names and descriptions. A blank query
/// returns the full catalog.
pub fn search(query: &str) -> Vec<&'static Entry> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return ENTRIES.iter().collect();
    }
    ENTRIES
        .iter()
        .filter(|e| {
            e.name.to_lowercase().contains(&query) || e.description.to_lowercase().contains(&query)
        })
        .collect()
}

/// Entries in `category`, or everything when `None`.
pub fn by_category(category: Option<Category>) -> Vec<&'static Entry> {
    match category {
        None => ENTRIES.iter().collect(),
        Some(c) => ENTRIES.iter().filter(|e| e.category == c).collect(),
    }
}
