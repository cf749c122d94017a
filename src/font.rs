use log::warn;
use piet::{FontFamily, Text};

use crate::cache::ResourceCache;

#[derive(Clone, Debug)]
pub struct Font {
    pub family: FontFamily,
    pub size: f64,
}

/// Fonts resolved through the text backend, keyed by family name and pixel size.
#[derive(Default)]
pub struct FontCache {
    fonts: ResourceCache<(String, u32), Font>,
}

impl FontCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a font, resolving the family on first use. Families the system doesn't
    /// have fall back to the generic sans-serif family.
    pub fn get<T: Text>(&mut self, text: &mut T, family: &str, size: u32) -> Font {
        self.fonts
            .get_or_load((family.to_string(), size), |(name, size)| Font {
                family: text.font_family(name).unwrap_or_else(|| {
                    warn!("Font family \"{}\" not found, using sans-serif.", name);
                    FontFamily::SANS_SERIF
                }),
                size: *size as f64,
            })
            .clone()
    }
}
