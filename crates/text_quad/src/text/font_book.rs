//! Font discovery
//!
//! `FontBook` is the host's font registry: a `fontdb` database over either the
//! system's installed fonts or an explicit set of font files. It resolves a
//! family name to a parsed `fontdue` face.

use std::path::Path;
use std::rc::Rc;

use fontdb::{Database, Family, Query};
use fontdue::{Font, FontSettings};

/// Sans families tried, in order, before settling for an arbitrary face
///
/// fontdb's generic sans-serif family defaults to "Arial", so a host without
/// Arial would otherwise skip straight to whichever face was registered first.
pub const COMMON_SANS_FAMILIES: &[&str] = &[
    "DejaVu Sans",
    "Liberation Sans",
    "Noto Sans",
    "Helvetica",
    "Segoe UI",
];

/// Shared, cheaply clonable font registry
#[derive(Clone)]
pub struct FontBook {
    db: Rc<Database>,
}

impl FontBook {
    /// A registry with no fonts; every lookup misses
    pub fn empty() -> Self {
        Self {
            db: Rc::new(Database::new()),
        }
    }

    /// Registry over the fonts installed on this machine
    pub fn system() -> Self {
        let mut db = Database::new();
        db.load_system_fonts();
        log::info!("Loaded {} system font faces", db.len());
        Self { db: Rc::new(db) }
    }

    /// Registry over in-memory font files (TTF/OTF/TTC bytes)
    pub fn from_font_data(fonts: impl IntoIterator<Item = Vec<u8>>) -> Self {
        let mut db = Database::new();
        for data in fonts {
            db.load_font_data(data);
        }
        Self { db: Rc::new(db) }
    }

    /// Registry over every font file found in `dir`
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let mut db = Database::new();
        db.load_fonts_dir(dir);
        Self { db: Rc::new(db) }
    }

    /// Number of registered faces
    pub fn len(&self) -> usize {
        self.db.len()
    }

    /// Whether no faces are registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Distinct family names, in registration order
    pub fn families(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for face in self.db.faces() {
            for (name, _) in &face.families {
                if !names.contains(name) {
                    names.push(name.clone());
                }
            }
        }
        names
    }

    /// Load the regular face of `family`, if registered
    pub fn load(&self, family: &str) -> Option<LoadedFont> {
        self.load_query(&[Family::Name(family)])
    }

    /// Load the host's default sans-serif face, or a common sans family, or
    /// failing that any face at all
    pub fn load_any(&self) -> Option<LoadedFont> {
        if let Some(font) = self.load_query(&[Family::SansSerif]) {
            return Some(font);
        }
        if let Some(font) = COMMON_SANS_FAMILIES
            .iter()
            .find_map(|family| self.load(family))
        {
            return Some(font);
        }
        let id = self.db.faces().next()?.id;
        self.load_id(id)
    }

    fn load_query(&self, families: &[Family<'_>]) -> Option<LoadedFont> {
        let query = Query {
            families,
            ..Query::default()
        };
        let id = self.db.query(&query)?;
        self.load_id(id)
    }

    fn load_id(&self, id: fontdb::ID) -> Option<LoadedFont> {
        let family = self
            .db
            .face(id)
            .and_then(|face| face.families.first())
            .map(|(name, _)| name.clone())?;

        let parsed = self.db.with_face_data(id, |data, index| {
            let settings = FontSettings {
                collection_index: index,
                ..FontSettings::default()
            };
            Font::from_bytes(data, settings)
        })?;

        match parsed {
            Ok(font) => Some(LoadedFont { family, font }),
            Err(e) => {
                log::warn!("Failed to parse font face for '{}': {}", family, e);
                None
            }
        }
    }
}

impl std::fmt::Debug for FontBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontBook").field("faces", &self.len()).finish()
    }
}

/// A parsed face together with the family name it was registered under
#[derive(Clone)]
pub struct LoadedFont {
    /// Family name reported by the face
    pub family: String,
    /// Parsed glyph outlines
    pub font: Font,
}

/// Fonts bundled under `tests/fonts` for deterministic glyph tests
#[cfg(test)]
pub(crate) mod bundled {
    use super::FontBook;

    pub const DEJAVU_SANS: &[u8] = include_bytes!("../../tests/fonts/DejaVuSans.ttf");
    pub const DEJAVU_SANS_MONO: &[u8] = include_bytes!("../../tests/fonts/DejaVuSansMono.ttf");

    /// Just DejaVu Sans
    pub fn sans() -> FontBook {
        FontBook::from_font_data([DEJAVU_SANS.to_vec()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_book_misses_everything() {
        let book = FontBook::empty();
        assert!(book.is_empty());
        assert!(book.load("Arial").is_none());
        assert!(book.load_any().is_none());
        assert!(book.families().is_empty());
    }

    #[test]
    fn test_garbage_font_data_is_ignored() {
        let book = FontBook::from_font_data(vec![vec![0u8; 64]]);
        assert!(book.load_any().is_none());
    }

    #[test]
    fn test_lookup_by_family_name() {
        let book = bundled::sans();
        assert_eq!(book.len(), 1);
        assert_eq!(book.families(), vec!["DejaVu Sans".to_string()]);

        let loaded = book.load("DejaVu Sans").unwrap();
        assert_eq!(loaded.family, "DejaVu Sans");
        assert!(book.load("Arial").is_none());
    }

    #[test]
    fn test_fallback_prefers_common_sans_over_first_face() {
        // Mono is registered first, so a first-face fallback would pick it
        let book = FontBook::from_font_data([
            bundled::DEJAVU_SANS_MONO.to_vec(),
            bundled::DEJAVU_SANS.to_vec(),
        ]);
        assert_eq!(book.families()[0], "DejaVu Sans Mono");

        let loaded = book.load_any().unwrap();
        assert_eq!(loaded.family, "DejaVu Sans");
    }

    #[test]
    fn test_fallback_uses_any_face_when_no_sans_is_known() {
        let book = FontBook::from_font_data([bundled::DEJAVU_SANS_MONO.to_vec()]);
        assert_eq!(book.load_any().unwrap().family, "DejaVu Sans Mono");
    }

    #[test]
    fn test_from_dir_reads_font_files() {
        let dir = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fonts");
        let book = FontBook::from_dir(dir);
        assert_eq!(book.len(), 2);
        assert_eq!(book.load_any().unwrap().family, "DejaVu Sans");
    }
}
