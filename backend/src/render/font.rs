//! TrueType font families used by the typed-signature renderer.
//!
//! Families are loaded from a directory of `.ttf` files. The face of each file is
//! taken from its name suffix (`-Regular`, `-Bold`, `-Italic`/`-Oblique`,
//! `-BoldItalic`/`-BoldOblique`; no suffix means regular), so both
//! `LiberationSans-BoldItalic.ttf` and `DejaVuSans-BoldOblique.ttf` work.
//!
//! Bold and italic are independent axes. When a family has no face for the
//! requested combination, the closest lighter/upright face is returned together
//! with the axes the renderer must synthesize.

use crate::error::{Result, ValidationKind};
use common::model::typed::TextStyle;
use log::{debug, info, warn};
use rusttype::Font;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Weight {
    Regular,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Slant {
    Upright,
    Italic,
}

/// Maps the independent style flags onto the weight and slant axes.
pub fn axes(style: TextStyle) -> (Weight, Slant) {
    let weight = if style.bold { Weight::Bold } else { Weight::Regular };
    let slant = if style.italic { Slant::Italic } else { Slant::Upright };
    (weight, slant)
}

struct FontFamily {
    name: String,
    faces: BTreeMap<(Weight, Slant), Font<'static>>,
}

/// A face picked for a style, plus the axes it does not cover natively.
pub struct ResolvedFace<'a> {
    pub font: &'a Font<'static>,
    pub synthetic_bold: bool,
    pub synthetic_italic: bool,
}

#[derive(Default)]
pub struct FontLibrary {
    families: HashMap<String, FontFamily>,
}

impl FontLibrary {
    /// Loads every `.ttf` file in `dir`. Unreadable font files are skipped with a warning.
    pub fn load_dir(dir: impl AsRef<Path>) -> io::Result<Self> {
        let dir = dir.as_ref();
        let mut library = FontLibrary::default();

        let mut paths: Vec<_> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| {
                p.extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| ext.eq_ignore_ascii_case("ttf"))
                    .unwrap_or(false)
            })
            .collect();
        paths.sort();

        for path in paths {
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let data = fs::read(&path)?;
            match Font::try_from_vec(data) {
                Some(font) => {
                    let (family, weight, slant) = split_face_name(stem);
                    debug!("Loaded font face {} ({:?}, {:?})", family, weight, slant);
                    library.insert(family, weight, slant, font);
                }
                None => warn!("Skipping unreadable font file {}", path.display()),
            }
        }

        if library.families.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no .ttf fonts found in {}", dir.display()),
            ));
        }

        info!(
            "Loaded {} font families from {}",
            library.families.len(),
            dir.display()
        );
        Ok(library)
    }

    pub fn insert(&mut self, family: &str, weight: Weight, slant: Slant, font: Font<'static>) {
        self.families
            .entry(family_key(family))
            .or_insert_with(|| FontFamily {
                name: family.to_string(),
                faces: BTreeMap::new(),
            })
            .faces
            .insert((weight, slant), font);
    }

    /// Display names of the loaded families, sorted.
    pub fn families(&self) -> Vec<String> {
        let mut names: Vec<String> = self.families.values().map(|f| f.name.clone()).collect();
        names.sort();
        names
    }

    pub fn contains(&self, family: &str) -> bool {
        self.families.contains_key(&family_key(family))
    }

    /// Picks the face for `style`, falling back along the weight and slant axes.
    pub fn resolve(&self, family: &str, style: TextStyle) -> Result<ResolvedFace<'_>> {
        let fam = self
            .families
            .get(&family_key(family))
            .ok_or_else(|| ValidationKind::UnknownFont(family.to_string()))?;

        let (weight, slant) = axes(style);
        let mut candidates = vec![(weight, slant)];
        if slant == Slant::Italic {
            candidates.push((weight, Slant::Upright));
        }
        if weight == Weight::Bold {
            candidates.push((Weight::Regular, slant));
        }
        candidates.push((Weight::Regular, Slant::Upright));

        for (w, s) in candidates {
            if let Some(font) = fam.faces.get(&(w, s)) {
                return Ok(ResolvedFace {
                    font,
                    synthetic_bold: weight == Weight::Bold && w == Weight::Regular,
                    synthetic_italic: slant == Slant::Italic && s == Slant::Upright,
                });
            }
        }

        // Only heavier or slanted faces exist; use the first one as-is.
        let font = fam
            .faces
            .values()
            .next()
            .ok_or_else(|| ValidationKind::UnknownFont(family.to_string()))?;
        Ok(ResolvedFace {
            font,
            synthetic_bold: false,
            synthetic_italic: false,
        })
    }
}

/// Case and whitespace insensitive lookup key: "DejaVu Sans" == "DejaVuSans".
fn family_key(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(|c| c.to_lowercase())
        .collect()
}

fn split_face_name(stem: &str) -> (&str, Weight, Slant) {
    const SUFFIXES: [(&str, Weight, Slant); 6] = [
        ("BoldItalic", Weight::Bold, Slant::Italic),
        ("BoldOblique", Weight::Bold, Slant::Italic),
        ("Bold", Weight::Bold, Slant::Upright),
        ("Italic", Weight::Regular, Slant::Italic),
        ("Oblique", Weight::Regular, Slant::Italic),
        ("Regular", Weight::Regular, Slant::Upright),
    ];

    if let Some((family, suffix)) = stem.rsplit_once('-') {
        for (name, weight, slant) in SUFFIXES {
            if suffix.eq_ignore_ascii_case(name) {
                return (family, weight, slant);
            }
        }
    }
    (stem, Weight::Regular, Slant::Upright)
}
