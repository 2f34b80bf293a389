//! TrueType font discovery for chart text.
//!
//! Text is rasterised through plotters' `ab_glyph` backend, which only knows
//! fonts registered at runtime. Registration is process-wide and happens once.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use commitscope_core::ScopeError;
use plotters::style::FontStyle;

/// Family name every chart text style refers to.
pub const FONT_FAMILY: &str = "sans-serif";

/// Fonts tried when none is configured.
pub const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

static REGISTERED: OnceLock<Option<PathBuf>> = OnceLock::new();

/// Locate a font: the configured path if it exists, else the first system font found.
///
/// # Examples
///
/// ```
/// use commitscope_charts::font::find_font;
///
/// let file = tempfile::NamedTempFile::new().unwrap();
/// assert_eq!(find_font(Some(file.path())).as_deref(), Some(file.path()));
/// ```
pub fn find_font(configured: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = configured {
        if path.is_file() {
            return Some(path.to_path_buf());
        }
        tracing::warn!(path = %path.display(), "configured chart font not found, trying system fonts");
    }
    SYSTEM_FONTS
        .iter()
        .map(PathBuf::from)
        .find(|candidate| candidate.is_file())
}

/// Read and register the font at `path` under [`FONT_FAMILY`].
///
/// The font bytes are leaked: plotters keeps a `'static` reference for the
/// lifetime of the process.
///
/// # Errors
///
/// Returns [`ScopeError::Io`] if the file cannot be read, or
/// [`ScopeError::Chart`] if it is not a usable TrueType/OpenType font.
pub fn register_font_file(path: &Path) -> Result<(), ScopeError> {
    let bytes = std::fs::read(path)?;
    let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
    plotters::style::register_font(FONT_FAMILY, FontStyle::Normal, bytes).map_err(|_| {
        ScopeError::Chart(format!("invalid font {}", path.display()))
    })
}

/// Make sure a font is registered; returns `false` when charts must be drawn without text.
///
/// The first call decides for the whole process.
pub fn ensure_font(configured: Option<&Path>) -> bool {
    REGISTERED
        .get_or_init(|| {
            let path = find_font(configured)?;
            match register_font_file(&path) {
                Ok(()) => {
                    tracing::debug!(font = %path.display(), "registered chart font");
                    Some(path)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "could not load chart font");
                    None
                }
            }
        })
        .is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn existing_configured_font_wins() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert_eq!(find_font(Some(file.path())), Some(file.path().to_path_buf()));
    }

    #[test]
    fn missing_configured_font_falls_back() {
        let found = find_font(Some(Path::new("/nonexistent/font.ttf")));
        assert_ne!(found.as_deref(), Some(Path::new("/nonexistent/font.ttf")));
        if let Some(path) = found {
            assert!(SYSTEM_FONTS.iter().any(|f| Path::new(f) == path));
        }
    }

    #[test]
    fn garbage_is_not_a_font() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), b"definitely not a font").unwrap();
        assert!(matches!(
            register_font_file(file.path()),
            Err(ScopeError::Chart(_))
        ));
    }

    #[test]
    fn unreadable_font_is_io_error() {
        assert!(matches!(
            register_font_file(Path::new("/nonexistent/font.ttf")),
            Err(ScopeError::Io(_))
        ));
    }
}
