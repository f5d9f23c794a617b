//! TrueType rasterisation through FreeType.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use freetype::bitmap::PixelMode;
use freetype::face::LoadFlag;
use freetype::{Face, Library};
use tracing::{debug, warn};
use crate::error::{extension_upper, MinduError, MinduResult};

/// Horizontal shift per pixel of height for synthetic italics
const ITALIC_SLANT: f32 = 0.2;

/// Face used when neither the label nor the settings name a font
const BUILTIN_FONT: &[u8] = include_bytes!("../assets/fonts/FiraSans-Regular.ttf");
pub const BUILTIN_FONT_NAME: &str = "FiraSans-Regular.ttf";

/// 8 bit coverage mask
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Coverage {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl Coverage {
    pub fn new(width: u32, height: u32) -> Coverage {
        Coverage {
            width,
            height,
            data: vec![0; (width * height) as usize],
        }
    }

    pub fn get(&self, x: u32, y: u32) -> u8 {
        self.data[(y * self.width + x) as usize]
    }

    /// Keeps the strongest coverage, out of bounds writes are dropped
    pub fn max_put(&mut self, x: i32, y: i32, value: u8) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }

        let i = (y as u32 * self.width + x as u32) as usize;
        self.data[i] = self.data[i].max(value);
    }

    /// One pixel horizontal overstrike
    pub fn emboldened(&self) -> Coverage {
        let mut out = Coverage::new(self.width + 1, self.height);

        for y in 0..self.height {
            for x in 0..self.width {
                let c = self.get(x, y);
                out.max_put(x as i32, y as i32, c);
                out.max_put(x as i32 + 1, y as i32, c);
            }
        }

        out
    }

    /// Leans the mask to the right, rows above `baseline` move right, rows below move left
    pub fn slanted(&self, baseline: u32) -> Coverage {
        let lean = |y: u32| ((baseline as f32 - y as f32) * ITALIC_SLANT).round() as i32;
        let extra = lean(0).max(0) - lean(self.height.saturating_sub(1)).min(0);
        let offset = -lean(self.height.saturating_sub(1)).min(0);

        let mut out = Coverage::new(self.width + extra as u32, self.height);

        for y in 0..self.height {
            let shift = lean(y) + offset;
            for x in 0..self.width {
                out.max_put(x as i32 + shift, y as i32, self.get(x, y));
            }
        }

        out
    }

    /// Solid rule across the whole width
    pub fn underline(&mut self, top: u32, thickness: u32) {
        for y in top..(top + thickness).min(self.height) {
            for x in 0..self.width {
                self.max_put(x as i32, y as i32, 255);
            }
        }
    }
}

/// Vertical metrics of a face at one size, in pixels
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct LineMetrics {
    pub ascender: i32,
    pub line_height: u32,
    pub underline_thickness: u32,
}

/// Expands one glyph bitmap to a coverage byte per pixel. 1 bit glyphs (embedded bitmaps,
/// monochrome hinting) become 0 or 255.
fn glyph_pixels(mode: PixelMode, buffer: &[u8], pitch: usize, width: usize, rows: usize) -> MinduResult<Vec<u8>> {
    if width == 0 || rows == 0 {
        return Ok(Vec::new());
    }

    let row_bytes = match mode {
        PixelMode::Gray => width,
        PixelMode::Mono => width.div_ceil(8),
        other => return Err(MinduError::Font(format!("unsupported glyph pixel mode {:?}", other))),
    };

    if pitch < row_bytes || buffer.len() < (rows - 1) * pitch + row_bytes {
        return Err(MinduError::Font(format!(
            "truncated glyph bitmap: {} bytes for {} rows of {} with pitch {}",
            buffer.len(),
            rows,
            row_bytes,
            pitch
        )));
    }

    let mut pixels = Vec::with_capacity(width * rows);

    for y in 0..rows {
        let row = &buffer[y * pitch..y * pitch + row_bytes];

        match mode {
            PixelMode::Mono => pixels.extend(
                (0..width).map(|x| if row[x / 8] & (0x80 >> (x % 8)) != 0 { 255 } else { 0 }),
            ),
            _ => pixels.extend_from_slice(row),
        }
    }

    Ok(pixels)
}

/// A face loaded at a given pixel size
pub(crate) struct SizedFace {
    face: Face,
    metrics: LineMetrics,
    flags: LoadFlag,
}

impl SizedFace {
    pub fn metrics(&self) -> LineMetrics {
        self.metrics
    }

    /// Rasterises one line of text. Characters the face lacks are skipped, glyphs in a pixel
    /// format we can't read are an error.
    pub fn rasterize(&self, text: &str, bold: bool, italic: bool, underline: bool) -> MinduResult<Coverage> {
        let mut glyphs = Vec::new();
        let mut pen = 0i32;

        for ch in text.chars() {
            let index = match self.face.get_char_index(ch as usize) {
                Some(i) => i,
                None => continue,
            };

            if self.face.load_glyph(index, self.flags).is_err() {
                continue;
            }

            let glyph = self.face.glyph();
            let bitmap = glyph.bitmap();
            let mode = bitmap.pixel_mode().map_err(|e| MinduError::Font(e.to_string()))?;
            let pitch = bitmap.pitch().unsigned_abs() as usize;
            let (w, rows) = (bitmap.width().max(0) as usize, bitmap.rows().max(0) as usize);

            let pixels = glyph_pixels(mode, bitmap.buffer(), pitch, w, rows)?;

            glyphs.push((
                pen + glyph.bitmap_left(),
                self.metrics.ascender - glyph.bitmap_top(),
                w,
                pixels,
            ));

            pen += (glyph.advance().x >> 6) as i32;
        }

        let right = glyphs
            .iter()
            .map(|(x, _, w, _)| x + *w as i32)
            .fold(pen, i32::max)
            .max(0);

        let mut line = Coverage::new(right as u32, self.metrics.line_height);

        for (gx, gy, w, pixels) in glyphs.iter() {
            for (i, &c) in pixels.iter().enumerate() {
                let x = gx + (i % w) as i32;
                let y = gy + (i / w) as i32;
                line.max_put(x, y, c);
            }
        }

        if bold {
            line = line.emboldened();
        }
        if italic {
            line = line.slanted(self.metrics.ascender.max(0) as u32);
        }
        if underline {
            let top = (self.metrics.ascender + 1).max(0) as u32;
            line.underline(top, self.metrics.underline_thickness);
        }

        Ok(line)
    }
}

struct FontsInner {
    library: Library,
    default_font: Option<PathBuf>,
    builtin: Rc<Vec<u8>>,
    /// Keyed by file, `None` being the built-in face
    faces: RefCell<HashMap<(Option<PathBuf>, u32), Rc<SizedFace>>>,
}

/// FreeType library handle plus the default font, shared by every label. Without a default
/// font labels fall back to the built-in Fira Sans face.
#[derive(Clone)]
pub struct Fonts {
    inner: Rc<FontsInner>,
}

impl Fonts {
    pub fn new(default_font: Option<PathBuf>) -> MinduResult<Fonts> {
        let library = Library::init().map_err(|e| MinduError::Font(e.to_string()))?;

        if let Some(path) = default_font.as_ref() {
            if !path.is_file() {
                warn!("Default font {} doesn't exist", path.display());
            }
        }

        Ok(Fonts {
            inner: Rc::new(FontsInner {
                library,
                default_font,
                builtin: Rc::new(BUILTIN_FONT.to_vec()),
                faces: RefCell::new(HashMap::new()),
            }),
        })
    }

    pub fn default_font(&self) -> Option<&Path> {
        self.inner.default_font.as_deref()
    }

    /// Loads `path` (the default font if `None`, the built-in face if there is no default) at
    /// `size` pixels, cached
    pub(crate) fn face(&self, path: Option<&Path>, size: u32) -> MinduResult<Rc<SizedFace>> {
        let path = path.or(self.default_font());
        let key = (path.map(Path::to_path_buf), size);

        if let Some(face) = self.inner.faces.borrow().get(&key) {
            return Ok(Rc::clone(face));
        }

        let face = match path {
            Some(path) => self.open_file(path)?,
            None => self
                .inner
                .library
                .new_memory_face(Rc::clone(&self.inner.builtin), 0)
                .map_err(|e| MinduError::Font(format!("{}: {}", BUILTIN_FONT_NAME, e)))?,
        };

        let name = match path {
            Some(p) => p.display().to_string(),
            None => BUILTIN_FONT_NAME.to_string(),
        };

        face.set_pixel_sizes(0, size)
            .map_err(|e| MinduError::Font(format!("{}: {}", name, e)))?;

        let metrics = match face.size_metrics() {
            Some(m) => LineMetrics {
                ascender: (m.ascender >> 6) as i32,
                line_height: ((m.height >> 6) as u32).max(1),
                underline_thickness: (size / 15).max(1),
            },
            None => return Err(MinduError::Font(format!("{}: no size metrics", name))),
        };

        debug!("Loaded font {} at {}px", name, size);

        let face = Rc::new(SizedFace {
            face,
            metrics,
            flags: LoadFlag::RENDER,
        });
        self.inner.faces.borrow_mut().insert(key, Rc::clone(&face));

        Ok(face)
    }

    fn open_file(&self, path: &Path) -> MinduResult<Face> {
        if !path.is_file() {
            return Err(MinduError::load(path, "no such file"));
        }
        if extension_upper(path).as_deref() != Some("TTF") {
            return Err(MinduError::load(path, "font format must be TTF"));
        }

        self.inner
            .library
            .new_face(path, 0)
            .map_err(|e| MinduError::load(path, e))
    }
}

impl fmt::Debug for Fonts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fonts")
            .field("default_font", &self.inner.default_font)
            .field("cached", &self.inner.faces.borrow().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::TempDir;

    fn mask(width: u32, height: u32, on: &[(u32, u32)]) -> Coverage {
        let mut c = Coverage::new(width, height);
        for &(x, y) in on {
            c.max_put(x as i32, y as i32, 255);
        }
        c
    }

    #[test]
    fn bold_widens_by_one() {
        let c = mask(2, 1, &[(0, 0)]).emboldened();

        assert_eq!(c.width, 3);
        assert_eq!(c.data, vec![255, 255, 0]);
    }

    #[test]
    fn italic_leans_right() {
        let c = mask(1, 11, &[(0, 0), (0, 10)]).slanted(10);

        // The top row moves 2 pixels right of the baseline row
        assert_eq!(c.width, 3);
        assert_eq!(c.get(2, 0), 255);
        assert_eq!(c.get(0, 10), 255);
    }

    #[test]
    fn underline_is_clipped() {
        let mut c = Coverage::new(3, 4);
        c.underline(3, 2);

        assert_eq!(&c.data[9..], &[255, 255, 255]);
        assert!(c.data[..9].iter().all(|&v| v == 0));
    }

    #[test]
    fn missing_fonts() {
        let fonts = Fonts::new(None).unwrap();

        let dir = TempDir::new("fonts");
        let bogus = dir.path().join("font.otf");
        std::fs::write(&bogus, b"OTTO").unwrap();

        assert!(matches!(fonts.face(Some(&bogus), 12), Err(MinduError::Load { .. })));
        assert!(matches!(
            fonts.face(Some(&dir.path().join("nope.ttf")), 12),
            Err(MinduError::Load { .. })
        ));

        let broken = dir.path().join("broken.ttf");
        std::fs::write(&broken, b"not a font").unwrap();
        assert!(matches!(fonts.face(Some(&broken), 12), Err(MinduError::Load { .. })));
    }

    #[test]
    fn builtin_face_without_default() {
        let fonts = Fonts::new(None).unwrap();
        let face = fonts.face(None, 16).unwrap();

        assert!(face.metrics().ascender > 0);
        assert!(face.metrics().line_height >= 16);
        // Cached per size
        assert!(Rc::ptr_eq(&face, &fonts.face(None, 16).unwrap()));
        assert!(!Rc::ptr_eq(&face, &fonts.face(None, 20).unwrap()));
    }

    #[test]
    fn default_font_file_is_used() {
        let dir = TempDir::new("fonts");
        let path = dir.path().join("fira.ttf");
        std::fs::write(&path, BUILTIN_FONT).unwrap();

        let fonts = Fonts::new(Some(path.clone())).unwrap();
        let by_default = fonts.face(None, 16).unwrap();

        assert!(Rc::ptr_eq(&by_default, &fonts.face(Some(&path), 16).unwrap()));
    }

    #[test]
    fn gray_glyphs_are_rasterized() {
        let fonts = Fonts::new(None).unwrap();
        let face = fonts.face(None, 24).unwrap();

        let line = face.rasterize("Hog", false, false, false).unwrap();

        assert_eq!(line.height, face.metrics().line_height);
        assert!(line.width > 0);
        assert!(line.data.iter().any(|&c| c == 255));
        // Antialiased edges
        assert!(line.data.iter().any(|&c| c > 0 && c < 255));
    }

    #[test]
    fn mono_glyphs_are_expanded() {
        let fonts = Fonts::new(None).unwrap();
        let gray = fonts.face(None, 24).unwrap();
        let mono = SizedFace {
            face: gray.face.clone(),
            metrics: gray.metrics(),
            flags: LoadFlag::RENDER | LoadFlag::TARGET_MONO | LoadFlag::MONOCHROME,
        };

        let line = mono.rasterize("Wide glyphs", false, false, false).unwrap();

        assert!(line.data.iter().any(|&c| c == 255));
        assert!(line.data.iter().all(|&c| c == 0 || c == 255));
    }

    #[test]
    fn mono_rows_unpack_msb_first() {
        // 10 pixels wide: 2 bytes per row, pitch padded to 4
        let buffer = [0b1000_0001, 0b0100_0000, 0, 0, 0b0000_0000, 0b1100_0000, 0, 0];

        let pixels = glyph_pixels(PixelMode::Mono, &buffer, 4, 10, 2).unwrap();

        assert_eq!(pixels.len(), 20);
        assert_eq!(&pixels[..10], &[255, 0, 0, 0, 0, 0, 0, 255, 0, 255]);
        assert_eq!(&pixels[10..], &[0, 0, 0, 0, 0, 0, 0, 0, 255, 255]);
    }

    #[test]
    fn odd_glyph_bitmaps_are_errors() {
        assert!(matches!(
            glyph_pixels(PixelMode::Bgra, &[0; 16], 16, 4, 1),
            Err(MinduError::Font(_))
        ));
        // Gray rows wider than the pitch
        assert!(matches!(
            glyph_pixels(PixelMode::Gray, &[0; 8], 2, 4, 4),
            Err(MinduError::Font(_))
        ));
        assert!(glyph_pixels(PixelMode::None, &[], 0, 0, 0).unwrap().is_empty());
    }
}
