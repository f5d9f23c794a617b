use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::str::FromStr;
use image::Rgba;
use crate::error::{MinduError, MinduResult};
use crate::font::{Coverage, Fonts, SizedFace};
use crate::picture::Image;
use crate::rect::{Placement, Rect};
use crate::sprite::Sprite;
use crate::surface::Surface;

/// RGBA color with every channel clamped into [0, 1]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    r: f32,
    g: f32,
    b: f32,
    a: f32,
}

impl Color {
    pub const WHITE: Color = Color { r: 1.0, g: 1.0, b: 1.0, a: 1.0 };

    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Color {
        let c = |v: f32| num_traits::clamp(v, 0.0, 1.0);
        Color {
            r: c(r),
            g: c(g),
            b: c(b),
            a: c(a),
        }
    }

    pub fn rgba(&self) -> (f32, f32, f32, f32) {
        (self.r, self.g, self.b, self.a)
    }

    /// Each channel as `int(c * 255)`
    pub fn to_rgba8(&self) -> Rgba<u8> {
        let i = |v: f32| (v * 255.0) as u8;
        Rgba([i(self.r), i(self.g), i(self.b), i(self.a)])
    }
}

impl Default for Color {
    fn default() -> Color {
        Color::WHITE
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

impl FromStr for Alignment {
    type Err = MinduError;

    fn from_str(s: &str) -> MinduResult<Alignment> {
        match s {
            "left" => Ok(Alignment::Left),
            "center" => Ok(Alignment::Center),
            "right" => Ok(Alignment::Right),
            _ => Err(MinduError::invalid_argument(format!(
                "alignment must be \"left\", \"center\" or \"right\", got \"{}\"",
                s
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LabelStyle {
    /// TTF file, `None` for the default font
    pub font: Option<PathBuf>,
    /// Pixel size
    pub size: u32,
    pub color: Color,
    pub alignment: Alignment,
    pub italic: bool,
    pub bold: bool,
    pub underline: bool,
    pub osd: bool,
}

impl Default for LabelStyle {
    fn default() -> LabelStyle {
        LabelStyle {
            font: None,
            size: 30,
            color: Color::WHITE,
            alignment: Alignment::Left,
            italic: false,
            bold: false,
            underline: false,
            osd: false,
        }
    }
}

/// Sprite showing rendered text. Every setter re-renders and keeps the label's centre in place.
#[derive(Clone)]
pub struct Label {
    text: String,
    style: LabelStyle,
    fonts: Fonts,
    face: Rc<SizedFace>,
    surf: Rc<Surface>,
    rect: Rect,
}

impl Label {
    /// A `None` font in `style` uses the configured default font, or the built-in face when
    /// there is none.
    pub fn new<S: Into<String>>(fonts: &Fonts, text: S, style: LabelStyle) -> MinduResult<Label> {
        if style.size == 0 {
            return Err(MinduError::invalid_argument("Label: size must be greater than 0"));
        }

        let text = text.into();
        let face = fonts.face(style.font.as_deref(), style.size)?;
        let surf = render(&face, &text, &style)?;
        let rect = surf.rect();

        Ok(Label {
            text,
            style,
            fonts: fonts.clone(),
            face,
            surf: Rc::new(surf),
            rect,
        })
    }

    pub fn placed(mut self, placement: Placement) -> Label {
        self.rect.place(placement);
        self
    }

    /// Renders first and only then swaps everything in, a failed render leaves the label as it was
    fn rerender(&mut self, text: String, style: LabelStyle, face: Rc<SizedFace>) -> MinduResult<()> {
        let surf = render(&face, &text, &style)?;
        let center = self.rect.center();

        self.rect = surf.rect();
        self.rect.set_center(center);
        self.surf = Rc::new(surf);
        self.text = text;
        self.style = style;
        self.face = face;
        Ok(())
    }

    fn restyle(&mut self, style: LabelStyle) -> MinduResult<()> {
        self.rerender(self.text.clone(), style, Rc::clone(&self.face))
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text<S: Into<String>>(&mut self, text: S) -> MinduResult<()> {
        self.rerender(text.into(), self.style.clone(), Rc::clone(&self.face))
    }

    pub fn font(&self) -> Option<&Path> {
        self.style.font.as_deref()
    }

    /// File name of the font, or "default"
    pub fn font_name(&self) -> String {
        self.style
            .font
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| String::from("default"))
    }

    pub fn set_font(&mut self, font: Option<PathBuf>) -> MinduResult<()> {
        let face = self.fonts.face(font.as_deref(), self.style.size)?;
        let style = LabelStyle {
            font,
            ..self.style.clone()
        };

        self.rerender(self.text.clone(), style, face)
    }

    /// Font size in pixels
    pub fn font_size(&self) -> u32 {
        self.style.size
    }

    pub fn set_font_size(&mut self, size: u32) -> MinduResult<()> {
        if size == 0 {
            return Err(MinduError::invalid_argument("set_font_size(): size must be greater than 0"));
        }

        let face = self.fonts.face(self.style.font.as_deref(), size)?;
        let style = LabelStyle {
            size,
            ..self.style.clone()
        };

        self.rerender(self.text.clone(), style, face)
    }

    pub fn color(&self) -> Color {
        self.style.color
    }

    pub fn set_color(&mut self, color: Color) -> MinduResult<()> {
        self.restyle(LabelStyle {
            color,
            ..self.style.clone()
        })
    }

    pub fn alignment(&self) -> Alignment {
        self.style.alignment
    }

    pub fn set_alignment(&mut self, alignment: Alignment) -> MinduResult<()> {
        self.restyle(LabelStyle {
            alignment,
            ..self.style.clone()
        })
    }

    pub fn italic(&self) -> bool {
        self.style.italic
    }

    pub fn set_italic(&mut self, italic: bool) -> MinduResult<()> {
        self.restyle(LabelStyle {
            italic,
            ..self.style.clone()
        })
    }

    pub fn toggle_italic(&mut self) -> MinduResult<()> {
        self.set_italic(!self.style.italic)
    }

    pub fn bold(&self) -> bool {
        self.style.bold
    }

    pub fn set_bold(&mut self, bold: bool) -> MinduResult<()> {
        self.restyle(LabelStyle {
            bold,
            ..self.style.clone()
        })
    }

    pub fn toggle_bold(&mut self) -> MinduResult<()> {
        self.set_bold(!self.style.bold)
    }

    pub fn underline(&self) -> bool {
        self.style.underline
    }

    pub fn set_underline(&mut self, underline: bool) -> MinduResult<()> {
        self.restyle(LabelStyle {
            underline,
            ..self.style.clone()
        })
    }

    pub fn toggle_underline(&mut self) -> MinduResult<()> {
        self.set_underline(!self.style.underline)
    }

    pub fn style(&self) -> &LabelStyle {
        &self.style
    }

    /// Image sharing this label's pixels, position and OSD flag
    pub fn to_image(&self) -> Image {
        Image::from_shared(Rc::clone(&self.surf))
            .with_osd(self.style.osd)
            .placed(Placement::TopLeft(self.rect.x, self.rect.y))
    }
}

fn render(face: &SizedFace, text: &str, style: &LabelStyle) -> MinduResult<Surface> {
    let lines = text
        .split('\n')
        .map(|line| face.rasterize(line, style.bold, style.italic, style.underline))
        .collect::<MinduResult<Vec<Coverage>>>()?;

    Ok(compose(&lines, face.metrics().line_height, style.alignment, style.color))
}

/// Stacks the lines, tints them, crops to the visible pixels and applies the color's alpha
pub(crate) fn compose(lines: &[Coverage], line_height: u32, alignment: Alignment, color: Color) -> Surface {
    let width = lines.iter().map(|l| l.width).max().unwrap_or(0);
    let height = line_height * lines.len() as u32;

    let rgba = color.to_rgba8();
    let mut surf = Surface::new(width, height);

    for (i, line) in lines.iter().enumerate() {
        let left = match alignment {
            Alignment::Left => 0,
            Alignment::Center => width / 2 - line.width / 2,
            Alignment::Right => width - line.width,
        };
        let top = i as u32 * line_height;

        for y in 0..line.height.min(line_height) {
            for x in 0..line.width {
                let c = line.get(x, y);
                if c > 0 {
                    surf.put_pixel(left + x, top + y, Rgba([rgba[0], rgba[1], rgba[2], c]));
                }
            }
        }
    }

    let mut surf = surf.crop(&surf.bounding_rect());
    surf.subtract_alpha(255 - rgba[3]);
    surf
}

impl Sprite for Label {
    fn surface(&self) -> &Rc<Surface> {
        &self.surf
    }

    fn rect(&self) -> &Rect {
        &self.rect
    }

    fn rect_mut(&mut self) -> &mut Rect {
        &mut self.rect
    }

    fn osd(&self) -> bool {
        self.style.osd
    }

    fn set_osd(&mut self, osd: bool) {
        self.style.osd = osd;
    }
}

impl fmt::Debug for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Label")
            .field("text", &self.text)
            .field("style", &self.style)
            .field("rect", &self.rect)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(width: u32, height: u32) -> Coverage {
        Coverage {
            width,
            height,
            data: vec![255; (width * height) as usize],
        }
    }

    #[test]
    fn color_is_clamped() {
        let c = Color::new(1.5, -0.2, 0.5, 1.0);

        assert_eq!(c.rgba(), (1.0, 0.0, 0.5, 1.0));
        assert_eq!(c.to_rgba8(), Rgba([255, 0, 127, 255]));
    }

    #[test]
    fn alignment_parsing() {
        assert_eq!("center".parse::<Alignment>().unwrap(), Alignment::Center);
        assert!(matches!("middle".parse::<Alignment>(), Err(MinduError::InvalidArgument(_))));
    }

    #[test]
    fn lines_are_stacked_and_aligned() {
        let lines = [line(4, 2), line(2, 2)];

        let right = compose(&lines, 3, Alignment::Right, Color::WHITE);
        // Two lines 3px apart, the blank row between them is kept, the trailing one is cropped
        assert_eq!(right.size(), (4, 5));
        assert_eq!(right.pixel(0, 3).0[3], 0);
        assert_eq!(right.pixel(3, 3).0[3], 255);

        let centered = compose(&lines, 3, Alignment::Center, Color::WHITE);
        assert_eq!(centered.pixel(0, 3).0[3], 0);
        assert_eq!(centered.pixel(1, 3).0[3], 255);
        assert_eq!(centered.pixel(3, 3).0[3], 0);
    }

    #[test]
    fn color_alpha_is_subtracted() {
        let s = compose(&[line(1, 1)], 1, Alignment::Left, Color::new(1.0, 0.0, 0.0, 0.5));

        assert_eq!(s.pixel(0, 0), Rgba([255, 0, 0, 127]));
    }

    #[test]
    fn empty_text_is_empty() {
        let s = compose(&[Coverage::new(0, 5)], 5, Alignment::Left, Color::WHITE);
        assert_eq!(s.size(), (0, 0));
    }

    #[test]
    fn zero_size_is_rejected() {
        let fonts = Fonts::new(None).unwrap();
        let style = LabelStyle {
            size: 0,
            ..Default::default()
        };

        assert!(matches!(Label::new(&fonts, "hi", style), Err(MinduError::InvalidArgument(_))));
    }

    fn sized(size: u32) -> LabelStyle {
        LabelStyle {
            size,
            ..Default::default()
        }
    }

    /// Columns holding a visible pixel on row `y`
    fn opaque_columns(s: &Surface, y: u32) -> Vec<u32> {
        (0..s.size().0).filter(|&x| s.pixel(x, y).0[3] > 0).collect()
    }

    #[test]
    fn renders_with_the_builtin_font() {
        let fonts = Fonts::new(None).unwrap();
        let label = Label::new(&fonts, "Hello", sized(20)).unwrap();

        assert_eq!(label.font_name(), "default");
        assert!(label.width() > 20);
        assert!(label.height() > 5 && label.height() <= 30);
        assert_eq!(label.rect().size(), (label.surface().size().0 as i32, label.surface().size().1 as i32));
    }

    #[test]
    fn new_text_keeps_the_centre() {
        let fonts = Fonts::new(None).unwrap();
        let mut label = Label::new(&fonts, "Hi", sized(20))
            .unwrap()
            .placed(Placement::Center(100, 50));
        let narrow = label.width();

        label.set_text("Hello, world").unwrap();

        assert_eq!(label.text(), "Hello, world");
        assert_eq!(label.center(), (100, 50));
        assert!(label.width() > narrow);
    }

    #[test]
    fn styles_change_the_raster() {
        let fonts = Fonts::new(None).unwrap();
        let mut label = Label::new(&fonts, "Hello", sized(24)).unwrap();
        let (w, h) = label.size();

        label.set_bold(true).unwrap();
        assert!(label.width() > w);
        label.toggle_bold().unwrap();
        assert_eq!(label.size(), (w, h));

        label.set_italic(true).unwrap();
        assert!(label.width() > w);
        label.toggle_italic().unwrap();

        // The rule sits under the baseline
        label.set_underline(true).unwrap();
        assert!(label.height() > h);
        let bottom = label.surface().size().1 - 1;
        assert_eq!(opaque_columns(label.surface(), bottom).len() as i32, label.width());
    }

    #[test]
    fn lines_follow_the_alignment() {
        let fonts = Fonts::new(None).unwrap();
        let style = LabelStyle {
            alignment: Alignment::Right,
            ..sized(20)
        };
        let mut label = Label::new(&fonts, "Wide line\ni", style).unwrap();
        let half = label.surface().size().0 / 2;
        let bottom = label.surface().size().1 - 1;

        let right = opaque_columns(label.surface(), bottom);
        assert!(!right.is_empty());
        assert!(right.iter().all(|&x| x > half));

        label.set_alignment(Alignment::Left).unwrap();
        let left = opaque_columns(label.surface(), bottom);
        assert!(!left.is_empty());
        assert!(left.iter().all(|&x| x < half));
    }

    #[test]
    fn failed_font_change_keeps_the_label() {
        let fonts = Fonts::new(None).unwrap();
        let mut label = Label::new(&fonts, "Hello", sized(20)).unwrap();
        let before = Rc::clone(label.surface());

        let missing = std::env::temp_dir().join("mindu_no_such_font.ttf");
        assert!(matches!(label.set_font(Some(missing)), Err(MinduError::Load { .. })));

        assert_eq!(label.font(), None);
        assert!(Rc::ptr_eq(label.surface(), &before));
    }
}
