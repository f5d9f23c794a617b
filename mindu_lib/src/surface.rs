//! Software RGBA surfaces.
//!
//! Every blit, blend and transform the sprites and the screen need goes through here. Pixels are
//! stored as straight (non premultiplied) RGBA8.

use std::path::Path;
use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgba, RgbaImage};
use tracing::debug;
use crate::error::{extension_upper, MinduError, MinduResult};
use crate::rect::Rect;

/// Image formats accepted by [`Surface::load`], one per enabled `image` decoder
pub const IMAGE_EXTENSIONS: [&str; 9] = ["JPEG", "JPG", "PNG", "GIF", "BMP", "TGA", "TIF", "TIFF", "PBM"];

pub const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
pub const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

#[derive(Clone, Debug, PartialEq)]
pub struct Surface {
    img: RgbaImage,
}

impl Surface {
    /// Fully transparent surface
    pub fn new(width: u32, height: u32) -> Surface {
        Surface {
            img: RgbaImage::new(width, height),
        }
    }

    pub fn filled(width: u32, height: u32, color: Rgba<u8>) -> Surface {
        Surface {
            img: RgbaImage::from_pixel(width, height, color),
        }
    }

    pub fn from_image(img: RgbaImage) -> Surface {
        Surface { img }
    }

    /// Decodes an image file. When `alpha` is false the result is made fully opaque.
    pub fn load<P: AsRef<Path>>(path: P, alpha: bool) -> MinduResult<Surface> {
        let path = path.as_ref();

        match extension_upper(path) {
            Some(ext) if IMAGE_EXTENSIONS.contains(&ext.as_str()) => (),
            _ => return Err(MinduError::load(path, "unsupported image format")),
        }

        if !path.is_file() {
            return Err(MinduError::load(path, "no such file"));
        }

        let mut img = image::open(path)
            .map_err(|e| MinduError::load(path, e))?
            .to_rgba8();

        if !alpha {
            for p in img.pixels_mut() {
                p.0[3] = 0xff;
            }
        }

        debug!("Loaded {} ({}x{})", path.display(), img.width(), img.height());

        Ok(Surface { img })
    }

    /// Encodes the surface to `path`, the format is picked from the extension. The alpha channel
    /// is dropped.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> MinduResult<()> {
        let rgb = DynamicImage::ImageRgba8(self.img.clone()).to_rgb8();
        rgb.save(path.as_ref())?;
        Ok(())
    }

    pub fn width(&self) -> u32 {
        self.img.width()
    }

    pub fn height(&self) -> u32 {
        self.img.height()
    }

    pub fn size(&self) -> (u32, u32) {
        self.img.dimensions()
    }

    pub fn rect(&self) -> Rect {
        Rect::sized(self.width(), self.height())
    }

    pub fn image(&self) -> &RgbaImage {
        &self.img
    }

    /// Raw RGBA bytes, row major, no padding
    pub fn as_bytes(&self) -> &[u8] {
        self.img.as_raw()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgba<u8> {
        *self.img.get_pixel(x, y)
    }

    pub fn put_pixel(&mut self, x: u32, y: u32, color: Rgba<u8>) {
        self.img.put_pixel(x, y, color);
    }

    pub fn fill(&mut self, color: Rgba<u8>) {
        for p in self.img.pixels_mut() {
            *p = color;
        }
    }

    /// Alpha-blends `src` with its top-left corner at `(x, y)`
    pub fn blit(&mut self, src: &Surface, x: i32, y: i32) {
        self.blit_alpha(src, x, y, 0xff);
    }

    /// Like `blit` with an extra constant opacity applied to the whole of `src`
    pub fn blit_alpha(&mut self, src: &Surface, x: i32, y: i32, alpha: u8) {
        if alpha == 0 {
            return;
        }

        let dst_rect = self.rect();
        let src_rect = Rect::new(x, y, src.width() as i32, src.height() as i32);

        let area = match dst_rect.intersection(&src_rect) {
            Some(a) => a,
            None => return,
        };

        for dy in area.top()..area.bottom() {
            for dx in area.left()..area.right() {
                let s = src.img.get_pixel((dx - x) as u32, (dy - y) as u32);
                let d = self.img.get_pixel_mut(dx as u32, dy as u32);

                *d = blend(*d, *s, alpha);
            }
        }
    }

    /// Saturating subtraction of a constant color from every pixel, alpha untouched
    pub fn subtract_rgb(&mut self, r: u8, g: u8, b: u8) {
        if r == 0 && g == 0 && b == 0 {
            return;
        }

        for p in self.img.pixels_mut() {
            p.0[0] = p.0[0].saturating_sub(r);
            p.0[1] = p.0[1].saturating_sub(g);
            p.0[2] = p.0[2].saturating_sub(b);
        }
    }

    /// Saturating subtraction of `a` from every pixel's alpha
    pub fn subtract_alpha(&mut self, a: u8) {
        if a == 0 {
            return;
        }

        for p in self.img.pixels_mut() {
            p.0[3] = p.0[3].saturating_sub(a);
        }
    }

    /// Copy of the part of the surface covered by `rect`, clipped to the surface
    pub fn crop(&self, rect: &Rect) -> Surface {
        match self.rect().intersection(rect) {
            Some(r) => Surface {
                img: imageops::crop_imm(&self.img, r.x as u32, r.y as u32, r.w as u32, r.h as u32)
                    .to_image(),
            },
            None => Surface::new(0, 0),
        }
    }

    pub fn flip(&self, horizontal: bool, vertical: bool) -> Surface {
        let mut img = self.img.clone();

        if horizontal {
            imageops::flip_horizontal_in_place(&mut img);
        }
        if vertical {
            imageops::flip_vertical_in_place(&mut img);
        }

        Surface { img }
    }

    /// Filtered rescale to exactly `width` by `height`
    pub fn smooth_scale(&self, width: u32, height: u32) -> Surface {
        if (width, height) == self.size() {
            return self.clone();
        }

        Surface {
            img: imageops::resize(&self.img, width, height, FilterType::Triangle),
        }
    }

    /// Rotates counter-clockwise by `angle` degrees and scales by `scale`. The result grows to
    /// the bounding box of the rotated image, uncovered pixels are transparent.
    pub fn rotozoom(&self, angle: f64, scale: f64) -> Surface {
        let angle = angle.rem_euclid(360.0);

        if angle == 0.0 || angle == 90.0 || angle == 180.0 || angle == 270.0 {
            let img = match angle as u32 {
                90 => imageops::rotate270(&self.img),
                180 => imageops::rotate180(&self.img),
                270 => imageops::rotate90(&self.img),
                _ => self.img.clone(),
            };

            let rotated = Surface { img };

            if scale == 1.0 {
                return rotated;
            }

            let w = ((rotated.width() as f64) * scale).round().max(1.0) as u32;
            let h = ((rotated.height() as f64) * scale).round().max(1.0) as u32;

            return rotated.smooth_scale(w, h);
        }

        let (sin, cos) = angle.to_radians().sin_cos();
        let sw = self.width() as f64 * scale;
        let sh = self.height() as f64 * scale;

        let dw = (sw * cos.abs() + sh * sin.abs()).ceil().max(1.0) as u32;
        let dh = (sw * sin.abs() + sh * cos.abs()).ceil().max(1.0) as u32;

        let mut img = RgbaImage::new(dw, dh);

        let half_src = (self.width() as f64 / 2.0, self.height() as f64 / 2.0);
        let half_dst = (dw as f64 / 2.0, dh as f64 / 2.0);

        for (dx, dy, p) in img.enumerate_pixels_mut() {
            let x = dx as f64 + 0.5 - half_dst.0;
            let y = dy as f64 + 0.5 - half_dst.1;

            // Inverse of the on-screen counter-clockwise rotation (y points down)
            let sx = (x * cos - y * sin) / scale + half_src.0 - 0.5;
            let sy = (x * sin + y * cos) / scale + half_src.1 - 0.5;

            *p = self.sample_bilinear(sx, sy);
        }

        Surface { img }
    }

    fn sample_bilinear(&self, x: f64, y: f64) -> Rgba<u8> {
        let (w, h) = (self.width() as f64, self.height() as f64);

        if x < -0.5 || y < -0.5 || x > w - 0.5 || y > h - 0.5 {
            return TRANSPARENT;
        }

        let x0 = x.floor();
        let y0 = y.floor();
        let fx = x - x0;
        let fy = y - y0;

        let fetch = |px: f64, py: f64| -> [f64; 4] {
            let px = px.clamp(0.0, w - 1.0) as u32;
            let py = py.clamp(0.0, h - 1.0) as u32;
            let p = self.img.get_pixel(px, py).0;
            [p[0] as f64, p[1] as f64, p[2] as f64, p[3] as f64]
        };

        let a = fetch(x0, y0);
        let b = fetch(x0 + 1.0, y0);
        let c = fetch(x0, y0 + 1.0);
        let d = fetch(x0 + 1.0, y0 + 1.0);

        let mut out = [0u8; 4];
        for i in 0..4 {
            let top = a[i] + (b[i] - a[i]) * fx;
            let bottom = c[i] + (d[i] - c[i]) * fx;
            out[i] = (top + (bottom - top) * fy).round().clamp(0.0, 255.0) as u8;
        }

        Rgba(out)
    }

    /// Smallest rectangle containing every pixel with a non-zero alpha. Empty at the origin if
    /// the surface is fully transparent.
    pub fn bounding_rect(&self) -> Rect {
        let mut min = (u32::MAX, u32::MAX);
        let mut max = (0, 0);
        let mut found = false;

        for (x, y, p) in self.img.enumerate_pixels() {
            if p.0[3] != 0 {
                found = true;
                min = (min.0.min(x), min.1.min(y));
                max = (max.0.max(x), max.1.max(y));
            }
        }

        if !found {
            return Rect::new(0, 0, 0, 0);
        }

        Rect::new(
            min.0 as i32,
            min.1 as i32,
            (max.0 - min.0 + 1) as i32,
            (max.1 - min.1 + 1) as i32,
        )
    }
}

/// Source-over blending of straight alpha pixels, with `src` opacity scaled by `alpha`
fn blend(dst: Rgba<u8>, src: Rgba<u8>, alpha: u8) -> Rgba<u8> {
    let sa = (src.0[3] as u32 * alpha as u32) / 255;

    if sa == 0 {
        return dst;
    }
    if sa == 255 {
        return Rgba([src.0[0], src.0[1], src.0[2], 255]);
    }

    let da = dst.0[3] as u32;
    let da_weighted = da * (255 - sa) / 255;
    let out_a = sa + da_weighted;

    if out_a == 0 {
        return TRANSPARENT;
    }

    let mut out = [0u8; 4];
    for i in 0..3 {
        let c = src.0[i] as u32 * sa + dst.0[i] as u32 * da_weighted;
        out[i] = (c / out_a) as u8;
    }
    out[3] = out_a as u8;

    Rgba(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const GREEN: Rgba<u8> = Rgba([0, 255, 0, 255]);

    #[test]
    fn blit_is_clipped() {
        let mut dst = Surface::filled(4, 4, BLACK);
        let src = Surface::filled(3, 3, RED);

        dst.blit(&src, 2, -1);

        assert_eq!(dst.pixel(2, 0), RED);
        assert_eq!(dst.pixel(3, 1), RED);
        assert_eq!(dst.pixel(3, 2), BLACK);
        assert_eq!(dst.pixel(1, 0), BLACK);
    }

    #[test]
    fn transparent_pixels_do_not_overwrite() {
        let mut dst = Surface::filled(2, 1, GREEN);
        let mut src = Surface::new(2, 1);
        src.put_pixel(1, 0, RED);

        dst.blit(&src, 0, 0);

        assert_eq!(dst.pixel(0, 0), GREEN);
        assert_eq!(dst.pixel(1, 0), RED);
    }

    #[test]
    fn constant_alpha_blends() {
        let mut dst = Surface::filled(1, 1, Rgba([200, 200, 200, 255]));

        dst.blit_alpha(&Surface::filled(1, 1, BLACK), 0, 0, 128);

        let p = dst.pixel(0, 0);
        assert_eq!(p.0[3], 255);
        assert!(p.0[0] > 90 && p.0[0] < 110, "got {:?}", p);
    }

    #[test]
    fn rgb_subtraction_saturates() {
        let mut s = Surface::filled(1, 1, Rgba([100, 50, 10, 200]));

        s.subtract_rgb(60, 60, 0);

        assert_eq!(s.pixel(0, 0), Rgba([40, 0, 10, 200]));
    }

    #[test]
    fn crop_and_bounding_rect() {
        let mut s = Surface::new(10, 10);
        s.put_pixel(3, 4, RED);
        s.put_pixel(6, 5, RED);

        let bounds = s.bounding_rect();
        assert_eq!(bounds, Rect::new(3, 4, 4, 2));

        let cropped = s.crop(&bounds);
        assert_eq!(cropped.size(), (4, 2));
        assert_eq!(cropped.pixel(0, 0), RED);
        assert_eq!(cropped.pixel(3, 1), RED);

        assert_eq!(Surface::new(3, 3).bounding_rect(), Rect::new(0, 0, 0, 0));
    }

    #[test]
    fn flip_horizontal() {
        let mut s = Surface::filled(2, 1, GREEN);
        s.put_pixel(0, 0, RED);

        let f = s.flip(true, false);

        assert_eq!(f.pixel(1, 0), RED);
        assert_eq!(f.pixel(0, 0), GREEN);
    }

    #[test]
    fn quarter_turn_is_counter_clockwise() {
        // Red pixel on the right edge ends up on the top edge
        let mut s = Surface::filled(3, 1, GREEN);
        s.put_pixel(2, 0, RED);

        let r = s.rotozoom(90.0, 1.0);

        assert_eq!(r.size(), (1, 3));
        assert_eq!(r.pixel(0, 0), RED);
    }

    #[test]
    fn rotation_grows_bounding_box() {
        let r = Surface::filled(10, 10, RED).rotozoom(45.0, 1.0);

        assert!(r.width() >= 14 && r.width() <= 15);
        assert_eq!(r.pixel(0, 0).0[3], 0);
        assert_eq!(r.pixel(r.width() / 2, r.height() / 2), RED);
    }

    #[test]
    fn zoom_scales() {
        let r = Surface::filled(10, 4, RED).rotozoom(0.0, 2.0);
        assert_eq!(r.size(), (20, 8));
    }

    #[test]
    fn every_listed_format_loads() {
        let dir = crate::test_util::TempDir::new("formats");
        let img = image::RgbImage::from_pixel(3, 2, image::Rgb([200, 40, 40]));

        for ext in IMAGE_EXTENSIONS {
            let path = dir.path().join(format!("pic.{}", ext.to_ascii_lowercase()));
            img.save(&path).unwrap();

            let surf = Surface::load(&path, true).unwrap();
            assert_eq!(surf.size(), (3, 2), "{}", ext);
        }
    }

    #[test]
    fn unlisted_formats_are_refused() {
        let dir = crate::test_util::TempDir::new("formats");

        for name in ["pic.xpm", "pic.pcx", "pic.lbm"] {
            let path = dir.path().join(name);
            std::fs::write(&path, b"whatever").unwrap();

            assert!(matches!(Surface::load(&path, true), Err(MinduError::Load { .. })));
        }
    }
}
