use std::path::Path;
use std::rc::Rc;
use crate::error::{MinduError, MinduResult};
use crate::rect::{Placement, Rect};
use crate::sprite::Sprite;
use crate::surface::Surface;

/// A still picture. Cloning is cheap: clones share the pixels and own their position.
#[derive(Clone, Debug)]
pub struct Image {
    surf: Rc<Surface>,
    rect: Rect,
    osd: bool,
}

impl Image {
    /// Loads an image file (JPEG, PNG, GIF, BMP, TGA, TIFF or PBM). When `alpha`
    /// is false the image is made opaque.
    pub fn load<P: AsRef<Path>>(path: P, alpha: bool) -> MinduResult<Image> {
        let surf = Surface::load(path, alpha)?;
        Ok(Image::from_surface(surf))
    }

    pub fn from_surface(surf: Surface) -> Image {
        Image::from_shared(Rc::new(surf))
    }

    pub(crate) fn from_shared(surf: Rc<Surface>) -> Image {
        let rect = surf.rect();

        Image {
            surf,
            rect,
            osd: false,
        }
    }

    pub fn with_osd(mut self, osd: bool) -> Image {
        self.osd = osd;
        self
    }

    pub fn placed(mut self, placement: Placement) -> Image {
        self.rect.place(placement);
        self
    }

    /// New image from transformed pixels, centred on this one
    fn derive(&self, surf: Surface) -> Image {
        let mut rect = surf.rect();
        rect.set_center(self.rect.center());

        Image {
            surf: Rc::new(surf),
            rect,
            osd: self.osd,
        }
    }

    pub fn flip(&self, horizontal: bool, vertical: bool) -> Image {
        self.derive(self.surf.flip(horizontal, vertical))
    }

    pub fn resize(&self, width: i32, height: i32) -> MinduResult<Image> {
        if width <= 0 || height <= 0 {
            return Err(MinduError::invalid_argument(format!(
                "resize(): size must be positive, got {}x{}",
                width, height
            )));
        }

        Ok(self.derive(self.surf.smooth_scale(width as u32, height as u32)))
    }

    /// Clockwise rotation by `angle` degrees
    pub fn rotate(&self, angle: f64) -> Image {
        self.derive(self.surf.rotozoom(-angle, 1.0))
    }

    /// Scales both dimensions by `factor`, keeping the aspect ratio
    pub fn scale(&self, factor: f64) -> MinduResult<Image> {
        if factor <= 0.0 {
            return Err(MinduError::invalid_argument(format!(
                "scale(): factor must be greater than 0, got {}",
                factor
            )));
        }

        Ok(self.derive(self.surf.rotozoom(0.0, factor)))
    }
}

impl Sprite for Image {
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
        self.osd
    }

    fn set_osd(&mut self, osd: bool) {
        self.osd = osd;
    }
}
