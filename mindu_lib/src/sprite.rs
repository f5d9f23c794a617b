use std::rc::Rc;
use crate::error::MinduResult;
use crate::rect::{Placement, Rect};
use crate::screen::Screen;
use crate::surface::Surface;

/// Something with pixels and a position on the screen: an [`Image`](crate::Image), a
/// [`Label`](crate::Label) or an [`Animation`](crate::Animation).
///
/// The rect always has the size of the current surface. Only the position can be changed through
/// this trait.
pub trait Sprite {
    fn surface(&self) -> &Rc<Surface>;
    fn rect(&self) -> &Rect;
    fn rect_mut(&mut self) -> &mut Rect;
    /// On-Screen Display sprites are composited after every screen effect
    fn osd(&self) -> bool;
    fn set_osd(&mut self, osd: bool);

    fn toggle_osd(&mut self) {
        let osd = self.osd();
        self.set_osd(!osd);
    }

    fn width(&self) -> i32 { self.rect().width() }
    fn height(&self) -> i32 { self.rect().height() }
    fn size(&self) -> (i32, i32) { self.rect().size() }
    fn top(&self) -> i32 { self.rect().top() }
    fn left(&self) -> i32 { self.rect().left() }
    fn bottom(&self) -> i32 { self.rect().bottom() }
    fn right(&self) -> i32 { self.rect().right() }
    fn centerx(&self) -> i32 { self.rect().centerx() }
    fn centery(&self) -> i32 { self.rect().centery() }
    fn topleft(&self) -> (i32, i32) { self.rect().topleft() }
    fn bottomleft(&self) -> (i32, i32) { self.rect().bottomleft() }
    fn topright(&self) -> (i32, i32) { self.rect().topright() }
    fn bottomright(&self) -> (i32, i32) { self.rect().bottomright() }
    fn midtop(&self) -> (i32, i32) { self.rect().midtop() }
    fn midleft(&self) -> (i32, i32) { self.rect().midleft() }
    fn midbottom(&self) -> (i32, i32) { self.rect().midbottom() }
    fn midright(&self) -> (i32, i32) { self.rect().midright() }
    fn center(&self) -> (i32, i32) { self.rect().center() }

    fn place(&mut self, placement: Placement) {
        self.rect_mut().place(placement);
    }

    fn move_by(&mut self, dx: i32, dy: i32) {
        self.rect_mut().move_by(dx, dy);
    }

    /// Moves `other` inside this sprite (centring it on axes where it doesn't fit) and returns
    /// by how many pixels its centre moved.
    fn grab(&self, other: &mut dyn Sprite) -> (i32, i32) {
        grab_into(self.rect(), other)
    }

    fn contains(&self, other: &dyn Sprite) -> bool {
        self.rect().contains(other.rect())
    }

    fn collide(&self, other: &dyn Sprite) -> bool {
        self.rect().collide_rect(other.rect())
    }

    fn collide_point(&self, (x, y): (i32, i32)) -> bool {
        self.rect().collide_point(x, y)
    }

    /// Blits the sprite to the screen, or queues it for the end of the frame if it's OSD. Only
    /// valid while the frame loop is running.
    fn draw(&mut self, screen: &mut Screen) -> MinduResult<()> {
        screen.draw_surface(self.surface(), *self.rect(), self.osd())
    }
}

pub(crate) fn grab_into(area: &Rect, other: &mut dyn Sprite) -> (i32, i32) {
    let before = *other.rect();
    let after = before.clamp(area);

    *other.rect_mut() = after;

    (after.centerx() - before.centerx(), after.centery() - before.centery())
}
