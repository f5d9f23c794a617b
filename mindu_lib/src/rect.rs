//! Integer rectangles and the placement vocabulary used by every sprite and by the screen.

use std::fmt;
use std::str::FromStr;
use crate::error::MinduError;

/// Axis-aligned rectangle. `right` and `bottom` are exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Rect {
        Rect { x, y, w, h }
    }

    /// Rectangle of size `(w, h)` with its top-left corner at the origin
    pub const fn sized(w: u32, h: u32) -> Rect {
        Rect { x: 0, y: 0, w: w as i32, h: h as i32 }
    }

    pub fn width(&self) -> i32 { self.w }
    pub fn height(&self) -> i32 { self.h }
    pub fn size(&self) -> (i32, i32) { (self.w, self.h) }

    pub fn top(&self) -> i32 { self.y }
    pub fn left(&self) -> i32 { self.x }
    pub fn bottom(&self) -> i32 { self.y + self.h }
    pub fn right(&self) -> i32 { self.x + self.w }
    pub fn centerx(&self) -> i32 { self.x + self.w / 2 }
    pub fn centery(&self) -> i32 { self.y + self.h / 2 }

    pub fn topleft(&self) -> (i32, i32) { (self.left(), self.top()) }
    pub fn bottomleft(&self) -> (i32, i32) { (self.left(), self.bottom()) }
    pub fn topright(&self) -> (i32, i32) { (self.right(), self.top()) }
    pub fn bottomright(&self) -> (i32, i32) { (self.right(), self.bottom()) }
    pub fn midtop(&self) -> (i32, i32) { (self.centerx(), self.top()) }
    pub fn midleft(&self) -> (i32, i32) { (self.left(), self.centery()) }
    pub fn midbottom(&self) -> (i32, i32) { (self.centerx(), self.bottom()) }
    pub fn midright(&self) -> (i32, i32) { (self.right(), self.centery()) }
    pub fn center(&self) -> (i32, i32) { (self.centerx(), self.centery()) }

    pub fn set_top(&mut self, v: i32) { self.y = v; }
    pub fn set_left(&mut self, v: i32) { self.x = v; }
    pub fn set_bottom(&mut self, v: i32) { self.y = v - self.h; }
    pub fn set_right(&mut self, v: i32) { self.x = v - self.w; }
    pub fn set_centerx(&mut self, v: i32) { self.x = v - self.w / 2; }
    pub fn set_centery(&mut self, v: i32) { self.y = v - self.h / 2; }

    pub fn set_center(&mut self, (x, y): (i32, i32)) {
        self.set_centerx(x);
        self.set_centery(y);
    }

    /// Moves the rectangle so that `placement` holds. The size never changes.
    pub fn place(&mut self, placement: Placement) {
        use Placement::*;

        match placement {
            Top(v) => self.set_top(v),
            Left(v) => self.set_left(v),
            Bottom(v) => self.set_bottom(v),
            Right(v) => self.set_right(v),
            CenterX(v) => self.set_centerx(v),
            CenterY(v) => self.set_centery(v),
            TopLeft(x, y) => { self.set_left(x); self.set_top(y); }
            BottomLeft(x, y) => { self.set_left(x); self.set_bottom(y); }
            TopRight(x, y) => { self.set_right(x); self.set_top(y); }
            BottomRight(x, y) => { self.set_right(x); self.set_bottom(y); }
            MidTop(x, y) => { self.set_centerx(x); self.set_top(y); }
            MidLeft(x, y) => { self.set_left(x); self.set_centery(y); }
            MidBottom(x, y) => { self.set_centerx(x); self.set_bottom(y); }
            MidRight(x, y) => { self.set_right(x); self.set_centery(y); }
            Center(x, y) => self.set_center((x, y)),
        }
    }

    /// Copy of this rectangle with `placement` applied
    pub fn placed(mut self, placement: Placement) -> Rect {
        self.place(placement);
        self
    }

    pub fn move_by(&mut self, dx: i32, dy: i32) {
        self.x += dx;
        self.y += dy;
    }

    /// Copy of this rectangle moved completely inside `other`. On an axis where this rectangle
    /// is bigger than `other` it gets centred instead.
    pub fn clamp(&self, other: &Rect) -> Rect {
        let x = if self.w >= other.w {
            other.x + other.w / 2 - self.w / 2
        } else if self.x < other.x {
            other.x
        } else if self.right() > other.right() {
            other.right() - self.w
        } else {
            self.x
        };

        let y = if self.h >= other.h {
            other.y + other.h / 2 - self.h / 2
        } else if self.y < other.y {
            other.y
        } else if self.bottom() > other.bottom() {
            other.bottom() - self.h
        } else {
            self.y
        };

        Rect { x, y, w: self.w, h: self.h }
    }

    pub fn clamp_in_place(&mut self, other: &Rect) {
        *self = self.clamp(other);
    }

    pub fn contains(&self, other: &Rect) -> bool {
        self.x <= other.x
            && self.y <= other.y
            && self.right() >= other.right()
            && self.bottom() >= other.bottom()
            && self.right() > other.x
            && self.bottom() > other.y
    }

    pub fn collide_rect(&self, other: &Rect) -> bool {
        if self.w == 0 || self.h == 0 || other.w == 0 || other.h == 0 {
            return false;
        }

        self.x < other.right()
            && self.y < other.bottom()
            && self.right() > other.x
            && self.bottom() > other.y
    }

    pub fn collide_point(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Intersection of both rectangles, `None` when they don't overlap
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());

        if x1 > x0 && y1 > y0 {
            Some(Rect::new(x0, y0, x1 - x0, y1 - y0))
        } else {
            None
        }
    }
}

/// The rectangle attributes a sprite can be positioned by
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Anchor {
    Top,
    Left,
    Bottom,
    Right,
    CenterX,
    CenterY,
    TopLeft,
    BottomLeft,
    TopRight,
    BottomRight,
    MidTop,
    MidLeft,
    MidBottom,
    MidRight,
    Center,
}

impl Anchor {
    pub const ALL: [Anchor; 15] = [
        Anchor::Top,
        Anchor::Left,
        Anchor::Bottom,
        Anchor::Right,
        Anchor::CenterX,
        Anchor::CenterY,
        Anchor::TopLeft,
        Anchor::BottomLeft,
        Anchor::TopRight,
        Anchor::BottomRight,
        Anchor::MidTop,
        Anchor::MidLeft,
        Anchor::MidBottom,
        Anchor::MidRight,
        Anchor::Center,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Anchor::Top => "top",
            Anchor::Left => "left",
            Anchor::Bottom => "bottom",
            Anchor::Right => "right",
            Anchor::CenterX => "centerx",
            Anchor::CenterY => "centery",
            Anchor::TopLeft => "topleft",
            Anchor::BottomLeft => "bottomleft",
            Anchor::TopRight => "topright",
            Anchor::BottomRight => "bottomright",
            Anchor::MidTop => "midtop",
            Anchor::MidLeft => "midleft",
            Anchor::MidBottom => "midbottom",
            Anchor::MidRight => "midright",
            Anchor::Center => "center",
        }
    }

    /// Current value of this attribute on `rect`
    pub fn placement_of(self, rect: &Rect) -> Placement {
        match self {
            Anchor::Top => Placement::Top(rect.top()),
            Anchor::Left => Placement::Left(rect.left()),
            Anchor::Bottom => Placement::Bottom(rect.bottom()),
            Anchor::Right => Placement::Right(rect.right()),
            Anchor::CenterX => Placement::CenterX(rect.centerx()),
            Anchor::CenterY => Placement::CenterY(rect.centery()),
            Anchor::TopLeft => Placement::TopLeft(rect.left(), rect.top()),
            Anchor::BottomLeft => Placement::BottomLeft(rect.left(), rect.bottom()),
            Anchor::TopRight => Placement::TopRight(rect.right(), rect.top()),
            Anchor::BottomRight => Placement::BottomRight(rect.right(), rect.bottom()),
            Anchor::MidTop => Placement::MidTop(rect.centerx(), rect.top()),
            Anchor::MidLeft => Placement::MidLeft(rect.left(), rect.centery()),
            Anchor::MidBottom => Placement::MidBottom(rect.centerx(), rect.bottom()),
            Anchor::MidRight => Placement::MidRight(rect.right(), rect.centery()),
            Anchor::Center => Placement::Center(rect.centerx(), rect.centery()),
        }
    }
}

impl Default for Anchor {
    fn default() -> Anchor {
        Anchor::MidBottom
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Anchor {
    type Err = MinduError;

    fn from_str(s: &str) -> Result<Anchor, MinduError> {
        Anchor::ALL
            .iter()
            .copied()
            .find(|a| a.name() == s)
            .ok_or_else(|| MinduError::invalid_argument(format!("invalid anchor: \"{}\"", s)))
    }
}

/// An anchor together with the value it should take
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placement {
    Top(i32),
    Left(i32),
    Bottom(i32),
    Right(i32),
    CenterX(i32),
    CenterY(i32),
    TopLeft(i32, i32),
    BottomLeft(i32, i32),
    TopRight(i32, i32),
    BottomRight(i32, i32),
    MidTop(i32, i32),
    MidLeft(i32, i32),
    MidBottom(i32, i32),
    MidRight(i32, i32),
    Center(i32, i32),
}

impl Placement {
    pub fn anchor(&self) -> Anchor {
        match self {
            Placement::Top(_) => Anchor::Top,
            Placement::Left(_) => Anchor::Left,
            Placement::Bottom(_) => Anchor::Bottom,
            Placement::Right(_) => Anchor::Right,
            Placement::CenterX(_) => Anchor::CenterX,
            Placement::CenterY(_) => Anchor::CenterY,
            Placement::TopLeft(..) => Anchor::TopLeft,
            Placement::BottomLeft(..) => Anchor::BottomLeft,
            Placement::TopRight(..) => Anchor::TopRight,
            Placement::BottomRight(..) => Anchor::BottomRight,
            Placement::MidTop(..) => Anchor::MidTop,
            Placement::MidLeft(..) => Anchor::MidLeft,
            Placement::MidBottom(..) => Anchor::MidBottom,
            Placement::MidRight(..) => Anchor::MidRight,
            Placement::Center(..) => Anchor::Center,
        }
    }
}
