//! The screen: render target, frame compositing, zoom, color effects and replays.
//!
//! Sprites drawn during a frame either land on the render target right away (world sprites) or
//! wait in the OSD list. At the end of the frame [`Screen::composite`] applies, in order, the
//! brightness overlay, the zoom, the color subtraction, the OSD sprites and the cursor, then
//! hands the frame to the backend and clears the target to black.

use std::collections::VecDeque;
use std::path::Path;
use std::rc::Rc;
use image::Rgba;
use tracing::{debug, error, info};
use crate::animation::Animation;
use crate::backend::Backend;
use crate::error::{extension_upper, MinduError, MinduResult};
use crate::picture::Image;
use crate::rect::{Placement, Rect};
use crate::settings::DEFAULT_TITLE;
use crate::sprite::{grab_into, Sprite};
use crate::surface::{Surface, BLACK};

/// Formats [`Screen::shot`] can write
pub const SHOT_EXTENSIONS: [&str; 4] = ["BMP", "TGA", "PNG", "JPEG"];

const LOGO: [&str; 16] = [
    "  XXXXXXXXXXXX  ",
    " X............X ",
    "X..............X",
    "X..##......##..X",
    "X..###....###..X",
    "X..####..####..X",
    "X..##.####.##..X",
    "X..##..##..##..X",
    "X..##......##..X",
    "X..##......##..X",
    "X..##......##..X",
    "X..##......##..X",
    "X..............X",
    "X..............X",
    " X............X ",
    "  XXXXXXXXXXXX  ",
];

/// Built-in window icon, a red M on a pink tile
pub fn default_icon() -> Image {
    let mut surf = Surface::new(LOGO[0].len() as u32, LOGO.len() as u32);

    for (y, row) in LOGO.iter().enumerate() {
        for (x, c) in row.chars().enumerate() {
            let color = match c {
                'X' => Rgba([60, 20, 30, 255]),
                '.' => Rgba([255, 180, 180, 255]),
                '#' => Rgba([190, 20, 40, 255]),
                _ => continue,
            };
            surf.put_pixel(x as u32, y as u32, color);
        }
    }

    Image::from_surface(surf)
}

/// Display changes waiting to be forwarded to the backend
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum DisplayRequest {
    Fullscreen(bool),
    Title(String),
    Icon(Rc<Surface>),
}

fn channel_subtraction(value: f64) -> u8 {
    255 - (value * 255.0) as u8
}

#[derive(Debug)]
pub struct Screen {
    title: String,
    icon: Image,
    rect: Rect,
    zoom_rect: Rect,
    full: bool,
    target: Option<Surface>,
    last_frame: Option<Rc<Surface>>,
    osd: Vec<(Rc<Surface>, Rect)>,
    shade: Surface,
    red: f64,
    green: f64,
    blue: f64,
    bright: f64,
    zoom: f64,
    replay: VecDeque<Rc<Surface>>,
    replay_length: usize,
    requests: Vec<DisplayRequest>,
}

impl Screen {
    pub fn new(width: u32, height: u32) -> MinduResult<Screen> {
        if width == 0 || height == 0 {
            return Err(MinduError::invalid_argument(format!(
                "screen size must be greater than 0, got {}x{}",
                width, height
            )));
        }

        let rect = Rect::sized(width, height);

        Ok(Screen {
            title: DEFAULT_TITLE.to_string(),
            icon: default_icon(),
            rect,
            zoom_rect: rect,
            full: false,
            target: None,
            last_frame: None,
            osd: Vec::new(),
            shade: Surface::filled(width, height, BLACK),
            red: 1.0,
            green: 1.0,
            blue: 1.0,
            bright: 1.0,
            zoom: 0.0,
            replay: VecDeque::new(),
            replay_length: 0,
            requests: Vec::new(),
        })
    }

    /// Allocates the render target when the loop starts
    pub(crate) fn create(&mut self) {
        let (w, h) = (self.rect.w as u32, self.rect.h as u32);
        let target = Surface::filled(w, h, BLACK);

        self.last_frame = Some(Rc::new(target.clone()));
        self.target = Some(target);
        self.requests.clear();

        info!("Screen created ({}x{}{})", w, h, if self.full { ", fullscreen" } else { "" });
    }

    /// Drops the render target when the loop stops
    pub(crate) fn destroy(&mut self) {
        self.target = None;
        self.last_frame = None;
        self.osd.clear();
        self.requests.clear();

        info!("Screen destroyed");
    }

    pub fn running(&self) -> bool {
        self.target.is_some()
    }

    fn require_running(&self, op: &str) -> MinduResult<()> {
        if self.running() {
            Ok(())
        } else {
            Err(MinduError::invalid_state(format!("{}(): the loop is not running", op)))
        }
    }

    /// Blits a world surface now, or queues an OSD one for the end of the frame
    pub fn draw_surface(&mut self, surf: &Rc<Surface>, rect: Rect, osd: bool) -> MinduResult<()> {
        let target = match self.target.as_mut() {
            Some(t) => t,
            None => return Err(MinduError::invalid_state("draw(): the loop is not running")),
        };

        if osd {
            self.osd.push((Rc::clone(surf), rect));
        } else {
            target.blit(surf, rect.x, rect.y);
        }

        Ok(())
    }

    /// Finishes the frame: effects, OSD, cursor, present, snapshot, clear
    pub(crate) fn composite(
        &mut self,
        backend: &mut dyn Backend,
        cursor: Option<(&Surface, (i32, i32))>,
    ) -> MinduResult<()> {
        let mut target = match self.target.take() {
            Some(t) => t,
            None => return Err(MinduError::invalid_state("composite(): the loop is not running")),
        };

        if self.bright < 1.0 {
            target.blit_alpha(&self.shade, 0, 0, channel_subtraction(self.bright));
        }

        self.zoom_rect.clamp_in_place(&self.rect);

        if self.zoom > 0.0 {
            target = target
                .crop(&self.zoom_rect)
                .smooth_scale(self.rect.w as u32, self.rect.h as u32);
        }

        if self.red < 1.0 || self.green < 1.0 || self.blue < 1.0 {
            target.subtract_rgb(
                channel_subtraction(self.red),
                channel_subtraction(self.green),
                channel_subtraction(self.blue),
            );
        }

        for (surf, rect) in self.osd.drain(..) {
            target.blit(&surf, rect.x, rect.y);
        }

        if let Some((surf, (x, y))) = cursor {
            target.blit(surf, x, y);
        }

        if let Err(e) = backend.present(&target) {
            error!("Failed to present frame: {}", e);
        }

        let frame = Rc::new(target.clone());

        if self.replay_length > 0 {
            self.replay.push_back(Rc::clone(&frame));
            while self.replay.len() > self.replay_length {
                self.replay.pop_front();
            }
        }

        self.last_frame = Some(frame);

        target.fill(BLACK);
        self.target = Some(target);

        Ok(())
    }

    pub(crate) fn take_requests(&mut self) -> Vec<DisplayRequest> {
        std::mem::take(&mut self.requests)
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn width(&self) -> i32 { self.rect.width() }
    pub fn height(&self) -> i32 { self.rect.height() }
    pub fn size(&self) -> (i32, i32) { self.rect.size() }
    pub fn top(&self) -> i32 { self.rect.top() }
    pub fn left(&self) -> i32 { self.rect.left() }
    pub fn bottom(&self) -> i32 { self.rect.bottom() }
    pub fn right(&self) -> i32 { self.rect.right() }
    pub fn centerx(&self) -> i32 { self.rect.centerx() }
    pub fn centery(&self) -> i32 { self.rect.centery() }
    pub fn topleft(&self) -> (i32, i32) { self.rect.topleft() }
    pub fn bottomleft(&self) -> (i32, i32) { self.rect.bottomleft() }
    pub fn topright(&self) -> (i32, i32) { self.rect.topright() }
    pub fn bottomright(&self) -> (i32, i32) { self.rect.bottomright() }
    pub fn midtop(&self) -> (i32, i32) { self.rect.midtop() }
    pub fn midleft(&self) -> (i32, i32) { self.rect.midleft() }
    pub fn midbottom(&self) -> (i32, i32) { self.rect.midbottom() }
    pub fn midright(&self) -> (i32, i32) { self.rect.midright() }
    pub fn center(&self) -> (i32, i32) { self.rect.center() }

    /// Moves `sprite` inside the screen and returns how far its centre moved
    pub fn grab(&self, sprite: &mut dyn Sprite) -> (i32, i32) {
        grab_into(&self.rect, sprite)
    }

    pub fn contains(&self, sprite: &dyn Sprite) -> bool {
        self.rect.contains(sprite.rect())
    }

    pub fn collide(&self, sprite: &dyn Sprite) -> bool {
        self.rect.collide_rect(sprite.rect())
    }

    pub fn collide_point(&self, (x, y): (i32, i32)) -> bool {
        self.rect.collide_point(x, y)
    }

    /// Like `grab`, against the zoom rectangle
    pub fn zgrab(&self, sprite: &mut dyn Sprite) -> (i32, i32) {
        grab_into(&self.zoom_rect, sprite)
    }

    pub fn zcontains(&self, sprite: &dyn Sprite) -> bool {
        self.zoom_rect.contains(sprite.rect())
    }

    pub fn zcollide(&self, sprite: &dyn Sprite) -> bool {
        self.zoom_rect.collide_rect(sprite.rect())
    }

    pub fn zcollide_point(&self, (x, y): (i32, i32)) -> bool {
        self.zoom_rect.collide_point(x, y)
    }

    /// Part of the frame that gets magnified when zoom is above 0
    pub fn zoom_rect(&self) -> Rect {
        self.zoom_rect
    }

    pub fn place_zoom(&mut self, placement: Placement) {
        self.zoom_rect.place(placement);
        self.zoom_rect.clamp_in_place(&self.rect);
    }

    pub fn move_zoom(&mut self, dx: i32, dy: i32) {
        self.zoom_rect.move_by(dx, dy);
        self.zoom_rect.clamp_in_place(&self.rect);
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// 0 shows the whole frame, 1 magnifies a single pixel. Clamped into [0, 1].
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = num_traits::clamp(zoom, 0.0, 1.0);
        self.resize_zoom_rect();
    }

    fn resize_zoom_rect(&mut self) {
        let factor = 1.0 - self.zoom;
        let w = ((factor * self.rect.w as f64) as i32).max(1);
        let h = ((factor * self.rect.h as f64) as i32).max(1);
        let center = self.zoom_rect.center();

        self.zoom_rect = Rect::new(0, 0, w, h);
        self.zoom_rect.set_center(center);
        self.zoom_rect.clamp_in_place(&self.rect);
    }

    pub fn red(&self) -> f64 {
        self.red
    }

    pub fn set_red(&mut self, value: f64) {
        self.red = num_traits::clamp(value, 0.0, 1.0);
    }

    pub fn green(&self) -> f64 {
        self.green
    }

    pub fn set_green(&mut self, value: f64) {
        self.green = num_traits::clamp(value, 0.0, 1.0);
    }

    pub fn blue(&self) -> f64 {
        self.blue
    }

    pub fn set_blue(&mut self, value: f64) {
        self.blue = num_traits::clamp(value, 0.0, 1.0);
    }

    pub fn bright(&self) -> f64 {
        self.bright
    }

    pub fn set_bright(&mut self, value: f64) {
        self.bright = num_traits::clamp(value, 0.0, 1.0);
    }

    /// Only allowed while the loop is stopped. Resets the zoom rectangle.
    pub fn set_size(&mut self, width: u32, height: u32) -> MinduResult<()> {
        if self.running() {
            return Err(MinduError::invalid_state("set_size(): the loop is running"));
        }
        if width == 0 || height == 0 {
            return Err(MinduError::invalid_argument(format!(
                "set_size(): size must be greater than 0, got {}x{}",
                width, height
            )));
        }

        self.rect = Rect::sized(width, height);
        self.zoom_rect = self.rect;
        self.shade = Surface::filled(width, height, BLACK);
        self.resize_zoom_rect();

        debug!("Screen size set to {}x{}", width, height);
        Ok(())
    }

    pub fn full(&self) -> bool {
        self.full
    }

    pub fn set_full(&mut self, full: bool) {
        self.full = full;

        if self.running() {
            self.requests.push(DisplayRequest::Fullscreen(full));
        }
    }

    pub fn toggle_full(&mut self) {
        self.set_full(!self.full);
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// `None` restores the default title
    pub fn set_title(&mut self, title: Option<&str>) -> MinduResult<()> {
        let title = title.unwrap_or(DEFAULT_TITLE);

        if title.is_empty() {
            return Err(MinduError::invalid_argument("set_title(): title can't be empty"));
        }

        self.title = title.to_string();
        self.requests.push(DisplayRequest::Title(self.title.clone()));
        Ok(())
    }

    pub fn icon(&self) -> &Image {
        &self.icon
    }

    /// `None` restores the built-in icon
    pub fn set_icon(&mut self, icon: Option<Image>) {
        self.icon = icon.unwrap_or_else(default_icon);
        self.requests.push(DisplayRequest::Icon(Rc::clone(self.icon.surface())));
    }

    /// The last presented frame
    pub fn last_frame(&self) -> MinduResult<Image> {
        self.require_running("last_frame")?;

        match self.last_frame.as_ref() {
            Some(f) => Ok(Image::from_shared(Rc::clone(f))),
            None => Err(MinduError::invalid_state("last_frame(): no frame rendered yet")),
        }
    }

    /// Writes the last presented frame to `path`. BMP, TGA, PNG and JPEG only.
    pub fn shot<P: AsRef<Path>>(&self, path: P) -> MinduResult<()> {
        let path = path.as_ref();

        self.require_running("shot")?;

        match extension_upper(path) {
            Some(ext) if SHOT_EXTENSIONS.contains(&ext.as_str()) => (),
            ext => {
                return Err(MinduError::invalid_argument(format!(
                    "shot(): invalid file extension: \"{}\"",
                    ext.unwrap_or_default()
                )))
            }
        }

        let frame = match self.last_frame.as_ref() {
            Some(f) => f,
            None => return Err(MinduError::invalid_state("shot(): no frame rendered yet")),
        };

        frame.save(path).map_err(|e| MinduError::save(path, e))?;

        info!("Screenshot written to {}", path.display());
        Ok(())
    }

    pub fn replay_length(&self) -> usize {
        self.replay_length
    }

    /// How many of the latest frames are kept. 0 stops recording and drops the history.
    pub fn set_replay_length(&mut self, length: usize) {
        while self.replay.len() > length {
            self.replay.pop_front();
        }
        self.replay_length = length;
    }

    /// The recorded frames, oldest first, as a looping animation
    pub fn replay(&self) -> MinduResult<Animation> {
        self.require_running("replay")?;

        if self.replay.is_empty() {
            return Err(MinduError::invalid_state("replay(): no frames recorded"));
        }

        Animation::from_shared_frames(self.replay.iter().cloned().collect())
    }

    pub fn replay_frames(&self) -> usize {
        self.replay.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::HeadlessBackend;
    use crate::test_util::TempDir;
    use image::Rgba;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const GREEN: Rgba<u8> = Rgba([0, 255, 0, 255]);

    fn running(w: u32, h: u32) -> Screen {
        let mut s = Screen::new(w, h).unwrap();
        s.create();
        s
    }

    #[test]
    fn zoom_rect_extremes() {
        let mut s = Screen::new(100, 80).unwrap();

        s.set_zoom(0.0);
        assert_eq!(s.zoom_rect(), s.rect());

        s.place_zoom(Placement::Center(30, 30));
        s.set_zoom(1.0);
        assert_eq!(s.zoom_rect().size(), (1, 1));
        assert_eq!(s.zoom_rect().center(), (50, 40));

        s.set_zoom(0.5);
        s.place_zoom(Placement::TopLeft(90, 70));
        assert_eq!(s.zoom_rect(), Rect::new(50, 40, 50, 40));
    }

    #[test]
    fn zoom_is_clamped_on_every_change() {
        let mut s = Screen::new(100, 100).unwrap();

        s.set_zoom(0.75);
        s.move_zoom(-500, 500);

        assert_eq!(s.zoom_rect(), Rect::new(0, 75, 25, 25));

        s.set_zoom(7.0);
        assert_eq!(s.zoom(), 1.0);
    }

    #[test]
    fn draw_needs_running_loop() {
        let mut s = Screen::new(10, 10).unwrap();
        let surf = Rc::new(Surface::new(1, 1));

        assert!(matches!(
            s.draw_surface(&surf, Rect::new(0, 0, 1, 1), false),
            Err(MinduError::InvalidState(_))
        ));
        assert!(s.last_frame().is_err());
        assert!(s.replay().is_err());
    }

    #[test]
    fn osd_is_drawn_over_world() {
        let mut s = running(4, 4);
        let mut backend = HeadlessBackend::new();

        let osd = Rc::new(Surface::filled(2, 2, GREEN));
        let world = Rc::new(Surface::filled(2, 2, RED));

        // OSD drawn first still ends up on top, and it escapes the color effects
        s.draw_surface(&osd, Rect::new(1, 1, 2, 2), true).unwrap();
        s.draw_surface(&world, Rect::new(0, 0, 2, 2), false).unwrap();
        s.set_green(0.0);
        s.set_bright(0.5);

        s.composite(&mut backend, None).unwrap();

        let frame = backend.last_frame().unwrap();
        assert_eq!(frame.pixel(1, 1), GREEN);
        assert_eq!(frame.pixel(0, 0).0[1], 0);
        assert!(frame.pixel(0, 0).0[0] < 200);
    }

    #[test]
    fn frame_is_cleared_after_present() {
        let mut s = running(2, 2);
        let mut backend = HeadlessBackend::new();

        s.draw_surface(&Rc::new(Surface::filled(2, 2, RED)), Rect::new(0, 0, 2, 2), false)
            .unwrap();
        s.composite(&mut backend, None).unwrap();
        s.composite(&mut backend, None).unwrap();

        assert_eq!(backend.frames().len(), 2);
        assert_eq!(backend.frames()[0].pixel(0, 0), RED);
        assert_eq!(backend.frames()[1].pixel(0, 0), BLACK);
    }

    #[test]
    fn zoom_magnifies() {
        let mut s = running(4, 4);
        let mut backend = HeadlessBackend::new();

        s.set_zoom(0.5);
        s.place_zoom(Placement::TopLeft(0, 0));
        s.draw_surface(&Rc::new(Surface::filled(2, 2, RED)), Rect::new(0, 0, 2, 2), false)
            .unwrap();
        s.composite(&mut backend, None).unwrap();

        let frame = backend.last_frame().unwrap();
        assert_eq!(frame.pixel(0, 0), RED);
        assert_eq!(frame.pixel(3, 3), RED);
    }

    #[test]
    fn cursor_goes_on_top() {
        let mut s = running(3, 3);
        let mut backend = HeadlessBackend::new();
        let cursor = Surface::filled(1, 1, GREEN);

        s.draw_surface(&Rc::new(Surface::filled(3, 3, RED)), Rect::new(0, 0, 3, 3), true)
            .unwrap();
        s.composite(&mut backend, Some((&cursor, (2, 2)))).unwrap();

        assert_eq!(backend.last_frame().unwrap().pixel(2, 2), GREEN);
    }

    #[test]
    fn replay_keeps_latest_frames() {
        let mut s = running(1, 1);
        let mut backend = HeadlessBackend::new();
        s.set_replay_length(3);

        for i in 0..5u8 {
            let color = Rgba([i * 10, 0, 0, 255]);
            s.draw_surface(&Rc::new(Surface::filled(1, 1, color)), Rect::new(0, 0, 1, 1), false)
                .unwrap();
            s.composite(&mut backend, None).unwrap();
        }

        assert_eq!(s.replay_frames(), 3);

        let mut replay = s.replay().unwrap();
        assert_eq!(replay.frame_count(), 3);
        assert_eq!(replay.surface().pixel(0, 0).0[0], 20);
        replay.update();
        assert_eq!(replay.surface().pixel(0, 0).0[0], 30);

        s.set_replay_length(0);
        assert_eq!(s.replay_frames(), 0);
        assert!(s.replay().is_err());
    }

    #[test]
    fn size_is_locked_while_running() {
        let mut s = running(10, 10);

        assert!(matches!(s.set_size(20, 20), Err(MinduError::InvalidState(_))));

        s.destroy();
        assert!(matches!(s.set_size(0, 20), Err(MinduError::InvalidArgument(_))));
        s.set_size(20, 30).unwrap();
        assert_eq!(s.size(), (20, 30));
        assert_eq!(s.zoom_rect(), s.rect());
    }

    #[test]
    fn title_and_fullscreen_requests() {
        let mut s = Screen::new(10, 10).unwrap();

        assert_eq!(s.title(), "Mindu Window");
        assert!(s.set_title(Some("")).is_err());

        s.toggle_full();
        assert!(s.full());

        s.create();
        s.toggle_full();
        s.set_title(Some("Game")).unwrap();

        assert_eq!(
            s.take_requests(),
            vec![DisplayRequest::Fullscreen(false), DisplayRequest::Title("Game".to_string())]
        );

        s.set_title(None).unwrap();
        assert_eq!(s.title(), "Mindu Window");
    }

    #[test]
    fn icon_defaults_to_the_logo() {
        let mut s = Screen::new(10, 10).unwrap();

        assert_eq!(s.icon().size(), (16, 16));
        assert_eq!(s.icon().surface().pixel(0, 0), Rgba([0, 0, 0, 0]));
        assert_eq!(s.icon().surface().pixel(3, 3), Rgba([190, 20, 40, 255]));

        s.create();
        s.set_icon(Some(Image::from_surface(Surface::filled(4, 4, RED))));
        assert_eq!(s.icon().size(), (4, 4));

        s.set_icon(None);
        assert_eq!(s.icon().size(), (16, 16));

        let requests = s.take_requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1], DisplayRequest::Icon(Rc::clone(default_icon().surface())));
    }

    #[test]
    fn screenshots() {
        let dir = TempDir::new("shots");
        let mut s = Screen::new(2, 2).unwrap();

        assert!(matches!(s.shot(dir.path().join("a.png")), Err(MinduError::InvalidState(_))));

        s.create();
        assert!(matches!(s.shot(dir.path().join("a.gif")), Err(MinduError::InvalidArgument(_))));

        let path = dir.path().join("a.png");
        s.shot(&path).unwrap();
        assert!(path.is_file());
    }
}
