use std::fs;
use std::path::Path;
use std::rc::Rc;
use tracing::debug;
use crate::error::{MinduError, MinduResult};
use crate::rect::{Anchor, Rect};
use crate::screen::Screen;
use crate::sprite::Sprite;
use crate::surface::Surface;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationOptions {
    /// Keep the frames' alpha channel
    pub alpha: bool,
    /// How many updates each frame stays on screen
    pub redraw: u32,
    /// Attribute of the rect that stays put when the frame (and its size) changes
    pub anchor: Anchor,
    pub repeat: bool,
    pub running: bool,
    pub osd: bool,
}

impl Default for AnimationOptions {
    fn default() -> AnimationOptions {
        AnimationOptions {
            alpha: true,
            redraw: 1,
            anchor: Anchor::MidBottom,
            repeat: true,
            running: true,
            osd: false,
        }
    }
}

/// Sequence of frames played back one step per update.
///
/// Clones share the frames' pixels but own their rects and playback state.
#[derive(Clone, Debug)]
pub struct Animation {
    frames: Rc<[Rc<Surface>]>,
    rects: Vec<Rect>,
    index: usize,
    redraw: u32,
    redraw_count: u32,
    anchor: Anchor,
    repeat: bool,
    running: bool,
    osd: bool,
}

impl Animation {
    /// Loads every file in `dir`, sorted by name, as the frames of an animation
    pub fn load<P: AsRef<Path>>(dir: P, options: AnimationOptions) -> MinduResult<Animation> {
        let dir = dir.as_ref();

        if !dir.exists() {
            return Err(MinduError::load(dir, "directory does not exist"));
        }
        if !dir.is_dir() {
            return Err(MinduError::load(dir, "not a directory"));
        }

        let mut files = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() {
                files.push(path);
            }
        }

        if files.is_empty() {
            return Err(MinduError::load(dir, "directory is empty"));
        }

        files.sort();

        let frames = files
            .iter()
            .map(|f| Surface::load(f, options.alpha))
            .collect::<MinduResult<Vec<_>>>()?;

        debug!("Loaded animation {} ({} frames)", dir.display(), frames.len());

        Animation::with_options(frames, options)
    }

    /// Builds an animation out of already decoded frames
    pub fn from_frames(frames: Vec<Surface>) -> MinduResult<Animation> {
        Animation::with_options(frames, AnimationOptions::default())
    }

    pub(crate) fn from_shared_frames(frames: Vec<Rc<Surface>>) -> MinduResult<Animation> {
        if frames.is_empty() {
            return Err(MinduError::invalid_argument("an animation needs at least one frame"));
        }

        let rects = frames.iter().map(|f| f.rect()).collect();
        let options = AnimationOptions::default();

        Ok(Animation {
            frames: frames.into(),
            rects,
            index: 0,
            redraw: options.redraw,
            redraw_count: 0,
            anchor: options.anchor,
            repeat: options.repeat,
            running: options.running,
            osd: options.osd,
        })
    }

    fn with_options(frames: Vec<Surface>, options: AnimationOptions) -> MinduResult<Animation> {
        if options.redraw == 0 {
            return Err(MinduError::invalid_argument("redraw must be greater than 0"));
        }

        let mut animation =
            Animation::from_shared_frames(frames.into_iter().map(Rc::new).collect())?;

        animation.redraw = options.redraw;
        animation.anchor = options.anchor;
        animation.repeat = options.repeat;
        animation.running = options.running;
        animation.osd = options.osd;

        Ok(animation)
    }

    /// Switches to frame `index` keeping the anchor attribute where it was
    fn show(&mut self, index: usize) {
        let anchored = self.anchor.placement_of(&self.rects[self.index]);

        self.index = index;
        self.rects[index].place(anchored);
    }

    /// Advances the playback by one update
    pub fn update(&mut self) {
        if !self.running {
            return;
        }

        self.redraw_count += 1;

        if self.redraw_count < self.redraw {
            return;
        }

        self.redraw_count = 0;

        let next = self.index + 1;

        if next == self.frames.len() {
            if self.repeat {
                self.show(0);
            } else {
                self.running = false;
            }
        } else {
            self.show(next);
        }
    }

    /// Restarts from the first frame
    pub fn play(&mut self) {
        self.running = true;
        self.redraw_count = 0;
        self.show(0);
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    pub fn unpause(&mut self) {
        self.running = true;
    }

    /// False once a non-repeating animation has shown its last frame
    pub fn running(&self) -> bool {
        self.running
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn redraw_count(&self) -> u32 {
        self.redraw_count
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn redraw(&self) -> u32 {
        self.redraw
    }

    pub fn set_redraw(&mut self, redraw: u32) -> MinduResult<()> {
        if redraw == 0 {
            return Err(MinduError::invalid_argument("set_redraw(): redraw must be greater than 0"));
        }

        self.redraw = redraw;
        self.redraw_count = 0;
        Ok(())
    }

    pub fn repeat(&self) -> bool {
        self.repeat
    }

    pub fn set_repeat(&mut self, repeat: bool) {
        self.repeat = repeat;
    }

    pub fn toggle_repeat(&mut self) {
        self.repeat = !self.repeat;
    }

    pub fn anchor(&self) -> Anchor {
        self.anchor
    }

    pub fn set_anchor(&mut self, anchor: Anchor) {
        self.anchor = anchor;
    }

    /// New animation whose every frame went through `f`, centred on the current frame
    fn derive<F: Fn(&Surface) -> Surface>(&self, f: F) -> Animation {
        let frames: Vec<Rc<Surface>> = self.frames.iter().map(|s| Rc::new(f(s))).collect();
        let mut rects: Vec<Rect> = frames.iter().map(|s| s.rect()).collect();

        rects[self.index].set_center(self.rect().center());

        Animation {
            frames: frames.into(),
            rects,
            ..self.clone()
        }
    }

    pub fn flip(&self, horizontal: bool, vertical: bool) -> Animation {
        self.derive(|s| s.flip(horizontal, vertical))
    }

    /// Clockwise rotation of every frame by `angle` degrees
    pub fn rotate(&self, angle: f64) -> Animation {
        self.derive(|s| s.rotozoom(-angle, 1.0))
    }

    pub fn scale(&self, factor: f64) -> MinduResult<Animation> {
        if factor <= 0.0 {
            return Err(MinduError::invalid_argument(format!(
                "scale(): factor must be greater than 0, got {}",
                factor
            )));
        }

        Ok(self.derive(|s| s.rotozoom(0.0, factor)))
    }
}

impl Sprite for Animation {
    fn surface(&self) -> &Rc<Surface> {
        &self.frames[self.index]
    }

    fn rect(&self) -> &Rect {
        &self.rects[self.index]
    }

    fn rect_mut(&mut self) -> &mut Rect {
        &mut self.rects[self.index]
    }

    fn osd(&self) -> bool {
        self.osd
    }

    fn set_osd(&mut self, osd: bool) {
        self.osd = osd;
    }

    /// Draws the current frame then advances the playback
    fn draw(&mut self, screen: &mut Screen) -> MinduResult<()> {
        screen.draw_surface(self.surface(), *self.rect(), self.osd)?;
        self.update();
        Ok(())
    }
}
