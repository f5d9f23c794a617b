//! Fire, Pig, Fire! A pig with a flamethrower against bombers.
//!
//! Two scenes take turns as the frame callback: the title screen and the battle. Each one swaps
//! itself for the other once its fade-out is over.

mod actors;
mod play;
mod rng;
mod title;

use std::path::{Path, PathBuf};
use tracing::info;
use mindu_lib::{
    Animation, AnimationOptions, Channel, Color, Context, Image, Label, LabelStyle, MinduError,
    MinduResult, Mixer, Sound,
};

pub const TITLE: &str = "Fire, Pig, Fire!";
pub const WIDTH: u32 = 640;
pub const HEIGHT: u32 = 400;

/// Brightness step of every fade
const FADE_STEP: f64 = 0.05;

/// Where the game's files live
#[derive(Clone, Debug)]
pub struct Assets {
    root: PathBuf,
}

impl Assets {
    pub fn new<P: AsRef<Path>>(root: P) -> Assets {
        Assets {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    fn image(&self, relative: &str, alpha: bool) -> MinduResult<Image> {
        Image::load(self.path(relative), alpha)
    }

    fn animation(&self, relative: &str, options: AnimationOptions) -> MinduResult<Animation> {
        Animation::load(self.path(relative), options)
    }

    fn sound(&self, relative: &str) -> MinduResult<Sound> {
        Sound::load(self.path(relative))
    }

    /// Text in the game's font
    fn label(&self, ctx: &Context, text: &str, size: u32, color: Color, osd: bool) -> MinduResult<Label> {
        let style = LabelStyle {
            font: Some(self.path("fonts/biting.ttf")),
            size,
            color,
            osd,
            ..LabelStyle::default()
        };

        Label::new(ctx.fonts(), text, style)
    }
}

/// Sets up the window and hands the frame loop to the title screen
pub fn start(ctx: &mut Context, assets: Assets) -> MinduResult<()> {
    ctx.screen.set_icon(Some(assets.image("images/icon.png", true)?));
    ctx.mouse.set_visible(false);

    info!("Starting {} with assets from {}", TITLE, assets.root.display());

    title::start(ctx, assets)
}

/// Keys every scene honours
fn global_keys(ctx: &mut Context) -> MinduResult<()> {
    if ctx.keyboard.ding("escape")? {
        ctx.screen.toggle_full();
    }
    Ok(())
}

fn channel(mixer: &mut Mixer, id: usize) -> MinduResult<&mut Channel> {
    let count = mixer.count();

    mixer.channel_mut(id).ok_or_else(|| {
        MinduError::invalid_state(format!("the game needs audio channel {}, only {} configured", id, count))
    })
}

/// Brightens the screen one step, true once it's fully lit
fn fade_in(ctx: &mut Context) -> bool {
    let bright = ctx.screen.bright() + FADE_STEP;
    ctx.screen.set_bright(bright);
    ctx.screen.bright() >= 1.0
}

/// Darkens the screen one step, true once it's black
fn fade_out(ctx: &mut Context) -> bool {
    let bright = ctx.screen.bright() - FADE_STEP;
    ctx.screen.set_bright(bright);
    ctx.screen.bright() <= 0.0
}
