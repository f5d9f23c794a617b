use mindu_lib::{Color, Context, Image, Label, MinduResult, Placement, Sound, Sprite};
use tracing::debug;
use super::{channel, fade_in, fade_out, global_keys, play, Assets};

const MUSIC: usize = 0;
const EFFECTS: usize = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    FadeIn,
    Waiting,
    FadeOut,
}

struct TitleScene {
    assets: Assets,
    pig_ok: Sound,
    title: Label,
    logo: Image,
    message: Label,
    phase: Phase,
}

/// Shows the title screen until return is pressed
pub fn start(ctx: &mut Context, assets: Assets) -> MinduResult<()> {
    let pink = Color::new(1.0, 0.7, 0.7, 1.0);
    let screen = &ctx.screen;

    let title = assets
        .label(ctx, super::TITLE, 40, pink, false)?
        .placed(Placement::CenterX(screen.centerx()))
        .placed(Placement::Top(screen.top() + 20));
    let logo = assets
        .image("images/logo.png", false)?
        .placed(Placement::CenterX(title.centerx()))
        .placed(Placement::Top(title.bottom() + 20));
    let message = assets
        .label(ctx, "Press return to play", 20, pink, false)?
        .placed(Placement::CenterX(logo.centerx()))
        .placed(Placement::Top(logo.bottom() + 20));

    let music = assets.sound("sounds/title-music.ogg")?;
    let choir = assets.sound("sounds/choir.ogg")?;
    let pig_ok = assets.sound("sounds/pig-ok!.ogg")?;

    channel(&mut ctx.mixer, MUSIC)?.play(&music, -1, 0, 2000)?;
    channel(&mut ctx.mixer, EFFECTS)?.play(&choir, 0, 0, 0)?;
    ctx.screen.set_bright(0.0);

    let mut scene = TitleScene {
        assets,
        pig_ok,
        title,
        logo,
        message,
        phase: Phase::FadeIn,
    };

    debug!("Title scene");
    ctx.on_iterate(Some(Box::new(move |ctx| scene.iterate(ctx))));
    Ok(())
}

impl TitleScene {
    fn draw(&mut self, ctx: &mut Context) -> MinduResult<()> {
        self.title.draw(&mut ctx.screen)?;
        self.logo.draw(&mut ctx.screen)?;
        self.message.draw(&mut ctx.screen)
    }

    fn iterate(&mut self, ctx: &mut Context) -> MinduResult<()> {
        global_keys(ctx)?;
        self.draw(ctx)?;

        match self.phase {
            Phase::FadeIn => {
                if fade_in(ctx) {
                    self.phase = Phase::Waiting;
                }
            }
            Phase::Waiting => {
                if ctx.keyboard.get() == Some("return") {
                    channel(&mut ctx.mixer, EFFECTS)?.play(&self.pig_ok, 0, 0, 0)?;
                    channel(&mut ctx.mixer, MUSIC)?.fadeout(2000)?;
                    self.phase = Phase::FadeOut;
                }
            }
            Phase::FadeOut => {
                let dark = fade_out(ctx);
                let quiet = !channel(&mut ctx.mixer, MUSIC)?.busy() && !channel(&mut ctx.mixer, EFFECTS)?.busy();

                if dark && quiet {
                    play::start(ctx, self.assets.clone())?;
                }
            }
        }

        Ok(())
    }
}
