use mindu_lib::{
    Anchor, Animation, AnimationOptions, Color, Context, Image, Label, MinduResult, Placement,
    Sound, Sprite,
};
use tracing::{debug, info};
use super::actors::{Bomb, Explosion, Fire, Keys, Pig, Ship, ShipFate};
use super::rng::Rng;
use super::{channel, fade_in, fade_out, global_keys, title, Assets};

const MUSIC: usize = 0;
const EXPLOSIONS: usize = 1;
const FIRE: usize = 2;
const PIG: usize = 3;

/// Frames between two chances for a ship to show up
const SHIP_RELOAD: u32 = 15;
/// Per-frame loss of red and green, the sky reddens as the battle drags on
const DUSK: f64 = 0.00005;
const ZOOM_STEP: f64 = 0.05;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    FadeIn,
    Battle,
    ZoomIn,
    GameOver,
    FadeOut,
}

struct Sounds {
    music: Sound,
    explosion: Sound,
    fire: Sound,
    fire_echo: Sound,
    pig_ok: Sound,
    pig_ah: Sound,
}

/// Templates every ship, bomb and explosion is copied from
struct Templates {
    ship: Image,
    sparks: Animation,
    bomb: Image,
    explosion: Animation,
}

struct BattleScene {
    assets: Assets,
    sounds: Sounds,
    templates: Templates,
    background: Image,
    game_over: Label,
    message: Label,
    score_label: Label,
    /// Last frame of the battle, shown while fading out
    screenshot: Option<Image>,
    pig: Pig,
    fire: Fire,
    ships: Vec<Ship>,
    bombs: Vec<Bomb>,
    explosions: Vec<Explosion>,
    ship_countdown: u32,
    score: u32,
    rng: Rng,
    phase: Phase,
}

/// Starts a new battle
pub fn start(ctx: &mut Context, assets: Assets) -> MinduResult<()> {
    let red = Color::new(1.0, 0.0, 0.0, 1.0);
    let screen = &ctx.screen;

    let sounds = Sounds {
        music: assets.sound("sounds/main-music.ogg")?,
        explosion: assets.sound("sounds/explosion.ogg")?,
        fire: assets.sound("sounds/fire.ogg")?,
        fire_echo: assets.sound("sounds/fire-echo.ogg")?,
        pig_ok: assets.sound("sounds/pig-ok!.ogg")?,
        pig_ah: assets.sound("sounds/pig-ah!.ogg")?,
    };

    let templates = Templates {
        ship: assets
            .image("images/ship.png", true)?
            .placed(Placement::Right(screen.left()))
            .placed(Placement::Top(screen.top() + 10)),
        sparks: assets.animation(
            "animations/sparks",
            AnimationOptions {
                osd: true,
                redraw: 5,
                anchor: Anchor::Center,
                ..AnimationOptions::default()
            },
        )?,
        bomb: assets.image("images/bomb.png", true)?,
        explosion: assets.animation(
            "animations/explosion",
            AnimationOptions {
                osd: true,
                redraw: 2,
                repeat: false,
                anchor: Anchor::Center,
                ..AnimationOptions::default()
            },
        )?,
    };

    let game_over = assets
        .label(ctx, "Game over", 40, red, true)?
        .placed(Placement::CenterX(screen.centerx()))
        .placed(Placement::Bottom(screen.centery() - 10));
    let message = assets
        .label(ctx, "Press return to continue", 20, red, true)?
        .placed(Placement::CenterX(game_over.centerx()))
        .placed(Placement::Top(game_over.bottom() + 20));
    let score_label = assets
        .label(ctx, "Score: 0", 20, red, true)?
        .placed(Placement::Left(screen.left() + 10))
        .placed(Placement::Bottom(screen.bottom() - 10));

    let mut scene = BattleScene {
        background: assets.image("images/background.png", false)?,
        pig: Pig::load(&assets, screen)?,
        fire: Fire::load(&assets)?,
        assets,
        sounds,
        templates,
        game_over,
        message,
        score_label,
        screenshot: None,
        ships: Vec::new(),
        bombs: Vec::new(),
        explosions: Vec::new(),
        ship_countdown: SHIP_RELOAD,
        score: 0,
        rng: Rng::from_time(),
        phase: Phase::FadeIn,
    };

    channel(&mut ctx.mixer, MUSIC)?.play(&scene.sounds.music, -1, 0, 0)?;

    debug!("Battle scene");
    ctx.on_iterate(Some(Box::new(move |ctx| scene.iterate(ctx))));
    Ok(())
}

impl BattleScene {
    fn iterate(&mut self, ctx: &mut Context) -> MinduResult<()> {
        global_keys(ctx)?;

        match self.phase {
            Phase::FadeIn => self.fade_in(ctx),
            Phase::Battle => self.battle(ctx),
            Phase::ZoomIn => self.zoom_in(ctx),
            Phase::GameOver => self.game_over(ctx),
            Phase::FadeOut => self.fade_out(ctx),
        }
    }

    fn fade_in(&mut self, ctx: &mut Context) -> MinduResult<()> {
        self.background.draw(&mut ctx.screen)?;
        self.pig.draw(&mut ctx.screen)?;
        self.score_label.draw(&mut ctx.screen)?;

        if fade_in(ctx) {
            self.phase = Phase::Battle;
        }
        Ok(())
    }

    /// Counts down to the next chance of a ship, one in six succeeds
    fn maybe_launch_ship(&mut self) {
        self.ship_countdown = self.ship_countdown.saturating_sub(1);
        if self.ship_countdown > 0 {
            return;
        }
        self.ship_countdown = SHIP_RELOAD;

        if self.rng.one_in(5) {
            self.ships.push(Ship::new(self.templates.ship.clone(), self.templates.sparks.clone()));
        }
    }

    fn explode(&mut self, ctx: &mut Context, at: (i32, i32)) -> MinduResult<()> {
        self.explosions.push(Explosion::new(self.templates.explosion.clone(), at));
        channel(&mut ctx.mixer, EXPLOSIONS)?.play(&self.sounds.explosion, 0, 0, 0)
    }

    fn score_point(&mut self) -> MinduResult<()> {
        self.score += 1;
        self.score_label.set_text(format!("Score: {}", self.score))
    }

    fn update_ships(&mut self, ctx: &mut Context) -> MinduResult<()> {
        let mut i = 0;

        while i < self.ships.len() {
            match self.ships[i].update(&self.pig, &mut ctx.screen, &mut self.rng)? {
                ShipFate::Flying => i += 1,
                ShipFate::Bombs(x, y) => {
                    self.bombs.push(Bomb::new(self.templates.bomb.clone(), (x, y)));
                    i += 1;
                }
                ShipFate::Destroyed(x, y) => {
                    self.ships.remove(i);
                    self.explode(ctx, (x, y))?;
                    self.score_point()?;
                }
            }
        }
        Ok(())
    }

    fn update_bombs(&mut self, ctx: &mut Context) -> MinduResult<()> {
        let mut i = 0;

        while i < self.bombs.len() {
            match self.bombs[i].update(&mut ctx.screen)? {
                None => i += 1,
                Some(at) => {
                    self.bombs.remove(i);
                    self.explode(ctx, at)?;
                }
            }
        }
        Ok(())
    }

    fn update_explosions(&mut self, ctx: &mut Context) -> MinduResult<()> {
        let mut i = 0;

        while i < self.explosions.len() {
            if self.explosions[i].update(&mut self.pig, &mut ctx.screen)? {
                i += 1;
            } else {
                self.explosions.remove(i);
            }
        }
        Ok(())
    }

    fn battle(&mut self, ctx: &mut Context) -> MinduResult<()> {
        self.maybe_launch_ship();

        self.background.draw(&mut ctx.screen)?;

        self.update_ships(ctx)?;
        self.update_bombs(ctx)?;
        self.update_explosions(ctx)?;

        let keys = Keys::read(&ctx.keyboard)?;
        self.pig.update(&keys, &mut ctx.screen, &mut self.rng)?;

        let fire_channel = channel(&mut ctx.mixer, FIRE)?;
        self.fire.update(&self.pig, fire_channel, &self.sounds.fire, &self.sounds.fire_echo, &mut ctx.screen)?;

        self.score_label.draw(&mut ctx.screen)?;

        let (red, green) = (ctx.screen.red(), ctx.screen.green());
        ctx.screen.set_red(red - DUSK);
        ctx.screen.set_green(green - DUSK);

        if !self.pig.alive {
            info!("The pig is down, score {}", self.score);

            channel(&mut ctx.mixer, FIRE)?.stop();
            channel(&mut ctx.mixer, MUSIC)?.fadeout(2000)?;
            channel(&mut ctx.mixer, PIG)?.play(&self.sounds.pig_ah, 0, 0, 0)?;
            self.phase = Phase::ZoomIn;
        }
        Ok(())
    }

    fn zoom_in(&mut self, ctx: &mut Context) -> MinduResult<()> {
        self.background.draw(&mut ctx.screen)?;
        self.pig.update(&Keys::default(), &mut ctx.screen, &mut self.rng)?;
        self.score_label.draw(&mut ctx.screen)?;

        let zoom = ctx.screen.zoom() + ZOOM_STEP;
        ctx.screen.set_zoom(zoom);

        let (x, y) = self.pig.center();
        ctx.screen.place_zoom(Placement::Center(x, y));

        if ctx.screen.zoom() >= 1.0 {
            self.phase = Phase::GameOver;
        }
        Ok(())
    }

    fn game_over(&mut self, ctx: &mut Context) -> MinduResult<()> {
        self.background.draw(&mut ctx.screen)?;
        self.game_over.draw(&mut ctx.screen)?;
        self.message.draw(&mut ctx.screen)?;
        self.score_label.draw(&mut ctx.screen)?;

        if ctx.keyboard.get() == Some("return") {
            channel(&mut ctx.mixer, PIG)?.play(&self.sounds.pig_ok, 0, 0, 0)?;

            let mut screenshot = ctx.screen.last_frame()?;
            screenshot.draw(&mut ctx.screen)?;
            self.screenshot = Some(screenshot);

            ctx.screen.set_red(1.0);
            ctx.screen.set_green(1.0);
            ctx.screen.set_zoom(0.0);
            self.phase = Phase::FadeOut;
        }
        Ok(())
    }

    fn fade_out(&mut self, ctx: &mut Context) -> MinduResult<()> {
        if let Some(screenshot) = self.screenshot.as_mut() {
            screenshot.draw(&mut ctx.screen)?;
        }

        let dark = fade_out(ctx);
        let quiet = !channel(&mut ctx.mixer, EXPLOSIONS)?.busy() && !channel(&mut ctx.mixer, PIG)?.busy();

        if dark && quiet {
            title::start(ctx, self.assets.clone())?;
        }
        Ok(())
    }
}
