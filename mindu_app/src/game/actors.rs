use mindu_lib::{
    Anchor, Animation, AnimationOptions, Channel, Image, Keyboard, MinduResult, Placement, Rect,
    Screen, Sound, Sprite,
};
use super::rng::Rng;
use super::Assets;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Aim {
    Left,
    Right,
    Up,
}

/// What the arrow keys and the space bar hold this frame
#[derive(Clone, Copy, Debug, Default)]
pub struct Keys {
    /// Hold time of the space bar, `None` when released
    pub space: Option<u32>,
    pub up: bool,
    pub left: bool,
    pub right: bool,
}

impl Keys {
    pub fn read(keyboard: &Keyboard) -> MinduResult<Keys> {
        let space = if keyboard.busy("space")? {
            Some(keyboard.time("space")?)
        } else {
            None
        };

        Ok(Keys {
            space,
            up: keyboard.busy("up")?,
            left: keyboard.busy("left")?,
            right: keyboard.busy("right")?,
        })
    }
}

/// The pig's intent, separate from its pictures
#[derive(Clone, Debug, PartialEq)]
pub struct Stance {
    pub shooting: bool,
    pub walking: bool,
    pub aim: Aim,
    /// Last horizontal direction, kept while aiming up or standing still
    pub side: Aim,
}

impl Default for Stance {
    fn default() -> Stance {
        Stance {
            shooting: false,
            walking: false,
            aim: Aim::Left,
            side: Aim::Left,
        }
    }
}

impl Stance {
    pub fn steer(&mut self, keys: &Keys, rng: &mut Rng) {
        let horizontal = match (keys.left, keys.right) {
            (true, false) => Some(Aim::Left),
            (false, true) => Some(Aim::Right),
            _ => None,
        };

        // The flamethrower sputters more and more the longer it's held
        self.shooting = match keys.space {
            Some(held) if held >= 1000 => rng.one_in(held / 1000),
            Some(_) => true,
            None => false,
        };

        if keys.up {
            self.aim = Aim::Up;
            self.walking = false;
        } else if let Some(side) = horizontal {
            self.aim = side;
            self.side = side;
            self.walking = keys.space.is_none();
        } else {
            self.aim = self.side;
            self.walking = false;
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Pose {
    WalkingLeft,
    WalkingRight,
    AimingLeft,
    AimingRight,
    AimingUp,
}

impl Pose {
    fn of(stance: &Stance) -> Pose {
        match (stance.aim, stance.walking) {
            (Aim::Left, true) => Pose::WalkingLeft,
            (Aim::Left, false) => Pose::AimingLeft,
            (Aim::Right, true) => Pose::WalkingRight,
            (Aim::Right, false) => Pose::AimingRight,
            (Aim::Up, _) => Pose::AimingUp,
        }
    }
}

pub struct Pig {
    walking_left: Animation,
    walking_right: Animation,
    aiming_left: Image,
    aiming_right: Image,
    aiming_up: Image,
    explosion: Animation,
    pose: Pose,
    pub stance: Stance,
    pub alive: bool,
    speed: i32,
}

impl Pig {
    pub fn load(assets: &Assets, screen: &Screen) -> MinduResult<Pig> {
        let walking_left = assets.animation(
            "animations/pig-walking",
            AnimationOptions {
                redraw: 5,
                ..AnimationOptions::default()
            },
        )?;
        let aiming_left = assets
            .image("images/pig-aiming.png", true)?
            .placed(Placement::MidBottom(screen.centerx(), screen.bottom() - 10));
        let explosion = assets.animation(
            "animations/pig-explosion",
            AnimationOptions {
                redraw: 2,
                repeat: false,
                ..AnimationOptions::default()
            },
        )?;

        Ok(Pig {
            walking_right: walking_left.flip(true, false),
            walking_left,
            aiming_right: aiming_left.flip(true, false),
            aiming_left,
            aiming_up: assets.image("images/pig-aiming-up.png", true)?,
            explosion,
            pose: Pose::AimingLeft,
            stance: Stance::default(),
            alive: true,
            speed: 3,
        })
    }

    pub fn sprite(&self) -> &dyn Sprite {
        match self.pose {
            Pose::WalkingLeft => &self.walking_left,
            Pose::WalkingRight => &self.walking_right,
            Pose::AimingLeft => &self.aiming_left,
            Pose::AimingRight => &self.aiming_right,
            Pose::AimingUp => &self.aiming_up,
        }
    }

    fn sprite_mut(&mut self) -> &mut dyn Sprite {
        match self.pose {
            Pose::WalkingLeft => &mut self.walking_left,
            Pose::WalkingRight => &mut self.walking_right,
            Pose::AimingLeft => &mut self.aiming_left,
            Pose::AimingRight => &mut self.aiming_right,
            Pose::AimingUp => &mut self.aiming_up,
        }
    }

    pub fn center(&self) -> (i32, i32) {
        self.sprite().center()
    }

    pub fn draw(&mut self, screen: &mut Screen) -> MinduResult<()> {
        self.sprite_mut().draw(screen)
    }

    /// Follows the keys while alive, blows up in place otherwise
    pub fn update(&mut self, keys: &Keys, screen: &mut Screen, rng: &mut Rng) -> MinduResult<()> {
        if !self.alive {
            let (x, y) = self.center();
            self.explosion.place(Placement::Center(x, y));
            return self.explosion.draw(screen);
        }

        self.stance.steer(keys, rng);

        let (x, y) = self.sprite().midbottom();
        self.pose = Pose::of(&self.stance);

        let shooting = self.stance.shooting;
        let step = match (self.stance.walking, self.stance.aim) {
            (true, Aim::Left) => -self.speed,
            (true, Aim::Right) => self.speed,
            _ => 0,
        };

        let sprite = self.sprite_mut();
        sprite.place(Placement::MidBottom(x, y));
        sprite.set_osd(shooting);

        if step != 0 {
            sprite.move_by(step, 0);
            screen.grab(&mut *sprite);
        }

        sprite.draw(screen)
    }
}

/// The flame in front of the pig's snout
pub struct Fire {
    left: Animation,
    right: Animation,
    up: Animation,
}

impl Fire {
    pub fn load(assets: &Assets) -> MinduResult<Fire> {
        let left = assets.animation(
            "animations/fire",
            AnimationOptions {
                osd: true,
                redraw: 3,
                ..AnimationOptions::default()
            },
        )?;

        Ok(Fire {
            right: left.flip(true, false),
            up: left.rotate(90.0),
            left,
        })
    }

    /// Keeps the roar looping while the pig shoots and lets it echo once it stops
    pub fn update(
        &mut self,
        pig: &Pig,
        channel: &mut Channel,
        roar: &Sound,
        echo: &Sound,
        screen: &mut Screen,
    ) -> MinduResult<()> {
        let playing = channel.sound().cloned();

        if !pig.stance.shooting {
            if playing.is_some_and(|s| s != *echo) {
                channel.play(echo, 0, 0, 0)?;
            }
            return Ok(());
        }

        if playing.as_ref() != Some(roar) {
            channel.play(roar, -1, 0, 0)?;
        }

        let body = pig.sprite();
        let flame = match pig.stance.aim {
            Aim::Up => {
                let (x, y) = body.midtop();
                self.up.place(Placement::MidBottom(x, y));
                &mut self.up
            }
            Aim::Left => {
                let (x, y) = body.midleft();
                self.left.place(Placement::MidRight(x, y));
                &mut self.left
            }
            Aim::Right => {
                let (x, y) = body.midright();
                self.right.place(Placement::MidLeft(x, y));
                &mut self.right
            }
        };

        flame.draw(screen)
    }
}

/// Whether a ship sits in the path of the flame
fn in_line_of_fire(ship: &Rect, altitude: i32, aim: Aim, pig: &Rect) -> bool {
    match aim {
        Aim::Up => ship.left() <= pig.centerx() && pig.centerx() <= ship.right(),
        Aim::Left => altitude == 0 && ship.right() < pig.left(),
        Aim::Right => altitude == 0 && ship.left() > pig.right(),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShipFate {
    Flying,
    /// Drops a bomb from the given point
    Bombs(i32, i32),
    /// Goes down, exploding at the given point
    Destroyed(i32, i32),
}

/// A bomber sweeping the sky lane by lane, lower on every pass
pub struct Ship {
    sprite: Image,
    sparks: Animation,
    speed: i32,
    life: i32,
    /// Lanes left above the ground
    altitude: i32,
}

impl Ship {
    pub fn new(sprite: Image, sparks: Animation) -> Ship {
        Ship {
            sprite,
            sparks,
            speed: 5,
            life: 100,
            altitude: 4,
        }
    }

    pub fn update(&mut self, pig: &Pig, screen: &mut Screen, rng: &mut Rng) -> MinduResult<ShipFate> {
        self.sprite.move_by(self.speed, 0);

        if !screen.collide(&self.sprite) {
            let below = self.sprite.bottom() + 10;
            self.sprite.place(Placement::Top(below));
            self.altitude -= 1;

            if self.altitude == 0 && rng.one_in(1) {
                self.sprite.place(Placement::Left(screen.right()));
            } else {
                self.speed = -self.speed;
            }
        }

        self.sprite.draw(screen)?;

        let hit = pig.stance.shooting
            && in_line_of_fire(self.sprite.rect(), self.altitude, pig.stance.aim, pig.sprite().rect());

        if hit {
            self.life -= 5;

            self.sprite.toggle_osd();
            self.sprite.draw(screen)?;
            self.sprite.toggle_osd();

            let (x, y) = self.sprite.center();
            self.sparks.place(Placement::Center(x, y));
            self.sparks.draw(screen)?;
        }

        let (x, y) = self.sprite.center();

        if self.sprite.collide_point(pig.center()) || self.life <= 0 {
            Ok(ShipFate::Destroyed(x, y))
        } else if self.altitude > 2 && rng.one_in(100) {
            let (x, y) = self.sprite.midbottom();
            Ok(ShipFate::Bombs(x, y))
        } else {
            Ok(ShipFate::Flying)
        }
    }
}

pub struct Bomb {
    sprite: Image,
    speed: i32,
}

impl Bomb {
    pub fn new(mut sprite: Image, (x, y): (i32, i32)) -> Bomb {
        sprite.place(Placement::MidTop(x, y));
        Bomb { sprite, speed: 5 }
    }

    /// Falls one step. Returns where it blew up once it reaches the ground.
    pub fn update(&mut self, screen: &mut Screen) -> MinduResult<Option<(i32, i32)>> {
        self.sprite.move_by(0, self.speed);

        if self.sprite.bottom() < screen.bottom() - 10 {
            self.sprite.draw(screen)?;
            Ok(None)
        } else {
            Ok(Some(self.sprite.center()))
        }
    }
}

pub struct Explosion {
    sprite: Animation,
}

impl Explosion {
    pub fn new(mut sprite: Animation, (x, y): (i32, i32)) -> Explosion {
        sprite.set_anchor(Anchor::Center);
        sprite.place(Placement::Center(x, y));
        Explosion { sprite }
    }

    /// Draws a frame and kills the pig if it's caught in the blast. False once it's over.
    pub fn update(&mut self, pig: &mut Pig, screen: &mut Screen) -> MinduResult<bool> {
        self.sprite.draw(screen)?;

        if self.sprite.collide_point(pig.center()) {
            pig.alive = false;
        }

        Ok(self.sprite.running())
    }
}
