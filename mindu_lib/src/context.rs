//! The application context and its frame loop.
//!
//! A game owns one [`Context`]. Callbacks receive it mutably and reach the screen, the input
//! devices and the mixer through it.

use std::fmt;
use tracing::{debug, error, info, warn};
use crate::backend::{Backend, DisplayMode, Events};
use crate::clock::Clock;
use crate::error::{MinduError, MinduResult};
use crate::font::Fonts;
use crate::input::{Joystick, JoystickState, Keyboard, Mouse, MouseState};
use crate::mixer::Mixer;
use crate::screen::{DisplayRequest, Screen};
use crate::settings::Settings;
use crate::sound::SAMPLE_RATE;
use crate::sprite::Sprite;

/// Per-frame or close-request handler
pub type Callback = Box<dyn FnMut(&mut Context) -> MinduResult<()>>;

pub struct Context {
    pub screen: Screen,
    pub keyboard: Keyboard,
    pub mouse: Mouse,
    pub joysticks: Vec<Joystick>,
    pub mixer: Mixer,
    fonts: Fonts,
    clock: Clock,
    ips: u32,
    running: bool,
    stop_requested: bool,
    on_iterate: Option<Callback>,
    iterate_replaced: bool,
    on_close: Option<Callback>,
    close_replaced: bool,
    reload_joysticks: bool,
    /// Leftover of SAMPLE_RATE / ips, keeps the audio in step with the frames
    audio_carry: u32,
}

impl Context {
    pub fn new(settings: Settings) -> MinduResult<Context> {
        settings.validate()?;

        let mut screen = Screen::new(settings.width, settings.height)?;
        screen.set_title(Some(&settings.title))?;
        screen.set_full(settings.fullscreen);
        screen.set_replay_length(settings.replay_length);

        let mut mouse = Mouse::new(&MouseState::default());
        mouse.set_visible(settings.mouse_visible);
        mouse.set_idle_time(settings.mouse_idle_time)?;

        let fonts = Fonts::new(settings.default_font.clone())?;

        Ok(Context {
            screen,
            keyboard: Keyboard::new(),
            mouse,
            joysticks: Vec::new(),
            mixer: Mixer::new(settings.channels),
            fonts,
            clock: Clock::new(settings.ips),
            ips: settings.ips,
            running: false,
            stop_requested: false,
            on_iterate: None,
            iterate_replaced: false,
            on_close: None,
            close_replaced: false,
            reload_joysticks: false,
            audio_carry: 0,
        })
    }

    pub fn fonts(&self) -> &Fonts {
        &self.fonts
    }

    pub fn running(&self) -> bool {
        self.running
    }

    pub fn ips(&self) -> u32 {
        self.ips
    }

    pub fn set_ips(&mut self, ips: u32) -> MinduResult<()> {
        if ips == 0 {
            return Err(MinduError::invalid_argument("set_ips(): ips must be greater than 0"));
        }

        self.ips = ips;
        self.clock.set_ips(ips);
        self.audio_carry = 0;
        Ok(())
    }

    /// Milliseconds per iteration as seen by the input timers
    pub fn frame_ms(&self) -> u32 {
        1000 / self.ips
    }

    /// Turns the sleep between frames on or off
    pub fn set_paced(&mut self, paced: bool) {
        self.clock.set_paced(paced);
    }

    /// Called once per frame, after the input devices are updated. Replacing it from within a
    /// callback takes effect on the next frame.
    pub fn on_iterate(&mut self, callback: Option<Callback>) {
        self.on_iterate = callback;
        self.iterate_replaced = true;
    }

    /// Called when the user asks to close the display. Without one the loop stops.
    pub fn on_close(&mut self, callback: Option<Callback>) {
        self.on_close = callback;
        self.close_replaced = true;
    }

    /// Ends the loop once the running callback returns
    pub fn stop(&mut self) -> MinduResult<()> {
        if !self.running {
            return Err(MinduError::invalid_state("stop(): the loop is not running"));
        }

        self.stop_requested = true;
        Ok(())
    }

    /// Rebuilds the joystick list from the backend on the next frame
    pub fn reload_joysticks(&mut self) {
        self.reload_joysticks = true;
    }

    /// Opens the display and runs frames until [`stop`](Context::stop) is called or the
    /// close request goes unhandled. The display is closed and every channel stopped on the way
    /// out, even when a callback fails.
    pub fn run(&mut self, backend: &mut dyn Backend) -> MinduResult<()> {
        if self.running {
            return Err(MinduError::invalid_state("run(): the loop is already running"));
        }

        let (width, height) = self.screen.size();
        let mode = DisplayMode {
            title: self.screen.title().to_string(),
            width: width as u32,
            height: height as u32,
            fullscreen: self.screen.full(),
        };

        backend.open_display(&mode)?;

        if let Err(e) = backend.set_icon(self.screen.icon().surface()) {
            warn!("Failed to set the window icon: {}", e);
        }

        self.running = true;
        self.stop_requested = false;
        self.audio_carry = 0;
        self.screen.create();
        self.mixer.set_running(true);
        self.clock.reset();
        self.load_joysticks(backend, &[]);

        info!("Mindu {} loop started at {} ips", crate::VERSION, self.ips);

        let result = self.frames(backend);

        if let Err(e) = result.as_ref() {
            error!("Loop aborted: {}", e);
        }

        self.screen.destroy();
        backend.close_display();
        self.mixer.stop_all();
        self.mixer.set_running(false);
        self.joysticks.clear();
        self.running = false;

        info!("Loop stopped");
        result
    }

    fn frames(&mut self, backend: &mut dyn Backend) -> MinduResult<()> {
        while self.frame(backend)? {}
        Ok(())
    }

    /// One loop iteration, false once the loop should end
    fn frame(&mut self, backend: &mut dyn Backend) -> MinduResult<bool> {
        if let Some((x, y)) = self.mouse.take_warp() {
            backend.warp_mouse(x, y);
        }

        let events = backend.pump()?;
        self.update_input(backend, &events);

        self.call_iterate()?;
        if self.stop_requested {
            return Ok(false);
        }

        if events.quit {
            self.call_close()?;
            if self.stop_requested {
                return Ok(false);
            }
        }

        self.apply_display_requests(backend);
        self.queue_audio(backend);

        let cursor = if self.mouse.visible() {
            Some((&**self.mouse.cursor().surface(), self.mouse.position()))
        } else {
            None
        };

        self.screen.composite(backend, cursor)?;
        self.clock.tick();

        Ok(true)
    }

    fn update_input(&mut self, backend: &mut dyn Backend, events: &Events) {
        let frame_ms = self.frame_ms();

        self.keyboard.update(&events.keys, frame_ms);
        self.mouse.update(&events.mouse, frame_ms);

        if self.reload_joysticks || events.joysticks_changed {
            self.load_joysticks(backend, &events.joysticks);
            return;
        }

        for (i, joystick) in self.joysticks.iter_mut().enumerate() {
            joystick.update(&events.joysticks.get(i).cloned().unwrap_or_default(), frame_ms);
        }
    }

    fn load_joysticks(&mut self, backend: &mut dyn Backend, states: &[JoystickState]) {
        self.reload_joysticks = false;
        self.joysticks = backend
            .joysticks()
            .iter()
            .enumerate()
            .map(|(i, info)| Joystick::new(info, &states.get(i).cloned().unwrap_or_default()))
            .collect();

        for j in self.joysticks.iter() {
            debug!("Joystick \"{}\" ({} symbols)", j.name(), j.symbol_table().len());
        }
        info!("{} joystick(s) connected", self.joysticks.len());
    }

    fn call_iterate(&mut self) -> MinduResult<()> {
        let mut callback = match self.on_iterate.take() {
            Some(cb) => cb,
            None => return Ok(()),
        };

        self.iterate_replaced = false;
        let result = callback(self);

        if !self.iterate_replaced {
            self.on_iterate = Some(callback);
        }

        result
    }

    fn call_close(&mut self) -> MinduResult<()> {
        let mut callback = match self.on_close.take() {
            Some(cb) => cb,
            None => {
                debug!("Close requested, stopping");
                self.stop_requested = true;
                return Ok(());
            }
        };

        self.close_replaced = false;
        let result = callback(self);

        if !self.close_replaced {
            self.on_close = Some(callback);
        }

        result
    }

    fn apply_display_requests(&mut self, backend: &mut dyn Backend) {
        for request in self.screen.take_requests() {
            let result = match &request {
                DisplayRequest::Fullscreen(full) => backend.set_fullscreen(*full),
                DisplayRequest::Title(title) => backend.set_title(title),
                DisplayRequest::Icon(icon) => backend.set_icon(icon),
            };

            if let Err(e) = result {
                warn!("Display request {:?} failed: {}", request, e);
            }
        }
    }

    fn queue_audio(&mut self, backend: &mut dyn Backend) {
        let total = SAMPLE_RATE + self.audio_carry;
        let count = (total / self.ips) as usize;
        self.audio_carry = total % self.ips;

        let mut block = vec![0i16; count];
        self.mixer.mix(&mut block);

        if let Err(e) = backend.queue_audio(&block) {
            warn!("Failed to queue audio: {}", e);
        }
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("screen", &self.screen)
            .field("joysticks", &self.joysticks.len())
            .field("ips", &self.ips)
            .field("running", &self.running)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use image::Rgba;
    use super::*;
    use crate::backend::HeadlessBackend;
    use crate::input::JoystickInfo;
    use crate::picture::Image;
    use crate::rect::Placement;
    use crate::sound::Sound;
    use crate::surface::Surface;

    fn context() -> Context {
        let mut ctx = Context::new(Settings {
            width: 8,
            height: 6,
            mouse_visible: false,
            ..Default::default()
        })
        .unwrap();
        ctx.set_paced(false);
        ctx
    }

    fn pressing(keys: &[&str]) -> Events {
        Events {
            keys: keys.iter().map(|k| k.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn unhandled_close_stops_the_loop() {
        let mut ctx = context();
        let mut backend = HeadlessBackend::new();
        backend.push_idle(3);

        ctx.run(&mut backend).unwrap();

        assert_eq!(backend.frames().len(), 3);
        assert_eq!(backend.pumps(), 4);
        assert!(!backend.is_open());
        assert!(!ctx.running());
        assert!(!ctx.screen.running());
    }

    #[test]
    fn window_gets_the_builtin_icon() {
        let mut ctx = context();
        let mut backend = HeadlessBackend::new();
        backend.push_idle(1);

        ctx.run(&mut backend).unwrap();

        assert_eq!(backend.icons(), 1);
        assert_eq!(ctx.screen.icon().size(), (16, 16));
    }

    #[test]
    fn stop_needs_a_running_loop() {
        let mut ctx = context();
        assert!(matches!(ctx.stop(), Err(MinduError::InvalidState(_))));
    }

    #[test]
    fn stopped_frame_is_not_composited() {
        let mut ctx = context();
        let mut backend = HeadlessBackend::new();
        backend.push_idle(10);

        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);

        ctx.on_iterate(Some(Box::new(move |ctx| {
            assert!(ctx.running());
            c.set(c.get() + 1);
            if c.get() == 3 {
                ctx.stop()?;
            }
            Ok(())
        })));

        ctx.run(&mut backend).unwrap();

        assert_eq!(count.get(), 3);
        assert_eq!(backend.frames().len(), 2);
    }

    #[test]
    fn close_handler_decides() {
        let mut ctx = context();
        let mut backend = HeadlessBackend::new();
        for _ in 0..2 {
            backend.push_events(Events {
                quit: true,
                ..Default::default()
            });
        }

        let closes = Rc::new(Cell::new(0));
        let c = Rc::clone(&closes);

        ctx.on_close(Some(Box::new(move |ctx| {
            c.set(c.get() + 1);
            if c.get() == 2 {
                ctx.stop()?;
            }
            Ok(())
        })));

        ctx.run(&mut backend).unwrap();

        assert_eq!(closes.get(), 2);
        assert_eq!(backend.frames().len(), 1);
    }

    #[test]
    fn callback_replacement_waits_for_next_frame() {
        let mut ctx = context();
        let mut backend = HeadlessBackend::new();
        backend.push_idle(3);

        let log = Rc::new(RefCell::new(Vec::new()));
        let first = Rc::clone(&log);

        ctx.on_iterate(Some(Box::new(move |ctx| {
            first.borrow_mut().push("first");

            let second = Rc::clone(&first);
            ctx.on_iterate(Some(Box::new(move |_| {
                second.borrow_mut().push("second");
                Ok(())
            })));
            Ok(())
        })));

        ctx.run(&mut backend).unwrap();

        assert_eq!(*log.borrow(), vec!["first", "second", "second", "second"]);
    }

    #[test]
    fn callback_error_still_tears_down() {
        let mut ctx = context();
        let mut backend = HeadlessBackend::new();
        backend.push_idle(5);

        ctx.on_iterate(Some(Box::new(|_| Err(MinduError::invalid_argument("boom")))));

        assert!(matches!(ctx.run(&mut backend), Err(MinduError::InvalidArgument(_))));
        assert!(!backend.is_open());
        assert!(!ctx.running());
        assert!(!ctx.mixer.running());
    }

    #[test]
    fn keyboard_edges_reach_the_callback() {
        let mut ctx = context();
        let mut backend = HeadlessBackend::new();
        backend.push_events(pressing(&["space"]));
        backend.push_events(pressing(&["space"]));
        backend.push_events(pressing(&[]));

        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);

        ctx.on_iterate(Some(Box::new(move |ctx| {
            let k = &ctx.keyboard;
            s.borrow_mut()
                .push((k.ding("space")?, k.dong("space")?, k.time("space")?));
            Ok(())
        })));

        ctx.run(&mut backend).unwrap();

        let frame_ms = 1000 / 60;
        assert_eq!(
            *seen.borrow(),
            vec![
                (true, false, 0),
                (false, false, frame_ms),
                (false, true, 0),
                // The closing frame still runs the callback
                (false, false, 0),
            ]
        );
    }

    #[test]
    fn drawn_sprites_reach_the_backend() {
        let mut ctx = context();
        let mut backend = HeadlessBackend::new();
        backend.push_idle(1);

        let red = Rgba([255, 0, 0, 255]);
        let mut image = Image::from_surface(Surface::filled(2, 2, red)).placed(Placement::TopLeft(1, 1));

        ctx.on_iterate(Some(Box::new(move |ctx| image.draw(&mut ctx.screen))));
        ctx.run(&mut backend).unwrap();

        let frame = backend.last_frame().unwrap();
        assert_eq!(frame.size(), (8, 6));
        assert_eq!(frame.pixel(1, 1), red);
        assert_eq!(frame.pixel(0, 0), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn audio_keeps_pace_with_frames() {
        let mut ctx = context();
        ctx.set_ips(32).unwrap();
        let mut backend = HeadlessBackend::new();
        backend.push_idle(8);

        ctx.on_iterate(Some(Box::new(|ctx| {
            let sound = Sound::from_samples(vec![100; 10]);
            if let Some(ch) = ctx.mixer.idle_channel() {
                ch.play(&sound, 0, 0, 0)?;
            }
            ctx.on_iterate(None);
            Ok(())
        })));

        ctx.run(&mut backend).unwrap();

        // 8 frames at 32 ips is exactly a quarter of a second
        assert_eq!(backend.audio().len(), SAMPLE_RATE as usize / 4);
        assert_eq!(&backend.audio()[..10], &[100; 10]);
        assert_eq!(backend.audio()[10], 0);
    }

    #[test]
    fn warps_and_display_requests_are_forwarded() {
        let mut ctx = context();
        let mut backend = HeadlessBackend::new();
        backend.push_idle(2);

        ctx.on_iterate(Some(Box::new(|ctx| {
            ctx.mouse.set_position((3, 4));
            ctx.screen.set_title(Some("Other"))?;
            ctx.screen.toggle_full();
            ctx.on_iterate(None);
            Ok(())
        })));

        ctx.run(&mut backend).unwrap();

        assert_eq!(backend.warps(), &[(3, 4)]);
        assert_eq!(backend.titles(), &["Other".to_string()]);
        assert_eq!(backend.mode().map(|m| m.fullscreen), Some(true));
    }

    #[test]
    fn joysticks_follow_the_backend() {
        let mut ctx = context();
        let pad = JoystickInfo {
            name: "Pad  One".to_string(),
            buttons: 2,
            hats: 0,
            axes: 0,
        };
        let mut backend = HeadlessBackend::new().with_joysticks(vec![pad]);

        backend.push_events(Events {
            joysticks: vec![JoystickState {
                buttons: vec![false, true],
                ..Default::default()
            }],
            ..Default::default()
        });
        backend.push_events(Events {
            joysticks_changed: true,
            ..Default::default()
        });

        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);

        ctx.on_iterate(Some(Box::new(move |ctx| {
            let first = match ctx.joysticks.first() {
                Some(j) => (j.name().to_string(), j.ding("button-1")?),
                None => (String::new(), false),
            };
            s.borrow_mut().push((ctx.joysticks.len(), first));
            Ok(())
        })));

        ctx.run(&mut backend).unwrap();

        assert_eq!(
            *seen.borrow(),
            vec![
                (1, ("Pad One".to_string(), true)),
                (1, ("Pad One".to_string(), false)),
                (1, ("Pad One".to_string(), false)),
            ]
        );
    }

    #[test]
    fn cursor_is_drawn_when_visible() {
        let mut ctx = context();
        ctx.mouse.set_visible(true);
        ctx.mouse.set_cursor(Some(Image::from_surface(Surface::filled(1, 1, Rgba([0, 255, 0, 255])))));

        let mut backend = HeadlessBackend::new();
        backend.push_events(Events {
            mouse: MouseState {
                position: (5, 5),
                ..Default::default()
            },
            ..Default::default()
        });

        ctx.run(&mut backend).unwrap();

        assert_eq!(backend.last_frame().unwrap().pixel(5, 5), Rgba([0, 255, 0, 255]));
    }

    #[test]
    fn settings_are_validated() {
        let bad = Settings {
            height: 0,
            ..Default::default()
        };
        assert!(Context::new(bad).is_err());

        let mut ctx = context();
        assert!(ctx.set_ips(0).is_err());
        ctx.set_ips(50).unwrap();
        assert_eq!(ctx.frame_ms(), 20);
    }
}
