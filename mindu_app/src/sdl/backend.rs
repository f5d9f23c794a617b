use mindu_lib::{Backend, DisplayMode, Events, JoystickInfo, MinduError, MinduResult, Surface};
use tracing::{info, warn};
use crate::error::AppResult;
use crate::sdl;
use crate::sdl::audio::stream::Stream;
use crate::sdl::evt::pump::{self, Scale, Tracker};
use crate::sdl::evt::EventPump;
use crate::sdl::input::Joysticks;
use crate::sdl::wnd::canvas::Canvas;
use crate::sdl::wnd::Window;

/// The platform side of the frame loop on top of SDL3
pub struct SdlBackend {
    canvas: Option<Canvas>,
    wnd: Option<Window>,
    /// Screen size the frames are rendered at
    logical: (u32, u32),
    event_pump: EventPump,
    tracker: Tracker,
    stream: Stream,
    joysticks: Joysticks,
    ctx: sdl::Context,
}

impl SdlBackend {
    pub fn new() -> AppResult<Self> {
        let ctx = sdl::Context::new()?;
        let event_pump = EventPump::new(&ctx)?;

        // Audio stream: must be created and used in main thread
        let device = sdl::audio::Device::open(&ctx)?;
        let mut stream = Stream::open(&device)?;
        stream.resume()?;

        let joysticks = Joysticks::new(&ctx)?;

        info!("SDL backend initialized");

        Ok(SdlBackend {
            canvas: None,
            wnd: None,
            logical: (0, 0),
            event_pump,
            tracker: Tracker::new(),
            stream,
            joysticks,
            ctx,
        })
    }

    fn window_mut(&mut self) -> MinduResult<&mut Window> {
        self.wnd
            .as_mut()
            .ok_or_else(|| MinduError::Backend("the display is closed".to_string()))
    }

    fn scale(&self) -> Scale {
        match self.wnd.as_ref() {
            Some(wnd) if wnd.width() > 0 && wnd.height() > 0 => Scale {
                x: self.logical.0 as f32 / wnd.width() as f32,
                y: self.logical.1 as f32 / wnd.height() as f32,
            },
            _ => Scale { x: 1.0, y: 1.0 },
        }
    }
}

impl Backend for SdlBackend {
    fn open_display(&mut self, mode: &DisplayMode) -> MinduResult<()> {
        let wnd = Window::new(&self.ctx, mode)?;
        let canvas = Canvas::from(&wnd);

        // The cursor is part of the composited frame
        self.ctx.mouse().show_cursor(false);

        self.logical = (mode.width, mode.height);
        self.canvas = Some(canvas);
        self.wnd = Some(wnd);

        info!("Window opened ({}x{})", mode.width, mode.height);
        Ok(())
    }

    fn close_display(&mut self) {
        self.canvas = None;
        self.wnd = None;
        self.ctx.mouse().show_cursor(true);

        info!("Window closed");
    }

    fn set_fullscreen(&mut self, fullscreen: bool) -> MinduResult<()> {
        self.window_mut()?.set_fullscreen(fullscreen)?;
        Ok(())
    }

    fn set_title(&mut self, title: &str) -> MinduResult<()> {
        self.window_mut()?.set_title(title)?;
        Ok(())
    }

    fn set_icon(&mut self, icon: &Surface) -> MinduResult<()> {
        self.window_mut()?.set_icon(icon)?;
        Ok(())
    }

    fn pump(&mut self) -> MinduResult<Events> {
        let scale = self.scale();
        let mut events = pump::poll(&mut self.event_pump, &mut self.tracker, scale);

        if events.joysticks_changed {
            self.joysticks.reload();
        }
        events.joysticks = self.joysticks.states();

        Ok(events)
    }

    fn present(&mut self, frame: &Surface) -> MinduResult<()> {
        match self.canvas.as_mut() {
            Some(canvas) => canvas.show(frame)?,
            None => return Err(MinduError::Backend("present(): the display is closed".to_string())),
        }
        Ok(())
    }

    fn queue_audio(&mut self, samples: &[i16]) -> MinduResult<()> {
        self.stream.play(samples)?;
        Ok(())
    }

    fn warp_mouse(&mut self, x: i32, y: i32) {
        let scale = self.scale();

        if let Some(wnd) = self.wnd.as_ref() {
            self.ctx
                .mouse()
                .warp_mouse_in_window(wnd.wnd(), x as f32 / scale.x, y as f32 / scale.y);
        } else {
            warn!("Mouse warp requested with the display closed");
        }
    }

    fn joysticks(&mut self) -> Vec<JoystickInfo> {
        self.joysticks.infos()
    }
}
