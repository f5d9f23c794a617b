use std::path::PathBuf;
use tracing::info;
use mindu_lib::Context;
use crate::config::{Config, DEFAULT_CONFIG_PATH};
use crate::error::AppResult;
use crate::game;
use crate::sdl::SdlBackend;

pub struct App {
    ctx: Context,
    backend: SdlBackend,
    assets: PathBuf,
}

impl App {
    /// Reads the config at `config_path` (or the default one) and brings SDL up
    pub fn new(config_path: Option<String>) -> AppResult<Self> {
        info!("Begin log (mindu {})", mindu_lib::VERSION);

        let path = PathBuf::from(config_path.as_deref().unwrap_or(DEFAULT_CONFIG_PATH));

        let mut defaults = Config::default();
        defaults.settings.title = game::TITLE.to_string();
        defaults.settings.width = game::WIDTH;
        defaults.settings.height = game::HEIGHT;

        let config = Config::load(&path, defaults)?;

        Ok(App {
            ctx: Context::new(config.settings)?,
            backend: SdlBackend::new()?,
            assets: config.assets,
        })
    }

    /// Plays until the window is closed
    pub fn run(&mut self) -> AppResult<()> {
        game::start(&mut self.ctx, game::Assets::new(&self.assets))?;
        self.ctx.run(&mut self.backend)?;

        info!("End log");
        Ok(())
    }
}
