use std::path::{Path, PathBuf};
use std::str::FromStr;
use ini::{Ini, Properties};
use tracing::{info, warn};
use mindu_lib::Settings;
use crate::error::AppResult;

pub const DEFAULT_CONFIG_PATH: &str = "assets/config/mindu.ini";
pub const DEFAULT_ASSETS_DIR: &str = "assets/fire_pig_fire";

/// Start-up configuration of the frontend
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub settings: Settings,
    /// Root of the game's images, animations, sounds and fonts
    pub assets: PathBuf,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            settings: Settings::default(),
            assets: PathBuf::from(DEFAULT_ASSETS_DIR),
        }
    }
}

impl Config {
    /// Reads `path` over the defaults. A missing file keeps every default.
    pub fn load(path: &Path, defaults: Config) -> AppResult<Config> {
        if !path.is_file() {
            warn!("Config file {} not found, using defaults", path.display());
            return Ok(defaults);
        }

        let ini = Ini::load_from_file(path)?;
        info!("Loaded config from {}", path.display());

        Ok(Config::from_ini(&ini, defaults))
    }

    /// Overrides the defaults with every valid key, invalid ones are reported and skipped
    pub fn from_ini(ini: &Ini, defaults: Config) -> Config {
        let mut config = defaults;
        let s = &mut config.settings;

        if let Some(sec) = ini.section(Some("Screen")) {
            if let Some(title) = sec.get("title").filter(|t| !t.is_empty()) {
                s.title = title.to_string();
            }
            read(sec, "Screen", "width", &mut s.width, |v| *v > 0);
            read(sec, "Screen", "height", &mut s.height, |v| *v > 0);
            read_bool(sec, "Screen", "fullscreen", &mut s.fullscreen);
            read(sec, "Screen", "replay_length", &mut s.replay_length, |_| true);
        }

        if let Some(sec) = ini.section(Some("Loop")) {
            read(sec, "Loop", "ips", &mut s.ips, |v| *v > 0);
        }

        if let Some(sec) = ini.section(Some("Audio")) {
            read(sec, "Audio", "channels", &mut s.channels, |v| *v > 0);
        }

        if let Some(sec) = ini.section(Some("Mouse")) {
            read_bool(sec, "Mouse", "visible", &mut s.mouse_visible);
            read(sec, "Mouse", "idle_time", &mut s.mouse_idle_time, |v| *v > 0);
        }

        if let Some(sec) = ini.section(Some("Font")) {
            if let Some(font) = sec.get("default").filter(|f| !f.is_empty()) {
                s.default_font = Some(PathBuf::from(font));
            }
        }

        if let Some(dir) = ini.section(Some("Game")).and_then(|sec| sec.get("assets")) {
            config.assets = PathBuf::from(dir);
        }

        config
    }
}

fn read<T, F>(sec: &Properties, section: &str, key: &str, out: &mut T, valid: F)
where
    T: FromStr,
    F: Fn(&T) -> bool,
{
    let raw = match sec.get(key) {
        Some(raw) => raw,
        None => return,
    };

    match raw.trim().parse::<T>() {
        Ok(v) if valid(&v) => *out = v,
        _ => warn!("Invalid value for [{}] {}: \"{}\", keeping the default", section, key, raw),
    }
}

fn read_bool(sec: &Properties, section: &str, key: &str, out: &mut bool) {
    let raw = match sec.get(key) {
        Some(raw) => raw,
        None => return,
    };

    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => *out = true,
        "0" | "false" | "no" | "off" => *out = false,
        _ => warn!("Invalid value for [{}] {}: \"{}\", keeping the default", section, key, raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_valid_keys() {
        let ini = Ini::load_from_str(
            "[Screen]\nwidth = 320\nfullscreen = yes\n[Loop]\nips = 30\n[Font]\ndefault = a.ttf\n[Game]\nassets = data\n",
        )
        .unwrap();

        let config = Config::from_ini(&ini, Config::default());

        assert_eq!(config.settings.width, 320);
        assert_eq!(config.settings.height, 480);
        assert!(config.settings.fullscreen);
        assert_eq!(config.settings.ips, 30);
        assert_eq!(config.settings.default_font, Some(PathBuf::from("a.ttf")));
        assert_eq!(config.assets, PathBuf::from("data"));
    }

    #[test]
    fn invalid_values_keep_defaults() {
        let ini = Ini::load_from_str("[Screen]\nwidth = -3\ntitle =\n[Loop]\nips = 0\n[Mouse]\nvisible = maybe\n")
            .unwrap();

        let config = Config::from_ini(&ini, Config::default());

        assert_eq!(config, Config::default());
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let config = Config::load(Path::new("/nonexistent/mindu.ini"), Config::default()).unwrap();
        assert_eq!(config, Config::default());
    }
}
