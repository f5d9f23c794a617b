mod joystick;

pub use joystick::Joysticks;

use sdl3::keyboard::Keycode;
use mindu_lib::input::keyboard::KEY_NAMES;

/// SDL key names that don't follow the lower-case rule
const RENAMED: &[(&str, &str)] = &[
    ("!", "exclaim"),
    ("\"", "quotedbl"),
    ("#", "hash"),
    ("$", "dollar"),
    ("&", "ampersand"),
    ("'", "quote"),
    ("(", "leftparen"),
    (")", "rightparen"),
    ("*", "asterisk"),
    ("+", "plus"),
    (",", "comma"),
    ("-", "minus"),
    (".", "period"),
    ("/", "slash"),
    (":", "colon"),
    (";", "semicolon"),
    ("<", "less"),
    ("=", "equals"),
    (">", "greater"),
    ("?", "question"),
    ("@", "at"),
    ("[", "leftbracket"),
    ("\\", "backslash"),
    ("]", "rightbracket"),
    ("^", "caret"),
    ("_", "underscore"),
    ("`", "backquote"),
    ("enter", "return"),
    ("page up", "pageup"),
    ("page down", "pagedown"),
    ("numlockclear", "numlock"),
    ("caps lock", "capslock"),
    ("scrolllock", "scrollock"),
    ("scroll lock", "scrollock"),
    ("printscreen", "print"),
    ("left shift", "lshift"),
    ("right shift", "rshift"),
    ("left ctrl", "lctrl"),
    ("right ctrl", "rctrl"),
    ("left alt", "lalt"),
    ("right alt", "ralt"),
    ("left gui", "lsuper"),
    ("right gui", "rsuper"),
    ("modeswitch", "mode"),
    ("keypad .", "kp-period"),
    ("keypad /", "kp-divide"),
    ("keypad *", "kp-multiply"),
    ("keypad -", "kp-minus"),
    ("keypad +", "kp-plus"),
    ("keypad enter", "kp-enter"),
    ("keypad =", "kp-equals"),
];

/// Maps an SDL key name ("Return", "Left Shift", "Keypad 5") to the keyboard symbol it stands for
pub fn key_name(sdl_name: &str) -> Option<&'static str> {
    let lower = sdl_name.trim().to_ascii_lowercase();

    if let Some((_, name)) = RENAMED.iter().find(|(from, _)| *from == lower) {
        return Some(*name);
    }

    if let Some(digit) = lower.strip_prefix("keypad ").filter(|d| d.len() == 1) {
        let kp = format!("kp{}", digit);
        return KEY_NAMES.iter().copied().find(|&name| name == kp);
    }

    KEY_NAMES.iter().copied().find(|&name| name == lower)
}

pub fn keycode_name(keycode: Keycode) -> Option<&'static str> {
    key_name(&keycode.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_names_are_lower_cased() {
        assert_eq!(key_name("Return"), Some("return"));
        assert_eq!(key_name("Space"), Some("space"));
        assert_eq!(key_name("A"), Some("a"));
        assert_eq!(key_name("F12"), Some("f12"));
        assert_eq!(key_name("Escape"), Some("escape"));
    }

    #[test]
    fn renamed_keys() {
        assert_eq!(key_name("Left Shift"), Some("lshift"));
        assert_eq!(key_name("Keypad Enter"), Some("kp-enter"));
        assert_eq!(key_name("Keypad 7"), Some("kp7"));
        assert_eq!(key_name("PageUp"), Some("pageup"));
        assert_eq!(key_name("/"), Some("slash"));
    }

    #[test]
    fn unknown_keys() {
        assert_eq!(key_name("AC Back"), None);
        assert_eq!(key_name(""), None);
    }
}
