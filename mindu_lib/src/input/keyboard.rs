use std::collections::HashSet;
use std::ops::{Deref, DerefMut};
use super::{Input, SymbolTable};

/// Every key symbol the keyboard knows about. Backends report pressed keys by these names.
pub const KEY_NAMES: &[&str] = &[
    "backspace", "tab", "clear", "return", "pause", "escape", "space", "exclaim", "quotedbl",
    "hash", "dollar", "ampersand", "quote", "leftparen", "rightparen", "asterisk", "plus",
    "comma", "minus", "period", "slash",
    "0", "1", "2", "3", "4", "5", "6", "7", "8", "9",
    "colon", "semicolon", "less", "equals", "greater", "question", "at", "leftbracket",
    "backslash", "rightbracket", "caret", "underscore", "backquote",
    "a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k", "l", "m", "n", "o", "p", "q", "r",
    "s", "t", "u", "v", "w", "x", "y", "z",
    "delete",
    "kp0", "kp1", "kp2", "kp3", "kp4", "kp5", "kp6", "kp7", "kp8", "kp9",
    "kp-period", "kp-divide", "kp-multiply", "kp-minus", "kp-plus", "kp-enter", "kp-equals",
    "up", "down", "right", "left", "insert", "home", "end", "pageup", "pagedown",
    "f1", "f2", "f3", "f4", "f5", "f6", "f7", "f8", "f9", "f10", "f11", "f12", "f13", "f14",
    "f15",
    "numlock", "capslock", "scrollock", "rshift", "lshift", "rctrl", "lctrl", "ralt", "lalt",
    "rmeta", "lmeta", "lsuper", "rsuper", "mode", "help", "print", "sysreq", "break", "menu",
    "power", "euro",
];

#[derive(Debug)]
pub struct Keyboard {
    input: Input,
}

impl Keyboard {
    pub fn new() -> Keyboard {
        let symbols = SymbolTable::new(KEY_NAMES.iter().copied());
        let busy = vec![false; symbols.len()];

        Keyboard {
            input: Input::new(symbols, busy),
        }
    }

    /// `pressed` holds the names of the keys currently down, unknown names are ignored
    pub fn update(&mut self, pressed: &HashSet<String>, frame_ms: u32) {
        let table = self.input.symbol_table();
        let mut busy = vec![false; table.len()];

        for id in pressed.iter().filter_map(|name| table.index(name)) {
            busy[id] = true;
        }

        self.input.update(busy, frame_ms);
    }
}

impl Default for Keyboard {
    fn default() -> Keyboard {
        Keyboard::new()
    }
}

impl Deref for Keyboard {
    type Target = Input;
    fn deref(&self) -> &Self::Target {
        &self.input
    }
}

impl DerefMut for Keyboard {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.input
    }
}
