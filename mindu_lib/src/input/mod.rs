//! Edge detection shared by every input device.
//!
//! A device turns its raw state into a vector of busy flags, one per symbol, and hands it to
//! [`Input::update`] once per frame. Symbols that became busy this frame "ding", symbols that
//! became idle "dong", and symbols that stay busy accumulate hold time.

pub mod keyboard;
pub mod mouse;
pub mod joystick;

use std::collections::HashMap;
use std::fmt;
use crate::error::{MinduError, MinduResult};

pub use keyboard::Keyboard;
pub use mouse::{Mouse, MouseState};
pub use joystick::{Joystick, JoystickInfo, JoystickState};

pub type InputCallback = Box<dyn FnMut(&str)>;

/// Bidirectional mapping between symbol names and dense indices
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SymbolTable {
    names: Vec<String>,
    indices: HashMap<String, usize>,
}

impl SymbolTable {
    pub fn new<I, S>(names: I) -> SymbolTable
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = SymbolTable::default();

        for name in names {
            let name = name.into();
            if !table.indices.contains_key(&name) {
                table.indices.insert(name.clone(), table.names.len());
                table.names.push(name);
            }
        }

        table
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn index(&self, name: &str) -> Option<usize> {
        self.indices.get(name).copied()
    }

    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

pub struct Input {
    symbols: SymbolTable,
    busy: Vec<bool>,
    old_busy: Vec<bool>,
    time: Vec<u32>,
    ding: Vec<usize>,
    dong: Vec<usize>,
    on_ding: Option<InputCallback>,
    on_dong: Option<InputCallback>,
}

impl Input {
    /// `busy` is the state the device is in at construction, it doesn't ding
    pub fn new(symbols: SymbolTable, busy: Vec<bool>) -> Input {
        let len = symbols.len();
        let busy = fit(busy, len);

        Input {
            symbols,
            old_busy: busy.clone(),
            busy,
            time: vec![0; len],
            ding: Vec::new(),
            dong: Vec::new(),
            on_ding: None,
            on_dong: None,
        }
    }

    /// Runs edge detection against a fresh busy vector, then fires the callbacks
    pub fn update(&mut self, busy: Vec<bool>, frame_ms: u32) {
        self.old_busy = std::mem::replace(&mut self.busy, fit(busy, self.symbols.len()));

        self.ding.clear();
        self.dong.clear();

        for (id, (&now, &before)) in self.busy.iter().zip(self.old_busy.iter()).enumerate() {
            match (now, before) {
                (true, false) => self.ding.push(id),
                (true, true) => self.time[id] += frame_ms,
                (false, true) => {
                    self.dong.push(id);
                    self.time[id] = 0;
                }
                (false, false) => (),
            }
        }

        if let Some(cb) = self.on_ding.as_mut() {
            for &id in self.ding.iter() {
                cb(self.symbols.name(id).unwrap_or("unknown symbol"));
            }
        }

        if let Some(cb) = self.on_dong.as_mut() {
            for &id in self.dong.iter() {
                cb(self.symbols.name(id).unwrap_or("unknown symbol"));
            }
        }
    }

    pub fn symbol_table(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn symbols(&self) -> Vec<&str> {
        self.symbols.names().collect()
    }

    fn lookup(&self, symbol: &str) -> MinduResult<usize> {
        self.symbols
            .index(symbol)
            .ok_or_else(|| MinduError::UnknownSymbol(symbol.to_string()))
    }

    /// True if `symbol` became busy this frame
    pub fn ding(&self, symbol: &str) -> MinduResult<bool> {
        let id = self.lookup(symbol)?;
        Ok(self.ding.contains(&id))
    }

    /// True if `symbol` became idle this frame
    pub fn dong(&self, symbol: &str) -> MinduResult<bool> {
        let id = self.lookup(symbol)?;
        Ok(self.dong.contains(&id))
    }

    pub fn busy(&self, symbol: &str) -> MinduResult<bool> {
        let id = self.lookup(symbol)?;
        Ok(self.busy[id])
    }

    /// Milliseconds `symbol` has been held, counted from the frame after it dinged
    pub fn time(&self, symbol: &str) -> MinduResult<u32> {
        let id = self.lookup(symbol)?;
        Ok(self.time[id])
    }

    /// First symbol (lowest index) that became busy this frame
    pub fn get(&self) -> Option<&str> {
        self.ding.first().and_then(|&id| self.symbols.name(id))
    }

    pub fn on_ding(&mut self, callback: Option<InputCallback>) {
        self.on_ding = callback;
    }

    pub fn on_dong(&mut self, callback: Option<InputCallback>) {
        self.on_dong = callback;
    }
}

impl fmt::Debug for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Input")
            .field("symbols", &self.symbols.len())
            .field("ding", &self.ding)
            .field("dong", &self.dong)
            .field("on_ding", &self.on_ding.is_some())
            .field("on_dong", &self.on_dong.is_some())
            .finish()
    }
}

fn fit(mut busy: Vec<bool>, len: usize) -> Vec<bool> {
    busy.resize(len, false);
    busy
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn input() -> Input {
        Input::new(SymbolTable::new(["a", "b", "c"]), vec![false; 3])
    }

    #[test]
    fn symbol_table_is_bidirectional() {
        let t = SymbolTable::new(["x", "y", "x", "z"]);

        assert_eq!(t.len(), 3);
        assert_eq!(t.index("z"), Some(2));
        assert_eq!(t.name(1), Some("y"));
        assert_eq!(t.index("w"), None);
    }

    #[test]
    fn ding_and_dong_are_exclusive() {
        let mut i = input();

        i.update(vec![true, false, true], 16);
        assert!(i.ding("a").unwrap());
        assert!(!i.dong("a").unwrap());
        assert!(i.ding("c").unwrap());
        assert_eq!(i.get(), Some("a"));

        i.update(vec![false, true, true], 16);
        assert!(i.dong("a").unwrap());
        assert!(!i.ding("a").unwrap());
        assert!(i.ding("b").unwrap());
        assert!(!i.ding("c").unwrap());
        assert!(!i.dong("c").unwrap());
        assert_eq!(i.get(), Some("b"));

        i.update(vec![false, true, true], 16);
        assert_eq!(i.get(), None);
    }

    #[test]
    fn hold_timer() {
        let mut i = input();
        let frame_ms = 1000 / 60;

        for _ in 0..5 {
            i.update(vec![false, false, true], frame_ms);
        }

        // The ding frame itself doesn't count
        assert_eq!(i.time("c").unwrap(), 4 * 16);
        assert!(i.busy("c").unwrap());

        i.update(vec![false; 3], frame_ms);
        assert_eq!(i.time("c").unwrap(), 0);
        assert!(i.dong("c").unwrap());
    }

    #[test]
    fn unknown_symbols_are_errors() {
        let i = input();

        assert!(matches!(i.ding("nope"), Err(MinduError::UnknownSymbol(_))));
        assert!(matches!(i.time("nope"), Err(MinduError::UnknownSymbol(_))));
    }

    #[test]
    fn callbacks_fire_in_index_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut i = input();

        let l = Rc::clone(&log);
        i.on_ding(Some(Box::new(move |s| l.borrow_mut().push(format!("ding {}", s)))));
        let l = Rc::clone(&log);
        i.on_dong(Some(Box::new(move |s| l.borrow_mut().push(format!("dong {}", s)))));

        i.update(vec![true, true, false], 16);
        i.update(vec![false, true, true], 16);

        assert_eq!(
            *log.borrow(),
            vec!["ding a", "ding b", "ding c", "dong a"]
        );

        i.on_ding(None);
        i.update(vec![true, true, true], 16);
        assert_eq!(log.borrow().len(), 4);
    }

    #[test]
    fn initial_state_does_not_ding() {
        let mut i = Input::new(SymbolTable::new(["a"]), vec![true]);

        i.update(vec![true], 10);

        assert!(!i.ding("a").unwrap());
        assert_eq!(i.time("a").unwrap(), 10);
    }
}
