//! Keyboard shortcut dispatch.
//!
//! A [`KeyboardDispatcher`] owns a map from key chord to the ordered list of
//! callbacks registered for it. Dispatch only happens between [`start`] and
//! [`stop`]. A callback that panics is caught and logged, and the remaining
//! callbacks for the same chord still run.
//!
//! [`start`]: KeyboardDispatcher::start
//! [`stop`]: KeyboardDispatcher::stop

use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyChordError {
    #[error("Empty key chord")]
    Empty,
    #[error("Unknown modifier '{0}'")]
    UnknownModifier(String),
}

/// A key plus modifiers, in canonical form.
///
/// Parsing is case-insensitive and accepts common aliases, so
/// `"Control+Return"` and `"ctrl+enter"` are the same chord.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct KeyChord {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
    /// Lower-case key name (`"enter"`, `"k"`, `"+"`).
    pub key: String,
}

impl KeyChord {
    /// A chord without modifiers.
    pub fn key(key: &str) -> Self {
        Self {
            key: normalize_key(key),
            ..Self::default()
        }
    }

    pub fn parse(input: &str) -> Result<Self, KeyChordError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(KeyChordError::Empty);
        }

        // A trailing "+" key shows up as "ctrl++" or a lone "+".
        let (modifiers, key) = if input == "+" {
            ("", "+")
        } else if let Some(prefix) = input.strip_suffix("++") {
            (prefix, "+")
        } else {
            match input.rsplit_once('+') {
                Some((prefix, key)) => (prefix, key),
                None => ("", input),
            }
        };

        if key.trim().is_empty() {
            return Err(KeyChordError::Empty);
        }

        let mut chord = Self::key(key);
        for modifier in modifiers.split('+').filter(|m| !m.trim().is_empty()) {
            match modifier.trim().to_ascii_lowercase().as_str() {
                "ctrl" | "control" => chord.ctrl = true,
                "alt" | "option" => chord.alt = true,
                "shift" => chord.shift = true,
                "meta" | "cmd" | "command" | "super" => chord.meta = true,
                _ => return Err(KeyChordError::UnknownModifier(modifier.trim().to_string())),
            }
        }
        Ok(chord)
    }
}

impl FromStr for KeyChord {
    type Err = KeyChordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (on, name) in [
            (self.ctrl, "ctrl"),
            (self.alt, "alt"),
            (self.shift, "shift"),
            (self.meta, "meta"),
        ] {
            if on {
                write!(f, "{name}+")?;
            }
        }
        f.write_str(&self.key)
    }
}

fn normalize_key(key: &str) -> String {
    if !key.is_empty() && key.trim().is_empty() {
        return "space".to_string();
    }
    let lower = key.trim().to_ascii_lowercase();
    match lower.as_str() {
        "esc" => "escape".to_string(),
        "return" => "enter".to_string(),
        "del" => "delete".to_string(),
        _ => lower,
    }
}

/// Handle returned by [`KeyboardDispatcher::register`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

pub type KeyCallback = Arc<dyn Fn(&KeyChord) + Send + Sync>;

#[derive(Default)]
pub struct KeyboardDispatcher {
    handlers: HashMap<KeyChord, Vec<(HandlerId, KeyCallback)>>,
    next_id: u64,
    active: bool,
}

impl KeyboardDispatcher {
    /// A stopped dispatcher with no bindings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a callback for `chord`. Callbacks run in registration order.
    pub fn register(
        &mut self,
        chord: KeyChord,
        callback: impl Fn(&KeyChord) + Send + Sync + 'static,
    ) -> HandlerId {
        let id = HandlerId(self.next_id);
        self.next_id += 1;
        debug!(chord = %chord, ?id, "Registering key handler");
        self.handlers
            .entry(chord)
            .or_default()
            .push((id, Arc::new(callback)));
        id
    }

    /// Parse `chord` and register `callback` for it.
    pub fn bind(
        &mut self,
        chord: &str,
        callback: impl Fn(&KeyChord) + Send + Sync + 'static,
    ) -> Result<HandlerId, KeyChordError> {
        Ok(self.register(KeyChord::parse(chord)?, callback))
    }

    /// Remove a single callback. Returns `false` if it was not registered.
    pub fn unregister(&mut self, id: HandlerId) -> bool {
        let mut removed = false;
        self.handlers.retain(|_, list| {
            let before = list.len();
            list.retain(|(handler, _)| *handler != id);
            removed |= list.len() != before;
            !list.is_empty()
        });
        removed
    }

    pub fn start(&mut self) {
        self.active = true;
    }

    pub fn stop(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Number of callbacks bound to `chord`.
    pub fn handler_count(&self, chord: &KeyChord) -> usize {
        self.handlers.get(chord).map_or(0, Vec::len)
    }

    /// Run every callback bound to `chord`. Returns how many completed
    /// without panicking; 0 when the dispatcher is stopped.
    pub fn dispatch(&self, chord: &KeyChord) -> usize {
        if !self.active {
            return 0;
        }

        let Some(list) = self.handlers.get(chord) else {
            return 0;
        };

        let mut completed = 0;
        for (id, callback) in list {
            match panic::catch_unwind(AssertUnwindSafe(|| callback(chord))) {
                Ok(()) => completed += 1,
                Err(payload) => {
                    let message = payload
                        .downcast_ref::<&str>()
                        .map(|s| s.to_string())
                        .or_else(|| payload.downcast_ref::<String>().cloned())
                        .unwrap_or_else(|| "unknown panic".to_string());
                    error!(chord = %chord, ?id, %message, "Key handler panicked");
                }
            }
        }
        completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn recorder() -> (Arc<Mutex<Vec<&'static str>>>, impl Fn(&'static str) -> KeyCallback) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let log2 = Arc::clone(&log);
        let make = move |name: &'static str| -> KeyCallback {
            let log = Arc::clone(&log2);
            Arc::new(move |_: &KeyChord| log.lock().unwrap().push(name))
        };
        (log, make)
    }

    #[test]
    fn test_parse_canonical() {
        let chord = KeyChord::parse("Control+Shift+Return").unwrap();
        assert!(chord.ctrl && chord.shift && !chord.alt && !chord.meta);
        assert_eq!(chord.key, "enter");
        assert_eq!(chord.to_string(), "ctrl+shift+enter");
        assert_eq!(chord, "shift+ctrl+enter".parse::<KeyChord>().unwrap());
    }

    #[test]
    fn test_parse_plus_key() {
        assert_eq!(KeyChord::parse("+").unwrap(), KeyChord::key("+"));
        assert_eq!(KeyChord::key(" ").key, "space");
        let chord = KeyChord::parse("ctrl++").unwrap();
        assert!(chord.ctrl);
        assert_eq!(chord.key, "+");
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(KeyChord::parse(""), Err(KeyChordError::Empty));
        assert_eq!(KeyChord::parse("ctrl+"), Err(KeyChordError::Empty));
        assert_eq!(
            KeyChord::parse("hyper+k"),
            Err(KeyChordError::UnknownModifier("hyper".into()))
        );
    }

    #[test]
    fn test_dispatch_in_order() {
        let (log, make) = recorder();
        let mut dispatcher = KeyboardDispatcher::new();
        let enter = KeyChord::key("Enter");
        let first = make("first");
        let second = make("second");
        dispatcher.register(enter.clone(), move |c| first(c));
        dispatcher.register(enter.clone(), move |c| second(c));
        dispatcher.start();

        assert_eq!(dispatcher.dispatch(&enter), 2);
        assert_eq!(*log.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn test_stopped_dispatcher_is_silent() {
        let (log, make) = recorder();
        let mut dispatcher = KeyboardDispatcher::new();
        let cb = make("hit");
        dispatcher.bind("escape", move |c| cb(c)).unwrap();

        assert_eq!(dispatcher.dispatch(&KeyChord::key("esc")), 0);
        dispatcher.start();
        assert_eq!(dispatcher.dispatch(&KeyChord::key("esc")), 1);
        dispatcher.stop();
        assert_eq!(dispatcher.dispatch(&KeyChord::key("esc")), 0);
        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_panicking_handler_is_isolated() {
        let (log, make) = recorder();
        let mut dispatcher = KeyboardDispatcher::new();
        let chord = KeyChord::key("k");
        let before = make("before");
        let after = make("after");
        dispatcher.register(chord.clone(), move |c| before(c));
        dispatcher.register(chord.clone(), |_| panic!("handler failure"));
        dispatcher.register(chord.clone(), move |c| after(c));
        dispatcher.start();

        assert_eq!(dispatcher.dispatch(&chord), 2);
        assert_eq!(*log.lock().unwrap(), vec!["before", "after"]);
        // The dispatcher keeps working after a panic.
        assert_eq!(dispatcher.dispatch(&chord), 2);
    }

    #[test]
    fn test_unregister() {
        let mut dispatcher = KeyboardDispatcher::new();
        let chord = KeyChord::key("a");
        let a = dispatcher.register(chord.clone(), |_| {});
        let b = dispatcher.register(chord.clone(), |_| {});
        assert_eq!(dispatcher.handler_count(&chord), 2);

        assert!(dispatcher.unregister(a));
        assert!(!dispatcher.unregister(a));
        assert_eq!(dispatcher.handler_count(&chord), 1);
        assert!(dispatcher.unregister(b));
        assert_eq!(dispatcher.handler_count(&chord), 0);
    }

    #[test]
    fn test_unbound_chord() {
        let mut dispatcher = KeyboardDispatcher::new();
        dispatcher.start();
        assert_eq!(dispatcher.dispatch(&KeyChord::key("x")), 0);
    }
}
