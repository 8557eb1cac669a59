//! Keyboard shortcuts.

/// A key press, reduced to what the editor cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Space,
    Escape,
    Char(char),
    Other,
}

impl Key {
    /// Map a key name as reported by a host toolkit (`" "`, `"Space"`,
    /// `"Escape"`, single characters).
    pub fn from_name(name: &str) -> Self {
        match name {
            " " | "Space" | "space" | "Spacebar" => Key::Space,
            "Escape" | "Esc" | "escape" => Key::Escape,
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Key::Char(c),
                    _ => Key::Other,
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    TogglePlayback,
    /// Leave the current input field.
    ExitFocus,
}

/// Result of resolving a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyResponse {
    pub action: KeyAction,
    /// The host must suppress the key's default effect (e.g. page scroll).
    pub prevent_default: bool,
}

/// Key to action table.
#[derive(Debug, Clone)]
pub struct KeyBindings {
    bindings: Vec<(Key, KeyAction)>,
}

impl KeyBindings {
    pub fn new(bindings: Vec<(Key, KeyAction)>) -> Self {
        Self { bindings }
    }

    /// Resolve a key press. Bound keys always suppress the default effect.
    pub fn resolve(&self, key: Key) -> Option<KeyResponse> {
        self.bindings
            .iter()
            .find(|(bound, _)| *bound == key)
            .map(|(_, action)| KeyResponse {
                action: *action,
                prevent_default: true,
            })
    }

    /// Replace or add a binding.
    pub fn bind(&mut self, key: Key, action: KeyAction) {
        self.bindings.retain(|(bound, _)| *bound != key);
        self.bindings.push((key, action));
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::new(vec![
            (Key::Space, KeyAction::TogglePlayback),
            (Key::Escape, KeyAction::ExitFocus),
        ])
    }
}
