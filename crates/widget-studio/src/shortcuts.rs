//! Editor keyboard shortcuts

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A key press with modifiers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyChord {
    /// Lowercased key, e.g. `z`
    pub key: String,
    pub ctrl: bool,
    /// Cmd on macOS
    pub meta: bool,
    pub shift: bool,
    pub alt: bool,
}

impl KeyChord {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into().to_lowercase(),
            ..Self::default()
        }
    }

    pub fn ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn meta(mut self) -> Self {
        self.meta = true;
        self
    }

    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }

    fn primary(&self) -> bool {
        (self.ctrl || self.meta) && !self.alt
    }
}

impl FromStr for KeyChord {
    type Err = String;

    /// Parse chords such as `Ctrl+Z`, `cmd+shift+z` or `Ctrl-Y`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chord = KeyChord::default();
        let parts: Vec<&str> = s
            .split(['+', '-'])
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();
        let (key, modifiers) = parts
            .split_last()
            .ok_or_else(|| format!("empty key chord: '{}'", s))?;

        for modifier in modifiers {
            match modifier.to_lowercase().as_str() {
                "ctrl" | "control" => chord.ctrl = true,
                "cmd" | "meta" | "super" => chord.meta = true,
                "shift" => chord.shift = true,
                "alt" | "option" => chord.alt = true,
                other => return Err(format!("unknown modifier '{}'", other)),
            }
        }
        chord.key = key.to_lowercase();
        Ok(chord)
    }
}

/// Editor action bound to a shortcut
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditorCommand {
    Undo,
    Redo,
}

/// Resolve a chord: Ctrl/Cmd+Z undoes, Ctrl/Cmd+Y and Ctrl/Cmd+Shift+Z redo
pub fn command_for(chord: &KeyChord) -> Option<EditorCommand> {
    if !chord.primary() {
        return None;
    }
    match (chord.key.as_str(), chord.shift) {
        ("z", false) => Some(EditorCommand::Undo),
        ("z", true) | ("y", false) => Some(EditorCommand::Redo),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undo_redo_bindings() {
        assert_eq!(command_for(&KeyChord::new("z").ctrl()), Some(EditorCommand::Undo));
        assert_eq!(command_for(&KeyChord::new("Z").meta()), Some(EditorCommand::Undo));
        assert_eq!(command_for(&KeyChord::new("y").ctrl()), Some(EditorCommand::Redo));
        assert_eq!(
            command_for(&KeyChord::new("z").meta().shift()),
            Some(EditorCommand::Redo)
        );
    }

    #[test]
    fn test_unbound_chords() {
        assert_eq!(command_for(&KeyChord::new("z")), None);
        assert_eq!(command_for(&KeyChord::new("s").ctrl()), None);
        assert_eq!(command_for(&KeyChord::new("y").ctrl().shift()), None);
    }

    #[test]
    fn test_parse() {
        let chord: KeyChord = "Ctrl+Shift+Z".parse().unwrap();
        assert!(chord.ctrl && chord.shift);
        assert_eq!(chord.key, "z");
        assert_eq!(command_for(&chord), Some(EditorCommand::Redo));

        let chord: KeyChord = "cmd-y".parse().unwrap();
        assert!(chord.meta);
        assert_eq!(command_for(&chord), Some(EditorCommand::Redo));

        assert!("Hyper+Z".parse::<KeyChord>().is_err());
        assert!("".parse::<KeyChord>().is_err());
    }
}
