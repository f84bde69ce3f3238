//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s. Nothing fires
//! while focus is in a text field.

use crate::input::{Modifiers, is_space};

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    ZoomIn,
    ZoomOut,
    ZoomReset,
    /// Hold to arm canvas panning.
    ArmPan,
}

/// Resolves key events into shortcut actions.
///
/// Uses platform-aware modifier detection: on macOS `meta` is ⌘,
/// on other platforms `ctrl` serves the same role.
pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action.
    ///
    /// `key` is the `KeyboardEvent.key` value (e.g. `"="`, `" "`).
    /// Returns `None` if the key combo has no binding.
    pub fn resolve(key: &str, modifiers: Modifiers, typing: bool) -> Option<ShortcutAction> {
        if typing {
            return None;
        }

        if modifiers.cmd() {
            return match key {
                "=" | "+" => Some(ShortcutAction::ZoomIn),
                "-" => Some(ShortcutAction::ZoomOut),
                "0" => Some(ShortcutAction::ZoomReset),
                _ => None,
            };
        }

        if is_space(key) {
            return Some(ShortcutAction::ArmPan);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_zoom() {
        assert_eq!(
            ShortcutMap::resolve("=", Modifiers::CTRL, false),
            Some(ShortcutAction::ZoomIn)
        );
        assert_eq!(
            ShortcutMap::resolve("+", Modifiers::META, false),
            Some(ShortcutAction::ZoomIn)
        );
        assert_eq!(
            ShortcutMap::resolve("-", Modifiers::CTRL, false),
            Some(ShortcutAction::ZoomOut)
        );
        assert_eq!(
            ShortcutMap::resolve("0", Modifiers::META, false),
            Some(ShortcutAction::ZoomReset)
        );
    }

    #[test]
    fn resolve_requires_cmd_for_zoom() {
        assert_eq!(ShortcutMap::resolve("=", Modifiers::NONE, false), None);
        assert_eq!(ShortcutMap::resolve("0", Modifiers::SHIFT, false), None);
    }

    #[test]
    fn resolve_space_arms_pan() {
        assert_eq!(
            ShortcutMap::resolve(" ", Modifiers::NONE, false),
            Some(ShortcutAction::ArmPan)
        );
        assert_eq!(
            ShortcutMap::resolve("Spacebar", Modifiers::NONE, false),
            Some(ShortcutAction::ArmPan)
        );
    }

    #[test]
    fn resolve_ignores_typing() {
        assert_eq!(ShortcutMap::resolve("=", Modifiers::CTRL, true), None);
        assert_eq!(ShortcutMap::resolve(" ", Modifiers::NONE, true), None);
    }

    #[test]
    fn resolve_unknown_key() {
        assert_eq!(ShortcutMap::resolve("q", Modifiers::CTRL, false), None);
        assert_eq!(ShortcutMap::resolve("Escape", Modifiers::NONE, false), None);
    }
}
