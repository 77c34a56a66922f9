//! Raw input to game actions

/// Something the player (or the page) asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    /// Space: pause, resume or start depending on the round phase
    PauseOrStart,
    /// "r": restart from anywhere
    Restart,
    /// Escape: pause only
    Pause,
    /// Resume button
    Resume,
    /// Start button / play again
    Start,
    /// Page hidden (tab switch, minimize)
    Hidden,
    /// Click on the target with this ID
    ClickTarget(u32),
    /// Click on empty arena space
    ClickArena,
}

impl InputAction {
    /// Map a `KeyboardEvent.key` value to an action
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            " " | "Spacebar" => Some(InputAction::PauseOrStart),
            "Escape" => Some(InputAction::Pause),
            k if k.eq_ignore_ascii_case("r") => Some(InputAction::Restart),
            _ => None,
        }
    }
}
