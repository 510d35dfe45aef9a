use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of actions that are buttons. Every action with a smaller index is a button,
/// everything from here on is an axis.
pub const NUM_ACTION_BUTTONS: usize = 18;

/// A single control of the controller: buttons first, then axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
#[repr(u8)]
pub enum Action {
    A = 0,
    B,
    X,
    Y,
    L,
    R,
    ZL,
    ZR,
    Minus,
    Plus,
    LeftStickPress,
    RightStickPress,
    Home,
    Capture,
    DPadUp,
    DPadDown,
    DPadLeft,
    DPadRight,
    // Axes
    LeftStickX,
    LeftStickY,
    RightStickX,
    RightStickY,
}

impl Action {
    pub const ALL: [Action; 22] = [
        Action::A,
        Action::B,
        Action::X,
        Action::Y,
        Action::L,
        Action::R,
        Action::ZL,
        Action::ZR,
        Action::Minus,
        Action::Plus,
        Action::LeftStickPress,
        Action::RightStickPress,
        Action::Home,
        Action::Capture,
        Action::DPadUp,
        Action::DPadDown,
        Action::DPadLeft,
        Action::DPadRight,
        Action::LeftStickX,
        Action::LeftStickY,
        Action::RightStickX,
        Action::RightStickY,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Action> {
        Self::ALL.get(index).copied()
    }

    /// Whether this action is one of the first `NUM_ACTION_BUTTONS` actions
    pub fn is_button(self) -> bool {
        self.index() < NUM_ACTION_BUTTONS
    }

    pub fn buttons() -> impl Iterator<Item = Action> {
        Self::ALL.into_iter().take(NUM_ACTION_BUTTONS)
    }

    pub fn name(self) -> &'static str {
        match self {
            Action::A => "A",
            Action::B => "B",
            Action::X => "X",
            Action::Y => "Y",
            Action::L => "L",
            Action::R => "R",
            Action::ZL => "ZL",
            Action::ZR => "ZR",
            Action::Minus => "Minus",
            Action::Plus => "Plus",
            Action::LeftStickPress => "LeftStickPress",
            Action::RightStickPress => "RightStickPress",
            Action::Home => "Home",
            Action::Capture => "Capture",
            Action::DPadUp => "DPadUp",
            Action::DPadDown => "DPadDown",
            Action::DPadLeft => "DPadLeft",
            Action::DPadRight => "DPadRight",
            Action::LeftStickX => "LeftStickX",
            Action::LeftStickY => "LeftStickY",
            Action::RightStickX => "RightStickX",
            Action::RightStickY => "RightStickY",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseEventError {
    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Invalid event value: {0}")]
    InvalidValue(String),

    #[error("Malformed event line: {0:?}")]
    Malformed(String),
}

impl FromStr for Action {
    type Err = ParseEventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Action::ALL
            .iter()
            .copied()
            .find(|action| action.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseEventError::UnknownAction(s.to_string()))
    }
}

impl TryFrom<String> for Action {
    type Error = ParseEventError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Action> for String {
    fn from(action: Action) -> Self {
        action.name().to_string()
    }
}

/// One input occurrence. Buttons use 0 for released and 1 for pressed, axis values
/// are passed through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Event {
    pub action: Action,
    pub value: i32,
}

impl Event {
    pub fn new(action: Action, value: i32) -> Self {
        Self { action, value }
    }

    pub fn pressed(action: Action) -> Self {
        Self::new(action, 1)
    }

    pub fn released(action: Action) -> Self {
        Self::new(action, 0)
    }

    pub fn is_pressed(&self) -> bool {
        self.value == 1
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.action, self.value)
    }
}

// Line format: "<action> <value>", e.g. "ZR 1" or "LeftStickX -120"
impl FromStr for Event {
    type Err = ParseEventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let (Some(action), Some(value), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(ParseEventError::Malformed(s.to_string()));
        };

        let action = action.parse()?;
        let value = value
            .parse()
            .map_err(|_| ParseEventError::InvalidValue(value.to_string()))?;
        Ok(Event::new(action, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buttons_come_before_axes() {
        assert!(Action::A.is_button());
        assert!(Action::DPadRight.is_button());
        assert_eq!(Action::DPadRight.index(), NUM_ACTION_BUTTONS - 1);
        assert!(!Action::LeftStickX.is_button());
        assert_eq!(Action::buttons().count(), NUM_ACTION_BUTTONS);
    }

    #[test]
    fn index_matches_declaration_order() {
        for (i, action) in Action::ALL.iter().enumerate() {
            assert_eq!(action.index(), i);
            assert_eq!(Action::from_index(i), Some(*action));
        }
        assert_eq!(Action::from_index(Action::ALL.len()), None);
    }

    #[test]
    fn action_names_parse_case_insensitively() {
        assert_eq!("zr".parse::<Action>(), Ok(Action::ZR));
        assert_eq!(" DPadUp ".parse::<Action>(), Ok(Action::DPadUp));
        assert_eq!(
            "Turbo".parse::<Action>(),
            Err(ParseEventError::UnknownAction("Turbo".to_string()))
        );
    }

    #[test]
    fn parse_event_lines() {
        assert_eq!("A 1".parse::<Event>(), Ok(Event::pressed(Action::A)));
        assert_eq!(
            "leftstickx -120".parse::<Event>(),
            Ok(Event::new(Action::LeftStickX, -120))
        );
        assert!(matches!(
            "A".parse::<Event>(),
            Err(ParseEventError::Malformed(_))
        ));
        assert!(matches!(
            "A 1 2".parse::<Event>(),
            Err(ParseEventError::Malformed(_))
        ));
        assert!(matches!(
            "A on".parse::<Event>(),
            Err(ParseEventError::InvalidValue(_))
        ));
    }

    #[test]
    fn only_value_one_counts_as_pressed() {
        assert!(Event::pressed(Action::B).is_pressed());
        assert!(!Event::released(Action::B).is_pressed());
        assert!(!Event::new(Action::B, 2).is_pressed());
    }
}
