use dioxus::prelude::{Key, Modifiers};
use exam_core::model::OptionLetter;

/// Shortcut recognised on the exam page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyCommand {
    /// `1`–`4`: option by position on the hovered (or first) question.
    SelectOption(OptionLetter),
    PreviousSection,
    NextSection,
    ToggleAnswers,
    ToggleNavigation,
}

impl KeyCommand {
    /// Letter shortcuts are ignored while Ctrl or Meta is held.
    #[must_use]
    pub fn from_key(key: &Key, modifiers: Modifiers) -> Option<Self> {
        match key {
            Key::ArrowUp => Some(Self::PreviousSection),
            Key::ArrowDown => Some(Self::NextSection),
            Key::Character(value) => Self::from_character(value, modifiers),
            _ => None,
        }
    }

    fn from_character(value: &str, modifiers: Modifiers) -> Option<Self> {
        let letter_blocked = modifiers.intersects(Modifiers::CONTROL | Modifiers::META);
        match value {
            "1" => Some(Self::SelectOption(OptionLetter::A)),
            "2" => Some(Self::SelectOption(OptionLetter::B)),
            "3" => Some(Self::SelectOption(OptionLetter::C)),
            "4" => Some(Self::SelectOption(OptionLetter::D)),
            "a" | "A" if !letter_blocked => Some(Self::ToggleAnswers),
            "n" | "N" if !letter_blocked => Some(Self::ToggleNavigation),
            _ => None,
        }
    }
}
