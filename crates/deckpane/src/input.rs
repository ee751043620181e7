//! Keyboard input as seen by the preview, independent of any toolkit.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Char(char),
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub meta: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyInput {
    pub key: Key,
    pub modifiers: Modifiers,
    /// Focus is inside the editor or another text field.
    pub in_text_input: bool,
}

impl KeyInput {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::default(),
            in_text_input: false,
        }
    }

    pub fn with_ctrl(mut self) -> Self {
        self.modifiers.ctrl = true;
        self
    }

    pub fn with_meta(mut self) -> Self {
        self.modifiers.meta = true;
        self
    }

    pub fn in_editor(mut self) -> Self {
        self.in_text_input = true;
        self
    }

    /// Ctrl+S or Cmd+S, in either case.
    pub fn is_save_shortcut(&self) -> bool {
        (self.modifiers.ctrl || self.modifiers.meta)
            && matches!(self.key, Key::Char(c) if c.eq_ignore_ascii_case(&'s'))
    }

    /// Slide step for navigation keys.
    pub fn slide_delta(&self) -> Option<isize> {
        match self.key {
            Key::ArrowLeft | Key::ArrowUp => Some(-1),
            Key::ArrowRight | Key::ArrowDown => Some(1),
            Key::Char(_) | Key::Other => None,
        }
    }
}
