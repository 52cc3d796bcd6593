use std::fmt;

use crate::dom::MockFile;

/// Raw event surface delivered by the (simulated) platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformEvent {
    Input,
    Change,
    KeyDown { key: Key, modifiers: Modifiers },
    Click { offset: Option<(i32, i32)> },
    ContextMenu,
    DblClick,
    MouseEnter,
    DragStart,
    DragOver,
    Drop,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
    Tab,
    Escape,
    ArrowDown,
    Other(String),
}

impl Key {
    /// Name of a tracked standalone key, `None` for everything else.
    pub(crate) fn special_name(&self) -> Option<&'static str> {
        match self {
            Self::Enter => Some("Enter"),
            Self::Tab => Some("Tab"),
            Self::Escape => Some("Escape"),
            Self::ArrowDown => Some("ArrowDown"),
            Self::Char(_) | Self::Other(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        ctrl: false,
        meta: false,
        shift: false,
        alt: false,
    };

    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Self::NONE
        }
    }

    pub fn meta() -> Self {
        Self {
            meta: true,
            ..Self::NONE
        }
    }
}

/// Closed enumeration of recognized interaction kinds. Classification maps
/// a raw [`PlatformEvent`] on a profiled element into at most one variant;
/// [`Interaction::to_entry`] then renders it as a log entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interaction {
    Fill { target: String, value: String },
    Commit { target: String, value: String },
    Check { target: String },
    Uncheck { target: String },
    RadioSelect { group: String, value: String },
    OptionsSelect { target: String, values: Vec<String> },
    Upload { target: String, files: Vec<MockFile> },
    ButtonClick { target: String, offset: Option<(i32, i32)> },
    ContextMenu { target: String },
    DblClick { target: String },
    Hover { target: String },
    DragStart { target: String },
    Drop { target: String },
    TypeText { value: String },
    Chord { letter: char },
    SpecialKey { name: &'static str },
    GenericClick { target: String },
}

impl Interaction {
    /// Pure formatting step. Calling it twice on the same interaction always
    /// yields identical text.
    pub fn to_entry(&self) -> LogEntry {
        match self {
            Self::Fill { target, value } => {
                LogEntry::new("fill", Some(target.clone()), Some(value.clone()))
            }
            Self::Commit { target, value } => {
                LogEntry::new("change", Some(target.clone()), Some(value.clone()))
            }
            Self::Check { target } => LogEntry::new("check", Some(target.clone()), None),
            Self::Uncheck { target } => LogEntry::new("uncheck", Some(target.clone()), None),
            Self::RadioSelect { group, value } => {
                LogEntry::new("select", Some(group.clone()), Some(value.clone()))
            }
            Self::OptionsSelect { target, values } => {
                LogEntry::new("select", Some(target.clone()), Some(values.join(",")))
            }
            Self::Upload { target, files } => {
                let joined = files
                    .iter()
                    .map(|file| format!("{}:{}", file.name, file.size))
                    .collect::<Vec<_>>()
                    .join(",");
                LogEntry::new("upload", Some(target.clone()), Some(joined))
            }
            Self::ButtonClick { target, offset } => LogEntry::new(
                "click",
                Some(target.clone()),
                offset.map(|(x, y)| format!("x={x},y={y}")),
            ),
            Self::ContextMenu { target } => {
                LogEntry::new("contextmenu", Some(target.clone()), None)
            }
            Self::DblClick { target } => LogEntry::new("dblclick", Some(target.clone()), None),
            Self::Hover { target } => LogEntry::new("hover", Some(target.clone()), None),
            Self::DragStart { target } => LogEntry::new("dragstart", Some(target.clone()), None),
            Self::Drop { target } => LogEntry::new("drop", Some(target.clone()), None),
            Self::TypeText { value } => LogEntry::new("type", None, Some(value.clone())),
            Self::Chord { letter } => LogEntry::new(
                "keydown",
                None,
                Some(format!("Ctrl+{}", letter.to_ascii_uppercase())),
            ),
            Self::SpecialKey { name } => LogEntry::new("keydown", None, Some((*name).to_string())),
            Self::GenericClick { target } => LogEntry::new("click", Some(target.clone()), None),
        }
    }
}

/// One normalized trace line: `<action> <target> [<value>]`. Empty or absent
/// parts are omitted together with their leading space, so the rendered line
/// never carries trailing whitespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub action: &'static str,
    pub target: Option<String>,
    pub value: Option<String>,
}

impl LogEntry {
    pub fn new(action: &'static str, target: Option<String>, value: Option<String>) -> Self {
        Self {
            action,
            target,
            value,
        }
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.action)?;
        for part in [&self.target, &self.value] {
            if let Some(part) = part {
                if !part.is_empty() {
                    write!(f, " {part}")?;
                }
            }
        }
        Ok(())
    }
}
