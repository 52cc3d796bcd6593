use std::collections::HashSet;

use crate::dom::{Dom, NodeId};
use crate::event::{Interaction, Key, LogEntry, PlatformEvent};
use crate::rules::{Profile, RuleSet};
use crate::selector;

/// Append-only destination for normalized entries. Injected into the
/// recorder at construction so tests can substitute a fake; the recorder
/// never reads or clears it.
pub trait LogSink {
    fn append(&mut self, entry: &LogEntry);
}

/// Newline-delimited in-memory sink, the stand-in for the page's log
/// element.
#[derive(Debug, Default)]
pub struct MemorySink {
    buffer: String,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> &str {
        &self.buffer
    }

    pub fn lines(&self) -> Vec<&str> {
        self.buffer.lines().collect()
    }
}

impl LogSink for MemorySink {
    fn append(&mut self, entry: &LogEntry) {
        self.buffer.push_str(&entry.to_string());
        self.buffer.push('\n');
    }
}

/// What a delivery did: whether an entry was appended and whether the
/// event's default action must be suppressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub default_prevented: bool,
    pub logged: bool,
}

impl Outcome {
    pub(crate) const IGNORED: Self = Self {
        default_prevented: false,
        logged: false,
    };
}

#[derive(Debug, Clone, Copy)]
struct Binding {
    node: NodeId,
    profile: Profile,
}

/// The attached rule set instance for one page. Built by a single scan at
/// initialization; elements added to the DOM afterwards are not observed.
pub struct Recorder<S> {
    bindings: Vec<Binding>,
    sink: S,
    trace: Vec<String>,
}

impl<S: LogSink> Recorder<S> {
    /// Scan the document once and bind profiles per the rule set. A rule
    /// whose selector matches nothing (or fails to parse) is skipped with a
    /// diagnostic; attachment never fails because one element is absent.
    pub fn attach(dom: &Dom, rules: &RuleSet, sink: S) -> Self {
        let mut bindings = Vec::new();
        let mut bound: HashSet<NodeId> = HashSet::new();
        let mut trace = Vec::new();

        for rule in rules.rules() {
            let matched = match selector::query_all(dom, rule.selector()) {
                Ok(matched) => matched,
                Err(error) => {
                    trace.push(format!(
                        "[attach] rule {:?} skipped: {error}",
                        rule.profile()
                    ));
                    continue;
                }
            };
            if matched.is_empty() {
                trace.push(format!(
                    "[attach] rule {:?} skipped: no match for {}",
                    rule.profile(),
                    rule.selector()
                ));
                continue;
            }
            for node in matched {
                if bound.contains(&node) {
                    continue;
                }
                if rule.profile() == Profile::ClickCatchAll {
                    if let Some(id) = dom.id(node) {
                        if rules.is_excluded(id) {
                            continue;
                        }
                    }
                }
                bound.insert(node);
                bindings.push(Binding {
                    node,
                    profile: rule.profile(),
                });
            }
        }

        Self {
            bindings,
            sink,
            trace,
        }
    }

    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Drain attach-time diagnostics.
    pub fn take_trace_logs(&mut self) -> Vec<String> {
        std::mem::take(&mut self.trace)
    }

    /// Deliver one platform event to one node. Appends at most one entry,
    /// synchronously, before returning. Events on unbound nodes and
    /// unrecognized event subtypes are no-ops.
    pub fn deliver(&mut self, dom: &Dom, node: NodeId, event: &PlatformEvent) -> Outcome {
        let Some(profile) = self
            .bindings
            .iter()
            .find(|binding| binding.node == node)
            .map(|binding| binding.profile)
        else {
            return Outcome::IGNORED;
        };

        let (interaction, default_prevented) = classify(dom, node, profile, event);
        let logged = interaction.is_some();
        if let Some(interaction) = interaction {
            self.sink.append(&interaction.to_entry());
        }
        Outcome {
            default_prevented,
            logged,
        }
    }
}

/// Map a raw event on a profiled element into at most one interaction, and
/// decide default suppression. Pure with respect to the sink.
fn classify(
    dom: &Dom,
    node: NodeId,
    profile: Profile,
    event: &PlatformEvent,
) -> (Option<Interaction>, bool) {
    let target = |dom: &Dom| element_id(dom, node);
    match (profile, event) {
        (Profile::TextField, PlatformEvent::Input) => (
            Some(Interaction::Fill {
                target: target(dom),
                value: dom.value(node),
            }),
            false,
        ),
        (Profile::TextField, PlatformEvent::Change) => (
            Some(Interaction::Commit {
                target: target(dom),
                value: dom.value(node),
            }),
            false,
        ),
        (Profile::Checkbox, PlatformEvent::Change) => {
            let interaction = if dom.checked(node) {
                Interaction::Check { target: target(dom) }
            } else {
                Interaction::Uncheck { target: target(dom) }
            };
            (Some(interaction), false)
        }
        (Profile::Radio, PlatformEvent::Change) => (
            Some(Interaction::RadioSelect {
                group: dom
                    .attr(node, "name")
                    .map(str::to_string)
                    .unwrap_or_else(|| target(dom)),
                value: dom.value(node),
            }),
            false,
        ),
        (Profile::Select, PlatformEvent::Change) => (
            Some(Interaction::OptionsSelect {
                target: target(dom),
                values: dom.selected_option_values(node),
            }),
            false,
        ),
        (Profile::FileInput, PlatformEvent::Change) => (
            Some(Interaction::Upload {
                target: target(dom),
                files: dom.files(node).to_vec(),
            }),
            false,
        ),
        (Profile::Button, PlatformEvent::Click { offset }) => (
            Some(Interaction::ButtonClick {
                target: target(dom),
                offset: *offset,
            }),
            false,
        ),
        (Profile::Button, PlatformEvent::ContextMenu) => (
            Some(Interaction::ContextMenu { target: target(dom) }),
            true,
        ),
        (Profile::Button, PlatformEvent::DblClick) => {
            (Some(Interaction::DblClick { target: target(dom) }), false)
        }
        (Profile::Hoverable, PlatformEvent::MouseEnter) => {
            (Some(Interaction::Hover { target: target(dom) }), false)
        }
        (Profile::DragSource, PlatformEvent::DragStart) => {
            (Some(Interaction::DragStart { target: target(dom) }), false)
        }
        (Profile::DropTarget, PlatformEvent::Drop) => {
            (Some(Interaction::Drop { target: target(dom) }), true)
        }
        // Suppressed without an entry, only to permit the drop.
        (Profile::DropTarget, PlatformEvent::DragOver) => (None, true),
        (Profile::Keystrokes, PlatformEvent::Input) => (
            Some(Interaction::TypeText {
                value: dom.value(node),
            }),
            false,
        ),
        (
            Profile::Chords,
            PlatformEvent::KeyDown {
                key: Key::Char(letter),
                modifiers,
            },
        ) if (modifiers.ctrl || modifiers.meta)
            && matches!(letter.to_ascii_lowercase(), 'a' | 'c' | 'v') =>
        {
            (Some(Interaction::Chord { letter: *letter }), false)
        }
        (Profile::SpecialKeys, PlatformEvent::KeyDown { key, .. }) => match key.special_name() {
            Some(name) => (Some(Interaction::SpecialKey { name }), true),
            None => (None, false),
        },
        (Profile::ClickCatchAll, PlatformEvent::Click { .. }) => {
            (Some(Interaction::GenericClick { target: target(dom) }), true)
        }
        _ => (None, false),
    }
}

fn element_id(dom: &Dom, node: NodeId) -> String {
    dom.id(node).unwrap_or_default().to_string()
}
