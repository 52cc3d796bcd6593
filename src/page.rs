use unicode_normalization::UnicodeNormalization;

use crate::dom::{Dom, MockFile, NodeId};
use crate::event::{Key, Modifiers, PlatformEvent};
use crate::html::parse_html;
use crate::recorder::{LogSink, MemorySink, Outcome, Recorder};
use crate::rules::RuleSet;
use crate::selector;
use crate::{Error, Result};

/// One loaded page: the parsed document, the attached recorder, and a small
/// focus model. The harness methods simulate the platform: they mutate DOM
/// state and deliver events in platform order, honoring default suppression
/// decided by the recorder.
pub struct Page<S = MemorySink> {
    dom: Dom,
    recorder: Recorder<S>,
    focused: Option<NodeId>,
    focus_value: String,
}

impl Page<MemorySink> {
    /// Parse the document and attach the rule set, recording into the
    /// built-in memory sink. Attachment runs exactly once, after the
    /// document is fully parsed.
    pub fn from_html(html: &str, rules: &RuleSet) -> Result<Self> {
        Self::from_html_with_sink(html, rules, MemorySink::new())
    }

    pub fn action_log(&self) -> &str {
        self.recorder.sink().contents()
    }

    pub fn assert_log(&self, expected: &str) -> Result<()> {
        let actual = self.action_log();
        if actual == expected {
            Ok(())
        } else {
            Err(Error::AssertionFailed {
                expected: expected.to_string(),
                actual: actual.to_string(),
            })
        }
    }

    pub fn assert_log_lines(&self, expected: &[&str]) -> Result<()> {
        let actual = self.recorder.sink().lines();
        if actual == expected {
            Ok(())
        } else {
            Err(Error::AssertionFailed {
                expected: expected.join("\n"),
                actual: actual.join("\n"),
            })
        }
    }
}

impl<S: LogSink> Page<S> {
    /// Like [`Page::from_html`] but with an injected sink, so tests can
    /// observe appends through a fake.
    pub fn from_html_with_sink(html: &str, rules: &RuleSet, sink: S) -> Result<Self> {
        let dom = parse_html(html)?;
        let recorder = Recorder::attach(&dom, rules, sink);
        Ok(Self {
            dom,
            recorder,
            focused: None,
            focus_value: String::new(),
        })
    }

    pub fn sink(&self) -> &S {
        self.recorder.sink()
    }

    /// Drain attach-time diagnostics (skipped rules).
    pub fn take_trace_logs(&mut self) -> Vec<String> {
        self.recorder.take_trace_logs()
    }

    /// Deliver a raw event to the element, bypassing the action helpers.
    pub fn dispatch(&mut self, selector: &str, event: &PlatformEvent) -> Result<Outcome> {
        let node = self.select_one(selector)?;
        Ok(self.recorder.deliver(&self.dom, node, event))
    }

    /// Type text into a field, one key at a time: keydown, then (unless the
    /// key was suppressed) the value mutation, then the input event. Typed
    /// text is NFC-composed before it lands in the field, matching what a
    /// real text control would hold.
    pub fn type_text(&mut self, selector: &str, text: &str) -> Result<()> {
        let node = self.select_one(selector)?;
        self.require_text_entry(selector, node)?;
        self.focus_node(node);
        for ch in text.nfc() {
            let outcome = self.recorder.deliver(
                &self.dom,
                node,
                &PlatformEvent::KeyDown {
                    key: Key::Char(ch),
                    modifiers: Modifiers::NONE,
                },
            );
            if outcome.default_prevented {
                continue;
            }
            let mut value = self.dom.value(node);
            value.push(ch);
            self.dom.set_value(node, &value)?;
            self.recorder.deliver(&self.dom, node, &PlatformEvent::Input);
        }
        Ok(())
    }

    /// Press a single key. A Tab whose default was not suppressed moves
    /// focus away, committing a dirty text field; a suppressed Tab moves
    /// nothing and commits nothing.
    pub fn press_key(&mut self, selector: &str, key: Key, modifiers: Modifiers) -> Result<Outcome> {
        let node = self.select_one(selector)?;
        self.focus_node(node);
        let outcome = self
            .recorder
            .deliver(&self.dom, node, &PlatformEvent::KeyDown { key: key.clone(), modifiers });
        if !outcome.default_prevented && key == Key::Tab {
            self.commit_blur();
        }
        Ok(outcome)
    }

    pub fn set_checked(&mut self, selector: &str, checked: bool) -> Result<()> {
        let node = self.select_one(selector)?;
        if self.input_type_of(node).as_deref() != Some("checkbox") {
            return Err(self.type_mismatch(selector, "input[type=checkbox]", node));
        }
        if self.dom.checked(node) == checked {
            return Ok(());
        }
        self.dom.set_checked(node, checked)?;
        self.recorder.deliver(&self.dom, node, &PlatformEvent::Change);
        Ok(())
    }

    pub fn check(&mut self, selector: &str) -> Result<()> {
        self.set_checked(selector, true)
    }

    pub fn uncheck(&mut self, selector: &str) -> Result<()> {
        self.set_checked(selector, false)
    }

    /// Select a radio button, unchecking the rest of its name group.
    /// Re-selecting an already-checked radio fires nothing.
    pub fn select_radio(&mut self, selector: &str) -> Result<()> {
        let node = self.select_one(selector)?;
        if self.input_type_of(node).as_deref() != Some("radio") {
            return Err(self.type_mismatch(selector, "input[type=radio]", node));
        }
        if self.dom.checked(node) {
            return Ok(());
        }
        for sibling in self.dom.radio_group(node) {
            self.dom.set_checked(sibling, sibling == node)?;
        }
        self.recorder.deliver(&self.dom, node, &PlatformEvent::Change);
        Ok(())
    }

    /// Single-select semantics: the matching option becomes the only
    /// selected one. No change event when the selection is already current.
    pub fn select_option(&mut self, selector: &str, value: &str) -> Result<()> {
        self.apply_selection(selector, &[value])
    }

    /// Multi-select semantics: exactly the listed values end up selected.
    pub fn set_selected_options(&mut self, selector: &str, values: &[&str]) -> Result<()> {
        self.apply_selection(selector, values)
    }

    fn apply_selection(&mut self, selector: &str, values: &[&str]) -> Result<()> {
        let node = self.select_one(selector)?;
        if self.dom.tag_name(node) != Some("select") {
            return Err(self.type_mismatch(selector, "select", node));
        }
        let options = self.dom.options_of(node);
        for value in values {
            if !options
                .iter()
                .any(|option| self.dom.option_value(*option) == *value)
            {
                return Err(Error::SelectorNotFound(format!(
                    "{selector} option '{value}'"
                )));
            }
        }
        let before = self.dom.selected_option_values(node);
        for option in options {
            let option_value = self.dom.option_value(option);
            let selected = values.iter().any(|value| *value == option_value);
            self.dom.set_option_selected(option, selected)?;
        }
        if self.dom.selected_option_values(node) != before {
            self.recorder.deliver(&self.dom, node, &PlatformEvent::Change);
        }
        Ok(())
    }

    /// Hand files to a file input. The change event fires only when the
    /// list actually changed, matching the platform.
    pub fn set_files(&mut self, selector: &str, files: &[MockFile]) -> Result<()> {
        let node = self.select_one(selector)?;
        if self.input_type_of(node).as_deref() != Some("file") {
            return Err(self.type_mismatch(selector, "input[type=file]", node));
        }
        if self.dom.set_files(node, files)? {
            self.recorder.deliver(&self.dom, node, &PlatformEvent::Change);
        }
        Ok(())
    }

    pub fn click(&mut self, selector: &str) -> Result<()> {
        self.click_impl(selector, None)
    }

    /// Primary click with a pointer offset inside the element's bounds.
    pub fn click_at(&mut self, selector: &str, x: i32, y: i32) -> Result<()> {
        self.click_impl(selector, Some((x, y)))
    }

    fn click_impl(&mut self, selector: &str, offset: Option<(i32, i32)>) -> Result<()> {
        let node = self.select_one(selector)?;
        self.focus_node(node);
        self.recorder
            .deliver(&self.dom, node, &PlatformEvent::Click { offset });
        Ok(())
    }

    pub fn context_menu(&mut self, selector: &str) -> Result<()> {
        let node = self.select_one(selector)?;
        self.recorder
            .deliver(&self.dom, node, &PlatformEvent::ContextMenu);
        Ok(())
    }

    pub fn dbl_click(&mut self, selector: &str) -> Result<()> {
        let node = self.select_one(selector)?;
        self.recorder
            .deliver(&self.dom, node, &PlatformEvent::DblClick);
        Ok(())
    }

    pub fn hover(&mut self, selector: &str) -> Result<()> {
        let node = self.select_one(selector)?;
        self.recorder
            .deliver(&self.dom, node, &PlatformEvent::MouseEnter);
        Ok(())
    }

    /// Drag from source to target. The drop only lands when the target
    /// suppressed the drag-over default, exactly as on the platform.
    pub fn drag_and_drop(&mut self, source_selector: &str, target_selector: &str) -> Result<()> {
        let source = self.select_one(source_selector)?;
        let target = self.select_one(target_selector)?;
        self.recorder
            .deliver(&self.dom, source, &PlatformEvent::DragStart);
        let over = self
            .recorder
            .deliver(&self.dom, target, &PlatformEvent::DragOver);
        if over.default_prevented {
            self.recorder.deliver(&self.dom, target, &PlatformEvent::Drop);
        }
        Ok(())
    }

    pub fn focus(&mut self, selector: &str) -> Result<()> {
        let node = self.select_one(selector)?;
        self.focus_node(node);
        Ok(())
    }

    /// Blur the element. A text field whose value changed since focus
    /// commits with a change event.
    pub fn blur(&mut self, selector: &str) -> Result<()> {
        let node = self.select_one(selector)?;
        if self.focused == Some(node) {
            self.commit_blur();
        }
        Ok(())
    }

    pub fn assert_value(&self, selector: &str, expected: &str) -> Result<()> {
        let node = self.select_one(selector)?;
        let actual = self.dom.value(node);
        if actual == expected {
            Ok(())
        } else {
            Err(Error::AssertionFailed {
                expected: expected.to_string(),
                actual,
            })
        }
    }

    pub fn assert_checked(&self, selector: &str, expected: bool) -> Result<()> {
        let node = self.select_one(selector)?;
        let actual = self.dom.checked(node);
        if actual == expected {
            Ok(())
        } else {
            Err(Error::AssertionFailed {
                expected: expected.to_string(),
                actual: actual.to_string(),
            })
        }
    }

    fn select_one(&self, selector: &str) -> Result<NodeId> {
        selector::query_first(&self.dom, selector)?
            .ok_or_else(|| Error::SelectorNotFound(selector.to_string()))
    }

    fn input_type_of(&self, node: NodeId) -> Option<String> {
        self.dom.element(node).and_then(|element| element.input_type())
    }

    fn type_mismatch(&self, selector: &str, expected: &str, node: NodeId) -> Error {
        let actual = match self.dom.element(node) {
            Some(element) => match element.input_type() {
                Some(kind) => format!("input[type={kind}]"),
                None => element.tag_name.clone(),
            },
            None => "non-element".to_string(),
        };
        Error::TypeMismatch {
            selector: selector.to_string(),
            expected: expected.to_string(),
            actual,
        }
    }

    fn require_text_entry(&self, selector: &str, node: NodeId) -> Result<()> {
        if self.tracks_text(node) {
            Ok(())
        } else {
            Err(self.type_mismatch(selector, "input or textarea", node))
        }
    }

    /// Text-entry elements participate in focus/commit tracking.
    fn tracks_text(&self, node: NodeId) -> bool {
        match self.dom.tag_name(node) {
            Some("textarea") => true,
            Some("input") => !matches!(
                self.input_type_of(node).as_deref(),
                Some(
                    "checkbox" | "radio" | "file" | "submit" | "reset" | "button" | "hidden"
                        | "image" | "range"
                )
            ),
            _ => false,
        }
    }

    fn focus_node(&mut self, node: NodeId) {
        if self.focused == Some(node) {
            return;
        }
        self.commit_blur();
        if self.tracks_text(node) {
            self.focused = Some(node);
            self.focus_value = self.dom.value(node);
        }
    }

    fn commit_blur(&mut self) {
        if let Some(previous) = self.focused.take() {
            if self.tracks_text(previous) && self.dom.value(previous) != self.focus_value {
                self.recorder
                    .deliver(&self.dom, previous, &PlatformEvent::Change);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Profile;

    #[test]
    fn blur_commits_only_when_the_value_changed() -> Result<()> {
        let mut page = Page::from_html(
            "<input id='email' name='email' type='email'>",
            &RuleSet::login_page(),
        )?;
        page.focus("#email")?;
        page.blur("#email")?;
        page.assert_log("")?;

        page.type_text("#email", "a")?;
        page.blur("#email")?;
        page.assert_log("fill email a\nchange email a\n")?;

        // A second blur without edits commits nothing further.
        page.focus("#email")?;
        page.blur("#email")?;
        page.assert_log("fill email a\nchange email a\n")?;
        Ok(())
    }

    #[test]
    fn suppressed_tab_neither_moves_focus_nor_commits() -> Result<()> {
        let mut page = Page::from_html(
            "<input id='special-input' type='text'>",
            &RuleSet::keyboard_page("type-input", "combo-input", "special-input"),
        )?;
        page.type_text("#special-input", "x")?;
        let outcome = page.press_key("#special-input", Key::Tab, Modifiers::NONE)?;
        assert!(outcome.default_prevented);
        // No change line: the suppressed Tab never moved focus.
        page.assert_log_lines(&["keydown Tab"])?;

        // A real blur still commits the dirty field through a rule set that
        // tracks it.
        let mut tracked = Page::from_html(
            "<input id='email' name='email' type='text'>",
            &RuleSet::login_page(),
        )?;
        tracked.type_text("#email", "x")?;
        let outcome = tracked.press_key("#email", Key::Tab, Modifiers::NONE)?;
        assert!(!outcome.default_prevented);
        tracked.assert_log("fill email x\nchange email x\n")?;
        Ok(())
    }

    #[test]
    fn clicking_elsewhere_commits_the_dirty_field_first() -> Result<()> {
        let mut page = Page::from_html(
            "<input id='email' name='email' type='email'>
             <button id='submit-button' type='submit'>Go</button>",
            &RuleSet::login_page(),
        )?;
        page.type_text("#email", "hi")?;
        page.click("#submit-button")?;
        page.assert_log_lines(&[
            "fill email h",
            "fill email hi",
            "change email hi",
            "click submit-button",
        ])?;
        Ok(())
    }

    #[test]
    fn typed_text_is_nfc_composed() -> Result<()> {
        let mut page = Page::from_html(
            "<input id='name' type='text'>",
            &RuleSet::builder()
                .rule("input[type='text']", Profile::TextField)
                .build(),
        )?;
        // 'e' followed by a combining acute accent composes to a single
        // scalar before it reaches the field.
        page.type_text("#name", "e\u{0301}")?;
        page.assert_value("#name", "\u{00e9}")?;
        page.assert_log("fill name \u{00e9}\n")?;
        Ok(())
    }

    #[test]
    fn driver_misuse_is_reported_as_errors() -> Result<()> {
        let mut page = Page::from_html(
            "<input id='flag' type='checkbox'>",
            &RuleSet::form_page(),
        )?;
        assert!(matches!(
            page.type_text("#flag", "x"),
            Err(Error::TypeMismatch { .. })
        ));
        assert!(matches!(
            page.click("#missing"),
            Err(Error::SelectorNotFound(_))
        ));
        Ok(())
    }
}
