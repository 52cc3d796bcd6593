/// Behavior profile assigned to a watched element. The profile decides which
/// events the element reports and how they are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Text-like input: `fill` on live edit, `change` on commit.
    TextField,
    Checkbox,
    Radio,
    /// Single or multi `<select>`.
    Select,
    FileInput,
    /// Click / contextmenu / dblclick with pointer offsets.
    Button,
    Hoverable,
    DragSource,
    DropTarget,
    /// Keyboard scenario: every keystroke reports the full field content.
    Keystrokes,
    /// Keyboard scenario: recognized modifier chords (select-all/copy/paste).
    Chords,
    /// Keyboard scenario: Enter/Tab/Escape/ArrowDown, defaults suppressed.
    SpecialKeys,
    /// Catch-all click capture with the default action suppressed.
    ClickCatchAll,
}

#[derive(Debug, Clone)]
pub struct Rule {
    pub(crate) selector: String,
    pub(crate) profile: Profile,
}

impl Rule {
    pub fn new(selector: &str, profile: Profile) -> Self {
        Self {
            selector: selector.to_string(),
            profile,
        }
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }

    pub fn profile(&self) -> Profile {
        self.profile
    }
}

/// Declarative element selection for one page: which selectors get which
/// profile, plus wrapper ids excluded from catch-all click capture. Rule
/// order is the classification priority; the first matching rule wins, so an
/// element never receives conflicting profiles.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    pub(crate) rules: Vec<Rule>,
    pub(crate) excluded_ids: Vec<String>,
}

impl RuleSet {
    pub fn builder() -> RuleSetBuilder {
        RuleSetBuilder::default()
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub(crate) fn is_excluded(&self, id: &str) -> bool {
        self.excluded_ids.iter().any(|excluded| excluded == id)
    }

    /// Form-interaction page: text/email fields, checkboxes, radio groups,
    /// selects, and file inputs.
    pub fn form_page() -> Self {
        Self::builder()
            .rule("input[type='text'], input[type='email']", Profile::TextField)
            .rule("input[type='checkbox']", Profile::Checkbox)
            .rule("input[type='radio']", Profile::Radio)
            .rule("select", Profile::Select)
            .rule("input[type='file']", Profile::FileInput)
            .build()
    }

    /// Keyboard-action page, parameterized by its element-id manifest.
    pub fn keyboard_page(type_id: &str, combo_id: &str, special_id: &str) -> Self {
        Self::builder()
            .rule(&format!("#{type_id}"), Profile::Keystrokes)
            .rule(&format!("#{combo_id}"), Profile::Chords)
            .rule(&format!("#{special_id}"), Profile::SpecialKeys)
            .build()
    }

    /// Mouse-action page, parameterized by its element-id manifest.
    pub fn mouse_page(button_id: &str, hover_id: &str, source_id: &str, target_id: &str) -> Self {
        Self::builder()
            .rule(&format!("#{button_id}"), Profile::Button)
            .rule(&format!("#{hover_id}"), Profile::Hoverable)
            .rule(&format!("#{source_id}"), Profile::DragSource)
            .rule(&format!("#{target_id}"), Profile::DropTarget)
            .build()
    }

    /// Selector page: inputs report live edits, every other button, heading
    /// or identified container captures clicks, minus the wrapper exclusion
    /// list.
    pub fn catch_all_page(excluded_ids: &[&str]) -> Self {
        let mut builder = Self::builder()
            .rule("input", Profile::TextField)
            .rule("button, h1, div[id]", Profile::ClickCatchAll);
        for id in excluded_ids {
            builder = builder.exclude_id(id);
        }
        builder.build()
    }

    /// Login page: email and password fields plus the submit control.
    pub fn login_page() -> Self {
        Self::builder()
            .rule(
                "input[name='email'], input[name='password']",
                Profile::TextField,
            )
            .rule("button[type='submit']", Profile::Button)
            .build()
    }
}

#[derive(Debug, Default)]
pub struct RuleSetBuilder {
    rules: Vec<Rule>,
    excluded_ids: Vec<String>,
}

impl RuleSetBuilder {
    pub fn rule(mut self, selector: &str, profile: Profile) -> Self {
        self.rules.push(Rule::new(selector, profile));
        self
    }

    pub fn exclude_id(mut self, id: &str) -> Self {
        self.excluded_ids.push(id.to_string());
        self
    }

    pub fn build(self) -> RuleSet {
        RuleSet {
            rules: self.rules,
            excluded_ids: self.excluded_ids,
        }
    }
}
