use interaction_recorder::{
    Key, LogEntry, LogSink, MockFile, Modifiers, Page, Result, RuleSet,
};

const FORM_PAGE: &str = r#"
<h1>Form interactions</h1>
<input id="email" type="email">
<input id="username" type="text">
<input id="subscribe" type="checkbox">
<input id="size-small" type="radio" name="size" value="small">
<input id="size-medium" type="radio" name="size" value="medium">
<select id="country">
  <option value="us" selected>United States</option>
  <option value="jp">Japan</option>
</select>
<select id="colors" multiple>
  <option value="red">Red</option>
  <option value="blue">Blue</option>
  <option value="green">Green</option>
</select>
<input id="file-upload" type="file">
<pre id="action-log"></pre>
"#;

const KEYBOARD_PAGE: &str = r#"
<input id="type-input" type="text">
<input id="combo-input" type="text">
<input id="special-input" type="text">
<pre id="action-log"></pre>
"#;

const MOUSE_PAGE: &str = r#"
<button id="test-button">Click me</button>
<div id="menu-item">Menu</div>
<div id="source" draggable="true">Drag me</div>
<div id="target">Drop here</div>
<pre id="action-log"></pre>
"#;

const SELECTORS_PAGE: &str = r#"
<h1 id="main-title">Selectors</h1>
<div id="nth-element-section">
  <button id="first-button">One</button>
  <button id="second-button">Two</button>
</div>
<input id="search" type="text">
<pre id="action-log"></pre>
"#;

const LOGIN_PAGE: &str = r#"
<form id="login-form">
  <input id="email" name="email" type="email">
  <input id="password" name="password" type="password">
  <button id="submit-button" type="submit">Sign in</button>
</form>
<pre id="action-log"></pre>
"#;

fn keyboard_rules() -> RuleSet {
    RuleSet::keyboard_page("type-input", "combo-input", "special-input")
}

fn mouse_rules() -> RuleSet {
    RuleSet::mouse_page("test-button", "menu-item", "source", "target")
}

#[test]
fn typing_hello_yields_cumulative_fills_then_one_change_on_blur() -> Result<()> {
    let mut page = Page::from_html(FORM_PAGE, &RuleSet::form_page())?;
    page.type_text("#email", "hello")?;
    page.blur("#email")?;
    page.assert_log_lines(&[
        "fill email h",
        "fill email he",
        "fill email hel",
        "fill email hell",
        "fill email hello",
        "change email hello",
    ])?;
    Ok(())
}

#[test]
fn checkbox_reports_the_resulting_state() -> Result<()> {
    let mut page = Page::from_html(FORM_PAGE, &RuleSet::form_page())?;
    page.check("#subscribe")?;
    page.check("#subscribe")?; // already checked, no event
    page.uncheck("#subscribe")?;
    page.assert_log("check subscribe\nuncheck subscribe\n")?;
    Ok(())
}

#[test]
fn radio_selection_logs_the_group_name_and_chosen_value() -> Result<()> {
    let mut page = Page::from_html(FORM_PAGE, &RuleSet::form_page())?;
    page.select_radio("#size-medium")?;
    page.select_radio("#size-medium")?; // re-selecting fires nothing
    page.select_radio("#size-small")?;
    page.assert_log("select size medium\nselect size small\n")?;
    page.assert_checked("#size-small", true)?;
    page.assert_checked("#size-medium", false)?;
    Ok(())
}

#[test]
fn single_select_change_logs_the_new_selection() -> Result<()> {
    let mut page = Page::from_html(FORM_PAGE, &RuleSet::form_page())?;
    page.select_option("#country", "jp")?;
    page.select_option("#country", "jp")?; // unchanged, no event
    page.assert_log("select country jp\n")?;
    Ok(())
}

#[test]
fn multi_select_reflects_only_currently_selected_values_in_dom_order() -> Result<()> {
    let mut page = Page::from_html(FORM_PAGE, &RuleSet::form_page())?;
    page.set_selected_options("#colors", &["red", "blue"])?;
    page.set_selected_options("#colors", &["blue"])?;
    page.assert_log("select colors red,blue\nselect colors blue\n")?;
    Ok(())
}

#[test]
fn upload_joins_name_size_pairs_in_selection_order() -> Result<()> {
    let mut page = Page::from_html(FORM_PAGE, &RuleSet::form_page())?;
    page.set_files(
        "#file-upload",
        &[MockFile::new("a.txt", 10), MockFile::new("b.txt", 20)],
    )?;
    page.assert_log("upload file-upload a.txt:10,b.txt:20\n")?;
    Ok(())
}

#[test]
fn keystroke_tracking_reports_the_full_field_content() -> Result<()> {
    let mut page = Page::from_html(KEYBOARD_PAGE, &keyboard_rules())?;
    page.type_text("#type-input", "hi")?;
    page.assert_log("type h\ntype hi\n")?;
    Ok(())
}

#[test]
fn recognized_chords_normalize_to_ctrl_plus_uppercase() -> Result<()> {
    let mut page = Page::from_html(KEYBOARD_PAGE, &keyboard_rules())?;
    page.press_key("#combo-input", Key::Char('a'), Modifiers::ctrl())?;
    page.press_key("#combo-input", Key::Char('A'), Modifiers::meta())?;
    page.press_key("#combo-input", Key::Char('c'), Modifiers::ctrl())?;
    page.press_key("#combo-input", Key::Char('v'), Modifiers::meta())?;
    // Unrecognized chord letters and bare letters stay silent.
    page.press_key("#combo-input", Key::Char('x'), Modifiers::ctrl())?;
    page.press_key("#combo-input", Key::Char('a'), Modifiers::NONE)?;
    page.assert_log_lines(&[
        "keydown Ctrl+A",
        "keydown Ctrl+A",
        "keydown Ctrl+C",
        "keydown Ctrl+V",
    ])?;
    Ok(())
}

#[test]
fn special_keys_are_logged_and_suppressed() -> Result<()> {
    let mut page = Page::from_html(KEYBOARD_PAGE, &keyboard_rules())?;
    for key in [Key::Enter, Key::Tab, Key::Escape, Key::ArrowDown] {
        let outcome = page.press_key("#special-input", key, Modifiers::NONE)?;
        assert!(outcome.default_prevented);
    }
    let outcome = page.press_key("#special-input", Key::Other("F5".into()), Modifiers::NONE)?;
    assert!(!outcome.default_prevented);
    page.assert_log_lines(&[
        "keydown Enter",
        "keydown Tab",
        "keydown Escape",
        "keydown ArrowDown",
    ])?;
    Ok(())
}

#[test]
fn button_click_reports_pointer_offset_when_available() -> Result<()> {
    let mut page = Page::from_html(MOUSE_PAGE, &mouse_rules())?;
    page.click_at("#test-button", 12, 7)?;
    page.click("#test-button")?;
    page.assert_log("click test-button x=12,y=7\nclick test-button\n")?;
    Ok(())
}

#[test]
fn context_menu_and_double_click_are_tracked_on_buttons() -> Result<()> {
    let mut page = Page::from_html(MOUSE_PAGE, &mouse_rules())?;
    page.context_menu("#test-button")?;
    page.dbl_click("#test-button")?;
    page.hover("#menu-item")?;
    page.assert_log("contextmenu test-button\ndblclick test-button\nhover menu-item\n")?;
    Ok(())
}

#[test]
fn drag_and_drop_logs_start_and_drop_but_not_drag_over() -> Result<()> {
    let mut page = Page::from_html(MOUSE_PAGE, &mouse_rules())?;
    page.drag_and_drop("#source", "#target")?;
    page.assert_log("dragstart source\ndrop target\n")?;
    Ok(())
}

#[test]
fn dropping_on_an_untracked_element_never_lands() -> Result<()> {
    let mut page = Page::from_html(MOUSE_PAGE, &mouse_rules())?;
    page.drag_and_drop("#source", "#menu-item")?;
    page.assert_log("dragstart source\n")?;
    Ok(())
}

#[test]
fn catch_all_clicks_log_ids_and_skip_excluded_wrappers() -> Result<()> {
    let mut page = Page::from_html(
        SELECTORS_PAGE,
        &RuleSet::catch_all_page(&["nth-element-section"]),
    )?;
    page.click("#main-title")?;
    page.click("#nth-element-section")?; // excluded wrapper, no line
    page.click("#first-button")?;
    page.type_text("#search", "ab")?;
    page.assert_log_lines(&[
        "click main-title",
        "click first-button",
        "fill search a",
        "fill search ab",
    ])?;
    Ok(())
}

#[test]
fn login_page_tracks_both_fields_and_the_submit_control() -> Result<()> {
    let mut page = Page::from_html(LOGIN_PAGE, &RuleSet::login_page())?;
    page.type_text("#email", "a@b")?;
    page.type_text("#password", "pw")?;
    page.click("#submit-button")?;
    page.assert_log_lines(&[
        "fill email a",
        "fill email a@",
        "fill email a@b",
        "change email a@b",
        "fill password p",
        "fill password pw",
        "change password pw",
        "click submit-button",
    ])?;
    Ok(())
}

#[test]
fn entries_appear_in_delivery_order_across_profiles() -> Result<()> {
    let mut page = Page::from_html(FORM_PAGE, &RuleSet::form_page())?;
    page.type_text("#username", "jo")?;
    page.check("#subscribe")?;
    page.select_radio("#size-small")?;
    page.type_text("#username", "e")?;
    page.select_option("#country", "jp")?;
    page.blur("#username")?;
    page.assert_log_lines(&[
        "fill username j",
        "fill username jo",
        "check subscribe",
        "select size small",
        "fill username joe",
        "select country jp",
        "change username joe",
    ])?;
    Ok(())
}

#[test]
fn missing_elements_skip_their_rule_but_not_the_others() -> Result<()> {
    // No file input and no selects on this page.
    let mut page = Page::from_html(
        "<input id='email' type='email'>
         <input id='subscribe' type='checkbox'>",
        &RuleSet::form_page(),
    )?;
    let trace = page.take_trace_logs();
    assert_eq!(trace.len(), 3);
    assert!(trace.iter().any(|line| line.contains("input[type='radio']")));
    assert!(trace.iter().any(|line| line.contains("select")));
    assert!(trace.iter().any(|line| line.contains("input[type='file']")));

    // Surviving bindings still record.
    page.type_text("#email", "x")?;
    page.check("#subscribe")?;
    page.assert_log("fill email x\ncheck subscribe\n")?;
    Ok(())
}

#[derive(Default)]
struct CollectingSink {
    entries: Vec<LogEntry>,
}

impl LogSink for CollectingSink {
    fn append(&mut self, entry: &LogEntry) {
        self.entries.push(entry.clone());
    }
}

#[test]
fn an_injected_sink_observes_every_append() -> Result<()> {
    let mut page =
        Page::from_html_with_sink(FORM_PAGE, &RuleSet::form_page(), CollectingSink::default())?;
    page.type_text("#email", "ok")?;
    page.check("#subscribe")?;
    let entries = &page.sink().entries;
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].action, "fill");
    assert_eq!(entries[2].action, "check");
    assert_eq!(entries[2].target.as_deref(), Some("subscribe"));
    assert_eq!(entries[2].value, None);
    Ok(())
}
