use crate::dom::{Dom, NodeId};
use crate::{Error, Result};

/// One compound selector step: optional tag or `*`, optional `#id`, and any
/// number of attribute conditions. This is the subset the selection rules
/// use; combinators, classes and pseudo-classes are rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct SelectorStep {
    pub(crate) tag: Option<String>,
    pub(crate) universal: bool,
    pub(crate) id: Option<String>,
    pub(crate) attrs: Vec<AttrCondition>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum AttrCondition {
    Exists { key: String },
    Eq { key: String, value: String },
}

impl SelectorStep {
    /// Fast path: a step that is exactly `#id`.
    pub(crate) fn id_only(&self) -> Option<&str> {
        if !self.universal && self.tag.is_none() && self.attrs.is_empty() {
            self.id.as_deref()
        } else {
            None
        }
    }

    pub(crate) fn matches(&self, dom: &Dom, node_id: NodeId) -> bool {
        let Some(element) = dom.element(node_id) else {
            return false;
        };
        if let Some(tag) = &self.tag {
            if !element.tag_name.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if dom.id(node_id) != Some(id.as_str()) {
                return false;
            }
        }
        self.attrs.iter().all(|condition| match condition {
            AttrCondition::Exists { key } => element.attrs.contains_key(key),
            AttrCondition::Eq { key, value } => {
                element.attrs.get(key).map(String::as_str) == Some(value.as_str())
            }
        })
    }
}

/// Parse a comma-separated selector list into compound steps.
pub(crate) fn parse_selector_list(selector: &str) -> Result<Vec<SelectorStep>> {
    let mut steps = Vec::new();
    for part in selector.split(',') {
        let part = part.trim();
        if part.is_empty() {
            return Err(Error::UnsupportedSelector(selector.to_string()));
        }
        steps.push(parse_step(selector, part)?);
    }
    Ok(steps)
}

fn parse_step(full: &str, part: &str) -> Result<SelectorStep> {
    let chars: Vec<char> = part.chars().collect();
    let mut pos = 0usize;
    let mut step = SelectorStep::default();

    if chars.get(pos) == Some(&'*') {
        step.universal = true;
        pos += 1;
    } else if chars.get(pos).is_some_and(|ch| is_name_char(*ch)) {
        let name = read_name(&chars, &mut pos);
        step.tag = Some(name.to_ascii_lowercase());
    }

    while pos < chars.len() {
        match chars[pos] {
            '#' => {
                pos += 1;
                let id = read_name(&chars, &mut pos);
                if id.is_empty() {
                    return Err(Error::UnsupportedSelector(full.to_string()));
                }
                step.id = Some(id);
            }
            '[' => {
                pos += 1;
                step.attrs.push(parse_attr_condition(full, &chars, &mut pos)?);
            }
            _ => return Err(Error::UnsupportedSelector(full.to_string())),
        }
    }

    if step.tag.is_none() && !step.universal && step.id.is_none() && step.attrs.is_empty() {
        return Err(Error::UnsupportedSelector(full.to_string()));
    }
    Ok(step)
}

fn parse_attr_condition(full: &str, chars: &[char], pos: &mut usize) -> Result<AttrCondition> {
    let key = read_name(chars, pos).to_ascii_lowercase();
    if key.is_empty() {
        return Err(Error::UnsupportedSelector(full.to_string()));
    }
    match chars.get(*pos) {
        Some(']') => {
            *pos += 1;
            Ok(AttrCondition::Exists { key })
        }
        Some('=') => {
            *pos += 1;
            let value = match chars.get(*pos) {
                Some(quote @ ('\'' | '"')) => {
                    *pos += 1;
                    let start = *pos;
                    while *pos < chars.len() && chars[*pos] != *quote {
                        *pos += 1;
                    }
                    if *pos >= chars.len() {
                        return Err(Error::UnsupportedSelector(full.to_string()));
                    }
                    let value: String = chars[start..*pos].iter().collect();
                    *pos += 1;
                    value
                }
                Some(_) => {
                    let start = *pos;
                    while *pos < chars.len() && chars[*pos] != ']' {
                        *pos += 1;
                    }
                    chars[start..*pos].iter().collect()
                }
                None => return Err(Error::UnsupportedSelector(full.to_string())),
            };
            if chars.get(*pos) != Some(&']') {
                return Err(Error::UnsupportedSelector(full.to_string()));
            }
            *pos += 1;
            Ok(AttrCondition::Eq { key, value })
        }
        _ => Err(Error::UnsupportedSelector(full.to_string())),
    }
}

fn is_name_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '-' || ch == '_'
}

fn read_name(chars: &[char], pos: &mut usize) -> String {
    let start = *pos;
    while *pos < chars.len() && is_name_char(chars[*pos]) {
        *pos += 1;
    }
    chars[start..*pos].iter().collect()
}

/// All elements matching any step of the list, in document order.
pub(crate) fn query_all(dom: &Dom, selector: &str) -> Result<Vec<NodeId>> {
    let steps = parse_selector_list(selector)?;
    if let [step] = steps.as_slice() {
        if let Some(id) = step.id_only() {
            return Ok(dom.by_id(id).into_iter().collect());
        }
    }
    Ok(dom
        .document_order()
        .into_iter()
        .filter(|node_id| steps.iter().any(|step| step.matches(dom, *node_id)))
        .collect())
}

pub(crate) fn query_first(dom: &Dom, selector: &str) -> Result<Option<NodeId>> {
    Ok(query_all(dom, selector)?.into_iter().next())
}
