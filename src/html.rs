use std::collections::HashMap;

use crate::dom::{Dom, NodeId};
use crate::{Error, Result};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Parse a scenario fixture into a [`Dom`]. Fixtures are well-formed test
/// pages; a close tag that does not match the open element is a parse error
/// rather than a recovery case.
pub(crate) fn parse_html(html: &str) -> Result<Dom> {
    stacker::grow(32 * 1024 * 1024, || {
        let mut parser = Parser::new(html);
        let mut dom = Dom::new();
        let root = dom.root();
        parser.parse_children(&mut dom, root)?;
        if !parser.at_end() {
            return Err(Error::HtmlParse(format!(
                "unexpected close tag at offset {}",
                parser.pos
            )));
        }
        Ok(dom)
    })
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn new(html: &str) -> Self {
        Self {
            chars: html.chars().collect(),
            pos: 0,
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn starts_with(&self, needle: &str) -> bool {
        needle
            .chars()
            .enumerate()
            .all(|(offset, expected)| self.chars.get(self.pos + offset) == Some(&expected))
    }

    fn skip(&mut self, count: usize) {
        self.pos += count;
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    /// Parse sibling nodes into `parent` until a close tag or end of input.
    fn parse_children(&mut self, dom: &mut Dom, parent: NodeId) -> Result<()> {
        loop {
            if self.at_end() || self.starts_with("</") {
                return Ok(());
            }
            if self.starts_with("<!--") {
                self.skip_comment()?;
                continue;
            }
            if self.starts_with("<!") {
                self.skip_declaration();
                continue;
            }
            if self.peek() == Some('<') {
                self.parse_element(dom, parent)?;
                continue;
            }
            self.parse_text(dom, parent);
        }
    }

    fn parse_element(&mut self, dom: &mut Dom, parent: NodeId) -> Result<()> {
        self.skip(1); // '<'
        let tag_name = self.read_name();
        if tag_name.is_empty() {
            return Err(Error::HtmlParse(format!(
                "expected tag name at offset {}",
                self.pos
            )));
        }
        let tag_name = tag_name.to_ascii_lowercase();
        let (attrs, self_closing) = self.parse_attrs(&tag_name)?;
        let node = dom.create_element(parent, tag_name.clone(), attrs);
        if self_closing || VOID_ELEMENTS.contains(&tag_name.as_str()) {
            return Ok(());
        }

        self.parse_children(dom, node)?;

        if !self.starts_with("</") {
            return Err(Error::HtmlParse(format!("unclosed element <{tag_name}>")));
        }
        self.skip(2);
        let close_name = self.read_name().to_ascii_lowercase();
        self.skip_whitespace();
        if self.peek() != Some('>') {
            return Err(Error::HtmlParse(format!(
                "malformed close tag </{close_name}"
            )));
        }
        self.skip(1);
        if close_name != tag_name {
            return Err(Error::HtmlParse(format!(
                "mismatched close tag: <{tag_name}> closed by </{close_name}>"
            )));
        }
        Ok(())
    }

    fn parse_attrs(&mut self, tag_name: &str) -> Result<(HashMap<String, String>, bool)> {
        let mut attrs = HashMap::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some('>') => {
                    self.skip(1);
                    return Ok((attrs, false));
                }
                Some('/') if self.starts_with("/>") => {
                    self.skip(2);
                    return Ok((attrs, true));
                }
                Some(_) => {
                    let key = self.read_name().to_ascii_lowercase();
                    if key.is_empty() {
                        return Err(Error::HtmlParse(format!(
                            "malformed attribute in <{tag_name}> at offset {}",
                            self.pos
                        )));
                    }
                    self.skip_whitespace();
                    let value = if self.peek() == Some('=') {
                        self.skip(1);
                        self.skip_whitespace();
                        self.read_attr_value(tag_name)?
                    } else {
                        String::new()
                    };
                    attrs.entry(key).or_insert(value);
                }
                None => {
                    return Err(Error::HtmlParse(format!("unterminated tag <{tag_name}>")));
                }
            }
        }
    }

    fn read_attr_value(&mut self, tag_name: &str) -> Result<String> {
        match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.skip(1);
                let start = self.pos;
                while self.peek().is_some_and(|ch| ch != quote) {
                    self.pos += 1;
                }
                if self.at_end() {
                    return Err(Error::HtmlParse(format!(
                        "unterminated attribute value in <{tag_name}>"
                    )));
                }
                let value = self.chars[start..self.pos].iter().collect();
                self.skip(1);
                Ok(value)
            }
            Some(_) => {
                let start = self.pos;
                while self
                    .peek()
                    .is_some_and(|ch| !ch.is_whitespace() && ch != '>' && ch != '/')
                {
                    self.pos += 1;
                }
                Ok(self.chars[start..self.pos].iter().collect())
            }
            None => Err(Error::HtmlParse(format!(
                "unterminated attribute value in <{tag_name}>"
            ))),
        }
    }

    fn read_name(&mut self) -> String {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' || ch == ':')
        {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn parse_text(&mut self, dom: &mut Dom, parent: NodeId) {
        let start = self.pos;
        while self.peek().is_some_and(|ch| ch != '<') {
            self.pos += 1;
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        if !text.trim().is_empty() {
            dom.create_text(parent, text);
        }
    }

    fn skip_comment(&mut self) -> Result<()> {
        self.skip(4); // '<!--'
        while !self.at_end() && !self.starts_with("-->") {
            self.pos += 1;
        }
        if self.at_end() {
            return Err(Error::HtmlParse("unterminated comment".into()));
        }
        self.skip(3);
        Ok(())
    }

    fn skip_declaration(&mut self) {
        while self.peek().is_some_and(|ch| ch != '>') {
            self.pos += 1;
        }
        self.skip(1);
    }
}
