//! Deterministic DOM interaction recorder for Rust tests.
//!
//! The crate models a browser page as an in-process DOM, attaches behavior
//! profiles to interactive elements by selector, and appends one normalized
//! text line per qualifying user interaction to an injected append-only log
//! sink. Test drivers build a [`Page`] from HTML, simulate user actions
//! through its harness methods, and assert on the sink's contents.
//!
//! ```
//! use interaction_recorder::{Page, RuleSet};
//!
//! # fn main() -> interaction_recorder::Result<()> {
//! let mut page = Page::from_html(
//!     "<input id='email' name='email' type='email'>
//!      <button id='submit-button' type='submit'>Sign in</button>",
//!     &RuleSet::login_page(),
//! )?;
//! page.type_text("#email", "hi")?;
//! page.blur("#email")?;
//! assert_eq!(page.action_log(), "fill email h\nfill email hi\nchange email hi\n");
//! # Ok(())
//! # }
//! ```

use std::error::Error as StdError;
use std::fmt;

mod dom;
mod event;
mod html;
mod page;
mod recorder;
mod rules;
mod selector;

pub use dom::{Dom, MockFile, NodeId};
pub use event::{Interaction, Key, LogEntry, Modifiers, PlatformEvent};
pub use page::Page;
pub use recorder::{LogSink, MemorySink, Outcome, Recorder};
pub use rules::{Profile, Rule, RuleSet, RuleSetBuilder};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    HtmlParse(String),
    SelectorNotFound(String),
    UnsupportedSelector(String),
    TypeMismatch {
        selector: String,
        expected: String,
        actual: String,
    },
    AssertionFailed {
        expected: String,
        actual: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HtmlParse(msg) => write!(f, "html parse error: {msg}"),
            Self::SelectorNotFound(selector) => write!(f, "selector not found: {selector}"),
            Self::UnsupportedSelector(selector) => write!(f, "unsupported selector: {selector}"),
            Self::TypeMismatch {
                selector,
                expected,
                actual,
            } => write!(
                f,
                "type mismatch for {selector}: expected {expected}, actual {actual}"
            ),
            Self::AssertionFailed { expected, actual } => {
                write!(f, "assertion failed: expected {expected:?}, actual {actual:?}")
            }
        }
    }
}

impl StdError for Error {}
