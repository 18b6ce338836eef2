//! Interactive behaviors for a single-page company site, written against a
//! small injectable browser surface so they can run deterministically in
//! memory.
//!
//! ```no_run
//! use site_behaviors::Page;
//!
//! # fn main() -> site_behaviors::Result<()> {
//! let mut page = Page::from_html(r#"<body><header id="header"></header></body>"#)?;
//! page.scroll_to(120.0)?;
//! page.next_frame()?;
//! page.assert_class("#header", "scrolled", true)?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod controllers;
pub mod dom;
pub mod env;
pub mod event;
pub mod host;
pub mod html;
pub mod page;
pub mod rate_limit;
pub mod scheduler;
mod selector;
pub mod validate;

pub use config::PageConfig;
pub use dom::{Document, NodeId};
pub use env::{Environment, Host, ScrollBehavior, ScrollRequest, Task, TimerId};
pub use event::{ControllerKind, EventKind, SubscriptionId};
pub use host::{LayoutBox, MemoryHost};
pub use html::parse_html;
pub use page::Page;
pub use rate_limit::{Debounce, Throttle};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("html parse error: {0}")]
    HtmlParse(String),
    #[error("selector not found: {0}")]
    SelectorNotFound(String),
    #[error("unsupported selector: {0}")]
    UnsupportedSelector(String),
    #[error("dom error: {0}")]
    Dom(String),
    #[error("invalid pattern {pattern}: {message}")]
    InvalidPattern { pattern: String, message: String },
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("type mismatch for {selector}: expected {expected}, actual {actual}")]
    TypeMismatch {
        selector: String,
        expected: String,
        actual: String,
    },
    #[error(
        "assertion failed for {selector}: expected {expected}, actual {actual}, snippet {dom_snippet}"
    )]
    AssertionFailed {
        selector: String,
        expected: String,
        actual: String,
        dom_snippet: String,
    },
    #[error("task queue exceeded {limit} steps at {now_ms}ms")]
    TaskLimit { limit: usize, now_ms: i64 },
}
