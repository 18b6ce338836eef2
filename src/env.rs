//! The capability surface controllers are allowed to touch.
//!
//! Controllers never reach for a global document or window. Everything goes
//! through [`Environment`], so the same controller code runs against
//! [`MemoryHost`](crate::host::MemoryHost) in tests or any other host that
//! implements the trait.

use crate::Result;
use crate::dom::{Document, NodeId};
use crate::event::ControllerKind;
use crate::scheduler::PendingTask;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub(crate) u64);

/// Deferred work owned by exactly one controller. The page routes a due task
/// back to its owner by variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    HeaderFrame,
    RevealFrame,
    LazyImageFrame,
    CounterFrame,
    ToastExit(NodeId),
    ToastRemove(NodeId),
}

impl Task {
    pub fn owner(&self) -> ControllerKind {
        match self {
            Self::HeaderFrame => ControllerKind::Header,
            Self::RevealFrame => ControllerKind::Reveal,
            Self::LazyImageFrame => ControllerKind::LazyImages,
            Self::CounterFrame => ControllerKind::Stats,
            Self::ToastExit(_) | Self::ToastRemove(_) => ControllerKind::ContactForm,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    Instant,
    Smooth,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollRequest {
    pub top: f64,
    pub behavior: ScrollBehavior,
}

pub trait Environment {
    fn document_node(&self) -> NodeId;
    fn head(&self) -> Option<NodeId>;
    fn body(&self) -> Option<NodeId>;
    fn element_by_id(&self, id: &str) -> Option<NodeId>;
    fn query_all(&self, selector: &str) -> Result<Vec<NodeId>>;
    fn query_all_within(&self, scope: NodeId, selector: &str) -> Result<Vec<NodeId>>;
    fn closest(&self, node: NodeId, selector: &str) -> Result<Option<NodeId>>;
    /// Inclusive: a node contains itself.
    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool;

    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;
    fn has_attribute(&self, node: NodeId, name: &str) -> bool;
    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<()>;

    fn has_class(&self, node: NodeId, class_name: &str) -> bool;
    fn add_class(&mut self, node: NodeId, class_name: &str) -> Result<()>;
    fn remove_class(&mut self, node: NodeId, class_name: &str) -> Result<()>;
    fn toggle_class(&mut self, node: NodeId, class_name: &str, force: bool) -> Result<()> {
        if force {
            self.add_class(node, class_name)
        } else {
            self.remove_class(node, class_name)
        }
    }

    fn set_style(&mut self, node: NodeId, property: &str, value: &str) -> Result<()>;
    fn text_content(&self, node: NodeId) -> String;
    fn set_text_content(&mut self, node: NodeId, text: &str) -> Result<()>;
    fn value(&self, node: NodeId) -> Result<String>;
    fn set_value(&mut self, node: NodeId, value: &str) -> Result<()>;
    fn reset_form(&mut self, form: NodeId) -> Result<()>;

    fn create_element(&mut self, tag_name: &str) -> NodeId;
    fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()>;
    fn remove(&mut self, node: NodeId) -> Result<()>;
    fn focus(&mut self, node: NodeId);

    /// Distance from the viewport top to the element's top edge.
    fn bounding_top(&self, node: NodeId) -> f64;
    fn bounding_height(&self, node: NodeId) -> f64;
    fn viewport_height(&self) -> f64;
    fn scroll_y(&self) -> f64;
    fn scroll_to(&mut self, request: ScrollRequest);

    fn now_ms(&self) -> i64;
    fn set_timeout(&mut self, task: Task, delay_ms: i64) -> TimerId;
    fn clear_timeout(&mut self, id: TimerId);
    fn request_animation_frame(&mut self, task: Task) -> TimerId;
    fn cancel_animation_frame(&mut self, id: TimerId);
}

/// Driver-side hooks the page event loop needs on top of [`Environment`].
pub trait Host: Environment {
    fn document(&self) -> &Document;
    fn set_scroll_y(&mut self, scroll_y: f64);
    /// Returns true once after a programmatic scroll moved the viewport.
    fn take_scroll_pending(&mut self) -> bool;
    fn active_element(&self) -> Option<NodeId>;
    fn set_active_element(&mut self, node: Option<NodeId>);
    fn record_navigation(&mut self, href: &str);

    fn set_now_ms(&mut self, now_ms: i64);
    fn pop_due_task(&mut self, due_limit: Option<i64>) -> Option<PendingTask>;
    fn next_frame_at(&self) -> i64;
    fn task_step_limit(&self) -> usize;
}
