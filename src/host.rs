use std::collections::HashMap;

use crate::dom::{Document, NodeId};
use crate::env::{Environment, Host, ScrollRequest, Task, TimerId};
use crate::html::parse_html;
use crate::scheduler::{PendingTask, TaskQueue};
use crate::{Error, Result};

/// Document-relative box used for viewport math. There is no layout engine,
/// so tests place the elements they care about explicitly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutBox {
    pub top: f64,
    pub height: f64,
}

/// Deterministic in-memory browser: a DOM, a viewport with a scroll
/// position, focus tracking and a virtual clock driving timers and frames.
#[derive(Debug, Clone)]
pub struct MemoryHost {
    dom: Document,
    layout: HashMap<NodeId, LayoutBox>,
    queue: TaskQueue,
    now_ms: i64,
    viewport_height: f64,
    scroll_y: f64,
    scroll_pending: bool,
    scroll_log: Vec<ScrollRequest>,
    navigations: Vec<String>,
    active_element: Option<NodeId>,
    task_step_limit: usize,
}

impl MemoryHost {
    pub fn from_html(html: &str) -> Result<Self> {
        Ok(Self::from_document(parse_html(html)?))
    }

    pub fn from_document(dom: Document) -> Self {
        Self {
            dom,
            layout: HashMap::new(),
            queue: TaskQueue::default(),
            now_ms: 0,
            viewport_height: 800.0,
            scroll_y: 0.0,
            scroll_pending: false,
            scroll_log: Vec::new(),
            navigations: Vec::new(),
            active_element: None,
            task_step_limit: 10_000,
        }
    }

    pub fn set_viewport_height(&mut self, height: f64) -> Result<()> {
        if !height.is_finite() || height <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "viewport height must be positive, got {height}"
            )));
        }
        self.viewport_height = height;
        Ok(())
    }

    pub fn set_frame_interval(&mut self, interval_ms: i64) -> Result<()> {
        self.queue.set_frame_interval_ms(interval_ms)
    }

    pub fn set_task_step_limit(&mut self, max_steps: usize) -> Result<()> {
        if max_steps == 0 {
            return Err(Error::InvalidConfig(
                "task step limit requires at least 1 step".into(),
            ));
        }
        self.task_step_limit = max_steps;
        Ok(())
    }

    /// Places the first element matching `selector`.
    pub fn set_layout(&mut self, selector: &str, top: f64, height: f64) -> Result<()> {
        let node = self
            .dom
            .query_selector(selector)?
            .ok_or_else(|| Error::SelectorNotFound(selector.to_string()))?;
        self.layout.insert(node, LayoutBox { top, height });
        Ok(())
    }

    pub fn set_node_layout(&mut self, node: NodeId, layout: LayoutBox) {
        self.layout.insert(node, layout);
    }

    pub fn scroll_log(&self) -> &[ScrollRequest] {
        &self.scroll_log
    }

    pub fn navigations(&self) -> &[String] {
        &self.navigations
    }

    pub fn pending_tasks(&self) -> Vec<PendingTask> {
        self.queue.pending()
    }

    pub fn clear_tasks(&mut self) -> usize {
        self.queue.clear()
    }

    // Unplaced elements sit inside their nearest placed ancestor.
    fn layout_of(&self, node: NodeId) -> LayoutBox {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if let Some(layout) = self.layout.get(&current) {
                return *layout;
            }
            cursor = self.dom.parent(current);
        }
        LayoutBox {
            top: 0.0,
            height: 0.0,
        }
    }
}

impl Environment for MemoryHost {
    fn document_node(&self) -> NodeId {
        self.dom.root()
    }

    fn head(&self) -> Option<NodeId> {
        self.dom.query_selector("head").ok().flatten()
    }

    fn body(&self) -> Option<NodeId> {
        self.dom.query_selector("body").ok().flatten()
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.dom.by_id(id)
    }

    fn query_all(&self, selector: &str) -> Result<Vec<NodeId>> {
        self.dom.query_selector_all(selector)
    }

    fn query_all_within(&self, scope: NodeId, selector: &str) -> Result<Vec<NodeId>> {
        self.dom.query_selector_all_from(scope, selector)
    }

    fn closest(&self, node: NodeId, selector: &str) -> Result<Option<NodeId>> {
        self.dom.closest(node, selector)
    }

    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.dom.contains(ancestor, node)
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.dom.attr(node, name)
    }

    fn has_attribute(&self, node: NodeId, name: &str) -> bool {
        self.dom.has_attr(node, name)
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<()> {
        self.dom.set_attr(node, name, value)
    }

    fn has_class(&self, node: NodeId, class_name: &str) -> bool {
        self.dom.class_contains(node, class_name)
    }

    fn add_class(&mut self, node: NodeId, class_name: &str) -> Result<()> {
        self.dom.class_add(node, class_name)
    }

    fn remove_class(&mut self, node: NodeId, class_name: &str) -> Result<()> {
        self.dom.class_remove(node, class_name)
    }

    fn set_style(&mut self, node: NodeId, property: &str, value: &str) -> Result<()> {
        self.dom.set_style(node, property, value)
    }

    fn text_content(&self, node: NodeId) -> String {
        self.dom.text_content(node)
    }

    fn set_text_content(&mut self, node: NodeId, text: &str) -> Result<()> {
        self.dom.set_text_content(node, text)
    }

    fn value(&self, node: NodeId) -> Result<String> {
        self.dom.value(node)
    }

    fn set_value(&mut self, node: NodeId, value: &str) -> Result<()> {
        self.dom.set_value(node, value)
    }

    fn reset_form(&mut self, form: NodeId) -> Result<()> {
        self.dom.reset_form(form)
    }

    fn create_element(&mut self, tag_name: &str) -> NodeId {
        self.dom.create_detached_element(tag_name)
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.dom.append_child(parent, child)
    }

    fn remove(&mut self, node: NodeId) -> Result<()> {
        if self
            .active_element
            .is_some_and(|active| self.dom.contains(node, active))
        {
            self.active_element = None;
        }
        self.dom.remove_node(node)
    }

    fn focus(&mut self, node: NodeId) {
        self.active_element = Some(node);
    }

    fn bounding_top(&self, node: NodeId) -> f64 {
        self.layout_of(node).top - self.scroll_y
    }

    fn bounding_height(&self, node: NodeId) -> f64 {
        self.layout_of(node).height
    }

    fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    fn scroll_to(&mut self, request: ScrollRequest) {
        self.scroll_log.push(request);
        let target = request.top.max(0.0);
        if target != self.scroll_y {
            self.scroll_y = target;
            self.scroll_pending = true;
        }
    }

    fn now_ms(&self) -> i64 {
        self.now_ms
    }

    fn set_timeout(&mut self, task: Task, delay_ms: i64) -> TimerId {
        self.queue.schedule_timeout(self.now_ms, task, delay_ms)
    }

    fn clear_timeout(&mut self, id: TimerId) {
        self.queue.cancel(id);
    }

    fn request_animation_frame(&mut self, task: Task) -> TimerId {
        self.queue.request_frame(self.now_ms, task)
    }

    fn cancel_animation_frame(&mut self, id: TimerId) {
        self.queue.cancel(id);
    }
}

impl Host for MemoryHost {
    fn document(&self) -> &Document {
        &self.dom
    }

    fn set_scroll_y(&mut self, scroll_y: f64) {
        self.scroll_y = scroll_y.max(0.0);
    }

    fn take_scroll_pending(&mut self) -> bool {
        std::mem::take(&mut self.scroll_pending)
    }

    fn active_element(&self) -> Option<NodeId> {
        self.active_element
    }

    fn set_active_element(&mut self, node: Option<NodeId>) {
        self.active_element = node;
    }

    fn record_navigation(&mut self, href: &str) {
        self.navigations.push(href.to_string());
    }

    fn set_now_ms(&mut self, now_ms: i64) {
        self.now_ms = now_ms;
    }

    fn pop_due_task(&mut self, due_limit: Option<i64>) -> Option<PendingTask> {
        self.queue.pop_due(due_limit)
    }

    fn next_frame_at(&self) -> i64 {
        self.queue.next_frame_at(self.now_ms)
    }

    fn task_step_limit(&self) -> usize {
        self.task_step_limit
    }
}
