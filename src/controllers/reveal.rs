use tracing::{debug, trace};

use super::Controller;
use crate::Result;
use crate::config::PageConfig;
use crate::dom::NodeId;
use crate::env::{Environment, Task};
use crate::event::{EventKind, EventState, ListenerTarget};

const ACTIVE_CLASS: &str = "active";

#[derive(Debug, Clone)]
struct RevealElement {
    node: NodeId,
    revealed: bool,
}

/// Adds `active` to each `.reveal` element the first time it comes into view.
/// Reveal is one-way; once everything is shown, scroll events cost nothing.
#[derive(Debug, Clone)]
pub struct RevealOnScroll {
    elements: Vec<RevealElement>,
    offset: f64,
    frame_pending: bool,
}

impl RevealOnScroll {
    pub(crate) fn install(env: &dyn Environment, config: &PageConfig) -> Result<Option<Self>> {
        let nodes = env.query_all(".reveal")?;
        if nodes.is_empty() {
            return Ok(None);
        }
        Ok(Some(Self {
            elements: nodes
                .into_iter()
                .map(|node| RevealElement {
                    node,
                    revealed: false,
                })
                .collect(),
            offset: config.reveal_offset,
            frame_pending: false,
        }))
    }

    pub fn is_revealed(&self, node: NodeId) -> bool {
        self.elements
            .iter()
            .any(|element| element.node == node && element.revealed)
    }

    pub fn revealed_count(&self) -> usize {
        self.elements.iter().filter(|element| element.revealed).count()
    }

    pub fn all_revealed(&self) -> bool {
        self.elements.iter().all(|element| element.revealed)
    }

    fn check(&mut self, env: &mut dyn Environment) -> Result<()> {
        let reveal_line = env.viewport_height() - self.offset;
        for element in self.elements.iter_mut().filter(|element| !element.revealed) {
            if env.bounding_top(element.node) < reveal_line {
                env.add_class(element.node, ACTIVE_CLASS)?;
                element.revealed = true;
                trace!(node = ?element.node, "element revealed");
            }
        }
        if self.all_revealed() {
            debug!(count = self.elements.len(), "all reveal elements shown");
        }
        Ok(())
    }
}

impl Controller for RevealOnScroll {
    fn listeners(&self) -> Vec<(ListenerTarget, EventKind)> {
        vec![(ListenerTarget::Window, EventKind::Scroll)]
    }

    fn on_load(&mut self, env: &mut dyn Environment) -> Result<()> {
        self.check(env)
    }

    fn handle_event(&mut self, env: &mut dyn Environment, event: &mut EventState) -> Result<()> {
        if event.kind != EventKind::Scroll || self.frame_pending || self.all_revealed() {
            return Ok(());
        }
        env.request_animation_frame(Task::RevealFrame);
        self.frame_pending = true;
        Ok(())
    }

    fn run_task(&mut self, env: &mut dyn Environment, task: &Task) -> Result<()> {
        if *task == Task::RevealFrame {
            self.frame_pending = false;
            self.check(env)?;
        }
        Ok(())
    }
}
