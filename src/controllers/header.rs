use tracing::debug;

use super::Controller;
use crate::Result;
use crate::config::PageConfig;
use crate::dom::NodeId;
use crate::env::{Environment, Task};
use crate::event::{EventKind, EventState, ListenerTarget};

const SCROLLED_CLASS: &str = "scrolled";

/// Compacts `#header` once the page is scrolled past the threshold. Scroll
/// bursts collapse into one recomputation per animation frame.
#[derive(Debug, Clone)]
pub struct HeaderScroll {
    header: NodeId,
    threshold: f64,
    compact: bool,
    ticking: bool,
    recomputations: u64,
}

impl HeaderScroll {
    pub(crate) fn install(env: &dyn Environment, config: &PageConfig) -> Option<Self> {
        let header = env.element_by_id("header")?;
        Some(Self {
            header,
            threshold: config.header_compact_offset,
            compact: env.has_class(header, SCROLLED_CLASS),
            ticking: false,
            recomputations: 0,
        })
    }

    pub fn is_compact(&self) -> bool {
        self.compact
    }

    /// Number of frame callbacks that actually ran.
    pub fn recomputations(&self) -> u64 {
        self.recomputations
    }

    fn update(&mut self, env: &mut dyn Environment) -> Result<()> {
        self.ticking = false;
        self.recomputations += 1;
        let scroll_y = env.scroll_y();
        let compact = scroll_y > self.threshold;
        if compact != self.compact {
            env.toggle_class(self.header, SCROLLED_CLASS, compact)?;
            self.compact = compact;
            debug!(compact, scroll_y, "header state changed");
        }
        Ok(())
    }
}

impl Controller for HeaderScroll {
    fn listeners(&self) -> Vec<(ListenerTarget, EventKind)> {
        vec![(ListenerTarget::Window, EventKind::Scroll)]
    }

    fn handle_event(&mut self, env: &mut dyn Environment, event: &mut EventState) -> Result<()> {
        if event.kind == EventKind::Scroll && !self.ticking {
            env.request_animation_frame(Task::HeaderFrame);
            self.ticking = true;
        }
        Ok(())
    }

    fn run_task(&mut self, env: &mut dyn Environment, task: &Task) -> Result<()> {
        if *task == Task::HeaderFrame {
            self.update(env)?;
        }
        Ok(())
    }
}
