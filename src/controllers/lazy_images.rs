use tracing::trace;

use super::Controller;
use crate::Result;
use crate::dom::NodeId;
use crate::env::{Environment, Task};
use crate::event::{EventKind, EventState, ListenerTarget};

const LAZY_SELECTOR: &str = r#"img[loading="lazy"]"#;
const LOADED_CLASS: &str = "loaded";

/// Swaps `data-src` into `src` for lazy images once they intersect the
/// viewport. Each image loads once and is then forgotten.
#[derive(Debug, Clone)]
pub struct LazyImages {
    pending: Vec<NodeId>,
    loaded: usize,
    frame_pending: bool,
}

impl LazyImages {
    pub(crate) fn install(env: &dyn Environment) -> Result<Option<Self>> {
        let pending = env.query_all(LAZY_SELECTOR)?;
        if pending.is_empty() {
            return Ok(None);
        }
        Ok(Some(Self {
            pending,
            loaded: 0,
            frame_pending: false,
        }))
    }

    pub fn loaded_count(&self) -> usize {
        self.loaded
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    fn check(&mut self, env: &mut dyn Environment) -> Result<()> {
        let viewport = env.viewport_height();
        let mut still_pending = Vec::with_capacity(self.pending.len());
        for image in std::mem::take(&mut self.pending) {
            let top = env.bounding_top(image);
            if top < viewport && top + env.bounding_height(image) > 0.0 {
                load(env, image)?;
                self.loaded += 1;
            } else {
                still_pending.push(image);
            }
        }
        self.pending = still_pending;
        Ok(())
    }
}

fn load(env: &mut dyn Environment, image: NodeId) -> Result<()> {
    let source = env
        .attribute(image, "data-src")
        .or_else(|| env.attribute(image, "src"));
    if let Some(source) = source {
        trace!(src = %source, "lazy image loaded");
        env.set_attribute(image, "src", &source)?;
    }
    env.add_class(image, LOADED_CLASS)
}

impl Controller for LazyImages {
    fn listeners(&self) -> Vec<(ListenerTarget, EventKind)> {
        vec![(ListenerTarget::Window, EventKind::Scroll)]
    }

    fn on_load(&mut self, env: &mut dyn Environment) -> Result<()> {
        self.check(env)
    }

    fn handle_event(&mut self, env: &mut dyn Environment, event: &mut EventState) -> Result<()> {
        if event.kind != EventKind::Scroll || self.frame_pending || self.pending.is_empty() {
            return Ok(());
        }
        env.request_animation_frame(Task::LazyImageFrame);
        self.frame_pending = true;
        Ok(())
    }

    fn run_task(&mut self, env: &mut dyn Environment, task: &Task) -> Result<()> {
        if *task == Task::LazyImageFrame {
            self.frame_pending = false;
            self.check(env)?;
        }
        Ok(())
    }
}
