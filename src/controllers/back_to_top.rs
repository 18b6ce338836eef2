use tracing::debug;

use super::Controller;
use crate::Result;
use crate::config::PageConfig;
use crate::dom::NodeId;
use crate::env::{Environment, ScrollBehavior, ScrollRequest};
use crate::event::{EventKind, EventState, ListenerTarget};
use crate::rate_limit::Throttle;

const VISIBLE_CLASS: &str = "visible";

#[derive(Debug, Clone)]
pub struct BackToTop {
    button: NodeId,
    offset: f64,
    throttle: Throttle,
    visible: bool,
}

impl BackToTop {
    pub(crate) fn install(env: &dyn Environment, config: &PageConfig) -> Option<Self> {
        let button = env.element_by_id("backToTop")?;
        Some(Self {
            button,
            offset: config.back_to_top_offset,
            throttle: Throttle::new(config.back_to_top_throttle_ms),
            visible: env.has_class(button, VISIBLE_CLASS),
        })
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

impl Controller for BackToTop {
    fn listeners(&self) -> Vec<(ListenerTarget, EventKind)> {
        vec![
            (ListenerTarget::Window, EventKind::Scroll),
            (ListenerTarget::Node(self.button), EventKind::Click),
        ]
    }

    fn handle_event(&mut self, env: &mut dyn Environment, event: &mut EventState) -> Result<()> {
        match event.kind {
            EventKind::Scroll => {
                if !self.throttle.try_acquire(env.now_ms()) {
                    return Ok(());
                }
                let visible = env.scroll_y() > self.offset;
                env.toggle_class(self.button, VISIBLE_CLASS, visible)?;
                if visible != self.visible {
                    debug!(visible, "back-to-top visibility changed");
                    self.visible = visible;
                }
            }
            EventKind::Click => env.scroll_to(ScrollRequest {
                top: 0.0,
                behavior: ScrollBehavior::Smooth,
            }),
            _ => {}
        }
        Ok(())
    }
}
