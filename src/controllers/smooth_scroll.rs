use tracing::trace;

use super::Controller;
use crate::Result;
use crate::config::PageConfig;
use crate::dom::NodeId;
use crate::env::{Environment, ScrollBehavior, ScrollRequest};
use crate::event::{EventKind, EventState, ListenerTarget};

const ANCHOR_SELECTOR: &str = r##"a[href^="#"]"##;
const BUTTON_SELECTOR: &str = "[data-scroll-to]";

/// In-page navigation for `#fragment` anchors and `[data-scroll-to]`
/// buttons, landing the target just below the fixed header.
#[derive(Debug, Clone)]
pub struct SmoothScroll {
    triggers: Vec<NodeId>,
    header_offset: f64,
}

impl SmoothScroll {
    pub(crate) fn install(env: &dyn Environment, config: &PageConfig) -> Result<Option<Self>> {
        let mut triggers = env.query_all(ANCHOR_SELECTOR)?;
        for button in env.query_all(BUTTON_SELECTOR)? {
            if !triggers.contains(&button) {
                triggers.push(button);
            }
        }
        if triggers.is_empty() {
            return Ok(None);
        }
        Ok(Some(Self {
            triggers,
            header_offset: config.scroll_header_offset,
        }))
    }

    fn target_id(env: &dyn Environment, trigger: NodeId) -> Option<String> {
        let raw = env
            .attribute(trigger, "href")
            .filter(|href| href.starts_with('#'))
            .or_else(|| env.attribute(trigger, "data-scroll-to"))?;
        let id = raw.strip_prefix('#').unwrap_or(&raw);
        (!id.is_empty()).then(|| id.to_string())
    }
}

impl Controller for SmoothScroll {
    fn listeners(&self) -> Vec<(ListenerTarget, EventKind)> {
        self.triggers
            .iter()
            .map(|trigger| (ListenerTarget::Node(*trigger), EventKind::Click))
            .collect()
    }

    fn handle_event(&mut self, env: &mut dyn Environment, event: &mut EventState) -> Result<()> {
        let Some(trigger) = event.current_node() else {
            return Ok(());
        };
        if env
            .attribute(trigger, "href")
            .is_some_and(|href| href.starts_with('#'))
        {
            event.prevent_default();
        }

        let Some(id) = Self::target_id(env, trigger) else {
            return Ok(());
        };
        let Some(target) = env.element_by_id(&id) else {
            trace!(id, "scroll target missing");
            return Ok(());
        };

        let top = env.bounding_top(target) + env.scroll_y() - self.header_offset;
        trace!(id, top, "smooth scroll");
        env.scroll_to(ScrollRequest {
            top,
            behavior: ScrollBehavior::Smooth,
        });
        Ok(())
    }
}
