use super::Controller;
use crate::Result;
use crate::dom::NodeId;
use crate::env::{Environment, ScrollBehavior, ScrollRequest};
use crate::event::{EventKind, EventState, ListenerTarget};

/// Clicking the logo scrolls back to the top of the page.
#[derive(Debug, Clone)]
pub struct LogoHome {
    logo: NodeId,
}

impl LogoHome {
    pub(crate) fn install(env: &dyn Environment) -> Option<Self> {
        env.element_by_id("logoHome").map(|logo| Self { logo })
    }
}

impl Controller for LogoHome {
    fn listeners(&self) -> Vec<(ListenerTarget, EventKind)> {
        vec![(ListenerTarget::Node(self.logo), EventKind::Click)]
    }

    fn handle_event(&mut self, env: &mut dyn Environment, _event: &mut EventState) -> Result<()> {
        env.scroll_to(ScrollRequest {
            top: 0.0,
            behavior: ScrollBehavior::Smooth,
        });
        Ok(())
    }
}
