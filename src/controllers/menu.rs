use tracing::debug;

use super::Controller;
use crate::Result;
use crate::dom::NodeId;
use crate::env::Environment;
use crate::event::{EventKind, EventState, ListenerTarget};

const ACTIVE_CLASS: &str = "active";

/// Mobile navigation panel behind `#mobileMenuToggle`. The open state is
/// mirrored into classes, ARIA attributes and the body scroll lock.
#[derive(Debug, Clone)]
pub struct MobileMenu {
    toggle: NodeId,
    nav: NodeId,
    links: Vec<NodeId>,
    document: NodeId,
    open: bool,
}

impl MobileMenu {
    pub(crate) fn install(env: &mut dyn Environment) -> Result<Option<Self>> {
        let (Some(toggle), Some(nav)) = (
            env.element_by_id("mobileMenuToggle"),
            env.element_by_id("mainNav"),
        ) else {
            return Ok(None);
        };

        env.set_attribute(nav, "role", "navigation")?;
        env.set_attribute(nav, "aria-label", "Main menu")?;
        env.set_attribute(nav, "aria-hidden", "true")?;
        env.set_attribute(toggle, "aria-expanded", "false")?;

        Ok(Some(Self {
            toggle,
            nav,
            links: env.query_all_within(nav, "a")?,
            document: env.document_node(),
            open: false,
        }))
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    fn set_open(&mut self, env: &mut dyn Environment, open: bool) -> Result<()> {
        env.toggle_class(self.toggle, ACTIVE_CLASS, open)?;
        env.toggle_class(self.nav, ACTIVE_CLASS, open)?;
        if let Some(body) = env.body() {
            env.set_style(body, "overflow", if open { "hidden" } else { "" })?;
        }
        env.set_attribute(self.toggle, "aria-expanded", if open { "true" } else { "false" })?;
        env.set_attribute(self.nav, "aria-hidden", if open { "false" } else { "true" })?;
        if self.open != open {
            debug!(open, "mobile menu state changed");
        }
        self.open = open;
        Ok(())
    }

    fn on_click(&mut self, env: &mut dyn Environment, event: &mut EventState) -> Result<()> {
        let Some(current) = event.current_node() else {
            return Ok(());
        };

        if current == self.toggle {
            // Keep the document listener from treating this as an outside click.
            event.stop_propagation();
            return self.set_open(env, !self.open);
        }

        if self.links.contains(&current) {
            return self.set_open(env, false);
        }

        if current == self.document && self.open {
            let outside = event
                .target_node()
                .is_none_or(|target| !env.contains(self.nav, target) && !env.contains(self.toggle, target));
            if outside {
                self.set_open(env, false)?;
            }
        }
        Ok(())
    }
}

impl Controller for MobileMenu {
    fn listeners(&self) -> Vec<(ListenerTarget, EventKind)> {
        let mut listeners = vec![(ListenerTarget::Node(self.toggle), EventKind::Click)];
        listeners.extend(
            self.links
                .iter()
                .map(|link| (ListenerTarget::Node(*link), EventKind::Click)),
        );
        listeners.push((ListenerTarget::Node(self.document), EventKind::Click));
        listeners.push((ListenerTarget::Node(self.document), EventKind::Keydown));
        listeners
    }

    fn handle_event(&mut self, env: &mut dyn Environment, event: &mut EventState) -> Result<()> {
        match event.kind {
            EventKind::Click => self.on_click(env, event),
            EventKind::Keydown if event.key.as_deref() == Some("Escape") && self.open => {
                self.set_open(env, false)?;
                env.focus(self.toggle);
                Ok(())
            }
            _ => Ok(()),
        }
    }
}
