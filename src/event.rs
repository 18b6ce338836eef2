use std::collections::HashMap;

use crate::dom::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Scroll,
    Click,
    Keydown,
    Submit,
    Blur,
    Input,
}

impl EventKind {
    pub fn bubbles(self) -> bool {
        !matches!(self, Self::Blur | Self::Scroll)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scroll => "scroll",
            Self::Click => "click",
            Self::Keydown => "keydown",
            Self::Submit => "submit",
            Self::Blur => "blur",
            Self::Input => "input",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerTarget {
    Window,
    Node(NodeId),
}

/// Which controller a listener belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControllerKind {
    Reveal,
    Header,
    Menu,
    SmoothScroll,
    ContactForm,
    BackToTop,
    Stats,
    LogoHome,
    LazyImages,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

#[derive(Debug, Clone)]
pub struct EventState {
    pub kind: EventKind,
    pub target: ListenerTarget,
    pub current_target: ListenerTarget,
    pub key: Option<String>,
    pub default_prevented: bool,
    pub propagation_stopped: bool,
}

impl EventState {
    pub fn new(kind: EventKind, target: ListenerTarget) -> Self {
        Self {
            kind,
            target,
            current_target: target,
            key: None,
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    pub fn with_key(mut self, key: &str) -> Self {
        self.key = Some(key.to_string());
        self
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn target_node(&self) -> Option<NodeId> {
        match self.target {
            ListenerTarget::Node(node) => Some(node),
            ListenerTarget::Window => None,
        }
    }

    pub fn current_node(&self) -> Option<NodeId> {
        match self.current_target {
            ListenerTarget::Node(node) => Some(node),
            ListenerTarget::Window => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Listener {
    pub id: SubscriptionId,
    pub controller: ControllerKind,
}

/// Listener registry keyed by target and event kind. Listeners on one key
/// fire in attachment order.
#[derive(Debug, Clone, Default)]
pub struct ListenerStore {
    map: HashMap<(ListenerTarget, EventKind), Vec<Listener>>,
    next_id: u64,
}

impl ListenerStore {
    pub fn add(
        &mut self,
        target: ListenerTarget,
        kind: EventKind,
        controller: ControllerKind,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.map
            .entry((target, kind))
            .or_default()
            .push(Listener { id, controller });
        id
    }

    pub fn remove(&mut self, id: SubscriptionId) -> bool {
        let mut removed = false;
        self.map.retain(|_, listeners| {
            let before = listeners.len();
            listeners.retain(|listener| listener.id != id);
            removed |= before != listeners.len();
            !listeners.is_empty()
        });
        removed
    }

    pub fn remove_controller(&mut self, controller: ControllerKind) -> usize {
        let mut removed = 0usize;
        self.map.retain(|_, listeners| {
            let before = listeners.len();
            listeners.retain(|listener| listener.controller != controller);
            removed += before - listeners.len();
            !listeners.is_empty()
        });
        removed
    }

    pub fn get(&self, target: ListenerTarget, kind: EventKind) -> Vec<Listener> {
        self.map.get(&(target, kind)).cloned().unwrap_or_default()
    }

    pub fn subscriptions_of(&self, controller: ControllerKind) -> Vec<SubscriptionId> {
        let mut ids = self
            .map
            .values()
            .flatten()
            .filter(|listener| listener.controller == controller)
            .map(|listener| listener.id)
            .collect::<Vec<_>>();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.map.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listeners_keep_attachment_order() {
        let mut store = ListenerStore::default();
        store.add(ListenerTarget::Window, EventKind::Scroll, ControllerKind::Reveal);
        store.add(ListenerTarget::Window, EventKind::Scroll, ControllerKind::Header);
        store.add(ListenerTarget::Window, EventKind::Scroll, ControllerKind::Stats);
        let order = store
            .get(ListenerTarget::Window, EventKind::Scroll)
            .into_iter()
            .map(|listener| listener.controller)
            .collect::<Vec<_>>();
        assert_eq!(
            order,
            vec![
                ControllerKind::Reveal,
                ControllerKind::Header,
                ControllerKind::Stats
            ]
        );
    }

    #[test]
    fn remove_by_id_and_by_controller() {
        let mut store = ListenerStore::default();
        let node = ListenerTarget::Node(NodeId(3));
        let a = store.add(node, EventKind::Click, ControllerKind::Menu);
        store.add(ListenerTarget::Node(NodeId(0)), EventKind::Click, ControllerKind::Menu);
        store.add(node, EventKind::Click, ControllerKind::SmoothScroll);

        assert!(store.remove(a));
        assert!(!store.remove(a));
        assert_eq!(store.len(), 2);
        assert_eq!(store.remove_controller(ControllerKind::Menu), 1);
        assert_eq!(store.subscriptions_of(ControllerKind::Menu), Vec::new());
        assert_eq!(store.subscriptions_of(ControllerKind::SmoothScroll).len(), 1);
        store.remove_controller(ControllerKind::SmoothScroll);
        assert!(store.is_empty());
    }

    #[test]
    fn blur_and_scroll_do_not_bubble() {
        assert!(!EventKind::Blur.bubbles());
        assert!(!EventKind::Scroll.bubbles());
        assert!(EventKind::Click.bubbles());
        assert_eq!(EventKind::Keydown.as_str(), "keydown");
    }
}
