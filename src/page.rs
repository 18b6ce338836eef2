use tracing::{debug, info, trace};

use crate::config::PageConfig;
use crate::controllers::{
    BackToTop, ContactForm, Controller, HeaderScroll, LazyImages, LogoHome, MobileMenu,
    RevealOnScroll, SmoothScroll, StatsCounter,
};
use crate::dom::NodeId;
use crate::env::{Environment, Host};
use crate::event::{ControllerKind, EventKind, EventState, ListenerStore, ListenerTarget, SubscriptionId};
use crate::host::MemoryHost;
use crate::validate::ContactSubmission;
use crate::{Error, Result};

#[derive(Debug, Clone, Default)]
struct Controllers {
    reveal: Option<RevealOnScroll>,
    header: Option<HeaderScroll>,
    menu: Option<MobileMenu>,
    smooth_scroll: Option<SmoothScroll>,
    contact_form: Option<ContactForm>,
    back_to_top: Option<BackToTop>,
    stats: Option<StatsCounter>,
    logo_home: Option<LogoHome>,
    lazy_images: Option<LazyImages>,
}

impl Controllers {
    fn get_mut(&mut self, kind: ControllerKind) -> Option<&mut dyn Controller> {
        fn erase<C: Controller>(slot: &mut Option<C>) -> Option<&mut dyn Controller> {
            slot.as_mut().map(|controller| controller as &mut dyn Controller)
        }
        match kind {
            ControllerKind::Reveal => erase(&mut self.reveal),
            ControllerKind::Header => erase(&mut self.header),
            ControllerKind::Menu => erase(&mut self.menu),
            ControllerKind::SmoothScroll => erase(&mut self.smooth_scroll),
            ControllerKind::ContactForm => erase(&mut self.contact_form),
            ControllerKind::BackToTop => erase(&mut self.back_to_top),
            ControllerKind::Stats => erase(&mut self.stats),
            ControllerKind::LogoHome => erase(&mut self.logo_home),
            ControllerKind::LazyImages => erase(&mut self.lazy_images),
        }
    }

    fn contains(&self, kind: ControllerKind) -> bool {
        match kind {
            ControllerKind::Reveal => self.reveal.is_some(),
            ControllerKind::Header => self.header.is_some(),
            ControllerKind::Menu => self.menu.is_some(),
            ControllerKind::SmoothScroll => self.smooth_scroll.is_some(),
            ControllerKind::ContactForm => self.contact_form.is_some(),
            ControllerKind::BackToTop => self.back_to_top.is_some(),
            ControllerKind::Stats => self.stats.is_some(),
            ControllerKind::LogoHome => self.logo_home.is_some(),
            ControllerKind::LazyImages => self.lazy_images.is_some(),
        }
    }

    fn take(&mut self, kind: ControllerKind) -> bool {
        match kind {
            ControllerKind::Reveal => self.reveal.take().is_some(),
            ControllerKind::Header => self.header.take().is_some(),
            ControllerKind::Menu => self.menu.take().is_some(),
            ControllerKind::SmoothScroll => self.smooth_scroll.take().is_some(),
            ControllerKind::ContactForm => self.contact_form.take().is_some(),
            ControllerKind::BackToTop => self.back_to_top.take().is_some(),
            ControllerKind::Stats => self.stats.take().is_some(),
            ControllerKind::LogoHome => self.logo_home.take().is_some(),
            ControllerKind::LazyImages => self.lazy_images.take().is_some(),
        }
    }
}

/// A loaded page: the host document plus every behavior that found its
/// elements. Drives events and virtual time the way a browser tab would.
#[derive(Debug)]
pub struct Page<H: Host = MemoryHost> {
    host: H,
    config: PageConfig,
    listeners: ListenerStore,
    controllers: Controllers,
}

impl Page<MemoryHost> {
    pub fn from_html(html: &str) -> Result<Self> {
        Self::new(MemoryHost::from_html(html)?)
    }

    /// Builds the host, lets `prepare` place elements and size the viewport,
    /// then loads the page. Load-time checks (reveal, stats, lazy images)
    /// see the prepared layout.
    pub fn from_html_with(
        html: &str,
        config: PageConfig,
        prepare: impl FnOnce(&mut MemoryHost) -> Result<()>,
    ) -> Result<Self> {
        let mut host = MemoryHost::from_html(html)?;
        prepare(&mut host)?;
        Self::with_config(host, config)
    }
}

impl<H: Host> Page<H> {
    pub fn new(host: H) -> Result<Self> {
        Self::with_config(host, PageConfig::default())
    }

    pub fn with_config(host: H, config: PageConfig) -> Result<Self> {
        config.validate()?;
        let mut page = Self {
            host,
            config,
            listeners: ListenerStore::default(),
            controllers: Controllers::default(),
        };
        page.initialize()?;
        Ok(page)
    }

    fn initialize(&mut self) -> Result<()> {
        for line in &self.config.banner {
            info!("{line}");
        }

        self.controllers.reveal = RevealOnScroll::install(&self.host, &self.config)?;
        self.activate(ControllerKind::Reveal)?;
        self.controllers.header = HeaderScroll::install(&self.host, &self.config);
        self.activate(ControllerKind::Header)?;
        self.controllers.menu = MobileMenu::install(&mut self.host)?;
        self.activate(ControllerKind::Menu)?;
        self.controllers.smooth_scroll = SmoothScroll::install(&self.host, &self.config)?;
        self.activate(ControllerKind::SmoothScroll)?;
        self.controllers.contact_form = ContactForm::install(&self.host, &self.config)?;
        self.activate(ControllerKind::ContactForm)?;
        self.controllers.back_to_top = BackToTop::install(&self.host, &self.config);
        self.activate(ControllerKind::BackToTop)?;
        self.controllers.stats = StatsCounter::install(&self.host, &self.config)?;
        self.activate(ControllerKind::Stats)?;
        self.controllers.logo_home = LogoHome::install(&self.host);
        self.activate(ControllerKind::LogoHome)?;
        self.controllers.lazy_images = LazyImages::install(&self.host)?;
        self.activate(ControllerKind::LazyImages)?;

        debug!(listeners = self.listeners.len(), "page initialized");
        Ok(())
    }

    fn activate(&mut self, kind: ControllerKind) -> Result<()> {
        let Some(controller) = self.controllers.get_mut(kind) else {
            debug!(controller = ?kind, "behavior skipped: required elements missing");
            return Ok(());
        };
        for (target, event) in controller.listeners() {
            self.listeners.add(target, event, kind);
        }
        controller.on_load(&mut self.host)?;
        self.flush_programmatic_scroll()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    pub fn now_ms(&self) -> i64 {
        self.host.now_ms()
    }

    pub fn header(&self) -> Option<&HeaderScroll> {
        self.controllers.header.as_ref()
    }

    pub fn reveal(&self) -> Option<&RevealOnScroll> {
        self.controllers.reveal.as_ref()
    }

    pub fn stats(&self) -> Option<&StatsCounter> {
        self.controllers.stats.as_ref()
    }

    pub fn menu(&self) -> Option<&MobileMenu> {
        self.controllers.menu.as_ref()
    }

    pub fn contact_form(&self) -> Option<&ContactForm> {
        self.controllers.contact_form.as_ref()
    }

    /// Hands accepted submissions to the caller and clears the form's buffer.
    pub fn take_submissions(&mut self) -> Vec<ContactSubmission> {
        self.controllers
            .contact_form
            .as_mut()
            .map(ContactForm::take_submissions)
            .unwrap_or_default()
    }

    pub fn back_to_top(&self) -> Option<&BackToTop> {
        self.controllers.back_to_top.as_ref()
    }

    pub fn lazy_images(&self) -> Option<&LazyImages> {
        self.controllers.lazy_images.as_ref()
    }

    pub fn is_active(&self, kind: ControllerKind) -> bool {
        self.controllers.contains(kind)
    }

    pub fn subscriptions(&self, kind: ControllerKind) -> Vec<SubscriptionId> {
        self.listeners.subscriptions_of(kind)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.remove(id)
    }

    /// Detaches every listener of `kind` and drops its state. Tasks it left
    /// in the queue run as no-ops. Returns how many listeners were removed.
    pub fn teardown(&mut self, kind: ControllerKind) -> usize {
        let removed = self.listeners.remove_controller(kind);
        if self.controllers.take(kind) {
            debug!(controller = ?kind, listeners = removed, "behavior torn down");
        }
        removed
    }

    // ---- user input -------------------------------------------------------

    /// Moves the viewport as a user scroll would and fires `scroll` on the
    /// window.
    pub fn scroll_to(&mut self, scroll_y: f64) -> Result<()> {
        self.host.set_scroll_y(scroll_y);
        self.dispatch_event(EventState::new(EventKind::Scroll, ListenerTarget::Window))?;
        Ok(())
    }

    pub fn click(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let event = self.dispatch_event(EventState::new(
            EventKind::Click,
            ListenerTarget::Node(target),
        ))?;
        if event.default_prevented {
            return Ok(());
        }

        let document = self.host.document();
        if document.tag_name(target).is_some_and(|tag| tag.eq_ignore_ascii_case("a")) {
            if let Some(href) = document.attr(target, "href") {
                self.host.record_navigation(&href);
            }
        }

        if self.is_submit_control(target) {
            if let Some(form) = self.form_owner(target)? {
                self.dispatch_event(EventState::new(
                    EventKind::Submit,
                    ListenerTarget::Node(form),
                ))?;
            }
        }
        Ok(())
    }

    pub fn submit(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        if let Some(form) = self.form_owner(target)? {
            self.dispatch_event(EventState::new(
                EventKind::Submit,
                ListenerTarget::Node(form),
            ))?;
        }
        Ok(())
    }

    pub fn focus(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        if self.host.active_element() == Some(target) {
            return Ok(());
        }
        if let Some(current) = self.host.active_element() {
            self.blur_node(current)?;
        }
        self.host.set_active_element(Some(target));
        Ok(())
    }

    /// Blurs the element if it has focus; otherwise nothing happens.
    pub fn blur(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.blur_node(target)
    }

    pub fn type_text(&mut self, selector: &str, text: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let tag = self
            .host
            .document()
            .tag_name(target)
            .unwrap_or_default()
            .to_ascii_lowercase();
        if tag != "input" && tag != "textarea" {
            return Err(Error::TypeMismatch {
                selector: selector.to_string(),
                expected: "input or textarea".into(),
                actual: tag,
            });
        }

        self.host.set_value(target, text)?;
        self.dispatch_event(EventState::new(
            EventKind::Input,
            ListenerTarget::Node(target),
        ))?;
        Ok(())
    }

    /// Fires `keydown` at the focused element, or at the document when
    /// nothing has focus.
    pub fn press_key(&mut self, key: &str) -> Result<()> {
        let target = self
            .host
            .active_element()
            .unwrap_or_else(|| self.host.document_node());
        self.dispatch_event(
            EventState::new(EventKind::Keydown, ListenerTarget::Node(target)).with_key(key),
        )?;
        Ok(())
    }

    pub fn dispatch(&mut self, selector: &str, kind: EventKind) -> Result<EventState> {
        let target = self.select_one(selector)?;
        self.dispatch_event(EventState::new(kind, ListenerTarget::Node(target)))
    }

    // ---- virtual time -----------------------------------------------------

    pub fn advance_time(&mut self, delta_ms: i64) -> Result<()> {
        if delta_ms < 0 {
            return Err(Error::InvalidArgument(
                "advance_time requires non-negative milliseconds".into(),
            ));
        }
        let target = self.now_ms().saturating_add(delta_ms);
        self.advance_time_to(target)
    }

    pub fn advance_time_to(&mut self, target_ms: i64) -> Result<()> {
        let from = self.now_ms();
        if target_ms < from {
            return Err(Error::InvalidArgument(format!(
                "advance_time_to requires target >= now_ms (target={target_ms}, now_ms={from})"
            )));
        }
        let ran = self.run_tasks(Some(target_ms))?;
        self.host.set_now_ms(target_ms);
        trace!(from, to = target_ms, ran, "advance time");
        Ok(())
    }

    /// Advances to the next animation frame boundary.
    pub fn next_frame(&mut self) -> Result<()> {
        let at = self.host.next_frame_at();
        self.advance_time_to(at)
    }

    /// Runs every queued task, including ones scheduled while flushing,
    /// moving the clock forward as needed.
    pub fn flush(&mut self) -> Result<()> {
        let from = self.now_ms();
        let ran = self.run_tasks(None)?;
        trace!(from, to = self.now_ms(), ran, "flush");
        Ok(())
    }

    fn run_tasks(&mut self, due_limit: Option<i64>) -> Result<usize> {
        let limit = self.host.task_step_limit();
        let mut steps = 0usize;
        while let Some(pending) = self.host.pop_due_task(due_limit) {
            steps += 1;
            if steps > limit {
                return Err(Error::TaskLimit {
                    limit,
                    now_ms: self.now_ms(),
                });
            }
            if pending.due_at > self.now_ms() {
                self.host.set_now_ms(pending.due_at);
            }

            let owner = pending.task.owner();
            let Some(controller) = self.controllers.get_mut(owner) else {
                trace!(task = ?pending.task, "task dropped: owner torn down");
                continue;
            };
            controller.run_task(&mut self.host, &pending.task)?;
            self.flush_programmatic_scroll()?;
        }
        Ok(steps)
    }

    // ---- event plumbing ---------------------------------------------------

    fn dispatch_event(&mut self, mut event: EventState) -> Result<EventState> {
        let path = self.propagation_path(event.target, event.kind);
        for current in path {
            event.current_target = current;
            for listener in self.listeners.get(current, event.kind) {
                let Some(controller) = self.controllers.get_mut(listener.controller) else {
                    continue;
                };
                controller.handle_event(&mut self.host, &mut event)?;
            }
            if event.propagation_stopped {
                break;
            }
        }
        trace!(
            kind = event.kind.as_str(),
            default_prevented = event.default_prevented,
            propagation_stopped = event.propagation_stopped,
            "event dispatched"
        );
        self.flush_programmatic_scroll()?;
        Ok(event)
    }

    fn propagation_path(&self, target: ListenerTarget, kind: EventKind) -> Vec<ListenerTarget> {
        let ListenerTarget::Node(node) = target else {
            return vec![target];
        };
        if !kind.bubbles() {
            return vec![target];
        }
        let document = self.host.document();
        let mut path = Vec::new();
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            path.push(ListenerTarget::Node(current));
            cursor = document.parent(current);
        }
        path
    }

    // A programmatic scroll that moved the viewport fires `scroll` like a
    // user scroll would.
    fn flush_programmatic_scroll(&mut self) -> Result<()> {
        if self.host.take_scroll_pending() {
            self.dispatch_event(EventState::new(EventKind::Scroll, ListenerTarget::Window))?;
        }
        Ok(())
    }

    fn blur_node(&mut self, node: NodeId) -> Result<()> {
        if self.host.active_element() != Some(node) {
            return Ok(());
        }
        self.dispatch_event(EventState::new(EventKind::Blur, ListenerTarget::Node(node)))?;
        self.host.set_active_element(None);
        Ok(())
    }

    fn is_submit_control(&self, node: NodeId) -> bool {
        let document = self.host.document();
        let kind = document
            .attr(node, "type")
            .map(|value| value.to_ascii_lowercase());
        match document.tag_name(node).map(str::to_ascii_lowercase).as_deref() {
            Some("button") => kind.is_none_or(|kind| kind == "submit"),
            Some("input") => kind.is_some_and(|kind| kind == "submit"),
            _ => false,
        }
    }

    fn form_owner(&self, node: NodeId) -> Result<Option<NodeId>> {
        self.host.document().closest(node, "form")
    }

    // ---- assertions -------------------------------------------------------

    pub fn assert_text(&self, selector: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.host.text_content(target);
        self.check(selector, target, expected, actual)
    }

    pub fn assert_value(&self, selector: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.host.value(target)?;
        self.check(selector, target, expected, actual)
    }

    pub fn assert_class(&self, selector: &str, class_name: &str, expected: bool) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.host.has_class(target, class_name);
        self.check(
            selector,
            target,
            &format!("{class_name}={expected}"),
            format!("{class_name}={actual}"),
        )
    }

    /// `None` asserts the attribute is absent.
    pub fn assert_attr(&self, selector: &str, name: &str, expected: Option<&str>) -> Result<()> {
        let target = self.select_one(selector)?;
        let describe = |value: Option<&str>| match value {
            Some(value) => format!("{name}=\"{value}\""),
            None => format!("no {name}"),
        };
        let actual = self.host.attribute(target, name);
        self.check(selector, target, &describe(expected), describe(actual.as_deref()))
    }

    pub fn assert_style(&self, selector: &str, property: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.host.document().style(target, property);
        self.check(selector, target, expected, actual)
    }

    pub fn assert_exists(&self, selector: &str) -> Result<()> {
        let _ = self.select_one(selector)?;
        Ok(())
    }

    pub fn dump_dom(&self, selector: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        Ok(self.host.document().dump_node(target))
    }

    fn check(&self, selector: &str, target: NodeId, expected: &str, actual: String) -> Result<()> {
        if actual == expected {
            return Ok(());
        }
        Err(Error::AssertionFailed {
            selector: selector.to_string(),
            expected: expected.to_string(),
            actual,
            dom_snippet: truncate_chars(&self.host.document().dump_node(target), 200),
        })
    }

    fn select_one(&self, selector: &str) -> Result<NodeId> {
        self.host
            .document()
            .query_selector(selector)?
            .ok_or_else(|| Error::SelectorNotFound(selector.to_string()))
    }
}

fn truncate_chars(value: &str, max_chars: usize) -> String {
    let mut chars = value.chars();
    let mut out = chars.by_ref().take(max_chars).collect::<String>();
    if chars.next().is_some() {
        out.push_str("...");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_elements_leave_behaviors_inactive() -> Result<()> {
        let mut page = Page::from_html("<body><p>plain</p></body>")?;
        for kind in [
            ControllerKind::Reveal,
            ControllerKind::Header,
            ControllerKind::Menu,
            ControllerKind::SmoothScroll,
            ControllerKind::ContactForm,
            ControllerKind::BackToTop,
            ControllerKind::Stats,
            ControllerKind::LogoHome,
            ControllerKind::LazyImages,
        ] {
            assert!(!page.is_active(kind), "{kind:?} should be inactive");
        }
        page.scroll_to(500.0)?;
        page.flush()?;
        page.assert_text("p", "plain")?;
        Ok(())
    }

    #[test]
    fn negative_time_is_rejected() -> Result<()> {
        let mut page = Page::from_html("<body></body>")?;
        assert!(matches!(page.advance_time(-1), Err(Error::InvalidArgument(_))));
        page.advance_time(40)?;
        assert!(matches!(page.advance_time_to(10), Err(Error::InvalidArgument(_))));
        assert_eq!(page.now_ms(), 40);
        Ok(())
    }

    #[test]
    fn invalid_config_fails_construction() -> Result<()> {
        let host = MemoryHost::from_html("<body></body>")?;
        let config = PageConfig {
            counter_frame_ms: 0,
            ..PageConfig::default()
        };
        assert!(matches!(
            Page::with_config(host, config),
            Err(Error::InvalidConfig(_))
        ));
        Ok(())
    }

    #[test]
    fn type_text_rejects_non_text_controls() -> Result<()> {
        let mut page = Page::from_html("<body><div id='box'></div></body>")?;
        let err = page.type_text("#box", "x").expect_err("div is not typeable");
        assert_eq!(
            err,
            Error::TypeMismatch {
                selector: "#box".into(),
                expected: "input or textarea".into(),
                actual: "div".into(),
            }
        );
        Ok(())
    }

    #[test]
    fn unprevented_anchor_click_records_navigation() -> Result<()> {
        let mut page = Page::from_html("<body><a id='out' href='/about'>About</a></body>")?;
        page.click("#out")?;
        assert_eq!(page.host().navigations(), ["/about".to_string()]);
        Ok(())
    }

    #[test]
    fn assertion_failure_carries_snippet() -> Result<()> {
        let page = Page::from_html("<body><p id='x'>one</p></body>")?;
        match page.assert_text("#x", "two") {
            Err(Error::AssertionFailed {
                actual, dom_snippet, ..
            }) => {
                assert_eq!(actual, "one");
                assert!(dom_snippet.contains("<p"));
            }
            other => panic!("unexpected: {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn truncation_marks_cut_text() {
        assert_eq!(truncate_chars("abc", 5), "abc");
        assert_eq!(truncate_chars("abcdef", 3), "abc...");
    }
}
