use tracing::{debug, info};

use super::Controller;
use crate::Result;
use crate::config::PageConfig;
use crate::dom::NodeId;
use crate::env::{Environment, Task};
use crate::event::{EventKind, EventState, ListenerTarget};
use crate::validate::{ContactSubmission, FieldValidator, InputKind, InputRule};

const ERROR_CLASS: &str = "error";
const TOAST_STYLE_ID: &str = "formMessageStyle";

const TOAST_CSS: &str = "position: fixed; top: 100px; left: 50%; transform: translateX(-50%); \
background: #10b981; color: white; padding: 1rem 2rem; border-radius: 8px; \
box-shadow: 0 10px 30px rgba(0, 0, 0, 0.2); z-index: 10000; \
animation: slideDown 0.3s ease-out; max-width: 90%; text-align: center;";

const TOAST_KEYFRAMES: &str = "@keyframes slideDown { \
from { opacity: 0; transform: translateX(-50%) translateY(-20px); } \
to { opacity: 1; transform: translateX(-50%) translateY(0); } }";

const TOAST_EXIT_ANIMATION: &str = "slideDown 0.3s ease-out reverse";

/// Client-side checks for `#contactForm`. Nothing is sent anywhere: a valid
/// submission shows a toast, resets the form and is kept in memory.
#[derive(Debug, Clone)]
pub struct ContactForm {
    form: NodeId,
    fields: Vec<NodeId>,
    validator: FieldValidator,
    toast_display_ms: i64,
    toast_exit_ms: i64,
    toasts: Vec<NodeId>,
    accepted: Vec<ContactSubmission>,
}

impl ContactForm {
    pub(crate) fn install(env: &dyn Environment, config: &PageConfig) -> Result<Option<Self>> {
        let Some(form) = env.element_by_id("contactForm") else {
            return Ok(None);
        };
        Ok(Some(Self {
            form,
            fields: env.query_all_within(form, "input, textarea")?,
            validator: FieldValidator::new()?,
            toast_display_ms: config.toast_display_ms,
            toast_exit_ms: config.toast_exit_ms,
            toasts: Vec::new(),
            accepted: Vec::new(),
        }))
    }

    /// Submissions that passed validation and have not been taken yet,
    /// oldest first. The buffer only shrinks through `take_submissions`.
    pub fn accepted_submissions(&self) -> &[ContactSubmission] {
        &self.accepted
    }

    pub fn take_submissions(&mut self) -> Vec<ContactSubmission> {
        std::mem::take(&mut self.accepted)
    }

    /// Toasts currently attached to the page.
    pub fn active_toasts(&self) -> &[NodeId] {
        &self.toasts
    }

    fn read_submission(env: &dyn Environment) -> ContactSubmission {
        let read = |id: &str| {
            env.element_by_id(id)
                .and_then(|node| env.value(node).ok())
                .unwrap_or_default()
        };
        ContactSubmission {
            name: read("name"),
            email: read("email"),
            phone: read("phone"),
            project: read("project"),
            message: read("message"),
        }
    }

    fn on_submit(&mut self, env: &mut dyn Environment, event: &mut EventState) -> Result<()> {
        event.prevent_default();

        let submission = Self::read_submission(env);
        let errors = self.validator.validate_submission(&submission);
        if !errors.is_empty() {
            debug!(failed = errors.len(), "contact form rejected");
            for error in errors {
                if let Some(input) = env.element_by_id(error.field.id()) {
                    show_input_error(env, input, error.message)?;
                }
            }
            return Ok(());
        }

        let text = format!(
            "Thank you, {}! We've received your message. Our team will contact you shortly at {}",
            submission.name, submission.email
        );
        self.show_toast(env, &text)?;
        env.reset_form(self.form)?;
        info!(name = %submission.name, email = %submission.email, "contact form accepted");
        self.accepted.push(submission);
        Ok(())
    }

    fn validate_field(&self, env: &mut dyn Environment, input: NodeId) -> Result<()> {
        let rule = InputRule {
            required: env.has_attribute(input, "required"),
            kind: InputKind::from_type_attr(env.attribute(input, "type").as_deref()),
        };
        let value = env.value(input)?;
        match self.validator.validate_input(rule, &value) {
            Some(message) => show_input_error(env, input, message),
            None => clear_input_error(env, input),
        }
    }

    fn show_toast(&mut self, env: &mut dyn Environment, text: &str) -> Result<()> {
        let toast = env.create_element("div");
        env.set_attribute(toast, "class", "form-message success")?;
        env.set_attribute(toast, "style", TOAST_CSS)?;
        env.set_text_content(toast, text)?;

        if env.element_by_id(TOAST_STYLE_ID).is_none() {
            let style = env.create_element("style");
            env.set_attribute(style, "id", TOAST_STYLE_ID)?;
            env.set_text_content(style, TOAST_KEYFRAMES)?;
            let parent = env
                .head()
                .or_else(|| env.body())
                .unwrap_or_else(|| env.document_node());
            env.append_child(parent, style)?;
        }

        let parent = env.body().unwrap_or_else(|| env.document_node());
        env.append_child(parent, toast)?;
        env.set_timeout(Task::ToastExit(toast), self.toast_display_ms);
        self.toasts.push(toast);
        Ok(())
    }
}

fn show_input_error(env: &mut dyn Environment, input: NodeId, message: &str) -> Result<()> {
    env.add_class(input, ERROR_CLASS)?;
    let Some(group) = env.closest(input, ".form-group")? else {
        return Ok(());
    };
    for existing in env.query_all_within(group, ".error-message")? {
        env.remove(existing)?;
    }

    let error = env.create_element("div");
    env.set_attribute(error, "class", "error-message")?;
    env.set_style(error, "color", "#ef4444")?;
    env.set_style(error, "font-size", "0.85rem")?;
    env.set_style(error, "margin-top", "0.25rem")?;
    env.set_text_content(error, message)?;
    env.append_child(group, error)
}

fn clear_input_error(env: &mut dyn Environment, input: NodeId) -> Result<()> {
    env.remove_class(input, ERROR_CLASS)?;
    if let Some(group) = env.closest(input, ".form-group")? {
        for existing in env.query_all_within(group, ".error-message")? {
            env.remove(existing)?;
        }
    }
    Ok(())
}

impl Controller for ContactForm {
    fn listeners(&self) -> Vec<(ListenerTarget, EventKind)> {
        let mut listeners = vec![(ListenerTarget::Node(self.form), EventKind::Submit)];
        for field in &self.fields {
            listeners.push((ListenerTarget::Node(*field), EventKind::Blur));
            listeners.push((ListenerTarget::Node(*field), EventKind::Input));
        }
        listeners
    }

    fn handle_event(&mut self, env: &mut dyn Environment, event: &mut EventState) -> Result<()> {
        let Some(current) = event.current_node() else {
            return Ok(());
        };
        match event.kind {
            EventKind::Submit if current == self.form => self.on_submit(env, event),
            EventKind::Blur if self.fields.contains(&current) => self.validate_field(env, current),
            EventKind::Input
                if self.fields.contains(&current) && env.has_class(current, ERROR_CLASS) =>
            {
                self.validate_field(env, current)
            }
            _ => Ok(()),
        }
    }

    fn run_task(&mut self, env: &mut dyn Environment, task: &Task) -> Result<()> {
        match task {
            Task::ToastExit(toast) => {
                env.set_style(*toast, "animation", TOAST_EXIT_ANIMATION)?;
                env.set_timeout(Task::ToastRemove(*toast), self.toast_exit_ms);
            }
            Task::ToastRemove(toast) => {
                env.remove(*toast)?;
                self.toasts.retain(|node| node != toast);
                debug!(remaining = self.toasts.len(), "toast removed");
            }
            _ => {}
        }
        Ok(())
    }
}
