//! One controller per page behavior. Each owns its elements and state and
//! only talks to the page through [`Environment`].

mod back_to_top;
mod contact_form;
mod header;
mod lazy_images;
mod logo_home;
mod menu;
mod reveal;
mod smooth_scroll;
mod stats;

pub use back_to_top::BackToTop;
pub use contact_form::ContactForm;
pub use header::HeaderScroll;
pub use lazy_images::LazyImages;
pub use logo_home::LogoHome;
pub use menu::MobileMenu;
pub use reveal::RevealOnScroll;
pub use smooth_scroll::SmoothScroll;
pub use stats::{CounterPhase, StatsCounter};

use crate::Result;
use crate::env::{Environment, Task};
use crate::event::{EventKind, EventState, ListenerTarget};

pub(crate) trait Controller {
    /// Targets and event kinds to subscribe, in attachment order.
    fn listeners(&self) -> Vec<(ListenerTarget, EventKind)>;

    /// Runs once right after the listeners are attached.
    fn on_load(&mut self, _env: &mut dyn Environment) -> Result<()> {
        Ok(())
    }

    fn handle_event(&mut self, env: &mut dyn Environment, event: &mut EventState) -> Result<()>;

    fn run_task(&mut self, _env: &mut dyn Environment, _task: &Task) -> Result<()> {
        Ok(())
    }
}
