use tracing::{debug, warn};

use super::Controller;
use crate::Result;
use crate::config::PageConfig;
use crate::dom::NodeId;
use crate::env::{Environment, Task};
use crate::event::{EventKind, EventState, ListenerTarget};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterPhase {
    Idle,
    Animating,
    Done,
}

#[derive(Debug, Clone)]
struct Counter {
    number: NodeId,
    target: i64,
    increment: f64,
    current: f64,
    finished: bool,
}

impl Counter {
    fn suffix(&self) -> &'static str {
        if self.target == 100 { "%" } else { "+" }
    }

    fn step(&mut self, env: &mut dyn Environment) -> Result<()> {
        self.current += self.increment;
        let text = if self.current < self.target as f64 {
            format!("{}{}", self.current.floor() as i64, self.suffix())
        } else {
            self.finished = true;
            format!("{}{}", self.target, self.suffix())
        };
        env.set_text_content(self.number, &text)
    }
}

/// One-shot count-up for the `.stats` section: idle until the section is
/// about to enter the viewport, then every counter runs from 0 to its
/// `data-target` over a fixed duration.
#[derive(Debug, Clone)]
pub struct StatsCounter {
    section: NodeId,
    counters: Vec<Counter>,
    trigger_offset: f64,
    phase: CounterPhase,
    frames: u64,
}

impl StatsCounter {
    pub(crate) fn install(env: &dyn Environment, config: &PageConfig) -> Result<Option<Self>> {
        let Some(section) = env.query_all(".stats")?.into_iter().next() else {
            return Ok(None);
        };

        let steps = config.counter_steps();
        let mut counters = Vec::new();
        for item in env.query_all(".stat-item")? {
            let raw = env.attribute(item, "data-target").unwrap_or_default();
            let Some(target) = parse_leading_int(&raw) else {
                warn!(data_target = %raw, "stat item skipped: target is not a number");
                continue;
            };
            let Some(number) = env.query_all_within(item, ".stat-number")?.into_iter().next() else {
                warn!(target, "stat item skipped: missing .stat-number");
                continue;
            };
            counters.push(Counter {
                number,
                target,
                increment: target as f64 / steps,
                current: 0.0,
                finished: false,
            });
        }

        Ok(Some(Self {
            section,
            counters,
            trigger_offset: config.stats_trigger_offset,
            phase: CounterPhase::Idle,
            frames: 0,
        }))
    }

    pub fn phase(&self) -> CounterPhase {
        self.phase
    }

    /// Animation frames run since the trigger, excluding the synchronous
    /// first step.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    fn check_trigger(&mut self, env: &mut dyn Environment) -> Result<()> {
        if self.phase != CounterPhase::Idle {
            return Ok(());
        }
        let top = env.bounding_top(self.section);
        if top >= env.viewport_height() - self.trigger_offset {
            return Ok(());
        }

        self.phase = CounterPhase::Animating;
        debug!(counters = self.counters.len(), "stats counter started");
        self.step_all(env)
    }

    fn step_all(&mut self, env: &mut dyn Environment) -> Result<()> {
        for counter in self.counters.iter_mut().filter(|counter| !counter.finished) {
            counter.step(env)?;
        }
        if self.counters.iter().all(|counter| counter.finished) {
            self.phase = CounterPhase::Done;
            debug!(frames = self.frames, "stats counter finished");
        } else {
            env.request_animation_frame(Task::CounterFrame);
        }
        Ok(())
    }
}

impl Controller for StatsCounter {
    fn listeners(&self) -> Vec<(ListenerTarget, EventKind)> {
        vec![(ListenerTarget::Window, EventKind::Scroll)]
    }

    fn on_load(&mut self, env: &mut dyn Environment) -> Result<()> {
        self.check_trigger(env)
    }

    fn handle_event(&mut self, env: &mut dyn Environment, event: &mut EventState) -> Result<()> {
        if event.kind == EventKind::Scroll {
            self.check_trigger(env)?;
        }
        Ok(())
    }

    fn run_task(&mut self, env: &mut dyn Environment, task: &Task) -> Result<()> {
        if *task == Task::CounterFrame && self.phase == CounterPhase::Animating {
            self.frames += 1;
            self.step_all(env)?;
        }
        Ok(())
    }
}

/// Integer prefix of `raw`, the way `parseInt(raw, 10)` reads it: leading
/// whitespace and one sign allowed, trailing garbage ignored.
fn parse_leading_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let value = digits[..end].parse::<i64>().ok()?;
    Some(if negative { -value } else { value })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_int_follows_parse_int() {
        assert_eq!(parse_leading_int("500"), Some(500));
        assert_eq!(parse_leading_int(" 16+"), Some(16));
        assert_eq!(parse_leading_int("-3"), Some(-3));
        assert_eq!(parse_leading_int("98.6"), Some(98));
        assert_eq!(parse_leading_int("abc"), None);
        assert_eq!(parse_leading_int(""), None);
        assert_eq!(parse_leading_int("+"), None);
    }
}
