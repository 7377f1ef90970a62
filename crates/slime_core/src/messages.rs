//! Output ports: the player-facing message surface and stage visuals.
//!
//! The engine never reaches for a global panel; callers hand it whatever
//! implements these traits.

use std::collections::{BTreeMap, VecDeque};

use crate::{SlotId, VisualTag};

/// Receives player-facing lines. Must not block the caller.
pub trait MessageSink {
    fn enqueue_message(&mut self, text: String);
}

/// Collects every line, in order. Handy for tests and logs.
impl MessageSink for Vec<String> {
    fn enqueue_message(&mut self, text: String) {
        self.push(text);
    }
}

/// Shows one stage's representation for a slot and hides the others.
pub trait StageVisual {
    fn set_stage_visual(&mut self, slot: &SlotId, tag: &VisualTag);
}

/// Discards visual updates.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullVisual;

impl StageVisual for NullVisual {
    fn set_stage_visual(&mut self, _slot: &SlotId, _tag: &VisualTag) {}
}

/// Remembers the active visual per slot.
#[derive(Debug, Default, Clone)]
pub struct VisualBoard {
    active: BTreeMap<SlotId, VisualTag>,
}

impl VisualBoard {
    pub fn active(&self, slot: &SlotId) -> Option<&VisualTag> {
        self.active.get(slot)
    }
}

impl StageVisual for VisualBoard {
    fn set_stage_visual(&mut self, slot: &SlotId, tag: &VisualTag) {
        self.active.insert(slot.clone(), tag.clone());
    }
}

/// FIFO message panel: one line at a time, each for a fixed number of ticks.
#[derive(Debug, Clone)]
pub struct MessagePanel {
    display_ticks: u64,
    queue: VecDeque<String>,
    current: Option<(String, u64)>,
}

impl MessagePanel {
    pub fn new(display_ticks: u64) -> Self {
        Self {
            display_ticks,
            queue: VecDeque::new(),
            current: None,
        }
    }

    /// Retires the visible line once its time is up and shows the next one.
    pub fn update(&mut self, now: u64) {
        if let Some((_, hide_at)) = &self.current {
            if now < *hide_at {
                return;
            }
            self.current = None;
        }
        if let Some(next) = self.queue.pop_front() {
            self.current = Some((next, now + self.display_ticks));
        }
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_ref().map(|(text, _)| text.as_str())
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn is_idle(&self) -> bool {
        self.current.is_none() && self.queue.is_empty()
    }
}

impl MessageSink for MessagePanel {
    fn enqueue_message(&mut self, text: String) {
        if text.trim().is_empty() {
            return;
        }
        self.queue.push_back(text);
    }
}
