use calgrid::{GridAddress, GridLayout, RenderSurface, ScrollTarget};
use log::trace;
use std::collections::BTreeSet;

/// Terminal stand-in for a scrolling grid: one section is on screen at a
/// time, always in full.
#[derive(Debug, Default)]
pub struct Viewport {
    ready: bool,
    section_items: Vec<usize>,
    section: usize,
    dirty: BTreeSet<GridAddress>,
    full_redraw: bool,
    animating: bool,
}

impl Viewport {
    /// Not ready until the first frame has been drawn.
    pub fn new() -> Self {
        Viewport::default()
    }

    /// Ready at once, for one-shot commands that never draw.
    pub fn headless() -> Self {
        Viewport {
            ready: true,
            ..Viewport::default()
        }
    }

    pub fn mark_ready(&mut self) {
        self.ready = true;
    }

    /// Whether anything asked for a redraw since the last call.
    pub fn take_redraw(&mut self) -> bool {
        let needed = self.full_redraw || !self.dirty.is_empty();
        if needed {
            trace!(
                "event=viewport_redraw full={} cells={}",
                self.full_redraw,
                self.dirty.len()
            );
        }
        self.full_redraw = false;
        self.dirty.clear();
        needed
    }

    /// Ends a pending animated move. Returns false when none was pending.
    pub fn finish_animation(&mut self) -> bool {
        std::mem::replace(&mut self.animating, false)
    }
}

impl RenderSurface for Viewport {
    fn grid_is_ready(&self) -> bool {
        self.ready
    }

    fn reload_all(&mut self, layout: &GridLayout) {
        self.section_items = layout.section_items.clone();
        self.section = self.section.min(self.section_items.len().saturating_sub(1));
        self.full_redraw = true;
    }

    fn redisplay(&mut self, addresses: &BTreeSet<GridAddress>) {
        self.dirty.extend(addresses.iter().copied());
    }

    fn position_to(&mut self, target: ScrollTarget, animate: bool) {
        self.section = target.section();
        self.animating = animate;
        self.full_redraw = true;
    }

    fn visible_addresses(&self) -> Vec<GridAddress> {
        let items = self.section_items.get(self.section).copied().unwrap_or(0);
        (0..items)
            .map(|item| GridAddress::new(self.section, item))
            .collect()
    }
}
