use crate::config::CalendarConfig;
use crate::grid::DateGrid;
use crate::model::VisibleDates;
use crate::scroll::{Completion, ScrollRequest};
use chrono::NaiveDate;
use log::warn;
use std::collections::VecDeque;

pub struct SelectOp {
    pub dates: Vec<NaiveDate>,
    pub trigger_delegate: bool,
    pub keep_if_multi_select: bool,
}

pub struct ReloadOp {
    /// Already validated replacement layout, if the reload changes it.
    pub replacement: Option<(CalendarConfig, DateGrid)>,
    pub anchor: Option<NaiveDate>,
    pub animate: bool,
    pub on_complete: Option<Completion>,
}

/// A call made before the grid could answer it, captured by value.
pub enum DeferredOp {
    Select(SelectOp),
    DeselectAll { trigger_delegate: bool },
    ReloadDates(Vec<NaiveDate>),
    Scroll(ScrollRequest),
    Reload(ReloadOp),
    VisibleDates(Box<dyn FnOnce(&VisibleDates)>),
}

impl DeferredOp {
    pub fn label(&self) -> &'static str {
        match self {
            DeferredOp::Select(_) => "select",
            DeferredOp::DeselectAll { .. } => "deselect_all",
            DeferredOp::ReloadDates(_) => "reload_dates",
            DeferredOp::Scroll(_) => "scroll",
            DeferredOp::Reload(_) => "reload",
            DeferredOp::VisibleDates(_) => "visible_dates",
        }
    }

    /// Whether running the op may ask the surface to scroll.
    pub fn positions(&self) -> bool {
        matches!(self, DeferredOp::Scroll(_) | DeferredOp::Reload(_))
    }
}

/// Operations waiting for the first layout pass. Drained once; a drained
/// queue refuses further work.
#[derive(Default)]
pub struct PendingOperationQueue {
    ops: VecDeque<DeferredOp>,
    drained: bool,
}

impl PendingOperationQueue {
    pub fn new() -> Self {
        PendingOperationQueue::default()
    }

    pub fn push(&mut self, op: DeferredOp) -> bool {
        if self.drained {
            warn!("event=defer_rejected op={} reason=already_drained", op.label());
            return false;
        }
        self.ops.push_back(op);
        true
    }

    pub fn drain(&mut self) -> Vec<DeferredOp> {
        self.drained = true;
        self.ops.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn is_drained(&self) -> bool {
        self.drained
    }
}
