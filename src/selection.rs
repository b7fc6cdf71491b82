//! Selected dates and the transitions between selection states.
//!
//! Every mutation is split in two phases: [`SelectionStore::plan`] walks the
//! requested dates against a simulated copy of the current selection and
//! records each decision, then [`SelectionStore::apply`] (or
//! [`SelectionStore::apply_step`] for callers that need to observe each
//! decision) commits them. Repeated dates in one request therefore toggle
//! once per occurrence.

use crate::grid::DateGrid;
use crate::model::{DateMembership, GridAddress};
use chrono::NaiveDate;
use log::debug;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    SingleSelect,
    MultiSelectToggle,
    MultiSelectForceKeep,
}

impl SelectionMode {
    pub fn from_flags(allows_multiple_selection: bool, keep_if_multi_select: bool) -> Self {
        match (allows_multiple_selection, keep_if_multi_select) {
            (false, _) => SelectionMode::SingleSelect,
            (true, false) => SelectionMode::MultiSelectToggle,
            (true, true) => SelectionMode::MultiSelectForceKeep,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionStep {
    Select {
        date: NaiveDate,
        address: GridAddress,
    },
    Deselect {
        date: NaiveDate,
        address: GridAddress,
    },
    /// Already selected and kept; only needs drawing again.
    Refresh { address: GridAddress },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionPlan {
    steps: Vec<SelectionStep>,
}

impl SelectionPlan {
    pub fn steps(&self) -> &[SelectionStep] {
        &self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl IntoIterator for SelectionPlan {
    type Item = SelectionStep;
    type IntoIter = std::vec::IntoIter<SelectionStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.into_iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionChange {
    pub date: NaiveDate,
    pub address: GridAddress,
    pub selected: bool,
}

/// Cells touched by a selection request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedisplaySet {
    pub all: BTreeSet<GridAddress>,
    pub counterparts: BTreeSet<GridAddress>,
}

impl RedisplaySet {
    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    fn touch(&mut self, address: GridAddress) {
        self.all.insert(address);
    }

    fn touch_counterpart(&mut self, address: GridAddress) {
        self.all.insert(address);
        self.counterparts.insert(address);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionOutcome {
    pub changes: Vec<SelectionChange>,
    pub redisplay: RedisplaySet,
}

/// Ordered set of selected dates with their true addresses.
#[derive(Debug, Clone, Default)]
pub struct SelectionStore {
    entries: Vec<(NaiveDate, GridAddress)>,
}

impl SelectionStore {
    pub fn new() -> Self {
        SelectionStore::default()
    }

    pub fn is_selected(&self, date: NaiveDate) -> bool {
        self.entries.iter().any(|(selected, _)| *selected == date)
    }

    pub fn entries(&self) -> &[(NaiveDate, GridAddress)] {
        &self.entries
    }

    pub fn selected_dates(&self) -> Vec<NaiveDate> {
        self.entries.iter().map(|(date, _)| *date).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn plan(&self, grid: &DateGrid, dates: &[NaiveDate], mode: SelectionMode) -> SelectionPlan {
        let candidates = match mode {
            SelectionMode::SingleSelect => match dates.last() {
                Some(last) => std::slice::from_ref(last),
                None => &[],
            },
            SelectionMode::MultiSelectToggle | SelectionMode::MultiSelectForceKeep => dates,
        };

        let mut simulated = self.entries.clone();
        let mut steps = Vec::new();
        for &date in candidates {
            let Some(address) = grid.address_for_date(date) else {
                debug!("event=select_skip date={date} reason=out_of_bounds");
                continue;
            };
            let already = simulated.iter().any(|(selected, _)| *selected == date);
            match mode {
                SelectionMode::SingleSelect => {
                    for (other, other_address) in simulated.iter().filter(|(d, _)| *d != date) {
                        steps.push(SelectionStep::Deselect {
                            date: *other,
                            address: *other_address,
                        });
                    }
                    simulated.retain(|(d, _)| *d == date);
                    steps.push(SelectionStep::Select { date, address });
                    if !already {
                        simulated.push((date, address));
                    }
                }
                SelectionMode::MultiSelectToggle => {
                    if already {
                        steps.push(SelectionStep::Deselect { date, address });
                        simulated.retain(|(d, _)| *d != date);
                    } else {
                        steps.push(SelectionStep::Select { date, address });
                        simulated.push((date, address));
                    }
                }
                SelectionMode::MultiSelectForceKeep => {
                    if already {
                        steps.push(SelectionStep::Refresh { address });
                    } else {
                        steps.push(SelectionStep::Select { date, address });
                        simulated.push((date, address));
                    }
                }
            }
        }
        SelectionPlan { steps }
    }

    /// Plan that toggles off everything currently selected.
    pub fn deselect_all_plan(&self, grid: &DateGrid) -> SelectionPlan {
        self.plan(grid, &self.selected_dates(), SelectionMode::MultiSelectToggle)
    }

    pub fn apply_step(
        &mut self,
        grid: &DateGrid,
        step: SelectionStep,
        redisplay: &mut RedisplaySet,
    ) -> Option<SelectionChange> {
        match step {
            SelectionStep::Select { date, address } => {
                redisplay.touch(address);
                if !self.is_selected(date) {
                    self.entries.push((date, address));
                }
                if let Some(counterpart) = grid.counterpart_address(date, DateMembership::Current) {
                    redisplay.touch_counterpart(counterpart);
                }
                Some(SelectionChange {
                    date,
                    address,
                    selected: true,
                })
            }
            SelectionStep::Deselect { date, address } => {
                redisplay.touch(address);
                self.entries.retain(|(selected, _)| *selected != date);
                if let Some(counterpart) = grid.counterpart_address(date, DateMembership::Current) {
                    redisplay.touch_counterpart(counterpart);
                }
                Some(SelectionChange {
                    date,
                    address,
                    selected: false,
                })
            }
            SelectionStep::Refresh { address } => {
                redisplay.touch(address);
                None
            }
        }
    }

    pub fn apply(&mut self, grid: &DateGrid, plan: SelectionPlan) -> SelectionOutcome {
        let mut outcome = SelectionOutcome::default();
        for step in plan {
            if let Some(change) = self.apply_step(grid, step, &mut outcome.redisplay) {
                outcome.changes.push(change);
            }
        }
        outcome
    }

    pub fn select(
        &mut self,
        grid: &DateGrid,
        dates: &[NaiveDate],
        mode: SelectionMode,
    ) -> SelectionOutcome {
        let plan = self.plan(grid, dates, mode);
        self.apply(grid, plan)
    }

    pub fn deselect_all(&mut self, grid: &DateGrid) -> SelectionOutcome {
        let plan = self.deselect_all_plan(grid);
        self.apply(grid, plan)
    }

    /// Re-resolves every entry against a freshly built grid, dropping dates
    /// the new boundaries no longer cover.
    pub fn rebase(&mut self, grid: &DateGrid, allows_multiple_selection: bool) {
        let before = self.entries.len();
        self.entries = self
            .entries
            .iter()
            .filter_map(|(date, _)| grid.address_for_date(*date).map(|address| (*date, address)))
            .collect();
        if !allows_multiple_selection && self.entries.len() > 1 {
            let last = self.entries.len() - 1;
            self.entries.drain(..last);
        }
        if self.entries.len() != before {
            debug!(
                "event=selection_rebase dropped={} kept={}",
                before - self.entries.len(),
                self.entries.len()
            );
        }
    }
}
