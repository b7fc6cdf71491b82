//! Scroll state machine and the table deciding where a scroll lands.

use crate::model::{GridAddress, ScrollDirection, ScrollPosition};
use crate::surface::ScrollTarget;
use chrono::NaiveDate;

pub type Completion = Box<dyn FnOnce()>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentStep {
    Next,
    Previous,
    Index(usize),
}

impl SegmentStep {
    /// Section this step lands on, if it exists.
    pub fn resolve(&self, current: Option<usize>, segment_count: usize) -> Option<usize> {
        let target = match self {
            SegmentStep::Next => current?.checked_add(1)?,
            SegmentStep::Previous => current?.checked_sub(1)?,
            SegmentStep::Index(section) => *section,
        };
        (target < segment_count).then_some(target)
    }

    pub fn is_block_unit(&self) -> bool {
        !matches!(self, SegmentStep::Index(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollGoal {
    Date {
        date: NaiveDate,
        position: Option<ScrollPosition>,
    },
    Segment(SegmentStep),
    HeaderForDate(NaiveDate),
}

pub struct ScrollRequest {
    pub goal: ScrollGoal,
    pub trigger_delegate: bool,
    pub animate: bool,
    pub on_complete: Option<Completion>,
}

impl ScrollRequest {
    pub fn new(goal: ScrollGoal) -> Self {
        ScrollRequest {
            goal,
            trigger_delegate: false,
            animate: true,
            on_complete: None,
        }
    }
}

/// Inputs of the landing decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollKey {
    pub block_unit: bool,
    pub headers_registered: bool,
    pub strict_boundaries: bool,
    pub direction: ScrollDirection,
    pub end_padding: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollPlan {
    Header(usize),
    SegmentStart(usize),
    Item(GridAddress),
}

impl ScrollKey {
    pub fn plan(&self, address: GridAddress) -> ScrollPlan {
        let key = (
            self.block_unit,
            self.headers_registered,
            self.strict_boundaries || self.headers_registered,
            self.direction,
            self.end_padding,
        );
        match key {
            (true, true, _, ScrollDirection::Vertical, _) => ScrollPlan::Header(address.section),
            (true, _, true, _, _) | (true, _, false, _, true) => {
                ScrollPlan::SegmentStart(address.section)
            }
            // Sections do not end on row boundaries; their first item is
            // still the nearest position that starts a block.
            (true, _, false, _, false) => ScrollPlan::SegmentStart(address.section),
            (false, _, _, _, _) => ScrollPlan::Item(address),
        }
    }
}

impl ScrollPlan {
    pub fn target(&self, position: ScrollPosition) -> ScrollTarget {
        match *self {
            ScrollPlan::Header(section) => ScrollTarget::Header { section },
            ScrollPlan::SegmentStart(section) => ScrollTarget::Item {
                address: GridAddress::new(section, 0),
                position,
            },
            ScrollPlan::Item(address) => ScrollTarget::Item { address, position },
        }
    }
}

enum ScrollState {
    Idle,
    Scrolling {
        trigger_delegate: bool,
        on_complete: Option<Completion>,
    },
}

pub struct FinishedScroll {
    pub trigger_delegate: bool,
    pub on_complete: Option<Completion>,
}

pub struct ScrollController {
    state: ScrollState,
}

impl Default for ScrollController {
    fn default() -> Self {
        ScrollController::new()
    }
}

impl ScrollController {
    pub fn new() -> Self {
        ScrollController {
            state: ScrollState::Idle,
        }
    }

    pub fn is_scrolling(&self) -> bool {
        matches!(self.state, ScrollState::Scrolling { .. })
    }

    /// Moves to `Scrolling`. Returns `false` and drops the completion when a
    /// scroll is already in flight.
    pub fn begin(&mut self, trigger_delegate: bool, on_complete: Option<Completion>) -> bool {
        if self.is_scrolling() {
            return false;
        }
        self.state = ScrollState::Scrolling {
            trigger_delegate,
            on_complete,
        };
        true
    }

    /// Back to `Idle`, handing over what has to run on completion.
    pub fn finish(&mut self) -> Option<FinishedScroll> {
        match std::mem::replace(&mut self.state, ScrollState::Idle) {
            ScrollState::Idle => None,
            ScrollState::Scrolling {
                trigger_delegate,
                on_complete,
            } => Some(FinishedScroll {
                trigger_delegate,
                on_complete,
            }),
        }
    }
}

/// Position a date scroll ends at: the caller's preference when paging is off
/// and it fits the axis, the leading edge otherwise.
pub fn resolve_position(
    preferred: Option<ScrollPosition>,
    direction: ScrollDirection,
    paging: bool,
) -> ScrollPosition {
    match preferred {
        Some(position) if !paging && position.is_along(direction) => position,
        _ => ScrollPosition::leading_edge(direction),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn key(
        block_unit: bool,
        headers_registered: bool,
        strict_boundaries: bool,
        direction: ScrollDirection,
        end_padding: bool,
    ) -> ScrollKey {
        ScrollKey {
            block_unit,
            headers_registered,
            strict_boundaries,
            direction,
            end_padding,
        }
    }

    #[test]
    fn every_combination_has_a_landing() {
        let address = GridAddress::new(3, 17);
        for block in [false, true] {
            for headers in [false, true] {
                for strict in [false, true] {
                    for direction in [ScrollDirection::Horizontal, ScrollDirection::Vertical] {
                        for padding in [false, true] {
                            let plan = key(block, headers, strict, direction, padding).plan(address);
                            let expected = if !block {
                                ScrollPlan::Item(address)
                            } else if headers && direction == ScrollDirection::Vertical {
                                ScrollPlan::Header(3)
                            } else {
                                ScrollPlan::SegmentStart(3)
                            };
                            assert_eq!(plan, expected);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn horizontal_headers_land_on_first_item() {
        let plan = key(true, true, false, ScrollDirection::Horizontal, false)
            .plan(GridAddress::new(1, 9));
        assert_eq!(
            plan.target(ScrollPosition::Left),
            ScrollTarget::Item {
                address: GridAddress::new(1, 0),
                position: ScrollPosition::Left,
            }
        );
    }

    #[test]
    fn relative_steps_stay_in_range() {
        assert_eq!(SegmentStep::Next.resolve(Some(1), 3), Some(2));
        assert_eq!(SegmentStep::Next.resolve(Some(2), 3), None);
        assert_eq!(SegmentStep::Previous.resolve(Some(0), 3), None);
        assert_eq!(SegmentStep::Previous.resolve(None, 3), None);
        assert_eq!(SegmentStep::Index(2).resolve(None, 3), Some(2));
        assert_eq!(SegmentStep::Index(3).resolve(Some(0), 3), None);
    }

    #[test]
    fn preferred_position_only_without_paging_and_on_axis() {
        let h = ScrollDirection::Horizontal;
        assert_eq!(
            resolve_position(Some(ScrollPosition::Right), h, false),
            ScrollPosition::Right
        );
        assert_eq!(
            resolve_position(Some(ScrollPosition::Right), h, true),
            ScrollPosition::Left
        );
        assert_eq!(
            resolve_position(Some(ScrollPosition::Bottom), h, false),
            ScrollPosition::Left
        );
        assert_eq!(
            resolve_position(None, ScrollDirection::Vertical, false),
            ScrollPosition::Top
        );
    }

    #[test]
    fn second_begin_is_dropped_until_finish() {
        let ran = Rc::new(Cell::new(0));
        let mut controller = ScrollController::new();

        let first = ran.clone();
        assert!(controller.begin(true, Some(Box::new(move || first.set(first.get() + 1)))));
        let second = ran.clone();
        assert!(!controller.begin(false, Some(Box::new(move || second.set(second.get() + 10)))));
        assert!(controller.is_scrolling());

        let finished = controller.finish().unwrap();
        assert!(finished.trigger_delegate);
        if let Some(done) = finished.on_complete {
            done();
        }
        assert_eq!(ran.get(), 1);
        assert!(!controller.is_scrolling());
        assert!(controller.finish().is_none());
    }
}
