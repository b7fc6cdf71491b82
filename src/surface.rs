//! Contracts with the collaborators that draw the grid and observe it.

use crate::grid::GridLayout;
use crate::model::{CellStatus, GridAddress, ScrollPosition, VisibleDates};
use chrono::NaiveDate;
use std::any::TypeId;
use std::collections::BTreeSet;

/// Positioning directive for the rendering surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollTarget {
    Item {
        address: GridAddress,
        position: ScrollPosition,
    },
    Header {
        section: usize,
    },
}

impl ScrollTarget {
    pub fn section(&self) -> usize {
        match self {
            ScrollTarget::Item { address, .. } => address.section,
            ScrollTarget::Header { section } => *section,
        }
    }
}

/// The thing that actually draws cells.
///
/// The calendar polls `grid_is_ready` before every operation. An animated
/// `position_to` is considered in flight until the host calls
/// `CalendarView::scroll_animation_did_end`.
pub trait RenderSurface {
    fn grid_is_ready(&self) -> bool;

    fn reload_all(&mut self, layout: &GridLayout);

    fn redisplay(&mut self, addresses: &BTreeSet<GridAddress>);

    fn position_to(&mut self, target: ScrollTarget, animate: bool);

    fn visible_addresses(&self) -> Vec<GridAddress>;
}

pub trait CalendarDelegate {
    fn on_date_selected(&mut self, _date: NaiveDate, _status: &CellStatus) {}

    fn on_date_deselected(&mut self, _date: NaiveDate, _status: &CellStatus) {}

    fn on_scroll_completed(&mut self, _visible: &VisibleDates) {}
}

/// Where a cell or header view comes from. Only recorded by the calendar;
/// resolving it into a view is the host's business.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewSource {
    ByXibName {
        name: String,
        bundle: Option<String>,
    },
    ByClassName {
        name: String,
        bundle: Option<String>,
    },
    ByTypeHandle(TypeId),
}
