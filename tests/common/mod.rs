#![allow(dead_code)]

use calgrid::{
    CalendarConfig, CalendarDelegate, CalendarView, CellStatus, GridAddress, GridLayout,
    RenderSurface, ScrollTarget, VisibleDates,
};
use chrono::NaiveDate;
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// 2024-01-01..2024-03-31, seven columns, Sunday first, overflow till end of
/// grid, single selection.
pub fn quarter_config() -> CalendarConfig {
    CalendarConfig::new(date(2024, 1, 1), date(2024, 3, 31))
}

pub fn multi_config() -> CalendarConfig {
    let mut config = quarter_config();
    config.allows_multiple_selection = true;
    config
}

/// Surface that shows one whole section at a time and records every call.
#[derive(Debug, Default)]
pub struct MockSurface {
    pub ready: bool,
    pub layout: Option<GridLayout>,
    pub reloads: usize,
    pub redisplays: Vec<BTreeSet<GridAddress>>,
    pub positions: Vec<(ScrollTarget, bool)>,
    pub section: usize,
}

impl RenderSurface for MockSurface {
    fn grid_is_ready(&self) -> bool {
        self.ready
    }

    fn reload_all(&mut self, layout: &GridLayout) {
        self.section = self
            .section
            .min(layout.section_items.len().saturating_sub(1));
        self.layout = Some(layout.clone());
        self.reloads += 1;
    }

    fn redisplay(&mut self, addresses: &BTreeSet<GridAddress>) {
        self.redisplays.push(addresses.clone());
    }

    fn position_to(&mut self, target: ScrollTarget, animate: bool) {
        self.section = target.section();
        self.positions.push((target, animate));
    }

    fn visible_addresses(&self) -> Vec<GridAddress> {
        let Some(layout) = &self.layout else {
            return Vec::new();
        };
        let items = layout.section_items.get(self.section).copied().unwrap_or(0);
        (0..items)
            .map(|item| GridAddress::new(self.section, item))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Selected { date: NaiveDate, is_selected: bool },
    Deselected { date: NaiveDate, is_selected: bool },
    ScrollCompleted { first_month_date: Option<NaiveDate> },
}

pub struct RecordingDelegate {
    pub events: Rc<RefCell<Vec<Event>>>,
}

impl CalendarDelegate for RecordingDelegate {
    fn on_date_selected(&mut self, date: NaiveDate, status: &CellStatus) {
        self.events.borrow_mut().push(Event::Selected {
            date,
            is_selected: status.is_selected,
        });
    }

    fn on_date_deselected(&mut self, date: NaiveDate, status: &CellStatus) {
        self.events.borrow_mut().push(Event::Deselected {
            date,
            is_selected: status.is_selected,
        });
    }

    fn on_scroll_completed(&mut self, visible: &VisibleDates) {
        self.events.borrow_mut().push(Event::ScrollCompleted {
            first_month_date: visible.first_month_date(),
        });
    }
}

pub fn ready_view(config: CalendarConfig) -> CalendarView<MockSurface> {
    let surface = MockSurface {
        ready: true,
        ..MockSurface::default()
    };
    let mut view = CalendarView::new(config, surface).unwrap();
    view.set_today(date(2024, 2, 14));
    view
}

pub fn with_recorder(view: &mut CalendarView<MockSurface>) -> Rc<RefCell<Vec<Event>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    view.set_delegate(Box::new(RecordingDelegate {
        events: events.clone(),
    }));
    events
}

pub fn addresses(list: &[(usize, usize)]) -> BTreeSet<GridAddress> {
    list.iter()
        .map(|(section, item)| GridAddress::new(*section, *item))
        .collect()
}
