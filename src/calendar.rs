//! Public face of the control.
//!
//! # Responsibility
//! - Route every caller request through readiness: before the surface reports
//!   its first layout pass, requests are recorded in the pending queue.
//! - Drive selection and scroll transitions and talk to the surface and the
//!   delegate.
//!
//! # Invariants
//! - Pending operations run once, in request order, right after readiness is
//!   first observed and before the call that observed it. None of them is
//!   dropped, queued scrolls included.
//! - Only one scroll is in flight; overlapping scroll requests are dropped.
//! - No call corrupts the selection or the boundaries, whatever its input.

use crate::cell_state::CellStateResolver;
use crate::config::{CalendarConfig, ConfigError};
use crate::grid::{date_range, DateGrid};
use crate::model::{CellStatus, DateMembership, GridAddress, ScrollPosition, VisibleDates};
use crate::pending::{DeferredOp, PendingOperationQueue, ReloadOp, SelectOp};
use crate::scroll::{
    resolve_position, Completion, ScrollController, ScrollGoal, ScrollKey, ScrollRequest,
    SegmentStep,
};
use crate::selection::{RedisplaySet, SelectionMode, SelectionPlan, SelectionStore};
use crate::surface::{CalendarDelegate, RenderSurface, ScrollTarget, ViewSource};
use chrono::{Local, NaiveDate};
use log::{debug, info, warn};
use std::collections::BTreeSet;

/// Full reload, optionally with a new configuration and a date to show
/// afterwards.
#[derive(Default)]
pub struct ReloadRequest {
    pub config: Option<CalendarConfig>,
    pub anchor: Option<NaiveDate>,
    pub animate: bool,
    pub on_complete: Option<Completion>,
}

pub struct CalendarView<S: RenderSurface> {
    config: CalendarConfig,
    grid: DateGrid,
    selection: SelectionStore,
    scroller: ScrollController,
    pending: PendingOperationQueue,
    surface: S,
    delegate: Option<Box<dyn CalendarDelegate>>,
    cell_view: Option<ViewSource>,
    header_views: Vec<ViewSource>,
    today: Option<NaiveDate>,
    loaded: bool,
}

impl<S: RenderSurface> CalendarView<S> {
    pub fn new(config: CalendarConfig, mut surface: S) -> Result<Self, ConfigError> {
        let grid = DateGrid::new(&config).map_err(|err| {
            warn!("event=config_rejected error={err}");
            err
        })?;
        surface.reload_all(&grid.layout());
        info!(
            "event=calendar_init sections={} start={} end={}",
            grid.segment_count(),
            grid.boundaries().start,
            grid.boundaries().end
        );
        Ok(CalendarView {
            config,
            grid,
            selection: SelectionStore::new(),
            scroller: ScrollController::new(),
            pending: PendingOperationQueue::new(),
            surface,
            delegate: None,
            cell_view: None,
            header_views: Vec::new(),
            today: None,
            loaded: false,
        })
    }

    pub fn set_delegate(&mut self, delegate: Box<dyn CalendarDelegate>) {
        self.delegate = Some(delegate);
    }

    pub fn clear_delegate(&mut self) {
        self.delegate = None;
    }

    /// Pins the date reported as today instead of the local clock.
    pub fn set_today(&mut self, today: NaiveDate) {
        self.today = Some(today);
    }

    pub fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    pub fn config(&self) -> &CalendarConfig {
        &self.config
    }

    pub fn grid(&self) -> &DateGrid {
        &self.grid
    }

    pub fn selection(&self) -> &SelectionStore {
        &self.selection
    }

    pub fn selected_dates(&self) -> Vec<NaiveDate> {
        self.selection.selected_dates()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn is_scrolling(&self) -> bool {
        self.scroller.is_scrolling()
    }

    pub fn pending_operations(&self) -> usize {
        self.pending.len()
    }

    /// Observes the surface's readiness. The first time it reports ready,
    /// every deferred operation runs in the order it was requested.
    pub fn poll_readiness(&mut self) -> bool {
        if self.loaded {
            return true;
        }
        if !self.surface.grid_is_ready() {
            return false;
        }
        self.loaded = true;
        let ops = self.pending.drain();
        if !ops.is_empty() {
            info!("event=pending_drain count={}", ops.len());
        }
        for op in ops {
            // Queued work is never dropped: an earlier queued scroll still in
            // flight is completed before the next positioning request.
            if op.positions() && self.scroller.is_scrolling() {
                debug!("event=pending_scroll_settle next={}", op.label());
                self.scroll_animation_did_end();
            }
            self.dispatch(op);
        }
        true
    }

    fn defer(&mut self, op: DeferredOp) {
        debug!("event=defer op={} queued={}", op.label(), self.pending.len() + 1);
        self.pending.push(op);
    }

    fn dispatch(&mut self, op: DeferredOp) {
        match op {
            DeferredOp::Select(op) => {
                self.select_dates(&op.dates, op.trigger_delegate, op.keep_if_multi_select);
            }
            DeferredOp::DeselectAll { trigger_delegate } => {
                self.deselect_all_dates(trigger_delegate);
            }
            DeferredOp::ReloadDates(dates) => self.reload_dates(&dates),
            DeferredOp::Scroll(request) => self.scroll(request),
            DeferredOp::Reload(op) => self.apply_reload(op),
            DeferredOp::VisibleDates(callback) => callback(&self.visible_dates()),
        }
    }

    // ===== Selection =====

    /// Selects `dates` according to the configured selection mode.
    ///
    /// Returns the cells that changed appearance. With `trigger_delegate`
    /// (and a delegate set) the delegate hears about every change and only
    /// counterpart cells are redrawn here; otherwise every returned cell is
    /// redrawn. Deferred calls return an empty set.
    pub fn select_dates(
        &mut self,
        dates: &[NaiveDate],
        trigger_delegate: bool,
        keep_if_multi_select: bool,
    ) -> RedisplaySet {
        if !self.poll_readiness() {
            self.defer(DeferredOp::Select(SelectOp {
                dates: dates.to_vec(),
                trigger_delegate,
                keep_if_multi_select,
            }));
            return RedisplaySet::default();
        }
        let mode =
            SelectionMode::from_flags(self.config.allows_multiple_selection, keep_if_multi_select);
        let plan = self.selection.plan(&self.grid, dates, mode);
        self.commit_selection(plan, trigger_delegate)
    }

    pub fn select_date_range(
        &mut self,
        start: NaiveDate,
        end: NaiveDate,
        trigger_delegate: bool,
        keep_if_multi_select: bool,
    ) -> RedisplaySet {
        let dates: Vec<NaiveDate> = date_range(start, end).into_iter().collect();
        self.select_dates(&dates, trigger_delegate, keep_if_multi_select)
    }

    pub fn deselect_all_dates(&mut self, trigger_delegate: bool) -> RedisplaySet {
        if !self.poll_readiness() {
            self.defer(DeferredOp::DeselectAll { trigger_delegate });
            return RedisplaySet::default();
        }
        let plan = self.selection.deselect_all_plan(&self.grid);
        self.commit_selection(plan, trigger_delegate)
    }

    fn commit_selection(&mut self, plan: SelectionPlan, trigger_delegate: bool) -> RedisplaySet {
        let notify = trigger_delegate && self.delegate.is_some();
        let today = self.today();
        let mut redisplay = RedisplaySet::default();
        for step in plan {
            let Some(change) = self.selection.apply_step(&self.grid, step, &mut redisplay) else {
                continue;
            };
            if !notify {
                continue;
            }
            let resolver = CellStateResolver::new(&self.grid, &self.selection, today);
            let (Some(status), Some(delegate)) =
                (resolver.status_for_address(change.address), self.delegate.as_mut())
            else {
                continue;
            };
            if change.selected {
                delegate.on_date_selected(change.date, &status);
            } else {
                delegate.on_date_deselected(change.date, &status);
            }
        }

        let to_redraw = if notify {
            &redisplay.counterparts
        } else {
            &redisplay.all
        };
        if !to_redraw.is_empty() {
            self.surface.redisplay(to_redraw);
        }
        redisplay
    }

    /// Redraws the cells showing `dates`, counterparts included.
    pub fn reload_dates(&mut self, dates: &[NaiveDate]) {
        if !self.poll_readiness() {
            self.defer(DeferredOp::ReloadDates(dates.to_vec()));
            return;
        }
        let mut addresses = BTreeSet::new();
        for &date in dates {
            let Some(address) = self.grid.address_for_date(date) else {
                continue;
            };
            addresses.insert(address);
            if let Some(counterpart) = self
                .grid
                .counterpart_address(date, DateMembership::Current)
            {
                addresses.insert(counterpart);
            }
        }
        if !addresses.is_empty() {
            self.surface.redisplay(&addresses);
        }
    }

    // ===== Cell status =====

    pub fn cell_status_for_date(&self, date: NaiveDate) -> Option<CellStatus> {
        CellStateResolver::new(&self.grid, &self.selection, self.today()).status_for_date(date)
    }

    pub fn cell_status_at(&self, address: GridAddress) -> Option<CellStatus> {
        CellStateResolver::new(&self.grid, &self.selection, self.today())
            .status_for_address(address)
    }

    /// Status of the cell at `row`/`column` of the section currently shown.
    pub fn cell_status_at_row_column(&self, row: usize, column: usize) -> Option<CellStatus> {
        let columns = self.grid.columns_per_row();
        if column >= columns {
            return None;
        }
        let section = self.current_section()?;
        let item = row.checked_mul(columns)?.checked_add(column)?;
        self.cell_status_at(GridAddress::new(section, item))
    }

    // ===== Scrolling =====

    /// Lowest section with a visible cell.
    pub fn current_section(&self) -> Option<usize> {
        self.surface
            .visible_addresses()
            .iter()
            .map(|address| address.section)
            .min()
    }

    pub fn scroll_to_date(
        &mut self,
        date: NaiveDate,
        trigger_delegate: bool,
        animate: bool,
        position: Option<ScrollPosition>,
        on_complete: Option<Completion>,
    ) {
        self.scroll(ScrollRequest {
            goal: ScrollGoal::Date { date, position },
            trigger_delegate,
            animate,
            on_complete,
        });
    }

    pub fn scroll_to_segment(
        &mut self,
        step: SegmentStep,
        trigger_delegate: bool,
        animate: bool,
        on_complete: Option<Completion>,
    ) {
        self.scroll(ScrollRequest {
            goal: ScrollGoal::Segment(step),
            trigger_delegate,
            animate,
            on_complete,
        });
    }

    pub fn scroll_to_next_segment(
        &mut self,
        trigger_delegate: bool,
        animate: bool,
        on_complete: Option<Completion>,
    ) {
        self.scroll_to_segment(SegmentStep::Next, trigger_delegate, animate, on_complete);
    }

    pub fn scroll_to_previous_segment(
        &mut self,
        trigger_delegate: bool,
        animate: bool,
        on_complete: Option<Completion>,
    ) {
        self.scroll_to_segment(SegmentStep::Previous, trigger_delegate, animate, on_complete);
    }

    /// Scrolls to the header of the section holding `date`. Does nothing when
    /// no header views are registered.
    pub fn scroll_to_header_for_date(
        &mut self,
        date: NaiveDate,
        trigger_delegate: bool,
        animate: bool,
        on_complete: Option<Completion>,
    ) {
        self.scroll(ScrollRequest {
            goal: ScrollGoal::HeaderForDate(date),
            trigger_delegate,
            animate,
            on_complete,
        });
    }

    pub fn scroll(&mut self, request: ScrollRequest) {
        if !self.poll_readiness() {
            self.defer(DeferredOp::Scroll(request));
            return;
        }
        if self.scroller.is_scrolling() {
            debug!("event=scroll_dropped goal={:?} reason=in_flight", request.goal);
            return;
        }
        let Some(target) = self.resolve_scroll(request.goal) else {
            debug!("event=scroll_skip goal={:?} reason=no_target", request.goal);
            return;
        };
        self.scroller.begin(request.trigger_delegate, request.on_complete);
        self.surface.position_to(target, request.animate);
        if !request.animate {
            self.scroll_animation_did_end();
        }
    }

    fn resolve_scroll(&self, goal: ScrollGoal) -> Option<ScrollTarget> {
        let direction = self.config.scroll_direction;
        let key = |block_unit| ScrollKey {
            block_unit,
            headers_registered: !self.header_views.is_empty(),
            strict_boundaries: self.config.strict_boundaries,
            direction,
            end_padding: self.config.has_end_padding(),
        };
        match goal {
            ScrollGoal::Date { date, position } => {
                let address = self.grid.address_for_date(date)?;
                let position =
                    resolve_position(position, direction, self.config.scrolling_mode.is_paging());
                let plan = key(self.config.scrolling_mode.is_block_unit()).plan(address);
                Some(plan.target(position))
            }
            ScrollGoal::Segment(step) => {
                let section = step.resolve(self.current_section(), self.grid.segment_count())?;
                let plan = key(step.is_block_unit()).plan(GridAddress::new(section, 0));
                Some(plan.target(ScrollPosition::leading_edge(direction)))
            }
            ScrollGoal::HeaderForDate(date) => {
                let address = self.grid.address_for_date(date)?;
                if self.header_views.is_empty() {
                    return None;
                }
                Some(ScrollTarget::Header {
                    section: address.section,
                })
            }
        }
    }

    /// Completes the scroll in flight: notifies the delegate if the request
    /// asked for it, then runs the request's completion.
    pub fn scroll_animation_did_end(&mut self) {
        let Some(finished) = self.scroller.finish() else {
            return;
        };
        if finished.trigger_delegate {
            let visible = self.visible_dates();
            if let Some(delegate) = self.delegate.as_mut() {
                delegate.on_scroll_completed(&visible);
            }
        }
        if let Some(done) = finished.on_complete {
            done();
        }
    }

    // ===== Visible dates =====

    pub fn visible_dates(&self) -> VisibleDates {
        let mut visible = VisibleDates::default();
        if !self.loaded {
            return visible;
        }
        let mut addresses = self.surface.visible_addresses();
        addresses.sort();
        addresses.dedup();
        for address in addresses {
            let Some((date, membership)) = self.grid.date_for_address(address) else {
                continue;
            };
            match membership {
                DateMembership::Previous => visible.in_dates.push((date, address)),
                DateMembership::Current => visible.month_dates.push((date, address)),
                DateMembership::Following => visible.out_dates.push((date, address)),
            }
        }
        visible
    }

    /// Hands the visible dates to `callback`, waiting for readiness if needed.
    pub fn visible_dates_with(&mut self, callback: Box<dyn FnOnce(&VisibleDates)>) {
        if !self.poll_readiness() {
            self.defer(DeferredOp::VisibleDates(callback));
            return;
        }
        callback(&self.visible_dates());
    }

    // ===== Reload =====

    /// Rebuilds the grid (from `request.config` when given), keeps the
    /// selected dates that still fit, and optionally scrolls to an anchor.
    ///
    /// The new configuration is validated immediately, even when the reload
    /// itself has to wait for readiness.
    pub fn reload_data(&mut self, request: ReloadRequest) -> Result<(), ConfigError> {
        let replacement = match request.config {
            Some(config) => {
                let grid = DateGrid::new(&config).map_err(|err| {
                    warn!("event=config_rejected error={err}");
                    err
                })?;
                Some((config, grid))
            }
            None => None,
        };
        let op = ReloadOp {
            replacement,
            anchor: request.anchor,
            animate: request.animate,
            on_complete: request.on_complete,
        };
        if !self.poll_readiness() {
            self.defer(DeferredOp::Reload(op));
            return Ok(());
        }
        self.apply_reload(op);
        Ok(())
    }

    fn apply_reload(&mut self, op: ReloadOp) {
        if let Some((config, grid)) = op.replacement {
            self.config = config;
            self.grid = grid;
        }
        self.selection
            .rebase(&self.grid, self.config.allows_multiple_selection);
        self.surface.reload_all(&self.grid.layout());
        info!(
            "event=reload sections={} selected={}",
            self.grid.segment_count(),
            self.selection.len()
        );
        match op.anchor {
            Some(anchor) => self.scroll(ScrollRequest {
                goal: ScrollGoal::Date {
                    date: anchor,
                    position: None,
                },
                trigger_delegate: false,
                animate: op.animate,
                on_complete: op.on_complete,
            }),
            None => {
                if let Some(done) = op.on_complete {
                    done();
                }
            }
        }
    }

    // ===== View registration =====

    pub fn register_cell_view(&mut self, source: ViewSource) {
        self.cell_view = Some(source);
    }

    pub fn cell_view(&self) -> Option<&ViewSource> {
        self.cell_view.as_ref()
    }

    /// Replaces the registered header views. An empty list is ignored.
    pub fn register_header_views(&mut self, sources: Vec<ViewSource>) {
        if sources.is_empty() {
            return;
        }
        self.header_views = sources;
    }

    pub fn unregister_headers(&mut self) {
        self.header_views.clear();
    }

    pub fn header_views(&self) -> &[ViewSource] {
        &self.header_views
    }
}
