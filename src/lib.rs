//! Date grid control core: maps calendar dates onto a sectioned grid, keeps
//! the selection consistent across duplicated cells, and drives section
//! scrolling against an external rendering surface.

pub mod calendar;
pub mod cell_state;
pub mod config;
pub mod grid;
pub mod model;
pub mod pending;
pub mod scroll;
pub mod selection;
pub mod surface;

pub use calendar::{CalendarView, ReloadRequest};
pub use cell_state::CellStateResolver;
pub use config::{CalendarConfig, ConfigError, OverflowMode, ScrollingMode, SegmentationPolicy};
pub use grid::{date_range, DateGrid, DateRange, GridLayout, Segment};
pub use model::{
    Boundaries, CellStatus, DateMembership, GridAddress, ScrollDirection, ScrollPosition,
    VisibleDates,
};
pub use pending::{DeferredOp, PendingOperationQueue};
pub use scroll::{
    Completion, ScrollController, ScrollGoal, ScrollKey, ScrollPlan, ScrollRequest, SegmentStep,
};
pub use selection::{
    RedisplaySet, SelectionChange, SelectionMode, SelectionOutcome, SelectionPlan, SelectionStep,
    SelectionStore,
};
pub use surface::{CalendarDelegate, RenderSurface, ScrollTarget, ViewSource};
