use crate::model::{Boundaries, ScrollDirection};
use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// How the date range is cut into sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentationPolicy {
    #[default]
    CalendarMonth,
    FixedDays(u32),
}

/// How far past the last real day a section is padded with following dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowMode {
    None,
    TillEndOfRow,
    #[default]
    TillEndOfGrid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollingMode {
    StopAtEachSegment,
    #[default]
    StopAtEachCalendarFrame,
    StopAtEach,
    NonStop,
    Free,
}

impl ScrollingMode {
    pub fn is_paging(&self) -> bool {
        matches!(
            self,
            ScrollingMode::StopAtEachSegment | ScrollingMode::StopAtEachCalendarFrame
        )
    }

    /// Scrolls requested under these modes always land on a section start.
    pub fn is_block_unit(&self) -> bool {
        matches!(
            self,
            ScrollingMode::StopAtEachSegment
                | ScrollingMode::StopAtEachCalendarFrame
                | ScrollingMode::StopAtEach
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarConfig {
    pub start: NaiveDate,
    pub end: NaiveDate,
    #[serde(default = "default_columns_per_row")]
    pub columns_per_row: usize,
    #[serde(default = "default_first_day_of_week")]
    pub first_day_of_week: Weekday,
    #[serde(default)]
    pub segmentation: SegmentationPolicy,
    #[serde(default)]
    pub overflow: OverflowMode,
    #[serde(default)]
    pub allows_multiple_selection: bool,
    #[serde(default)]
    pub scroll_direction: ScrollDirection,
    #[serde(default)]
    pub scrolling_mode: ScrollingMode,
    #[serde(default = "default_strict_boundaries")]
    pub strict_boundaries: bool,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("range start {start} is after range end {end}")]
    InvertedRange { start: NaiveDate, end: NaiveDate },
    #[error("columns per row must be at least 1")]
    NoColumns,
    #[error("{columns} columns per row is more than the {max} allowed")]
    TooManyColumns { columns: usize, max: usize },
    #[error("fixed segments must span at least one day")]
    EmptySegment,
    #[error("section {section} is too short ({days} days) to be shown as overflow in both neighbours")]
    OverlappingOverflow { section: usize, days: usize },
}

/// A row never needs to be wider than a leap year.
pub const MAX_COLUMNS_PER_ROW: usize = 366;

fn default_columns_per_row() -> usize {
    7
}

fn default_first_day_of_week() -> Weekday {
    Weekday::Sun
}

fn default_strict_boundaries() -> bool {
    true
}

impl CalendarConfig {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        CalendarConfig {
            start,
            end,
            columns_per_row: default_columns_per_row(),
            first_day_of_week: default_first_day_of_week(),
            segmentation: SegmentationPolicy::default(),
            overflow: OverflowMode::default(),
            allows_multiple_selection: false,
            scroll_direction: ScrollDirection::default(),
            scrolling_mode: ScrollingMode::default(),
            strict_boundaries: default_strict_boundaries(),
        }
    }

    pub fn boundaries(&self) -> Boundaries {
        Boundaries {
            start: self.start,
            end: self.end,
        }
    }

    /// Checks the settings that can be judged without laying out segments.
    /// Segment-level checks happen when the grid is built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.start > self.end {
            return Err(ConfigError::InvertedRange {
                start: self.start,
                end: self.end,
            });
        }
        if self.columns_per_row == 0 {
            return Err(ConfigError::NoColumns);
        }
        if self.columns_per_row > MAX_COLUMNS_PER_ROW {
            return Err(ConfigError::TooManyColumns {
                columns: self.columns_per_row,
                max: MAX_COLUMNS_PER_ROW,
            });
        }
        if self.segmentation == SegmentationPolicy::FixedDays(0) {
            return Err(ConfigError::EmptySegment);
        }
        Ok(())
    }

    pub fn has_end_padding(&self) -> bool {
        self.overflow != OverflowMode::None
    }
}
