//! Date to grid address mapping.
//!
//! A [`DateGrid`] is rebuilt from a [`CalendarConfig`] on every full reload and
//! never changes afterwards, so the same date keeps the same address for the
//! lifetime of one configuration.

use crate::config::{CalendarConfig, ConfigError, OverflowMode, SegmentationPolicy};
use crate::model::{Boundaries, DateMembership, GridAddress};
use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// One section of the grid: the real days it owns plus the filler cells
/// padding its first and last rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub leading: usize,
    pub trailing: usize,
}

impl Segment {
    pub fn days(&self) -> usize {
        (self.end - self.start).num_days() as usize + 1
    }

    pub fn item_count(&self) -> usize {
        self.leading + self.days() + self.trailing
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// What a rendering surface needs to lay cells out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridLayout {
    pub columns_per_row: usize,
    pub section_items: Vec<usize>,
}

#[derive(Debug, Clone)]
pub struct DateGrid {
    boundaries: Boundaries,
    columns_per_row: usize,
    overflow: OverflowMode,
    segments: Vec<Segment>,
}

impl DateGrid {
    pub fn new(config: &CalendarConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let columns = config.columns_per_row;
        let boundaries = match config.segmentation {
            SegmentationPolicy::CalendarMonth => Boundaries {
                start: config.start.with_day(1).unwrap_or(config.start),
                end: end_of_month(config.end),
            },
            SegmentationPolicy::FixedDays(_) => config.boundaries(),
        };
        let anchor = week_anchor(boundaries.start, config.first_day_of_week);
        let max_days = match config.segmentation {
            SegmentationPolicy::CalendarMonth => 31,
            SegmentationPolicy::FixedDays(n) => n as usize,
        };
        let grid_cells = (columns - 1 + max_days).div_ceil(columns) * columns;

        let segments: Vec<Segment> = segment_spans(boundaries, config.segmentation)
            .into_iter()
            .map(|(start, end)| {
                let leading = (start - anchor).num_days().rem_euclid(columns as i64) as usize;
                let filled = leading + (end - start).num_days() as usize + 1;
                let trailing = match config.overflow {
                    OverflowMode::None => 0,
                    OverflowMode::TillEndOfRow => (columns - filled % columns) % columns,
                    OverflowMode::TillEndOfGrid => grid_cells.saturating_sub(filled),
                };
                Segment {
                    start,
                    end,
                    leading,
                    trailing,
                }
            })
            .collect();

        if config.overflow != OverflowMode::None {
            for (idx, window) in segments.windows(3).enumerate() {
                let days = window[1].days();
                if window[0].trailing + window[2].leading > days {
                    return Err(ConfigError::OverlappingOverflow {
                        section: idx + 1,
                        days,
                    });
                }
            }
        }

        Ok(DateGrid {
            boundaries,
            columns_per_row: columns,
            overflow: config.overflow,
            segments,
        })
    }

    pub fn boundaries(&self) -> Boundaries {
        self.boundaries
    }

    pub fn columns_per_row(&self) -> usize {
        self.columns_per_row
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn segment(&self, section: usize) -> Option<&Segment> {
        self.segments.get(section)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn items_in_section(&self, section: usize) -> usize {
        self.segments.get(section).map_or(0, Segment::item_count)
    }

    pub fn layout(&self) -> GridLayout {
        GridLayout {
            columns_per_row: self.columns_per_row,
            section_items: self.segments.iter().map(Segment::item_count).collect(),
        }
    }

    /// True address of `date`, or `None` when it falls outside the boundaries.
    pub fn address_for_date(&self, date: NaiveDate) -> Option<GridAddress> {
        if !self.boundaries.contains(date) {
            return None;
        }
        let section = self
            .segments
            .partition_point(|segment| segment.start <= date)
            .checked_sub(1)?;
        let segment = &self.segments[section];
        let offset = (date - segment.start).num_days() as usize;
        Some(GridAddress::new(section, segment.leading + offset))
    }

    pub fn date_for_address(&self, address: GridAddress) -> Option<(NaiveDate, DateMembership)> {
        let segment = self.segments.get(address.section)?;
        if address.item >= segment.item_count() {
            return None;
        }
        let days = segment.days();
        if address.item < segment.leading {
            let back = (segment.leading - address.item) as i64;
            let date = segment.start.checked_sub_signed(Duration::days(back))?;
            Some((date, DateMembership::Previous))
        } else if address.item < segment.leading + days {
            let forward = (address.item - segment.leading) as i64;
            let date = segment.start.checked_add_signed(Duration::days(forward))?;
            Some((date, DateMembership::Current))
        } else {
            let forward = (address.item - segment.leading - days + 1) as i64;
            let date = segment.end.checked_add_signed(Duration::days(forward))?;
            Some((date, DateMembership::Following))
        }
    }

    /// The other cell showing `date`.
    ///
    /// For a real cell (`Current`) this is the filler cell in the previous or
    /// next section; for a filler cell it is the date's true address. Without
    /// overflow rendering no date has a counterpart.
    pub fn counterpart_address(
        &self,
        date: NaiveDate,
        membership: DateMembership,
    ) -> Option<GridAddress> {
        if self.overflow == OverflowMode::None {
            return None;
        }
        if membership.is_filler() {
            return self.address_for_date(date);
        }

        let primary = self.address_for_date(date)?;
        let segment = &self.segments[primary.section];
        let from_start = (date - segment.start).num_days() as usize;
        if let Some(prev) = primary
            .section
            .checked_sub(1)
            .and_then(|idx| self.segments.get(idx))
        {
            if from_start < prev.trailing {
                return Some(GridAddress::new(
                    primary.section - 1,
                    prev.leading + prev.days() + from_start,
                ));
            }
        }
        if let Some(next) = self.segments.get(primary.section + 1) {
            let from_end = (segment.end - date).num_days() as usize;
            if from_end < next.leading {
                return Some(GridAddress::new(
                    primary.section + 1,
                    next.leading - 1 - from_end,
                ));
            }
        }
        None
    }
}

/// Inclusive run of days. Copying the range restarts iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

pub fn date_range(start: NaiveDate, end: NaiveDate) -> DateRange {
    DateRange { start, end }
}

impl DateRange {
    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    pub fn iter(&self) -> DateRangeIter {
        DateRangeIter {
            next: Some(self.start),
            end: self.end,
        }
    }
}

impl IntoIterator for DateRange {
    type Item = NaiveDate;
    type IntoIter = DateRangeIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Debug, Clone)]
pub struct DateRangeIter {
    next: Option<NaiveDate>,
    end: NaiveDate,
}

impl Iterator for DateRangeIter {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        let current = self.next.filter(|date| *date <= self.end)?;
        self.next = current.succ_opt();
        Some(current)
    }
}

pub fn end_of_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first| first.pred_opt())
        .unwrap_or(NaiveDate::MAX)
}

// Latest `first_day` on or before `date`; column zero of every row.
fn week_anchor(date: NaiveDate, first_day: Weekday) -> NaiveDate {
    let back = (date.weekday().num_days_from_monday() + 7 - first_day.num_days_from_monday()) % 7;
    date.checked_sub_signed(Duration::days(back as i64))
        .unwrap_or(date)
}

fn segment_spans(
    boundaries: Boundaries,
    segmentation: SegmentationPolicy,
) -> Vec<(NaiveDate, NaiveDate)> {
    let mut spans = Vec::new();
    let mut cursor = boundaries.start;
    while cursor <= boundaries.end {
        let natural_end = match segmentation {
            SegmentationPolicy::CalendarMonth => end_of_month(cursor),
            SegmentationPolicy::FixedDays(n) => cursor
                .checked_add_signed(Duration::days(n as i64 - 1))
                .unwrap_or(boundaries.end),
        };
        let end = natural_end.min(boundaries.end);
        spans.push((cursor, end));
        match end.succ_opt() {
            Some(next) => cursor = next,
            None => break,
        }
    }
    spans
}
