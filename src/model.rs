use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Location of one cell in the grid.
///
/// Ordered by section first, then item, which is also the on-screen order of
/// cells within a scroll axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GridAddress {
    pub section: usize,
    pub item: usize,
}

impl GridAddress {
    pub fn new(section: usize, item: usize) -> Self {
        GridAddress { section, item }
    }

    pub fn row(&self, columns_per_row: usize) -> usize {
        self.item / columns_per_row.max(1)
    }

    pub fn column(&self, columns_per_row: usize) -> usize {
        self.item % columns_per_row.max(1)
    }
}

/// Which segment a rendered date belongs to, relative to the section the
/// cell is drawn in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateMembership {
    Previous,
    Current,
    Following,
}

impl DateMembership {
    pub fn is_filler(&self) -> bool {
        !matches!(self, DateMembership::Current)
    }
}

/// Inclusive date window accepted by every date-taking operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Boundaries {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Boundaries {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellStatus {
    pub date: NaiveDate,
    pub address: GridAddress,
    pub row: usize,
    pub column: usize,
    pub membership: DateMembership,
    pub is_selected: bool,
    pub is_today: bool,
    pub has_counterpart: bool,
}

/// Currently visible dates, split by the segment they belong to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisibleDates {
    pub in_dates: Vec<(NaiveDate, GridAddress)>,
    pub month_dates: Vec<(NaiveDate, GridAddress)>,
    pub out_dates: Vec<(NaiveDate, GridAddress)>,
}

impl VisibleDates {
    pub fn is_empty(&self) -> bool {
        self.in_dates.is_empty() && self.month_dates.is_empty() && self.out_dates.is_empty()
    }

    pub fn first_month_date(&self) -> Option<NaiveDate> {
        self.month_dates.first().map(|(date, _)| *date)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollDirection {
    #[default]
    Horizontal,
    Vertical,
}

/// Where the target cell should end up in the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollPosition {
    Left,
    Right,
    CenteredHorizontally,
    Top,
    Bottom,
    CenteredVertically,
}

impl ScrollPosition {
    pub fn leading_edge(direction: ScrollDirection) -> Self {
        match direction {
            ScrollDirection::Horizontal => ScrollPosition::Left,
            ScrollDirection::Vertical => ScrollPosition::Top,
        }
    }

    pub fn is_along(&self, direction: ScrollDirection) -> bool {
        match self {
            ScrollPosition::Left | ScrollPosition::Right | ScrollPosition::CenteredHorizontally => {
                direction == ScrollDirection::Horizontal
            }
            ScrollPosition::Top | ScrollPosition::Bottom | ScrollPosition::CenteredVertically => {
                direction == ScrollDirection::Vertical
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_row_and_column_follow_columns_per_row() {
        let address = GridAddress::new(2, 17);
        assert_eq!(address.row(7), 2);
        assert_eq!(address.column(7), 3);
        assert_eq!(address.row(5), 3);
        assert_eq!(address.column(5), 2);
    }

    #[test]
    fn positions_belong_to_one_axis() {
        assert!(ScrollPosition::Left.is_along(ScrollDirection::Horizontal));
        assert!(!ScrollPosition::Left.is_along(ScrollDirection::Vertical));
        assert!(ScrollPosition::CenteredVertically.is_along(ScrollDirection::Vertical));
        assert_eq!(
            ScrollPosition::leading_edge(ScrollDirection::Vertical),
            ScrollPosition::Top
        );
    }
}
