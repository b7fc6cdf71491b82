use crate::grid::DateGrid;
use crate::model::{CellStatus, GridAddress};
use crate::selection::SelectionStore;
use chrono::NaiveDate;

/// Read-only view combining layout and selection into per-cell status.
///
/// Holds no state of its own; two lookups with the same inputs and no
/// mutation in between always agree.
#[derive(Debug, Clone, Copy)]
pub struct CellStateResolver<'a> {
    grid: &'a DateGrid,
    selection: &'a SelectionStore,
    today: NaiveDate,
}

impl<'a> CellStateResolver<'a> {
    pub fn new(grid: &'a DateGrid, selection: &'a SelectionStore, today: NaiveDate) -> Self {
        CellStateResolver {
            grid,
            selection,
            today,
        }
    }

    pub fn status_for_address(&self, address: GridAddress) -> Option<CellStatus> {
        let (date, membership) = self.grid.date_for_address(address)?;
        let columns = self.grid.columns_per_row();
        Some(CellStatus {
            date,
            address,
            row: address.row(columns),
            column: address.column(columns),
            membership,
            is_selected: self.selection.is_selected(date),
            is_today: date == self.today,
            has_counterpart: self.grid.counterpart_address(date, membership).is_some(),
        })
    }

    pub fn status_for_date(&self, date: NaiveDate) -> Option<CellStatus> {
        let address = self.grid.address_for_date(date)?;
        self.status_for_address(address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CalendarConfig, OverflowMode};
    use crate::model::DateMembership;
    use crate::selection::SelectionMode;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn config() -> CalendarConfig {
        CalendarConfig::new(date(2024, 1, 1), date(2024, 3, 31))
    }

    #[test]
    fn status_reports_selection_and_today() {
        let grid = DateGrid::new(&config()).unwrap();
        let mut selection = SelectionStore::new();
        selection.select(&grid, &[date(2024, 2, 1)], SelectionMode::SingleSelect);
        let resolver = CellStateResolver::new(&grid, &selection, date(2024, 2, 1));

        let status = resolver.status_for_date(date(2024, 2, 1)).unwrap();
        assert_eq!(status.address, GridAddress::new(1, 4));
        assert_eq!((status.row, status.column), (0, 4));
        assert_eq!(status.membership, DateMembership::Current);
        assert!(status.is_selected);
        assert!(status.is_today);
        assert!(status.has_counterpart);
    }

    #[test]
    fn filler_cell_mirrors_primary_selection() {
        let grid = DateGrid::new(&config()).unwrap();
        let mut selection = SelectionStore::new();
        selection.select(&grid, &[date(2024, 2, 1)], SelectionMode::SingleSelect);
        let resolver = CellStateResolver::new(&grid, &selection, date(2030, 1, 1));

        let filler = resolver.status_for_address(GridAddress::new(0, 32)).unwrap();
        assert_eq!(filler.date, date(2024, 2, 1));
        assert_eq!(filler.membership, DateMembership::Following);
        assert!(filler.is_selected);
        assert!(filler.has_counterpart);
        assert!(!filler.is_today);
    }

    #[test]
    fn unresolvable_inputs_give_none() {
        let grid = DateGrid::new(&config()).unwrap();
        let selection = SelectionStore::new();
        let resolver = CellStateResolver::new(&grid, &selection, date(2024, 1, 1));
        assert_eq!(resolver.status_for_address(GridAddress::new(9, 0)), None);
        assert_eq!(resolver.status_for_date(date(2025, 1, 1)), None);
    }

    #[test]
    fn leading_filler_before_range_has_no_counterpart() {
        let grid = DateGrid::new(&config()).unwrap();
        let selection = SelectionStore::new();
        let resolver = CellStateResolver::new(&grid, &selection, date(2024, 1, 1));
        let status = resolver.status_for_address(GridAddress::new(0, 0)).unwrap();
        assert_eq!(status.date, date(2023, 12, 31));
        assert!(!status.has_counterpart);

        let mut no_overflow = config();
        no_overflow.overflow = OverflowMode::None;
        let grid = DateGrid::new(&no_overflow).unwrap();
        let resolver = CellStateResolver::new(&grid, &selection, date(2024, 1, 1));
        let status = resolver.status_for_date(date(2024, 2, 1)).unwrap();
        assert!(!status.has_counterpart);
    }

    #[test]
    fn repeated_lookups_agree() {
        let grid = DateGrid::new(&config()).unwrap();
        let selection = SelectionStore::new();
        let resolver = CellStateResolver::new(&grid, &selection, date(2024, 1, 1));
        let address = GridAddress::new(2, 10);
        assert_eq!(
            resolver.status_for_address(address),
            resolver.status_for_address(address)
        );
    }
}
