use crate::storage::{
    init_project_calendar, load_calendar, locate_calendar, save_calendar, CalendarFile,
    CalendarLocation,
};
use crate::ui;
use crate::viewport::Viewport;
use anyhow::{anyhow, bail, Context, Result};
use calgrid::{
    CalendarDelegate, CalendarView, CellStatus, DateGrid, DateMembership, GridAddress,
    RenderSurface,
};
use chrono::{Datelike, Local, NaiveDate};
use log::info;
use std::cell::RefCell;
use std::env;
use std::rc::Rc;

pub fn init(
    name: Option<String>,
    start: Option<String>,
    end: Option<String>,
    multi: bool,
) -> Result<()> {
    let today = Local::now().date_naive();
    let cwd = env::current_dir()?;
    let name = name.unwrap_or_else(|| {
        cwd.file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("project")
            .to_string()
    });
    let mut file = CalendarFile::for_year_of(name, today)?;
    if let Some(raw) = start {
        file.config.start = parse_date(&raw)?;
    }
    if let Some(raw) = end {
        file.config.end = parse_date(&raw)?;
    }
    file.config.allows_multiple_selection = multi;
    DateGrid::new(&file.config).context("invalid calendar configuration")?;

    let (location, created) = init_project_calendar(&cwd, &file)?;
    if created {
        println!("Initialized calendar at {}", location.path.display());
    } else {
        println!("Calendar already exists at {}", location.path.display());
    }
    Ok(())
}

pub fn show(date: Option<String>) -> Result<()> {
    let today = Local::now().date_naive();
    let (file, location) = load_current_calendar(today)?;
    let mut view = open_view(&file, Viewport::headless(), today)?;
    let bounds = view.grid().boundaries();
    let target = match date {
        Some(raw) => parse_date(&raw)?,
        None => today.clamp(bounds.start, bounds.end),
    };
    if !bounds.contains(target) {
        bail!("{} is outside {}..{}", target, bounds.start, bounds.end);
    }
    view.scroll_to_date(target, false, false, None, None);

    println!("Calendar: {} ({})", file.name, location.scope.label());
    for line in render_section(&view) {
        println!("{}", line);
    }
    Ok(())
}

pub fn select(dates: Vec<String>, keep: bool) -> Result<()> {
    let today = Local::now().date_naive();
    let parsed = dates
        .iter()
        .map(|raw| parse_date(raw))
        .collect::<Result<Vec<_>>>()?;
    let (mut file, location) = load_current_calendar(today)?;
    let mut view = open_view(&file, Viewport::headless(), today)?;

    let bounds = view.grid().boundaries();
    for date in parsed.iter().filter(|date| !bounds.contains(**date)) {
        println!("Skipped {}: outside {}..{}", date, bounds.start, bounds.end);
    }

    let changes = Rc::new(RefCell::new(Vec::new()));
    view.set_delegate(Box::new(ChangeLog {
        lines: changes.clone(),
    }));
    view.select_dates(&parsed, true, keep);
    for line in changes.borrow().iter() {
        println!("{}", line);
    }

    file.selected = view.selected_dates();
    save_calendar(&location, &file)?;
    info!(
        "event=selection_saved path={} selected={}",
        location.path.display(),
        file.selected.len()
    );
    println!("{} date(s) selected", file.selected.len());
    Ok(())
}

pub fn deselect_all() -> Result<()> {
    let today = Local::now().date_naive();
    let (mut file, location) = load_current_calendar(today)?;
    let mut view = open_view(&file, Viewport::headless(), today)?;
    let cleared = view.selection().len();
    view.deselect_all_dates(false);

    file.selected = view.selected_dates();
    save_calendar(&location, &file)?;
    println!("Cleared {} selected date(s)", cleared);
    Ok(())
}

pub fn status(date: String) -> Result<()> {
    let today = Local::now().date_naive();
    let date = parse_date(&date)?;
    let (file, _) = load_current_calendar(today)?;
    let view = open_view(&file, Viewport::headless(), today)?;
    let bounds = view.grid().boundaries();
    let status = view
        .cell_status_for_date(date)
        .ok_or_else(|| anyhow!("{} is outside {}..{}", date, bounds.start, bounds.end))?;
    let counterpart = view
        .grid()
        .counterpart_address(date, DateMembership::Current);

    println!("{}", date);
    println!("  address: {}", format_address(status.address));
    println!("  row {}, column {}", status.row, status.column);
    println!("  selected: {}", if status.is_selected { "yes" } else { "no" });
    println!("  today: {}", if status.is_today { "yes" } else { "no" });
    match counterpart {
        Some(address) => println!("  also shown at: {}", format_address(address)),
        None => println!("  also shown at: -"),
    }
    Ok(())
}

pub fn tui() -> Result<()> {
    let today = Local::now().date_naive();
    let (file, location) = load_current_calendar(today)?;
    ui::run(file, location, today)
}

/// Builds a calendar over `surface` and restores the stored selection.
///
/// Restoring waits for the surface to become ready, so an undrawn terminal
/// viewport picks the selection up on its first frame.
pub fn open_view<S: RenderSurface>(
    file: &CalendarFile,
    surface: S,
    today: NaiveDate,
) -> Result<CalendarView<S>> {
    let mut view = CalendarView::new(file.config.clone(), surface)
        .context("invalid calendar configuration")?;
    view.set_today(today);
    view.select_dates(&file.selected, false, true);
    Ok(view)
}

fn load_current_calendar(today: NaiveDate) -> Result<(CalendarFile, CalendarLocation)> {
    let cwd = env::current_dir()?;
    let location = locate_calendar(&cwd)?;
    let file = load_calendar(&location, today)?;
    Ok((file, location))
}

fn parse_date(input: &str) -> Result<NaiveDate> {
    let raw = input.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| anyhow!("invalid date format (use YYYY-MM-DD): {}", raw))
}

fn format_address(address: GridAddress) -> String {
    format!("section {} item {}", address.section, address.item)
}

/// Plain-text rendering of the section on screen: title, weekday row, then
/// one line per grid row. Selected days are bracketed, today is angled and
/// filler days are parenthesized.
fn render_section<S: RenderSurface>(view: &CalendarView<S>) -> Vec<String> {
    let grid = view.grid();
    let Some(section) = view.current_section() else {
        return Vec::new();
    };
    let Some(segment) = grid.segment(section) else {
        return Vec::new();
    };
    let columns = grid.columns_per_row();

    let mut lines = vec![ui::segment_title(view.config(), segment)];
    lines.push(
        ui::weekday_headings(view.config().first_day_of_week, columns)
            .iter()
            .map(|heading| format!(" {:>2} ", heading))
            .collect::<String>()
            .trim_end()
            .to_string(),
    );
    for row in 0..grid.items_in_section(section).div_ceil(columns) {
        let mut line = String::new();
        for column in 0..columns {
            let address = GridAddress::new(section, row * columns + column);
            match view.cell_status_at(address) {
                Some(status) => line.push_str(&format_cell(&status)),
                None => line.push_str("    "),
            }
        }
        lines.push(line.trim_end().to_string());
    }
    lines
}

fn format_cell(status: &CellStatus) -> String {
    let (open, close) = if status.is_selected {
        ('[', ']')
    } else if status.is_today {
        ('<', '>')
    } else if status.membership.is_filler() {
        ('(', ')')
    } else {
        (' ', ' ')
    };
    format!("{}{:>2}{}", open, status.date.day(), close)
}

struct ChangeLog {
    lines: Rc<RefCell<Vec<String>>>,
}

impl CalendarDelegate for ChangeLog {
    fn on_date_selected(&mut self, date: NaiveDate, _status: &CellStatus) {
        self.lines.borrow_mut().push(format!("Selected {}", date));
    }

    fn on_date_deselected(&mut self, date: NaiveDate, _status: &CellStatus) {
        self.lines.borrow_mut().push(format!("Deselected {}", date));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calgrid::{CalendarConfig, OverflowMode};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn february_view(selected: Vec<NaiveDate>) -> CalendarView<Viewport> {
        let mut config = CalendarConfig::new(date(2024, 2, 1), date(2024, 2, 29));
        config.overflow = OverflowMode::TillEndOfRow;
        let mut file = CalendarFile::new("test", config);
        file.selected = selected;
        open_view(&file, Viewport::headless(), date(2024, 2, 14)).unwrap()
    }

    #[test]
    fn dates_parse_in_iso_format_only() {
        assert_eq!(parse_date(" 2024-02-29 ").unwrap(), date(2024, 2, 29));
        assert!(parse_date("2024.02.29").is_err());
        assert!(parse_date("2023-02-29").is_err());
    }

    #[test]
    fn open_view_restores_the_stored_selection() {
        let view = february_view(vec![date(2024, 2, 3), date(2024, 2, 9)]);
        // Single selection keeps only the last stored date.
        assert_eq!(view.selected_dates(), vec![date(2024, 2, 9)]);
    }

    #[test]
    fn section_renders_as_text_rows() {
        let mut view = february_view(vec![date(2024, 2, 9)]);
        view.scroll_to_date(date(2024, 2, 9), false, false, None, None);
        let lines = render_section(&view);
        assert_eq!(lines[0], "February 2024");
        assert_eq!(lines[1], " Su  Mo  Tu  We  Th  Fr  Sa");
        assert_eq!(lines[2], "(28)(29)(30)(31)  1   2   3");
        assert_eq!(lines[3], "  4   5   6   7   8 [ 9] 10");
        assert!(lines[4].contains("<14>"));
        assert_eq!(lines.len(), 2 + 5);
        assert_eq!(lines[6], " 25  26  27  28  29 ( 1)( 2)");
    }
}
