use crate::commands::open_view;
use crate::storage::{save_calendar, CalendarFile, CalendarLocation};
use crate::viewport::Viewport;
use anyhow::Result;
use calgrid::{
    CalendarConfig, CalendarDelegate, CalendarView, CellStatus, GridAddress, Segment,
    SegmentationPolicy, VisibleDates,
};
use chrono::{Datelike, Duration as DateDuration, NaiveDate, Weekday};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use log::{debug, info};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::{Alignment, Color, Modifier, Rect, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Terminal;
use std::cell::RefCell;
use std::io::{stdout, Stdout};
use std::rc::Rc;
use std::time::{Duration, Instant};

pub fn run(file: CalendarFile, location: CalendarLocation, today: NaiveDate) -> Result<()> {
    let mut app = App::new(file, location, today)?;
    let mut terminal = setup_terminal()?;
    let result = app.event_loop(&mut terminal);
    teardown_terminal(&mut terminal)?;
    result
}

struct App {
    file: CalendarFile,
    location: CalendarLocation,
    view: CalendarView<Viewport>,
    today: NaiveDate,
    cursor: NaiveDate,
    status: Rc<RefCell<String>>,
    last_save: Instant,
    unsaved: bool,
}

/// Mirrors delegate callbacks into the footer status line.
struct StatusLine {
    status: Rc<RefCell<String>>,
}

impl CalendarDelegate for StatusLine {
    fn on_date_selected(&mut self, date: NaiveDate, _status: &CellStatus) {
        *self.status.borrow_mut() = format!("Selected {}", date);
    }

    fn on_date_deselected(&mut self, date: NaiveDate, _status: &CellStatus) {
        *self.status.borrow_mut() = format!("Deselected {}", date);
    }

    fn on_scroll_completed(&mut self, visible: &VisibleDates) {
        let first = visible.month_dates.first().map(|(date, _)| *date);
        let last = visible.month_dates.last().map(|(date, _)| *date);
        if let (Some(first), Some(last)) = (first, last) {
            *self.status.borrow_mut() = format!("Showing {} .. {}", first, last);
        }
    }
}

impl App {
    fn new(file: CalendarFile, location: CalendarLocation, today: NaiveDate) -> Result<Self> {
        let mut view = open_view(&file, Viewport::new(), today)?;
        let status = Rc::new(RefCell::new(format!(
            "Loaded calendar from {}",
            location.path.display()
        )));
        view.set_delegate(Box::new(StatusLine {
            status: status.clone(),
        }));
        let bounds = view.grid().boundaries();
        let cursor = today.clamp(bounds.start, bounds.end);
        // Runs once the first frame is on screen.
        view.scroll_to_date(cursor, false, false, None, None);
        Ok(App {
            file,
            location,
            view,
            today,
            cursor,
            status,
            last_save: Instant::now(),
            unsaved: false,
        })
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        let mut needs_draw = true;
        loop {
            if needs_draw || self.view.surface_mut().take_redraw() {
                terminal.draw(|f| self.draw(f))?;
                needs_draw = self.after_frame();
            }
            if event::poll(Duration::from_millis(200))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key)? {
                        break;
                    }
                    needs_draw = true;
                }
            }
        }
        Ok(())
    }

    /// Reports the frame to the calendar. Returns true when that changed
    /// something worth drawing again.
    fn after_frame(&mut self) -> bool {
        let mut changed = false;
        if !self.view.is_loaded() {
            self.view.surface_mut().mark_ready();
            self.view.poll_readiness();
            changed = true;
        }
        if self.view.surface_mut().finish_animation() {
            self.view.scroll_animation_did_end();
            changed = true;
        }
        changed
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        let columns = self.view.grid().columns_per_row() as i64;
        match key.code {
            KeyCode::Char('q') => {
                self.save()?;
                return Ok(true);
            }
            KeyCode::Left | KeyCode::Char('h') => self.move_cursor(-1),
            KeyCode::Right | KeyCode::Char('l') => self.move_cursor(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(-columns),
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor(columns),
            KeyCode::Char(' ') | KeyCode::Enter => {
                self.view.select_dates(&[self.cursor], true, false);
                self.unsaved = true;
            }
            KeyCode::Char('n') => self.step_segment(1),
            KeyCode::Char('p') => self.step_segment(-1),
            KeyCode::Char('t') => {
                self.settle_scroll();
                let bounds = self.view.grid().boundaries();
                self.cursor = self.today.clamp(bounds.start, bounds.end);
                self.view
                    .scroll_to_date(self.cursor, true, true, None, None);
            }
            KeyCode::Char('c') => {
                self.view.deselect_all_dates(false);
                self.unsaved = true;
                self.set_status("Cleared selection");
            }
            KeyCode::Char('s') => self.save()?,
            _ => {}
        }
        Ok(false)
    }

    fn move_cursor(&mut self, days: i64) {
        let Some(next) = self.cursor.checked_add_signed(DateDuration::days(days)) else {
            return;
        };
        let grid = self.view.grid();
        let Some(address) = grid.address_for_date(next) else {
            return;
        };
        self.settle_scroll();
        self.cursor = next;
        if Some(address.section) != self.view.current_section() {
            debug!("event=cursor_section_change date={next} section={}", address.section);
            self.view.scroll_to_date(next, true, true, None, None);
        }
    }

    fn step_segment(&mut self, delta: isize) {
        self.settle_scroll();
        let Some(current) = self.view.current_section() else {
            return;
        };
        let Some(target) = current.checked_add_signed(delta) else {
            return;
        };
        let Some(segment) = self.view.grid().segment(target).copied() else {
            return;
        };
        self.cursor = segment.start;
        if delta > 0 {
            self.view.scroll_to_next_segment(true, true, None);
        } else {
            self.view.scroll_to_previous_segment(true, true, None);
        }
    }

    /// Completes a scroll still animating so the next one is not dropped
    /// and the cursor never leaves the section on screen.
    fn settle_scroll(&mut self) {
        if self.view.surface_mut().finish_animation() {
            self.view.scroll_animation_did_end();
        }
    }

    fn save(&mut self) -> Result<()> {
        self.file.selected = self.view.selected_dates();
        save_calendar(&self.location, &self.file)?;
        info!(
            "event=selection_saved path={} selected={}",
            self.location.path.display(),
            self.file.selected.len()
        );
        self.last_save = Instant::now();
        self.unsaved = false;
        self.set_status(format!("Saved {} date(s)", self.file.selected.len()));
        Ok(())
    }

    fn set_status(&self, message: impl Into<String>) {
        *self.status.borrow_mut() = message.into();
    }

    fn draw(&self, f: &mut ratatui::Frame<'_>) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(10),
                Constraint::Length(4),
            ])
            .split(f.size());

        self.draw_header(f, layout[0]);
        self.draw_grid(f, layout[1]);
        self.draw_footer(f, layout[2]);
    }

    fn draw_header(&self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let saved = if self.unsaved {
            "unsaved changes".to_string()
        } else {
            format!("saved {}", format_elapsed(self.last_save))
        };
        let title = Line::from(vec![
            Span::styled(
                "calgrid ",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                self.file.name.as_str(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("  •  "),
            Span::styled(
                self.location.scope.label(),
                Style::default().fg(Color::Green),
            ),
            Span::raw("  •  "),
            Span::styled(
                format!("{}", self.location.path.display()),
                Style::default().fg(Color::DarkGray),
            ),
            Span::raw("  •  "),
            Span::styled(saved, Style::default().fg(Color::Gray)),
            Span::raw("  •  "),
            Span::styled(
                format!("{} selected", self.view.selection().len()),
                Style::default().fg(Color::Magenta),
            ),
        ]);

        let block = Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(Color::DarkGray));
        let paragraph = Paragraph::new(title)
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(paragraph, area);
    }

    fn draw_grid(&self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let grid = self.view.grid();
        let config = self.view.config();
        let section = self.view.current_section().unwrap_or(0);
        let columns = grid.columns_per_row();

        let mut lines = Vec::new();
        if let Some(segment) = grid.segment(section) {
            lines.push(Line::from(Span::styled(
                segment_title(config, segment),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )));
        }
        let header_spans: Vec<Span<'static>> = weekday_headings(config.first_day_of_week, columns)
            .into_iter()
            .map(|h| Span::styled(format!("{:^6}", h), Style::default().fg(Color::Gray)))
            .collect();
        lines.push(Line::from(header_spans));

        let rows = grid.items_in_section(section).div_ceil(columns);
        for row in 0..rows {
            let mut spans = Vec::new();
            for column in 0..columns {
                let address = GridAddress::new(section, row * columns + column);
                match self.view.cell_status_at(address) {
                    Some(status) => spans.push(self.cell_span(&status)),
                    None => spans.push(Span::raw("      ")),
                }
            }
            lines.push(Line::from(spans));
        }

        let block = Block::default()
            .title(Span::styled(
                format!("Segment {}/{}", section + 1, grid.segment_count()),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));
        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(paragraph, area);
    }

    fn cell_span(&self, status: &CellStatus) -> Span<'static> {
        let text = format!("{:^6}", status.date.day());
        let mut style = Style::default().fg(if status.membership.is_filler() {
            Color::DarkGray
        } else {
            Color::Gray
        });
        if status.is_today {
            style = style.fg(Color::Yellow).add_modifier(Modifier::BOLD);
        }
        if status.is_selected {
            style = style
                .bg(Color::Green)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD);
        }
        if status.date == self.cursor && !status.membership.is_filler() {
            style = style
                .bg(Color::Cyan)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD);
        }
        Span::styled(text, style)
    }

    fn draw_footer(&self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Length(2)])
            .split(area);

        let help = Line::from(vec![
            Span::styled("←↑↓→/hjkl", Style::default().fg(Color::Cyan)),
            Span::raw(" move  "),
            Span::styled("space", Style::default().fg(Color::Cyan)),
            Span::raw(" toggle  "),
            Span::styled("n/p", Style::default().fg(Color::Cyan)),
            Span::raw(" segment  "),
            Span::styled("t", Style::default().fg(Color::Cyan)),
            Span::raw(" today  "),
            Span::styled("c", Style::default().fg(Color::Cyan)),
            Span::raw(" clear  "),
            Span::styled("s", Style::default().fg(Color::Cyan)),
            Span::raw(" save  "),
            Span::styled("q", Style::default().fg(Color::Cyan)),
            Span::raw(" save & quit"),
        ]);
        let help_bar = Paragraph::new(help).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
        f.render_widget(help_bar, rows[0]);

        let status = Paragraph::new(format!("{}  │  cursor {}", self.status.borrow(), self.cursor))
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::TOP)
                    .border_style(Style::default().fg(Color::DarkGray)),
            );
        f.render_widget(status, rows[1]);
    }
}

/// Two-letter column headings starting at `first`.
pub fn weekday_headings(first: Weekday, columns: usize) -> Vec<String> {
    let mut day = first;
    let mut headings = Vec::with_capacity(columns);
    for _ in 0..columns {
        headings.push(day.to_string().chars().take(2).collect());
        day = day.succ();
    }
    headings
}

pub fn segment_title(config: &CalendarConfig, segment: &Segment) -> String {
    match config.segmentation {
        SegmentationPolicy::CalendarMonth => segment.start.format("%B %Y").to_string(),
        SegmentationPolicy::FixedDays(_) => format!("{} .. {}", segment.start, segment.end),
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn teardown_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn format_elapsed(last: Instant) -> String {
    let secs = last.elapsed().as_secs();
    if secs < 60 {
        format!("{}s ago", secs)
    } else if secs < 3600 {
        format!("{}m ago", secs / 60)
    } else {
        format!("{}h ago", secs / 3600)
    }
}
