mod common;

use calgrid::{CalendarConfig, CalendarView, GridAddress, ReloadRequest, VisibleDates};
use common::{date, multi_config, quarter_config, MockSurface};
use std::cell::RefCell;
use std::rc::Rc;

fn unready_view(config: CalendarConfig) -> CalendarView<MockSurface> {
    CalendarView::new(config, MockSurface::default()).unwrap()
}

#[test]
fn scrolls_requested_before_layout_run_in_order() {
    let mut view = unready_view(quarter_config());
    let order = Rc::new(RefCell::new(Vec::new()));
    for (tag, day) in [(1, date(2024, 1, 15)), (2, date(2024, 3, 3)), (3, date(2024, 2, 10))] {
        let order = order.clone();
        view.scroll_to_date(
            day,
            false,
            false,
            None,
            Some(Box::new(move || order.borrow_mut().push(tag))),
        );
    }
    assert_eq!(view.pending_operations(), 3);
    assert!(view.surface().positions.is_empty());
    assert!(!view.poll_readiness());

    view.surface_mut().ready = true;
    assert!(view.poll_readiness());

    assert_eq!(*order.borrow(), vec![1, 2, 3]);
    let sections: Vec<usize> = view
        .surface()
        .positions
        .iter()
        .map(|(target, _)| target.section())
        .collect();
    assert_eq!(sections, vec![0, 2, 1]);
    assert_eq!(view.pending_operations(), 0);
}

#[test]
fn queued_animated_scrolls_all_run_in_order() {
    let mut view = unready_view(quarter_config());
    let order = Rc::new(RefCell::new(Vec::new()));
    for (tag, day) in [(1, date(2024, 1, 15)), (2, date(2024, 3, 3)), (3, date(2024, 2, 10))] {
        let order = order.clone();
        view.scroll_to_date(
            day,
            false,
            true,
            None,
            Some(Box::new(move || order.borrow_mut().push(tag))),
        );
    }

    view.surface_mut().ready = true;
    view.poll_readiness();

    let sections: Vec<usize> = view
        .surface()
        .positions
        .iter()
        .map(|(target, _)| target.section())
        .collect();
    assert_eq!(sections, vec![0, 2, 1]);
    assert_eq!(*order.borrow(), vec![1, 2]);
    assert!(view.is_scrolling());

    view.scroll_animation_did_end();
    assert_eq!(*order.borrow(), vec![1, 2, 3]);
    assert!(!view.is_scrolling());
}

#[test]
fn queued_reload_anchor_survives_an_animated_queued_scroll() {
    let mut view = unready_view(quarter_config());
    let order = Rc::new(RefCell::new(Vec::new()));
    let first = order.clone();
    view.scroll_to_date(
        date(2024, 3, 3),
        false,
        true,
        None,
        Some(Box::new(move || first.borrow_mut().push("scroll"))),
    );
    let second = order.clone();
    view.reload_data(ReloadRequest {
        anchor: Some(date(2024, 2, 10)),
        animate: true,
        on_complete: Some(Box::new(move || second.borrow_mut().push("reload"))),
        ..ReloadRequest::default()
    })
    .unwrap();

    view.surface_mut().ready = true;
    view.poll_readiness();
    assert_eq!(view.surface().positions.len(), 2);
    assert_eq!(view.current_section(), Some(1));
    assert_eq!(*order.borrow(), vec!["scroll"]);

    view.scroll_animation_did_end();
    assert_eq!(*order.borrow(), vec!["scroll", "reload"]);
}

#[test]
fn deferred_work_runs_before_the_call_that_observes_readiness() {
    let mut view = unready_view(multi_config());
    let set = view.select_dates(&[date(2024, 1, 5)], false, false);
    assert!(set.is_empty());
    assert!(view.selected_dates().is_empty());

    view.surface_mut().ready = true;
    // The deferred toggle selects Jan 5; this call toggles it back off.
    view.select_dates(&[date(2024, 1, 5), date(2024, 1, 6)], false, false);
    assert_eq!(view.selected_dates(), vec![date(2024, 1, 6)]);
    assert!(view.is_loaded());
}

#[test]
fn visible_dates_wait_for_layout() {
    let mut view = unready_view(quarter_config());
    assert!(view.visible_dates().is_empty());

    let seen: Rc<RefCell<Option<VisibleDates>>> = Rc::new(RefCell::new(None));
    let sink = seen.clone();
    view.visible_dates_with(Box::new(move |visible| {
        *sink.borrow_mut() = Some(visible.clone());
    }));
    assert!(seen.borrow().is_none());

    view.surface_mut().ready = true;
    view.poll_readiness();
    let seen = seen.borrow();
    let visible = seen.as_ref().unwrap();
    assert_eq!(visible.first_month_date(), Some(date(2024, 1, 1)));
    assert_eq!(visible.in_dates, vec![(date(2023, 12, 31), GridAddress::new(0, 0))]);
}

#[test]
fn deferred_reload_validates_now_and_applies_later() {
    let mut view = unready_view(quarter_config());
    let bad = CalendarConfig::new(date(2024, 5, 1), date(2024, 1, 1));
    assert!(view
        .reload_data(ReloadRequest {
            config: Some(bad),
            ..ReloadRequest::default()
        })
        .is_err());
    assert_eq!(view.pending_operations(), 0);

    view.reload_data(ReloadRequest {
        config: Some(CalendarConfig::new(date(2024, 6, 1), date(2024, 7, 31))),
        anchor: Some(date(2024, 7, 4)),
        ..ReloadRequest::default()
    })
    .unwrap();
    assert_eq!(view.config().start, date(2024, 1, 1));

    view.surface_mut().ready = true;
    view.poll_readiness();
    assert_eq!(view.config().start, date(2024, 6, 1));
    assert_eq!(view.surface().reloads, 2);
    assert_eq!(view.current_section(), Some(1));
}

#[test]
fn deferred_deselect_all_runs_after_deferred_selection() {
    let mut view = unready_view(multi_config());
    view.select_dates(&[date(2024, 2, 2), date(2024, 2, 3)], false, false);
    view.deselect_all_dates(false);
    view.select_dates(&[date(2024, 2, 9)], false, false);

    view.surface_mut().ready = true;
    view.poll_readiness();
    assert_eq!(view.selected_dates(), vec![date(2024, 2, 9)]);
}
