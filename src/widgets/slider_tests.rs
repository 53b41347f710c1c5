//! Tests for the slider state machine.

use std::time::{Duration, Instant};

use rstest::{fixture, rstest};

use super::*;

struct Clock {
    start: Instant,
}

impl Clock {
    fn at(&self, millis: u64) -> Instant {
        self.start + Duration::from_millis(millis)
    }
}

#[fixture]
fn clock() -> Clock {
    Clock {
        start: Instant::now(),
    }
}

fn settings(columns: u32, autoplay: bool) -> SliderSettings {
    SliderSettings {
        columns,
        autoplay,
        autoplay_speed_ms: 5_000,
    }
}

fn slider(cards: usize, columns: u32, autoplay: bool, clock: &Clock) -> (Slider, ListenerRegistry) {
    let registry = ListenerRegistry::new();
    let attached = Slider::attach(settings(columns, autoplay), cards, &registry, clock.at(0));
    (attached, registry)
}

#[rstest]
#[case(12, 3, 4, 3)]
#[case(10, 3, 4, 3)]
#[case(2, 3, 1, 2)]
#[case(1, 1, 1, 1)]
#[case(7, 4, 2, 4)]
fn attach_paginates_and_shows_first_page(
    clock: Clock,
    #[case] cards: usize,
    #[case] columns: u32,
    #[case] pages: usize,
    #[case] active: usize,
) {
    let (slider, _registry) = slider(cards, columns, false, &clock);

    assert_eq!(slider.total_pages(), pages);
    assert_eq!(slider.current_page(), 0);
    assert_eq!(slider.active_range(), 0..active);
    assert_eq!(slider.indicators().len(), pages);
    assert_eq!(slider.indicators().first(), Some(&true));
    assert_eq!(slider.indicators().iter().filter(|on| **on).count(), 1);
}

#[rstest]
fn out_of_range_pages_are_ignored(clock: Clock) {
    let (mut slider, _registry) = slider(12, 3, false, &clock);

    assert!(!slider.show_page(4, clock.at(1_000)));
    assert!(!slider.show_page(usize::MAX, clock.at(1_000)));
    assert_eq!(slider.current_page(), 0);
    assert_eq!(slider.active_range(), 0..3);
}

#[rstest]
fn settle_window_blocks_rapid_changes(clock: Clock) {
    let (mut slider, _registry) = slider(12, 3, false, &clock);

    assert!(slider.is_settling(clock.at(100)));
    assert!(!slider.next(clock.at(100)));
    assert_eq!(slider.current_page(), 0);

    assert!(slider.next(clock.at(500)));
    assert_eq!(slider.current_page(), 1);
    assert!(!slider.next(clock.at(999)));
    assert!(slider.next(clock.at(1_000)));
    assert_eq!(slider.current_page(), 2);
}

#[rstest]
fn next_stops_at_last_page_without_autoplay(clock: Clock) {
    let (mut slider, _registry) = slider(12, 3, false, &clock);

    let moved: Vec<bool> = (1..=4)
        .map(|step| slider.press_next(clock.at(step * 600)))
        .collect();

    assert_eq!(moved, vec![true, true, true, false]);
    assert_eq!(slider.current_page(), 3);
    assert_eq!(slider.active_range(), 9..12);
    assert_eq!(
        slider.controls(),
        NavControls {
            previous_enabled: true,
            next_enabled: false,
        }
    );
}

#[rstest]
fn next_wraps_when_autoplay_is_configured(clock: Clock) {
    let (mut slider, _registry) = slider(12, 3, true, &clock);

    for step in 1..=4 {
        assert!(slider.next(clock.at(step * 600)));
    }

    assert_eq!(slider.current_page(), 0);
    assert!(slider.controls().next_enabled);
}

#[rstest]
fn previous_is_disabled_on_first_page(clock: Clock) {
    let (mut slider, _registry) = slider(12, 3, false, &clock);

    assert!(!slider.controls().previous_enabled);
    assert!(!slider.previous(clock.at(1_000)));
    assert_eq!(slider.current_page(), 0);
}

#[rstest]
fn go_to_infers_direction(clock: Clock) {
    let (mut slider, _registry) = slider(12, 3, false, &clock);

    assert!(slider.go_to(3, clock.at(600)));
    assert_eq!(slider.direction(), Direction::Forward);
    assert!(slider.go_to(1, clock.at(1_200)));
    assert_eq!(slider.direction(), Direction::Backward);
    assert_eq!(slider.indicators(), vec![false, true, false, false]);
}

#[rstest]
fn single_page_never_arms_autoplay(clock: Clock) {
    let (mut slider, _registry) = slider(3, 3, true, &clock);

    assert!(!slider.is_autoplaying());
    slider.pointer_enter();
    slider.pointer_leave(clock.at(100));
    assert!(!slider.is_autoplaying());
    assert!(!slider.poll(clock.at(60_000)));
    assert_eq!(slider.current_page(), 0);
}

#[rstest]
fn autoplay_cycles_back_to_first_page(clock: Clock) {
    let (mut slider, _registry) = slider(12, 3, true, &clock);
    assert!(slider.is_autoplaying());

    assert!(!slider.poll(clock.at(4_999)));
    let pages: Vec<usize> = (1..=4)
        .map(|tick| {
            slider.poll(clock.at(tick * 5_000));
            slider.current_page()
        })
        .collect();

    assert_eq!(pages, vec![1, 2, 3, 0]);
}

#[rstest]
fn manual_navigation_stops_autoplay(clock: Clock) {
    let (mut slider, _registry) = slider(12, 3, true, &clock);

    slider.select_indicator(2, clock.at(1_000));
    assert!(!slider.is_autoplaying());
    assert_eq!(slider.current_page(), 2);
    assert!(!slider.poll(clock.at(20_000)));
    assert_eq!(slider.current_page(), 2);
}

#[rstest]
fn hover_pauses_and_leave_resumes(clock: Clock) {
    let (mut slider, _registry) = slider(12, 3, true, &clock);

    slider.pointer_enter();
    assert!(!slider.is_autoplaying());
    assert!(!slider.poll(clock.at(6_000)));

    slider.pointer_leave(clock.at(7_000));
    assert!(slider.is_autoplaying());
    assert!(!slider.poll(clock.at(11_999)));
    assert!(slider.poll(clock.at(12_000)));
    assert_eq!(slider.current_page(), 1);
}

#[rstest]
fn leave_restarts_autoplay_after_manual_stop(clock: Clock) {
    let (mut slider, _registry) = slider(12, 3, true, &clock);

    slider.press_next(clock.at(1_000));
    assert!(!slider.is_autoplaying());
    slider.pointer_enter();
    slider.pointer_leave(clock.at(2_000));
    assert!(slider.is_autoplaying());
}

#[rstest]
fn leave_without_configured_autoplay_stays_still(clock: Clock) {
    let (mut slider, _registry) = slider(12, 3, false, &clock);

    slider.pointer_enter();
    slider.pointer_leave(clock.at(1_000));
    assert!(!slider.is_autoplaying());
}

#[rstest]
fn arrow_keys_need_the_pointer(clock: Clock) {
    let (mut slider, _registry) = slider(12, 3, true, &clock);

    assert!(!slider.on_key(NavKey::Right, clock.at(1_000)));
    assert_eq!(slider.current_page(), 0);
    assert!(slider.is_autoplaying());

    slider.pointer_enter();
    assert!(slider.on_key(NavKey::Right, clock.at(1_000)));
    assert_eq!(slider.current_page(), 1);
    assert!(slider.on_key(NavKey::Left, clock.at(2_000)));
    assert_eq!(slider.current_page(), 0);
    assert!(!slider.is_autoplaying());
}

#[rstest]
#[case(300, 200, Some(1))]
#[case(300, 249, Some(1))]
#[case(300, 250, None)]
#[case(300, 350, None)]
#[case(100, 151, None)]
fn swipe_threshold_from_first_page(
    clock: Clock,
    #[case] start_x: i32,
    #[case] end_x: i32,
    #[case] expected_page: Option<usize>,
) {
    let (mut slider, _registry) = slider(12, 3, true, &clock);

    let swiped = slider.swipe(start_x, end_x, clock.at(1_000));

    assert_eq!(swiped, (start_x - end_x).abs() > SWIPE_THRESHOLD_PX);
    assert_eq!(slider.current_page(), expected_page.unwrap_or(0));
    assert_eq!(slider.is_autoplaying(), !swiped);
}

#[rstest]
fn rightward_swipe_goes_back(clock: Clock) {
    let (mut slider, _registry) = slider(12, 3, false, &clock);
    slider.go_to(2, clock.at(600));

    assert!(slider.swipe(100, 200, clock.at(1_200)));
    assert_eq!(slider.current_page(), 1);
}

#[rstest]
#[case(320, 4, 1)]
#[case(480, 4, 1)]
#[case(481, 4, 2)]
#[case(768, 1, 1)]
#[case(900, 4, 3)]
#[case(1024, 2, 2)]
#[case(1025, 4, 4)]
#[case(1920, 0, 1)]
fn breakpoints_cap_configured_columns(
    #[case] width: u32,
    #[case] configured: u32,
    #[case] expected: u32,
) {
    assert_eq!(columns_for_width(width, configured), expected);
}

#[rstest]
fn resize_is_debounced(clock: Clock) {
    let (mut slider, _registry) = slider(12, 3, false, &clock);

    slider.on_resize(400, clock.at(1_000));
    slider.on_resize(420, clock.at(1_200));
    assert!(!slider.poll(clock.at(1_400)));
    assert_eq!(slider.columns(), 3);

    assert!(slider.poll(clock.at(1_450)));
    assert_eq!(slider.columns(), 1);
    assert_eq!(slider.total_pages(), 12);
}

#[rstest]
fn column_changes_keep_page_in_range(clock: Clock) {
    let (mut slider, _registry) = slider(12, 3, false, &clock);
    slider.go_to(3, clock.at(600));

    slider.on_resize(400, clock.at(2_000));
    slider.poll(clock.at(2_250));
    assert_eq!((slider.columns(), slider.total_pages()), (1, 12));
    assert_eq!(slider.current_page(), 3);
    assert_eq!(slider.active_range(), 3..4);

    slider.go_to(11, clock.at(3_000));
    slider.on_resize(700, clock.at(4_000));
    slider.poll(clock.at(4_250));
    assert_eq!((slider.columns(), slider.total_pages()), (2, 6));
    assert_eq!(slider.current_page(), 5);

    slider.on_resize(1_280, clock.at(5_000));
    slider.poll(clock.at(5_250));
    assert_eq!((slider.columns(), slider.total_pages()), (3, 4));
    assert_eq!(slider.current_page(), 3);
    assert_eq!(slider.indicators(), vec![false, false, false, true]);
}

#[rstest]
fn column_change_applies_during_settle_window(clock: Clock) {
    let (mut slider, _registry) = slider(12, 3, false, &clock);
    slider.go_to(3, clock.at(600));

    slider.on_resize(1_280, clock.at(700));
    slider.on_resize(400, clock.at(750));
    slider.next(clock.at(850));
    assert!(slider.poll(clock.at(1_000)));
    assert_eq!(slider.columns(), 1);
    assert_eq!(slider.active_range(), 3..4);
}

#[rstest]
fn same_column_count_is_not_a_change(clock: Clock) {
    let (mut slider, _registry) = slider(12, 3, false, &clock);

    slider.on_resize(1_000, clock.at(1_000));
    assert!(!slider.poll(clock.at(1_300)));
    assert_eq!(slider.total_pages(), 4);
}

#[rstest]
fn empty_slider_is_inert(clock: Clock) {
    let (mut slider, _registry) = slider(0, 3, true, &clock);

    assert!(slider.is_inert());
    assert_eq!(slider.total_pages(), 0);
    assert!(!slider.is_autoplaying());
    assert!(!slider.press_next(clock.at(1_000)));
    assert!(!slider.press_previous(clock.at(1_000)));
    assert!(!slider.select_indicator(0, clock.at(1_000)));
    slider.on_resize(400, clock.at(1_000));
    assert!(slider.poll(clock.at(2_000)));
    assert_eq!(slider.total_pages(), 0);
    assert_eq!(slider.active_range(), 0..0);
    assert!(slider.indicators().is_empty());
    assert!(!slider.controls().next_enabled);
}

#[rstest]
fn dispose_is_idempotent_and_unsubscribes(clock: Clock) {
    let (mut slider, registry) = slider(12, 3, true, &clock);
    let id = slider.subscriber();
    assert!(registry.is_listening(id, PageEventKind::Resize));
    assert!(registry.is_listening(id, PageEventKind::Key));

    assert!(slider.dispose());
    assert!(!slider.dispose());

    assert!(slider.is_disposed());
    assert!(!slider.is_autoplaying());
    assert!(!registry.is_listening(id, PageEventKind::Resize));
    assert_eq!(registry.listener_count(), 0);
    assert!(!slider.next(clock.at(10_000)));
    assert!(!slider.poll(clock.at(60_000)));
    assert_eq!(slider.current_page(), 0);
}
