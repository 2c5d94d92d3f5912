use super::*;

#[test]
fn manual_clock_only_moves_when_told() {
    let c = ManualClock::starting_at(Duration::from_millis(5));
    assert_eq!(c.now(), Duration::from_millis(5));
    c.advance(Duration::from_millis(10));
    assert_eq!(c.now(), Duration::from_millis(15));
    c.set(Duration::ZERO);
    assert_eq!(c.now(), Duration::ZERO);
}

#[test]
fn system_clock_is_monotonic() {
    let c = SystemClock::new();
    let a = c.now();
    let b = c.now();
    assert!(b >= a);
}

#[test]
fn repaint_loop_ticks_in_order() {
    let mut l = RepaintLoop::start(Duration::from_millis(2));
    let a = l.wait_tick().unwrap();
    let b = l.wait_tick().unwrap();
    assert!(b > a);
    l.cancel();
    assert!(l.is_cancelled());
    assert_eq!(l.wait_tick(), None);
}

#[test]
fn dropping_the_loop_joins_the_thread() {
    let l = RepaintLoop::start(Duration::from_millis(1));
    drop(l);
}

#[test]
fn cancel_joins_the_timer_thread() {
    let mut l = RepaintLoop::start(Duration::from_millis(1));
    l.wait_tick().unwrap();
    l.cancel();
    // The thread owned the only other handle to the flag.
    assert_eq!(Arc::strong_count(&l.cancelled), 1);
    assert!(l.handle.is_none());
    assert_eq!(l.try_tick(), None);
}

#[test]
fn try_tick_does_not_block_before_the_first_interval() {
    let l = RepaintLoop::start(Duration::from_secs(60));
    assert_eq!(l.try_tick(), None);
}
