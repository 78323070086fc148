use std::collections::HashMap;
use std::time::{Duration, Instant};

// A single named stopwatch.  Accumulates elapsed time across
// repeated start / stop cycles until reset.
#[derive(Debug, Default, Clone)]
struct Stopwatch {
    start: Option<Instant>,
    elapsed: Duration,
}

impl Stopwatch {
    fn start(&mut self) {
        self.start = Some(Instant::now());
    }

    fn stop(&mut self) {
        if let Some(instant) = self.start.take() {
            self.elapsed += instant.elapsed();
        }
    }

    // total time including any currently running interval
    fn total(&self) -> Duration {
        match self.start {
            Some(instant) => self.elapsed + instant.elapsed(),
            None => self.elapsed,
        }
    }
}

/// Phase timers for the solver.   Timers are keyed by phase name and
/// may be nested, with the innermost running timer on top of `stack`.
#[derive(Default, Debug, Clone)]
pub struct Timers {
    stack: Vec<&'static str>,
    watches: HashMap<&'static str, Stopwatch>,
}

impl Timers {
    // also drops a stale entry left by an early return inside timeit!
    pub fn reset_timer(&mut self, key: &'static str) {
        self.stack.retain(|&k| k != key);
        self.watches.insert(key, Stopwatch::default());
    }

    pub fn start_as_current(&mut self, key: &'static str) {
        self.watches.entry(key).or_default().start();
        self.stack.push(key);
    }

    pub fn stop_current(&mut self) {
        if let Some(key) = self.stack.pop() {
            if let Some(w) = self.watches.get_mut(key) {
                w.stop();
            }
        }
    }

    /// Accumulated time for the named timer, including any running interval
    pub fn elapsed(&self, key: &'static str) -> Duration {
        self.watches
            .get(key)
            .map_or(Duration::ZERO, Stopwatch::total)
    }
}

macro_rules! timeit {
    ($timer:expr => $key:literal; $($tt:tt)+) => {

        $timer.start_as_current($key);
        $(
            $tt
        )+
        $timer.stop_current();
    }
}
pub(crate) use timeit;

#[test]
fn test_timer_nesting() {
    let mut timers = Timers::default();
    timers.reset_timer("outer");

    timeit! {timers => "outer";
        timeit! {timers => "inner";
            std::thread::sleep(Duration::from_millis(2));
        }
        std::thread::sleep(Duration::from_millis(1));
    }

    let outer = timers.elapsed("outer");
    let inner = timers.elapsed("inner");
    assert!(inner >= Duration::from_millis(2));
    assert!(outer >= inner + Duration::from_millis(1));
    assert_eq!(timers.elapsed("missing"), Duration::ZERO);
}
