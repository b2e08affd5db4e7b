use std::time::{Duration, Instant};

/// # Timers
/// Two 8-bit counters that count down towards 0 once per tick.
///
/// - the delay timer is read and written by programs to pace themselves
/// - the sound timer beeps for as long as it is above 0
///
/// Ticks come from the host at `TIMER_HZ` no matter how many instructions ran in between;
/// instructions only ever read or set the counters.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Timers {
    pub delay: u8,
    pub sound: u8,
}

impl Timers {
    /// Decrements each counter that is above 0.
    pub fn tick(&mut self) {
        self.delay = self.delay.saturating_sub(1);
        self.sound = self.sound.saturating_sub(1);
    }

    pub fn sound_active(&self) -> bool {
        self.sound > 0
    }
}

/// # Cadence
/// Turns wall clock time into a number of fixed-length periods.
///
/// Used by the host loop to drive both the instruction clock and the timer ticks.
pub struct Cadence {
    period: Duration,
    next: Instant,
    max_burst: u32,
}

impl Cadence {
    /// A cadence of `hz` periods per second whose first period ends one period after `start`.
    ///
    /// A stalled host catches up on at most `max_burst` periods per call to `due`; anything
    /// older is dropped.
    pub fn new(hz: u32, start: Instant, max_burst: u32) -> Self {
        // Past 1GHz a period would round down to nothing
        let period = (Duration::from_secs(1) / hz.max(1)).max(Duration::from_nanos(1));
        Cadence {
            period,
            next: start + period,
            max_burst: max_burst.max(1),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// When the next period ends.
    pub fn deadline(&self) -> Instant {
        self.next
    }

    /// Counts the periods that have ended by `now` and consumes them.
    pub fn due(&mut self, now: Instant) -> u32 {
        if now < self.next {
            return 0;
        }

        let elapsed = now - self.next;
        let owed = 1 + (elapsed.as_nanos() / self.period.as_nanos()) as u64;
        if owed > u64::from(self.max_burst) {
            self.next = now + self.period;
            self.max_burst
        } else {
            self.next += self.period * owed as u32;
            owed as u32
        }
    }
}
