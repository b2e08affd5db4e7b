use std::thread;
use std::time::Instant;

use anyhow::Result;
use log::{debug, info};

use ch8vm_core::{Cadence, Chip8, ExecError, Frame, Status};

/// Something the host wants the machine to know about.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HostEvent {
    Quit,
    TogglePause,
    KeyDown(u8),
    KeyUp(u8),
}

/// A display, a keypad and a speaker the host loop can drive.
pub trait Frontend {
    /// Drains whatever happened since the last poll.
    fn poll_events(&mut self) -> Vec<HostEvent>;

    fn render(&mut self, frame: &Frame) -> Result<()>;

    /// Called whenever the sound timer starts or stops wanting a beep.
    fn set_sound(&mut self, on: bool);
}

/// How fast the host clocks the machine.
#[derive(Copy, Clone, Debug)]
pub struct Settings {
    /// Instructions per second.
    pub cpu_hz: u32,
    /// Timer ticks per second.
    pub timer_hz: u32,
    /// Stop after this many steps.
    pub max_cycles: Option<u64>,
}

/// Why the host loop stopped.
#[derive(Debug, PartialEq)]
pub enum Outcome {
    /// The frontend asked to quit.
    Quit,
    /// The program ran off the end of memory.
    Terminated,
    Faulted(ExecError),
    CycleLimit,
}

// A stalled host catches up on at most a tenth of a second
fn max_burst(hz: u32) -> u32 {
    (hz / 10).max(1)
}

/// Drives `chip8` until the frontend quits, the program stops or the cycle limit is hit.
///
/// Each pass renders a changed frame, handles events, steps the CPU and ticks the timers as
/// often as their clocks say, then sleeps until whichever clock is due next.
pub fn run<F: Frontend>(chip8: &mut Chip8, frontend: &mut F, settings: &Settings) -> Result<Outcome> {
    let start = Instant::now();
    let mut cpu = Cadence::new(settings.cpu_hz, start, max_burst(settings.cpu_hz));
    let mut timers = Cadence::new(settings.timer_hz, start, max_burst(settings.timer_hz));
    let mut cycles: u64 = 0;
    let mut sound = false;

    let outcome = 'event: loop {
        if let Some(frame) = chip8.take_frame() {
            frontend.render(&frame)?;
        }

        for event in frontend.poll_events() {
            match event {
                HostEvent::Quit => break 'event Outcome::Quit,
                HostEvent::TogglePause => chip8.toggle_pause(),
                // Input doesn't reach a paused machine
                HostEvent::KeyDown(_) | HostEvent::KeyUp(_) if chip8.status() == Status::Paused => {
                    debug!("dropping {:?} while paused", event)
                }
                HostEvent::KeyDown(key) => chip8.key_press(key),
                HostEvent::KeyUp(key) => chip8.key_release(key),
            }
        }

        let now = Instant::now();
        for _ in 0..cpu.due(now) {
            if chip8.status() == Status::Paused {
                break;
            }
            match chip8.step() {
                Ok(Status::Halted) => break 'event Outcome::Terminated,
                Ok(_) => {}
                Err(err) => break 'event Outcome::Faulted(err),
            }
            cycles += 1;
            if settings.max_cycles.map_or(false, |max| cycles >= max) {
                break 'event Outcome::CycleLimit;
            }
        }

        for _ in 0..timers.due(now) {
            chip8.tick_timers();
        }

        if chip8.sound_active() != sound {
            sound = !sound;
            frontend.set_sound(sound);
        }

        let next = cpu.deadline().min(timers.deadline());
        let now = Instant::now();
        if next > now {
            thread::sleep(next - now);
        }
    };

    // Show whatever was drawn last
    if let Some(frame) = chip8.take_frame() {
        frontend.render(&frame)?;
    }
    if sound {
        frontend.set_sound(false);
    }

    info!("stopped after {} cycles: {:?}", cycles, outcome);
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;
    use ch8vm_core::constants::MAX_PROGRAM_SIZE;
    use ch8vm_core::{Config, Fault};

    /// Plays back a fixed list of event batches, one per poll.
    #[derive(Default)]
    struct Scripted {
        events: VecDeque<Vec<HostEvent>>,
        frames: Vec<Frame>,
        sound: Vec<bool>,
    }

    impl Scripted {
        fn new(events: Vec<Vec<HostEvent>>) -> Self {
            Scripted {
                events: events.into(),
                ..Scripted::default()
            }
        }
    }

    impl Frontend for Scripted {
        fn poll_events(&mut self) -> Vec<HostEvent> {
            self.events.pop_front().unwrap_or_default()
        }

        fn render(&mut self, frame: &Frame) -> Result<()> {
            self.frames.push(*frame);
            Ok(())
        }

        fn set_sound(&mut self, on: bool) {
            self.sound.push(on);
        }
    }

    fn chip8_with(program: &[u8]) -> Chip8 {
        let mut chip8 = Chip8::with_config(Config {
            seed: Some(8),
            ..Config::default()
        });
        chip8.load(program).unwrap();
        chip8
    }

    fn fast(max_cycles: u64) -> Settings {
        Settings {
            cpu_hz: 100_000,
            timer_hz: 60,
            max_cycles: Some(max_cycles),
        }
    }

    #[test]
    fn test_stops_at_cycle_limit() {
        let mut chip8 = chip8_with(&[0x70, 0x01, 0x12, 0x00]);
        let mut frontend = Scripted::default();
        let outcome = run(&mut chip8, &mut frontend, &fast(100)).unwrap();
        assert_eq!(outcome, Outcome::CycleLimit);
        assert_eq!(chip8.state().v[0x0], 50);
    }

    #[test]
    fn test_quit_before_stepping() {
        let mut chip8 = chip8_with(&[0x70, 0x01, 0x12, 0x00]);
        let mut frontend = Scripted::new(vec![vec![HostEvent::Quit]]);
        let outcome = run(&mut chip8, &mut frontend, &fast(100)).unwrap();
        assert_eq!(outcome, Outcome::Quit);
        assert_eq!(chip8.state().pc, 0x200);
    }

    #[test]
    fn test_reports_fault() {
        let mut chip8 = chip8_with(&[0x00, 0xEE]);
        let mut frontend = Scripted::default();
        match run(&mut chip8, &mut frontend, &fast(100)).unwrap() {
            Outcome::Faulted(err) => assert_eq!(err.fault, Fault::StackUnderflow),
            outcome => panic!("unexpected outcome {:?}", outcome),
        }
    }

    #[test]
    fn test_terminates_at_end_of_memory() {
        // LD V0, 0 filling all of program memory
        let program: Vec<u8> = [0x60, 0x00]
            .iter()
            .cycle()
            .take(MAX_PROGRAM_SIZE)
            .cloned()
            .collect();
        let mut chip8 = chip8_with(&program);
        let mut frontend = Scripted::default();
        let outcome = run(&mut chip8, &mut frontend, &fast(5_000)).unwrap();
        assert_eq!(outcome, Outcome::Terminated);
        assert_eq!(chip8.fault(), None);
    }

    #[test]
    fn test_renders_last_frame() {
        // LD F, V0; DRW V0, V0, 5; JP 0x204
        let mut chip8 = chip8_with(&[0xF0, 0x29, 0xD0, 0x05, 0x12, 0x04]);
        let mut frontend = Scripted::default();
        run(&mut chip8, &mut frontend, &fast(20)).unwrap();
        let frame = frontend.frames.last().expect("a frame should be rendered");
        // Top row of the 0 glyph is 0xF0
        assert_eq!(frame[0][0..8], [1, 1, 1, 1, 0, 0, 0, 0]);
    }

    #[test]
    fn test_key_reaches_waiting_program() {
        // LD V0, K; JP 0x202
        let program = [0xF0, 0x0A, 0x12, 0x02];
        let mut chip8 = chip8_with(&program);
        let mut frontend = Scripted::new(vec![vec![], vec![HostEvent::KeyDown(0x5)]]);
        run(&mut chip8, &mut frontend, &fast(50)).unwrap();
        assert_eq!(chip8.state().v[0x0], 0x5);
    }

    #[test]
    fn test_keys_dropped_while_paused() {
        let program = [0xF0, 0x0A, 0x12, 0x02];
        let mut chip8 = chip8_with(&program);
        let mut frontend = Scripted::new(vec![
            vec![],
            vec![
                HostEvent::TogglePause,
                HostEvent::KeyDown(0x5),
                HostEvent::TogglePause,
            ],
        ]);
        let outcome = run(&mut chip8, &mut frontend, &fast(50)).unwrap();
        assert_eq!(outcome, Outcome::CycleLimit);
        assert_eq!(chip8.state().v[0x0], 0x0);
        assert_eq!(chip8.status(), Status::AwaitingKey { register: 0x0 });
    }

    #[test]
    fn test_sound_follows_sound_timer() {
        // LD V0, 2; LD ST, V0; JP 0x204
        let mut chip8 = chip8_with(&[0x60, 0x02, 0xF0, 0x18, 0x12, 0x04]);
        let mut frontend = Scripted::default();
        let settings = Settings {
            cpu_hz: 10_000,
            timer_hz: 60,
            max_cycles: Some(2_000),
        };
        run(&mut chip8, &mut frontend, &settings).unwrap();
        assert_eq!(frontend.sound, vec![true, false]);
    }
}
