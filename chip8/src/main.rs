use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;

use ch8vm_core::constants::PROGRAM_START;
use ch8vm_core::{disassemble, Chip8, Config, Quirks, CPU_HZ, TIMER_HZ};

use crate::headless::{frame_to_text, Headless};
use crate::run::{run, Outcome, Settings};

mod headless;
mod run;
#[cfg(feature = "sdl")]
mod sdl;

/// Runs a Chip-8 program image.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Path to the program image
    rom: PathBuf,

    /// Instructions executed per second
    #[arg(long, default_value_t = CPU_HZ, value_parser = clap::value_parser!(u32).range(1..=MAX_HZ))]
    cpu_hz: u32,

    /// Timer ticks per second
    #[arg(long, default_value_t = TIMER_HZ, value_parser = clap::value_parser!(u32).range(1..=MAX_HZ))]
    timer_hz: u32,

    /// Shift VY into VX for 8XY6 and 8XYE instead of shifting VX in place
    #[arg(long)]
    shift_from_vy: bool,

    /// Seed for the random number instruction
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many instructions
    #[arg(long)]
    max_cycles: Option<u64>,

    /// Run without a window and print the final display
    #[arg(long)]
    headless: bool,

    /// Window pixels per display pixel
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..))]
    scale: u32,

    /// Print a listing of the program and exit
    #[arg(long)]
    disassemble: bool,
}

// Clocks are counted in whole nanoseconds
const MAX_HZ: i64 = 1_000_000_000;

const EXIT_LOAD_FAILURE: u8 = 1;
const EXIT_FAULT: u8 = 3;
const EXIT_FRONTEND_FAILURE: u8 = 4;

fn main() -> ExitCode {
    let args = Args::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    match start(&args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(EXIT_LOAD_FAILURE)
        }
    }
}

fn start(args: &Args) -> Result<ExitCode> {
    let image = fs::read(&args.rom)
        .with_context(|| format!("unable to read {}", args.rom.display()))?;

    if args.disassemble {
        for line in disassemble(&image, PROGRAM_START) {
            println!("{}", line);
        }
        return Ok(ExitCode::SUCCESS);
    }

    let mut chip8 = Chip8::with_config(Config {
        quirks: Quirks {
            shift_from_vy: args.shift_from_vy,
        },
        seed: args.seed,
    });
    chip8
        .load(&image)
        .with_context(|| format!("unable to load {}", args.rom.display()))?;

    let settings = Settings {
        cpu_hz: args.cpu_hz,
        timer_hz: args.timer_hz,
        max_cycles: args.max_cycles,
    };

    let result = if args.headless {
        run_headless(&mut chip8, &settings)
    } else {
        run_windowed(&mut chip8, &settings, args.scale)
    };

    match &result {
        Ok(Outcome::Faulted(err)) => eprintln!("error: {}", err),
        Err(e) => eprintln!("error: {:#}", e),
        Ok(_) => {}
    }
    Ok(ExitCode::from(exit_status(&result)))
}

/// Maps how a run ended to the process exit status.
fn exit_status(result: &Result<Outcome>) -> u8 {
    match result {
        Ok(Outcome::Quit) | Ok(Outcome::Terminated) | Ok(Outcome::CycleLimit) => 0,
        Ok(Outcome::Faulted(_)) => EXIT_FAULT,
        Err(_) => EXIT_FRONTEND_FAILURE,
    }
}

fn run_headless(chip8: &mut Chip8, settings: &Settings) -> Result<Outcome> {
    let mut frontend = Headless::new();
    let outcome = run(chip8, &mut frontend, settings)?;
    if let Some(frame) = frontend.last_frame() {
        print!("{}", frame_to_text(frame));
    }
    Ok(outcome)
}

#[cfg(feature = "sdl")]
fn run_windowed(chip8: &mut Chip8, settings: &Settings, scale: u32) -> Result<Outcome> {
    let mut frontend = sdl::SdlFrontend::new(scale)?;
    run(chip8, &mut frontend, settings)
}

#[cfg(not(feature = "sdl"))]
fn run_windowed(chip8: &mut Chip8, settings: &Settings, scale: u32) -> Result<Outcome> {
    log::info!(
        "built without the sdl feature, ignoring --scale {} and running headless",
        scale
    );
    run_headless(chip8, settings)
}
