use crate::timer::TIMER_HZ;
use clap::Parser;
use log::warn;
use std::num::NonZeroU32;
use std::path::PathBuf;

/// Command line for the terminal front end
#[derive(Parser, Debug, Clone)]
#[command(name = "chip8vm", version, about = "CHIP-8 interpreter for the terminal")]
pub struct Args {
    /// CHIP-8 program image to run
    pub rom: PathBuf,

    /// instructions per second; zero or less means single-step with space
    #[arg(long, default_value_t = 60, allow_negative_numbers = true)]
    pub rate: i64,

    /// don't beep
    #[arg(long)]
    pub mute: bool,

    /// show registers next to the screen
    #[arg(long)]
    pub debug: bool,

    /// 60 Hz frames a key stays down after a press; terminals don't report releases
    #[arg(long, default_value_t = 6)]
    pub hold_frames: u32,
}

/// how fast instructions run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleRate {
    PerSecond(NonZeroU32),
    /// one instruction per step request
    Manual,
}

impl CycleRate {
    /// anything that isn't a positive number falls back to manual stepping
    pub fn from_requested(rate: i64) -> Self {
        match u32::try_from(rate).ok().and_then(NonZeroU32::new) {
            Some(r) => CycleRate::PerSecond(r),
            None => {
                warn!("cycle rate {} is not positive, single-stepping instead", rate);
                CycleRate::Manual
            }
        }
    }

    /// Instructions to run in a 60 Hz frame. `carry` holds the fractional
    /// remainder between frames so rates that aren't multiples of 60 come
    /// out right over a second.
    pub fn cycles_for_frame(&self, carry: &mut u32) -> u32 {
        match self {
            CycleRate::Manual => 0,
            CycleRate::PerSecond(rate) => {
                let total = *carry as u64 + rate.get() as u64;
                *carry = (total % TIMER_HZ as u64) as u32;
                (total / TIMER_HZ as u64) as u32
            }
        }
    }
}

/// everything the environment needs to know, minus the ROM itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub rate: CycleRate,
    pub mute: bool,
    pub debug: bool,
    pub hold_frames: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            rate: CycleRate::PerSecond(NonZeroU32::new(60).unwrap_or(NonZeroU32::MIN)),
            mute: false,
            debug: false,
            hold_frames: 6,
        }
    }
}

impl From<&Args> for Config {
    fn from(args: &Args) -> Self {
        Config {
            rate: CycleRate::from_requested(args.rate),
            mute: args.mute,
            debug: args.debug,
            hold_frames: args.hold_frames,
        }
    }
}
