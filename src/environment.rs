use crate::config::{Config, CycleRate};
use crate::display::Display;
use crate::error::FrontendError;
use crate::input::{Input, InputEvent};
use crate::interpreter::{Interpreter, MachineState};
use crate::sound::Sound;
use crate::timer::TIMER_HZ;
use log::{debug, info};
use spin_sleep::LoopHelper;

/// why the main loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    Quit,
    FrameLimit,
}

/// Sets everything up and runs the main loop. Every 60 Hz frame:
///
///  * poll input and feed the keypad
///  * run this frame's share of instructions (or the requested single steps)
///  * tick the timers once
///  * start or stop the tone on sound timer edges
///  * draw
///
/// A fault halts the interpreter but not the loop: the screen stays up with
/// the register overlay and the fault until the user resets or quits.
pub struct Environment<'a> {
    interpreter: Interpreter,
    display: &'a mut dyn Display,
    input: &'a mut dyn Input,
    sound: &'a mut dyn Sound,
    config: Config,
    carry: u32,
    sounding: bool,
}

impl<'a> Environment<'a> {
    pub fn new(
        interpreter: Interpreter,
        display: &'a mut dyn Display,
        input: &'a mut dyn Input,
        sound: &'a mut dyn Sound,
        config: Config,
    ) -> Self {
        Environment {
            interpreter,
            display,
            input,
            sound,
            config,
            carry: 0,
            sounding: false,
        }
    }

    pub fn interpreter(&self) -> &Interpreter {
        &self.interpreter
    }

    /// run paced frames until the user quits or `max_frames` pass; if the
    /// interpreter is still halted at that point its fault is the error
    pub fn main_loop(&mut self, max_frames: Option<u64>) -> Result<Exit, FrontendError> {
        let mut pacer = LoopHelper::builder().build_with_target_rate(TIMER_HZ as f64);
        let mut frames = 0u64;
        info!("running at {:?}", self.config.rate);
        let exit = loop {
            if max_frames.is_some_and(|max| frames >= max) {
                break Exit::FrameLimit;
            }
            pacer.loop_start();
            if !self.frame()? {
                break Exit::Quit;
            }
            frames += 1;
            pacer.loop_sleep();
        };
        self.set_sound(false)?;
        match self.interpreter.halt_reason() {
            Some(fault) => Err(FrontendError::Runtime(fault.clone())),
            None => Ok(exit),
        }
    }

    /// one 60 Hz frame, unpaced; false once the user has asked to quit
    pub fn frame(&mut self) -> Result<bool, FrontendError> {
        let mut steps_requested = 0;
        for event in self.input.poll()? {
            match event {
                InputEvent::KeyDown(key) => self.interpreter.set_key_down(key),
                InputEvent::KeyUp(key) => self.interpreter.set_key_up(key),
                InputEvent::Step => steps_requested += 1,
                InputEvent::Reset => {
                    debug!("reset requested");
                    self.interpreter.reset();
                    self.carry = 0;
                }
                InputEvent::Quit => return Ok(false),
            }
        }

        let cycles = match self.config.rate {
            CycleRate::Manual => steps_requested,
            rate => rate.cycles_for_frame(&mut self.carry),
        };
        for _ in 0..cycles {
            if self.interpreter.state() == MachineState::Halted {
                break;
            }
            // the interpreter logs its own fault
            if self.interpreter.step().is_err() {
                break;
            }
        }
        self.interpreter.tick_timers();
        self.set_sound(self.interpreter.is_sounding())?;

        let overlay = match self.interpreter.halt_reason() {
            Some(fault) => Some(format!("{}\nhalted: {}", self.interpreter.snapshot(), fault)),
            None if self.config.debug || self.config.rate == CycleRate::Manual => {
                Some(self.interpreter.snapshot().to_string())
            }
            None => None,
        };
        self.display
            .draw(self.interpreter.framebuffer().as_bytes(), overlay.as_deref())?;
        Ok(true)
    }

    /// only talk to the sound device when the tone actually changes
    fn set_sound(&mut self, on: bool) -> Result<(), FrontendError> {
        if on == self.sounding {
            return Ok(());
        }
        let result = if on {
            self.sound.beep()
        } else {
            self.sound.stop()
        };
        result.map_err(|e| FrontendError::Sound(e.to_string()))?;
        self.sounding = on;
        Ok(())
    }
}
