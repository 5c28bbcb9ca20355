use std::error::Error;
use std::fs;

use clap::Parser;
use env_logger::Env;
use log::info;

use chip8vm::config::{Args, Config};
use chip8vm::display::MonoTermDisplay;
use chip8vm::environment::Environment;
use chip8vm::input::TermInput;
use chip8vm::interpreter::Interpreter;
use chip8vm::sound::{Mute, SimpleBeep, Sound};

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();
    let args = Args::parse();
    let config = Config::from(&args);

    // load a program before touching the terminal, so errors print normally
    let rom = fs::read(&args.rom)?;
    let mut interpreter = Interpreter::new();
    interpreter.load(&rom)?;
    info!("loaded {} ({} bytes)", args.rom.display(), rom.len());

    let mut sound: Box<dyn Sound> = if config.mute {
        Box::new(Mute::new())
    } else {
        Box::new(SimpleBeep::new())
    };
    let exit = {
        let mut input = TermInput::new(config.hold_frames)?;
        let mut display = MonoTermDisplay::new()?;
        let mut environment = Environment::new(
            interpreter,
            &mut display,
            &mut input,
            sound.as_mut(),
            config,
        );
        environment.main_loop(None)
        // display and input drop here, giving the terminal back
    };
    info!("stopped: {:?}", exit?);
    Ok(())
}
