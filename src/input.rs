use crossterm::event::{poll, read, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal;
use log::{debug, warn};
use std::collections::{HashMap, VecDeque};
use std::io;
use std::time::Duration;

/// map of keyboard characters to CHIP-8 keys, using the left-hand side of a
/// qwerty keyboard:
///   1 2 3 4        1 2 3 C
///   q w e r   =>   4 5 6 D
///   a s d f        7 8 9 E
///   z x c v        A 0 B F
pub const CHIP8_CONVENTIONAL_KEYMAP: [(char, u8); 16] = [
    ('x', 0x00), // x
    ('1', 0x01), // 1
    ('2', 0x02), // 2
    ('3', 0x03), // 3
    ('q', 0x04), // q
    ('w', 0x05), // w
    ('e', 0x06), // e
    ('a', 0x07), // a
    ('s', 0x08), // s
    ('d', 0x09), // d
    ('z', 0x0a), // z
    ('c', 0x0b), // c
    ('4', 0x0c), // 4
    ('r', 0x0d), // r
    ('f', 0x0e), // f
    ('v', 0x0f), // v
];

/// what the user asked for since the last poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// a logical key 0x0-0xF went down
    KeyDown(u8),
    KeyUp(u8),
    /// run one instruction (manual mode)
    Step,
    /// reload the program
    Reset,
    Quit,
}

/// reads user input, once per frame
pub trait Input {
    /// everything that happened since the last call, in order
    fn poll(&mut self) -> Result<Vec<InputEvent>, io::Error>;
}

/// Keyboard input from the terminal via crossterm. Terminals only report
/// presses (and autorepeat), so each mapped key is held down for
/// `hold_frames` polls after its last press and then released.
pub struct TermInput {
    keymap: HashMap<char, u8>,
    held: HashMap<u8, u32>,
    hold_frames: u32,
}

impl TermInput {
    pub fn new(hold_frames: u32) -> Result<Self, io::Error> {
        terminal::enable_raw_mode()?;
        Ok(TermInput {
            keymap: HashMap::from(CHIP8_CONVENTIONAL_KEYMAP),
            held: HashMap::new(),
            hold_frames: hold_frames.max(1),
        })
    }

    fn translate(&mut self, evt: KeyEvent, events: &mut Vec<InputEvent>) {
        match evt.code {
            KeyCode::Char('c') if evt.modifiers.contains(KeyModifiers::CONTROL) => {
                events.push(InputEvent::Quit)
            }
            KeyCode::Esc => events.push(InputEvent::Quit),
            KeyCode::Char(' ') => events.push(InputEvent::Step),
            KeyCode::Backspace => events.push(InputEvent::Reset),
            KeyCode::Char(key) => match self.keymap.get(&key.to_ascii_lowercase()) {
                Some(&mapped_key) => {
                    if self.held.insert(mapped_key, self.hold_frames).is_none() {
                        events.push(InputEvent::KeyDown(mapped_key));
                    }
                }
                None => debug!("can't map {:?} to a CHIP-8 key", key),
            },
            other => debug!("ignoring key {:?}", other),
        }
    }

    /// count down held keys, releasing any that have run out
    fn age_held_keys(&mut self, events: &mut Vec<InputEvent>) {
        let mut released: Vec<u8> = Vec::new();
        for (key, frames) in self.held.iter_mut() {
            *frames -= 1;
            if *frames == 0 {
                released.push(*key);
            }
        }
        released.sort_unstable();
        for key in released {
            self.held.remove(&key);
            events.push(InputEvent::KeyUp(key));
        }
    }
}

impl Drop for TermInput {
    fn drop(&mut self) {
        if let Err(e) = terminal::disable_raw_mode() {
            warn!("couldn't restore terminal mode: {}", e);
        }
    }
}

impl Input for TermInput {
    fn poll(&mut self) -> Result<Vec<InputEvent>, io::Error> {
        let mut events = Vec::new();
        self.age_held_keys(&mut events);
        while poll(Duration::from_millis(0))? {
            match read()? {
                Event::Key(evt) => self.translate(evt, &mut events),
                Event::Resize(..) => {}
                other => debug!("ignoring event {:?}", other),
            }
        }
        Ok(events)
    }
}

/// dummy Input implementation for testing; replays one batch of events per poll
pub struct DummyInput {
    frames: VecDeque<Vec<InputEvent>>,
}

impl DummyInput {
    pub fn new(frames: Vec<Vec<InputEvent>>) -> Self {
        DummyInput {
            frames: VecDeque::from(frames),
        }
    }
}

impl Input for DummyInput {
    fn poll(&mut self) -> Result<Vec<InputEvent>, io::Error> {
        Ok(self.frames.pop_front().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// TermInput without touching the real terminal
    fn term_input(hold_frames: u32) -> TermInput {
        TermInput {
            keymap: HashMap::from(CHIP8_CONVENTIONAL_KEYMAP),
            held: HashMap::new(),
            hold_frames,
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_keymap_covers_all_keys() {
        let map = HashMap::from(CHIP8_CONVENTIONAL_KEYMAP);
        let mut keys: Vec<u8> = map.values().copied().collect();
        keys.sort_unstable();
        assert_eq!(keys, (0..16).collect::<Vec<u8>>());
    }

    #[test]
    fn test_press_then_release_after_hold() {
        let mut input = term_input(2);
        let mut events = Vec::new();
        input.translate(key(KeyCode::Char('W')), &mut events);
        assert_eq!(events, vec![InputEvent::KeyDown(0x5)]);

        events.clear();
        input.age_held_keys(&mut events);
        assert!(events.is_empty());
        input.age_held_keys(&mut events);
        assert_eq!(events, vec![InputEvent::KeyUp(0x5)]);
    }

    #[test]
    fn test_repeat_extends_hold_without_new_keydown() {
        let mut input = term_input(2);
        let mut events = Vec::new();
        input.translate(key(KeyCode::Char('v')), &mut events);
        input.age_held_keys(&mut events);
        input.translate(key(KeyCode::Char('v')), &mut events);
        input.age_held_keys(&mut events);
        assert_eq!(events, vec![InputEvent::KeyDown(0xf)]);
        input.age_held_keys(&mut events);
        assert_eq!(events.last(), Some(&InputEvent::KeyUp(0xf)));
    }

    #[test]
    fn test_control_keys() {
        let mut input = term_input(1);
        let mut events = Vec::new();
        input.translate(key(KeyCode::Char(' ')), &mut events);
        input.translate(key(KeyCode::Backspace), &mut events);
        input.translate(key(KeyCode::Esc), &mut events);
        input.translate(
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
            &mut events,
        );
        input.translate(key(KeyCode::Char('p')), &mut events);
        assert_eq!(
            events,
            vec![
                InputEvent::Step,
                InputEvent::Reset,
                InputEvent::Quit,
                InputEvent::Quit
            ]
        );
    }

    #[test]
    fn test_dummy_replays_then_goes_quiet() -> Result<(), io::Error> {
        let mut input = DummyInput::new(vec![vec![InputEvent::KeyDown(1)], vec![]]);
        assert_eq!(input.poll()?, vec![InputEvent::KeyDown(1)]);
        assert!(input.poll()?.is_empty());
        assert!(input.poll()?.is_empty());
        Ok(())
    }
}
