/// the fixed rate timers count down at, whatever the instruction rate
pub const TIMER_HZ: u32 = 60;

/// Delay and sound countdowns. Neither goes below zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimerUnit {
    delay: u8,
    sound: u8,
}

impl TimerUnit {
    pub fn new() -> Self {
        TimerUnit { delay: 0, sound: 0 }
    }

    /// one 60 Hz tick
    pub fn tick(&mut self) {
        self.delay = self.delay.saturating_sub(1);
        self.sound = self.sound.saturating_sub(1);
    }

    pub fn delay(&self) -> u8 {
        self.delay
    }

    pub fn set_delay(&mut self, value: u8) {
        self.delay = value;
    }

    pub fn sound(&self) -> u8 {
        self.sound
    }

    pub fn set_sound(&mut self, value: u8) {
        self.sound = value;
    }

    /// the tone should be playing
    pub fn is_sounding(&self) -> bool {
        self.sound > 0
    }
}
