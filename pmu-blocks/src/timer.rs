//! Timer block
//!
//! A small state machine (`Idle -> Running -> Expired`, plus `Paused`)
//! driven once per tick with the trigger value and the absolute tick time.
//! Elapsed time is always recomputed from `start_time`, never accumulated,
//! so calling [`TimerState::update`] twice with the same `now_ms` is
//! harmless.

use crate::edge::EdgeMode;

/// Timer behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerMode {
    /// Output goes high once the trigger has been active for the duration
    #[default]
    DelayOn,
    /// Output follows the trigger high and drops the duration after release
    DelayOff,
    /// Fixed-length pulse; re-arms when the trigger is released
    Pulse,
    /// Fixed-length pulse; stays expired until explicitly reset
    OneShot,
    /// Fixed-length pulse; returns to idle on its own
    Monostable,
    /// Pulse that restarts on every qualifying trigger
    Retriggerable,
    /// Alternates on/off while running
    Blink,
}

impl TimerMode {
    pub const fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            0 => Self::DelayOn,
            1 => Self::DelayOff,
            2 => Self::Pulse,
            3 => Self::OneShot,
            4 => Self::Monostable,
            5 => Self::Retriggerable,
            6 => Self::Blink,
            _ => return None,
        })
    }
}

/// Timer state machine phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerPhase {
    #[default]
    Idle,
    Running,
    Expired,
    /// Frozen by [`TimerState::pause`]; elapsed time does not advance
    Paused,
}

/// Timer parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerConfig {
    pub mode: TimerMode,
    /// How the trigger input qualifies
    pub start_edge: EdgeMode,
    /// Delay/pulse length, or total blink time (0 = blink forever)
    pub duration_ms: u32,
    pub blink_on_ms: u32,
    pub blink_off_ms: u32,
}

/// Timer runtime state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerState {
    phase: TimerPhase,
    start_time: u32,
    paused_at: u32,
    last_trigger: bool,
    output: bool,
}

impl TimerState {
    /// Create an idle timer
    pub const fn new() -> Self {
        Self {
            phase: TimerPhase::Idle,
            start_time: 0,
            paused_at: 0,
            last_trigger: false,
            output: false,
        }
    }

    pub fn phase(&self) -> TimerPhase {
        self.phase
    }

    pub fn output(&self) -> i32 {
        self.output as i32
    }

    /// Return to idle with the output low
    ///
    /// The last trigger level is kept, so a held edge does not fire again.
    pub fn reset(&mut self) {
        self.phase = TimerPhase::Idle;
        self.start_time = 0;
        self.paused_at = 0;
        self.output = false;
    }

    /// Freeze a running timer
    pub fn pause(&mut self, now_ms: u32) {
        if self.phase == TimerPhase::Running {
            self.paused_at = now_ms;
            self.phase = TimerPhase::Paused;
        }
    }

    /// Continue a paused timer, shifting its start by the paused time
    pub fn resume(&mut self, now_ms: u32) {
        if self.phase == TimerPhase::Paused {
            let paused_for = now_ms.wrapping_sub(self.paused_at);
            self.start_time = self.start_time.wrapping_add(paused_for);
            self.phase = TimerPhase::Running;
        }
    }

    /// Time since the timer started, excluding paused time
    pub fn elapsed_ms(&self, now_ms: u32) -> u32 {
        match self.phase {
            TimerPhase::Running => now_ms.wrapping_sub(self.start_time),
            TimerPhase::Paused => self.paused_at.wrapping_sub(self.start_time),
            TimerPhase::Idle | TimerPhase::Expired => 0,
        }
    }

    /// Time left until the configured duration expires
    pub fn remaining_ms(&self, config: &TimerConfig, now_ms: u32) -> u32 {
        match self.phase {
            TimerPhase::Running | TimerPhase::Paused => {
                config.duration_ms.saturating_sub(self.elapsed_ms(now_ms))
            }
            TimerPhase::Idle | TimerPhase::Expired => 0,
        }
    }

    fn start(&mut self, now_ms: u32) {
        self.phase = TimerPhase::Running;
        self.start_time = now_ms;
    }

    fn running_for(&self, now_ms: u32, duration_ms: u32) -> bool {
        self.phase == TimerPhase::Running && self.elapsed_ms(now_ms) >= duration_ms
    }

    /// Advance the timer and return its output (0 or 1)
    pub fn update(&mut self, config: &TimerConfig, trigger: i32, now_ms: u32) -> i32 {
        let active = trigger != 0;
        let level = config.start_edge.is_level();
        let fired = config.start_edge.qualify(self.last_trigger, active);
        self.last_trigger = active;

        if self.phase == TimerPhase::Paused {
            return self.output();
        }

        let duration = config.duration_ms;
        match config.mode {
            TimerMode::DelayOn => {
                match self.phase {
                    TimerPhase::Idle if fired => self.start(now_ms),
                    TimerPhase::Running | TimerPhase::Expired if level && !active => {
                        self.phase = TimerPhase::Idle
                    }
                    TimerPhase::Expired if !level && fired => self.start(now_ms),
                    _ => {}
                }
                if self.running_for(now_ms, duration) {
                    self.phase = TimerPhase::Expired;
                }
                self.output = self.phase == TimerPhase::Expired;
            }
            TimerMode::DelayOff => {
                if level {
                    // Hold the timer at zero while the trigger is active
                    if active {
                        self.start(now_ms);
                    }
                } else if fired {
                    self.start(now_ms);
                }
                let holding = level && active;
                if !holding && self.running_for(now_ms, duration) {
                    self.phase = TimerPhase::Expired;
                }
                self.output = self.phase == TimerPhase::Running;
            }
            TimerMode::Pulse | TimerMode::OneShot | TimerMode::Monostable => {
                match self.phase {
                    TimerPhase::Idle if fired => self.start(now_ms),
                    TimerPhase::Expired if config.mode == TimerMode::Pulse => {
                        self.rearm(level, active, fired, now_ms)
                    }
                    _ => {}
                }
                if self.running_for(now_ms, duration) {
                    self.phase = if config.mode == TimerMode::Monostable {
                        TimerPhase::Idle
                    } else {
                        TimerPhase::Expired
                    };
                }
                self.output = self.phase == TimerPhase::Running;
            }
            TimerMode::Retriggerable => {
                if fired {
                    self.start(now_ms);
                }
                if self.running_for(now_ms, duration) {
                    self.phase = TimerPhase::Expired;
                }
                self.output = self.phase == TimerPhase::Running;
            }
            TimerMode::Blink => {
                match self.phase {
                    TimerPhase::Idle if fired => self.start(now_ms),
                    TimerPhase::Running if level && !active => self.phase = TimerPhase::Idle,
                    TimerPhase::Expired => self.rearm(level, active, fired, now_ms),
                    _ => {}
                }
                if duration > 0 && self.running_for(now_ms, duration) {
                    self.phase = TimerPhase::Expired;
                }
                self.output = self.phase == TimerPhase::Running
                    && blink_level(
                        self.elapsed_ms(now_ms),
                        config.blink_on_ms,
                        config.blink_off_ms,
                    );
            }
        }

        self.output()
    }

    /// Leave `Expired`: level triggers must drop first, edges restart directly
    fn rearm(&mut self, level: bool, active: bool, fired: bool, now_ms: u32) {
        if level {
            if !active {
                self.phase = TimerPhase::Idle;
            }
        } else if fired {
            self.start(now_ms);
        }
    }
}

/// Blink output for a given elapsed time: on for `on_ms`, then off for `off_ms`
pub fn blink_level(elapsed_ms: u32, on_ms: u32, off_ms: u32) -> bool {
    let period = on_ms as u64 + off_ms as u64;
    if period == 0 {
        return false;
    }
    (elapsed_ms as u64 % period) < on_ms as u64
}
