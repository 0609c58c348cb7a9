//! Latches and flip-flops
//!
//! Clocked types (D, T, JK) act on the rising edge of the clock input.
//! Latches (SR, D latch, T latch) are level-sensitive.

/// Flip-flop channel type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlipFlopKind {
    /// Set/reset latch
    Sr,
    /// D flip-flop, clocked
    D,
    /// Toggle flip-flop, clocked
    T,
    /// JK flip-flop, clocked
    Jk,
    /// Transparent D latch (clock input acts as enable)
    DLatch,
    /// Toggles every update while enabled and T is high
    TLatch,
}

impl FlipFlopKind {
    pub const fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            0 => Self::Sr,
            1 => Self::D,
            2 => Self::T,
            3 => Self::Jk,
            4 => Self::DLatch,
            5 => Self::TLatch,
            _ => return None,
        })
    }

    /// Check if this type needs a clock/enable input
    pub const fn uses_clock(self) -> bool {
        !matches!(self, Self::Sr)
    }
}

/// SR latch next state; both inputs high resets
#[inline]
pub const fn sr_latch(q: bool, set: bool, reset: bool) -> bool {
    if reset {
        false
    } else if set {
        true
    } else {
        q
    }
}

/// SR latch with selectable priority when both inputs are high
#[inline]
pub const fn sr_latch_priority(q: bool, set: bool, reset: bool, set_wins: bool) -> bool {
    match (set, reset) {
        (true, true) => set_wins,
        (true, false) => true,
        (false, true) => false,
        (false, false) => q,
    }
}

/// JK next state for one clock edge
#[inline]
pub const fn jk(q: bool, j: bool, k: bool) -> bool {
    match (j, k) {
        (false, false) => q,
        (true, false) => true,
        (false, true) => false,
        (true, true) => !q,
    }
}

/// Flip-flop runtime state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FlipFlopState {
    q: bool,
    last_clock: bool,
}

impl FlipFlopState {
    pub const fn new(initial: bool) -> Self {
        Self {
            q: initial,
            last_clock: false,
        }
    }

    pub fn q(&self) -> i32 {
        self.q as i32
    }

    /// Record the clock level and report a rising edge
    fn clock_edge(&mut self, clock: i32) -> bool {
        let now = clock != 0;
        let rising = now && !self.last_clock;
        self.last_clock = now;
        rising
    }

    pub fn sr(&mut self, set: i32, reset: i32) -> i32 {
        self.q = sr_latch(self.q, set != 0, reset != 0);
        self.q()
    }

    pub fn sr_priority(&mut self, set: i32, reset: i32, set_wins: bool) -> i32 {
        self.q = sr_latch_priority(self.q, set != 0, reset != 0, set_wins);
        self.q()
    }

    pub fn d(&mut self, d: i32, clock: i32) -> i32 {
        if self.clock_edge(clock) {
            self.q = d != 0;
        }
        self.q()
    }

    pub fn t(&mut self, t: i32, clock: i32) -> i32 {
        if self.clock_edge(clock) && t != 0 {
            self.q = !self.q;
        }
        self.q()
    }

    pub fn jk(&mut self, j: i32, k: i32, clock: i32) -> i32 {
        if self.clock_edge(clock) {
            self.q = jk(self.q, j != 0, k != 0);
        }
        self.q()
    }

    pub fn d_latch(&mut self, d: i32, enable: i32) -> i32 {
        if enable != 0 {
            self.q = d != 0;
        }
        self.q()
    }

    pub fn t_latch(&mut self, t: i32, enable: i32) -> i32 {
        if enable != 0 && t != 0 {
            self.q = !self.q;
        }
        self.q()
    }

    /// Dispatch on the flip-flop type
    ///
    /// `a` is S/D/T/J, `b` is R/K, `clock` is the clock or latch enable.
    pub fn update(&mut self, kind: FlipFlopKind, set_wins: bool, a: i32, b: i32, clock: i32) -> i32 {
        match kind {
            FlipFlopKind::Sr if set_wins => self.sr_priority(a, b, true),
            FlipFlopKind::Sr => self.sr(a, b),
            FlipFlopKind::D => self.d(a, clock),
            FlipFlopKind::T => self.t(a, clock),
            FlipFlopKind::Jk => self.jk(a, b, clock),
            FlipFlopKind::DLatch => self.d_latch(a, clock),
            FlipFlopKind::TLatch => self.t_latch(a, clock),
        }
    }
}
