/// Per-channel press classification.
///
/// A `ChannelDebouncer` turns a noisy "is this channel active" sample into
/// click and long-press notifications. Classification happens on release,
/// so one hold resolves to at most one terminal event.
use crate::error::Error;

/// Millisecond timestamp from a free-running counter. Wraps.
pub type Timestamp = u32;

/// Zero-argument event notification (activate, click, long-press).
pub type Callback = fn();

/// Default hold time before a release counts as a click.
pub const DEFAULT_CLICK_MS: u32 = 100;

/// Default hold time before a release counts as a long press.
pub const DEFAULT_LONG_PRESS_MS: u32 = 300;

/// Validated click / long-press threshold pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    click: u32,
    long_press: u32,
}

impl Thresholds {
    /// Rejects `click >= long_press`.
    pub const fn new(click: u32, long_press: u32) -> Result<Self, Error> {
        if click >= long_press {
            return Err(Error::InvalidThresholds { click, long_press });
        }
        Ok(Self { click, long_press })
    }

    pub const fn click(&self) -> u32 {
        self.click
    }

    pub const fn long_press(&self) -> u32 {
        self.long_press
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            click: DEFAULT_CLICK_MS,
            long_press: DEFAULT_LONG_PRESS_MS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressState {
    Idle,
    /// Held since the contained timestamp
    Active(Timestamp),
}

/// Outcome of a completed press cycle, for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Press {
    Click,
    LongPress,
    /// Released without a handler firing
    Ignored,
}

impl Press {
    pub fn as_str(&self) -> &'static str {
        match self {
            Press::Click => "click",
            Press::LongPress => "long_press",
            Press::Ignored => "ignored",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ChannelDebouncer {
    state: PressState,
    thresholds: Thresholds,
    on_activate: Option<Callback>,
    on_click: Option<Callback>,
    on_long_press: Option<Callback>,
}

impl ChannelDebouncer {
    pub const fn new(thresholds: Thresholds, on_activate: Option<Callback>) -> Self {
        Self {
            state: PressState::Idle,
            thresholds,
            on_activate,
            on_click: None,
            on_long_press: None,
        }
    }

    /// Replace the click handler. `None` disables clicks only.
    pub fn bind_click(&mut self, handler: Option<Callback>) {
        self.on_click = handler;
    }

    /// Replace the long-press handler. `None` disables long presses only.
    pub fn bind_long_press(&mut self, handler: Option<Callback>) {
        self.on_long_press = handler;
    }

    pub fn has_click(&self) -> bool {
        self.on_click.is_some()
    }

    pub fn has_long_press(&self) -> bool {
        self.on_long_press.is_some()
    }

    pub fn state(&self) -> PressState {
        self.state
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    pub fn reset(&mut self) {
        self.state = PressState::Idle;
    }

    /// Advance the state machine by one sample.
    ///
    /// Returns true when this call moved the channel between idle and
    /// active in either direction.
    pub fn poll(&mut self, is_active: bool, now: Timestamp) -> bool {
        match (self.state, is_active) {
            (PressState::Idle, true) => {
                self.state = PressState::Active(now);
                if let Some(f) = self.on_activate {
                    f();
                }
                true
            }
            (PressState::Active(since), false) => {
                let press = self.classify(now.wrapping_sub(since));
                log::debug!("release after {}ms: {}", now.wrapping_sub(since), press.as_str());
                self.reset();
                true
            }
            _ => false,
        }
    }

    // Long press is checked first; a long hold with only a click handler
    // bound still fires the click.
    fn classify(&self, elapsed: u32) -> Press {
        if elapsed > self.thresholds.long_press {
            if let Some(f) = self.on_long_press {
                f();
                return Press::LongPress;
            }
        }
        if elapsed > self.thresholds.click {
            if let Some(f) = self.on_click {
                f();
                return Press::Click;
            }
        }
        Press::Ignored
    }
}

impl Default for ChannelDebouncer {
    fn default() -> Self {
        Self::new(Thresholds::default(), None)
    }
}
