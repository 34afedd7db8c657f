/// Capacitive touch pad set for the Explorer shield.
///
/// `TouchPads` owns one `ChannelDebouncer` per electrode, resolves face
/// labels printed on the shield to electrode indices, and tracks when any
/// pad last changed state. The raw sample is the MPR121 touch-status mask
/// (bit i = electrode i).
use crate::debounce::{Callback, ChannelDebouncer, Thresholds, Timestamp};

/// Number of electrodes on the MPR121.
pub const PAD_COUNT: usize = 12;

/// Static mapping from external labels to dense channel indices.
#[derive(Debug)]
pub struct ChannelMap<const N: usize> {
    labels: [char; N],
}

impl<const N: usize> ChannelMap<N> {
    pub const fn new(labels: [char; N]) -> Self {
        Self { labels }
    }

    /// Index of `label`, or `None` if it is not on this board.
    pub fn resolve(&self, label: char) -> Option<usize> {
        self.labels.iter().position(|&l| l == label)
    }

    /// Label at `index`.
    pub fn label(&self, index: usize) -> Option<char> {
        self.labels.get(index).copied()
    }

    pub const fn len(&self) -> usize {
        N
    }

    pub const fn is_empty(&self) -> bool {
        N == 0
    }
}

/// Face markings of the Explorer shield, in electrode order.
pub static EXPLORER_FACES: ChannelMap<PAD_COUNT> = ChannelMap::new([
    '3', '2', '1', 'D', 'L', 'R', '4', 'U', 'B', 'A', 'Y', 'X',
]);

/// Runtime touch configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TouchConfig {
    /// Hold time before a release counts as a click
    pub click_ms: u32,
    /// Hold time before a release counts as a long press
    pub long_press_ms: u32,
    /// Interval between `poll_all` calls in the firmware loop
    pub poll_interval_ms: u32,
}

impl TouchConfig {
    pub const fn new() -> Self {
        Self {
            click_ms: crate::debounce::DEFAULT_CLICK_MS,
            long_press_ms: crate::debounce::DEFAULT_LONG_PRESS_MS,
            poll_interval_ms: 10,
        }
    }

    pub fn thresholds(&self) -> Result<Thresholds, crate::error::Error> {
        Thresholds::new(self.click_ms, self.long_press_ms)
    }
}

impl Default for TouchConfig {
    fn default() -> Self {
        Self::new()
    }
}

pub struct TouchPads<const N: usize = PAD_COUNT> {
    map: &'static ChannelMap<N>,
    channels: [ChannelDebouncer; N],
    last_activity: Timestamp,
}

impl<const N: usize> TouchPads<N> {
    /// Build `N` channels sharing `on_activate` (e.g. a touch beep).
    pub fn new(
        map: &'static ChannelMap<N>,
        thresholds: Thresholds,
        on_activate: Option<Callback>,
        now: Timestamp,
    ) -> Self {
        log::info!("Touch pads ready: {} channels", N);
        Self {
            map,
            channels: [ChannelDebouncer::new(thresholds, on_activate); N],
            last_activity: now,
        }
    }

    pub fn resolve(&self, label: char) -> Option<usize> {
        self.map.resolve(label)
    }

    /// Attach handlers to the pad labelled `label`.
    ///
    /// `None` leaves the existing handler in place. Unknown labels are ignored.
    pub fn bind(&mut self, label: char, click: Option<Callback>, long_press: Option<Callback>) {
        let Some(idx) = self.map.resolve(label) else {
            log::debug!("No touch pad labelled '{}'", label);
            return;
        };
        let channel = &mut self.channels[idx];
        if click.is_some() {
            channel.bind_click(click);
        }
        if long_press.is_some() {
            channel.bind_long_press(long_press);
        }
    }

    /// Sample every pad once. Bit i of `touched` is pad i.
    ///
    /// Returns the time of the most recent press or release on any pad.
    pub fn poll_all(&mut self, touched: u16, now: Timestamp) -> Timestamp {
        for (i, channel) in self.channels.iter_mut().enumerate() {
            let active = i < 16 && touched & (1 << i) != 0;
            if channel.poll(active, now) {
                self.last_activity = now;
            }
        }

        // Zero means never set
        if self.last_activity == 0 {
            self.last_activity = now;
        }

        self.last_activity
    }

    pub fn last_activity(&self) -> Timestamp {
        self.last_activity
    }

    pub fn channel(&self, index: usize) -> Option<&ChannelDebouncer> {
        self.channels.get(index)
    }

    /// Force every pad back to idle without firing handlers.
    pub fn reset_all(&mut self) {
        for channel in self.channels.iter_mut() {
            channel.reset();
        }
    }
}
