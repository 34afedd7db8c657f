//! Edge detection over 16-bit GPIO port snapshots.
//!
//! Diffs each new snapshot against the previous one and reports every
//! watched bit that flipped, lowest bit first. Inputs are active-low
//! (pulled-up buttons), so the reported level is the inverted pin value.

/// Change notification: (port snapshot, bit index, logical level).
pub type ChangeCallback = fn(u16, u8, bool);

/// Watch every pin.
pub const WATCH_ALL: u16 = 0xFFFF;

/// Runtime port watch configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortWatchConfig {
    /// Bits to report changes for
    pub mask: u16,
}

impl PortWatchConfig {
    pub const fn new() -> Self {
        Self { mask: WATCH_ALL }
    }
}

impl Default for PortWatchConfig {
    fn default() -> Self {
        Self::new()
    }
}

pub struct PortChangeDetector {
    previous: u16,
    mask: u16,
    handler: Option<ChangeCallback>,
}

impl PortChangeDetector {
    pub const fn new() -> Self {
        Self {
            previous: 0,
            mask: WATCH_ALL,
            handler: None,
        }
    }

    pub fn configure(&mut self, mask: u16, handler: Option<ChangeCallback>) {
        self.mask = mask;
        self.handler = handler;
    }

    /// Set the baseline without reporting anything.
    pub fn seed(&mut self, snapshot: u16) {
        self.previous = snapshot;
    }

    pub fn poll(&mut self, snapshot: u16) {
        let mut diff = (snapshot ^ self.previous) & self.mask;
        self.previous = snapshot;

        let Some(handler) = self.handler else {
            return;
        };

        while diff != 0 {
            let bit = diff.trailing_zeros() as u8;
            let level = snapshot & (1 << bit) == 0;
            log::debug!("pin {} changed, active={}", bit, level);
            handler(snapshot, bit, level);
            diff &= diff - 1;
        }
    }

    pub fn previous(&self) -> u16 {
        self.previous
    }

    pub fn mask(&self) -> u16 {
        self.mask
    }
}

impl Default for PortChangeDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::vec::Vec;

    std::thread_local! {
        static EVENTS: RefCell<Vec<(u16, u8, bool)>> = const { RefCell::new(Vec::new()) };
    }

    fn record(ports: u16, bit: u8, level: bool) {
        EVENTS.with(|e| e.borrow_mut().push((ports, bit, level)));
    }

    fn take_events() -> Vec<(u16, u8, bool)> {
        EVENTS.with(|e| core::mem::take(&mut *e.borrow_mut()))
    }

    fn detector(mask: u16) -> PortChangeDetector {
        let mut d = PortChangeDetector::new();
        d.configure(mask, Some(record));
        d
    }

    #[test]
    fn single_rising_bit_reports_inverted_level() {
        let mut d = detector(WATCH_ALL);
        d.seed(0b0000);
        d.poll(0b0001);
        assert_eq!(take_events(), [(0b0001, 0, false)]);

        d.poll(0b0001);
        assert!(take_events().is_empty());
    }

    #[test]
    fn falling_bit_reports_active() {
        let mut d = detector(WATCH_ALL);
        d.seed(0xFFFF);
        d.poll(0xFFFF & !(1 << 12));
        assert_eq!(take_events(), [(0xEFFF, 12, true)]);
    }

    #[test]
    fn multiple_changes_in_ascending_order() {
        let mut d = detector(WATCH_ALL);
        d.seed(0x0000);
        d.poll(0x8101);
        assert_eq!(
            take_events(),
            [(0x8101, 0, false), (0x8101, 8, false), (0x8101, 15, false)]
        );
    }

    #[test]
    fn unwatched_bits_are_silent_but_tracked() {
        let mut d = detector(0x00FF);
        d.seed(0x0000);
        d.poll(0x0F01);
        assert_eq!(take_events(), [(0x0F01, 0, false)]);
        assert_eq!(d.previous(), 0x0F01);

        // Restoring the high byte does not replay anything
        d.poll(0x0001);
        assert!(take_events().is_empty());
    }

    #[test]
    fn seed_emits_nothing() {
        let mut d = detector(WATCH_ALL);
        d.seed(0x1234);
        assert!(take_events().is_empty());
        assert_eq!(d.previous(), 0x1234);
    }

    #[test]
    fn missing_handler_still_advances_baseline() {
        let mut d = PortChangeDetector::new();
        d.seed(0);
        d.poll(0xFFFF);
        assert_eq!(d.previous(), 0xFFFF);
        d.configure(WATCH_ALL, Some(record));
        d.poll(0xFFFF);
        assert!(take_events().is_empty());
    }

    #[test]
    fn default_mask_watches_all_pins() {
        assert_eq!(PortChangeDetector::new().mask(), 0xFFFF);
        assert_eq!(PortWatchConfig::default().mask, WATCH_ALL);
    }
}
