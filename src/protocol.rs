/// JSON event protocol for input and board state.
///
/// All messages are newline-delimited JSON (NDJSON), one object per event.
/// Uses `heapless` types for no_std/no-alloc operation.
use heapless::Vec;
use serde::Serialize;

/// Messages sent from the device to the host
#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum DeviceMessage<'a> {
    /// Completed touch press on a labelled pad
    #[serde(rename = "touch")]
    Touch {
        /// Face label printed on the shield
        face: &'a str,
        /// "click" or "long_press"
        press: &'static str,
        /// Uptime in milliseconds at release
        ts: u32,
    },
    /// Expander pin changed level
    #[serde(rename = "pin")]
    Pin {
        /// Both ports, A in the low byte
        ports: u16,
        pin: u8,
        /// Logical level (true = pressed, inputs are active low)
        level: bool,
        ts: u32,
    },
    /// Battery reading
    #[serde(rename = "battery")]
    Battery {
        /// Millivolts
        mv: u32,
        /// Rough charge estimate, 0-100
        pct: u8,
        charging: bool,
    },
    /// Device status report
    #[serde(rename = "status")]
    Status {
        /// Uptime in seconds
        uptime: u32,
        /// Board identifier
        board: &'static str,
        /// Firmware version
        version: &'static str,
    },
}

/// Firmware version string
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Maximum size of a serialized JSON message
pub const MAX_MSG_LEN: usize = 128;

/// Buffer type for serialized JSON messages
pub type MsgBuffer = Vec<u8, MAX_MSG_LEN>;

#[cfg(test)]
mod tests {
    use super::*;

    fn to_json(msg: &DeviceMessage) -> std::string::String {
        let mut buf = [0u8; MAX_MSG_LEN];
        let len = serde_json_core::to_slice(msg, &mut buf).unwrap();
        std::string::String::from_utf8(buf[..len].to_vec()).unwrap()
    }

    // ── DeviceMessage serialization ─────────────────────────────────

    #[test]
    fn serialize_touch_message() {
        let json = to_json(&DeviceMessage::Touch {
            face: "A",
            press: "long_press",
            ts: 4200,
        });
        assert_eq!(json, r#"{"type":"touch","face":"A","press":"long_press","ts":4200}"#);
    }

    #[test]
    fn serialize_pin_message() {
        let json = to_json(&DeviceMessage::Pin {
            ports: 0xFFF7,
            pin: 3,
            level: true,
            ts: 10,
        });
        assert!(json.contains(r#""type":"pin""#));
        assert!(json.contains(r#""ports":65527"#));
        assert!(json.contains(r#""pin":3"#));
        assert!(json.contains(r#""level":true"#));
    }

    #[test]
    fn serialize_battery_message() {
        let json = to_json(&DeviceMessage::Battery {
            mv: 3912,
            pct: 76,
            charging: false,
        });
        assert_eq!(json, r#"{"type":"battery","mv":3912,"pct":76,"charging":false}"#);
    }

    #[test]
    fn serialize_status_message() {
        let json = to_json(&DeviceMessage::Status {
            uptime: 120,
            board: "tinypico_explorer",
            version: "0.1.0",
        });
        assert!(json.contains(r#""type":"status""#));
        assert!(json.contains(r#""uptime":120"#));
        assert!(json.contains(r#""board":"tinypico_explorer""#));
    }

    // ── Version constant ────────────────────────────────────────────

    #[test]
    fn version_is_semver() {
        let parts: heapless::Vec<&str, 4> = VERSION.split('.').collect();
        assert_eq!(
            parts.len(),
            3,
            "VERSION should be semver (major.minor.patch)"
        );
        for part in &parts {
            assert!(part.parse::<u32>().is_ok(), "'{part}' is not a number");
        }
    }
}
