/// Serial NDJSON transport for device messages.
///
/// The firmware logs every encoded message through `esp-println`, so a
/// host reading the serial port sees one JSON object per line.
use crate::protocol::{DeviceMessage, MsgBuffer, MAX_MSG_LEN};

/// Serial baud rate
pub const SERIAL_BAUD: u32 = 115200;

/// Serialize a DeviceMessage to JSON bytes and write to the output buffer.
/// Returns the number of bytes written, or None if serialization failed.
pub fn serialize_message(msg: &DeviceMessage, buf: &mut [u8]) -> Option<usize> {
    match serde_json_core::to_slice(msg, buf) {
        Ok(len) => {
            // Append newline for NDJSON
            if len < buf.len() {
                buf[len] = b'\n';
                Some(len + 1)
            } else {
                Some(len)
            }
        }
        Err(_) => None,
    }
}

/// Encode a message into a fresh NDJSON line.
pub fn encode(msg: &DeviceMessage) -> Option<MsgBuffer> {
    let mut buf = MsgBuffer::new();
    buf.resize_default(MAX_MSG_LEN).ok()?;
    let len = serialize_message(msg, &mut buf)?;
    buf.truncate(len);
    Some(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialized_message_ends_with_newline() {
        let msg = DeviceMessage::Battery {
            mv: 4000,
            pct: 83,
            charging: true,
        };
        let mut buf = [0u8; 128];
        let len = serialize_message(&msg, &mut buf).unwrap();
        assert_eq!(buf[len - 1], b'\n');
        assert_eq!(buf[0], b'{');
    }

    #[test]
    fn serialize_into_tiny_buffer_fails() {
        let msg = DeviceMessage::Status {
            uptime: 1,
            board: "tinypico",
            version: "0.1.0",
        };
        let mut buf = [0u8; 8];
        assert_eq!(serialize_message(&msg, &mut buf), None);
    }

    #[test]
    fn exact_fit_has_no_room_for_newline() {
        let msg = DeviceMessage::Touch {
            face: "U",
            press: "click",
            ts: 5,
        };
        let json = br#"{"type":"touch","face":"U","press":"click","ts":5}"#;
        let mut buf = [0u8; 50];
        assert_eq!(json.len(), buf.len());
        assert_eq!(serialize_message(&msg, &mut buf), Some(50));
        assert_eq!(&buf, json);
    }

    #[test]
    fn encode_trims_to_line_length() {
        let msg = DeviceMessage::Pin {
            ports: 0,
            pin: 15,
            level: false,
            ts: 77,
        };
        let line = encode(&msg).unwrap();
        assert_eq!(
            &line[..],
            b"{\"type\":\"pin\",\"ports\":0,\"pin\":15,\"level\":false,\"ts\":77}\n"
        );
    }
}
