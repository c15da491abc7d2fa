/// Broadlink RM3 infrared remote: learning-mode commands.
///
/// Every RM request is command `0x6a` with a 16-byte aligned payload whose
/// first byte selects the operation. Packet framing and encryption belong
/// to the `DeviceSocket` implementation; this module only decides which
/// bytes go out and reports them to a `TrafficObserver`.

use thiserror::Error;
use tracing::{debug, warn};

/// Command byte for all remote (RM) payloads.
pub const COMMAND_RM: u8 = 0x6a;

pub const LEARNING_CONTROL_COMMAND_LEARN: &str = "learn";
pub const LEARNING_CONTROL_COMMAND_CHECK: &str = "check";

const OP_SEND_DATA: u8 = 0x02;
const OP_ENTER_LEARNING: u8 = 0x03;
const OP_CHECK_DATA: u8 = 0x04;

/// Payloads are padded to a multiple of this.
pub const PAYLOAD_BLOCK: usize = 16;

/// Offset of learnt code bytes in a check-data reply.
const RESPONSE_DATA_OFFSET: usize = 4;

#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("Device I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Code of {0} bytes is too long to send")]
    CodeTooLong(usize),
}

/// Transport to the device (framing, encryption, UDP).
pub trait DeviceSocket {
    /// Sends one command and returns the decrypted reply payload.
    fn send_and_receive(&mut self, command: u8, payload: &[u8], purpose: &str) -> Result<Vec<u8>, DeviceError>;
}

/// Sees every command before it is handed to the socket.
pub trait TrafficObserver {
    fn on_command_sent(&self, command: u8);
    fn on_bytes_sent(&self, bytes: &[u8]);
}

/// Observer that does nothing.
pub struct NoTraffic;

impl TrafficObserver for NoTraffic {
    fn on_command_sent(&self, _command: u8) {}
    fn on_bytes_sent(&self, _bytes: &[u8]) {}
}

/// Builds an RM payload: operation byte, then `body`, zero padded to
/// a whole number of blocks.
fn rm_payload(operation: u8, body: &[u8]) -> Vec<u8> {
    let len = (1 + body.len()).div_ceil(PAYLOAD_BLOCK) * PAYLOAD_BLOCK;
    let mut payload = vec![0u8; len];
    payload[0] = operation;
    payload[1..=body.len()].copy_from_slice(body);
    payload
}

/// RM3 remote handler.
pub struct RemoteModel3<D: DeviceSocket, O: TrafficObserver = NoTraffic> {
    socket: D,
    observer: O,
}

impl<D: DeviceSocket> RemoteModel3<D, NoTraffic> {
    pub fn new(socket: D) -> Self {
        Self::with_observer(socket, NoTraffic)
    }
}

impl<D: DeviceSocket, O: TrafficObserver> RemoteModel3<D, O> {
    pub fn with_observer(socket: D, observer: O) -> Self {
        Self { socket, observer }
    }

    /// Handles a learning control command.
    ///
    /// `"learn"` puts the device into learning mode and returns `None`.
    /// `"check"` asks for the last learnt code and returns it if the
    /// device has one. Anything else is ignored.
    pub fn handle_learning_command(&mut self, command: &str) -> Result<Option<Vec<u8>>, DeviceError> {
        match command {
            LEARNING_CONTROL_COMMAND_LEARN => {
                self.send(rm_payload(OP_ENTER_LEARNING, &[]), "enter remote code learning mode")?;
                Ok(None)
            }
            LEARNING_CONTROL_COMMAND_CHECK => {
                let response = self.send(rm_payload(OP_CHECK_DATA, &[]), "check for learnt data")?;
                if response.len() <= RESPONSE_DATA_OFFSET {
                    return Ok(None);
                }
                Ok(Some(response[RESPONSE_DATA_OFFSET..].to_vec()))
            }
            other => {
                warn!("Unknown learning control command '{}'", other);
                Ok(None)
            }
        }
    }

    /// Transmits a previously learnt IR/RF code.
    pub fn send_code(&mut self, code: &[u8]) -> Result<(), DeviceError> {
        // 0x02, three reserved bytes, then the code
        let mut body = vec![0u8; 3];
        body.extend_from_slice(code);
        if body.len() > u16::MAX as usize {
            return Err(DeviceError::CodeTooLong(code.len()));
        }
        self.send(rm_payload(OP_SEND_DATA, &body), "send remote code")?;
        Ok(())
    }

    fn send(&mut self, payload: Vec<u8>, purpose: &str) -> Result<Vec<u8>, DeviceError> {
        debug!("Sending 0x{:02x} ({} bytes) to {}", COMMAND_RM, payload.len(), purpose);
        self.observer.on_command_sent(COMMAND_RM);
        self.observer.on_bytes_sent(&payload);
        self.socket.send_and_receive(COMMAND_RM, &payload, purpose)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct CannedSocket {
        response: Vec<u8>,
        sent: Vec<(u8, Vec<u8>)>,
    }

    impl CannedSocket {
        fn replying(response: Vec<u8>) -> Self {
            Self { response, sent: Vec::new() }
        }
    }

    impl DeviceSocket for CannedSocket {
        fn send_and_receive(&mut self, command: u8, payload: &[u8], _purpose: &str) -> Result<Vec<u8>, DeviceError> {
            self.sent.push((command, payload.to_vec()));
            Ok(self.response.clone())
        }
    }

    #[derive(Default)]
    struct RecordingObserver {
        commands: RefCell<Vec<u8>>,
        bytes: RefCell<Vec<Vec<u8>>>,
    }

    impl TrafficObserver for &RecordingObserver {
        fn on_command_sent(&self, command: u8) {
            self.commands.borrow_mut().push(command);
        }

        fn on_bytes_sent(&self, bytes: &[u8]) {
            self.bytes.borrow_mut().push(bytes.to_vec());
        }
    }

    #[test]
    fn test_sends_expected_bytes_when_entering_learn_mode() {
        let observer = RecordingObserver::default();
        let mut model3 = RemoteModel3::with_observer(CannedSocket::replying(vec![0u8; 112]), &observer);

        let result = model3.handle_learning_command(LEARNING_CONTROL_COMMAND_LEARN).unwrap();
        assert!(result.is_none());

        assert_eq!(observer.commands.borrow().as_slice(), &[0x6a]);

        let bytes = observer.bytes.borrow();
        assert_eq!(bytes.len(), 1);
        let sent = &bytes[0];
        assert_eq!(sent.len(), 16);
        assert_eq!(sent[0], 0x03); // 0x03, then fifteen zeroes
        assert!(sent[1..].iter().all(|b| *b == 0x00));
    }

    #[test]
    fn test_check_returns_code_after_header() {
        let mut response = vec![0x04, 0x00, 0x00, 0x00];
        response.extend_from_slice(&[0x26, 0x00, 0x1a, 0x00]);
        let mut model3 = RemoteModel3::new(CannedSocket::replying(response));

        let code = model3.handle_learning_command(LEARNING_CONTROL_COMMAND_CHECK).unwrap();

        assert_eq!(code, Some(vec![0x26, 0x00, 0x1a, 0x00]));
        let (command, payload) = &model3.socket.sent[0];
        assert_eq!(*command, COMMAND_RM);
        assert_eq!(payload[0], 0x04);
        assert_eq!(payload.len(), 16);
    }

    #[test]
    fn test_check_without_learnt_code_is_none() {
        let mut model3 = RemoteModel3::new(CannedSocket::replying(vec![0x04, 0, 0, 0]));
        assert_eq!(model3.handle_learning_command("check").unwrap(), None);
    }

    #[test]
    fn test_unknown_learning_command_sends_nothing() {
        let mut model3 = RemoteModel3::new(CannedSocket::replying(Vec::new()));
        assert_eq!(model3.handle_learning_command("forget").unwrap(), None);
        assert!(model3.socket.sent.is_empty());
    }

    #[test]
    fn test_send_code_pads_to_block_size() {
        let mut model3 = RemoteModel3::new(CannedSocket::replying(Vec::new()));
        let code: Vec<u8> = (1..=20).collect();

        model3.send_code(&code).unwrap();

        let (_, payload) = &model3.socket.sent[0];
        assert_eq!(payload.len(), 32);
        assert_eq!(&payload[..4], &[0x02, 0x00, 0x00, 0x00]);
        assert_eq!(&payload[4..24], code.as_slice());
        assert!(payload[24..].iter().all(|b| *b == 0));
    }
}
