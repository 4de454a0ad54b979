//! Payload builders shared by the handoff smoke benchmarks.

/// Builds a synthetic RFC 822 message of exactly `len` bytes.
pub fn synthetic_eml(len: usize) -> Vec<u8> {
    let mut bytes = b"From: bench@example.test\r\nTo: inbox@example.test\r\nSubject: bench\r\n\r\n".to_vec();
    let mut line = 0_u32;
    while bytes.len() < len {
        bytes.extend_from_slice(format!("line {line}: lorem ipsum dolor sit amet\r\n").as_bytes());
        line += 1;
    }
    bytes.truncate(len);
    bytes
}
