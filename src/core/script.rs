// src/core/script.rs
//! Minimal script builder.
//!
//! Only what the genesis coinbase needs: opcodes, number pushes and data pushes.
//! Scripts are never executed here.

/// Opcodes (minimal subset).
pub const OP_0: u8 = 0x00;
pub const OP_PUSHDATA1: u8 = 0x4c;
pub const OP_PUSHDATA2: u8 = 0x4d;
pub const OP_PUSHDATA4: u8 = 0x4e;
pub const OP_1NEGATE: u8 = 0x4f;
pub const OP_1: u8 = 0x51;
pub const OP_16: u8 = 0x60;

/// Little-endian sign-magnitude encoding of a script number, minimal length.
/// Zero encodes as an empty vector.
pub fn encode_num(n: i64) -> Vec<u8> {
    if n == 0 {
        return Vec::new();
    }

    let negative = n < 0;
    let mut abs = n.unsigned_abs();
    let mut out = Vec::with_capacity(9);
    while abs > 0 {
        out.push((abs & 0xff) as u8);
        abs >>= 8;
    }

    // The top bit carries the sign; add a byte if it is already taken.
    let last = out.len() - 1;
    if out[last] & 0x80 != 0 {
        out.push(if negative { 0x80 } else { 0x00 });
    } else if negative {
        out[last] |= 0x80;
    }
    out
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptBuilder {
    bytes: Vec<u8>,
}

impl ScriptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_opcode(mut self, op: u8) -> Self {
        self.bytes.push(op);
        self
    }

    /// Push a small integer as its opcode (`OP_0`, `OP_1NEGATE`, `OP_1`..`OP_16`),
    /// anything else as an encoded number.
    pub fn push_int(self, n: i64) -> Self {
        match n {
            0 => self.push_opcode(OP_0),
            -1 => self.push_opcode(OP_1NEGATE),
            1..=16 => self.push_opcode(OP_1 + (n as u8) - 1),
            _ => self.push_num(n),
        }
    }

    /// Push a number as data, never as a small-integer opcode.
    pub fn push_num(self, n: i64) -> Self {
        self.push_slice(&encode_num(n))
    }

    /// Push raw data with the shortest push prefix for its length.
    pub fn push_slice(mut self, data: &[u8]) -> Self {
        let len = data.len();
        if len < OP_PUSHDATA1 as usize {
            self.bytes.push(len as u8);
        } else if len <= 0xff {
            self.bytes.push(OP_PUSHDATA1);
            self.bytes.push(len as u8);
        } else if len <= 0xffff {
            self.bytes.push(OP_PUSHDATA2);
            self.bytes.extend_from_slice(&(len as u16).to_le_bytes());
        } else {
            self.bytes.push(OP_PUSHDATA4);
            self.bytes.extend_from_slice(&(len as u32).to_le_bytes());
        }
        self.bytes.extend_from_slice(data);
        self
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_num() {
        assert_eq!(encode_num(0), Vec::<u8>::new());
        assert_eq!(encode_num(42), vec![0x2a]);
        assert_eq!(encode_num(-1), vec![0x81]);
        assert_eq!(encode_num(128), vec![0x80, 0x00]);
        assert_eq!(encode_num(-128), vec![0x80, 0x80]);
        assert_eq!(encode_num(0x1234), vec![0x34, 0x12]);
    }

    #[test]
    fn test_small_ints_use_opcodes() {
        let s = ScriptBuilder::new().push_int(0).push_int(1).push_int(16).push_int(-1).into_bytes();
        assert_eq!(s, vec![OP_0, OP_1, OP_16, OP_1NEGATE]);
    }

    #[test]
    fn test_push_num_is_data() {
        let s = ScriptBuilder::new().push_num(5).into_bytes();
        assert_eq!(s, vec![0x01, 0x05]);
    }

    #[test]
    fn test_push_prefixes() {
        assert_eq!(ScriptBuilder::new().push_slice(&[9u8; 75]).into_bytes()[0], 75);
        let s = ScriptBuilder::new().push_slice(&[9u8; 76]).into_bytes();
        assert_eq!(&s[..2], &[OP_PUSHDATA1, 76]);
        let s = ScriptBuilder::new().push_slice(&[9u8; 300]).into_bytes();
        assert_eq!(&s[..3], &[OP_PUSHDATA2, 0x2c, 0x01]);
        assert_eq!(s.len(), 303);
    }

    #[test]
    fn test_genesis_style_script() {
        let s = ScriptBuilder::new()
            .push_int(0)
            .push_num(42)
            .push_slice(b"8 January 2016 Blackstar")
            .into_bytes();
        assert_eq!(
            hex::encode(s),
            "00012a1838204a616e75617279203230313620426c61636b73746172"
        );
    }
}
