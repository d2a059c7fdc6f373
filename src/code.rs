//! Bytecode chunkification.
//!
//! Contract code is stored as 32-byte tree values: 31 code bytes prefixed by
//! one metadata byte counting how many of those 31 bytes are PUSH operand
//! data spilling over from an earlier chunk. A verifier holding a single
//! chunk can therefore tell opcode from operand without scanning from the
//! start of the program.

use alloy_primitives::B256;

use crate::{Result, TreeError};

/// Code bytes carried per chunk.
pub const CHUNK_BODY_LEN: usize = 31;

/// One 32-byte code chunk: pushdata prefix byte plus 31 code bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CodeChunk {
    /// Leading bytes of `body` that are PUSH operand continuation (0..=31).
    pub pushdata_prefix: u8,
    /// The 31 code bytes, zero-padded past the end of the program.
    pub body: [u8; CHUNK_BODY_LEN],
}

impl CodeChunk {
    /// Assemble a chunk. The prefix must not exceed the body length.
    pub const fn new(pushdata_prefix: u8, body: [u8; CHUNK_BODY_LEN]) -> Self {
        assert!(pushdata_prefix as usize <= CHUNK_BODY_LEN);
        Self {
            pushdata_prefix,
            body,
        }
    }

    /// Pack into the stored 32-byte value.
    pub fn encode(&self) -> B256 {
        let mut word = [0u8; 32];
        word[0] = self.pushdata_prefix;
        word[1..].copy_from_slice(&self.body);
        B256::from(word)
    }

    /// Unpack from a stored 32-byte value, rejecting prefixes above 31.
    pub fn decode(word: B256) -> Result<Self> {
        if word[0] as usize > CHUNK_BODY_LEN {
            return Err(TreeError::InvalidChunkPrefix(word[0]));
        }
        let mut body = [0u8; CHUNK_BODY_LEN];
        body.copy_from_slice(&word[1..]);
        Ok(Self {
            pushdata_prefix: word[0],
            body,
        })
    }
}

/// Operand bytes following a PUSH opcode; zero for everything else.
///
/// PUSH1 (0x60) through PUSH32 (0x7f) carry 1 through 32 operand bytes.
fn push_operand_len(opcode: u8) -> usize {
    if (0x60..=0x7f).contains(&opcode) {
        (opcode - 0x5f) as usize
    } else {
        0
    }
}

/// Split bytecode into 31-byte chunks with pushdata accounting.
///
/// The code is zero-padded to a multiple of 31. Each byte position is
/// labeled with how many operand bytes remain from the nearest preceding
/// PUSH, counting itself and capped at 31; a chunk's prefix byte is that
/// label at the chunk's first position. Total over any input; empty code
/// yields no chunks.
pub fn chunkify(code: &[u8]) -> Vec<CodeChunk> {
    if code.is_empty() {
        return Vec::new();
    }

    // operand run lengths, one label per code byte
    let mut labels = vec![0u8; code.len()];
    let mut pc = 0;
    while pc < code.len() {
        let operands = push_operand_len(code[pc]);
        for offset in 0..operands {
            let Some(label) = labels.get_mut(pc + 1 + offset) else {
                break;
            };
            *label = (operands - offset).min(CHUNK_BODY_LEN) as u8;
        }
        pc += 1 + operands;
    }

    code.chunks(CHUNK_BODY_LEN)
        .enumerate()
        .map(|(index, window)| {
            let mut body = [0u8; CHUNK_BODY_LEN];
            body[..window.len()].copy_from_slice(window);
            CodeChunk::new(labels[index * CHUNK_BODY_LEN], body)
        })
        .collect()
}

/// Reassemble bytecode of length `code_len` from its chunks.
pub fn dechunkify(chunks: &[CodeChunk], code_len: usize) -> Vec<u8> {
    let mut code = Vec::with_capacity(code_len);
    for chunk in chunks {
        let remaining = code_len - code.len();
        code.extend_from_slice(&chunk.body[..remaining.min(CHUNK_BODY_LEN)]);
        if remaining <= CHUNK_BODY_LEN {
            break;
        }
    }
    code
}
