//! Room code generation.
//!
//! A code is six characters from the uppercase alphanumeric alphabet,
//! giving a 36^6 space. Uniqueness among live rooms is the session
//! layer's job; it retries this generator until the code is free.

use attune_protocol::RoomCode;
use rand::Rng;

pub const ROOM_CODE_LEN: usize = 6;

const ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// A fresh random room code. Not checked for collisions.
pub fn random_room_code(rng: &mut impl Rng) -> RoomCode {
    let code: String = (0..ROOM_CODE_LEN)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect();
    RoomCode::new(code)
}

// =========================================================================
// Tests
// =========================================================================
