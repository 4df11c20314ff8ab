//! Random identifiers for events and per-pairing access tokens.

use rand::Rng;

use crate::{AccessToken, EventId};

const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

pub const EVENT_ID_LEN: usize = 10;
pub const ACCESS_TOKEN_LEN: usize = 12;

pub fn mint_event_id() -> EventId {
    random_id(&mut rand::thread_rng(), EVENT_ID_LEN)
}

pub fn mint_access_token() -> AccessToken {
    random_id(&mut rand::thread_rng(), ACCESS_TOKEN_LEN)
}

fn random_id<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    let mut out = String::with_capacity(len);
    for _ in 0..len {
        let idx = rng.gen_range(0..ALPHABET.len());
        out.push(ALPHABET[idx] as char);
    }
    out
}
