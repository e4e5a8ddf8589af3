//! Transaction identifier generation.
//!
//! Ids look like `tx_1718000000000_k3j9x0qa`: a fixed prefix, the creation
//! time in epoch milliseconds, and eight random base-36 characters. They are
//! unique enough for one process; the store still rejects duplicates.

use rand::Rng;

use crate::config::{BASE36_ALPHABET, TX_ID_PREFIX, TX_ID_SUFFIX_LEN};

/// Generate an id stamped with the current wall-clock time.
pub fn generate_tx_id() -> String {
    tx_id_at(
        chrono::Utc::now().timestamp_millis(),
        &mut rand::thread_rng(),
    )
}

/// Generate an id for a given epoch-millisecond timestamp.
pub fn tx_id_at<R: Rng + ?Sized>(epoch_millis: i64, rng: &mut R) -> String {
    let suffix: String = (0..TX_ID_SUFFIX_LEN)
        .map(|_| BASE36_ALPHABET[rng.gen_range(0..BASE36_ALPHABET.len())] as char)
        .collect();
    format!("{TX_ID_PREFIX}{epoch_millis}_{suffix}")
}

/// Whether `s` has the shape of a generated id.
pub fn is_well_formed(s: &str) -> bool {
    let Some(rest) = s.strip_prefix(TX_ID_PREFIX) else {
        return false;
    };
    let Some((millis, suffix)) = rest.split_once('_') else {
        return false;
    };
    !millis.is_empty()
        && millis.bytes().all(|b| b.is_ascii_digit())
        && suffix.len() == TX_ID_SUFFIX_LEN
        && suffix.bytes().all(|b| BASE36_ALPHABET.contains(&b))
}
