//! Collision-resistant identifier generation.
//!
//! Identifiers combine a millisecond time component with a random base36
//! suffix: `<prefix>_<unix-millis>_<random>`. They are treated as
//! practically unique; there is no collision detection.

use rand::Rng;

const SUFFIX_LEN: usize = 9;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Generates a fresh identifier with the given prefix.
///
/// # Arguments
///
/// * `prefix` - A short tag describing the entity (e.g., "chat", "msg")
pub fn new_id(prefix: &str) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let mut rng = rand::thread_rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("{}_{}_{}", prefix, millis, suffix)
}
