use rand::rngs::OsRng;
use rand::RngCore;
use snowflake::SnowflakeIdGenerator;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, UNIX_EPOCH};

const SNOWFLAKE_EPOCH: u64 = 1700000000000;

static GENERATOR: once_cell::sync::OnceCell<Mutex<SnowflakeIdGenerator>> = once_cell::sync::OnceCell::new();

fn new() -> Mutex<SnowflakeIdGenerator> {
    let epoch = UNIX_EPOCH + Duration::from_millis(SNOWFLAKE_EPOCH);
    let machine_id = fastrand::i32(0..32);
    let node_id = fastrand::i32(0..32);
    Mutex::new(SnowflakeIdGenerator::with_epoch(machine_id, node_id, epoch))
}

pub fn next() -> i64 {
    GENERATOR
        .get_or_init(new)
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .generate()
}

/// Document ids are snowflakes rendered as decimal strings.
pub fn next_id() -> String {
    next().to_string()
}

/// 128 bits from the operating system RNG as hex, for bearer tokens and
/// password salts.
pub fn random_hex() -> String {
    let mut bytes = [0u8; 16];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_next() {
        for idx in 0..10000 {
            let id = next();
            assert!(id > 0, "id: {}, idx: {}", id, idx);
        }
    }

    #[test]
    fn test_next_id_unique() {
        let ids: HashSet<String> = (0..1000).map(|_| next_id()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_random_hex() {
        let token = random_hex();
        assert_eq!(token.len(), 32);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(token, random_hex());
    }

    #[test]
    fn test_random_hex_does_not_follow_fastrand() {
        fastrand::seed(7);
        let first = random_hex();
        fastrand::seed(7);
        assert_ne!(first, random_hex());
        let tokens: HashSet<String> = (0..1000).map(|_| random_hex()).collect();
        assert_eq!(tokens.len(), 1000);
    }
}
