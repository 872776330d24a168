use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use rand::Rng;

use crate::RecordId;

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
/// Enough base36 digits for millisecond timestamps well past the year 5000.
const STAMP_WIDTH: usize = 9;
const SUFFIX_LEN: usize = 5;

static LAST_STAMP: AtomicU64 = AtomicU64::new(0);

fn to_base36(mut value: u64, width: usize) -> String {
    let mut digits = vec![b'0'; width];
    for slot in digits.iter_mut().rev() {
        *slot = BASE36[(value % 36) as usize];
        value /= 36;
    }
    // Digits are drawn from BASE36, which is ASCII.
    String::from_utf8_lossy(&digits).into_owned()
}

/// Returns a millisecond stamp strictly greater than any previously issued
/// one in this process.
fn next_stamp() -> u64 {
    let now = Utc::now().timestamp_millis().max(0) as u64;
    let previous = LAST_STAMP
        .fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| {
            Some(now.max(last + 1))
        })
        .unwrap_or_else(|last| last);
    now.max(previous + 1)
}

/// Generates an identifier unique within this device's store: a base36
/// time component followed by a random suffix.
///
/// Identifiers issued by one process sort lexicographically in issue order.
pub fn generate_id() -> RecordId {
    let stamp = to_base36(next_stamp(), STAMP_WIDTH);
    let mut rng = rand::thread_rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    RecordId(format!("{}{}", stamp, suffix))
}

/// Display number such as `SOL-1042`. Not guaranteed unique.
pub fn request_number(prefix: &str) -> String {
    format!("{}-{}", prefix, rand::thread_rng().gen_range(1000..2000))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_ids_are_distinct() {
        let ids: Vec<RecordId> = (0..10_000).map(|_| generate_id()).collect();
        let unique: HashSet<&RecordId> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len());
    }

    #[test]
    fn test_ids_sort_in_issue_order() {
        let ids: Vec<RecordId> = (0..500).map(|_| generate_id()).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
        assert!(ids.iter().all(|id| id.0.len() == STAMP_WIDTH + SUFFIX_LEN));
    }

    #[test]
    fn test_base36() {
        assert_eq!(to_base36(0, 3), "000");
        assert_eq!(to_base36(35, 3), "00z");
        assert_eq!(to_base36(36 * 36 + 1, 3), "101");
    }

    #[test]
    fn test_request_number_range() {
        for _ in 0..200 {
            let number = request_number("SOL");
            let digits: u32 = number.strip_prefix("SOL-").unwrap().parse().unwrap();
            assert!((1000..2000).contains(&digits));
        }
    }
}
