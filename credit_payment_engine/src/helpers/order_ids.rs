use chrono::Utc;
use rand::Rng;

/// Generates the internal order id for a new payment: `RZP_{user}_{millis}_{rand}`.
///
/// The random suffix keeps ids unique when the same user creates two orders within the same millisecond.
pub fn new_internal_order_id(user_id: &str) -> String {
    let millis = Utc::now().timestamp_millis();
    let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("RZP_{user_id}_{millis}_{suffix:06}")
}

/// A synthetic audit-log transaction id, used when the client did not supply a provider order id.
pub fn failure_txn_id(user_id: &str) -> String {
    format!("FAIL_{user_id}_{}", Utc::now().timestamp_millis())
}
