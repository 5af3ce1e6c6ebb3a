mod order_ids;
mod signature;

pub use order_ids::{failure_txn_id, new_internal_order_id};
pub use signature::{verify_razorpay_signature, verify_signature, PayUFields, SignedFields};
