//! # Payment signature verification
//!
//! Payment providers prove that a checkout result came from them by signing a provider-defined concatenation of the
//! result fields with a secret shared between the provider and the merchant.
//!
//! ## Razorpay
//! ```text
//!    hex(HMAC-SHA256(key_secret, "{order_id}|{payment_id}"))
//! ```
//!
//! ## PayU
//! Requests are signed with
//! ```text
//!    hex(SHA-512("key|txnid|amount|productinfo|firstname|email|udf1|udf2|udf3|udf4|udf5||||||salt"))
//! ```
//! and responses with the "reverse hash"
//! ```text
//!    hex(SHA-512("salt|status||||||udf5|udf4|udf3|udf2|udf1|email|firstname|productinfo|amount|txnid|key"))
//! ```
//! with `|additional_charges` appended when the response carries additional charges. Transaction status lookups
//! through PayU's `verify_payment` command are signed with
//! ```text
//!    hex(SHA-512("key|verify_payment|txnid|salt"))
//! ```
//!
//! Supplied signatures are compared in constant time. Hex digests are compared case-insensitively.
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256, Sha512};
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// The fields that PayU includes in its request and response hashes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PayUFields {
    pub key: String,
    pub txnid: String,
    pub amount: String,
    pub productinfo: String,
    pub firstname: String,
    pub email: String,
    pub udf: [String; 5],
    /// Only present in responses
    pub status: String,
    pub additional_charges: Option<String>,
}

/// A set of signed fields, in the shape a particular provider signs them.
#[derive(Debug, Clone, Copy)]
pub enum SignedFields<'a> {
    Razorpay { order_id: &'a str, payment_id: &'a str },
    PayURequest(&'a PayUFields),
    PayUResponse(&'a PayUFields),
    /// The `verify_payment` status lookup for a single transaction
    PayUVerify { key: &'a str, txnid: &'a str },
}

impl<'a> SignedFields<'a> {
    /// Computes the lowercase hex digest of these fields with the given shared secret.
    pub fn digest(&self, secret: &str) -> String {
        match self {
            SignedFields::Razorpay { order_id, payment_id } => {
                // HMAC accepts keys of any length, so this cannot fail
                let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
                    Ok(mac) => mac,
                    Err(_) => return String::default(),
                };
                mac.update(order_id.as_bytes());
                mac.update(b"|");
                mac.update(payment_id.as_bytes());
                hex::encode(mac.finalize().into_bytes())
            },
            SignedFields::PayURequest(f) => {
                let [u1, u2, u3, u4, u5] = &f.udf;
                let seq: [&str; 17] = [
                    &f.key,
                    &f.txnid,
                    &f.amount,
                    &f.productinfo,
                    &f.firstname,
                    &f.email,
                    u1,
                    u2,
                    u3,
                    u4,
                    u5,
                    "",
                    "",
                    "",
                    "",
                    "",
                    secret,
                ];
                sha512_hex(&seq.join("|"))
            },
            SignedFields::PayUResponse(f) => {
                let [u1, u2, u3, u4, u5] = &f.udf;
                let fields: [&str; 18] = [
                    secret,
                    &f.status,
                    "",
                    "",
                    "",
                    "",
                    "",
                    u5,
                    u4,
                    u3,
                    u2,
                    u1,
                    &f.email,
                    &f.firstname,
                    &f.productinfo,
                    &f.amount,
                    &f.txnid,
                    &f.key,
                ];
                let mut seq = fields.join("|");
                if let Some(charges) = f.additional_charges.as_deref().filter(|c| !c.is_empty()) {
                    seq.push('|');
                    seq.push_str(charges);
                }
                sha512_hex(&seq)
            },
            SignedFields::PayUVerify { key, txnid } => sha512_hex(&[*key, "verify_payment", *txnid, secret].join("|")),
        }
    }
}

fn sha512_hex(s: &str) -> String {
    hex::encode(Sha512::digest(s.as_bytes()))
}

/// Returns true if `signature` is the digest of `fields` under `secret`.
pub fn verify_signature(fields: &SignedFields, secret: &str, signature: &str) -> bool {
    let expected = fields.digest(secret);
    let supplied = signature.trim().to_ascii_lowercase();
    !expected.is_empty() && bool::from(expected.as_bytes().ct_eq(supplied.as_bytes()))
}

/// Convenience wrapper for the Razorpay checkout signature.
pub fn verify_razorpay_signature(secret: &str, order_id: &str, payment_id: &str, signature: &str) -> bool {
    verify_signature(&SignedFields::Razorpay { order_id, payment_id }, secret, signature)
}
