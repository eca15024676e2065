use blake2::{digest::consts::U16, Blake2b, Digest};

use crate::db_types::OrderId;

type Blake2b128 = Blake2b<U16>;

/// Derives the opaque order identifier for a submission.
///
/// The identifier covers the customer's session token, the shop id and the raw order content, each
/// field length-framed so that boundaries cannot slide between them. The same triple always
/// derives the same identifier, which is what collapses duplicate submissions onto a single
/// transaction. The result is 32 lowercase hex characters, safe to embed in URL paths and QR scan
/// arguments.
pub fn derive_order_id(customer_ref: &str, shop_id: &str, content: &[u8]) -> OrderId {
    let mut hasher = Blake2b128::new();
    for field in [customer_ref.as_bytes(), shop_id.as_bytes(), content] {
        hasher.update((field.len() as u64).to_le_bytes());
        hasher.update(field);
    }
    let id = hasher.finalize().iter().map(|b| format!("{b:02x}")).collect::<String>();
    OrderId(id)
}
