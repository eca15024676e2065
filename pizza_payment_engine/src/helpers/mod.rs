mod order_key;

pub use order_key::derive_order_id;
