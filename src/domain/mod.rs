mod product;

pub use product::{Availability, ProductRecord, StoredProduct, DEFAULT_CATEGORY};
