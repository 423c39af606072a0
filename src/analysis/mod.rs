pub mod aggregate;
pub mod buckets;
pub mod insights;
