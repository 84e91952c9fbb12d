use crate::models::ModifiedRequest;

/// A single admission check applied to every call before forwarding.
pub trait Admission: Send + Sync {
    fn admits(&self, call: &ModifiedRequest) -> bool;
}
