mod audit_event;
mod catalog;
mod customer;
mod invoice;
mod order;
mod user;

pub use audit_event::*;
pub use catalog::*;
pub use customer::*;
pub use invoice::*;
pub use order::*;
pub use user::*;

/// Entities are equal when both carry the same assigned id.
/// Two unsaved entities (id `None`) are never equal.
macro_rules! impl_identity_eq {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl PartialEq for $ty {
                fn eq(&self, other: &Self) -> bool {
                    self.id.is_some() && self.id == other.id
                }
            }
        )+
    };
}

pub(crate) use impl_identity_eq;
