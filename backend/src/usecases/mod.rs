pub mod entitlement;
pub mod gateway;
pub mod images;
pub mod payments;
pub mod sessions;
pub mod speech;
pub mod videos;
