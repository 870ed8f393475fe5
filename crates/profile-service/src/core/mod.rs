//! Profile operations composed from the store and the clock

pub mod profiles;

pub use profiles::ProfileService;
