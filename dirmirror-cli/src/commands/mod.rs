pub mod diff;
pub mod profile;
pub mod sync;
