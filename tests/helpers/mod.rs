#![allow(unused_imports)]
pub mod booking_helpers;
pub mod scripted_backend;
pub mod test_db;

pub use booking_helpers::*;
pub use scripted_backend::*;
pub use test_db::*;
