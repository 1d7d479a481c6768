pub mod booking;
pub mod conversation;
pub mod profile;
pub mod room;
pub mod time_slot;

pub use booking::*;
pub use conversation::*;
pub use profile::*;
pub use room::*;
pub use time_slot::*;
