pub mod extract;
pub mod profiles;
pub mod shuffle;
