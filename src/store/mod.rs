pub mod profile_store;
pub mod script_io;
