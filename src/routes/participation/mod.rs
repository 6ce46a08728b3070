mod handler;

pub use handler::{RegisterRequest, cancel, register};
