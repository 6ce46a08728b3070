mod handler;
mod model;

pub use handler::{create, get, list, remove, update};
