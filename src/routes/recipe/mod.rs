mod handler;
mod model;

pub use handler::{create, get, list, list_all, remove, update};
