mod handler;
mod model;

pub use handler::{create, get, list, list_board, remove, update};
pub use model::{ActivityDetail, ActivityRequest, ActivityView};
