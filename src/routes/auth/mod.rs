mod handler;
mod model;

pub use handler::{change_password, login, me, signup};
pub use model::MessageResponse;
