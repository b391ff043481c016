//! Embassy tasks
//!
//! Driver plumbing only; the application itself runs in `main`.

pub mod matrix;
pub mod net;

pub use matrix::matrix_task;
pub use net::{net_task, wifi_task};
