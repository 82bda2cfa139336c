pub mod handlers;
pub mod server;
pub mod templates;

pub use server::{run_server, MapView};
