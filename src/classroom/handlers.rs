//! One handler per supported event.

mod ping;
mod push;
mod release;

pub use ping::handle_ping;
pub use push::handle_push;
pub use release::handle_release;
