pub mod handlers;
pub mod self_check;
pub mod state;

pub use handlers::*;
pub use self_check::probe_self;
pub use state::*;
