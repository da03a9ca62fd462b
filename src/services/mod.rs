pub mod mint;
pub mod session;

pub use mint::mint;
pub use session::{run_session, session_dir, SessionReport};
