pub mod params;
pub mod stream;

pub use params::{StreamParams, StreamQuery};
pub use stream::{run_session, SessionContext, SessionEnd, SessionState};
