mod media;
mod query;
mod session;

pub use media::*;
pub use query::*;
pub use session::*;
