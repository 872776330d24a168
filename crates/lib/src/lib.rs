mod counts;
mod error;
mod id;
pub mod labels;
mod model;
mod repository;
pub mod session;
mod store;

pub use counts::*;
pub use error::*;
pub use id::{generate_id, request_number};
pub use labels::{Label, TimelineStep};
pub use model::*;
pub use repository::*;
pub use session::{Session, SessionPhase};
pub use store::*;
