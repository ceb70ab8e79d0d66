pub mod constants;
pub mod error;
pub mod event;
pub mod params;
pub mod source;
pub mod types;

pub use constants::*;
pub use error::{ErrorKind, LockdropError};
pub use event::*;
pub use params::CampaignParams;
pub use source::{EventIter, EventSource};
pub use types::*;
