pub mod blink;
pub mod common;
pub mod errors;
pub mod events;
pub mod transaction;

pub use blink::*;
pub use common::*;
pub use errors::*;
pub use events::*;
pub use transaction::*;
