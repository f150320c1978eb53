pub mod dictionary;
pub mod error;
pub mod interface;
pub mod mock;
pub mod types;

pub use dictionary::ObjectDictionary;
pub use error::{CanError, CanResult, DictError, DictResult};
pub use interface::{CanInterface, FrameSubscription};
pub use mock::{MockCanInterface, MockEntry, MockObjectDictionary};
pub use types::{CanFrame, EntryKey, FrameFilter};
