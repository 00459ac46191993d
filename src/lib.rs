pub mod block;
pub mod extract;
pub mod listing;
pub mod reader;
pub mod record;
pub mod section;
pub mod typeid;
pub mod volume;

pub use block::{BlockHeader, Timestamp, BLOCK_SIZE};
pub use extract::Extractor;
pub use listing::Lister;
pub use reader::{RecordStream, TapeError};
pub use record::Record;
pub use section::Magic;
pub use typeid::TypeId;
