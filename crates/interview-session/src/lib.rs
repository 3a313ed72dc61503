#![allow(missing_docs)]

pub mod config;
pub mod error;
pub mod record;
pub mod response;
pub mod storage;
pub mod store;
pub mod transport;

pub use config::SessionConfig;
pub use error::{ConfigError, SessionError, StorageError};
pub use record::{DEFAULT_ID_PREFIX_LEN, InterviewStateRecord, Metadata, record_id};
pub use response::{
    CompleteResponse, ExitContent, IncompleteResponse, InterviewStateResponse, QuestionContent,
    StepContent, UpdateRequest,
};
pub use storage::{FileStorage, MemoryStorage, SessionStorage, default_storage_dir};
pub use store::InterviewStateStore;
pub use transport::{HttpTransport, InterviewTransport};
