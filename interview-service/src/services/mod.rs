pub mod database;
pub mod interviews;
pub mod memory;
pub mod metrics;
pub mod prompts;
pub mod providers;
pub mod sessions;
pub mod store;

pub use database::MongoStore;
pub use interviews::InterviewService;
pub use memory::MemoryStore;
pub use metrics::{get_metrics, init_metrics};
pub use providers::{ProviderError, TextProvider};
pub use sessions::{SessionDetail, SessionService};
pub use store::{InterviewStore, SessionUpdate};
