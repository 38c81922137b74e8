pub mod error;
pub mod identity;
pub mod ranking;
pub mod record;
pub mod reporter;
pub mod store;

pub use error::StoreError;
pub use identity::{DeviceIdentity, Identity, IdentityProvider, NoIdentity};
pub use ranking::{RankingRow, RankingView, load_ranking};
pub use record::{ANONYMOUS, MODE, RankingQuery, ScoreRecord, ScoreSubmission};
pub use reporter::{ScoreReporter, SubmitOutcome};
pub use store::{JsonlStore, MemoryStore, ScoreStore};
