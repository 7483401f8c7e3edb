//! Federated search over portal mirrors
//!
//! - `parser`: result-page parsing and mirror query URLs
//! - `state`: the dispatch state machine
//! - `dispatcher`: ordered mirror attempts until one yields results

mod dispatcher;
mod parser;
mod state;

pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use parser::{mirror_search_url, parse_results};
pub use state::{DispatchState, MirrorOutcome};
