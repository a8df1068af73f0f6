// Core Admin Models
// Data structures for the client

mod settings;
mod credentials;
mod stream_draft;
mod stream_target;
mod process_descriptor;
mod process;
mod metrics_history;

pub use settings::*;
pub use credentials::*;
pub use stream_draft::*;
pub use stream_target::*;
pub use process_descriptor::*;
pub use process::*;
pub use metrics_history::*;
