//! Resumable mirroring of a remote directory tree.
//!
//! [`MirrorEngine`] walks the remote tree depth first and brings each file
//! up to date on local disk, one file at a time:
//!
//! 1. The local destination is sized ([`LocalState`]).
//! 2. A [`TransferPlan`] is chosen: skip a complete file, download a missing
//!    one whole, or continue a partial one with ranged reads.
//! 3. On a transient transport fault, with resume enabled, the session is
//!    re-established, the previous working directory restored, and the
//!    transfer continued [`backoff_bytes`](MirrorOptions::backoff_bytes)
//!    before the end of what reached the disk. Without resume the fault is
//!    returned as [`TransferError::Fatal`], as is a remote file whose length
//!    differs from its listed size.
//! 4. Permissions and times are copied from the remote entry, best effort.
//!
//! Retries after transient faults are unbounded while resume is enabled.
//! A link that never comes back keeps the engine reconnecting; each attempt
//! is logged.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use seedsync::mirror::{MirrorEngine, MirrorOptions};
//! use seedsync::remote::{ConnectParams, Connector};
//!
//! fn run<C: Connector>(connector: C) -> Result<(), Box<dyn std::error::Error>> {
//!     let params = ConnectParams::new("seedbox.example.net", "alice").with_password("hunter2");
//!     let options = MirrorOptions::default().with_resume(true);
//!
//!     let mut engine = MirrorEngine::connect(connector, params, options)?;
//!     let report = engine.mirror("downloads/complete", Path::new("/srv/mirror"))?;
//!     println!("{} files transferred", report.transferred);
//!     engine.close()?;
//!     Ok(())
//! }
//! ```

mod cancel;
mod dircache;
mod engine;
mod error;
mod options;
mod progress;
mod resume;
mod state;

pub use cancel::CancelToken;
pub use dircache::DirectoryCache;
pub use engine::{MirrorEngine, MirrorReport};
pub use error::TransferError;
pub use options::MirrorOptions;
pub use progress::format_bytes;
pub use state::{windows, LocalState, TransferPlan, TransferState};
