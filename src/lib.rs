//! Build Asterisk call files and hand them to the switch's spool directory.
//!
//! ```no_run
//! use callfile::{Application, Call, CallFile};
//!
//! let call = Call::new("SIP/flowroute/18002223333")?.with_wait_time(45);
//! let action = Application::new("Playback", "hello-world")?;
//! let receipt = CallFile::new(call, action)
//!     .with_spool_dir("/var/spool/asterisk/outgoing")
//!     .spool(None)?;
//! println!("spooled {}", receipt.spool_path.display());
//! # Ok::<(), callfile::CallFileError>(())
//! ```

pub mod action;
pub mod call;
pub mod callfile;
pub mod config;
pub mod document;
pub mod error;
pub mod preflight;
pub mod schedule;
pub mod user;
pub mod version;

pub use action::{Action, Application, Context};
pub use call::{Call, CallerId};
pub use callfile::{CallFile, SpoolReceipt};
pub use config::{Config, DEFAULT_SPOOL_DIR};
pub use document::CallFileDocument;
pub use error::{CallFileError, Result};
