pub mod breakpoint;
pub mod config;
mod decoder;
pub mod error;
pub mod event;
pub mod expression;
pub mod location;
pub mod machine;
pub mod pattern;
pub mod process;
pub mod registry;
mod session;
pub mod state;
pub mod watch;

pub use breakpoint::{Breakpoint, CurrentPosition};
pub use config::{LaunchArgs, Preferences};
pub use error::Error;
pub use event::{EventReceiver, MessageKind, Perspective, SessionEvent};
pub use location::{Location, SourceOutline, StackFrame, TopLevelScanner};
pub use registry::Registry;
pub use session::{Evaluation, Session, SessionBuilder};
pub use state::State;
pub use watch::WatchVariable;
