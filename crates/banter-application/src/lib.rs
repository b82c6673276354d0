//! Orchestration layer of the Banter chat widget.
//!
//! Wires the transcript store, response pipeline, remote sync adapter,
//! backup scheduler, and composer into the `ChatWidget` facade an embedding
//! page drives.

mod backup;
pub mod bootstrap;
pub mod composer;
pub mod events;
pub mod export;
pub mod pipeline;
pub mod sync_adapter;
pub mod telemetry;
pub mod widget;

pub use bootstrap::bootstrap_widget;
pub use composer::{ComposeError, Composer, Submission};
pub use events::{ExchangeOutcome, WidgetEvent};
pub use pipeline::APOLOGY;
pub use sync_adapter::RemoteSyncAdapter;
pub use telemetry::init_tracing;
pub use widget::{ChatWidget, CommandOutcome, WidgetCommand};
