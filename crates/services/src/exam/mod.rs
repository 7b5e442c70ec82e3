mod store;
mod timer;
mod view;

pub use store::ExamStore;
pub use timer::{ManualTicks, Tick, TickGuard, TickSource, TokioTicks};
pub use view::{ExamInfo, ExamView};
