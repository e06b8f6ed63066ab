mod events;
mod history;
mod observer;
mod trainer;

pub use events::{ChannelObserver, TrainingEvent};
pub use history::HistoryEntry;
pub use observer::{NoopObserver, StepObserver};
pub use trainer::Trainer;
