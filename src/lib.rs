pub mod arch;
pub mod configs;
pub mod dataset;
pub mod error;
pub mod gradient;
pub mod initialization;
pub mod optimization;
pub mod parameters;
pub mod session;
pub mod training;

pub use arch::Network;
pub use error::{BoxErr, NnErr, Result};
pub use parameters::Parameters;
pub use session::{Session, SessionPhase};
