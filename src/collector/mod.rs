mod cycle;
mod ports;
mod scheduler;

pub use cycle::{CollectionCycle, CycleSummary};
pub use ports::{BuildClient, JobStore, QualityStore, ReportConverter};
pub use scheduler::Scheduler;
