pub mod config;
pub mod confirm;
pub mod districts;
pub mod seeder;

pub use config::SeederConfig;
pub use confirm::{AssumeYes, Confirm, StdinConfirm};
pub use districts::{load_plan, DistrictConfigError};
pub use seeder::{SeedReport, Seeder, SubmitOutcome};
