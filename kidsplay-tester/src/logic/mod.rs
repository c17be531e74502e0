pub mod assets;
pub mod policy;
pub mod reports;
pub mod scenario;
pub mod simulation;

pub use assets::{SystemClock, TesterAssets};
pub use policy::PlayerStrategy;
pub use scenario::{ScenarioCtx, ScenarioResult, expand_scenarios, list_scenarios, run_scenario};
