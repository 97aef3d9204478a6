pub mod admin;
pub mod health;
pub mod public;
pub mod track;

pub use health::{AppStartTime, HealthService};
pub use public::PublicService;
pub use track::{TrackService, track_rate_limiter};
