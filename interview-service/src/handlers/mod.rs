pub mod feedback;
pub mod health;
pub mod interviews;
pub mod metrics;
pub mod sessions;
