pub mod coverage;
pub mod date;
pub mod known;
pub mod pipeline;
pub mod policy;
pub mod status;
pub mod subscriptions;
pub mod suggest;
pub mod types;
