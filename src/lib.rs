pub mod api;
pub mod config;
pub mod controller;
pub mod render;
pub mod tabs;
pub mod toast;
pub mod types;

pub use api::{ApiClient, ApiError};
pub use config::Config;
pub use controller::{
    ActionError, Dashboard, Mutation, OpportunityForm, Resource, SourceChoice, TrackerApi,
    DELETE_UNSUPPORTED,
};
pub use render::{Region, ScoreTier};
pub use tabs::{Tab, TabRouter};
pub use toast::{Severity, ToastQueue};
