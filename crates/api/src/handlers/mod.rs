pub mod partners;
pub mod webhooks;
