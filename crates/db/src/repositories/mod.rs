//! Repository layer: zero-sized structs with async CRUD methods over `&PgPool`.

pub mod assignment_repo;
pub mod client_app_repo;
pub mod client_repo;
pub mod partner_repo;
pub mod payment_repo;
pub mod request_repo;

pub use assignment_repo::AssignmentRepo;
pub use client_app_repo::ClientAppRepo;
pub use client_repo::ClientRepo;
pub use partner_repo::PartnerRepo;
pub use payment_repo::PaymentRepo;
pub use request_repo::RequestRepo;
