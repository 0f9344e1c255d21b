pub mod audit_service;
pub mod error;
pub mod negotiation_service;
pub mod notification_service;
pub mod package_service;
pub mod payment_service;
