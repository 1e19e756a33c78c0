pub mod ledger_service;
pub mod price_service;
pub mod scheduler;
