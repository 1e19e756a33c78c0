pub mod asset;
pub mod chart;
pub mod event;
pub mod ledger;
pub mod price;
pub mod settings;
pub mod snapshot;
pub mod transaction;
