// Domain layer: schema vocabulary, grid/ledger models and ports.

pub mod ledger;
pub mod model;
pub mod ports;
pub mod schema;
