pub mod connect;
pub mod disconnect;
pub mod rules;
pub mod status;
pub mod sync;
