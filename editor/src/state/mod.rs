pub mod model;
pub mod remote;
