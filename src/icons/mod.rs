//! Icon generation: default placeholders and badges

pub mod factory;

pub use factory::IconFactory;
