pub mod bundle;
pub mod deploy;
pub mod validate;
