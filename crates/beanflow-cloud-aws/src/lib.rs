//! AWS gateways for beanflow
//!
//! - [`S3Storage`]: uploads archives with `PutObject`
//! - [`BeanstalkService`]: registers application versions and updates
//!   environments on Elastic Beanstalk
//!
//! Clients share one [`aws_config::SdkConfig`] built by [`load_sdk_config`],
//! which layers explicit credentials over the default provider chain.

pub mod beanstalk;
pub mod config;
pub mod s3;

pub use beanstalk::BeanstalkService;
pub use config::load_sdk_config;
pub use s3::S3Storage;
