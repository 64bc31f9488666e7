//! Credential providers for CloudApi.

mod config;
pub use config::ConfigCredentialProvider;

mod default;
pub use default::DefaultCredentialProvider;

mod env;
pub use env::EnvCredentialProvider;

mod r#static;
pub use r#static::StaticCredentialProvider;
