mod client;
mod junit;

pub use client::JenkinsClient;
pub use junit::JunitConverter;
