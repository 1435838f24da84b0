pub mod data_uri;
pub mod extraction;
pub mod handlers;
pub mod normalize;
pub mod preview;
pub mod prompts;
pub mod session;
pub mod validation;
