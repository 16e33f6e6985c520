//! Shared library for the Gooee Alexa Smart Home skill.
//!
//! Translates Alexa Smart Home v3 directives into authenticated calls
//! against the Gooee cloud API and shapes the results back into Alexa
//! response/event envelopes.

pub mod alexa;
pub mod config;
pub mod error;
pub mod gooee;
pub mod respond;
pub mod router;
pub mod token;

mod brightness;
mod discovery;
mod power;
mod state_report;

#[cfg(test)]
mod testutil;

pub use config::Config;
pub use error::{AuthError, ErrorType, HandlerError, VendorError};
pub use gooee::{GooeeClient, VendorApi, VendorCommand, VendorDevice, VendorState};
pub use router::{DirectiveKind, Skill};
pub use token::{OauthTokenProvider, Token, TokenProvider};
