#![forbid(unsafe_code)]
#![allow(missing_docs)]

//! Deployment pipeline: tagged scripts, fixtures and verification.

pub mod scripts;
pub mod verify;

pub use scripts::{DeployError, DeployOptions, Deployer, SCRIPTS};
pub use verify::{LogVerifier, Verifier, VerifyError};
