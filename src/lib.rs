//! Core library for the contextual-roster command line application.
//!
//! The tool reconciles a roster exported from a spreadsheet with the user list
//! of a tenant on the Contextual AI platform. Roster loading lives under
//! [`contextual::roster::io`], the membership diff in
//! [`contextual::roster::plan`], API calls and retries under
//! [`contextual::roster::api`] and [`contextual::roster::execute`], and the
//! end-to-end invite/remove workflows in [`contextual::roster::sync`].

pub mod contextual;

pub use contextual::roster::{
    Result, ToolError, api, config, error, execute, io, model, plan, prompt, report, sync,
};
