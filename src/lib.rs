//! Grant temporary internet access to devices behind a home router by
//! running an unblock script over SSH.

pub mod unblock;
