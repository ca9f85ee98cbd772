//! dashlink command line library
//!
//! The binary is a thin clap front end over [`commands`].

pub mod commands;
