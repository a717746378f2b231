//! Interface layer exposing the session to frontends.

pub mod rest;
