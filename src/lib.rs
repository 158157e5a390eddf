//! SCSS Code Native Library
//!
//! This library provides the SCSS language server: a workspace index of variables,
//! mixins, functions and placeholders across `@use`, `@forward` and `@import` links,
//! and the editor features built on it.

pub mod language;
pub mod logging;
pub mod scss;
#[cfg(test)]
pub mod test_utils;
