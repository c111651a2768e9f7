//! stepform - multi-step terminal forms
//!
//! A [`navigator::Navigator`] walks the steps of a [`form::FormSchema`],
//! gating forward movement on the [`validator::Validator`] and locking
//! itself while the [`animator::Animator`] slides panels in and out.

pub mod animator;
pub mod app;
pub mod config;
pub mod form;
pub mod logging;
pub mod navigator;
pub mod profile;
pub mod ui;
pub mod validator;
