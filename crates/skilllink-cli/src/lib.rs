//! `SkillLink` CLI Library
//!
//! Terminal client for the `SkillLink` freelance marketplace: the REST client,
//! client-side storage, form controllers, renderers, and the TUI and headless
//! front ends built on them.

pub mod api;
pub mod app;
pub mod avatar;
pub mod commands;
pub mod controllers;
pub mod csrf;
pub mod pages;
pub mod storage;
pub mod tasks;
pub mod tui;
pub mod view;
