//! iso-shelf — serves a catalog of bootable disk images from an object store
//! and streams them with HTTP byte-range support, so a browser-side emulator
//! can read them like a sparse block device.

pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
