//! Predict UI App
//!
//! Page-ready wiring. Each behaviour binds independently so a page that lacks
//! one (no navbar marker, no fixture table) still gets the others.

use crate::config::PageConfig;
use crate::{editor, links, nav};

pub fn start(config: PageConfig) {
    match nav::highlight_active(&config.nav) {
        Ok(Some(index)) => log::debug!("Navigation entry {} active", index),
        Ok(None) => {}
        Err(e) => log::error!("Navigation highlight failed: {}", e),
    }

    match links::bind(&config.links) {
        Ok(0) => {}
        Ok(count) => log::debug!("Bound {} competition links", count),
        Err(e) => log::error!("Competition links not bound: {}", e),
    }

    for editor_config in &config.editors {
        match editor::bind(editor_config) {
            Ok(0) => log::debug!("No {} fields on this page", editor_config.name),
            Ok(_) => {}
            Err(e) => log::error!("{} fields not bound: {}", editor_config.name, e),
        }
    }
}
