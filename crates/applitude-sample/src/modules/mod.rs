//! The demo application's modules.
//!
//! Registration order matters only for mixins: `widgets.base` must be
//! registered before the widgets that name it.

pub mod catalog;
pub mod library;
pub mod utils;
pub mod widgets;

use applitude::Applitude;

/// Registers every demo module on `app`.
pub fn register_all(app: &Applitude) -> &Applitude {
    app.register(utils::NAMESPACE, utils::descriptor())
        .register(library::NAMESPACE, library::descriptor())
        .register(widgets::BASE, widgets::base())
        .register(widgets::CART, widgets::cart(app.downgrade()))
        .register(catalog::NAMESPACE, catalog::descriptor(app.downgrade()))
}
