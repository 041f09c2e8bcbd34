use super::utils::unique_id;
use applitude::runtime::WeakApplitude;
use applitude::Descriptor;
use serde_json::json;
use tracing::{info, warn};

pub const BASE: &str = "widgets.base";
pub const CART: &str = "widgets.cart";

/// Defaults every widget borrows.
pub fn base() -> Descriptor {
    Descriptor::new()
        .with_property("theme", "light")
        .with_property("visible", true)
        .with_property("title", "Widget")
}

/// A cart badge. Takes its theme from `widgets.base` and overrides the title.
pub fn cart(app: WeakApplitude) -> Descriptor {
    Descriptor::new()
        .with_property("title", "Cart")
        .with_property("items", json!([]))
        .with_mixins([BASE])
        .on_render(move |readiness| {
            let Some(app) = app.upgrade() else {
                return;
            };
            match readiness {
                Ok(()) => {
                    let id = unique_id();
                    info!(widget = CART, id = %id, "Rendered");
                    app.trigger("widgets.rendered", json!({ "widget": CART, "id": id }));
                }
                Err(reason) => {
                    warn!(widget = CART, error = %reason, "Rendering fallback");
                    app.log(format_args!("{CART}: rendered without data ({reason})"));
                }
            }
        })
}
