use applitude::runtime::WeakApplitude;
use applitude::{Deferred, Descriptor, Loaded};
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info};

pub const NAMESPACE: &str = "shop.catalog";

/// How long the simulated catalog fetch takes.
pub const FETCH_DELAY: Duration = Duration::from_millis(25);

/// A module whose load finishes asynchronously. Its render also waits for
/// the whole application's render gate; the fetched data is published as a
/// `catalog.loaded` event.
pub fn descriptor(app: WeakApplitude) -> Descriptor {
    let events = app.clone();
    Descriptor::new()
        .with_property("source", "https://example.invalid/catalog.json")
        .on_load(move || {
            let fetched = Deferred::new();
            let loading = fetched.promise();
            let events = events.clone();
            tokio::spawn(async move {
                tokio::time::sleep(FETCH_DELAY).await;
                let products = json!(["widget", "gadget"]);
                debug!(count = 2, "Catalog fetched");
                if let Some(app) = events.upgrade() {
                    app.trigger("catalog.loaded", products);
                }
                fetched.resolve(());
            });
            Ok(Loaded::Pending(loading))
        })
        .on_render(move |readiness| {
            info!(module = NAMESPACE, ready = readiness.is_ok(), "Catalog rendered");
            if let Some(app) = app.upgrade() {
                app.trigger("widgets.rendered", json!({ "widget": NAMESPACE }));
            }
        })
}
