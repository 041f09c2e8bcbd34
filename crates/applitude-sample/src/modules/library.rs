use applitude::Descriptor;

pub const NAMESPACE: &str = "librarymodule";

/// A plain library module: data only, no lifecycle hooks.
pub fn descriptor() -> Descriptor {
    Descriptor::new()
        .with_property("foo", "foo")
        .with_property("version", "1.0")
}
