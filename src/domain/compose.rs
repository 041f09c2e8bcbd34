use super::descriptor::Descriptor;
use serde_json::Map;

/// Builds the effective descriptor for a module from its own fields and its
/// mixins.
///
/// Precedence, lowest first: mixins in listed order (a later mixin overrides
/// an earlier one), then the module's own fields, which always win. This holds
/// for plain properties and for the `load`/`render` capabilities alike.
/// `mixins`, `before_render` and `module_namespace` are never inherited.
///
/// The mixins are only read, so a descriptor shared as a mixin is never
/// altered by the modules that use it.
pub fn compose<'a, I>(own: Descriptor, mixins: I) -> Descriptor
where
    I: IntoIterator<Item = &'a Descriptor>,
{
    let mut properties = Map::new();
    let mut load = None;
    let mut render = None;

    for mixin in mixins {
        properties.extend(mixin.properties.clone());
        if mixin.load.is_some() {
            load = mixin.load.clone();
        }
        if mixin.render.is_some() {
            render = mixin.render.clone();
        }
    }
    properties.extend(own.properties);

    Descriptor {
        properties,
        mixins: own.mixins,
        load: own.load.or(load),
        render: own.render.or(render),
        before_render: own.before_render,
        module_namespace: own.module_namespace,
    }
}
