//! WGSL sources
//!
//! WGSL has no includes; lit shaders are concatenated with `common.wgsl`.

pub const COMMON: &str = include_str!("shaders/common.wgsl");
pub const SCENE: &str = include_str!("shaders/scene.wgsl");
pub const SHADOW: &str = include_str!("shaders/shadow.wgsl");
pub const PORTAL_MASK: &str = include_str!("shaders/portal_mask.wgsl");
pub const POST_PROCESS: &str = include_str!("shaders/post_process.wgsl");

/// Scene and portal view module: common declarations plus both fragment entries.
pub fn scene_source() -> String {
    format!("{COMMON}\n{SCENE}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lit_shader_declares_protocol_names() {
        let source = scene_source();
        for name in [
            "MVP", "M:", "N:", "lMVP", "tex", "normal_map", "map_norms", "pn", "sn", "eye_pos",
            "shadow_map", "portal_pos", "portal_normal", "other_portal_normal", "offset",
        ] {
            assert!(source.contains(name), "missing `{name}`");
        }
        assert!(source.contains("fn fs_main") && source.contains("fn fs_portal"));
    }

    fn validate(label: &str, source: &str) -> naga::Module {
        let module = naga::front::wgsl::parse_str(source)
            .unwrap_or_else(|e| panic!("{label}: {e}"));
        let mut validator = naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        );
        if let Err(e) = validator.validate(&module) {
            panic!("{label}: {e}");
        }
        module
    }

    fn entry_points(module: &naga::Module) -> Vec<(&str, naga::ShaderStage)> {
        module
            .entry_points
            .iter()
            .map(|ep| (ep.name.as_str(), ep.stage))
            .collect()
    }

    #[test]
    fn every_shader_validates() {
        use naga::ShaderStage::{Fragment, Vertex};

        let scene = validate("scene", &scene_source());
        let points = entry_points(&scene);
        for expected in [("vs_main", Vertex), ("fs_main", Fragment), ("fs_portal", Fragment)] {
            assert!(points.contains(&expected), "scene is missing {expected:?}");
        }
        assert!(scene
            .functions
            .iter()
            .any(|(_, function)| function.name.as_deref() == Some("shade")));

        for (label, source) in [("shadow", SHADOW), ("portal_mask", PORTAL_MASK), ("post_process", POST_PROCESS)] {
            let module = validate(label, source);
            assert!(!module.entry_points.is_empty(), "{label} has no entry points");
        }
    }

    #[test]
    fn both_lit_entries_shade() {
        let source = scene_source();
        for entry in ["fn fs_main", "fn fs_portal"] {
            let start = source.find(entry).unwrap();
            let body = &source[start..];
            let end = body.find("@fragment").unwrap_or(body.len());
            assert!(body[..end].contains("return shade("), "{entry} does not call shade");
        }
    }
}
