use crate::animation::{AnimationClip, Interpolation, Track, TrackProperty};
use crate::error::ViewerError;
use crate::model::{Mesh, Model, Node, Primitive, Skin};
use gltf::animation::util::ReadOutputs;
use nalgebra_glm as glm;

/// A decoded character: its node hierarchy plus every clip, in file order.
#[derive(Debug, Clone)]
pub struct LoadedAsset {
    pub model: Model,
    pub clips: Vec<AnimationClip>,
}

/// Decode a binary (`.glb`) or self-contained JSON glTF 2.0 asset.
pub fn decode_gltf(bytes: &[u8], name: &str) -> Result<LoadedAsset, ViewerError> {
    let gltf::Gltf { document, blob } = gltf::Gltf::from_slice_without_validation(bytes)?;
    let document = validate_document(document)?;
    let buffers = gltf::import_buffers(&document, None, blob)?;
    let buffer_data = |buffer: gltf::Buffer<'_>| buffers.get(buffer.index()).map(|d| d.0.as_slice());

    let mut nodes: Vec<Node> = document
        .nodes()
        .map(|node| {
            let (t, r, s) = node.transform().decomposed();
            Node {
                name: node
                    .name()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("node_{}", node.index())),
                parent: None,
                children: node.children().map(|c| c.index()).collect(),
                translation: glm::vec3(t[0], t[1], t[2]),
                rotation: glm::quat(r[0], r[1], r[2], r[3]),
                scale: glm::vec3(s[0], s[1], s[2]),
                visible: true,
                mesh: node.mesh().map(|m| m.index()),
                skin: node.skin().map(|s| s.index()),
            }
        })
        .collect();

    for index in 0..nodes.len() {
        let children = nodes[index].children.clone();
        for child in children {
            if let Some(node) = nodes.get_mut(child) {
                node.parent = Some(index);
            }
        }
    }

    let roots: Vec<usize> = match document.default_scene().or_else(|| document.scenes().next()) {
        Some(scene) => scene.nodes().map(|n| n.index()).collect(),
        None => (0..nodes.len()).filter(|&i| nodes[i].parent.is_none()).collect(),
    };

    let mut meshes = Vec::new();
    for mesh in document.meshes() {
        let mut primitives = Vec::new();
        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                log::warn!(
                    "Skipping primitive {} of mesh {}: mode {:?} is not a triangle list",
                    primitive.index(),
                    mesh.index(),
                    primitive.mode()
                );
                continue;
            }

            let reader = primitive.reader(buffer_data);
            let Some(positions) = reader.read_positions() else {
                log::warn!(
                    "Skipping primitive {} of mesh {}: no readable positions",
                    primitive.index(),
                    mesh.index()
                );
                continue;
            };
            let positions: Vec<[f32; 3]> = positions.collect();
            let vertex_count = positions.len() as u32;

            let indices: Vec<u32> = match reader.read_indices() {
                Some(indices) => indices.into_u32().collect(),
                None => (0..vertex_count).collect(),
            };
            let indices: Vec<u32> = indices
                .chunks_exact(3)
                .filter(|tri| tri.iter().all(|&i| i < vertex_count))
                .flatten()
                .copied()
                .collect();

            let normals = match reader.read_normals() {
                Some(normals) => normals.collect(),
                None => compute_normals(&positions, &indices),
            };
            let joints = reader
                .read_joints(0)
                .map(|j| j.into_u16().collect())
                .unwrap_or_default();
            let weights = reader
                .read_weights(0)
                .map(|w| w.into_f32().collect())
                .unwrap_or_default();

            let pbr = primitive.material().pbr_metallic_roughness();
            primitives.push(Primitive {
                positions,
                normals,
                joints,
                weights,
                indices,
                base_color: pbr.base_color_factor(),
                metallic: pbr.metallic_factor(),
                roughness: pbr.roughness_factor(),
            });
        }

        meshes.push(Mesh { primitives });
    }

    let skins = document
        .skins()
        .map(|skin| {
            let joints: Vec<usize> = skin.joints().map(|j| j.index()).collect();
            let inverse_bind_matrices = skin
                .reader(buffer_data)
                .read_inverse_bind_matrices()
                .map(|m| m.map(glm::Mat4::from).collect())
                .unwrap_or_else(|| vec![glm::Mat4::identity(); joints.len()]);
            Skin {
                joints,
                inverse_bind_matrices,
            }
        })
        .collect();

    let mut clips = Vec::new();
    for (index, animation) in document.animations().enumerate() {
        let clip_name = animation
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("animation_{index}"));

        let mut tracks = Vec::new();
        for channel in animation.channels() {
            let target = channel.target();
            let property = match target.property() {
                gltf::animation::Property::Translation => TrackProperty::Translation,
                gltf::animation::Property::Rotation => TrackProperty::Rotation,
                gltf::animation::Property::Scale => TrackProperty::Scale,
                gltf::animation::Property::MorphTargetWeights => continue,
            };
            let interpolation = match channel.sampler().interpolation() {
                gltf::animation::Interpolation::Step => Interpolation::Step,
                gltf::animation::Interpolation::Linear => Interpolation::Linear,
                gltf::animation::Interpolation::CubicSpline => Interpolation::CubicSpline,
            };

            let reader = channel.reader(buffer_data);
            let Some(times) = reader.read_inputs() else {
                continue;
            };
            let values: Vec<[f32; 4]> = match reader.read_outputs() {
                Some(ReadOutputs::Translations(v)) => v.map(|v| [v[0], v[1], v[2], 0.0]).collect(),
                Some(ReadOutputs::Scales(v)) => v.map(|v| [v[0], v[1], v[2], 0.0]).collect(),
                Some(ReadOutputs::Rotations(v)) => v.into_f32().collect(),
                _ => continue,
            };

            tracks.push(Track {
                node: target.node().index(),
                property,
                interpolation,
                times: times.collect(),
                values,
            });
        }

        clips.push(AnimationClip::new(clip_name, tracks));
    }

    let model = Model {
        name: name.to_string(),
        nodes,
        roots,
        meshes,
        skins,
    };

    log::info!(
        "Decoded {}: {} nodes, {} meshes, {} vertices, {} skins, {} clips",
        name,
        model.nodes.len(),
        model.meshes.len(),
        model.vertex_count(),
        model.skins.len(),
        clips.len()
    );

    Ok(LoadedAsset { model, clips })
}

/// Full glTF validation, except that unsupported required extensions (Draco,
/// meshopt, quantization) only warn. Primitives that depend on them have no
/// readable positions and are skipped while decoding.
fn validate_document(document: gltf::Document) -> Result<gltf::Document, ViewerError> {
    use gltf::json::validation::{Error, Validate};

    let root = document.into_json();
    let mut errors = Vec::new();
    root.validate(&root, gltf::json::Path::new, &mut |path, error| {
        errors.push((path(), error))
    });

    let (unsupported, errors): (Vec<_>, Vec<_>) = errors.into_iter().partition(|(path, error)| {
        matches!(error, Error::Unsupported) && path.to_string().starts_with("extensionsRequired")
    });
    for (path, _) in &unsupported {
        let extension = path
            .to_string()
            .trim_start_matches("extensionsRequired[")
            .trim_end_matches(']')
            .parse::<usize>()
            .ok()
            .and_then(|i| root.extensions_required.get(i).cloned())
            .unwrap_or_else(|| path.to_string());
        log::warn!("Required extension {} is not supported; affected primitives will be skipped", extension);
    }
    if !errors.is_empty() {
        return Err(gltf::Error::Validation(errors).into());
    }

    Ok(gltf::Document::from_json_without_validation(root))
}

/// Area-weighted vertex normals for meshes shipped without them.
fn compute_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut normals = vec![glm::vec3(0.0, 0.0, 0.0); positions.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let pa = glm::Vec3::from(positions[a]);
        let pb = glm::Vec3::from(positions[b]);
        let pc = glm::Vec3::from(positions[c]);
        let face = glm::cross(&(pb - pa), &(pc - pa));
        normals[a] += face;
        normals[b] += face;
        normals[c] += face;
    }
    normals
        .into_iter()
        .map(|n| {
            if glm::length(&n) > f32::EPSILON {
                let n = glm::normalize(&n);
                [n.x, n.y, n.z]
            } else {
                [0.0, 1.0, 0.0]
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::fixture::{KNIGHT_JSON, glb_from_json, knight_glb};

    #[test]
    fn decodes_hierarchy_mesh_and_clips() {
        let asset = decode_gltf(&knight_glb(), "knight").unwrap();
        let model = &asset.model;

        assert_eq!(model.name, "knight");
        assert_eq!(model.roots, vec![0, 1]);
        assert_eq!(model.nodes[1].name, "Sword");
        assert_eq!(model.nodes[1].translation, glm::vec3(0.5, 0.0, 0.0));
        assert_eq!(model.meshes.len(), 1);

        let tri = &model.meshes[0].primitives[0];
        assert_eq!(tri.positions.len(), 3);
        assert_eq!(tri.indices, vec![0, 1, 2]);
        // generated: counter-clockwise in XY faces +Z
        assert_eq!(tri.normals[0], [0.0, 0.0, 1.0]);
        assert_eq!(tri.base_color, [1.0, 1.0, 1.0, 1.0]);

        let names: Vec<&str> = asset.clips.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Look Around", "Walking", "Die"]);
        assert_eq!(asset.clips[0].duration, 1.0);
        assert_eq!(asset.clips[2].tracks[0].interpolation, Interpolation::Step);
        assert_eq!(asset.clips[0].tracks[0].sample(0.5), [0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn unsupported_required_extension_still_loads_nodes_and_clips() {
        let json = KNIGHT_JSON.replacen(
            '{',
            r#"{ "extensionsUsed": ["KHR_draco_mesh_compression"], "extensionsRequired": ["KHR_draco_mesh_compression"],"#,
            1,
        );
        let asset = decode_gltf(&glb_from_json(&json), "knight").unwrap();

        assert_eq!(asset.model.nodes.len(), 2);
        let names: Vec<&str> = asset.clips.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Look Around", "Walking", "Die"]);
    }

    #[test]
    fn other_validation_errors_still_fail() {
        let json = KNIGHT_JSON.replace(r#""mesh": 0, "translation""#, r#""mesh": 7, "translation""#);
        assert!(decode_gltf(&glb_from_json(&json), "knight").is_err());
    }

    #[test]
    fn truncated_glb_is_rejected() {
        let glb = knight_glb();
        assert!(decode_gltf(&glb[..glb.len() / 2], "knight").is_err());
    }

    #[test]
    fn degenerate_triangles_get_a_fallback_normal() {
        let normals = compute_normals(&[[0.0; 3], [0.0; 3], [0.0; 3]], &[0, 1, 2]);
        assert_eq!(normals, vec![[0.0, 1.0, 0.0]; 3]);
    }
}
