// CPU skinning: flattens every rendered mesh node of a model into one
// model-space vertex/index list per frame.

use crate::model::{Model, Primitive};
use crate::renderer::vertex::Vertex;
use nalgebra_glm as glm;

/// Current-pose geometry of `model`. Hidden subtrees are left out.
pub fn build_frame_geometry(model: &Model) -> (Vec<Vertex>, Vec<u32>) {
    let world = model.world_matrices();
    let mut vertices = Vec::with_capacity(model.vertex_count());
    let mut indices = Vec::new();

    for (index, node) in model.nodes.iter().enumerate() {
        let Some(mesh) = node.mesh.and_then(|m| model.meshes.get(m)) else {
            continue;
        };
        if !model.is_rendered(index) {
            continue;
        }

        let joints = node
            .skin
            .and_then(|s| model.skins.get(s))
            .map(|skin| skin.joint_matrices(&world));

        for primitive in &mesh.primitives {
            let base = vertices.len() as u32;
            match &joints {
                Some(joints) if primitive.is_skinned() => {
                    push_skinned(primitive, joints, &mut vertices)
                }
                _ => push_rigid(primitive, &world[index], &mut vertices),
            }
            indices.extend(primitive.indices.iter().map(|i| base + i));
        }
    }

    (vertices, indices)
}

fn vertex(primitive: &Primitive, position: glm::Vec4, normal: glm::Vec3) -> Vertex {
    let normal = if glm::length(&normal) > f32::EPSILON {
        glm::normalize(&normal)
    } else {
        glm::vec3(0.0, 1.0, 0.0)
    };
    Vertex {
        position: [position.x, position.y, position.z],
        normal: [normal.x, normal.y, normal.z],
        color: primitive.base_color,
        material: [primitive.metallic, primitive.roughness],
    }
}

fn normal_at(primitive: &Primitive, i: usize) -> glm::Vec4 {
    let n = primitive.normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]);
    glm::vec4(n[0], n[1], n[2], 0.0)
}

fn push_rigid(primitive: &Primitive, matrix: &glm::Mat4, out: &mut Vec<Vertex>) {
    // inverse-transpose keeps normals perpendicular under non-uniform scale
    let normal_matrix = glm::transpose(&glm::inverse(matrix));
    for (i, p) in primitive.positions.iter().enumerate() {
        let position = matrix * glm::vec4(p[0], p[1], p[2], 1.0);
        let normal = (normal_matrix * normal_at(primitive, i)).xyz();
        out.push(vertex(primitive, position, normal));
    }
}

fn push_skinned(primitive: &Primitive, joints: &[glm::Mat4], out: &mut Vec<Vertex>) {
    for (i, p) in primitive.positions.iter().enumerate() {
        let influences = primitive.joints.get(i).copied().unwrap_or([0; 4]);
        let weights = primitive.weights.get(i).copied().unwrap_or([1.0, 0.0, 0.0, 0.0]);

        let mut skin = glm::Mat4::zeros();
        let mut total = 0.0;
        for (&joint, &weight) in influences.iter().zip(weights.iter()) {
            if weight <= 0.0 {
                continue;
            }
            if let Some(m) = joints.get(joint as usize) {
                skin += m * weight;
                total += weight;
            }
        }
        if total <= f32::EPSILON {
            skin = glm::identity();
        } else if (total - 1.0).abs() > 1e-3 {
            skin /= total;
        }

        let position = skin * glm::vec4(p[0], p[1], p[2], 1.0);
        let normal = (skin * normal_at(primitive, i)).xyz();
        out.push(vertex(primitive, position, normal));
    }
}
