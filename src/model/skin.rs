use nalgebra_glm as glm;

/// Joint list of a skinned mesh. `joints[i]` is a node index in the owning
/// model, paired with `inverse_bind_matrices[i]`.
#[derive(Debug, Clone, Default)]
pub struct Skin {
    pub joints: Vec<usize>,
    pub inverse_bind_matrices: Vec<glm::Mat4>,
}

impl Skin {
    /// Joint matrices for the current pose, given model-space node matrices.
    pub fn joint_matrices(&self, world: &[glm::Mat4]) -> Vec<glm::Mat4> {
        self.joints
            .iter()
            .enumerate()
            .map(|(i, &node)| {
                let ibm = self
                    .inverse_bind_matrices
                    .get(i)
                    .copied()
                    .unwrap_or_else(glm::identity);
                match world.get(node) {
                    Some(m) => m * ibm,
                    None => ibm,
                }
            })
            .collect()
    }
}
