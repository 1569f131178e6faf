use crate::model::mesh::Mesh;
use crate::model::skin::Skin;
use nalgebra_glm as glm;

#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    pub translation: glm::Vec3,
    pub rotation: glm::Quat,
    pub scale: glm::Vec3,
    pub visible: bool,
    pub mesh: Option<usize>,
    pub skin: Option<usize>,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            name: String::new(),
            parent: None,
            children: Vec::new(),
            translation: glm::vec3(0.0, 0.0, 0.0),
            rotation: glm::quat_identity(),
            scale: glm::vec3(1.0, 1.0, 1.0),
            visible: true,
            mesh: None,
            skin: None,
        }
    }
}

impl Node {
    pub fn local_matrix(&self) -> glm::Mat4 {
        glm::translation(&self.translation)
            * glm::quat_to_mat4(&self.rotation)
            * glm::scaling(&self.scale)
    }
}

/// A loaded character. `roots` are the top-level nodes of the asset's scene in
/// loading order; together they play the part of the asset's root group.
#[derive(Debug, Clone, Default)]
pub struct Model {
    pub name: String,
    pub nodes: Vec<Node>,
    pub roots: Vec<usize>,
    pub meshes: Vec<Mesh>,
    pub skins: Vec<Skin>,
}

impl Model {
    /// Model-space matrix for every node. Nodes unreachable from `roots` get
    /// their local matrix.
    pub fn world_matrices(&self) -> Vec<glm::Mat4> {
        let mut world: Vec<glm::Mat4> = self.nodes.iter().map(Node::local_matrix).collect();
        let mut stack: Vec<(usize, glm::Mat4)> = self
            .roots
            .iter()
            .map(|&root| (root, glm::identity()))
            .collect();

        while let Some((index, parent_matrix)) = stack.pop() {
            let Some(node) = self.nodes.get(index) else {
                continue;
            };
            let matrix = parent_matrix * node.local_matrix();
            world[index] = matrix;
            for &child in &node.children {
                stack.push((child, matrix));
            }
        }

        world
    }

    /// A node is drawn only if it and all of its ancestors are visible.
    pub fn is_rendered(&self, index: usize) -> bool {
        let mut current = Some(index);
        while let Some(i) = current {
            let Some(node) = self.nodes.get(i) else {
                return false;
            };
            if !node.visible {
                return false;
            }
            current = node.parent;
        }
        true
    }

    /// Hide the `index`-th top-level node and return its name, or `None` when
    /// there is no such node.
    pub fn hide_root_child(&mut self, index: usize) -> Option<&str> {
        let node = self.nodes.get_mut(*self.roots.get(index)?)?;
        node.visible = false;
        Some(node.name.as_str())
    }

    pub fn vertex_count(&self) -> usize {
        self.meshes
            .iter()
            .flat_map(|m| m.primitives.iter())
            .map(|p| p.vertex_count())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_level_model() -> Model {
        let mut root = Node {
            name: "Root".into(),
            children: vec![1],
            translation: glm::vec3(0.0, 1.0, 0.0),
            ..Default::default()
        };
        root.scale = glm::vec3(2.0, 2.0, 2.0);
        let child = Node {
            name: "Hand".into(),
            parent: Some(0),
            translation: glm::vec3(1.0, 0.0, 0.0),
            ..Default::default()
        };
        let sword = Node {
            name: "Sword".into(),
            ..Default::default()
        };
        Model {
            name: "test".into(),
            nodes: vec![root, child, sword],
            roots: vec![0, 2],
            ..Default::default()
        }
    }

    #[test]
    fn world_matrices_compose_parent_transforms() {
        let model = two_level_model();
        let world = model.world_matrices();
        let hand = world[1] * glm::vec4(0.0, 0.0, 0.0, 1.0);
        // parent scale 2 doubles the child's offset
        assert!((hand.x - 2.0).abs() < 1e-5);
        assert!((hand.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn hiding_a_root_child_hides_its_subtree() {
        let mut model = two_level_model();
        assert!(model.hide_root_child(0).is_some());
        assert!(!model.is_rendered(0));
        assert!(!model.is_rendered(1));
        assert!(model.is_rendered(2));
    }

    #[test]
    fn hide_root_child_out_of_range_is_noop() {
        let mut model = two_level_model();
        assert_eq!(model.hide_root_child(5), None);
        assert!(model.nodes.iter().all(|n| n.visible));
    }

    #[test]
    fn second_root_child_is_the_one_loaded_second() {
        let mut model = two_level_model();
        assert_eq!(model.hide_root_child(1), Some("Sword"));
        assert!(!model.nodes[2].visible);
    }
}
