use crate::engine::utils::math::{
    mat4x4_from_quat, mat4x4_mul, mat4x4_scale, mat4x4_translate, quat_from_pitch_yaw, Mat4x4,
};

#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub translation: [f32; 3],
    pub rotation: [f32; 4],
    pub scale: [f32; 3],
    pub parent: u32,
}

#[derive(Debug, Clone)]
pub struct Skeleton {
    pub nodes: Vec<Node>,
    pub joint_ids: Vec<u32>,
    pub joint_inverse_mats: Vec<[f32; 16]>,
}

impl Skeleton {
    /// Look up a bone by name. Only nodes that are part of the skin are
    /// considered bones; mesh and scene nodes never match.
    pub fn find_bone(&self, name: &str) -> Option<usize> {
        self.joint_ids
            .iter()
            .map(|&id| id as usize)
            .find(|&idx| self.nodes.get(idx).map(|n| n.name == name).unwrap_or(false))
    }

    pub fn is_bone(&self, node_idx: usize) -> bool {
        self.joint_ids.iter().any(|&id| id as usize == node_idx)
    }

    /// Overwrite a joint's local rotation with a pointer-derived pitch/yaw
    /// pair (radians). Writing the same angles twice leaves the same
    /// rotation, there is no accumulation.
    pub fn set_joint_pitch_yaw(&mut self, node_idx: usize, pitch: f32, yaw: f32) {
        if let Some(node) = self.nodes.get_mut(node_idx) {
            node.rotation = quat_from_pitch_yaw(pitch, yaw);
        }
    }

    /// World transform of a node, walking up the parent chain.
    pub fn node_world_txfm(&self, idx: usize) -> Mat4x4 {
        let node = &self.nodes[idx];

        let mut node_txfm = mat4x4_scale(node.scale[0], node.scale[1], node.scale[2]);
        node_txfm = mat4x4_mul(mat4x4_from_quat(node.rotation), node_txfm);
        node_txfm = mat4x4_mul(
            mat4x4_translate(node.translation[0], node.translation[1], node.translation[2]),
            node_txfm,
        );

        if node.parent != u32::MAX {
            node_txfm = mat4x4_mul(self.node_world_txfm(node.parent as usize), node_txfm);
        }

        node_txfm
    }
}
