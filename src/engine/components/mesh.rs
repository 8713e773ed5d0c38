// GPU-side mesh handle produced by the asset loader.
#[derive(Clone, Debug)]
pub struct Mesh {
    pub vao: glow::VertexArray,
    pub index_count: usize,
    pub vertex_count: usize,
}
