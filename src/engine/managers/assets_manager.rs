use std::cell::RefCell;
use std::path::Path;

use glow::HasContext;
use log::info;

use crate::config::Settings;
use crate::engine::components::{AnimationClip, Material, Mesh, Skeleton};
use crate::engine::systems::picking::Aabb;
use crate::engine::utils::gltf_loader::{self, AssetError};

/// Everything the loader pulled out of the character file. Cheap to
/// clone; the GL handles inside are shared, the skeleton and clips are
/// copied so each instance can be posed independently.
#[derive(Clone)]
pub struct CharacterAsset {
    pub mesh: Mesh,
    pub material: Material,
    pub skeleton: Skeleton,
    pub clips: Vec<AnimationClip>,
    pub bounds: Aabb,
}

struct AssetsManager {
    character: Option<CharacterAsset>,
    skinned_shader: Option<glow::Program>,
    initialized: bool,
}

impl AssetsManager {
    fn new() -> Self {
        Self {
            character: None,
            skinned_shader: None,
            initialized: false,
        }
    }

    fn initialize(&mut self, gl: &glow::Context, settings: &Settings) -> Result<(), AssetError> {
        if self.initialized {
            log::warn!("assets manager already initialized");
            return Ok(());
        }

        let shader = create_shader_program(
            gl,
            include_str!("../assets/shaders/vertex_skinned.glsl"),
            include_str!("../assets/shaders/fragment_skinned.glsl"),
            "skinned",
        )?;
        self.skinned_shader = Some(shader);

        let model_path = Path::new(&settings.model_path);
        info!("loading character model from {}", model_path.display());
        let (document, buffers) = gltf_loader::import_document(model_path)?;

        let (mesh, bounds) = gltf_loader::extract_mesh(gl, &document, &buffers)?;
        let skeleton = gltf_loader::extract_skeleton(&document, &buffers)?;
        let clips = gltf_loader::extract_clips(&document, &buffers);
        let material = gltf_loader::extract_material(
            gl,
            &document,
            settings.texture_path.as_deref().map(Path::new),
        )?;

        info!(
            "character loaded: {} vertices, {} joints, {} clips",
            mesh.vertex_count,
            skeleton.joint_ids.len(),
            clips.len()
        );

        self.character = Some(CharacterAsset {
            mesh,
            material,
            skeleton,
            clips,
            bounds,
        });
        self.initialized = true;
        Ok(())
    }

    fn get_character_copy(&self) -> Option<CharacterAsset> {
        self.character.clone()
    }
}

fn compile_shader(
    gl: &glow::Context,
    shader_type: u32,
    source: &str,
) -> Result<glow::Shader, AssetError> {
    unsafe {
        let shader = gl.create_shader(shader_type).map_err(AssetError::Gl)?;
        gl.shader_source(shader, source);
        gl.compile_shader(shader);

        if !gl.get_shader_compile_status(shader) {
            let log = gl.get_shader_info_log(shader);
            gl.delete_shader(shader);
            return Err(AssetError::Gl(format!("shader compile error: {log}")));
        }
        Ok(shader)
    }
}

fn create_shader_program(
    gl: &glow::Context,
    vertex_shader_source: &str,
    fragment_shader_source: &str,
    program_name: &str,
) -> Result<glow::Program, AssetError> {
    unsafe {
        let vs = compile_shader(gl, glow::VERTEX_SHADER, vertex_shader_source)?;
        let fs = compile_shader(gl, glow::FRAGMENT_SHADER, fragment_shader_source)?;

        let program = gl.create_program().map_err(AssetError::Gl)?;
        gl.attach_shader(program, vs);
        gl.attach_shader(program, fs);
        gl.link_program(program);

        if !gl.get_program_link_status(program) {
            let log = gl.get_program_info_log(program);
            return Err(AssetError::Gl(format!(
                "{program_name} shader program link error: {log}"
            )));
        }

        gl.delete_shader(vs);
        gl.delete_shader(fs);

        info!("created {} shader program", program_name);
        Ok(program)
    }
}

// Global singleton instance - single-threaded
thread_local! {
    static ASSETS_MANAGER: RefCell<AssetsManager> = RefCell::new(AssetsManager::new());
}

// Public API
pub fn initialize(gl: &glow::Context, settings: &Settings) -> Result<(), AssetError> {
    ASSETS_MANAGER.with(|manager| manager.borrow_mut().initialize(gl, settings))
}

pub fn get_character_copy() -> Option<CharacterAsset> {
    ASSETS_MANAGER.with(|manager| manager.borrow().get_character_copy())
}

pub fn get_skinned_shader() -> Option<glow::Program> {
    ASSETS_MANAGER.with(|manager| manager.borrow().skinned_shader)
}
