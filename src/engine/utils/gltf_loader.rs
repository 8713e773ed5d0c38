//! glTF extraction helpers.
//!
//! Pulls the pieces the viewer needs out of a glTF document: the skinned
//! mesh (uploaded to a VAO), the named skeleton, every animation clip,
//! and the material. All failures surface as [`AssetError`]; the caller
//! decides how fatal a broken asset is.

use std::path::Path;

use glow::HasContext;
use log::info;
use thiserror::Error;

use crate::engine::components::animation::{AnimationChannel, AnimationClip, AnimationType};
use crate::engine::components::material::Material;
use crate::engine::components::mesh::Mesh;
use crate::engine::components::skeleton::{Node, Skeleton};
use crate::engine::systems::picking::Aabb;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to import model: {0}")]
    Import(#[from] gltf::Error),
    #[error("failed to read asset file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to decode texture: {0}")]
    Texture(#[from] image::ImageError),
    #[error("model has no mesh primitive")]
    MissingMesh,
    #[error("model has no skin")]
    MissingSkin,
    #[error("missing vertex attribute: {0}")]
    MissingAttribute(&'static str),
    #[error("gl error: {0}")]
    Gl(String),
}

pub fn import_document(path: &Path) -> Result<(gltf::Document, Vec<gltf::buffer::Data>), AssetError> {
    let (document, buffers, _images) = gltf::import(path)?;
    Ok((document, buffers))
}

/// Upload the first mesh primitive into a VAO and return it with its
/// rest-pose bounds.
pub fn extract_mesh(
    gl: &glow::Context,
    document: &gltf::Document,
    buffers: &[gltf::buffer::Data],
) -> Result<(Mesh, Aabb), AssetError> {
    let primitive = document
        .meshes()
        .next()
        .ok_or(AssetError::MissingMesh)?
        .primitives()
        .next()
        .ok_or(AssetError::MissingMesh)?;

    let reader = primitive.reader(|b| buffers.get(b.index()).map(|d| &**d));

    let positions: Vec<f32> = reader
        .read_positions()
        .ok_or(AssetError::MissingAttribute("POSITION"))?
        .flatten()
        .collect();
    let normals: Vec<f32> = reader
        .read_normals()
        .ok_or(AssetError::MissingAttribute("NORMAL"))?
        .flatten()
        .collect();
    let tex_coords: Vec<f32> = reader
        .read_tex_coords(0)
        .ok_or(AssetError::MissingAttribute("TEXCOORD_0"))?
        .into_f32()
        .flatten()
        .collect();
    let indices: Vec<u32> = reader
        .read_indices()
        .ok_or(AssetError::MissingAttribute("indices"))?
        .into_u32()
        .collect();
    let joints: Vec<u16> = reader
        .read_joints(0)
        .ok_or(AssetError::MissingAttribute("JOINTS_0"))?
        .into_u16()
        .flatten()
        .collect();
    let weights: Vec<f32> = reader
        .read_weights(0)
        .ok_or(AssetError::MissingAttribute("WEIGHTS_0"))?
        .into_f32()
        .flatten()
        .collect();

    let bounds = Aabb::from_positions(&positions);

    unsafe {
        let vao = gl.create_vertex_array().map_err(AssetError::Gl)?;
        gl.bind_vertex_array(Some(vao));

        let setup_attrib = |loc: u32, data: &[u8], size: i32, ty: u32, stride: i32, int: bool| -> Result<(), AssetError> {
            let buf = gl.create_buffer().map_err(AssetError::Gl)?;
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(buf));
            gl.buffer_data_u8_slice(glow::ARRAY_BUFFER, data, glow::STATIC_DRAW);
            gl.enable_vertex_attrib_array(loc);
            if int {
                gl.vertex_attrib_pointer_i32(loc, size, ty, stride, 0);
            } else {
                gl.vertex_attrib_pointer_f32(loc, size, ty, false, stride, 0);
            }
            Ok(())
        };

        setup_attrib(0, bytemuck::cast_slice(&normals), 3, glow::FLOAT, 12, false)?;
        setup_attrib(1, bytemuck::cast_slice(&positions), 3, glow::FLOAT, 12, false)?;
        setup_attrib(2, bytemuck::cast_slice(&joints), 4, glow::UNSIGNED_SHORT, 8, true)?;
        setup_attrib(3, bytemuck::cast_slice(&weights), 4, glow::FLOAT, 16, false)?;
        setup_attrib(4, bytemuck::cast_slice(&tex_coords), 2, glow::FLOAT, 8, false)?;

        let ebo = gl.create_buffer().map_err(AssetError::Gl)?;
        gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(ebo));
        gl.buffer_data_u8_slice(
            glow::ELEMENT_ARRAY_BUFFER,
            bytemuck::cast_slice(&indices),
            glow::STATIC_DRAW,
        );

        gl.bind_vertex_array(None);

        Ok((
            Mesh {
                vao,
                index_count: indices.len(),
                vertex_count: positions.len() / 3,
            },
            bounds,
        ))
    }
}

/// Node hierarchy plus the skin's joint list and inverse bind matrices.
/// Node names are kept so bones can be looked up by name later.
pub fn extract_skeleton(
    document: &gltf::Document,
    buffers: &[gltf::buffer::Data],
) -> Result<Skeleton, AssetError> {
    let mut node_parents = vec![u32::MAX; document.nodes().len()];
    for node in document.nodes() {
        for child in node.children() {
            node_parents[child.index()] = node.index() as u32;
        }
    }

    let nodes = document
        .nodes()
        .map(|n| {
            let (t, r, s) = n.transform().decomposed();
            Node {
                name: n.name().unwrap_or_default().to_string(),
                translation: t,
                rotation: r,
                scale: s,
                parent: node_parents[n.index()],
            }
        })
        .collect::<Vec<_>>();

    let skin = document.skins().next().ok_or(AssetError::MissingSkin)?;
    let joint_ids: Vec<u32> = skin.joints().map(|j| j.index() as u32).collect();

    let reader = skin.reader(|b| buffers.get(b.index()).map(|d| &**d));
    let joint_inverse_mats = reader
        .read_inverse_bind_matrices()
        .map(|mats| {
            mats.map(|m| {
                // glTF matrices are column-major; ours are row-major.
                let mut out = [0.0_f32; 16];
                for row in 0..4 {
                    for col in 0..4 {
                        out[row * 4 + col] = m[col][row];
                    }
                }
                out
            })
            .collect()
        })
        .unwrap_or_default();

    Ok(Skeleton {
        nodes,
        joint_ids,
        joint_inverse_mats,
    })
}

/// Every animation in the file as a named clip. Channels record the
/// target node's name so clips can be filtered by joint later.
pub fn extract_clips(
    document: &gltf::Document,
    buffers: &[gltf::buffer::Data],
) -> Vec<AnimationClip> {
    document
        .animations()
        .enumerate()
        .map(|(i, anim)| {
            let channels = anim
                .channels()
                .filter_map(|chan| {
                    let animation_type = match chan.target().property() {
                        gltf::animation::Property::Translation => AnimationType::Translation,
                        gltf::animation::Property::Rotation => AnimationType::Rotation,
                        gltf::animation::Property::Scale => AnimationType::Scale,
                        _ => return None,
                    };

                    let reader = chan.reader(|b| buffers.get(b.index()).map(|d| &**d));
                    let times: Vec<f32> = reader.read_inputs()?.collect();
                    let data: Vec<f32> = match reader.read_outputs()? {
                        gltf::animation::util::ReadOutputs::Translations(v) => {
                            v.flatten().collect()
                        }
                        gltf::animation::util::ReadOutputs::Rotations(r) => {
                            r.into_f32().flatten().collect()
                        }
                        gltf::animation::util::ReadOutputs::Scales(v) => v.flatten().collect(),
                        gltf::animation::util::ReadOutputs::MorphTargetWeights(_) => return None,
                    };

                    let target_node = chan.target().node();
                    Some(AnimationChannel {
                        target: target_node.index() as u32,
                        target_name: target_node.name().unwrap_or_default().to_string(),
                        animation_type,
                        times,
                        data,
                    })
                })
                .collect();

            let name = anim
                .name()
                .map(str::to_string)
                .unwrap_or_else(|| format!("clip{i}"));
            AnimationClip::new(name, channels)
        })
        .collect()
}

/// Material factors from the document plus an optional separately shipped
/// base-color texture.
pub fn extract_material(
    gl: &glow::Context,
    document: &gltf::Document,
    texture_path: Option<&Path>,
) -> Result<Material, AssetError> {
    let mut material = Material::new();

    if let Some(gltf_material) = document.materials().next() {
        let pbr = gltf_material.pbr_metallic_roughness();
        material.metallic_factor = pbr.metallic_factor();
        material.roughness_factor = pbr.roughness_factor();
        material.double_sided = gltf_material.double_sided();
    }

    let Some(path) = texture_path else {
        info!("no texture configured, rendering untextured");
        return Ok(material);
    };

    let img = image::io::Reader::open(path)?.with_guessed_format()?.decode()?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    let pixels = rgba.into_raw();

    unsafe {
        let texture = gl.create_texture().map_err(AssetError::Gl)?;
        gl.bind_texture(glow::TEXTURE_2D, Some(texture));
        gl.tex_image_2d(
            glow::TEXTURE_2D,
            0,
            glow::RGBA as i32,
            width as i32,
            height as i32,
            0,
            glow::RGBA,
            glow::UNSIGNED_BYTE,
            glow::PixelUnpackData::Slice(Some(&pixels)),
        );
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, glow::LINEAR as i32);
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, glow::LINEAR as i32);
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, glow::REPEAT as i32);
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, glow::REPEAT as i32);
        gl.bind_texture(glow::TEXTURE_2D, None);

        material.base_color_texture = Some(texture);
        info!("texture loaded: {}x{} pixels", width, height);
    }

    Ok(material)
}
