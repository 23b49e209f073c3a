use anyhow::{anyhow, bail, Context, Result};
use glam::{Mat4, Quat, Vec3};
use std::path::Path;

use crate::animation::{AnimationClip, Channel, ChannelValues, Interpolation};
use crate::error::LoadError;
use crate::scene::{
    Geometry, Material, MaterialId, Mesh, MeshId, Node, NodeId, NodeKind, Primitive, SceneGraph,
    Side, Skin, SkinId, TextureData, TextureId, Transform,
};

const DRACO_EXTENSION: &str = "KHR_draco_mesh_compression";

/// A glTF model imported into a standalone graph fragment, ready to be merged
/// into the live scene. Clip channels target fragment node ids.
#[derive(Debug, Clone)]
pub struct ModelAsset {
    pub graph: SceneGraph,
    pub clips: Vec<AnimationClip>,
}

/// Loads a glTF or GLB file
pub fn load_model(path: impl AsRef<Path>) -> Result<ModelAsset, LoadError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    log::info!("Loading glTF file: {:?}", path);
    reject_unsupported(&bytes, path)?;

    let (document, buffers, images) = gltf::import(path)
        .with_context(|| format!("Failed to load glTF file: {:?}", path))
        .map_err(LoadError::Gltf)?;

    log::info!(
        "glTF loaded: {} nodes, {} meshes, {} materials, {} images, {} animations",
        document.nodes().count(),
        document.meshes().count(),
        document.materials().count(),
        images.len(),
        document.animations().count()
    );

    let asset = build_asset(&document, &buffers, &images).map_err(LoadError::Gltf)?;

    let triangles: usize = asset
        .graph
        .meshes
        .iter()
        .flat_map(|m| &m.primitives)
        .map(|p| p.geometry.triangle_count())
        .sum();
    if triangles == 0 {
        return Err(LoadError::NoGeometry(path.to_path_buf()));
    }

    log::info!("Extracted {} triangles, {} clips", triangles, asset.clips.len());
    Ok(asset)
}

/// Validation rejects unknown required extensions, so compressed geometry is
/// detected on the unvalidated document. Unparseable input is left for the
/// importer to report.
fn reject_unsupported(bytes: &[u8], path: &Path) -> Result<(), LoadError> {
    let Ok(raw) = gltf::Gltf::from_slice_without_validation(bytes) else {
        return Ok(());
    };
    let compressed = raw
        .extensions_required()
        .chain(raw.extensions_used())
        .any(|ext| ext == DRACO_EXTENSION);
    if compressed {
        return Err(LoadError::Unsupported(format!(
            "{DRACO_EXTENSION} in {}",
            path.display()
        )));
    }
    Ok(())
}

fn build_asset(
    document: &gltf::Document,
    buffers: &[gltf::buffer::Data],
    images: &[gltf::image::Data],
) -> Result<ModelAsset> {
    let mut graph = SceneGraph::new();

    for image in images {
        graph.add_texture(convert_image(image));
    }

    for material in document.materials() {
        graph.add_material(convert_material(&material));
    }
    // Primitives without a material use the glTF default: opaque white
    let default_material = graph.add_material(Material::standard([1.0, 1.0, 1.0, 1.0]));

    for mesh in document.meshes() {
        let mesh = convert_mesh(&mesh, buffers, default_material)
            .with_context(|| format!("Mesh {:?}", mesh.name()))?;
        graph.add_mesh(mesh);
    }

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .context("glTF file has no scene")?;

    let mut node_map: Vec<Option<NodeId>> = vec![None; document.nodes().count()];
    let root = graph.root();
    for node in scene.nodes() {
        process_node(&node, root, &mut graph, &mut node_map);
    }

    for skin in document.skins() {
        let converted = convert_skin(&skin, buffers, &node_map)
            .with_context(|| format!("Skin {:?}", skin.name()))?;
        graph.skins.push(converted);
    }

    let clips = document
        .animations()
        .map(|animation| convert_animation(&animation, buffers, &node_map))
        .collect();

    Ok(ModelAsset { graph, clips })
}

/// Recursively mirrors the glTF node hierarchy into the graph
fn process_node(
    node: &gltf::Node,
    parent: NodeId,
    graph: &mut SceneGraph,
    node_map: &mut [Option<NodeId>],
) {
    let (translation, rotation, scale) = node.transform().decomposed();

    let kind = match node.mesh() {
        Some(mesh) => NodeKind::Mesh(MeshId(mesh.index())),
        None => NodeKind::Group,
    };
    let mut converted = Node::new(kind);
    converted.name = node.name().map(str::to_owned);
    converted.transform = Transform {
        translation: Vec3::from_array(translation),
        rotation: Quat::from_array(rotation),
        scale: Vec3::from_array(scale),
    };
    converted.skin = node.skin().map(|s| SkinId(s.index()));

    let id = graph.add(parent, converted);
    node_map[node.index()] = Some(id);

    for child in node.children() {
        process_node(&child, id, graph, node_map);
    }
}

fn convert_material(material: &gltf::Material) -> Material {
    let pbr = material.pbr_metallic_roughness();
    let mut converted = Material::standard(pbr.base_color_factor());
    converted.name = material.name().map(str::to_owned);
    converted.metallic = pbr.metallic_factor();
    converted.roughness = pbr.roughness_factor();
    converted.base_color_texture = pbr
        .base_color_texture()
        .map(|info| TextureId(info.texture().source().index()));
    if material.double_sided() {
        converted.side = Side::Double;
    }
    converted
}

fn convert_mesh(
    mesh: &gltf::Mesh,
    buffers: &[gltf::buffer::Data],
    default_material: MaterialId,
) -> Result<Mesh> {
    log::debug!("Processing mesh: {:?}", mesh.name());

    let mut primitives = Vec::new();
    for primitive in mesh.primitives() {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            log::warn!(
                "Skipping {:?} primitive in mesh {:?}",
                primitive.mode(),
                mesh.name()
            );
            continue;
        }

        let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

        let positions: Vec<Vec3> = reader
            .read_positions()
            .context("Mesh primitive has no positions")?
            .map(Vec3::from_array)
            .collect();
        if positions.is_empty() {
            continue;
        }

        let normals: Vec<Vec3> = reader
            .read_normals()
            .map(|n| n.map(Vec3::from_array).collect())
            .unwrap_or_default();
        let uvs: Vec<[f32; 2]> = reader
            .read_tex_coords(0)
            .map(|uv| uv.into_f32().collect())
            .unwrap_or_default();
        let indices: Option<Vec<u32>> = reader.read_indices().map(|i| i.into_u32().collect());

        if let Some(indices) = &indices {
            if let Some(&bad) = indices.iter().find(|&&i| i as usize >= positions.len()) {
                bail!("index {} out of range for {} vertices", bad, positions.len());
            }
        }

        let mut geometry = Geometry::new(positions, normals, uvs, indices);
        if let (Some(joints), Some(weights)) = (reader.read_joints(0), reader.read_weights(0)) {
            geometry = geometry.with_skinning(joints.into_u16().collect(), weights.into_f32().collect());
        }

        let material = primitive
            .material()
            .index()
            .map(MaterialId)
            .unwrap_or(default_material);

        log::debug!(
            "  primitive: {} vertices, {} triangles{}",
            geometry.positions.len(),
            geometry.triangle_count(),
            if geometry.is_skinned() { ", skinned" } else { "" }
        );
        primitives.push(Primitive::new(geometry, material));
    }

    Ok(Mesh::new(mesh.name().map(str::to_owned), primitives))
}

fn convert_skin(
    skin: &gltf::Skin,
    buffers: &[gltf::buffer::Data],
    node_map: &[Option<NodeId>],
) -> Result<Skin> {
    let joints = skin
        .joints()
        .map(|joint| {
            node_map[joint.index()]
                .ok_or_else(|| anyhow!("joint {} is not part of the scene", joint.index()))
        })
        .collect::<Result<Vec<_>>>()?;

    let reader = skin.reader(|buffer| Some(&buffers[buffer.index()]));
    let inverse_bind = match reader.read_inverse_bind_matrices() {
        Some(matrices) => matrices.map(|m| Mat4::from_cols_array_2d(&m)).collect(),
        None => vec![Mat4::IDENTITY; joints.len()],
    };

    Ok(Skin {
        joints,
        inverse_bind,
    })
}

fn convert_animation(
    animation: &gltf::Animation,
    buffers: &[gltf::buffer::Data],
    node_map: &[Option<NodeId>],
) -> AnimationClip {
    use gltf::animation::util::ReadOutputs;

    let mut channels = Vec::new();
    for channel in animation.channels() {
        let Some(target) = node_map[channel.target().node().index()] else {
            continue;
        };
        let reader = channel.reader(|buffer| Some(&buffers[buffer.index()]));
        let (Some(inputs), Some(outputs)) = (reader.read_inputs(), reader.read_outputs()) else {
            continue;
        };

        let values = match outputs {
            ReadOutputs::Translations(t) => ChannelValues::Translation(t.map(Vec3::from_array).collect()),
            ReadOutputs::Rotations(r) => {
                ChannelValues::Rotation(r.into_f32().map(Quat::from_array).collect())
            }
            ReadOutputs::Scales(s) => ChannelValues::Scale(s.map(Vec3::from_array).collect()),
            ReadOutputs::MorphTargetWeights(_) => {
                log::debug!("Skipping morph target channel in {:?}", animation.name());
                continue;
            }
        };

        let interpolation = match channel.sampler().interpolation() {
            gltf::animation::Interpolation::Linear => Interpolation::Linear,
            gltf::animation::Interpolation::Step => Interpolation::Step,
            gltf::animation::Interpolation::CubicSpline => Interpolation::CubicSpline,
        };

        channels.push(Channel {
            target,
            interpolation,
            times: inputs.collect(),
            values,
        });
    }

    let name = animation
        .name()
        .map(str::to_owned)
        .unwrap_or_else(|| format!("animation_{}", animation.index()));
    let clip = AnimationClip::new(name, channels);
    log::debug!("Loaded animation {:?}: {:.2}s", clip.name, clip.duration);
    clip
}

/// Widens any 8-bit glTF image to RGBA8
fn convert_image(image: &gltf::image::Data) -> TextureData {
    use gltf::image::Format;

    let data = match image.format {
        Format::R8G8B8A8 => image.pixels.clone(),
        Format::R8G8B8 => image
            .pixels
            .chunks_exact(3)
            .flat_map(|rgb| [rgb[0], rgb[1], rgb[2], 255])
            .collect(),
        Format::R8G8 => image
            .pixels
            .chunks_exact(2)
            .flat_map(|rg| [rg[0], rg[1], 0, 255])
            .collect(),
        Format::R8 => image
            .pixels
            .iter()
            .flat_map(|&r| [r, r, r, 255])
            .collect(),
        other => {
            log::warn!("Unsupported texture format {:?}, using white", other);
            vec![255; (image.width * image.height * 4) as usize]
        }
    };

    TextureData {
        width: image.width,
        height: image.height,
        data,
    }
}
