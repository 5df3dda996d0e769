use crate::error::LoadError;
use crate::render::mesh::Vertex;
use crate::scene::{Model, ModelPrimitive, TextureImage};
use glam::{Mat3, Mat4, Vec3};
use std::collections::HashSet;
use std::sync::Arc;

/// Parses a binary glTF into a [`Model`], baking every node transform into
/// the vertex data. Only triangle-list primitives are kept.
pub fn parse_glb(bytes: &[u8]) -> Result<Model, LoadError> {
    let gltf::Gltf { document, blob } = gltf::Gltf::from_slice(bytes)?;
    let buffers = gltf::import_buffers(&document, None, blob)?;
    let textures = import_textures(&document, &buffers);

    let mut primitives = Vec::new();
    let scene = document.default_scene().or_else(|| document.scenes().next());
    if let Some(scene) = scene {
        let roots: Vec<_> = scene.nodes().collect();
        let mut visited = HashSet::new();
        let mut stack: Vec<(gltf::Node, Mat4)> =
            roots.into_iter().rev().map(|node| (node, Mat4::IDENTITY)).collect();

        // Nodes form a forest, so reaching one twice means a cycle or a
        // shared child.
        while let Some((node, parent_transform)) = stack.pop() {
            if !visited.insert(node.index()) {
                return Err(LoadError::InvalidHierarchy(format!(
                    "node {} is reachable more than once",
                    node.index()
                )));
            }

            let local_transform = Mat4::from_cols_array_2d(&node.transform().matrix());
            let global_transform = parent_transform * local_transform;

            if let Some(mesh) = node.mesh() {
                process_mesh(&mesh, &buffers, &textures, &global_transform, &mut primitives);
            }

            let children: Vec<_> = node.children().collect();
            stack.extend(children.into_iter().rev().map(|child| (child, global_transform)));
        }
    }

    let model = Model::new(primitives);
    log::debug!(
        "Parsed glTF: {} meshes, {} primitives, {} vertices, {} triangles",
        document.meshes().count(),
        model.primitives().len(),
        model.vertex_count(),
        model.triangle_count()
    );
    Ok(model)
}

/// Decodes every image in the document. A document whose images cannot be
/// decoded still loads, untextured.
fn import_textures(
    document: &gltf::Document,
    buffers: &[gltf::buffer::Data],
) -> Vec<Option<Arc<TextureImage>>> {
    if document.images().len() == 0 {
        return Vec::new();
    }
    match gltf::import_images(document, None, buffers) {
        Ok(images) => images
            .iter()
            .map(|image| to_rgba8(image).map(Arc::new))
            .collect(),
        Err(e) => {
            log::warn!("Failed to decode model textures: {e}");
            Vec::new()
        }
    }
}

fn to_rgba8(image: &gltf::image::Data) -> Option<TextureImage> {
    use gltf::image::Format;

    let pixels: Vec<u8> = match image.format {
        Format::R8G8B8A8 => image.pixels.clone(),
        Format::R8G8B8 => image
            .pixels
            .chunks_exact(3)
            .flat_map(|p| [p[0], p[1], p[2], 255])
            .collect(),
        Format::R8G8 => image
            .pixels
            .chunks_exact(2)
            .flat_map(|p| [p[0], p[0], p[0], p[1]])
            .collect(),
        Format::R8 => image.pixels.iter().flat_map(|&l| [l, l, l, 255]).collect(),
        other => {
            log::warn!("Unsupported texture format {:?}; drawing untextured", other);
            return None;
        }
    };

    if pixels.len() != (image.width as usize) * (image.height as usize) * 4 {
        log::warn!("Texture data does not match its {}x{} size", image.width, image.height);
        return None;
    }
    Some(TextureImage {
        width: image.width,
        height: image.height,
        pixels,
    })
}

fn process_mesh(
    mesh: &gltf::Mesh,
    buffers: &[gltf::buffer::Data],
    textures: &[Option<Arc<TextureImage>>],
    transform: &Mat4,
    primitives: &mut Vec<ModelPrimitive>,
) {
    let normal_matrix = Mat3::from_mat4(*transform).inverse().transpose();

    for primitive in mesh.primitives() {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            log::debug!(
                "Skipping {:?} primitive in mesh {:?}",
                primitive.mode(),
                mesh.name()
            );
            continue;
        }

        let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| &data.0[..]));

        let Some(positions) = reader.read_positions() else {
            log::warn!("Primitive in mesh {:?} has no positions", mesh.name());
            continue;
        };
        let positions: Vec<Vec3> = positions
            .map(|p| transform.transform_point3(Vec3::from_array(p)))
            .collect();
        if positions.is_empty() {
            continue;
        }

        let indices: Vec<u32> = match reader.read_indices() {
            Some(indices) => indices.into_u32().collect(),
            None => (0..positions.len() as u32).collect(),
        };
        if indices.iter().any(|&i| i as usize >= positions.len()) {
            log::warn!("Primitive in mesh {:?} has out-of-range indices", mesh.name());
            continue;
        }

        let normals: Vec<Vec3> = match reader.read_normals() {
            Some(normals) => normals
                .map(|n| (normal_matrix * Vec3::from_array(n)).normalize_or_zero())
                .collect(),
            None => compute_vertex_normals(&positions, &indices),
        };

        let pbr = primitive.material().pbr_metallic_roughness();
        let base_texture = pbr.base_color_texture();
        let uvs: Vec<[f32; 2]> = base_texture
            .as_ref()
            .and_then(|info| reader.read_tex_coords(info.tex_coord()))
            .map(|uvs| uvs.into_f32().collect())
            .unwrap_or_default();
        let colors: Vec<[f32; 4]> = reader
            .read_colors(0)
            .map(|colors| colors.into_rgba_f32().collect())
            .unwrap_or_default();

        // A texture without coordinates would sample one texel everywhere.
        let texture = base_texture
            .filter(|_| uvs.len() == positions.len())
            .and_then(|info| textures.get(info.texture().source().index()).cloned().flatten());

        let vertices = positions
            .iter()
            .enumerate()
            .map(|(i, &p)| {
                let normal = normals.get(i).copied().unwrap_or(Vec3::Y);
                let mut vertex = Vertex::new(p, normal);
                if let Some(&uv) = uvs.get(i) {
                    vertex = vertex.with_uv(uv);
                }
                if let Some(&color) = colors.get(i) {
                    vertex = vertex.with_color(color);
                }
                vertex
            })
            .collect();

        primitives.push(ModelPrimitive {
            vertices,
            indices,
            color: pbr.base_color_factor(),
            texture,
        });
    }
}

/// Area-weighted smooth normals for meshes exported without them.
pub fn compute_vertex_normals(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];
    for triangle in indices.chunks_exact(3) {
        let [a, b, c] = [triangle[0], triangle[1], triangle[2]].map(|i| i as usize);
        let face = (positions[b] - positions[a]).cross(positions[c] - positions[a]);
        normals[a] += face;
        normals[b] += face;
        normals[c] += face;
    }
    normals.into_iter().map(|n| n.normalize_or_zero()).collect()
}
