//! Model loading, beyond the load-by-filename contract:
//! this reads the first mesh primitive of a glTF file into a [`crate::mesh::Mesh`]
//! and hands back an opaque handle. Materials, skinning, and scene graphs are not
//! interpreted; external tooling that needs them is expected to sit above this.

use std::path::Path;

use anyhow::{anyhow, Context, Result};

use crate::mesh::Mesh;
use crate::vertex::Vertex;

/// Read vertex positions/normals/UVs and indices out of the first primitive of the
/// first mesh in `path`, uploading them as a GPU mesh.
pub fn load_first_primitive(device: &wgpu::Device, path: &Path) -> Result<Mesh> {
    let (document, buffers, _images) = gltf::import(path).with_context(|| format!("loading model {path:?}"))?;

    let mesh = document.meshes().next().ok_or_else(|| anyhow!("{path:?} contains no meshes"))?;
    let primitive = mesh
        .primitives()
        .next()
        .ok_or_else(|| anyhow!("{path:?}'s first mesh has no primitives"))?;

    let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));
    let positions: Vec<[f32; 3]> = reader
        .read_positions()
        .ok_or_else(|| anyhow!("{path:?} primitive has no POSITION attribute"))?
        .collect();
    let normals: Vec<[f32; 3]> = reader
        .read_normals()
        .map(|iter| iter.collect())
        .unwrap_or_else(|| vec![[0.0, 1.0, 0.0]; positions.len()]);
    let uvs: Vec<[f32; 2]> = reader
        .read_tex_coords(0)
        .map(|iter| iter.into_f32().collect())
        .unwrap_or_else(|| vec![[0.0, 0.0]; positions.len()]);
    let indices: Vec<u32> = reader
        .read_indices()
        .ok_or_else(|| anyhow!("{path:?} primitive has no indices"))?
        .into_u32()
        .collect();

    let vertices: Vec<Vertex> = positions
        .iter()
        .zip(normals.iter())
        .zip(uvs.iter())
        .map(|((p, n), uv)| Vertex::new(*p, *n, *uv))
        .collect();

    Ok(Mesh::new(device, &vertices, &indices))
}
