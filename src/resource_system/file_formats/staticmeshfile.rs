//! `.static_mesh` binary asset.
//!
//! Layout, all little-endian with no padding between records:
//! header, vertices, triangles, materials, then per texture a `u32` byte
//! length followed by the texture file's raw bytes.

use std::mem::size_of;
use std::path::Path;

use bytemuck::{Pod, Zeroable};

use crate::bake::{BakedScene, ExportOptions, Material, Shading};
use crate::error::{ExportError, Result};

pub const EXTENSION: &str = "static_mesh";
pub const VERSION: f32 = 1.0;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Header {
    pub version: f32,
    pub vertex_count: u32,
    pub triangle_count: u32,
    pub material_count: u32,
    pub texture_count: u32,
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
    pub normal: [f32; 3],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Triangle {
    pub indices: [u32; 3],
    /// -1 when unset
    pub material_index: i32,
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct MaterialRecord {
    pub emissive: [f32; 3],
    pub ambient: [f32; 3],
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
    pub reflection: [f32; 3],
    pub specular_power: f32,
    pub reflection_factor: f32,
    pub transparency: f32,
    pub shininess: f32,
    /// diffuse, emissive, gloss, normal, specular; -1 when empty
    pub texture_indices: [i32; 5],
}

impl MaterialRecord {
    fn from_material(material: &Material) -> Self {
        let mut record = MaterialRecord {
            emissive: material.emissive,
            ambient: material.ambient,
            diffuse: material.diffuse,
            transparency: material.transparency,
            texture_indices: material.texture_indices,
            ..MaterialRecord::zeroed()
        };
        if let Shading::Phong {
            specular,
            specular_power,
            shininess,
            reflection,
            reflection_factor,
        } = material.shading
        {
            record.specular = specular;
            record.specular_power = specular_power;
            record.shininess = shininess;
            record.reflection = reflection;
            record.reflection_factor = reflection_factor;
        }
        record
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StaticMesh {
    pub header: Header,
    pub vertices: Vec<Vertex>,
    pub triangles: Vec<Triangle>,
    pub materials: Vec<MaterialRecord>,
    pub textures: Vec<Vec<u8>>,
}

impl StaticMesh {
    /// Converts a baked scene, reading every referenced texture file. Data is
    /// stored in scene space; no handedness conversion is applied.
    pub fn from_baked<N>(scene: &BakedScene<N>, options: &ExportOptions) -> Result<Self> {
        let vertices: Vec<Vertex> = scene
            .vertices
            .iter()
            .map(|v| Vertex {
                position: v.position,
                uv: v.uv,
                normal: v.normal,
            })
            .collect();
        let triangles: Vec<Triangle> = scene
            .triangles
            .iter()
            .map(|t| Triangle {
                indices: t.indices,
                material_index: t.material_index.map_or(-1, |i| i as i32),
            })
            .collect();
        let materials: Vec<MaterialRecord> = scene.materials.iter().map(MaterialRecord::from_material).collect();

        let mut textures = Vec::with_capacity(scene.textures.len());
        for texture in &scene.textures {
            let path = options.resolve_texture_path(&texture.path);
            let bytes = std::fs::read(&path).map_err(|source| ExportError::TextureRead { path, source })?;
            log::debug!("embedding texture '{}' ({} bytes)", texture.path, bytes.len());
            textures.push(bytes);
        }

        Ok(Self {
            header: Header {
                version: VERSION,
                vertex_count: vertices.len() as u32,
                triangle_count: triangles.len() as u32,
                material_count: materials.len() as u32,
                texture_count: textures.len() as u32,
            },
            vertices,
            triangles,
            materials,
            textures,
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let texture_bytes: usize = self.textures.iter().map(|t| size_of::<u32>() + t.len()).sum();
        let mut bytes = Vec::with_capacity(
            size_of::<Header>()
                + self.vertices.len() * size_of::<Vertex>()
                + self.triangles.len() * size_of::<Triangle>()
                + self.materials.len() * size_of::<MaterialRecord>()
                + texture_bytes,
        );
        bytes.extend_from_slice(bytemuck::bytes_of(&self.header));
        bytes.extend_from_slice(bytemuck::cast_slice(&self.vertices));
        bytes.extend_from_slice(bytemuck::cast_slice(&self.triangles));
        bytes.extend_from_slice(bytemuck::cast_slice(&self.materials));
        for texture in &self.textures {
            bytes.extend_from_slice(&(texture.len() as u32).to_le_bytes());
            bytes.extend_from_slice(texture);
        }
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut reader = ByteReader { bytes, offset: 0 };
        let header = bytemuck::pod_read_unaligned::<Header>(reader.take(size_of::<Header>(), "header")?);
        if header.version != VERSION {
            return Err(ExportError::MalformedAsset(format!(
                "unsupported version {}",
                header.version
            )));
        }
        let vertices = reader.read_records(header.vertex_count as usize, "vertices")?;
        let triangles = reader.read_records(header.triangle_count as usize, "triangles")?;
        let materials = reader.read_records(header.material_count as usize, "materials")?;

        // the count is untrusted until each length prefix has been read
        let mut textures = Vec::new();
        for _ in 0..header.texture_count {
            let len = u32::from_le_bytes(reader.take(4, "texture length")?.try_into().map_err(|_| {
                ExportError::MalformedAsset("texture length".to_string())
            })?);
            textures.push(reader.take(len as usize, "texture data")?.to_vec());
        }
        if reader.offset != bytes.len() {
            return Err(ExportError::MalformedAsset(format!(
                "{} trailing bytes",
                bytes.len() - reader.offset
            )));
        }

        Ok(Self {
            header,
            vertices,
            triangles,
            materials,
            textures,
        })
    }

    /// The whole file is assembled before anything touches the disk.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_bytes())?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        Self::from_bytes(&std::fs::read(path)?)
    }
}

struct ByteReader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> ByteReader<'a> {
    fn take(&mut self, len: usize, what: &str) -> Result<&'a [u8]> {
        let end = self
            .offset
            .checked_add(len)
            .filter(|&end| end <= self.bytes.len())
            .ok_or_else(|| {
                ExportError::MalformedAsset(format!(
                    "truncated {what}: need {len} bytes at offset {}, have {}",
                    self.offset,
                    self.bytes.len() - self.offset
                ))
            })?;
        let slice = &self.bytes[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    fn read_records<T: Pod>(&mut self, count: usize, what: &str) -> Result<Vec<T>> {
        let len = count
            .checked_mul(size_of::<T>())
            .ok_or_else(|| ExportError::MalformedAsset(format!("{what} count overflows")))?;
        Ok(self
            .take(len, what)?
            .chunks_exact(size_of::<T>())
            .map(bytemuck::pod_read_unaligned)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bake::{bake_scene, test_scenes};
    use std::path::PathBuf;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("mesh-baker-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn record_sizes() {
        assert_eq!(size_of::<Header>(), 20);
        assert_eq!(size_of::<Vertex>(), 32);
        assert_eq!(size_of::<Triangle>(), 16);
        assert_eq!(size_of::<MaterialRecord>(), 96);
    }

    #[test]
    fn bytes_round_trip() {
        let dir = temp_dir("round-trip");
        std::fs::write(dir.join("wall.png"), b"not really a png").unwrap();
        let baked = bake_scene(&test_scenes::skinned_quad()).unwrap();
        let options = ExportOptions {
            texture_root: Some(dir.clone()),
        };

        let mesh = StaticMesh::from_baked(&baked, &options).unwrap();
        let bytes = mesh.to_bytes();
        let decoded = StaticMesh::from_bytes(&bytes).unwrap();

        assert_eq!(decoded, mesh);
        assert_eq!(decoded.to_bytes(), bytes);
        assert_eq!(bytes.len(), 20 + 4 * 32 + 2 * 16 + 2 * 96 + 4 + 16);
        assert_eq!(decoded.header.texture_count, 1);
        assert_eq!(decoded.textures[0], b"not really a png");
        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn records_follow_baked_data() {
        let dir = temp_dir("records");
        std::fs::write(dir.join("wall.png"), [1u8, 2, 3]).unwrap();
        let baked = bake_scene(&test_scenes::skinned_quad()).unwrap();
        let mesh = StaticMesh::from_baked(&baked, &ExportOptions { texture_root: Some(dir.clone()) }).unwrap();

        // binary keeps scene space and raw uvs
        assert_eq!(mesh.vertices[2].position, [1.0, 1.0, 0.0]);
        assert_eq!(mesh.vertices[2].uv, [1.0, 1.0]);
        assert_eq!(mesh.vertices[2].normal, [0.0, 0.0, 1.0]);
        assert_eq!(mesh.triangles[0], Triangle { indices: [0, 2, 3], material_index: 0 });

        let phong = &mesh.materials[0];
        assert_eq!(phong.texture_indices, [0, -1, -1, -1, -1]);
        assert_eq!(phong.shininess, 20.0);
        assert_eq!(phong.specular, [0.2; 3]);
        let lambert = &mesh.materials[1];
        assert_eq!(lambert.specular, [0.0; 3]);
        assert_eq!(lambert.shininess, 0.0);
        assert_eq!(lambert.diffuse, [0.8; 3]);
        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn missing_texture_fails_without_writing() {
        let dir = temp_dir("missing-texture");
        let baked = bake_scene(&test_scenes::skinned_quad()).unwrap();
        let options = ExportOptions {
            texture_root: Some(dir.clone()),
        };
        match StaticMesh::from_baked(&baked, &options) {
            Err(ExportError::TextureRead { path, .. }) => assert_eq!(path, dir.join("wall.png")),
            other => panic!("expected TextureRead, got {other:?}"),
        }
        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn malformed_blobs_are_rejected() {
        let mesh = StaticMesh {
            header: Header {
                version: VERSION,
                vertex_count: 1,
                triangle_count: 0,
                material_count: 0,
                texture_count: 1,
            },
            vertices: vec![Vertex::zeroed()],
            triangles: vec![],
            materials: vec![],
            textures: vec![vec![7; 5]],
        };
        let bytes = mesh.to_bytes();
        assert_eq!(StaticMesh::from_bytes(&bytes).unwrap(), mesh);

        for cut in [0, 10, 20, 40, 55] {
            assert!(matches!(
                StaticMesh::from_bytes(&bytes[..cut]),
                Err(ExportError::MalformedAsset(_))
            ));
        }
        let mut trailing = bytes.clone();
        trailing.push(0);
        assert!(matches!(StaticMesh::from_bytes(&trailing), Err(ExportError::MalformedAsset(_))));

        let mut wrong_version = bytes;
        wrong_version[..4].copy_from_slice(&2.0f32.to_le_bytes());
        assert!(matches!(StaticMesh::from_bytes(&wrong_version), Err(ExportError::MalformedAsset(_))));

        let huge_texture_count = Header {
            version: VERSION,
            vertex_count: 0,
            triangle_count: 0,
            material_count: 0,
            texture_count: u32::MAX,
        };
        assert!(matches!(
            StaticMesh::from_bytes(bytemuck::bytes_of(&huge_texture_count)),
            Err(ExportError::MalformedAsset(_))
        ));
    }
}
