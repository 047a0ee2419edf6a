use crate::error::{ExportError, Result};
use crate::scene::{SurfaceClass, SurfaceMaterial, TextureSource};

/// Texture slots a material can reference, in serialization order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureChannel {
    Diffuse,
    Emissive,
    Gloss,
    Normal,
    Specular,
}

impl TextureChannel {
    pub const ALL: [TextureChannel; 5] = [
        TextureChannel::Diffuse,
        TextureChannel::Emissive,
        TextureChannel::Gloss,
        TextureChannel::Normal,
        TextureChannel::Specular,
    ];

    pub fn from_property(property: &str) -> Option<Self> {
        match property {
            "DiffuseColor" => Some(TextureChannel::Diffuse),
            "EmissiveColor" => Some(TextureChannel::Emissive),
            "ShininessExponent" => Some(TextureChannel::Gloss),
            "NormalMap" | "Bump" => Some(TextureChannel::Normal),
            "SpecularColor" => Some(TextureChannel::Specular),
            _ => None,
        }
    }

    pub fn slot(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    pub id: u32,
    pub channel: TextureChannel,
    pub path: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shading {
    Lambert,
    Phong {
        specular: [f32; 3],
        specular_power: f32,
        shininess: f32,
        reflection: [f32; 3],
        reflection_factor: f32,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub ambient: [f32; 3],
    pub diffuse: [f32; 3],
    pub emissive: [f32; 3],
    pub transparency: f32,
    pub shading: Shading,
    /// Source file per channel, indexed by [`TextureChannel::slot`].
    pub texture_paths: [Option<String>; 5],
    /// Texture table id per channel, -1 when the channel is empty.
    pub texture_indices: [i32; 5],
}

impl Material {
    pub fn texture_path(&self, channel: TextureChannel) -> Option<&str> {
        self.texture_paths[channel.slot()].as_deref()
    }
}

fn rgb(c: [f64; 3]) -> [f32; 3] {
    c.map(|v| v as f32)
}

fn resolve_material(surface: &SurfaceMaterial) -> Result<Material> {
    let shading = match surface.class {
        SurfaceClass::Lambert => Shading::Lambert,
        SurfaceClass::Phong => Shading::Phong {
            specular: rgb(surface.specular),
            specular_power: surface.specular_factor as f32,
            shininess: surface.shininess as f32,
            reflection: rgb(surface.reflection),
            reflection_factor: surface.reflection_factor as f32,
        },
    };

    let mut texture_paths: [Option<String>; 5] = Default::default();
    for binding in &surface.textures {
        let path = match &binding.source {
            TextureSource::Layered { .. } => {
                return Err(ExportError::UnsupportedTextureLayering {
                    material: surface.name.clone(),
                    channel: binding.channel.clone(),
                })
            }
            TextureSource::File { path } => path,
        };
        let Some(channel) = TextureChannel::from_property(&binding.channel) else {
            log::debug!(
                "material '{}': ignoring texture on property '{}'",
                surface.name,
                binding.channel
            );
            continue;
        };
        let slot = &mut texture_paths[channel.slot()];
        if slot.is_none() {
            *slot = Some(path.clone());
        }
    }

    Ok(Material {
        name: surface.name.clone(),
        ambient: rgb(surface.ambient),
        diffuse: rgb(surface.diffuse),
        emissive: rgb(surface.emissive),
        transparency: surface.transparency_factor as f32,
        shading,
        texture_paths,
        texture_indices: [-1; 5],
    })
}

pub fn resolve_materials(surfaces: &[SurfaceMaterial]) -> Result<Vec<Material>> {
    surfaces.iter().map(resolve_material).collect()
}

/// Adds every (channel, path) the materials reference to `textures`, unless
/// already present, and points each material's channel at the table id.
pub fn assign_texture_indices(materials: &mut [Material], textures: &mut Vec<Texture>) {
    for material in materials.iter_mut() {
        for channel in TextureChannel::ALL {
            let Some(path) = &material.texture_paths[channel.slot()] else {
                continue;
            };
            let id = match textures
                .iter()
                .find(|texture| texture.channel == channel && texture.path == *path)
            {
                Some(texture) => texture.id,
                None => {
                    let id = textures.len() as u32;
                    textures.push(Texture {
                        id,
                        channel,
                        path: path.clone(),
                    });
                    id
                }
            };
            material.texture_indices[channel.slot()] = id as i32;
        }
    }
}
