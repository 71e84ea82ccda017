use serde::Deserialize;

use scene::components::TerrainProvider;

/// Terrain chosen by URL; no URL means the bare WGS84 ellipsoid.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TerrainSource {
    pub url: Option<String>,
    pub request_vertex_normals: bool,
}

impl TerrainSource {
    pub fn resolve(&self) -> TerrainProvider {
        match &self.url {
            Some(url) => TerrainProvider::Url {
                url: url.clone(),
                request_vertex_normals: self.request_vertex_normals,
            },
            None => TerrainProvider::Ellipsoid,
        }
    }
}
