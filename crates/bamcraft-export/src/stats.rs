//! Aggregate export statistics

use serde::Serialize;

/// Running counters of one export session
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ExportStats {
    /// Objects processed, including instanced and LOD-level objects
    pub objects: u64,
    /// Draw primitives emitted
    pub geoms: u64,
    /// Output vertices emitted after welding
    pub vertices: u64,
    /// Triangles emitted
    pub triangles: u64,
    /// Corners that could not reuse a welded vertex because their texture
    /// coordinates diverged
    pub duplicated_vertices: u64,
    /// Distinct materials resolved
    pub materials: u64,
    /// Distinct texture stages resolved
    pub texture_stages: u64,
    /// Distinct images materialized
    pub images: u64,
}

impl std::fmt::Display for ExportStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Exported {} vertices and {} triangles",
            self.vertices, self.triangles
        )?;
        writeln!(
            f,
            "Exported {} objects and {} geoms",
            self.objects, self.geoms
        )?;
        if self.duplicated_vertices > 0 {
            writeln!(
                f,
                "Had to duplicate {} vertices due to different texture coordinates",
                self.duplicated_vertices
            )?;
        }
        write!(
            f,
            "Exported {} materials and {} texture stages, using {} images",
            self.materials, self.texture_stages, self.images
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_mentions_duplicates_only_when_present() {
        let mut stats = ExportStats::default();
        assert!(!stats.to_string().contains("duplicate"));

        stats.duplicated_vertices = 3;
        assert!(stats.to_string().contains("duplicate 3 vertices"));
    }
}
