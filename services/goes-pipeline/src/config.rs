//! Pipeline job files.
//!
//! A job is one YAML document with `fetch`, `scene` and `render` sections.
//! Only `fetch` needs to say where the data lives; everything else has a
//! default that matches the Ecuador CMI study.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use fetcher::build_url;
use goes_common::{Bounds, FlightTrack, MapExtent, DEFAULT_LAT_NAME, DEFAULT_LON_NAME};
use map_renderer::Colormap;
use serde::Deserialize;
use tracing::debug;

/// Root of a pipeline job file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineJob {
    pub fetch: FetchSection,
    #[serde(default)]
    pub scene: SceneSection,
    #[serde(default)]
    pub render: RenderSection,
}

/// Which files to fetch and where to put them.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FetchSection {
    /// Joined with each of `files`
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub files: Vec<String>,
    /// Complete URLs, fetched after the `base_url` files
    #[serde(default)]
    pub urls: Vec<String>,
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,
}

fn default_out_dir() -> PathBuf {
    PathBuf::from("data/raw")
}

impl FetchSection {
    /// Every URL this section names, in order.
    pub fn all_urls(&self) -> Result<Vec<String>> {
        let mut urls = Vec::with_capacity(self.files.len() + self.urls.len());
        if !self.files.is_empty() {
            let Some(base) = &self.base_url else {
                bail!("fetch.files needs fetch.base_url");
            };
            urls.extend(self.files.iter().map(|f| build_url(base, f)));
        }
        urls.extend(self.urls.iter().cloned());
        Ok(urls)
    }
}

/// Variable and window to cut from each scene.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneSection {
    #[serde(default = "default_variable")]
    pub variable: String,
    #[serde(default = "default_lat_bounds")]
    pub lat_bounds: Bounds,
    #[serde(default = "default_lon_bounds")]
    pub lon_bounds: Bounds,
    #[serde(default = "default_lat_name")]
    pub lat_name: String,
    #[serde(default = "default_lon_name")]
    pub lon_name: String,
}

impl Default for SceneSection {
    fn default() -> Self {
        Self {
            variable: default_variable(),
            lat_bounds: default_lat_bounds(),
            lon_bounds: default_lon_bounds(),
            lat_name: default_lat_name(),
            lon_name: default_lon_name(),
        }
    }
}

fn default_variable() -> String {
    "CMI".to_string()
}

fn default_lat_bounds() -> Bounds {
    Bounds::new(-5.0, 5.0)
}

fn default_lon_bounds() -> Bounds {
    Bounds::new(-85.0, -75.0)
}

fn default_lat_name() -> String {
    DEFAULT_LAT_NAME.to_string()
}

fn default_lon_name() -> String {
    DEFAULT_LON_NAME.to_string()
}

/// How to draw each prepared scene.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenderSection {
    #[serde(default = "default_colormap")]
    pub colormap: String,
    /// Fixed title; derived from the filename when absent
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub extent: Option<MapExtent>,
    #[serde(default)]
    pub flight_track: Option<FlightTrack>,
    /// GeoJSON track, used when `flight_track` is absent
    #[serde(default)]
    pub flight_track_file: Option<PathBuf>,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default)]
    pub show: bool,
}

impl Default for RenderSection {
    fn default() -> Self {
        Self {
            colormap: default_colormap(),
            title: None,
            extent: None,
            flight_track: None,
            flight_track_file: None,
            output_dir: default_output_dir(),
            show: false,
        }
    }
}

fn default_colormap() -> String {
    "turbo".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("figures")
}

impl RenderSection {
    pub fn colormap(&self) -> Result<Colormap> {
        self.colormap
            .parse()
            .with_context(|| format!("Invalid render.colormap '{}'", self.colormap))
    }

    /// The inline track, or the one in `flight_track_file`.
    pub fn track(&self) -> Result<Option<FlightTrack>> {
        if let Some(track) = &self.flight_track {
            return Ok(Some(track.clone()));
        }
        match &self.flight_track_file {
            Some(path) => {
                let track = map_renderer::load_track(path)
                    .with_context(|| format!("Failed to load flight track {}", path.display()))?;
                Ok(Some(track))
            }
            None => Ok(None),
        }
    }
}

impl PipelineJob {
    /// Parse a job from YAML text.
    pub fn from_yaml(text: &str) -> Result<Self> {
        let job: Self = serde_yaml::from_str(text).context("Failed to parse pipeline job")?;
        job.validate()?;
        Ok(job)
    }

    /// Read and parse a job file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read job file {}", path.display()))?;
        let job = Self::from_yaml(&text).with_context(|| format!("In job file {}", path.display()))?;
        debug!(path = %path.display(), "Loaded pipeline job");
        Ok(job)
    }

    fn validate(&self) -> Result<()> {
        if self.fetch.all_urls()?.is_empty() {
            bail!("fetch section names no files or urls");
        }
        self.render.colormap()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JOB: &str = r#"
fetch:
  base_url: https://noaa-goes19.s3.amazonaws.com/ABI-L2-CMIPF/2025/123/12/
  files:
    - OR_ABI-L2-CMIPF-M6C13_G19_s20251231200205_e20251231209513_c20251231209581.nc
  urls:
    - https://example.com/other.nc
  out_dir: data/raw
scene:
  variable: CMI
  lat_bounds: [-5.0, 5.0]
  lon_bounds: [-85.0, -75.0]
render:
  colormap: viridis_r
  extent: [-85.0, -75.0, -5.0, 5.0]
  flight_track:
    lons: [-80.0, -79.0]
    lats: [-1.0, 0.0]
"#;

    #[test]
    fn test_parse_full_job() {
        let job = PipelineJob::from_yaml(JOB).unwrap();
        let urls = job.fetch.all_urls().unwrap();
        assert_eq!(urls.len(), 2);
        assert_eq!(
            urls[0],
            "https://noaa-goes19.s3.amazonaws.com/ABI-L2-CMIPF/2025/123/12/OR_ABI-L2-CMIPF-M6C13_G19_s20251231200205_e20251231209513_c20251231209581.nc"
        );
        assert_eq!(urls[1], "https://example.com/other.nc");
        assert_eq!(job.scene.lat_bounds, Bounds::new(-5.0, 5.0));
        assert_eq!(job.scene.lat_name, "y");
        assert_eq!(job.render.colormap().unwrap().to_string(), "viridis_r");
        assert_eq!(job.render.track().unwrap().map(|t| t.len()), Some(2));
        assert_eq!(job.render.output_dir, PathBuf::from("figures"));
    }

    #[test]
    fn test_defaults_for_minimal_job() {
        let job = PipelineJob::from_yaml("fetch:\n  urls: [https://example.com/a.nc]\n").unwrap();
        assert_eq!(job.scene.variable, "CMI");
        assert_eq!(job.scene.lon_bounds, Bounds::new(-85.0, -75.0));
        assert_eq!(job.fetch.out_dir, PathBuf::from("data/raw"));
        assert!(job.render.extent.is_none());
        assert!(!job.render.show);
    }

    #[test]
    fn test_files_without_base_url_rejected() {
        assert!(PipelineJob::from_yaml("fetch:\n  files: [a.nc]\n").is_err());
    }

    #[test]
    fn test_empty_fetch_rejected() {
        assert!(PipelineJob::from_yaml("fetch: {}\n").is_err());
    }

    #[test]
    fn test_unequal_track_rejected() {
        let yaml = "fetch:\n  urls: [u/a.nc]\nrender:\n  flight_track: {lons: [1.0], lats: []}\n";
        assert!(PipelineJob::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_bad_colormap_rejected() {
        let yaml = "fetch:\n  urls: [u/a.nc]\nrender:\n  colormap: plasma\n";
        assert!(PipelineJob::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_bad_extent_rejected() {
        let yaml = "fetch:\n  urls: [u/a.nc]\nrender:\n  extent: [10.0, -10.0, 0.0, 1.0]\n";
        assert!(PipelineJob::from_yaml(yaml).is_err());
    }
}
