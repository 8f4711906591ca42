//! Job execution: fetch every file, then prepare and render each scene.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fetcher::Fetcher;
use goes_common::{Field, GoesFileInfo};
use map_renderer::{RenderOptions, Renderer};
use netcdf_scene::SceneRequest;
use tracing::{error, info, warn};

use crate::config::{PipelineJob, RenderSection, SceneSection};

/// Result of one scene in a job.
#[derive(Debug)]
pub struct SceneOutcome {
    pub source: PathBuf,
    pub result: Result<Option<PathBuf>>,
}

/// What a job run produced.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// URLs that could not be fetched
    pub fetch_failures: Vec<String>,
    pub scenes: Vec<SceneOutcome>,
}

impl RunSummary {
    pub fn rendered(&self) -> usize {
        self.scenes.iter().filter(|s| s.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.fetch_failures.len() + self.scenes.iter().filter(|s| s.result.is_err()).count()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }
}

/// `<output_dir>/<file stem>.png`
pub fn figure_path(output_dir: &Path, source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "figure".to_string());
    output_dir.join(format!("{}.png", stem))
}

/// Title from GOES filename metadata, or `<variable> <filename>` otherwise.
pub fn default_title(source: &Path, variable: &str) -> String {
    let name = source
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    match GoesFileInfo::parse(&name) {
        Ok(info) => format!("{} {}", info.title(), variable),
        Err(_) => format!("{} {}", variable, name),
    }
}

/// Open, select and subset one file.
pub fn prepare(source: &Path, scene: &SceneSection) -> Result<Field> {
    SceneRequest::new(source, &scene.variable, scene.lat_bounds, scene.lon_bounds)
        .with_axis_names(&scene.lat_name, &scene.lon_name)
        .prepare()
        .with_context(|| format!("Failed to prepare {}", source.display()))
}

/// Render options for one scene.
pub fn render_options(
    source: &Path,
    scene: &SceneSection,
    render: &RenderSection,
    save_path: Option<PathBuf>,
) -> Result<RenderOptions> {
    let title = render
        .title
        .clone()
        .unwrap_or_else(|| default_title(source, &scene.variable));
    Ok(RenderOptions {
        extent: render.extent,
        colormap: render.colormap()?,
        title: Some(title),
        flight_track: render.track()?,
        save_path,
        show: render.show,
    })
}

/// Prepare and render one file.
pub fn plot_file(
    renderer: &Renderer,
    source: &Path,
    scene: &SceneSection,
    render: &RenderSection,
    save_path: Option<PathBuf>,
) -> Result<Option<PathBuf>> {
    let field = prepare(source, scene)?;
    if field.is_empty() {
        warn!(path = %source.display(), "Subset window does not overlap the scene");
    }
    let options = render_options(source, scene, render, save_path)?;
    renderer
        .render(&field, &options)
        .with_context(|| format!("Failed to render {}", source.display()))
}

/// Run a whole job.
///
/// Fetch failures and per-scene failures are logged and recorded; the
/// remaining scenes are still processed.
pub fn run_job(job: &PipelineJob, fetcher: &Fetcher, renderer: &Renderer) -> Result<RunSummary> {
    let urls = job.fetch.all_urls()?;
    info!(count = urls.len(), out_dir = %job.fetch.out_dir.display(), "Fetching files");

    let report = fetcher
        .download_many_report(&urls, &job.fetch.out_dir)
        .context("Failed to prepare download directory")?;

    let mut summary = RunSummary {
        fetch_failures: report.failures.iter().map(|f| f.url.clone()).collect(),
        scenes: Vec::with_capacity(report.downloaded.len()),
    };

    for source in report.downloaded {
        let save_path = figure_path(&job.render.output_dir, &source);
        let result = plot_file(renderer, &source, &job.scene, &job.render, Some(save_path));
        if let Err(e) = &result {
            error!(path = %source.display(), error = %format!("{:#}", e), "Scene failed, continuing");
        }
        summary.scenes.push(SceneOutcome { source, result });
    }

    info!(
        rendered = summary.rendered(),
        failed = summary.failed(),
        "Job finished"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOES_NAME: &str =
        "OR_ABI-L2-CMIPF-M6C13_G19_s20251231200205_e20251231209513_c20251231209581.nc";

    #[test]
    fn test_figure_path_uses_stem() {
        assert_eq!(
            figure_path(Path::new("figures"), Path::new("data/raw/scene.nc")),
            PathBuf::from("figures/scene.png")
        );
    }

    #[test]
    fn test_default_title_from_goes_name() {
        let title = default_title(&Path::new("data").join(GOES_NAME), "CMI");
        assert_eq!(title, "G19 ABI-L2-CMIPF C13 2025-05-03 12:00 UTC CMI");
    }

    #[test]
    fn test_default_title_for_other_names() {
        assert_eq!(default_title(Path::new("scene.nc"), "CMI"), "CMI scene.nc");
    }

    #[test]
    fn test_summary_counts() {
        let summary = RunSummary {
            fetch_failures: vec!["http://x/a.nc".to_string()],
            scenes: vec![
                SceneOutcome {
                    source: PathBuf::from("b.nc"),
                    result: Ok(None),
                },
                SceneOutcome {
                    source: PathBuf::from("c.nc"),
                    result: Err(anyhow::anyhow!("boom")),
                },
            ],
        };
        assert_eq!(summary.rendered(), 1);
        assert_eq!(summary.failed(), 2);
        assert!(!summary.is_success());
    }
}
