//! End-to-end job tests: local HTTP server, synthetic NetCDF scenes and
//! rendered figures.

use std::fs;

use fetcher::{FetchConfig, Fetcher};
use goes_pipeline::{run_job, PipelineJob};
use map_renderer::{Renderer, RendererConfig, TextRenderer};
use test_utils::{grid, temp_test_dir_with_prefix, write_scene_fixture, FileServer};

// ============================================================================
// Helper functions
// ============================================================================

const SCENE: &str = "OR_ABI-L2-CMIPF-M6C13_G19_s20251231200205_e20251231209513_c20251231209581.nc";

fn renderer() -> Renderer {
    Renderer::new(RendererConfig::default())
        .unwrap()
        .with_text_renderer(TextRenderer::fallback())
}

fn job_yaml(base_url: &str, files: &[&str], out_dir: &str, output_dir: &str) -> String {
    let files = files
        .iter()
        .map(|f| format!("    - \"{}\"", f))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "fetch:\n  base_url: \"{base_url}\"\n  files:\n{files}\n  out_dir: \"{out_dir}\"\n\
         render:\n  output_dir: \"{output_dir}\"\n  extent: [-85.0, -75.0, -5.0, 5.0]\n"
    )
}

// ============================================================================
// Jobs
// ============================================================================

#[test]
fn test_job_fetches_and_renders_scene() {
    let served = tempfile::tempdir().unwrap();
    let work = temp_test_dir_with_prefix("goes_pipeline_");
    write_scene_fixture(&served.path().join(SCENE), &grid::ECUADOR_HALF_DEGREE).unwrap();
    let server = FileServer::start(served.path()).unwrap();

    let raw = work.path().join("raw");
    let figures = work.path().join("figures");
    let yaml = job_yaml(
        &server.base_url(),
        &[SCENE],
        raw.to_str().unwrap(),
        figures.to_str().unwrap(),
    );
    let job = PipelineJob::from_yaml(&yaml).unwrap();
    let fetcher = Fetcher::new(FetchConfig::default()).unwrap();

    let summary = run_job(&job, &fetcher, &renderer()).unwrap();
    assert!(summary.is_success());
    assert_eq!(summary.rendered(), 1);

    let figure = figures.join(SCENE.replace(".nc", ".png"));
    assert!(figure.is_file());
    let decoded = image::open(&figure).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (1200, 900));

    // A second run reuses the local copy
    let hits = server.hits();
    let again = run_job(&job, &fetcher, &renderer()).unwrap();
    assert!(again.is_success());
    assert_eq!(server.hits(), hits);
}

#[test]
fn test_job_continues_after_failures() {
    let served = tempfile::tempdir().unwrap();
    let work = temp_test_dir_with_prefix("goes_pipeline_");
    write_scene_fixture(&served.path().join("good.nc"), &grid::ECUADOR_HALF_DEGREE).unwrap();
    fs::write(served.path().join("broken.nc"), b"not a netcdf file").unwrap();
    let server = FileServer::start(served.path()).unwrap();

    let figures = work.path().join("figures");
    let yaml = job_yaml(
        &server.base_url(),
        &["broken.nc", "missing.nc", "good.nc"],
        work.path().join("raw").to_str().unwrap(),
        figures.to_str().unwrap(),
    );
    let job = PipelineJob::from_yaml(&yaml).unwrap();
    let fetcher = Fetcher::new(FetchConfig::default()).unwrap();

    let summary = run_job(&job, &fetcher, &renderer()).unwrap();
    assert_eq!(summary.fetch_failures.len(), 1);
    assert!(summary.fetch_failures[0].ends_with("missing.nc"));
    assert_eq!(summary.scenes.len(), 2);
    assert_eq!(summary.rendered(), 1);
    assert_eq!(summary.failed(), 2);
    assert!(figures.join("good.png").is_file());
    assert!(!figures.join("broken.png").exists());
}
