//! Integration tests for the image-to-mesh pipeline.
//!
//! These tests run the full pipeline with a recording engine (to check what
//! reaches the engine and what comes back) and with the lattice engine (to
//! check the meshes end to end).

use std::fmt;

use cleaver_rs::*;

/// Engine that records its calls and returns a fixed soup.
#[derive(Debug, Default)]
struct RecordingEngine {
    calls: usize,
    materials_seen: usize,
    config_seen: Option<EngineConfig>,
    soup: TetSoup,
}

impl CleavingEngine for RecordingEngine {
    fn name(&self) -> &str {
        "recording"
    }

    fn cleave(&mut self, volume: &mut Volume, config: &EngineConfig) -> std::result::Result<TetSoup, EngineError> {
        self.calls += 1;
        self.materials_seen = volume.num_materials();
        self.config_seen = Some(*config);
        Ok(self.soup.clone())
    }
}

#[derive(Debug)]
struct OutOfMemory;

impl fmt::Display for OutOfMemory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("engine ran out of memory")
    }
}

impl std::error::Error for OutOfMemory {}

struct FailingEngine;

impl CleavingEngine for FailingEngine {
    fn name(&self) -> &str {
        "failing"
    }

    fn cleave(&mut self, _volume: &mut Volume, _config: &EngineConfig) -> std::result::Result<TetSoup, EngineError> {
        Err(Box::new(OutOfMemory))
    }
}

/// Label image with label 0 for `x < split` and label 1 elsewhere.
fn two_label_image(n: u32, split: u32) -> Image3<u8> {
    Image3::from_fn(UVec3::splat(n), DVec3::ONE, |i, _, _| u8::from(i >= split)).unwrap()
}

/// Two tets sharing face (1, 2, 3), with materials 0 and 1.
fn two_tet_soup() -> TetSoup {
    TetSoup {
        vertices: vec![DVec3::ZERO, DVec3::X, DVec3::Y, DVec3::Z, DVec3::ONE],
        tets: vec![
            RawTet {
                verts: [0, 1, 2, 3],
                material: 0,
            },
            RawTet {
                verts: [4, 3, 2, 1],
                material: 1,
            },
        ],
        faces: vec![
            RawFace {
                tets: [Some(0), None],
                verts: [0, 1, 2],
            },
            RawFace {
                tets: [Some(0), Some(1)],
                verts: [1, 2, 3],
            },
        ],
    }
}

#[test]
fn test_engine_receives_fields_and_config() {
    let engine = RecordingEngine {
        soup: two_tet_soup(),
        ..RecordingEngine::default()
    };
    let mut filter = CleaverImageToMeshFilter::new(engine);
    filter.set_sigma(0.5).set_padding(2).set_lipschitz(0.5).push_input(two_label_image(12, 6));

    let output = filter.generate().unwrap().clone();
    assert_eq!(output.field_names, vec!["SegmentationLabel0", "SegmentationLabel1"]);
    assert_eq!(output.tet_mesh.num_cells(), 2);
    assert_eq!(output.tet_mesh.num_points(), 5);
    assert_eq!(output.triangle_mesh.num_cells(), 1);
    assert_eq!(output.interface_keys, vec![3]);
    assert!(output.warnings.is_empty());

    let engine = filter.engine();
    assert_eq!(engine.calls, 1);
    assert_eq!(engine.materials_seen, 2);
    let config = engine.config_seen.unwrap();
    assert_eq!(config.padding, 2);
    assert!((config.inverse_lipschitz - 2.0).abs() < 1e-12);
}

#[test]
fn test_fatal_field_stops_before_engine() {
    let uniform = Image3::filled(UVec3::splat(4), DVec3::ONE, 5_u8).unwrap();
    let mut filter = CleaverImageToMeshFilter::new(RecordingEngine::default());
    filter.push_input(uniform);

    match filter.generate() {
        Err(CleaverError::NoZeroCrossing { field, status }) => {
            assert_eq!(field, "SegmentationLabel5");
            assert_eq!(status, FieldStatus::MaxMin);
        }
        other => panic!("expected NoZeroCrossing, got {other:?}"),
    }
    assert_eq!(filter.engine().calls, 0);
    assert!(filter.output().is_none());
}

#[test]
fn test_nan_indicator_is_fatal() {
    let dims = UVec3::splat(8);
    let a = Image3::from_fn(dims, DVec3::ONE, |i, _, _| i as f32 - 3.5).unwrap();
    let b = Image3::from_fn(dims, DVec3::ONE, |i, j, k| if (i, j, k) == (1, 1, 1) { f32::NAN } else { 3.5 - i as f32 }).unwrap();
    let mut filter = CleaverImageToMeshFilter::new(RecordingEngine::default());
    filter.push_input(a).push_input(b);

    let err = filter.generate().unwrap_err();
    assert!(matches!(
        err,
        CleaverError::NoZeroCrossing {
            status: FieldStatus::Nan,
            ..
        }
    ));
    assert_eq!(filter.engine().calls, 0);
}

#[test]
fn test_engine_error_is_passed_through() {
    let mut filter = CleaverImageToMeshFilter::new(FailingEngine);
    filter.set_sigma(0.5).push_input(two_label_image(12, 6));

    let err = filter.generate().unwrap_err();
    assert_eq!(err.to_string(), "engine ran out of memory");
    match err {
        CleaverError::Engine(inner) => assert!(inner.downcast_ref::<OutOfMemory>().is_some()),
        other => panic!("expected engine error, got {other:?}"),
    }
}

#[test]
fn test_dangling_engine_output_is_an_error() {
    let mut soup = two_tet_soup();
    soup.tets[1].verts[0] = 9;
    let engine = RecordingEngine {
        soup,
        ..RecordingEngine::default()
    };
    let mut filter = CleaverImageToMeshFilter::new(engine);
    filter.set_sigma(0.5).push_input(two_label_image(12, 6));

    let err = filter.generate().unwrap_err();
    assert!(matches!(err, CleaverError::InvalidSoup(_)));
    assert!(err.to_string().contains("vertex 9"));
    assert!(filter.output().is_none());
}

#[test]
fn test_huge_label_fails_before_engine() {
    let image = Image3::new(UVec3::new(2, 1, 1), vec![0_u32, u32::MAX]).unwrap();
    let mut filter = CleaverImageToMeshFilter::new(RecordingEngine::default());
    filter.push_input(image);

    assert!(matches!(
        filter.generate(),
        Err(CleaverError::TooManyMaterials { .. })
    ));
    assert_eq!(filter.engine().calls, 0);
}

#[test]
fn test_invalid_options_are_rejected() {
    let mut filter = CleaverImageToMeshFilter::new(RecordingEngine::default());
    filter.set_sampling_rate(0.0).push_input(two_label_image(8, 4));
    assert!(matches!(
        filter.generate(),
        Err(CleaverError::InvalidOption {
            name: "sampling_rate",
            ..
        })
    ));
}

#[test]
fn test_missing_inputs() {
    let mut filter: CleaverImageToMeshFilter<u8, _> = CleaverImageToMeshFilter::new(RecordingEngine::default());
    assert!(matches!(filter.generate(), Err(CleaverError::NoInput)));

    filter.set_input(1, two_label_image(8, 4));
    assert_eq!(filter.num_inputs(), 2);
    assert!(matches!(
        filter.update(),
        Err(CleaverError::InvalidOption { name: "input", .. })
    ));
}

#[test]
fn test_mismatched_indicator_grids() {
    let mut filter = CleaverImageToMeshFilter::new(RecordingEngine::default());
    filter
        .push_input(Image3::filled(UVec3::splat(4), DVec3::ONE, 1.0_f32).unwrap())
        .push_input(Image3::filled(UVec3::new(4, 4, 5), DVec3::ONE, 1.0_f32).unwrap());
    assert!(matches!(
        filter.generate(),
        Err(CleaverError::DimensionMismatch { index: 1, .. })
    ));
}

#[test]
fn test_truncation_warning_is_reported() {
    // sigma 1 on an 8-voxel volume triggers the truncation warning.
    let engine = RecordingEngine {
        soup: two_tet_soup(),
        ..RecordingEngine::default()
    };
    let mut filter = CleaverImageToMeshFilter::new(engine);
    filter.push_input(two_label_image(8, 4));

    let output = filter.generate().unwrap();
    assert_eq!(output.warnings.len(), 1);
    assert_eq!(output.warnings[0].name, "SegmentationLabel1");
    assert_eq!(output.warnings[0].severity, Severity::Warning);
}

#[test]
fn test_lattice_segmentation_end_to_end() {
    let mut filter = CleaverImageToMeshFilter::new(LatticeEngine::new());
    filter
        .set_sigma(0.5)
        .set_sizing_mode(SizingMode::Constant)
        .push_input(two_label_image(12, 6));
    filter.update().unwrap();

    let tets = filter.volume_output().unwrap();
    assert_eq!(tets.num_cells(), 12 * 12 * 12 * 6);
    assert_eq!(tets.num_points(), 13 * 13 * 13);
    assert!(tets.labels().contains(&0) && tets.labels().contains(&1));
    for t in 0..tets.num_cells() {
        assert!(tets.signed_volume(t) > 0.0);
    }

    let triangles = filter.surface_output().unwrap();
    assert!(!triangles.is_empty());
    assert!(triangles.labels().iter().all(|&l| l == 0));
    for p in triangles.points() {
        assert!(p.x >= 5.0 - 1e-9 && p.x <= 6.0 + 1e-9, "interface point {p} off the label boundary");
    }

    let output = filter.output().unwrap();
    assert_eq!(output.interface_keys, vec![3]);
    assert!(output.sizing_field.is_some());
}

#[test]
fn test_lattice_single_indicator_end_to_end() {
    let indicator = Image3::from_fn(UVec3::splat(10), DVec3::ONE, |i, _, _| i as f32 - 4.5).unwrap();
    let mut filter = CleaverImageToMeshFilter::new(LatticeEngine::new());
    filter.set_input_is_indicator_function(true).push_input(indicator);

    let output = filter.generate().unwrap();
    assert_eq!(output.field_names, vec!["SegmentationLabel", "SegmentationLabel-inverse"]);
    // Material 0 is the indicator itself, positive for large x.
    for t in 0..output.tet_mesh.num_cells() {
        let centroid = output.tet_mesh.cell_points(t).iter().sum::<DVec3>() / 4.0;
        if centroid.x > 5.5 {
            assert_eq!(output.tet_mesh.labels()[t], 0);
        } else if centroid.x < 3.5 {
            assert_eq!(output.tet_mesh.labels()[t], 1);
        }
    }
}

#[test]
fn test_boxed_engine_and_json_options() {
    let options = MeshingOptions::from_json_str(r#"{ "sigma": 0.5, "padding": 1 }"#).unwrap();
    let engine: Box<dyn CleavingEngine> = Box::new(LatticeEngine::new());
    let mut filter = CleaverImageToMeshFilter::with_options(engine, options);
    filter.push_input(two_label_image(6, 3));

    let output = filter.generate().unwrap();
    assert_eq!(output.tet_mesh.num_cells(), 8 * 8 * 8 * 6);
}

#[test]
fn test_mesh_images_matches_filter() {
    let image = two_label_image(8, 4);
    let options = MeshingOptions {
        sigma: 0.5,
        ..MeshingOptions::default()
    };
    let direct = mesh_images(&[image.clone()], &options, &mut LatticeEngine::new()).unwrap();

    let mut filter = CleaverImageToMeshFilter::with_options(LatticeEngine::new(), options);
    filter.push_input(image);
    assert_eq!(filter.generate().unwrap(), &direct);
}
