//! The image-to-mesh pipeline.
//!
//! [`CleaverImageToMeshFilter`] runs the stages in order: option checks,
//! field construction, field validation, the cleaving engine, and finally
//! volume and interface mesh extraction. A fatal validation finding stops the
//! pipeline before the engine is invoked.

use cleaver_core::{
    CleaverError, CleavingEngine, Image3, MeshingOptions, Result, ScalarField, SizingMode, TetMesh, TriangleMesh,
    Volume,
};
use cleaver_fields::{validate_fields, FieldBuilder, Finding};
use cleaver_mesh::{extract_interface, extract_volume_mesh};

/// The two meshes produced by a pipeline run, with diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct CleaverOutput {
    /// Tetrahedral mesh labeled by material index.
    pub tet_mesh: TetMesh,
    /// Interface triangles labeled by interface key index.
    pub triangle_mesh: TriangleMesh,
    /// Interface keys (`2^a + 2^b`) indexed by triangle label.
    pub interface_keys: Vec<u64>,
    /// Names of the meshed fields, in material order.
    pub field_names: Vec<String>,
    /// Non-fatal validation findings.
    pub warnings: Vec<Finding>,
    /// Sizing field the engine attached to the volume, if any.
    pub sizing_field: Option<ScalarField>,
}

/// A filter with any number of image inputs and two mesh outputs.
pub trait ImageToMeshFilter<T> {
    /// Sets input `index`, growing the input list as needed.
    fn set_input(&mut self, index: usize, image: Image3<T>);

    /// Returns the number of input slots.
    fn num_inputs(&self) -> usize;

    /// Runs the filter on the current inputs.
    fn update(&mut self) -> Result<()>;

    /// Returns the volume output of the last successful update.
    fn volume_output(&self) -> Option<&TetMesh>;

    /// Returns the surface output of the last successful update.
    fn surface_output(&self) -> Option<&TriangleMesh>;
}

/// Meshes label or indicator images with a [`CleavingEngine`].
///
/// One input is treated as a label image unless
/// [`set_input_is_indicator_function`](Self::set_input_is_indicator_function)
/// is set; several inputs are always indicator images.
#[derive(Debug)]
pub struct CleaverImageToMeshFilter<T, E> {
    engine: E,
    options: MeshingOptions,
    inputs: Vec<Option<Image3<T>>>,
    output: Option<CleaverOutput>,
}

impl<T, E> CleaverImageToMeshFilter<T, E>
where
    T: Copy + Into<f64>,
    E: CleavingEngine,
{
    /// Creates a filter with default options.
    pub fn new(engine: E) -> Self {
        Self::with_options(engine, MeshingOptions::default())
    }

    /// Creates a filter with the given options.
    pub fn with_options(engine: E, options: MeshingOptions) -> Self {
        Self {
            engine,
            options,
            inputs: Vec::new(),
            output: None,
        }
    }

    /// Returns the options.
    pub fn options(&self) -> &MeshingOptions {
        &self.options
    }

    /// Replaces all options.
    pub fn set_options(&mut self, options: MeshingOptions) -> &mut Self {
        self.options = options;
        self
    }

    /// Sets the Gaussian blur sigma.
    pub fn set_sigma(&mut self, sigma: f64) -> &mut Self {
        self.options.sigma = sigma;
        self
    }

    /// Treats a single input as an indicator function.
    pub fn set_input_is_indicator_function(&mut self, value: bool) -> &mut Self {
        self.options.input_is_indicator_function = value;
        self
    }

    /// Sets the sizing field sampling rate.
    pub fn set_sampling_rate(&mut self, rate: f64) -> &mut Self {
        self.options.sampling_rate = rate;
        self
    }

    /// Sets the Lipschitz constant of the sizing field.
    pub fn set_lipschitz(&mut self, lipschitz: f64) -> &mut Self {
        self.options.lipschitz = lipschitz;
        self
    }

    /// Sets the feature scaling.
    pub fn set_feature_scaling(&mut self, scaling: f64) -> &mut Self {
        self.options.feature_scaling = scaling;
        self
    }

    /// Sets the number of padding cells.
    pub fn set_padding(&mut self, padding: u32) -> &mut Self {
        self.options.padding = padding;
        self
    }

    /// Sets the violation alphas.
    pub fn set_alphas(&mut self, alpha: f64, alpha_long: f64, alpha_short: f64) -> &mut Self {
        self.options.alpha = alpha;
        self.options.alpha_long = alpha_long;
        self.options.alpha_short = alpha_short;
        self
    }

    /// Sets the sizing field iteration cap.
    pub fn set_max_iterations(&mut self, max_iterations: u32) -> &mut Self {
        self.options.max_iterations = max_iterations;
        self
    }

    /// Sets the sizing mode.
    pub fn set_sizing_mode(&mut self, mode: SizingMode) -> &mut Self {
        self.options.sizing_mode = mode;
        self
    }

    /// Enables verbose engine diagnostics.
    pub fn set_verbose(&mut self, verbose: bool) -> &mut Self {
        self.options.verbose = verbose;
        self
    }

    /// Appends an input image.
    pub fn push_input(&mut self, image: Image3<T>) -> &mut Self {
        self.inputs.push(Some(image));
        self
    }

    /// Removes all inputs and the previous output.
    pub fn clear_inputs(&mut self) -> &mut Self {
        self.inputs.clear();
        self.output = None;
        self
    }

    /// Returns the engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Returns the engine mutably.
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Returns the output of the last successful run.
    pub fn output(&self) -> Option<&CleaverOutput> {
        self.output.as_ref()
    }

    /// Takes the output of the last successful run.
    pub fn take_output(&mut self) -> Option<CleaverOutput> {
        self.output.take()
    }

    /// Runs the pipeline on the current inputs.
    ///
    /// A failed run clears any previous output.
    pub fn generate(&mut self) -> Result<&CleaverOutput> {
        self.output = None;
        let mut images = Vec::with_capacity(self.inputs.len());
        for (index, input) in self.inputs.iter().enumerate() {
            let image = input.as_ref().ok_or_else(|| CleaverError::InvalidOption {
                name: "input",
                reason: format!("input {index} is not set"),
            })?;
            images.push(image.clone());
        }
        let output = mesh_images(&images, &self.options, &mut self.engine)?;
        Ok(self.output.insert(output))
    }
}

impl<T, E> ImageToMeshFilter<T> for CleaverImageToMeshFilter<T, E>
where
    T: Copy + Into<f64>,
    E: CleavingEngine,
{
    fn set_input(&mut self, index: usize, image: Image3<T>) {
        if index >= self.inputs.len() {
            self.inputs.resize_with(index + 1, || None);
        }
        self.inputs[index] = Some(image);
    }

    fn num_inputs(&self) -> usize {
        self.inputs.len()
    }

    fn update(&mut self) -> Result<()> {
        self.generate().map(|_| ())
    }

    fn volume_output(&self) -> Option<&TetMesh> {
        self.output.as_ref().map(|o| &o.tet_mesh)
    }

    fn surface_output(&self) -> Option<&TriangleMesh> {
        self.output.as_ref().map(|o| &o.triangle_mesh)
    }
}

/// Runs the full pipeline on `images` with `engine`.
pub fn mesh_images<T, E>(images: &[Image3<T>], options: &MeshingOptions, engine: &mut E) -> Result<CleaverOutput>
where
    T: Copy + Into<f64>,
    E: CleavingEngine + ?Sized,
{
    options.validate()?;
    let builder = FieldBuilder::new(options.sigma)?;
    let set = builder.build(images, options.input_is_indicator_function)?;
    log::info!("built {} field(s) in {:?} mode", set.fields.len(), set.mode);

    let report = validate_fields(&set.fields, set.mode);
    for finding in report.warnings() {
        log::warn!("{finding}");
    }
    let warnings = report.into_result()?;

    let field_names = set.fields.iter().map(|f| f.name().to_string()).collect();
    let mut volume = Volume::new(set.fields);
    log::info!(
        "cleaving {} material(s) with the {} engine",
        volume.num_materials(),
        engine.name()
    );
    let soup = engine
        .cleave(&mut volume, &options.engine_config())
        .map_err(CleaverError::Engine)?;
    soup.check_indices()?;
    log::info!("engine returned {} tetrahedra, {} faces", soup.tets.len(), soup.faces.len());

    let tet_mesh = extract_volume_mesh(&soup);
    let interface = extract_interface(&soup)?;
    log::info!(
        "extracted {} tetrahedra and {} interface triangles",
        tet_mesh.num_cells(),
        interface.mesh.num_cells()
    );

    Ok(CleaverOutput {
        tet_mesh,
        triangle_mesh: interface.mesh,
        interface_keys: interface.keys,
        field_names,
        warnings,
        sizing_field: volume.sizing_field().cloned(),
    })
}
