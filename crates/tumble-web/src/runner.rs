use tumble_engine::{
    BodyId, BoxDrop, DynamicsError, FixedTimestep, SandboxConfig, SnapshotBuffer, Vector2,
};

/// UI input forwarded from the host page, applied before the next fixed step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UiInput {
    /// The start button was pressed.
    Start,
    /// A tap at world coordinates.
    Tap { x: f64, y: f64 },
    /// Restore the initial layout.
    Reset,
}

/// What a browser-driven sandbox must provide to the runner.
pub trait Scene {
    fn from_config(config: SandboxConfig) -> Result<Self, DynamicsError>
    where
        Self: Sized;

    fn config(&self) -> &SandboxConfig;

    /// React to one UI input.
    fn handle(&mut self, input: UiInput);

    /// Advance one fixed step.
    fn update(&mut self, dt: f64);

    /// Write render data for every live body.
    fn snapshot(&self, buffer: &mut SnapshotBuffer);
}

impl Scene for BoxDrop {
    fn from_config(config: SandboxConfig) -> Result<Self, DynamicsError> {
        BoxDrop::new(config)
    }

    fn config(&self) -> &SandboxConfig {
        BoxDrop::config(self)
    }

    fn handle(&mut self, input: UiInput) {
        let result = match input {
            UiInput::Start => self.start(),
            UiInput::Reset => self.reset(),
            UiInput::Tap { x, y } => {
                let removed: Option<BodyId> = self.tap(Vector2::new(x, y));
                log::debug!("tap at ({x}, {y}) removed {removed:?}");
                Ok(())
            }
        };
        if let Err(e) = result {
            log::warn!("{input:?} failed: {e}");
        }
    }

    fn update(&mut self, dt: f64) {
        self.tick(dt);
    }

    fn snapshot(&self, buffer: &mut SnapshotBuffer) {
        self.sandbox().snapshot(buffer);
    }
}

/// Generic runner that wires a scene to the display loop.
///
/// Each exported sandbox creates a `thread_local!` SandboxRunner and exports free
/// functions via `#[wasm_bindgen]`, because wasm-bindgen cannot export generic structs.
pub struct SandboxRunner<S: Scene> {
    scene: S,
    inputs: Vec<UiInput>,
    timestep: FixedTimestep,
    snapshot: SnapshotBuffer,
}

impl<S: Scene> SandboxRunner<S> {
    pub fn new(config: SandboxConfig) -> Result<Self, DynamicsError> {
        config.validate()?;
        let timestep = FixedTimestep::new(config.fixed_dt);
        let scene = S::from_config(config)?;
        let mut snapshot = SnapshotBuffer::new();
        scene.snapshot(&mut snapshot);
        Ok(Self {
            scene,
            inputs: Vec::with_capacity(8),
            timestep,
            snapshot,
        })
    }

    /// Replace the scene with one built from a JSON config. On error the current scene is kept.
    pub fn load_config(&mut self, json: &str) -> Result<(), DynamicsError> {
        let config = SandboxConfig::from_json(json)?;
        *self = Self::new(config)?;
        log::info!("config loaded");
        Ok(())
    }

    /// Queue a UI input for the next frame.
    pub fn push_input(&mut self, input: UiInput) {
        self.inputs.push(input);
    }

    /// Run one display frame: apply queued inputs, run the fixed steps, refresh the snapshot.
    pub fn tick(&mut self, frame_dt: f64) {
        for input in std::mem::take(&mut self.inputs) {
            self.scene.handle(input);
        }

        let steps = self.timestep.accumulate(frame_dt);
        for _ in 0..steps {
            self.scene.update(self.timestep.dt());
        }

        self.scene.snapshot(&mut self.snapshot);
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn snapshot(&self) -> &SnapshotBuffer {
        &self.snapshot
    }

    // ---- Pointer accessors for reads out of wasm memory ----

    pub fn instances_ptr(&self) -> *const f64 {
        self.snapshot.instances_ptr()
    }

    pub fn instance_count(&self) -> u32 {
        self.snapshot.instance_count()
    }

    pub fn world_width(&self) -> f64 {
        let b = self.scene.config().boundary;
        b.max.x - b.min.x
    }

    pub fn world_height(&self) -> f64 {
        let b = self.scene.config().boundary;
        b.max.y - b.min.y
    }
}
