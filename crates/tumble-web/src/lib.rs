pub mod runner;

pub use runner::{SandboxRunner, Scene, UiInput};

/// Generate all `#[wasm_bindgen]` exports for a sandbox scene.
///
/// Generates:
/// - `thread_local!` storage for the SandboxRunner
/// - `with_runner()` helper function
/// - wasm-bindgen exports for init, tick, UI inputs, config loading and snapshot reads
///
/// # Usage
///
/// ```ignore
/// use wasm_bindgen::prelude::*;
/// use tumble_engine::BoxDrop;
///
/// tumble_web::export_sandbox!(BoxDrop, "box-drop");
/// ```
///
/// # Arguments
///
/// - `$scene_type`: a type implementing `tumble_web::Scene`
/// - `$name`: a string literal used in the initialization log message
#[macro_export]
macro_rules! export_sandbox {
    ($scene_type:ty, $name:literal) => {
        use std::cell::RefCell;

        thread_local! {
            static RUNNER: RefCell<Option<$crate::SandboxRunner<$scene_type>>> = RefCell::new(None);
        }

        fn with_runner<R>(f: impl FnOnce(&mut $crate::SandboxRunner<$scene_type>) -> R) -> Option<R> {
            RUNNER.with(|cell| cell.borrow_mut().as_mut().map(f))
        }

        #[wasm_bindgen]
        pub fn sandbox_init() -> bool {
            console_error_panic_hook::set_once();
            let _ = console_log::init_with_level(log::Level::Info);

            match $crate::SandboxRunner::<$scene_type>::new(tumble_engine::SandboxConfig::default()) {
                Ok(runner) => {
                    RUNNER.with(|cell| *cell.borrow_mut() = Some(runner));
                    log::info!("{}: initialized", $name);
                    true
                }
                Err(e) => {
                    // console_log may already be owned by another logger; write directly too
                    let msg = format!("{}: init failed: {}", $name, e);
                    web_sys::console::error_1(&msg.as_str().into());
                    log::error!("{}", msg);
                    false
                }
            }
        }

        #[wasm_bindgen]
        pub fn sandbox_load_config(json: &str) -> bool {
            with_runner(|r| match r.load_config(json) {
                Ok(()) => true,
                Err(e) => {
                    log::warn!("{}: config rejected: {}", $name, e);
                    false
                }
            })
            .unwrap_or(false)
        }

        #[wasm_bindgen]
        pub fn sandbox_tick(dt: f64) {
            with_runner(|r| r.tick(dt));
        }

        #[wasm_bindgen]
        pub fn sandbox_start() {
            with_runner(|r| r.push_input($crate::UiInput::Start));
        }

        #[wasm_bindgen]
        pub fn sandbox_tap(x: f64, y: f64) {
            with_runner(|r| r.push_input($crate::UiInput::Tap { x, y }));
        }

        #[wasm_bindgen]
        pub fn sandbox_reset() {
            with_runner(|r| r.push_input($crate::UiInput::Reset));
        }

        // ---- Data accessors ----

        #[wasm_bindgen]
        pub fn get_instances_ptr() -> *const f64 {
            with_runner(|r| r.instances_ptr()).unwrap_or(std::ptr::null())
        }

        #[wasm_bindgen]
        pub fn get_instance_count() -> u32 {
            with_runner(|r| r.instance_count()).unwrap_or(0)
        }

        /// Copy of the snapshot as `[id, x, y, half_w, half_h, rotation]` per body.
        #[wasm_bindgen]
        pub fn get_snapshot() -> js_sys::Float64Array {
            with_runner(|r| js_sys::Float64Array::from(r.snapshot().as_floats()))
                .unwrap_or_else(|| js_sys::Float64Array::new_with_length(0))
        }

        #[wasm_bindgen]
        pub fn get_world_width() -> f64 {
            with_runner(|r| r.world_width()).unwrap_or(0.0)
        }

        #[wasm_bindgen]
        pub fn get_world_height() -> f64 {
            with_runner(|r| r.world_height()).unwrap_or(0.0)
        }
    };
}

#[cfg(target_arch = "wasm32")]
mod box_drop {
    use tumble_engine::BoxDrop;
    use wasm_bindgen::prelude::*;

    crate::export_sandbox!(BoxDrop, "box-drop");
}
