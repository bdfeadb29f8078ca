//! Browser control surface
//!
//! Exposes one `Cinematic` handle to JavaScript. The page calls `frame()`
//! from its requestAnimationFrame loop and reads uniforms and particle
//! instances back as typed arrays.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;

use crate::config::CinematicConfig;
use crate::render::{Director, OverlayLayer, SceneLayer};
use crate::settings::{QualityPreset, Settings};
use crate::sim::coerce_seed;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    // A second module instance on the page already installed the logger
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("Impact cinematic loaded");
}

/// Page clock in seconds (wall clock when the Performance API is missing)
fn now_seconds() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or_else(js_sys::Date::now)
        / 1000.0
}

#[wasm_bindgen]
pub struct Cinematic {
    config: CinematicConfig,
    settings: Settings,
    director: Director,
    scene: Rc<RefCell<SceneLayer>>,
    overlay: Rc<RefCell<OverlayLayer>>,
    /// Quality changed since the layers were built
    rebuild_pending: bool,
}

impl Cinematic {
    fn build(
        config: &CinematicConfig,
        settings: &Settings,
    ) -> (Director, Rc<RefCell<SceneLayer>>, Rc<RefCell<OverlayLayer>>) {
        let scene = Rc::new(RefCell::new(SceneLayer::new(config, settings)));
        let overlay = Rc::new(RefCell::new(OverlayLayer::new(config, settings)));
        let mut director = Director::new(config);
        director.add_adapter(scene.clone());
        director.add_adapter(overlay.clone());
        (director, scene, overlay)
    }

    fn rebuild(&mut self) {
        let timeline = self.director.timeline();
        self.config.seed = timeline.pending_seed().unwrap_or(timeline.seed());
        let (director, scene, overlay) = Self::build(&self.config, &self.settings);
        self.director = director;
        self.scene = scene;
        self.overlay = overlay;
        self.rebuild_pending = false;
        log::info!("Rebuilt layers for {} quality", self.settings.quality.as_str());
    }
}

#[wasm_bindgen]
impl Cinematic {
    /// Build from an optional JSON config; stored viewer settings are applied
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<Cinematic, JsError> {
        let config = match config_json {
            Some(json) => CinematicConfig::from_json(&json)?,
            None => CinematicConfig::default(),
        };
        let settings = Settings::load();
        let (director, scene, overlay) = Self::build(&config, &settings);
        Ok(Cinematic {
            config,
            settings,
            director,
            scene,
            overlay,
            rebuild_pending: false,
        })
    }

    pub fn restart(&mut self) {
        if self.rebuild_pending {
            self.rebuild();
        }
        self.director.restart(now_seconds());
    }

    pub fn pause(&mut self) {
        self.director.pause();
    }

    pub fn resume(&mut self) {
        self.director.resume(now_seconds());
    }

    /// Stage a seed for the next restart; any JS number is accepted
    #[wasm_bindgen(js_name = setSeed)]
    pub fn set_seed(&mut self, seed: f64) {
        self.director.set_seed(coerce_seed(seed));
    }

    pub fn seek(&mut self, t: f32) {
        self.director.seek(t);
    }

    /// Advance to the current page time and update both layers; returns `t`
    pub fn frame(&mut self) -> f32 {
        self.director.frame(now_seconds()).t
    }

    #[wasm_bindgen(js_name = stateJson)]
    pub fn state_json(&self) -> Result<String, JsError> {
        Ok(serde_json::to_string(&self.director.state())?)
    }

    #[wasm_bindgen(js_name = frameJson)]
    pub fn frame_json(&self) -> Result<String, JsError> {
        Ok(serde_json::to_string(&self.director.last_frame())?)
    }

    #[wasm_bindgen(js_name = sceneUniforms)]
    pub fn scene_uniforms(&self) -> Vec<u8> {
        self.scene.borrow().uniform_bytes().to_vec()
    }

    /// Interleaved `[x, y, z, size, r, g, b, a]` per particle
    #[wasm_bindgen(js_name = particleInstances)]
    pub fn particle_instances(&self) -> Vec<f32> {
        let instances = self.overlay.borrow().particle_instances();
        bytemuck::cast_slice(&instances).to_vec()
    }

    #[wasm_bindgen(js_name = asteroidPosition)]
    pub fn asteroid_position(&self) -> Vec<f32> {
        self.overlay.borrow().snapshot().position.to_array().to_vec()
    }

    /// Spin axis and angle as `[x, y, z, angle]`
    #[wasm_bindgen(js_name = asteroidSpin)]
    pub fn asteroid_spin(&self) -> Vec<f32> {
        let (axis, angle) = self.overlay.borrow().spin();
        vec![axis.x, axis.y, axis.z, angle]
    }

    #[wasm_bindgen(js_name = asteroidVisible)]
    pub fn asteroid_visible(&self) -> bool {
        self.overlay.borrow().visible()
    }

    pub fn emissive(&self) -> f32 {
        self.overlay.borrow().emissive()
    }

    #[wasm_bindgen(js_name = detailLevel)]
    pub fn detail_level(&self) -> u32 {
        self.overlay.borrow().lod_level() as u32
    }

    /// Renderer options for the active preset as JSON
    #[wasm_bindgen(js_name = qualityOptionsJson)]
    pub fn quality_options_json(&self) -> Result<String, JsError> {
        Ok(serde_json::to_string(&self.settings.quality.options())?)
    }

    /// Change and persist the preset; layers pick it up on the next restart
    #[wasm_bindgen(js_name = setQuality)]
    pub fn set_quality(&mut self, name: &str) {
        let preset = QualityPreset::parse_or_default(name);
        if preset == self.settings.quality {
            return;
        }
        self.settings.apply_preset(preset);
        self.settings.save();
        self.rebuild_pending = true;
    }

    /// Whether the page should draw the phase/progress readout
    #[wasm_bindgen(js_name = showStatus)]
    pub fn show_status(&self) -> bool {
        self.settings.show_status
    }

    #[wasm_bindgen(js_name = setShowStatus)]
    pub fn set_show_status(&mut self, enabled: bool) {
        if self.settings.show_status != enabled {
            self.settings.show_status = enabled;
            self.settings.save();
        }
    }

    #[wasm_bindgen(js_name = setReducedMotion)]
    pub fn set_reduced_motion(&mut self, enabled: bool) {
        if self.settings.reduced_motion != enabled {
            self.settings.reduced_motion = enabled;
            self.settings.save();
            self.rebuild_pending = true;
        }
    }
}
