//! Impact Cinematic entry point
//!
//! Native builds run one pass of the sequence headless and print a summary.
//! The browser build starts from `web::start` and is driven by the page.

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::cell::RefCell;
    use std::rc::Rc;

    use impact_cinematic::render::{EffectKind, OverlayLayer, SceneLayer};
    use impact_cinematic::sim::{PhaseKey, coerce_seed};
    use impact_cinematic::{CinematicConfig, ConfigError, Director, Settings};

    /// Command line: `impact-cinematic [config.json] [--seed N] [--quality low|medium|high]`
    struct Args {
        config_path: Option<String>,
        seed: Option<u32>,
        quality: Option<String>,
    }

    fn parse_args() -> Args {
        let mut args = Args {
            config_path: None,
            seed: None,
            quality: None,
        };
        let mut it = std::env::args().skip(1);
        while let Some(arg) = it.next() {
            match arg.as_str() {
                "--seed" => match it.next().map(|v| v.parse::<f64>()) {
                    Some(Ok(v)) => args.seed = Some(coerce_seed(v)),
                    _ => log::warn!("--seed expects a number; ignoring"),
                },
                "--quality" => args.quality = it.next(),
                _ => args.config_path = Some(arg),
            }
        }
        args
    }

    pub fn run() -> Result<(), ConfigError> {
        let args = parse_args();
        let mut config = match &args.config_path {
            Some(path) => {
                log::info!("Loading config from {}", path);
                CinematicConfig::from_file(path)?
            }
            None => CinematicConfig::default(),
        };
        if let Some(seed) = args.seed {
            config.seed = seed;
        }
        // One pass only
        config.looping = false;

        let mut settings = Settings::load();
        if let Some(name) = &args.quality {
            settings.apply_preset(impact_cinematic::QualityPreset::parse_or_default(name));
        }

        let scene = Rc::new(RefCell::new(SceneLayer::new(&config, &settings)));
        let overlay = Rc::new(RefCell::new(OverlayLayer::new(&config, &settings)));
        let mut director = Director::new(&config);
        director.add_adapter(scene.clone());
        director.add_adapter(overlay.clone());

        log::info!(
            "Running {:.1}s sequence at {:.0} Hz with seed {}",
            director.timeline().total_duration(),
            1.0 / director.timeline().fixed_time_step(),
            config.seed
        );

        // Simulated wall clock: one fixed step per frame
        let step = director.timeline().fixed_time_step();
        let mut now = 0.0;
        director.restart(now);
        let mut phase = PhaseKey::FarApproach;
        let mut peak_particles = 0;
        while !director.timeline().is_finished() {
            now += step;
            let frame = director.frame(now);
            if frame.phase.key != phase {
                phase = frame.phase.key;
                if settings.show_status {
                    log::info!(
                        "{} at t={:.3} ({:.2}s)",
                        frame.phase.name,
                        frame.t,
                        frame.elapsed_seconds
                    );
                }
            }
            peak_particles = peak_particles.max(overlay.borrow().particle_count());
        }

        let overlay = overlay.borrow();
        let uniforms = *scene.borrow().uniforms();
        println!("frames:          {}", director.frame_count());
        println!("impacts:         {}", overlay.impacts());
        println!("peak particles:  {}", peak_particles);
        println!("lod switches:    {}", overlay.lod_switches());
        println!("smoke at end:    {}", overlay.emitter(EffectKind::Smoke).len());
        println!("sun at end:      {:.3}", uniforms.sun_intensity);
        println!("final state:     {}", serde_json::to_string(&director.state())?);
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Impact Cinematic (native, headless) starting...");

    if let Err(e) = headless::run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is web::start, this is just to satisfy the compiler
}
