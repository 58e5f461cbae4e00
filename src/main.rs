//! Turing Patterns CLI - Run simulations from JSON configuration.

#[cfg(feature = "dhat-heap")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use turing_patterns::{
    Simulation, SimulationConfig,
    compute::{Propagator, gpu::GpuPropagator},
    render::FrameRecorder,
};

/// Parsed command line.
struct Args {
    config_path: PathBuf,
    steps: u64,
    out: Option<PathBuf>,
    record: Option<PathBuf>,
    gpu: bool,
}

fn usage(program: &str) {
    eprintln!("Usage: {} <config.json> [steps] [--out frame.png] [--record DIR] [--gpu]", program);
    eprintln!();
    eprintln!("Run a reaction-diffusion simulation from JSON configuration.");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  config.json    Path to simulation configuration file");
    eprintln!("  steps          Number of simulation steps (default: 1000)");
    eprintln!("  --out FILE     Write the final frame as PNG");
    eprintln!("  --record DIR   Write every other frame as numbered PNGs");
    eprintln!("  --gpu          Step on the GPU backend");
    eprintln!();
    eprintln!("A saved state next to the config (<config>.state.json) is loaded if present.");
    eprintln!("Example configuration is generated with --example flag.");
}

fn parse_args(args: &[String]) -> Result<Args, String> {
    let mut positional = Vec::new();
    let mut out = None;
    let mut record = None;
    let mut gpu = false;

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--out" => {
                out = Some(PathBuf::from(iter.next().ok_or("--out needs a file name")?));
            }
            "--record" => {
                record = Some(PathBuf::from(iter.next().ok_or("--record needs a directory")?));
            }
            "--gpu" => gpu = true,
            other => positional.push(other.to_string()),
        }
    }

    let config_path: PathBuf = positional.first().ok_or("missing config path")?.into();
    let steps: u64 = match positional.get(1) {
        Some(s) => s.parse().map_err(|_| format!("invalid step count '{}'", s))?,
        None => 1000,
    };

    Ok(Args {
        config_path,
        steps,
        out,
        record,
        gpu,
    })
}

fn main() {
    #[cfg(feature = "dhat-heap")]
    let _profiler = dhat::Profiler::new_heap();

    env_logger::init();

    let raw: Vec<String> = std::env::args().collect();

    if raw.get(1).map(String::as_str) == Some("--example") {
        print_example_config();
        return;
    }

    let args = parse_args(&raw).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        eprintln!();
        usage(&raw[0]);
        std::process::exit(1);
    });

    // Load configuration
    let config_str = fs::read_to_string(&args.config_path).unwrap_or_else(|e| {
        eprintln!("Error reading config file: {}", e);
        std::process::exit(1);
    });

    let config: SimulationConfig = serde_json::from_str(&config_str).unwrap_or_else(|e| {
        eprintln!("Error parsing config: {}", e);
        std::process::exit(1);
    });

    let propagator: Box<dyn Propagator> = if args.gpu {
        match pollster::block_on(GpuPropagator::new(config.width, config.height)) {
            Ok(gpu) => Box::new(gpu),
            Err(e) => {
                eprintln!("Error creating GPU backend: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        Box::new(turing_patterns::CpuPropagator::new())
    };

    let mut sim = Simulation::with_propagator(config, propagator).unwrap_or_else(|e| {
        eprintln!("Error creating simulation: {}", e);
        std::process::exit(1);
    });

    // Optional saved state
    let state_path = args.config_path.with_extension("state.json");
    if state_path.exists() {
        let state_str = fs::read_to_string(&state_path).unwrap_or_else(|e| {
            eprintln!("Error reading state file: {}", e);
            std::process::exit(1);
        });
        if let Err(e) = sim.load_saved(&state_str) {
            eprintln!("Error loading state: {}", e);
            std::process::exit(1);
        }
        println!("Loaded state from {}", state_path.display());
    }

    let params = *sim.params();
    println!("Turing Patterns Simulation");
    println!("==========================");
    println!("Grid: {}x{}", sim.width(), sim.height());
    println!("Model: {:?}, boundary: {:?}", params.model, params.boundary);
    println!(
        "Du={} Dv={} feed={} kill={} dt={}",
        params.du, params.dv, params.feed, params.kill, params.dt
    );
    println!("Steps: {}", args.steps);
    println!();

    let initial = sim.stats_report();
    println!("Initial state:");
    println!("  Coverage: {}%  entropy: {}", initial.coverage, initial.entropy);
    println!("  v range: [{}, {}]", initial.min_v, initial.max_v);
    println!();

    let mut recorder = FrameRecorder::new();
    if let Some(dir) = &args.record {
        if let Err(e) = fs::create_dir_all(dir) {
            eprintln!("Error creating record directory: {}", e);
            std::process::exit(1);
        }
        recorder.start(0, 0);
    }

    // Run simulation one frame at a time
    println!("Running simulation...");
    let start = Instant::now();
    let per_frame = (params.steps_per_frame as u64).max(1);
    let report_every = (args.steps / 10).max(1);
    let mut done = 0u64;
    let mut next_report = report_every;

    while done < args.steps {
        let batch = per_frame.min(args.steps - done);
        if let Err(e) = sim.step_n(batch) {
            eprintln!("Error stepping: {}", e);
            std::process::exit(1);
        }
        done += batch;

        if recorder.is_recording() {
            if let Err(e) = recorder.capture(sim.render()) {
                eprintln!("Error recording frame: {}", e);
                std::process::exit(1);
            }
        }

        // Print progress every 10%
        if done >= next_report {
            next_report += report_every;
            let stats = sim.stats_report();
            let steps_per_sec = done as f32 / start.elapsed().as_secs_f32();
            println!(
                "  Step {}/{}: coverage={}%, entropy={}, {:.1} steps/s",
                done, args.steps, stats.coverage, stats.entropy, steps_per_sec
            );
        }
    }

    let elapsed = start.elapsed();
    let final_stats = sim.stats_report();

    println!();
    println!("Final state:");
    println!("  Coverage: {}%  entropy: {}", final_stats.coverage, final_stats.entropy);
    println!("  Mean u/v: {} / {}", final_stats.mean_u, final_stats.mean_v);
    println!("  v range: [{}, {}]", final_stats.min_v, final_stats.max_v);
    println!(
        "Time: {:.2}s ({:.1} steps/s)",
        elapsed.as_secs_f32(),
        args.steps as f32 / elapsed.as_secs_f32()
    );

    if let Some(dir) = &args.record {
        let frames = recorder.stop();
        for (i, png) in frames.iter().enumerate() {
            let path = dir.join(format!("frame_{:04}.png", i));
            if let Err(e) = fs::write(&path, png) {
                eprintln!("Error writing {}: {}", path.display(), e);
                std::process::exit(1);
            }
        }
        println!("Recorded {} frames to {}", frames.len(), dir.display());
    }

    if let Some(out) = &args.out {
        let png = sim.export_frame().unwrap_or_else(|e| {
            eprintln!("Error rendering frame: {}", e);
            std::process::exit(1);
        });
        if let Err(e) = fs::write(out, png) {
            eprintln!("Error writing {}: {}", out.display(), e);
            std::process::exit(1);
        }
        println!("Wrote {}", out.display());
    }
}

fn print_example_config() {
    let config = SimulationConfig::default();

    println!("Example configuration (config.json):");
    println!("{}", serde_json::to_string_pretty(&config).unwrap());
}
