//! Command-line driver for the ballistics engine.

use clap::{Parser, Subcommand, ValueEnum};
use nalgebra::Vector3;
use serde::Serialize;

use ballistics_kit::{wind_presets, Atmosphere, Bullet, DragModel, RandomSource, Simulator};

#[derive(Parser)]
#[command(name = "ballistics-kit")]
#[command(version = "0.1.0")]
#[command(about = "Exterior ballistics with procedural wind", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Zero the rifle, then simulate a shot downrange
    Trajectory {
        /// Muzzle velocity (m/s)
        #[arg(short = 'v', long, default_value = "800.0")]
        velocity: f64,

        /// Ballistic coefficient
        #[arg(short = 'b', long, default_value = "0.3")]
        bc: f64,

        /// Bullet mass (kg)
        #[arg(short = 'm', long, default_value = "0.0109")]
        mass: f64,

        /// Bullet diameter (m)
        #[arg(short = 'd', long, default_value = "0.00782")]
        diameter: f64,

        /// Bullet length (m)
        #[arg(long, default_value = "0.0312")]
        length: f64,

        /// Drag model (G1 or G7)
        #[arg(long, default_value = "G7")]
        drag_model: String,

        /// Zero range (m)
        #[arg(long, default_value = "100.0")]
        zero_range: f64,

        /// Maximum range to simulate (m)
        #[arg(long, default_value = "1000.0")]
        max_range: f64,

        /// Barrel twist pitch (m/turn, signed; 0 disables spin)
        #[arg(long, default_value = "0.254")]
        twist: f64,

        /// Wind preset (Dead, Calm, Moderate, Strong, Extra Strong; omit for no wind)
        #[arg(long)]
        wind: Option<String>,

        /// Wind RNG seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Time step (s)
        #[arg(long, default_value = "0.001")]
        time_step: f64,

        /// Report interval downrange (m)
        #[arg(long, default_value = "100.0")]
        interval: f64,

        /// Output format
        #[arg(short = 'o', long, value_enum, default_value = "table")]
        output: OutputFormat,
    },
}

#[derive(Debug, Serialize)]
struct SampleRow {
    distance_m: f64,
    time_s: f64,
    drop_m: f64,
    drift_m: f64,
    velocity_mps: f64,
    energy_j: f64,
    wind_mps: f64,
}

#[derive(Debug, Serialize)]
struct TrajectoryReport {
    zero_pitch_rad: f64,
    zero_converged: bool,
    zero_iterations: u32,
    samples: Vec<SampleRow>,
    impact_velocity_mps: f64,
    impact_angle_rad: f64,
    max_height_m: f64,
    total_time_s: f64,
}

fn main() {
    let cli = Cli::parse();
    match cli.command {
        Commands::Trajectory {
            velocity,
            bc,
            mass,
            diameter,
            length,
            drag_model,
            zero_range,
            max_range,
            twist,
            wind,
            seed,
            time_step,
            interval,
            output,
        } => {
            let model = match DragModel::from_str(&drag_model) {
                Some(m) => m,
                None => {
                    eprintln!("Unknown drag model '{}', expected G1 or G7", drag_model);
                    std::process::exit(1);
                }
            };

            let bullet = Bullet::new(mass, diameter, length, bc, model);
            let spin_rate = Bullet::spin_rate_from_twist(velocity, twist);
            let mut sim = Simulator::new(bullet, Atmosphere::standard());

            let zero = sim.compute_zero(
                velocity,
                Vector3::new(0.0, 0.0, -zero_range),
                time_step,
                20,
                0.001,
                spin_rate,
            );
            if !zero.converged {
                eprintln!(
                    "Warning: zero did not converge ({} iterations, residual {:.4} m)",
                    zero.iterations, zero.residual_error
                );
            }

            match wind.as_deref() {
                Some(name) => {
                    let min = Vector3::new(-100.0, 0.0, -max_range);
                    let max = Vector3::new(100.0, 100.0, 0.0);
                    let mut field =
                        match wind_presets::preset(name, min, max, RandomSource::seed_from(seed)) {
                            Ok(f) => f,
                            Err(e) => {
                                eprintln!(
                                    "{} (available: {})",
                                    e,
                                    wind_presets::preset_names().join(", ")
                                );
                                std::process::exit(1);
                            }
                        };
                    field.calibrate();
                    sim.simulate_with_wind(max_range, time_step, 60.0, &field);
                }
                None => {
                    sim.simulate(max_range, time_step, 60.0);
                }
            }

            let report = build_report(&sim, &zero, interval, max_range);
            match output {
                OutputFormat::Table => print_table(&report),
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&report).unwrap())
                }
            }
        }
    }
}

fn build_report(
    sim: &Simulator,
    zero: &ballistics_kit::ZeroSolution,
    interval: f64,
    max_range: f64,
) -> TrajectoryReport {
    let traj = sim.trajectory();
    let mut samples = Vec::new();
    let mut d = 0.0;
    while d <= max_range && d <= traj.total_distance() {
        if let Some(p) = traj.at_distance(d) {
            samples.push(SampleRow {
                distance_m: d,
                time_s: p.time(),
                drop_m: p.state().position().y,
                drift_m: p.state().position().x,
                velocity_mps: p.velocity(),
                energy_j: p.kinetic_energy(),
                wind_mps: p.wind().norm(),
            });
        }
        d += interval;
    }

    TrajectoryReport {
        zero_pitch_rad: zero.pitch,
        zero_converged: zero.converged,
        zero_iterations: zero.iterations,
        samples,
        impact_velocity_mps: traj.impact_velocity(),
        impact_angle_rad: traj.impact_angle(),
        max_height_m: traj.max_height(),
        total_time_s: traj.total_time(),
    }
}

fn print_table(report: &TrajectoryReport) {
    println!(
        "Zero: pitch {:.4} mrad, {} iterations{}",
        report.zero_pitch_rad * 1000.0,
        report.zero_iterations,
        if report.zero_converged { "" } else { " (NOT CONVERGED)" }
    );
    println!(
        "{:>10} {:>8} {:>9} {:>9} {:>9} {:>9} {:>7}",
        "Range(m)", "Time(s)", "Drop(m)", "Drift(m)", "Vel(m/s)", "E(J)", "Wind"
    );
    for row in &report.samples {
        println!(
            "{:>10.0} {:>8.3} {:>9.3} {:>9.3} {:>9.1} {:>9.0} {:>7.1}",
            row.distance_m,
            row.time_s,
            row.drop_m,
            row.drift_m,
            row.velocity_mps,
            row.energy_j,
            row.wind_mps
        );
    }
    println!(
        "Impact: {:.1} m/s at {:.2}°; max height {:.2} m; flight time {:.3} s",
        report.impact_velocity_mps,
        report.impact_angle_rad.to_degrees(),
        report.max_height_m,
        report.total_time_s
    );
}
