//! Build script for unistep-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates stepper.toml at compile time
//! - Generates the stepper configuration constants

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Step clock period limits in milliseconds
const STEP_PERIOD_RANGE: (i64, i64) = (1, 4);

/// Motors on the reference board
const MOTOR_COUNT: i64 = 3;

fn main() {
    setup_linker();
    let config = load_config();
    let settings = validate_config(&config);
    write_config(&settings);
}

/// Validated values from stepper.toml
struct Settings {
    step_period_ms: i64,
    overwrite_policy: &'static str,
    command_timeout_ms: i64,
    demo_interval_ms: i64,
    demo_motor: i64,
    demo_direction: i64,
    demo_angle_deg: i64,
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Read and parse stepper.toml
fn load_config() -> toml::Value {
    println!("cargo:rerun-if-changed=stepper.toml");

    let config_path = Path::new("stepper.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: stepper.toml not found!                                  ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a stepper.toml configuration file.        ║\n\
            ║  Please create one in the unistep-firmware directory.            ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read stepper.toml                              ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    match toml::from_str(&content) {
        Ok(value) => value,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in stepper.toml                      ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                {}\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&e.to_string())
            );
        }
    }
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Look up an integer key, recording an error if it is missing or mistyped
fn integer(config: &toml::Value, section: &str, key: &str, errors: &mut Vec<String>) -> i64 {
    match config.get(section).and_then(|s| s.get(key)) {
        Some(toml::Value::Integer(v)) => *v,
        Some(_) => {
            errors.push(format!("[{}] {} must be an integer", section, key));
            0
        }
        None => {
            errors.push(format!("[{}] missing '{}'", section, key));
            0
        }
    }
}

/// Validate every section and collect the settings
fn validate_config(config: &toml::Value) -> Settings {
    let mut errors = Vec::new();

    for section in ["stepper", "control", "demo"] {
        match config.get(section) {
            Some(toml::Value::Table(_)) => {}
            Some(_) => errors.push(format!("[{}] must be a table", section)),
            None => errors.push(format!("Missing [{}] section", section)),
        }
    }

    let step_period_ms = integer(config, "stepper", "step_period_ms", &mut errors);
    if step_period_ms < STEP_PERIOD_RANGE.0 || step_period_ms > STEP_PERIOD_RANGE.1 {
        errors.push(format!(
            "[stepper] step_period_ms must be {}-{}",
            STEP_PERIOD_RANGE.0, STEP_PERIOD_RANGE.1
        ));
    }

    let overwrite_policy = match config.get("stepper").and_then(|s| s.get("overwrite_policy")) {
        Some(toml::Value::String(p)) if p == "optimistic" => "Optimistic",
        Some(toml::Value::String(p)) if p == "reconcile" => "Reconcile",
        Some(_) => {
            errors.push("[stepper] overwrite_policy must be 'optimistic' or 'reconcile'".into());
            "Optimistic"
        }
        // Optional, keeps the default policy
        None => "Optimistic",
    };

    let command_timeout_ms = integer(config, "control", "command_timeout_ms", &mut errors);
    if command_timeout_ms <= 0 {
        errors.push("[control] command_timeout_ms must be positive".into());
    }

    let demo_interval_ms = integer(config, "demo", "interval_ms", &mut errors);
    if demo_interval_ms <= 0 {
        errors.push("[demo] interval_ms must be positive".into());
    }
    let demo_motor = integer(config, "demo", "motor", &mut errors);
    if demo_motor < 0 || demo_motor >= MOTOR_COUNT {
        errors.push(format!("[demo] motor must be 0-{}", MOTOR_COUNT - 1));
    }
    let demo_direction = integer(config, "demo", "direction", &mut errors);
    if demo_direction != 0 && demo_direction != 1 {
        errors.push("[demo] direction must be 0 or 1".into());
    }
    let demo_angle_deg = integer(config, "demo", "angle_deg", &mut errors);
    if !(0..=360_000).contains(&demo_angle_deg) {
        errors.push("[demo] angle_deg must be 0-360000".into());
    }

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid stepper configuration                            ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=stepper.toml validated successfully");

    Settings {
        step_period_ms,
        overwrite_policy,
        command_timeout_ms,
        demo_interval_ms,
        demo_motor,
        demo_direction,
        demo_angle_deg,
    }
}

/// Write the validated settings as Rust constants into OUT_DIR
fn write_config(settings: &Settings) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let mut f = File::create(out_dir.join("stepper_config.rs")).unwrap();

    writeln!(f, "// Generated from stepper.toml by build.rs").unwrap();
    writeln!(
        f,
        "pub const STEP_PERIOD_MS: u32 = {};",
        settings.step_period_ms
    )
    .unwrap();
    writeln!(
        f,
        "pub const OVERWRITE_POLICY: OverwritePolicy = OverwritePolicy::{};",
        settings.overwrite_policy
    )
    .unwrap();
    writeln!(
        f,
        "pub const COMMAND_TIMEOUT_MS: u64 = {};",
        settings.command_timeout_ms
    )
    .unwrap();
    writeln!(
        f,
        "pub const DEMO_INTERVAL_MS: u64 = {};",
        settings.demo_interval_ms
    )
    .unwrap();
    writeln!(f, "pub const DEMO_MOTOR: u8 = {};", settings.demo_motor).unwrap();
    writeln!(
        f,
        "pub const DEMO_DIRECTION: u32 = {};",
        settings.demo_direction
    )
    .unwrap();
    writeln!(
        f,
        "pub const DEMO_ANGLE_DEG: u32 = {};",
        settings.demo_angle_deg
    )
    .unwrap();
}
