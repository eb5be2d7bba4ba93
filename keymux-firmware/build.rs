//! Build script for keymux-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates keymux.toml at compile time
//! - Generates `board_config.rs` with the validated values as constants

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Highest scan rate the firmware accepts
const MAX_SCAN_RATE_HZ: i64 = 10_000;

/// Deepest debounce history the firmware accepts
const MAX_DEBOUNCE_DEPTH: i64 = 8;

fn main() {
    setup_linker();
    let board = validate_config();
    generate_board_config(&board);
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
    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validated board configuration
struct Board {
    scan_rate_hz: i64,
    debounce_depth: i64,
    active_high: bool,
    keymap: String,
    led: &'static str,
    oled: &'static str,
    led_banner: String,
    oled_banner: [String; 2],
    app_mode: &'static str,
}

/// Validate keymux.toml configuration at compile time
fn validate_config() -> Board {
    // Re-run if keymux.toml changes
    println!("cargo:rerun-if-changed=keymux.toml");

    let config_path = Path::new("keymux.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: keymux.toml not found!                                   ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a keymux.toml board configuration.        ║\n\
            ║  Please create one in the keymux-firmware directory.             ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read keymux.toml                               ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    // Parse and validate TOML syntax
    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in keymux.toml                       ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    let board = Board {
        scan_rate_hz: integer(&config, "keypad", "scan_rate_hz", 1000, 1..=MAX_SCAN_RATE_HZ, &mut errors),
        debounce_depth: integer(&config, "keypad", "debounce_depth", 3, 1..=MAX_DEBOUNCE_DEPTH, &mut errors),
        active_high: choice(&config, "keypad", "polarity", &["low", "high"], &mut errors) == "high",
        keymap: keymap(&config, &mut errors),
        led: choice(&config, "display", "led", &["bitbang", "dma", "timed-dma"], &mut errors),
        oled: choice(&config, "display", "oled", &["dma", "direct", "off"], &mut errors),
        led_banner: text(&config, "display", "led_banner", 8, &mut errors),
        oled_banner: oled_banner(&config, &mut errors),
        app_mode: choice(&config, "app", "mode", &["show-keys", "float-entry"], &mut errors),
    };

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid settings in keymux.toml                          ║\n\
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

    println!("cargo:warning=keymux.toml validated successfully");
    board
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

fn lookup<'a>(config: &'a toml::Value, section: &str, key: &str) -> Option<&'a toml::Value> {
    config.get(section).and_then(|s| s.get(key))
}

/// Integer setting with a default when absent
fn integer(
    config: &toml::Value,
    section: &str,
    key: &str,
    default: i64,
    range: std::ops::RangeInclusive<i64>,
    errors: &mut Vec<String>,
) -> i64 {
    match lookup(config, section, key) {
        None => default,
        Some(toml::Value::Integer(value)) if range.contains(value) => *value,
        Some(toml::Value::Integer(_)) => {
            errors.push(format!(
                "[{}] {} must be {}-{}",
                section,
                key,
                range.start(),
                range.end()
            ));
            default
        }
        Some(_) => {
            errors.push(format!("[{}] {} must be an integer", section, key));
            default
        }
    }
}

/// String setting restricted to `options`; the first option is the default
fn choice(
    config: &toml::Value,
    section: &str,
    key: &str,
    options: &[&'static str],
    errors: &mut Vec<String>,
) -> &'static str {
    match lookup(config, section, key) {
        None => options[0],
        Some(toml::Value::String(value)) => match options.iter().find(|o| **o == value) {
            Some(option) => *option,
            None => {
                errors.push(format!(
                    "[{}] {} must be one of: {}",
                    section,
                    key,
                    options.join(", ")
                ));
                options[0]
            }
        },
        Some(_) => {
            errors.push(format!("[{}] {} must be a string", section, key));
            options[0]
        }
    }
}

/// Printable ASCII text of at most `max_len` characters
fn text(
    config: &toml::Value,
    section: &str,
    key: &str,
    max_len: usize,
    errors: &mut Vec<String>,
) -> String {
    match lookup(config, section, key) {
        None => String::new(),
        Some(toml::Value::String(value)) => check_text(value, section, key, max_len, errors),
        Some(_) => {
            errors.push(format!("[{}] {} must be a string", section, key));
            String::new()
        }
    }
}

fn check_text(
    value: &str,
    section: &str,
    key: &str,
    max_len: usize,
    errors: &mut Vec<String>,
) -> String {
    if !value.chars().all(|c| c.is_ascii_graphic() || c == ' ') {
        errors.push(format!("[{}] {} must be printable ASCII", section, key));
        return String::new();
    }
    if value.len() > max_len {
        errors.push(format!("[{}] {} longer than {} characters", section, key, max_len));
        return String::new();
    }
    value.to_string()
}

fn keymap(config: &toml::Value, errors: &mut Vec<String>) -> String {
    let keymap = text(config, "keypad", "keymap", 16, errors);
    if keymap.is_empty() {
        return "DCBA#9630852*741".to_string();
    }
    if keymap.len() != 16 {
        errors.push("[keypad] keymap must have exactly 16 characters".to_string());
    }
    keymap
}

fn oled_banner(config: &toml::Value, errors: &mut Vec<String>) -> [String; 2] {
    let mut lines = [String::new(), String::new()];
    match lookup(config, "display", "oled_banner") {
        None => {}
        Some(toml::Value::Array(values)) if values.len() <= 2 => {
            for (line, value) in lines.iter_mut().zip(values) {
                match value {
                    toml::Value::String(s) => {
                        *line = check_text(s, "display", "oled_banner", 16, errors)
                    }
                    _ => errors.push("[display] oled_banner entries must be strings".to_string()),
                }
            }
        }
        Some(_) => errors.push("[display] oled_banner must be an array of two lines".to_string()),
    }
    lines
}

/// Write the validated values as Rust constants into OUT_DIR
fn generate_board_config(board: &Board) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let polarity = if board.active_high {
        "RowPolarity::ActiveHigh"
    } else {
        "RowPolarity::ActiveLow"
    };
    let led = match board.led {
        "dma" => "LedTransfer::Dma",
        "timed-dma" => "LedTransfer::TimedDma",
        _ => "LedTransfer::BitBang",
    };
    let oled = match board.oled {
        "direct" => "OledTransfer::Direct",
        "off" => "OledTransfer::Off",
        _ => "OledTransfer::Dma",
    };
    let app_mode = match board.app_mode {
        "float-entry" => "AppMode::FloatEntry",
        _ => "AppMode::ShowKeys",
    };

    let source = format!(
        "// Generated from keymux.toml by build.rs\n\
        \n\
        pub const KEYPAD: KeypadConfig = KeypadConfig {{\n    \
            scan_rate_hz: {},\n    \
            debounce_depth: {},\n    \
            keymap: {:?},\n    \
            polarity: {},\n\
        }};\n\
        \n\
        pub const DISPLAY: DisplayConfig = DisplayConfig {{\n    \
            led: {},\n    \
            oled: {},\n    \
            led_banner: {:?},\n    \
            oled_banner: [{:?}, {:?}],\n\
        }};\n\
        \n\
        pub const APP_MODE: AppMode = {};\n",
        board.scan_rate_hz,
        board.debounce_depth,
        board.keymap,
        polarity,
        led,
        oled,
        board.led_banner,
        board.oled_banner[0],
        board.oled_banner[1],
        app_mode,
    );

    let mut f = File::create(out_dir.join("board_config.rs")).unwrap();
    f.write_all(source.as_bytes()).unwrap();
}
