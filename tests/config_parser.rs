//! Integration tests for the Klipper configuration parser.
//!
//! These tests exercise the public parsing API end to end on realistic
//! printer configurations.

use klipper_mcp::klipper::{parse_config, Value};

const PRINTER_CFG: &str = r"# Voron 2.4 printer.cfg
[include mainsail.cfg]
[include macros/*.cfg]

[mcu]
serial: /dev/serial/by-id/usb-Klipper_stm32f446xx-if00
restart_method: command

[printer]
kinematics: corexy
max_velocity: 300
max_accel: 3000

[stepper_x]
step_pin: PF13
dir_pin: !PF12
enable_pin: !PF14
rotation_distance: 40
microsteps: 32
endstop_pin: tmc2209_stepper_x:virtual_endstop

[stepper_y]
step_pin: PG0
dir_pin = PG1
enable_pin: !PF15
rotation_distance: 40

[extruder]
step_pin: PF11
nozzle_diameter: 0.400
filament_diameter: 1.750
max_temp: 270
pid_Kp: 26.213
heater_pin: PA2
sensor_type: ATC Semitec 104GT-2

[heater_bed]
heater_pin: PA1
max_temp: 120

[fan]
pin: PA8
kick_start_time: 0.5

[bed_mesh]
mesh_min: 40, 40
mesh_max: 260, 260
probe_count: 5, 5
fade_enable: True

[gcode_macro PRINT_START]
description: Start the print \
    after heating
";

// =============================================================================
// Document Structure
// =============================================================================

#[test]
fn test_full_printer_config() {
    let result = parse_config(PRINTER_CFG, true);

    assert!(result.is_valid(), "unexpected: {:?}", result.diagnostics);
    assert_eq!(result.includes, ["mainsail.cfg", "macros/*.cfg"]);

    let names: Vec<&str> = result.document.iter().map(|(name, _)| name).collect();
    assert_eq!(
        names,
        [
            "mcu",
            "printer",
            "stepper_x",
            "stepper_y",
            "extruder",
            "heater_bed",
            "fan",
            "bed_mesh",
            "gcode_macro PRINT_START",
        ]
    );

    let doc = &result.document;
    assert_eq!(doc.get("printer", "kinematics"), Some(&Value::String("corexy".into())));
    assert_eq!(doc.get("printer", "max_velocity"), Some(&Value::Number(300.0)));
    assert_eq!(doc.get("stepper_y", "dir_pin"), Some(&Value::String("PG1".into())));
    assert_eq!(
        doc.get("stepper_x", "endstop_pin"),
        Some(&Value::String("tmc2209_stepper_x:virtual_endstop".into()))
    );
    assert_eq!(doc.get("bed_mesh", "fade_enable"), Some(&Value::Bool(true)));
    assert_eq!(
        doc.get("bed_mesh", "mesh_min"),
        Some(&Value::List(vec![Value::Number(40.0), Value::Number(40.0)]))
    );
    assert_eq!(
        doc.get("gcode_macro PRINT_START", "description"),
        Some(&Value::String("Start the print after heating".into()))
    );
}

#[test]
fn test_include_example() {
    let result = parse_config("[include fan.cfg]\n[extruder]\nnozzle_diameter: 0.4\n", true);

    assert_eq!(result.includes, ["fan.cfg"]);
    assert_eq!(result.document.len(), 1);
    let extruder = result.document.section("extruder").unwrap();
    assert_eq!(extruder.len(), 1);
    assert_eq!(extruder.get("nozzle_diameter"), Some(&Value::Number(0.4)));
    assert!(result.diagnostics.is_empty());
}

#[test]
fn test_duplicate_sections_last_wins() {
    let text = "[a]\nx: 1\n[b]\ny: 2\n[a]\nz: 3\n";
    let result = parse_config(text, true);

    let names: Vec<&str> = result.document.iter().map(|(name, _)| name).collect();
    assert_eq!(names, ["b", "a"]);

    let a = result.document.section("a").unwrap();
    assert_eq!(a.len(), 1);
    assert_eq!(a.get("z"), Some(&Value::Number(3.0)));
    assert!(a.get("x").is_none());
}

#[test]
fn test_duplicate_keys_last_wins() {
    let result = parse_config("[fan]\npin: PA8\nmax_power: 1.0\npin: PA9\n", true);
    let fan = result.document.section("fan").unwrap();

    let keys: Vec<&str> = fan.keys().map(String::as_str).collect();
    assert_eq!(keys, ["pin", "max_power"]);
    assert_eq!(fan.get("pin"), Some(&Value::String("PA9".into())));
}

#[test]
fn test_orphan_parameter() {
    let result = parse_config("orphan: 1\n[x]\n", true);

    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].line, 1);
    assert!(result.diagnostics[0].message.contains("outside of section"));
    assert!(result.document.section("x").unwrap().is_empty());
}

// =============================================================================
// Line Continuation
// =============================================================================

#[test]
fn test_continuation_merges_lines() {
    let result = parse_config("[printer]\nspeed: 10 \\\nmore\n", true);
    assert_eq!(
        result.document.get("printer", "speed"),
        Some(&Value::String("10 more".into()))
    );
    assert!(result.is_valid());
}

#[test]
fn test_continuation_consumes_one_line_and_keeps_numbering() {
    let text = "[printer]\nspeed: 1 \\\n2 \\\n3\n[stepper_x]\nstep_pin: 99\n";
    let result = parse_config(text, true);

    assert_eq!(
        result.document.get("printer", "speed"),
        Some(&Value::String("1 2 \\".into()))
    );
    let lines: Vec<usize> = result.diagnostics.iter().map(|d| d.line).collect();
    assert_eq!(lines, [4, 6]);
    assert_eq!(result.diagnostics[0].message, "invalid syntax: 3");
}

// =============================================================================
// Validation
// =============================================================================

#[test]
fn test_pin_validation() {
    let good = parse_config("[stepper_x]\nstep_pin: PA0\n", true);
    assert!(good.diagnostics.is_empty());

    let bad = parse_config("[stepper_x]\nstep_pin: 123\n", true);
    assert_eq!(bad.diagnostics.len(), 1);
    assert_eq!(bad.diagnostics[0].line, 2);
    assert!(bad.diagnostics[0].message.contains("invalid pin format"));
    assert_eq!(
        bad.document.get("stepper_x", "step_pin"),
        Some(&Value::Number(123.0))
    );
}

#[test]
fn test_max_temp_validation() {
    let hot = parse_config("[extruder]\nmax_temp: 600\n", true);
    assert_eq!(hot.diagnostics.len(), 1);

    let ok = parse_config("[extruder]\nmax_temp: 250\n", true);
    assert!(ok.diagnostics.is_empty());
}

#[test]
fn test_rules_scoped_to_sections() {
    // Same keys under other sections are never checked.
    let text = "[heater_bed]\nmax_temp: 900\n[extruder1]\nnozzle_diameter: -1\n[fan]\nstep_pin: 1\n";
    assert!(parse_config(text, true).is_valid());
}

#[test]
fn test_every_problem_reported_with_line() {
    let text = "\
kinematics: corexy
[stepper_z]
rotation_distance: 0
enable_pin: P
[bad section]
garbage line
[extruder]
nozzle_diameter: abc
";
    let result = parse_config(text, true);
    let lines: Vec<usize> = result.diagnostics.iter().map(|d| d.line).collect();
    assert_eq!(lines, [1, 3, 4, 5, 6, 8]);

    let rendered: Vec<String> = result.diagnostics.iter().map(ToString::to_string).collect();
    assert_eq!(rendered[0], "Line 1: configuration outside of section");
    assert_eq!(rendered[4], "Line 6: invalid syntax: garbage line");
}

#[test]
fn test_include_lines_keep_numbering() {
    let result = parse_config("[include a.cfg]\n[include b.cfg]\n[stepper_x]\nstep_pin: x\n", true);
    assert_eq!(result.includes, ["a.cfg", "b.cfg"]);
    assert_eq!(result.diagnostics[0].line, 4);
}

#[test]
fn test_validation_off_changes_nothing_but_diagnostics() {
    let samples = [
        PRINTER_CFG,
        "orphan: 1\n[x]\n",
        "[stepper_x]\nstep_pin: 123\n[bad name]\n???\n",
        "[include a.cfg]\n[ ]\nk: v\n[extruder]\nmax_temp: 9000\n",
    ];

    for text in samples {
        let on = parse_config(text, true);
        let off = parse_config(text, false);
        assert_eq!(on.document, off.document, "document differs for {text:?}");
        assert_eq!(on.includes, off.includes);
        assert!(off.diagnostics.is_empty());
    }
}

// =============================================================================
// Values
// =============================================================================

#[test]
fn test_comma_values_are_lists() {
    let result = parse_config("[x]\na: 1, true, PA0\nb: ,\nc: 1.5,\n", false);
    let doc = &result.document;

    assert_eq!(
        doc.get("x", "a"),
        Some(&Value::List(vec![
            Value::Number(1.0),
            Value::Bool(true),
            Value::String("PA0".into()),
        ]))
    );
    assert_eq!(
        doc.get("x", "b"),
        Some(&Value::List(vec![
            Value::String(String::new()),
            Value::String(String::new()),
        ]))
    );
    assert!(doc.get("x", "c").unwrap().as_list().is_some());
}

// =============================================================================
// Round Trip
// =============================================================================

#[test]
fn test_normalised_text_reparses_to_same_document() {
    let first = parse_config(PRINTER_CFG, true);
    let text = first.document.to_config_text(&first.includes);

    assert!(text.starts_with("[include mainsail.cfg]\n[include macros/*.cfg]\n"));
    assert!(!text.contains('#'));

    let second = parse_config(&text, true);
    assert_eq!(second.document, first.document);
    assert_eq!(second.includes, first.includes);
    assert!(second.is_valid());
}
