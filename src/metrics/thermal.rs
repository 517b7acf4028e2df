//! Temperature sensors from sysfs (hwmon, falling back to thermal zones).

use super::SensorReading;
use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Read every temperature sensor exposed under `sys_root`.
///
/// Hosts without any sensors (most VMs) yield an empty list, not an error.
pub fn read_sensors(sys_root: &Path) -> Result<Vec<SensorReading>> {
    let hwmon = read_hwmon(&sys_root.join("class").join("hwmon"))?;
    if !hwmon.is_empty() {
        return Ok(hwmon);
    }
    read_thermal_zones(&sys_root.join("class").join("thermal"))
}

/// Sorted entries of `dir`, or nothing if it does not exist
fn list_dir(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e).with_context(|| format!("Failed to list {}", dir.display())),
    };

    let mut paths: Vec<PathBuf> = entries.filter_map(|e| e.ok().map(|e| e.path())).collect();
    paths.sort();
    Ok(paths)
}

fn read_trimmed(path: &Path) -> Option<String> {
    fs::read_to_string(path).ok().map(|s| s.trim().to_string())
}

/// sysfs reports millidegrees Celsius
fn read_millidegrees(path: &Path) -> Option<f64> {
    read_trimmed(path)?
        .parse::<i64>()
        .ok()
        .map(|milli| milli as f64 / 1000.0)
}

fn sensor_key(chip: &str, label: &str) -> String {
    format!("{}_{}", chip, label)
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

fn read_hwmon(class_dir: &Path) -> Result<Vec<SensorReading>> {
    let mut readings = Vec::new();

    for chip_dir in list_dir(class_dir)? {
        if !chip_dir.is_dir() {
            continue;
        }
        let chip = read_trimmed(&chip_dir.join("name")).unwrap_or_else(|| {
            chip_dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        });

        for path in list_dir(&chip_dir)? {
            let Some(file) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let Some(index) = file
                .strip_prefix("temp")
                .and_then(|rest| rest.strip_suffix("_input"))
            else {
                continue;
            };

            // Some sensors fail reads transiently (EIO, ENODATA); skip them
            let Some(celsius) = read_millidegrees(&path) else {
                continue;
            };

            let label = read_trimmed(&chip_dir.join(format!("temp{index}_label")))
                .filter(|l| !l.is_empty())
                .unwrap_or_else(|| format!("temp{index}"));

            readings.push(SensorReading::new(sensor_key(&chip, &label), celsius));
        }
    }

    Ok(readings)
}

fn read_thermal_zones(class_dir: &Path) -> Result<Vec<SensorReading>> {
    let mut readings = Vec::new();

    for zone_dir in list_dir(class_dir)? {
        let is_zone = zone_dir
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with("thermal_zone"));
        if !is_zone {
            continue;
        }

        let (Some(kind), Some(celsius)) = (
            read_trimmed(&zone_dir.join("type")),
            read_millidegrees(&zone_dir.join("temp")),
        ) else {
            continue;
        };

        readings.push(SensorReading::new(kind.to_lowercase(), celsius));
    }

    Ok(readings)
}
