//! Calibration and norm-pack JSON files.

use std::fs::File;
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::domain::{Calibration, NormPack};
use crate::error::AppError;

pub fn write_calibration_json(path: &Path, calibration: &Calibration) -> Result<(), AppError> {
    write_json(path, calibration)
}

pub fn write_norm_pack_json(path: &Path, pack: &NormPack) -> Result<(), AppError> {
    write_json(path, pack)
}

pub fn read_calibration_json(path: &Path) -> Result<Calibration, AppError> {
    read_json(path)
}

pub fn read_norm_pack_json(path: &Path) -> Result<NormPack, AppError> {
    read_json(path)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::input(format!("Failed to create JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, value)
        .map_err(|e| AppError::input(format!("Failed to write JSON '{}': {e}", path.display())))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::input(format!("Failed to open JSON '{}': {e}", path.display())))?;
    serde_json::from_reader(file)
        .map_err(|e| AppError::input(format!("Invalid JSON '{}': {e}", path.display())))
}
