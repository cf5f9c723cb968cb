

use ndarray::Array2;
use ndarray_npy::{read_npy, write_npy};
use std::{collections::HashMap, error::Error, fs::{self, File}, io::{BufReader, BufWriter}};


// paths are given without extension, each type appends its own
pub fn read_input<R: ReadFile>(file_path: &str) -> Result<<R as ReadFile>::Item, Box<dyn Error>> {
    let input = <R as ReadFile>::read_file(file_path)?;
    Ok(input)
}

pub fn save_output<S: SaveFile>(output_dir: &str, file_name: &str, item: &S) -> Result<(), Box<dyn Error>> {

    // create output folder
    fs::create_dir_all(output_dir).map_err(|e| format!("cannot create output dir {}: {}", output_dir, e))?;

    // SaveFile can be Array2<f32> or HashMap<String, usize>
    item.save_file(output_dir, file_name)?;
    Ok(())
}

pub trait ReadFile {
    type Item;
    fn read_file(file_path: &str) -> Result<Self::Item, Box<dyn Error>>;
}

impl ReadFile for Array2<f32> {
    type Item = Self;
    fn read_file(file_path: &str) -> Result<Self::Item, Box<dyn Error>> {
        let in_file = strip_ext(file_path, ".npy").to_string() + ".npy";
        let item = read_npy(&in_file).map_err(|e| format!("cannot read {}: {}", in_file, e))?;
        Ok(item)
    }
}

impl ReadFile for HashMap<String, usize> {
    type Item = Self;
    fn read_file(file_path: &str) -> Result<Self::Item, Box<dyn Error>> {
        let in_file = strip_ext(file_path, ".txt").to_string() + ".txt";
        let f = BufReader::new(File::open(&in_file).map_err(|e| format!("cannot open {}: {}", in_file, e))?);
        let item = serde_json::from_reader(f)?;
        Ok(item)
    }
}

pub trait SaveFile {
    fn save_file(&self, output_dir: &str, file_name: &str) -> Result<(), Box<dyn Error>>;
}

impl SaveFile for Array2<f32> {
    fn save_file(&self, output_dir: &str, file_name: &str) -> Result<(), Box<dyn Error>> {
        let out = output_dir.to_string() + "/" + file_name + ".npy";
        write_npy(out, self)?;
        Ok(())
    }
}

impl SaveFile for HashMap<String, usize> {
    fn save_file(&self, output_dir: &str, file_name: &str) -> Result<(), Box<dyn Error>> {
        let out = output_dir.to_string() + "/" + file_name + ".txt";
        let f = BufWriter::new(File::create(out)?);
        serde_json::to_writer(f, self)?;
        Ok(())
    }
}

// accept both "Output/vecs" and "Output/vecs.npy"
fn strip_ext<'a>(file_path: &'a str, ext: &str) -> &'a str {
    file_path.strip_suffix(ext).unwrap_or(file_path)
}
