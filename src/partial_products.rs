use std::error::Error;
use std::fs::File;
use std::io::Read;

use crate::engine::Triple;
use crate::transport;

/// # Description
/// the partial product stream as loaded from the preprocessing output
///
/// the file format is csv with a header line:
/// prod,row_idx_i,col_idx_j
/// 655,0,0
/// -131,0,3
/// ...
///
/// the header names are flexible the same way the preprocessing side is,
/// any of prod/value/val, row_idx_i/row/row_idx and col_idx_j/col/col_idx
/// are recognized and the column order does not matter. the last data line
/// is tagged as the end of the stream.
#[derive(Debug)]
pub struct PartialProducts {
    pub triples: Vec<Triple>,
}

impl PartialProducts {
    pub fn new(file_name: &str) -> Result<Self, Box<dyn Error>> {
        let mut file = File::open(file_name)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        Self::from_csv(&contents)
    }

    pub fn from_csv(contents: &str) -> Result<Self, Box<dyn Error>> {
        let mut lines = contents.lines();
        let header = lines.next().ok_or("empty partial product file")?;
        let (value_idx, row_idx, col_idx) = parse_header(header)?;
        let width = value_idx.max(row_idx).max(col_idx) + 1;

        let mut triples = Vec::new();
        for line in lines {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split(',').collect();
            if fields.len() < width {
                return Err(format!("short line in partial product file: {:?}", line).into());
            }
            triples.push(Triple::new(
                fields[value_idx].trim().parse::<i32>()?,
                fields[row_idx].trim().parse::<u16>()?,
                fields[col_idx].trim().parse::<u16>()?,
                false,
            ));
        }
        if let Some(last) = triples.last_mut() {
            last.last = true;
        }
        Ok(PartialProducts { triples })
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// pack every triple into the 9 byte wire format, in stream order
    pub fn to_frames(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.triples.len() * transport::FRAME_BYTES);
        for triple in &self.triples {
            bytes.extend_from_slice(&transport::encode_frame(triple));
        }
        bytes
    }
}

fn parse_header(header: &str) -> Result<(usize, usize, usize), Box<dyn Error>> {
    let mut value_idx = None;
    let mut row_idx = None;
    let mut col_idx = None;
    for (i, name) in header.split(',').enumerate() {
        match name.trim() {
            "prod" | "value" | "val" => value_idx = Some(i),
            "row_idx_i" | "row" | "row_idx" => row_idx = Some(i),
            "col_idx_j" | "col" | "col_idx" => col_idx = Some(i),
            _ => {}
        }
    }
    match (value_idx, row_idx, col_idx) {
        (Some(value), Some(row), Some(col)) => Ok((value, row, col)),
        _ => Err(format!("could not find prod/row/col columns in header {:?}", header).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_from_csv() -> Result<(), Box<dyn Error>> {
        let data = "prod,row_idx_i,col_idx_j\n655,0,0\n-131,0,3\n7,1,2\n";
        let products = PartialProducts::from_csv(data)?;
        assert_eq!(products.len(), 3);
        assert_eq!(products.triples[0], Triple::new(655, 0, 0, false));
        assert_eq!(products.triples[1], Triple::new(-131, 0, 3, false));
        // the final line carries the end of stream tag
        assert_eq!(products.triples[2], Triple::new(7, 1, 2, true));
        Ok(())
    }

    #[test]
    fn test_header_names_are_flexible() -> Result<(), Box<dyn Error>> {
        let data = "row,col,value\n3,4,-9\n";
        let products = PartialProducts::from_csv(data)?;
        assert_eq!(products.triples[0], Triple::new(-9, 3, 4, true));
        Ok(())
    }

    #[test]
    fn test_unknown_header_is_an_error() {
        assert!(PartialProducts::from_csv("a,b,c\n1,2,3\n").is_err());
    }

    #[test]
    fn test_read_from_file() -> Result<(), Box<dyn Error>> {
        std::fs::create_dir_all("test_data")?;
        let file_name = "test_data/partial_products.csv";
        let data = "prod,row_idx_i,col_idx_j\n10,0,5\n20,0,5\n";
        let mut file = File::create(file_name)?;
        file.write_all(data.as_bytes())?;

        let products = PartialProducts::new(file_name)?;
        assert_eq!(products.len(), 2);

        std::fs::remove_file(file_name)?;
        Ok(())
    }

    #[test]
    fn test_to_frames() -> Result<(), Box<dyn Error>> {
        let products = PartialProducts::from_csv("prod,row_idx_i,col_idx_j\n1,2,3\n")?;
        let bytes = products.to_frames();
        assert_eq!(bytes.len(), transport::FRAME_BYTES);
        assert_eq!(
            transport::decode_frame(&bytes)?,
            Triple::new(1, 2, 3, true)
        );
        Ok(())
    }
}
