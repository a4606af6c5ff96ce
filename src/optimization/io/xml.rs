use std::fs;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use flate2::Compression;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::info;

use crate::optimization::error::DatasetError;

pub fn read_from_file<T>(path: &Path) -> Result<T, DatasetError>
where
    T: DeserializeOwned,
{
    info!("xml::read_from_file: Starting to read file at: {path:?}");
    let file = File::open(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let buffered_reader = BufReader::new(file);

    let file_name = path.to_string_lossy();
    if file_name.ends_with(".xml.gz") {
        let decoder = flate2::read::GzDecoder::new(buffered_reader);
        deserialize(BufReader::new(decoder), path)
    } else if file_name.ends_with(".xml") {
        deserialize(buffered_reader, path)
    } else {
        Err(DatasetError::UnsupportedFormat(path.to_path_buf()))
    }
}

fn deserialize<T, R>(reader: BufReader<R>, path: &Path) -> Result<T, DatasetError>
where
    T: DeserializeOwned,
    R: Read,
{
    let mut deserializer = quick_xml::de::Deserializer::from_reader(reader);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|e| DatasetError::Parse {
        path: path.to_path_buf(),
        message: format!("{} at {}", e.inner(), e.path()),
    })
}

pub fn write_to_file<T: Serialize>(
    serde_message: &T,
    path: &Path,
    header: &str,
) -> Result<(), DatasetError> {
    let io_error = |source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    };
    let write_error = |message: String| DatasetError::Write {
        path: path.to_path_buf(),
        message,
    };

    if let Some(prefix) = path.parent() {
        fs::create_dir_all(prefix).map_err(io_error)?;
    }

    info!("Starting to write file to: {path:?}");
    let file_name = path.to_string_lossy();
    let mut body = String::from(header);
    quick_xml::se::to_writer(&mut body, serde_message).map_err(|e| write_error(e.to_string()))?;

    let file_writer = BufWriter::new(File::create(path).map_err(io_error)?);
    if file_name.ends_with(".xml.gz") {
        let mut compressor = flate2::write::GzEncoder::new(file_writer, Compression::fast());
        compressor.write_all(body.as_bytes()).map_err(io_error)?;
        compressor.finish().map_err(io_error)?;
    } else if file_name.ends_with(".xml") {
        let mut file_writer = file_writer;
        file_writer.write_all(body.as_bytes()).map_err(io_error)?;
        file_writer.flush().map_err(io_error)?;
    } else {
        return Err(DatasetError::UnsupportedFormat(path.to_path_buf()));
    }
    info!("Finished writing file to: {path:?}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use crate::optimization::error::DatasetError;
    use crate::optimization::io::dataset::IOCity;
    use crate::optimization::io::xml::read_from_file;

    #[test]
    fn reject_unknown_extension() {
        let result: Result<IOCity, _> = read_from_file(Path::new("./assets/cairo/config.yml"));
        assert!(matches!(result, Err(DatasetError::UnsupportedFormat(_))));
    }

    #[test]
    fn report_missing_file() {
        let result: Result<IOCity, _> =
            read_from_file(Path::new("./assets/does-not-exist/city.xml"));
        assert!(matches!(result, Err(DatasetError::Io { .. })));
    }
}
