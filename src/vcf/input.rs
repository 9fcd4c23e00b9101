//! Caller-side checks on uploaded VCF files.

use std::path::Path;

/// Limits applied before the text reaches the parser.
#[derive(Debug, Clone, PartialEq)]
pub struct InputLimits {
    /// Maximal file size in bytes.
    pub max_size_bytes: usize,
    /// Minimal number of characters after trimming whitespace.
    pub min_content_chars: usize,
    /// Required file name extension (compared case-insensitively).
    pub extension: String,
}

impl Default for InputLimits {
    fn default() -> Self {
        Self {
            max_size_bytes: 5 * 1024 * 1024,
            min_content_chars: 10,
            extension: "vcf".to_string(),
        }
    }
}

/// Reasons for rejecting an input file.
#[derive(thiserror::Error, Debug)]
pub enum InputError {
    /// The file could not be read.
    #[error("problem reading file: {0}")]
    Io(#[from] std::io::Error),
    /// The file name does not carry the required extension.
    #[error("invalid file type: '{file_name}', expected .{extension} file")]
    InvalidExtension {
        /// Offending file name.
        file_name: String,
        /// Expected extension.
        extension: String,
    },
    /// The file has no content.
    #[error("file is empty")]
    Empty,
    /// The file exceeds the size limit.
    #[error("file too large: {size_mb:.2} MB (maximum {max_mb:.2} MB)")]
    TooLarge {
        /// Size in MB.
        size_mb: f64,
        /// Maximal size in MB.
        max_mb: f64,
    },
    /// The file is not valid UTF-8.
    #[error("file encoding error: unable to decode as UTF-8")]
    Encoding,
    /// The content is too short to be a VCF file.
    #[error("VCF file is too small or contains only whitespace")]
    TooSmall,
}

impl InputError {
    /// Machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            InputError::Io(_) => "READ_ERROR",
            InputError::InvalidExtension { .. } => "INVALID_EXTENSION",
            InputError::Empty => "EMPTY_FILE",
            InputError::TooLarge { .. } => "FILE_TOO_LARGE",
            InputError::Encoding => "ENCODING_ERROR",
            InputError::TooSmall => "CONTENT_TOO_SMALL",
        }
    }
}

/// Convert a byte count to MB.
pub fn size_mb(bytes: usize) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}

impl InputLimits {
    /// Check the file name extension.
    ///
    /// # Errors
    ///
    /// Returns `InputError::InvalidExtension` on mismatch.
    pub fn check_file_name(&self, file_name: &str) -> Result<(), InputError> {
        let matches = Path::new(file_name)
            .extension()
            .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(&self.extension))
            .unwrap_or(false);
        if matches {
            Ok(())
        } else {
            Err(InputError::InvalidExtension {
                file_name: file_name.to_string(),
                extension: self.extension.clone(),
            })
        }
    }

    /// Check raw bytes and decode them as UTF-8.
    ///
    /// # Errors
    ///
    /// Returns the first failing check.
    pub fn decode(&self, content: Vec<u8>) -> Result<String, InputError> {
        if content.is_empty() {
            return Err(InputError::Empty);
        }
        if content.len() > self.max_size_bytes {
            return Err(InputError::TooLarge {
                size_mb: size_mb(content.len()),
                max_mb: size_mb(self.max_size_bytes),
            });
        }
        let text = String::from_utf8(content).map_err(|_| InputError::Encoding)?;
        if text.trim().chars().count() < self.min_content_chars {
            return Err(InputError::TooSmall);
        }

        Ok(text)
    }

    /// Read a file from disk and apply all checks.
    ///
    /// # Errors
    ///
    /// Returns the first failing check.
    pub fn read<P>(&self, path: P) -> Result<String, InputError>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        self.check_file_name(&file_name(path))?;
        self.decode(std::fs::read(path)?)
    }
}

/// Final component of `path` as a string.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod test {
    use super::*;

    #[rstest::rstest]
    #[case("sample.vcf", true)]
    #[case("SAMPLE.VCF", true)]
    #[case("sample.vcf.gz", false)]
    #[case("sample.txt", false)]
    #[case("vcf", false)]
    fn check_file_name(#[case] name: &str, #[case] ok: bool) {
        assert_eq!(InputLimits::default().check_file_name(name).is_ok(), ok);
    }

    #[test]
    fn decode_rejections() {
        let limits = InputLimits {
            max_size_bytes: 32,
            ..Default::default()
        };

        assert_eq!(limits.decode(Vec::new()).unwrap_err().code(), "EMPTY_FILE");
        assert_eq!(
            limits.decode(vec![b'#'; 33]).unwrap_err().code(),
            "FILE_TOO_LARGE"
        );
        assert_eq!(
            limits.decode(vec![0xff, 0xfe, 0x00]).unwrap_err().code(),
            "ENCODING_ERROR"
        );
        assert_eq!(
            limits.decode(b"   ##x   \n".to_vec()).unwrap_err().code(),
            "CONTENT_TOO_SMALL"
        );
        assert!(limits.decode(b"##fileformat=VCFv4.2".to_vec()).is_ok());
    }

    #[test]
    fn read_from_disk() -> Result<(), anyhow::Error> {
        let tmp = tempfile::tempdir()?;
        let path = tmp.path().join("input.vcf");
        std::fs::write(&path, "##fileformat=VCFv4.2\n")?;

        assert_eq!(InputLimits::default().read(&path)?, "##fileformat=VCFv4.2\n");

        let bad = tmp.path().join("input.txt");
        std::fs::write(&bad, "##fileformat=VCFv4.2\n")?;
        assert!(matches!(
            InputLimits::default().read(&bad),
            Err(InputError::InvalidExtension { .. })
        ));

        Ok(())
    }
}
