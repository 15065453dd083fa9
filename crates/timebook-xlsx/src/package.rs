//! Raw OPC package access
//!
//! A [`Package`] holds every ZIP entry of a workbook as raw bytes, in the
//! order they appeared in the archive. Parts nobody touches are written back
//! byte-for-byte, which is what keeps `xl/vbaProject.bin` and friends intact.

use std::io::{Cursor, Read, Seek, Write};

use zip::write::SimpleFileOptions;
use zip::CompressionMethod;

use crate::error::{XlsxError, XlsxResult};

/// Path of the VBA project part in macro-enabled workbooks
pub const VBA_PROJECT_PART: &str = "xl/vbaProject.bin";

#[derive(Debug, Clone)]
struct PackagePart {
    name: String,
    data: Vec<u8>,
    compression: CompressionMethod,
}

/// An in-memory OPC (ZIP) package
#[derive(Debug, Clone, Default)]
pub struct Package {
    parts: Vec<PackagePart>,
}

impl Package {
    /// Read every entry of a ZIP archive
    pub fn read<R: Read + Seek>(reader: R) -> XlsxResult<Self> {
        let mut archive = zip::ZipArchive::new(reader)?;
        let mut parts = Vec::with_capacity(archive.len());

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let compression = match file.compression() {
                CompressionMethod::Stored => CompressionMethod::Stored,
                _ => CompressionMethod::Deflated,
            };
            let mut data = Vec::with_capacity(usize::try_from(file.size()).unwrap_or(0));
            file.read_to_end(&mut data)?;
            parts.push(PackagePart {
                name: file.name().to_string(),
                data,
                compression,
            });
        }

        let package = Self { parts };
        if package.part("[Content_Types].xml").is_none() {
            return Err(XlsxError::InvalidFormat(
                "Missing [Content_Types].xml".into(),
            ));
        }
        Ok(package)
    }

    /// Read a package from bytes
    pub fn from_bytes(bytes: &[u8]) -> XlsxResult<Self> {
        Self::read(Cursor::new(bytes))
    }

    /// Get a part's bytes by name
    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.parts
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.data.as_slice())
    }

    /// Get a required part or fail with [`XlsxError::MissingPart`]
    pub fn require_part(&self, name: &str) -> XlsxResult<&[u8]> {
        self.part(name)
            .ok_or_else(|| XlsxError::MissingPart(name.to_string()))
    }

    /// Replace a part's bytes, appending the part if it does not exist
    pub fn set_part(&mut self, name: &str, data: Vec<u8>) {
        match self.parts.iter_mut().find(|p| p.name == name) {
            Some(part) => part.data = data,
            None => self.parts.push(PackagePart {
                name: name.to_string(),
                data,
                compression: CompressionMethod::Deflated,
            }),
        }
    }

    /// Remove a part, returning whether it existed
    pub fn remove_part(&mut self, name: &str) -> bool {
        let before = self.parts.len();
        self.parts.retain(|p| p.name != name);
        self.parts.len() != before
    }

    /// Names of all parts, in archive order
    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|p| p.name.as_str())
    }

    /// The embedded VBA project, if this is a macro-enabled workbook
    pub fn vba_project(&self) -> Option<&[u8]> {
        self.part(VBA_PROJECT_PART)
    }

    /// Write the package as a ZIP archive
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> XlsxResult<()> {
        let mut zip = zip::ZipWriter::new(writer);
        for part in &self.parts {
            let options = SimpleFileOptions::default().compression_method(part.compression);
            zip.start_file(part.name.as_str(), options)?;
            zip.write_all(&part.data)?;
        }
        zip.finish()?;
        Ok(())
    }

    /// Serialize the package to bytes
    pub fn to_bytes(&self) -> XlsxResult<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::new());
        self.write_to(&mut cursor)?;
        Ok(cursor.into_inner())
    }
}
