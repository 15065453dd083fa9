//! Macro-preserving workbook document

use std::fs;
use std::io::{Read, Seek, Write};
use std::path::Path;

use log::{debug, info};

use crate::calc_chain::drop_stale_calc_chain;
use crate::error::{XlsxError, XlsxResult};
use crate::package::Package;
use crate::patch::patch_worksheet_xml;
use crate::reader::{SheetEntry, XlsxReader};
use timebook_core::{CellAddress, Workbook};

/// A workbook loaded from an `.xlsx`/`.xlsm` file, together with the raw
/// package it came from.
///
/// Saving patches the edited cells into their worksheet parts and writes
/// every other part back unchanged, so the VBA project of a macro-enabled
/// workbook survives a load/save cycle.
///
/// # Example
///
/// ```no_run
/// use timebook_xlsx::XlsmDocument;
///
/// let mut doc = XlsmDocument::open("Zeiterfassung.xlsm")?;
/// doc.workbook_mut()
///     .worksheet_by_name_mut("Januar")
///     .expect("month sheet")
///     .set_cell_value("F5", 7.0)?;
/// doc.save("Zeiterfassung.xlsm")?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct XlsmDocument {
    package: Package,
    workbook: Workbook,
    sheets: Vec<SheetEntry>,
}

impl XlsmDocument {
    /// Open a workbook file
    pub fn open<P: AsRef<Path>>(path: P) -> XlsxResult<Self> {
        let path = path.as_ref();
        debug!("opening workbook {}", path.display());
        let bytes = fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    /// Load a workbook from a reader
    pub fn read<R: Read + Seek>(reader: R) -> XlsxResult<Self> {
        Self::from_package(Package::read(reader)?)
    }

    /// Load a workbook from bytes
    pub fn from_bytes(bytes: &[u8]) -> XlsxResult<Self> {
        Self::from_package(Package::from_bytes(bytes)?)
    }

    fn from_package(package: Package) -> XlsxResult<Self> {
        let (workbook, sheets) = XlsxReader::read_package(&package)?;
        debug!(
            "loaded {} worksheet(s), macro-enabled: {}",
            sheets.len(),
            package.vba_project().is_some()
        );
        Ok(Self {
            package,
            workbook,
            sheets,
        })
    }

    /// The workbook model
    pub fn workbook(&self) -> &Workbook {
        &self.workbook
    }

    /// The workbook model, for editing
    pub fn workbook_mut(&mut self) -> &mut Workbook {
        &mut self.workbook
    }

    /// The underlying package as last loaded or saved
    pub fn package(&self) -> &Package {
        &self.package
    }

    /// Worksheet names and their package parts, in tab order
    pub fn sheets(&self) -> &[SheetEntry] {
        &self.sheets
    }

    /// Whether the workbook carries a VBA project
    pub fn is_macro_enabled(&self) -> bool {
        self.package.vba_project().is_some()
    }

    /// Build the package with all pending edits applied
    fn patched_package(&self) -> XlsxResult<Package> {
        let mut package = self.package.clone();
        let date1904 = self.workbook.settings().date_1904;
        // Cells that now hold a plain value, keyed the way calcChain.xml lists them
        let mut plain_writes = Vec::new();

        for entry in &self.sheets {
            let worksheet = self
                .workbook
                .worksheet_by_name(&entry.name)
                .ok_or_else(|| timebook_core::Error::SheetNotFound(entry.name.clone()))?;
            if !worksheet.has_edits() {
                continue;
            }
            let original = package.require_part(&entry.part)?;
            let patched = patch_worksheet_xml(original, worksheet, date1904)?;
            debug!(
                "patched {} cell(s) in '{}' ({})",
                worksheet.edited_cells().count(),
                entry.name,
                entry.part
            );
            package.set_part(&entry.part, patched);

            plain_writes.extend(
                worksheet
                    .edited_cells()
                    .filter(|&(row, col)| !worksheet.value_ref_at(row, col).is_formula())
                    .map(|(row, col)| (entry.sheet_id, CellAddress::new(row, col))),
            );
        }

        if drop_stale_calc_chain(&mut package, &plain_writes)? {
            info!("removed calcChain.xml listing overwritten formula cells");
        }

        Ok(package)
    }

    /// Serialize the workbook with pending edits applied.
    ///
    /// Recorded edits are kept; only [`XlsmDocument::save`] commits them.
    pub fn to_bytes(&self) -> XlsxResult<Vec<u8>> {
        self.patched_package()?.to_bytes()
    }

    /// Write the workbook with pending edits to any seekable writer
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> XlsxResult<()> {
        self.patched_package()?.write_to(writer)
    }

    /// Save the workbook to `path`.
    ///
    /// The file is written to a temporary file in the same directory and
    /// then renamed over the target, so a failed save never leaves a
    /// truncated workbook behind. An existing target keeps its permissions.
    /// On success the edits are committed.
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> XlsxResult<()> {
        let path = path.as_ref();
        let package = self.patched_package()?;

        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        package.write_to(tmp.as_file_mut())?;
        // The temp file starts out owner-only; a shared workbook must stay readable
        if let Ok(meta) = fs::metadata(path) {
            tmp.as_file().set_permissions(meta.permissions())?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| XlsxError::Io(e.error))?;

        info!("saved workbook {}", path.display());
        self.package = package;
        self.workbook.clear_edits();
        Ok(())
    }
}
