//! The workbook: sheets in tab order plus the date system

use crate::error::{Error, Result};
use crate::worksheet::Worksheet;
use crate::MAX_SHEET_NAME_LEN;

/// Characters Excel refuses in a sheet name
const FORBIDDEN_NAME_CHARS: &[char] = &[':', '\\', '/', '?', '*', '[', ']'];

/// Worksheets in tab order and the workbook-wide settings
#[derive(Debug, Default)]
pub struct Workbook {
    worksheets: Vec<Worksheet>,
    settings: WorkbookSettings,
}

impl Workbook {
    /// A workbook without any sheet; readers fill it tab by tab
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn sheet_count(&self) -> usize {
        self.worksheets.len()
    }

    pub fn worksheet(&self, index: usize) -> Option<&Worksheet> {
        self.worksheets.get(index)
    }

    pub fn worksheet_mut(&mut self, index: usize) -> Option<&mut Worksheet> {
        self.worksheets.get_mut(index)
    }

    /// Tab index for a name, compared exactly (`Maerz` does not match `März`)
    pub fn sheet_index(&self, name: &str) -> Option<usize> {
        self.worksheets.iter().position(|ws| ws.name() == name)
    }

    pub fn worksheet_by_name(&self, name: &str) -> Option<&Worksheet> {
        self.sheet_index(name).and_then(|i| self.worksheet(i))
    }

    pub fn worksheet_by_name_mut(&mut self, name: &str) -> Option<&mut Worksheet> {
        self.sheet_index(name).and_then(|i| self.worksheet_mut(i))
    }

    pub fn add_worksheet_with_name(&mut self, name: &str) -> Result<usize> {
        self.add_existing_worksheet(Worksheet::new(name))
    }

    /// Append a sheet after the last tab and return its index
    pub fn add_existing_worksheet(&mut self, worksheet: Worksheet) -> Result<usize> {
        self.check_new_name(worksheet.name())?;
        self.worksheets.push(worksheet);
        Ok(self.worksheets.len() - 1)
    }

    /// True once any sheet holds an unsaved write
    pub fn has_edits(&self) -> bool {
        self.worksheets.iter().any(Worksheet::has_edits)
    }

    pub fn clear_edits(&mut self) {
        self.worksheets.iter_mut().for_each(Worksheet::clear_edits);
    }

    pub fn settings(&self) -> &WorkbookSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut WorkbookSettings {
        &mut self.settings
    }

    fn check_new_name(&self, name: &str) -> Result<()> {
        let problem = if name.is_empty() {
            Some("empty name".to_string())
        } else if name.chars().count() > MAX_SHEET_NAME_LEN {
            Some(format!("longer than {} characters", MAX_SHEET_NAME_LEN))
        } else {
            name.chars()
                .find(|c| FORBIDDEN_NAME_CHARS.contains(c))
                .map(|c| format!("contains '{}'", c))
        };
        if let Some(problem) = problem {
            return Err(Error::InvalidSheetName(format!("{}: {}", name, problem)));
        }

        // Tab names are unique regardless of case
        let lowered = name.to_lowercase();
        if self.worksheets.iter().any(|ws| ws.name().to_lowercase() == lowered) {
            return Err(Error::DuplicateSheetName(name.into()));
        }
        Ok(())
    }
}

/// Workbook-wide settings read from `workbook.xml`
#[derive(Debug, Clone, Default)]
pub struct WorkbookSettings {
    /// Serial dates count from 1904-01-01 instead of 1899-12-30
    pub date_1904: bool,
}
