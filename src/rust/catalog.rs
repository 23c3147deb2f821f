//! Static catalogs mapping form labels to the category codes seen during training.

use crate::error::InvalidCategoryError;

/// Dataset column holding structural type codes.
pub const STRUCT_TYPE_COLUMN: &str = "struct_typ";
/// Dataset column holding occupancy type codes.
pub const OCC_TYPE_COLUMN: &str = "occ_type";

/// A display label and the raw codes it stands for, in tie-break order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryGroup {
    pub display: &'static str,
    pub codes: &'static [&'static str],
}

impl CategoryGroup {
    /// The code a choice of this group resolves to. Always the first listed code.
    pub fn primary_code(&self) -> &'static str {
        self.codes[0]
    }
}

const STRUCTURAL_GROUPS: &[CategoryGroup] = &[
    CategoryGroup { display: "Unreinforced Masonry (URM)", codes: &["URM"] },
    CategoryGroup { display: "Steel Moment Frame (S1)", codes: &["S1"] },
    CategoryGroup { display: "Reinforced Concrete Moment Frame (C4)", codes: &["C4"] },
    CategoryGroup { display: "Wooden Frame (W1)", codes: &["W1"] },
    CategoryGroup { display: "Precast Concrete (PC1)", codes: &["PC1"] },
    CategoryGroup { display: "Reinforced Concrete Shear Wall (C1)", codes: &["C1"] },
];

const OCCUPANCY_GROUPS: &[CategoryGroup] = &[
    CategoryGroup { display: "Residential", codes: &["RES1", "RES3", "RES4"] },
    CategoryGroup {
        display: "Commercial",
        codes: &["COM1", "COM2", "COM3", "COM4", "COM7", "COM8"],
    },
    CategoryGroup { display: "Industrial", codes: &["IND1", "IND2", "IND3"] },
    CategoryGroup { display: "Agricultural", codes: &["AGR1"] },
    CategoryGroup { display: "Educational", codes: &["EDU1"] },
    CategoryGroup { display: "Religious", codes: &["REL1"] },
    CategoryGroup { display: "Governmental", codes: &["GOV1"] },
];

/// An ordered, immutable catalog of display groups for one dataset column.
#[derive(Debug, Clone, Copy)]
pub struct CategoryCatalog {
    name: &'static str,
    column: &'static str,
    groups: &'static [CategoryGroup],
}

impl CategoryCatalog {
    /// Building structural systems, encoded into `struct_typ`.
    pub const fn structural() -> Self {
        Self {
            name: "structural type",
            column: STRUCT_TYPE_COLUMN,
            groups: STRUCTURAL_GROUPS,
        }
    }

    /// Building occupancy classes, encoded into `occ_type`.
    pub const fn occupancy() -> Self {
        Self {
            name: "occupancy type",
            column: OCC_TYPE_COLUMN,
            groups: OCCUPANCY_GROUPS,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The dataset column whose encoder understands this catalog's codes.
    pub fn column(&self) -> &'static str {
        self.column
    }

    /// Display groups in presentation order.
    pub fn groups(&self) -> &'static [CategoryGroup] {
        self.groups
    }

    pub fn display_labels(&self) -> impl Iterator<Item = &'static str> {
        self.groups.iter().map(|g| g.display)
    }

    /// Every raw code referenced by the catalog, sub-codes included.
    pub fn codes(&self) -> impl Iterator<Item = &'static str> {
        self.groups.iter().flat_map(|g| g.codes.iter().copied())
    }

    /// Resolves a display choice to its raw code.
    ///
    /// Groups listing several codes always resolve to the first one, so
    /// "Commercial" yields `COM1` and never a later sub-code.
    ///
    /// # Errors
    /// - `InvalidCategoryError` if `display_choice` is not an exact catalog key
    pub fn resolve(&self, display_choice: &str) -> Result<&'static str, InvalidCategoryError> {
        self.groups
            .iter()
            .find(|g| g.display == display_choice)
            .map(CategoryGroup::primary_code)
            .ok_or_else(|| InvalidCategoryError {
                group: self.name,
                choice: display_choice.to_string(),
            })
    }
}
