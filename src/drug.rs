//! Antiretroviral drug classes and drugs

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FactsError;
use crate::gene::GeneKind;

/// Antiretroviral drug class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DrugClass {
    NRTI,
    NNRTI,
    PI,
    #[serde(alias = "INI")]
    INSTI,
}

impl DrugClass {
    pub const ALL: [DrugClass; 4] = [
        DrugClass::NRTI,
        DrugClass::NNRTI,
        DrugClass::PI,
        DrugClass::INSTI,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DrugClass::NRTI => "NRTI",
            DrugClass::NNRTI => "NNRTI",
            DrugClass::PI => "PI",
            DrugClass::INSTI => "INSTI",
        }
    }

    pub fn full_name(&self) -> &'static str {
        match self {
            DrugClass::NRTI => "Nucleoside Reverse Transcriptase Inhibitor",
            DrugClass::NNRTI => "Non-nucleoside Reverse Transcriptase Inhibitor",
            DrugClass::PI => "Protease Inhibitor",
            DrugClass::INSTI => "Integrase Strand Transfer Inhibitor",
        }
    }

    /// The gene this class targets
    pub fn gene_kind(&self) -> GeneKind {
        match self {
            DrugClass::NRTI | DrugClass::NNRTI => GeneKind::RT,
            DrugClass::PI => GeneKind::PR,
            DrugClass::INSTI => GeneKind::IN,
        }
    }

    /// Drugs of this class in declaration order
    pub fn drugs(&self) -> Vec<Drug> {
        Drug::ALL
            .into_iter()
            .filter(|d| d.drug_class() == *self)
            .collect()
    }
}

impl fmt::Display for DrugClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DrugClass {
    type Err = FactsError;

    /// Accepts class names and the synonym `INI`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INI" => Ok(DrugClass::INSTI),
            _ => DrugClass::ALL
                .into_iter()
                .find(|c| c.name() == s)
                .ok_or_else(|| FactsError::unknown_name("drug class", s)),
        }
    }
}

/// Antiretroviral drug
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Drug {
    ABC,
    AZT,
    D4T,
    DDI,
    FTC,
    LMV,
    TDF,
    ATV,
    DRV,
    FPV,
    IDV,
    LPV,
    NFV,
    SQV,
    TPV,
    DOR,
    EFV,
    ETR,
    NVP,
    RPV,
    BIC,
    DTG,
    EVG,
    RAL,
}

/// Alternative names accepted by [`Drug::from_synonym`]
const DRUG_SYNONYMS: &[(&str, Drug)] = &[
    ("LPV/r", Drug::LPV),
    ("IDV/r", Drug::IDV),
    ("FPV/r", Drug::FPV),
    ("ATV/r", Drug::ATV),
    ("DRV/r", Drug::DRV),
    ("TPV/r", Drug::TPV),
    ("SQV/r", Drug::SQV),
    ("3TC", Drug::LMV),
    // once-daily dosing maps to the default regimen
    ("DRV/r_QD", Drug::DRV),
    ("DTG_QD", Drug::DTG),
];

impl Drug {
    pub const ALL: [Drug; 24] = [
        Drug::ABC,
        Drug::AZT,
        Drug::D4T,
        Drug::DDI,
        Drug::FTC,
        Drug::LMV,
        Drug::TDF,
        Drug::ATV,
        Drug::DRV,
        Drug::FPV,
        Drug::IDV,
        Drug::LPV,
        Drug::NFV,
        Drug::SQV,
        Drug::TPV,
        Drug::DOR,
        Drug::EFV,
        Drug::ETR,
        Drug::NVP,
        Drug::RPV,
        Drug::BIC,
        Drug::DTG,
        Drug::EVG,
        Drug::RAL,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Drug::ABC => "ABC",
            Drug::AZT => "AZT",
            Drug::D4T => "D4T",
            Drug::DDI => "DDI",
            Drug::FTC => "FTC",
            Drug::LMV => "LMV",
            Drug::TDF => "TDF",
            Drug::ATV => "ATV",
            Drug::DRV => "DRV",
            Drug::FPV => "FPV",
            Drug::IDV => "IDV",
            Drug::LPV => "LPV",
            Drug::NFV => "NFV",
            Drug::SQV => "SQV",
            Drug::TPV => "TPV",
            Drug::DOR => "DOR",
            Drug::EFV => "EFV",
            Drug::ETR => "ETR",
            Drug::NVP => "NVP",
            Drug::RPV => "RPV",
            Drug::BIC => "BIC",
            Drug::DTG => "DTG",
            Drug::EVG => "EVG",
            Drug::RAL => "RAL",
        }
    }

    pub fn full_name(&self) -> &'static str {
        match self {
            Drug::ABC => "abacavir",
            Drug::AZT => "zidovudine",
            Drug::D4T => "stavudine",
            Drug::DDI => "didanosine",
            Drug::FTC => "emtricitabine",
            Drug::LMV => "lamivudine",
            Drug::TDF => "tenofovir",
            Drug::ATV => "atazanavir/r",
            Drug::DRV => "darunavir/r",
            Drug::FPV => "fosamprenavir/r",
            Drug::IDV => "indinavir/r",
            Drug::LPV => "lopinavir/r",
            Drug::NFV => "nelfinavir",
            Drug::SQV => "saquinavir/r",
            Drug::TPV => "tipranavir/r",
            Drug::DOR => "doravirine",
            Drug::EFV => "efavirenz",
            Drug::ETR => "etravirine",
            Drug::NVP => "nevirapine",
            Drug::RPV => "rilpivirine",
            Drug::BIC => "bictegravir",
            Drug::DTG => "dolutegravir",
            Drug::EVG => "elvitegravir",
            Drug::RAL => "raltegravir",
        }
    }

    /// Abbreviation shown in reports (`3TC`, `LPV/r`, ...)
    pub fn display_abbr(&self) -> &'static str {
        match self {
            Drug::LMV => "3TC",
            Drug::ATV => "ATV/r",
            Drug::DRV => "DRV/r",
            Drug::FPV => "FPV/r",
            Drug::IDV => "IDV/r",
            Drug::LPV => "LPV/r",
            Drug::SQV => "SQV/r",
            Drug::TPV => "TPV/r",
            other => other.name(),
        }
    }

    pub fn drug_class(&self) -> DrugClass {
        match self {
            Drug::ABC | Drug::AZT | Drug::D4T | Drug::DDI | Drug::FTC | Drug::LMV | Drug::TDF => {
                DrugClass::NRTI
            }
            Drug::ATV
            | Drug::DRV
            | Drug::FPV
            | Drug::IDV
            | Drug::LPV
            | Drug::NFV
            | Drug::SQV
            | Drug::TPV => DrugClass::PI,
            Drug::DOR | Drug::EFV | Drug::ETR | Drug::NVP | Drug::RPV => DrugClass::NNRTI,
            Drug::BIC | Drug::DTG | Drug::EVG | Drug::RAL => DrugClass::INSTI,
        }
    }

    /// Look a drug up by name or synonym; `None` when unknown
    pub fn from_synonym(name: &str) -> Option<Drug> {
        DRUG_SYNONYMS
            .iter()
            .find(|(syn, _)| *syn == name)
            .map(|(_, drug)| *drug)
            .or_else(|| Drug::ALL.into_iter().find(|d| d.name() == name))
    }
}

impl fmt::Display for Drug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Drug {
    type Err = FactsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Drug::from_synonym(s).ok_or_else(|| FactsError::unknown_name("drug", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_drug_class_synonym() {
        assert_eq!("INI".parse::<DrugClass>().unwrap(), DrugClass::INSTI);
        assert_eq!("NNRTI".parse::<DrugClass>().unwrap(), DrugClass::NNRTI);
        let err = "XYZ".parse::<DrugClass>().unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::UnknownName));
    }

    #[test]
    fn test_drug_class_gene() {
        assert_eq!(DrugClass::NRTI.gene_kind(), GeneKind::RT);
        assert_eq!(DrugClass::NNRTI.gene_kind(), GeneKind::RT);
        assert_eq!(DrugClass::PI.gene_kind(), GeneKind::PR);
        assert_eq!(DrugClass::INSTI.gene_kind(), GeneKind::IN);
        assert_eq!(
            DrugClass::INSTI.full_name(),
            "Integrase Strand Transfer Inhibitor"
        );
    }

    #[test]
    fn test_drugs_of_class() {
        let insti = DrugClass::INSTI.drugs();
        assert_eq!(insti, vec![Drug::BIC, Drug::DTG, Drug::EVG, Drug::RAL]);
        assert_eq!(DrugClass::PI.drugs().len(), 8);
        assert_eq!(DrugClass::NRTI.drugs().len(), 7);
        assert_eq!(DrugClass::NNRTI.drugs().len(), 5);
    }

    #[test]
    fn test_drug_synonyms() {
        assert_eq!(Drug::from_synonym("3TC"), Some(Drug::LMV));
        assert_eq!(Drug::from_synonym("LPV/r"), Some(Drug::LPV));
        assert_eq!(Drug::from_synonym("DRV/r_QD"), Some(Drug::DRV));
        assert_eq!(Drug::from_synonym("DTG_QD"), Some(Drug::DTG));
        assert_eq!(Drug::from_synonym("EFV"), Some(Drug::EFV));
        assert_eq!(Drug::from_synonym("XYZ"), None);
    }

    #[test]
    fn test_drug_names() {
        assert_eq!(Drug::LMV.display_abbr(), "3TC");
        assert_eq!(Drug::LMV.full_name(), "lamivudine");
        assert_eq!(Drug::NFV.display_abbr(), "NFV");
        assert_eq!(Drug::TPV.full_name(), "tipranavir/r");
        assert_eq!(Drug::RPV.drug_class(), DrugClass::NNRTI);
    }
}
