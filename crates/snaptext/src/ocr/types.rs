use serde::{Deserialize, Serialize};
use std::fmt;

/// Page Segmentation Mode for Tesseract OCR
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PSMMode {
    OsdOnly = 0,
    AutoOsd = 1,
    AutoOnly = 2,
    Auto = 3,
    SingleColumn = 4,
    SingleBlockVertical = 5,
    SingleBlock = 6,
    SingleLine = 7,
    SingleWord = 8,
    CircleWord = 9,
    SingleChar = 10,
}

impl PSMMode {
    pub fn from_u8(value: u8) -> Result<Self, String> {
        match value {
            0 => Ok(PSMMode::OsdOnly),
            1 => Ok(PSMMode::AutoOsd),
            2 => Ok(PSMMode::AutoOnly),
            3 => Ok(PSMMode::Auto),
            4 => Ok(PSMMode::SingleColumn),
            5 => Ok(PSMMode::SingleBlockVertical),
            6 => Ok(PSMMode::SingleBlock),
            7 => Ok(PSMMode::SingleLine),
            8 => Ok(PSMMode::SingleWord),
            9 => Ok(PSMMode::CircleWord),
            10 => Ok(PSMMode::SingleChar),
            _ => Err(format!("Invalid PSM mode value: {}", value)),
        }
    }

    pub fn as_u8(&self) -> u8 {
        *self as u8
    }
}

/// OCR Engine Mode. `Default` lets Tesseract pick whatever is available, which is the
/// LSTM recognizer on any modern install.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OEMMode {
    LegacyOnly = 0,
    LstmOnly = 1,
    LegacyAndLstm = 2,
    Default = 3,
}

impl OEMMode {
    pub fn from_u8(value: u8) -> Result<Self, String> {
        match value {
            0 => Ok(OEMMode::LegacyOnly),
            1 => Ok(OEMMode::LstmOnly),
            2 => Ok(OEMMode::LegacyAndLstm),
            3 => Ok(OEMMode::Default),
            _ => Err(format!("Invalid OEM mode value: {}", value)),
        }
    }

    pub fn as_u8(&self) -> u8 {
        *self as u8
    }
}

/// Parameters passed to the engine on every call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecognitionSettings {
    pub language: String,
    pub psm: PSMMode,
    pub oem: OEMMode,
}

impl Default for RecognitionSettings {
    fn default() -> Self {
        Self {
            language: "eng".to_string(),
            psm: PSMMode::SingleBlock,
            oem: OEMMode::Default,
        }
    }
}

impl RecognitionSettings {
    pub fn validate(&self) -> Result<(), String> {
        if self.language.trim().is_empty() {
            return Err("Language cannot be empty. Please specify a valid language code (e.g., 'eng')".to_string());
        }
        if self
            .language
            .split('+')
            .any(|lang| lang.is_empty() || !lang.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'))
        {
            return Err(format!("Invalid language code: '{}'", self.language));
        }
        Ok(())
    }
}

impl fmt::Display for RecognitionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "-l {} --oem {} --psm {}", self.language, self.oem.as_u8(), self.psm.as_u8())
    }
}
